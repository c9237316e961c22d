//! PDF report export.
//!
//! Generates a multi-page PDF 1.4 document in memory: letterhead,
//! summary block, tabular measurement body and a repeated page-number
//! footer. The document uses the two built-in Helvetica fonts and plain
//! uncompressed content streams, so no PDF library is involved; text is
//! degraded to ASCII to stay within the standard font encoding.

use crate::export::ExportError;
use chrono::{DateTime, Local};
use mien_core::{MetricKind, SessionDetail, SessionSummary};

const PAGE_WIDTH: f32 = 595.28; // A4 portrait, points
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN_X: f32 = 50.0;
const ROW_HEIGHT: f32 = 14.0;
const FOOTER_Y: f32 = 40.0;

/// Measurement rows on the letterhead page and on continuation pages.
const FIRST_PAGE_ROWS: usize = 34;
const NEXT_PAGE_ROWS: usize = 50;

/// Column x positions: time, emotion, score, then the five metrics.
const COLUMNS: [f32; 8] = [50.0, 95.0, 175.0, 230.0, 290.0, 350.0, 410.0, 470.0];
const COLUMN_TITLES: [&str; 8] = [
    "TIME", "EMOTION", "SCORE", "ENG", "SAT", "TRUST", "LOYALTY", "OPINION",
];

/// Render one session's report. Fully in-memory; the caller writes the
/// returned bytes in a single operation.
pub fn render(
    detail: &SessionDetail,
    generated_at: DateTime<Local>,
) -> Result<Vec<u8>, ExportError> {
    if detail.data.is_empty() {
        return Err(ExportError::EmptySession);
    }
    let summary = SessionSummary::from_measurements(&detail.data);

    // Split rows across pages up front so every footer can name the total.
    let mut chunks: Vec<&[mien_core::Measurement]> = Vec::new();
    let first = detail.data.len().min(FIRST_PAGE_ROWS);
    chunks.push(&detail.data[..first]);
    for chunk in detail.data[first..].chunks(NEXT_PAGE_ROWS) {
        chunks.push(chunk);
    }
    let page_count = chunks.len();

    let mut objects: Vec<Vec<u8>> = Vec::new();
    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());

    let kids: Vec<String> = (0..page_count)
        .map(|i| format!("{} 0 R", 5 + 2 * i))
        .collect();
    objects.push(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_count
        )
        .into_bytes(),
    );

    objects.push(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_vec());
    objects.push(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold >>".to_vec());

    for (page_idx, chunk) in chunks.iter().enumerate() {
        let content_id = 6 + 2 * page_idx;
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {content_id} 0 R >>"
            )
            .into_bytes(),
        );

        let mut content = Content::new();
        let table_top = if page_idx == 0 {
            letterhead(&mut content, detail, &summary, generated_at);
            580.0
        } else {
            790.0
        };
        table(&mut content, chunk, table_top);
        footer(&mut content, page_idx + 1, page_count);
        objects.push(content.into_stream_object());
    }

    Ok(assemble(objects))
}

fn letterhead(
    content: &mut Content,
    detail: &SessionDetail,
    summary: &SessionSummary,
    generated_at: DateTime<Local>,
) {
    content.text(MARGIN_X, 780.0, "F2", 18.0, "MIEN - SESSION REPORT");
    content.line(MARGIN_X, 770.0, PAGE_WIDTH - MARGIN_X, 770.0);

    content.text(
        MARGIN_X,
        748.0,
        "F1",
        10.0,
        &format!("Participant: {}", detail.info.display_name()),
    );
    content.text(
        MARGIN_X,
        733.0,
        "F1",
        10.0,
        &format!("Project: {}", non_empty(&detail.info.client_id)),
    );
    content.text(
        MARGIN_X,
        718.0,
        "F1",
        10.0,
        &format!("Recorded: {}", detail.info.created_at),
    );
    content.text(
        MARGIN_X,
        703.0,
        "F1",
        10.0,
        &format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M")),
    );

    content.text(MARGIN_X, 672.0, "F2", 11.0, "SUMMARY");
    content.text(
        MARGIN_X,
        655.0,
        "F1",
        10.0,
        &format!(
            "Duration {}s over {} samples",
            summary.duration_secs, summary.samples
        ),
    );
    content.text(
        MARGIN_X,
        640.0,
        "F1",
        10.0,
        &format!(
            "Engagement {:.0}%   Satisfaction {:.0}%   Trust {:.0}%   Loyalty {:.0}%   Opinion {:.0}%",
            summary.avg_engagement,
            summary.avg_satisfaction,
            summary.avg_trust,
            summary.avg_loyalty,
            summary.avg_opinion,
        ),
    );
    content.text(
        MARGIN_X,
        625.0,
        "F1",
        10.0,
        &format!(
            "Conviction {:.1}   Opinion band {}",
            summary.conviction,
            summary.opinion_band().token()
        ),
    );
    let dominant = summary
        .dominant_emotion
        .map(|e| e.token())
        .unwrap_or_else(|| "--".to_string());
    content.text(
        MARGIN_X,
        610.0,
        "F1",
        10.0,
        &format!("Dominant emotion {dominant}"),
    );
}

fn table(content: &mut Content, rows: &[mien_core::Measurement], top: f32) {
    for (title, x) in COLUMN_TITLES.iter().zip(COLUMNS) {
        content.text(x, top, "F2", 8.0, title);
    }
    content.line(MARGIN_X, top - 4.0, PAGE_WIDTH - MARGIN_X, top - 4.0);

    let mut y = top - ROW_HEIGHT;
    for m in rows {
        let cells = [
            format!("{}s", m.session_time),
            m.emotion.token(),
            format!("{:.1}%", m.emotion_score),
            format!("{:.0}", MetricKind::Engagement.value_of(m)),
            format!("{:.0}", MetricKind::Satisfaction.value_of(m)),
            format!("{:.0}", MetricKind::Trust.value_of(m)),
            format!("{:.0}", MetricKind::Loyalty.value_of(m)),
            format!("{:.0}", MetricKind::Opinion.value_of(m)),
        ];
        for (cell, x) in cells.iter().zip(COLUMNS) {
            content.text(x, y, "F1", 8.0, cell);
        }
        y -= ROW_HEIGHT;
    }
}

fn footer(content: &mut Content, page: usize, total: usize) {
    content.line(MARGIN_X, FOOTER_Y + 10.0, PAGE_WIDTH - MARGIN_X, FOOTER_Y + 10.0);
    content.text(
        MARGIN_X,
        FOOTER_Y,
        "F1",
        8.0,
        &format!("Mien session report - Page {page} of {total}"),
    );
}

fn non_empty(s: &str) -> &str {
    if s.is_empty() {
        "--"
    } else {
        s
    }
}

/// A page content stream under construction.
struct Content {
    ops: String,
}

impl Content {
    fn new() -> Self {
        Self { ops: String::new() }
    }

    fn text(&mut self, x: f32, y: f32, font: &str, size: f32, s: &str) {
        self.ops.push_str(&format!(
            "BT /{font} {size} Tf {x:.2} {y:.2} Td ({}) Tj ET\n",
            escape(s)
        ));
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.ops.push_str(&format!(
            "0.5 w {x1:.2} {y1:.2} m {x2:.2} {y2:.2} l S\n"
        ));
    }

    fn into_stream_object(self) -> Vec<u8> {
        format!(
            "<< /Length {} >>\nstream\n{}endstream",
            self.ops.len(),
            self.ops
        )
        .into_bytes()
    }
}

/// Escape for a PDF literal string; non-ASCII degrades to '?' to stay
/// within the built-in font encoding.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\\' => out.push_str("\\\\"),
            c if c.is_ascii_graphic() || c == ' ' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Number the objects sequentially from 1, then emit the xref table and
/// trailer with byte-accurate offsets.
fn assemble(objects: Vec<Vec<u8>>) -> Vec<u8> {
    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_pos = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_pos
        )
        .as_bytes(),
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mien_core::{Emotion, Measurement, Session};

    fn detail(rows: usize) -> SessionDetail {
        let data = (0..rows)
            .map(|i| Measurement {
                session_time: i as u64 + 1,
                emotion: Emotion::Happy,
                emotion_score: 88.0,
                engagement_val: 80.0,
                engagement_lbl: String::new(),
                satisfaction_val: 70.0,
                satisfaction_lbl: String::new(),
                trust_val: 60.0,
                trust_lbl: String::new(),
                loyalty_val: 57.0,
                loyalty_lbl: String::new(),
                opinion_val: 63.0,
                opinion_lbl: String::new(),
            })
            .collect();
        SessionDetail {
            info: Session {
                id: 1,
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                client_id: "P-01".into(),
                created_at: "2026-03-01T10:00:00Z".into(),
            },
            data,
        }
    }

    fn as_text(pdf: &[u8]) -> String {
        String::from_utf8_lossy(pdf).into_owned()
    }

    #[test]
    fn test_document_frame() {
        let pdf = render(&detail(3), Local::now()).unwrap();
        let text = as_text(&pdf);
        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("/Count 1"));
        assert!(text.contains("(Participant: Ada Lovelace)"));
    }

    #[test]
    fn test_multi_page_layout() {
        // 34 rows fit the letterhead page; 100 rows need two more pages
        let pdf = render(&detail(100), Local::now()).unwrap();
        let text = as_text(&pdf);
        assert!(text.contains("/Count 3"));
        assert!(text.contains("(Mien session report - Page 1 of 3)"));
        assert!(text.contains("(Mien session report - Page 3 of 3)"));
    }

    #[test]
    fn test_xref_offset_points_at_table() {
        let pdf = render(&detail(10), Local::now()).unwrap();
        let text = as_text(&pdf);
        let start = text.rfind("startxref\n").unwrap() + "startxref\n".len();
        let end = text[start..].find('\n').unwrap() + start;
        let offset: usize = text[start..end].trim().parse().unwrap();
        assert_eq!(&pdf[offset..offset + 4], b"xref");
    }

    #[test]
    fn test_string_escaping() {
        let mut d = detail(1);
        d.info.first_name = "A(da)".into();
        d.info.last_name = "Lo\\velace".into();
        let text = as_text(&render(&d, Local::now()).unwrap());
        assert!(text.contains("A\\(da\\)"));
        assert!(text.contains("Lo\\\\velace"));
    }

    #[test]
    fn test_empty_session_rejected() {
        assert!(matches!(
            render(&detail(0), Local::now()),
            Err(ExportError::EmptySession)
        ));
    }
}
