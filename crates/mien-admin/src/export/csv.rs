//! CSV export, spreadsheet-locale flavoured.
//!
//! Semicolon separated with a UTF-8 byte-order mark so desktop
//! spreadsheet imports pick the right encoding and column split, and
//! decimal commas so the score column survives locales that treat a
//! plain point as a thousands separator.

use crate::export::ExportError;
use mien_core::{MetricKind, SessionDetail};

const SEPARATOR: char = ';';
const BOM: char = '\u{feff}';

const HEADER: [&str; 8] = [
    "Time (s)",
    "Emotion",
    "AI Score",
    "Engagement",
    "Satisfaction",
    "Trust",
    "Loyalty",
    "Opinion",
];

/// Render one session's measurements as a CSV text blob.
pub fn render(detail: &SessionDetail) -> Result<String, ExportError> {
    if detail.data.is_empty() {
        return Err(ExportError::EmptySession);
    }

    let mut out = String::new();
    out.push(BOM);
    out.push_str(&HEADER.join(&SEPARATOR.to_string()));
    out.push('\n');

    for m in &detail.data {
        let cells = [
            m.session_time.to_string(),
            m.emotion.token(),
            decimal_comma(m.emotion_score),
            rounded(MetricKind::Engagement.value_of(m)),
            rounded(MetricKind::Satisfaction.value_of(m)),
            rounded(MetricKind::Trust.value_of(m)),
            rounded(MetricKind::Loyalty.value_of(m)),
            rounded(MetricKind::Opinion.value_of(m)),
        ];
        out.push_str(&cells.join(&SEPARATOR.to_string()));
        out.push('\n');
    }
    Ok(out)
}

/// One decimal place, comma separator.
fn decimal_comma(value: f64) -> String {
    format!("{value:.1}").replace('.', ",")
}

fn rounded(value: f64) -> String {
    format!("{}", value.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mien_core::{Emotion, Measurement, Session};

    fn detail() -> SessionDetail {
        SessionDetail {
            info: Session {
                id: 1,
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                client_id: "P-01".into(),
                created_at: "2026-03-01T10:00:00Z".into(),
            },
            data: vec![Measurement {
                session_time: 1,
                emotion: Emotion::Happy,
                emotion_score: 87.5,
                engagement_val: 80.4,
                engagement_lbl: "Strong engagement".into(),
                satisfaction_val: 70.0,
                satisfaction_lbl: "Very satisfied".into(),
                trust_val: 60.0,
                trust_lbl: String::new(),
                loyalty_val: 57.0,
                loyalty_lbl: String::new(),
                opinion_val: 63.0,
                opinion_lbl: String::new(),
            }],
        }
    }

    #[test]
    fn test_leading_bom_and_header() {
        let csv = render(&detail()).unwrap();
        assert!(csv.starts_with('\u{feff}'));
        assert!(csv.contains("Time (s);Emotion;AI Score;Engagement"));
    }

    #[test]
    fn test_row_uses_comma_decimals_and_rounding() {
        let csv = render(&detail()).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "1;HAPPY;87,5;80;70;60;57;63");
    }

    #[test]
    fn test_numeric_fields_round_trip() {
        let csv = render(&detail()).unwrap();
        let row = csv.lines().nth(1).unwrap();
        let cells: Vec<&str> = row.split(';').collect();
        assert_eq!(cells.len(), 8);
        let score: f64 = cells[2].replace(',', ".").parse().unwrap();
        assert!((score - 87.5).abs() < 1e-9);
        let engagement: i64 = cells[3].parse().unwrap();
        assert_eq!(engagement, 80);
    }

    #[test]
    fn test_empty_session_rejected() {
        let mut d = detail();
        d.data.clear();
        assert!(matches!(render(&d), Err(ExportError::EmptySession)));
    }
}
