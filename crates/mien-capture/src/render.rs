//! Terminal rendering of the live metric snapshot.

use mien_core::{metrics, MetricsSnapshot};

/// mm:ss elapsed-time display.
pub fn format_mmss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// One-line snapshot view, overwritten in place while recording.
pub fn snapshot_line(snapshot: &MetricsSnapshot) -> String {
    let m = &snapshot.metrics;
    let status = if snapshot.is_recording { "REC" } else { "RDY" };
    let face = if snapshot.face_coords.is_some() {
        "⊙ lock"
    } else {
        "  --  "
    };
    // Prefer the backend's conviction when a variant sends one; derive it
    // from the live pair otherwise.
    let conviction = m
        .conversion
        .unwrap_or_else(|| metrics::conviction(m.engagement, m.satisfaction));
    let intensity = metrics::intensity(m.engagement, m.satisfaction, m.opinion);

    let mut line = format!(
        "[{status} {}] {:<12} {face} | eng {:>3.0} sat {:>3.0} trs {:>3.0} loy {:>3.0} opi {:>3.0} int {:>3.0} | conviction {:>5.1}",
        format_mmss(snapshot.session_time),
        snapshot.emotion.display(),
        m.engagement,
        m.satisfaction,
        m.trust,
        m.loyalty,
        m.opinion,
        intensity,
        conviction,
    );
    if let Some(lbl) = &m.lbl_conv {
        line.push_str(&format!(" ({lbl})"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use mien_core::{Emotion, FaceBox, MetricSet};

    fn snapshot(recording: bool, conversion: Option<f64>) -> MetricsSnapshot {
        MetricsSnapshot {
            session_time: 75,
            is_recording: recording,
            face_coords: Some(FaceBox {
                x: 1.0,
                y: 2.0,
                w: 3.0,
                h: 4.0,
            }),
            emotion: Emotion::Happy,
            metrics: MetricSet {
                engagement: 80.0,
                satisfaction: 30.0,
                trust: 50.0,
                loyalty: 50.0,
                opinion: 50.0,
                conversion,
                lbl_conv: None,
            },
        }
    }

    #[test]
    fn test_format_mmss() {
        assert_eq!(format_mmss(0), "00:00");
        assert_eq!(format_mmss(75), "01:15");
        assert_eq!(format_mmss(600), "10:00");
    }

    #[test]
    fn test_snapshot_line_derives_conviction() {
        // satisfaction 30 < 45 → conviction = 80 * 0.1
        let line = snapshot_line(&snapshot(true, None));
        assert!(line.contains("REC 01:15"));
        assert!(line.contains("conviction   8.0"));
        assert!(line.contains("JOY"));
    }

    #[test]
    fn test_snapshot_line_prefers_backend_conviction() {
        let line = snapshot_line(&snapshot(false, Some(42.5)));
        assert!(line.contains("RDY"));
        assert!(line.contains("conviction  42.5"));
    }

    #[test]
    fn test_snapshot_line_shows_intensity_and_label() {
        let mut snap = snapshot(true, None);
        snap.metrics.lbl_conv = Some("Analysing".into());
        // intensity = (80 + 30 + 50) / 3
        let line = snapshot_line(&snap);
        assert!(line.contains("int  53"));
        assert!(line.ends_with("(Analysing)"));
    }
}
