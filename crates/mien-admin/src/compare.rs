//! Group comparison across sessions.
//!
//! Fetches every requested session concurrently and joins all-or-nothing:
//! a single failed request rejects the whole batch, there is no
//! partial-result handling. The reduction itself is synchronous.

use futures_util::future::try_join_all;
use mien_client::{ApiError, RestClient};
use mien_core::{metrics, Emotion, Session, SessionDetail, SessionSummary};

/// One compared session with its on-demand summary.
pub struct GroupEntry {
    pub session: Session,
    pub summary: SessionSummary,
}

/// The comparison result: per-session summaries plus the dominant
/// emotion tallied across every measurement in the group.
pub struct GroupReport {
    pub entries: Vec<GroupEntry>,
    pub dominant_emotion: Option<Emotion>,
}

/// Fetch all requested sessions concurrently, all-or-nothing.
pub async fn fetch_details(
    client: &RestClient,
    ids: &[i64],
) -> Result<Vec<SessionDetail>, ApiError> {
    try_join_all(ids.iter().map(|id| client.session_detail(*id))).await
}

/// Reduce fetched sessions into the group report.
pub fn group_report(details: Vec<SessionDetail>) -> GroupReport {
    let dominant_emotion = metrics::dominant_emotion(
        details
            .iter()
            .flat_map(|d| d.data.iter().map(|m| m.emotion)),
    );
    let entries = details
        .into_iter()
        .map(|d| GroupEntry {
            summary: SessionSummary::from_measurements(&d.data),
            session: d.info,
        })
        .collect();
    GroupReport {
        entries,
        dominant_emotion,
    }
}

/// Render the comparison as a table plus the group verdict line.
pub fn report_table(report: &GroupReport) -> String {
    let mut out = format!(
        "{:>6}  {:<24} {:>8} {:>8} {:>10} {:>10}\n",
        "ID", "PARTICIPANT", "ENG", "SAT", "CONVICTION", "DURATION"
    );
    for entry in &report.entries {
        out.push_str(&format!(
            "{:>6}  {:<24} {:>7.0}% {:>7.0}% {:>10.1} {:>9}s\n",
            entry.session.id,
            entry.session.display_name(),
            entry.summary.avg_engagement,
            entry.summary.avg_satisfaction,
            entry.summary.conviction,
            entry.summary.duration_secs,
        ));
    }
    let dominant = report
        .dominant_emotion
        .map(|e| e.display().to_string())
        .unwrap_or_else(|| "--".to_string());
    out.push_str(&format!("group dominant emotion: {dominant}\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mien_core::{Measurement, Session};

    fn measurement(emotion: Emotion, engagement: f64, satisfaction: f64) -> Measurement {
        Measurement {
            session_time: 1,
            emotion,
            emotion_score: 90.0,
            engagement_val: engagement,
            engagement_lbl: String::new(),
            satisfaction_val: satisfaction,
            satisfaction_lbl: String::new(),
            trust_val: 50.0,
            trust_lbl: String::new(),
            loyalty_val: 50.0,
            loyalty_lbl: String::new(),
            opinion_val: 50.0,
            opinion_lbl: String::new(),
        }
    }

    fn detail(id: i64, measurements: Vec<Measurement>) -> SessionDetail {
        SessionDetail {
            info: Session {
                id,
                first_name: format!("P{id}"),
                last_name: "Test".into(),
                client_id: String::new(),
                created_at: "2026-03-01T10:00:00Z".into(),
            },
            data: measurements,
        }
    }

    #[test]
    fn test_group_dominant_spans_sessions() {
        let report = group_report(vec![
            detail(1, vec![measurement(Emotion::Sad, 50.0, 50.0)]),
            detail(
                2,
                vec![
                    measurement(Emotion::Happy, 50.0, 50.0),
                    measurement(Emotion::Happy, 50.0, 50.0),
                ],
            ),
        ]);
        assert_eq!(report.dominant_emotion, Some(Emotion::Happy));
        assert_eq!(report.entries.len(), 2);
    }

    #[test]
    fn test_group_tie_resolves_to_first_session_order() {
        let report = group_report(vec![
            detail(1, vec![measurement(Emotion::Sad, 50.0, 50.0)]),
            detail(2, vec![measurement(Emotion::Happy, 50.0, 50.0)]),
        ]);
        // equal counts: the emotion encountered first wins
        assert_eq!(report.dominant_emotion, Some(Emotion::Sad));
    }

    #[test]
    fn test_report_table_contains_summaries() {
        let report = group_report(vec![detail(
            9,
            vec![measurement(Emotion::Happy, 80.0, 70.0)],
        )]);
        let table = report_table(&report);
        assert!(table.contains("P9 Test"));
        assert!(table.contains("74.0"));
        assert!(table.contains("JOY"));
    }
}
