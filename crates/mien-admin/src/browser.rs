//! Session browsing: client-side filtering and table rendering.
//!
//! The backend always returns the full collection; filtering is an
//! in-memory substring match, mirroring how the list is meant to be
//! used (tens of demo sessions, not thousands).

use chrono::DateTime;
use mien_core::{Measurement, MetricKind, Session, SessionSummary};

/// Case-insensitive substring filter over participant name and session id.
pub fn filter_sessions<'a>(sessions: &'a [Session], query: &str) -> Vec<&'a Session> {
    let needle = query.to_lowercase();
    sessions
        .iter()
        .filter(|s| {
            s.display_name().to_lowercase().contains(&needle)
                || s.id.to_string().contains(&needle)
        })
        .collect()
}

/// "dd/mm hh:mm" like the dashboards show, or the raw string when the
/// backend sends something unparseable.
pub fn format_created_at(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.format("%d/%m %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Render the session list as a table.
pub fn session_table(sessions: &[&Session]) -> String {
    let mut out = format!(
        "{:>6}  {:<24} {:<10} {}\n",
        "ID", "PARTICIPANT", "PROJECT", "CREATED"
    );
    for s in sessions {
        out.push_str(&format!(
            "{:>6}  {:<24} {:<10} {}\n",
            s.id,
            s.display_name(),
            s.client_id,
            format_created_at(&s.created_at),
        ));
    }
    out
}

/// Render one session's summary block.
pub fn summary_block(session: &Session, summary: &SessionSummary) -> String {
    let dominant = summary
        .dominant_emotion
        .map(|e| e.display().to_string())
        .unwrap_or_else(|| "--".to_string());
    let band = summary.opinion_band();
    format!(
        "session #{} — {} ({})\n\
         created      {}\n\
         duration     {}s over {} samples\n\
         engagement   {:.0}%\n\
         satisfaction {:.0}%\n\
         trust        {:.0}%\n\
         loyalty      {:.0}%\n\
         opinion      {:.0}%  {} {}\n\
         conviction   {:.1}\n\
         dominant     {}\n",
        session.id,
        session.display_name(),
        session.client_id,
        format_created_at(&session.created_at),
        summary.duration_secs,
        summary.samples,
        summary.avg_engagement,
        summary.avg_satisfaction,
        summary.avg_trust,
        summary.avg_loyalty,
        summary.avg_opinion,
        band.glyph(),
        band.label(),
        summary.conviction,
        dominant,
    )
}

/// Render the full measurement history as a table. The trailing column
/// carries the backend's engagement label, as the dashboard table does.
pub fn measurement_table(measurements: &[Measurement]) -> String {
    let mut out = format!(
        "{:>5}  {:<10} {:>6}  {:>4} {:>4} {:>4} {:>4} {:>4}  {}\n",
        "TIME", "EMOTION", "SCORE", "ENG", "SAT", "TRS", "LOY", "OPI", "LABEL"
    );
    for m in measurements {
        out.push_str(&format!(
            "{:>4}s  {:<10} {:>5.1}%  {:>4.0} {:>4.0} {:>4.0} {:>4.0} {:>4.0}  {}\n",
            m.session_time,
            m.emotion.token(),
            m.emotion_score,
            MetricKind::Engagement.value_of(m),
            MetricKind::Satisfaction.value_of(m),
            MetricKind::Trust.value_of(m),
            MetricKind::Loyalty.value_of(m),
            MetricKind::Opinion.value_of(m),
            MetricKind::Engagement.label_of(m),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: i64, first: &str, last: &str) -> Session {
        Session {
            id,
            first_name: first.into(),
            last_name: last.into(),
            client_id: "P-01".into(),
            created_at: "2026-03-01T10:30:00Z".into(),
        }
    }

    #[test]
    fn test_filter_matches_name_case_insensitive() {
        let sessions = vec![session(1, "Ada", "Lovelace"), session(2, "Alan", "Turing")];
        let hits = filter_sessions(&sessions, "lovelace");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
    }

    #[test]
    fn test_filter_matches_id_substring() {
        let sessions = vec![session(17, "Ada", "Lovelace"), session(42, "Alan", "Turing")];
        let hits = filter_sessions(&sessions, "4");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 42);
    }

    #[test]
    fn test_filter_empty_query_keeps_all() {
        let sessions = vec![session(1, "Ada", "Lovelace"), session(2, "Alan", "Turing")];
        assert_eq!(filter_sessions(&sessions, "").len(), 2);
    }

    #[test]
    fn test_format_created_at() {
        assert_eq!(format_created_at("2026-03-01T10:30:00Z"), "01/03 10:30");
        // unparseable timestamps pass through untouched
        assert_eq!(format_created_at("yesterday"), "yesterday");
    }

    #[test]
    fn test_session_table_lists_rows() {
        let sessions = vec![session(7, "Ada", "Lovelace")];
        let refs: Vec<&Session> = sessions.iter().collect();
        let table = session_table(&refs);
        assert!(table.contains("Ada Lovelace"));
        assert!(table.contains("P-01"));
        assert!(table.lines().count() == 2);
    }
}
