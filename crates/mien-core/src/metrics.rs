//! Derived audience metrics.
//!
//! Converts a stream of per-second measurements into the summary
//! indicators the dashboards show: plain averages, the piecewise
//! conviction score, dominant-emotion tallies and opinion banding.
//! Every function here is total over its numeric domain.

use crate::types::{Emotion, Measurement, MetricKind};
use indexmap::IndexMap;

/// Below this satisfaction, conviction collapses to a tenth of engagement:
/// an engaged-but-dissatisfied viewer is not convinced.
const CONVICTION_SATISFACTION_FLOOR: f64 = 45.0;
const CONVICTION_CAPPED_WEIGHT: f64 = 0.1;
const CONVICTION_ENGAGEMENT_WEIGHT: f64 = 0.4;
const CONVICTION_SATISFACTION_WEIGHT: f64 = 0.6;

const OPINION_POSITIVE_ABOVE: f64 = 60.0;
const OPINION_NEGATIVE_BELOW: f64 = 40.0;

/// Arithmetic mean; 0.0 for an empty sequence.
///
/// No outlier rejection, no weighting by recency.
pub fn average(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Mean of one named metric across a session's measurements.
pub fn average_of(measurements: &[Measurement], kind: MetricKind) -> f64 {
    average(measurements.iter().map(|m| kind.value_of(m)))
}

/// Conviction score from engagement and satisfaction.
///
/// Two-branch piecewise: low satisfaction caps conviction near zero
/// regardless of engagement; otherwise a 40/60 weighted blend.
/// The coefficients are fixed, not configurable.
pub fn conviction(engagement: f64, satisfaction: f64) -> f64 {
    if satisfaction < CONVICTION_SATISFACTION_FLOOR {
        engagement * CONVICTION_CAPPED_WEIGHT
    } else {
        engagement * CONVICTION_ENGAGEMENT_WEIGHT + satisfaction * CONVICTION_SATISFACTION_WEIGHT
    }
}

/// Most frequent emotion across a set of measurements.
///
/// The tally map preserves insertion order, so ties resolve
/// first-encountered-wins. `None` for an empty input.
pub fn dominant_emotion(emotions: impl IntoIterator<Item = Emotion>) -> Option<Emotion> {
    let mut tally: IndexMap<Emotion, usize> = IndexMap::new();
    for e in emotions {
        *tally.entry(e).or_insert(0) += 1;
    }

    let mut best: Option<(Emotion, usize)> = None;
    for (emotion, count) in &tally {
        match best {
            Some((_, best_count)) if *count <= best_count => {}
            _ => best = Some((*emotion, *count)),
        }
    }
    best.map(|(e, _)| e)
}

/// Emotional intensity: mean of engagement, satisfaction and opinion.
/// Computed per live snapshot on the capture side and per measurement
/// when charted.
pub fn intensity(engagement: f64, satisfaction: f64, opinion: f64) -> f64 {
    (engagement + satisfaction + opinion) / 3.0
}

/// Fixed three-band bucketing of a 0–100 opinion score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpinionBand {
    Positive,
    Neutral,
    Negative,
}

impl OpinionBand {
    /// `> 60` positive, `< 40` negative, neutral between.
    pub fn from_score(score: f64) -> OpinionBand {
        if score > OPINION_POSITIVE_ABOVE {
            OpinionBand::Positive
        } else if score < OPINION_NEGATIVE_BELOW {
            OpinionBand::Negative
        } else {
            OpinionBand::Neutral
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OpinionBand::Positive => "Positive",
            OpinionBand::Neutral => "Undecided",
            OpinionBand::Negative => "Negative",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            OpinionBand::Positive => "👍",
            OpinionBand::Neutral => "•",
            OpinionBand::Negative => "👎",
        }
    }

    /// Short token for exports: POS / NEU / NEG.
    pub fn token(&self) -> &'static str {
        match self {
            OpinionBand::Positive => "POS",
            OpinionBand::Neutral => "NEU",
            OpinionBand::Negative => "NEG",
        }
    }
}

/// On-demand summary of one session. Never persisted.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub samples: usize,
    pub duration_secs: u64,
    pub avg_engagement: f64,
    pub avg_satisfaction: f64,
    pub avg_trust: f64,
    pub avg_loyalty: f64,
    pub avg_opinion: f64,
    /// Conviction over the averaged engagement and satisfaction.
    pub conviction: f64,
    pub dominant_emotion: Option<Emotion>,
}

impl SessionSummary {
    pub fn from_measurements(measurements: &[Measurement]) -> SessionSummary {
        let avg_engagement = average_of(measurements, MetricKind::Engagement);
        let avg_satisfaction = average_of(measurements, MetricKind::Satisfaction);
        SessionSummary {
            samples: measurements.len(),
            duration_secs: measurements.last().map(|m| m.session_time).unwrap_or(0),
            avg_engagement,
            avg_satisfaction,
            avg_trust: average_of(measurements, MetricKind::Trust),
            avg_loyalty: average_of(measurements, MetricKind::Loyalty),
            avg_opinion: average_of(measurements, MetricKind::Opinion),
            conviction: conviction(avg_engagement, avg_satisfaction),
            dominant_emotion: dominant_emotion(measurements.iter().map(|m| m.emotion)),
        }
    }

    /// Band of the averaged opinion score.
    pub fn opinion_band(&self) -> OpinionBand {
        OpinionBand::from_score(self.avg_opinion)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::Emotion;

    /// Measurement with the given offset, engagement and satisfaction;
    /// remaining metrics pinned mid-scale.
    pub(crate) fn measurement(session_time: u64, engagement: f64, satisfaction: f64) -> Measurement {
        Measurement {
            session_time,
            emotion: Emotion::Neutral,
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

    #[test]
    fn test_average_empty_is_zero() {
        assert_eq!(average(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_average_two_values() {
        assert_eq!(average([10.0, 20.0]), 15.0);
    }

    #[test]
    fn test_average_of_metric() {
        let ms = vec![measurement(1, 40.0, 0.0), measurement(2, 60.0, 0.0)];
        assert_eq!(average_of(&ms, MetricKind::Engagement), 50.0);
    }

    #[test]
    fn test_conviction_capped_by_low_satisfaction() {
        // satisfaction < 45 caps conviction at a tenth of engagement
        assert!((conviction(80.0, 30.0) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_conviction_weighted_blend() {
        assert!((conviction(80.0, 70.0) - 74.0).abs() < 1e-9);
    }

    #[test]
    fn test_conviction_branch_boundary() {
        // exactly at the floor the blend branch applies
        assert!((conviction(80.0, 45.0) - (80.0 * 0.4 + 45.0 * 0.6)).abs() < 1e-9);
    }

    #[test]
    fn test_dominant_emotion_majority() {
        let dominant =
            dominant_emotion([Emotion::Happy, Emotion::Happy, Emotion::Sad]);
        assert_eq!(dominant, Some(Emotion::Happy));
    }

    #[test]
    fn test_dominant_emotion_tie_first_encountered_wins() {
        let dominant = dominant_emotion([Emotion::Sad, Emotion::Happy]);
        assert_eq!(dominant, Some(Emotion::Sad));
    }

    #[test]
    fn test_dominant_emotion_empty() {
        assert_eq!(dominant_emotion(std::iter::empty()), None);
    }

    #[test]
    fn test_opinion_bands() {
        assert_eq!(OpinionBand::from_score(65.0), OpinionBand::Positive);
        assert_eq!(OpinionBand::from_score(35.0), OpinionBand::Negative);
        assert_eq!(OpinionBand::from_score(50.0), OpinionBand::Neutral);
        // band edges are inclusive of neutral
        assert_eq!(OpinionBand::from_score(60.0), OpinionBand::Neutral);
        assert_eq!(OpinionBand::from_score(40.0), OpinionBand::Neutral);
    }

    #[test]
    fn test_intensity_mean_of_three() {
        assert!((intensity(90.0, 60.0, 30.0) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_over_session() {
        let ms = vec![
            measurement(1, 80.0, 70.0),
            measurement(2, 80.0, 70.0),
            measurement(3, 80.0, 70.0),
        ];
        let summary = SessionSummary::from_measurements(&ms);
        assert_eq!(summary.samples, 3);
        assert_eq!(summary.duration_secs, 3);
        assert!((summary.avg_engagement - 80.0).abs() < 1e-9);
        assert!((summary.conviction - 74.0).abs() < 1e-9);
        assert_eq!(summary.dominant_emotion, Some(Emotion::Neutral));
    }

    #[test]
    fn test_summary_empty_session() {
        let summary = SessionSummary::from_measurements(&[]);
        assert_eq!(summary.samples, 0);
        assert_eq!(summary.duration_secs, 0);
        assert_eq!(summary.avg_engagement, 0.0);
        // empty averages fall in the capped branch: 0 * 0.1
        assert_eq!(summary.conviction, 0.0);
        assert_eq!(summary.dominant_emotion, None);
    }
}
