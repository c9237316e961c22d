use serde::{Deserialize, Serialize};

/// A stored capture session, as returned by the collection endpoints.
///
/// Created by the backend when a capture run starts; immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Project code entered on the capture form.
    pub client_id: String,
    /// Creation timestamp as the backend formats it (RFC 3339).
    pub created_at: String,
}

impl Session {
    /// "First Last" for tables and export file names.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One per-second measurement within a session.
///
/// Metric values arrive clamped to [0,100] by the inference backend; the
/// clients display and average them without re-validating the range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    /// Seconds since the session started recording.
    pub session_time: u64,
    pub emotion: Emotion,
    /// Confidence of the dominant emotion, 0–100.
    pub emotion_score: f64,
    pub engagement_val: f64,
    pub engagement_lbl: String,
    pub satisfaction_val: f64,
    pub satisfaction_lbl: String,
    pub trust_val: f64,
    pub trust_lbl: String,
    pub loyalty_val: f64,
    pub loyalty_lbl: String,
    pub opinion_val: f64,
    pub opinion_lbl: String,
}

/// Detail payload of `GET /api/sessions/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetail {
    pub info: Session,
    pub data: Vec<Measurement>,
}

/// Emotion label emitted by the inference backend.
///
/// Labels outside the known set collapse to [`Emotion::Unknown`] rather
/// than failing the decode — the channel keeps delivering whatever the
/// backend's model vocabulary grows into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Surprise,
    Fear,
    Disgust,
    Neutral,
    Unknown,
}

impl Emotion {
    pub fn from_label(label: &str) -> Emotion {
        match label.to_ascii_lowercase().as_str() {
            "happy" => Emotion::Happy,
            "sad" => Emotion::Sad,
            "angry" => Emotion::Angry,
            "surprise" => Emotion::Surprise,
            "fear" => Emotion::Fear,
            "disgust" => Emotion::Disgust,
            "neutral" => Emotion::Neutral,
            _ => Emotion::Unknown,
        }
    }

    /// Wire label, lowercase.
    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Surprise => "surprise",
            Emotion::Fear => "fear",
            Emotion::Disgust => "disgust",
            Emotion::Neutral => "neutral",
            Emotion::Unknown => "unknown",
        }
    }

    /// Upper-cased token for tables and CSV cells.
    pub fn token(&self) -> String {
        self.label().to_ascii_uppercase()
    }

    /// Display phrase with a glyph, for the live snapshot view.
    pub fn display(&self) -> &'static str {
        match self {
            Emotion::Happy => "😄 JOY",
            Emotion::Sad => "😢 SADNESS",
            Emotion::Angry => "😠 ANGER",
            Emotion::Surprise => "😲 SURPRISE",
            Emotion::Fear => "😨 FEAR",
            Emotion::Disgust => "🤢 DISGUST",
            Emotion::Neutral => "😐 NEUTRAL",
            Emotion::Unknown => "❓ UNKNOWN",
        }
    }
}

impl From<String> for Emotion {
    fn from(label: String) -> Self {
        Emotion::from_label(&label)
    }
}

impl From<Emotion> for String {
    fn from(emotion: Emotion) -> Self {
        emotion.label().to_string()
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display())
    }
}

/// Detected-face rectangle in frame coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// The live metric set carried by a `metrics_update` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSet {
    pub engagement: f64,
    pub satisfaction: f64,
    pub trust: f64,
    pub loyalty: f64,
    pub opinion: f64,
    /// Backend-computed conviction, when the deployed variant sends one.
    #[serde(default)]
    pub conversion: Option<f64>,
    #[serde(default)]
    pub lbl_conv: Option<String>,
}

/// One realtime update from the backend, rendered as received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub session_time: u64,
    pub is_recording: bool,
    #[serde(default)]
    pub face_coords: Option<FaceBox>,
    pub emotion: Emotion,
    pub metrics: MetricSet,
}

/// The five independent 0–100 metrics carried by every measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Engagement,
    Satisfaction,
    Trust,
    Loyalty,
    Opinion,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Engagement,
        MetricKind::Satisfaction,
        MetricKind::Trust,
        MetricKind::Loyalty,
        MetricKind::Opinion,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::Engagement => "Engagement",
            MetricKind::Satisfaction => "Satisfaction",
            MetricKind::Trust => "Trust",
            MetricKind::Loyalty => "Loyalty",
            MetricKind::Opinion => "Opinion",
        }
    }

    /// Value of this metric in a measurement.
    pub fn value_of(&self, m: &Measurement) -> f64 {
        match self {
            MetricKind::Engagement => m.engagement_val,
            MetricKind::Satisfaction => m.satisfaction_val,
            MetricKind::Trust => m.trust_val,
            MetricKind::Loyalty => m.loyalty_val,
            MetricKind::Opinion => m.opinion_val,
        }
    }

    /// Backend-produced display label of this metric in a measurement.
    pub fn label_of<'a>(&self, m: &'a Measurement) -> &'a str {
        match self {
            MetricKind::Engagement => &m.engagement_lbl,
            MetricKind::Satisfaction => &m.satisfaction_lbl,
            MetricKind::Trust => &m.trust_lbl,
            MetricKind::Loyalty => &m.loyalty_lbl,
            MetricKind::Opinion => &m.opinion_lbl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emotion_round_trip() {
        let e: Emotion = serde_json::from_str("\"happy\"").unwrap();
        assert_eq!(e, Emotion::Happy);
        assert_eq!(serde_json::to_string(&e).unwrap(), "\"happy\"");
    }

    #[test]
    fn test_emotion_unknown_label() {
        let e: Emotion = serde_json::from_str("\"contempt\"").unwrap();
        assert_eq!(e, Emotion::Unknown);
        assert_eq!(e.token(), "UNKNOWN");
    }

    #[test]
    fn test_snapshot_decodes_without_optional_fields() {
        let json = r#"{
            "session_time": 12,
            "is_recording": true,
            "emotion": "surprise",
            "metrics": {
                "engagement": 80.0,
                "satisfaction": 55.0,
                "trust": 60.0,
                "loyalty": 57.0,
                "opinion": 55.0
            }
        }"#;
        let snap: MetricsSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.session_time, 12);
        assert!(snap.face_coords.is_none());
        assert!(snap.metrics.conversion.is_none());
        assert_eq!(snap.emotion, Emotion::Surprise);
    }

    #[test]
    fn test_display_name() {
        let session = Session {
            id: 1,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            client_id: "P-01".into(),
            created_at: "2026-03-01T10:00:00Z".into(),
        };
        assert_eq!(session.display_name(), "Ada Lovelace");
    }
}
