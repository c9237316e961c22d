//! mien-core — Session data model and derived audience metrics.
//!
//! The inference backend produces per-second emotion measurements; this
//! crate holds the shapes those measurements travel in (REST payloads and
//! realtime channel snapshots) and the client-side summary calculations
//! layered on top of them.

pub mod metrics;
pub mod types;

pub use metrics::{OpinionBand, SessionSummary};
pub use types::{
    Emotion, FaceBox, Measurement, MetricKind, MetricSet, MetricsSnapshot, Session, SessionDetail,
};
