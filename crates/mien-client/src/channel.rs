//! Realtime channel to the inference backend.
//!
//! JSON events over a WebSocket. The capture client emits
//! `start_session` / `process_frame` / `stop_session`; the backend
//! pushes `metrics_update` events that can arrive at any time relative
//! to controller state.
//!
//! Frame emission is fire-and-forget through an explicit bounded queue:
//! when the transport cannot drain fast enough the newest frame is
//! dropped (and counted) instead of queueing without limit. The next
//! pump tick replaces a dropped frame 200 ms later anyway.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use futures_util::{SinkExt, StreamExt};
use mien_core::MetricsSnapshot;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message;

/// Depth of the outbound event queue. At the 200 ms frame cadence this
/// absorbs ~1.6 s of backend stall before frames start dropping.
const OUTBOUND_QUEUE_DEPTH: usize = 8;

/// Depth of the inbound snapshot queue toward the controller.
const INBOUND_QUEUE_DEPTH: usize = 32;

#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("connect failed: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("channel closed")]
    Closed,
}

/// Participant identity sent with `start_session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    pub first_name: String,
    pub last_name: String,
    /// Project code; may be empty.
    pub client_id: String,
}

/// Events this client emits.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
enum ClientEvent {
    StartSession(ParticipantInfo),
    /// Base64 JPEG data URI of the current frame.
    ProcessFrame(String),
    StopSession,
}

/// Events the backend emits.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
enum ServerEvent {
    MetricsUpdate(MetricsSnapshot),
}

/// Connector for the realtime channel.
pub struct ChannelClient;

impl ChannelClient {
    /// Connect and split the socket into a writer handle and an inbound
    /// snapshot stream.
    ///
    /// The reader task ends (closing the snapshot stream) when the peer
    /// closes or the transport errors; the writer task ends when the
    /// handle is dropped.
    pub async fn connect(
        url: &str,
    ) -> Result<(ChannelHandle, mpsc::Receiver<MetricsSnapshot>), ChannelError> {
        let (socket, response) = connect_async(url).await?;
        tracing::info!(url, status = %response.status(), "realtime channel connected");

        let (mut write, mut read) = socket.split();
        let (event_tx, mut event_rx) = mpsc::channel::<ClientEvent>(OUTBOUND_QUEUE_DEPTH);
        let (update_tx, update_rx) = mpsc::channel::<MetricsSnapshot>(INBOUND_QUEUE_DEPTH);

        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to encode channel event");
                        continue;
                    }
                };
                if let Err(e) = write.send(Message::Text(text)).await {
                    tracing::warn!(error = %e, "channel send failed");
                    break;
                }
            }
            let _ = write.send(Message::Close(None)).await;
            tracing::debug!("channel writer task exiting");
        });

        tokio::spawn(async move {
            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ServerEvent>(&text) {
                        Ok(ServerEvent::MetricsUpdate(snapshot)) => {
                            if update_tx.send(snapshot).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::debug!(error = %e, "ignoring unrecognized channel event");
                        }
                    },
                    Ok(Message::Close(frame)) => {
                        tracing::info!(?frame, "channel closed by backend");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "channel read error");
                        break;
                    }
                }
            }
            tracing::debug!("channel reader task exiting");
        });

        Ok((
            ChannelHandle {
                tx: event_tx,
                dropped_frames: Arc::new(AtomicU64::new(0)),
            },
            update_rx,
        ))
    }
}

/// Clone-safe writer handle for the realtime channel.
#[derive(Clone)]
pub struct ChannelHandle {
    tx: mpsc::Sender<ClientEvent>,
    dropped_frames: Arc<AtomicU64>,
}

impl ChannelHandle {
    /// Announce session start for the given participant.
    pub async fn start_session(&self, participant: ParticipantInfo) -> Result<(), ChannelError> {
        self.tx
            .send(ClientEvent::StartSession(participant))
            .await
            .map_err(|_| ChannelError::Closed)
    }

    /// Announce session end.
    pub async fn stop_session(&self) -> Result<(), ChannelError> {
        self.tx
            .send(ClientEvent::StopSession)
            .await
            .map_err(|_| ChannelError::Closed)
    }

    /// Queue one encoded frame, fire-and-forget.
    ///
    /// Returns `Ok(false)` when the bounded queue was full and the frame
    /// was dropped (drop-newest). `Err(Closed)` means the channel is gone
    /// and the caller should stop pumping.
    pub fn push_frame(&self, jpeg: &[u8]) -> Result<bool, ChannelError> {
        let event = ClientEvent::ProcessFrame(jpeg_data_uri(jpeg));
        match self.tx.try_send(event) {
            Ok(()) => Ok(true),
            Err(mpsc::error::TrySendError::Full(_)) => {
                let dropped = self.dropped_frames.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::debug!(dropped, "outbound queue full, dropping frame");
                Ok(false)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(ChannelError::Closed),
        }
    }

    /// Total frames dropped by queue backpressure so far.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames.load(Ordering::Relaxed)
    }
}

/// Wrap an encoded JPEG as the `data:` URI the backend expects.
fn jpeg_data_uri(jpeg: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", BASE64.encode(jpeg))
}
