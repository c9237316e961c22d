//! Live session controller.
//!
//! Four states: idle (identity collected, no camera) → armed (camera
//! acquired and warmed up, channel connected, not sending) → recording
//! (frame pump running, elapsed counter live) → stopped (camera
//! released, final snapshot retained). Sessions run until stopped
//! explicitly; there is no automatic timeout, and stop is terminal for
//! the camera — `reset` is the way back to armed while recording.

use crate::pump::{PumpError, PumpHandle};
use mien_client::{ChannelError, ChannelHandle, ParticipantInfo};
use mien_core::MetricsSnapshot;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("realtime channel error: {0}")]
    Channel(#[from] ChannelError),
    #[error("frame pump error: {0}")]
    Pump(#[from] PumpError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Armed,
    Recording,
    Stopped,
}

/// Drives the capture session: state transitions, backend notification,
/// and the most recent metric snapshot.
pub struct CaptureController {
    state: CaptureState,
    participant: ParticipantInfo,
    channel: Option<ChannelHandle>,
    /// Present while the camera is held; taken on stop/teardown so the
    /// device lock is provably released on every exit path.
    pump: Option<PumpHandle>,
    last_snapshot: Option<MetricsSnapshot>,
}

impl CaptureController {
    /// Idle: identity collected, camera not yet acquired.
    pub fn new(participant: ParticipantInfo) -> Self {
        Self {
            state: CaptureState::Idle,
            participant,
            channel: None,
            pump: None,
            last_snapshot: None,
        }
    }

    /// Idle → armed, once the camera grant succeeded and the channel is up.
    pub fn arm(&mut self, channel: ChannelHandle, pump: PumpHandle) {
        self.channel = Some(channel);
        self.pump = Some(pump);
        self.state = CaptureState::Armed;
        tracing::info!("armed");
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn last_snapshot(&self) -> Option<&MetricsSnapshot> {
        self.last_snapshot.as_ref()
    }

    /// Armed → recording: reset the elapsed counter, announce session
    /// start, begin pumping frames.
    pub async fn start(&mut self) -> Result<(), ControllerError> {
        match self.state {
            CaptureState::Armed => {}
            CaptureState::Recording => {
                tracing::debug!("start ignored, already recording");
                return Ok(());
            }
            CaptureState::Idle | CaptureState::Stopped => {
                tracing::debug!(state = ?self.state, "start ignored, camera not armed");
                return Ok(());
            }
        }
        let (Some(channel), Some(pump)) = (&self.channel, &self.pump) else {
            return Ok(());
        };
        self.last_snapshot = None;
        channel.start_session(self.participant.clone()).await?;
        pump.start().await?;
        self.state = CaptureState::Recording;
        tracing::info!(
            participant = %self.participant.first_name,
            "recording started"
        );
        Ok(())
    }

    /// Recording → stopped: announce session end and release the camera.
    /// The final snapshot stays around for display.
    pub async fn stop(&mut self) -> Result<(), ControllerError> {
        if self.state != CaptureState::Recording {
            tracing::debug!(state = ?self.state, "stop ignored");
            return Ok(());
        }
        if let Some(channel) = &self.channel {
            channel.stop_session().await?;
            tracing::info!(
                dropped_frames = channel.dropped_frames(),
                "recording stopped"
            );
        }
        if let Some(pump) = self.pump.take() {
            pump.shutdown().await?;
        }
        self.state = CaptureState::Stopped;
        Ok(())
    }

    /// Clear the elapsed counter and snapshot, back to armed with the
    /// camera still held. A late update rendered after stop is discarded
    /// here.
    pub async fn reset(&mut self) -> Result<(), ControllerError> {
        if self.state == CaptureState::Recording {
            if let (Some(channel), Some(pump)) = (&self.channel, &self.pump) {
                pump.stop().await?;
                channel.stop_session().await?;
            }
        }
        self.last_snapshot = None;
        if self.pump.is_some() {
            self.state = CaptureState::Armed;
        }
        tracing::info!("session reset");
        Ok(())
    }

    /// Record the latest backend update. Updates arriving after stop are
    /// kept too — they are rendered and then discarded on the next reset.
    pub fn on_update(&mut self, snapshot: MetricsSnapshot) {
        self.last_snapshot = Some(snapshot);
    }

    /// Stop if needed and release the camera. Called on every exit path.
    pub async fn teardown(&mut self) -> Result<(), ControllerError> {
        if self.state == CaptureState::Recording {
            self.stop().await?;
        }
        if let Some(pump) = self.pump.take() {
            pump.shutdown().await?;
        }
        self.state = CaptureState::Stopped;
        Ok(())
    }
}
