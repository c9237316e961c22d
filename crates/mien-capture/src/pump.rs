//! Frame pump: a dedicated OS thread that owns the camera.
//!
//! Capture is blocking V4L2 I/O, so it lives on its own thread and takes
//! commands over a channel, mirroring the split between async control
//! flow and synchronous hardware access. While pumping, each tick
//! captures a frame, encodes it at reduced JPEG quality and hands it to
//! the realtime channel fire-and-forget; emission pace is fixed and a
//! slow backend costs dropped frames, never memory.

use mien_client::{ChannelError, ChannelHandle};
use mien_hw::Camera;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Error, Debug)]
pub enum PumpError {
    #[error("pump thread exited")]
    ThreadExited,
}

enum PumpCommand {
    /// Begin streaming frames.
    Start,
    /// Stop streaming, keep the camera for a later restart.
    Stop,
    /// Release the camera and exit the thread.
    Shutdown,
}

/// Clone-safe handle to the pump thread.
#[derive(Clone)]
pub struct PumpHandle {
    tx: mpsc::Sender<PumpCommand>,
}

impl PumpHandle {
    pub async fn start(&self) -> Result<(), PumpError> {
        self.send(PumpCommand::Start).await
    }

    pub async fn stop(&self) -> Result<(), PumpError> {
        self.send(PumpCommand::Stop).await
    }

    /// Release the camera. Mandatory on every exit path — a leaked pump
    /// thread would hold the device lock until process exit.
    pub async fn shutdown(&self) -> Result<(), PumpError> {
        self.send(PumpCommand::Shutdown).await
    }

    async fn send(&self, cmd: PumpCommand) -> Result<(), PumpError> {
        self.tx.send(cmd).await.map_err(|_| PumpError::ThreadExited)
    }
}

/// Spawn the pump thread; it owns `camera` until shutdown.
pub fn spawn_pump(
    camera: Camera,
    channel: ChannelHandle,
    interval: Duration,
    jpeg_quality: u8,
) -> PumpHandle {
    let (tx, mut rx) = mpsc::channel::<PumpCommand>(4);

    std::thread::Builder::new()
        .name("mien-pump".into())
        .spawn(move || {
            tracing::info!("pump thread started");
            let mut active = None;

            'outer: loop {
                if active.is_none() {
                    // Not streaming: block until the next command.
                    match rx.blocking_recv() {
                        Some(PumpCommand::Start) => match camera.start_stream() {
                            Ok(stream) => active = Some(stream),
                            Err(e) => {
                                tracing::warn!(error = %e, "could not start capture stream");
                            }
                        },
                        Some(PumpCommand::Stop) => {}
                        Some(PumpCommand::Shutdown) | None => break,
                    }
                    continue;
                }

                let tick_start = Instant::now();
                let mut channel_gone = false;
                if let Some(stream) = active.as_mut() {
                    match stream.next_frame() {
                        Ok(frame) => match frame.encode_jpeg(jpeg_quality) {
                            Ok(jpeg) => {
                                if let Err(ChannelError::Closed) = channel.push_frame(&jpeg) {
                                    tracing::warn!("realtime channel gone, pump stopping");
                                    channel_gone = true;
                                }
                            }
                            Err(e) => tracing::warn!(error = %e, "frame encode failed"),
                        },
                        Err(e) => tracing::warn!(error = %e, "frame capture failed"),
                    }
                }
                if channel_gone {
                    active = None;
                    continue;
                }

                // Drain any pending commands before sleeping out the tick.
                loop {
                    match rx.try_recv() {
                        Ok(PumpCommand::Start) => {}
                        Ok(PumpCommand::Stop) => {
                            active = None;
                            break;
                        }
                        Ok(PumpCommand::Shutdown) => break 'outer,
                        Err(mpsc::error::TryRecvError::Empty) => break,
                        Err(mpsc::error::TryRecvError::Disconnected) => break 'outer,
                    }
                }

                let elapsed = tick_start.elapsed();
                if elapsed < interval {
                    std::thread::sleep(interval - elapsed);
                }
            }

            drop(active);
            drop(camera);
            tracing::info!("pump thread exiting, camera released");
        })
        .expect("failed to spawn pump thread");

    PumpHandle { tx }
}
