use std::time::Duration;

/// Capture client configuration, loaded from environment variables.
pub struct Config {
    /// Realtime channel endpoint.
    pub channel_url: String,
    /// V4L2 device path (default: /dev/video0).
    pub camera_device: String,
    /// Frame emission cadence.
    pub frame_interval: Duration,
    /// JPEG quality for streamed frames (1–100). Kept low to bound bandwidth.
    pub jpeg_quality: u8,
    /// Number of warmup frames to discard before arming (camera AGC/AE stabilization).
    pub warmup_frames: usize,
}

impl Config {
    /// Load configuration from `MIEN_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            channel_url: std::env::var("MIEN_CHANNEL_URL")
                .unwrap_or_else(|_| "ws://localhost:8000/ws".to_string()),
            camera_device: std::env::var("MIEN_CAMERA_DEVICE")
                .unwrap_or_else(|_| "/dev/video0".to_string()),
            frame_interval: Duration::from_millis(env_u64("MIEN_FRAME_INTERVAL_MS", 200)),
            jpeg_quality: env_u8("MIEN_JPEG_QUALITY", 50),
            warmup_frames: env_usize("MIEN_WARMUP_FRAMES", 4),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u8(key: &str, default: u8) -> u8 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
