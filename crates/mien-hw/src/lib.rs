//! mien-hw — Hardware abstraction for webcam capture.
//!
//! Provides V4L2-based camera access, colour conversion and the reduced-
//! quality JPEG encoding used to bound streaming bandwidth.

pub mod camera;
pub mod frame;

pub use camera::{Camera, CameraError, FrameStream, PixelFormat};
pub use frame::{Frame, FrameError};
