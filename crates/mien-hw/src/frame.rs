//! Frame type, YUYV colour conversion and JPEG encoding.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("buffer too short: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("JPEG encode failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// A captured RGB camera frame.
#[derive(Clone)]
pub struct Frame {
    /// Interleaved RGB pixel data (width * height * 3 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: std::time::Instant,
    pub sequence: u32,
}

impl Frame {
    /// Encode to JPEG at the given quality (1–100).
    ///
    /// Streaming uses a deliberately low quality to bound bandwidth; the
    /// inference backend only needs enough detail to find a face.
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, FrameError> {
        use image::ImageEncoder;

        let mut out = Vec::new();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality).write_image(
            &self.data,
            self.width,
            self.height,
            image::ExtendedColorType::Rgb8,
        )?;
        Ok(out)
    }
}

/// Convert packed YUYV (4:2:2) to interleaved RGB.
///
/// YUYV packs two pixels per 4 bytes: [Y0, U, Y1, V]; both pixels share
/// the chroma pair. Uses the BT.601 integer approximation.
pub fn yuyv_to_rgb(yuyv: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let expected = (width * height * 2) as usize;
    if yuyv.len() < expected {
        return Err(FrameError::InvalidLength {
            expected,
            actual: yuyv.len(),
        });
    }

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for quad in yuyv[..expected].chunks_exact(4) {
        let u = quad[1] as i32 - 128;
        let v = quad[3] as i32 - 128;
        for &y in &[quad[0], quad[2]] {
            let c = (y as i32 - 16).max(0) * 298;
            rgb.push(clamp_u8((c + 409 * v + 128) >> 8));
            rgb.push(clamp_u8((c - 100 * u - 208 * v + 128) >> 8));
            rgb.push(clamp_u8((c + 516 * u + 128) >> 8));
        }
    }
    Ok(rgb)
}

fn clamp_u8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_from_rgb(data: Vec<u8>, width: u32, height: u32) -> Frame {
        Frame {
            data,
            width,
            height,
            timestamp: std::time::Instant::now(),
            sequence: 0,
        }
    }

    #[test]
    fn test_yuyv_short_buffer_rejected() {
        let err = yuyv_to_rgb(&[0u8; 8], 4, 4).unwrap_err();
        assert!(matches!(
            err,
            FrameError::InvalidLength {
                expected: 32,
                actual: 8
            }
        ));
    }

    #[test]
    fn test_yuyv_white_and_black() {
        // Y=235 (white), Y=16 (black), neutral chroma
        let yuyv = [235u8, 128, 16, 128];
        let rgb = yuyv_to_rgb(&yuyv, 2, 1).unwrap();
        assert_eq!(rgb.len(), 6);
        for c in &rgb[..3] {
            assert!(*c > 250, "white pixel channel {c}");
        }
        for c in &rgb[3..] {
            assert!(*c < 5, "black pixel channel {c}");
        }
    }

    #[test]
    fn test_yuyv_red_chroma() {
        // High V pushes the red channel well above green/blue.
        let yuyv = [81u8, 90, 81, 240];
        let rgb = yuyv_to_rgb(&yuyv, 2, 1).unwrap();
        assert!(rgb[0] > rgb[1] && rgb[0] > rgb[2]);
    }

    #[test]
    fn test_encode_jpeg_produces_jfif() {
        let frame = frame_from_rgb(vec![128u8; 16 * 16 * 3], 16, 16);
        let jpeg = frame.encode_jpeg(50).unwrap();
        // SOI marker
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        assert!(jpeg.len() > 100);
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        // Noisy frame so quality actually changes the payload size
        let data: Vec<u8> = (0..(64 * 64 * 3)).map(|i| (i * 31 % 251) as u8).collect();
        let frame = frame_from_rgb(data, 64, 64);
        let high = frame.encode_jpeg(90).unwrap();
        let low = frame.encode_jpeg(30).unwrap();
        assert!(low.len() < high.len());
    }
}
