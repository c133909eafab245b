//! Tone mapping and the image-sink boundary.
//!
//! The renderer hands finished frames to an `ImageSink` as gamma-encoded
//! 8-bit RGB rows, top to bottom. `PngSink` encodes through the `image`
//! crate; `MemorySink` keeps the bytes around for tests and embedding.

use std::path::PathBuf;

use ember_math::sample::linear_to_gamma;
use ember_math::{Color, Interval};
use thiserror::Error;

/// Errors surfaced while writing a finished frame.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding error: {0}")]
    Encode(#[from] image::ImageError),
}

/// Receiver for a finished frame.
pub trait ImageSink {
    /// Consume a frame of `width * height` RGB8 pixels in row-major,
    /// top-to-bottom order.
    fn write(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<(), SinkError>;
}

/// Quantization range: 0.999 keeps the byte below 256 after scaling.
const INTENSITY: Interval = Interval {
    min: 0.0,
    max: 0.999,
};

/// Tone map one linear accumulator to output bytes.
///
/// NaN components (a 0/0 in the mixture estimator) are scrubbed to black,
/// then each channel is gamma-corrected (gamma = 2), clamped, and
/// quantized.
pub fn to_rgb8(color: Color) -> [u8; 3] {
    let quantize = |c: f32| {
        let c = if c.is_nan() { 0.0 } else { c };
        (256.0 * INTENSITY.clamp(linear_to_gamma(c))) as u8
    };

    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Write frames to a PNG file on disk.
pub struct PngSink {
    path: PathBuf,
}

impl PngSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ImageSink for PngSink {
    fn write(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<(), SinkError> {
        image::save_buffer(
            &self.path,
            pixels,
            width,
            height,
            image::ExtendedColorType::Rgb8,
        )?;
        log::info!("wrote {}x{} image to {}", width, height, self.path.display());
        Ok(())
    }
}

/// Keep the last written frame in memory.
#[derive(Default)]
pub struct MemorySink {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ImageSink for MemorySink {
    fn write(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<(), SinkError> {
        self.width = width;
        self.height = height;
        self.pixels = pixels.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_rgb8_black_and_white() {
        assert_eq!(to_rgb8(Color::ZERO), [0, 0, 0]);
        assert_eq!(to_rgb8(Color::ONE), [255, 255, 255]);
    }

    #[test]
    fn test_to_rgb8_gamma_round_trip() {
        // Writing 0.25 yields a byte whose decode (b/256)^2 recovers 0.25
        // within one quantization step.
        let [b, _, _] = to_rgb8(Color::new(0.25, 0.25, 0.25));
        let decoded = (b as f32 / 256.0).powi(2);
        assert!(
            (decoded - 0.25).abs() <= 1.0 / 256.0,
            "byte {b} decodes to {decoded}"
        );
    }

    #[test]
    fn test_to_rgb8_scrubs_nan() {
        let c = Color::new(f32::NAN, 0.5, f32::NAN);
        let [r, g, b] = to_rgb8(c);
        assert_eq!(r, 0);
        assert_eq!(b, 0);
        assert!(g > 0);
    }

    #[test]
    fn test_to_rgb8_clamps_overbright() {
        let [r, g, b] = to_rgb8(Color::new(40.0, 2.0, 1.5));
        assert_eq!([r, g, b], [255, 255, 255]);
    }

    #[test]
    fn test_memory_sink_stores_frame() {
        let mut sink = MemorySink::new();
        sink.write(2, 1, &[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(sink.width, 2);
        assert_eq!(sink.height, 1);
        assert_eq!(sink.pixels, vec![1, 2, 3, 4, 5, 6]);
    }
}
