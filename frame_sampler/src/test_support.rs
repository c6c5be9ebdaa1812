use image::{Rgb, RgbImage};

use crate::error::SampleError;
use crate::stride::FrameSource;

/// In-memory stand-in for a decoder: `frames` solid-colour 8x8 frames.
pub struct SyntheticSource {
    frames: u64,
    reported: u64,
    fail_at: Option<u64>,
    position: u64,
    pub conversions: usize,
}

impl SyntheticSource {
    pub fn new(frames: u64) -> Self {
        Self {
            frames,
            reported: frames,
            fail_at: None,
            position: 0,
            conversions: 0,
        }
    }

    /// Frame count advertised by `total_frames`, independent of the real length.
    pub fn reporting(mut self, reported: u64) -> Self {
        self.reported = reported;
        self
    }

    pub fn failing_at(mut self, index: u64) -> Self {
        self.fail_at = Some(index);
        self
    }

    fn advance(&mut self) -> Result<bool, SampleError> {
        if self.fail_at == Some(self.position) {
            return Err(SampleError::Decode(ffmpeg::Error::InvalidData));
        }
        if self.position >= self.frames {
            return Ok(false);
        }
        self.position += 1;
        Ok(true)
    }
}

impl FrameSource for SyntheticSource {
    fn total_frames(&self) -> u64 {
        self.reported
    }

    fn skip_frame(&mut self) -> Result<bool, SampleError> {
        self.advance()
    }

    fn read_frame(&mut self) -> Result<Option<RgbImage>, SampleError> {
        if !self.advance()? {
            return Ok(None);
        }
        self.conversions += 1;
        let shade = (self.position % 256) as u8;
        Ok(Some(RgbImage::from_pixel(8, 8, Rgb([shade, shade, shade]))))
    }
}
