//! Stride sampling of still frames out of an uploaded video.
//!
//! The bytes are staged in a temporary file, decoded with ffmpeg and every
//! k-th frame is re-encoded as JPEG, where k spreads `max_frames` samples
//! evenly over the reported length of the stream.

extern crate ffmpeg_next as ffmpeg;

pub mod error;
pub mod ffmpeg_source;
pub mod sampler;
pub mod stride;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::SampleError;
pub use ffmpeg_source::FfmpegSource;
pub use sampler::{EncodedFrame, FrameSampler, DEFAULT_JPEG_QUALITY};
pub use stride::{FrameSource, SampledFrame};

/// Turns raw video bytes into an ordered list of encoded frames.
///
/// Implementations do blocking work and are expected to be driven from a
/// blocking thread.
pub trait FrameExtractor: Send + Sync {
    /// Upper bound on the number of frames returned by [`FrameExtractor::extract`].
    fn max_frames(&self) -> usize;

    fn extract(&self, video: &[u8]) -> Result<Vec<EncodedFrame>, SampleError>;
}

impl FrameExtractor for FrameSampler {
    fn max_frames(&self) -> usize {
        FrameSampler::max_frames(self)
    }

    fn extract(&self, video: &[u8]) -> Result<Vec<EncodedFrame>, SampleError> {
        self.sample_bytes(video)
    }
}
