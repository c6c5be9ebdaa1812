use image::RgbImage;

use crate::error::SampleError;

/// A sequential frame decoder.
///
/// Frames are visited strictly in stream order; a frame is either skipped
/// (decoded but never colour converted) or read as an RGB image.
pub trait FrameSource {
    /// Number of frames the container claims to hold, 0 when unknown.
    fn total_frames(&self) -> u64;

    /// Advances past the next frame. Returns `false` at end of stream.
    fn skip_frame(&mut self) -> Result<bool, SampleError>;

    /// Decodes the next frame as RGB. Returns `None` at end of stream.
    fn read_frame(&mut self) -> Result<Option<RgbImage>, SampleError>;
}

/// A frame kept by [`sample`], tagged with its 0-based position in the stream.
#[derive(Debug, Clone)]
pub struct SampledFrame {
    pub index: u64,
    pub image: RgbImage,
}

/// Distance between two kept frames: `floor(total / max_frames)`, at least 1.
pub fn stride(total_frames: u64, max_frames: usize) -> u64 {
    if max_frames == 0 {
        return 1;
    }
    (total_frames / max_frames as u64).max(1)
}

/// Walks `source` from the start and keeps every `stride`-th frame until
/// `max_frames` are collected or the stream ends.
///
/// A decode error after at least one kept frame ends sampling early and the
/// frames collected so far are returned.
pub fn sample<S: FrameSource + ?Sized>(
    source: &mut S,
    max_frames: usize,
) -> Result<Vec<SampledFrame>, SampleError> {
    let total = source.total_frames();
    let step = stride(total, max_frames);
    log::info!("Total frames in video: {total}, keeping every {step} frame(s)");

    let mut sampled = Vec::with_capacity(max_frames);
    let mut index = 0u64;
    while sampled.len() < max_frames {
        let more = if index % step == 0 {
            match source.read_frame() {
                Ok(Some(image)) => {
                    sampled.push(SampledFrame { index, image });
                    log::info!("Extracted frame {}/{max_frames} (#{index})", sampled.len());
                    true
                }
                Ok(None) => false,
                Err(err) => return recover_partial(sampled, err),
            }
        } else {
            match source.skip_frame() {
                Ok(more) => more,
                Err(err) => return recover_partial(sampled, err),
            }
        };

        if !more {
            log::warn!("No more frames to read after {index} frame(s)");
            break;
        }
        index += 1;
    }

    Ok(sampled)
}

fn recover_partial(
    sampled: Vec<SampledFrame>,
    err: SampleError,
) -> Result<Vec<SampledFrame>, SampleError> {
    if sampled.is_empty() {
        return Err(err);
    }
    log::warn!(
        "Stopping after {} frame(s), decoding failed: {err}",
        sampled.len()
    );
    Ok(sampled)
}
