use std::io::Write;
use std::path::PathBuf;

use image::codecs::jpeg::JpegEncoder;
use tempfile::NamedTempFile;

use crate::error::SampleError;
use crate::ffmpeg_source::FfmpegSource;
use crate::stride::{self, FrameSource, SampledFrame};

/// Matches the quality most image libraries pick when none is given.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// One sampled frame, JPEG encoded.
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    /// 0-based position of the frame in the decoded stream.
    pub index: u64,
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct FrameSampler {
    max_frames: usize,
    jpeg_quality: u8,
    temp_dir: Option<PathBuf>,
}

impl FrameSampler {
    pub fn new(max_frames: usize) -> Self {
        Self {
            max_frames,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            temp_dir: None,
        }
    }

    /// Clamped to the 1..=100 range the encoder accepts.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Directory for the staged upload; the system temp dir otherwise.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    /// Samples frames out of an in-memory video.
    ///
    /// ffmpeg needs a seekable file, so the bytes are written to a named
    /// temporary file first. The file is removed before returning, whether
    /// decoding succeeded or not.
    pub fn sample_bytes(&self, video: &[u8]) -> Result<Vec<EncodedFrame>, SampleError> {
        log::info!("Extracting frames from {} bytes of video data", video.len());
        let staged = self.stage(video)?;

        let frames = {
            let mut source = FfmpegSource::open(staged.path())?;
            self.sample_source(&mut source)?
        };

        let path = staged.path().to_path_buf();
        match staged.close() {
            Ok(()) => log::debug!("Temporary video file {path:?} deleted"),
            Err(err) => log::warn!("Failed to delete temporary video file {path:?}: {err}"),
        }

        Ok(frames)
    }

    /// Samples and encodes frames from an already opened source.
    pub fn sample_source<S: FrameSource + ?Sized>(
        &self,
        source: &mut S,
    ) -> Result<Vec<EncodedFrame>, SampleError> {
        stride::sample(source, self.max_frames)?
            .into_iter()
            .map(|frame| encode_jpeg(frame, self.jpeg_quality))
            .collect()
    }

    fn stage(&self, video: &[u8]) -> Result<NamedTempFile, SampleError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("upload-").suffix(".mp4");
        let mut staged = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(SampleError::TempFile)?;

        staged.write_all(video).map_err(SampleError::TempFile)?;
        staged.flush().map_err(SampleError::TempFile)?;
        Ok(staged)
    }
}

fn encode_jpeg(frame: SampledFrame, quality: u8) -> Result<EncodedFrame, SampleError> {
    let (width, height) = frame.image.dimensions();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality)
        .encode_image(&frame.image)
        .map_err(SampleError::Encode)?;

    Ok(EncodedFrame {
        index: frame.index,
        width,
        height,
        jpeg,
    })
}
