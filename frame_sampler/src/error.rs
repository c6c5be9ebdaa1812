use thiserror::Error;

#[derive(Debug, Error)]
pub enum SampleError {
    /// The upload could not be written to a temporary file.
    #[error("failed to stage video in a temporary file: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("failed to initialize ffmpeg: {0}")]
    Init(#[source] ffmpeg::Error),

    /// The container is unreadable or in a format ffmpeg does not know.
    #[error("failed to open video container: {0}")]
    Open(#[source] ffmpeg::Error),

    #[error("no video stream found in container")]
    NoVideoStream,

    /// Codec context, decoder or pixel format converter could not be set up.
    #[error("failed to prepare video decoder: {0}")]
    Decoder(#[source] ffmpeg::Error),

    #[error("failed to decode video frame: {0}")]
    Decode(#[source] ffmpeg::Error),

    #[error("decoded frame has unexpected layout ({width}x{height})")]
    InvalidFrame { width: u32, height: u32 },

    #[error("failed to encode frame as jpeg: {0}")]
    Encode(#[source] image::ImageError),
}
