use std::io::{Cursor, Write};

use frame_sampler::{FfmpegSource, FrameSampler, FrameSource, SampleError};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

fn temp_entries(dir: &tempfile::TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
}

#[test]
fn garbage_upload_fails_and_removes_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let sampler = FrameSampler::new(5).with_temp_dir(dir.path());

    let err = sampler
        .sample_bytes(b"this is not a video container at all")
        .unwrap_err();
    assert!(matches!(
        err,
        SampleError::Open(_) | SampleError::NoVideoStream | SampleError::Decoder(_)
    ));
    assert_eq!(temp_entries(&dir), 0);
}

#[test]
fn single_image_stream_yields_one_frame_and_removes_temp_file() {
    // ffmpeg probes a lone PNG as a one-frame image pipe.
    let image = RgbImage::from_pixel(16, 16, Rgb([200, 40, 40]));
    let mut png = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let sampler = FrameSampler::new(5).with_temp_dir(dir.path());
    let frames = sampler.sample_bytes(&png).unwrap();

    assert_eq!(frames.len(), 1);
    assert_eq!((frames[0].width, frames[0].height), (16, 16));
    assert_eq!(&frames[0].jpeg[..2], &[0xFF, 0xD8]);
    assert_eq!(temp_entries(&dir), 0);
}

/// `count` JPEG frames back to back, which ffmpeg reads as an MJPEG stream.
fn mjpeg_stream(count: u8) -> Vec<u8> {
    let mut stream = Vec::new();
    for i in 0..count {
        let shade = i.wrapping_mul(20);
        let frame = RgbImage::from_pixel(16, 16, Rgb([shade, 255 - shade, 128]));
        JpegEncoder::new_with_quality(&mut stream, 90)
            .encode_image(&frame)
            .unwrap();
    }
    stream
}

/// Real decoder with a fixed advertised length, so sampling strides over
/// frames instead of taking the leading ones.
struct KnownLength {
    inner: FfmpegSource,
    frames: u64,
}

impl FrameSource for KnownLength {
    fn total_frames(&self) -> u64 {
        self.frames
    }

    fn skip_frame(&mut self) -> Result<bool, SampleError> {
        self.inner.skip_frame()
    }

    fn read_frame(&mut self) -> Result<Option<RgbImage>, SampleError> {
        self.inner.read_frame()
    }
}

#[test]
fn long_stream_yields_exactly_max_frames() {
    let dir = tempfile::tempdir().unwrap();
    let sampler = FrameSampler::new(5).with_temp_dir(dir.path());
    let frames = sampler.sample_bytes(&mjpeg_stream(12)).unwrap();

    assert_eq!(frames.len(), 5);
    assert!(frames.windows(2).all(|pair| pair[0].index < pair[1].index));
    for frame in &frames {
        assert_eq!((frame.width, frame.height), (16, 16));
        assert_eq!(&frame.jpeg[..2], &[0xFF, 0xD8]);
    }
    assert_eq!(temp_entries(&dir), 0);
}

#[test]
fn short_stream_yields_every_frame() {
    let dir = tempfile::tempdir().unwrap();
    let sampler = FrameSampler::new(5).with_temp_dir(dir.path());
    let frames = sampler.sample_bytes(&mjpeg_stream(3)).unwrap();

    assert_eq!(frames.len(), 3);
    assert_eq!(frames.iter().map(|f| f.index).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(temp_entries(&dir), 0);
}

#[test]
fn stride_skips_frames_in_real_stream() {
    let mut staged = tempfile::Builder::new().suffix(".mjpeg").tempfile().unwrap();
    staged.write_all(&mjpeg_stream(12)).unwrap();
    staged.flush().unwrap();

    let mut source = KnownLength {
        inner: FfmpegSource::open(staged.path()).unwrap(),
        frames: 12,
    };
    let frames = FrameSampler::new(5).sample_source(&mut source).unwrap();

    assert_eq!(frames.iter().map(|f| f.index).collect::<Vec<_>>(), vec![0, 2, 4, 6, 8]);
    assert!(frames.iter().all(|f| (f.width, f.height) == (16, 16)));

    // The remaining frames drain cleanly to end of stream.
    let mut rest = 0;
    while source.skip_frame().unwrap() {
        rest += 1;
    }
    assert_eq!(rest, 3);
    assert!(source.read_frame().unwrap().is_none());
}
