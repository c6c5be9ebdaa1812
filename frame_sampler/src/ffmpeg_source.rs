use std::path::Path;

use ffmpeg::format::context::Input;
use ffmpeg::format::{input, stream::Stream, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context as Scaler, flag::Flags};
use ffmpeg::util::frame::video::Video;
use ffmpeg::{codec, decoder, Packet};
use image::RgbImage;

use crate::error::SampleError;
use crate::stride::FrameSource;

/// Container durations are expressed in microseconds (`AV_TIME_BASE`).
const CONTAINER_TIME_BASE: f64 = 1_000_000.0;

/// Pull-style decoder over the best video stream of a file.
pub struct FfmpegSource {
    input: Input,
    decoder: decoder::Video,
    stream_index: usize,
    total_frames: u64,
    scaler: Option<Scaler>,
    decoded: Video,
    eof_sent: bool,
}

impl FfmpegSource {
    pub fn open(path: &Path) -> Result<Self, SampleError> {
        ffmpeg::init().map_err(SampleError::Init)?;

        let input = input(&path).map_err(SampleError::Open)?;
        let (stream_index, total_frames, decoder) = {
            let stream = input
                .streams()
                .best(Type::Video)
                .ok_or(SampleError::NoVideoStream)?;
            let total_frames = estimate_total_frames(&stream, input.duration());

            let context_decoder = codec::context::Context::from_parameters(stream.parameters())
                .map_err(SampleError::Decoder)?;
            let decoder = context_decoder
                .decoder()
                .video()
                .map_err(SampleError::Decoder)?;
            (stream.index(), total_frames, decoder)
        };

        log::debug!(
            "Opened {path:?}: stream #{stream_index}, {}x{} {:?}, ~{total_frames} frames",
            decoder.width(),
            decoder.height(),
            decoder.format()
        );

        Ok(Self {
            input,
            decoder,
            stream_index,
            total_frames,
            scaler: None,
            decoded: Video::empty(),
            eof_sent: false,
        })
    }

    /// Feeds packets to the decoder until it yields a frame into `self.decoded`.
    fn decode_next(&mut self) -> Result<bool, SampleError> {
        loop {
            if self.decoder.receive_frame(&mut self.decoded).is_ok() {
                return Ok(true);
            }
            if self.eof_sent {
                return Ok(false);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    if packet.stream() != self.stream_index {
                        continue;
                    }
                    if let Err(err) = self.decoder.send_packet(&packet) {
                        log::warn!("Decoder rejected packet, skipping it: {err}");
                    }
                }
                Err(ffmpeg::Error::Eof) => {
                    self.decoder.send_eof().map_err(SampleError::Decode)?;
                    self.eof_sent = true;
                }
                Err(err) => return Err(SampleError::Decode(err)),
            }
        }
    }

    /// Converts the last decoded frame to a packed RGB24 image.
    fn convert_decoded(&mut self) -> Result<RgbImage, SampleError> {
        let width = self.decoded.width();
        let height = self.decoded.height();
        let format = self.decoded.format();

        // Resolution or pixel format may change mid-stream.
        let stale = match &self.scaler {
            Some(scaler) => {
                let def = scaler.input();
                def.width != width || def.height != height || def.format != format
            }
            None => true,
        };
        let scaler = match self.scaler.take() {
            Some(scaler) if !stale => scaler,
            _ => Scaler::get(
                format,
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                Flags::BILINEAR,
            )
            .map_err(SampleError::Decoder)?,
        };
        let scaler = self.scaler.insert(scaler);

        let mut rgb_frame = Video::empty();
        scaler
            .run(&self.decoded, &mut rgb_frame)
            .map_err(SampleError::Decode)?;

        // Rows may be padded, copy them out one by one.
        let data = rgb_frame.data(0);
        let stride = rgb_frame.stride(0);
        let row_len = width as usize * 3;
        let mut packed = Vec::with_capacity(row_len * height as usize);
        for row in 0..height as usize {
            let start = row * stride;
            let Some(pixels) = data.get(start..start + row_len) else {
                return Err(SampleError::InvalidFrame { width, height });
            };
            packed.extend_from_slice(pixels);
        }

        RgbImage::from_raw(width, height, packed).ok_or(SampleError::InvalidFrame { width, height })
    }
}

impl FrameSource for FfmpegSource {
    fn total_frames(&self) -> u64 {
        self.total_frames
    }

    fn skip_frame(&mut self) -> Result<bool, SampleError> {
        self.decode_next()
    }

    fn read_frame(&mut self) -> Result<Option<RgbImage>, SampleError> {
        if !self.decode_next()? {
            return Ok(None);
        }
        self.convert_decoded().map(Some)
    }
}

/// Frame count from the stream header, falling back to duration x frame rate.
fn estimate_total_frames(stream: &Stream, container_duration: i64) -> u64 {
    if stream.frames() > 0 {
        return stream.frames() as u64;
    }

    let fps = f64::from(stream.avg_frame_rate());
    if !fps.is_finite() || fps <= 0.0 {
        return 0;
    }

    let seconds = if stream.duration() > 0 {
        stream.duration() as f64 * f64::from(stream.time_base())
    } else if container_duration > 0 {
        container_duration as f64 / CONTAINER_TIME_BASE
    } else {
        0.0
    };

    if seconds.is_finite() && seconds > 0.0 {
        (seconds * fps) as u64
    } else {
        0
    }
}
