//! The FFmpeg-backed media source.
//!
//! [`MediaSource`] owns the opened container together with the decoders of
//! the selected streams. It is the only place in the crate that touches
//! FFmpeg's demuxing and decoding APIs. Closing happens in [`Drop`], so the
//! container is released exactly once however iteration ends.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    ptr,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use ffmpeg_next::{
    Dictionary, Error as FfmpegError, Packet, Rational,
    codec::{context::Context as CodecContext, threading},
    decoder::{Audio as AudioDecoder, Video as VideoDecoder},
    error::EAGAIN,
    format::{Pixel, context::Input},
    frame::{Audio as AudioFrame, Video as VideoFrame},
    media::Type,
    software::scaling::Context as ScalingContext,
};
use ffmpeg_sys_next::{AVStream, av_guess_frame_rate};

use crate::config::{LoadOptions, SWS_FLAGS, scaling_flags};
use crate::conversion::{BgrImage, bgr_frame_to_image};
use crate::demux::{Demuxed, MediaDemuxer};
use crate::error::LoadVideoError;
use crate::metadata::{StreamDescriptor, duration_from_time_base, present_rational};

static LIVE_CONTAINERS: AtomicUsize = AtomicUsize::new(0);

/// Number of media containers currently open in this process.
///
/// A container counts from the moment FFmpeg opens it, so setup failures
/// after the open (missing video stream, unusable decoder) still pass
/// through acquire and release.
pub fn live_container_count() -> usize {
    LIVE_CONTAINERS.load(Ordering::SeqCst)
}

/// One unit of [`live_container_count`], returned on drop.
#[derive(Debug)]
struct ContainerLease(());

impl ContainerLease {
    fn acquire() -> Self {
        LIVE_CONTAINERS.fetch_add(1, Ordering::SeqCst);
        Self(())
    }
}

impl Drop for ContainerLease {
    fn drop(&mut self) {
        LIVE_CONTAINERS.fetch_sub(1, Ordering::SeqCst);
    }
}

/// An opened FFmpeg input together with its lease. The input is closed
/// before the lease is returned.
struct CountedInput {
    input: Input,
    _lease: ContainerLease,
}

impl CountedInput {
    fn open(path: &Path, options: Dictionary) -> Result<Self, FfmpegError> {
        let input = ffmpeg_next::format::input_with_dictionary(path, options)?;
        Ok(Self {
            input,
            _lease: ContainerLease::acquire(),
        })
    }
}

/// An opened media container with decoders for its first video stream and,
/// when present, its first audio stream.
pub struct MediaSource {
    container: CountedInput,
    path: PathBuf,
    descriptor: StreamDescriptor,
    video_stream_index: usize,
    audio_stream_index: Option<usize>,
    video_decoder: VideoDecoder,
    audio_decoder: Option<AudioDecoder>,
    scaler: Option<ScalingContext>,
    decoded_video: VideoFrame,
    scaled_video: VideoFrame,
}

impl Debug for MediaSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MediaSource")
            .field("path", &self.path)
            .field("descriptor", &self.descriptor)
            .field("video_stream_index", &self.video_stream_index)
            .field("audio_stream_index", &self.audio_stream_index)
            .finish_non_exhaustive()
    }
}

impl MediaSource {
    /// Open a container and prepare decoders for its streams.
    ///
    /// The demuxer receives the fixed scaler policy ([`SWS_FLAGS`]) and the
    /// video decoder runs with frame threading.
    ///
    /// # Errors
    ///
    /// Returns [`LoadVideoError::ContainerOpen`] if the file cannot be
    /// opened or its decoders cannot be created, and
    /// [`LoadVideoError::NoVideoStream`] if it carries no video.
    pub fn open<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self, LoadVideoError> {
        let path = path.as_ref().to_path_buf();
        let open_error = |reason: String| LoadVideoError::ContainerOpen {
            path: path.clone(),
            reason,
        };

        log::debug!("Opening media container: {}", path.display());

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let mut input_options = Dictionary::new();
        input_options.set("sws_flags", SWS_FLAGS);
        let mut container = CountedInput::open(&path, input_options)
            .map_err(|error| open_error(error.to_string()))?;
        let input_context = &mut container.input;

        let video_stream = input_context
            .streams()
            .find(|stream| stream.parameters().medium() == Type::Video)
            .ok_or(LoadVideoError::NoVideoStream)?;
        let video_stream_index = video_stream.index();
        let video_parameters = video_stream.parameters();
        let average_rate = present_rational(video_stream.avg_frame_rate());
        let base_rate = present_rational(video_stream.rate());
        let encoded_frame_count = u64::try_from(video_stream.frames())
            .ok()
            .filter(|&count| count > 0);
        let stream_duration =
            duration_from_time_base(video_stream.duration(), video_stream.time_base());

        // The codec parameters reuse the audio sample-rate field; zero means unset.
        let raw_sample_rate = unsafe { (*video_parameters.as_ptr()).sample_rate };
        let declared_sample_rate = u32::try_from(raw_sample_rate).ok().filter(|&rate| rate > 0);

        let audio_stream = input_context
            .streams()
            .find(|stream| stream.parameters().medium() == Type::Audio);
        let audio_stream_index = audio_stream.as_ref().map(|stream| stream.index());
        let audio_parameters = audio_stream.map(|stream| stream.parameters());

        let guessed_rate = guess_frame_rate(input_context, video_stream_index);

        let mut video_context = CodecContext::from_parameters(video_parameters).map_err(|error| {
            open_error(format!(
                "Failed to read video codec parameters for stream {video_stream_index}: {error}"
            ))
        })?;
        let mut threading_config = threading::Config::kind(threading::Type::Frame);
        threading_config.count = options.decode_threads();
        video_context.set_threading(threading_config);
        let video_decoder = video_context.decoder().video().map_err(|error| {
            open_error(format!(
                "Failed to create video decoder for stream {video_stream_index}: {error}"
            ))
        })?;

        let audio_decoder = match audio_parameters {
            Some(parameters) => {
                let context = CodecContext::from_parameters(parameters).map_err(|error| {
                    open_error(format!("Failed to read audio codec parameters: {error}"))
                })?;
                let decoder = context.decoder().audio().map_err(|error| {
                    open_error(format!("Failed to create audio decoder: {error}"))
                })?;
                Some(decoder)
            }
            None => None,
        };

        let container_duration = u64::try_from(input_context.duration())
            .ok()
            .filter(|&micros| micros > 0)
            .map(Duration::from_micros);

        let descriptor = StreamDescriptor {
            declared_frame_rate: video_decoder.frame_rate().and_then(present_rational),
            declared_sample_rate,
            average_rate,
            guessed_rate,
            base_rate,
            encoded_frame_count,
            container_duration,
            stream_duration,
            width: video_decoder.width(),
            height: video_decoder.height(),
            video_codec: video_decoder
                .codec()
                .map(|codec| codec.name().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            audio_codec: audio_decoder.as_ref().map(|decoder| {
                decoder
                    .codec()
                    .map(|codec| codec.name().to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            }),
        };

        log::debug!(
            "Selected streams: video={} ({}x{}, codec={}), audio={:?} (codec={:?})",
            video_stream_index,
            descriptor.width,
            descriptor.height,
            descriptor.video_codec,
            audio_stream_index,
            descriptor.audio_codec,
        );

        Ok(Self {
            container,
            path,
            descriptor,
            video_stream_index,
            audio_stream_index,
            video_decoder,
            audio_decoder,
            scaler: None,
            decoded_video: VideoFrame::empty(),
            scaled_video: VideoFrame::empty(),
        })
    }

    /// Metadata read when the container was opened.
    pub fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    /// Path the container was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Receive every frame the video decoder has ready.
    fn receive_video(&mut self, images: &mut Vec<BgrImage>) -> Result<(), LoadVideoError> {
        loop {
            match self.video_decoder.receive_frame(&mut self.decoded_video) {
                Ok(()) => {
                    let image = self.convert_decoded_video()?;
                    images.push(image);
                }
                Err(FfmpegError::Other { errno }) if errno == EAGAIN => return Ok(()),
                Err(FfmpegError::Eof) => return Ok(()),
                Err(error) => return Err(LoadVideoError::Decode(error.to_string())),
            }
        }
    }

    /// Scale the last decoded frame to packed BGR.
    ///
    /// The scaler is rebuilt whenever the decoded format or size changes.
    fn convert_decoded_video(&mut self) -> Result<BgrImage, LoadVideoError> {
        let format = self.decoded_video.format();
        let width = self.decoded_video.width();
        let height = self.decoded_video.height();

        let stale = self.scaler.as_ref().is_none_or(|scaler| {
            let input = scaler.input();
            input.format != format || input.width != width || input.height != height
        });
        if stale {
            log::debug!("Building BGR scaler for {format:?} {width}x{height}");
            self.scaler = Some(ScalingContext::get(
                format,
                width,
                height,
                Pixel::BGR24,
                width,
                height,
                scaling_flags(),
            )?);
            self.scaled_video = VideoFrame::empty();
        }

        let Some(scaler) = self.scaler.as_mut() else {
            return Err(LoadVideoError::Decode("Scaler unavailable".to_string()));
        };
        scaler.run(&self.decoded_video, &mut self.scaled_video)?;
        bgr_frame_to_image(&self.scaled_video)
    }
}

impl MediaDemuxer for MediaSource {
    type Packet = Packet;
    type Image = BgrImage;
    type AudioFrame = AudioFrame;

    fn read_packet(&mut self) -> Result<Option<Demuxed<Packet>>, LoadVideoError> {
        loop {
            let mut packet = Packet::empty();
            match packet.read(&mut self.container.input) {
                Ok(()) => {
                    let stream_index = packet.stream();
                    if stream_index == self.video_stream_index {
                        return Ok(Some(Demuxed::Video(packet)));
                    }
                    if Some(stream_index) == self.audio_stream_index {
                        return Ok(Some(Demuxed::Audio(packet)));
                    }
                    // Packets of unselected streams are not part of the sequence.
                }
                Err(FfmpegError::Eof) => return Ok(None),
                Err(error) => return Err(LoadVideoError::Demux(error.to_string())),
            }
        }
    }

    fn decode_video(
        &mut self,
        packet: &Packet,
        images: &mut Vec<BgrImage>,
    ) -> Result<(), LoadVideoError> {
        self.video_decoder
            .send_packet(packet)
            .map_err(|error| LoadVideoError::Decode(error.to_string()))?;
        self.receive_video(images)
    }

    fn decode_audio(
        &mut self,
        packet: &Packet,
        frames: &mut Vec<AudioFrame>,
    ) -> Result<(), LoadVideoError> {
        let Some(decoder) = self.audio_decoder.as_mut() else {
            return Ok(());
        };
        decoder
            .send_packet(packet)
            .map_err(|error| LoadVideoError::Decode(error.to_string()))?;
        receive_audio(decoder, frames)
    }

    fn drain_video(&mut self, images: &mut Vec<BgrImage>) -> Result<(), LoadVideoError> {
        match self.video_decoder.send_eof() {
            Ok(()) | Err(FfmpegError::Eof) => {}
            Err(error) => return Err(LoadVideoError::Decode(error.to_string())),
        }
        self.receive_video(images)
    }

    fn drain_audio(&mut self, frames: &mut Vec<AudioFrame>) -> Result<(), LoadVideoError> {
        let Some(decoder) = self.audio_decoder.as_mut() else {
            return Ok(());
        };
        match decoder.send_eof() {
            Ok(()) | Err(FfmpegError::Eof) => {}
            Err(error) => return Err(LoadVideoError::Decode(error.to_string())),
        }
        receive_audio(decoder, frames)
    }

    fn audio_codec_name(&self) -> Option<&str> {
        self.descriptor.audio_codec.as_deref()
    }
}

impl Drop for MediaSource {
    fn drop(&mut self) {
        log::debug!("Closing media container: {}", self.path.display());
    }
}

fn receive_audio(
    decoder: &mut AudioDecoder,
    frames: &mut Vec<AudioFrame>,
) -> Result<(), LoadVideoError> {
    loop {
        let mut frame = AudioFrame::empty();
        match decoder.receive_frame(&mut frame) {
            Ok(()) => frames.push(frame),
            Err(FfmpegError::Other { errno }) if errno == EAGAIN => return Ok(()),
            Err(FfmpegError::Eof) => return Ok(()),
            Err(error) => return Err(LoadVideoError::Decode(error.to_string())),
        }
    }
}

/// Ask FFmpeg for its best guess of the stream's frame rate.
fn guess_frame_rate(input_context: &mut Input, stream_index: usize) -> Option<Rational> {
    let stream = input_context.stream(stream_index)?;
    let stream_pointer = unsafe { stream.as_ptr() } as *mut AVStream;
    let guessed = unsafe {
        av_guess_frame_rate(input_context.as_mut_ptr(), stream_pointer, ptr::null_mut())
    };
    present_rational(Rational::from(guessed))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    // Serialises the tests below; each asserts exact counter values.
    static COUNTER_LOCK: Mutex<()> = Mutex::new(());

    /// One tenth of a second of silent 8 kHz mono PCM in a WAV container.
    fn silent_wav() -> Vec<u8> {
        let data_len: u32 = 1600;
        let mut bytes = Vec::with_capacity(44 + data_len as usize);
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes.extend_from_slice(&16_u32.to_le_bytes());
        bytes.extend_from_slice(&1_u16.to_le_bytes());
        bytes.extend_from_slice(&1_u16.to_le_bytes());
        bytes.extend_from_slice(&8_000_u32.to_le_bytes());
        bytes.extend_from_slice(&16_000_u32.to_le_bytes());
        bytes.extend_from_slice(&2_u16.to_le_bytes());
        bytes.extend_from_slice(&16_u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.resize(44 + data_len as usize, 0);
        bytes
    }

    #[test]
    fn lease_counts_until_dropped() {
        let _guard = COUNTER_LOCK.lock().unwrap();
        let before = live_container_count();
        let lease = ContainerLease::acquire();
        assert_eq!(live_container_count(), before + 1);
        drop(lease);
        assert_eq!(live_container_count(), before);
    }

    #[test]
    fn opened_input_is_counted_until_closed() {
        let _guard = COUNTER_LOCK.lock().unwrap();
        ffmpeg_next::init().unwrap();
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("silence.wav");
        std::fs::write(&path, silent_wav()).unwrap();

        let before = live_container_count();
        let container = CountedInput::open(&path, Dictionary::new()).unwrap();
        assert_eq!(live_container_count(), before + 1);
        drop(container);
        assert_eq!(live_container_count(), before);
    }

    #[test]
    fn setup_failure_after_open_releases_the_container() {
        let _guard = COUNTER_LOCK.lock().unwrap();
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("silence.wav");
        std::fs::write(&path, silent_wav()).unwrap();

        let before = live_container_count();
        let result = MediaSource::open(&path, &LoadOptions::new());
        assert!(matches!(result, Err(LoadVideoError::NoVideoStream)));
        assert_eq!(live_container_count(), before);
    }
}
