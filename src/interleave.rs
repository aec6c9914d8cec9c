//! Lazy, pull-based frame iteration with audio attachment.
//!
//! [`InterleavedFrames`] walks the packets of the selected video and audio
//! streams in the order the container stores them. Audio is decoded into an
//! accumulator; every decoded video frame is yielded together with whatever
//! the accumulator holds at that moment, and the accumulator starts over.
//!
//! Each call to [`next()`](Iterator::next) reads and decodes just enough
//! packets to produce the next video frame. The underlying demuxer is
//! dropped as soon as the sequence ends, fails, or the iterator itself is
//! dropped.
//!
//! # Example
//!
//! ```no_run
//! use vidframes::{LoadOptions, load_video};
//!
//! let video = load_video("input.mp4", &LoadOptions::new())?;
//! for record in video.frames {
//!     let record = record?;
//!     println!(
//!         "frame {} carries {} audio frame(s)",
//!         record.index,
//!         record.audio.frames.len(),
//!     );
//! }
//! # Ok::<(), vidframes::LoadVideoError>(())
//! ```

use std::{
    collections::VecDeque,
    fmt::{Debug, Formatter, Result as FmtResult},
    iter::FusedIterator,
    mem,
    sync::Arc,
};

use crate::demux::{Demuxed, MediaDemuxer, Timestamped};
use crate::error::LoadVideoError;

/// Audio decoded since the previous video frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachedAudio<A> {
    /// Decoded audio sub-frames in arrival order.
    pub frames: Vec<A>,
    /// Name of the audio codec, or `None` when the file has no audio stream.
    pub codec: Option<Arc<str>>,
}

/// One element of the frame sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrameRecord<I, A> {
    /// The decoded video frame.
    pub image: I,
    /// Zero-based position of this frame in the sequence.
    pub index: u64,
    /// Audio decoded between the previous frame and this one.
    pub audio: AttachedAudio<A>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Demuxing,
    /// Input exhausted; only frames already decoded remain.
    Draining,
    Done,
}

/// A lazy iterator over video frames paired with their audio.
///
/// Yields `Ok(record)` for each video frame, in strictly increasing index
/// order. After yielding an `Err` or reaching the end it yields `None`
/// forever.
pub struct InterleavedFrames<D: MediaDemuxer> {
    demuxer: Option<D>,
    state: State,
    limit: Option<u64>,
    expected_length: u64,
    index: u64,
    packets_skipped: u64,
    audio: Vec<D::AudioFrame>,
    audio_codec: Option<Arc<str>>,
    decoded_video: Vec<D::Image>,
    pending_video: VecDeque<D::Image>,
}

impl<D: MediaDemuxer> Debug for InterleavedFrames<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("InterleavedFrames")
            .field("state", &self.state)
            .field("limit", &self.limit)
            .field("expected_length", &self.expected_length)
            .field("index", &self.index)
            .field("packets_skipped", &self.packets_skipped)
            .field("buffered_audio", &self.audio.len())
            .field("audio_codec", &self.audio_codec)
            .finish_non_exhaustive()
    }
}

impl<D: MediaDemuxer> InterleavedFrames<D> {
    /// Wrap a demuxer.
    ///
    /// `expected_length` is the advertised frame count reported by
    /// [`expected_length`](Self::expected_length); it does not bound the
    /// iteration. `limit` does: no more than `limit` frames are yielded.
    pub fn new(demuxer: D, expected_length: u64, limit: Option<u64>) -> Self {
        let audio_codec = demuxer.audio_codec_name().map(Arc::from);
        Self {
            demuxer: Some(demuxer),
            state: State::Demuxing,
            limit,
            expected_length,
            index: 0,
            packets_skipped: 0,
            audio: Vec::new(),
            audio_codec,
            decoded_video: Vec::new(),
            pending_video: VecDeque::new(),
        }
    }

    /// The advertised total number of frames.
    pub fn expected_length(&self) -> u64 {
        self.expected_length
    }

    /// Number of frames yielded so far.
    pub fn frames_emitted(&self) -> u64 {
        self.index
    }

    /// Number of packets discarded for lacking a decode timestamp.
    pub fn packets_skipped(&self) -> u64 {
        self.packets_skipped
    }

    /// Returns `true` once the sequence has ended, successfully or not.
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Returns `true` while the demuxer (and the container behind it) is
    /// still held.
    pub fn holds_source(&self) -> bool {
        self.demuxer.is_some()
    }

    /// Take the audio decoded after the last yielded frame.
    ///
    /// Only meaningful once [`is_done`](Self::is_done) returns `true`; while
    /// iteration is in progress the buffered audio still belongs to the next
    /// frame and an empty vector is returned. A sequence that ended with an
    /// error has no trailing audio.
    pub fn take_trailing_audio(&mut self) -> Vec<D::AudioFrame> {
        if self.is_done() {
            mem::take(&mut self.audio)
        } else {
            Vec::new()
        }
    }

    fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|limit| self.index >= limit)
    }

    fn emit(&mut self, image: D::Image) -> VideoFrameRecord<D::Image, D::AudioFrame> {
        let record = VideoFrameRecord {
            image,
            index: self.index,
            audio: AttachedAudio {
                frames: mem::take(&mut self.audio),
                codec: self.audio_codec.clone(),
            },
        };
        self.index += 1;
        record
    }

    /// Enter the terminal state and release the demuxer.
    fn finish(&mut self) {
        self.state = State::Done;
        self.decoded_video.clear();
        self.pending_video.clear();
        if self.demuxer.take().is_some() {
            log::debug!(
                "Released media source after {} frame(s), {} skipped packet(s)",
                self.index,
                self.packets_skipped,
            );
        }
    }

    /// Read and decode one packet.
    fn pump(&mut self) -> Result<(), LoadVideoError> {
        let Some(demuxer) = self.demuxer.as_mut() else {
            self.state = State::Done;
            return Ok(());
        };

        match demuxer.read_packet()? {
            None => {
                demuxer.drain_audio(&mut self.audio)?;
                demuxer.drain_video(&mut self.decoded_video)?;
                self.pending_video.extend(self.decoded_video.drain(..));
                self.state = State::Draining;
            }
            Some(demuxed) if demuxed.packet().decode_timestamp().is_none() => {
                self.packets_skipped += 1;
                log::trace!("Skipping packet without decode timestamp");
            }
            Some(Demuxed::Video(packet)) => {
                demuxer.decode_video(&packet, &mut self.decoded_video)?;
                self.pending_video.extend(self.decoded_video.drain(..));
            }
            Some(Demuxed::Audio(packet)) => {
                demuxer.decode_audio(&packet, &mut self.audio)?;
            }
        }

        Ok(())
    }
}

impl<D: MediaDemuxer> Iterator for InterleavedFrames<D> {
    type Item = Result<VideoFrameRecord<D::Image, D::AudioFrame>, LoadVideoError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.state == State::Done {
                return None;
            }

            if self.limit_reached() {
                self.finish();
                return None;
            }

            if let Some(image) = self.pending_video.pop_front() {
                return Some(Ok(self.emit(image)));
            }

            if self.state == State::Draining {
                self.finish();
                return None;
            }

            if let Err(error) = self.pump() {
                log::debug!("Frame iteration failed at index {}: {error}", self.index);
                self.audio.clear();
                self.finish();
                return Some(Err(error));
            }
        }
    }
}

impl<D: MediaDemuxer> FusedIterator for InterleavedFrames<D> {}
