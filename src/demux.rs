//! The packet source seam.
//!
//! [`InterleavedFrames`](crate::InterleavedFrames) does not talk to FFmpeg
//! directly. It pulls [`Demuxed`] packets from a [`MediaDemuxer`] and asks
//! the same demuxer to decode them. [`MediaSource`](crate::MediaSource) is
//! the FFmpeg-backed implementation; tests and benchmarks plug in in-memory
//! ones.

use ffmpeg_next::Packet;

use crate::error::LoadVideoError;

/// A packet tagged with the selected stream it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Demuxed<P> {
    /// A packet of the selected video stream.
    Video(P),
    /// A packet of the selected audio stream.
    Audio(P),
}

impl<P> Demuxed<P> {
    /// The packet, regardless of which stream it came from.
    pub fn packet(&self) -> &P {
        match self {
            Demuxed::Video(packet) | Demuxed::Audio(packet) => packet,
        }
    }
}

/// Access to a packet's decode timestamp.
pub trait Timestamped {
    /// The decode timestamp, or `None` when the container did not set one.
    fn decode_timestamp(&self) -> Option<i64>;
}

impl Timestamped for Packet {
    fn decode_timestamp(&self) -> Option<i64> {
        self.dts()
    }
}

/// A source of interleaved video and audio packets plus the decoders for
/// them.
///
/// Packets must be returned in container arrival order. Decoding appends
/// zero or more frames to the supplied vector; an empty result is valid
/// (decoders are allowed to hold frames back).
pub trait MediaDemuxer {
    /// Compressed packet type.
    type Packet: Timestamped;
    /// Decoded and converted video frame.
    type Image;
    /// Decoded audio sub-frame.
    type AudioFrame;

    /// Read the next packet of either selected stream. `Ok(None)` means the
    /// container is exhausted.
    fn read_packet(&mut self) -> Result<Option<Demuxed<Self::Packet>>, LoadVideoError>;

    /// Decode one video packet.
    fn decode_video(
        &mut self,
        packet: &Self::Packet,
        images: &mut Vec<Self::Image>,
    ) -> Result<(), LoadVideoError>;

    /// Decode one audio packet.
    fn decode_audio(
        &mut self,
        packet: &Self::Packet,
        frames: &mut Vec<Self::AudioFrame>,
    ) -> Result<(), LoadVideoError>;

    /// Flush the video decoder at end of input.
    fn drain_video(&mut self, _images: &mut Vec<Self::Image>) -> Result<(), LoadVideoError> {
        Ok(())
    }

    /// Flush the audio decoder at end of input.
    fn drain_audio(&mut self, _frames: &mut Vec<Self::AudioFrame>) -> Result<(), LoadVideoError> {
        Ok(())
    }

    /// Name of the audio codec, if an audio stream is selected.
    fn audio_codec_name(&self) -> Option<&str>;
}
