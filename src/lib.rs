//! # vidframes
//!
//! Iterate the frames of a video file as BGR images, each paired with the
//! audio decoded since the previous frame.
//!
//! `vidframes` opens a container through FFmpeg (via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate), resolves a
//! frame rate and an advertised frame count from whatever metadata the file
//! carries, and exposes the frames as a lazy, pull-based iterator. Audio and
//! video packets are consumed in the order the container stores them; audio
//! decoded between two video frames travels with the later one.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vidframes::{LoadOptions, load_video};
//!
//! let video = load_video("input.mp4", &LoadOptions::new())?;
//! println!(
//!     "{} in {}: {:.2} fps, ~{} frames",
//!     video.name,
//!     video.directory.display(),
//!     video.frames_per_second,
//!     video.frame_count,
//! );
//!
//! for frame in video.frames {
//!     let frame = frame?;
//!     let samples: usize = frame.audio.frames.iter().map(|audio| audio.samples()).sum();
//!     println!("frame {} with {samples} audio samples", frame.index);
//! }
//! # Ok::<(), vidframes::LoadVideoError>(())
//! ```
//!
//! ## Limiting the Sequence
//!
//! ```no_run
//! use vidframes::{LoadOptions, load_video};
//!
//! let video = load_video("input.mp4", &LoadOptions::new().with_limit(10))?;
//! assert!(video.frame_count <= 10);
//! # Ok::<(), vidframes::LoadVideoError>(())
//! ```
//!
//! ## Custom Packet Sources
//!
//! [`InterleavedFrames`] is generic over [`MediaDemuxer`], so the pairing
//! logic can run over any source of tagged packets, not only FFmpeg
//! containers.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on the system.

pub mod config;
pub mod container;
pub mod conversion;
pub mod demux;
pub mod error;
pub mod interleave;
pub mod length;
pub mod loader;
pub mod metadata;
pub mod rate;

pub use config::{DEFAULT_LIMIT, LoadOptions, SWS_FLAGS};
pub use container::{MediaSource, live_container_count};
pub use conversion::BgrImage;
pub use demux::{Demuxed, MediaDemuxer, Timestamped};
pub use error::LoadVideoError;
pub use interleave::{AttachedAudio, InterleavedFrames, VideoFrameRecord};
pub use length::estimate_frame_count;
pub use loader::{LoadedVideo, VideoFrame, VideoFrames, load_video};
pub use metadata::StreamDescriptor;
pub use rate::resolve_frame_rate;
