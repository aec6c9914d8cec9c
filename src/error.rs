//! Error types for the `vidframes` crate.
//!
//! [`LoadVideoError`] is the single error type returned by setup
//! ([`load_video`](crate::load_video)) and by every element of the frame
//! sequence. All variants are fatal: the sequence stops after surfacing one.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `vidframes` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadVideoError {
    /// None of the frame-rate metadata fields carried a usable value.
    #[error("Failed to get video fps: no frame rate metadata available")]
    RateResolution,

    /// The file could not be opened or parsed as a media container.
    #[error("Failed to open media container at {path}: {reason}")]
    ContainerOpen {
        /// Path that was passed to [`crate::load_video`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The container does not hold a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A packet could not be decoded.
    #[error("Failed to decode packet: {0}")]
    Decode(String),

    /// Reading the next packet from the container failed.
    #[error("Failed to read packet: {0}")]
    Demux(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while converting a frame.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for LoadVideoError {
    fn from(error: FfmpegError) -> Self {
        LoadVideoError::FfmpegError(error.to_string())
    }
}
