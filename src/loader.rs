//! Setup: open, resolve, estimate.
//!
//! [`load_video`] is the main entry point of the crate. It opens the
//! container, resolves the frame rate and the advertised frame count once,
//! and hands back a [`LoadedVideo`] whose [`frames`](LoadedVideo::frames)
//! field is the lazy frame sequence.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use ffmpeg_next::frame::Audio as AudioFrame;

use crate::config::LoadOptions;
use crate::container::MediaSource;
use crate::conversion::BgrImage;
use crate::error::LoadVideoError;
use crate::interleave::{InterleavedFrames, VideoFrameRecord};
use crate::length::estimate_frame_count;
use crate::rate::resolve_frame_rate;

/// The lazy frame sequence over an FFmpeg container.
pub type VideoFrames = InterleavedFrames<MediaSource>;

/// One element of [`VideoFrames`].
pub type VideoFrame = VideoFrameRecord<BgrImage, AudioFrame>;

/// A video prepared for iteration.
pub struct LoadedVideo {
    /// The frame sequence. Owns the open container.
    pub frames: VideoFrames,
    /// Directory component of the source path.
    pub directory: PathBuf,
    /// File name of the source, without its extension.
    pub name: String,
    /// Resolved frame rate, rounded to two decimal places.
    pub frames_per_second: f64,
    /// Advertised number of frames (capped by the limit, if any).
    pub frame_count: u64,
}

impl Debug for LoadedVideo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("LoadedVideo")
            .field("directory", &self.directory)
            .field("name", &self.name)
            .field("frames_per_second", &self.frames_per_second)
            .field("frame_count", &self.frame_count)
            .field("frames", &self.frames)
            .finish()
    }
}

/// Open a video and prepare its frame sequence.
///
/// # Errors
///
/// Returns [`LoadVideoError::ContainerOpen`] or
/// [`LoadVideoError::NoVideoStream`] if the file cannot be used, and
/// [`LoadVideoError::RateResolution`] if no frame rate can be determined.
/// The container is closed before any of these errors is returned.
///
/// # Example
///
/// ```no_run
/// use vidframes::{LoadOptions, load_video};
///
/// let video = load_video("clips/intro.mp4", &LoadOptions::new().with_limit(5))?;
/// println!("{} @ {} fps, {} frames", video.name, video.frames_per_second, video.frame_count);
/// for frame in video.frames {
///     let frame = frame?;
///     let (height, width, _) = frame.image.shape();
///     println!("#{} {width}x{height}", frame.index);
/// }
/// # Ok::<(), vidframes::LoadVideoError>(())
/// ```
pub fn load_video<P: AsRef<Path>>(
    path: P,
    options: &LoadOptions,
) -> Result<LoadedVideo, LoadVideoError> {
    let path = path.as_ref();
    let (directory, name) = split_file_path(path);

    let source = MediaSource::open(path, options)?;
    let descriptor = source.descriptor();

    let frames_per_second = resolve_frame_rate(descriptor)?;
    let frame_count = estimate_frame_count(descriptor, frames_per_second, options.limit());

    log::info!(
        "Loaded video: {} ({}x{}, {:.2} fps, {} frame(s){})",
        path.display(),
        descriptor.width,
        descriptor.height,
        frames_per_second,
        frame_count,
        match options.limit() {
            Some(limit) => format!(", limit {limit}"),
            None => String::new(),
        },
    );

    Ok(LoadedVideo {
        frames: InterleavedFrames::new(source, frame_count, options.limit()),
        directory,
        name,
        frames_per_second,
        frame_count,
    })
}

/// Split a path into its directory and its file stem.
pub(crate) fn split_file_path(path: &Path) -> (PathBuf, String) {
    let directory = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    (directory, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_directory_and_stem() {
        let (directory, name) = split_file_path(Path::new("/videos/holiday/beach.mp4"));
        assert_eq!(directory, PathBuf::from("/videos/holiday"));
        assert_eq!(name, "beach");
    }

    #[test]
    fn bare_file_name_has_empty_directory() {
        let (directory, name) = split_file_path(Path::new("clip.tar.mkv"));
        assert_eq!(directory, PathBuf::new());
        assert_eq!(name, "clip.tar");
    }
}
