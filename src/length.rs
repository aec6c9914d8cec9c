//! Frame-count estimation.
//!
//! The advertised length of the frame sequence comes from the container's
//! frame count when it reports one, otherwise from duration × frame rate.
//! An optional limit caps the advertised value.

use crate::metadata::StreamDescriptor;

/// Compute the advertised number of frames.
///
/// Uses [`StreamDescriptor::encoded_frame_count`] when it is present and
/// non-zero. Otherwise estimates `floor(duration_seconds × frames_per_second)`
/// from the container duration, falling back to the stream duration, and
/// finally to `0` when neither is known. With `limit` set the result is
/// `min(count, limit)`.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use vidframes::{StreamDescriptor, estimate_frame_count};
///
/// let descriptor = StreamDescriptor {
///     container_duration: Some(Duration::from_secs(10)),
///     ..StreamDescriptor::default()
/// };
/// assert_eq!(estimate_frame_count(&descriptor, 24.0, None), 240);
/// assert_eq!(estimate_frame_count(&descriptor, 24.0, Some(10)), 10);
/// ```
pub fn estimate_frame_count(
    descriptor: &StreamDescriptor,
    frames_per_second: f64,
    limit: Option<u64>,
) -> u64 {
    let count = match descriptor.encoded_frame_count.filter(|&count| count > 0) {
        Some(count) => count,
        None => estimate_from_duration(descriptor, frames_per_second),
    };

    match limit {
        Some(limit) => count.min(limit),
        None => count,
    }
}

fn estimate_from_duration(descriptor: &StreamDescriptor, frames_per_second: f64) -> u64 {
    let Some(duration) = descriptor
        .container_duration
        .or(descriptor.stream_duration)
    else {
        log::warn!("No frame count or duration metadata; advertising 0 frames");
        return 0;
    };

    let estimate = (duration.as_secs_f64() * frames_per_second).floor();
    if estimate.is_finite() && estimate > 0.0 {
        estimate as u64
    } else {
        0
    }
}
