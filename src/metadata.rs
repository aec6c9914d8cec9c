//! Stream metadata used at setup time.
//!
//! [`StreamDescriptor`] collects every field the rate resolver and the
//! length estimator consult. It is read once from the opened container and
//! never changes afterwards. Fields are `Option`s because containers
//! routinely omit them.

use std::time::Duration;

use ffmpeg_next::Rational;

/// Frame-rate, frame-count and duration metadata for the selected video
/// stream, plus codec names for both selected streams.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use ffmpeg_next::Rational;
/// use vidframes::StreamDescriptor;
///
/// let descriptor = StreamDescriptor {
///     average_rate: Some(Rational::new(30_000, 1001)),
///     container_duration: Some(Duration::from_secs(2)),
///     ..StreamDescriptor::default()
/// };
/// assert!(descriptor.declared_frame_rate.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamDescriptor {
    /// Frame rate declared by the video codec context.
    pub declared_frame_rate: Option<Rational>,
    /// Sample-rate field of the video codec parameters, consulted as a rate
    /// fallback.
    pub declared_sample_rate: Option<u32>,
    /// The stream's average frame rate.
    pub average_rate: Option<Rational>,
    /// FFmpeg's guessed frame rate for the stream.
    pub guessed_rate: Option<Rational>,
    /// The stream's base (real) frame rate.
    pub base_rate: Option<Rational>,
    /// Frame count reported by the container for the video stream.
    pub encoded_frame_count: Option<u64>,
    /// Total container duration.
    pub container_duration: Option<Duration>,
    /// Duration of the video stream itself.
    pub stream_duration: Option<Duration>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Video codec name (e.g. `"h264"`).
    pub video_codec: String,
    /// Audio codec name, if the container carries an audio stream.
    pub audio_codec: Option<String>,
}

/// Treat zero or negative rationals, and zero denominators, as missing.
pub(crate) fn present_rational(rational: Rational) -> Option<Rational> {
    (rational.numerator() > 0 && rational.denominator() > 0).then_some(rational)
}

/// Convert a duration expressed in `time_base` units, ignoring unset or
/// negative values.
pub(crate) fn duration_from_time_base(value: i64, time_base: Rational) -> Option<Duration> {
    if value <= 0 || time_base.denominator() <= 0 || time_base.numerator() <= 0 {
        return None;
    }
    let seconds = value as f64 * time_base.numerator() as f64 / time_base.denominator() as f64;
    Some(Duration::from_secs_f64(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rationals_are_absent() {
        assert_eq!(present_rational(Rational::new(0, 1)), None);
        assert_eq!(present_rational(Rational::new(25, 0)), None);
        assert_eq!(
            present_rational(Rational::new(25, 1)),
            Some(Rational::new(25, 1))
        );
    }

    #[test]
    fn microsecond_time_base() {
        let duration = duration_from_time_base(2_500_000, Rational::new(1, 1_000_000));
        assert_eq!(duration, Some(Duration::from_millis(2500)));
        assert_eq!(duration_from_time_base(-1, Rational::new(1, 1_000_000)), None);
    }
}
