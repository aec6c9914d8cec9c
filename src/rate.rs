//! Frame-rate resolution.
//!
//! Containers report frame rate in several places that do not always agree,
//! and any of them can be missing. [`resolve_frame_rate`] walks them in a
//! fixed priority order and takes the first usable one.

use ffmpeg_next::Rational;

use crate::error::LoadVideoError;
use crate::metadata::StreamDescriptor;

type RateAccessor = fn(&StreamDescriptor) -> Option<f64>;

/// Candidates in priority order: codec frame rate, codec sample-rate field,
/// average rate, guessed rate, base rate.
const RATE_CANDIDATES: [(&str, RateAccessor); 5] = [
    ("codec frame rate", declared_frame_rate),
    ("codec sample rate", declared_sample_rate),
    ("average rate", average_rate),
    ("guessed rate", guessed_rate),
    ("base rate", base_rate),
];

fn declared_frame_rate(descriptor: &StreamDescriptor) -> Option<f64> {
    descriptor.declared_frame_rate.map(rational_to_f64)
}

fn declared_sample_rate(descriptor: &StreamDescriptor) -> Option<f64> {
    descriptor.declared_sample_rate.map(f64::from)
}

fn average_rate(descriptor: &StreamDescriptor) -> Option<f64> {
    descriptor.average_rate.map(rational_to_f64)
}

fn guessed_rate(descriptor: &StreamDescriptor) -> Option<f64> {
    descriptor.guessed_rate.map(rational_to_f64)
}

fn base_rate(descriptor: &StreamDescriptor) -> Option<f64> {
    descriptor.base_rate.map(rational_to_f64)
}

/// Resolve the frames-per-second value for a stream, rounded to two decimal
/// places.
///
/// # Errors
///
/// Returns [`LoadVideoError::RateResolution`] when no candidate holds a
/// positive value.
///
/// # Example
///
/// ```
/// use ffmpeg_next::Rational;
/// use vidframes::{StreamDescriptor, resolve_frame_rate};
///
/// let descriptor = StreamDescriptor {
///     average_rate: Some(Rational::new(30_000, 1001)),
///     base_rate: Some(Rational::new(60, 1)),
///     ..StreamDescriptor::default()
/// };
/// assert_eq!(resolve_frame_rate(&descriptor)?, 29.97);
/// # Ok::<(), vidframes::LoadVideoError>(())
/// ```
pub fn resolve_frame_rate(descriptor: &StreamDescriptor) -> Result<f64, LoadVideoError> {
    let (source, rate) =
        first_present(descriptor, &RATE_CANDIDATES).ok_or(LoadVideoError::RateResolution)?;
    log::debug!("Resolved frame rate {rate:.2} from {source}");
    Ok(rate)
}

/// Return the first candidate whose rounded value is strictly positive.
fn first_present(
    descriptor: &StreamDescriptor,
    candidates: &[(&'static str, RateAccessor)],
) -> Option<(&'static str, f64)> {
    candidates.iter().find_map(|(name, accessor)| {
        accessor(descriptor)
            .map(round_to_hundredths)
            .filter(|rate| rate.is_finite() && *rate > 0.0)
            .map(|rate| (*name, rate))
    })
}

fn rational_to_f64(rational: Rational) -> f64 {
    if rational.denominator() == 0 {
        return 0.0;
    }
    rational.numerator() as f64 / rational.denominator() as f64
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round_to_hundredths(23.976_023), 23.98);
        assert_eq!(round_to_hundredths(25.0), 25.0);
    }

    #[test]
    fn skips_values_that_round_to_zero() {
        let descriptor = StreamDescriptor {
            declared_frame_rate: Some(Rational::new(1, 1000)),
            base_rate: Some(Rational::new(24, 1)),
            ..StreamDescriptor::default()
        };
        assert_eq!(
            first_present(&descriptor, &RATE_CANDIDATES),
            Some(("base rate", 24.0))
        );
    }
}
