//! Frame-rate resolution tests on hand-built descriptors.

use ffmpeg_next::Rational;
use vidframes::{LoadVideoError, StreamDescriptor, resolve_frame_rate};

#[test]
fn base_rate_alone_is_used() {
    let descriptor = StreamDescriptor {
        base_rate: Some(Rational::new(30_000, 1001)),
        ..StreamDescriptor::default()
    };
    assert_eq!(resolve_frame_rate(&descriptor).unwrap(), 29.97);
}

#[test]
fn average_rate_beats_base_rate() {
    let descriptor = StreamDescriptor {
        average_rate: Some(Rational::new(25, 1)),
        base_rate: Some(Rational::new(50, 1)),
        ..StreamDescriptor::default()
    };
    assert_eq!(resolve_frame_rate(&descriptor).unwrap(), 25.0);
}

#[test]
fn guessed_rate_beats_base_rate() {
    let descriptor = StreamDescriptor {
        guessed_rate: Some(Rational::new(24_000, 1001)),
        base_rate: Some(Rational::new(48, 1)),
        ..StreamDescriptor::default()
    };
    assert_eq!(resolve_frame_rate(&descriptor).unwrap(), 23.98);
}

#[test]
fn declared_frame_rate_beats_everything() {
    let descriptor = StreamDescriptor {
        declared_frame_rate: Some(Rational::new(60, 1)),
        declared_sample_rate: Some(44_100),
        average_rate: Some(Rational::new(25, 1)),
        guessed_rate: Some(Rational::new(24, 1)),
        base_rate: Some(Rational::new(30, 1)),
        ..StreamDescriptor::default()
    };
    assert_eq!(resolve_frame_rate(&descriptor).unwrap(), 60.0);
}

#[test]
fn sample_rate_field_beats_stream_rates() {
    let descriptor = StreamDescriptor {
        declared_sample_rate: Some(30),
        average_rate: Some(Rational::new(25, 1)),
        ..StreamDescriptor::default()
    };
    assert_eq!(resolve_frame_rate(&descriptor).unwrap(), 30.0);
}

#[test]
fn zero_valued_candidates_fall_through() {
    let descriptor = StreamDescriptor {
        declared_frame_rate: Some(Rational::new(0, 1)),
        average_rate: Some(Rational::new(12, 0)),
        base_rate: Some(Rational::new(15, 1)),
        ..StreamDescriptor::default()
    };
    assert_eq!(resolve_frame_rate(&descriptor).unwrap(), 15.0);
}

#[test]
fn non_integer_ratio_uses_true_division() {
    let descriptor = StreamDescriptor {
        average_rate: Some(Rational::new(1, 3)),
        ..StreamDescriptor::default()
    };
    assert_eq!(resolve_frame_rate(&descriptor).unwrap(), 0.33);
}

#[test]
fn missing_metadata_is_an_error() {
    let result = resolve_frame_rate(&StreamDescriptor::default());
    assert!(matches!(result, Err(LoadVideoError::RateResolution)));

    let message = result.unwrap_err().to_string();
    assert!(
        message.contains("fps"),
        "Error message should mention fps: {message}",
    );
}
