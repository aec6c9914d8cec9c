//! Error handling integration tests.
//!
//! These tests verify that setup failures surface as the right error and
//! leave no container open. No test in this file yields a video, so the
//! process-wide container count must be zero once each call returns.

use std::{path::Path, sync::Mutex};

use vidframes::{LoadOptions, LoadVideoError, live_container_count, load_video};

// Tests that open real containers assert exact counter values, so they
// must not overlap.
static CONTAINER_LOCK: Mutex<()> = Mutex::new(());

fn lock_containers() -> std::sync::MutexGuard<'static, ()> {
    CONTAINER_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A short silent PCM WAV: a valid container with an audio stream only.
fn silent_wav() -> Vec<u8> {
    let data_len: u32 = 3200;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16_u32.to_le_bytes());
    bytes.extend_from_slice(&1_u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1_u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&16_000_u32.to_le_bytes());
    bytes.extend_from_slice(&32_000_u32.to_le_bytes());
    bytes.extend_from_slice(&2_u16.to_le_bytes());
    bytes.extend_from_slice(&16_u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(44 + data_len as usize, 0);
    bytes
}

#[test]
fn open_nonexistent_file() {
    let _lock = lock_containers();
    let result = load_video("this_file_does_not_exist.mp4", &LoadOptions::new());
    assert!(matches!(result, Err(LoadVideoError::ContainerOpen { .. })));

    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("Failed to open media container"),
        "Error message should mention container open failure: {error_message}",
    );
    assert_eq!(live_container_count(), 0);
}

#[test]
fn open_corrupt_file() {
    let _lock = lock_containers();
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("corrupt.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let result = load_video(&invalid_file_path, &LoadOptions::new());
    match result {
        Err(LoadVideoError::ContainerOpen { path, .. }) => assert_eq!(path, invalid_file_path),
        other => panic!("Expected ContainerOpen, got {other:?}"),
    }
    assert_eq!(live_container_count(), 0, "no container handle may stay open");
}

#[test]
fn open_corrupt_file_with_limit() {
    let _lock = lock_containers();
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("garbage.mkv");
    std::fs::write(&invalid_file_path, [0xde_u8, 0xad, 0xbe, 0xef].repeat(64))
        .expect("Failed to write invalid file");

    let result = load_video(&invalid_file_path, &LoadOptions::new().with_limit(1));
    assert!(result.is_err(), "Expected error for invalid media file");
    assert_eq!(live_container_count(), 0);
}

#[test]
fn no_video_stream_error() {
    let path = "tests/fixtures/sample_audio_only.mp4";
    if !Path::new(path).exists() {
        return;
    }
    let _lock = lock_containers();

    let result = load_video(path, &LoadOptions::new());
    assert!(matches!(result, Err(LoadVideoError::NoVideoStream)));

    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("No video stream"),
        "Error should mention no video stream: {error_message}",
    );
    assert_eq!(live_container_count(), 0);
}

#[test]
fn opened_container_without_video_is_released() {
    let _lock = lock_containers();
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let audio_path = temporary_directory.path().join("silence.wav");
    std::fs::write(&audio_path, silent_wav()).expect("Failed to write WAV file");

    // NoVideoStream can only be raised once FFmpeg has opened the file.
    let result = load_video(&audio_path, &LoadOptions::new());
    assert!(
        matches!(result, Err(LoadVideoError::NoVideoStream)),
        "Expected NoVideoStream, got {result:?}",
    );
    assert_eq!(live_container_count(), 0, "opened container must be closed on error");
}
