//! End-to-end pipeline runs over fake collaborators
//!
//! Uses paused tokio time so the fixed camera warm-up elapses instantly.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use taskmaster::camera::MAX_EDGE;
use taskmaster::store::FRAME_FILE;

mod common;
use common::{build_pipeline, test_frame, FakeCamera, FakeCritic, FakeNarrator};

const CRITIQUE: &str = "Sit up straight! Were you rushing or were you dragging?";

#[tokio::test(start_paused = true)]
async fn happy_path_returns_critique_and_narration() {
    let dir = tempfile::tempdir().unwrap();
    let camera = Arc::new(FakeCamera::with_frame(test_frame(1920, 1080)));
    let critic = Arc::new(FakeCritic::new(CRITIQUE));
    let narrator = Arc::new(FakeNarrator::new(vec![7u8; 10]));

    let pipeline = build_pipeline(dir.path(), camera.clone(), critic.clone(), narrator.clone());
    let output = pipeline.run().await.unwrap();

    assert_eq!(output.analysis, CRITIQUE);
    assert_eq!(critic.call_count(), 1);
    assert_eq!(narrator.call_count(), 1);

    // Narration artifact holds exactly the synthesized bytes
    let audio = std::fs::read(&output.audio_file_path).unwrap();
    assert_eq!(audio, vec![7u8; 10]);

    // Frame slot holds one JPEG downsampled to the fixed longer edge
    let frame_path = dir.path().join("frames").join(FRAME_FILE);
    let (width, height) = image::image_dimensions(&frame_path).unwrap();
    assert_eq!(width, MAX_EDGE);
    assert!((140..=141).contains(&height)); // 1080 * 250 / 1920, within rounding
}

#[tokio::test(start_paused = true)]
async fn camera_open_failure_aborts_before_external_calls() {
    let dir = tempfile::tempdir().unwrap();
    let camera = Arc::new(FakeCamera::unavailable());
    let critic = Arc::new(FakeCritic::new(CRITIQUE));
    let narrator = Arc::new(FakeNarrator::new(vec![0u8; 10]));

    let pipeline = build_pipeline(dir.path(), camera, critic.clone(), narrator.clone());
    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, taskmaster::Error::DeviceUnavailable(_)));
    assert_eq!(critic.call_count(), 0);
    assert_eq!(narrator.call_count(), 0);

    // No frame was written
    assert!(!dir.path().join("frames").join(FRAME_FILE).exists());
}

#[tokio::test(start_paused = true)]
async fn empty_grab_fails_but_releases_device() {
    let dir = tempfile::tempdir().unwrap();
    let camera = Arc::new(FakeCamera::empty());
    let released = camera.released.clone();
    let critic = Arc::new(FakeCritic::new(CRITIQUE));
    let narrator = Arc::new(FakeNarrator::new(Vec::new()));

    let pipeline = build_pipeline(dir.path(), camera, critic.clone(), narrator);
    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, taskmaster::Error::Capture(_)));
    assert!(released.load(Ordering::SeqCst));
    assert_eq!(critic.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn device_released_on_successful_run() {
    let dir = tempfile::tempdir().unwrap();
    let camera = Arc::new(FakeCamera::with_frame(test_frame(640, 480)));
    let released = camera.released.clone();
    let critic = Arc::new(FakeCritic::new(CRITIQUE));
    let narrator = Arc::new(FakeNarrator::new(vec![1]));

    let pipeline = build_pipeline(dir.path(), camera, critic, narrator);
    pipeline.run().await.unwrap();

    assert!(released.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn sequential_runs_overwrite_frame_and_append_narrations() {
    let dir = tempfile::tempdir().unwrap();
    let critic = Arc::new(FakeCritic::new(CRITIQUE));
    let narrator = Arc::new(FakeNarrator::new(vec![9u8; 4]));

    // Fresh camera per run; the fake hands out its frame once
    let first_cam = Arc::new(FakeCamera::with_frame(test_frame(1920, 1080)));
    let pipeline = build_pipeline(dir.path(), first_cam, critic.clone(), narrator.clone());
    let first = pipeline.run().await.unwrap();

    let second_cam = Arc::new(FakeCamera::with_frame(test_frame(1920, 1080)));
    let pipeline = build_pipeline(dir.path(), second_cam, critic.clone(), narrator.clone());
    let second = pipeline.run().await.unwrap();

    // Exactly one frame file survives both runs
    let frames: Vec<_> = std::fs::read_dir(dir.path().join("frames"))
        .unwrap()
        .collect();
    assert_eq!(frames.len(), 1);

    // Two distinct narration artifacts
    assert_ne!(first.audio_file_path, second.audio_file_path);
    let narrations = std::fs::read_dir(dir.path().join("narration")).unwrap().count();
    assert_eq!(narrations, 2);

    assert_eq!(critic.call_count(), 2);
    assert_eq!(narrator.call_count(), 2);
}
