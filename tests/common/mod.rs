//! Shared test fakes for pipeline collaborators

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use image::RgbImage;
use taskmaster::store::{FrameStore, NarrationStore};
use taskmaster::{Critic, Error, FrameHandle, FrameSource, Narrator, Pipeline, Result};

/// A solid-color frame of the given dimensions
#[must_use]
pub fn test_frame(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, image::Rgb([64, 128, 192]))
}

/// Camera fake yielding a fixed frame, or failing to open
pub struct FakeCamera {
    frame: Option<RgbImage>,
    fail_open: bool,
    /// Set when a handle handed out by this camera is dropped
    pub released: Arc<AtomicBool>,
}

impl FakeCamera {
    #[must_use]
    pub fn with_frame(frame: RgbImage) -> Self {
        Self {
            frame: Some(frame),
            fail_open: false,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Camera that opens fine but produces no frame
    #[must_use]
    pub fn empty() -> Self {
        Self {
            frame: None,
            fail_open: false,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Camera whose device cannot be acquired
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            frame: None,
            fail_open: true,
            released: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl FrameSource for FakeCamera {
    fn open(&self) -> Result<Box<dyn FrameHandle>> {
        if self.fail_open {
            return Err(Error::DeviceUnavailable("fake device busy".to_string()));
        }
        Ok(Box::new(FakeHandle {
            frame: self.frame.clone(),
            released: self.released.clone(),
        }))
    }
}

struct FakeHandle {
    frame: Option<RgbImage>,
    released: Arc<AtomicBool>,
}

impl FrameHandle for FakeHandle {
    fn grab(&mut self) -> Result<Option<RgbImage>> {
        Ok(self.frame.take())
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Critic fake returning a canned critique and counting calls
pub struct FakeCritic {
    reply: String,
    pub calls: Arc<AtomicUsize>,
}

impl FakeCritic {
    #[must_use]
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Critic for FakeCritic {
    async fn critique(&self, _encoded_jpeg: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

/// Narrator fake returning canned audio bytes and counting calls
pub struct FakeNarrator {
    audio: Vec<u8>,
    pub calls: Arc<AtomicUsize>,
}

impl FakeNarrator {
    #[must_use]
    pub fn new(audio: Vec<u8>) -> Self {
        Self {
            audio,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Narrator for FakeNarrator {
    async fn narrate(&self, _text: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.audio.clone())
    }
}

/// Assemble a pipeline over fakes with stores rooted at `data_dir`
pub fn build_pipeline(
    data_dir: &Path,
    camera: Arc<FakeCamera>,
    critic: Arc<FakeCritic>,
    narrator: Arc<FakeNarrator>,
) -> Pipeline {
    let frames_dir = data_dir.join("frames");
    let narration_dir = data_dir.join("narration");
    std::fs::create_dir_all(&frames_dir).expect("frames dir");
    std::fs::create_dir_all(&narration_dir).expect("narration dir");

    Pipeline::new(
        camera,
        critic,
        narrator,
        FrameStore::new(frames_dir),
        NarrationStore::new(narration_dir),
    )
}
