//! Webcam capture stage
//!
//! Acquires the default camera, waits out sensor warm-up, grabs exactly one
//! frame, downsamples it, and writes it into the frame store. The device
//! handle is a scoped resource: dropping a [`FrameHandle`] releases the
//! device, so every exit path (success, no frame, error) gives it back.

use std::sync::Arc;
use std::time::Duration;

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};

use crate::store::FrameStore;
use crate::{Error, Result};

/// Fixed sensor warm-up interval, letting auto-exposure stabilize
pub const WARMUP: Duration = Duration::from_secs(2);

/// Longer edge of the stored frame, in pixels
pub const MAX_EDGE: u32 = 250;

/// A camera device that can be opened for a single grab
pub trait FrameSource: Send + Sync {
    /// Acquire the device
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceUnavailable`] if the device cannot be opened
    fn open(&self) -> Result<Box<dyn FrameHandle>>;
}

/// An acquired camera handle; dropping it releases the device
pub trait FrameHandle: Send {
    /// Grab one frame
    ///
    /// `Ok(None)` means the device produced no frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Capture`] if a produced frame cannot be decoded
    fn grab(&mut self) -> Result<Option<RgbImage>>;
}

/// Default webcam backed by `nokhwa`
pub struct Webcam {
    index: u32,
}

impl Webcam {
    /// Webcam at the given device index (0 is the default device)
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self { index }
    }
}

impl FrameSource for Webcam {
    fn open(&self) -> Result<Box<dyn FrameHandle>> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
        let mut camera = nokhwa::Camera::new(CameraIndex::Index(self.index), requested)
            .map_err(|e| Error::DeviceUnavailable(format!("cannot open webcam: {e}")))?;
        camera
            .open_stream()
            .map_err(|e| Error::DeviceUnavailable(format!("cannot start stream: {e}")))?;

        Ok(Box::new(WebcamHandle { camera }))
    }
}

/// Open webcam stream; releases the device on drop
struct WebcamHandle {
    camera: nokhwa::Camera,
}

impl FrameHandle for WebcamHandle {
    fn grab(&mut self) -> Result<Option<RgbImage>> {
        let Ok(buffer) = self.camera.frame() else {
            // Device yielded no frame; the caller decides what that means.
            return Ok(None);
        };

        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::Capture(format!("cannot decode frame: {e}")))?;

        // Rebuild from raw parts so nokhwa's image types never leak out.
        let (width, height) = (decoded.width(), decoded.height());
        let image = RgbImage::from_raw(width, height, decoded.into_raw())
            .ok_or_else(|| Error::Capture("frame buffer size mismatch".to_string()))?;
        Ok(Some(image))
    }
}

impl Drop for WebcamHandle {
    fn drop(&mut self) {
        let _ = self.camera.stop_stream();
    }
}

/// Capture stage: acquire device, warm up, grab once, downsample, store
pub struct Capture {
    source: Arc<dyn FrameSource>,
}

impl Capture {
    /// Capture stage over the given device
    #[must_use]
    pub fn new(source: Arc<dyn FrameSource>) -> Self {
        Self { source }
    }

    /// Run one capture, overwriting the frame store slot
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceUnavailable`] if the device cannot be opened,
    /// and [`Error::Capture`] if the grab yields no frame or the frame
    /// cannot be written. The device is released on every path.
    pub async fn run(&self, store: &FrameStore) -> Result<()> {
        let mut device = self.source.open()?;
        tokio::time::sleep(WARMUP).await;

        let frame = device
            .grab()?
            .ok_or_else(|| Error::Capture("device returned no frame".to_string()))?;
        drop(device);

        let (width, height) = frame.dimensions();
        tracing::debug!(width, height, "frame grabbed");

        store.write(&downsample(frame))
    }
}

/// Downsample proportionally so the longer edge equals [`MAX_EDGE`]
fn downsample(frame: RgbImage) -> DynamicImage {
    DynamicImage::ImageRgb8(frame).resize(MAX_EDGE, MAX_EDGE, FilterType::Lanczos3)
}
