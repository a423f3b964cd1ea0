//! Frame and narration stores
//!
//! The frame store is a single fixed-path slot, overwritten on every
//! capture. The narration store is append-only: each synthesis lands in a
//! fresh uniquely-named subdirectory and is never touched again. Both runs
//! may race on the frame slot; the encode read tolerates OS-level lock
//! contention with a bounded retry, nothing more.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use image::DynamicImage;
use rand::RngCore;

use crate::{Error, Result};

/// Fixed file name of the single frame slot
pub const FRAME_FILE: &str = "frame.jpg";

/// Fixed file name of each narration artifact
pub const AUDIO_FILE: &str = "audio.mp3";

/// Random width of narration artifact ids
const ID_BYTES: usize = 30;

/// Backoff between retries of a lock-contended frame read
const RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Deadline after which a lock-contended frame read gives up
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Single-slot store for the most recently captured frame
#[derive(Debug, Clone)]
pub struct FrameStore {
    path: PathBuf,
}

impl FrameStore {
    /// Frame store rooted at the given directory
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(FRAME_FILE),
        }
    }

    /// Path of the frame slot
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a frame as JPEG, overwriting any prior content
    ///
    /// # Errors
    ///
    /// Returns [`Error::Capture`] if encoding or writing fails
    pub fn write(&self, image: &DynamicImage) -> Result<()> {
        image
            .save(&self.path)
            .map_err(|e| Error::Capture(format!("cannot write frame: {e}")))?;
        tracing::debug!(path = %self.path.display(), "frame stored");
        Ok(())
    }

    /// Read the stored frame and base64-encode it
    ///
    /// Permission-denied reads are taken as transient lock contention from
    /// a concurrent capture and retried every 100 ms for up to 5 s.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`] if contention never clears, and
    /// [`Error::Io`] immediately for any other read failure (including a
    /// missing frame).
    pub async fn encoded(&self) -> Result<String> {
        let bytes = read_with_retry(|| std::fs::read(&self.path), LOCK_TIMEOUT).await?;
        Ok(STANDARD.encode(bytes))
    }
}

/// Retry `read` on permission-denied until it clears or `timeout` elapses
async fn read_with_retry<F>(mut read: F, timeout: Duration) -> Result<Vec<u8>>
where
    F: FnMut() -> std::io::Result<Vec<u8>>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        match read() {
            Ok(bytes) => return Ok(bytes),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                if tokio::time::Instant::now() + RETRY_INTERVAL > deadline {
                    return Err(Error::LockTimeout(format!(
                        "frame file still locked after {timeout:?}"
                    )));
                }
                tokio::time::sleep(RETRY_INTERVAL).await;
            }
            Err(e) => return Err(Error::Io(e)),
        }
    }
}

/// Append-only store of synthesized narration artifacts
#[derive(Debug, Clone)]
pub struct NarrationStore {
    root: PathBuf,
}

impl NarrationStore {
    /// Narration store rooted at the given directory
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Persist audio bytes under a fresh unique id
    ///
    /// Returns the path of the written audio file. A failure after the
    /// directory is created leaves it behind empty; nothing cleans that up.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory or file cannot be written
    pub fn store(&self, audio: &[u8]) -> Result<PathBuf> {
        let id = new_artifact_id();
        let dir = self.root.join(&id);
        std::fs::create_dir_all(&dir)?;

        let path = dir.join(AUDIO_FILE);
        std::fs::write(&path, audio)?;
        tracing::debug!(path = %path.display(), bytes = audio.len(), "narration stored");
        Ok(path)
    }
}

/// URL-safe unique id for a narration artifact, padding stripped
fn new_artifact_id() -> String {
    let mut bytes = [0u8; ID_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
