//! Taskmaster - webcam productivity critic service
//!
//! One request drives one pipeline run:
//!
//! ```text
//! capture ──► encode ──► analyze ──► synthesize
//! (webcam)   (base64)   (OpenAI)    (ElevenLabs)
//! ```
//!
//! The capture stage overwrites a single-slot frame store; each synthesis
//! appends a uniquely-named narration artifact. Any stage failure aborts
//! the run without compensating prior side effects. Concurrent runs race
//! on the frame slot and the camera device; the design assumes a single
//! active capture at a time.

pub mod api;
pub mod camera;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod store;
pub mod tts;
pub mod vision;

pub use camera::{Capture, FrameHandle, FrameSource, Webcam};
pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{Pipeline, PipelineOutput};
pub use store::{FrameStore, NarrationStore};
pub use tts::{Narrator, TextToSpeech};
pub use vision::{Critic, VisionClient};
