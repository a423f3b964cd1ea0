//! Pipeline orchestrator
//!
//! One run sequences capture -> encode -> analyze -> synthesize, each
//! stage feeding the next. Any stage failure aborts the remainder; side
//! effects of earlier stages (the frame slot, a partially created
//! narration directory) are left in place, not compensated. The run blocks
//! its caller for the full duration; there is no cancellation.

use std::path::PathBuf;
use std::sync::Arc;

use crate::camera::{Capture, FrameSource};
use crate::store::{FrameStore, NarrationStore};
use crate::tts::{Narrator, TextToSpeech};
use crate::vision::{Critic, VisionClient};
use crate::{Config, Error, Result};

/// Result of one successful pipeline run
#[derive(Debug)]
pub struct PipelineOutput {
    /// Critique text from the analysis stage
    pub analysis: String,

    /// Path of the persisted narration artifact
    pub audio_file_path: PathBuf,
}

/// Sequences the four stages for one request
pub struct Pipeline {
    capture: Capture,
    critic: Arc<dyn Critic>,
    narrator: Arc<dyn Narrator>,
    frames: FrameStore,
    narrations: NarrationStore,
}

impl Pipeline {
    /// Assemble a pipeline from explicit collaborators
    #[must_use]
    pub fn new(
        source: Arc<dyn FrameSource>,
        critic: Arc<dyn Critic>,
        narrator: Arc<dyn Narrator>,
        frames: FrameStore,
        narrations: NarrationStore,
    ) -> Self {
        Self {
            capture: Capture::new(source),
            critic,
            narrator,
            frames,
            narrations,
        }
    }

    /// Build the production pipeline (webcam, `OpenAI` vision, `ElevenLabs`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required API key is missing
    pub fn from_config(config: &Config) -> Result<Self> {
        let openai_key = config
            .api_keys
            .openai
            .clone()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY not set".to_string()))?;
        let elevenlabs_key = config
            .api_keys
            .elevenlabs
            .clone()
            .ok_or_else(|| Error::Config("ELEVENLABS_API_KEY not set".to_string()))?;

        let critic = VisionClient::new(openai_key, config.vision.persona_prompt.clone())?
            .with_model(config.vision.model.clone());
        let narrator = TextToSpeech::new(elevenlabs_key, config.voice.voice_id.clone())?
            .with_model(config.voice.model.clone());

        Ok(Self::new(
            Arc::new(crate::camera::Webcam::new(0)),
            Arc::new(critic),
            Arc::new(narrator),
            FrameStore::new(&config.frames_dir),
            NarrationStore::new(&config.narration_dir),
        ))
    }

    /// Run the pipeline once, returning critique text and narration path
    ///
    /// # Errors
    ///
    /// Returns the first failing stage's error; later stages do not run
    pub async fn run(&self) -> Result<PipelineOutput> {
        tracing::debug!("capturing frame");
        self.capture.run(&self.frames).await?;

        tracing::debug!("encoding frame");
        let encoded = self.frames.encoded().await?;

        tracing::debug!("requesting critique");
        let analysis = self.critic.critique(&encoded).await?;

        tracing::debug!("synthesizing narration");
        let audio = self.narrator.narrate(&analysis).await?;
        let audio_file_path = self.narrations.store(&audio)?;

        tracing::info!(
            analysis = %analysis,
            audio = %audio_file_path.display(),
            "pipeline run complete"
        );

        Ok(PipelineOutput {
            analysis,
            audio_file_path,
        })
    }
}
