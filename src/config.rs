//! Configuration for the taskmaster service
//!
//! Secrets and overrides come from the environment, read once at startup.
//! The warm-up interval and frame dimensions are deliberately fixed and live
//! as constants in the [`crate::camera`] module.

use std::path::PathBuf;

use crate::{tts, vision, Result};

/// Directory under the data dir holding the single frame slot
pub const FRAMES_DIR: &str = "frames";

/// Directory under the data dir holding one subdirectory per narration
pub const NARRATION_DIR: &str = "narration";

/// Taskmaster configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory containing the frame slot (`frames/frame.jpg`)
    pub frames_dir: PathBuf,

    /// Directory receiving narration artifacts (`narration/<id>/audio.mp3`)
    pub narration_dir: PathBuf,

    /// API keys for external services
    pub api_keys: ApiKeys,

    /// Vision analysis configuration
    pub vision: VisionConfig,

    /// Speech synthesis configuration
    pub voice: VoiceConfig,
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (vision analysis)
    pub openai: Option<String>,

    /// `ElevenLabs` API key (narration)
    pub elevenlabs: Option<String>,
}

/// Vision analysis configuration
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Chat-completions model identifier
    pub model: String,

    /// System persona prompt sent with every analysis request
    pub persona_prompt: String,
}

/// Speech synthesis configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// `ElevenLabs` voice identifier
    pub voice_id: String,

    /// `ElevenLabs` model identifier
    pub model: String,
}

impl Config {
    /// Load configuration from the environment
    ///
    /// `data_dir` is the parent of the frames and narration directories;
    /// it defaults to the current working directory.
    ///
    /// # Errors
    ///
    /// Currently infallible; returns `Result` so future validation does not
    /// change the signature.
    pub fn load(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            frames_dir: data_dir.join(FRAMES_DIR),
            narration_dir: data_dir.join(NARRATION_DIR),
            api_keys: ApiKeys {
                openai: env_non_empty("OPENAI_API_KEY"),
                elevenlabs: env_non_empty("ELEVENLABS_API_KEY"),
            },
            vision: VisionConfig {
                model: env_or("TASKMASTER_VISION_MODEL", vision::DEFAULT_MODEL),
                persona_prompt: env_or("TASKMASTER_PERSONA_PROMPT", vision::PERSONA_PROMPT),
            },
            voice: VoiceConfig {
                voice_id: env_or("TASKMASTER_VOICE_ID", tts::DEFAULT_VOICE_ID),
                model: env_or("TASKMASTER_TTS_MODEL", tts::DEFAULT_TTS_MODEL),
            },
        })
    }

    /// Create the frames and narration directories if missing
    ///
    /// # Errors
    ///
    /// Returns error if a directory cannot be created
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.frames_dir)?;
        std::fs::create_dir_all(&self.narration_dir)?;
        Ok(())
    }
}

/// Read an env var, treating empty values as unset
fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Read an env var with a fallback default
fn env_or(name: &str, default: &str) -> String {
    env_non_empty(name).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_joins_store_dirs_under_data_dir() {
        let config = Config::load(Some(PathBuf::from("/tmp/tm-test"))).unwrap();
        assert_eq!(config.frames_dir, PathBuf::from("/tmp/tm-test/frames"));
        assert_eq!(config.narration_dir, PathBuf::from("/tmp/tm-test/narration"));
    }

    #[test]
    fn defaults_fill_vision_and_voice() {
        let config = Config::load(None).unwrap();
        assert!(!config.vision.model.is_empty());
        assert!(!config.vision.persona_prompt.is_empty());
        assert!(!config.voice.voice_id.is_empty());
    }
}
