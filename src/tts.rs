//! Speech synthesis stage
//!
//! Turns the critique text into audio bytes via the `ElevenLabs`
//! text-to-speech API with one fixed voice identity, no streaming.

use async_trait::async_trait;

use crate::{Error, Result};

/// Default `ElevenLabs` voice identity
pub const DEFAULT_VOICE_ID: &str = "FymFzmXuLh2piu8Rs9it";

/// Default `ElevenLabs` model
pub const DEFAULT_TTS_MODEL: &str = "eleven_monolingual_v1";

/// Synthesizes speech from critique text
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Synthesize `text`, returning raw audio bytes (MP3 format)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Synthesis`] on any service failure
    async fn narrate(&self, text: &str) -> Result<Vec<u8>>;
}

/// TTS client backed by `ElevenLabs`
pub struct TextToSpeech {
    client: reqwest::Client,
    api_key: String,
    voice: String,
    model: String,
}

impl TextToSpeech {
    /// Create a new TTS client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: String, voice_id: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "ElevenLabs API key required for narration".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            voice: voice_id,
            model: DEFAULT_TTS_MODEL.to_string(),
        })
    }

    /// Create with a specific model
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }
}

#[async_trait]
impl Narrator for TextToSpeech {
    async fn narrate(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct SpeechRequest<'a> {
            text: &'a str,
            model_id: &'a str,
        }

        let url = format!("https://api.elevenlabs.io/v1/text-to-speech/{}", self.voice);

        let request = SpeechRequest {
            text,
            model_id: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Synthesis(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Synthesis(format!("API error {status}: {body}")));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| Error::Synthesis(format!("body read failed: {e}")))?;
        Ok(audio.to_vec())
    }
}
