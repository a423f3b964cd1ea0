//! Vision analysis stage
//!
//! Sends the encoded frame with a fixed persona prompt to the `OpenAI`
//! chat-completions API and extracts the critique text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default chat-completions model
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Response cap; bounds but does not guarantee the two-sentence instruction
const MAX_TOKENS: u32 = 50;

/// Default system persona sent with every analysis request
pub const PERSONA_PROMPT: &str = "You are the furious, exacting band instructor \
Fletcher from the movie Whiplash. The image shows someone at their home office. \
Look at what they are doing and tell them what to change to push their \
productivity to the absolute limit. Do not repeat yourself and keep it to two \
sentences.";

/// Produces a critique from a base64-encoded JPEG frame
#[async_trait]
pub trait Critic: Send + Sync {
    /// Analyze one frame and return the critique text
    ///
    /// # Errors
    ///
    /// Returns [`Error::Inference`] on any service failure
    async fn critique(&self, encoded_jpeg: &str) -> Result<String>;
}

/// Vision client backed by the `OpenAI` chat-completions API
pub struct VisionClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    persona: String,
}

impl VisionClient {
    /// Create a new vision client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: String, persona: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for vision analysis".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            persona,
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
impl Critic for VisionClient {
    async fn critique(&self, encoded_jpeg: &str) -> Result<String> {
        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            max_tokens: u32,
            messages: Vec<Message<'a>>,
        }

        #[derive(Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: Content<'a>,
        }

        #[derive(Serialize)]
        #[serde(untagged)]
        enum Content<'a> {
            Text(&'a str),
            Parts(Vec<ContentPart>),
        }

        #[derive(Serialize)]
        #[serde(tag = "type")]
        enum ContentPart {
            #[serde(rename = "image_url")]
            ImageUrl { image_url: ImageUrl },
        }

        #[derive(Serialize)]
        struct ImageUrl {
            url: String,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ResponseMessage,
        }

        #[derive(Deserialize)]
        struct ResponseMessage {
            content: Option<String>,
        }

        let request = ChatRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![
                Message {
                    role: "system",
                    content: Content::Text(&self.persona),
                },
                Message {
                    role: "user",
                    content: Content::Parts(vec![ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/jpeg;base64,{encoded_jpeg}"),
                        },
                    }]),
                },
            ],
        };

        let response = self
            .client
            .post(OPENAI_CHAT_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!("API error {status}: {body}")));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("parse error: {e}")))?;

        let critique = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if critique.is_empty() {
            return Err(Error::Inference("empty response from vision API".to_string()));
        }

        tracing::debug!(critique = %critique, "frame analyzed");
        Ok(critique)
    }
}
