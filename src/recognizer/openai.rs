//! OpenAI-compatible chat-completions vision model.

use super::encode_png;
use super::vision::VisionModel;
use crate::config;
use crate::error::RecognizerError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Vision model behind an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiVisionModel {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    endpoint: String,
    max_tokens: u32,
}

impl OpenAiVisionModel {
    /// Client for `model` at the default endpoint.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, RecognizerError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| RecognizerError::Init(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            endpoint: config::vision_endpoint().to_string(),
            max_tokens: 64,
        })
    }

    /// Client configured from `CAPCODE_VISION_API_KEY`, `CAPCODE_VISION_MODEL`
    /// and `CAPCODE_VISION_ENDPOINT`.
    pub fn from_env() -> Result<Self, RecognizerError> {
        let api_key = config::vision_api_key()
            .ok_or_else(|| RecognizerError::Init("CAPCODE_VISION_API_KEY is not set".into()))?;
        Self::new(api_key, config::vision_model())
    }

    /// Override the API base URL (e.g. a local compatible server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request(
        &self,
        image: &DynamicImage,
        instructions: &str,
    ) -> Result<ChatRequest, RecognizerError> {
        let encoded = STANDARD.encode(encode_png(image)?);
        Ok(ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: instructions.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/png;base64,{encoded}"),
                        },
                    },
                ],
            }],
            max_tokens: self.max_tokens,
            temperature: 0.0,
        })
    }
}

impl VisionModel for OpenAiVisionModel {
    fn describe(
        &self,
        image: &DynamicImage,
        instructions: &str,
    ) -> Result<String, RecognizerError> {
        let request = self.request(image, instructions)?;
        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));
        debug!(%url, model = %self.model, "vision request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| RecognizerError::Transport(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| RecognizerError::Transport(format!("failed to read response: {e}")))?;
        if !status.is_success() {
            return Err(RecognizerError::Transport(format!("status {status}: {body}")));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| RecognizerError::Transport(format!("unparseable response: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RecognizerError::Transport("response has no message content".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    #[test]
    fn test_request_carries_data_uri() {
        let model = OpenAiVisionModel::new("key", "some-model").unwrap();
        let image = DynamicImage::ImageLuma8(GrayImage::new(3, 3));
        let request = model.request(&image, "read").unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "some-model");
        assert_eq!(json["messages"][0]["content"][0]["type"], "text");
        let url = json["messages"][0]["content"][1]["image_url"]["url"].as_str().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_response_parsing() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"KRAT1N2AB"}}]}"#).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("KRAT1N2AB"));
    }
}
