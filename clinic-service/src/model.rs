use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{error, info};

use crate::{
    config::ClinicConfig,
    prompt::{MEDICAL_ONLY_INSTRUCTIONS, TEMPERATURE},
};

/// One piece of a multimodal submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelPart {
    Text(String),
    InlineData { mime_type: String, data: Vec<u8> },
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Model API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Model response contained no text")]
    EmptyResponse,
}

/// The hosted language model, seen as a single remote call
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, parts: &[ModelPart]) -> Result<String, ModelError>;
}

/// Gemini `generateContent` over REST
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            api_base: api_base.into(),
        }
    }

    pub fn from_config(config: &ClinicConfig) -> Self {
        Self::new(&config.api_key, &config.model, &config.api_base)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

/// Request body for `generateContent` with the fixed instruction and
/// temperature.
pub fn build_payload(parts: &[ModelPart]) -> Value {
    let parts: Vec<Value> = parts
        .iter()
        .map(|part| match part {
            ModelPart::Text(text) => json!({ "text": text }),
            ModelPart::InlineData { mime_type, data } => json!({
                "inlineData": {
                    "mimeType": mime_type,
                    "data": STANDARD.encode(data)
                }
            }),
        })
        .collect();

    json!({
        "systemInstruction": {
            "parts": [{ "text": MEDICAL_ONLY_INSTRUCTIONS }]
        },
        "contents": [
            {
                "role": "user",
                "parts": parts
            }
        ],
        "generationConfig": {
            "temperature": TEMPERATURE
        }
    })
}

/// Concatenated text of the first candidate
pub fn extract_text(response: &Value) -> Result<String, ModelError> {
    let text: String = response["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ModelError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, parts: &[ModelPart]) -> Result<String, ModelError> {
        info!(model = %self.model, parts = parts.len(), "Calling Gemini API");

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&build_payload(parts))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Gemini API request failed");
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response_json: Value = response.json().await?;
        let text = extract_text(&response_json)?;

        info!("Gemini reply received ({} characters)", text.chars().count());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_keeps_part_order_and_encodes_media() {
        let payload = build_payload(&[
            ModelPart::InlineData {
                mime_type: "audio/wav".to_string(),
                data: b"RIFF".to_vec(),
            },
            ModelPart::Text("sore throat".to_string()),
        ]);

        let parts = payload["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "audio/wav");
        assert_eq!(parts[0]["inlineData"]["data"], "UklGRg==");
        assert_eq!(parts[1]["text"], "sore throat");
        assert_eq!(payload["generationConfig"]["temperature"], 0.0);
        assert_eq!(
            payload["systemInstruction"]["parts"][0]["text"],
            MEDICAL_ONLY_INSTRUCTIONS
        );
    }

    #[test]
    fn extracts_and_joins_candidate_text() {
        let response = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Rest. " }, { "text": "Hydrate." }] }
            }]
        });
        assert_eq!(extract_text(&response).unwrap(), "Rest. Hydrate.");
    }

    #[test]
    fn blocked_response_is_an_error() {
        let response = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(matches!(extract_text(&response), Err(ModelError::EmptyResponse)));
    }

    #[test]
    fn endpoint_joins_base_and_model() {
        let client = GeminiClient::new("k", "gemini-1.5-flash", "https://example.test/");
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    /// Live call against the API
    /// Usage: GEMINI_API_KEY=key cargo test test_live_consultation
    #[tokio::test]
    async fn test_live_consultation() {
        let config = match ClinicConfig::from_env() {
            Ok(config) => config,
            Err(_) => {
                println!("Skipping test - set GEMINI_API_KEY environment variable");
                return;
            }
        };

        let client = GeminiClient::from_config(&config);
        match client
            .generate(&[ModelPart::Text("What helps with a mild headache?".to_string())])
            .await
        {
            Ok(reply) => assert!(!reply.trim().is_empty()),
            Err(e) => println!("Live call failed: {}", e),
        }
    }
}
