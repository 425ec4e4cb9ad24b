//! # Vision Model Provider
//!
//! The extractor only needs one thing from a model: given an image and a fixed
//! instruction, return the reply text. [`OpenAiVision`] does that over the
//! OpenAI Responses API.

use crate::config::VisionConfig;
use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

/// The provider call failed (network, auth, rate limit, bad status).
#[derive(Error, Debug)]
#[error("{0}")]
pub struct ProviderError(pub String);

/// An image ready to send inline, as a `data:` URL.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub media_type: String,
    pub data_url: String,
}

#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Ask the model to extract the health record from `image`, returning its
    /// raw reply text.
    async fn complete(&self, image: &ImagePayload) -> Result<String, ProviderError>;
}

pub const SYSTEM_PROMPT: &str = r#"You are a medical document analyst. Extract health information from the image of a health record.
Return ONLY a single valid JSON object (no markdown, no code block) with this exact structure.
Use empty string "" for any field not found or not applicable.

{
  "patient": {
    "age": "<number as string or \"\">",
    "sex": "Female" | "Male" | "Prefer not to say" | "",
    "knownConditions": "<comma-separated conditions or \"\">",
    "currentMedication": "<comma-separated medications or \"\">",
    "height": "<number only, e.g. 165>",
    "heightUnit": "cm" | "in",
    "weight": "<number only, e.g. 72>",
    "weightUnit": "kg",
    "bmi": "<number as string or \"\">",
    "smokingStatus": "Non-smoker" | "Smoker" | "Former smoker" | "Prefer not to say" | "",
    "alcoholStatus": "None" | "Occasional" | "Moderate" | "Heavy" | "Prefer not to say" | "",
    "pregnancyStatus": "Not applicable" | "Yes" | "No" | "Prefer not to say" | ""
  },
  "clinical": {
    "bloodPressureSystolic": "<e.g. 128>",
    "bloodPressureDiastolic": "<e.g. 82>",
    "heartRate": "<number or \"\">",
    "temperature": "<number or \"\">",
    "oxygenSaturation": "<number or \"\">",
    "weight": "<number or \"\">",
    "bmi": "<number or \"\">"
  },
  "trend": {
    "recency": "<e.g. Recent (within 2 weeks) or \"\">",
    "trend": "Stable" | "Increasing" | "Decreasing" | "Unknown" | "",
    "severity": "<e.g. Mild (slightly above normal range) or \"\">",
    "abnormalCount": "<number as string or \"\">",
    "symptoms": "<comma-separated or \"\">"
  }
}

Rules:
- Extract only what is clearly stated in the document.
- If a field is not found, use "" (empty string).
- Return ONLY the JSON object. No markdown. No extra text.
"#;

const USER_INSTRUCTION: &str = "Return ONLY the JSON object exactly matching the schema.";

pub struct OpenAiVision {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiVision {
    /// `None` when no API key is configured.
    pub fn from_config(config: &VisionConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            client: reqwest::Client::new(),
            api_key,
            model: config.model.clone(),
            endpoint: format!("{}/responses", config.base_url.trim_end_matches('/')),
        })
    }

    fn request_body(&self, image: &ImagePayload) -> Value {
        json!({
            "model": self.model,
            "input": [
                {
                    "role": "system",
                    "content": [{"type": "input_text", "text": SYSTEM_PROMPT}],
                },
                {
                    "role": "user",
                    "content": [
                        {"type": "input_text", "text": USER_INSTRUCTION},
                        {"type": "input_image", "image_url": image.data_url},
                    ],
                },
            ],
            "text": {"format": {"type": "json_object"}},
        })
    }
}

#[async_trait]
impl VisionModel for OpenAiVision {
    async fn complete(&self, image: &ImagePayload) -> Result<String, ProviderError> {
        tracing::info!(
            "Calling OpenAI (model={}) for health scan of a {} image",
            self.model,
            image.media_type
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(image))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("OpenAI request failed: {:?}", e);
                ProviderError("could not reach the analysis provider".to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(
                "OpenAI returned {}: {}",
                status,
                detail.chars().take(300).collect::<String>()
            );
            return Err(ProviderError(format!("analysis provider returned HTTP {}", status.as_u16())));
        }

        let body: Value = response.json().await.map_err(|e| {
            tracing::error!("OpenAI response was not JSON: {:?}", e);
            ProviderError("unreadable response from analysis provider".to_string())
        })?;

        Ok(reply_text(&body))
    }
}

/// Text of a Responses API reply: `output_text` when present, else every
/// `output_text` part of the `output` items joined by newlines.
pub fn reply_text(body: &Value) -> String {
    if let Some(text) = body.get("output_text").and_then(Value::as_str) {
        if !text.trim().is_empty() {
            return text.trim().to_string();
        }
    }

    let parts: Vec<&str> = body
        .get("output")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .filter(|text| !text.is_empty())
        .collect();

    parts.join("\n").trim().to_string()
}
