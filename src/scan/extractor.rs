//! # Health Record Extraction
//!
//! Turns an uploaded document image into an `ExtractionResult`:
//! 1. Check the media type and size
//! 2. Send the image to the vision model as a base64 data URL
//! 3. Pull the first JSON object out of the reply and normalize it

use crate::scan::json::extract_object;
use crate::scan::normalize::normalize;
use crate::scan::provider::{ImagePayload, ProviderError, VisionModel};
use crate::scan::{ExtractError, ExtractionResult};
use base64::prelude::*;
use serde_json::Value;
use std::sync::Arc;

/// Largest accepted upload: 10 MiB.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

pub const ALLOWED_MEDIA_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Uploads without a declared content type are sent as JPEG.
const FALLBACK_MEDIA_TYPE: &str = "image/jpeg";

pub struct Extractor {
    model: Option<Arc<dyn VisionModel>>,
}

impl Extractor {
    pub fn new(model: Option<Arc<dyn VisionModel>>) -> Self {
        Self { model }
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    /// Extract structured health data from an uploaded image.
    ///
    /// Configuration, content type and size are checked before the model is
    /// called.
    pub async fn extract(
        &self,
        image: &[u8],
        content_type: Option<&str>,
    ) -> Result<ExtractionResult, ExtractError> {
        let model = self.model.as_ref().ok_or(ExtractError::Unconfigured)?;
        let media_type = check_media_type(content_type)?;
        if image.len() > MAX_IMAGE_BYTES {
            return Err(ExtractError::TooLarge(image.len()));
        }

        let payload = ImagePayload {
            data_url: format!("data:{};base64,{}", media_type, BASE64_STANDARD.encode(image)),
            media_type,
        };

        let reply = model.complete(&payload).await?;
        if reply.trim().is_empty() {
            return Err(ProviderError("no analysis result from provider (empty response)".to_string()).into());
        }

        parse_reply(&reply).map_err(|e| {
            tracing::warn!(
                "Invalid analysis format: {}. Response preview: {}",
                e,
                reply.chars().take(600).collect::<String>()
            );
            e
        })
    }
}

/// Lower-cased media type without parameters, if it is on the allow-list.
fn check_media_type(content_type: Option<&str>) -> Result<String, ExtractError> {
    let Some(declared) = content_type.filter(|ct| !ct.trim().is_empty()) else {
        return Ok(FALLBACK_MEDIA_TYPE.to_string());
    };

    let media_type = declared
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if ALLOWED_MEDIA_TYPES.contains(&media_type.as_str()) {
        Ok(media_type)
    } else {
        Err(ExtractError::UnsupportedMediaType(declared.to_string()))
    }
}

fn parse_reply(reply: &str) -> Result<ExtractionResult, ExtractError> {
    let object = extract_object(reply).map_err(|e| ExtractError::MalformedResult(e.to_string()))?;
    let raw: Value =
        serde_json::from_str(object).map_err(|e| ExtractError::MalformedResult(e.to_string()))?;
    Ok(normalize(&raw))
}
