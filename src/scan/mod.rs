//! # Health Scan
//!
//! Turns a photo of a medical document into the structured fields of the
//! "My Data" screen by asking a vision-capable model.
//!
//! ## Submodules
//! - `types`: the fixed result shape
//! - `json`: brace-depth scanner that finds the JSON object in a model reply
//! - `normalize`: coerces every field of the parsed reply to a string
//! - `provider`: the model call ([`provider::VisionModel`])
//! - `extractor`: input checks and the end-to-end pipeline

pub mod extractor;
pub mod json;
pub mod normalize;
pub mod provider;
pub mod types;

pub use extractor::Extractor;
pub use types::ExtractionResult;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    /// No model provider (API key) configured
    #[error("Health Scan is not configured")]
    Unconfigured,

    #[error("File must be an image (JPEG, PNG, WEBP, GIF), got '{0}'")]
    UnsupportedMediaType(String),

    #[error("Image must be under 10 MB (got {0} bytes)")]
    TooLarge(usize),

    /// The model call itself failed; worth retrying
    #[error("Analysis failed: {0}")]
    Provider(#[from] provider::ProviderError),

    /// The model answered but nothing usable could be parsed from it
    #[error("Invalid analysis format: {0}")]
    MalformedResult(String),
}
