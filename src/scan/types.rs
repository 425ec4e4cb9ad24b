//! # Health Scan Result Types
//!
//! The fixed shape the web app's "My Data" screen renders. Every field is a
//! string; an empty string shows as "Unknown" in the UI.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientContext {
    pub age: String,
    pub sex: String,
    pub known_conditions: String,
    pub current_medication: String,
    pub height: String,
    pub height_unit: String,
    pub weight: String,
    pub weight_unit: String,
    pub bmi: String,
    pub smoking_status: String,
    pub alcohol_status: String,
    pub pregnancy_status: String,
}

impl Default for PatientContext {
    fn default() -> Self {
        Self {
            age: String::new(),
            sex: String::new(),
            known_conditions: String::new(),
            current_medication: String::new(),
            height: String::new(),
            height_unit: "cm".to_string(),
            weight: String::new(),
            weight_unit: "kg".to_string(),
            bmi: String::new(),
            smoking_status: String::new(),
            alcohol_status: String::new(),
            pregnancy_status: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalMeasurements {
    pub blood_pressure_systolic: String,
    pub blood_pressure_diastolic: String,
    pub heart_rate: String,
    pub temperature: String,
    pub oxygen_saturation: String,
    pub weight: String,
    pub bmi: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendRisk {
    pub recency: String,
    pub trend: String,
    pub severity: String,
    pub abnormal_count: String,
    pub symptoms: String,
}

/// Structured data extracted from one document image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub patient: PatientContext,
    pub clinical: ClinicalMeasurements,
    pub trend: TrendRisk,
}
