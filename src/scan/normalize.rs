use crate::db::models::coerce_to_string;
use crate::scan::types::{ClinicalMeasurements, ExtractionResult, PatientContext, TrendRisk};
use serde_json::Value;

/// Map a parsed model reply onto the fixed result shape.
///
/// Missing sections, missing fields and `null`s become `""`; numbers are
/// stringified; strings are trimmed. Height and weight units fall back to
/// `cm` and `kg`.
pub fn normalize(raw: &Value) -> ExtractionResult {
    let p = Fields(raw.get("patient"));
    let c = Fields(raw.get("clinical"));
    let t = Fields(raw.get("trend"));

    ExtractionResult {
        patient: PatientContext {
            age: p.text("age"),
            sex: p.text("sex"),
            known_conditions: p.text("knownConditions"),
            current_medication: p.text("currentMedication"),
            height: p.text("height"),
            height_unit: p.text_or("heightUnit", "cm"),
            weight: p.text("weight"),
            weight_unit: p.text_or("weightUnit", "kg"),
            bmi: p.text("bmi"),
            smoking_status: p.text("smokingStatus"),
            alcohol_status: p.text("alcoholStatus"),
            pregnancy_status: p.text("pregnancyStatus"),
        },
        clinical: ClinicalMeasurements {
            blood_pressure_systolic: c.text("bloodPressureSystolic"),
            blood_pressure_diastolic: c.text("bloodPressureDiastolic"),
            heart_rate: c.text("heartRate"),
            temperature: c.text("temperature"),
            oxygen_saturation: c.text("oxygenSaturation"),
            weight: c.text("weight"),
            bmi: c.text("bmi"),
        },
        trend: TrendRisk {
            recency: t.text("recency"),
            trend: t.text("trend"),
            severity: t.text("severity"),
            abnormal_count: t.text("abnormalCount"),
            symptoms: t.text("symptoms"),
        },
    }
}

/// One section of the reply; anything that is not an object reads as empty.
struct Fields<'a>(Option<&'a Value>);

impl Fields<'_> {
    fn text(&self, key: &str) -> String {
        self.0
            .and_then(|section| section.get(key))
            .map(|v| coerce_to_string(v).trim().to_string())
            .unwrap_or_default()
    }

    fn text_or(&self, key: &str, default: &str) -> String {
        let value = self.text(key);
        if value.is_empty() {
            default.to_string()
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_become_strings() {
        let result = normalize(&json!({
            "patient": {"age": 42, "height": 165.5},
            "clinical": {"heartRate": 72, "bloodPressureSystolic": "128"},
            "trend": {"abnormalCount": 0}
        }));

        assert_eq!(result.patient.age, "42");
        assert_eq!(result.patient.height, "165.5");
        assert_eq!(result.clinical.heart_rate, "72");
        assert_eq!(result.clinical.blood_pressure_systolic, "128");
        assert_eq!(result.trend.abnormal_count, "0");
    }

    #[test]
    fn missing_fields_are_empty_and_units_default() {
        let result = normalize(&json!({"patient": {"age": "30"}}));

        assert_eq!(result.patient.sex, "");
        assert_eq!(result.patient.height_unit, "cm");
        assert_eq!(result.patient.weight_unit, "kg");
        assert_eq!(result.clinical, ClinicalMeasurements::default());
        assert_eq!(result.trend, TrendRisk::default());
    }

    #[test]
    fn explicit_units_are_kept() {
        let result = normalize(&json!({"patient": {"heightUnit": "in", "weightUnit": " lb "}}));
        assert_eq!(result.patient.height_unit, "in");
        assert_eq!(result.patient.weight_unit, "lb");
    }

    #[test]
    fn nulls_and_blank_units() {
        let result = normalize(&json!({
            "patient": {"sex": null, "heightUnit": "", "weightUnit": null, "knownConditions": "  Asthma "}
        }));
        assert_eq!(result.patient.sex, "");
        assert_eq!(result.patient.height_unit, "cm");
        assert_eq!(result.patient.weight_unit, "kg");
        assert_eq!(result.patient.known_conditions, "Asthma");
    }

    #[test]
    fn wrong_section_types_are_tolerated() {
        let result = normalize(&json!({"patient": "none", "clinical": [1, 2], "trend": null}));
        assert_eq!(result, ExtractionResult::default());
    }

    #[test]
    fn lists_and_booleans_are_cast() {
        let result = normalize(&json!({
            "patient": {"currentMedication": ["Metformin", "Lisinopril"], "pregnancyStatus": false},
            "trend": {"symptoms": true}
        }));
        assert_eq!(result.patient.current_medication, r#"["Metformin","Lisinopril"]"#);
        // A reported `false` is a value, not a missing field, so it is kept.
        assert_eq!(result.patient.pregnancy_status, "false");
        assert_eq!(result.trend.symptoms, "true");
    }

    #[test]
    fn output_uses_camel_case_names() {
        let value = serde_json::to_value(normalize(&json!({}))).unwrap();
        assert_eq!(value["patient"]["heightUnit"], "cm");
        assert_eq!(value["clinical"]["bloodPressureSystolic"], "");
        assert_eq!(value["trend"]["abnormalCount"], "");
    }
}
