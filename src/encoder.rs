//! Report encoding
//!
//! Wraps an assessment report in a self-describing payload: who produced it,
//! when, under which id, and how much of the requested evidence was usable.

use crate::behavior::AlertSeverity;
use crate::error::FusionError;
use crate::types::{AssessmentReport, Modality};
use crate::{PRODUCER_NAME, VERSION};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current payload schema version
pub const PAYLOAD_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadQuality {
    pub confidence: f64,
    pub modalities_used: Vec<Modality>,
    pub degraded_modalities: Vec<Modality>,
    pub flags: Vec<String>,
}

/// Encoded assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentPayload {
    pub schema_version: String,
    pub producer: Producer,
    pub report_id: String,
    pub computed_at_utc: String,
    pub quality: PayloadQuality,
    /// Escalation state of the user's history, when one is kept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<AlertSeverity>,
    pub report: AssessmentReport,
}

/// Encoder for assessment payloads
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn encode(
        &self,
        report: AssessmentReport,
        alert: Option<AlertSeverity>,
    ) -> AssessmentPayload {
        let quality = self.build_quality(&report);

        AssessmentPayload {
            schema_version: PAYLOAD_SCHEMA_VERSION.to_string(),
            producer: Producer {
                name: PRODUCER_NAME.to_string(),
                version: VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            report_id: Uuid::new_v4().to_string(),
            computed_at_utc: Utc::now().to_rfc3339(),
            quality,
            alert,
            report,
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(
        &self,
        report: AssessmentReport,
        alert: Option<AlertSeverity>,
    ) -> Result<String, FusionError> {
        let payload = self.encode(report, alert);
        serde_json::to_string_pretty(&payload).map_err(|e| FusionError::EncodingError(e.to_string()))
    }

    fn build_quality(&self, report: &AssessmentReport) -> PayloadQuality {
        let mut flags = Vec::new();
        if !report.degraded_modalities.is_empty() {
            flags.push("degraded_modalities".to_string());
        }
        if report.model_category.is_none() {
            flags.push("no_model_signal".to_string());
        }
        if report.fusion.modalities_used.len() == 1 {
            flags.push("single_modality".to_string());
        }
        if report.model_category.is_some_and(|m| m != report.final_category) {
            flags.push("reconciled".to_string());
        }

        PayloadQuality {
            confidence: report.fusion.confidence,
            modalities_used: report.fusion.modalities_used.iter().copied().collect(),
            degraded_modalities: report.degraded_modalities.clone(),
            flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FusionEngine;
    use crate::types::{EmotionTag, ImageAssessment, ModalityInputs, TextAssessment};

    fn make_report() -> AssessmentReport {
        FusionEngine::default()
            .assess(&ModalityInputs {
                text: Some(TextAssessment {
                    emotion: EmotionTag::Happy,
                    stress_score: 0.2,
                    confidence: 0.8,
                    stress_label: None,
                }),
                image: Some(ImageAssessment {
                    dominant_emotion: EmotionTag::Sad,
                    stress_score: 0.7,
                    confidence: 0.6,
                    facial_metadata: None,
                }),
                behavioral: None,
            })
            .unwrap()
    }

    #[test]
    fn test_encode_payload() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let payload = encoder.encode(make_report(), None);

        assert_eq!(payload.schema_version, PAYLOAD_SCHEMA_VERSION);
        assert_eq!(payload.producer.name, PRODUCER_NAME);
        assert_eq!(payload.producer.version, VERSION);
        assert_eq!(payload.producer.instance_id, "test-instance");
        assert!(Uuid::parse_str(&payload.report_id).is_ok());
        assert!(chrono::DateTime::parse_from_rfc3339(&payload.computed_at_utc).is_ok());

        assert_eq!(
            payload.quality.modalities_used,
            vec![Modality::Text, Modality::Image]
        );
        assert_eq!(payload.quality.flags, vec!["reconciled".to_string()]);
        assert!((payload.quality.confidence - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_report_ids_are_unique() {
        let encoder = ReportEncoder::new();
        let a = encoder.encode(make_report(), None);
        let b = encoder.encode(make_report(), None);
        assert_ne!(a.report_id, b.report_id);
        assert_eq!(a.producer.instance_id, b.producer.instance_id);
    }

    #[test]
    fn test_encode_to_json() {
        let encoder = ReportEncoder::new();
        let json = encoder
            .encode_to_json(make_report(), Some(AlertSeverity::Critical))
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(parsed.get("producer").is_some());
        assert!(parsed.get("quality").is_some());
        assert_eq!(parsed["alert"], "critical");
        assert_eq!(parsed["report"]["final_category"], "moderate");
    }
}
