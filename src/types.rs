//! Core data types
//!
//! Closed vocabularies (modalities, emotions, stress categories, risk levels)
//! and the records that flow through the fusion pipeline.

use crate::behavior::types::{BehavioralAnalysis, BehavioralProfile};
use crate::error::FusionError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Independent input channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Text,
    Image,
    Behavioral,
}

impl Modality {
    pub const ALL: [Modality; 3] = [Modality::Text, Modality::Image, Modality::Behavioral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Image => "image",
            Modality::Behavioral => "behavioral",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = FusionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Modality::Text),
            "image" | "face" | "facial" => Ok(Modality::Image),
            "behavioral" | "behavioural" | "behavior" => Ok(Modality::Behavioral),
            other => Err(FusionError::UnknownModality(other.to_string())),
        }
    }
}

/// Platform emotion vocabulary
///
/// Upstream classifiers use their own label sets (DistilBERT emits `joy`,
/// FER emits `fear`); parsing folds those into this closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum EmotionTag {
    Happy,
    Sad,
    Anxious,
    Fearful,
    Neutral,
    Surprised,
    Disgusted,
    Angry,
}

impl EmotionTag {
    pub const ALL: [EmotionTag; 8] = [
        EmotionTag::Happy,
        EmotionTag::Sad,
        EmotionTag::Anxious,
        EmotionTag::Fearful,
        EmotionTag::Neutral,
        EmotionTag::Surprised,
        EmotionTag::Disgusted,
        EmotionTag::Angry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionTag::Happy => "happy",
            EmotionTag::Sad => "sad",
            EmotionTag::Anxious => "anxious",
            EmotionTag::Fearful => "fearful",
            EmotionTag::Neutral => "neutral",
            EmotionTag::Surprised => "surprised",
            EmotionTag::Disgusted => "disgusted",
            EmotionTag::Angry => "angry",
        }
    }

    /// Display emoji shown next to the emotion label
    pub fn emoji(&self) -> &'static str {
        match self {
            EmotionTag::Happy => "😊",
            EmotionTag::Sad => "😢",
            EmotionTag::Anxious => "😟",
            EmotionTag::Fearful => "😨",
            EmotionTag::Neutral => "😐",
            EmotionTag::Surprised => "😲",
            EmotionTag::Disgusted => "😒",
            EmotionTag::Angry => "😠",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EmotionTag::Happy => "Positive mood with signs of contentment or joy",
            EmotionTag::Sad => "Low mood with signs of sadness or loss",
            EmotionTag::Anxious => "Worry or nervousness about what may happen",
            EmotionTag::Fearful => "Signs of fear or feeling under threat",
            EmotionTag::Neutral => "Calm or emotionally even state",
            EmotionTag::Surprised => "Reaction to something unexpected",
            EmotionTag::Disgusted => "Aversion or strong disapproval",
            EmotionTag::Angry => "Frustration, irritation or anger",
        }
    }

    /// Capitalized label ("Sad") used in narrative text
    pub fn label(&self) -> String {
        let s = self.as_str();
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    }

    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            EmotionTag::Sad | EmotionTag::Anxious | EmotionTag::Fearful | EmotionTag::Angry
        )
    }
}

impl fmt::Display for EmotionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionTag {
    type Err = FusionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "happy" | "joy" => Ok(EmotionTag::Happy),
            "sad" | "sadness" => Ok(EmotionTag::Sad),
            "anxious" => Ok(EmotionTag::Anxious),
            "fearful" | "fear" => Ok(EmotionTag::Fearful),
            "neutral" => Ok(EmotionTag::Neutral),
            "surprised" | "surprise" => Ok(EmotionTag::Surprised),
            "disgusted" | "disgust" => Ok(EmotionTag::Disgusted),
            "angry" | "anger" => Ok(EmotionTag::Angry),
            other => Err(FusionError::UnknownEmotion(other.to_string())),
        }
    }
}

impl TryFrom<String> for EmotionTag {
    type Error = FusionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Ordinal stress severity
///
/// Variant order is the severity order; `Ord` is derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum StressCategory {
    NoStress,
    Low,
    Moderate,
    High,
}

impl StressCategory {
    pub const ALL: [StressCategory; 4] = [
        StressCategory::NoStress,
        StressCategory::Low,
        StressCategory::Moderate,
        StressCategory::High,
    ];

    /// Severity index (NoStress = 0 .. High = 3)
    pub fn severity(&self) -> u8 {
        match self {
            StressCategory::NoStress => 0,
            StressCategory::Low => 1,
            StressCategory::Moderate => 2,
            StressCategory::High => 3,
        }
    }

    /// Internal label (`no_stress`, `low`, `moderate`, `high`)
    pub fn as_label(&self) -> &'static str {
        match self {
            StressCategory::NoStress => "no_stress",
            StressCategory::Low => "low",
            StressCategory::Moderate => "moderate",
            StressCategory::High => "high",
        }
    }

    pub fn display_label(&self) -> &'static str {
        match self {
            StressCategory::NoStress => "No Apparent Stress",
            StressCategory::Low => "Low Stress",
            StressCategory::Moderate => "Moderate Stress",
            StressCategory::High => "High Stress",
        }
    }
}

impl fmt::Display for StressCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

impl FromStr for StressCategory {
    type Err = FusionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "no_stress" | "no apparent stress" | "none" => Ok(StressCategory::NoStress),
            "low" | "low stress" => Ok(StressCategory::Low),
            "moderate" | "moderate stress" => Ok(StressCategory::Moderate),
            "high" | "high stress" => Ok(StressCategory::High),
            other => Err(FusionError::UnknownStressLabel(other.to_string())),
        }
    }
}

impl TryFrom<String> for StressCategory {
    type Error = FusionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Uniform per-modality stress estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalityAssessment {
    pub modality: Modality,
    pub emotion: EmotionTag,
    /// Stress estimate (0-1)
    pub stress_score: f64,
    /// Classifier confidence (0-1)
    pub confidence: f64,
}

impl ModalityAssessment {
    /// Build an assessment, clamping both scores into [0, 1].
    ///
    /// Non-finite values fall back to the neutral default (0.5 stress, 0.0 confidence).
    pub fn new(modality: Modality, emotion: EmotionTag, stress_score: f64, confidence: f64) -> Self {
        Self {
            modality,
            emotion,
            stress_score: clamp_unit(stress_score, NEUTRAL_STRESS_SCORE),
            confidence: clamp_unit(confidence, 0.0),
        }
    }

    /// Stand-in for a modality whose classifier failed
    pub fn neutral_default(modality: Modality) -> Self {
        Self::new(modality, EmotionTag::Neutral, NEUTRAL_STRESS_SCORE, 0.0)
    }
}

/// Stress score that means "no information"
pub const NEUTRAL_STRESS_SCORE: f64 = 0.5;

pub(crate) fn clamp_unit(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

/// Output of a text classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAssessment {
    pub emotion: EmotionTag,
    pub stress_score: f64,
    pub confidence: f64,
    /// The classifier's own stress label, if it produces one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_label: Option<StressCategory>,
}

impl TextAssessment {
    pub fn to_assessment(&self) -> ModalityAssessment {
        ModalityAssessment::new(Modality::Text, self.emotion, self.stress_score, self.confidence)
    }
}

/// Output of a facial-expression classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAssessment {
    pub dominant_emotion: EmotionTag,
    pub stress_score: f64,
    pub confidence: f64,
    /// Opaque classifier metadata (landmarks, face box), passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facial_metadata: Option<serde_json::Value>,
}

impl ImageAssessment {
    pub fn to_assessment(&self) -> ModalityAssessment {
        ModalityAssessment::new(
            Modality::Image,
            self.dominant_emotion,
            self.stress_score,
            self.confidence,
        )
    }
}

/// Pre-classified inputs for one assessment request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModalityInputs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextAssessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageAssessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavioral: Option<BehavioralProfile>,
}

impl ModalityInputs {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.image.is_none() && self.behavioral.is_none()
    }
}

/// Fused stress estimate across the present modalities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionResult {
    pub fused_stress_score: f64,
    /// Category of the fused score before reconciliation
    pub stress_category: StressCategory,
    pub confidence: f64,
    pub modalities_used: BTreeSet<Modality>,
    pub per_modality_scores: BTreeMap<Modality, f64>,
}

/// Actionable risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn display_label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Moderate => "Moderate Risk",
            RiskLevel::High => "High Risk",
            RiskLevel::Critical => "Critical Risk",
        }
    }

    pub fn urgency(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    pub fn requires_professional_support(&self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::Critical)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Risk score (0-100)
    pub risk_score: u8,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Between one and five suggestions, most relevant first
    pub coping_suggestions: Vec<String>,
    pub wellness_tip: String,
}

/// Final verdict for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub primary_emotion: EmotionTag,
    /// Category the models imply, before reconciliation (None if nothing to compare)
    pub model_category: Option<StressCategory>,
    /// Baseline category implied by the primary emotion
    pub emotion_category: StressCategory,
    /// Reconciled category everything downstream is derived from
    pub final_category: StressCategory,
    pub fusion: FusionResult,
    pub risk: RiskAssessment,
    pub recommendation: Recommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behavioral: Option<BehavioralAnalysis>,
    pub analysis_summary: String,
    /// Modalities that were requested but failed or timed out
    #[serde(default)]
    pub degraded_modalities: Vec<Modality>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emotion_aliases_parse() {
        assert_eq!("joy".parse::<EmotionTag>().unwrap(), EmotionTag::Happy);
        assert_eq!("Sadness".parse::<EmotionTag>().unwrap(), EmotionTag::Sad);
        assert_eq!("FEAR".parse::<EmotionTag>().unwrap(), EmotionTag::Fearful);
        assert_eq!("surprise".parse::<EmotionTag>().unwrap(), EmotionTag::Surprised);
        assert!(matches!(
            "bored".parse::<EmotionTag>(),
            Err(FusionError::UnknownEmotion(_))
        ));
    }

    #[test]
    fn test_emotion_serialization() {
        let json = serde_json::to_string(&EmotionTag::Disgusted).unwrap();
        assert_eq!(json, "\"disgusted\"");

        let parsed: EmotionTag = serde_json::from_str("\"anger\"").unwrap();
        assert_eq!(parsed, EmotionTag::Angry);

        assert!(serde_json::from_str::<EmotionTag>("\"confused\"").is_err());
    }

    #[test]
    fn test_stress_category_ordering() {
        assert!(StressCategory::NoStress < StressCategory::Low);
        assert!(StressCategory::Low < StressCategory::Moderate);
        assert!(StressCategory::Moderate < StressCategory::High);
        for (i, c) in StressCategory::ALL.iter().enumerate() {
            assert_eq!(c.severity() as usize, i);
        }
    }

    #[test]
    fn test_stress_category_labels_parse() {
        assert_eq!(
            "No Apparent Stress".parse::<StressCategory>().unwrap(),
            StressCategory::NoStress
        );
        assert_eq!("moderate".parse::<StressCategory>().unwrap(), StressCategory::Moderate);
        let parsed: StressCategory = serde_json::from_str("\"High Stress\"").unwrap();
        assert_eq!(parsed, StressCategory::High);
        assert_eq!(serde_json::to_string(&StressCategory::NoStress).unwrap(), "\"no_stress\"");
        assert!("severe-ish".parse::<StressCategory>().is_err());
    }

    #[test]
    fn test_modality_assessment_clamps() {
        let a = ModalityAssessment::new(Modality::Text, EmotionTag::Sad, 1.4, -0.2);
        assert_eq!(a.stress_score, 1.0);
        assert_eq!(a.confidence, 0.0);

        let nan = ModalityAssessment::new(Modality::Image, EmotionTag::Sad, f64::NAN, f64::NAN);
        assert_eq!(nan.stress_score, 0.5);
        assert_eq!(nan.confidence, 0.0);
    }

    #[test]
    fn test_fusion_result_map_keys_serialize_as_strings() {
        let mut scores = BTreeMap::new();
        scores.insert(Modality::Behavioral, 0.4);
        let mut used = BTreeSet::new();
        used.insert(Modality::Behavioral);
        let result = FusionResult {
            fused_stress_score: 0.4,
            stress_category: StressCategory::Low,
            confidence: 0.6,
            modalities_used: used,
            per_modality_scores: scores,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["per_modality_scores"]["behavioral"], 0.4);
        assert_eq!(value["modalities_used"][0], "behavioral");
    }

    #[test]
    fn test_text_assessment_deserializes_without_label() {
        let json = r#"{"emotion": "joy", "stress_score": 0.2, "confidence": 0.8}"#;
        let text: TextAssessment = serde_json::from_str(json).unwrap();
        assert_eq!(text.emotion, EmotionTag::Happy);
        assert!(text.stress_label.is_none());
    }
}
