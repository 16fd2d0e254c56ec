//! Synchronous fusion engine
//!
//! Takes already-classified modality inputs and produces the full verdict:
//! fusion → categorization → reconciliation → risk → recommendations.

use crate::advice::RecommendationSelector;
use crate::behavior::{BehavioralAnalysis, BehavioralPatternAnalyzer};
use crate::categorize::StressCategorizer;
use crate::config::{EngineConfig, FusionWeights};
use crate::error::FusionError;
use crate::fusion::WeightedFusion;
use crate::reconcile;
use crate::risk::RiskScorer;
use crate::types::{
    AssessmentReport, EmotionTag, FusionResult, Modality, ModalityInputs, StressCategory,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

/// Fusion engine with an administrable weight table.
///
/// Everything except the weights is fixed at construction. Each call to
/// [`FusionEngine::assess`] takes one snapshot of the weights, so a concurrent
/// update never mixes two tables inside a single assessment.
#[derive(Debug)]
pub struct FusionEngine {
    config: EngineConfig,
    weights: RwLock<FusionWeights>,
    categorizer: StressCategorizer,
    analyzer: BehavioralPatternAnalyzer,
    selector: RecommendationSelector,
}

impl Default for FusionEngine {
    fn default() -> Self {
        Self::from_valid_config(EngineConfig::default())
    }
}

impl FusionEngine {
    pub fn new(config: EngineConfig) -> Result<Self, FusionError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: EngineConfig) -> Self {
        Self {
            weights: RwLock::new(config.weights),
            categorizer: StressCategorizer::new(config.thresholds),
            analyzer: BehavioralPatternAnalyzer,
            selector: RecommendationSelector,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn categorizer(&self) -> StressCategorizer {
        self.categorizer
    }

    /// Assess one request.
    ///
    /// Fails only when no modality is present.
    pub fn assess(&self, inputs: &ModalityInputs) -> Result<AssessmentReport, FusionError> {
        self.assess_with_degraded(inputs, Vec::new())
    }

    /// Assess one request, recording modalities that were requested but lost upstream
    pub fn assess_with_degraded(
        &self,
        inputs: &ModalityInputs,
        degraded_modalities: Vec<Modality>,
    ) -> Result<AssessmentReport, FusionError> {
        if inputs.is_empty() {
            return Err(FusionError::NoModalities);
        }

        let behavioral = inputs
            .behavioral
            .as_ref()
            .map(|profile| self.analyzer.analyze(profile));

        let mut assessments = Vec::with_capacity(3);
        if let Some(text) = &inputs.text {
            assessments.push(text.to_assessment());
        }
        if let Some(image) = &inputs.image {
            assessments.push(image.to_assessment());
        }
        if let Some(analysis) = &behavioral {
            assessments.push(analysis.to_assessment());
        }

        let fusion = WeightedFusion::new(self.fusion_weights(), self.categorizer).fuse(&assessments);

        // Zero confidence everywhere means the models told us nothing
        let informative = fusion.confidence > 0.0;
        let model_category = if !informative {
            None
        } else {
            match (&inputs.text, &inputs.image, &behavioral) {
                (Some(text), None, None) => Some(text.stress_label.unwrap_or(fusion.stress_category)),
                _ => Some(fusion.stress_category),
            }
        };

        let primary_emotion = primary_emotion(inputs, behavioral.as_ref());
        let emotion_category = reconcile::baseline(primary_emotion);
        let final_category = reconcile::combine(model_category, emotion_category);

        let fused_score = informative.then_some(fusion.fused_stress_score);
        let risk = RiskScorer::new(self.categorizer).assess(final_category, fused_score);
        let recommendation = self
            .selector
            .select(primary_emotion, final_category, risk.risk_level);

        let analysis_summary = self.summarize(inputs, behavioral.as_ref(), &fusion, final_category);

        if !degraded_modalities.is_empty() {
            tracing::warn!(?degraded_modalities, "assessment ran with degraded modalities");
        }
        tracing::debug!(
            fused = fusion.fused_stress_score,
            ?model_category,
            ?final_category,
            risk_score = risk.risk_score,
            "assessment complete"
        );

        Ok(AssessmentReport {
            primary_emotion,
            model_category,
            emotion_category,
            final_category,
            fusion,
            risk,
            recommendation,
            behavioral,
            analysis_summary,
            degraded_modalities,
        })
    }

    /// Snapshot of the current weight table
    pub fn fusion_weights(&self) -> FusionWeights {
        *self.weights.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Current weights keyed by modality
    pub fn get_fusion_weights(&self) -> BTreeMap<Modality, f64> {
        self.fusion_weights().as_map()
    }

    /// Replace the weight table.
    ///
    /// Tables that do not sum to 1 are renormalized, never rejected. Missing
    /// modalities get weight 0.
    pub fn update_fusion_weights(&self, weights: &HashMap<Modality, f64>) -> FusionWeights {
        let updated = FusionWeights::from_map(weights);
        *self.weights.write().unwrap_or_else(|e| e.into_inner()) = updated;
        tracing::info!(
            text = updated.weight(Modality::Text),
            image = updated.weight(Modality::Image),
            behavioral = updated.weight(Modality::Behavioral),
            "updated fusion weights"
        );
        updated
    }

    fn summarize(
        &self,
        inputs: &ModalityInputs,
        behavioral: Option<&BehavioralAnalysis>,
        fusion: &FusionResult,
        final_category: StressCategory,
    ) -> String {
        let mut parts = Vec::new();

        if let Some(text) = &inputs.text {
            parts.push(format!(
                "Text analysis indicates {} emotional state ({} stress)",
                text.emotion,
                self.categorizer.label_modality(text.stress_score)
            ));
        }
        if let Some(image) = &inputs.image {
            parts.push(format!(
                "Facial expression shows {} emotion ({} stress)",
                image.dominant_emotion,
                self.categorizer.label_modality(image.stress_score)
            ));
        }
        if let Some(analysis) = behavioral {
            parts.push(format!(
                "Behavioral patterns suggest {} posting frequency",
                analysis.frequency.pattern.as_str()
            ));
        }

        parts.push(format!(
            "Overall assessment: {} ({:.2})",
            fusion.stress_category, fusion.fused_stress_score
        ));
        if final_category != fusion.stress_category {
            parts.push(format!(
                "Reported as {} to stay consistent with the detected emotion",
                final_category
            ));
        }

        parts.join(". ") + "."
    }
}

/// Image emotion first, then text, then the behavioral dominant bucket
fn primary_emotion(inputs: &ModalityInputs, behavioral: Option<&BehavioralAnalysis>) -> EmotionTag {
    inputs
        .image
        .as_ref()
        .map(|image| image.dominant_emotion)
        .or_else(|| inputs.text.as_ref().map(|text| text.emotion))
        .or_else(|| behavioral.map(|analysis| analysis.emoji.dominant.to_emotion()))
        .unwrap_or(EmotionTag::Neutral)
}
