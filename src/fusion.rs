//! Weighted fusion of per-modality stress estimates

use crate::categorize::StressCategorizer;
use crate::config::FusionWeights;
use crate::types::{clamp_unit, FusionResult, Modality, ModalityAssessment, NEUTRAL_STRESS_SCORE};
use std::collections::BTreeMap;

/// Combines the available modality assessments into one fused score
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedFusion {
    weights: FusionWeights,
    categorizer: StressCategorizer,
}

impl WeightedFusion {
    pub fn new(weights: FusionWeights, categorizer: StressCategorizer) -> Self {
        Self {
            weights,
            categorizer,
        }
    }

    pub fn weights(&self) -> FusionWeights {
        self.weights
    }

    /// Fuse the given assessments.
    ///
    /// Weights are restricted to the present modalities and renormalized.
    /// Confidence is the unweighted mean of the present confidences. With no
    /// assessment at all the result is 0.5 with zero confidence ("no
    /// information", not "calm"). A repeated modality keeps its last entry.
    pub fn fuse(&self, assessments: &[ModalityAssessment]) -> FusionResult {
        // (stress, confidence) per modality, clamped into [0, 1]
        let by_modality: BTreeMap<Modality, (f64, f64)> = assessments
            .iter()
            .map(|a| {
                (
                    a.modality,
                    (
                        clamp_unit(a.stress_score, NEUTRAL_STRESS_SCORE),
                        clamp_unit(a.confidence, 0.0),
                    ),
                )
            })
            .collect();

        if by_modality.is_empty() {
            return FusionResult {
                fused_stress_score: NEUTRAL_STRESS_SCORE,
                stress_category: self.categorizer.categorize(NEUTRAL_STRESS_SCORE),
                confidence: 0.0,
                modalities_used: Default::default(),
                per_modality_scores: BTreeMap::new(),
            };
        }

        let present: Vec<Modality> = by_modality.keys().copied().collect();
        let weights = self.weights.renormalized_for(&present);

        let fused: f64 = by_modality
            .iter()
            .map(|(m, (score, _))| weights.get(m).copied().unwrap_or(0.0) * score)
            .sum();
        // Exact pass-through for a single modality, free of rounding in the weight
        let fused = if by_modality.len() == 1 {
            by_modality.values().map(|(score, _)| score).sum::<f64>()
        } else {
            fused.clamp(0.0, 1.0)
        };

        let confidence = by_modality.values().map(|(_, conf)| conf).sum::<f64>()
            / by_modality.len() as f64;

        tracing::debug!(
            fused,
            confidence,
            modalities = present.len(),
            "fused modality assessments"
        );

        FusionResult {
            fused_stress_score: fused,
            stress_category: self.categorizer.categorize(fused),
            confidence,
            modalities_used: present.into_iter().collect(),
            per_modality_scores: by_modality
                .iter()
                .map(|(m, (score, _))| (*m, *score))
                .collect(),
        }
    }
}
