//! Risk scoring
//!
//! The final stress category selects a score band and a risk level. The exact
//! score inside the band is interpolated from where the fused stress score sits
//! within the category's score range, so equal inputs always give equal scores.

use crate::categorize::StressCategorizer;
use crate::types::{RiskAssessment, RiskLevel, StressCategory};

/// Inclusive score band and level for a final category
pub fn risk_band(category: StressCategory) -> (u8, u8, RiskLevel) {
    match category {
        StressCategory::NoStress | StressCategory::Low => (5, 30, RiskLevel::Low),
        StressCategory::Moderate => (31, 60, RiskLevel::Moderate),
        StressCategory::High => (61, 85, RiskLevel::High),
    }
}

/// Independent score-to-level derivation (`≤30 Low, ≤60 Moderate, ≤85 High, else Critical`)
pub fn risk_level_from_score(score: u8) -> RiskLevel {
    match score {
        0..=30 => RiskLevel::Low,
        31..=60 => RiskLevel::Moderate,
        61..=85 => RiskLevel::High,
        _ => RiskLevel::Critical,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer {
    categorizer: StressCategorizer,
}

impl RiskScorer {
    pub fn new(categorizer: StressCategorizer) -> Self {
        Self { categorizer }
    }

    /// Score range covered by the category's band.
    ///
    /// Categories sharing a band (NoStress and Low) share one range, so the
    /// score keeps rising across the breakpoint between them.
    pub fn band_score_range(&self, category: StressCategory) -> (f64, f64) {
        let band = risk_band(category);
        StressCategory::ALL
            .into_iter()
            .filter(|c| risk_band(*c) == band)
            .map(|c| self.categorizer.score_range(c))
            .fold(self.categorizer.score_range(category), |(lo, hi), (l, h)| {
                (lo.min(l), hi.max(h))
            })
    }

    /// Score a final category.
    ///
    /// `fused_score` is located inside the band's score range; scores below
    /// or above the range (possible after reconciliation raised the category)
    /// pin to the band edges. Without a score the band midpoint is used.
    pub fn assess(&self, category: StressCategory, fused_score: Option<f64>) -> RiskAssessment {
        let (lo, hi, risk_level) = risk_band(category);

        let position = match fused_score.filter(|s| s.is_finite()) {
            Some(score) => {
                let (range_lo, range_hi) = self.band_score_range(category);
                ((score - range_lo) / (range_hi - range_lo)).clamp(0.0, 1.0)
            }
            None => 0.5,
        };

        let span = f64::from(hi - lo);
        let risk_score = (f64::from(lo) + position * span).round() as u8;

        RiskAssessment {
            risk_score: risk_score.clamp(lo, hi),
            risk_level,
        }
    }
}
