//! Score to category mapping

use crate::config::CategoryThresholds;
use crate::types::StressCategory;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-modality stress label used in narrative text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalityStressLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl ModalityStressLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModalityStressLevel::Low => "low",
            ModalityStressLevel::Moderate => "moderate",
            ModalityStressLevel::High => "high",
            ModalityStressLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for ModalityStressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps continuous stress scores onto ordinal categories
#[derive(Debug, Clone, Copy, Default)]
pub struct StressCategorizer {
    thresholds: CategoryThresholds,
}

impl StressCategorizer {
    pub fn new(thresholds: CategoryThresholds) -> Self {
        Self { thresholds }
    }

    /// `<0.25 NoStress, <0.5 Low, <0.75 Moderate, else High` with the default table
    pub fn categorize(&self, score: f64) -> StressCategory {
        let [low, moderate, high] = self.thresholds.stress;
        if score < low {
            StressCategory::NoStress
        } else if score < moderate {
            StressCategory::Low
        } else if score < high {
            StressCategory::Moderate
        } else {
            StressCategory::High
        }
    }

    /// Looser per-modality labeling (`<0.3 Low, <0.6 Moderate, <0.8 High, else Critical`)
    pub fn label_modality(&self, score: f64) -> ModalityStressLevel {
        let [low, moderate, high, _critical] = self.thresholds.modality;
        if score < low {
            ModalityStressLevel::Low
        } else if score < moderate {
            ModalityStressLevel::Moderate
        } else if score < high {
            ModalityStressLevel::High
        } else {
            ModalityStressLevel::Critical
        }
    }

    /// Half-open score range `[lo, hi)` that maps to `category`
    pub fn score_range(&self, category: StressCategory) -> (f64, f64) {
        let [low, moderate, high] = self.thresholds.stress;
        match category {
            StressCategory::NoStress => (0.0, low),
            StressCategory::Low => (low, moderate),
            StressCategory::Moderate => (moderate, high),
            StressCategory::High => (high, 1.0),
        }
    }
}

/// Score that stands for a whole category when only the category is known
pub fn representative_score(category: StressCategory) -> f64 {
    match category {
        StressCategory::NoStress => 0.1,
        StressCategory::Low => 0.3,
        StressCategory::Moderate => 0.6,
        StressCategory::High => 0.85,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_breakpoints() {
        let c = StressCategorizer::default();
        assert_eq!(c.categorize(0.0), StressCategory::NoStress);
        assert_eq!(c.categorize(0.249), StressCategory::NoStress);
        assert_eq!(c.categorize(0.25), StressCategory::Low);
        assert_eq!(c.categorize(0.499), StressCategory::Low);
        assert_eq!(c.categorize(0.5), StressCategory::Moderate);
        assert_eq!(c.categorize(0.749), StressCategory::Moderate);
        assert_eq!(c.categorize(0.75), StressCategory::High);
        assert_eq!(c.categorize(1.0), StressCategory::High);
    }

    #[test]
    fn test_modality_labels_use_looser_set() {
        let c = StressCategorizer::default();
        assert_eq!(c.label_modality(0.29), ModalityStressLevel::Low);
        assert_eq!(c.label_modality(0.3), ModalityStressLevel::Moderate);
        assert_eq!(c.label_modality(0.6), ModalityStressLevel::High);
        assert_eq!(c.label_modality(0.8), ModalityStressLevel::Critical);
        assert_eq!(c.label_modality(0.95), ModalityStressLevel::Critical);
    }

    #[test]
    fn test_score_ranges_cover_unit_interval() {
        let c = StressCategorizer::default();
        let mut expected_lo = 0.0;
        for category in StressCategory::ALL {
            let (lo, hi) = c.score_range(category);
            assert_eq!(lo, expected_lo);
            assert!(hi > lo);
            assert_eq!(c.categorize(lo), category);
            expected_lo = hi;
        }
        assert_eq!(expected_lo, 1.0);
    }

    #[test]
    fn test_representative_scores_categorize_back() {
        let c = StressCategorizer::default();
        for category in StressCategory::ALL {
            assert_eq!(c.categorize(representative_score(category)), category);
        }
    }

    #[test]
    fn test_custom_thresholds() {
        let c = StressCategorizer::new(CategoryThresholds {
            stress: [0.1, 0.2, 0.3],
            ..CategoryThresholds::default()
        });
        assert_eq!(c.categorize(0.35), StressCategory::High);
        assert_eq!(c.categorize(0.15), StressCategory::Low);
    }
}
