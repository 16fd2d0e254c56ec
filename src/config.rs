//! Engine configuration
//!
//! All tunables live in one immutable `EngineConfig`. Weight tables are
//! renormalized on construction and never rejected; threshold tables are
//! validated because an out-of-order table would silently break the category
//! ordering.

use crate::error::FusionError;
use crate::types::Modality;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Default per-modality classifier timeout
pub const DEFAULT_MODALITY_TIMEOUT_MS: u64 = 5_000;

/// Default number of entries kept in each user's rolling history
pub const DEFAULT_HISTORY_WINDOW: usize = 50;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Base fusion weights, always summing to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawWeights")]
pub struct FusionWeights {
    text: f64,
    image: f64,
    behavioral: f64,
}

#[derive(Deserialize)]
struct RawWeights {
    #[serde(default)]
    text: f64,
    #[serde(default)]
    image: f64,
    #[serde(default)]
    behavioral: f64,
}

impl From<RawWeights> for FusionWeights {
    fn from(raw: RawWeights) -> Self {
        FusionWeights::new(raw.text, raw.image, raw.behavioral)
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            text: 0.4,
            image: 0.3,
            behavioral: 0.3,
        }
    }
}

impl FusionWeights {
    /// Build a weight table, renormalizing when the sum is not 1.
    ///
    /// Negative and non-finite entries count as 0. A table with no positive
    /// entry falls back to the defaults.
    pub fn new(text: f64, image: f64, behavioral: f64) -> Self {
        let sanitize = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
        let (text, image, behavioral) = (sanitize(text), sanitize(image), sanitize(behavioral));
        let total = text + image + behavioral;

        if total <= 0.0 {
            tracing::warn!("fusion weights have no positive entry, using defaults");
            return Self::default();
        }
        if (total - 1.0).abs() <= WEIGHT_SUM_TOLERANCE {
            return Self {
                text,
                image,
                behavioral,
            };
        }

        tracing::warn!(total, "fusion weights do not sum to 1, renormalizing");
        Self {
            text: text / total,
            image: image / total,
            behavioral: behavioral / total,
        }
    }

    /// Build from a modality-keyed map; missing modalities get weight 0
    pub fn from_map(weights: &HashMap<Modality, f64>) -> Self {
        let get = |m: Modality| weights.get(&m).copied().unwrap_or(0.0);
        Self::new(
            get(Modality::Text),
            get(Modality::Image),
            get(Modality::Behavioral),
        )
    }

    pub fn weight(&self, modality: Modality) -> f64 {
        match modality {
            Modality::Text => self.text,
            Modality::Image => self.image,
            Modality::Behavioral => self.behavioral,
        }
    }

    pub fn as_map(&self) -> BTreeMap<Modality, f64> {
        Modality::ALL.iter().map(|&m| (m, self.weight(m))).collect()
    }

    /// Weights restricted to `present` and renormalized to sum to 1.
    ///
    /// Falls back to equal weights when every present modality has weight 0.
    pub fn renormalized_for(&self, present: &[Modality]) -> BTreeMap<Modality, f64> {
        let mut selected: BTreeMap<Modality, f64> =
            present.iter().map(|&m| (m, self.weight(m))).collect();
        if selected.is_empty() {
            return selected;
        }

        let total: f64 = selected.values().sum();
        if total <= 0.0 {
            let equal = 1.0 / selected.len() as f64;
            selected.values_mut().for_each(|w| *w = equal);
        } else {
            selected.values_mut().for_each(|w| *w /= total);
        }
        selected
    }
}

/// Score breakpoints for every category derivation in the crate
///
/// `stress` drives the fused-score categorizer (NoStress/Low/Moderate/High).
/// `modality` is the looser per-modality labeling set (Low/Moderate/High/
/// Critical) used for narrative text; its last entry is carried but unused.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryThresholds {
    pub stress: [f64; 3],
    pub modality: [f64; 4],
}

impl Default for CategoryThresholds {
    fn default() -> Self {
        Self {
            stress: [0.25, 0.5, 0.75],
            modality: [0.3, 0.6, 0.8, 0.9],
        }
    }
}

impl CategoryThresholds {
    pub fn validate(&self) -> Result<(), FusionError> {
        check_breakpoints("stress", &self.stress)?;
        check_breakpoints("modality", &self.modality)
    }
}

fn check_breakpoints(name: &str, points: &[f64]) -> Result<(), FusionError> {
    if points.iter().any(|p| !p.is_finite() || *p <= 0.0 || *p >= 1.0) {
        return Err(FusionError::InvalidConfig(format!(
            "{name} thresholds must lie strictly between 0 and 1"
        )));
    }
    if points.windows(2).any(|w| w[0] >= w[1]) {
        return Err(FusionError::InvalidConfig(format!(
            "{name} thresholds must be strictly increasing"
        )));
    }
    Ok(())
}

/// What to do with a modality whose classifier failed or timed out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Drop the modality from fusion
    #[default]
    Absent,
    /// Keep it with a neutral score (0.5) and zero confidence
    NeutralDefault,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: FusionWeights,
    pub thresholds: CategoryThresholds,
    pub modality_timeout_ms: u64,
    pub history_window: usize,
    pub failure_policy: FailurePolicy,
    /// Apply keyword rules to raw text before trusting the text classifier
    pub text_rules: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: FusionWeights::default(),
            thresholds: CategoryThresholds::default(),
            modality_timeout_ms: DEFAULT_MODALITY_TIMEOUT_MS,
            history_window: DEFAULT_HISTORY_WINDOW,
            failure_policy: FailurePolicy::default(),
            text_rules: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), FusionError> {
        self.thresholds.validate()?;
        if self.history_window == 0 {
            return Err(FusionError::InvalidConfig(
                "history_window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, FusionError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, FusionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
