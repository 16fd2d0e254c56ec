//! MindScope fusion - multimodal stress risk engine
//!
//! Combines up to three independent signals about a person's momentary state
//! (free text, a facial image, behavioral metadata) into one consistent verdict:
//! fusion → categorization → emotion reconciliation → risk → recommendations.
//!
//! ## Modules
//!
//! - **Engine**: synchronous core over already-classified inputs
//! - **Pipeline**: async orchestration over injected classifiers with per-user history
//! - **Behavior**: emoji, posting cadence and time-of-day analysis

pub mod advice;
pub mod behavior;
pub mod categorize;
pub mod classifier;
pub mod config;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod fusion;
pub mod pipeline;
pub mod reconcile;
pub mod risk;
pub mod text_rules;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use classifier::{ImageClassifier, TextClassifier};
pub use config::{CategoryThresholds, EngineConfig, FailurePolicy, FusionWeights};
pub use engine::FusionEngine;
pub use error::{ClassifierError, FusionError};
pub use pipeline::{
    assess_json, behavior_json, AssessmentOutcome, AssessmentPipeline, AssessmentRequest,
    FusionProcessor,
};
pub use types::{
    AssessmentReport, EmotionTag, FusionResult, ImageAssessment, Modality, ModalityAssessment,
    ModalityInputs, Recommendation, RiskAssessment, RiskLevel, StressCategory, TextAssessment,
};

// Behavioral exports
pub use behavior::{BehavioralPatternAnalyzer, BehavioralProfile, HistoryRegistry};

/// Library version embedded in all payloads
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for payloads
pub const PRODUCER_NAME: &str = "mindscope-fusion";
