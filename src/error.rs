//! Error types for MindScope fusion

use crate::types::Modality;
use thiserror::Error;

/// Errors surfaced to callers of the fusion engine.
///
/// Only caller contract violations end up here. Data quality problems inside a
/// single modality degrade that modality instead.
#[derive(Debug, Error)]
pub enum FusionError {
    #[error("No modalities present: at least one of text, image or behavioral is required")]
    NoModalities,

    #[error("Unknown emotion tag: {0}")]
    UnknownEmotion(String),

    #[error("Unknown stress label: {0}")]
    UnknownStressLabel(String),

    #[error("Unknown modality: {0}")]
    UnknownModality(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

/// Errors reported by an upstream classifier for a single modality
#[derive(Debug, Clone, Error)]
pub enum ClassifierError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid classifier input: {0}")]
    InvalidInput(String),

    #[error("{0} classifier timed out")]
    Timeout(Modality),
}
