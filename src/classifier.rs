//! Classifier capabilities
//!
//! Text and image inference run outside this crate. The pipeline only sees
//! these traits, so any model server, on-device runtime or test double can be
//! plugged in.

use crate::error::ClassifierError;
use crate::types::{ImageAssessment, TextAssessment};
use async_trait::async_trait;

/// Emotion and stress estimate for a piece of text
#[async_trait]
pub trait TextClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<TextAssessment, ClassifierError>;

    /// Short name used in logs
    fn name(&self) -> &str {
        "text"
    }
}

/// Facial emotion and stress estimate for an encoded image
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    async fn classify(&self, image: &[u8]) -> Result<ImageAssessment, ClassifierError>;

    fn name(&self) -> &str {
        "image"
    }
}
