//! Pipeline orchestration
//!
//! Two entry points sit on top of [`FusionEngine`]:
//!
//! - [`AssessmentPipeline`] runs raw requests end to end: classifiers in
//!   parallel with per-modality timeouts, keyword rules, per-user history, then
//!   fusion.
//! - [`assess_json`] / [`FusionProcessor`] take already-classified inputs as
//!   JSON, statelessly or with one persistent history.

use crate::behavior::{
    count_emoji, AlertSeverity, BehavioralPatternAnalyzer, BehavioralProfile, EmojiCounts,
    HistoryEntry, HistoryRegistry, UserHistory,
};
use crate::classifier::{ImageClassifier, TextClassifier};
use crate::config::{EngineConfig, FailurePolicy};
use crate::encoder::ReportEncoder;
use crate::engine::FusionEngine;
use crate::error::{ClassifierError, FusionError};
use crate::text_rules::TextRules;
use crate::types::{
    AssessmentReport, EmotionTag, ImageAssessment, Modality, ModalityInputs, TextAssessment,
    NEUTRAL_STRESS_SCORE,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Assess pre-classified inputs given as JSON and return the encoded payload.
///
/// # Example
/// ```ignore
/// let payload = assess_json(r#"{"text": {"emotion": "sad", "stress_score": 0.7, "confidence": 0.8}}"#.to_string())?;
/// ```
pub fn assess_json(inputs_json: String) -> Result<String, FusionError> {
    let inputs: ModalityInputs = serde_json::from_str(&inputs_json)?;
    let report = FusionEngine::default().assess(&inputs)?;
    ReportEncoder::new().encode_to_json(report, None)
}

/// Analyze a behavioral profile given as JSON
pub fn behavior_json(profile_json: String) -> Result<String, FusionError> {
    let profile: BehavioralProfile = serde_json::from_str(&profile_json)?;
    let analysis = BehavioralPatternAnalyzer.analyze(&profile);
    serde_json::to_string_pretty(&analysis).map_err(|e| FusionError::EncodingError(e.to_string()))
}

/// Raw request for [`AssessmentPipeline::assess`]
#[derive(Debug, Clone, Default)]
pub struct AssessmentRequest {
    /// Enables history; anonymous requests are assessed statelessly
    pub user_id: Option<String>,
    pub text: Option<String>,
    /// Encoded image bytes
    pub image: Option<Vec<u8>>,
    pub behavioral: Option<BehavioralProfile>,
    /// Defaults to the time of assessment
    pub posted_at: Option<DateTime<Utc>>,
}

impl AssessmentRequest {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_behavioral(mut self, profile: BehavioralProfile) -> Self {
        self.behavioral = Some(profile);
        self
    }

    pub fn posted_at(mut self, at: DateTime<Utc>) -> Self {
        self.posted_at = Some(at);
        self
    }
}

#[derive(Debug, Clone)]
pub struct AssessmentOutcome {
    pub report: AssessmentReport,
    /// Escalation state after this assessment was recorded
    pub alert: Option<AlertSeverity>,
}

/// Async orchestration over injected classifiers
pub struct AssessmentPipeline {
    engine: FusionEngine,
    text_classifier: Option<Arc<dyn TextClassifier>>,
    image_classifier: Option<Arc<dyn ImageClassifier>>,
    text_rules: TextRules,
    history: HistoryRegistry,
    timeout: Duration,
    failure_policy: FailurePolicy,
}

impl AssessmentPipeline {
    pub fn new(config: EngineConfig) -> Result<Self, FusionError> {
        let timeout = Duration::from_millis(config.modality_timeout_ms);
        let failure_policy = config.failure_policy;
        let text_rules = TextRules::new(config.text_rules);
        let history = HistoryRegistry::new(config.history_window);
        let engine = FusionEngine::new(config)?;

        Ok(Self {
            engine,
            text_classifier: None,
            image_classifier: None,
            text_rules,
            history,
            timeout,
            failure_policy,
        })
    }

    pub fn with_text_classifier(mut self, classifier: Arc<dyn TextClassifier>) -> Self {
        self.text_classifier = Some(classifier);
        self
    }

    pub fn with_image_classifier(mut self, classifier: Arc<dyn ImageClassifier>) -> Self {
        self.image_classifier = Some(classifier);
        self
    }

    pub fn engine(&self) -> &FusionEngine {
        &self.engine
    }

    pub fn history(&self) -> &HistoryRegistry {
        &self.history
    }

    /// Restore a user's history saved with [`UserHistory::to_json`]
    pub fn load_user_history(&self, user_id: &str, json: &str) -> Result<(), FusionError> {
        let history = UserHistory::from_json(json)?;
        tracing::debug!(user_id, entries = history.len(), "restored user history");
        self.history.insert(user_id, history);
        Ok(())
    }

    /// Assess one raw request.
    ///
    /// Requested modalities are classified concurrently. A classifier that
    /// fails or exceeds its timeout degrades only its own modality. History is
    /// written only once the assessment succeeded, so dropping this future
    /// leaves no trace.
    pub async fn assess(&self, request: AssessmentRequest) -> Result<AssessmentOutcome, FusionError> {
        let text_task = async {
            match request.text.as_deref() {
                Some(text) => Some(self.classify_text(text).await),
                None => None,
            }
        };
        let image_task = async {
            match request.image.as_deref() {
                Some(image) => Some(self.classify_image(image).await),
                None => None,
            }
        };
        let (text_result, image_result) = futures::join!(text_task, image_task);

        let mut degraded = Vec::new();
        let text = self.resolve(Modality::Text, text_result, &mut degraded, |_| TextAssessment {
            emotion: EmotionTag::Neutral,
            stress_score: NEUTRAL_STRESS_SCORE,
            confidence: 0.0,
            stress_label: None,
        });
        let image = self.resolve(Modality::Image, image_result, &mut degraded, |_| {
            ImageAssessment {
                dominant_emotion: EmotionTag::Neutral,
                stress_score: NEUTRAL_STRESS_SCORE,
                confidence: 0.0,
                facial_metadata: None,
            }
        });

        let emoji_counts = request
            .text
            .as_deref()
            .map(count_emoji)
            .unwrap_or_default();
        let posted_at = request.posted_at.unwrap_or_else(Utc::now);

        let Some(user_id) = request.user_id.as_deref() else {
            let inputs = ModalityInputs {
                text,
                image,
                behavioral: request.behavioral,
            };
            let report = self.engine.assess_with_degraded(&inputs, degraded)?;
            return Ok(AssessmentOutcome {
                report,
                alert: None,
            });
        };

        // Same-user requests serialize here
        let handle = self.history.user(user_id);
        let mut history = handle.lock().await;

        let behavioral = request.behavioral.or_else(|| history.to_profile());
        let inputs = ModalityInputs {
            text,
            image,
            behavioral,
        };
        let report = self.engine.assess_with_degraded(&inputs, degraded)?;

        history.record(HistoryEntry::from_report(&report, posted_at, emoji_counts));
        let alert = history.alert_severity();
        tracing::debug!(user_id, entries = history.len(), ?alert, "recorded assessment");

        Ok(AssessmentOutcome { report, alert })
    }

    async fn classify_text(&self, text: &str) -> Result<TextAssessment, ClassifierError> {
        if let Some(ruled) = self.text_rules.short_circuit(text) {
            return Ok(ruled);
        }
        let classifier = self
            .text_classifier
            .as_ref()
            .ok_or_else(|| ClassifierError::Unavailable("no text classifier configured".into()))?;

        let classified = self
            .run_classifier(
                Modality::Text,
                classifier.name(),
                classifier.classify(text),
            )
            .await?;
        Ok(self.text_rules.apply(text, classified))
    }

    async fn classify_image(&self, image: &[u8]) -> Result<ImageAssessment, ClassifierError> {
        if image.is_empty() {
            return Err(ClassifierError::InvalidInput("empty image".into()));
        }
        let classifier = self
            .image_classifier
            .as_ref()
            .ok_or_else(|| ClassifierError::Unavailable("no image classifier configured".into()))?;

        self.run_classifier(Modality::Image, classifier.name(), classifier.classify(image))
            .await
    }

    /// Await one classifier call under the modality timeout
    async fn run_classifier<T>(
        &self,
        modality: Modality,
        classifier: &str,
        call: impl std::future::Future<Output = Result<T, ClassifierError>>,
    ) -> Result<T, ClassifierError> {
        let result = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ClassifierError::Timeout(modality)),
        };
        if let Err(error) = &result {
            tracing::warn!(%modality, classifier, %error, "classifier call failed");
        }
        result
    }

    /// Apply the failure policy to one modality's classification result
    fn resolve<T>(
        &self,
        modality: Modality,
        result: Option<Result<T, ClassifierError>>,
        degraded: &mut Vec<Modality>,
        neutral: impl FnOnce(Modality) -> T,
    ) -> Option<T> {
        match result? {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(%modality, %error, policy = ?self.failure_policy, "modality degraded");
                degraded.push(modality);
                match self.failure_policy {
                    FailurePolicy::Absent => None,
                    FailurePolicy::NeutralDefault => Some(neutral(modality)),
                }
            }
        }
    }
}

/// Stateful processor for one user with a persistent history.
///
/// Use this when pre-classified inputs arrive one at a time and the history
/// must survive between calls (e.g. across the FFI boundary).
pub struct FusionProcessor {
    engine: FusionEngine,
    history: UserHistory,
    encoder: ReportEncoder,
}

impl Default for FusionProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl FusionProcessor {
    /// Create a new processor with default settings
    pub fn new() -> Self {
        Self {
            engine: FusionEngine::default(),
            history: UserHistory::default(),
            encoder: ReportEncoder::new(),
        }
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, FusionError> {
        let history = UserHistory::new(config.history_window);
        Ok(Self {
            engine: FusionEngine::new(config)?,
            history,
            encoder: ReportEncoder::new(),
        })
    }

    pub fn engine(&self) -> &FusionEngine {
        &self.engine
    }

    pub fn history(&self) -> &UserHistory {
        &self.history
    }

    /// Load history state from JSON
    pub fn load_history(&mut self, json: &str) -> Result<(), FusionError> {
        self.history = UserHistory::from_json(json)?;
        Ok(())
    }

    /// Save history state to JSON
    pub fn save_history(&self) -> Result<String, FusionError> {
        self.history
            .to_json()
            .map_err(|e| FusionError::EncodingError(e.to_string()))
    }

    /// Assess inputs, falling back to the history's profile for the behavioral modality
    pub fn process(
        &mut self,
        mut inputs: ModalityInputs,
        posted_at: DateTime<Utc>,
        emoji_counts: EmojiCounts,
    ) -> Result<AssessmentReport, FusionError> {
        if inputs.behavioral.is_none() {
            inputs.behavioral = self.history.to_profile();
        }
        let report = self.engine.assess(&inputs)?;
        self.history
            .record(HistoryEntry::from_report(&report, posted_at, emoji_counts));
        Ok(report)
    }

    /// JSON in, encoded payload out
    pub fn process_json(&mut self, inputs_json: &str) -> Result<String, FusionError> {
        let inputs: ModalityInputs = serde_json::from_str(inputs_json)?;
        let report = self.process(inputs, Utc::now(), EmojiCounts::new())?;
        self.encoder
            .encode_to_json(report, self.history.alert_severity())
    }
}
