//! Behavioral modality
//!
//! Emoji usage, posting cadence and posting times are analyzed into a stress
//! estimate that joins fusion as the behavioral modality.
//!
//! Pipeline: post text → emoji extraction → user history → profile → analyzer → ModalityAssessment

pub mod analyzer;
pub mod emoji;
pub mod history;
pub mod types;

pub use analyzer::BehavioralPatternAnalyzer;
pub use emoji::count_emoji;
pub use history::{AlertSeverity, HistoryEntry, HistoryRegistry, UserHistory};
pub use types::{
    BehavioralAnalysis, BehavioralProfile, DayPeriod, EmojiAnalysis, EmojiBucket, EmojiCounts,
    FrequencyAnalysis, FrequencyPattern, TemporalAnalysis, TemporalPattern,
};
