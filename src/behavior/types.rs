//! Behavioral data types
//!
//! Types for the behavioral signals (emoji usage, posting cadence, posting
//! times) that feed the behavioral modality, and the analysis derived from
//! them.

use crate::types::{EmotionTag, Modality, ModalityAssessment};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Emoji emotion bucket
///
/// Variant order is the tie-break order for the dominant bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmojiBucket {
    Happy,
    Sad,
    Anxious,
    Angry,
    Neutral,
    Excited,
}

impl EmojiBucket {
    pub const ALL: [EmojiBucket; 6] = [
        EmojiBucket::Happy,
        EmojiBucket::Sad,
        EmojiBucket::Anxious,
        EmojiBucket::Angry,
        EmojiBucket::Neutral,
        EmojiBucket::Excited,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmojiBucket::Happy => "happy",
            EmojiBucket::Sad => "sad",
            EmojiBucket::Anxious => "anxious",
            EmojiBucket::Angry => "angry",
            EmojiBucket::Neutral => "neutral",
            EmojiBucket::Excited => "excited",
        }
    }

    /// Buckets that count toward the emoji stress indicator
    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            EmojiBucket::Sad | EmojiBucket::Anxious | EmojiBucket::Angry
        )
    }

    /// Platform emotion for this bucket (`excited` folds into `happy`)
    pub fn to_emotion(&self) -> EmotionTag {
        match self {
            EmojiBucket::Happy | EmojiBucket::Excited => EmotionTag::Happy,
            EmojiBucket::Sad => EmotionTag::Sad,
            EmojiBucket::Anxious => EmotionTag::Anxious,
            EmojiBucket::Angry => EmotionTag::Angry,
            EmojiBucket::Neutral => EmotionTag::Neutral,
        }
    }
}

impl fmt::Display for EmojiBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emoji counts per bucket; missing buckets count as zero
pub type EmojiCounts = BTreeMap<EmojiBucket, u32>;

/// Behavioral metadata for one user over a recent window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehavioralProfile {
    #[serde(default, alias = "emoji_usage")]
    pub emoji_counts: EmojiCounts,
    /// Posts per day
    #[serde(default)]
    pub posting_frequency: f64,
    /// Post timestamps (UTC)
    #[serde(default)]
    pub posts_timeline: Vec<DateTime<Utc>>,
}

impl BehavioralProfile {
    pub fn total_emoji(&self) -> u64 {
        self.emoji_counts.values().map(|&c| u64::from(c)).sum()
    }
}

/// Emoji usage breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmojiAnalysis {
    pub dominant: EmojiBucket,
    /// Share of each bucket in the total (empty when no emoji were used)
    pub ratios: BTreeMap<EmojiBucket, f64>,
    /// Combined share of sad, anxious and angry emoji
    pub stress_indicator: f64,
    /// Fraction of buckets with any usage
    pub diversity: f64,
    pub total: u64,
}

/// Posting cadence band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyPattern {
    Low,
    Moderate,
    High,
    Excessive,
}

impl FrequencyPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrequencyPattern::Low => "low",
            FrequencyPattern::Moderate => "moderate",
            FrequencyPattern::High => "high",
            FrequencyPattern::Excessive => "excessive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyAnalysis {
    pub pattern: FrequencyPattern,
    pub posts_per_day: f64,
    pub stress_indicator: f64,
}

/// Part of the day a post falls into (hours in UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPeriod {
    EarlyMorning,
    Morning,
    Afternoon,
    Evening,
    Night,
    LateNight,
}

impl DayPeriod {
    pub const ALL: [DayPeriod; 6] = [
        DayPeriod::EarlyMorning,
        DayPeriod::Morning,
        DayPeriod::Afternoon,
        DayPeriod::Evening,
        DayPeriod::Night,
        DayPeriod::LateNight,
    ];

    /// `5-9 early_morning, 9-12 morning, 12-17 afternoon, 17-21 evening, 21-24 night, 0-5 late_night`
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=8 => DayPeriod::EarlyMorning,
            9..=11 => DayPeriod::Morning,
            12..=16 => DayPeriod::Afternoon,
            17..=20 => DayPeriod::Evening,
            21..=23 => DayPeriod::Night,
            _ => DayPeriod::LateNight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalPattern {
    Normal,
    LateNightPosting,
    EarlyMorningPosting,
}

impl TemporalPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemporalPattern::Normal => "normal",
            TemporalPattern::LateNightPosting => "late_night_posting",
            TemporalPattern::EarlyMorningPosting => "early_morning_posting",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalAnalysis {
    pub pattern: TemporalPattern,
    /// Posts per day period (empty when there is no timeline)
    pub distribution: BTreeMap<DayPeriod, u32>,
    pub stress_indicator: f64,
}

/// Complete behavioral analysis for one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralAnalysis {
    pub emoji: EmojiAnalysis,
    pub frequency: FrequencyAnalysis,
    pub temporal: TemporalAnalysis,
    /// Combined behavioral stress score (0-1)
    pub behavioral_score: f64,
    pub confidence: f64,
    pub insights: Vec<String>,
}

impl BehavioralAnalysis {
    /// Behavioral modality input for fusion
    pub fn to_assessment(&self) -> ModalityAssessment {
        ModalityAssessment::new(
            Modality::Behavioral,
            self.emoji.dominant.to_emotion(),
            self.behavioral_score,
            self.confidence,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_period_boundaries() {
        assert_eq!(DayPeriod::from_hour(0), DayPeriod::LateNight);
        assert_eq!(DayPeriod::from_hour(4), DayPeriod::LateNight);
        assert_eq!(DayPeriod::from_hour(5), DayPeriod::EarlyMorning);
        assert_eq!(DayPeriod::from_hour(9), DayPeriod::Morning);
        assert_eq!(DayPeriod::from_hour(12), DayPeriod::Afternoon);
        assert_eq!(DayPeriod::from_hour(17), DayPeriod::Evening);
        assert_eq!(DayPeriod::from_hour(21), DayPeriod::Night);
        assert_eq!(DayPeriod::from_hour(23), DayPeriod::Night);
    }

    #[test]
    fn test_excited_folds_into_happy() {
        assert_eq!(EmojiBucket::Excited.to_emotion(), EmotionTag::Happy);
        assert_eq!(EmojiBucket::Angry.to_emotion(), EmotionTag::Angry);
    }

    #[test]
    fn test_profile_deserialize_with_original_field_name() {
        let json = r#"{
            "emoji_usage": {"happy": 3, "sad": 1},
            "posting_frequency": 2.0,
            "posts_timeline": ["2024-03-01T02:15:00Z"]
        }"#;
        let profile: BehavioralProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.emoji_counts[&EmojiBucket::Happy], 3);
        assert_eq!(profile.total_emoji(), 4);
        assert_eq!(profile.posts_timeline.len(), 1);
    }

    #[test]
    fn test_profile_defaults_when_empty() {
        let profile: BehavioralProfile = serde_json::from_str("{}").unwrap();
        assert_eq!(profile, BehavioralProfile::default());
    }
}
