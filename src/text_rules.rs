//! Keyword rules for short or obvious text
//!
//! Very short posts ("I'm anxious") are classified by keyword before any model
//! is consulted, and an obvious phrase overrides a contradicting model label.
//! Keywords match whole words on normalized text, so "mad" does not fire on
//! "made".

use crate::categorize::representative_score;
use crate::types::{EmotionTag, StressCategory, TextAssessment};

/// Longest text (in words) the keyword classifier handles
pub const MAX_RULE_WORDS: usize = 7;

/// Confidence attached to a keyword classification
pub const RULE_CONFIDENCE: f64 = 0.9;

const RULES: &[(EmotionTag, StressCategory, &[&str])] = &[
    (
        EmotionTag::Happy,
        StressCategory::NoStress,
        &[
            "happy", "good", "fine", "great", "excited", "glad", "pleased", "joyful", "grateful",
            "thankful", "blessed", "wonderful", "amazing", "fantastic",
        ],
    ),
    (
        EmotionTag::Sad,
        StressCategory::Moderate,
        &[
            "sad", "upset", "cry", "crying", "depressed", "down", "unhappy", "miserable",
            "hopeless", "lonely", "empty", "worthless", "tears",
        ],
    ),
    (
        EmotionTag::Anxious,
        StressCategory::Moderate,
        &[
            "anxious", "anxiety", "worried", "nervous", "stressed", "stress", "overwhelmed",
            "panic", "panicking", "fearful", "scared", "afraid", "tense", "uneasy", "restless",
        ],
    ),
    (
        EmotionTag::Angry,
        StressCategory::Moderate,
        &[
            "angry", "mad", "furious", "irritated", "annoyed", "frustrated", "rage", "raging",
            "livid",
        ],
    ),
    (
        EmotionTag::Fearful,
        StressCategory::High,
        &["fear", "terrified", "horrified"],
    ),
    (
        EmotionTag::Neutral,
        StressCategory::Low,
        &[
            "ok", "okay", "normal", "nothing", "alright", "all right", "neutral", "calm",
            "peaceful",
        ],
    ),
];

const OVERRIDES: &[(EmotionTag, &[&str])] = &[
    (
        EmotionTag::Happy,
        &[
            "i am happy", "i'm happy", "im happy", "very happy", "so happy", "really happy",
            "feeling great", "i feel great", "feeling good", "i feel good", "excited", "awesome",
            "amazing", "wonderful", "i'm great", "im great", "i am great", "feeling fantastic",
        ],
    ),
    (
        EmotionTag::Anxious,
        &[
            "i am anxious", "i'm anxious", "im anxious", "feeling anxious", "i feel anxious",
            "nervous", "worried", "panic", "panicking", "panicked", "so tense", "very tense",
            "feeling tense", "overwhelmed", "stressed", "can't relax", "cannot relax",
            "cant relax",
        ],
    ),
    (
        EmotionTag::Sad,
        &[
            "i am sad", "i'm sad", "im sad", "feeling sad", "i feel sad", "depressed",
            "feeling low", "feeling down", "lonely", "worthless", "hopeless", "empty", "crying",
        ],
    ),
    (
        EmotionTag::Angry,
        &[
            "i am angry", "i'm angry", "im angry", "feeling angry", "i feel angry", "mad",
            "furious", "irritated", "annoyed", "frustrated",
        ],
    ),
    (
        EmotionTag::Fearful,
        &[
            "i am afraid", "i'm afraid", "im afraid", "feeling afraid", "i feel afraid", "scared",
            "terrified", "horrified",
        ],
    ),
];

/// Lowercase, drop punctuation except apostrophes, collapse whitespace
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '\'' || *c == '_')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whole-word (or whole-phrase) containment on normalized text
fn contains_phrase(normalized: &str, phrase: &str) -> bool {
    let haystack = format!(" {normalized} ");
    haystack.contains(&format!(" {phrase} "))
}

/// Keyword classification for texts of at most seven words
pub fn rule_based(text: &str) -> Option<(EmotionTag, StressCategory)> {
    let normalized = normalize(text);
    let words = normalized.split(' ').filter(|w| !w.is_empty()).count();
    if words == 0 || words > MAX_RULE_WORDS {
        return None;
    }

    RULES
        .iter()
        .find(|(_, _, keywords)| keywords.iter().any(|k| contains_phrase(&normalized, k)))
        .map(|(emotion, stress, _)| (*emotion, *stress))
}

/// Replace `current` when the text contains an unmistakable phrase
pub fn override_emotion(text: &str, current: EmotionTag) -> EmotionTag {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return current;
    }

    OVERRIDES
        .iter()
        .find(|(_, phrases)| phrases.iter().any(|p| contains_phrase(&normalized, p)))
        .map(|(emotion, _)| *emotion)
        .unwrap_or(current)
}

/// Keyword rules applied around a text classifier
#[derive(Debug, Clone, Copy)]
pub struct TextRules {
    enabled: bool,
}

impl Default for TextRules {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl TextRules {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Keyword result that makes a classifier call unnecessary
    pub fn short_circuit(&self, text: &str) -> Option<TextAssessment> {
        if !self.enabled {
            return None;
        }
        rule_based(text).map(|(emotion, stress)| {
            tracing::debug!(%emotion, ?stress, "text matched keyword rule");
            TextAssessment {
                emotion,
                stress_score: representative_score(stress),
                confidence: RULE_CONFIDENCE,
                stress_label: Some(stress),
            }
        })
    }

    /// Correct a classifier result against obvious phrases
    pub fn apply(&self, text: &str, mut classified: TextAssessment) -> TextAssessment {
        if !self.enabled {
            return classified;
        }
        let emotion = override_emotion(text, classified.emotion);
        if emotion != classified.emotion {
            tracing::debug!(
                from = %classified.emotion,
                to = %emotion,
                "keyword override of text emotion"
            );
            classified.emotion = emotion;
        }
        classified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  I'm SO happy!!! "), "i'm so happy");
        assert_eq!(normalize("ok...fine"), "okfine");
        assert_eq!(normalize("ok, fine"), "ok fine");
    }

    #[test]
    fn test_rule_based_short_texts() {
        assert_eq!(
            rule_based("I'm happy"),
            Some((EmotionTag::Happy, StressCategory::NoStress))
        );
        assert_eq!(
            rule_based("feeling so anxious today"),
            Some((EmotionTag::Anxious, StressCategory::Moderate))
        );
        assert_eq!(
            rule_based("I'm terrified"),
            Some((EmotionTag::Fearful, StressCategory::High))
        );
        assert_eq!(
            rule_based("all right I guess"),
            Some((EmotionTag::Neutral, StressCategory::Low))
        );
    }

    #[test]
    fn test_rule_order_prefers_earlier_group() {
        // "upset" is listed as sad before angry, "fine" as happy before neutral
        assert_eq!(rule_based("so upset").map(|r| r.0), Some(EmotionTag::Sad));
        assert_eq!(rule_based("I'm fine").map(|r| r.0), Some(EmotionTag::Happy));
    }

    #[test]
    fn test_rule_based_skips_long_or_empty_text() {
        assert_eq!(rule_based(""), None);
        assert_eq!(rule_based("   "), None);
        assert_eq!(
            rule_based("today I walked to the store and felt very happy about it"),
            None
        );
        assert_eq!(rule_based("the weather report"), None);
    }

    #[test]
    fn test_whole_word_matching() {
        assert_eq!(rule_based("I made dinner"), None);
        assert_eq!(override_emotion("homemade bread", EmotionTag::Neutral), EmotionTag::Neutral);
    }

    #[test]
    fn test_override_emotion() {
        assert_eq!(override_emotion("I'm happy!", EmotionTag::Sad), EmotionTag::Happy);
        assert_eq!(
            override_emotion("I can't relax at all", EmotionTag::Neutral),
            EmotionTag::Anxious
        );
        assert_eq!(
            override_emotion("nothing special", EmotionTag::Surprised),
            EmotionTag::Surprised
        );
        assert_eq!(override_emotion("", EmotionTag::Angry), EmotionTag::Angry);
    }

    #[test]
    fn test_short_circuit_builds_assessment() {
        let rules = TextRules::default();
        let text = rules.short_circuit("so stressed").unwrap();
        assert_eq!(text.emotion, EmotionTag::Anxious);
        assert_eq!(text.stress_label, Some(StressCategory::Moderate));
        assert_eq!(text.stress_score, 0.6);
        assert_eq!(text.confidence, RULE_CONFIDENCE);

        assert!(TextRules::new(false).short_circuit("so stressed").is_none());
    }

    #[test]
    fn test_apply_overrides_classifier_label() {
        let rules = TextRules::default();
        let classified = TextAssessment {
            emotion: EmotionTag::Sad,
            stress_score: 0.7,
            confidence: 0.6,
            stress_label: None,
        };
        let corrected = rules.apply("honestly I feel great about the results", classified.clone());
        assert_eq!(corrected.emotion, EmotionTag::Happy);
        assert_eq!(corrected.stress_score, 0.7);

        let untouched = TextRules::new(false).apply("I feel great", classified.clone());
        assert_eq!(untouched, classified);
    }
}
