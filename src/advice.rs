//! Coping suggestions and wellness tips
//!
//! Selection is a fixed lookup on (emotion bucket, final stress category),
//! refined by the risk level. Same inputs, same advice.

use crate::types::{EmotionTag, Recommendation, RiskLevel, StressCategory};

/// Upper bound on returned suggestions
pub const MAX_SUGGESTIONS: usize = 5;

const PROFESSIONAL_SUPPORT_CLAUSE: &str =
    " Consider talking with a trusted professional if symptoms persist.";

const MAINTENANCE: &[&str] = &[
    "Maintain your current routines and self-care practices.",
    "Continue expressing gratitude and connecting with supportive people.",
    "Engage in light physical activity or hobbies you enjoy.",
    "Keep a journal to track positive moments and patterns.",
    "Stay connected with friends and family who uplift you.",
];

const MODERATE_ANXIOUS: &[&str] = &[
    "Practice deep breathing exercises (4-7-8 technique).",
    "Try progressive muscle relaxation or a short meditation.",
    "Write down your worries and identify what you can control.",
    "Take a short walk or do gentle stretching.",
    "Limit caffeine and ensure you're getting enough sleep.",
];

const MODERATE_LOW_MOOD: &[&str] = &[
    "Reach out to a trusted friend or family member.",
    "Engage in a creative activity or hobby you enjoy.",
    "Practice self-compassion and acknowledge your feelings.",
    "Take a break from social media or news if needed.",
    "Consider journaling to process your emotions.",
];

const MODERATE_GENERIC: &[&str] = &[
    "Practice mindfulness or breathing exercises.",
    "Take regular breaks and stretch throughout the day.",
    "Stay connected with supportive people.",
    "Maintain regular sleep and meal times.",
    "Engage in activities that bring you joy or relaxation.",
];

const HIGH_ANXIOUS: &[&str] = &[
    "Use grounding techniques: name 5 things you see, 4 you hear, 3 you feel.",
    "Practice box breathing: inhale-4, hold-4, exhale-4, hold-4.",
    "Reduce overwhelming inputs (social media, news, notifications).",
    "Reach out for support from friends, family, or a professional.",
    "Establish a simple, predictable routine for stability.",
];

const HIGH_LOW_MOOD: &[&str] = &[
    "Reach out for support from someone you trust.",
    "Practice self-compassion and acknowledge it's okay to feel this way.",
    "Engage in gentle activities that provide comfort.",
    "Consider talking with a mental health professional.",
    "Focus on small, manageable steps rather than big changes.",
];

const HIGH_GENERIC: &[&str] = &[
    "Use grounding techniques to stay present.",
    "Reach out for support from trusted people.",
    "Reduce overwhelming inputs and take breaks.",
    "Establish a simple routine for stability.",
    "Consider professional support if feelings persist.",
];

const FALLBACK: &[&str] = &[
    "Practice deep breathing or mindfulness exercises.",
    "Take a break and engage in a calming activity.",
    "Stay connected with supportive people.",
    "Maintain regular sleep and meal times.",
    "Consider talking to someone you trust.",
];

/// Emotion grouping the advice tables are keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdviceGroup {
    Positive,
    Anxious,
    LowMood,
    Other,
}

fn advice_group(emotion: EmotionTag) -> AdviceGroup {
    match emotion {
        EmotionTag::Happy | EmotionTag::Neutral => AdviceGroup::Positive,
        EmotionTag::Anxious | EmotionTag::Fearful => AdviceGroup::Anxious,
        EmotionTag::Sad | EmotionTag::Angry => AdviceGroup::LowMood,
        EmotionTag::Surprised | EmotionTag::Disgusted => AdviceGroup::Other,
    }
}

/// Deterministic selector for coping guidance
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationSelector;

impl RecommendationSelector {
    pub fn select(
        &self,
        emotion: EmotionTag,
        stress: StressCategory,
        risk_level: RiskLevel,
    ) -> Recommendation {
        Recommendation {
            coping_suggestions: self.coping_suggestions(emotion, stress),
            wellness_tip: self.wellness_tip(emotion, stress, risk_level),
        }
    }

    /// Between one and five suggestions; tables are capped, never padded
    pub fn coping_suggestions(&self, emotion: EmotionTag, stress: StressCategory) -> Vec<String> {
        let table = match (stress, advice_group(emotion)) {
            (StressCategory::NoStress | StressCategory::Low, AdviceGroup::Positive) => MAINTENANCE,
            (StressCategory::Moderate, AdviceGroup::Anxious) => MODERATE_ANXIOUS,
            (StressCategory::Moderate, AdviceGroup::LowMood) => MODERATE_LOW_MOOD,
            (StressCategory::Moderate, _) => MODERATE_GENERIC,
            (StressCategory::High, AdviceGroup::Anxious) => HIGH_ANXIOUS,
            (StressCategory::High, AdviceGroup::LowMood) => HIGH_LOW_MOOD,
            (StressCategory::High, _) => HIGH_GENERIC,
            _ => FALLBACK,
        };

        table
            .iter()
            .take(MAX_SUGGESTIONS)
            .map(|s| s.to_string())
            .collect()
    }

    pub fn wellness_tip(
        &self,
        emotion: EmotionTag,
        stress: StressCategory,
        risk_level: RiskLevel,
    ) -> String {
        let base = match (stress, advice_group(emotion)) {
            (StressCategory::NoStress | StressCategory::Low, AdviceGroup::Positive) => {
                "You're doing well. Keep nurturing your emotional balance and positive connections."
            }
            (StressCategory::Moderate, AdviceGroup::Anxious) => {
                "Take a mindful 2-minute pause to check in with how you're feeling. Ground yourself in the present moment."
            }
            (StressCategory::Moderate, AdviceGroup::LowMood) => {
                "Acknowledge your feelings without judgment. Reach out to someone you trust and give yourself space to process."
            }
            (StressCategory::Moderate, _) => {
                "Take a mindful break and give yourself space to process your feelings. Regular self-care practices can help manage stress levels."
            }
            (StressCategory::High, AdviceGroup::Anxious | AdviceGroup::LowMood) => {
                "Your feelings are valid. Reach out to a trusted friend or family member if these feelings persist or feel overwhelming."
            }
            (StressCategory::High, _) => {
                "Take care of yourself right now and reach out for support if needed."
            }
            _ => {
                "Take a deep breath and give yourself credit for checking in. Remember that seeking help is a sign of strength."
            }
        };

        if risk_level.requires_professional_support() {
            format!("{base}{PROFESSIONAL_SUPPORT_CLAUSE}")
        } else {
            base.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVELS: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Moderate,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    #[test]
    fn test_suggestion_count_over_enum_space() {
        let selector = RecommendationSelector;
        for emotion in EmotionTag::ALL {
            for stress in StressCategory::ALL {
                for level in LEVELS {
                    let rec = selector.select(emotion, stress, level);
                    let n = rec.coping_suggestions.len();
                    assert!((1..=MAX_SUGGESTIONS).contains(&n), "{emotion} {stress:?}");
                    assert!(!rec.wellness_tip.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_maintenance_for_calm_positive() {
        let selector = RecommendationSelector;
        let s = selector.coping_suggestions(EmotionTag::Happy, StressCategory::NoStress);
        assert_eq!(s[0], MAINTENANCE[0]);
        let s = selector.coping_suggestions(EmotionTag::Neutral, StressCategory::Low);
        assert_eq!(s[0], MAINTENANCE[0]);
    }

    #[test]
    fn test_moderate_branches() {
        let selector = RecommendationSelector;
        let anxious = selector.coping_suggestions(EmotionTag::Fearful, StressCategory::Moderate);
        assert!(anxious[0].contains("deep breathing"));

        let sad = selector.coping_suggestions(EmotionTag::Angry, StressCategory::Moderate);
        assert!(sad[0].contains("trusted friend"));

        let other = selector.coping_suggestions(EmotionTag::Happy, StressCategory::Moderate);
        assert_eq!(other[0], MODERATE_GENERIC[0]);
    }

    #[test]
    fn test_high_branches() {
        let selector = RecommendationSelector;
        let anxious = selector.coping_suggestions(EmotionTag::Anxious, StressCategory::High);
        assert!(anxious[0].starts_with("Use grounding techniques"));

        let sad = selector.coping_suggestions(EmotionTag::Sad, StressCategory::High);
        assert!(sad.iter().any(|s| s.contains("mental health professional")));

        let other = selector.coping_suggestions(EmotionTag::Disgusted, StressCategory::High);
        assert_eq!(other, HIGH_GENERIC.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    }

    #[test]
    fn test_fallback_for_unmatched_pair() {
        let selector = RecommendationSelector;
        let s = selector.coping_suggestions(EmotionTag::Surprised, StressCategory::Low);
        assert_eq!(s[0], FALLBACK[0]);
        let s = selector.coping_suggestions(EmotionTag::Sad, StressCategory::NoStress);
        assert_eq!(s[0], FALLBACK[0]);
    }

    #[test]
    fn test_tip_gets_professional_clause_only_for_high_risk() {
        let selector = RecommendationSelector;
        let low = selector.wellness_tip(EmotionTag::Sad, StressCategory::Moderate, RiskLevel::Moderate);
        assert!(!low.ends_with(PROFESSIONAL_SUPPORT_CLAUSE));

        let high = selector.wellness_tip(EmotionTag::Sad, StressCategory::High, RiskLevel::High);
        assert!(high.ends_with(PROFESSIONAL_SUPPORT_CLAUSE));

        let critical =
            selector.wellness_tip(EmotionTag::Happy, StressCategory::High, RiskLevel::Critical);
        assert!(critical.ends_with(PROFESSIONAL_SUPPORT_CLAUSE));
    }

    #[test]
    fn test_selection_is_deterministic() {
        let selector = RecommendationSelector;
        let a = selector.select(EmotionTag::Anxious, StressCategory::High, RiskLevel::High);
        let b = selector.select(EmotionTag::Anxious, StressCategory::High, RiskLevel::High);
        assert_eq!(a, b);
    }
}
