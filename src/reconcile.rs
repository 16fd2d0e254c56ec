//! Emotion/stress reconciliation
//!
//! A model's stress estimate and the detected emotion can disagree. The final
//! category takes the more severe of the two, except that a high-severity
//! emotion paired with a calm model estimate lands on `Moderate`: never lower.

use crate::types::{EmotionTag, StressCategory};

/// Baseline stress category implied by an emotion alone
pub fn baseline(emotion: EmotionTag) -> StressCategory {
    match emotion {
        EmotionTag::Happy => StressCategory::NoStress,
        EmotionTag::Neutral | EmotionTag::Surprised => StressCategory::Low,
        EmotionTag::Disgusted => StressCategory::Moderate,
        EmotionTag::Sad | EmotionTag::Anxious | EmotionTag::Fearful | EmotionTag::Angry => {
            StressCategory::High
        }
    }
}

/// Reconcile the model-derived category with the emotion baseline
pub fn combine(model: Option<StressCategory>, emotion: StressCategory) -> StressCategory {
    let Some(model) = model else {
        return emotion;
    };

    // Safety floor: a clearly negative emotion is never reported as low stress
    if emotion.severity() >= StressCategory::High.severity()
        && model.severity() <= StressCategory::Low.severity()
    {
        return StressCategory::Moderate;
    }

    model.max(emotion)
}

/// Baseline lookup plus reconciliation in one step
pub fn reconcile(model: Option<StressCategory>, emotion: EmotionTag) -> StressCategory {
    combine(model, baseline(emotion))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_table() {
        assert_eq!(baseline(EmotionTag::Happy), StressCategory::NoStress);
        assert_eq!(baseline(EmotionTag::Neutral), StressCategory::Low);
        assert_eq!(baseline(EmotionTag::Surprised), StressCategory::Low);
        assert_eq!(baseline(EmotionTag::Disgusted), StressCategory::Moderate);
        assert_eq!(baseline(EmotionTag::Sad), StressCategory::High);
        assert_eq!(baseline(EmotionTag::Anxious), StressCategory::High);
        assert_eq!(baseline(EmotionTag::Fearful), StressCategory::High);
        assert_eq!(baseline(EmotionTag::Angry), StressCategory::High);
    }

    #[test]
    fn test_no_model_category_returns_baseline() {
        for emotion in EmotionTag::ALL {
            assert_eq!(reconcile(None, emotion), baseline(emotion));
        }
    }

    #[test]
    fn test_named_cases() {
        assert_eq!(
            reconcile(Some(StressCategory::Low), EmotionTag::Sad),
            StressCategory::Moderate
        );
        assert_eq!(
            reconcile(Some(StressCategory::High), EmotionTag::Happy),
            StressCategory::High
        );
        assert_eq!(
            reconcile(Some(StressCategory::Moderate), EmotionTag::Happy),
            StressCategory::Moderate
        );
        assert_eq!(
            reconcile(Some(StressCategory::NoStress), EmotionTag::Angry),
            StressCategory::Moderate
        );
    }

    #[test]
    fn test_exhaustive_against_reference_rule() {
        let models = [
            None,
            Some(StressCategory::NoStress),
            Some(StressCategory::Low),
            Some(StressCategory::Moderate),
            Some(StressCategory::High),
        ];

        for model in models {
            for emotion in EmotionTag::ALL {
                let base = baseline(emotion);
                let result = reconcile(model, emotion);

                let expected = match model {
                    None => base,
                    Some(m) if base == StressCategory::High && m <= StressCategory::Low => {
                        StressCategory::Moderate
                    }
                    Some(m) => m.max(base),
                };
                assert_eq!(result, expected, "model={model:?} emotion={emotion}");

                // Never below the model's own estimate
                if let Some(m) = model {
                    assert!(result >= m);
                }
                // A negative emotion never ends below Moderate
                if emotion.is_negative() {
                    assert!(result >= StressCategory::Moderate);
                }
            }
        }
    }
}
