//! Behavioral pattern analysis
//!
//! Turns a behavioral profile into a stress estimate from three signals:
//! emoji sentiment, posting cadence and posting time of day.

use crate::behavior::types::{
    BehavioralAnalysis, BehavioralProfile, DayPeriod, EmojiAnalysis, EmojiBucket, EmojiCounts,
    FrequencyAnalysis, FrequencyPattern, TemporalAnalysis, TemporalPattern,
};
use crate::types::NEUTRAL_STRESS_SCORE;
use chrono::{DateTime, Timelike, Utc};
use std::collections::BTreeMap;

/// Weights of the emoji, frequency and temporal indicators
const EMOJI_WEIGHT: f64 = 0.4;
const FREQUENCY_WEIGHT: f64 = 0.3;
const TEMPORAL_WEIGHT: f64 = 0.3;

/// Share of late-night posts above which the timeline is flagged
const LATE_NIGHT_RATIO: f64 = 0.3;
/// Share of early-morning posts above which the timeline is flagged
const EARLY_MORNING_RATIO: f64 = 0.4;

/// Analyzer for behavioral profiles
#[derive(Debug, Clone, Copy, Default)]
pub struct BehavioralPatternAnalyzer;

impl BehavioralPatternAnalyzer {
    pub fn analyze(&self, profile: &BehavioralProfile) -> BehavioralAnalysis {
        let emoji = analyze_emoji(&profile.emoji_counts);
        let frequency = analyze_frequency(profile.posting_frequency);
        let temporal = analyze_temporal(&profile.posts_timeline);

        let behavioral_score = combine_indicators(
            emoji.stress_indicator,
            frequency.stress_indicator,
            temporal.stress_indicator,
        );
        let confidence = compute_confidence(emoji.total);
        let insights = generate_insights(&emoji, &frequency, &temporal);

        tracing::debug!(
            behavioral_score,
            confidence,
            dominant = %emoji.dominant,
            "analyzed behavioral profile"
        );

        BehavioralAnalysis {
            emoji,
            frequency,
            temporal,
            behavioral_score,
            confidence,
            insights,
        }
    }
}

/// Emoji sentiment breakdown
///
/// No emoji at all means no information: neutral dominant, indicator 0.5.
/// Otherwise the indicator is the combined share of sad, anxious and angry.
pub fn analyze_emoji(counts: &EmojiCounts) -> EmojiAnalysis {
    let total: u64 = counts.values().map(|&c| u64::from(c)).sum();
    if total == 0 {
        return EmojiAnalysis {
            dominant: EmojiBucket::Neutral,
            ratios: BTreeMap::new(),
            stress_indicator: NEUTRAL_STRESS_SCORE,
            diversity: 0.0,
            total: 0,
        };
    }

    let ratios: BTreeMap<EmojiBucket, f64> = EmojiBucket::ALL
        .iter()
        .map(|&bucket| {
            let count = counts.get(&bucket).copied().unwrap_or(0);
            (bucket, f64::from(count) / total as f64)
        })
        .collect();

    // First bucket in fixed order wins a tie
    let mut dominant = EmojiBucket::ALL[0];
    for bucket in EmojiBucket::ALL {
        if ratios[&bucket] > ratios[&dominant] {
            dominant = bucket;
        }
    }

    let stress_indicator: f64 = ratios
        .iter()
        .filter(|(bucket, _)| bucket.is_negative())
        .map(|(_, ratio)| ratio)
        .sum();
    let used = ratios.values().filter(|r| **r > 0.0).count();
    let diversity = used as f64 / EmojiBucket::ALL.len() as f64;

    EmojiAnalysis {
        dominant,
        ratios,
        stress_indicator,
        diversity,
        total,
    }
}

/// Posting cadence band
///
/// `<0.5 low (0.3), <1.5 moderate (0.5), <3.0 high (0.7), else excessive (0.9)`.
/// Non-finite or negative rates count as 0.
pub fn analyze_frequency(posts_per_day: f64) -> FrequencyAnalysis {
    let f = if posts_per_day.is_finite() {
        posts_per_day.max(0.0)
    } else {
        0.0
    };

    let (pattern, stress_indicator) = if f < 0.5 {
        (FrequencyPattern::Low, 0.3)
    } else if f < 1.5 {
        (FrequencyPattern::Moderate, 0.5)
    } else if f < 3.0 {
        (FrequencyPattern::High, 0.7)
    } else {
        (FrequencyPattern::Excessive, 0.9)
    };

    FrequencyAnalysis {
        pattern,
        posts_per_day: f,
        stress_indicator,
    }
}

/// Time-of-day posting pattern
pub fn analyze_temporal(timeline: &[DateTime<Utc>]) -> TemporalAnalysis {
    if timeline.is_empty() {
        return TemporalAnalysis {
            pattern: TemporalPattern::Normal,
            distribution: BTreeMap::new(),
            stress_indicator: NEUTRAL_STRESS_SCORE,
        };
    }

    let mut distribution: BTreeMap<DayPeriod, u32> =
        DayPeriod::ALL.iter().map(|&p| (p, 0)).collect();
    for ts in timeline {
        *distribution.entry(DayPeriod::from_hour(ts.hour())).or_insert(0) += 1;
    }

    let total = timeline.len() as f64;
    let share = |period: DayPeriod| f64::from(distribution[&period]) / total;

    let (pattern, stress_indicator) = if share(DayPeriod::LateNight) > LATE_NIGHT_RATIO {
        (TemporalPattern::LateNightPosting, 0.8)
    } else if share(DayPeriod::EarlyMorning) > EARLY_MORNING_RATIO {
        (TemporalPattern::EarlyMorningPosting, 0.6)
    } else {
        (TemporalPattern::Normal, 0.5)
    };

    TemporalAnalysis {
        pattern,
        distribution,
        stress_indicator,
    }
}

/// Formula: `clamp01(emoji * 0.4 + frequency * 0.3 + temporal * 0.3)`
fn combine_indicators(emoji: f64, frequency: f64, temporal: f64) -> f64 {
    (emoji * EMOJI_WEIGHT + frequency * FREQUENCY_WEIGHT + temporal * TEMPORAL_WEIGHT)
        .clamp(0.0, 1.0)
}

/// Confidence grows with the amount of emoji evidence
fn compute_confidence(total_emoji: u64) -> f64 {
    match total_emoji {
        0 => 0.2,
        1..=5 => 0.4,
        6..=10 => 0.6,
        _ => 0.8,
    }
}

fn generate_insights(
    emoji: &EmojiAnalysis,
    frequency: &FrequencyAnalysis,
    temporal: &TemporalAnalysis,
) -> Vec<String> {
    let mut insights = Vec::new();

    if emoji.dominant.is_negative() {
        insights.push(format!(
            "Emoji usage suggests {} emotional state",
            emoji.dominant
        ));
    }

    match frequency.pattern {
        FrequencyPattern::Excessive => {
            insights.push("High posting frequency may indicate stress or crisis".to_string())
        }
        FrequencyPattern::Low => {
            insights.push("Low posting frequency might indicate social withdrawal".to_string())
        }
        FrequencyPattern::Moderate | FrequencyPattern::High => {}
    }

    if temporal.pattern == TemporalPattern::LateNightPosting {
        insights.push("Late night posting patterns suggest sleep disturbances".to_string());
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EmotionTag, Modality};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn counts(pairs: &[(EmojiBucket, u32)]) -> EmojiCounts {
        pairs.iter().copied().collect()
    }

    fn at_hour(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 15, 0).unwrap()
    }

    #[test]
    fn test_no_emoji_is_neutral() {
        let analysis = analyze_emoji(&EmojiCounts::new());
        assert_eq!(analysis.dominant, EmojiBucket::Neutral);
        assert_eq!(analysis.stress_indicator, 0.5);
        assert_eq!(analysis.diversity, 0.0);

        let zeros = analyze_emoji(&counts(&[(EmojiBucket::Sad, 0), (EmojiBucket::Happy, 0)]));
        assert_eq!(zeros.dominant, EmojiBucket::Neutral);
        assert_eq!(zeros.stress_indicator, 0.5);
    }

    #[test]
    fn test_happy_emoji_profile() {
        let analysis = analyze_emoji(&counts(&[
            (EmojiBucket::Happy, 10),
            (EmojiBucket::Sad, 0),
            (EmojiBucket::Anxious, 0),
            (EmojiBucket::Neutral, 2),
        ]));
        assert_eq!(analysis.dominant, EmojiBucket::Happy);
        assert_eq!(analysis.stress_indicator, 0.0);
        assert_eq!(analysis.total, 12);
        assert!((analysis.diversity - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_share_and_ties() {
        let analysis = analyze_emoji(&counts(&[
            (EmojiBucket::Sad, 2),
            (EmojiBucket::Angry, 2),
            (EmojiBucket::Happy, 1),
        ]));
        // Sad precedes angry in bucket order
        assert_eq!(analysis.dominant, EmojiBucket::Sad);
        assert!((analysis.stress_indicator - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_huge_counts_do_not_overflow() {
        let analysis = analyze_emoji(&counts(&[
            (EmojiBucket::Happy, u32::MAX),
            (EmojiBucket::Sad, 1),
        ]));
        assert_eq!(analysis.total, u64::from(u32::MAX) + 1);
        assert_eq!(analysis.dominant, EmojiBucket::Happy);
        assert!(analysis.stress_indicator > 0.0);
        assert!(analysis.stress_indicator < 1e-6);

        let profile = BehavioralProfile {
            emoji_counts: counts(&[(EmojiBucket::Angry, u32::MAX), (EmojiBucket::Sad, u32::MAX)]),
            ..Default::default()
        };
        assert_eq!(profile.total_emoji(), 2 * u64::from(u32::MAX));
        assert_eq!(BehavioralPatternAnalyzer.analyze(&profile).confidence, 0.8);
    }

    #[test]
    fn test_frequency_boundaries() {
        let cases = [
            (0.0, FrequencyPattern::Low, 0.3),
            (0.49, FrequencyPattern::Low, 0.3),
            (0.5, FrequencyPattern::Moderate, 0.5),
            (1.49, FrequencyPattern::Moderate, 0.5),
            (1.5, FrequencyPattern::High, 0.7),
            (2.99, FrequencyPattern::High, 0.7),
            (3.0, FrequencyPattern::Excessive, 0.9),
            (12.0, FrequencyPattern::Excessive, 0.9),
        ];
        for (f, pattern, indicator) in cases {
            let analysis = analyze_frequency(f);
            assert_eq!(analysis.pattern, pattern, "f={f}");
            assert_eq!(analysis.stress_indicator, indicator, "f={f}");
        }
    }

    #[test]
    fn test_frequency_invalid_input_is_low() {
        assert_eq!(analyze_frequency(f64::NAN).pattern, FrequencyPattern::Low);
        assert_eq!(analyze_frequency(-2.0).pattern, FrequencyPattern::Low);
        assert_eq!(analyze_frequency(-2.0).posts_per_day, 0.0);
    }

    #[test]
    fn test_temporal_empty_is_normal() {
        let analysis = analyze_temporal(&[]);
        assert_eq!(analysis.pattern, TemporalPattern::Normal);
        assert_eq!(analysis.stress_indicator, 0.5);
    }

    #[test]
    fn test_temporal_late_night() {
        let timeline = vec![at_hour(1), at_hour(2), at_hour(14)];
        let analysis = analyze_temporal(&timeline);
        assert_eq!(analysis.pattern, TemporalPattern::LateNightPosting);
        assert_eq!(analysis.stress_indicator, 0.8);
        assert_eq!(analysis.distribution[&DayPeriod::LateNight], 2);
        assert_eq!(analysis.distribution[&DayPeriod::Afternoon], 1);
    }

    #[test]
    fn test_temporal_early_morning() {
        let timeline = vec![at_hour(6), at_hour(7), at_hour(6), at_hour(13), at_hour(19)];
        let analysis = analyze_temporal(&timeline);
        assert_eq!(analysis.pattern, TemporalPattern::EarlyMorningPosting);
        assert_eq!(analysis.stress_indicator, 0.6);
    }

    #[test]
    fn test_temporal_late_night_ratio_is_strict() {
        // Exactly 30% late night does not trigger
        let mut timeline = vec![at_hour(2), at_hour(3), at_hour(4)];
        timeline.extend((0..7).map(|_| at_hour(15)));
        let analysis = analyze_temporal(&timeline);
        assert_eq!(analysis.pattern, TemporalPattern::Normal);
    }

    #[test]
    fn test_full_analysis() {
        let profile = BehavioralProfile {
            emoji_counts: counts(&[(EmojiBucket::Anxious, 6), (EmojiBucket::Sad, 2)]),
            posting_frequency: 4.0,
            posts_timeline: vec![at_hour(1), at_hour(3)],
        };
        let analysis = BehavioralPatternAnalyzer.analyze(&profile);

        // 1.0 * 0.4 + 0.9 * 0.3 + 0.8 * 0.3
        assert!((analysis.behavioral_score - 0.91).abs() < 1e-9);
        assert_eq!(analysis.confidence, 0.6);
        assert_eq!(
            analysis.insights,
            vec![
                "Emoji usage suggests anxious emotional state".to_string(),
                "High posting frequency may indicate stress or crisis".to_string(),
                "Late night posting patterns suggest sleep disturbances".to_string(),
            ]
        );

        let assessment = analysis.to_assessment();
        assert_eq!(assessment.modality, Modality::Behavioral);
        assert_eq!(assessment.emotion, EmotionTag::Anxious);
    }

    #[test]
    fn test_confidence_tiers() {
        assert_eq!(compute_confidence(0), 0.2);
        assert_eq!(compute_confidence(5), 0.4);
        assert_eq!(compute_confidence(6), 0.6);
        assert_eq!(compute_confidence(10), 0.6);
        assert_eq!(compute_confidence(11), 0.8);
    }

    #[test]
    fn test_empty_profile_is_all_neutral() {
        let analysis = BehavioralPatternAnalyzer.analyze(&BehavioralProfile::default());
        // 0.5 * 0.4 + 0.3 * 0.3 + 0.5 * 0.3
        assert!((analysis.behavioral_score - 0.44).abs() < 1e-9);
        assert_eq!(analysis.confidence, 0.2);
        assert_eq!(
            analysis.insights,
            vec!["Low posting frequency might indicate social withdrawal".to_string()]
        );
    }
}
