//! Emoji extraction from free text

use crate::behavior::types::{EmojiBucket, EmojiCounts};

/// Emoji per bucket. An emoji may appear in more than one bucket.
const EMOJI_TABLE: &[(EmojiBucket, &[&str])] = &[
    (
        EmojiBucket::Happy,
        &["😊", "😄", "😁", "🥰", "😍", "🤗", "😘", "🙂", "😃", "😆", "🤩", "😇"],
    ),
    (
        EmojiBucket::Sad,
        &["😢", "😭", "😔", "😞", "😟", "😕", "😰", "😨", "💔", "😿", "😥", "😪"],
    ),
    (
        EmojiBucket::Anxious,
        &[
            "😰", "😨", "😱", "😳", "😬", "😓", "😵", "🤯", "😵\u{200d}💫", "😮\u{200d}💨", "😖", "😣",
        ],
    ),
    (
        EmojiBucket::Angry,
        &["😠", "😡", "🤬", "😤", "😾", "👿", "💢", "🔥", "😈", "👹"],
    ),
    (
        EmojiBucket::Neutral,
        &["😐", "😑", "😶", "🤔", "😏", "🙃", "😒", "😴", "🤨", "🧐"],
    ),
    (
        EmojiBucket::Excited,
        &["🤩", "😆", "😃", "🎉", "🎊", "✨", "🌟", "💫", "🚀", "⚡"],
    ),
];

/// Longest table entry matching at the start of `rest`
fn longest_match(rest: &str) -> Option<&'static str> {
    EMOJI_TABLE
        .iter()
        .flat_map(|(_, emoji)| emoji.iter().copied())
        .filter(|e| rest.starts_with(e))
        .max_by_key(|e| e.len())
}

/// Count emoji in `text` per bucket.
///
/// ZWJ sequences are matched as a whole before their leading code point.
/// Only buckets with at least one hit appear in the result.
pub fn count_emoji(text: &str) -> EmojiCounts {
    let mut counts = EmojiCounts::new();
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        match longest_match(rest) {
            Some(emoji) => {
                for (bucket, entries) in EMOJI_TABLE {
                    if entries.contains(&emoji) {
                        *counts.entry(*bucket).or_insert(0) += 1;
                    }
                }
                rest = &rest[emoji.len()..];
            }
            None => rest = &rest[c.len_utf8()..],
        }
    }

    counts
}
