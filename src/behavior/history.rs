//! Per-user rolling assessment history
//!
//! Each user keeps the last N assessments. The history doubles as the source
//! of a behavioral profile when a request carries none, and counts high-stress
//! outcomes so repeated ones can be escalated.

use crate::behavior::types::{BehavioralProfile, EmojiCounts};
use crate::config::DEFAULT_HISTORY_WINDOW;
use crate::types::{AssessmentReport, EmotionTag, StressCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// High-stress outcomes at which the alert becomes critical
pub const CRITICAL_ALERT_THRESHOLD: u32 = 3;

/// Entries averaged for the recent confidence figure
const RECENT_CONFIDENCE_WINDOW: usize = 10;

/// One recorded assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub emotion: EmotionTag,
    pub final_category: StressCategory,
    pub risk_score: u8,
    pub confidence: f64,
    /// Emoji found in the post this assessment was made for
    #[serde(default)]
    pub emoji_counts: EmojiCounts,
}

impl HistoryEntry {
    pub fn from_report(
        report: &AssessmentReport,
        timestamp: DateTime<Utc>,
        emoji_counts: EmojiCounts,
    ) -> Self {
        Self {
            timestamp,
            emotion: report.primary_emotion,
            final_category: report.final_category,
            risk_score: report.risk.risk_score,
            confidence: report.fusion.confidence,
            emoji_counts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    High,
    Critical,
}

/// Rolling history for a single user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StoredHistory")]
pub struct UserHistory {
    entries: VecDeque<HistoryEntry>,
    window_size: usize,
    /// High-stress outcomes since the last resolve
    high_stress_alerts: u32,
}

/// Persisted form, replayed through the window on load
#[derive(Deserialize)]
struct StoredHistory {
    #[serde(default)]
    entries: Vec<HistoryEntry>,
    #[serde(default = "default_window")]
    window_size: usize,
    #[serde(default)]
    high_stress_alerts: u32,
}

fn default_window() -> usize {
    DEFAULT_HISTORY_WINDOW
}

impl From<StoredHistory> for UserHistory {
    fn from(stored: StoredHistory) -> Self {
        let mut history = UserHistory::new(stored.window_size);
        for entry in stored.entries {
            history.push_entry(entry);
        }
        history.high_stress_alerts = stored.high_stress_alerts;
        history
    }
}

impl Default for UserHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}

impl UserHistory {
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            entries: VecDeque::with_capacity(window_size),
            window_size,
            high_stress_alerts: 0,
        }
    }

    /// Append an entry, evicting the oldest beyond the window
    pub fn record(&mut self, entry: HistoryEntry) {
        if entry.final_category == StressCategory::High {
            self.high_stress_alerts = self.high_stress_alerts.saturating_add(1);
        }
        self.push_entry(entry);
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.window_size {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn high_stress_alerts(&self) -> u32 {
        self.high_stress_alerts
    }

    /// `None` without alerts, `Critical` from the third high-stress outcome on
    pub fn alert_severity(&self) -> Option<AlertSeverity> {
        match self.high_stress_alerts {
            0 => None,
            n if n >= CRITICAL_ALERT_THRESHOLD => Some(AlertSeverity::Critical),
            _ => Some(AlertSeverity::High),
        }
    }

    pub fn resolve_alerts(&mut self) {
        self.high_stress_alerts = 0;
    }

    /// Mean confidence of the most recent entries
    pub fn average_confidence(&self) -> Option<f64> {
        let recent: Vec<f64> = self
            .entries
            .iter()
            .rev()
            .take(RECENT_CONFIDENCE_WINDOW)
            .map(|e| e.confidence)
            .collect();
        if recent.is_empty() {
            return None;
        }
        Some(recent.iter().sum::<f64>() / recent.len() as f64)
    }

    /// Behavioral profile implied by the recorded posts.
    ///
    /// Emoji counts are summed, the timeline is the entry timestamps, and the
    /// posting frequency is entries per day over the covered span (at least
    /// one day). `None` when nothing has been recorded.
    pub fn to_profile(&self) -> Option<BehavioralProfile> {
        let first = self.entries.front()?.timestamp;
        let last = self.entries.back()?.timestamp;

        let mut emoji_counts = EmojiCounts::new();
        for entry in &self.entries {
            for (bucket, count) in &entry.emoji_counts {
                let sum = emoji_counts.entry(*bucket).or_insert(0);
                *sum = sum.saturating_add(*count);
            }
        }

        let span_days = ((last - first).num_seconds() as f64 / 86_400.0).max(1.0);

        Some(BehavioralProfile {
            emoji_counts,
            posting_frequency: self.entries.len() as f64 / span_days,
            posts_timeline: self.entries.iter().map(|e| e.timestamp).collect(),
        })
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.high_stress_alerts = 0;
    }

    /// Load history from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize history to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Shared handle to one user's history
pub type SharedUserHistory = Arc<tokio::sync::Mutex<UserHistory>>;

/// Histories for all users.
///
/// The map lock is only held to look up or insert a handle. Work on a single
/// user's history happens under that user's own async lock, so requests for
/// the same user run one after another while different users never wait on
/// each other.
///
/// The user map is unbounded: every distinct user id keeps its entry until
/// [`HistoryRegistry::remove`] is called. Long-running hosts are expected to
/// remove users they no longer serve.
#[derive(Debug)]
pub struct HistoryRegistry {
    users: Mutex<HashMap<String, SharedUserHistory>>,
    window_size: usize,
}

impl Default for HistoryRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}

impl HistoryRegistry {
    pub fn new(window_size: usize) -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            window_size,
        }
    }

    /// Handle for `user_id`, created empty on first use
    pub fn user(&self, user_id: &str) -> SharedUserHistory {
        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        users
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(UserHistory::new(self.window_size))))
            .clone()
    }

    /// Replace a user's history, e.g. after loading it from storage
    pub fn insert(&self, user_id: &str, history: UserHistory) {
        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        users.insert(
            user_id.to_string(),
            Arc::new(tokio::sync::Mutex::new(history)),
        );
    }

    pub fn remove(&self, user_id: &str) -> Option<SharedUserHistory> {
        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        users.remove(user_id)
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
