//! Reporting views over the attempt log and review states.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How many recent active days a progress summary lists.
pub const ACTIVITY_DAYS: usize = 30;
/// How many most-missed cases quiz statistics list.
pub const RECENT_MISSES: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub day: NaiveDate,
    pub attempts: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub total_attempts: u32,
    pub correct_count: u32,
    /// Percent correct, rounded. Zero when there are no attempts.
    pub accuracy: u32,
    pub unique_cases: u32,
    pub mastered_cases: u32,
    pub learning_cases: u32,
    /// Newest first.
    pub activity: Vec<DailyActivity>,
}

impl ProgressSummary {
    pub fn accuracy_percent(correct: u32, total: u32) -> u32 {
        if total == 0 {
            0
        } else {
            (correct as f64 / total as f64 * 100.0).round() as u32
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub total_attempts: u32,
    pub correct_count: u32,
    pub avg_time_ms: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyStats {
    pub difficulty: u8,
    pub attempts: u32,
    pub correct: u32,
    pub avg_time_ms: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissedCase {
    pub id: String,
    pub title: String,
    pub diagnosis: Option<String>,
    pub difficulty: u8,
    pub miss_count: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizStats {
    pub overall: OverallStats,
    pub by_difficulty: Vec<DifficultyStats>,
    pub recent_misses: Vec<MissedCase>,
    /// True when restricted to one learner's attempts.
    pub is_personal: bool,
}
