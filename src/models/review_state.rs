use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const INITIAL_EASE_FACTOR: f64 = 2.5;
pub const MIN_EASE_FACTOR: f64 = 1.3;
/// Upper bound on a scheduled interval, roughly one hundred years.
pub const MAX_INTERVAL_DAYS: i32 = 36_500;

/// Repetitions at which a case leaves the short-interval phase.
pub const REVIEWING_REPETITIONS: i32 = 3;
/// Interval a reviewing case must reach to be reported as mastered.
pub const MASTERED_INTERVAL_DAYS: i32 = 21;

/// Spaced repetition state of one case for one learner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub ease_factor: f64,
    pub interval_days: i32,
    pub repetitions: i32,
    pub next_review_date: NaiveDate,
    pub last_reviewed_at: DateTime<Utc>,
}

/// Reporting label derived from a stored state. A case with no state is new.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningStage {
    Learning,
    Reviewing,
}

impl ReviewState {
    pub fn stage(&self) -> LearningStage {
        if self.repetitions >= REVIEWING_REPETITIONS {
            LearningStage::Reviewing
        } else {
            LearningStage::Learning
        }
    }

    pub fn is_mastered(&self) -> bool {
        self.repetitions >= REVIEWING_REPETITIONS && self.interval_days >= MASTERED_INTERVAL_DAYS
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review_date <= today
    }
}
