//! SM-2 (SuperMemo 2) spaced repetition scheduling.
//!
//! - Each case has an ease factor (EF) that is adjusted after every review
//! - Grades 0-2: reset repetitions, review again tomorrow
//! - Grades 3-5: grow the interval (1 day → 6 days → previous interval × EF)
//! - EF never falls below 1.3
//! - Intervals are capped at [`MAX_INTERVAL_DAYS`]
//!
//! Quiz answers are only right or wrong, so callers go through
//! [`update_schedule`], which maps a pass to grade 4 and a fail to grade 1.

use super::review_state::{INITIAL_EASE_FACTOR, MAX_INTERVAL_DAYS, MIN_EASE_FACTOR, ReviewState};
use chrono::{DateTime, Days, NaiveDate, Utc};

/// Recall quality on the 0-5 SM-2 scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Grade(u8);

impl Grade {
    pub const PASS: Grade = Grade(4);
    pub const FAIL: Grade = Grade(1);

    /// Values above 5 are clamped.
    pub fn new(quality: u8) -> Self {
        Grade(quality.min(5))
    }

    pub fn from_outcome(correct: bool) -> Self {
        if correct { Grade::PASS } else { Grade::FAIL }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_recall(self) -> bool {
        self.0 >= 3
    }
}

/// Computes the state that follows `prior` after one review graded `grade`.
/// A missing prior state starts from EF 2.5, interval 1, repetitions 0.
pub fn calculate_next_review(
    prior: Option<&ReviewState>,
    grade: Grade,
    now: DateTime<Utc>,
) -> ReviewState {
    let (ease_factor, interval_days, repetitions) = match prior {
        Some(state) => (state.ease_factor, state.interval_days, state.repetitions),
        None => (INITIAL_EASE_FACTOR, 1, 0),
    };

    let (new_interval, new_repetitions) = if grade.is_recall() {
        let interval = match repetitions {
            0 => 1,
            1 => 6,
            _ => (interval_days as f64 * ease_factor)
                .round()
                .min(MAX_INTERVAL_DAYS as f64) as i32,
        };
        (interval, repetitions + 1)
    } else {
        (1, 0)
    };

    // EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))
    let miss = 5.0 - grade.value() as f64;
    let new_ef = (ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASE_FACTOR);

    ReviewState {
        ease_factor: new_ef,
        interval_days: new_interval,
        repetitions: new_repetitions,
        next_review_date: now
            .date_naive()
            .checked_add_days(Days::new(new_interval as u64))
            .unwrap_or(NaiveDate::MAX),
        last_reviewed_at: now,
    }
}

/// Schedules the next review from a pass/fail quiz outcome.
pub fn update_schedule(
    prior: Option<&ReviewState>,
    correct: bool,
    now: DateTime<Utc>,
) -> ReviewState {
    calculate_next_review(prior, Grade::from_outcome(correct), now)
}
