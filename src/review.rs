//! The two operations the quiz front end calls: recording an attempt and
//! fetching the cases a learner should review next.

use crate::database::ReviewStore;
use crate::error::{Result, ReviewError};
use crate::models::sm2::update_schedule;
use crate::models::{AttemptRequest, DueSet, QuizAttempt, ReviewState};
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};

/// Outcome of [`record_attempt`].
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedAttempt {
    pub attempt_id: i64,
    /// The learner's new schedule for the case. `None` for anonymous attempts.
    pub state: Option<ReviewState>,
}

/// Logs a quiz attempt and, when the learner is known, reschedules the case.
///
/// Nothing is written if the case id is missing or unknown.
pub fn record_attempt<S: ReviewStore>(
    store: &mut S,
    request: &AttemptRequest,
    now: DateTime<Utc>,
) -> Result<RecordedAttempt> {
    let case_id = request
        .case_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ReviewError::Validation("case_id is required".to_string()))?;

    if !store.case_exists(case_id)? {
        return Err(ReviewError::NotFound(format!("Case {case_id}")));
    }

    let learner_id = request
        .learner_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    let state = match learner_id {
        Some(learner_id) => {
            let prior = store.get_review_state(learner_id, case_id)?;
            Some(update_schedule(prior.as_ref(), request.correct, now))
        }
        None => None,
    };

    let attempt = QuizAttempt {
        id: None,
        case_id: case_id.to_string(),
        learner_id: learner_id.map(str::to_string),
        correct: request.correct,
        time_spent_ms: request.time_spent_ms,
        attempted_at: now,
    };
    let attempt_id = store.commit_attempt(&attempt, state.as_ref())?;

    match (&attempt.learner_id, &state) {
        (Some(learner_id), Some(state)) => info!(
            "Recorded attempt {attempt_id} on case {case_id} for {learner_id}: correct={}, \
             next review {} (interval {}d, repetitions {}, ease {:.2})",
            request.correct,
            state.next_review_date,
            state.interval_days,
            state.repetitions,
            state.ease_factor
        ),
        _ => info!(
            "Recorded anonymous attempt {attempt_id} on case {case_id}: correct={}",
            request.correct
        ),
    }

    Ok(RecordedAttempt { attempt_id, state })
}

/// Builds a review batch of at most `requested` cases: due reviews first,
/// topped up with never-attempted cases.
pub fn select_due_cases<S: ReviewStore>(
    store: &S,
    learner_id: Option<&str>,
    requested: usize,
    today: NaiveDate,
) -> Result<DueSet> {
    let learner_id = learner_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(ReviewError::Unauthenticated)?;

    if requested == 0 {
        return Ok(DueSet::default());
    }

    let due = store.list_due_review_states(learner_id, today, requested)?;
    let remaining = requested.saturating_sub(due.len());
    let new = if remaining > 0 {
        store.list_unattempted_cases(learner_id, remaining)?
    } else {
        Vec::new()
    };

    debug!(
        "Review batch for {learner_id}: {} due, {} new (requested {requested})",
        due.len(),
        new.len()
    );
    Ok(DueSet { due, new })
}
