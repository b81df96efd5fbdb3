//! Storage collaborators for the review core.
//!
//! [`ReviewStore`] is the interface the scheduler and selector are written
//! against. [`db::SqliteStore`] is the persistent implementation and
//! [`memory::MemoryStore`] keeps everything in process.

pub mod db;
pub mod memory;
pub mod seed;

use crate::error::Result;
use crate::models::{CaseSummary, DueCase, QuizAttempt, ReviewState};
use chrono::NaiveDate;

pub use db::SqliteStore;
pub use memory::MemoryStore;

pub trait ReviewStore {
    fn case_exists(&self, case_id: &str) -> Result<bool>;

    /// `None` means the learner has never attempted the case.
    fn get_review_state(&self, learner_id: &str, case_id: &str) -> Result<Option<ReviewState>>;

    /// Replaces any existing state for the pair.
    fn upsert_review_state(
        &mut self,
        learner_id: &str,
        case_id: &str,
        state: &ReviewState,
    ) -> Result<()>;

    /// States with `next_review_date <= today`, oldest date first, at most `limit`.
    fn list_due_review_states(
        &self,
        learner_id: &str,
        today: NaiveDate,
        limit: usize,
    ) -> Result<Vec<DueCase>>;

    /// Up to `limit` uniformly sampled cases the learner has no state for.
    fn list_unattempted_cases(&self, learner_id: &str, limit: usize) -> Result<Vec<CaseSummary>>;

    /// Appends to the attempt log and returns the assigned id.
    fn append_attempt(&mut self, attempt: &QuizAttempt) -> Result<i64>;

    /// Records an attempt and, for identified learners, its new state as one unit.
    fn commit_attempt(
        &mut self,
        attempt: &QuizAttempt,
        state: Option<&ReviewState>,
    ) -> Result<i64> {
        let id = self.append_attempt(attempt)?;
        if let (Some(learner_id), Some(state)) = (attempt.learner_id.as_deref(), state) {
            self.upsert_review_state(learner_id, &attempt.case_id, state)?;
        }
        Ok(id)
    }
}
