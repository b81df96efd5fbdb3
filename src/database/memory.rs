//! In-process [`ReviewStore`] backed by plain maps.

use super::ReviewStore;
use crate::error::{Result, ReviewError};
use crate::models::{Case, CaseFilter, CaseSummary, DueCase, QuizAttempt, ReviewState};
use chrono::NaiveDate;
use rand::seq::{IteratorRandom, SliceRandom};
use std::collections::{BTreeMap, HashMap};

#[derive(Default)]
pub struct MemoryStore {
    cases: BTreeMap<String, Case>,
    states: HashMap<(String, String), ReviewState>,
    attempts: Vec<QuizAttempt>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cases(cases: impl IntoIterator<Item = Case>) -> Self {
        let mut store = Self::new();
        for case in cases {
            store.cases.insert(case.id.clone(), case);
        }
        store
    }

    pub fn insert_case(&mut self, case: Case) -> Result<()> {
        case.validate()?;
        self.cases.insert(case.id.clone(), case);
        Ok(())
    }

    /// Removes a case and everything recorded against it.
    pub fn delete_case(&mut self, case_id: &str) -> bool {
        self.states.retain(|(_, c), _| c != case_id);
        self.attempts.retain(|a| a.case_id != case_id);
        self.cases.remove(case_id).is_some()
    }

    pub fn attempts(&self) -> &[QuizAttempt] {
        &self.attempts
    }

    /// A uniformly chosen case matching `filter`, if any.
    pub fn random_case(&self, filter: &CaseFilter) -> Option<Case> {
        self.cases
            .values()
            .filter(|case| filter.matches(case))
            .choose(&mut rand::thread_rng())
            .cloned()
    }
}

impl ReviewStore for MemoryStore {
    fn case_exists(&self, case_id: &str) -> Result<bool> {
        Ok(self.cases.contains_key(case_id))
    }

    fn get_review_state(&self, learner_id: &str, case_id: &str) -> Result<Option<ReviewState>> {
        Ok(self
            .states
            .get(&(learner_id.to_string(), case_id.to_string()))
            .cloned())
    }

    fn upsert_review_state(
        &mut self,
        learner_id: &str,
        case_id: &str,
        state: &ReviewState,
    ) -> Result<()> {
        if !self.cases.contains_key(case_id) {
            return Err(ReviewError::NotFound(format!("Case {case_id}")));
        }
        self.states
            .insert((learner_id.to_string(), case_id.to_string()), state.clone());
        Ok(())
    }

    fn list_due_review_states(
        &self,
        learner_id: &str,
        today: NaiveDate,
        limit: usize,
    ) -> Result<Vec<DueCase>> {
        let mut due: Vec<(&ReviewState, &Case)> = self
            .states
            .iter()
            .filter(|((learner, _), state)| learner == learner_id && state.is_due(today))
            .filter_map(|((_, case_id), state)| self.cases.get(case_id).map(|case| (state, case)))
            .collect();
        due.sort_by(|(a, _), (b, _)| {
            a.next_review_date
                .cmp(&b.next_review_date)
                .then(a.last_reviewed_at.cmp(&b.last_reviewed_at))
        });

        Ok(due
            .into_iter()
            .take(limit)
            .map(|(state, case)| DueCase {
                case: case.summary(),
                next_review_date: state.next_review_date,
                repetitions: state.repetitions,
                interval_days: state.interval_days,
            })
            .collect())
    }

    fn list_unattempted_cases(&self, learner_id: &str, limit: usize) -> Result<Vec<CaseSummary>> {
        let mut rng = rand::thread_rng();
        let mut sample = self
            .cases
            .values()
            .filter(|case| {
                !self
                    .states
                    .contains_key(&(learner_id.to_string(), case.id.clone()))
            })
            .choose_multiple(&mut rng, limit);
        // choose_multiple does not randomise order.
        sample.shuffle(&mut rng);
        Ok(sample.into_iter().map(Case::summary).collect())
    }

    fn append_attempt(&mut self, attempt: &QuizAttempt) -> Result<i64> {
        if !self.cases.contains_key(&attempt.case_id) {
            return Err(ReviewError::NotFound(format!("Case {}", attempt.case_id)));
        }
        let id = self.attempts.len() as i64 + 1;
        self.attempts.push(QuizAttempt {
            id: Some(id),
            ..attempt.clone()
        });
        Ok(id)
    }
}
