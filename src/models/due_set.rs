//! Result of a review-session request: scheduled reviews plus fresh material.
use super::case::CaseSummary;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DUE_LIMIT: usize = 10;

/// A case whose review date has arrived, with its current schedule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueCase {
    #[serde(flatten)]
    pub case: CaseSummary,
    pub next_review_date: NaiveDate,
    pub repetitions: i32,
    pub interval_days: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueSet {
    /// Most overdue first.
    pub due: Vec<DueCase>,
    /// Never-attempted cases in random order.
    pub new: Vec<CaseSummary>,
}

impl DueSet {
    pub fn total_due(&self) -> usize {
        self.due.len()
    }

    pub fn total_new(&self) -> usize {
        self.new.len()
    }

    pub fn is_empty(&self) -> bool {
        self.due.is_empty() && self.new.is_empty()
    }

    /// Case ids in presentation order: due first, then new.
    pub fn case_ids(&self) -> Vec<&str> {
        self.due
            .iter()
            .map(|d| d.case.id.as_str())
            .chain(self.new.iter().map(|c| c.id.as_str()))
            .collect()
    }
}
