//! A teaching case. The review core only needs its id; the remaining fields
//! are descriptive metadata shown alongside due and new cases.
use crate::error::{Result, ReviewError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_DIFFICULTY: u8 = 2;
pub const MAX_DIFFICULTY: u8 = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: String,
    pub title: String,
    pub modality: Option<String>,
    pub body_part: Option<String>,
    pub diagnosis: Option<String>,
    pub difficulty: u8,
    pub clinical_history: Option<String>,
    pub teaching_points: Option<String>,
    pub findings: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Case {
    /// Creates a case with a fresh UUID and default difficulty.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            modality: None,
            body_part: None,
            diagnosis: None,
            difficulty: DEFAULT_DIFFICULTY,
            clinical_history: None,
            teaching_points: None,
            findings: None,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ReviewError::Validation("title is required".to_string()));
        }
        if !(1..=MAX_DIFFICULTY).contains(&self.difficulty) {
            return Err(ReviewError::Validation(format!(
                "difficulty must be between 1 and {MAX_DIFFICULTY}"
            )));
        }
        Ok(())
    }

    pub fn summary(&self) -> CaseSummary {
        CaseSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            modality: self.modality.clone(),
            body_part: self.body_part.clone(),
            diagnosis: self.diagnosis.clone(),
            difficulty: self.difficulty,
        }
    }
}

/// The summary fields returned with due and new cases.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub id: String,
    pub title: String,
    pub modality: Option<String>,
    pub body_part: Option<String>,
    pub diagnosis: Option<String>,
    pub difficulty: u8,
}

/// Optional criteria for picking a quiz case. Empty fields match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaseFilter {
    pub modality: Option<String>,
    pub body_part: Option<String>,
    pub difficulty: Option<u8>,
}

impl CaseFilter {
    pub fn matches(&self, case: &Case) -> bool {
        self.modality
            .as_deref()
            .is_none_or(|m| case.modality.as_deref() == Some(m))
            && self
                .body_part
                .as_deref()
                .is_none_or(|b| case.body_part.as_deref() == Some(b))
            && self.difficulty.is_none_or(|d| case.difficulty == d)
    }
}
