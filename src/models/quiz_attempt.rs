//! Quiz attempts: the request that arrives from a quiz and the log record it becomes.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An attempt as submitted by a caller, before validation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AttemptRequest {
    pub case_id: Option<String>,
    pub correct: bool,
    pub time_spent_ms: Option<i64>,
    pub learner_id: Option<String>,
}

/// An immutable attempt log entry. `id` is assigned by the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: Option<i64>,
    pub case_id: String,
    pub learner_id: Option<String>,
    pub correct: bool,
    pub time_spent_ms: Option<i64>,
    pub attempted_at: DateTime<Utc>,
}
