pub mod case;
pub mod due_set;
pub mod progress;
pub mod quiz_attempt;
pub mod review_state;
pub mod sm2;

pub use case::{Case, CaseFilter, CaseSummary};
pub use due_set::{DueCase, DueSet};
pub use progress::{
    DailyActivity, DifficultyStats, MissedCase, OverallStats, ProgressSummary, QuizStats,
};
pub use quiz_attempt::{AttemptRequest, QuizAttempt};
pub use review_state::{LearningStage, ReviewState};
pub use sm2::Grade;
