pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod review;

pub use database::{MemoryStore, ReviewStore, SqliteStore};
pub use error::{Result, ReviewError};
pub use models::{Case, DueSet, ReviewState};
pub use review::{RecordedAttempt, record_attempt, select_due_cases};
