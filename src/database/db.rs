//! SQLite storage for the case catalog, the attempt log and review states
//!
//! Creates the schema on open, implements [`ReviewStore`] for the scheduler and
//! selector, and answers the reporting queries behind quiz statistics and
//! learner progress.

use super::ReviewStore;
use crate::error::{Result, ReviewError};
use crate::models::progress::{ACTIVITY_DAYS, RECENT_MISSES};
use crate::models::review_state::{MASTERED_INTERVAL_DAYS, REVIEWING_REPETITIONS};
use crate::models::{
    Case, CaseFilter, CaseSummary, DailyActivity, DifficultyStats, DueCase, MissedCase,
    OverallStats, ProgressSummary, QuizAttempt, QuizStats, ReviewState,
};
use chrono::NaiveDate;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::path::Path;

const SCHEMA: &str = r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS cases (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        modality TEXT,
        body_part TEXT,
        diagnosis TEXT,
        difficulty INTEGER NOT NULL DEFAULT 2,
        clinical_history TEXT,
        teaching_points TEXT,
        findings TEXT,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS quiz_attempts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        case_id TEXT NOT NULL,
        learner_id TEXT,
        correct INTEGER NOT NULL,
        time_spent_ms INTEGER,
        attempted_at TEXT NOT NULL,
        FOREIGN KEY (case_id) REFERENCES cases(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS review_states (
        learner_id TEXT NOT NULL,
        case_id TEXT NOT NULL,
        ease_factor REAL NOT NULL DEFAULT 2.5,
        interval_days INTEGER NOT NULL DEFAULT 1,
        repetitions INTEGER NOT NULL DEFAULT 0,
        next_review_date TEXT NOT NULL,
        last_reviewed_at TEXT NOT NULL,
        PRIMARY KEY (learner_id, case_id),
        FOREIGN KEY (case_id) REFERENCES cases(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_cases_modality ON cases(modality);
    CREATE INDEX IF NOT EXISTS idx_cases_body_part ON cases(body_part);
    CREATE INDEX IF NOT EXISTS idx_attempts_learner ON quiz_attempts(learner_id);
    CREATE INDEX IF NOT EXISTS idx_review_due ON review_states(learner_id, next_review_date);
"#;

const SUMMARY_COLUMNS: &str = "c.id, c.title, c.modality, c.body_part, c.diagnosis, c.difficulty";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database file and makes sure every table exists.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init()?;
        debug!("Opened review database at {}", path.display());
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // Case catalog

    pub fn insert_case(&self, case: &Case) -> Result<()> {
        case.validate()?;
        self.conn.execute(
            "INSERT INTO cases (id, title, modality, body_part, diagnosis, difficulty,
                                clinical_history, teaching_points, findings, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                case.id,
                case.title,
                case.modality,
                case.body_part,
                case.diagnosis,
                case.difficulty,
                case.clinical_history,
                case.teaching_points,
                case.findings,
                case.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_case(&self, case_id: &str) -> Result<Option<Case>> {
        let case = self
            .conn
            .query_row("SELECT * FROM cases WHERE id = ?1", params![case_id], parse_case_row)
            .optional()?;
        Ok(case)
    }

    /// All cases, newest first.
    pub fn list_cases(&self) -> Result<Vec<Case>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM cases ORDER BY created_at DESC, title")?;
        let cases = stmt
            .query_map([], parse_case_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cases)
    }

    /// Deletes a case together with its attempts and review states.
    /// Returns false if there was no such case.
    pub fn delete_case(&self, case_id: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM cases WHERE id = ?1", params![case_id])?;
        Ok(deleted > 0)
    }

    pub fn case_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM cases", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Picks one case at random among those matching the filter.
    pub fn random_case(&self, filter: &CaseFilter) -> Result<Option<Case>> {
        let mut conditions = Vec::new();
        let mut values = Vec::new();

        if let Some(modality) = &filter.modality {
            values.push(Value::Text(modality.clone()));
            conditions.push(format!("modality = ?{}", values.len()));
        }
        if let Some(body_part) = &filter.body_part {
            values.push(Value::Text(body_part.clone()));
            conditions.push(format!("body_part = ?{}", values.len()));
        }
        if let Some(difficulty) = filter.difficulty {
            values.push(Value::Integer(difficulty as i64));
            conditions.push(format!("difficulty = ?{}", values.len()));
        }

        let mut sql = String::from("SELECT * FROM cases");
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY RANDOM() LIMIT 1");

        let case = self
            .conn
            .query_row(&sql, params_from_iter(values), parse_case_row)
            .optional()?;
        Ok(case)
    }

    pub fn list_attempts(&self, case_id: &str) -> Result<Vec<QuizAttempt>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, case_id, learner_id, correct, time_spent_ms, attempted_at
             FROM quiz_attempts WHERE case_id = ?1 ORDER BY id",
        )?;
        let attempts = stmt
            .query_map(params![case_id], |row| {
                Ok(QuizAttempt {
                    id: row.get(0)?,
                    case_id: row.get(1)?,
                    learner_id: row.get(2)?,
                    correct: row.get(3)?,
                    time_spent_ms: row.get(4)?,
                    attempted_at: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(attempts)
    }

    // Reporting

    /// Attempt statistics, for one learner or for everyone.
    pub fn quiz_stats(&self, learner_id: Option<&str>) -> Result<QuizStats> {
        let learner_filter = if learner_id.is_some() {
            "WHERE qa.learner_id = ?1"
        } else {
            ""
        };

        let overall = self.conn.query_row(
            &format!(
                "SELECT COUNT(*), SUM(qa.correct), AVG(qa.time_spent_ms)
                 FROM quiz_attempts qa {learner_filter}"
            ),
            params_from_iter(learner_id.iter()),
            |row| {
                Ok(OverallStats {
                    total_attempts: row.get(0)?,
                    correct_count: row.get::<_, Option<u32>>(1)?.unwrap_or(0),
                    avg_time_ms: row.get(2)?,
                })
            },
        )?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT c.difficulty, COUNT(*), SUM(qa.correct), AVG(qa.time_spent_ms)
             FROM quiz_attempts qa
             JOIN cases c ON qa.case_id = c.id
             {learner_filter}
             GROUP BY c.difficulty
             ORDER BY c.difficulty"
        ))?;
        let by_difficulty = stmt
            .query_map(params_from_iter(learner_id.iter()), |row| {
                Ok(DifficultyStats {
                    difficulty: row.get(0)?,
                    attempts: row.get(1)?,
                    correct: row.get::<_, Option<u32>>(2)?.unwrap_or(0),
                    avg_time_ms: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let learner_and = if learner_id.is_some() {
            "AND qa.learner_id = ?1"
        } else {
            ""
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT c.id, c.title, c.diagnosis, c.difficulty, COUNT(*) AS miss_count,
                    MAX(qa.attempted_at) AS last_miss
             FROM quiz_attempts qa
             JOIN cases c ON qa.case_id = c.id
             WHERE qa.correct = 0 {learner_and}
             GROUP BY c.id
             ORDER BY miss_count DESC, last_miss DESC
             LIMIT {RECENT_MISSES}"
        ))?;
        let recent_misses = stmt
            .query_map(params_from_iter(learner_id.iter()), |row| {
                Ok(MissedCase {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    diagnosis: row.get(2)?,
                    difficulty: row.get(3)?,
                    miss_count: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(QuizStats {
            overall,
            by_difficulty,
            recent_misses,
            is_personal: learner_id.is_some(),
        })
    }

    /// Attempt totals, mastery counts and daily activity for one learner.
    pub fn progress_summary(&self, learner_id: &str) -> Result<ProgressSummary> {
        let (total_attempts, correct_count, unique_cases): (u32, Option<u32>, u32) =
            self.conn.query_row(
                "SELECT COUNT(*), SUM(correct), COUNT(DISTINCT case_id)
                 FROM quiz_attempts WHERE learner_id = ?1",
                params![learner_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;
        let correct_count = correct_count.unwrap_or(0);

        let mut stmt = self.conn.prepare(&format!(
            "SELECT substr(attempted_at, 1, 10) AS day, COUNT(*)
             FROM quiz_attempts
             WHERE learner_id = ?1
             GROUP BY day
             ORDER BY day DESC
             LIMIT {ACTIVITY_DAYS}"
        ))?;
        let activity = stmt
            .query_map(params![learner_id], |row| {
                Ok(DailyActivity {
                    day: row.get(0)?,
                    attempts: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mastered_cases: u32 = self.conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM review_states
                 WHERE learner_id = ?1
                   AND repetitions >= {REVIEWING_REPETITIONS}
                   AND interval_days >= {MASTERED_INTERVAL_DAYS}"
            ),
            params![learner_id],
            |row| row.get(0),
        )?;
        let learning_cases: u32 = self.conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM review_states
                 WHERE learner_id = ?1
                   AND repetitions > 0
                   AND (repetitions < {REVIEWING_REPETITIONS}
                        OR interval_days < {MASTERED_INTERVAL_DAYS})"
            ),
            params![learner_id],
            |row| row.get(0),
        )?;

        Ok(ProgressSummary {
            total_attempts,
            correct_count,
            accuracy: ProgressSummary::accuracy_percent(correct_count, total_attempts),
            unique_cases,
            mastered_cases,
            learning_cases,
            activity,
        })
    }
}

impl ReviewStore for SqliteStore {
    fn case_exists(&self, case_id: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM cases WHERE id = ?1", params![case_id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn get_review_state(&self, learner_id: &str, case_id: &str) -> Result<Option<ReviewState>> {
        let state = self
            .conn
            .query_row(
                "SELECT ease_factor, interval_days, repetitions, next_review_date, last_reviewed_at
                 FROM review_states WHERE learner_id = ?1 AND case_id = ?2",
                params![learner_id, case_id],
                |row| {
                    Ok(ReviewState {
                        ease_factor: row.get(0)?,
                        interval_days: row.get(1)?,
                        repetitions: row.get(2)?,
                        next_review_date: row.get(3)?,
                        last_reviewed_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(state)
    }

    fn upsert_review_state(
        &mut self,
        learner_id: &str,
        case_id: &str,
        state: &ReviewState,
    ) -> Result<()> {
        upsert_state(&self.conn, learner_id, case_id, state)
    }

    fn list_due_review_states(
        &self,
        learner_id: &str,
        today: NaiveDate,
        limit: usize,
    ) -> Result<Vec<DueCase>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SUMMARY_COLUMNS}, r.next_review_date, r.repetitions, r.interval_days
             FROM review_states r
             JOIN cases c ON r.case_id = c.id
             WHERE r.learner_id = ?1 AND r.next_review_date <= ?2
             ORDER BY r.next_review_date ASC, r.last_reviewed_at ASC
             LIMIT ?3"
        ))?;
        let due = stmt
            .query_map(params![learner_id, today, limit as i64], |row| {
                Ok(DueCase {
                    case: parse_summary_row(row)?,
                    next_review_date: row.get(6)?,
                    repetitions: row.get(7)?,
                    interval_days: row.get(8)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(due)
    }

    fn list_unattempted_cases(&self, learner_id: &str, limit: usize) -> Result<Vec<CaseSummary>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SUMMARY_COLUMNS}
             FROM cases c
             WHERE c.id NOT IN (SELECT case_id FROM review_states WHERE learner_id = ?1)
             ORDER BY RANDOM()
             LIMIT ?2"
        ))?;
        let cases = stmt
            .query_map(params![learner_id, limit as i64], parse_summary_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cases)
    }

    fn append_attempt(&mut self, attempt: &QuizAttempt) -> Result<i64> {
        insert_attempt(&self.conn, attempt)
    }

    fn commit_attempt(
        &mut self,
        attempt: &QuizAttempt,
        state: Option<&ReviewState>,
    ) -> Result<i64> {
        let tx = self.conn.transaction()?;
        let id = insert_attempt(&tx, attempt)?;
        if let (Some(learner_id), Some(state)) = (attempt.learner_id.as_deref(), state) {
            upsert_state(&tx, learner_id, &attempt.case_id, state)?;
        }
        tx.commit()?;
        Ok(id)
    }
}

fn insert_attempt(conn: &Connection, attempt: &QuizAttempt) -> Result<i64> {
    conn.execute(
        "INSERT INTO quiz_attempts (case_id, learner_id, correct, time_spent_ms, attempted_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            attempt.case_id,
            attempt.learner_id,
            attempt.correct,
            attempt.time_spent_ms,
            attempt.attempted_at,
        ],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            ReviewError::NotFound(format!("Case {}", attempt.case_id))
        }
        other => other.into(),
    })?;
    Ok(conn.last_insert_rowid())
}

fn upsert_state(
    conn: &Connection,
    learner_id: &str,
    case_id: &str,
    state: &ReviewState,
) -> Result<()> {
    conn.execute(
        "INSERT INTO review_states
             (learner_id, case_id, ease_factor, interval_days, repetitions,
              next_review_date, last_reviewed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(learner_id, case_id) DO UPDATE SET
             ease_factor = excluded.ease_factor,
             interval_days = excluded.interval_days,
             repetitions = excluded.repetitions,
             next_review_date = excluded.next_review_date,
             last_reviewed_at = excluded.last_reviewed_at",
        params![
            learner_id,
            case_id,
            state.ease_factor,
            state.interval_days,
            state.repetitions,
            state.next_review_date,
            state.last_reviewed_at,
        ],
    )?;
    Ok(())
}

fn parse_case_row(row: &Row) -> rusqlite::Result<Case> {
    Ok(Case {
        id: row.get("id")?,
        title: row.get("title")?,
        modality: row.get("modality")?,
        body_part: row.get("body_part")?,
        diagnosis: row.get("diagnosis")?,
        difficulty: row.get("difficulty")?,
        clinical_history: row.get("clinical_history")?,
        teaching_points: row.get("teaching_points")?,
        findings: row.get("findings")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_summary_row(row: &Row) -> rusqlite::Result<CaseSummary> {
    Ok(CaseSummary {
        id: row.get(0)?,
        title: row.get(1)?,
        modality: row.get(2)?,
        body_part: row.get(3)?,
        diagnosis: row.get(4)?,
        difficulty: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttemptRequest;
    use crate::models::review_state::MAX_INTERVAL_DAYS;
    use crate::models::sm2::update_schedule;
    use crate::review::{record_attempt, select_due_cases};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::collections::HashSet;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn today() -> NaiveDate {
        now().date_naive()
    }

    fn add_case(store: &SqliteStore, title: &str, difficulty: u8) -> Case {
        let mut case = Case::new(title);
        case.difficulty = difficulty;
        case.modality = Some("CT".to_string());
        store.insert_case(&case).unwrap();
        case
    }

    fn attempt(
        case_id: &str,
        learner_id: Option<&str>,
        correct: bool,
        at: DateTime<Utc>,
    ) -> QuizAttempt {
        QuizAttempt {
            id: None,
            case_id: case_id.to_string(),
            learner_id: learner_id.map(str::to_string),
            correct,
            time_spent_ms: Some(4000),
            attempted_at: at,
        }
    }

    fn state_due(next_review_date: NaiveDate, repetitions: i32, interval_days: i32) -> ReviewState {
        ReviewState {
            ease_factor: 2.5,
            interval_days,
            repetitions,
            next_review_date,
            last_reviewed_at: now() - Duration::days(interval_days as i64),
        }
    }

    #[test]
    fn test_case_roundtrip_and_delete() {
        let store = SqliteStore::in_memory().unwrap();
        let case = add_case(&store, "Saddle Pulmonary Embolism", 3);

        assert_eq!(store.get_case(&case.id).unwrap(), Some(case.clone()));
        assert_eq!(store.case_count().unwrap(), 1);
        assert!(store.case_exists(&case.id).unwrap());

        assert!(store.delete_case(&case.id).unwrap());
        assert!(!store.delete_case(&case.id).unwrap());
        assert!(store.get_case(&case.id).unwrap().is_none());
    }

    #[test]
    fn test_insert_case_rejects_blank_title() {
        let store = SqliteStore::in_memory().unwrap();
        let result = store.insert_case(&Case::new("  "));
        assert!(matches!(result, Err(ReviewError::Validation(_))));
        assert_eq!(store.case_count().unwrap(), 0);
    }

    #[test]
    fn test_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radcase.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            add_case(&store, "Sigmoid Volvulus", 2);
        }
        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.case_count().unwrap(), 1);
    }

    #[test]
    fn test_upsert_replaces_state() {
        let mut store = SqliteStore::in_memory().unwrap();
        let case = add_case(&store, "Pancoast Tumor", 3);

        assert!(store.get_review_state("alice", &case.id).unwrap().is_none());

        let first = update_schedule(None, true, now());
        store.upsert_review_state("alice", &case.id, &first).unwrap();
        let second = update_schedule(Some(&first), true, now());
        store.upsert_review_state("alice", &case.id, &second).unwrap();

        let stored = store.get_review_state("alice", &case.id).unwrap().unwrap();
        assert_eq!(stored.repetitions, 2);
        assert_eq!(stored.interval_days, 6);
        assert_eq!(stored.next_review_date, second.next_review_date);
        assert_eq!(stored.last_reviewed_at, now());
        assert!(store.get_review_state("bob", &case.id).unwrap().is_none());
    }

    #[test]
    fn test_due_states_ordered_and_limited() {
        let mut store = SqliteStore::in_memory().unwrap();
        let a = add_case(&store, "Acute Epidural Hematoma", 2);
        let b = add_case(&store, "Acute Subdural Hematoma", 2);
        let c = add_case(&store, "Glioblastoma Multiforme", 4);
        let future = add_case(&store, "Acute Appendicitis", 1);

        store
            .upsert_review_state("alice", &a.id, &state_due(today(), 1, 1))
            .unwrap();
        store
            .upsert_review_state("alice", &b.id, &state_due(today() - Duration::days(9), 3, 15))
            .unwrap();
        store
            .upsert_review_state("alice", &c.id, &state_due(today() - Duration::days(2), 2, 6))
            .unwrap();
        store
            .upsert_review_state("alice", &future.id, &state_due(today() + Duration::days(1), 1, 1))
            .unwrap();
        store
            .upsert_review_state("bob", &future.id, &state_due(today() - Duration::days(30), 1, 1))
            .unwrap();

        let due = store.list_due_review_states("alice", today(), 10).unwrap();
        let ids: Vec<&str> = due.iter().map(|d| d.case.id.as_str()).collect();
        assert_eq!(ids, vec![b.id.as_str(), c.id.as_str(), a.id.as_str()]);
        assert_eq!(due[0].repetitions, 3);
        assert_eq!(due[0].interval_days, 15);

        let limited = store.list_due_review_states("alice", today(), 2).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].case.id, b.id);
    }

    #[test]
    fn test_unattempted_excludes_learner_history() {
        let mut store = SqliteStore::in_memory().unwrap();
        let seen = add_case(&store, "Hip Fracture (Femoral Neck)", 1);
        let fresh: Vec<Case> = (0..4)
            .map(|i| add_case(&store, &format!("Case {i}"), 2))
            .collect();
        store
            .upsert_review_state("alice", &seen.id, &state_due(today() + Duration::days(5), 2, 6))
            .unwrap();

        let unattempted = store.list_unattempted_cases("alice", 10).unwrap();
        let ids: HashSet<String> = unattempted.into_iter().map(|c| c.id).collect();
        let expected: HashSet<String> = fresh.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, expected);

        assert_eq!(store.list_unattempted_cases("alice", 2).unwrap().len(), 2);
        assert_eq!(store.list_unattempted_cases("bob", 10).unwrap().len(), 5);
        assert!(store.list_unattempted_cases("alice", 0).unwrap().is_empty());
    }

    #[test]
    fn test_commit_attempt_writes_both() {
        let mut store = SqliteStore::in_memory().unwrap();
        let case = add_case(&store, "Miliary Tuberculosis", 3);
        let state = update_schedule(None, false, now());

        let id = store
            .commit_attempt(&attempt(&case.id, Some("alice"), false, now()), Some(&state))
            .unwrap();
        assert!(id > 0);

        let attempts = store.list_attempts(&case.id).unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].id, Some(id));
        assert_eq!(attempts[0].learner_id.as_deref(), Some("alice"));
        assert!(!attempts[0].correct);
        assert_eq!(attempts[0].attempted_at, now());
        assert_eq!(store.get_review_state("alice", &case.id).unwrap(), Some(state));
    }

    #[test]
    fn test_attempt_for_missing_case_is_not_found() {
        let mut store = SqliteStore::in_memory().unwrap();
        let result = store.commit_attempt(&attempt("missing", None, true, now()), None);
        assert!(matches!(result, Err(ReviewError::NotFound(_))));
    }

    #[test]
    fn test_delete_case_cascades() {
        let mut store = SqliteStore::in_memory().unwrap();
        let case = add_case(&store, "Sigmoid Volvulus", 2);
        let state = update_schedule(None, true, now());
        store
            .commit_attempt(&attempt(&case.id, Some("alice"), true, now()), Some(&state))
            .unwrap();

        store.delete_case(&case.id).unwrap();
        assert!(store.get_review_state("alice", &case.id).unwrap().is_none());
        assert!(store.list_attempts(&case.id).unwrap().is_empty());
    }

    #[test]
    fn test_random_case_filter() {
        let store = SqliteStore::in_memory().unwrap();
        let easy = add_case(&store, "Acute Appendicitis", 1);
        add_case(&store, "Vestibular Schwannoma", 4);

        let filter = CaseFilter {
            difficulty: Some(1),
            ..Default::default()
        };
        assert_eq!(store.random_case(&filter).unwrap().map(|c| c.id), Some(easy.id));

        let none = CaseFilter {
            modality: Some("MRI".to_string()),
            ..Default::default()
        };
        assert!(store.random_case(&none).unwrap().is_none());
        assert!(store.random_case(&CaseFilter::default()).unwrap().is_some());
    }

    #[test]
    fn test_quiz_stats() {
        let mut store = SqliteStore::in_memory().unwrap();
        let easy = add_case(&store, "Acute Appendicitis", 1);
        let hard = add_case(&store, "Glioblastoma Multiforme", 4);

        store.append_attempt(&attempt(&easy.id, Some("alice"), true, now())).unwrap();
        store.append_attempt(&attempt(&hard.id, Some("alice"), false, now())).unwrap();
        store
            .append_attempt(&attempt(&hard.id, Some("alice"), false, now() + Duration::hours(1)))
            .unwrap();
        store.append_attempt(&attempt(&easy.id, None, false, now())).unwrap();

        let all = store.quiz_stats(None).unwrap();
        assert!(!all.is_personal);
        assert_eq!(all.overall.total_attempts, 4);
        assert_eq!(all.overall.correct_count, 1);
        assert_eq!(all.overall.avg_time_ms, Some(4000.0));
        assert_eq!(all.by_difficulty.len(), 2);
        assert_eq!(all.by_difficulty[0].difficulty, 1);
        assert_eq!(all.by_difficulty[0].attempts, 2);
        assert_eq!(all.by_difficulty[0].correct, 1);
        assert_eq!(all.recent_misses[0].id, hard.id);
        assert_eq!(all.recent_misses[0].miss_count, 2);
        assert_eq!(all.recent_misses[1].id, easy.id);

        let mine = store.quiz_stats(Some("alice")).unwrap();
        assert!(mine.is_personal);
        assert_eq!(mine.overall.total_attempts, 3);
        assert_eq!(mine.recent_misses.len(), 1);

        let nobody = store.quiz_stats(Some("carol")).unwrap();
        assert_eq!(nobody.overall.total_attempts, 0);
        assert_eq!(nobody.overall.correct_count, 0);
        assert_eq!(nobody.overall.avg_time_ms, None);
        assert!(nobody.by_difficulty.is_empty());
    }

    #[test]
    fn test_progress_summary() {
        let mut store = SqliteStore::in_memory().unwrap();
        let mastered = add_case(&store, "Tension Pneumothorax", 2);
        let learning = add_case(&store, "Pancoast Tumor", 3);
        let lapsed = add_case(&store, "Sigmoid Volvulus", 2);

        let yesterday = now() - Duration::days(1);
        store.append_attempt(&attempt(&mastered.id, Some("alice"), true, yesterday)).unwrap();
        store.append_attempt(&attempt(&learning.id, Some("alice"), true, now())).unwrap();
        store.append_attempt(&attempt(&lapsed.id, Some("alice"), false, now())).unwrap();

        let in_days = |days: i64| today() + Duration::days(days);
        store
            .upsert_review_state("alice", &mastered.id, &state_due(in_days(38), 4, 38))
            .unwrap();
        store
            .upsert_review_state("alice", &learning.id, &state_due(in_days(6), 2, 6))
            .unwrap();
        store
            .upsert_review_state("alice", &lapsed.id, &state_due(in_days(1), 0, 1))
            .unwrap();

        let summary = store.progress_summary("alice").unwrap();
        assert_eq!(summary.total_attempts, 3);
        assert_eq!(summary.correct_count, 2);
        assert_eq!(summary.accuracy, 67);
        assert_eq!(summary.unique_cases, 3);
        assert_eq!(summary.mastered_cases, 1);
        assert_eq!(summary.learning_cases, 1);
        assert_eq!(
            summary.activity,
            vec![
                DailyActivity { day: today(), attempts: 2 },
                DailyActivity { day: yesterday.date_naive(), attempts: 1 },
            ]
        );

        let empty = store.progress_summary("bob").unwrap();
        assert_eq!(empty, ProgressSummary::default());
    }

    #[test]
    fn test_progress_mastery_boundary_matches_state() {
        let mut store = SqliteStore::in_memory().unwrap();
        let states = [
            state_due(today(), REVIEWING_REPETITIONS, MASTERED_INTERVAL_DAYS),
            state_due(today(), REVIEWING_REPETITIONS, MASTERED_INTERVAL_DAYS - 1),
            state_due(today(), REVIEWING_REPETITIONS - 1, MASTERED_INTERVAL_DAYS + 10),
        ];
        for (i, state) in states.iter().enumerate() {
            let case = add_case(&store, &format!("Boundary case {i}"), 2);
            store.upsert_review_state("alice", &case.id, state).unwrap();
        }

        let summary = store.progress_summary("alice").unwrap();
        let mastered = states.iter().filter(|s| s.is_mastered()).count();
        assert_eq!(mastered, 1);
        assert_eq!(summary.mastered_cases as usize, mastered);
        assert_eq!(summary.learning_cases as usize, states.len() - mastered);
    }

    #[test]
    fn test_long_pass_streak_never_comes_due() {
        let mut store = SqliteStore::in_memory().unwrap();
        let case = add_case(&store, "Acute Epidural Hematoma", 1);
        let request = AttemptRequest {
            case_id: Some(case.id.clone()),
            correct: true,
            time_spent_ms: None,
            learner_id: Some("alice".to_string()),
        };

        for _ in 0..40 {
            record_attempt(&mut store, &request, now()).unwrap();
            assert!(store.list_due_review_states("alice", today(), 10).unwrap().is_empty());
        }

        let stored: String = store
            .conn
            .query_row(
                "SELECT next_review_date FROM review_states WHERE learner_id = 'alice'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(!stored.starts_with('+'));
        assert_eq!(stored.len(), 10);

        let set = select_due_cases(&store, Some("alice"), 10, today()).unwrap();
        assert_eq!(set.total_due(), 0);

        let far_future = today() + Duration::days(MAX_INTERVAL_DAYS as i64);
        let state = store.get_review_state("alice", &case.id).unwrap().unwrap();
        assert_eq!(state.next_review_date, far_future);
        let due_then = store.list_due_review_states("alice", far_future, 10).unwrap();
        assert_eq!(due_then.len(), 1);
    }
}
