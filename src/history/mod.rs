//! Exam History
//!
//! Completed exams are kept newest-first as one JSON-encoded array under a
//! single store key. Every change rewrites the whole array.

pub mod models;

pub use models::{ExamQuestionResult, ExamRecord, ExamSummary, GradingResult, PASS_SCORE};

use tracing::warn;

use crate::errors::StorageError;
use crate::storage::LocalStore;

/// Store key holding the JSON-encoded record array.
pub const HISTORY_KEY: &str = "hm8_exam_history";

/// In-memory copy of the persisted exam history
#[derive(Debug, Default, Clone)]
pub struct ExamHistory {
    records: Vec<ExamRecord>,
}

impl ExamHistory {
    /// Read history from the store; absent or malformed data yields an
    /// empty history.
    pub fn load(store: &LocalStore) -> Self {
        let records = match store.get_json::<Vec<ExamRecord>>(HISTORY_KEY) {
            Ok(Some(records)) => records,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to load exam history: {}", e);
                Vec::new()
            }
        };
        Self { records }
    }

    /// Newest first.
    pub fn list(&self) -> &[ExamRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ExamRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn require(&self, id: &str) -> Result<&ExamRecord, StorageError> {
        self.get(id)
            .ok_or_else(|| StorageError::RecordNotFound(id.to_string()))
    }

    /// Prepend a record and persist the whole history. Nothing changes if
    /// the save fails.
    pub fn record(&mut self, store: &mut LocalStore, record: ExamRecord) -> Result<(), StorageError> {
        let mut records = Vec::with_capacity(self.records.len() + 1);
        records.push(record);
        records.extend(self.records.iter().cloned());
        store.set_json(HISTORY_KEY, &records)?;
        self.records = records;
        Ok(())
    }

    pub fn clear(&mut self, store: &mut LocalStore) -> Result<(), StorageError> {
        store.remove(HISTORY_KEY)?;
        self.records.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Lesson, QaPair};
    use tempfile::TempDir;

    fn lesson(title: &str) -> Lesson {
        Lesson {
            id: 1,
            title: title.into(),
            unit: "U".into(),
            qa: vec![QaPair {
                id: 1,
                question: "q".into(),
                answer: "a".into(),
            }],
        }
    }

    fn record(title: &str, id: &str) -> ExamRecord {
        let l = lesson(title);
        let mut r = ExamRecord::new(
            &l,
            vec![ExamQuestionResult::new(
                &l.qa[0],
                "mine".into(),
                GradingResult {
                    score: 70,
                    feedback: "差一点".into(),
                    is_correct: false,
                },
            )],
        );
        r.id = id.to_string();
        r
    }

    #[test]
    fn test_empty_when_absent() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        assert!(ExamHistory::load(&store).is_empty());
    }

    #[test]
    fn test_round_trip_newest_first() {
        let dir = TempDir::new().unwrap();
        let mut store = LocalStore::open(dir.path()).unwrap();
        let mut history = ExamHistory::load(&store);
        let first = record("第1课", "1");
        let second = record("第2课", "2");
        history.record(&mut store, first.clone()).unwrap();
        history.record(&mut store, second.clone()).unwrap();

        let reopened = LocalStore::open(dir.path()).unwrap();
        let loaded = ExamHistory::load(&reopened);
        assert_eq!(loaded.list(), &[second, first.clone()]);
        assert_eq!(loaded.get("1"), Some(&first));
        assert!(loaded.require("missing").is_err());
    }

    #[test]
    fn test_malformed_history_is_empty() {
        let dir = TempDir::new().unwrap();
        let mut store = LocalStore::open(dir.path()).unwrap();
        store.set(HISTORY_KEY, "{\"oops\":").unwrap();
        assert!(ExamHistory::load(&store).is_empty());
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let mut store = LocalStore::open(dir.path()).unwrap();
        let mut history = ExamHistory::load(&store);
        history.record(&mut store, record("第1课", "1")).unwrap();
        history.clear(&mut store).unwrap();
        assert!(history.is_empty());
        assert!(store.get(HISTORY_KEY).is_none());
    }

    #[test]
    fn test_failed_save_keeps_previous_history() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        let mut store = LocalStore::open(&data).unwrap();
        let mut history = ExamHistory::load(&store);
        history.record(&mut store, record("第1课", "1")).unwrap();
        std::fs::remove_dir_all(&data).unwrap();

        assert!(history.record(&mut store, record("第2课", "2")).is_err());
        assert_eq!(history.list().len(), 1);
        assert!(history.get("2").is_none());
    }
}
