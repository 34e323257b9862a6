//! Unit tests for exam history and preferences
//!
//! Tests cover:
//! - History round-trips through the store unchanged
//! - Newest-first ordering and clearing
//! - Stored record format
//! - Theme preference persistence

use tigang::content::Catalogue;
use tigang::history::{
    ExamHistory, ExamQuestionResult, ExamRecord, ExamSummary, GradingResult, HISTORY_KEY,
};
use tigang::prefs::{self, Theme};
use tigang::storage::LocalStore;

fn record(score: u32) -> ExamRecord {
    let catalogue = Catalogue::bundled().unwrap();
    let lesson = catalogue.first();
    let results = vec![ExamQuestionResult::new(
        &lesson.qa[0],
        "我的回答".to_string(),
        GradingResult {
            score,
            feedback: "行".to_string(),
            is_correct: score >= 80,
        },
    )];
    ExamRecord::new(lesson, results)
}

mod history_tests {
    use super::*;

    #[test]
    fn test_history_round_trips_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(dir.path()).unwrap();
        let mut history = ExamHistory::load(&store);
        let rec = record(90);
        history.record(&mut store, rec.clone()).unwrap();

        let reopened = LocalStore::open(dir.path()).unwrap();
        let loaded = ExamHistory::load(&reopened);
        assert_eq!(loaded.list(), &[rec]);
    }

    #[test]
    fn test_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(dir.path()).unwrap();
        let mut history = ExamHistory::default();
        let mut older = record(50);
        older.id = "older".to_string();
        let mut newer = record(95);
        newer.id = "newer".to_string();
        history.record(&mut store, older).unwrap();
        history.record(&mut store, newer).unwrap();
        let ids: Vec<&str> = history.list().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["newer", "older"]);
        assert!(history.get("older").is_some());
        assert!(history.require("missing").is_err());
    }

    #[test]
    fn test_clear_removes_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(dir.path()).unwrap();
        let mut history = ExamHistory::default();
        history.record(&mut store, record(70)).unwrap();
        assert!(store.get(HISTORY_KEY).is_some());
        history.clear(&mut store).unwrap();
        assert!(history.is_empty());
        assert!(store.get(HISTORY_KEY).is_none());
    }

    #[test]
    fn test_corrupt_history_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(dir.path()).unwrap();
        store.set(HISTORY_KEY, "not json").unwrap();
        assert!(ExamHistory::load(&store).is_empty());
    }

    #[test]
    fn test_stored_records_use_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(dir.path()).unwrap();
        let mut history = ExamHistory::default();
        history.record(&mut store, record(85)).unwrap();
        let raw = store.get(HISTORY_KEY).unwrap();
        for field in ["lessonTitle", "totalScore", "totalQuestions", "questionText", "isCorrect"] {
            assert!(raw.contains(field), "missing {}", field);
        }
    }

    #[test]
    fn test_summary_counts_unanswered_questions() {
        let rec = record(100);
        let summary: ExamSummary = rec.summary();
        assert_eq!(summary.total_score, 100);
        assert_eq!(summary.total_questions, rec.total_questions);
        assert_eq!(
            summary.average,
            (100.0 / rec.total_questions as f64).round() as u32
        );
        assert_eq!(
            summary.accuracy_percent(),
            (100.0 / rec.total_questions as f64).round() as u32
        );
    }
}

mod prefs_tests {
    use super::*;

    #[test]
    fn test_toggle_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(dir.path()).unwrap();
        let next = prefs::toggle(&mut store, Theme::Light).unwrap();
        assert_eq!(next, Theme::Dark);

        let reopened = LocalStore::open(dir.path()).unwrap();
        assert_eq!(prefs::load(&reopened, "light"), Theme::Dark);
    }

    #[test]
    fn test_configured_theme_used_without_stored_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        assert_eq!(prefs::load(&store, "dark"), Theme::Dark);
        assert_eq!(prefs::load(&store, "light"), Theme::Light);
    }
}
