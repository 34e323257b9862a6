//! Unit tests for the quiz state machine
//!
//! Tests cover:
//! - Practice grading and moving between questions
//! - Exams saving to history, or not when abandoned
//! - Multi-part answers

use super::support::{self, ScriptedClient};
use tigang::content::Catalogue;
use tigang::history::ExamHistory;
use tigang::quiz::{QuizMode, QuizSession, SubmitOutcome};
use tigang::storage::LocalStore;

fn lesson_one() -> tigang::content::Lesson {
    Catalogue::bundled().unwrap().first().clone()
}

struct Fixture {
    _dir: tempfile::TempDir,
    store: LocalStore,
    history: ExamHistory,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::open(dir.path()).unwrap();
    Fixture {
        _dir: dir,
        store,
        history: ExamHistory::default(),
    }
}

mod practice_tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_submit_makes_no_call() {
        let client = ScriptedClient::replying(vec![support::verdict(90, "好")]);
        let tutor = support::tutor(client.clone());
        let mut fx = fixture();
        let mut quiz = QuizSession::new(&lesson_one(), 120);
        quiz.start_practice_at(0).unwrap();

        let outcome = quiz
            .submit(&tutor, &mut fx.history, &mut fx.store)
            .await
            .unwrap();
        assert!(outcome.is_none());
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_practice_grading() {
        let client = ScriptedClient::replying(vec![support::verdict(85, "说到点子上了")]);
        let tutor = support::tutor(client.clone());
        let mut fx = fixture();
        let mut quiz = QuizSession::new(&lesson_one(), 120);
        quiz.start_practice_at(0).unwrap();
        quiz.set_answer(0, "打开中国市场").unwrap();

        let outcome = quiz
            .submit(&tutor, &mut fx.history, &mut fx.store)
            .await
            .unwrap();
        match outcome {
            Some(SubmitOutcome::Practice(result)) => {
                assert_eq!(result.score, 85);
                assert!(result.is_correct);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(quiz.practice_result().map(|r| r.score), Some(85));
        assert!(client.last_prompt().unwrap().contains("打开中国市场"));
        assert!(fx.history.is_empty());
    }

    #[test]
    fn test_next_practice_wraps() {
        let lesson = lesson_one();
        let mut quiz = QuizSession::new(&lesson, 120);
        quiz.start_practice_at(lesson.qa.len() - 1).unwrap();
        assert_eq!(quiz.next_practice().unwrap(), 0);
        assert!(quiz.practice_result().is_none());
    }

    #[test]
    fn test_next_practice_outside_practice_is_error() {
        let mut quiz = QuizSession::new(&lesson_one(), 120);
        assert!(quiz.next_practice().is_err());
    }

    #[test]
    fn test_multi_part_answer_is_numbered() {
        let mut quiz = QuizSession::new(&lesson_one(), 120);
        // second question has two circled points
        quiz.start_practice_at(1).unwrap();
        assert!(quiz.is_multi_part());
        assert_eq!(quiz.answers().len(), 2);
        quiz.set_answer(0, "1839年销烟").unwrap();
        quiz.set_answer(1, "禁烟胜利").unwrap();
        assert_eq!(quiz.combined_answer(), "1. 1839年销烟\n2. 禁烟胜利");
        assert!(quiz.set_answer(2, "多余").is_err());
    }
}

mod exam_tests {
    use super::*;

    #[tokio::test]
    async fn test_exam_saves_record() {
        let lesson = lesson_one();
        let replies = (0..lesson.qa.len())
            .map(|i| support::verdict(60 + i as u32 * 10, "继续努力"))
            .collect();
        let client = ScriptedClient::replying(replies);
        let tutor = support::tutor(client.clone());
        let mut fx = fixture();
        let mut quiz = QuizSession::new(&lesson, 120);
        quiz.start_exam();
        assert_eq!(quiz.mode(), QuizMode::Exam);
        assert!(quiz.clock().is_some());

        let mut finished = None;
        for _ in 0..lesson.qa.len() {
            for slot in 0..quiz.answers().len() {
                quiz.set_answer(slot, "作答").unwrap();
            }
            finished = quiz
                .submit(&tutor, &mut fx.history, &mut fx.store)
                .await
                .unwrap();
        }

        let record = match finished {
            Some(SubmitOutcome::ExamFinished(record)) => record,
            other => panic!("exam did not finish: {:?}", other),
        };
        assert_eq!(quiz.mode(), QuizMode::ExamResult);
        assert_eq!(record.results.len(), lesson.qa.len());
        assert_eq!(record.total_score, 60 + 70 + 80 + 90);
        assert_eq!(fx.history.list().len(), 1);
        assert_eq!(ExamHistory::load(&fx.store).list(), &[record]);
        assert_eq!(quiz.summary().map(|s| s.correct_count), Some(2));
    }

    #[tokio::test]
    async fn test_abandoned_exam_is_not_saved() {
        let client = ScriptedClient::replying(vec![support::verdict(100, "满分")]);
        let tutor = support::tutor(client);
        let mut fx = fixture();
        let mut quiz = QuizSession::new(&lesson_one(), 120);
        quiz.start_exam();
        quiz.set_answer(0, "作答").unwrap();
        quiz.submit(&tutor, &mut fx.history, &mut fx.store)
            .await
            .unwrap();
        assert_eq!(quiz.exam_results().len(), 1);

        assert_eq!(quiz.back(), QuizMode::Select);
        assert!(quiz.clock().is_none());
        assert!(fx.history.is_empty());
        assert!(ExamHistory::load(&fx.store).is_empty());
    }

    #[test]
    fn test_finishing_without_answers_saves_nothing() {
        let mut fx = fixture();
        let mut quiz = QuizSession::new(&lesson_one(), 120);
        quiz.start_exam();
        let saved = quiz.finish_exam(&mut fx.history, &mut fx.store).unwrap();
        assert!(saved.is_none());
        assert_eq!(quiz.mode(), QuizMode::ExamResult);
        assert!(fx.history.is_empty());
    }

    #[test]
    fn test_time_limit_scales_with_questions() {
        let lesson = lesson_one();
        let quiz = QuizSession::new(&lesson, 90);
        assert_eq!(quiz.exam_time_limit().as_secs(), lesson.qa.len() as u64 * 90);
    }
}
