//! Exam record data model
//!
//! Records serialize as camelCase JSON under the `hm8_exam_history` key.
//! Scores are whole numbers from 0 to 100.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::content::{Lesson, QaPair};

/// Score at or above which an answer counts as correct.
pub const PASS_SCORE: u32 = 80;

/// Verdict returned by the tutor for one answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingResult {
    pub score: u32,
    pub feedback: String,
    pub is_correct: bool,
}

impl GradingResult {
    /// A zero-score verdict carrying only feedback (canned replies).
    pub fn zero(feedback: impl Into<String>) -> Self {
        Self {
            score: 0,
            feedback: feedback.into(),
            is_correct: false,
        }
    }
}

/// One graded question inside an exam
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamQuestionResult {
    pub question_id: u32,
    pub question_text: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub grading: GradingResult,
}

impl ExamQuestionResult {
    pub fn new(qa: &QaPair, user_answer: String, grading: GradingResult) -> Self {
        Self {
            question_id: qa.id,
            question_text: qa.question.clone(),
            user_answer,
            correct_answer: qa.answer.clone(),
            grading,
        }
    }
}

/// A completed exam session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamRecord {
    pub id: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub lesson_title: String,
    pub total_score: u32,
    /// Questions in the lesson, answered or not
    pub total_questions: usize,
    pub results: Vec<ExamQuestionResult>,
}

impl ExamRecord {
    pub fn new(lesson: &Lesson, results: Vec<ExamQuestionResult>) -> Self {
        Self::at(Utc::now(), lesson, results)
    }

    pub fn at(now: DateTime<Utc>, lesson: &Lesson, results: Vec<ExamQuestionResult>) -> Self {
        let millis = now.timestamp_millis();
        Self {
            id: millis.to_string(),
            timestamp: millis,
            lesson_title: lesson.title.clone(),
            total_score: results.iter().map(|r| r.grading.score).sum(),
            total_questions: lesson.qa.len(),
            results,
        }
    }

    pub fn summary(&self) -> ExamSummary {
        ExamSummary::from_results(&self.results, self.total_questions)
    }

    /// `MM-DD HH:MM` in local time, as shown in the history list.
    pub fn display_date(&self) -> String {
        match Local.timestamp_millis_opt(self.timestamp).single() {
            Some(dt) => dt.format("%m-%d %H:%M").to_string(),
            None => "--".to_string(),
        }
    }
}

/// Aggregate figures shown on the result screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamSummary {
    pub total_score: u32,
    /// `round(total_score / total_questions)`
    pub average: u32,
    pub correct_count: usize,
    pub total_questions: usize,
}

impl ExamSummary {
    pub fn from_results(results: &[ExamQuestionResult], total_questions: usize) -> Self {
        let total_score: u32 = results.iter().map(|r| r.grading.score).sum();
        let average = if total_questions == 0 {
            0
        } else {
            (total_score as f64 / total_questions as f64).round() as u32
        };
        Self {
            total_score,
            average,
            correct_count: results.iter().filter(|r| r.grading.is_correct).count(),
            total_questions,
        }
    }

    /// Whether the unrounded average reaches the pass mark.
    pub fn passes(&self) -> bool {
        self.total_questions > 0
            && u64::from(self.total_score) >= u64::from(PASS_SCORE) * self.total_questions as u64
    }

    /// Share of the lesson's questions answered correctly, in percent.
    pub fn accuracy_percent(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        (self.correct_count as f64 * 100.0 / self.total_questions as f64).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson() -> Lesson {
        Lesson {
            id: 1,
            title: "第1课 鸦片战争".into(),
            unit: "第一单元".into(),
            qa: (1..=3)
                .map(|i| QaPair {
                    id: i,
                    question: format!("q{}", i),
                    answer: format!("a{}", i),
                })
                .collect(),
        }
    }

    fn result(qa: &QaPair, score: u32, ok: bool) -> ExamQuestionResult {
        ExamQuestionResult::new(
            qa,
            "answer".into(),
            GradingResult {
                score,
                feedback: "fb".into(),
                is_correct: ok,
            },
        )
    }

    #[test]
    fn test_record_totals_use_lesson_size() {
        let l = lesson();
        let results = vec![result(&l.qa[0], 90, true), result(&l.qa[1], 45, false)];
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let record = ExamRecord::at(now, &l, results);
        assert_eq!(record.id, "1700000000123");
        assert_eq!(record.timestamp, 1_700_000_000_123);
        assert_eq!(record.total_score, 135);
        assert_eq!(record.total_questions, 3);

        let summary = record.summary();
        assert_eq!(summary.average, 45);
        assert_eq!(summary.correct_count, 1);
    }

    #[test]
    fn test_summary_rounds_average() {
        let l = lesson();
        let results = vec![result(&l.qa[0], 100, true), result(&l.qa[1], 0, false)];
        // 100 / 3 = 33.33
        assert_eq!(ExamSummary::from_results(&results, 3).average, 33);
        let results = vec![result(&l.qa[0], 5, false)];
        // 5 / 2 = 2.5 rounds half away from zero
        assert_eq!(ExamSummary::from_results(&results, 2).average, 3);
        assert_eq!(ExamSummary::from_results(&[], 0).average, 0);
    }

    #[test]
    fn test_summary_passes_on_unrounded_average() {
        let l = lesson();
        let results = vec![result(&l.qa[0], 80, true), result(&l.qa[1], 79, false)];
        let summary = ExamSummary::from_results(&results, 2);
        // 159 / 2 = 79.5 shows as 80 but stays below the pass mark
        assert_eq!(summary.average, 80);
        assert!(!summary.passes());
        let results = vec![result(&l.qa[0], 100, true), result(&l.qa[1], 60, false)];
        assert!(ExamSummary::from_results(&results, 2).passes());
        assert!(!ExamSummary::from_results(&[], 0).passes());
    }

    #[test]
    fn test_accuracy_percent() {
        let l = lesson();
        let results = vec![result(&l.qa[0], 90, true), result(&l.qa[1], 95, true)];
        assert_eq!(ExamSummary::from_results(&results, 3).accuracy_percent(), 67);
        assert_eq!(ExamSummary::from_results(&[], 0).accuracy_percent(), 0);
    }

    #[test]
    fn test_camel_case_json() {
        let l = lesson();
        let record = ExamRecord::new(&l, vec![result(&l.qa[0], 80, true)]);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"lessonTitle\""));
        assert!(json.contains("\"totalQuestions\":3"));
        assert!(json.contains("\"isCorrect\":true"));
        assert!(json.contains("\"questionText\""));
        let back: ExamRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_zero_grading() {
        let g = GradingResult::zero("oops");
        assert_eq!(g.score, 0);
        assert!(!g.is_correct);
        assert_eq!(g.feedback, "oops");
    }
}
