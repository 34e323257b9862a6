//! Practice and exam flow for one lesson
//!
//! `QuizSession` is a small state machine over [`QuizMode`]. Practice
//! grades one question at a time and lets the student move around freely;
//! an exam walks the questions in order against an [`ExamClock`] and ends
//! in a saved [`ExamRecord`].

pub mod clock;

pub use clock::{format_time, ExamClock};

use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

use crate::content::{split_points, Lesson, QaPair};
use crate::errors::{QuizError, StorageError, TigangError};
use crate::history::{ExamHistory, ExamQuestionResult, ExamRecord, ExamSummary, GradingResult};
use crate::storage::LocalStore;
use crate::tutor::Tutor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizMode {
    Select,
    PracticeList,
    Practice,
    Exam,
    ExamResult,
    History,
    HistoryDetail,
}

impl QuizMode {
    pub fn as_str(self) -> &'static str {
        match self {
            QuizMode::Select => "select",
            QuizMode::PracticeList => "practice-list",
            QuizMode::Practice => "practice",
            QuizMode::Exam => "exam",
            QuizMode::ExamResult => "exam-result",
            QuizMode::History => "history",
            QuizMode::HistoryDetail => "history-detail",
        }
    }

    /// Modes that show a question with answer inputs.
    pub fn is_answering(self) -> bool {
        matches!(self, QuizMode::Practice | QuizMode::Exam)
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a successful submission produced
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Practice(GradingResult),
    /// Exam continues with the question at `next_index`
    ExamAnswered {
        grading: GradingResult,
        next_index: usize,
    },
    ExamFinished(ExamRecord),
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    lesson: Lesson,
    mode: QuizMode,
    index: usize,
    answers: Vec<String>,
    grading: bool,
    practice_result: Option<GradingResult>,
    exam_results: Vec<ExamQuestionResult>,
    clock: Option<ExamClock>,
    seconds_per_question: u64,
    finished_record: Option<ExamRecord>,
    selected_record: Option<ExamRecord>,
}

impl QuizSession {
    pub fn new(lesson: &Lesson, seconds_per_question: u64) -> Self {
        Self {
            lesson: lesson.clone(),
            mode: QuizMode::Select,
            index: 0,
            answers: vec![String::new()],
            grading: false,
            practice_result: None,
            exam_results: Vec::new(),
            clock: None,
            seconds_per_question,
            finished_record: None,
            selected_record: None,
        }
    }

    pub fn lesson(&self) -> &Lesson {
        &self.lesson
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// `None` only for a lesson without questions.
    pub fn current_question(&self) -> Option<&QaPair> {
        self.lesson.qa.get(self.index)
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn is_multi_part(&self) -> bool {
        self.answers.len() > 1
    }

    pub fn is_grading(&self) -> bool {
        self.grading
    }

    pub fn practice_result(&self) -> Option<&GradingResult> {
        self.practice_result.as_ref()
    }

    pub fn exam_results(&self) -> &[ExamQuestionResult] {
        &self.exam_results
    }

    pub fn clock(&self) -> Option<&ExamClock> {
        self.clock.as_ref()
    }

    /// Record saved by the last finished exam, if it had any answers.
    pub fn finished_record(&self) -> Option<&ExamRecord> {
        self.finished_record.as_ref()
    }

    pub fn selected_record(&self) -> Option<&ExamRecord> {
        self.selected_record.as_ref()
    }

    /// Exam time allowance for this lesson.
    pub fn exam_time_limit(&self) -> Duration {
        Duration::from_secs(self.lesson.qa.len() as u64 * self.seconds_per_question)
    }

    fn reset(&mut self) {
        self.index = 0;
        self.answers = vec![String::new()];
        self.practice_result = None;
        self.exam_results.clear();
        self.clock = None;
        self.finished_record = None;
    }

    /// Size the answer inputs for the current question.
    fn prepare_question(&mut self) {
        let parts = self
            .current_question()
            .map(|qa| split_points(&qa.answer).len())
            .unwrap_or(1);
        self.answers = vec![String::new(); parts];
        self.practice_result = None;
    }

    pub fn open_practice_list(&mut self) {
        self.clock = None;
        self.mode = QuizMode::PracticeList;
    }

    pub fn start_practice_at(&mut self, index: usize) -> Result<(), QuizError> {
        if index >= self.lesson.qa.len() {
            return Err(QuizError::IndexOutOfRange {
                index,
                len: self.lesson.qa.len(),
            });
        }
        self.clock = None;
        self.index = index;
        self.mode = QuizMode::Practice;
        self.prepare_question();
        Ok(())
    }

    pub fn start_exam(&mut self) {
        self.reset();
        self.mode = QuizMode::Exam;
        self.clock = Some(ExamClock::start(self.exam_time_limit()));
        self.prepare_question();
        info!(
            "Exam started for {} ({} questions)",
            self.lesson.title,
            self.lesson.qa.len()
        );
    }

    pub fn open_history(&mut self) {
        self.clock = None;
        self.mode = QuizMode::History;
    }

    pub fn open_history_detail(&mut self, record: ExamRecord) {
        self.selected_record = Some(record);
        self.mode = QuizMode::HistoryDetail;
    }

    /// Leave the current screen. An exam in progress is abandoned unsaved.
    pub fn back(&mut self) -> QuizMode {
        self.mode = match self.mode {
            QuizMode::Practice => QuizMode::PracticeList,
            QuizMode::HistoryDetail => QuizMode::History,
            QuizMode::ExamResult => {
                self.reset();
                QuizMode::Select
            }
            _ => QuizMode::Select,
        };
        self.clock = None;
        self.mode
    }

    pub fn set_answer(&mut self, slot: usize, text: impl Into<String>) -> Result<(), QuizError> {
        let len = self.answers.len();
        let entry = self
            .answers
            .get_mut(slot)
            .ok_or(QuizError::SlotOutOfRange { slot, len })?;
        *entry = text.into();
        Ok(())
    }

    pub fn can_submit(&self) -> bool {
        self.mode.is_answering() && !self.grading && self.answers.iter().any(|a| !a.trim().is_empty())
    }

    /// The text sent for grading: numbered lines for multi-part questions.
    pub fn combined_answer(&self) -> String {
        if !self.is_multi_part() {
            return self.answers.first().cloned().unwrap_or_default();
        }
        self.answers
            .iter()
            .enumerate()
            .map(|(i, a)| format!("{}. {}", i + 1, a))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Grade the current answer. `None` when there is nothing to submit.
    pub async fn submit(
        &mut self,
        tutor: &Tutor,
        history: &mut ExamHistory,
        store: &mut LocalStore,
    ) -> Result<Option<SubmitOutcome>, TigangError> {
        if !self.can_submit() {
            return Ok(None);
        }
        let Some(qa) = self.current_question().cloned() else {
            return Ok(None);
        };
        let combined = self.combined_answer();

        self.grading = true;
        let grading = tutor.grade_answer(&qa.question, &combined, &qa.answer).await;
        self.grading = false;
        debug!("Question {} graded {}", qa.id, grading.score);

        match self.mode {
            QuizMode::Practice => {
                self.practice_result = Some(grading.clone());
                Ok(Some(SubmitOutcome::Practice(grading)))
            }
            QuizMode::Exam => {
                self.exam_results
                    .push(ExamQuestionResult::new(&qa, combined, grading.clone()));
                if self.index + 1 >= self.lesson.qa.len() {
                    let record = self.finish_exam(history, store)?;
                    // results are non-empty here, so a record was saved
                    Ok(record.map(SubmitOutcome::ExamFinished))
                } else {
                    self.index += 1;
                    self.prepare_question();
                    Ok(Some(SubmitOutcome::ExamAnswered {
                        grading,
                        next_index: self.index,
                    }))
                }
            }
            other => Err(QuizError::WrongMode(other.to_string()).into()),
        }
    }

    /// Move to the next practice question, wrapping after the last.
    pub fn next_practice(&mut self) -> Result<usize, QuizError> {
        if self.mode != QuizMode::Practice {
            return Err(QuizError::WrongMode(self.mode.to_string()));
        }
        let len = self.lesson.qa.len();
        if len == 0 {
            return Err(QuizError::IndexOutOfRange { index: 0, len });
        }
        self.index = (self.index + 1) % len;
        self.prepare_question();
        Ok(self.index)
    }

    /// End the exam and show results. The record is saved only when at
    /// least one answer was graded.
    pub fn finish_exam(
        &mut self,
        history: &mut ExamHistory,
        store: &mut LocalStore,
    ) -> Result<Option<ExamRecord>, StorageError> {
        self.mode = QuizMode::ExamResult;
        self.clock = None;
        if self.exam_results.is_empty() {
            return Ok(None);
        }
        let record = ExamRecord::new(&self.lesson, self.exam_results.clone());
        history.record(store, record.clone())?;
        info!(
            "Exam saved for {}: {} points over {} answers",
            record.lesson_title,
            record.total_score,
            record.results.len()
        );
        self.finished_record = Some(record.clone());
        Ok(Some(record))
    }

    /// Finish the exam if its clock has run out. Returns whether it did.
    pub fn expire_if_due(
        &mut self,
        history: &mut ExamHistory,
        store: &mut LocalStore,
    ) -> Result<bool, StorageError> {
        let expired = self.mode == QuizMode::Exam && self.clock.is_some_and(|c| c.is_expired());
        if expired {
            info!("Exam time is up");
            self.finish_exam(history, store)?;
        }
        Ok(expired)
    }

    /// Results shown on the result or history-detail screen.
    pub fn displayed_results(&self) -> &[ExamQuestionResult] {
        match self.mode {
            QuizMode::HistoryDetail => self
                .selected_record
                .as_ref()
                .map(|r| r.results.as_slice())
                .unwrap_or_default(),
            _ => &self.exam_results,
        }
    }

    /// Summary for the result or history-detail screen.
    pub fn summary(&self) -> Option<ExamSummary> {
        match self.mode {
            QuizMode::ExamResult => Some(ExamSummary::from_results(
                &self.exam_results,
                self.lesson.qa.len(),
            )),
            QuizMode::HistoryDetail => self.selected_record.as_ref().map(ExamRecord::summary),
            _ => None,
        }
    }

    #[cfg(test)]
    fn expire_clock_now(&mut self) {
        use std::time::Instant;
        if let Some(start) = Instant::now().checked_sub(Duration::from_secs(1)) {
            self.clock = Some(ExamClock::started_at(start, Duration::ZERO));
        }
    }
}
