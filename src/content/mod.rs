//! Lesson Catalogue
//!
//! The course content is a fixed table of lessons, each an ordered list of
//! question/answer pairs grouped under a unit. The table is compiled into
//! the binary; an alternate JSON file can be loaded in its place.
//!
//! Reference answers use circled numbers (①②③…) to mark the scoring
//! points. Those markers decide how many answer inputs a question gets and
//! how answers are laid out in review.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::errors::ContentError;

const BUNDLED_LESSONS: &str = include_str!("../../data/lessons.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub id: u32,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: u32,
    pub title: String,
    pub unit: String,
    pub qa: Vec<QaPair>,
}

impl Lesson {
    /// Question at `index`, if any.
    pub fn question(&self, index: usize) -> Option<&QaPair> {
        self.qa.get(index)
    }

    /// Lesson text handed to the tutor for single-lesson chat.
    pub fn context(&self) -> String {
        self.qa
            .iter()
            .map(|q| format!("Q: {}\nA: {}", q.question, q.answer))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// The ordered set of lessons.
#[derive(Debug, Clone)]
pub struct Catalogue {
    lessons: Vec<Lesson>,
}

impl Catalogue {
    /// The lesson table compiled into the binary.
    pub fn bundled() -> Result<Self, ContentError> {
        Self::from_json(BUNDLED_LESSONS)
    }

    /// Load a catalogue from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, ContentError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ContentError::Parse(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ContentError> {
        let lessons: Vec<Lesson> =
            serde_json::from_str(raw).map_err(|e| ContentError::Parse(e.to_string()))?;
        Self::new(lessons)
    }

    /// Build a catalogue, rejecting empty tables and duplicate ids.
    pub fn new(lessons: Vec<Lesson>) -> Result<Self, ContentError> {
        if lessons.is_empty() {
            return Err(ContentError::Empty);
        }
        let mut lesson_ids = HashSet::new();
        for lesson in &lessons {
            if !lesson_ids.insert(lesson.id) {
                return Err(ContentError::DuplicateLesson(lesson.id));
            }
            if lesson.qa.is_empty() {
                return Err(ContentError::NoQuestions(lesson.id));
            }
            let mut question_ids = HashSet::new();
            for qa in &lesson.qa {
                if !question_ids.insert(qa.id) {
                    return Err(ContentError::DuplicateQuestion {
                        lesson: lesson.id,
                        question: qa.id,
                    });
                }
            }
        }
        Ok(Self { lessons })
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn first(&self) -> &Lesson {
        // new() guarantees at least one lesson
        &self.lessons[0]
    }

    pub fn lesson(&self, id: u32) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    pub fn require(&self, id: u32) -> Result<&Lesson, ContentError> {
        self.lesson(id).ok_or(ContentError::LessonNotFound(id))
    }

    /// Resolve a lesson from user input: a numeric id, or a title fragment.
    pub fn find(&self, selector: &str) -> Option<&Lesson> {
        let selector = selector.trim();
        if let Ok(id) = selector.parse::<u32>() {
            return self.lesson(id);
        }
        if selector.is_empty() {
            return None;
        }
        self.lessons.iter().find(|l| l.title.contains(selector))
    }

    /// Like [`Catalogue::find`], but an unmatched selector is an error.
    pub fn select(&self, selector: &str) -> Result<&Lesson, ContentError> {
        self.find(selector).ok_or_else(|| match selector.trim().parse::<u32>() {
            Ok(id) => ContentError::LessonNotFound(id),
            Err(_) => ContentError::NoMatch(selector.trim().to_string()),
        })
    }

    /// Unit names in first-appearance order.
    pub fn units(&self) -> Vec<&str> {
        let mut units: Vec<&str> = Vec::new();
        for lesson in &self.lessons {
            if !units.contains(&lesson.unit.as_str()) {
                units.push(&lesson.unit);
            }
        }
        units
    }

    /// Lessons grouped by unit, both in catalogue order.
    pub fn grouped(&self) -> Vec<(&str, Vec<&Lesson>)> {
        self.units()
            .into_iter()
            .map(|unit| {
                let lessons = self.lessons.iter().filter(|l| l.unit == unit).collect();
                (unit, lessons)
            })
            .collect()
    }

    /// Whole-book text handed to the tutor for full-context chat.
    pub fn full_context(&self) -> String {
        self.lessons
            .iter()
            .map(|l| {
                let pairs = l
                    .qa
                    .iter()
                    .map(|q| format!("Q: {}\nA: {}", q.question, q.answer))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("Lesson: {}\n{}", l.title, pairs)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Short sidebar label for a unit: its first whitespace-separated token.
pub fn unit_label(unit: &str) -> &str {
    unit.split_whitespace().next().unwrap_or(unit)
}

/// True for the circled numbers ① through ⑩.
pub fn is_point_marker(c: char) -> bool {
    ('\u{2460}'..='\u{2469}').contains(&c)
}

/// Split a reference answer before every circled number.
///
/// Always yields at least one part; an answer without markers is a single
/// part.
pub fn split_points(answer: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (i, c) in answer.char_indices() {
        if is_point_marker(c) && i > start {
            parts.push(&answer[start..i]);
            start = i;
        }
    }
    parts.push(&answer[start..]);
    parts
}

/// Lines for displaying an answer: break before circled numbers and after
/// semicolons (full- or half-width), trimmed, blanks dropped.
pub fn format_answer_lines(answer: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (i, c) in answer.char_indices() {
        if is_point_marker(c) && i > start {
            pieces.push(&answer[start..i]);
            start = i;
        }
        if c == '；' || c == ';' {
            let end = i + c.len_utf8();
            pieces.push(&answer[start..end]);
            start = end;
        }
    }
    pieces.push(&answer[start..]);
    pieces
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}
