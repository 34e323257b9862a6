use std::path::PathBuf;
use thiserror::Error;

/// The central error type for tigang.
///
/// Student-facing failures (a grading call that times out, a missing API
/// key) never surface through this type: the tutor turns them into canned
/// in-persona replies. What reaches here is configuration, content and
/// storage trouble, plus API errors from the headless commands.
#[derive(Error, Debug)]
pub enum TigangError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Quiz error: {0}")]
    Quiz(#[from] QuizError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No API key configured (set TIGANG_API_KEY or api.api_keys)")]
    MissingKey,

    #[error("API request timed out")]
    Timeout,

    #[error("API returned status {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse API response: {0}")]
    Parse(String),

    #[error("Prompt blocked by the model: {0}")]
    Blocked(String),

    #[error("Model returned no text")]
    EmptyResponse,
}

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Failed to parse lesson catalogue: {0}")]
    Parse(String),

    #[error("Lesson catalogue is empty")]
    Empty,

    #[error("Duplicate lesson id {0}")]
    DuplicateLesson(u32),

    #[error("Lesson {0} has no questions")]
    NoQuestions(u32),

    #[error("Duplicate question id {question} in lesson {lesson}")]
    DuplicateQuestion { lesson: u32, question: u32 },

    #[error("Lesson {0} not found")]
    LessonNotFound(u32),

    #[error("No lesson matches '{0}'")]
    NoMatch(String),

    #[error("Question {question} not found in lesson {lesson}")]
    QuestionNotFound { lesson: u32, question: usize },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage error at {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Failed to encode value for key '{key}': {message}")]
    Encode { key: String, message: String },

    #[error("Exam record '{0}' not found")]
    RecordNotFound(String),
}

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("Question index {index} out of range (lesson has {len} questions)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Answer slot {slot} out of range ({len} slots)")]
    SlotOutOfRange { slot: usize, len: usize },

    #[error("Operation not available in {0} mode")]
    WrongMode(String),

    #[error("No lesson selected")]
    NoLessonSelected,
}

pub type Result<T> = std::result::Result<T, TigangError>;

pub const EXIT_ERROR: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;
pub const EXIT_CONTENT_ERROR: u8 = 3;
pub const EXIT_API_ERROR: u8 = 4;
pub const EXIT_STORAGE_ERROR: u8 = 5;

/// Determine the appropriate process exit code for an error.
pub fn get_exit_code(e: &anyhow::Error) -> u8 {
    if let Some(err) = e.downcast_ref::<TigangError>() {
        return match err {
            TigangError::Config(_) => EXIT_CONFIG_ERROR,
            TigangError::Content(_) => EXIT_CONTENT_ERROR,
            TigangError::Api(_) => EXIT_API_ERROR,
            TigangError::Storage(_) => EXIT_STORAGE_ERROR,
            _ => EXIT_ERROR,
        };
    }

    if e.downcast_ref::<ApiError>().is_some() {
        return EXIT_API_ERROR;
    }
    if e.downcast_ref::<ContentError>().is_some() {
        return EXIT_CONTENT_ERROR;
    }
    if e.downcast_ref::<StorageError>().is_some() {
        return EXIT_STORAGE_ERROR;
    }

    EXIT_ERROR
}
