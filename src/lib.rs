//! tigang: study companion for an eighth-grade history course
//!
//! Lesson outlines to review, practice and timed exams graded by a
//! generative-language model, and a chat tutor ("纲哥") who answers from
//! the lesson text.
//!
//! - **Content**: bundled lesson catalogue grouped by unit
//! - **Quiz**: practice and exam state machine with an exam clock
//! - **Tutor**: persona prompts, grading and chat with canned fallbacks
//! - **Storage**: local key-value file holding the theme and exam history
//!
//! # Quick Start
//!
//! ```ignore
//! use tigang::{config::Config, content::Catalogue};
//!
//! let config = Config::load(None)?;
//! let catalogue = Catalogue::bundled()?;
//! println!("{}", tigang::ui::render::review(catalogue.first()));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

pub mod api;
pub mod app;
pub mod chat;
pub mod cli;
pub mod config;
pub mod content;
pub mod errors;
pub mod history;
pub mod input;
pub mod nav;
pub mod observability;
pub mod prefs;
pub mod quiz;
pub mod storage;
pub mod tutor;
pub mod ui;

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Ask long-running loops to wind down.
pub fn request_shutdown() {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

pub fn is_shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}
