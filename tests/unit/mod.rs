//! Unit tests for tigang modules
//!
//! These tests exercise the public API without network I/O; anything that
//! would call the model goes through a scripted client.

mod support;
mod test_config;
mod test_content;
mod test_history;
mod test_quiz;
mod test_tutor;
