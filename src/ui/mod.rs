//! Terminal presentation
//!
//! Colour palettes and styling, the loading spinner, markdown rendering for
//! tutor replies and the per-screen renderers.

pub mod markdown;
pub mod render;
pub mod spinner;
pub mod style;
pub mod theme;
