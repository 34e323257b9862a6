//! Theme preference
//!
//! The light/dark choice is stored under the `theme` key. Without a stored
//! choice the configured theme applies, and `auto` follows the terminal's
//! background hint.

use std::fmt;

use crate::errors::StorageError;
use crate::storage::LocalStore;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Parse a configured theme; `auto` and unknown values are `None`.
    pub fn from_config(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guess the terminal background from `COLORFGBG` ("fg;bg").
pub fn system_default() -> Theme {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|v| theme_from_colorfgbg(&v))
        .unwrap_or_default()
}

fn theme_from_colorfgbg(value: &str) -> Option<Theme> {
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(if bg < 7 || bg == 8 {
        Theme::Dark
    } else {
        Theme::Light
    })
}

/// Resolve the active theme.
pub fn load(store: &LocalStore, configured: &str) -> Theme {
    match store.get(THEME_KEY) {
        Some("dark") => Theme::Dark,
        Some(_) => Theme::Light,
        None => Theme::from_config(configured).unwrap_or_else(system_default),
    }
}

pub fn save(store: &mut LocalStore, theme: Theme) -> Result<(), StorageError> {
    store.set(THEME_KEY, theme.as_str())
}

/// Flip the theme and persist the new choice.
pub fn toggle(store: &mut LocalStore, current: Theme) -> Result<Theme, StorageError> {
    let next = current.toggled();
    save(store, next)?;
    Ok(next)
}
