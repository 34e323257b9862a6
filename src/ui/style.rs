//! Semantic styling for study output
//!
//! Colours come from the active theme palette. Glyphs fall back to plain
//! ASCII when the terminal cannot draw emoji.

use std::sync::atomic::{AtomicBool, Ordering};

use super::theme::current_theme;
use colored::{ColoredString, Colorize};

/// When true, all glyphs use plain ASCII instead of Unicode/emoji.
static ASCII_MODE: AtomicBool = AtomicBool::new(false);

pub fn set_ascii_mode(enabled: bool) {
    ASCII_MODE.store(enabled, Ordering::Relaxed);
}

pub fn is_ascii_mode() -> bool {
    ASCII_MODE.load(Ordering::Relaxed)
}

pub trait TutorStyle {
    fn title(self) -> ColoredString;
    fn tutor_voice(self) -> ColoredString;
    fn correct(self) -> ColoredString;
    fn wrong(self) -> ColoredString;
    fn caution(self) -> ColoredString;
    fn muted(self) -> ColoredString;
    fn emphasis(self) -> ColoredString;
    fn marker(self) -> ColoredString;
    fn body(self) -> ColoredString;
}

impl TutorStyle for &str {
    fn title(self) -> ColoredString {
        self.custom_color(current_theme().primary).bold()
    }

    fn tutor_voice(self) -> ColoredString {
        self.custom_color(current_theme().primary).italic()
    }

    fn correct(self) -> ColoredString {
        self.custom_color(current_theme().success).bold()
    }

    fn wrong(self) -> ColoredString {
        self.custom_color(current_theme().error).bold()
    }

    fn caution(self) -> ColoredString {
        self.custom_color(current_theme().warning)
    }

    fn muted(self) -> ColoredString {
        self.custom_color(current_theme().muted)
    }

    fn emphasis(self) -> ColoredString {
        self.custom_color(current_theme().primary)
    }

    fn marker(self) -> ColoredString {
        self.custom_color(current_theme().accent).bold()
    }

    fn body(self) -> ColoredString {
        self.custom_color(current_theme().text)
    }
}

impl TutorStyle for String {
    fn title(self) -> ColoredString {
        self.as_str().title()
    }

    fn tutor_voice(self) -> ColoredString {
        self.as_str().tutor_voice()
    }

    fn correct(self) -> ColoredString {
        self.as_str().correct()
    }

    fn wrong(self) -> ColoredString {
        self.as_str().wrong()
    }

    fn caution(self) -> ColoredString {
        self.as_str().caution()
    }

    fn muted(self) -> ColoredString {
        self.as_str().muted()
    }

    fn emphasis(self) -> ColoredString {
        self.as_str().emphasis()
    }

    fn marker(self) -> ColoredString {
        self.as_str().marker()
    }

    fn body(self) -> ColoredString {
        self.as_str().body()
    }
}

/// Score badge on a result card, green when the tutor judged the answer
/// correct and red otherwise.
pub fn score_badge(score: u32, is_correct: bool) -> ColoredString {
    let text = format!("{} 分", score);
    if is_correct {
        text.correct()
    } else {
        text.wrong()
    }
}

/// Average score in the history list: green when it reaches the pass mark.
pub fn average_badge(average: u32, passes: bool) -> ColoredString {
    let text = average.to_string();
    if passes {
        text.correct()
    } else {
        text.emphasis().bold()
    }
}

pub struct Glyphs;

impl Glyphs {
    pub fn book() -> &'static str {
        if is_ascii_mode() {
            "[B]"
        } else {
            "📖"
        }
    }
    pub fn pencil() -> &'static str {
        if is_ascii_mode() {
            "[/]"
        } else {
            "✏️"
        }
    }
    pub fn clock() -> &'static str {
        if is_ascii_mode() {
            "[t]"
        } else {
            "⏱"
        }
    }
    pub fn trophy() -> &'static str {
        if is_ascii_mode() {
            "[*]"
        } else {
            "🏆"
        }
    }
    pub fn chat() -> &'static str {
        if is_ascii_mode() {
            "[>]"
        } else {
            "💬"
        }
    }
    pub fn check() -> &'static str {
        if is_ascii_mode() {
            "[ok]"
        } else {
            "✔"
        }
    }
    pub fn cross() -> &'static str {
        if is_ascii_mode() {
            "[x]"
        } else {
            "✘"
        }
    }
    pub fn expanded() -> &'static str {
        if is_ascii_mode() {
            "v"
        } else {
            "▾"
        }
    }
    pub fn collapsed() -> &'static str {
        if is_ascii_mode() {
            ">"
        } else {
            "▸"
        }
    }
    pub fn bullet() -> &'static str {
        if is_ascii_mode() {
            "-"
        } else {
            "•"
        }
    }
    pub fn rule() -> &'static str {
        if is_ascii_mode() {
            "-"
        } else {
            "─"
        }
    }
}
