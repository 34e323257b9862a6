//! Terminal colour palettes
//!
//! One palette per [`Theme`]. The active palette is a process-wide setting
//! so that styling calls anywhere pick up a theme toggle immediately.

use colored::CustomColor;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::prefs::Theme;

/// Global theme selection (0 = Light, 1 = Dark)
static CURRENT_THEME: AtomicU8 = AtomicU8::new(0);

fn to_u8(theme: Theme) -> u8 {
    match theme {
        Theme::Light => 0,
        Theme::Dark => 1,
    }
}

fn from_u8(value: u8) -> Theme {
    match value {
        1 => Theme::Dark,
        _ => Theme::Light,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ThemeColors {
    /// Titles, lesson names, the tutor's name
    pub primary: CustomColor,
    /// Correct answers and passing scores
    pub success: CustomColor,
    /// Countdown and partial marks
    pub warning: CustomColor,
    /// Wrong answers, expired timer
    pub error: CustomColor,
    /// Secondary text and hints
    pub muted: CustomColor,
    /// Circled-number markers and list bullets
    pub accent: CustomColor,
    /// Body text
    pub text: CustomColor,
}

impl ThemeColors {
    pub const LIGHT: ThemeColors = ThemeColors {
        primary: CustomColor {
            r: 103,
            g: 80,
            b: 164,
        }, // #6750A4
        success: CustomColor {
            r: 46,
            g: 125,
            b: 50,
        }, // #2E7D32
        warning: CustomColor {
            r: 191,
            g: 112,
            b: 0,
        }, // #BF7000
        error: CustomColor {
            r: 179,
            g: 38,
            b: 30,
        }, // #B3261E
        muted: CustomColor {
            r: 121,
            g: 116,
            b: 126,
        }, // #79747E
        accent: CustomColor {
            r: 125,
            g: 82,
            b: 96,
        }, // #7D5260
        text: CustomColor {
            r: 29,
            g: 27,
            b: 32,
        }, // #1D1B20
    };

    pub const DARK: ThemeColors = ThemeColors {
        primary: CustomColor {
            r: 208,
            g: 188,
            b: 255,
        }, // #D0BCFF
        success: CustomColor {
            r: 129,
            g: 199,
            b: 132,
        }, // #81C784
        warning: CustomColor {
            r: 255,
            g: 183,
            b: 77,
        }, // #FFB74D
        error: CustomColor {
            r: 242,
            g: 184,
            b: 181,
        }, // #F2B8B5
        muted: CustomColor {
            r: 147,
            g: 143,
            b: 153,
        }, // #938F99
        accent: CustomColor {
            r: 239,
            g: 184,
            b: 200,
        }, // #EFB8C8
        text: CustomColor {
            r: 230,
            g: 225,
            b: 229,
        }, // #E6E1E5
    };
}

pub fn set_theme(theme: Theme) {
    CURRENT_THEME.store(to_u8(theme), Ordering::SeqCst);
}

pub fn current_theme_id() -> Theme {
    from_u8(CURRENT_THEME.load(Ordering::SeqCst))
}

pub fn current_theme() -> ThemeColors {
    theme_colors(current_theme_id())
}

pub fn theme_colors(theme: Theme) -> ThemeColors {
    match theme {
        Theme::Light => ThemeColors::LIGHT,
        Theme::Dark => ThemeColors::DARK,
    }
}
