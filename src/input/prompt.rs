//! Prompt showing where the student is: lesson and screen on the left,
//! the exam countdown on the right.

use nu_ansi_term::{Color, Style};
use reedline::{Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};
use std::borrow::Cow;

use crate::prefs::Theme;
use crate::ui::theme::theme_colors;

pub struct TutorPrompt {
    /// e.g. "第1课 鸦片战争 · 测验"; empty on the home screen
    location: String,
    /// Right-hand status such as the time left in an exam
    status: String,
    left_style: Style,
    right_style: Style,
}

impl TutorPrompt {
    pub fn new(theme: Theme) -> Self {
        let colors = theme_colors(theme);
        Self {
            location: String::new(),
            status: String::new(),
            left_style: Style::new()
                .fg(Color::Rgb(colors.primary.r, colors.primary.g, colors.primary.b))
                .bold(),
            right_style: Style::new().fg(Color::Rgb(colors.muted.r, colors.muted.g, colors.muted.b)),
        }
    }

    pub fn with_context(theme: Theme, location: &str, status: &str) -> Self {
        Self {
            location: location.to_string(),
            status: status.to_string(),
            ..Self::new(theme)
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

#[allow(mismatched_lifetime_syntaxes)]
impl Prompt for TutorPrompt {
    fn render_prompt_left(&self) -> Cow<str> {
        if self.location.is_empty() {
            Cow::Owned(self.left_style.paint("提纲 ").to_string())
        } else {
            Cow::Owned(self.left_style.paint(format!("{} ", self.location)).to_string())
        }
    }

    fn render_prompt_right(&self) -> Cow<str> {
        if self.status.is_empty() {
            Cow::Borrowed("")
        } else {
            Cow::Owned(self.right_style.paint(&self.status).to_string())
        }
    }

    fn render_prompt_indicator(&self, edit_mode: PromptEditMode) -> Cow<str> {
        match edit_mode {
            PromptEditMode::Default | PromptEditMode::Emacs => Cow::Borrowed("❯ "),
            PromptEditMode::Vi(vi_mode) => match vi_mode {
                reedline::PromptViMode::Normal => Cow::Borrowed("❮ "),
                reedline::PromptViMode::Insert => Cow::Borrowed("❯ "),
            },
            PromptEditMode::Custom(s) => Cow::Owned(format!("{} ", s)),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<str> {
        Cow::Borrowed("  ⋮ ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "搜索",
            PromptHistorySearchStatus::Failing => "未找到",
        };
        Cow::Owned(format!("{} [{}]: ", prefix, history_search.term))
    }
}
