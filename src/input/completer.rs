//! Tab completion for slash commands and lesson titles.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use reedline::{Completer, Span, Suggestion};

use super::command_registry;

pub struct TutorCompleter {
    commands: Vec<String>,
    /// `(id, title)` for every lesson
    lessons: Vec<(u32, String)>,
    matcher: SkimMatcherV2,
}

impl TutorCompleter {
    pub fn new(commands: Vec<String>, lessons: Vec<(u32, String)>) -> Self {
        Self {
            commands,
            lessons,
            matcher: SkimMatcherV2::default(),
        }
    }

    fn ranked(&self, mut scored: Vec<(i64, Suggestion)>) -> Vec<Suggestion> {
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, s)| s).collect()
    }

    fn complete_commands(&self, prefix: &str, span: Span) -> Vec<Suggestion> {
        let scored = self
            .commands
            .iter()
            .filter_map(|cmd| {
                self.matcher.fuzzy_match(cmd, prefix).map(|score| {
                    (
                        score,
                        Suggestion {
                            value: cmd.clone(),
                            description: command_registry::command_description(cmd)
                                .map(String::from),
                            style: None,
                            extra: None,
                            span,
                            append_whitespace: false,
                            match_indices: None,
                            display_override: None,
                        },
                    )
                })
            })
            .collect();
        self.ranked(scored)
    }

    /// Lesson titles complete to their id, which the app accepts as a
    /// selection.
    fn complete_lessons(&self, prefix: &str, span: Span) -> Vec<Suggestion> {
        let scored = self
            .lessons
            .iter()
            .filter_map(|(id, title)| {
                self.matcher.fuzzy_match(title, prefix).map(|score| {
                    (
                        score,
                        Suggestion {
                            value: id.to_string(),
                            description: Some(title.clone()),
                            style: None,
                            extra: None,
                            span,
                            append_whitespace: false,
                            match_indices: None,
                            display_override: None,
                        },
                    )
                })
            })
            .collect();
        self.ranked(scored)
    }
}

impl Completer for TutorCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let before_cursor = &line[..pos];
        let span = Span::new(0, pos);
        if before_cursor.starts_with('/') {
            return self.complete_commands(before_cursor, span);
        }
        if before_cursor.trim().is_empty() {
            return self.complete_commands("/", span);
        }
        self.complete_lessons(before_cursor.trim(), span)
    }
}
