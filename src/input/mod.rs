//! Line input for the interactive app
//!
//! Built on reedline: persistent history, Tab completion for slash
//! commands and lesson titles, and a prompt that shows where the student
//! is.

pub mod command_registry;
mod completer;
mod prompt;

pub use completer::TutorCompleter;
pub use prompt::TutorPrompt;

use anyhow::Result;
use reedline::{
    default_emacs_keybindings, ColumnarMenu, EditCommand, Emacs, ExternalPrinter,
    FileBackedHistory, KeyCode, KeyModifiers, Keybindings, MenuBuilder, Reedline, ReedlineEvent,
    ReedlineMenu, Signal,
};
use std::path::{Path, PathBuf};

use crate::content::Catalogue;
use crate::prefs::Theme;

/// Configuration for the input system
#[derive(Debug, Clone)]
pub struct InputConfig {
    /// Path to history file; `None` keeps history in memory only
    pub history_path: Option<PathBuf>,
    pub max_history: usize,
    /// Slash commands offered for completion
    pub commands: Vec<String>,
    /// `(id, title)` of every lesson, for completion
    pub lessons: Vec<(u32, String)>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            history_path: None,
            max_history: 1000,
            commands: command_registry::command_names(),
            lessons: Vec::new(),
        }
    }
}

impl InputConfig {
    pub fn for_catalogue(catalogue: &Catalogue, data_dir: &Path) -> Self {
        Self {
            history_path: Some(history_path(data_dir)),
            lessons: catalogue
                .lessons()
                .iter()
                .map(|l| (l.id, l.title.clone()))
                .collect(),
            ..Self::default()
        }
    }
}

/// Where typed lines are remembered between runs.
pub fn history_path(data_dir: &Path) -> PathBuf {
    data_dir.join("input_history.txt")
}

pub struct TutorEditor {
    editor: Reedline,
    prompt: TutorPrompt,
    /// Prints above the prompt while a read is in progress
    printer: ExternalPrinter<String>,
}

impl TutorEditor {
    pub fn new(config: InputConfig, theme: Theme) -> Result<Self> {
        let history = if let Some(path) = &config.history_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Box::new(FileBackedHistory::with_file(
                config.max_history,
                path.clone(),
            )?)
        } else {
            Box::new(FileBackedHistory::new(config.max_history)?)
        };

        let completer = Box::new(TutorCompleter::new(config.commands, config.lessons));

        let completion_menu = Box::new(
            ColumnarMenu::default()
                .with_name("completion_menu")
                .with_columns(1)
                .with_column_padding(2)
                .with_marker(" > "),
        );

        let printer = ExternalPrinter::default();
        let editor = Reedline::create()
            .with_history(history)
            .with_completer(completer)
            .with_quick_completions(true)
            .with_partial_completions(true)
            .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
            .with_edit_mode(Box::new(Emacs::new(Self::build_keybindings())))
            .with_history_exclusion_prefix(Some(" ".into()))
            .with_external_printer(printer.clone());

        Ok(Self {
            editor,
            prompt: TutorPrompt::new(theme),
            printer,
        })
    }

    fn build_keybindings() -> Keybindings {
        let mut keybindings = default_emacs_keybindings();

        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Edit(vec![EditCommand::Complete]),
                ReedlineEvent::Menu("completion_menu".to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );

        // Typing "/" at once shows the command menu
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Char('/'),
            ReedlineEvent::Multiple(vec![
                ReedlineEvent::Edit(vec![EditCommand::InsertChar('/')]),
                ReedlineEvent::Menu("completion_menu".to_string()),
            ]),
        );

        keybindings.add_binding(KeyModifiers::NONE, KeyCode::Esc, ReedlineEvent::Esc);

        keybindings
    }

    /// Read a line from the user. Blocks the calling thread.
    pub fn read_line(&mut self) -> Result<ReadlineResult> {
        match self.editor.read_line(&self.prompt) {
            Ok(Signal::Success(line)) => Ok(ReadlineResult::Line(line)),
            Ok(Signal::CtrlC) => Ok(ReadlineResult::Interrupt),
            Ok(Signal::CtrlD) => Ok(ReadlineResult::Eof),
            Err(e) => Err(e.into()),
        }
    }

    /// Handle for printing from another thread while `read_line` runs.
    pub fn printer(&self) -> ExternalPrinter<String> {
        self.printer.clone()
    }

    /// Update what the prompt shows.
    pub fn set_prompt(&mut self, theme: Theme, location: &str, status: &str) {
        self.prompt = TutorPrompt::with_context(theme, location, status);
    }
}

/// Result of reading a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadlineResult {
    Line(String),
    /// Ctrl+C
    Interrupt,
    /// Ctrl+D
    Eof,
}
