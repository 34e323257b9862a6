//! Command-line surface
//!
//! With no subcommand tigang opens the interactive study session. The
//! subcommands either jump straight into a screen of that session or do
//! one job and exit, which makes them usable from scripts.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::api::{GeminiClient, GenerativeClient};
use crate::app::{self, App, Entry};
use crate::chat::ChatSession;
use crate::config::Config;
use crate::content::Catalogue;
use crate::errors::{ApiError, ContentError};
use crate::history::ExamHistory;
use crate::observability::telemetry::init_tracing;
use crate::prefs::{self, Theme};
use crate::storage::LocalStore;
use crate::tutor::Tutor;
use crate::ui::render;
use crate::ui::spinner::{self, TerminalSpinner};
use crate::ui::style::{self, TutorStyle};
use crate::ui::theme;

#[derive(Parser, Debug)]
#[command(name = "tigang")]
#[command(about = "八年级历史上册复习助手：背提纲、做测验、问纲哥")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file path
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    /// Directory for the local store and input history
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Color theme for this run (the saved preference is left alone)
    #[arg(long, value_enum, global = true)]
    pub theme: Option<Theme>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// No spinners or banners
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every lesson grouped by unit
    Lessons {
        #[arg(long)]
        json: bool,
    },

    /// Print a lesson's review outline
    Review {
        /// Lesson id or part of its title
        lesson: String,
    },

    /// Open practice mode for a lesson
    Practice {
        lesson: String,

        /// Start at this question (1-based) instead of the question list
        #[arg(short = 'n', long)]
        question: Option<usize>,
    },

    /// Start a timed exam
    Exam { lesson: String },

    /// Ask the tutor; with a question, answer once and exit
    Ask {
        lesson: String,

        /// Use the whole book as context
        #[arg(long)]
        full: bool,

        question: Option<String>,
    },

    /// Grade one answer and exit
    Grade {
        lesson: String,

        /// Question number within the lesson (1-based)
        question: usize,

        answer: String,

        #[arg(long)]
        json: bool,

        /// Fail with an API error instead of printing a canned reply
        #[arg(long)]
        strict: bool,
    },

    /// Show past exams
    History {
        /// Show one record in full
        #[arg(long, value_name = "ID")]
        show: Option<String>,

        /// Delete every record
        #[arg(long, conflicts_with = "show")]
        clear: bool,

        #[arg(long)]
        json: bool,
    },

    /// Show or change the saved theme
    Theme {
        #[arg(value_enum)]
        value: Option<ThemeChoice>,
    },

    /// Print the effective configuration with keys masked
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeChoice {
    Light,
    Dark,
    Toggle,
}

/// Lesson summary for `lessons --json`
#[derive(Serialize)]
struct LessonEntry<'a> {
    id: u32,
    title: &'a str,
    unit: &'a str,
    questions: usize,
}

/// Everything the subcommands share.
struct Shared {
    config: Config,
    catalogue: Catalogue,
    store: LocalStore,
    theme: Theme,
    quiet: bool,
}

impl Shared {
    fn client(&self) -> Result<Arc<dyn GenerativeClient>, ApiError> {
        Ok(Arc::new(GeminiClient::new(&self.config)?))
    }

    fn tutor(&self) -> Result<Tutor, ApiError> {
        Ok(Tutor::new(self.client()?, &self.config))
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    run_with(cli).await
}

pub async fn run_with(cli: Cli) -> Result<()> {
    init_tracing(cli.verbose);

    if cli.no_color || std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }
    if std::env::var("TERM").is_ok_and(|t| t == "dumb") {
        style::set_ascii_mode(true);
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir.clone() {
        config.storage.data_dir = Some(dir);
    }
    config.verbose_mode = cli.verbose;
    config.quiet_mode = cli.quiet;
    spinner::set_animations(config.ui.animations && !cli.quiet);

    let catalogue = match &config.content.lessons_path {
        Some(path) => Catalogue::from_path(path)?,
        None => Catalogue::bundled()?,
    };
    let store = LocalStore::open(&config.data_dir())?;
    let theme = cli
        .theme
        .unwrap_or_else(|| prefs::load(&store, &config.ui.theme));
    theme::set_theme(theme);
    debug!(
        "Data dir {}, theme {}, {} lessons",
        config.data_dir().display(),
        theme,
        catalogue.lessons().len()
    );

    let ctx = Shared {
        config,
        catalogue,
        store,
        theme,
        quiet: cli.quiet,
    };

    match cli.command {
        None => interactive(ctx, Entry::Home).await,
        Some(Commands::Lessons { json }) => lessons(&ctx, json),
        Some(Commands::Review { lesson }) => {
            let lesson = ctx.catalogue.select(&lesson)?;
            print!("{}", render::review(lesson));
            Ok(())
        }
        Some(Commands::Practice { lesson, question }) => {
            let lesson = ctx.catalogue.select(&lesson)?;
            let question = match question {
                Some(n) => Some(question_index(lesson.id, lesson.qa.len(), n)?),
                None => None,
            };
            let entry = Entry::Practice {
                lesson: lesson.id,
                question,
            };
            interactive(ctx, entry).await
        }
        Some(Commands::Exam { lesson }) => {
            let id = ctx.catalogue.select(&lesson)?.id;
            interactive(ctx, Entry::Exam(id)).await
        }
        Some(Commands::Ask {
            lesson,
            full,
            question,
        }) => {
            let id = ctx.catalogue.select(&lesson)?.id;
            match question {
                Some(q) => ask_once(&ctx, id, full, &q).await,
                None => interactive(ctx, Entry::Ask { lesson: id, full }).await,
            }
        }
        Some(Commands::Grade {
            lesson,
            question,
            answer,
            json,
            strict,
        }) => grade(&ctx, &lesson, question, &answer, json, strict).await,
        Some(Commands::History { show, clear, json }) => history(ctx, show, clear, json),
        Some(Commands::Theme { value }) => theme_command(ctx, value),
        Some(Commands::Config) => {
            let text = toml::to_string_pretty(&ctx.config.redacted())
                .context("Failed to serialize config")?;
            print!("{}", text);
            Ok(())
        }
    }
}

/// 1-based question number to an index, rejecting numbers past the end.
fn question_index(lesson: u32, len: usize, number: usize) -> Result<usize, ContentError> {
    if number == 0 || number > len {
        return Err(ContentError::QuestionNotFound {
            lesson,
            question: number,
        });
    }
    Ok(number - 1)
}

async fn interactive(ctx: Shared, entry: Entry) -> Result<()> {
    let data_dir = ctx.config.data_dir();
    let client = ctx.client()?;
    if !client.has_keys() && !ctx.quiet {
        eprintln!(
            "{}",
            "No API key configured: grading and chat will answer with a canned reply. \
             Set TIGANG_API_KEY to enable them."
                .caution()
        );
    }
    let app = App::new(ctx.config, ctx.catalogue, ctx.store, client, ctx.theme);
    app::run(app, entry, &data_dir).await
}

fn lessons(ctx: &Shared, json: bool) -> Result<()> {
    if json {
        let entries: Vec<LessonEntry> = ctx
            .catalogue
            .lessons()
            .iter()
            .map(|l| LessonEntry {
                id: l.id,
                title: &l.title,
                unit: &l.unit,
                questions: l.qa.len(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print!("{}", render::lesson_list(&ctx.catalogue));
    }
    Ok(())
}

async fn ask_once(ctx: &Shared, lesson: u32, full: bool, question: &str) -> Result<()> {
    let tutor = ctx.tutor()?;
    let lesson = ctx.catalogue.require(lesson)?;
    let mut session = ChatSession::new(lesson, full);

    let spinner = (!ctx.quiet).then(|| TerminalSpinner::start("纲哥思考中..."));
    let reply = session.send(&tutor, &ctx.catalogue, question).await?;
    if let Some(spinner) = spinner {
        spinner.stop_success("纲哥回答了");
    }

    if let Some(message) = reply.and(session.messages().last()) {
        println!("{}", render::chat_message(message, 80));
    }
    Ok(())
}

async fn grade(
    ctx: &Shared,
    lesson: &str,
    question: usize,
    answer: &str,
    json: bool,
    strict: bool,
) -> Result<()> {
    let lesson = ctx.catalogue.select(lesson)?;
    let index = question_index(lesson.id, lesson.qa.len(), question)?;
    let qa = &lesson.qa[index];
    let tutor = ctx.tutor()?;

    if strict && !tutor.has_keys() {
        return Err(ApiError::MissingKey.into());
    }

    let spinner = (!ctx.quiet && !json).then(|| TerminalSpinner::start("纲哥批改中..."));
    // a blank answer never reaches the API, strict or not
    let result = if strict && !answer.trim().is_empty() {
        tutor.try_grade(&qa.question, answer, &qa.answer).await
    } else {
        Ok(tutor.grade_answer(&qa.question, answer, &qa.answer).await)
    };
    let result = match (result, spinner) {
        (Ok(r), Some(s)) => {
            s.stop_success("批改完成");
            r
        }
        (Ok(r), None) => r,
        (Err(e), Some(s)) => {
            s.stop_error("批改失败");
            return Err(e.into());
        }
        (Err(e), None) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", qa.question.as_str().title());
        print!("{}", render::grading(&result, &qa.answer));
    }
    Ok(())
}

fn history(mut ctx: Shared, show: Option<String>, clear: bool, json: bool) -> Result<()> {
    let mut history = ExamHistory::load(&ctx.store);

    if clear {
        let count = history.list().len();
        history.clear(&mut ctx.store)?;
        if !ctx.quiet {
            println!("已清空 {} 条考试记录。", count);
        }
        return Ok(());
    }

    if let Some(id) = show {
        let record = history.require(&id)?;
        if json {
            println!("{}", serde_json::to_string_pretty(record)?);
        } else {
            print!(
                "{}",
                render::exam_review(&record.summary(), &record.results, Some(record))
            );
        }
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(history.list())?);
    } else {
        print!("{}", render::history_list(history.list()));
        for record in history.list() {
            debug!("record {} -> {}", record.id, record.lesson_title);
        }
    }
    Ok(())
}

fn theme_command(mut ctx: Shared, value: Option<ThemeChoice>) -> Result<()> {
    let saved = prefs::load(&ctx.store, &ctx.config.ui.theme);
    let next = match value {
        None => saved,
        Some(ThemeChoice::Toggle) => prefs::toggle(&mut ctx.store, saved)?,
        Some(ThemeChoice::Light) => {
            prefs::save(&mut ctx.store, Theme::Light)?;
            Theme::Light
        }
        Some(ThemeChoice::Dark) => {
            prefs::save(&mut ctx.store, Theme::Dark)?;
            Theme::Dark
        }
    };
    println!("{}", next);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tigang",
            "review",
            "1",
            "--no-color",
            "--theme",
            "dark",
            "-v",
        ])
        .unwrap();
        assert!(cli.no_color);
        assert!(cli.verbose);
        assert_eq!(cli.theme, Some(Theme::Dark));
        assert!(matches!(cli.command, Some(Commands::Review { ref lesson }) if lesson == "1"));
    }

    #[test]
    fn test_cli_no_subcommand_is_interactive() {
        let cli = Cli::try_parse_from(["tigang"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_grade_arguments() {
        let cli =
            Cli::try_parse_from(["tigang", "grade", "鸦片", "2", "1839年销烟", "--json"]).unwrap();
        match cli.command {
            Some(Commands::Grade {
                lesson,
                question,
                answer,
                json,
                strict,
            }) => {
                assert_eq!(lesson, "鸦片");
                assert_eq!(question, 2);
                assert_eq!(answer, "1839年销烟");
                assert!(json);
                assert!(!strict);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_history_show_conflicts_with_clear() {
        let result = Cli::try_parse_from(["tigang", "history", "--show", "1", "--clear"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_theme_choice() {
        let cli = Cli::try_parse_from(["tigang", "theme", "toggle"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Theme {
                value: Some(ThemeChoice::Toggle)
            })
        ));
    }

    #[test]
    fn test_question_index_bounds() {
        assert_eq!(question_index(1, 4, 1).unwrap(), 0);
        assert_eq!(question_index(1, 4, 4).unwrap(), 3);
        assert!(question_index(1, 4, 0).is_err());
        assert!(matches!(
            question_index(1, 4, 5),
            Err(ContentError::QuestionNotFound {
                lesson: 1,
                question: 5
            })
        ));
    }

    #[test]
    fn test_question_index_reports_huge_number_unchanged() {
        let err = question_index(1, 4, usize::MAX).unwrap_err();
        assert!(matches!(
            err,
            ContentError::QuestionNotFound {
                lesson: 1,
                question: usize::MAX
            }
        ));
        assert!(err.to_string().contains(&usize::MAX.to_string()));
    }
}
