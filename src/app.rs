//! Interactive study session
//!
//! `App` owns everything a session touches and turns one line of input at
//! a time into state changes and printed screens. The terminal loop in
//! [`run`] feeds it lines from the editor and races the read against the
//! exam deadline.

use anyhow::Result;
use reedline::ExternalPrinter;
use std::io::{IsTerminal, Write};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::GenerativeClient;
use crate::chat::ChatSession;
use crate::config::Config;
use crate::content::{unit_label, Catalogue, Lesson};
use crate::history::ExamHistory;
use crate::input::command_registry::{self, SlashCommand};
use crate::input::{InputConfig, ReadlineResult, TutorEditor};
use crate::nav::{Navigator, ViewMode};
use crate::prefs::{self, Theme};
use crate::quiz::{format_time, QuizMode, QuizSession, SubmitOutcome};
use crate::storage::LocalStore;
use crate::tutor::Tutor;
use crate::ui::render;
use crate::ui::spinner::TerminalSpinner;
use crate::ui::style::TutorStyle;
use crate::ui::theme;

/// Screen the session opens on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Home,
    Review(u32),
    Practice { lesson: u32, question: Option<usize> },
    Exam(u32),
    Ask { lesson: u32, full: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    config: Config,
    catalogue: Catalogue,
    store: LocalStore,
    history: ExamHistory,
    theme: Theme,
    nav: Navigator,
    /// Lives only while the quiz view is open
    quiz: Option<QuizSession>,
    /// Lives only while the deep-dive view is open
    chat: Option<ChatSession>,
    tutor: Tutor,
    /// Next answer input to fill for the current question
    slot: usize,
}

impl App {
    pub fn new(
        config: Config,
        catalogue: Catalogue,
        store: LocalStore,
        client: Arc<dyn GenerativeClient>,
        theme: Theme,
    ) -> Self {
        let history = ExamHistory::load(&store);
        let nav = Navigator::new(&catalogue);
        let tutor = Tutor::new(client, &config);
        Self {
            config,
            catalogue,
            store,
            history,
            theme,
            nav,
            quiz: None,
            chat: None,
            tutor,
            slot: 0,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn view(&self) -> ViewMode {
        self.nav.view()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn quiz(&self) -> Option<&QuizSession> {
        self.quiz.as_ref()
    }

    pub fn chat(&self) -> Option<&ChatSession> {
        self.chat.as_ref()
    }

    pub fn history(&self) -> &ExamHistory {
        &self.history
    }

    fn active_lesson(&self) -> Option<&Lesson> {
        self.nav
            .active_lesson()
            .and_then(|id| self.catalogue.lesson(id))
    }

    /// Open the entry screen and print it.
    pub fn enter(&mut self, entry: Entry, out: &mut dyn Write) -> Result<()> {
        match entry {
            Entry::Home => {}
            Entry::Review(id) => self.nav.select_lesson(&self.catalogue, id)?,
            Entry::Practice { lesson, question } => {
                self.nav.select_lesson(&self.catalogue, lesson)?;
                self.open_view(ViewMode::Quiz)?;
                if let Some(quiz) = self.quiz.as_mut() {
                    match question {
                        Some(index) => quiz.start_practice_at(index)?,
                        None => quiz.open_practice_list(),
                    }
                }
            }
            Entry::Exam(lesson) => {
                self.nav.select_lesson(&self.catalogue, lesson)?;
                self.open_view(ViewMode::Quiz)?;
                if let Some(quiz) = self.quiz.as_mut() {
                    quiz.start_exam();
                }
            }
            Entry::Ask { lesson, full } => {
                self.nav.select_lesson(&self.catalogue, lesson)?;
                self.open_view(ViewMode::DeepDive)?;
                if let Some(chat) = self.chat.as_mut() {
                    chat.set_full_context(full);
                }
            }
        }
        self.render_screen(out)
    }

    /// Switch views. Quiz and chat state is dropped on leaving its view.
    fn open_view(&mut self, view: ViewMode) -> Result<()> {
        self.nav.switch_view(view)?;
        self.quiz = None;
        self.chat = None;
        self.slot = 0;
        let seconds = self.config.exam.seconds_per_question;
        let lesson = self.active_lesson().cloned();
        match (view, lesson) {
            (ViewMode::Quiz, Some(lesson)) => self.quiz = Some(QuizSession::new(&lesson, seconds)),
            (ViewMode::DeepDive, Some(lesson)) => {
                self.chat = Some(ChatSession::new(&lesson, false))
            }
            _ => {}
        }
        debug!("View switched to {}", view);
        Ok(())
    }

    fn select_lesson(&mut self, id: u32) -> Result<()> {
        self.nav.select_lesson(&self.catalogue, id)?;
        self.quiz = None;
        self.chat = None;
        self.slot = 0;
        info!("Lesson {} selected", id);
        Ok(())
    }

    /// Print the whole current screen.
    pub fn render_screen(&self, out: &mut dyn Write) -> Result<()> {
        match self.nav.view() {
            ViewMode::Home => {
                writeln!(out, "{}", render::home())?;
                write!(out, "{}", render::sidebar(&self.catalogue, &self.nav))?;
            }
            ViewMode::Review => {
                if let Some(lesson) = self.active_lesson() {
                    write!(out, "{}", render::review(lesson))?;
                }
            }
            ViewMode::Quiz => {
                if let Some(quiz) = &self.quiz {
                    self.render_quiz(quiz, out)?;
                }
            }
            ViewMode::DeepDive => {
                if let (Some(chat), Some(lesson)) = (&self.chat, self.active_lesson()) {
                    writeln!(out, "{}", render::chat_header(lesson, chat.is_full_context()))?;
                    for message in chat.messages() {
                        writeln!(out, "{}", render::chat_message(message, terminal_width()))?;
                    }
                }
            }
        }
        out.flush()?;
        Ok(())
    }

    fn render_quiz(&self, quiz: &QuizSession, out: &mut dyn Write) -> Result<()> {
        match quiz.mode() {
            QuizMode::Select => write!(out, "{}", render::quiz_menu(quiz.lesson()))?,
            QuizMode::PracticeList => write!(out, "{}", render::practice_list(quiz.lesson()))?,
            QuizMode::Practice | QuizMode::Exam => write!(out, "{}", render::question_card(quiz))?,
            QuizMode::ExamResult | QuizMode::HistoryDetail => {
                if let Some(summary) = quiz.summary() {
                    write!(
                        out,
                        "{}",
                        render::exam_review(
                            &summary,
                            quiz.displayed_results(),
                            quiz.selected_record()
                                .filter(|_| quiz.mode() == QuizMode::HistoryDetail)
                        )
                    )?;
                }
                let hint = if quiz.mode() == QuizMode::ExamResult {
                    "回车重新开始"
                } else {
                    "回车返回考试记录"
                };
                writeln!(out, "{}", hint.muted())?;
            }
            QuizMode::History => write!(out, "{}", render::history_list(self.history.list()))?,
        }
        Ok(())
    }

    /// Text for the left side of the prompt.
    pub fn prompt_location(&self) -> String {
        match self.active_lesson() {
            Some(lesson) => format!("{} · {}", lesson.title, self.nav.view().label()),
            None => String::new(),
        }
    }

    /// Text for the right side of the prompt: the exam countdown.
    pub fn prompt_status(&self) -> String {
        self.exam_clock_secs()
            .map(|secs| format!("剩余 {}", format_time(secs)))
            .unwrap_or_default()
    }

    fn exam_clock_secs(&self) -> Option<u64> {
        let quiz = self.quiz.as_ref()?;
        if quiz.mode() != QuizMode::Exam {
            return None;
        }
        quiz.clock().map(|c| c.remaining_secs())
    }

    /// When a running exam runs out of time.
    pub fn exam_deadline(&self) -> Option<Instant> {
        let quiz = self.quiz.as_ref()?;
        if quiz.mode() != QuizMode::Exam {
            return None;
        }
        quiz.clock().map(|c| c.deadline())
    }

    /// Placeholder printed above the prompt while answering.
    pub fn input_hint(&self) -> Option<String> {
        let quiz = self.quiz.as_ref()?;
        if !quiz.mode().is_answering() || quiz.practice_result().is_some() {
            return None;
        }
        let mut hint = render::answer_placeholder(quiz, self.slot);
        if quiz.is_multi_part() {
            hint = format!("{} ({}/{}，空行交卷)", hint, self.slot + 1, quiz.answers().len());
        }
        Some(hint)
    }

    /// Handle one line of input.
    pub async fn handle_line(&mut self, line: &str, out: &mut dyn Write) -> Result<Flow> {
        let input = line.trim();
        let browsing = matches!(self.nav.view(), ViewMode::Home | ViewMode::Review);
        if let Some(command) = command_registry::parse(input, browsing) {
            return self.handle_command(command, out);
        }
        if input.starts_with('/') {
            writeln!(
                out,
                "{}",
                format!("没有 {} 这个命令，输入 /help 看看。", input).caution()
            )?;
            return Ok(Flow::Continue);
        }
        match self.nav.view() {
            ViewMode::Home | ViewMode::Review => self.handle_browse(input, out)?,
            ViewMode::Quiz => self.handle_quiz(input, out).await?,
            ViewMode::DeepDive => self.handle_chat(input, out).await?,
        }
        out.flush()?;
        Ok(Flow::Continue)
    }

    fn handle_command(&mut self, command: SlashCommand, out: &mut dyn Write) -> Result<Flow> {
        match command {
            SlashCommand::Quit => return Ok(Flow::Quit),
            SlashCommand::Help => write!(out, "{}", render::help())?,
            SlashCommand::Home => {
                self.nav.go_home();
                self.quiz = None;
                self.chat = None;
                self.render_screen(out)?;
            }
            SlashCommand::Review | SlashCommand::Quiz | SlashCommand::Ask => {
                let view = match command {
                    SlashCommand::Review => ViewMode::Review,
                    SlashCommand::Quiz => ViewMode::Quiz,
                    _ => ViewMode::DeepDive,
                };
                if self.nav.active_lesson().is_none() {
                    writeln!(out, "{}", "先选一课，输入课号即可。".caution())?;
                    return Ok(Flow::Continue);
                }
                self.open_view(view)?;
                self.render_screen(out)?;
            }
            SlashCommand::Full => match self.chat.as_mut() {
                Some(chat) => {
                    let full = chat.toggle_full_context();
                    info!("Full-book context {}", if full { "on" } else { "off" });
                    self.render_screen(out)?;
                }
                None => writeln!(out, "{}", "/full 只在问纲哥时可用。".muted())?,
            },
            SlashCommand::Theme => {
                self.theme = prefs::toggle(&mut self.store, self.theme)?;
                theme::set_theme(self.theme);
                writeln!(out, "{}", format!("已切换到{}主题", theme_name(self.theme)).muted())?;
            }
            SlashCommand::Back => self.go_back(out)?,
        }
        out.flush()?;
        Ok(Flow::Continue)
    }

    fn go_back(&mut self, out: &mut dyn Write) -> Result<()> {
        let quiz_mode = self.quiz.as_ref().map(|q| q.mode());
        match (self.nav.view(), quiz_mode) {
            (ViewMode::Home, _) => return Ok(()),
            (ViewMode::Quiz, Some(mode)) if mode != QuizMode::Select => {
                if mode == QuizMode::Exam {
                    writeln!(out, "{}", "已退出考试，本次作答不保存。".caution())?;
                }
                if let Some(quiz) = self.quiz.as_mut() {
                    quiz.back();
                }
                self.slot = 0;
            }
            (ViewMode::Quiz, _) | (ViewMode::DeepDive, _) => self.open_view(ViewMode::Review)?,
            (ViewMode::Review, _) => self.nav.go_home(),
        }
        self.render_screen(out)
    }

    /// Home and review: pick a lesson, open a unit, or start.
    fn handle_browse(&mut self, input: &str, out: &mut dyn Write) -> Result<()> {
        if input.is_empty() {
            return Ok(());
        }
        if self.nav.view() == ViewMode::Home && matches!(input, "start" | "开始复习") {
            self.nav.start(&self.catalogue)?;
            return self.render_screen(out);
        }
        let unit = self
            .catalogue
            .units()
            .into_iter()
            .find(|u| *u == input || unit_label(u) == input)
            .map(String::from);
        if let Some(unit) = unit {
            self.nav.toggle_unit(&unit);
            write!(out, "{}", render::sidebar(&self.catalogue, &self.nav))?;
            return Ok(());
        }
        match self.catalogue.find(input).map(|l| l.id) {
            Some(id) => {
                self.select_lesson(id)?;
                self.render_screen(out)
            }
            None => {
                writeln!(
                    out,
                    "{}",
                    format!("找不到“{}”，输入课号或课名试试。", input).caution()
                )?;
                Ok(())
            }
        }
    }

    async fn handle_quiz(&mut self, input: &str, out: &mut dyn Write) -> Result<()> {
        if self.finish_if_expired(out)? {
            return Ok(());
        }
        let Some(quiz) = self.quiz.as_mut() else {
            return Ok(());
        };
        match quiz.mode() {
            QuizMode::Select => {
                match input {
                    "1" | "模拟考试" => {
                        quiz.start_exam();
                        self.slot = 0;
                    }
                    "2" | "专项训练" => quiz.open_practice_list(),
                    "3" | "考试记录" => quiz.open_history(),
                    _ => {
                        writeln!(out, "{}", "输入 1、2 或 3 选择模式。".muted())?;
                        return Ok(());
                    }
                }
                self.render_screen(out)
            }
            QuizMode::PracticeList => {
                let total = quiz.lesson().qa.len();
                match input.parse::<usize>() {
                    Ok(n) if (1..=total).contains(&n) => {
                        quiz.start_practice_at(n - 1)?;
                        self.slot = 0;
                        self.render_screen(out)
                    }
                    _ => {
                        writeln!(out, "{}", format!("输入 1 到 {} 的题号。", total).muted())?;
                        Ok(())
                    }
                }
            }
            QuizMode::Practice if quiz.practice_result().is_some() => {
                if matches!(input, "" | "n" | "next" | "下一题") {
                    quiz.next_practice()?;
                    self.slot = 0;
                    self.render_screen(out)
                } else {
                    writeln!(
                        out,
                        "{}",
                        "回车进入下一题，/back 回到题目列表。".muted()
                    )?;
                    Ok(())
                }
            }
            QuizMode::Practice | QuizMode::Exam => self.collect_answer(input, out).await,
            QuizMode::ExamResult => {
                if matches!(input, "" | "重新开始") {
                    quiz.back();
                    self.slot = 0;
                    self.render_screen(out)?;
                }
                Ok(())
            }
            QuizMode::History => {
                let picked = input
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| self.history.list().get(i))
                    .cloned();
                match picked {
                    Some(record) => {
                        quiz.open_history_detail(record);
                        self.render_screen(out)
                    }
                    None if self.history.is_empty() => Ok(()),
                    None => {
                        writeln!(out, "{}", "输入记录前面的序号查看详情。".muted())?;
                        Ok(())
                    }
                }
            }
            QuizMode::HistoryDetail => {
                if input.is_empty() {
                    quiz.back();
                    self.render_screen(out)?;
                }
                Ok(())
            }
        }
    }

    /// Fill the next answer input; submit once every input is filled or
    /// on an empty line.
    async fn collect_answer(&mut self, input: &str, out: &mut dyn Write) -> Result<()> {
        let Some(quiz) = self.quiz.as_mut() else {
            return Ok(());
        };
        if !input.is_empty() {
            quiz.set_answer(self.slot, input)?;
            self.slot += 1;
            if self.slot < quiz.answers().len() {
                return Ok(());
            }
        } else if !quiz.can_submit() {
            writeln!(out, "{}", "还没作答呢。".muted())?;
            return Ok(());
        }
        self.submit(out).await
    }

    async fn submit(&mut self, out: &mut dyn Write) -> Result<()> {
        let Self {
            quiz,
            tutor,
            history,
            store,
            slot,
            ..
        } = self;
        let Some(quiz) = quiz.as_mut() else {
            return Ok(());
        };

        let spinner = TerminalSpinner::start("纲哥批改中...");
        let outcome = quiz.submit(tutor, history, store).await;
        *slot = 0;
        let outcome = match outcome {
            Ok(outcome) => {
                spinner.stop_success("批改完成");
                outcome
            }
            Err(e) => {
                spinner.stop_error("批改失败");
                return Err(e.into());
            }
        };

        match outcome {
            None => {}
            Some(SubmitOutcome::Practice(grading)) => {
                let reference = quiz
                    .current_question()
                    .map(|qa| qa.answer.clone())
                    .unwrap_or_default();
                write!(out, "{}", render::grading(&grading, &reference))?;
                writeln!(out, "{}", "回车进入下一题".muted())?;
            }
            Some(SubmitOutcome::ExamAnswered { next_index, .. }) => {
                debug!("Exam moved to question {}", next_index + 1);
                self.render_screen(out)?;
            }
            Some(SubmitOutcome::ExamFinished(record)) => {
                info!("Exam finished with {} points", record.total_score);
                self.render_screen(out)?;
            }
        }
        Ok(())
    }

    /// Finish the exam if its time ran out. Returns whether it did.
    fn finish_if_expired(&mut self, out: &mut dyn Write) -> Result<bool> {
        let Some(quiz) = self.quiz.as_mut() else {
            return Ok(false);
        };
        if !quiz.expire_if_due(&mut self.history, &mut self.store)? {
            return Ok(false);
        }
        self.slot = 0;
        writeln!(out, "{}", "时间到！自动交卷。".wrong())?;
        self.render_screen(out)?;
        Ok(true)
    }

    /// The exam deadline passed while waiting for input.
    pub fn handle_deadline(&mut self, out: &mut dyn Write) -> Result<()> {
        self.finish_if_expired(out)?;
        Ok(())
    }

    async fn handle_chat(&mut self, input: &str, out: &mut dyn Write) -> Result<()> {
        let Some(chat) = self.chat.as_mut() else {
            return Ok(());
        };
        if input.is_empty() {
            return Ok(());
        }
        let spinner = TerminalSpinner::start("纲哥思考中...");
        let reply = chat.send(&self.tutor, &self.catalogue, input).await;
        match reply {
            Ok(Some(_)) => spinner.stop_success("纲哥回答了"),
            Ok(None) => return Ok(()),
            Err(e) => {
                spinner.stop_error("出错了");
                return Err(e.into());
            }
        }
        if let Some(message) = chat.messages().last() {
            writeln!(out, "{}", render::chat_message(message, terminal_width()))?;
        }
        Ok(())
    }
}

fn theme_name(theme: Theme) -> &'static str {
    match theme {
        Theme::Light => "浅色",
        Theme::Dark => "深色",
    }
}

/// Columns available for wrapped text.
fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.parse::<usize>().ok())
        .unwrap_or(80)
        .clamp(20, 100)
}

/// One input event for the loop
#[derive(Debug, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    Interrupt,
    Eof,
    /// The exam deadline passed before a line arrived
    Deadline,
}

type PendingRead = JoinHandle<(TutorEditor, Result<ReadlineResult>)>;

enum Backend {
    /// `None` while a read is running on the blocking pool
    Editor(Option<TutorEditor>),
    Basic {
        lines: Lines<BufReader<Stdin>>,
        tty: bool,
    },
}

/// Reads lines from the terminal without blocking the runtime, so the
/// exam deadline can fire while the student is typing.
pub struct LineReader {
    backend: Backend,
    /// A read that outlived a deadline is resumed on the next call
    pending: Option<PendingRead>,
    printer: Option<ExternalPrinter<String>>,
}

impl LineReader {
    pub fn new(config: InputConfig, theme: Theme) -> Self {
        if !std::io::stdin().is_terminal() {
            return Self::basic();
        }
        match TutorEditor::new(config, theme) {
            Ok(editor) => Self {
                printer: Some(editor.printer()),
                backend: Backend::Editor(Some(editor)),
                pending: None,
            },
            Err(e) => {
                eprintln!("Note: line editing unavailable ({}), using basic input", e);
                Self::basic()
            }
        }
    }

    fn basic() -> Self {
        Self {
            backend: Backend::Basic {
                lines: BufReader::new(tokio::io::stdin()).lines(),
                tty: std::io::stdin().is_terminal(),
            },
            pending: None,
            printer: None,
        }
    }

    /// The editor's printer while it holds the terminal for a read.
    fn live_printer(&self) -> Option<&ExternalPrinter<String>> {
        self.pending.as_ref().and(self.printer.as_ref())
    }

    pub async fn next(
        &mut self,
        theme: Theme,
        location: &str,
        status: &str,
        deadline: Option<Instant>,
    ) -> Result<InputEvent> {
        match &mut self.backend {
            Backend::Editor(slot) => {
                if self.pending.is_none() {
                    let Some(mut editor) = slot.take() else {
                        anyhow::bail!("line editor lost after a failed read");
                    };
                    editor.set_prompt(theme, location, status);
                    self.pending = Some(tokio::task::spawn_blocking(move || {
                        let result = editor.read_line();
                        (editor, result)
                    }));
                }
                let Some(handle) = self.pending.as_mut() else {
                    return Ok(InputEvent::Eof);
                };
                let joined = match deadline {
                    Some(at) => {
                        tokio::select! {
                            joined = handle => joined,
                            _ = tokio::time::sleep_until(tokio::time::Instant::from_std(at)) => {
                                return Ok(InputEvent::Deadline);
                            }
                        }
                    }
                    None => handle.await,
                };
                self.pending = None;
                let (editor, result) = joined?;
                *slot = Some(editor);
                Ok(match result? {
                    ReadlineResult::Line(line) => InputEvent::Line(line),
                    ReadlineResult::Interrupt => InputEvent::Interrupt,
                    ReadlineResult::Eof => InputEvent::Eof,
                })
            }
            Backend::Basic { lines, tty } => {
                if *tty {
                    let mut stdout = std::io::stdout();
                    if status.is_empty() {
                        write!(stdout, "{} ❯ ", location)?;
                    } else {
                        write!(stdout, "{} [{}] ❯ ", location, status)?;
                    }
                    stdout.flush()?;
                }
                let next = match deadline {
                    Some(at) => {
                        tokio::select! {
                            next = lines.next_line() => next,
                            _ = tokio::time::sleep_until(tokio::time::Instant::from_std(at)) => {
                                return Ok(InputEvent::Deadline);
                            }
                        }
                    }
                    None => lines.next_line().await,
                };
                Ok(match next? {
                    Some(line) => InputEvent::Line(line),
                    None => InputEvent::Eof,
                })
            }
        }
    }

    /// Print screen output, routing it through the line editor when a read
    /// is still running so the terminal stays in a consistent state.
    fn show(&self, text: &[u8], out: &mut dyn Write) -> Result<()> {
        show_output(self.live_printer(), text, out)
    }

    /// Give up on the line editor after repeated failures.
    fn fall_back(&mut self) {
        *self = Self::basic();
    }
}

fn show_output(
    printer: Option<&ExternalPrinter<String>>,
    text: &[u8],
    out: &mut dyn Write,
) -> Result<()> {
    match printer {
        Some(printer) => {
            let text = String::from_utf8_lossy(text).trim_end().to_string();
            if !text.is_empty() {
                printer
                    .print(text)
                    .map_err(|e| anyhow::anyhow!("line editor stopped printing: {}", e))?;
            }
        }
        None => {
            out.write_all(text)?;
            out.flush()?;
        }
    }
    Ok(())
}

/// Run the interactive loop until the student quits.
pub async fn run(mut app: App, entry: Entry, data_dir: &std::path::Path) -> Result<()> {
    let mut stdout = std::io::stdout();
    app.enter(entry, &mut stdout)?;
    writeln!(
        stdout,
        "{}",
        "输入 /help 查看命令，/quit 退出。".muted()
    )?;

    let input_config = InputConfig::for_catalogue(&app.catalogue, data_dir);
    let mut reader = LineReader::new(input_config, app.theme());

    let mut consecutive_errors = 0;
    const MAX_CONSECUTIVE_ERRORS: u32 = 3;

    loop {
        if crate::is_shutdown_requested() {
            break;
        }
        if reader.pending.is_none() {
            if let Some(hint) = app.input_hint() {
                writeln!(stdout, "{}", hint.muted())?;
            }
        }

        let event = reader
            .next(
                app.theme(),
                &app.prompt_location(),
                &app.prompt_status(),
                app.exam_deadline(),
            )
            .await;

        match event {
            Ok(InputEvent::Line(line)) => {
                consecutive_errors = 0;
                match app.handle_line(&line, &mut stdout).await {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(e) => {
                        warn!("Input handling failed: {:#}", e);
                        writeln!(stdout, "{}", format!("出错了：{}", e).wrong())?;
                    }
                }
            }
            Ok(InputEvent::Interrupt) => {
                consecutive_errors = 0;
                writeln!(stdout, "{}", "输入 /quit 或按 Ctrl+D 退出。".caution())?;
            }
            Ok(InputEvent::Eof) => break,
            Ok(InputEvent::Deadline) => {
                let mut screen = Vec::new();
                app.handle_deadline(&mut screen)?;
                reader.show(&screen, &mut stdout)?;
            }
            Err(e) => {
                consecutive_errors += 1;
                if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                    eprintln!("Terminal input unavailable, falling back to basic input...");
                    reader.fall_back();
                    consecutive_errors = 0;
                    continue;
                }
                eprintln!("Input error: {}", e);
            }
        }
    }

    writeln!(stdout, "{}", "下次见，记得常回来复习！".tutor_voice())?;
    Ok(())
}
