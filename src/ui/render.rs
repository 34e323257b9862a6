//! Screen renderers
//!
//! Every function builds a `String` for the caller to print, so the same
//! output serves the interactive app, the one-shot commands and tests.

use colored::Colorize;
use std::fmt::Write;

use super::markdown::render_markdown;
use super::style::{average_badge, score_badge, Glyphs, TutorStyle};
use crate::chat::{ChatMessage, Role};
use crate::content::{format_answer_lines, split_points, unit_label, Catalogue, Lesson};
use crate::input::command_registry;
use crate::history::{ExamQuestionResult, ExamRecord, ExamSummary, GradingResult};
use crate::nav::Navigator;
use crate::quiz::{format_time, QuizMode, QuizSession};

fn rule(width: usize) -> String {
    Glyphs::rule().repeat(width).muted().to_string()
}

pub fn home() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {} {}", Glyphs::book(), "八年级历史上册复习助手".muted());
    let _ = writeln!(out, "  {} {}", "History".body().bold(), "Master".title());
    let _ = writeln!(out, "  {}", "精准考点 • 智能批改 • 深度问答".muted());
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  输入 {} 开始复习，或输入课号直接打开一课。",
        "start".emphasis()
    );
    out
}

/// Sidebar: units as an accordion, lessons listed under the open unit.
pub fn sidebar(catalogue: &Catalogue, nav: &Navigator) -> String {
    let mut out = String::new();
    for (unit, lessons) in catalogue.grouped() {
        let open = nav.is_expanded(unit);
        let glyph = if open {
            Glyphs::expanded()
        } else {
            Glyphs::collapsed()
        };
        let _ = writeln!(out, "{} {}", glyph.muted(), unit_label(unit).title());
        if !open {
            continue;
        }
        for lesson in lessons {
            let line = format!("{:>4}  {}", lesson.id, lesson.title);
            if nav.active_lesson() == Some(lesson.id) {
                let _ = writeln!(out, "{}", line.emphasis().bold());
            } else {
                let _ = writeln!(out, "{}", line.body());
            }
        }
    }
    out
}

/// Every lesson under its full unit name.
pub fn lesson_list(catalogue: &Catalogue) -> String {
    let mut out = String::new();
    for (unit, lessons) in catalogue.grouped() {
        let _ = writeln!(out, "{}", unit.title());
        for lesson in lessons {
            let _ = writeln!(
                out,
                "{:>4}  {}  {}",
                lesson.id,
                lesson.title.as_str().body(),
                format!("({} 个考点)", lesson.qa.len()).muted()
            );
        }
    }
    out
}

pub fn review(lesson: &Lesson) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", lesson.title.as_str().title());
    let _ = writeln!(
        out,
        "{}",
        format!("复习提纲 • 共 {} 个考点", lesson.qa.len()).muted()
    );
    for (i, qa) in lesson.qa.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} {}",
            format!("{:02}", i + 1).marker(),
            qa.question.as_str().body().bold()
        );
        for line in format_answer_lines(&qa.answer) {
            let _ = writeln!(out, "    {}", line.body());
        }
    }
    out
}

pub fn quiz_menu(lesson: &Lesson) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  {}", "选择答题模式".title(), lesson.title.as_str().muted());
    let _ = writeln!(
        out,
        "  {} {}  {}",
        "1".marker(),
        "模拟考试".body().bold(),
        "全真模拟，限时答题，考试结束后显示详细复盘".muted()
    );
    let _ = writeln!(
        out,
        "  {} {}  {}",
        "2".marker(),
        "专项训练".body().bold(),
        "选择题目，逐个击破，纲哥详细解析每一题".muted()
    );
    let _ = writeln!(
        out,
        "  {} {}  {}",
        "3".marker(),
        "考试记录".body().bold(),
        "查看历史考试成绩，回顾点评与错题".muted()
    );
    out
}

pub fn practice_list(lesson: &Lesson) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "专项训练 - 选择题目".title());
    for (i, qa) in lesson.qa.iter().enumerate() {
        let _ = writeln!(out, "  {} {}", format!("{:>2}.", i + 1).marker(), qa.question.as_str().body());
    }
    out
}

/// Header and question text for the current practice or exam question.
pub fn question_card(quiz: &QuizSession) -> String {
    let mut out = String::new();
    let label = if quiz.mode() == QuizMode::Exam {
        "考试中"
    } else {
        "专项训练"
    };
    let mut header = format!(
        "{} • {} / {}",
        label,
        quiz.index() + 1,
        quiz.lesson().qa.len()
    );
    if let Some(clock) = quiz.clock() {
        let left = clock.remaining_secs();
        let time = format!("{} {}", Glyphs::clock(), format_time(left));
        // last minute shows in red
        let time = if left <= 60 {
            time.wrong().to_string()
        } else {
            time.caution().to_string()
        };
        header = format!("{}   {}", header, time);
    }
    let _ = writeln!(out, "{}", header.muted());
    if let Some(qa) = quiz.current_question() {
        let _ = writeln!(out, "{}", qa.question.as_str().title());
    }
    if quiz.is_multi_part() {
        let _ = writeln!(
            out,
            "{}",
            format!("本题共 {} 个要点，逐条输入。", quiz.answers().len()).muted()
        );
    }
    out
}

/// Input prompt label for answer slot `slot`.
pub fn answer_placeholder(quiz: &QuizSession, slot: usize) -> String {
    if quiz.is_multi_part() {
        format!("输入第 {} 点内容", slot + 1)
    } else {
        "在此输入你的回答".to_string()
    }
}

fn reference_lines(out: &mut String, answer: &str) {
    for part in split_points(answer) {
        let part = part.trim();
        if !part.is_empty() {
            let _ = writeln!(out, "    {}", part.body());
        }
    }
}

/// Practice verdict: score, feedback, then the reference answer.
pub fn grading(result: &GradingResult, reference: &str) -> String {
    let mut out = String::new();
    let verdict = if result.is_correct {
        format!("{} 得分: {}", Glyphs::check(), result.score).correct()
    } else {
        format!("{} 得分: {}", Glyphs::cross(), result.score).wrong()
    };
    let _ = writeln!(out, "{}", verdict);
    let _ = writeln!(out, "{}", "纲哥点评".title());
    let _ = writeln!(out, "    {}", result.feedback.as_str().tutor_voice());
    let _ = writeln!(out, "{}", "标准答案".muted());
    reference_lines(&mut out, reference);
    out
}

fn result_card(out: &mut String, idx: usize, res: &ExamQuestionResult) {
    let _ = writeln!(
        out,
        "{} {}  {}",
        format!("{}.", idx + 1).marker(),
        res.question_text.as_str().body().bold(),
        score_badge(res.grading.score, res.grading.is_correct)
    );
    let _ = writeln!(out, "  {}", "你的回答".muted());
    for line in res.user_answer.lines() {
        let _ = writeln!(out, "    {}", line.body());
    }
    let _ = writeln!(out, "  {}", "纲哥点评".emphasis());
    let _ = writeln!(out, "    {}", res.grading.feedback.as_str().tutor_voice());
    let _ = writeln!(out, "  {}", "标准答案".muted());
    reference_lines(out, &res.correct_answer);
}

/// Exam review: used both right after an exam and for a past record.
pub fn exam_review(
    summary: &ExamSummary,
    results: &[ExamQuestionResult],
    record: Option<&ExamRecord>,
) -> String {
    let mut out = String::new();
    let heading = if record.is_some() {
        "历史成绩回顾"
    } else {
        "考试复盘"
    };
    let _ = writeln!(out, "{} {}", Glyphs::trophy(), heading.title());
    if let Some(r) = record {
        let _ = writeln!(out, "{}", format!("{}  {}", r.lesson_title, r.display_date()).muted());
    }
    let _ = writeln!(
        out,
        "{} {}    {} {}%",
        "平均分".muted(),
        summary.average.to_string().emphasis().bold(),
        "正确率".muted(),
        summary.accuracy_percent().to_string().correct()
    );
    let _ = writeln!(out, "{}", rule(40));
    for (i, res) in results.iter().enumerate() {
        result_card(&mut out, i, res);
        let _ = writeln!(out);
    }
    out
}

pub fn history_list(records: &[ExamRecord]) -> String {
    if records.is_empty() {
        return format!(
            "{}\n",
            "暂无考试记录，快去“模拟考试”挑战一下吧！".muted()
        );
    }
    let mut out = String::new();
    let _ = writeln!(out, "{}", "考试记录".title());
    for (i, record) in records.iter().enumerate() {
        let summary = record.summary();
        let _ = writeln!(
            out,
            "  {} {}  {}  {} {}  {} {}",
            format!("{:>2}.", i + 1).marker(),
            record.lesson_title.as_str().body().bold(),
            record.display_date().muted(),
            average_badge(summary.average, summary.passes()),
            "平均分".muted(),
            record.total_questions.to_string().body(),
            "题".muted()
        );
    }
    out
}

pub fn chat_message(message: &ChatMessage, width: usize) -> String {
    match message.role {
        Role::User => format!("{} {}", "你:".muted(), message.text.as_str().body()),
        Role::Model => format!(
            "{} {}\n{}",
            Glyphs::chat(),
            "纲哥".title(),
            render_markdown(&message.text, width)
        ),
    }
}

pub fn chat_header(lesson: &Lesson, full_context: bool) -> String {
    let scope = if full_context {
        "全书模式".caution().to_string()
    } else {
        lesson.title.as_str().emphasis().to_string()
    };
    format!("{} {}  {}", "问纲哥".title(), scope, "(/full 切换全书)".muted())
}

pub fn help() -> String {
    let mut out = String::new();
    for cmd in command_registry::COMMANDS {
        let _ = writeln!(out, "  {:<8} {}", cmd.name.emphasis(), cmd.description.muted());
    }
    out
}
