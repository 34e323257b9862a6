//! Slash commands available everywhere in the interactive app.
//!
//! The completer, the help screen and the app's dispatcher all read from
//! this table.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashCommand {
    Home,
    Review,
    Quiz,
    Ask,
    Full,
    Theme,
    Back,
    Help,
    Quit,
}

#[derive(Debug, Clone)]
pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub command: SlashCommand,
}

pub static COMMANDS: &[CommandEntry] = &[
    CommandEntry {
        name: "/home",
        description: "回到首页",
        command: SlashCommand::Home,
    },
    CommandEntry {
        name: "/review",
        description: "复习提纲",
        command: SlashCommand::Review,
    },
    CommandEntry {
        name: "/quiz",
        description: "测验：模拟考试 / 专项训练 / 考试记录",
        command: SlashCommand::Quiz,
    },
    CommandEntry {
        name: "/ask",
        description: "问纲哥",
        command: SlashCommand::Ask,
    },
    CommandEntry {
        name: "/full",
        description: "问答时切换本课 / 全书",
        command: SlashCommand::Full,
    },
    CommandEntry {
        name: "/theme",
        description: "切换明暗主题",
        command: SlashCommand::Theme,
    },
    CommandEntry {
        name: "/back",
        description: "返回上一级",
        command: SlashCommand::Back,
    },
    CommandEntry {
        name: "/help",
        description: "显示命令列表",
        command: SlashCommand::Help,
    },
    CommandEntry {
        name: "/quit",
        description: "退出",
        command: SlashCommand::Quit,
    },
];

/// Plain words that also quit, but only where the student is not typing
/// an answer or a question
pub static EXIT_COMMANDS: &[&str] = &["exit", "quit"];

pub fn command_names() -> Vec<String> {
    let mut names: Vec<String> = COMMANDS.iter().map(|c| c.name.to_string()).collect();
    names.extend(EXIT_COMMANDS.iter().map(|s| s.to_string()));
    names
}

pub fn command_description(name: &str) -> Option<&'static str> {
    COMMANDS
        .iter()
        .find(|c| c.name == name)
        .map(|c| c.description)
}

/// Recognise a command line. Anything else is ordinary input.
///
/// `exit_words` enables the bare [`EXIT_COMMANDS`]; with it off only
/// `/quit` leaves the app.
pub fn parse(input: &str, exit_words: bool) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if exit_words && EXIT_COMMANDS.contains(&trimmed) {
        return Some(SlashCommand::Quit);
    }
    let word = trimmed.split_whitespace().next()?;
    COMMANDS
        .iter()
        .find(|c| c.name == word)
        .map(|c| c.command)
}
