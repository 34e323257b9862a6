//! Markdown to styled terminal text
//!
//! The tutor answers in light markdown (bold key terms, short lists, the
//! odd heading). Rendering goes through `pulldown-cmark` events into
//! `colored` strings, wrapped to the terminal width by display width so
//! CJK text wraps correctly.

use colored::Colorize;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use unicode_width::UnicodeWidthChar;

use super::style::{Glyphs, TutorStyle};

fn heading_level_to_usize(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Render markdown into terminal lines no wider than `width` columns.
pub fn render_markdown(markdown: &str, width: usize) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);

    let mut state = RenderState::new(width.max(20));
    for event in parser {
        state.process_event(event);
    }
    state.finish()
}

struct RenderState {
    lines: Vec<String>,
    current: String,
    current_width: usize,
    /// Continuation indent for wrapped list items
    indent: usize,
    width: usize,
    list_stack: Vec<Option<u64>>,
    emphasis: bool,
    strong: bool,
    heading: bool,
    in_code_block: bool,
}

impl RenderState {
    fn new(width: usize) -> Self {
        Self {
            lines: Vec::new(),
            current: String::new(),
            current_width: 0,
            indent: 0,
            width,
            list_stack: Vec::new(),
            emphasis: false,
            strong: false,
            heading: false,
            in_code_block: false,
        }
    }

    fn process_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag_end) => self.end_tag(tag_end),
            Event::Text(text) => self.add_text(&text),
            Event::Code(code) => self.push_styled(&code, |s| s.marker().to_string()),
            Event::SoftBreak | Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.flush_line();
                let rule = Glyphs::rule().repeat(self.width.min(40));
                self.lines.push(rule.muted().to_string());
            }
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_line();
                self.heading = true;
                let prefix = format!("{} ", "#".repeat(heading_level_to_usize(level)));
                self.push_prefix(&prefix.as_str().title().to_string(), prefix.chars().count());
            }
            Tag::CodeBlock(_) => {
                self.flush_line();
                self.in_code_block = true;
            }
            Tag::List(start) => {
                self.flush_line();
                self.list_stack.push(start);
            }
            Tag::Item => {
                self.flush_line();
                let depth = self.list_stack.len().saturating_sub(1);
                let bullet = match self.list_stack.last_mut() {
                    Some(Some(n)) => {
                        let label = format!("{}.", n);
                        *n += 1;
                        label
                    }
                    _ => Glyphs::bullet().to_string(),
                };
                let prefix = format!("{}{} ", "  ".repeat(depth), bullet);
                let prefix_width = display_width(&prefix);
                self.push_prefix(&prefix.marker().to_string(), prefix_width);
                self.indent = prefix_width;
            }
            Tag::Emphasis => self.emphasis = true,
            Tag::Strong => self.strong = true,
            Tag::BlockQuote(_) => {
                self.flush_line();
                self.push_prefix(&"▌ ".muted().to_string(), 2);
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag_end: TagEnd) {
        match tag_end {
            TagEnd::Heading(_) => {
                self.heading = false;
                self.flush_line();
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.flush_line();
            }
            TagEnd::List(_) => {
                self.list_stack.pop();
                self.flush_line();
                if self.list_stack.is_empty() {
                    self.indent = 0;
                    self.blank_line();
                }
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::Emphasis => self.emphasis = false,
            TagEnd::Strong => self.strong = false,
            TagEnd::Paragraph => {
                self.flush_line();
                if self.list_stack.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::BlockQuote(_) => self.flush_line(),
            _ => {}
        }
    }

    fn add_text(&mut self, text: &str) {
        if self.in_code_block {
            for line in text.lines() {
                self.lines.push(format!("  {}", line.muted()));
            }
            return;
        }
        let (strong, emphasis, heading) = (self.strong, self.emphasis, self.heading);
        self.push_styled(text, move |s| {
            if heading {
                s.title().to_string()
            } else if strong {
                s.emphasis().bold().to_string()
            } else if emphasis {
                s.body().italic().to_string()
            } else {
                s.body().to_string()
            }
        });
    }

    fn push_prefix(&mut self, styled: &str, width: usize) {
        self.current.push_str(styled);
        self.current_width += width;
    }

    /// Append text, wrapping at the width. Each wrapped chunk is styled on
    /// its own so escape codes never span a line break.
    fn push_styled<F>(&mut self, text: &str, style: F)
    where
        F: Fn(&str) -> String,
    {
        let mut chunk = String::new();
        for c in text.chars() {
            let w = c.width().unwrap_or(0);
            if self.current_width + w > self.width && self.current_width > self.indent {
                if !chunk.is_empty() {
                    self.current.push_str(&style(&chunk));
                    chunk.clear();
                }
                self.flush_line();
                self.current.push_str(&" ".repeat(self.indent));
                self.current_width = self.indent;
                if c == ' ' {
                    continue;
                }
            }
            chunk.push(c);
            self.current_width += w;
        }
        if !chunk.is_empty() {
            self.current.push_str(&style(&chunk));
        }
    }

    fn flush_line(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
        self.current_width = 0;
    }

    fn blank_line(&mut self) {
        if self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(String::new());
        }
    }

    fn finish(mut self) -> String {
        self.flush_line();
        while self.lines.last().is_some_and(|l| l.is_empty()) {
            self.lines.pop();
        }
        self.lines.join("\n")
    }
}

/// Terminal columns taken by `s`.
pub fn display_width(s: &str) -> usize {
    s.chars().map(|c| c.width().unwrap_or(0)).sum()
}
