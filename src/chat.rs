//! Deep-dive chat with the tutor
//!
//! A session belongs to one lesson. It opens with a greeting from the tutor
//! and can widen its context from the lesson to the whole book; widening or
//! narrowing starts the conversation over.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::content::{Catalogue, Lesson};
use crate::errors::ContentError;
use crate::tutor::Tutor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

pub fn greeting(lesson_title: &str, full_context: bool) -> String {
    if full_context {
        "我是纲哥。整本书的内容都在这儿了，哪块儿不懂直接问。别磨磨蹭蹭的。".to_string()
    } else {
        format!(
            "我是纲哥。现在复习 **{}**。关于这一课，有什么记不住的、理解不了的，赶紧问。",
            lesson_title
        )
    }
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    lesson_id: u32,
    lesson_title: String,
    full_context: bool,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(lesson: &Lesson, full_context: bool) -> Self {
        let mut session = Self {
            lesson_id: lesson.id,
            lesson_title: lesson.title.clone(),
            full_context,
            messages: Vec::new(),
        };
        session.reset();
        session
    }

    /// Drop the conversation and start again from the greeting.
    pub fn reset(&mut self) {
        self.messages = vec![ChatMessage::new(
            Role::Model,
            greeting(&self.lesson_title, self.full_context),
        )];
    }

    pub fn lesson_id(&self) -> u32 {
        self.lesson_id
    }

    pub fn is_full_context(&self) -> bool {
        self.full_context
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Switch between lesson and whole-book context. Returns the new state.
    pub fn toggle_full_context(&mut self) -> bool {
        self.set_full_context(!self.full_context);
        self.full_context
    }

    pub fn set_full_context(&mut self, full: bool) {
        if self.full_context != full {
            self.full_context = full;
            self.reset();
        }
    }

    /// Text the tutor answers from.
    pub fn context(&self, catalogue: &Catalogue) -> Result<String, ContentError> {
        if self.full_context {
            Ok(catalogue.full_context())
        } else {
            Ok(catalogue.require(self.lesson_id)?.context())
        }
    }

    /// Ask the tutor. Blank input is ignored and yields `None`.
    pub async fn send(
        &mut self,
        tutor: &Tutor,
        catalogue: &Catalogue,
        text: &str,
    ) -> Result<Option<String>, ContentError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let context = self.context(catalogue)?;
        let prior = self.messages.clone();
        self.messages.push(ChatMessage::new(Role::User, text));
        debug!(
            "Chat question for lesson {} ({} prior messages)",
            self.lesson_id,
            prior.len()
        );

        let reply = tutor.ask(&context, &prior, text).await;
        self.messages.push(ChatMessage::new(Role::Model, reply.clone()));
        Ok(Some(reply))
    }
}
