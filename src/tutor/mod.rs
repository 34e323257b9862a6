//! The classmate tutor
//!
//! Wraps a [`GenerativeClient`] with the persona prompts. Grading and chat
//! never fail toward the student: a missing key, a blank answer or a failed
//! call each turn into a canned in-persona reply.

pub mod prompts;

use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::types::ResponseFormat;
use crate::api::GenerativeClient;
use crate::chat::ChatMessage;
use crate::config::Config;
use crate::errors::ApiError;
use crate::history::{GradingResult, PASS_SCORE};
use crate::observability::telemetry::{redact_secrets, sanitize_for_log};

pub const MISSING_KEY_GRADING: &str =
    "系统提示：API Key 未配置。请联系纲哥（管理员）设置 TIGANG_API_KEY 环境变量，或在配置文件里填写 api.api_keys。";
pub const EMPTY_ANSWER_FEEDBACK: &str =
    "咋啦？是不是忘了？没事，随便写点印象中的，我来帮你顺一顺思路！😄";
pub const GRADING_FAILED_FEEDBACK: &str =
    "哎呀，学校网有点卡（网络请求失败），我这边没加载出来，你再发一次试试？";
pub const MISSING_KEY_CHAT: &str =
    "系统提示：API Key 未配置。请联系管理员设置环境变量 TIGANG_API_KEY。";
pub const CHAT_EMPTY_REPLY: &str = "这题我翻翻笔记确认一下哈，稍等。";
pub const CHAT_FAILED_REPLY: &str = "哎呀，刚才走神了没听清，你再说一遍？";

pub struct Tutor {
    client: Arc<dyn GenerativeClient>,
    grading_model: String,
    chat_model: String,
    history_window: usize,
}

impl Tutor {
    pub fn new(client: Arc<dyn GenerativeClient>, config: &Config) -> Self {
        Self {
            client,
            grading_model: config.api.grading_model.clone(),
            chat_model: config.api.chat_model.clone(),
            history_window: config.chat.history_window,
        }
    }

    pub fn has_keys(&self) -> bool {
        self.client.has_keys()
    }

    /// Grade a free-text answer against the reference answer.
    pub async fn grade_answer(
        &self,
        question: &str,
        user_answer: &str,
        reference: &str,
    ) -> GradingResult {
        if !self.client.has_keys() {
            return GradingResult::zero(MISSING_KEY_GRADING);
        }
        if user_answer.trim().is_empty() {
            return GradingResult::zero(EMPTY_ANSWER_FEEDBACK);
        }
        match self.try_grade(question, user_answer, reference).await {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    "Grading error: {}",
                    redact_secrets(&sanitize_for_log(&e.to_string()))
                );
                GradingResult::zero(GRADING_FAILED_FEEDBACK)
            }
        }
    }

    /// Grade without the canned fallbacks; errors are returned as-is.
    pub async fn try_grade(
        &self,
        question: &str,
        user_answer: &str,
        reference: &str,
    ) -> Result<GradingResult, ApiError> {
        let prompt = prompts::grading_prompt(question, reference, user_answer);
        let text = self
            .client
            .generate(&self.grading_model, &prompt, ResponseFormat::Json)
            .await?;
        debug!("Grading reply ({} chars)", text.len());
        parse_grading(&text)
    }

    /// Answer a chat question given lesson context and earlier messages.
    ///
    /// `history` is the conversation before `message`; only its tail is
    /// replayed.
    pub async fn ask(&self, context: &str, history: &[ChatMessage], message: &str) -> String {
        if !self.client.has_keys() {
            return MISSING_KEY_CHAT.to_string();
        }
        let history_text = prompts::history_script(history, self.history_window);
        let prompt = prompts::chat_prompt(context, &history_text, message);
        match self
            .client
            .generate(&self.chat_model, &prompt, ResponseFormat::Text)
            .await
        {
            Ok(text) if text.trim().is_empty() => CHAT_EMPTY_REPLY.to_string(),
            Ok(text) => text,
            Err(ApiError::EmptyResponse) => CHAT_EMPTY_REPLY.to_string(),
            Err(e) => {
                warn!(
                    "Chat error: {}",
                    redact_secrets(&sanitize_for_log(&e.to_string()))
                );
                CHAT_FAILED_REPLY.to_string()
            }
        }
    }
}

/// Strip a surrounding markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or("");
    body.trim_end().trim_end_matches("```").trim()
}

/// Parse the model's `{score, feedback, isCorrect}` reply.
///
/// The score is clamped to 0..=100; a missing `isCorrect` is derived from
/// the pass mark. A reply without a numeric score is a parse error.
pub fn parse_grading(text: &str) -> Result<GradingResult, ApiError> {
    let body = strip_code_fence(text);
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))?;
    let obj = value
        .as_object()
        .ok_or_else(|| ApiError::Parse("grading reply is not a JSON object".to_string()))?;

    let raw_score = match obj.get("score") {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| ApiError::Parse("grading reply has no numeric score".to_string()))?;
    let score = raw_score.round().clamp(0.0, 100.0) as u32;

    let feedback = obj
        .get("feedback")
        .and_then(|f| f.as_str())
        .unwrap_or_default()
        .to_string();
    let is_correct = obj
        .get("isCorrect")
        .and_then(|v| v.as_bool())
        .unwrap_or(score >= PASS_SCORE);

    Ok(GradingResult {
        score,
        feedback,
        is_correct,
    })
}
