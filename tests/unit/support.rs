//! Scripted stand-in for the model API.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tigang::api::types::ResponseFormat;
use tigang::api::GenerativeClient;
use tigang::config::Config;
use tigang::errors::ApiError;
use tigang::tutor::Tutor;

pub struct ScriptedClient {
    keyed: bool,
    replies: Mutex<VecDeque<Result<String, ApiError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn replying(replies: Vec<Result<String, ApiError>>) -> Arc<Self> {
        Arc::new(Self {
            keyed: true,
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn keyless() -> Arc<Self> {
        Arc::new(Self {
            keyed: false,
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GenerativeClient for ScriptedClient {
    fn has_keys(&self) -> bool {
        self.keyed
    }

    async fn generate(
        &self,
        _model: &str,
        prompt: &str,
        _format: ResponseFormat,
    ) -> Result<String, ApiError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("script exhausted".into())))
    }
}

pub fn tutor(client: Arc<ScriptedClient>) -> Tutor {
    Tutor::new(client, &Config::default())
}

pub fn verdict(score: u32, feedback: &str) -> Result<String, ApiError> {
    Ok(format!(
        r#"{{"score": {}, "feedback": "{}", "isCorrect": {}}}"#,
        score,
        feedback,
        score >= 80
    ))
}
