//! Unit tests for grading and chat through the tutor
//!
//! Tests cover:
//! - Parsing grading replies
//! - Canned replies without keys or on failure
//! - Chat history replay

use super::support::{self, ScriptedClient};
use tigang::chat::{ChatSession, Role};
use tigang::content::Catalogue;
use tigang::errors::ApiError;
use tigang::tutor::{
    parse_grading, CHAT_EMPTY_REPLY, CHAT_FAILED_REPLY, EMPTY_ANSWER_FEEDBACK,
    GRADING_FAILED_FEEDBACK, MISSING_KEY_CHAT, MISSING_KEY_GRADING,
};

mod parse_tests {
    use super::*;

    #[test]
    fn test_score_is_clamped() {
        let result = parse_grading(r#"{"score": 130, "feedback": "好"}"#).unwrap();
        assert_eq!(result.score, 100);
        assert!(result.is_correct);
        let result = parse_grading(r#"{"score": -5, "feedback": "差"}"#).unwrap();
        assert_eq!(result.score, 0);
        assert!(!result.is_correct);
    }

    #[test]
    fn test_string_score_accepted() {
        let result = parse_grading(r#"{"score": "72", "feedback": "还行"}"#).unwrap();
        assert_eq!(result.score, 72);
        assert_eq!(result.feedback, "还行");
    }

    #[test]
    fn test_code_fence_stripped() {
        let text = "```json\n{\"score\": 88, \"feedback\": \"不错\", \"isCorrect\": false}\n```";
        let result = parse_grading(text).unwrap();
        assert_eq!(result.score, 88);
        // explicit verdict wins over the pass mark
        assert!(!result.is_correct);
    }

    #[test]
    fn test_missing_score_is_error() {
        assert!(matches!(
            parse_grading(r#"{"feedback": "没分数"}"#),
            Err(ApiError::Parse(_))
        ));
        assert!(parse_grading("不是 JSON").is_err());
    }
}

mod grading_tests {
    use super::*;

    #[tokio::test]
    async fn test_keyless_grading_is_canned() {
        let client = ScriptedClient::keyless();
        let tutor = support::tutor(client.clone());
        let result = tutor.grade_answer("问", "答", "参考").await;
        assert_eq!(result.score, 0);
        assert_eq!(result.feedback, MISSING_KEY_GRADING);
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_answer_is_canned() {
        let client = ScriptedClient::replying(vec![support::verdict(100, "满分")]);
        let tutor = support::tutor(client.clone());
        let result = tutor.grade_answer("问", "   ", "参考").await;
        assert_eq!(result.feedback, EMPTY_ANSWER_FEEDBACK);
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_api_error_gives_apology() {
        let client = ScriptedClient::replying(vec![Err(ApiError::Network("down".into()))]);
        let tutor = support::tutor(client);
        let result = tutor.grade_answer("问", "答", "参考").await;
        assert_eq!(result.score, 0);
        assert_eq!(result.feedback, GRADING_FAILED_FEEDBACK);
    }

    #[tokio::test]
    async fn test_try_grade_surfaces_errors() {
        let client = ScriptedClient::replying(vec![Ok("{}".to_string())]);
        let tutor = support::tutor(client);
        assert!(tutor.try_grade("问", "答", "参考").await.is_err());
    }

    #[tokio::test]
    async fn test_grading_prompt_carries_reference() {
        let client = ScriptedClient::replying(vec![support::verdict(80, "行")]);
        let tutor = support::tutor(client.clone());
        tutor.grade_answer("问题甲", "我的答案", "参考答案乙").await;
        let prompt = client.last_prompt().unwrap();
        assert!(prompt.contains("问题甲"));
        assert!(prompt.contains("我的答案"));
        assert!(prompt.contains("参考答案乙"));
    }
}

mod chat_tests {
    use super::*;

    #[test]
    fn test_keyless_chat_is_canned() {
        let tutor = support::tutor(ScriptedClient::keyless());
        let reply = tokio_test::block_on(tutor.ask("", &[], "你好"));
        assert_eq!(reply, MISSING_KEY_CHAT);
    }

    #[tokio::test]
    async fn test_empty_and_failed_replies() {
        let client = ScriptedClient::replying(vec![
            Ok("  ".to_string()),
            Err(ApiError::Network("down".into())),
        ]);
        let tutor = support::tutor(client);
        assert_eq!(tutor.ask("", &[], "一").await, CHAT_EMPTY_REPLY);
        assert_eq!(tutor.ask("", &[], "二").await, CHAT_FAILED_REPLY);
    }

    #[tokio::test]
    async fn test_session_replays_history() {
        let catalogue = Catalogue::bundled().unwrap();
        let client = ScriptedClient::replying(vec![
            Ok("因为要打开市场。".to_string()),
            Ok("1842年。".to_string()),
        ]);
        let tutor = support::tutor(client.clone());
        let mut session = ChatSession::new(catalogue.first(), false);
        let greeting_len = session.messages().len();

        let first = session
            .send(&tutor, &catalogue, "为什么打仗？")
            .await
            .unwrap();
        assert_eq!(first.as_deref(), Some("因为要打开市场。"));
        session
            .send(&tutor, &catalogue, "条约哪年签的？")
            .await
            .unwrap();

        let prompt = client.last_prompt().unwrap();
        assert!(prompt.contains("为什么打仗？"));
        assert!(prompt.contains("因为要打开市场。"));
        assert!(prompt.contains("条约哪年签的？"));

        let messages = session.messages();
        assert_eq!(messages.len(), greeting_len + 4);
        assert_eq!(messages.last().map(|m| m.role), Some(Role::Model));
    }

    #[tokio::test]
    async fn test_blank_message_ignored() {
        let catalogue = Catalogue::bundled().unwrap();
        let client = ScriptedClient::replying(vec![]);
        let tutor = support::tutor(client.clone());
        let mut session = ChatSession::new(catalogue.first(), true);
        assert!(session.send(&tutor, &catalogue, "  ").await.unwrap().is_none());
        assert_eq!(client.calls(), 0);
    }
}
