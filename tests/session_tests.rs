//! Round-trip tests for the chat controller
//!
//! Drives ChatSession through a scripted backend and checks log ordering

use async_trait::async_trait;
use simplechatbot::chat::{ChatSession, SubmitOutcome, exchange, start_over};
use simplechatbot::client::{ChatBackend, ChatError, ChatResult};
use simplechatbot::types::Sender;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct ScriptedBackend {
    replies: Mutex<VecDeque<ChatResult<String>>>,
    calls: Mutex<Vec<String>>,
    resets: AtomicUsize,
}

impl ScriptedBackend {
    fn with_replies(replies: Vec<ChatResult<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::default(),
            resets: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn send(&self, message: &str) -> ChatResult<String> {
        self.calls.lock().unwrap().push(message.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("echo: {}", message)))
    }

    fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

fn transcript(session: &ChatSession) -> Vec<(Sender, String)> {
    session
        .log()
        .entries()
        .iter()
        .map(|msg| (msg.sender, msg.text.clone()))
        .collect()
}

mod submission_tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_submission_sends_nothing() {
        let backend = ScriptedBackend::default();
        let mut session = ChatSession::new();

        session.set_input("   ");
        let outcome = exchange(&mut session, &backend).await;

        assert_eq!(outcome, SubmitOutcome::Empty);
        assert!(session.log().is_empty());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_hello_round_trip() {
        let backend = ScriptedBackend::with_replies(vec![Ok("hi there".to_string())]);
        let mut session = ChatSession::new();

        session.set_input("hello");
        let outcome = exchange(&mut session, &backend).await;

        assert!(matches!(outcome, SubmitOutcome::Sent(ref req) if req.message == "hello"));
        assert_eq!(session.input(), "");
        assert_eq!(backend.calls(), vec!["hello".to_string()]);
        assert_eq!(
            transcript(&session),
            vec![
                (Sender::User, "hello".to_string()),
                (Sender::Bot, "hi there".to_string()),
            ]
        );
        assert_eq!(session.log().entries()[1].css_class(), "message bot-message");
    }

    #[tokio::test]
    async fn test_sequential_submissions_keep_order() {
        let backend = ScriptedBackend::with_replies(vec![
            Ok("bot1".to_string()),
            Ok("bot2".to_string()),
        ]);
        let mut session = ChatSession::new();

        session.set_input("user1");
        exchange(&mut session, &backend).await;
        session.set_input("user2");
        exchange(&mut session, &backend).await;

        assert_eq!(
            transcript(&session),
            vec![
                (Sender::User, "user1".to_string()),
                (Sender::Bot, "bot1".to_string()),
                (Sender::User, "user2".to_string()),
                (Sender::Bot, "bot2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_round_trip_is_visible() {
        let backend = ScriptedBackend::with_replies(vec![Err(ChatError::Unavailable(
            "offline".to_string(),
        ))]);
        let mut session = ChatSession::new();

        session.set_input("hello");
        exchange(&mut session, &backend).await;

        let entries = session.log().entries();
        assert_eq!(entries.len(), 2);
        assert!(entries[1].failed);
        assert!(entries[1].text.contains("offline"));
        assert!(!session.is_waiting());

        // The conversation carries on after a failure.
        session.set_input("again");
        exchange(&mut session, &backend).await;
        assert_eq!(session.log().len(), 4);
        assert_eq!(session.log().entries()[3].text, "echo: again");
    }
}

mod sequencing_tests {
    use super::*;

    #[tokio::test]
    async fn test_second_submission_waits_for_first_reply() {
        let backend = ScriptedBackend::default();
        let mut session = ChatSession::new();

        session.set_input("first");
        let first = match session.submit() {
            SubmitOutcome::Sent(request) => request,
            other => panic!("expected first request to be sent, got {:?}", other),
        };

        session.set_input("second");
        assert_eq!(exchange(&mut session, &backend).await, SubmitOutcome::Busy);
        assert!(backend.calls().is_empty());

        let reply = backend.send(&first.message).await;
        assert!(session.resolve(first.id, reply));

        let outcome = exchange(&mut session, &backend).await;
        assert!(matches!(outcome, SubmitOutcome::Sent(_)));
        assert_eq!(
            transcript(&session),
            vec![
                (Sender::User, "first".to_string()),
                (Sender::Bot, "echo: first".to_string()),
                (Sender::User, "second".to_string()),
                (Sender::Bot, "echo: second".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_reply_after_new_chat_is_discarded() {
        let backend = ScriptedBackend::default();
        let mut session = ChatSession::new();

        session.set_input("old question");
        let stale = match session.submit() {
            SubmitOutcome::Sent(request) => request,
            other => panic!("expected request to be sent, got {:?}", other),
        };
        session.clear();

        session.set_input("new question");
        exchange(&mut session, &backend).await;

        let late = backend.send(&stale.message).await;
        assert!(!session.resolve(stale.id, late));
        assert_eq!(
            transcript(&session),
            vec![
                (Sender::User, "new question".to_string()),
                (Sender::Bot, "echo: new question".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_start_over_resets_backend_and_log() {
        let backend = ScriptedBackend::default();
        let mut session = ChatSession::new();

        session.set_input("hello");
        exchange(&mut session, &backend).await;
        session.set_input("pending");
        let pending = match session.submit() {
            SubmitOutcome::Sent(request) => request,
            other => panic!("expected request to be sent, got {:?}", other),
        };

        start_over(&mut session, Some(&backend));

        assert_eq!(backend.resets.load(Ordering::SeqCst), 1);
        assert!(session.log().is_empty());
        assert!(!session.is_waiting());
        assert!(!session.resolve(pending.id, Ok("late".to_string())));
    }

    #[test]
    fn test_start_over_without_backend_still_clears() {
        let mut session = ChatSession::new();
        session.set_input("hello");
        session.submit();

        start_over::<ScriptedBackend>(&mut session, None);
        assert!(session.log().is_empty());
        assert!(!session.is_waiting());
    }
}
