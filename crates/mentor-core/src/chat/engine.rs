//! ChatEngine -- one conversation with one persona.
//!
//! State machine: `Idle -> Busy -> Idle`. A submission is accepted only when
//! the engine is idle and the text is not blank; the engine then appends the
//! user message, calls the persona's endpoint once, and appends either the
//! reply or a fixed apology. `send_message` never fails outwardly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use mentor_types::chat::{ChatMessage, ChatRequest, EngineState, RejectReason, SendOutcome};
use mentor_types::error::ChatError;
use mentor_types::persona::Persona;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::backend::ChatBackend;
use crate::persona::catalog::greeting_for;
use crate::storage::{KvStore, session_key};

/// The apology appended when an exchange fails for any reason.
pub const FALLBACK_REPLY: &str =
    "I apologize, but I'm having trouble responding right now. Please try again.";

/// Clears the busy flag when dropped, so every exit path of a send
/// (success, failure, panic, or the future being dropped) returns to Idle.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives a conversation with a single persona, bound by persona id.
///
/// Methods take `&self`: the message log sits behind a mutex that is never
/// held across an `.await`, and the busy flag is atomic, so a second call made
/// while a request is in flight observes `Busy` and is rejected.
pub struct ChatEngine<S: KvStore, B: ChatBackend> {
    persona: Persona,
    endpoint: String,
    store: S,
    backend: B,
    messages: Mutex<Vec<ChatMessage>>,
    busy: AtomicBool,
}

impl<S: KvStore, B: ChatBackend> ChatEngine<S, B> {
    /// Create an engine for `persona` and seed it with the greeting.
    ///
    /// Fails with `ChatError::UnmappedPersona` if the persona has no endpoint,
    /// before any network attempt is made.
    pub fn new(persona: Persona, store: S, backend: B) -> Result<Self, ChatError> {
        let endpoint = match persona.endpoint.as_deref().map(str::trim) {
            Some(e) if !e.is_empty() => e.to_string(),
            _ => return Err(ChatError::UnmappedPersona(persona.name.clone())),
        };

        let engine = Self {
            persona,
            endpoint,
            store,
            backend,
            messages: Mutex::new(Vec::new()),
            busy: AtomicBool::new(false),
        };
        engine.initialize();
        Ok(engine)
    }

    /// Replace the log with exactly one AI greeting. No network call, and no
    /// session id is generated here.
    pub fn initialize(&self) {
        let greeting = ChatMessage::ai(greeting_for(&self.persona), Utc::now());
        *self.log() = vec![greeting];
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn state(&self) -> EngineState {
        if self.busy.load(Ordering::Acquire) {
            EngineState::Busy
        } else {
            EngineState::Idle
        }
    }

    /// Snapshot of the message log in submission order.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.log().clone()
    }

    /// The stored session id, if one exists. Never generates one.
    pub async fn session_id(&self) -> Option<String> {
        match self.store.get(&self.storage_key()).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Failed to read session id");
                None
            }
        }
    }

    /// Submit `text` and run one request/response cycle.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Rejected(RejectReason::Empty);
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(persona = %self.persona.id, "Send rejected while busy");
            return SendOutcome::Rejected(RejectReason::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        let user_message = ChatMessage::user(text);
        self.log().push(user_message.clone());

        let session_id = self.session_id_or_create().await;
        let request = ChatRequest {
            message: user_message.content,
            session_id,
        };

        let outcome = match self.backend.send(&self.endpoint, &request).await {
            Ok(reply) => {
                let timestamp = reply.parsed_timestamp().unwrap_or_else(Utc::now);
                SendOutcome::Replied(ChatMessage::ai(reply.reply, timestamp))
            }
            Err(e) => {
                warn!(
                    persona = %self.persona.id,
                    endpoint = %self.endpoint,
                    error = %e,
                    "Chat request failed, falling back to apology"
                );
                SendOutcome::Fallback(ChatMessage::ai(FALLBACK_REPLY, Utc::now()))
            }
        };

        if let Some(message) = outcome.ai_message() {
            self.log().push(message.clone());
        }
        outcome
    }

    /// Clear the log and discard the stored session id so the next send
    /// starts a new one. Server-side history is left to the backend.
    pub async fn reset_session(&self) {
        self.log().clear();
        if let Err(e) = self.store.remove(&self.storage_key()).await {
            warn!(error = %e, "Failed to discard stored session id");
        }
        info!(persona = %self.persona.id, "Session reset");
    }

    fn storage_key(&self) -> String {
        session_key(&self.persona.id)
    }

    /// Read the durable session id, generating and storing one if absent.
    /// Storage failures are logged and an unpersisted id is used instead.
    async fn session_id_or_create(&self) -> String {
        let key = self.storage_key();
        match self.store.get(&key).await {
            Ok(Some(id)) if !id.is_empty() => return id,
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to read session id, generating a new one"),
        }

        let id = Uuid::now_v7().to_string();
        if let Err(e) = self.store.set(&key, &id).await {
            warn!(error = %e, "Failed to store session id, it will not survive a restart");
        }
        info!(persona = %self.persona.id, session_id = %id, "New chat session");
        id
    }

    fn log(&self) -> MutexGuard<'_, Vec<ChatMessage>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::catalog::builtin_personas;
    use crate::testing::MemoryKvStore;
    use mentor_types::chat::{ChatReply, Sender};
    use mentor_types::error::BackendError;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;

    // --- Mock backend ---

    #[derive(Clone)]
    enum Scripted {
        Reply(ChatReply),
        Fail,
    }

    #[derive(Clone, Default)]
    struct ScriptedBackend {
        script: Arc<Mutex<VecDeque<Scripted>>>,
        calls: Arc<Mutex<Vec<(String, ChatRequest)>>>,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedBackend {
        fn replying(replies: &[&str]) -> Self {
            let script = replies
                .iter()
                .map(|r| {
                    Scripted::Reply(ChatReply {
                        reply: r.to_string(),
                        timestamp: None,
                    })
                })
                .collect();
            Self {
                script: Arc::new(Mutex::new(script)),
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self {
                script: Arc::new(Mutex::new(VecDeque::from([Scripted::Fail]))),
                ..Default::default()
            }
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }

        fn calls(&self) -> Vec<(String, ChatRequest)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ChatBackend for ScriptedBackend {
        async fn send(
            &self,
            endpoint: &str,
            request: &ChatRequest,
        ) -> Result<ChatReply, BackendError> {
            self.calls
                .lock()
                .unwrap()
                .push((endpoint.to_string(), request.clone()));
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Scripted::Reply(reply)) => Ok(reply),
                Some(Scripted::Fail) => Err(BackendError::Status {
                    status: 500,
                    body: "boom".to_string(),
                }),
                None => Err(BackendError::Transport("script exhausted".to_string())),
            }
        }
    }

    fn hitesh() -> Persona {
        builtin_personas().remove(0)
    }

    fn contents(engine: &ChatEngine<MemoryKvStore, ScriptedBackend>) -> Vec<(Sender, String)> {
        engine
            .messages()
            .into_iter()
            .map(|m| (m.sender, m.content))
            .collect()
    }

    // --- Tests ---

    #[tokio::test]
    async fn test_new_seeds_single_greeting_without_session() {
        let store = MemoryKvStore::new();
        let engine = ChatEngine::new(hitesh(), store.clone(), ScriptedBackend::default()).unwrap();

        assert_eq!(
            contents(&engine),
            vec![(Sender::Ai, "Haanji. Aaj kispe charcha kare?".to_string())]
        );
        assert_eq!(engine.state(), EngineState::Idle);
        assert!(engine.session_id().await.is_none());
        assert!(store.raw("chatSessionId:hitesh-sir").is_none());
    }

    #[tokio::test]
    async fn test_unmapped_persona_fails_fast() {
        let mut persona = hitesh();
        persona.endpoint = None;
        let backend = ScriptedBackend::default();
        let result = ChatEngine::new(persona, MemoryKvStore::new(), backend.clone());

        assert!(matches!(result, Err(ChatError::UnmappedPersona(_))));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_successful_exchanges_keep_order() {
        let backend = ScriptedBackend::replying(&["ai one", "ai two"]);
        let engine = ChatEngine::new(hitesh(), MemoryKvStore::new(), backend).unwrap();

        assert!(matches!(engine.send_message("one").await, SendOutcome::Replied(_)));
        assert!(matches!(engine.send_message("two").await, SendOutcome::Replied(_)));

        let senders: Vec<Sender> = engine.messages().iter().map(|m| m.sender).collect();
        assert_eq!(
            senders,
            vec![Sender::Ai, Sender::User, Sender::Ai, Sender::User, Sender::Ai]
        );
        let texts: Vec<String> = engine.messages().into_iter().map(|m| m.content).collect();
        assert_eq!(texts[1..], ["one", "ai one", "two", "ai two"]);
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[tokio::test]
    async fn test_request_targets_persona_endpoint_with_session() {
        let backend = ScriptedBackend::replying(&["a", "b"]);
        let store = MemoryKvStore::new();
        let engine = ChatEngine::new(hitesh(), store.clone(), backend.clone()).unwrap();

        engine.send_message("hello").await;
        engine.send_message("again").await;

        let calls = backend.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "hitesh-chat");
        assert_eq!(calls[0].1.message, "hello");
        assert_eq!(calls[0].1.session_id, calls[1].1.session_id);
        assert_eq!(
            store.raw("chatSessionId:hitesh-sir").as_deref(),
            Some(calls[0].1.session_id.as_str())
        );
    }

    #[tokio::test]
    async fn test_existing_session_id_is_reused() {
        let store = MemoryKvStore::new().with_value("chatSessionId:hitesh-sir", "sess-123");
        let backend = ScriptedBackend::replying(&["a"]);
        let engine = ChatEngine::new(hitesh(), store, backend.clone()).unwrap();

        engine.send_message("hi").await;
        assert_eq!(backend.calls()[0].1.session_id, "sess-123");
    }

    #[tokio::test]
    async fn test_failure_appends_apology_and_returns_idle() {
        let engine =
            ChatEngine::new(hitesh(), MemoryKvStore::new(), ScriptedBackend::failing()).unwrap();

        let outcome = engine.send_message("hello").await;
        assert!(matches!(outcome, SendOutcome::Fallback(_)));

        let log = contents(&engine);
        assert_eq!(log.len(), 3);
        assert_eq!(log[1], (Sender::User, "hello".to_string()));
        assert_eq!(log[2], (Sender::Ai, FALLBACK_REPLY.to_string()));
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let backend = ScriptedBackend::replying(&["a"]);
        let engine = ChatEngine::new(hitesh(), MemoryKvStore::new(), backend.clone()).unwrap();

        assert_eq!(
            engine.send_message("").await,
            SendOutcome::Rejected(RejectReason::Empty)
        );
        assert_eq!(
            engine.send_message("   ").await,
            SendOutcome::Rejected(RejectReason::Empty)
        );
        assert_eq!(engine.messages().len(), 1);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_content_kept_as_submitted() {
        let backend = ScriptedBackend::replying(&["a"]);
        let engine = ChatEngine::new(hitesh(), MemoryKvStore::new(), backend.clone()).unwrap();

        engine.send_message("  spaced  ").await;
        assert_eq!(engine.messages()[1].content, "  spaced  ");
        assert_eq!(backend.calls()[0].1.message, "  spaced  ");
    }

    #[tokio::test]
    async fn test_send_while_busy_is_rejected() {
        let gate = Arc::new(Notify::new());
        let backend = ScriptedBackend::replying(&["first reply"]).gated(gate.clone());
        let engine = ChatEngine::new(hitesh(), MemoryKvStore::new(), backend.clone()).unwrap();

        let (first, second) = tokio::join!(engine.send_message("first"), async {
            while engine.state() != EngineState::Busy {
                tokio::task::yield_now().await;
            }
            let outcome = engine.send_message("second").await;
            assert_eq!(engine.messages().len(), 2);
            gate.notify_one();
            outcome
        });

        assert_eq!(second, SendOutcome::Rejected(RejectReason::Busy));
        assert!(matches!(first, SendOutcome::Replied(_)));
        let texts: Vec<String> = engine.messages().into_iter().map(|m| m.content).collect();
        assert_eq!(texts[1..], ["first", "first reply"]);
        assert_eq!(backend.calls().len(), 1);
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[tokio::test]
    async fn test_dropped_send_returns_to_idle() {
        let gate = Arc::new(Notify::new());
        let backend = ScriptedBackend::replying(&["never"]).gated(gate);
        let engine = ChatEngine::new(hitesh(), MemoryKvStore::new(), backend).unwrap();

        let result =
            tokio::time::timeout(Duration::from_millis(20), engine.send_message("stuck")).await;
        assert!(result.is_err());
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[tokio::test]
    async fn test_reply_timestamp_used_when_present() {
        let backend = ScriptedBackend {
            script: Arc::new(Mutex::new(VecDeque::from([Scripted::Reply(ChatReply {
                reply: "dated".to_string(),
                timestamp: Some("2024-05-06T07:08:09Z".to_string()),
            })]))),
            ..Default::default()
        };
        let engine = ChatEngine::new(hitesh(), MemoryKvStore::new(), backend).unwrap();

        let outcome = engine.send_message("when?").await;
        let message = outcome.ai_message().unwrap();
        assert_eq!(message.timestamp.to_rfc3339(), "2024-05-06T07:08:09+00:00");
    }

    #[tokio::test]
    async fn test_reset_clears_and_discards_session() {
        let store = MemoryKvStore::new();
        let backend = ScriptedBackend::replying(&["a", "b", "c"]);
        let engine = ChatEngine::new(hitesh(), store.clone(), backend.clone()).unwrap();

        engine.send_message("one").await;
        let first_id = engine.session_id().await.unwrap();

        engine.reset_session().await;
        assert!(engine.messages().is_empty());
        assert!(engine.session_id().await.is_none());

        engine.send_message("two").await;
        let second_id = engine.session_id().await.unwrap();

        engine.reset_session().await;
        engine.reset_session().await;
        assert!(engine.messages().is_empty());

        engine.send_message("three").await;
        let third_id = engine.session_id().await.unwrap();

        assert_ne!(first_id, second_id);
        assert_ne!(second_id, third_id);
        assert_ne!(first_id, third_id);
        assert_eq!(engine.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_session_store_failure_still_sends() {
        let store = MemoryKvStore::new();
        store.set_fail_writes(true);
        let backend = ScriptedBackend::replying(&["ok"]);
        let engine = ChatEngine::new(hitesh(), store, backend.clone()).unwrap();

        let outcome = engine.send_message("hi").await;
        assert!(matches!(outcome, SendOutcome::Replied(_)));
        assert!(!backend.calls()[0].1.session_id.is_empty());
    }

    #[tokio::test]
    async fn test_session_read_failure_still_sends() {
        let store = MemoryKvStore::new().with_value("chatSessionId:hitesh-sir", "sess-123");
        store.set_fail_reads(true);
        let backend = ScriptedBackend::replying(&["ok"]);
        let engine = ChatEngine::new(hitesh(), store.clone(), backend.clone()).unwrap();

        let outcome = engine.send_message("hi").await;
        assert!(matches!(outcome, SendOutcome::Replied(_)));

        let sent = backend.calls()[0].1.session_id.clone();
        assert!(!sent.is_empty());
        assert_ne!(sent, "sess-123");
        assert!(engine.session_id().await.is_none());
        assert_eq!(engine.state(), EngineState::Idle);

        store.set_fail_reads(false);
        assert_eq!(engine.session_id().await, Some(sent));
    }

    #[tokio::test]
    async fn test_sessions_scoped_per_persona() {
        let store = MemoryKvStore::new();
        let mut personas = builtin_personas();
        let piyush = personas.remove(1);
        let hitesh = personas.remove(0);

        let a = ChatEngine::new(hitesh, store.clone(), ScriptedBackend::replying(&["x"])).unwrap();
        let b = ChatEngine::new(piyush, store.clone(), ScriptedBackend::replying(&["y"])).unwrap();
        a.send_message("hi").await;
        b.send_message("hi").await;

        assert_ne!(a.session_id().await, b.session_id().await);
        a.reset_session().await;
        assert!(a.session_id().await.is_none());
        assert!(b.session_id().await.is_some());
    }

    #[tokio::test]
    async fn test_initialize_after_reset_restores_greeting() {
        let engine =
            ChatEngine::new(hitesh(), MemoryKvStore::new(), ScriptedBackend::default()).unwrap();
        engine.reset_session().await;
        engine.initialize();
        assert_eq!(engine.messages().len(), 1);
        assert_eq!(engine.messages()[0].sender, Sender::Ai);
    }
}
