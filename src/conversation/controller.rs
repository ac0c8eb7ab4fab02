//! Conversation controller
//!
//! Owns the message log and the single-flight request flag. Every turn runs
//! `Idle -> Pending -> Idle`: [`ConversationController::begin_submit`] moves to
//! pending and yields the request to send, [`ConversationController::resolve`]
//! appends the outcome and returns to idle. Nothing here returns an error; a
//! failed query becomes a flagged assistant message.

use crate::ask::{AskBackend, AskError, AskRequest};
use crate::conversation::{Message, MessageId, RetrievalWidth};
use uuid::Uuid;

pub const GREETING_TEXT: &str = "Hello! I'm your SEBI cybersecurity assistant. Ask me anything about SEBI policies, regulations, and cybersecurity frameworks.";

pub const FALLBACK_ERROR_TEXT: &str = "Failed to get answer. Please try again.";

pub struct ConversationController {
    session_id: Uuid,
    messages: Vec<Message>,
    draft: String,
    pending: bool,
    retrieval_width: RetrievalWidth,
    next_id: u64,
}

impl ConversationController {
    pub fn new(retrieval_width: RetrievalWidth) -> Self {
        let mut controller = Self {
            session_id: Uuid::new_v4(),
            messages: Vec::new(),
            draft: String::new(),
            pending: false,
            retrieval_width,
            next_id: 1,
        };
        controller.seed_greeting();
        controller
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn retrieval_width(&self) -> RetrievalWidth {
        self.retrieval_width
    }

    /// Validate and record a user turn.
    ///
    /// Returns the request to send, or `None` when the text is blank or a
    /// request is already in flight (in which case nothing changes).
    pub fn begin_submit(&mut self, text: &str) -> Option<AskRequest> {
        let question = text.trim();
        if question.is_empty() || self.pending {
            return None;
        }

        let id = self.allocate_id();
        self.messages.push(Message::user(id, question));
        self.draft.clear();
        self.pending = true;

        tracing::info!(
            session = %self.session_id,
            message = %id,
            top_k = self.retrieval_width.value(),
            "question submitted"
        );

        Some(AskRequest {
            question: question.to_string(),
            top_k: self.retrieval_width.value(),
        })
    }

    /// Submit whatever is in the draft
    pub fn submit_draft(&mut self) -> Option<AskRequest> {
        let draft = std::mem::take(&mut self.draft);
        let request = self.begin_submit(&draft);
        if request.is_none() {
            self.draft = draft;
        }
        request
    }

    /// Append the outcome of the in-flight request and leave the pending state.
    ///
    /// Returns `None` if no request was pending.
    pub fn resolve(&mut self, outcome: Result<String, AskError>) -> Option<&Message> {
        if !self.pending {
            tracing::warn!(session = %self.session_id, "answer arrived with no request pending, dropping it");
            return None;
        }

        let id = self.allocate_id();
        let message = match outcome {
            Ok(answer) => {
                tracing::info!(session = %self.session_id, message = %id, "answer received");
                Message::assistant(id, answer)
            }
            Err(err) => {
                tracing::warn!(session = %self.session_id, message = %id, error = %err, "query failed");
                let text = err
                    .detail()
                    .map(str::to_string)
                    .unwrap_or_else(|| FALLBACK_ERROR_TEXT.to_string());
                Message::assistant_error(id, text)
            }
        };
        self.messages.push(message);
        self.pending = false;

        self.messages.last()
    }

    /// Run a whole turn against `backend`.
    ///
    /// Returns `false` if the submission was rejected.
    pub async fn submit(&mut self, text: &str, backend: &dyn AskBackend) -> bool {
        let Some(request) = self.begin_submit(text) else {
            return false;
        };
        let outcome = backend.ask(&request).await;
        self.resolve(outcome);
        true
    }

    /// Replace the log with a fresh greeting.
    ///
    /// Refused while a request is pending so the answer always lands after its
    /// question.
    pub fn reset(&mut self) -> bool {
        if self.pending {
            tracing::debug!(session = %self.session_id, "reset refused while pending");
            return false;
        }
        self.messages.clear();
        self.seed_greeting();
        tracing::debug!(session = %self.session_id, "conversation reset");
        true
    }

    pub fn set_retrieval_width(&mut self, width: RetrievalWidth) -> bool {
        if self.pending {
            return false;
        }
        self.retrieval_width = width;
        tracing::debug!(session = %self.session_id, top_k = width.value(), "retrieval width changed");
        true
    }

    pub fn update_draft(&mut self, text: impl Into<String>) -> bool {
        if self.pending {
            return false;
        }
        self.draft = text.into();
        true
    }

    fn seed_greeting(&mut self) {
        let id = self.allocate_id();
        self.messages.push(Message::assistant(id, GREETING_TEXT));
    }

    fn allocate_id(&mut self) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl Default for ConversationController {
    fn default() -> Self {
        Self::new(RetrievalWidth::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ConversationRole;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    /// Backend returning canned outcomes and recording requests
    struct ScriptedBackend {
        outcome: fn() -> Result<String, AskError>,
        seen: Mutex<Vec<AskRequest>>,
    }

    impl ScriptedBackend {
        fn new(outcome: fn() -> Result<String, AskError>) -> Self {
            Self {
                outcome,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<AskRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AskBackend for ScriptedBackend {
        async fn ask(&self, request: &AskRequest) -> Result<String, AskError> {
            self.seen.lock().unwrap().push(request.clone());
            (self.outcome)()
        }
    }

    fn status_error(detail: Option<&str>) -> AskError {
        AskError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.map(str::to_string),
        }
    }

    // ---- Initial state ----

    #[test]
    fn test_starts_with_single_greeting() {
        let controller = ConversationController::default();
        assert_eq!(controller.messages().len(), 1);
        let greeting = &controller.messages()[0];
        assert_eq!(greeting.role, ConversationRole::Assistant);
        assert_eq!(greeting.text, GREETING_TEXT);
        assert!(!greeting.is_error);
        assert!(!controller.is_pending());
        assert_eq!(controller.retrieval_width(), RetrievalWidth::Four);
        assert_eq!(controller.draft(), "");
    }

    // ---- Submit ----

    #[test]
    fn test_blank_submit_is_noop() {
        let mut controller = ConversationController::default();
        for text in ["", "   ", "\n\t "] {
            assert!(controller.begin_submit(text).is_none());
        }
        assert_eq!(controller.messages().len(), 1);
        assert!(!controller.is_pending());
    }

    #[test]
    fn test_submit_while_pending_is_rejected() {
        let mut controller = ConversationController::default();
        assert!(controller.begin_submit("first").is_some());
        assert!(controller.begin_submit("second").is_none());

        assert_eq!(controller.messages().len(), 2);
        assert_eq!(controller.messages()[1].text, "first");
        assert!(controller.is_pending());
    }

    #[test]
    fn test_submit_trims_and_clears_draft() {
        let mut controller = ConversationController::default();
        controller.update_draft("  What is SEBI?  ");
        let request = controller.submit_draft().unwrap();

        assert_eq!(request.question, "What is SEBI?");
        assert_eq!(controller.messages()[1].text, "What is SEBI?");
        assert_eq!(controller.messages()[1].role, ConversationRole::User);
        assert_eq!(controller.draft(), "");
    }

    #[test]
    fn test_rejected_draft_is_kept() {
        let mut controller = ConversationController::default();
        controller.update_draft("   ");
        assert!(controller.submit_draft().is_none());
        assert_eq!(controller.draft(), "   ");
    }

    #[test]
    fn test_pending_only_between_submit_and_resolve() {
        let mut controller = ConversationController::default();
        assert!(!controller.is_pending());
        controller.begin_submit("q").unwrap();
        assert!(controller.is_pending());
        controller.resolve(Ok("a".into()));
        assert!(!controller.is_pending());
    }

    #[test]
    fn test_end_to_end_example() {
        let mut controller = ConversationController::default();
        controller.begin_submit("What is SEBI?").unwrap();

        let texts: Vec<_> = controller.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec![GREETING_TEXT, "What is SEBI?"]);
        assert!(controller.is_pending());

        controller.resolve(Ok("SEBI is...".into()));
        let log = controller.messages();
        assert_eq!(log.len(), 3);
        assert_eq!(log[2].role, ConversationRole::Assistant);
        assert_eq!(log[2].text, "SEBI is...");
        assert!(!log[2].is_error);
        assert!(!controller.is_pending());
    }

    // ---- Resolve ----

    #[test]
    fn test_failure_uses_server_detail() {
        let mut controller = ConversationController::default();
        controller.begin_submit("q").unwrap();
        let message = controller.resolve(Err(status_error(Some("Y")))).unwrap();
        assert_eq!(message.text, "Y");
        assert!(message.is_error);
        assert!(!controller.is_pending());
    }

    #[test]
    fn test_failure_without_detail_uses_fallback() {
        let outcomes = [
            status_error(None),
            AskError::Malformed("missing field `answer`".into()),
            AskError::Aborted,
        ];
        for err in outcomes {
            let mut controller = ConversationController::default();
            controller.begin_submit("q").unwrap();
            let message = controller.resolve(Err(err)).unwrap();
            assert_eq!(message.text, FALLBACK_ERROR_TEXT);
            assert!(message.is_error);
        }
    }

    #[test]
    fn test_resolve_without_pending_is_dropped() {
        let mut controller = ConversationController::default();
        assert!(controller.resolve(Ok("stray".into())).is_none());
        assert_eq!(controller.messages().len(), 1);
    }

    #[test]
    fn test_retry_after_failure() {
        let mut controller = ConversationController::default();
        controller.begin_submit("q").unwrap();
        controller.resolve(Err(AskError::Aborted));
        assert!(controller.begin_submit("q again").is_some());
        controller.resolve(Ok("ok".into()));
        assert_eq!(controller.messages().len(), 5);
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut controller = ConversationController::default();
        for i in 0..3 {
            controller.begin_submit(&format!("q{}", i)).unwrap();
            controller.resolve(Ok("a".into()));
        }
        let ids: Vec<_> = controller.messages().iter().map(|m| m.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    // ---- Async turn ----

    #[tokio::test]
    async fn test_turn_grows_log_by_two() {
        let backend = ScriptedBackend::new(|| Ok("X".to_string()));
        let mut controller = ConversationController::default();

        for turn in 1..=3 {
            assert!(controller.submit("question", &backend).await);
            assert_eq!(controller.messages().len(), 1 + 2 * turn);
        }
        let last = controller.messages().last().unwrap();
        assert_eq!(last.text, "X");
        assert!(!last.is_error);
        assert!(!controller.is_pending());
    }

    #[tokio::test]
    async fn test_turn_failure_with_detail() {
        let backend = ScriptedBackend::new(|| Err(status_error(Some("index not loaded"))));
        let mut controller = ConversationController::default();

        assert!(controller.submit("q", &backend).await);
        let last = controller.messages().last().unwrap();
        assert_eq!(last.text, "index not loaded");
        assert!(last.is_error);
        assert!(!controller.is_pending());
    }

    #[tokio::test]
    async fn test_blank_turn_sends_nothing() {
        let backend = ScriptedBackend::new(|| Ok("X".to_string()));
        let mut controller = ConversationController::default();

        assert!(!controller.submit("  ", &backend).await);
        assert!(backend.requests().is_empty());
        assert_eq!(controller.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_width_sent_matches_selection_at_submit() {
        let backend = ScriptedBackend::new(|| Ok("X".to_string()));
        let mut controller = ConversationController::default();

        controller.submit("a", &backend).await;
        assert!(controller.set_retrieval_width(RetrievalWidth::Eight));
        controller.submit("b", &backend).await;
        controller.submit("c", &backend).await;
        assert!(controller.set_retrieval_width(RetrievalWidth::Two));
        controller.submit("d", &backend).await;

        let widths: Vec<_> = backend.requests().iter().map(|r| r.top_k).collect();
        assert_eq!(widths, vec![4, 8, 8, 2]);
    }

    // ---- Reset ----

    #[tokio::test]
    async fn test_reset_yields_single_fresh_greeting() {
        let backend = ScriptedBackend::new(|| Ok("X".to_string()));
        let mut controller = ConversationController::new(RetrievalWidth::Six);
        let original_id = controller.messages()[0].id;

        controller.submit("a", &backend).await;
        controller.submit("b", &backend).await;
        assert!(controller.reset());

        let log = controller.messages();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].text, GREETING_TEXT);
        assert_ne!(log[0].id, original_id);
        assert_eq!(controller.retrieval_width(), RetrievalWidth::Six);
        assert!(!controller.is_pending());
    }

    #[test]
    fn test_reset_on_fresh_session() {
        let mut controller = ConversationController::default();
        assert!(controller.reset());
        assert_eq!(controller.messages().len(), 1);
    }

    #[test]
    fn test_reset_refused_while_pending() {
        let mut controller = ConversationController::default();
        controller.begin_submit("q").unwrap();
        assert!(!controller.reset());
        assert_eq!(controller.messages().len(), 2);
        assert!(controller.is_pending());

        controller.resolve(Ok("a".into()));
        assert_eq!(controller.messages()[1].text, "q");
        assert_eq!(controller.messages()[2].text, "a");
    }

    // ---- Settings while pending ----

    #[test]
    fn test_width_and_draft_locked_while_pending() {
        let mut controller = ConversationController::default();
        controller.begin_submit("q").unwrap();

        assert!(!controller.set_retrieval_width(RetrievalWidth::Two));
        assert_eq!(controller.retrieval_width(), RetrievalWidth::Four);
        assert!(!controller.update_draft("typing"));
        assert_eq!(controller.draft(), "");

        controller.resolve(Ok("a".into()));
        assert!(controller.set_retrieval_width(RetrievalWidth::Two));
        assert!(controller.update_draft("typing"));
        assert_eq!(controller.draft(), "typing");
    }
}
