use crate::client::{ChatBackend, ChatResult};
use crate::types::{ChatMessage, Sender};
use time::OffsetDateTime;

/// Ordered, append-only history of the conversation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChatLog {
    entries: Vec<ChatMessage>,
    next_id: u64,
}

impl ChatLog {
    pub fn append(&mut self, sender: Sender, text: impl Into<String>) -> &ChatMessage {
        self.push(sender, text.into(), false)
    }

    /// Bot-side entry describing a round trip that produced no reply.
    pub fn append_failure(&mut self, text: impl Into<String>) -> &ChatMessage {
        self.push(Sender::Bot, text.into(), true)
    }

    fn push(&mut self, sender: Sender, text: String, failed: bool) -> &ChatMessage {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(ChatMessage {
            id,
            sender,
            text,
            created_at: Some(OffsetDateTime::now_utc()),
            failed,
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Changes on every append and every clear; the view scrolls when it moves.
    pub fn revision(&self) -> u64 {
        self.next_id
    }

    fn clear(&mut self) {
        self.entries.clear();
        // Ids keep counting so render keys and the revision stay unique.
        self.next_id += 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

/// A submitted message waiting to be sent to the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingRequest {
    pub id: RequestId,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    Sent(PendingRequest),
    /// Input was blank after trimming; nothing happened.
    Empty,
    /// A reply is still outstanding; input and log are untouched.
    Busy,
}

/// Controller state behind the chat widget: the log, the draft, and the
/// single request allowed in flight.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChatSession {
    log: ChatLog,
    input: String,
    pending: Option<RequestId>,
    next_request: u64,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &ChatLog {
        &self.log
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn can_submit(&self) -> bool {
        !self.is_waiting() && !self.input.trim().is_empty()
    }

    pub fn submit(&mut self) -> SubmitOutcome {
        let text = self.input.trim();
        if text.is_empty() {
            return SubmitOutcome::Empty;
        }
        if self.pending.is_some() {
            return SubmitOutcome::Busy;
        }

        let message = text.to_string();
        self.log.append(Sender::User, message.clone());
        self.input.clear();

        let id = RequestId(self.next_request);
        self.next_request += 1;
        self.pending = Some(id);

        SubmitOutcome::Sent(PendingRequest { id, message })
    }

    /// Record the outcome of a request. Returns false when the reply no
    /// longer belongs to the conversation and was dropped.
    pub fn resolve(&mut self, id: RequestId, result: ChatResult<String>) -> bool {
        if self.pending != Some(id) {
            tracing::debug!(?id, "dropping reply for a request that is no longer pending");
            return false;
        }
        self.pending = None;

        match result {
            Ok(reply) => {
                self.log.append(Sender::Bot, reply);
            }
            Err(err) => {
                tracing::warn!(?id, error = %err, "chat request failed");
                self.log.append_failure(err.to_string());
            }
        }
        true
    }

    /// Start over: empty the log and forget the outstanding request.
    pub fn clear(&mut self) {
        self.log.clear();
        self.pending = None;
    }
}

/// "New chat": drop the conversation here and on the server.
pub fn start_over<B>(session: &mut ChatSession, backend: Option<&B>)
where
    B: ChatBackend + ?Sized,
{
    if let Some(backend) = backend {
        backend.reset();
    }
    session.clear();
}

/// One full round trip: submit the draft, wait for the backend, record the reply.
pub async fn exchange<B>(session: &mut ChatSession, backend: &B) -> SubmitOutcome
where
    B: ChatBackend + ?Sized,
{
    let outcome = session.submit();
    if let SubmitOutcome::Sent(request) = &outcome {
        let result = backend.send(&request.message).await;
        session.resolve(request.id, result);
    }
    outcome
}
