//! Network side of the chat widget.
//!
//! The backend takes a form-encoded `message` field and answers with
//! `{"message": "<reply>"}`. [`HttpChatClient`] speaks that contract over
//! reqwest; [`ChatBackend`] is the seam the controller and tests talk to.

use crate::config::ChatConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

// ============================================
// Error Types
// ============================================

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("invalid chatbot URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("could not reach the chatbot: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("chatbot replied with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("chatbot reply was not understood: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("chat client unavailable: {0}")]
    Unavailable(String),
}

pub type ChatResult<T> = Result<T, ChatError>;

// ============================================
// Backend Seam
// ============================================

/// Anything that can turn one user message into one bot reply.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait ChatBackend {
    async fn send(&self, message: &str) -> ChatResult<String>;

    /// Forget any server-side conversation so the next message starts fresh.
    fn reset(&self) {}
}

// ============================================
// HTTP Client
// ============================================

#[derive(Serialize)]
struct ChatForm<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    message: String,
}

pub struct HttpChatClient {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    session_url: Option<reqwest::Url>,
    /// Bumped by `reset`; a handshake only counts for the generation it started in.
    generation: AtomicU64,
    /// Generation whose handshake completed, `NO_SESSION` before the first one.
    opened: AtomicU64,
}

const NO_SESSION: u64 = u64::MAX;

impl HttpChatClient {
    pub fn new(config: &ChatConfig) -> ChatResult<Self> {
        let endpoint = parse_url(&config.endpoint)?;
        let session_url = config.session_url.as_deref().map(parse_url).transpose()?;

        Ok(Self {
            client: build_client(config)?,
            endpoint,
            session_url,
            generation: AtomicU64::new(0),
            opened: AtomicU64::new(NO_SESSION),
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Load the backend's index page once so it issues a session cookie.
    /// Conversation history on the server is keyed off that cookie.
    async fn open_session(&self) -> ChatResult<()> {
        let Some(url) = &self.session_url else {
            return Ok(());
        };
        let generation = self.generation.load(Ordering::Acquire);
        if self.opened.load(Ordering::Acquire) == generation {
            return Ok(());
        }

        tracing::debug!(%url, generation, "opening chatbot session");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // A reset during the GET makes this session stale; the next send opens another.
        if self.generation.load(Ordering::Acquire) == generation {
            self.opened.store(generation, Ordering::Release);
        }
        Ok(())
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl ChatBackend for HttpChatClient {
    async fn send(&self, message: &str) -> ChatResult<String> {
        self.open_session().await?;

        tracing::debug!(endpoint = %self.endpoint, len = message.len(), "posting chat message");
        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&ChatForm { message })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_reply(&body)
    }

    fn reset(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

fn parse_url(raw: &str) -> ChatResult<reqwest::Url> {
    reqwest::Url::parse(raw).map_err(|err| ChatError::InvalidEndpoint {
        url: raw.to_string(),
        reason: err.to_string(),
    })
}

fn parse_reply(body: &str) -> ChatResult<String> {
    let reply: ChatReply = serde_json::from_str(body)?;
    Ok(reply.message)
}

#[cfg(not(target_arch = "wasm32"))]
fn build_client(config: &ChatConfig) -> ChatResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder().cookie_store(true);
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

// The browser owns cookies and timeouts for fetch.
#[cfg(target_arch = "wasm32")]
fn build_client(_config: &ChatConfig) -> ChatResult<reqwest::Client> {
    Ok(reqwest::Client::new())
}
