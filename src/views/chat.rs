use crate::chat::{ChatSession, SubmitOutcome, start_over};
use crate::client::{ChatBackend, ChatError, ChatResult, HttpChatClient};
use crate::config::ChatConfig;
use crate::types::ChatMessage;
use dioxus::events::Key;
use dioxus::prelude::*;
use std::rc::Rc;
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

pub const CHAT_HISTORY_ID: &str = "chat-history";
pub const USER_INPUT_ID: &str = "user-input";
pub const SEND_BUTTON_ID: &str = "send-button";

const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:zero]:[minute padding:zero] [period case:upper]");

type BackendSlot = Result<Rc<HttpChatClient>, String>;

/// Script that pins a scroll container to its newest content.
pub fn scroll_to_latest_script(container_id: &str) -> String {
    format!(
        r#"const log = document.getElementById('{}');
if (log) {{ log.scrollTop = log.scrollHeight; }}"#,
        container_id
    )
}

/// Send through the client, or report why there is none.
async fn reply_from<B>(backend: Result<Rc<B>, String>, message: &str) -> ChatResult<String>
where
    B: ChatBackend + ?Sized,
{
    match backend {
        Ok(client) => client.send(message).await,
        Err(reason) => Err(ChatError::Unavailable(reason)),
    }
}

fn format_message_timestamp(timestamp: Option<OffsetDateTime>) -> Option<String> {
    let mut datetime = timestamp?;
    if let Ok(offset) = UtcOffset::current_local_offset() {
        datetime = datetime.to_offset(offset);
    }
    datetime.format(MESSAGE_TIME_FORMAT).ok()
}

#[component]
pub fn ChatView(config: ChatConfig) -> Element {
    let mut session = use_signal(ChatSession::new);
    let backend = use_signal(|| -> BackendSlot {
        HttpChatClient::new(&config).map(Rc::new).map_err(|err| {
            tracing::error!(error = %err, "chat client could not be created");
            err.to_string()
        })
    });

    let revision = use_memo(move || session.read().log().revision());
    use_effect(move || {
        revision();
        let _ = document::eval(&scroll_to_latest_script(CHAT_HISTORY_ID));
    });

    let mut send_message = move || {
        let request = match session.with_mut(ChatSession::submit) {
            SubmitOutcome::Sent(request) => request,
            SubmitOutcome::Empty | SubmitOutcome::Busy => return,
        };

        let backend = backend.read().clone();
        spawn(async move {
            let result = reply_from(backend, &request.message).await;
            session.with_mut(|s| s.resolve(request.id, result));
        });
    };

    let on_new_chat = move |_| {
        let slot = backend.read().clone();
        session.with_mut(|s| start_over(s, slot.as_deref().ok()));
    };

    let snapshot = session.read();
    let entries: Vec<ChatMessage> = snapshot.log().entries().to_vec();
    let waiting = snapshot.is_waiting();
    let can_submit = snapshot.can_submit();
    let draft = snapshot.input().to_string();
    drop(snapshot);

    rsx! {
        div { class: "main-container",
            div { class: "chat-wrap",
                div { id: CHAT_HISTORY_ID, class: "chat-history",
                    if entries.is_empty() && !waiting {
                        p { class: "chat-empty", "Ask me anything about point-and-click adventure games." }
                    }
                    for msg in entries.iter() {
                        div { key: "{msg.id}", class: "{msg.row_class()}",
                            div { class: "{msg.css_class()}", "{msg.text}" }
                            if let Some(ts) = format_message_timestamp(msg.created_at) {
                                span { class: "message-timestamp", "{ts}" }
                            }
                        }
                    }
                    if waiting {
                        div { class: "message bot-message pending", "Thinking…" }
                    }
                }
            }

            form { class: "composer",
                onsubmit: move |ev| ev.prevent_default(),
                input {
                    id: USER_INPUT_ID,
                    r#type: "text",
                    placeholder: "Type your message…",
                    autocomplete: "off",
                    autofocus: true,
                    value: "{draft}",
                    oninput: move |ev| session.with_mut(|s| s.set_input(ev.value())),
                    onkeydown: move |ev| {
                        if ev.key() == Key::Enter && !ev.modifiers().shift() {
                            ev.prevent_default();
                            send_message();
                        }
                    },
                }
                button {
                    id: SEND_BUTTON_ID,
                    class: "btn btn-primary",
                    r#type: "button",
                    disabled: !can_submit,
                    onclick: move |_| send_message(),
                    "Send"
                }
                button {
                    class: "btn btn-ghost",
                    r#type: "button",
                    title: "Clear the conversation and start a new session",
                    onclick: on_new_chat,
                    "New chat"
                }
            }
        }
    }
}
