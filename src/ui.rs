use crate::config::ChatConfig;
use crate::views::ChatView;
use dioxus::prelude::*;

const CHAT_CSS: Asset = asset!("/assets/chat.css");

#[component]
pub fn App() -> Element {
    let config = use_hook(|| {
        let config = ChatConfig::load();
        tracing::info!(endpoint = %config.endpoint, "chat widget ready");
        config
    });
    let endpoint = config.endpoint.clone();

    rsx! {
        document::Link { rel: "stylesheet", href: CHAT_CSS }
        document::Title { "SimpleChatBot" }
        AppHeader { endpoint }
        ChatView { config }
    }
}

#[component]
fn AppHeader(endpoint: String) -> Element {
    rsx! {
        div { class: "header",
            div { class: "header-content",
                h1 { class: "header-title", "SimpleChatBot" }
                span { class: "header-endpoint", title: "Chatbot endpoint", "{endpoint}" }
            }
        }
    }
}
