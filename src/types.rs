use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Stylesheet class that distinguishes the two sides of the conversation.
    pub fn css_class(self) -> &'static str {
        match self {
            Sender::User => "user-message",
            Sender::Bot => "bot-message",
        }
    }

    fn row_side(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub id: u64,
    pub sender: Sender,
    pub text: String,
    pub created_at: Option<OffsetDateTime>,
    /// Set on bot entries that report a failed round trip instead of a reply.
    pub failed: bool,
}

impl ChatMessage {
    pub fn css_class(&self) -> String {
        if self.failed {
            format!("message {} error-message", self.sender.css_class())
        } else {
            format!("message {}", self.sender.css_class())
        }
    }

    /// Wrapper holding the bubble and its metadata line.
    pub fn row_class(&self) -> String {
        format!("message-row {}", self.sender.row_side())
    }
}
