//! Chat message roles and their rendered view model.

use serde::{Deserialize, Serialize};

/// CSS class shared by every message node.
pub const MESSAGE_CLASS: &str = "ai-message";

/// CSS class of the node holding the message text.
pub const CONTENT_CLASS: &str = "ai-message-content";

/// Who a rendered message is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Text the user submitted.
    User,
    /// A successful assistant answer.
    Assistant,
    /// A reported or transport failure, styled as an assistant message.
    AssistantError,
}

impl Role {
    /// Role-qualified class appended after [`MESSAGE_CLASS`].
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::AssistantError => "assistant error",
        }
    }
}

/// A message ready to be appended to the message list.
///
/// Built by [`render_message`]; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageViewModel {
    role: Role,
    class_name: String,
    content: String,
}

impl MessageViewModel {
    /// Role this message was rendered for.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Full class attribute of the message node, e.g. `ai-message assistant error`.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Literal message text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Serialize as an HTML fragment. The content is always escaped.
    #[must_use]
    pub fn to_html(&self) -> String {
        format!(
            r#"<div class="{}"><div class="{CONTENT_CLASS}">{}</div></div>"#,
            self.class_name,
            escape_html(&self.content)
        )
    }
}

/// Build the view model for one chat message.
#[must_use]
pub fn render_message(content: impl Into<String>, role: Role) -> MessageViewModel {
    MessageViewModel {
        role,
        class_name: format!("{MESSAGE_CLASS} {}", role.class()),
        content: content.into(),
    }
}

/// Escape text for use in HTML element content and attribute values.
pub(crate) fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
