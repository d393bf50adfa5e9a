//! Conversation message entities

use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A single part of a message's content.
///
/// The agent service returns messages as a list of parts. Only `Text` parts
/// carry prose; the others are kept so nothing is silently lost when a
/// message is stringified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        text: String,
    },
    ToolCall {
        name: String,
        #[serde(default)]
        arguments: serde_json::Value,
    },
    ToolOutput {
        output: String,
    },
    Other {
        kind: String,
    },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Returns the text if this is a non-empty `Text` part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text { text } if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}

/// A message in a conversation (Entity)
///
/// `text` is the message-level text when the producer supplied one;
/// `contents` holds the structured parts. Either may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<ContentPart>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            author_name: None,
            text: Some(text.into()),
            contents: Vec::new(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            author_name: None,
            text: Some(text.into()),
            contents: Vec::new(),
        }
    }

    /// An assistant message made only of content parts.
    pub fn assistant_parts(contents: Vec<ContentPart>) -> Self {
        Self {
            role: Role::Assistant,
            author_name: None,
            text: None,
            contents,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author_name = Some(author.into());
        self
    }

    /// The message-level text, if present and non-empty.
    pub fn direct_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// The last non-empty text part, scanning from the end.
    pub fn last_text_part(&self) -> Option<&str> {
        self.contents.iter().rev().find_map(ContentPart::as_text)
    }

    /// All prose in this message, used when handing it to the next agent.
    pub fn full_text(&self) -> String {
        if let Some(text) = self.direct_text() {
            return text.to_string();
        }
        self.contents
            .iter()
            .filter_map(ContentPart::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
