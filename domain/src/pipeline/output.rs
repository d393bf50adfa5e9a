//! Stage output and final-reply extraction.
//!
//! The agent service does not guarantee the shape of what a stage returns:
//! sometimes plain text, sometimes a list of messages whose prose sits either
//! in a message-level text field or in content parts. [`StageOutput`] names
//! those shapes explicitly and [`StageOutput::extract_reply`] reads them in a
//! fixed order:
//!
//! ```text
//! PlainText (non-empty)  → the text
//! MessageList            → last message with direct text,
//!                          else that message's last non-empty text part
//! nothing found / Empty  → raw string form of the output
//! ```

use crate::thread::message::ChatMessage;
use serde::{Deserialize, Serialize};

/// What a single pipeline stage produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StageOutput {
    PlainText(String),
    MessageList(Vec<ChatMessage>),
    Empty,
}

impl StageOutput {
    /// Normalize a message list; no messages means `Empty`.
    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        if messages.is_empty() {
            StageOutput::Empty
        } else {
            StageOutput::MessageList(messages)
        }
    }

    /// The reply text this output contributes, without the raw fallback.
    pub fn reply_text(&self) -> Option<&str> {
        match self {
            StageOutput::PlainText(text) => Some(text.as_str()).filter(|t| !t.is_empty()),
            StageOutput::MessageList(messages) => messages
                .iter()
                .rev()
                .find_map(|m| m.direct_text().or_else(|| m.last_text_part())),
            StageOutput::Empty => None,
        }
    }

    /// The reply surfaced to the caller, falling back to the raw form.
    pub fn extract_reply(&self) -> String {
        match self.reply_text() {
            Some(text) => text.to_string(),
            None => self.to_string(),
        }
    }

    /// Messages to append to the running conversation, attributed to `author`.
    pub fn into_messages(self, author: &str) -> Vec<ChatMessage> {
        match self {
            StageOutput::PlainText(text) => vec![ChatMessage::assistant(text).with_author(author)],
            StageOutput::MessageList(messages) => messages
                .into_iter()
                .map(|m| {
                    if m.author_name.is_some() {
                        m
                    } else {
                        m.with_author(author)
                    }
                })
                .collect(),
            StageOutput::Empty => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            StageOutput::PlainText(text) => text.is_empty(),
            StageOutput::MessageList(messages) => messages.is_empty(),
            StageOutput::Empty => true,
        }
    }
}

impl std::fmt::Display for StageOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageOutput::PlainText(text) => write!(f, "{}", text),
            StageOutput::MessageList(messages) => match serde_json::to_string(messages) {
                Ok(json) => write!(f, "{}", json),
                Err(_) => write!(f, "{:?}", messages),
            },
            StageOutput::Empty => Ok(()),
        }
    }
}
