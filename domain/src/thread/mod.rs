//! Thread domain - conversation messages and the caller-held thread state.
//!
//! - [`message::ChatMessage`] - one message in a conversation, possibly with content parts
//! - [`state::ThreadState`] - serializable reference to a service-hosted thread

pub mod message;
pub mod state;
