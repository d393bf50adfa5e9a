//! Core domain concepts shared across all subdomains.
//!
//! - [`message::UserMessage`] - a validated chat message from the caller
//! - [`error::DomainError`] - domain-level errors

pub mod error;
pub mod message;
