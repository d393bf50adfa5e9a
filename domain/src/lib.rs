//! Domain layer for foundry-relay
//!
//! This crate contains the value objects and pure logic of the relay.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Agents and threads
//!
//! Agents live in the hosted agent service and are addressed by an opaque
//! [`AgentId`]. A conversation with one agent is a service-hosted thread whose
//! reference travels back and forth with the caller as a [`ThreadState`].
//!
//! ## Review pipeline
//!
//! The multi-agent service runs a fixed researcher → writer → reviewer →
//! writer → reviewer → writer chain ([`PipelinePlan`]). Each stage yields a
//! [`StageOutput`]; the reply surfaced to the caller is pulled out of the last
//! one by [`StageOutput::extract_reply`].

pub mod agent;
pub mod core;
pub mod pipeline;
pub mod thread;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use agent::value_objects::{AgentHandle, AgentId, AgentSpec, Retention};
pub use core::{error::DomainError, message::UserMessage};
pub use pipeline::{
    output::StageOutput,
    plan::{PIPELINE_ROLES, PipelinePlan, PipelineRole, PipelineStage, StageId},
    run::{PipelineRun, StageRecord},
};
pub use thread::{
    message::{ChatMessage, ContentPart, Role},
    state::ThreadState,
};
pub use tool::descriptor::{FUNCTION_KEY_HEADER, ToolDescriptor};
