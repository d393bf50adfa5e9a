//! Azure AI Foundry Agent Service adapter
//!
//! Talks to the project's Agents REST API. One [`FoundryAgentClient`] is
//! opened per request by [`FoundryAgentRuntime::connect`].
//!
//! ```text
//! create_agent ─► POST   /assistants
//! run_turn     ─► POST   /threads (first turn only)
//!                 POST   /threads/{id}/messages
//!                 POST   /threads/{id}/runs  ─► poll GET /threads/{id}/runs/{run}
//!                 GET    /threads/{id}/messages?run_id={run}
//! run_stage    ─► POST   /threads (seeded with the conversation), run, read, DELETE /threads/{id}
//! close        ─► DELETE /assistants/{id} for every ephemeral agent
//! ```

mod client;
#[cfg(test)]
mod fake_service;
pub mod protocol;
mod runtime;

pub use client::FoundryAgentClient;
pub use runtime::{FoundryAgentRuntime, FoundryOptions};
