//! HTTP routers
//!
//! - [`chat`] - `/api/chat`, `/healthz` and the static chat page
//! - [`mcp`] - `/mcp`, the JSON-RPC endpoint of the time tool

pub mod chat;
pub mod mcp;
