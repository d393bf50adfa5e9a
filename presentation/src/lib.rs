//! Presentation layer for foundry-relay
//!
//! This crate contains the CLI definitions and the HTTP routers: the chat
//! API with its static front-end, and the MCP endpoint of the time tool.

pub mod cli;
pub mod http;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, ServiceMode, TimeToolCommand};
pub use http::{
    chat::{ChatState, chat_router},
    mcp::{McpState, McpTool, mcp_router},
};
