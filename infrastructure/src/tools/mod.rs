//! Tool implementations served to the agent service
//!
//! Tools here are plain functions from a JSON context string to a JSON
//! result string, so any transport (MCP over HTTP, the CLI) can host them.

pub mod current_time;
