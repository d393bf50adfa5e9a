//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Which chat service `serve` runs behind `/api/chat`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServiceMode {
    /// One agent, conversation kept in a service thread
    Chat,
    /// Researcher, writer and reviewer in a fixed six-stage chain
    Pipeline,
}

/// CLI arguments for foundry-relay
#[derive(Parser, Debug)]
#[command(name = "foundry-relay")]
#[command(author, version, about = "Web chat relay for Azure AI Foundry agents")]
#[command(long_about = r#"
foundry-relay serves a browser chat page and a JSON chat API backed by agents
hosted in Azure AI Foundry. It can also host the current-time MCP tool the
agents call.

Settings are read from the environment (and a .env file), optionally layered
over ./foundry-relay.toml or --config <path>.

Example:
  foundry-relay serve
  foundry-relay serve --mode pipeline --port 8000
  foundry-relay time-tool serve --port 7071
  foundry-relay time-tool invoke '{"arguments":{"timezone":"Asia/Tokyo"}}'
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the chat page and /api/chat
    Serve {
        /// Chat service behind /api/chat
        #[arg(long, value_enum, default_value = "chat")]
        mode: ServiceMode,

        /// Listen port (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Current-time tool
    #[command(subcommand)]
    TimeTool(TimeToolCommand),
}

#[derive(Subcommand, Debug)]
pub enum TimeToolCommand {
    /// Serve the tool over MCP at /mcp
    Serve {
        /// Listen port
        #[arg(short, long, default_value_t = 7071)]
        port: u16,
    },

    /// Run the tool once on a trigger context and print the result
    Invoke {
        /// JSON context, e.g. {"arguments":{"timezone":"Asia/Tokyo"}}
        context: String,
    },
}
