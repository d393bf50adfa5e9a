//! Configuration loading for foundry-relay
//!
//! Every setting is an environment variable. Values are merged from
//! (highest to lowest priority):
//!
//! 1. Process environment (a `.env` file is loaded into it by the binary)
//! 2. `--config <path>` specified file
//! 3. Project root: `./foundry-relay.toml`
//! 4. Default values
//!
//! TOML keys are the lowercased variable names, e.g.
//! `azure_ai_project_endpoint = "https://..."`.

mod env_config;
mod loader;

pub use env_config::{ConfigError, EnvConfig, ServerOptions};
pub use loader::ConfigLoader;
