//! Application-level settings.
//!
//! - [`RelaySettings`] - everything the chat use cases read at request time
//! - [`SettingKey`] - names of the settings that can be required per request

pub mod settings;

pub use settings::{CredentialStrategy, RelaySettings, RoleSettings, SettingKey};
