//! Tool domain - remote tools that can be attached to an agent run.

pub mod descriptor;
