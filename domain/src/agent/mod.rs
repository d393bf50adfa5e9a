//! Agent domain - identities and creation specs for hosted agents.

pub mod value_objects;
