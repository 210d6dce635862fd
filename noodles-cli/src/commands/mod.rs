//! CLI command implementations.

pub mod fold;
pub mod run;
pub mod version;
