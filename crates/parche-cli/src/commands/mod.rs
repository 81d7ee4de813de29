//! CLI subcommand implementations.

pub mod objects;
pub mod play;
pub mod render;
