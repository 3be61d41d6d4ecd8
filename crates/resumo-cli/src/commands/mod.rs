//! Subcommand implementations.

pub mod analyze;
pub mod batch;
pub mod config;
pub mod drive;
pub mod parse;
