//! Tooling
//!
//! Command-line inspection and maintenance of a store root.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands};
