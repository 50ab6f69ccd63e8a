//! CLI module
//!
//! One invocation performs one command; scheduling is left to cron or a
//! similar runner.
//!
//! # Commands
//!
//! - `sync` - Mirror the feed into the store
//! - `check` - Fetch the first page only
//! - `ids` - List stored identifiers

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
