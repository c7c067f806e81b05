//! CLI adapter for the opsdesk inbox.
//!
//! All CLI code uses `CliContext` for dependency access - no direct
//! transport construction outside of bootstrap.

#![deny(unused_crate_dependencies)]

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod parser;
pub mod presentation;

pub use bootstrap::{build_context, CliConfig, CliContext};
pub use commands::{Commands, PrintNotifier};
pub use error::CliError;
pub use parser::Cli;

// Used by the binary target only
use anyhow as _;
use tracing_subscriber as _;
