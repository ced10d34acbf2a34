//! CLI adapter for vidgrab.
//!
//! This crate provides the command-line interface, following the same
//! composition pattern as the rest of the workspace: `bootstrap` wires the
//! adapters together and handlers only talk to the resulting context.

#![deny(unused_crate_dependencies)]

// Only the binary uses these.
use anyhow as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
