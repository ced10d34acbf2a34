//! Command handlers.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub [async] fn execute(ctx: &CliContext, ...) -> Result<(), CliError>`
//! - Thin wrappers that:
//!   1. Parse/validate CLI-specific input
//!   2. Call the composed adapters or the scheduler
//!   3. Format output for the terminal

pub mod analyze;
pub mod download;
pub mod formats;
pub mod history;
pub mod info;
pub mod paths;
