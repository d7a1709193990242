//! Command handlers that delegate to the reservation service.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub fn execute(ctx: &CliContext, ...) -> Result<(), CliError>`
//!   (`async` and `&mut` when they drive the origin)
//! - Thin wrappers that:
//!   1. Resolve CLI-specific input
//!   2. Call the service
//!   3. Format output for the terminal

pub mod candidates;
pub mod config;
pub mod prompt;
pub mod reserve;
