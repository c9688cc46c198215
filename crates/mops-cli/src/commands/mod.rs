//! CLI command implementations
//!
//! Each subcommand group has its own module; results are printed as JSON.

pub mod config;
pub mod job;
pub mod status;

use crate::error::Result;
use serde::Serialize;

/// Pretty-print a value as JSON on stdout
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
