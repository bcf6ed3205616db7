//! Command-line surface (§6).

pub mod io;
pub mod opts;

pub use opts::{Cli, OutputFormat};
