//! Command-line front end for bulk-renaming calendar events.
//!
//! This crate provides the `calrename` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
