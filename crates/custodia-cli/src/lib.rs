//! Custodia CLI library
//!
//! Command definitions and output formatting for the `custodia` binary.

pub mod app;
pub mod args;
pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use error::CliError;
