//! Command implementations.
//!
//! Register commands open an [`App`](crate::app::App), run inside its session
//! span and shut it down afterwards, so pending audit events are written even
//! when the command fails.

mod activity;
mod config;
mod export;
mod report;
mod stats;

pub use activity::ActivityCommand;
pub use config::ConfigCommand;
pub use export::ExportCommand;
pub use report::ReportCommand;
pub use stats::StatsCommand;
