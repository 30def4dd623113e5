//! Config command implementation.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use custodia_common_config::{ConfigLoader, CustodiaConfig};
use serde::Serialize;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput, StatusOutput};

/// Manage configuration
#[derive(Debug, Parser)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration, after environment overrides
    Show,

    /// Print the configuration file location
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Effective configuration.
#[derive(Debug, Serialize)]
pub struct ConfigView {
    pub path: PathBuf,
    pub config: CustodiaConfig,
}

impl FormattedOutput for ConfigView {
    fn format_text(&self) -> String {
        let yaml = serde_yaml::to_string(&self.config)
            .unwrap_or_else(|e| format!("# failed to render configuration: {e}\n"));
        format!("# {}\n{yaml}", self.path.display())
    }
}

/// Location of the configuration file.
#[derive(Debug, Serialize)]
pub struct ConfigPath {
    pub path: PathBuf,
    pub exists: bool,
}

impl FormattedOutput for ConfigPath {
    fn format_text(&self) -> String {
        self.path.display().to_string()
    }
}

impl ConfigCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let loader = ConfigLoader::default();
        let path = ctx.config_path.clone().unwrap_or_else(|| loader.config_path());

        match &self.action {
            ConfigAction::Show => print_output(
                ctx,
                &ConfigView {
                    path,
                    config: ctx.config.clone(),
                },
            ),
            ConfigAction::Path => print_output(
                ctx,
                &ConfigPath {
                    exists: path.exists(),
                    path,
                },
            ),
            ConfigAction::Init { force } => {
                let target = loader.config_path();
                if target.exists() && !force {
                    return Err(CliError::user_with_hint(
                        format!("Configuration already exists: {}", target.display()),
                        "Use --force to overwrite it",
                    ));
                }
                loader.save(&CustodiaConfig::default())?;
                print_output(
                    ctx,
                    &StatusOutput::success(format!("Configuração criada em {}", target.display())),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_view_is_yaml() {
        let view = ConfigView {
            path: PathBuf::from(".custodia/config.yaml"),
            config: CustodiaConfig::default(),
        };
        let text = view.format_text();
        assert!(text.starts_with("# .custodia/config.yaml\n"));
        assert!(text.contains("interval_days: 365"));
        assert!(text.contains("kind: sqlite"));
    }
}
