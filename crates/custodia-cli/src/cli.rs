//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use custodia_common_config::{ConfigLoader, CustodiaConfig, Environment};
use custodia_common_core::TenantId;

use crate::commands::{ActivityCommand, ConfigCommand, ExportCommand, ReportCommand, StatsCommand};
use crate::error::CliError;

/// Custodia - LGPD processing activity register
///
/// Record processing activities, assess the need for impact reports and
/// export the record of processing activities (RAT).
#[derive(Debug, Parser)]
#[command(
    name = "custodia",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true,
    help_template = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase verbosity level"
    )]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Suppress non-error output"
    )]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "CUSTODIA_CONFIG",
        value_hint = ValueHint::FilePath,
        help = "Path to configuration file"
    )]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        value_enum,
        help = "Output format (text, json)"
    )]
    pub format: OutputFormat,

    /// Tenant to act on (platform administrators only)
    #[arg(
        long,
        global = true,
        value_parser = crate::args::parse_tenant_id,
        help = "Tenant to act on (platform administrators only)"
    )]
    pub tenant: Option<TenantId>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage processing activities
    #[command(visible_alias = "act")]
    Activity(ActivityCommand),

    /// Show register statistics
    Stats(StatsCommand),

    /// Show the record of processing activities (RAT)
    Report(ReportCommand),

    /// Export activities or the RAT to CSV, HTML or JSON lines
    Export(ExportCommand),

    /// Manage configuration
    Config(ConfigCommand),

    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsCommand),
}

/// Shell completions generation
#[derive(Debug, Parser)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

impl Cli {
    /// Load configuration, then apply `.env` files and `CUSTODIA_*` overrides.
    pub fn load_config(&self) -> Result<CustodiaConfig, CliError> {
        let loader = ConfigLoader::default();
        let mut config = match &self.config {
            Some(path) => loader.load_file(path)?,
            None => loader.load()?,
        };

        Environment::init()?;
        Environment::apply_overrides(&mut config)?;
        Ok(config)
    }

    /// Execute the selected command
    pub async fn execute(self, config: CustodiaConfig) -> Result<(), CliError> {
        let ctx = CommandContext {
            config,
            config_path: self.config,
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            tenant: self.tenant,
        };

        match self.command {
            Command::Activity(cmd) => cmd.execute(&ctx).await,
            Command::Stats(cmd) => cmd.execute(&ctx).await,
            Command::Report(cmd) => cmd.execute(&ctx).await,
            Command::Export(cmd) => cmd.execute(&ctx).await,
            Command::Config(cmd) => cmd.execute(&ctx),
            Command::Completions(cmd) => cmd.execute(),
        }
    }
}

impl CompletionsCommand {
    /// Execute the completions command
    pub fn execute(&self) -> Result<(), CliError> {
        use clap::CommandFactory;
        use clap_complete::generate;
        use std::io;

        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(self.shell, &mut cmd, name, &mut io::stdout());
        Ok(())
    }
}

/// Context passed to all commands
#[derive(Debug)]
pub struct CommandContext {
    pub config: CustodiaConfig,
    /// Explicit `--config` path, if any.
    pub config_path: Option<PathBuf>,
    pub format: OutputFormat,
    pub quiet: bool,
    pub verbose: u8,
    /// Tenant selected with `--tenant`.
    pub tenant: Option<TenantId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["custodia", "stats", "--format", "json", "-vv"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Stats(_)));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["custodia", "-q", "-v", "stats"]).is_err());
    }
}
