//! Custodia CLI - LGPD processing activity register
//!
//! Main entry point for the `custodia` binary.

use std::process::ExitCode;

use clap::Parser;
use custodia_cli::cli::{Cli, OutputFormat};
use custodia_cli::error::{CliError, ErrorFormatter};
use custodia_common_log::{LogConfig, LogLevel};

/// Application exit codes
#[repr(u8)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let format = cli.format;
    let verbose = cli.verbose;

    if let Err(e) = init_logging(&cli) {
        eprintln!("warning: {e}");
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start async runtime: {e}");
            return Exit::GeneralError.into();
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => Exit::Success.into(),
        Err(e) => {
            report(&e, format, verbose);
            e.exit_code()
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.load_config()?;
    cli.execute(config).await
}

fn report(error: &CliError, format: OutputFormat, verbose: u8) {
    let formatter = ErrorFormatter::new().verbose(verbose > 0);
    match format {
        OutputFormat::Json => println!("{}", formatter.format_json(error)),
        OutputFormat::Text => formatter.print(error),
    }
}

/// Logs go to stderr; `-v` raises and `-q` lowers the level set by the environment.
fn init_logging(cli: &Cli) -> Result<(), custodia_common_log::LogError> {
    let config = LogConfig::from_env();
    let config = match cli.verbose {
        0 if cli.quiet => config.with_level(LogLevel::Error),
        0 if std::env::var_os(custodia_common_log::vars::LOG_LEVEL).is_none() => {
            config.with_level(LogLevel::Warn)
        }
        0 => config,
        1 => config.with_level(LogLevel::Info),
        2 => config.with_level(LogLevel::Debug),
        _ => config.with_level(LogLevel::Trace),
    };
    custodia_common_log::init(config)
}
