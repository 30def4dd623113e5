//! Export command implementation.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};
use custodia_export::{export_records, ExportFormat, ExportRecord, ExportSummary};
use serde::Serialize;
use tracing::Instrument;

use crate::app::App;
use crate::args::{parse_export_format, FilterArgs};
use crate::cli::CommandContext;
use crate::commands::report::RatArgs;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// Export activities or the RAT
#[derive(Debug, Parser)]
pub struct ExportCommand {
    #[command(subcommand)]
    pub subject: ExportSubject,

    /// File format (csv, html, json_lines)
    #[arg(
        short = 'F',
        long = "export-format",
        global = true,
        default_value = "csv",
        value_parser = parse_export_format
    )]
    pub export_format: ExportFormat,

    /// Output file; standard output when omitted
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum ExportSubject {
    /// Activity list, with the same filters as `activity list`
    Activities(FilterArgs),

    /// Record of processing activities with risk assessment
    Rat(RatArgs),
}

impl ExportSubject {
    fn name(&self) -> &'static str {
        match self {
            Self::Activities(_) => "activities",
            Self::Rat(_) => "rat",
        }
    }
}

/// Result of an export written to a file.
#[derive(Debug, Serialize)]
pub struct ExportOutput {
    pub path: PathBuf,
    pub format: ExportFormat,
    #[serde(flatten)]
    pub summary: ExportSummary,
}

impl FormattedOutput for ExportOutput {
    fn format_text(&self) -> String {
        format!(
            "✓ {} registro(s) exportado(s) para {} ({} bytes)",
            self.summary.records,
            self.path.display(),
            self.summary.bytes_written
        )
    }
}

impl ExportCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<(), CliError> {
        let app = App::open(ctx)?;
        let span = app.span();
        let result = self.run(ctx, &app).instrument(span).await;
        app.shutdown().await;
        result
    }

    async fn run(&self, ctx: &CommandContext, app: &App) -> Result<(), CliError> {
        let summary = match &self.subject {
            ExportSubject::Activities(filter) => {
                let activities = app.store.fetch(&app.session, &filter.to_filter()).await?;
                self.write(app, &activities)?
            }
            ExportSubject::Rat(args) => {
                let report = app.store.rat_report(&app.session, &args.to_options()).await?;
                self.write(app, &report.entries)?
            }
        };

        app.store.record_export(
            &app.session,
            self.subject.name(),
            &self.export_format.to_string(),
            summary.records,
        );

        match &self.output {
            Some(path) => print_output(
                ctx,
                &ExportOutput {
                    path: path.clone(),
                    format: self.export_format,
                    summary,
                },
            ),
            None => Ok(()),
        }
    }

    fn write<R: ExportRecord>(&self, app: &App, records: &[R]) -> Result<ExportSummary, CliError> {
        let config = app.export_config(self.export_format);
        match &self.output {
            Some(path) => {
                let file = File::create(path).map_err(|e| {
                    CliError::io_with_path("Failed to create export file", e, path)
                })?;
                Ok(export_records(BufWriter::new(file), config, records)?)
            }
            None => Ok(export_records(io::stdout(), config, records)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_output_text() {
        let output = ExportOutput {
            path: PathBuf::from("rat.csv"),
            format: ExportFormat::Csv,
            summary: ExportSummary {
                records: 2,
                bytes_written: 120,
            },
        };
        assert_eq!(
            output.format_text(),
            "✓ 2 registro(s) exportado(s) para rat.csv (120 bytes)"
        );
    }

    #[test]
    fn test_subject_and_format_parse() {
        let cmd = ExportCommand::try_parse_from(["export", "rat", "--active-only", "-F", "html"])
            .unwrap();
        assert_eq!(cmd.export_format, ExportFormat::Html);
        assert_eq!(cmd.subject.name(), "rat");
        assert!(cmd.output.is_none());
    }
}
