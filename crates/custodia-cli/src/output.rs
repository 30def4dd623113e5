//! Output formatting utilities for CLI commands.

use std::io::Write;

use serde::Serialize;

use crate::cli::{CommandContext, OutputFormat};
use crate::error::CliError;
use custodia_privacy::OperationOutcome;

pub mod table;
mod views;

pub use views::{ActivityList, AssessmentView, StatusOutput};

/// Trait for types that can be formatted for output
pub trait FormattedOutput {
    fn format_text(&self) -> String;
}

/// Width available for tables.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| usize::from(w))
        .unwrap_or(120)
}

/// Render a value in the selected format.
///
/// JSON output is wrapped in the same `{ success, data }` envelope used for
/// errors, so scripts can branch on `success` alone.
pub fn render<T>(format: OutputFormat, value: &T) -> Result<String, CliError>
where
    T: FormattedOutput + Serialize,
{
    match format {
        OutputFormat::Text => Ok(value.format_text()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&OperationOutcome::ok(value))?),
    }
}

/// Print formatted output to stdout
pub fn print_output<T>(ctx: &CommandContext, value: &T) -> Result<(), CliError>
where
    T: FormattedOutput + Serialize,
{
    write_output(ctx, value, std::io::stdout().lock())
}

/// Print formatted output to a writer
pub fn write_output<T, W>(ctx: &CommandContext, value: &T, mut writer: W) -> Result<(), CliError>
where
    T: FormattedOutput + Serialize,
    W: Write,
{
    if ctx.quiet && ctx.format == OutputFormat::Text {
        return Ok(());
    }
    let output = render(ctx.format, value)?;
    writeln!(writer, "{}", output.trim_end())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_is_wrapped_in_outcome() {
        let output = render(OutputFormat::Json, &StatusOutput::success("Atividade suspensa")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["message"], "Atividade suspensa");
    }

    #[test]
    fn test_text_uses_formatter() {
        let output = render(OutputFormat::Text, &StatusOutput::success("ok")).unwrap();
        assert_eq!(output, "✓ ok");
    }
}
