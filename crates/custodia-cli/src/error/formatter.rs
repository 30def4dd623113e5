//! Error formatting for CLI output.

use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};

use crate::error::CliError;

const RED_BOLD: &str = "\x1b[1;31m";
const CYAN_BOLD: &str = "\x1b[1;36m";
const DIM: &str = "\x1b[90m";
const RESET: &str = "\x1b[0m";

/// Error output formatter
pub struct ErrorFormatter {
    color: bool,
    verbose: bool,
}

impl ErrorFormatter {
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
            verbose: false,
        }
    }

    pub fn color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.color {
            format!("{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// Format and print an error
    pub fn print(&self, error: &CliError) {
        eprint!("{}", self.format(error));
    }

    /// Format an error to a string
    pub fn format(&self, error: &CliError) -> String {
        let mut output = String::new();

        let prefix = self.paint(RED_BOLD, &format!("error[{}]:", error.code()));
        let _ = writeln!(output, "{prefix} {error}");

        if self.verbose {
            self.format_source_chain(&mut output, error);
        }

        self.format_context(&mut output, error);

        if let Some(hint) = error.hint() {
            let _ = writeln!(output, "\n{} {hint}", self.paint(CYAN_BOLD, "hint:"));
        }

        output
    }

    /// Format as JSON, matching the success envelope printed by commands
    pub fn format_json(&self, error: &CliError) -> String {
        let json = serde_json::json!({
            "success": false,
            "error": error.to_string(),
            "code": error.code(),
            "hint": error.hint(),
        });

        serde_json::to_string_pretty(&json).unwrap_or_else(|_| error.to_string())
    }

    fn format_source_chain(&self, output: &mut String, error: &CliError) {
        use std::error::Error;

        let Some(source) = error.source() else {
            return;
        };

        let _ = writeln!(output, "\n{}", self.paint(DIM, "caused by:"));
        let _ = writeln!(output, "  {source}");

        let mut current = source.source();
        let mut depth = 1;
        while let Some(src) = current {
            let _ = writeln!(output, "  {depth}: {src}");
            current = src.source();
            depth += 1;
        }
    }

    fn format_context(&self, output: &mut String, error: &CliError) {
        match error {
            CliError::Io { path: Some(p), .. } => {
                let _ = writeln!(output, "\n  {} {}", self.paint(DIM, "path:"), p.display());
            }
            CliError::NotFound {
                resource_type,
                resource_name,
                ..
            } => {
                let _ = writeln!(
                    output,
                    "\n  {} {resource_type}/{resource_name}",
                    self.paint(DIM, "resource:")
                );
            }
            CliError::Validation {
                field: Some(field), ..
            } => {
                let _ = writeln!(output, "\n  {} {field}", self.paint(DIM, "field:"));
            }
            _ => {}
        }
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}
