//! Export contracts shared by every format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use strum::{Display, EnumString};
use thiserror::Error;

/// Date pattern used by pt-BR documents.
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ExportFormat {
    /// Comma separated values with a header row.
    Csv,
    /// Complete HTML document that prints itself when opened.
    Html,
    /// One JSON object per record.
    JsonLines,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Html => "html",
            Self::JsonLines => "jsonl",
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output format.
    pub format: ExportFormat,
    /// `chrono` pattern applied to date cells.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Document title (HTML only).
    #[serde(default = "default_title")]
    pub title: String,
    /// Generation instant printed in the document; `None` uses the current time.
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn default_title() -> String {
    "Registro de Atividades de Tratamento".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            date_format: default_date_format(),
            title: default_title(),
            generated_at: None,
        }
    }
}

impl ExportConfig {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_date_format(mut self, pattern: impl Into<String>) -> Self {
        self.date_format = pattern.into();
        self
    }

    pub fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Render a cell as display text.
    pub fn render(&self, cell: &Cell) -> String {
        match cell {
            Cell::Text(text) => text.clone(),
            Cell::Date(Some(at)) => at.format(&self.date_format).to_string(),
            Cell::Bool(true) => "Sim".to_string(),
            Cell::Bool(false) => "Não".to_string(),
            Cell::Date(None) | Cell::Empty => String::new(),
        }
    }
}

/// One value in an exported row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Date(Option<DateTime<Utc>>),
    Bool(bool),
    Empty,
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Option<String>> for Cell {
    fn from(text: Option<String>) -> Self {
        text.map_or(Self::Empty, Self::Text)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for Cell {
    fn from(at: DateTime<Utc>) -> Self {
        Self::Date(Some(at))
    }
}

impl From<Option<DateTime<Utc>>> for Cell {
    fn from(at: Option<DateTime<Utc>>) -> Self {
        Self::Date(at)
    }
}

/// A record type with a fixed column layout.
pub trait ExportRecord {
    /// Column headers, in output order.
    fn columns() -> &'static [&'static str]
    where
        Self: Sized;

    /// Cells for this record, one per column.
    fn cells(&self) -> Vec<Cell>;
}

/// Export error.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("format error: {0}")]
    Format(String),
}

/// Export result.
pub type ExportResult<T> = Result<T, ExportError>;

/// Trait for export writers.
pub trait ExportWriter: Send {
    /// Write the export header.
    fn write_header(&mut self, columns: &[&str]) -> ExportResult<()>;

    /// Write a single record.
    fn write_record(&mut self, cells: &[Cell]) -> ExportResult<()>;

    /// Write the export footer.
    fn write_footer(&mut self) -> ExportResult<()>;

    /// Flush all buffered data.
    fn flush(&mut self) -> ExportResult<()>;

    /// Get bytes written so far.
    fn bytes_written(&self) -> u64;
}

/// Writer wrapper counting bytes.
pub(crate) struct CountingWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> CountingWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub(crate) fn written(&self) -> u64 {
        self.written
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Summary of a finished export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub records: usize,
    pub bytes_written: u64,
}
