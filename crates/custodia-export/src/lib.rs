//! CSV and printable HTML export for Custodia records.
//!
//! Any type implementing [`ExportRecord`] can be written with
//! [`export_records`]. Dates follow the configured pattern, `dd/mm/yyyy`
//! by default.

mod csv;
mod export;
mod html;
mod json;

pub use crate::csv::{escape_field, CsvExporter};
pub use export::{
    Cell, ExportConfig, ExportError, ExportFormat, ExportRecord, ExportResult, ExportSummary,
    ExportWriter, DEFAULT_DATE_FORMAT,
};
pub use html::{escape_html, HtmlPrintExporter};
pub use json::JsonLinesExporter;

use std::io::Write;

/// Create an export writer for the given format and configuration.
pub fn create_exporter<'w, W: Write + Send + 'w>(
    writer: W,
    config: ExportConfig,
) -> Box<dyn ExportWriter + 'w> {
    match config.format {
        ExportFormat::Csv => Box::new(CsvExporter::new(writer, config)),
        ExportFormat::Html => Box::new(HtmlPrintExporter::new(writer, config)),
        ExportFormat::JsonLines => Box::new(JsonLinesExporter::new(writer, config)),
    }
}

/// Write every record with the configured format.
pub fn export_records<R: ExportRecord, W: Write + Send>(
    writer: W,
    config: ExportConfig,
    records: &[R],
) -> ExportResult<ExportSummary> {
    let mut exporter = create_exporter(writer, config);
    exporter.write_header(R::columns())?;
    for record in records {
        exporter.write_record(&record.cells())?;
    }
    exporter.write_footer()?;
    exporter.flush()?;

    Ok(ExportSummary {
        records: records.len(),
        bytes_written: exporter.bytes_written(),
    })
}

/// Export into an in-memory string.
pub fn export_to_string<R: ExportRecord>(
    config: ExportConfig,
    records: &[R],
) -> ExportResult<String> {
    let mut buffer = Vec::new();
    export_records(&mut buffer, config, records)?;
    String::from_utf8(buffer).map_err(|e| ExportError::Format(e.to_string()))
}
