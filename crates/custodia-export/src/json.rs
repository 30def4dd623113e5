//! JSON Lines export.

use crate::export::CountingWriter;
use crate::{Cell, ExportConfig, ExportError, ExportResult, ExportWriter};
use serde_json::{Map, Value};
use std::io::Write;

/// One JSON object per line, keyed by column name.
pub struct JsonLinesExporter<W: Write> {
    writer: CountingWriter<W>,
    config: ExportConfig,
    columns: Vec<String>,
}

impl<W: Write> JsonLinesExporter<W> {
    pub fn new(writer: W, config: ExportConfig) -> Self {
        Self {
            writer: CountingWriter::new(writer),
            config,
            columns: Vec::new(),
        }
    }

    fn value(&self, cell: &Cell) -> Value {
        match cell {
            Cell::Bool(b) => Value::Bool(*b),
            Cell::Empty | Cell::Date(None) => Value::Null,
            Cell::Date(Some(at)) => Value::String(at.to_rfc3339()),
            other => Value::String(self.config.render(other)),
        }
    }
}

impl<W: Write + Send> ExportWriter for JsonLinesExporter<W> {
    fn write_header(&mut self, columns: &[&str]) -> ExportResult<()> {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        Ok(())
    }

    fn write_record(&mut self, cells: &[Cell]) -> ExportResult<()> {
        if cells.len() != self.columns.len() {
            return Err(ExportError::Format(format!(
                "expected {} cells, got {}",
                self.columns.len(),
                cells.len()
            )));
        }
        let object: Map<String, Value> = self
            .columns
            .iter()
            .cloned()
            .zip(cells.iter().map(|c| self.value(c)))
            .collect();
        serde_json::to_writer(&mut self.writer, &object)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_footer(&mut self) -> ExportResult<()> {
        Ok(())
    }

    fn flush(&mut self) -> ExportResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn bytes_written(&self) -> u64 {
        self.writer.written()
    }
}
