//! CSV export.

use crate::export::CountingWriter;
use crate::{Cell, ExportConfig, ExportResult, ExportWriter};
use std::io::Write;

/// Replace characters that would break a naive CSV reader.
///
/// Commas become `;` and line breaks become single spaces; no quoting is
/// applied.
pub fn escape_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ',' => out.push(';'),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push(' ');
            }
            '\n' => out.push(' '),
            other => out.push(other),
        }
    }
    out
}

/// CSV exporter: header row plus one line per record.
pub struct CsvExporter<W: Write> {
    writer: CountingWriter<W>,
    config: ExportConfig,
}

impl<W: Write> CsvExporter<W> {
    pub fn new(writer: W, config: ExportConfig) -> Self {
        Self {
            writer: CountingWriter::new(writer),
            config,
        }
    }

    fn write_line(&mut self, fields: impl Iterator<Item = String>) -> ExportResult<()> {
        let line = fields
            .map(|f| escape_field(&f))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }
}

impl<W: Write + Send> ExportWriter for CsvExporter<W> {
    fn write_header(&mut self, columns: &[&str]) -> ExportResult<()> {
        self.write_line(columns.iter().map(|c| c.to_string()))
    }

    fn write_record(&mut self, cells: &[Cell]) -> ExportResult<()> {
        let rendered: Vec<String> = cells.iter().map(|c| self.config.render(c)).collect();
        self.write_line(rendered.into_iter())
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExportFormat;
    use test_case::test_case;

    #[test_case("Folha, RH", "Folha; RH" ; "comma")]
    #[test_case("linha 1\nlinha 2", "linha 1 linha 2" ; "newline")]
    #[test_case("a\r\nb", "a b" ; "crlf")]
    #[test_case("sem alteração", "sem alteração" ; "plain")]
    fn test_escape_field(input: &str, expected: &str) {
        assert_eq!(escape_field(input), expected);
    }

    #[test]
    fn test_header_and_rows() {
        let mut out = Vec::new();
        {
            let mut exporter = CsvExporter::new(&mut out, ExportConfig::new(ExportFormat::Csv));
            exporter.write_header(&["Nome", "Ativo"]).unwrap();
            exporter
                .write_record(&[Cell::from("Folha, mensal"), Cell::Bool(false)])
                .unwrap();
            exporter.write_footer().unwrap();
            assert_eq!(exporter.bytes_written(), "Nome,Ativo\nFolha; mensal,Não\n".len() as u64);
        }
        assert_eq!(String::from_utf8(out).unwrap(), "Nome,Ativo\nFolha; mensal,Não\n");
    }
}
