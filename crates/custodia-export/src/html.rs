//! Printable HTML export.

use crate::export::CountingWriter;
use crate::{Cell, ExportConfig, ExportResult, ExportWriter};
use chrono::Utc;
use std::io::Write;

const STYLE: &str = "\
body { font-family: Arial, Helvetica, sans-serif; margin: 24px; color: #1f2933; }
h1 { font-size: 20px; margin-bottom: 4px; }
.generated { font-size: 12px; color: #52606d; margin-bottom: 16px; }
table { width: 100%; border-collapse: collapse; font-size: 11px; }
th, td { border: 1px solid #cbd2d9; padding: 6px 8px; text-align: left; vertical-align: top; }
th { background: #f0f4f8; }
tr:nth-child(even) td { background: #fafbfc; }
@media print { body { margin: 0; } }";

/// Escape text for HTML element and attribute content.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Builds a standalone HTML document that opens the print dialog on load.
pub struct HtmlPrintExporter<W: Write> {
    writer: CountingWriter<W>,
    config: ExportConfig,
}

impl<W: Write> HtmlPrintExporter<W> {
    pub fn new(writer: W, config: ExportConfig) -> Self {
        Self {
            writer: CountingWriter::new(writer),
            config,
        }
    }
}

impl<W: Write + Send> ExportWriter for HtmlPrintExporter<W> {
    fn write_header(&mut self, columns: &[&str]) -> ExportResult<()> {
        let title = escape_html(&self.config.title);
        let generated = self
            .config
            .generated_at
            .unwrap_or_else(Utc::now)
            .format(&self.config.date_format)
            .to_string();

        write!(
            self.writer,
            "<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{title}</title>\n<style>\n{STYLE}\n</style>\n</head>\n\
             <body onload=\"window.print()\">\n<h1>{title}</h1>\n\
             <p class=\"generated\">Gerado em {generated}</p>\n<table>\n<thead>\n<tr>"
        )?;
        for column in columns {
            write!(self.writer, "<th>{}</th>", escape_html(column))?;
        }
        writeln!(self.writer, "</tr>\n</thead>\n<tbody>")?;
        Ok(())
    }

    fn write_record(&mut self, cells: &[Cell]) -> ExportResult<()> {
        write!(self.writer, "<tr>")?;
        for cell in cells {
            let text = self.config.render(cell);
            write!(self.writer, "<td>{}</td>", escape_html(&text))?;
        }
        writeln!(self.writer, "</tr>")?;
        Ok(())
    }

    fn write_footer(&mut self) -> ExportResult<()> {
        writeln!(self.writer, "</tbody>\n</table>\n</body>\n</html>")?;
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
    use chrono::TimeZone;

    fn render(cells: &[Cell]) -> String {
        let config = ExportConfig::new(ExportFormat::Html)
            .with_title("RAT <Acme>")
            .generated_at(Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap());
        let mut out = Vec::new();
        {
            let mut exporter = HtmlPrintExporter::new(&mut out, config);
            exporter.write_header(&["Nome", "Criado em"]).unwrap();
            exporter.write_record(cells).unwrap();
            exporter.write_footer().unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_document_shape() {
        let html = render(&[Cell::from("Folha"), Cell::Date(None)]);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<body onload=\"window.print()\">"));
        assert!(html.contains("<style>"));
        assert!(html.contains("<title>RAT &lt;Acme&gt;</title>"));
        assert!(html.contains("Gerado em 02/05/2024"));
        assert!(html.contains("<th>Nome</th><th>Criado em</th>"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_values_are_escaped() {
        let html = render(&[Cell::from("<script>alert('x')</script> & co"), Cell::Empty]);
        assert!(html.contains("<td>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; co</td>"));
        assert!(!html.contains("<script>"));
    }
}
