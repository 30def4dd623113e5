//! Table formatting for CLI output.

/// Column alignment
#[derive(Debug, Clone, Copy, Default)]
pub enum Alignment {
    #[default]
    Left,
    Right,
}

/// Table column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    pub alignment: Alignment,
    pub min_width: usize,
    pub max_width: Option<usize>,
}

impl Column {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            alignment: Alignment::Left,
            min_width: 0,
            max_width: None,
        }
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn min_width(mut self, width: usize) -> Self {
        self.min_width = width;
        self
    }

    pub fn max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }
}

fn width_of(text: &str) -> usize {
    text.chars().count()
}

/// Table structure
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<impl Into<String>>) {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Calculate column widths
    fn calculate_widths(&self, max_total: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .columns
            .iter()
            .map(|c| width_of(&c.header).max(c.min_width))
            .collect();

        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(width_of(cell));
                }
            }
        }

        for (i, col) in self.columns.iter().enumerate() {
            if let Some(max) = col.max_width {
                widths[i] = widths[i].min(max);
            }
        }

        // Ensure fits in terminal
        let separator_width = self.columns.len().saturating_sub(1) * 3;
        let total: usize = widths.iter().sum::<usize>() + separator_width;
        if total > max_total && widths.len() > 1 {
            let excess = total - max_total;
            let reduce_per = excess / widths.len() + 1;
            for w in &mut widths {
                *w = (*w).saturating_sub(reduce_per).max(5);
            }
        }

        widths
    }

    /// Render the table to a string, header and dashed rule first
    pub fn render(&self, max_width: usize) -> String {
        let widths = self.calculate_widths(max_width);
        let mut output = String::new();
        self.render_plain(&mut output, &widths);
        output
    }

    fn render_line(&self, cells: &[String], widths: &[usize]) -> Vec<String> {
        cells
            .iter()
            .zip(&self.columns)
            .zip(widths)
            .map(|((cell, col), &w)| format_cell(cell, w, col.alignment))
            .collect()
    }

    fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.header.clone()).collect()
    }

    fn render_plain(&self, output: &mut String, widths: &[usize]) {
        output.push_str(self.render_line(&self.headers(), widths).join("   ").trim_end());
        output.push('\n');

        let sep: Vec<_> = widths.iter().map(|&w| "-".repeat(w)).collect();
        output.push_str(&sep.join("   "));
        output.push('\n');

        for row in &self.rows {
            output.push_str(self.render_line(row, widths).join("   ").trim_end());
            output.push('\n');
        }
    }
}

fn format_cell(content: &str, width: usize, alignment: Alignment) -> String {
    let content = if width_of(content) > width {
        let kept: String = content.chars().take(width.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        content.to_string()
    };

    match alignment {
        Alignment::Left => format!("{content:<width$}"),
        Alignment::Right => format!("{content:>width$}"),
    }
}
