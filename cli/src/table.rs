//! Simple table formatting for CLI output.
//!
//! No borders, just whitespace alignment with the header row dimmed.

use colored::Colorize;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) -> &mut Self {
        self.rows.push(cells);
        self
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .fold(h.chars().count(), usize::max)
            })
            .collect()
    }

    fn line(cells: &[String], widths: &[usize]) -> String {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let width = widths.get(i).copied().unwrap_or(0);
                format!("{cell:<width$}")
            })
            .collect();
        padded.join("  ").trim_end().to_string()
    }

    /// Header line followed by one line per row, without color
    pub fn lines(&self) -> Vec<String> {
        let widths = self.widths();
        std::iter::once(Self::line(&self.headers, &widths))
            .chain(self.rows.iter().map(|row| Self::line(row, &widths)))
            .collect()
    }

    pub fn print(&self) {
        let mut lines = self.lines().into_iter();
        if let Some(header) = lines.next() {
            println!("  {}", header.dimmed());
        }
        for line in lines {
            println!("  {line}");
        }
    }
}
