//! Plain-text tables.

use std::fmt;

/// A fixed-header text table.
///
/// ```text
/// |------+---------------------|
/// | Path | Mandatory Approvers |
/// |------+---------------------|
/// | a.rs | [@a]                |
/// |------+---------------------|
/// ```
///
/// Column widths follow the headers and the widest cell, counted in
/// characters. Cells beyond the header columns are appended after the
/// closing `|` without padding to a width. Lines never end in spaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    headers: Vec<String>,
    /// An empty row renders as a separator.
    rows: Vec<Vec<String>>,
}

impl StringTable {
    /// Creates a table with the given column headers.
    pub fn with_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    pub fn add_row<I, S>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    /// Appends a separator line.
    pub fn add_separator(&mut self) -> &mut Self {
        self.rows.push(Vec::new());
        self
    }

    /// Returns the number of rows, separators included.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(column, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(column))
                    .map(|cell| cell.chars().count())
                    .fold(header.chars().count(), usize::max)
            })
            .collect()
    }

    fn write_separator(out: &mut String, widths: &[usize]) {
        for (index, width) in widths.iter().enumerate() {
            out.push(if index == 0 { '|' } else { '+' });
            out.push_str(&"-".repeat(width + 2));
        }
        out.push('|');
    }

    fn write_row(out: &mut String, widths: &[usize], cells: &[String]) {
        if cells.is_empty() {
            Self::write_separator(out, widths);
            return;
        }

        let columns = widths.len().max(cells.len());
        for column in 0..columns {
            let width = widths.get(column).copied().unwrap_or(1);
            if column <= widths.len() {
                out.push('|');
            }
            let cell = cells.get(column).map(String::as_str).unwrap_or("");
            let padding = width.saturating_sub(cell.chars().count());
            out.push(' ');
            out.push_str(cell);
            out.push_str(&" ".repeat(padding));
            out.push(' ');
        }
        if columns <= widths.len() {
            out.push('|');
        }
        let end = out.trim_end_matches(' ').len();
        out.truncate(end);
    }
}

impl fmt::Display for StringTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.column_widths();
        let mut out = String::new();

        Self::write_separator(&mut out, &widths);
        out.push('\n');
        Self::write_row(&mut out, &widths, &self.headers);
        out.push('\n');
        Self::write_separator(&mut out, &widths);
        out.push('\n');
        for row in &self.rows {
            Self::write_row(&mut out, &widths, row);
            out.push('\n');
        }
        Self::write_separator(&mut out, &widths);
        out.push('\n');

        f.write_str(&out)
    }
}

/// Renders a list the way the report shows approvers: `[@a, @b]`.
pub fn bracketed_list(items: &[String]) -> String {
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_padded_columns() {
        let mut table = StringTable::with_headers(["Path", "Mandatory Approvers"]);
        table.add_row(["src/lib.rs", "[@a, @b]"]);
        table.add_row(["x", "[]"]);

        let expected = "\
|------------+---------------------|
| Path       | Mandatory Approvers |
|------------+---------------------|
| src/lib.rs | [@a, @b]            |
| x          | []                  |
|------------+---------------------|
";
        assert_eq!(table.to_string(), expected);
    }

    #[test]
    fn extra_cells_follow_closing_pipe() {
        let mut table = StringTable::with_headers(["Path", "Approvers"]);
        table.add_row(["a", "[]", "<-- NO APPROVERS!"]);
        let rendered = table.to_string();
        assert!(rendered.contains("| a    | []        | <-- NO APPROVERS!\n"));
        assert!(rendered.lines().all(|line| !line.ends_with(' ')));
    }

    #[test]
    fn separator_rows_and_short_rows() {
        let mut table = StringTable::with_headers(["One", "Two"]);
        table.add_row(["1"]).add_separator().add_row(["11", "22"]);
        let lines: Vec<_> = table.to_string().lines().map(str::to_string).collect();
        assert_eq!(lines[3], "| 1   |     |");
        assert_eq!(lines[4], "|-----+-----|");
        assert_eq!(lines[5], "| 11  | 22  |");
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn widths_count_characters() {
        let mut table = StringTable::with_headers(["P"]);
        table.add_row(["née"]);
        assert!(table.to_string().contains("| née |"));
    }

    #[test]
    fn bracketed_list_formats() {
        assert_eq!(bracketed_list(&[]), "[]");
        assert_eq!(
            bracketed_list(&["@a".to_string(), "@b".to_string()]),
            "[@a, @b]"
        );
    }
}
