//! Parsed rows of an import file.

use serde::{Deserialize, Serialize};

/// Rows of the import file as parsed, plus whether the first row is a header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportTable {
    pub rows: Vec<Vec<String>>,
    pub has_header: bool,
}

impl ImportTable {
    #[must_use]
    pub fn new(rows: Vec<Vec<String>>, has_header: bool) -> Self {
        Self { rows, has_header }
    }

    /// The header row, when the file has one.
    #[must_use]
    pub fn header(&self) -> Option<&[String]> {
        if self.has_header {
            self.rows.first().map(Vec::as_slice)
        } else {
            None
        }
    }

    /// Rows after the header.
    #[must_use]
    pub fn data_rows(&self) -> &[Vec<String>] {
        if self.has_header && !self.rows.is_empty() {
            &self.rows[1..]
        } else {
            &self.rows
        }
    }

    /// Number of data rows.
    #[must_use]
    pub fn data_len(&self) -> usize {
        self.data_rows().len()
    }

    /// Widest row, in fields.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// 1-based row number shown to users for a 0-based data row index.
    #[must_use]
    pub fn display_row(&self, data_index: usize) -> usize {
        data_index + 1 + usize::from(self.has_header)
    }

    /// Inverse of [`Self::display_row`]. `None` for the header row or
    /// out-of-range numbers.
    #[must_use]
    pub fn data_index(&self, display_row: usize) -> Option<usize> {
        let index = display_row.checked_sub(1 + usize::from(self.has_header))?;
        (index < self.data_len()).then_some(index)
    }

    /// Cell of a data row, `None` when the row is short.
    #[must_use]
    pub fn cell(&self, data_index: usize, column: usize) -> Option<&str> {
        self.data_rows()
            .get(data_index)
            .and_then(|row| row.get(column))
            .map(String::as_str)
    }

    /// Overwrite a cell of a data row, padding short rows with empty fields.
    ///
    /// Returns the previous value, or `None` when the row does not exist.
    pub fn set_cell(&mut self, data_index: usize, column: usize, value: String) -> Option<String> {
        let offset = usize::from(self.has_header);
        let row = self.rows.get_mut(data_index + offset)?;
        if row.len() <= column {
            row.resize(column + 1, String::new());
        }
        Some(std::mem::replace(&mut row[column], value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(has_header: bool) -> ImportTable {
        ImportTable::new(
            vec![
                vec!["Name".to_string(), "Email".to_string()],
                vec!["Ann".to_string(), "ann@x.io".to_string()],
                vec!["Bob".to_string()],
            ],
            has_header,
        )
    }

    #[test]
    fn row_numbers_offset_by_header() {
        let with_header = table(true);
        assert_eq!(with_header.data_len(), 2);
        assert_eq!(with_header.display_row(0), 2);
        assert_eq!(with_header.data_index(3), Some(1));
        assert_eq!(with_header.data_index(1), None);

        let without_header = table(false);
        assert_eq!(without_header.display_row(0), 1);
        assert!(without_header.header().is_none());
    }

    #[test]
    fn set_cell_pads_short_rows() {
        let mut t = table(true);
        let previous = t.set_cell(1, 1, "bob@x.io".to_string());
        assert_eq!(previous, Some(String::new()));
        assert_eq!(t.cell(1, 1), Some("bob@x.io"));
        assert!(t.set_cell(5, 0, "x".to_string()).is_none());
    }
}
