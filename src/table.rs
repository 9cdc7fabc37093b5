use calamine::{Data, Range};

/// A text-valued sheet: one header row naming the columns, then data rows.
///
/// Every cell is coerced to text when loaded so lookups and pattern
/// matching behave the same whatever type the workbook stored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from a calamine range, taking the first row as headers.
    ///
    /// Repeated header names get a `.1`, `.2`, ... suffix so every column
    /// stays addressable by name. Short rows are padded with empty cells.
    pub fn from_range(range: &Range<Data>) -> Self {
        let mut rows = range.rows();
        let header = match rows.next() {
            Some(header) => header,
            None => return Table::default(),
        };

        let mut columns: Vec<String> = Vec::with_capacity(header.len());
        for cell in header {
            let base = cell_text(cell);
            let mut name = base.clone();
            let mut n = 1;
            while columns.contains(&name) {
                name = format!("{}.{}", base, n);
                n += 1;
            }
            columns.push(name);
        }

        let width = columns.len();
        let rows = rows
            .map(|row| {
                let mut values: Vec<String> = row.iter().take(width).map(cell_text).collect();
                values.resize(width, String::new());
                values
            })
            .collect();

        Table { columns, rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterate over the values of a column, or `None` if it doesn't exist.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &str> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[idx].as_str()))
    }

    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    /// Set a column's values, overwriting it if present or appending it
    /// as the rightmost column otherwise.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Move column `name` so it sits immediately to the right of `anchor`.
    ///
    /// Returns false and leaves the table untouched if either column is
    /// missing or they are the same column.
    pub fn move_after(&mut self, name: &str, anchor: &str) -> bool {
        if name == anchor {
            return false;
        }
        let from = match self.column_index(name) {
            Some(idx) => idx,
            None => return false,
        };
        if !self.has_column(anchor) {
            return false;
        }

        let column = self.columns.remove(from);
        let values: Vec<String> = self.rows.iter_mut().map(|row| row.remove(from)).collect();

        // anchor index is looked up after removal so it is always current
        let to = self.column_index(anchor).map(|idx| idx + 1).unwrap_or(self.columns.len());
        self.columns.insert(to, column);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(to, value);
        }
        true
    }
}

/// Render a workbook cell as text.
///
/// Numbers keep calamine's rendering of the stored value (a float holding a
/// whole number prints without a fraction); empty cells become "".
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}
