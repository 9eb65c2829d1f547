use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// A row from a query result.
///
/// Column names are shared across all rows of the same result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRow {
    #[serde(skip)]
    pub column_names: Arc<Vec<String>>,
    /// The values for this row, `None` for SQL NULL
    pub values: Vec<Option<String>>,
}

impl TextRow {
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<Option<String>>) -> Self {
        Self {
            column_names,
            values,
        }
    }

    /// Get the index of a column by name
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_names.iter().position(|col| col == column_name)
    }

    /// Get a value by column name. The outer `Option` is `None` when the column is unknown.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<Option<&str>> {
        self.get_column_index(column_name)
            .and_then(|idx| self.get_by_index(idx))
    }

    /// Get a value by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<Option<&str>> {
        self.values.get(index).map(Option::as_deref)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for TextRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, value) in self.values.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            f.write_str(value.as_deref().unwrap_or("null"))?;
        }
        f.write_str("]")
    }
}
