use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use super::row::TextRow;

/// A result set from a database query
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    /// Column names shared by all rows
    #[serde(serialize_with = "serialize_columns")]
    pub columns: Arc<Vec<String>>,
    /// The rows returned by the query
    pub rows: Vec<TextRow>,
}

impl ResultSet {
    /// Create an empty result set with a known capacity
    #[must_use]
    pub fn with_capacity(columns: Arc<Vec<String>>, capacity: usize) -> ResultSet {
        ResultSet {
            columns,
            rows: Vec::with_capacity(capacity),
        }
    }

    /// Build a result set from literal rows. Handy for expected values.
    ///
    /// ```rust
    /// use pgwire_smoke::ResultSet;
    ///
    /// let rs = ResultSet::from_rows(&["id", "info", "wt"], &[&["2", "record2", "2"]]);
    /// assert_eq!(rs.to_string(), "[[2, record2, 2]]");
    /// ```
    #[must_use]
    pub fn from_rows(columns: &[&str], rows: &[&[&str]]) -> ResultSet {
        let columns = Arc::new(columns.iter().map(ToString::to_string).collect::<Vec<_>>());
        let mut rs = ResultSet::with_capacity(columns, rows.len());
        for row in rows {
            rs.add_row_values(row.iter().map(|v| Some((*v).to_string())).collect());
        }
        rs
    }

    /// Append a row sharing this result set's column names
    pub fn add_row_values(&mut self, values: Vec<Option<String>>) {
        self.rows.push(TextRow::new(Arc::clone(&self.columns), values));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// A copy with rows ordered by their values.
    #[must_use]
    pub fn sorted(&self) -> ResultSet {
        let mut rs = self.clone();
        rs.rows.sort_by(|left, right| left.values.cmp(&right.values));
        rs
    }

    /// Compare values only, ignoring column names.
    #[must_use]
    pub fn same_values(&self, other: &ResultSet) -> bool {
        self.rows.len() == other.rows.len()
            && self
                .rows
                .iter()
                .zip(&other.rows)
                .all(|(left, right)| left.values == right.values)
    }
}

fn serialize_columns<S: Serializer>(columns: &Arc<Vec<String>>, s: S) -> Result<S::Ok, S::Error> {
    columns.as_slice().serialize(s)
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, row) in self.rows.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{row}")?;
        }
        f.write_str("]")
    }
}
