use chrono::NaiveDateTime;
use serde::Serialize;

/// Positional values bound to prepared statements.
///
/// ```rust
/// use pgwire_smoke::RowValues;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("rec1".into()),
///     RowValues::Int(11),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RowValues {
    /// Integer value, narrowed to the parameter type the server inferred
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
}

impl From<i64> for RowValues {
    fn from(value: i64) -> Self {
        RowValues::Int(value)
    }
}

impl From<i32> for RowValues {
    fn from(value: i32) -> Self {
        RowValues::Int(i64::from(value))
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

/// Render parameters as SQL literals for logs: `1, 'rec1', NULL`.
pub(crate) fn render_params(params: &[RowValues]) -> String {
    params
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl std::fmt::Display for RowValues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowValues::Int(i) => write!(f, "{i}"),
            RowValues::Float(v) => write!(f, "{v}"),
            RowValues::Text(s) => write!(f, "'{s}'"),
            RowValues::Bool(b) => write!(f, "{b}"),
            RowValues::Timestamp(ts) => write!(f, "'{ts}'"),
            RowValues::Null => f.write_str("NULL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(RowValues::from(7), RowValues::Int(7));
        assert_eq!(RowValues::from(12_i64), RowValues::Int(12));
        assert_eq!(RowValues::from("rec1"), RowValues::Text("rec1".into()));
        assert_eq!(RowValues::from(String::from("Rec2")), RowValues::Text("Rec2".into()));
        assert_eq!(RowValues::from(false), RowValues::Bool(false));
    }

    #[test]
    fn display_reads_like_sql_literals() {
        let rendered: Vec<String> = [RowValues::from("Rec1"), RowValues::Int(2), RowValues::Null]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(rendered, vec!["'Rec1'", "2", "NULL"]);
        assert_eq!(
            render_params(&[RowValues::Int(1), "rec1".into(), RowValues::Int(11)]),
            "1, 'rec1', 11"
        );
    }
}
