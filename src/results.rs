//! Result sets as text.
//!
//! Every value is kept as the text the server renders for it (`None` for SQL NULL), and a
//! result set prints as a nested list: `[[1, record1, 12], [2, record2, 2]]`.

mod result_set;
mod row;

pub use result_set::ResultSet;
pub use row::TextRow;
