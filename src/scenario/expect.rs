//! Expected results and the checks run with `--verify`.
//!
//! Rows are compared without regard to order: the scenarios select without `ORDER BY`,
//! and an updated row may come back after rows that were not touched.

use tracing::info;

use crate::error::SmokeError;
use crate::postgres::Session;
use crate::results::ResultSet;

const COLUMNS: [&str; 3] = ["id", "info", "wt"];

fn table(rows: &[&[&str]]) -> ResultSet {
    ResultSet::from_rows(&COLUMNS, rows)
}

/// After the two inserts and the update of id 1.
#[must_use]
pub fn after_update() -> ResultSet {
    table(&[&["1", "record1", "12"], &["2", "record2", "2"]])
}

/// After deleting id 1.
#[must_use]
pub fn after_delete() -> ResultSet {
    table(&[&["2", "record2", "2"]])
}

/// Id 1 as re-inserted through the prepared insert.
#[must_use]
pub fn reinserted() -> ResultSet {
    table(&[&["1", "rec1", "11"]])
}

/// Id 2, untouched since the first inserts.
#[must_use]
pub fn untouched() -> ResultSet {
    table(&[&["2", "record2", "2"]])
}

/// Ids 1 and 2 after the two prepared updates.
#[must_use]
pub fn prepared_updates() -> [ResultSet; 2] {
    [table(&[&["1", "Rec1", "2"]]), table(&[&["2", "Rec2", "3"]])]
}

#[must_use]
pub fn empty() -> ResultSet {
    table(&[])
}

/// Compare values, ignoring row order and column names.
///
/// # Errors
/// Returns `SmokeError::Mismatch` naming `step` on any difference.
pub fn check_rows(step: &str, expected: &ResultSet, actual: &ResultSet) -> Result<(), SmokeError> {
    if expected.sorted().same_values(&actual.sorted()) {
        info!(step, "rows as expected");
        Ok(())
    } else {
        Err(SmokeError::mismatch(step, expected, actual))
    }
}

/// Check whether `observer` can see the row with `id`.
///
/// The observer runs in autocommit mode on its own connection, so it only sees committed
/// data.
///
/// # Errors
/// Returns `SmokeError::Mismatch` if visibility differs from `visible`, or the query error.
pub async fn check_visibility(
    observer: &mut Session,
    table: &str,
    id: i64,
    visible: bool,
) -> Result<(), SmokeError> {
    let rs = observer
        .query(&format!("select id from {table} where id = {id}"))
        .await?;
    let seen = !rs.is_empty();
    if seen == visible {
        info!(table, id, visible, "visibility as expected");
        Ok(())
    } else {
        let describe = |v: bool| if v { "visible" } else { "not visible" };
        Err(SmokeError::mismatch(
            format!("visibility of {table}.id={id}"),
            describe(visible),
            describe(seen),
        ))
    }
}

/// # Errors
/// Returns `SmokeError::Mismatch` if the table still exists, or the query error.
pub async fn check_dropped(session: &mut Session, table: &str) -> Result<(), SmokeError> {
    if session.table_exists(table).await? {
        Err(SmokeError::mismatch(
            format!("drop table {table}"),
            "table absent",
            "table still exists",
        ))
    } else {
        info!(table, "table dropped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_ignored() {
        let actual = table(&[&["2", "record2", "2"], &["1", "record1", "12"]]);
        assert!(check_rows("res1", &after_update(), &actual).is_ok());
    }

    #[test]
    fn differences_are_reported() {
        let actual = table(&[&["1", "record1", "1"], &["2", "record2", "2"]]);
        let err = check_rows("res1", &after_update(), &actual).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected result at res1: expected [[1, record1, 12], [2, record2, 2]], \
             got [[1, record1, 1], [2, record2, 2]]"
        );

        let err = check_rows("res2", &after_delete(), &empty()).unwrap_err();
        assert!(matches!(err, SmokeError::Mismatch { ref step, .. } if step == "res2"));
    }

    #[test]
    fn expected_tables_render_like_the_report() {
        assert_eq!(after_delete().to_string(), "[[2, record2, 2]]");
        assert_eq!(reinserted().to_string(), "[[1, rec1, 11]]");
        let [first, second] = prepared_updates();
        assert_eq!(first.to_string(), "[[1, Rec1, 2]]");
        assert_eq!(second.to_string(), "[[2, Rec2, 3]]");
        assert_eq!(empty().to_string(), "[]");
    }
}
