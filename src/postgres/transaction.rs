use serde::Serialize;

use crate::error::SmokeError;

/// Autocommit bookkeeping for a session.
///
/// Mirrors what a JDBC connection does on top of PostgreSQL, which has no server-side
/// autocommit switch: in manual mode the first statement opens a transaction, and turning
/// autocommit back on commits whatever is open.
///
/// Each transition returns the control statement the caller must send, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum TxState {
    /// Every statement commits on its own.
    #[default]
    AutoCommit,
    /// Manual mode; `open` tracks whether `BEGIN` has been sent.
    Manual { open: bool },
}

impl TxState {
    #[must_use]
    pub fn autocommit(self) -> bool {
        matches!(self, TxState::AutoCommit)
    }

    #[must_use]
    pub fn in_transaction(self) -> bool {
        matches!(self, TxState::Manual { open: true })
    }

    /// Called before each statement. After sending the returned `BEGIN`, the caller
    /// confirms it with [`TxState::mark_open`].
    #[must_use]
    pub fn before_statement(self) -> Option<&'static str> {
        match self {
            TxState::Manual { open: false } => Some("BEGIN"),
            _ => None,
        }
    }

    /// The server accepted `BEGIN`.
    pub fn mark_open(&mut self) {
        if let TxState::Manual { open } = self {
            *open = true;
        }
    }

    pub fn set_autocommit(&mut self, autocommit: bool) -> Option<&'static str> {
        match (*self, autocommit) {
            (TxState::AutoCommit, true) | (TxState::Manual { .. }, false) => None,
            (TxState::AutoCommit, false) => {
                *self = TxState::Manual { open: false };
                None
            }
            (TxState::Manual { open }, true) => {
                *self = TxState::AutoCommit;
                open.then_some("COMMIT")
            }
        }
    }

    /// # Errors
    /// Returns `SmokeError::ExecutionError` when autocommit is on.
    pub fn commit(&mut self) -> Result<Option<&'static str>, SmokeError> {
        self.finish("COMMIT", "commit")
    }

    /// # Errors
    /// Returns `SmokeError::ExecutionError` when autocommit is on.
    pub fn rollback(&mut self) -> Result<Option<&'static str>, SmokeError> {
        self.finish("ROLLBACK", "rollback")
    }

    fn finish(
        &mut self,
        sql: &'static str,
        action: &str,
    ) -> Result<Option<&'static str>, SmokeError> {
        match *self {
            TxState::AutoCommit => Err(SmokeError::ExecutionError(format!(
                "cannot {action} when autocommit is enabled"
            ))),
            TxState::Manual { open } => {
                *self = TxState::Manual { open: false };
                Ok(open.then_some(sql))
            }
        }
    }

    /// The server dropped out of the transaction (e.g. the connection is closing).
    pub fn reset_open(&mut self) {
        if let TxState::Manual { open } = self {
            *open = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autocommit_never_begins() {
        let state = TxState::default();
        assert!(state.autocommit());
        assert_eq!(state.before_statement(), None);
        assert_eq!(state.before_statement(), None);
        assert!(!state.in_transaction());
    }

    #[test]
    fn manual_mode_begins_once_and_commits() {
        let mut state = TxState::default();
        assert_eq!(state.set_autocommit(false), None);
        assert!(!state.autocommit());
        assert!(!state.in_transaction());

        assert_eq!(state.before_statement(), Some("BEGIN"));
        state.mark_open();
        assert_eq!(state.before_statement(), None);
        assert!(state.in_transaction());

        assert_eq!(state.commit().unwrap(), Some("COMMIT"));
        assert!(!state.in_transaction());
        assert!(!state.autocommit());

        // Nothing open: commit is a no-op, next statement begins again.
        assert_eq!(state.commit().unwrap(), None);
        assert_eq!(state.before_statement(), Some("BEGIN"));
        state.mark_open();
        assert_eq!(state.rollback().unwrap(), Some("ROLLBACK"));
    }

    #[test]
    fn failed_begin_leaves_nothing_open() {
        let mut state = TxState::Manual { open: false };
        // BEGIN requested but never confirmed
        assert_eq!(state.before_statement(), Some("BEGIN"));
        assert!(!state.in_transaction());
        assert_eq!(state.commit().unwrap(), None);
        assert_eq!(state.rollback().unwrap(), None);
        assert_eq!(state.set_autocommit(true), None);
        assert!(state.autocommit());
    }

    #[test]
    fn mark_open_is_ignored_in_autocommit() {
        let mut state = TxState::AutoCommit;
        state.mark_open();
        assert_eq!(state, TxState::AutoCommit);
    }

    #[test]
    fn enabling_autocommit_commits_open_work() {
        let mut state = TxState::Manual { open: true };
        assert_eq!(state.set_autocommit(true), Some("COMMIT"));
        assert_eq!(state, TxState::AutoCommit);

        let mut idle = TxState::Manual { open: false };
        assert_eq!(idle.set_autocommit(true), None);
        assert_eq!(idle, TxState::AutoCommit);
    }

    #[test]
    fn repeated_mode_changes_are_noops() {
        let mut state = TxState::Manual { open: true };
        assert_eq!(state.set_autocommit(false), None);
        assert!(state.in_transaction());

        let mut auto = TxState::AutoCommit;
        assert_eq!(auto.set_autocommit(true), None);
    }

    #[test]
    fn commit_and_rollback_require_manual_mode() {
        let mut state = TxState::AutoCommit;
        let err = state.commit().unwrap_err();
        assert_eq!(
            err.to_string(),
            "SQL execution error: cannot commit when autocommit is enabled"
        );
        assert!(state.rollback().is_err());
    }

    #[test]
    fn reset_open_keeps_mode() {
        let mut state = TxState::Manual { open: true };
        state.reset_open();
        assert_eq!(state, TxState::Manual { open: false });
    }
}
