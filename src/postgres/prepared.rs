use tokio_postgres::Statement;
use tokio_postgres::types::Type;
use tracing::debug;

use crate::error::SmokeError;
use crate::results::ResultSet;
use crate::types::{RowValues, render_params};

use super::params::Params;
use super::query::build_result_set_from_statement;
use super::session::Session;

/// A server-side prepared statement. The server copy is closed when this is dropped.
#[derive(Debug)]
pub struct PreparedStatement {
    sql: String,
    statement: Statement,
}

impl PreparedStatement {
    pub(crate) fn new(sql: &str, statement: Statement) -> Self {
        Self {
            sql: sql.to_string(),
            statement,
        }
    }

    /// The SQL as written by the caller, before placeholder rewriting.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameter types the server inferred.
    #[must_use]
    pub fn param_types(&self) -> &[Type] {
        self.statement.params()
    }

    /// Execute a DML statement and return the affected row count.
    ///
    /// # Errors
    /// Returns an error if parameter conversion or execution fails.
    pub async fn execute_update(
        &self,
        session: &mut Session,
        params: &[RowValues],
    ) -> Result<u64, SmokeError> {
        let converted = Params::convert(params, self.statement.params())?;
        session.begin_if_needed().await?;
        debug!(session = session.label(), sql = %self.sql, params = %render_params(params), "execute prepared");
        Ok(session
            .client()
            .execute(&self.statement, converted.as_refs())
            .await?)
    }

    /// Execute a query and return its rows as text.
    ///
    /// # Errors
    /// Returns an error if parameter conversion, execution, or value extraction fails.
    pub async fn execute_query(
        &self,
        session: &mut Session,
        params: &[RowValues],
    ) -> Result<ResultSet, SmokeError> {
        let converted = Params::convert(params, self.statement.params())?;
        session.begin_if_needed().await?;
        debug!(session = session.label(), sql = %self.sql, params = %render_params(params), "query prepared");
        let rows = session
            .client()
            .query(&self.statement, converted.as_refs())
            .await?;
        build_result_set_from_statement(&self.statement, &rows)
    }
}
