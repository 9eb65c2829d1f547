use std::pin::pin;

use futures_util::{StreamExt, stream};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_postgres::tls::NoTlsStream;
use tokio_postgres::{AsyncMessage, Client, Connection, NoTls, Socket};
use tracing::{debug, error, info, warn};

use crate::config::ConnectionConfig;
use crate::error::{SmokeError, describe_postgres};
use crate::results::ResultSet;
use crate::translation::translate_placeholders;

use super::prepared::PreparedStatement;
use super::query::build_result_set_from_simple;
use super::transaction::TxState;

/// What a simple-protocol command produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommandOutcome {
    /// Rows, when the command returned a row description
    pub rows: Option<ResultSet>,
    /// Count from the command-complete tag
    pub affected: Option<u64>,
}

/// A single connection to the database under test, with JDBC-style autocommit handling.
///
/// A background task drives the connection and logs server notices. Call
/// [`Session::close`] to shut it down cleanly; dropping the session closes the socket and
/// the server rolls back anything left open.
pub struct Session {
    client: Client,
    driver: JoinHandle<()>,
    state: TxState,
    label: String,
}

impl Session {
    /// Connect using `config`.
    ///
    /// # Errors
    /// Returns `SmokeError::ConfigError` for an invalid config and
    /// `SmokeError::ConnectionError` if the server cannot be reached or rejects the login.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, SmokeError> {
        Self::connect_labeled(config, "main").await
    }

    /// Connect with a label that tags every log line of this session.
    ///
    /// # Errors
    /// See [`Session::connect`].
    pub async fn connect_labeled(
        config: &ConnectionConfig,
        label: &str,
    ) -> Result<Self, SmokeError> {
        config.validate()?;
        let url = config.redacted_url();
        info!(session = label, %url, "connecting");

        let (client, connection) = config
            .to_tokio_config()
            .connect(NoTls)
            .await
            .map_err(|e| {
                let reason = describe_postgres(&e);
                error!(session = label, %url, error = %reason, "connection failed");
                SmokeError::ConnectionError(format!("failed to connect to {url}: {reason}"))
            })?;
        let driver = tokio::spawn(drive_connection(connection, label.to_string()));
        info!(session = label, "connected");

        Ok(Self {
            client,
            driver,
            state: TxState::default(),
            label: label.to_string(),
        })
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn autocommit(&self) -> bool {
        self.state.autocommit()
    }

    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.state.in_transaction()
    }

    /// Switch autocommit on or off. Turning it on commits an open transaction.
    ///
    /// # Errors
    /// Returns an error if the implied `COMMIT` fails.
    pub async fn set_autocommit(&mut self, autocommit: bool) -> Result<(), SmokeError> {
        debug!(session = %self.label, autocommit, "set autocommit");
        if let Some(sql) = self.state.set_autocommit(autocommit) {
            self.control(sql).await?;
        }
        Ok(())
    }

    /// Commit the open transaction, if any.
    ///
    /// # Errors
    /// Returns `SmokeError::ExecutionError` when autocommit is on, or the server error.
    pub async fn commit(&mut self) -> Result<(), SmokeError> {
        if let Some(sql) = self.state.commit()? {
            self.control(sql).await?;
        }
        Ok(())
    }

    /// Roll back the open transaction, if any.
    ///
    /// # Errors
    /// Returns `SmokeError::ExecutionError` when autocommit is on, or the server error.
    pub async fn rollback(&mut self) -> Result<(), SmokeError> {
        if let Some(sql) = self.state.rollback()? {
            self.control(sql).await?;
        }
        Ok(())
    }

    /// Run one statement without parameters and return the number of rows affected.
    ///
    /// # Errors
    /// Returns the server error.
    pub async fn execute(&mut self, sql: &str) -> Result<u64, SmokeError> {
        self.begin_if_needed().await?;
        debug!(session = %self.label, sql, "execute");
        Ok(self.client.execute(sql, &[]).await?)
    }

    /// Run one query without parameters. Values come back as the server renders them.
    ///
    /// # Errors
    /// Returns the server error, or `SmokeError::ExecutionError` if the statement returned
    /// no rows description.
    pub async fn query(&mut self, sql: &str) -> Result<ResultSet, SmokeError> {
        let outcome = self.simple_query(sql).await?;
        outcome.rows.ok_or_else(|| {
            SmokeError::ExecutionError(format!("statement returned no result set: {sql}"))
        })
    }

    /// Run a command through the simple protocol.
    ///
    /// `BEGIN`/`COMMIT` sent this way are not tracked by the session's autocommit state.
    ///
    /// # Errors
    /// Returns the server error.
    pub async fn simple_query(&mut self, sql: &str) -> Result<CommandOutcome, SmokeError> {
        self.begin_if_needed().await?;
        debug!(session = %self.label, sql, "simple query");
        let messages = self.client.simple_query(sql).await?;
        let (rows, affected) = build_result_set_from_simple(&messages);
        Ok(CommandOutcome { rows, affected })
    }

    /// Prepare a statement. JDBC-style `?` placeholders are rewritten to `$N`.
    ///
    /// # Errors
    /// Returns the server error.
    pub async fn prepare(&self, sql: &str) -> Result<PreparedStatement, SmokeError> {
        let translated = translate_placeholders(sql);
        debug!(session = %self.label, sql = %translated, "prepare");
        let statement = self.client.prepare(&translated).await?;
        Ok(PreparedStatement::new(sql, statement))
    }

    /// Whether a table with this name is visible on the search path.
    ///
    /// # Errors
    /// Returns the server error.
    pub async fn table_exists(&mut self, table: &str) -> Result<bool, SmokeError> {
        self.begin_if_needed().await?;
        let name = table.to_ascii_lowercase();
        let row = self
            .client
            .query_one(
                "select exists(select 1 from pg_catalog.pg_class c \
                 where c.relname = $1 and c.relkind in ('r', 'p') \
                 and pg_catalog.pg_table_is_visible(c.oid))",
                &[&name],
            )
            .await?;
        Ok(row.try_get(0)?)
    }

    /// Roll back anything still open and shut the connection down.
    ///
    /// # Errors
    /// Returns `SmokeError::Other` if the connection task panicked.
    pub async fn close(mut self) -> Result<(), SmokeError> {
        if self.state.in_transaction() {
            warn!(session = %self.label, "closing with an open transaction; rolling back");
            if let Err(e) = self.client.batch_execute("ROLLBACK").await {
                warn!(session = %self.label, error = %describe_postgres(&e), "rollback on close failed");
            }
            self.state.reset_open();
        }
        let Session {
            client,
            driver,
            label,
            ..
        } = self;
        drop(client);
        driver
            .await
            .map_err(|e| SmokeError::Other(format!("connection task for {label} failed: {e}")))?;
        info!(session = %label, "closed");
        Ok(())
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) async fn begin_if_needed(&mut self) -> Result<(), SmokeError> {
        if let Some(sql) = self.state.before_statement() {
            self.control(sql).await?;
            self.state.mark_open();
        }
        Ok(())
    }

    async fn control(&self, sql: &str) -> Result<(), SmokeError> {
        debug!(session = %self.label, sql, "transaction control");
        self.client.batch_execute(sql).await?;
        Ok(())
    }
}

async fn drive_connection(mut connection: Connection<Socket, NoTlsStream>, label: String) {
    let mut messages = pin!(stream::poll_fn(move |cx| connection.poll_message(cx)));
    while let Some(message) = messages.next().await {
        match message {
            Ok(AsyncMessage::Notice(notice)) => {
                info!(session = %label, severity = notice.severity(), "{}", notice.message());
            }
            Ok(_) => {}
            Err(e) => {
                error!(session = %label, error = %describe_postgres(&e), "connection error");
                break;
            }
        }
    }
    debug!(session = %label, "connection task finished");
}
