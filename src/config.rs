use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use tokio_postgres::config::Host;

use crate::error::SmokeError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5404;
pub const DEFAULT_USER: &str = "abc";
pub const DEFAULT_PASSWORD: &str = "abc";
pub const DEFAULT_DBNAME: &str = "postgres";
pub const DEFAULT_TABLE: &str = "t1";

/// Connection parameters for the database under test.
///
/// `Default` yields the parameters the smoke test has always used against a local
/// cluster: `abc:abc@127.0.0.1:5404/postgres`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip)]
    pub password: String,
    pub dbname: String,
    pub connect_timeout: Option<Duration>,
    pub application_name: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            dbname: DEFAULT_DBNAME.to_string(),
            connect_timeout: None,
            application_name: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

impl ConnectionConfig {
    /// Overlay a libpq-style `key=value` string or a `postgres://` URL on top of the
    /// defaults. Anything the string leaves out keeps its default.
    ///
    /// ```rust
    /// use pgwire_smoke::ConnectionConfig;
    ///
    /// let cfg = ConnectionConfig::from_conninfo("host=10.0.0.7 port=6401 dbname=regress").unwrap();
    /// assert_eq!(cfg.host, "10.0.0.7");
    /// assert_eq!(cfg.port, 6401);
    /// assert_eq!(cfg.user, "abc");
    /// ```
    ///
    /// # Errors
    /// Returns `SmokeError::ConfigError` if the string cannot be parsed or names a
    /// Unix-socket host.
    pub fn from_conninfo(conninfo: &str) -> Result<Self, SmokeError> {
        Self::default().with_conninfo(conninfo)
    }

    /// Overlay a conninfo string on this config.
    ///
    /// # Errors
    /// See [`ConnectionConfig::from_conninfo`].
    pub fn with_conninfo(mut self, conninfo: &str) -> Result<Self, SmokeError> {
        let parsed = tokio_postgres::Config::from_str(conninfo)
            .map_err(|e| SmokeError::ConfigError(format!("invalid conninfo: {e}")))?;

        match parsed.get_hosts() {
            [] => {}
            [Host::Tcp(host)] => self.host.clone_from(host),
            [_] => {
                return Err(SmokeError::ConfigError(
                    "only TCP hosts are supported".to_string(),
                ));
            }
            _ => {
                return Err(SmokeError::ConfigError(
                    "exactly one host is supported".to_string(),
                ));
            }
        }
        match parsed.get_ports() {
            [] => {}
            [port] => self.port = *port,
            _ => {
                return Err(SmokeError::ConfigError(
                    "exactly one port is supported".to_string(),
                ));
            }
        }
        if let Some(user) = parsed.get_user() {
            self.user = user.to_string();
        }
        if let Some(password) = parsed.get_password() {
            self.password = String::from_utf8(password.to_vec()).map_err(|_| {
                SmokeError::ConfigError("password is not valid UTF-8".to_string())
            })?;
        }
        if let Some(dbname) = parsed.get_dbname() {
            self.dbname = dbname.to_string();
        }
        if let Some(timeout) = parsed.get_connect_timeout() {
            self.connect_timeout = Some(*timeout);
        }
        if let Some(name) = parsed.get_application_name() {
            self.application_name = name.to_string();
        }
        Ok(self)
    }

    /// Check that all required fields are usable.
    ///
    /// # Errors
    /// Returns `SmokeError::ConfigError` naming the first missing field.
    pub fn validate(&self) -> Result<(), SmokeError> {
        if self.dbname.is_empty() {
            return Err(SmokeError::ConfigError("dbname is required".to_string()));
        }
        if self.host.is_empty() {
            return Err(SmokeError::ConfigError("host is required".to_string()));
        }
        if self.port == 0 {
            return Err(SmokeError::ConfigError("port is required".to_string()));
        }
        if self.user.is_empty() {
            return Err(SmokeError::ConfigError("user is required".to_string()));
        }
        Ok(())
    }

    /// Build the driver configuration.
    #[must_use]
    pub fn to_tokio_config(&self) -> tokio_postgres::Config {
        let mut cfg = tokio_postgres::Config::new();
        cfg.host(&self.host)
            .port(self.port)
            .user(&self.user)
            .password(&self.password)
            .dbname(&self.dbname)
            .application_name(&self.application_name);
        if let Some(timeout) = self.connect_timeout {
            cfg.connect_timeout(timeout);
        }
        cfg
    }

    /// Connection URL with the password masked, for logs.
    #[must_use]
    pub fn redacted_url(&self) -> String {
        format!(
            "postgres://{}:***@{}:{}/{}",
            self.user, self.host, self.port, self.dbname
        )
    }
}

/// Check that a table name can be interpolated into DDL as-is.
///
/// # Errors
/// Returns `SmokeError::ConfigError` unless the name is a plain identifier of at most 63 bytes.
pub fn validate_table_name(name: &str) -> Result<(), SmokeError> {
    let mut chars = name.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_ok
        || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        || name.len() > 63
    {
        return Err(SmokeError::ConfigError(format!(
            "table name {name:?} must match [A-Za-z_][A-Za-z0-9_]* and be at most 63 bytes"
        )));
    }
    Ok(())
}
