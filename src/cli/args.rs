use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use pgwire_smoke::{ConnectionConfig, RunOptions, ScenarioKind, SmokeError};
use serde::{Serialize, Serializer};
use tracing::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum OutputFormat {
    /// One line per echoed step
    #[default]
    Text,
    /// The whole run report as JSON
    Json,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Smoke test for PostgreSQL-wire-compatible databases"
)]
pub(crate) struct Args {
    #[arg(long, env = "PGWIRE_SMOKE_HOST")]
    pub(crate) host: Option<String>,
    #[arg(long, env = "PGWIRE_SMOKE_PORT")]
    pub(crate) port: Option<u16>,
    #[arg(long, env = "PGWIRE_SMOKE_USER")]
    pub(crate) user: Option<String>,
    #[arg(long, env = "PGWIRE_SMOKE_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,
    #[arg(long, env = "PGWIRE_SMOKE_DBNAME")]
    pub(crate) dbname: Option<String>,
    /// libpq `key=value` string or `postgres://` URL; explicit flags win over it
    #[arg(long, env = "PGWIRE_SMOKE_CONNINFO", hide_env_values = true)]
    pub(crate) conninfo: Option<String>,
    /// Connect timeout in seconds
    #[arg(long, env = "PGWIRE_SMOKE_CONNECT_TIMEOUT")]
    pub(crate) connect_timeout: Option<u64>,
    #[arg(long, env = "PGWIRE_SMOKE_TABLE", default_value = pgwire_smoke::config::DEFAULT_TABLE)]
    pub(crate) table: String,
    #[arg(long, env = "PGWIRE_SMOKE_SCENARIO", value_enum, default_value = "driver")]
    pub(crate) scenario: ScenarioKind,
    /// Assert the expected results instead of only printing them
    #[arg(long, env = "PGWIRE_SMOKE_VERIFY")]
    pub(crate) verify: bool,
    #[arg(long, env = "PGWIRE_SMOKE_FORMAT", value_enum, default_value = "text")]
    pub(crate) format: OutputFormat,
    /// Also write log output to this file
    #[arg(long, env = "PGWIRE_SMOKE_LOG")]
    pub(crate) log: Option<PathBuf>,
    #[arg(long, env = "PGWIRE_SMOKE_LOG_LEVEL", default_value = "info")]
    pub(crate) log_level: Level,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SmokeConfig {
    #[serde(flatten)]
    pub(crate) run: RunOptions,
    pub(crate) format: OutputFormat,
    pub(crate) log: Option<PathBuf>,
    #[serde(serialize_with = "serialize_level")]
    pub(crate) log_level: Level,
}

impl SmokeConfig {
    /// Resolve connection parameters: defaults, then `--conninfo`, then individual flags.
    pub(crate) fn from_args(args: Args) -> Result<Self, SmokeError> {
        let mut connection = match &args.conninfo {
            Some(conninfo) => ConnectionConfig::from_conninfo(conninfo)?,
            None => ConnectionConfig::default(),
        };
        if let Some(host) = args.host {
            connection.host = host;
        }
        if let Some(port) = args.port {
            connection.port = port;
        }
        if let Some(user) = args.user {
            connection.user = user;
        }
        if let Some(password) = args.password {
            connection.password = password;
        }
        if let Some(dbname) = args.dbname {
            connection.dbname = dbname;
        }
        if let Some(secs) = args.connect_timeout {
            connection.connect_timeout = Some(Duration::from_secs(secs));
        }
        connection.validate()?;

        Ok(SmokeConfig {
            run: RunOptions {
                connection,
                scenario: args.scenario,
                table: args.table,
                verify: args.verify,
            },
            format: args.format,
            log: args.log,
            log_level: args.log_level,
        })
    }
}

fn serialize_level<S: Serializer>(level: &Level, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> SmokeConfig {
        let args = Args::try_parse_from(std::iter::once("pgwire-smoke").chain(argv.iter().copied()))
            .unwrap();
        SmokeConfig::from_args(args).unwrap()
    }

    #[test]
    fn defaults_target_local_cluster() {
        let config = parse(&[]);
        assert_eq!(config.run.connection, ConnectionConfig::default());
        assert_eq!(config.run.table, "t1");
        assert_eq!(config.run.scenario, ScenarioKind::Driver);
        assert!(!config.run.verify);
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn flags_win_over_conninfo() {
        let config = parse(&[
            "--conninfo",
            "host=db.internal port=6401 user=kunlun dbname=regress",
            "--port",
            "7000",
            "--connect-timeout",
            "3",
        ]);
        let cfg = &config.run.connection;
        assert_eq!(cfg.host, "db.internal");
        assert_eq!(cfg.port, 7000);
        assert_eq!(cfg.user, "kunlun");
        assert_eq!(cfg.dbname, "regress");
        assert_eq!(cfg.password, "abc");
        assert_eq!(cfg.connect_timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn scenario_format_and_level() {
        let config = parse(&[
            "--scenario",
            "sql-script",
            "--format",
            "json",
            "--log-level",
            "debug",
            "--verify",
            "--table",
            "t1111",
        ]);
        assert_eq!(config.run.scenario, ScenarioKind::SqlScript);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.log_level, Level::DEBUG);
        assert!(config.run.verify);
        assert_eq!(config.run.table, "t1111");
    }

    #[test]
    fn rejects_unknown_scenario() {
        assert!(Args::try_parse_from(["pgwire-smoke", "--scenario", "jdbc"]).is_err());
    }

    #[test]
    fn empty_dbname_is_a_config_error() {
        let args = Args::try_parse_from(["pgwire-smoke", "--dbname", ""]).unwrap();
        let err = SmokeConfig::from_args(args).unwrap_err();
        assert!(matches!(err, SmokeError::ConfigError(_)));
    }

    #[test]
    fn serialized_config_hides_password() {
        let config = parse(&["--password", "s3cret"]);
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("s3cret"));
        assert!(json.contains("\"log_level\":\"INFO\""));
        assert!(json.contains("\"scenario\":\"driver\""));
    }
}
