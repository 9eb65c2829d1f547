//! Smoke-test scenarios.
//!
//! A scenario runs a fixed statement sequence on a [`Session`] and returns a
//! [`RunReport`]. Two are provided:
//!
//! - [`DriverScenario`]: DDL/DML through the driver, then client-side prepared statements
//!   with autocommit switched on and off;
//! - [`SqlScriptScenario`]: the same workload as SQL text with server-side
//!   `PREPARE`/`EXECUTE`.

pub mod driver;
pub mod expect;
pub mod report;
pub mod sql_script;

use async_trait::async_trait;
use clap::ValueEnum;
use serde::Serialize;

use crate::config::{ConnectionConfig, validate_table_name};
use crate::error::SmokeError;
use crate::postgres::Session;

pub use driver::DriverScenario;
pub use report::{RunReport, StepOutcome, StepReport};
pub use sql_script::SqlScriptScenario;

#[async_trait]
pub trait Scenario: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run the whole sequence, recording each step in `report` as it completes. The first
    /// failing statement ends the run; the steps before it stay in `report`.
    async fn run(&self, session: &mut Session, report: &mut RunReport) -> Result<(), SmokeError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
    /// Driver-level statements and prepared statements with autocommit toggles
    #[default]
    Driver,
    /// Server-side PREPARE/EXECUTE sent as SQL text
    SqlScript,
}

impl ScenarioKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ScenarioKind::Driver => "driver",
            ScenarioKind::SqlScript => "sql-script",
        }
    }
}

/// Build the scenario to run.
///
/// `connection` is only used when verifying the driver scenario, to open the observer
/// connection that checks commit visibility.
///
/// # Errors
/// Returns `SmokeError::ConfigError` for an unusable table name.
pub fn build(
    kind: ScenarioKind,
    table: &str,
    verify: bool,
    connection: &ConnectionConfig,
) -> Result<Box<dyn Scenario>, SmokeError> {
    validate_table_name(table)?;
    Ok(match kind {
        ScenarioKind::Driver => Box::new(DriverScenario::new(
            table,
            verify.then(|| connection.clone()),
        )),
        ScenarioKind::SqlScript => Box::new(SqlScriptScenario::new(table, verify)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_each_kind() {
        let cfg = ConnectionConfig::default();
        let driver = build(ScenarioKind::Driver, "t1", true, &cfg).unwrap();
        assert_eq!(driver.name(), ScenarioKind::Driver.name());
        let script = build(ScenarioKind::SqlScript, "t1111", false, &cfg).unwrap();
        assert_eq!(script.name(), ScenarioKind::SqlScript.name());
    }

    #[test]
    fn rejects_bad_table_names() {
        let cfg = ConnectionConfig::default();
        let err = build(ScenarioKind::Driver, "t1; drop", false, &cfg).err().unwrap();
        assert!(matches!(err, SmokeError::ConfigError(_)));
    }
}
