use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{ConnectionConfig, DEFAULT_TABLE};
use crate::error::SmokeError;
use crate::postgres::Session;
use crate::scenario::{self, RunReport, ScenarioKind};

/// Everything one smoke run needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOptions {
    pub connection: ConnectionConfig,
    pub scenario: ScenarioKind,
    pub table: String,
    pub verify: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            scenario: ScenarioKind::default(),
            table: DEFAULT_TABLE.to_string(),
            verify: false,
        }
    }
}

/// A run that stopped early, with the steps it completed.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RunFailure {
    /// Steps recorded before the failure; `failure` holds the rendered error
    pub report: RunReport,
    pub error: SmokeError,
}

/// Connect, run the chosen scenario, and close the session.
///
/// The session is closed whether or not the scenario succeeds. Nothing is retried: the
/// first error ends the run.
///
/// # Errors
/// Returns a [`RunFailure`] carrying the configuration, connection, statement, or
/// verification error that stopped the run, and the partial report.
pub async fn run(options: &RunOptions) -> Result<RunReport, RunFailure> {
    let mut report = RunReport::new(options.scenario.name());
    let scenario = match scenario::build(
        options.scenario,
        &options.table,
        options.verify,
        &options.connection,
    ) {
        Ok(scenario) => scenario,
        Err(e) => return Err(fail(report, e)),
    };
    let mut session = match Session::connect(&options.connection).await {
        Ok(session) => session,
        Err(e) => return Err(fail(report, e)),
    };

    info!(scenario = scenario.name(), table = %options.table, verify = options.verify, "running");
    let result = scenario.run(&mut session, &mut report).await;
    let closed = session.close().await;

    match result {
        Ok(()) => match closed {
            Ok(()) => {
                info!(scenario = scenario.name(), steps = report.steps.len(), "finished");
                Ok(report)
            }
            Err(e) => Err(fail(report, e)),
        },
        Err(e) => {
            if let Err(close_err) = closed {
                warn!(error = %close_err, "closing the session also failed");
            }
            Err(fail(report, e))
        }
    }
}

fn fail(mut report: RunReport, error: SmokeError) -> RunFailure {
    error!(
        scenario = %report.scenario,
        completed = report.steps.len(),
        error = %error,
        "run failed"
    );
    report.failure = Some(error.to_string());
    RunFailure { report, error }
}
