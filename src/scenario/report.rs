use std::fmt;

use serde::Serialize;

use crate::postgres::CommandOutcome;
use crate::results::ResultSet;

/// What a single step produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StepOutcome {
    Rows(ResultSet),
    Affected(u64),
    Value(String),
    Done,
}

impl From<CommandOutcome> for StepOutcome {
    fn from(outcome: CommandOutcome) -> Self {
        match outcome {
            CommandOutcome {
                rows: Some(rows), ..
            } => StepOutcome::Rows(rows),
            CommandOutcome {
                affected: Some(n), ..
            } => StepOutcome::Affected(n),
            CommandOutcome { .. } => StepOutcome::Done,
        }
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Rows(rs) => write!(f, "{rs}"),
            StepOutcome::Affected(n) => write!(f, "{n}"),
            StepOutcome::Value(v) => f.write_str(v),
            StepOutcome::Done => f.write_str("ok"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    /// Name the step is printed under; unlabeled steps print as `command:<sql>, res:<outcome>`
    pub label: Option<String>,
    pub sql: Option<String>,
    pub outcome: StepOutcome,
    /// Whether text output shows this step
    #[serde(skip)]
    pub echo: bool,
}

impl StepReport {
    /// A quiet step: logged, but not echoed in text output.
    #[must_use]
    pub fn quiet(sql: impl Into<String>, outcome: StepOutcome) -> Self {
        Self {
            label: None,
            sql: Some(sql.into()),
            outcome,
            echo: false,
        }
    }

    /// A command echoed as `command:<sql>, res:<outcome>`.
    #[must_use]
    pub fn command(sql: impl Into<String>, outcome: StepOutcome) -> Self {
        Self {
            echo: true,
            ..Self::quiet(sql, outcome)
        }
    }

    /// A labeled result, echoed as `<label>:<outcome>`.
    #[must_use]
    pub fn labeled(label: impl Into<String>, sql: Option<String>, outcome: StepOutcome) -> Self {
        Self {
            label: Some(label.into()),
            sql,
            outcome,
            echo: true,
        }
    }

    #[must_use]
    pub fn rows(&self) -> Option<&ResultSet> {
        match &self.outcome {
            StepOutcome::Rows(rs) => Some(rs),
            _ => None,
        }
    }
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.label, &self.outcome) {
            (Some(label), StepOutcome::Value(v)) => write!(f, "{label}: {v}"),
            (Some(label), outcome) => write!(f, "{label}:{outcome}"),
            (None, outcome) => write!(
                f,
                "command:{}, res:{outcome}",
                self.sql.as_deref().unwrap_or_default()
            ),
        }
    }
}

/// Everything a scenario run produced, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub scenario: String,
    pub steps: Vec<StepReport>,
    /// True when the run also asserted the expected results
    pub verified: bool,
    /// Why the run stopped early; the steps before it are kept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl RunReport {
    #[must_use]
    pub fn new(scenario: &str) -> Self {
        Self {
            scenario: scenario.to_string(),
            steps: Vec::new(),
            verified: false,
            failure: None,
        }
    }

    pub fn push(&mut self, step: StepReport) {
        self.steps.push(step);
    }

    /// Steps shown in text output.
    pub fn echoed(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|step| step.echo)
    }

    /// Result sets printed under `label`, in order.
    pub fn labeled_rows<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a ResultSet> + 'a {
        self.steps
            .iter()
            .filter(move |step| step.label.as_deref() == Some(label))
            .filter_map(StepReport::rows)
    }
}
