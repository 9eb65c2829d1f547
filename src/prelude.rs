//! Convenient imports for writing scenarios and checks against a [`Session`].

pub use crate::config::ConnectionConfig;
pub use crate::error::SmokeError;
pub use crate::postgres::{CommandOutcome, PreparedStatement, Session};
pub use crate::results::{ResultSet, TextRow};
pub use crate::runner::{RunFailure, RunOptions, run};
pub use crate::scenario::{RunReport, Scenario, ScenarioKind, StepOutcome, StepReport};
pub use crate::translation::translate_placeholders;
pub use crate::types::RowValues;
