//! Smoke test for PostgreSQL-wire-compatible databases.
//!
//! Connects over `tokio-postgres`, creates a table, runs DDL and DML, exercises prepared
//! statements with autocommit switched on and off, prints what it reads back, and drops
//! the table.
//!
//! ```rust,no_run
//! use pgwire_smoke::{RunOptions, run};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let report = run(&RunOptions::default()).await?;
//! for line in report.echoed() {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod postgres;
pub mod prelude;
pub mod results;
pub mod runner;
pub mod scenario;
pub mod translation;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use config::{ConnectionConfig, validate_table_name};
pub use error::SmokeError;
pub use postgres::{CommandOutcome, PreparedStatement, Session};
pub use results::{ResultSet, TextRow};
pub use runner::{RunFailure, RunOptions, run};
pub use scenario::{RunReport, ScenarioKind, StepOutcome, StepReport};
pub use translation::translate_placeholders;
pub use types::RowValues;
