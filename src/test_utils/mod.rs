use std::sync::LazyLock;
use tokio::runtime::Runtime;

/// Shared tokio runtime for test utilities to avoid creating multiple runtimes
pub(crate) static SHARED_RUNTIME: LazyLock<Runtime> =
    LazyLock::new(|| Runtime::new().expect("Failed to create tokio runtime for test utilities"));

/// Test utilities for running the smoke test against a throwaway `PostgreSQL`
pub mod postgres;

pub use postgres::*;
