//! Test utilities for the Taxonomer workspace
//!
//! Common helpers shared by the unit and integration suites of every crate:
//!
//! - **Test Environment**: temp directory with `TAXONOMER_HOME` isolation
//! - **Store Helpers**: on-disk `TaxDb` inside a test environment
//! - **Fixtures**: lineage files and taxtables
//! - **Assertions**: nested-interval and naming checks
//! - **Logs**: capture of warning-level notices

pub mod assertions;
pub mod environment;
pub mod fixtures;
pub mod logs;
pub mod storage;

// Re-export commonly used items
pub use environment::{TestConfig, TestEnvironment};
pub use fixtures::{
    sample_taxtable_fieldnames, sample_taxtable_rows, taxtable_from_parents,
    write_greengenes_file, POLYPHYLETIC_RECORDS, SHARED_PREFIX_RECORDS,
};
pub use logs::capture_warnings;
pub use storage::TestStore;

// Re-export test dependencies for convenience
pub use anyhow::{Context, Result};
pub use tempfile;

/// Initialize test logging (safe to call from every test)
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env(taxonomer_core::logging::LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Run a test inside a fresh environment
///
/// # Example
/// ```rust
/// use taxonomer_test::with_test_env;
///
/// with_test_env(|env| {
///     let store = env.root().join("taxonomy.db");
///     assert!(!store.exists());
///     Ok(())
/// })
/// .unwrap();
/// ```
pub fn with_test_env<F, R>(f: F) -> Result<R>
where
    F: FnOnce(&TestEnvironment) -> Result<R>,
{
    let env = TestEnvironment::new()?;
    f(&env)
}
