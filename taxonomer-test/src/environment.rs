//! Test environment management
//!
//! Provides isolated test environments with automatic cleanup using RAII.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

/// Process environment variables are global; live environments are serialized
static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Configuration for test environment
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Preserve workspace after test (for debugging)
    pub preserve: bool,
    /// Set `TAXONOMER_LOG=debug` while the environment is alive
    pub verbose: bool,
    /// Custom prefix for test directories
    pub prefix: Option<String>,
}

/// Isolated test environment with automatic cleanup
pub struct TestEnvironment {
    temp_dir: Option<TempDir>,
    root_path: PathBuf,
    /// Saved environment variables for restoration
    saved_env: HashMap<String, Option<String>>,
    config: TestConfig,
    _guard: MutexGuard<'static, ()>,
}

impl TestEnvironment {
    /// Create a new test environment with default config
    pub fn new() -> Result<Self> {
        Self::with_config(TestConfig::default())
    }

    /// Create a new test environment with custom config.
    ///
    /// Blocks while another environment in this process is alive.
    pub fn with_config(config: TestConfig) -> Result<Self> {
        // A panicking test must not wedge the rest of the suite
        let guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let prefix = config.prefix.as_deref().unwrap_or("taxonomer-test");
        let temp_dir =
            TempDir::with_prefix(prefix).context("Failed to create temporary directory")?;
        let root_path = temp_dir.path().to_path_buf();

        std::fs::create_dir_all(root_path.join("databases"))?;
        std::fs::create_dir_all(root_path.join("cache"))?;

        let mut env = Self {
            temp_dir: Some(temp_dir),
            root_path,
            saved_env: HashMap::new(),
            config,
            _guard: guard,
        };
        env.setup_environment();

        Ok(env)
    }

    fn setup_environment(&mut self) {
        let mut vars = vec![
            ("TAXONOMER_HOME", self.root_path.to_string_lossy().to_string()),
            (
                "TAXONOMER_CACHE_DIR",
                self.cache_dir().to_string_lossy().to_string(),
            ),
        ];
        if self.config.verbose {
            vars.push(("TAXONOMER_LOG", "debug".to_string()));
        }

        for (key, value) in vars {
            self.saved_env
                .insert(key.to_string(), std::env::var(key).ok());
            std::env::set_var(key, value);
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    pub fn databases_dir(&self) -> PathBuf {
        self.root_path.join("databases")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root_path.join("cache")
    }

    /// Path for a store file under `databases/`
    pub fn database_path(&self, name: &str) -> PathBuf {
        self.databases_dir().join(name)
    }

    /// Write a file relative to the environment root
    pub fn write_file(&self, path: impl AsRef<Path>, content: &[u8]) -> Result<PathBuf> {
        let full_path = self.root_path.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full_path, content)?;
        Ok(full_path)
    }

    /// Keep the directory on disk after drop
    pub fn preserve(&mut self) {
        if let Some(temp_dir) = self.temp_dir.take() {
            let path = temp_dir.keep();
            println!("Test environment preserved at: {}", path.display());
        }
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        for (key, value) in &self.saved_env {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }

        if self.config.preserve {
            self.preserve();
        }
        // Otherwise the TempDir cleans up after itself
    }
}
