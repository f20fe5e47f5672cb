//! Store test helpers

use crate::fixtures::{sample_taxtable_fieldnames, sample_taxtable_rows};
use crate::TestEnvironment;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use taxonomer_storage::TaxDb;

/// On-disk store living inside a [`TestEnvironment`]
pub struct TestStore {
    db: TaxDb,
    path: PathBuf,
}

impl TestStore {
    /// Fresh store under the environment's `databases/` directory
    pub fn new(env: &TestEnvironment) -> Result<Self> {
        Self::with_path(env.database_path("taxonomy.db"))
    }

    pub fn with_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let db = TaxDb::open(&path, true)
            .with_context(|| format!("Failed to open test store {}", path.display()))?;
        Ok(Self { db, path })
    }

    /// Store pre-loaded with the sample taxtable hierarchy
    pub fn with_sample_hierarchy(env: &TestEnvironment) -> Result<Self> {
        let mut store = Self::new(env)?;
        store
            .db
            .insert_from_taxtable(&sample_taxtable_fieldnames(), sample_taxtable_rows())?;
        Ok(store)
    }

    pub fn db(&self) -> &TaxDb {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut TaxDb {
        &mut self.db
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close and reopen the same file without clobbering
    pub fn reopen(self) -> Result<Self> {
        let path = self.path;
        self.db.close()?;
        let db = TaxDb::open(&path, false)?;
        Ok(Self { db, path })
    }
}
