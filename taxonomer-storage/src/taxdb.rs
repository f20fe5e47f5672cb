//! The SQLite-backed taxonomy store
//!
//! A [`TaxDb`] owns exactly one connection for its lifetime. Opening a store
//! creates any missing tables; `clobber` deletes the backing file first so
//! the store starts from empty.

use crate::loader::{self, InsertOptions, LoadOutcome, Row};
use crate::schema::{tables, REFPKG_SCHEMA, TAXDB_SCHEMA};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::path::{Path, PathBuf};
use taxonomer_core::config::DatabaseConfig;
use taxonomer_core::{Source, TaxonomerError, TaxonomerResult};
use tracing::{debug, info};

/// Row of the `nodes` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRecord {
    pub tax_id: String,
    pub parent_id: Option<String>,
    pub rank: Option<String>,
    pub source_id: Option<i64>,
}

/// Row of the `names` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameRecord {
    pub tax_id: String,
    pub tax_name: String,
    pub name_class: Option<String>,
    pub is_primary: bool,
}

pub struct TaxDb {
    conn: Connection,
    path: Option<PathBuf>,
}

impl TaxDb {
    /// Open (creating if needed) the store at `path`.
    pub fn open(path: impl AsRef<Path>, clobber: bool) -> TaxonomerResult<Self> {
        Self::open_with(path.as_ref(), clobber, true)
    }

    /// Open the store described by a `[database]` config section
    pub fn open_with_config(config: &DatabaseConfig) -> TaxonomerResult<Self> {
        Self::open_with(&config.resolved_path(), config.clobber, config.foreign_keys)
    }

    fn open_with(path: &Path, clobber: bool, foreign_keys: bool) -> TaxonomerResult<Self> {
        if clobber {
            info!("Creating new database {}", path.display());
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::initialize(&conn, foreign_keys)?;

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Private in-memory store, mostly for tests
    pub fn in_memory() -> TaxonomerResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(&conn, true)?;
        Ok(Self { conn, path: None })
    }

    fn initialize(conn: &Connection, foreign_keys: bool) -> TaxonomerResult<()> {
        if foreign_keys {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        }
        conn.execute_batch(TAXDB_SCHEMA)?;
        conn.execute_batch(REFPKG_SCHEMA)?;

        let mut stmt = conn.prepare(
            "INSERT OR IGNORE INTO source (id, name, description) VALUES (?1, ?2, ?3)",
        )?;
        for source in Source::ALL {
            stmt.execute(params![source.id(), source.name(), source.description()])?;
        }
        debug!("Schema initialized");
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Backing file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close the connection, reporting any error SQLite raises on close
    pub fn close(self) -> TaxonomerResult<()> {
        self.conn.close().map_err(|(_, e)| e.into())
    }

    pub fn has_row(&self, table: &str) -> TaxonomerResult<bool> {
        loader::has_row(&self.conn, table)
    }

    pub fn count_rows(&self, table: &str) -> TaxonomerResult<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", loader::quote_identifier(table));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Bulk-load into `table` with a single commit
    pub fn bulk_insert<I>(
        &mut self,
        table: &str,
        rows: I,
        options: &InsertOptions,
    ) -> TaxonomerResult<LoadOutcome>
    where
        I: IntoIterator<Item = Row>,
    {
        loader::bulk_insert(&mut self.conn, table, rows, options)
    }

    /// `source.id` registered under the source's name
    pub fn source_id(&self, source: Source) -> TaxonomerResult<i64> {
        self.conn
            .query_row(
                "SELECT id FROM source WHERE name = ?1",
                params![source.name()],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| TaxonomerError::NotFound(format!("source {}", source.name())))
    }

    /// Record identifier succession `(old_tax_id, new_tax_id)` between releases
    pub fn insert_merged<I>(&mut self, pairs: I, options: &InsertOptions) -> TaxonomerResult<LoadOutcome>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let rows = pairs
            .into_iter()
            .map(|(old, new)| vec![Value::Text(old), Value::Text(new)]);
        let options = InsertOptions {
            column_names: Some(vec!["old_tax_id".into(), "new_tax_id".into()]),
            ..options.clone()
        };
        self.bulk_insert(tables::MERGED, rows, &options)
    }

    pub fn node(&self, tax_id: &str) -> TaxonomerResult<Option<NodeRecord>> {
        Ok(self
            .conn
            .query_row(
                "SELECT tax_id, parent_id, rank, source_id FROM nodes WHERE tax_id = ?1",
                params![tax_id],
                |row| {
                    Ok(NodeRecord {
                        tax_id: row.get(0)?,
                        parent_id: row.get(1)?,
                        rank: row.get(2)?,
                        source_id: row.get(3)?,
                    })
                },
            )
            .optional()?)
    }

    /// Every name attached to `tax_id`, primary first
    pub fn names(&self, tax_id: &str) -> TaxonomerResult<Vec<NameRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT tax_id, tax_name, name_class, is_primary
             FROM names
             WHERE tax_id = ?1
             ORDER BY is_primary DESC, rowid",
        )?;
        let names = stmt
            .query_map(params![tax_id], |row| {
                Ok(NameRecord {
                    tax_id: row.get(0)?,
                    tax_name: row.get(1)?,
                    name_class: row.get(2)?,
                    is_primary: row.get::<_, Option<i64>>(3)?.unwrap_or(0) == 1,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    pub fn primary_name(&self, tax_id: &str) -> TaxonomerResult<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT tax_name FROM names WHERE tax_id = ?1 AND is_primary = 1",
                params![tax_id],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Taxa whose primary name is exactly `tax_name`
    pub fn find_by_primary_name(&self, tax_name: &str) -> TaxonomerResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT tax_id FROM names WHERE tax_name = ?1 AND is_primary = 1 ORDER BY tax_id",
        )?;
        let ids = stmt
            .query_map(params![tax_name], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }
}

impl std::fmt::Debug for TaxDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaxDb").field("path", &self.path).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table_names(db: &TaxDb) -> Vec<String> {
        let mut stmt = db
            .connection()
            .prepare("SELECT name FROM sqlite_master WHERE type IN ('table', 'view') ORDER BY name")
            .unwrap();
        stmt.query_map([], |r| r.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap()
    }

    fn seed_nodes(db: &mut TaxDb, ids: &[&str]) {
        let rows = ids.iter().map(|id| vec![Value::Text(id.to_string())]);
        let opts = InsertOptions::new()
            .with_columns(&["tax_id"])
            .allow_if_nonempty(true);
        db.bulk_insert(tables::NODES, rows, &opts).unwrap();
    }

    #[test]
    fn test_schema_created() {
        let db = TaxDb::in_memory().unwrap();
        let names = table_names(&db);
        for expected in [
            "hierarchy", "merged", "names", "nodes", "parents", "ranks", "sequences", "source",
            "taxa",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_sources_seeded_once() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("taxonomy.db");

        let db = TaxDb::open(&path, false).unwrap();
        assert_eq!(db.source_id(Source::Ncbi).unwrap(), 1);
        assert_eq!(db.source_id(Source::GreenGenes).unwrap(), 2);
        db.close().unwrap();

        // Reopening must not duplicate the seeded rows
        let db = TaxDb::open(&path, false).unwrap();
        assert_eq!(db.count_rows(tables::SOURCE).unwrap(), 2);
    }

    #[test]
    fn test_clobber_resets_store() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("taxonomy.db");

        let mut db = TaxDb::open(&path, false).unwrap();
        seed_nodes(&mut db, &["20"]);
        db.insert_merged(vec![("10".into(), "20".into())], &InsertOptions::new())
            .unwrap();
        assert_eq!(db.count_rows(tables::MERGED).unwrap(), 1);
        drop(db);

        let db = TaxDb::open(&path, false).unwrap();
        assert_eq!(db.count_rows(tables::MERGED).unwrap(), 1);
        drop(db);

        let db = TaxDb::open(&path, true).unwrap();
        assert_eq!(db.count_rows(tables::MERGED).unwrap(), 0);
        assert_eq!(db.path(), Some(path.as_path()));
    }

    #[test]
    fn test_merged_log_is_idempotent() {
        let mut db = TaxDb::in_memory().unwrap();
        seed_nodes(&mut db, &["2", "4"]);
        let pairs = || vec![("1".to_string(), "2".to_string()), ("3".to_string(), "4".to_string())];

        assert_eq!(
            db.insert_merged(pairs(), &InsertOptions::new()).unwrap(),
            LoadOutcome::Inserted(2)
        );
        assert!(db.insert_merged(pairs(), &InsertOptions::new()).unwrap().is_skipped());
    }

    #[test]
    fn test_merged_to_unknown_taxon_is_integrity_error() {
        let mut db = TaxDb::in_memory().unwrap();
        let err = db
            .insert_merged(vec![("1".to_string(), "404".to_string())], &InsertOptions::new())
            .unwrap_err();
        assert!(matches!(err, TaxonomerError::Integrity(_)), "got {:?}", err);
        assert_eq!(db.count_rows(tables::MERGED).unwrap(), 0);
    }

    #[test]
    fn test_missing_node_lookups() {
        let db = TaxDb::in_memory().unwrap();
        assert_eq!(db.node("nope").unwrap(), None);
        assert_eq!(db.primary_name("nope").unwrap(), None);
        assert!(db.names("nope").unwrap().is_empty());
        assert!(db.find_by_primary_name("Bacteria").unwrap().is_empty());
    }
}
