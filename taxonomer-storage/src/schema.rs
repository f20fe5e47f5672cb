//! Table definitions for taxonomy stores
//!
//! Two table sets share one SQLite file: the base taxonomy tables filled by
//! provider ingestion, and the reference-package tables filled by the
//! hierarchy builder. Every statement is safe to re-run against an existing
//! store.

/// Table names, kept in one place so loader calls and queries agree
pub mod tables {
    pub const NODES: &str = "nodes";
    pub const NAMES: &str = "names";
    pub const MERGED: &str = "merged";
    pub const SOURCE: &str = "source";

    pub const RANKS: &str = "ranks";
    pub const TAXA: &str = "taxa";
    pub const SEQUENCES: &str = "sequences";
    pub const HIERARCHY: &str = "hierarchy";
    pub const PARENTS_VIEW: &str = "parents";
}

/// Base taxonomy schema. `source` rows are seeded separately.
pub const TAXDB_SCHEMA: &str = r#"
-- nodes.dmp specifies additional columns that are not loaded
CREATE TABLE IF NOT EXISTS nodes (
    tax_id        TEXT UNIQUE PRIMARY KEY NOT NULL,
    parent_id     TEXT,
    rank          TEXT,
    embl_code     TEXT,
    division_id   INTEGER,
    source_id     INTEGER DEFAULT 1
);

CREATE TABLE IF NOT EXISTS names (
    tax_id        TEXT REFERENCES nodes (tax_id),
    tax_name      TEXT,
    unique_name   TEXT,
    name_class    TEXT,
    is_primary    INTEGER
);

CREATE TABLE IF NOT EXISTS merged (
    old_tax_id    TEXT,
    new_tax_id    TEXT REFERENCES nodes (tax_id)
);

CREATE TABLE IF NOT EXISTS source (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT UNIQUE,
    description   TEXT
);

CREATE INDEX IF NOT EXISTS nodes_tax_id ON nodes (tax_id);
CREATE INDEX IF NOT EXISTS nodes_parent_id ON nodes (parent_id);
CREATE INDEX IF NOT EXISTS nodes_rank ON nodes (rank);

CREATE INDEX IF NOT EXISTS names_tax_id ON names (tax_id);
CREATE INDEX IF NOT EXISTS names_tax_name ON names (tax_name);
CREATE INDEX IF NOT EXISTS names_is_primary ON names (is_primary);
CREATE INDEX IF NOT EXISTS names_taxid_is_primary ON names (tax_id, is_primary);
CREATE INDEX IF NOT EXISTS names_name_is_primary ON names (tax_name, is_primary);
"#;

/// Reference-package schema with the nested-interval hierarchy and the
/// containment view over it. The view includes self pairs.
pub const REFPKG_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS ranks (
    rank          TEXT PRIMARY KEY NOT NULL,
    rank_order    INT
);

CREATE TABLE IF NOT EXISTS taxa (
    tax_id        TEXT PRIMARY KEY NOT NULL,
    tax_name      TEXT NOT NULL,
    rank          TEXT REFERENCES ranks (rank) NOT NULL
);

CREATE TABLE IF NOT EXISTS sequences (
    seqname       TEXT PRIMARY KEY NOT NULL,
    tax_id        TEXT REFERENCES taxa (tax_id) NOT NULL
);

CREATE TABLE IF NOT EXISTS hierarchy (
    tax_id        TEXT REFERENCES taxa (tax_id) PRIMARY KEY NOT NULL,
    lft           INT NOT NULL UNIQUE,
    rgt           INT NOT NULL UNIQUE
);

CREATE VIEW IF NOT EXISTS parents AS
SELECT h1.tax_id AS child,
       h2.tax_id AS parent
FROM   hierarchy h1
       JOIN hierarchy h2
         ON h1.lft BETWEEN h2.lft AND h2.rgt;
"#;

/// Name class given to the primary name of provider-ingested taxa
pub const PRIMARY_NAME_CLASS: &str = "scientific name";
