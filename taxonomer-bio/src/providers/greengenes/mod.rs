//! GreenGenes taxonomy ingestion
//!
//! Lineages are folded into a de-duplicated tree with synthetic `GG` ids,
//! polyphyletic names are made unique and species names are re-spaced.

pub mod ingest;
pub mod lineage;
pub mod species;
pub mod tree;

pub use ingest::{load_taxonomy, IngestOutcome, IngestSummary};
pub use lineage::{open_lineage_file, parse_lineage, read_records, LineageRecord, LineageToken};
pub use species::clean_species;
pub use tree::{LineageTree, PolyphyleticGroup};

use std::io::BufRead;
use std::path::{Path, PathBuf};
use taxonomer_core::config::{Config, GreenGenesConfig};
use taxonomer_core::{TaxonomerError, TaxonomerResult};
use taxonomer_storage::TaxDb;
use tracing::warn;

/// Result of [`db_load`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub ingest: IngestOutcome,
    pub species_renamed: usize,
}

/// Load a GreenGenes taxonomy file (plain or `.gz`) into `db`.
///
/// The header line is skipped. Ingestion is skipped when the store already
/// holds taxa; species cleanup runs either way.
pub fn db_load(db: &mut TaxDb, path: &Path, config: &Config) -> TaxonomerResult<LoadReport> {
    let mut reader = open_lineage_file(path)?;
    let mut header = String::new();
    reader.read_line(&mut header)?;

    let records = read_records(reader, 2).take(config.loader.max_rows.unwrap_or(usize::MAX));
    let ingest = load_taxonomy(db, records, &config.greengenes)?;
    let species_renamed = clean_species(db)?;

    Ok(LoadReport {
        ingest,
        species_renamed,
    })
}

/// Locate the taxonomy archive in `dest_dir`.
///
/// GreenGenes does not offer a stable download, so nothing is fetched: the
/// file must already be present. Returns `(path, false)`.
pub fn fetch_data(dest_dir: &Path, config: &GreenGenesConfig) -> TaxonomerResult<(PathBuf, bool)> {
    warn!(
        "Downloading is not implemented for GreenGenes. Please download '{}' manually from '{}'",
        config.archive_name, config.download_url
    );
    let dest = dest_dir.join(&config.archive_name);
    if !dest.exists() {
        return Err(TaxonomerError::MissingResource(dest));
    }
    Ok((dest, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fetch_data_requires_local_archive() {
        let temp = TempDir::new().unwrap();
        let config = GreenGenesConfig::default();

        let err = fetch_data(temp.path(), &config).unwrap_err();
        assert!(err.is_fatal());
        match err {
            TaxonomerError::MissingResource(path) => {
                assert_eq!(path, temp.path().join("taxonomy_16S_all_gg_2011_1"))
            }
            other => panic!("unexpected error {:?}", other),
        }

        std::fs::write(temp.path().join(&config.archive_name), "prokMSA_id\ttaxonomy\n").unwrap();
        let (path, downloaded) = fetch_data(temp.path(), &config).unwrap();
        assert!(path.exists());
        assert!(!downloaded);
    }
}
