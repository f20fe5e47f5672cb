//! Species-name cleanup
//!
//! GreenGenes often glues the species epithet onto the genus
//! (`Escherichiacoli`). For species directly under a genus whose primary name
//! does not already start with `"<genus> "`, search all genus names for a raw
//! prefix and insert the missing space. Safe to re-run.

use super::lineage::add_space;
use rusqlite::params;
use taxonomer_core::TaxonomerResult;
use taxonomer_storage::TaxDb;
use tracing::{debug, info};

/// Prefix lookup over sorted genus names
struct GenusIndex {
    sorted: Vec<String>,
}

impl GenusIndex {
    fn new(mut genera: Vec<String>) -> Self {
        genera.sort();
        genera.dedup();
        Self { sorted: genera }
    }

    /// First genus, in sorted order, that `tax_name` starts with.
    ///
    /// Scanning starts at the first genus sorting at or after the leading
    /// character of `tax_name` and stops once candidates are no longer less
    /// than `tax_name` itself.
    fn find(&self, tax_name: &str) -> Option<&str> {
        let first = tax_name.chars().next()?;
        let mut buf = [0u8; 4];
        let first: &str = first.encode_utf8(&mut buf);
        let start = self.sorted.partition_point(|genus| genus.as_str() < first);
        self.sorted[start..]
            .iter()
            .take_while(|genus| genus.as_str() < tax_name)
            .find(|genus| tax_name.starts_with(genus.as_str()))
            .map(String::as_str)
    }
}

/// Insert the missing genus/species space where it can be found.
///
/// Returns the number of renamed species. Runs in its own transaction.
pub fn clean_species(db: &mut TaxDb) -> TaxonomerResult<usize> {
    let genera: Vec<String> = {
        let mut stmt = db.connection().prepare(
            "SELECT names.tax_name
             FROM nodes JOIN names USING (tax_id)
             WHERE nodes.rank = 'genus' AND names.is_primary = 1",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<_, _>>()?
    };
    let index = GenusIndex::new(genera);

    let candidates: Vec<(String, String)> = {
        let mut stmt = db.connection().prepare(
            "SELECT DISTINCT snode.tax_id, sname.tax_name
             FROM nodes snode
                  JOIN nodes gnode ON snode.parent_id = gnode.tax_id
                  JOIN names sname ON sname.tax_id = snode.tax_id
                  JOIN names gname ON gname.tax_id = gnode.tax_id
             WHERE sname.is_primary = 1 AND gname.is_primary = 1
               AND snode.rank = 'species' AND gnode.rank = 'genus'
               AND SUBSTR(sname.tax_name, 1, LENGTH(gname.tax_name) + 1) <> gname.tax_name || ' '",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        rows.collect::<Result<_, _>>()?
    };
    debug!("{} species names are candidates for spacing", candidates.len());

    let tx = db.connection_mut().transaction()?;
    let mut renamed = 0;
    {
        let mut stmt = tx.prepare(
            "UPDATE names SET tax_name = ?1
             WHERE tax_id = ?2 AND tax_name = ?3 AND is_primary = 1",
        )?;
        for (tax_id, tax_name) in &candidates {
            let spaced = index
                .find(tax_name)
                .and_then(|genus| add_space(tax_name, genus));
            if let Some(new_name) = spaced {
                debug!("'{}' -> '{}'", tax_name, new_name);
                renamed += stmt.execute(params![new_name, tax_id, tax_name])?;
            }
        }
    }
    tx.commit()?;

    if renamed > 0 {
        info!("Inserted genus/species spacing in {} species names", renamed);
    }
    Ok(renamed)
}
