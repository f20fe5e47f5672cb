//! Read-only queries over the nested-interval hierarchy

use crate::hierarchy::NestedInterval;
use crate::taxdb::TaxDb;
use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use taxonomer_core::{TaxonomerError, TaxonomerResult};

/// One step of a sequence's lineage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineageEntry {
    pub rank: String,
    pub tax_id: String,
    pub tax_name: String,
}

impl TaxDb {
    pub fn interval(&self, tax_id: &str) -> TaxonomerResult<Option<NestedInterval>> {
        Ok(self
            .connection()
            .query_row(
                "SELECT tax_id, lft, rgt FROM hierarchy WHERE tax_id = ?1",
                params![tax_id],
                |row| {
                    Ok(NestedInterval {
                        tax_id: row.get(0)?,
                        lft: row.get(1)?,
                        rgt: row.get(2)?,
                    })
                },
            )
            .optional()?)
    }

    /// All intervals ordered by `lft`
    pub fn intervals(&self) -> TaxonomerResult<Vec<NestedInterval>> {
        let mut stmt = self
            .connection()
            .prepare("SELECT tax_id, lft, rgt FROM hierarchy ORDER BY lft")?;
        let intervals = stmt
            .query_map([], |row| {
                Ok(NestedInterval {
                    tax_id: row.get(0)?,
                    lft: row.get(1)?,
                    rgt: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(intervals)
    }

    /// Pure interval comparison, no parent-chain walk
    pub fn is_ancestor_or_self(&self, ancestor: &str, descendant: &str) -> TaxonomerResult<bool> {
        let outer = self.require_interval(ancestor)?;
        let inner = self.require_interval(descendant)?;
        Ok(outer.contains(&inner))
    }

    /// `tax_id` and every taxon above it, root first
    pub fn ancestors(&self, tax_id: &str) -> TaxonomerResult<Vec<String>> {
        self.require_interval(tax_id)?;
        let mut stmt = self.connection().prepare(
            "SELECT p.parent
             FROM parents p
             JOIN hierarchy h ON h.tax_id = p.parent
             WHERE p.child = ?1
             ORDER BY h.lft",
        )?;
        let ids = stmt
            .query_map(params![tax_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    /// `tax_id` and every taxon below it, in `lft` order
    pub fn descendants(&self, tax_id: &str) -> TaxonomerResult<Vec<String>> {
        self.require_interval(tax_id)?;
        let mut stmt = self.connection().prepare(
            "SELECT p.child
             FROM parents p
             JOIN hierarchy h ON h.tax_id = p.child
             WHERE p.parent = ?1
             ORDER BY h.lft",
        )?;
        let ids = stmt
            .query_map(params![tax_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    /// `(rank, rank_order)` from the root down
    pub fn rank_order(&self) -> TaxonomerResult<Vec<(String, i64)>> {
        let mut stmt = self
            .connection()
            .prepare("SELECT rank, rank_order FROM ranks ORDER BY rank_order")?;
        let ranks = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ranks)
    }

    /// Lineage of the taxon a sequence is assigned to, root first
    pub fn sequence_lineage(&self, seqname: &str) -> TaxonomerResult<Vec<LineageEntry>> {
        let tax_id: String = self
            .connection()
            .query_row(
                "SELECT tax_id FROM sequences WHERE seqname = ?1",
                params![seqname],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| TaxonomerError::NotFound(format!("sequence {}", seqname)))?;

        let mut stmt = self.connection().prepare(
            "SELECT t.rank, t.tax_id, t.tax_name
             FROM parents p
             JOIN taxa t ON t.tax_id = p.parent
             JOIN ranks r ON r.rank = t.rank
             WHERE p.child = ?1
             ORDER BY r.rank_order",
        )?;
        let lineage = stmt
            .query_map(params![tax_id], |row| {
                Ok(LineageEntry {
                    rank: row.get(0)?,
                    tax_id: row.get(1)?,
                    tax_name: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lineage)
    }

    fn require_interval(&self, tax_id: &str) -> TaxonomerResult<NestedInterval> {
        self.interval(tax_id)?
            .ok_or_else(|| TaxonomerError::NotFound(format!("taxon {} in hierarchy", tax_id)))
    }
}
