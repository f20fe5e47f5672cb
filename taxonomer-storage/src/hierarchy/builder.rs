//! Persisting a flat taxtable as a nested-interval hierarchy

use super::{TaxonArena, TaxtableRow};
use crate::loader::{self, InsertOptions, LoadOutcome, Row};
use crate::schema::tables;
use crate::taxdb::TaxDb;
use rusqlite::types::Value;
use taxonomer_core::{RankVocabulary, TaxonomerError, TaxonomerResult, UNDEFINED_RANK};
use tracing::{debug, info, warn};

/// Leading taxtable columns; anything after them names a rank
pub const TAXTABLE_COLUMNS: [&str; 4] = ["tax_id", "parent_id", "rank", "tax_name"];

/// Materialize `rows` in an arena. Parents must appear before their children.
pub fn build_arena<I>(rows: I) -> TaxonomerResult<TaxonArena>
where
    I: IntoIterator<Item = TaxtableRow>,
{
    let mut arena = TaxonArena::new();
    for row in rows {
        let parent = if row.is_root() {
            None
        } else {
            let parent_id = row.parent_id.clone().unwrap_or_default();
            match arena.lookup(&parent_id) {
                Some(parent) => Some(parent),
                None => {
                    return Err(TaxonomerError::MissingParent {
                        tax_id: row.tax_id,
                        parent_id,
                    })
                }
            }
        };
        arena.add(row.tax_id, row.rank, row.tax_name, parent)?;
    }
    Ok(arena)
}

/// Rank order declared after the leading taxtable columns.
///
/// A header without rank columns falls back to the standard vocabulary.
fn rank_vocabulary(fieldnames: &[String]) -> TaxonomerResult<RankVocabulary> {
    if fieldnames.len() < TAXTABLE_COLUMNS.len() {
        return Err(TaxonomerError::InvalidInput(format!(
            "taxtable header needs at least {} columns, got {}",
            TAXTABLE_COLUMNS.len(),
            fieldnames.len()
        )));
    }
    let declared = &fieldnames[TAXTABLE_COLUMNS.len()..];
    if declared.is_empty() {
        debug!("No rank columns in taxtable header; using the standard ranks");
        return Ok(RankVocabulary::standard());
    }
    Ok(RankVocabulary::from_names(declared))
}

/// Declared ranks followed by `no_rank` and any rank only seen in the rows
fn with_undeclared_ranks(declared: RankVocabulary, arena: &TaxonArena) -> RankVocabulary {
    let mut extra: Vec<&str> = Vec::new();
    let seen = std::iter::once(UNDEFINED_RANK).chain(arena.iter().map(|(_, t)| t.rank.as_str()));
    for rank in seen {
        if !declared.contains(rank) && !extra.contains(&rank) {
            extra.push(rank);
        }
    }
    if extra.is_empty() {
        return declared;
    }
    debug!("Appending undeclared ranks: {}", extra.join(", "));
    RankVocabulary::from_names(declared.iter().chain(extra))
}

impl TaxDb {
    /// Build the reference-package hierarchy from a flat taxtable.
    ///
    /// `fieldnames` is the full header; the columns after `tax_name` give the
    /// rank order from the root down. `no_rank` and ranks that only appear in
    /// the rows are ordered after the declared ones. Ranks, taxa and intervals are written in
    /// that sequence and committed once. Returns `Skipped` when `taxa` is
    /// already populated.
    pub fn insert_from_taxtable<I>(
        &mut self,
        fieldnames: &[String],
        rows: I,
    ) -> TaxonomerResult<LoadOutcome>
    where
        I: IntoIterator<Item = TaxtableRow>,
    {
        let ranks = rank_vocabulary(fieldnames)?;
        if self.has_row(tables::TAXA)? {
            warn!("Table \"{}\" already contains data; hierarchy not rebuilt", tables::TAXA);
            return Ok(LoadOutcome::Skipped);
        }

        let mut arena = build_arena(rows)?;
        let root = arena.assign_intervals()?;
        info!(
            "Built hierarchy of {} taxa rooted at {}",
            arena.len(),
            arena.get(root).tax_id
        );

        let ranks = with_undeclared_ranks(ranks, &arena);
        let rank_rows: Vec<Row> = ranks
            .rank_orders()
            .map(|(rank, order)| vec![Value::Text(rank.to_string()), Value::Integer(order as i64)])
            .collect();
        let taxa_rows: Vec<Row> = arena
            .iter()
            .map(|(_, taxon)| {
                vec![
                    Value::Text(taxon.tax_id.clone()),
                    Value::Text(taxon.tax_name.clone()),
                    Value::Text(taxon.rank.clone()),
                ]
            })
            .collect();
        let mut hierarchy_rows: Vec<Row> = Vec::with_capacity(arena.len());
        for (_, taxon) in arena.iter() {
            match (taxon.lft, taxon.rgt) {
                (Some(lft), Some(rgt)) => hierarchy_rows.push(vec![
                    Value::Text(taxon.tax_id.clone()),
                    Value::Integer(lft),
                    Value::Integer(rgt),
                ]),
                _ => {
                    return Err(TaxonomerError::InvariantViolation(format!(
                        "taxon {} has no interval",
                        taxon.tax_id
                    )))
                }
            }
        }

        let tx = self.connection_mut().transaction()?;
        let rank_outcome = loader::insert_rows(
            &tx,
            tables::RANKS,
            rank_rows,
            &InsertOptions::new().with_columns(&["rank", "rank_order"]),
        )?;
        if rank_outcome.is_skipped() {
            debug!("Keeping existing rank order");
        }
        let inserted = loader::insert_rows(
            &tx,
            tables::TAXA,
            taxa_rows,
            &InsertOptions::new().with_columns(&["tax_id", "tax_name", "rank"]),
        )?;
        loader::insert_rows(
            &tx,
            tables::HIERARCHY,
            hierarchy_rows,
            &InsertOptions::new().with_columns(&["tax_id", "lft", "rgt"]),
        )?;
        tx.commit()?;

        Ok(inserted)
    }

    /// Attach sequence names to taxa as `(seqname, tax_id)` pairs
    pub fn insert_sequences<I>(
        &mut self,
        pairs: I,
        options: &InsertOptions,
    ) -> TaxonomerResult<LoadOutcome>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let rows = pairs
            .into_iter()
            .map(|(seqname, tax_id)| vec![Value::Text(seqname), Value::Text(tax_id)]);
        let options = InsertOptions {
            column_names: Some(vec!["seqname".into(), "tax_id".into()]),
            ..options.clone()
        };
        self.bulk_insert(tables::SEQUENCES, rows, &options)
    }
}
