//! Writing a lineage tree to the base taxonomy tables

use super::lineage::LineageRecord;
use super::tree::LineageTree;
use rusqlite::params;
use rusqlite::types::Value;
use serde::Serialize;
use taxonomer_core::config::GreenGenesConfig;
use taxonomer_core::{Source, TaxonomerError, TaxonomerResult};
use taxonomer_storage::loader::{self, InsertOptions, Row};
use taxonomer_storage::{tables, TaxDb, PRIMARY_NAME_CLASS};
use tracing::{info, warn};

/// What one ingestion wrote
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub records: usize,
    pub nodes: usize,
    pub names: usize,
    pub polyphyletic_groups: usize,
    pub renamed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Loaded(IngestSummary),
    /// `nodes` or `names` already held data; nothing was read or written
    Skipped,
}

impl IngestOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, IngestOutcome::Skipped)
    }
}

/// Build the lineage tree from `records` and persist it with one commit.
///
/// All-or-nothing: a populated store is left alone, and any failure (a bad
/// record, a constraint violation, an ambiguous rename) rolls back every row.
pub fn load_taxonomy<I>(
    db: &mut TaxDb,
    records: I,
    config: &GreenGenesConfig,
) -> TaxonomerResult<IngestOutcome>
where
    I: IntoIterator<Item = TaxonomerResult<LineageRecord>>,
{
    let source_id = db.source_id(Source::GreenGenes)?;
    if db.has_row(tables::NODES)? || db.has_row(tables::NAMES)? {
        warn!("nodes table has data; not updating");
        return Ok(IngestOutcome::Skipped);
    }

    let mut tree = LineageTree::new(config);
    for record in records {
        tree.add_record(&record?);
    }
    info!("Parsed {} records into {} taxa", tree.records(), tree.len());

    let node_rows: Vec<Row> = tree
        .nodes()
        .iter()
        .enumerate()
        .map(|(index, node)| {
            vec![
                Value::Text(node.tax_id.clone()),
                Value::Text(tree.parent_tax_id(index).to_string()),
                Value::Text(node.rank.clone()),
                Value::Integer(source_id),
            ]
        })
        .collect();

    let primary = tree.nodes().iter().map(|node| {
        vec![
            Value::Text(node.tax_id.clone()),
            Value::Text(node.name.clone()),
            Value::Text(PRIMARY_NAME_CLASS.to_string()),
            Value::Integer(1),
        ]
    });
    let alternates = tree.alternate_names().map(|(tax_id, raw)| {
        vec![
            Value::Text(tax_id.to_string()),
            Value::Text(raw.to_string()),
            Value::Text(config.lineage_name_class.clone()),
            Value::Integer(0),
        ]
    });
    let name_rows: Vec<Row> = primary.chain(alternates).collect();

    let renames = tree.renames();
    let polyphyletic_groups = tree.polyphyletic_groups().len();

    let tx = db.connection_mut().transaction()?;
    let nodes = loader::insert_rows(
        &tx,
        tables::NODES,
        node_rows,
        &InsertOptions::new().with_columns(&["tax_id", "parent_id", "rank", "source_id"]),
    )?;
    let names = loader::insert_rows(
        &tx,
        tables::NAMES,
        name_rows,
        &InsertOptions::new().with_columns(&["tax_id", "tax_name", "name_class", "is_primary"]),
    )?;

    {
        let mut stmt = tx.prepare(
            "UPDATE names SET tax_name = ?1
             WHERE tax_id = ?2 AND tax_name = ?3 AND is_primary = 1",
        )?;
        for rename in &renames {
            let changed = stmt.execute(params![rename.new_name, rename.tax_id, rename.old_name])?;
            if changed != 1 {
                return Err(TaxonomerError::InvariantViolation(format!(
                    "renaming '{}' of {} matched {} primary names",
                    rename.old_name, rename.tax_id, changed
                )));
            }
        }
    }
    tx.commit()?;

    Ok(IngestOutcome::Loaded(IngestSummary {
        records: tree.records(),
        nodes: nodes.rows(),
        names: names.rows(),
        polyphyletic_groups,
        renamed: renames.len(),
    }))
}
