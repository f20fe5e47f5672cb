//! Nested-interval hierarchy
//!
//! A flat parent-linked table is materialized as a [`TaxonArena`], numbered
//! with `(lft, rgt)` intervals and persisted to the `ranks`, `taxa` and
//! `hierarchy` tables. Ancestry then reduces to interval containment.

pub mod arena;
pub mod builder;

pub use arena::{IntermediateTaxon, NodeId, TaxonArena, Visit, Walk};

use serde::{Deserialize, Serialize};

/// Persisted interval of one taxon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedInterval {
    pub tax_id: String,
    pub lft: i64,
    pub rgt: i64,
}

impl NestedInterval {
    /// True iff `self` is an ancestor of `other` or the same taxon
    pub fn contains(&self, other: &NestedInterval) -> bool {
        self.lft <= other.lft && other.rgt <= self.rgt
    }
}

/// One row of a flat taxtable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxtableRow {
    pub tax_id: String,
    pub parent_id: Option<String>,
    pub rank: String,
    pub tax_name: String,
}

impl TaxtableRow {
    pub fn new(
        tax_id: impl Into<String>,
        parent_id: Option<&str>,
        rank: impl Into<String>,
        tax_name: impl Into<String>,
    ) -> Self {
        Self {
            tax_id: tax_id.into(),
            parent_id: parent_id.map(str::to_string),
            rank: rank.into(),
            tax_name: tax_name.into(),
        }
    }

    /// A root has no parent, an empty parent, or is its own parent
    pub fn is_root(&self) -> bool {
        match self.parent_id.as_deref() {
            None | Some("") => true,
            Some(parent) => parent == self.tax_id,
        }
    }
}
