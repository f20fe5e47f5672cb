//! Streaming, de-duplicating lineage tree
//!
//! Records are folded in one at a time. A node is identified by its name and
//! its parent node, so records that share a lineage prefix share the branch.

use super::lineage::LineageRecord;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use taxonomer_core::config::GreenGenesConfig;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageNode {
    pub tax_id: String,
    pub name: String,
    pub rank: String,
    /// Index of the parent node, `None` for the root
    pub parent: Option<usize>,
}

/// Name/rank pair created under more than one parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolyphyleticGroup {
    pub name: String,
    pub rank: String,
    /// `(node index, parent index)` for every independent occurrence
    pub members: Vec<(usize, usize)>,
}

/// One polyphyly rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub tax_id: String,
    pub old_name: String,
    pub new_name: String,
}

pub struct LineageTree {
    config: GreenGenesConfig,
    nodes: Vec<LineageNode>,
    by_key: HashMap<(String, Option<usize>), usize>,
    /// Distinct parents per `(name, rank)`
    parent_sets: BTreeMap<(String, String), BTreeSet<Option<usize>>>,
    /// `(node index, raw lineage)` alternate names in discovery order
    alternates: Vec<(usize, String)>,
    seen_raw: HashSet<String>,
    records: usize,
}

impl LineageTree {
    pub fn new(config: &GreenGenesConfig) -> Self {
        Self {
            config: config.clone(),
            nodes: Vec::new(),
            by_key: HashMap::new(),
            parent_sets: BTreeMap::new(),
            alternates: Vec::new(),
            seen_raw: HashSet::new(),
            records: 0,
        }
    }

    /// Fold one record into the tree and return its terminal node
    pub fn add_record(&mut self, record: &LineageRecord) -> usize {
        let mut parent: Option<usize> = None;
        for token in &record.tokens {
            parent = Some(self.get_or_insert(&token.name, &token.rank, parent));
        }
        // Every parsed lineage starts with the root token
        let terminal = parent.unwrap_or(0);

        if self.seen_raw.insert(record.raw.clone()) {
            self.alternates.push((terminal, record.raw.clone()));
        }
        self.records += 1;
        terminal
    }

    fn get_or_insert(&mut self, name: &str, rank: &str, parent: Option<usize>) -> usize {
        if let Some(&existing) = self.by_key.get(&(name.to_string(), parent)) {
            return existing;
        }

        let index = self.nodes.len();
        // Identifiers count from 1 in discovery order
        let tax_id = self.config.tax_id(index as u64 + 1);
        self.nodes.push(LineageNode {
            tax_id,
            name: name.to_string(),
            rank: rank.to_string(),
            parent,
        });
        self.by_key.insert((name.to_string(), parent), index);
        self.parent_sets
            .entry((name.to_string(), rank.to_string()))
            .or_default()
            .insert(parent);
        index
    }

    pub fn nodes(&self) -> &[LineageNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn records(&self) -> usize {
        self.records
    }

    /// Parent tax_id as stored; the root is its own parent
    pub fn parent_tax_id(&self, index: usize) -> &str {
        match self.nodes[index].parent {
            Some(parent) => &self.nodes[parent].tax_id,
            None => &self.nodes[index].tax_id,
        }
    }

    /// `(tax_id, raw lineage)` pairs, one per distinct raw string
    pub fn alternate_names(&self) -> impl Iterator<Item = (&str, &str)> {
        self.alternates
            .iter()
            .map(|(index, raw)| (self.nodes[*index].tax_id.as_str(), raw.as_str()))
    }

    /// Groups sorted by `(name, rank)`, members by parent
    pub fn polyphyletic_groups(&self) -> Vec<PolyphyleticGroup> {
        self.parent_sets
            .iter()
            .filter(|(_, parents)| parents.len() > 1)
            .map(|((name, rank), parents)| {
                let members = parents
                    .iter()
                    .filter_map(|parent| {
                        let parent = (*parent)?;
                        let node = self.by_key.get(&(name.clone(), Some(parent)))?;
                        Some((*node, parent))
                    })
                    .collect();
                PolyphyleticGroup {
                    name: name.clone(),
                    rank: rank.clone(),
                    members,
                }
            })
            .collect()
    }

    /// Unique names for every polyphyletic occurrence: `"<name> [<parent name>]"`
    pub fn renames(&self) -> Vec<Rename> {
        let mut renames = Vec::new();
        for group in self.polyphyletic_groups() {
            warn!("Renaming items from polyphyletic {} {}", group.rank, group.name);
            for (node, parent) in group.members {
                let new_name = format!("{} [{}]", group.name, self.nodes[parent].name);
                warn!("  '{}' -> '{}'", group.name, new_name);
                renames.push(Rename {
                    tax_id: self.nodes[node].tax_id.clone(),
                    old_name: group.name.clone(),
                    new_name,
                });
            }
        }
        renames
    }
}
