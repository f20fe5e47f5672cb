//! In-memory taxon tree addressed by index
//!
//! Each taxon knows its parent and the set of its children. The two are only
//! ever changed together through [`TaxonArena::set_parent`], so
//! `child ∈ parent.children ⟺ child.parent == parent` holds after every call.

use std::collections::{BTreeSet, HashMap};
use taxonomer_core::{TaxonomerError, TaxonomerResult};

/// Index of a taxon inside its arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct IntermediateTaxon {
    pub tax_id: String,
    pub rank: String,
    pub tax_name: String,
    pub lft: Option<i64>,
    pub rgt: Option<i64>,
    parent: Option<NodeId>,
    children: BTreeSet<NodeId>,
}

impl IntermediateTaxon {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().copied()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Step of a depth-first walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// First time the walk reaches a taxon
    Enter(NodeId),
    /// All of the taxon's descendants have been entered and left
    Leave(NodeId),
}

#[derive(Debug, Default)]
pub struct TaxonArena {
    nodes: Vec<IntermediateTaxon>,
    by_tax_id: HashMap<String, NodeId>,
}

impl TaxonArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a taxon below `parent` (`None` for a root)
    pub fn add(
        &mut self,
        tax_id: impl Into<String>,
        rank: impl Into<String>,
        tax_name: impl Into<String>,
        parent: Option<NodeId>,
    ) -> TaxonomerResult<NodeId> {
        let tax_id = tax_id.into();
        if self.by_tax_id.contains_key(&tax_id) {
            return Err(TaxonomerError::InvalidInput(format!(
                "duplicate tax_id {}",
                tax_id
            )));
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(IntermediateTaxon {
            tax_id: tax_id.clone(),
            rank: rank.into(),
            tax_name: tax_name.into(),
            lft: None,
            rgt: None,
            parent: None,
            children: BTreeSet::new(),
        });
        self.by_tax_id.insert(tax_id, id);
        self.set_parent(id, parent)?;
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> &IntermediateTaxon {
        &self.nodes[id.0]
    }

    pub fn lookup(&self, tax_id: &str) -> Option<NodeId> {
        self.by_tax_id.get(tax_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &IntermediateTaxon)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Re-parent `id`, detaching it from its previous parent's children.
    ///
    /// Rejects moves that would make a taxon its own ancestor.
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> TaxonomerResult<()> {
        if let Some(new_parent) = parent {
            if self.is_ancestor_or_self(id, new_parent) {
                return Err(TaxonomerError::InvalidInput(format!(
                    "moving {} under {} would create a cycle",
                    self.nodes[id.0].tax_id, self.nodes[new_parent.0].tax_id
                )));
            }
        }

        if let Some(old) = self.nodes[id.0].parent.take() {
            self.nodes[old.0].children.remove(&id);
        }
        if let Some(new_parent) = parent {
            self.nodes[new_parent.0].children.insert(id);
        }
        self.nodes[id.0].parent = parent;
        Ok(())
    }

    /// A childless taxon is only its own ancestor, so fresh taxa never walk
    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        if ancestor == node {
            return true;
        }
        if self.nodes[ancestor.0].children.is_empty() {
            return false;
        }
        let mut cursor = self.nodes[node.0].parent;
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes[current.0].parent;
        }
        false
    }

    /// Follow parent links from the first taxon up to a parentless one
    pub fn root(&self) -> Option<NodeId> {
        let mut current = NodeId(0);
        self.nodes.first()?;
        while let Some(parent) = self.nodes[current.0].parent {
            current = parent;
        }
        Some(current)
    }

    /// Depth-first walk of the subtree rooted at `start`
    pub fn walk(&self, start: NodeId) -> Walk<'_> {
        Walk {
            arena: self,
            stack: Vec::new(),
            pending: Some(start),
        }
    }

    /// `start` followed by every taxon below it
    pub fn descendants(&self, start: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.walk(start).filter_map(|visit| match visit {
            Visit::Enter(id) => Some(id),
            Visit::Leave(_) => None,
        })
    }

    /// Number the tree with nested intervals and return its root.
    ///
    /// `lft` is taken on entering a taxon and `rgt` on leaving it from one
    /// counter starting at 1, so N taxa use exactly the values `1..=2N`.
    pub fn assign_intervals(&mut self) -> TaxonomerResult<NodeId> {
        let root = self
            .root()
            .ok_or_else(|| TaxonomerError::InvalidInput("taxtable contains no rows".into()))?;

        let visits: Vec<Visit> = self.walk(root).collect();
        let mut counter: i64 = 0;
        for visit in visits {
            counter += 1;
            match visit {
                Visit::Enter(id) => self.nodes[id.0].lft = Some(counter),
                Visit::Leave(id) => self.nodes[id.0].rgt = Some(counter),
            }
        }

        let unreachable = self.nodes.iter().filter(|n| n.lft.is_none()).count();
        if unreachable > 0 {
            return Err(TaxonomerError::InvalidInput(format!(
                "{} taxa are not reachable from root {}",
                unreachable, self.nodes[root.0].tax_id
            )));
        }
        Ok(root)
    }

    fn child_stack(&self, id: NodeId) -> Vec<NodeId> {
        // Reversed so that popping visits children in ascending index order
        self.nodes[id.0].children.iter().rev().copied().collect()
    }
}

/// Iterative depth-first walk.
///
/// Keeps an explicit stack of `(taxon, children not yet entered)` frames
/// instead of recursing, so depth is bounded by memory, not the call stack.
/// Sibling order is an implementation detail.
pub struct Walk<'a> {
    arena: &'a TaxonArena,
    stack: Vec<(NodeId, Vec<NodeId>)>,
    pending: Option<NodeId>,
}

impl Iterator for Walk<'_> {
    type Item = Visit;

    fn next(&mut self) -> Option<Visit> {
        if let Some(start) = self.pending.take() {
            self.stack.push((start, self.arena.child_stack(start)));
            return Some(Visit::Enter(start));
        }

        let next_child = match self.stack.last_mut() {
            Some((_, remaining)) => remaining.pop(),
            None => return None,
        };

        match next_child {
            Some(child) => {
                self.stack.push((child, self.arena.child_stack(child)));
                Some(Visit::Enter(child))
            }
            None => self.stack.pop().map(|(node, _)| Visit::Leave(node)),
        }
    }
}
