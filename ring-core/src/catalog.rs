//! Ring node catalog.
//!
//! The ring publishes its member list as whitespace-separated tokens spread
//! over one or more TXT records. The catalog keeps DNS response order and
//! collapses duplicates to their first occurrence.

use indexmap::IndexSet;
use ring_types::NodeId;

/// Error type for catalog parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The records contained no node identifiers.
    Empty,
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Empty => write!(f, "ring catalog is empty"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Ordered set of every known ring node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    nodes: IndexSet<NodeId>,
}

impl Catalog {
    /// Parse raw TXT records into a catalog.
    ///
    /// Surrounding quotes are stripped from each record, records are joined
    /// with single spaces, and the result is split on whitespace.
    pub fn parse<I, S>(records: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = records
            .into_iter()
            .map(|r| r.as_ref().trim_matches('"').to_string())
            .collect::<Vec<_>>()
            .join(" ");

        let nodes: IndexSet<NodeId> = joined.split_whitespace().map(NodeId::from).collect();
        if nodes.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { nodes })
    }

    /// Check whether `node` is a ring member.
    pub fn contains(&self, node: &NodeId) -> bool {
        self.nodes.contains(node)
    }

    /// Number of distinct nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a parsed catalog.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate nodes in DNS response order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter()
    }
}
