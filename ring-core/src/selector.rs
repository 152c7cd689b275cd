//! Random selection of the ring nodes to measure against.
//!
//! A run measures between the root and a uniform random sample of the other
//! ring nodes, topped up with any nodes the caller forces in. Randomness
//! comes from an explicit [`Rng`], so seeded runs are reproducible.

use crate::catalog::Catalog;
use rand::seq::index;
use rand::Rng;
use ring_types::NodeId;
use thiserror::Error;

/// Error type for node selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The root is not a ring member.
    #[error("the selected root, {0} is not a known ring node")]
    UnknownRoot(NodeId),

    /// One or more forced nodes are not ring members. Lists all of them.
    #[error("forced nodes [{}] are not known ring nodes", join_ids(.0))]
    UnknownForcedNodes(Vec<NodeId>),
}

fn join_ids(ids: &[NodeId]) -> String {
    ids.iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Ordered list of nodes to measure against.
///
/// Never contains the root and never contains the same node twice.
/// Sampled nodes come first, forced additions after them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    nodes: Vec<NodeId>,
}

impl Selection {
    /// Selected nodes in order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Number of selected nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check whether `node` was selected.
    pub fn contains(&self, node: &NodeId) -> bool {
        self.nodes.contains(node)
    }

    /// Iterate selected nodes in order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter()
    }

    fn push_unique(&mut self, node: NodeId) -> bool {
        if self.nodes.contains(&node) {
            return false;
        }
        self.nodes.push(node);
        true
    }
}

/// Selects nodes from a catalog on behalf of a validated root.
#[derive(Debug)]
pub struct NodeSelector<'a> {
    catalog: &'a Catalog,
    root: &'a NodeId,
    /// Catalog minus the root, in catalog order.
    pool: Vec<&'a NodeId>,
}

impl<'a> NodeSelector<'a> {
    /// Create a selector, checking that `root` is a ring member.
    pub fn new(catalog: &'a Catalog, root: &'a NodeId) -> Result<Self, SelectionError> {
        if !catalog.contains(root) {
            return Err(SelectionError::UnknownRoot(root.clone()));
        }
        let pool = catalog.iter().filter(|n| *n != root).collect();
        Ok(Self {
            catalog,
            root,
            pool,
        })
    }

    /// Candidate nodes (every ring node except the root).
    pub fn candidates(&self) -> impl Iterator<Item = &NodeId> {
        self.pool.iter().copied()
    }

    /// Draw `count` distinct candidates uniformly at random.
    ///
    /// Asking for at least as many nodes as there are candidates returns
    /// every candidate, in catalog order.
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<NodeId> {
        if count >= self.pool.len() {
            return self.pool.iter().map(|n| (*n).clone()).collect();
        }
        index::sample(rng, self.pool.len(), count)
            .into_iter()
            .map(|i| self.pool[i].clone())
            .collect()
    }

    /// Merge `forced` nodes into a base sample.
    ///
    /// Fails listing every forced node that is not a ring member. Valid
    /// forced nodes are appended in the order given unless already present.
    /// Forcing the root is ignored.
    pub fn with_forced(
        &self,
        base: Vec<NodeId>,
        forced: &[NodeId],
    ) -> Result<Selection, SelectionError> {
        let mut unknown: Vec<NodeId> = Vec::new();
        for node in forced {
            if !self.catalog.contains(node) && !unknown.contains(node) {
                unknown.push(node.clone());
            }
        }
        if !unknown.is_empty() {
            return Err(SelectionError::UnknownForcedNodes(unknown));
        }

        let mut selection = Selection::default();
        for node in base {
            if &node != self.root {
                selection.push_unique(node);
            }
        }

        for node in forced {
            if node == self.root {
                tracing::warn!("Ignoring forced node {}: it is the root", node);
                continue;
            }
            if selection.push_unique(node.clone()) {
                tracing::debug!("Forced node {} added to selection", node);
            }
        }

        Ok(selection)
    }

    /// Sample `count` nodes, then merge in `forced`.
    pub fn select<R: Rng + ?Sized>(
        &self,
        count: usize,
        forced: &[NodeId],
        rng: &mut R,
    ) -> Result<Selection, SelectionError> {
        let base = self.sample(count, rng);
        self.with_forced(base, forced)
    }
}

/// Select the nodes to measure against `root`.
///
/// See [`NodeSelector`] for the individual steps.
pub fn select_nodes<R: Rng + ?Sized>(
    catalog: &Catalog,
    root: &NodeId,
    count: usize,
    forced: &[NodeId],
    rng: &mut R,
) -> Result<Selection, SelectionError> {
    NodeSelector::new(catalog, root)?.select(count, forced, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn catalog() -> Catalog {
        Catalog::parse(["root a b c d"]).unwrap()
    }

    fn id(s: &str) -> NodeId {
        NodeId::new(s)
    }

    fn ids(names: &[&str]) -> Vec<NodeId> {
        names.iter().map(|s| id(s)).collect()
    }

    #[test]
    fn unknown_root_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = select_nodes(&catalog(), &id("nope"), 2, &[], &mut rng);
        assert_eq!(result, Err(SelectionError::UnknownRoot(id("nope"))));
    }

    #[test]
    fn sample_size_matches_count_and_excludes_root() {
        let catalog = catalog();
        let root = id("root");
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            for count in 0..=4 {
                let selection = select_nodes(&catalog, &root, count, &[], &mut rng).unwrap();
                assert_eq!(selection.len(), count);
                assert!(!selection.contains(&root));
            }
        }
    }

    #[test]
    fn sample_has_no_duplicates() {
        let catalog = Catalog::parse(["root n1 n2 n3 n4 n5 n6 n7 n8 n9"]).unwrap();
        let root = id("root");
        let mut rng = StdRng::seed_from_u64(7);
        let selection = select_nodes(&catalog, &root, 6, &[], &mut rng).unwrap();
        let mut sorted = selection.nodes().to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 6);
    }

    #[test]
    fn count_zero_yields_empty_base() {
        let mut rng = StdRng::seed_from_u64(3);
        let selection = select_nodes(&catalog(), &id("root"), 0, &[], &mut rng).unwrap();
        assert!(selection.is_empty());
    }

    #[test]
    fn oversized_count_returns_whole_pool() {
        let mut rng = StdRng::seed_from_u64(3);
        for count in [4, 5, 100] {
            let selection =
                select_nodes(&catalog(), &id("root"), count, &[], &mut rng).unwrap();
            assert_eq!(selection.nodes(), ids(&["a", "b", "c", "d"]).as_slice());
        }
    }

    #[test]
    fn root_only_catalog_selects_nothing() {
        let catalog = Catalog::parse(["root"]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let selection = select_nodes(&catalog, &id("root"), 10, &[], &mut rng).unwrap();
        assert!(selection.is_empty());
    }

    #[test]
    fn same_seed_same_selection() {
        let catalog = Catalog::parse(["root n1 n2 n3 n4 n5 n6 n7 n8 n9"]).unwrap();
        let root = id("root");
        let first = select_nodes(&catalog, &root, 4, &[], &mut StdRng::seed_from_u64(42)).unwrap();
        let second =
            select_nodes(&catalog, &root, 4, &[], &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn sampling_is_roughly_uniform() {
        let catalog = catalog();
        let root = id("root");
        let selector = NodeSelector::new(&catalog, &root).unwrap();
        let mut rng = StdRng::seed_from_u64(2024);
        let mut hits: HashMap<NodeId, usize> = HashMap::new();

        let trials = 4000;
        for _ in 0..trials {
            for node in selector.sample(2, &mut rng) {
                *hits.entry(node).or_default() += 1;
            }
        }

        // Each of 4 candidates is picked with probability 1/2.
        let expected = trials / 2;
        assert_eq!(hits.len(), 4);
        for (node, count) in hits {
            let diff = count.abs_diff(expected);
            assert!(diff < expected / 10, "{node} picked {count} times");
        }
    }

    #[test]
    fn forced_nodes_are_appended_in_order() {
        let catalog = catalog();
        let root = id("root");
        let selector = NodeSelector::new(&catalog, &root).unwrap();
        let selection = selector
            .with_forced(ids(&["a"]), &ids(&["d", "b"]))
            .unwrap();
        assert_eq!(selection.nodes(), ids(&["a", "d", "b"]).as_slice());
    }

    #[test]
    fn forcing_an_already_selected_node_is_idempotent() {
        let catalog = catalog();
        let root = id("root");
        let selector = NodeSelector::new(&catalog, &root).unwrap();
        let selection = selector
            .with_forced(ids(&["a", "b"]), &ids(&["b", "b"]))
            .unwrap();
        assert_eq!(selection.nodes(), ids(&["a", "b"]).as_slice());
    }

    #[test]
    fn size_is_count_plus_new_forced_nodes() {
        let catalog = Catalog::parse(["root n1 n2 n3 n4 n5 n6 n7 n8 n9"]).unwrap();
        let root = id("root");
        let forced = ids(&["n1", "n2"]);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let selector = NodeSelector::new(&catalog, &root).unwrap();
            let base = selector.sample(3, &mut rng);
            let new_forced = forced.iter().filter(|f| !base.contains(*f)).count();
            let selection = selector.with_forced(base, &forced).unwrap();
            assert_eq!(selection.len(), 3 + new_forced);
        }
    }

    #[test]
    fn unknown_forced_node_is_named() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = select_nodes(&catalog(), &id("root"), 1, &ids(&["zz"]), &mut rng).unwrap_err();
        assert_eq!(err, SelectionError::UnknownForcedNodes(ids(&["zz"])));
        assert!(err.to_string().contains("zz"));
    }

    #[test]
    fn all_unknown_forced_nodes_are_reported() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = select_nodes(
            &catalog(),
            &id("root"),
            1,
            &ids(&["x1", "a", "x2"]),
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(err, SelectionError::UnknownForcedNodes(ids(&["x1", "x2"])));
        let message = err.to_string();
        assert!(message.contains("x1"));
        assert!(message.contains("x2"));
    }

    #[test]
    fn forcing_the_root_is_ignored() {
        let catalog = catalog();
        let root = id("root");
        let selector = NodeSelector::new(&catalog, &root).unwrap();
        let selection = selector
            .with_forced(ids(&["a"]), &ids(&["root", "c"]))
            .unwrap();
        assert_eq!(selection.nodes(), ids(&["a", "c"]).as_slice());
    }

    #[test]
    fn candidates_exclude_root() {
        let catalog = catalog();
        let root = id("b");
        let selector = NodeSelector::new(&catalog, &root).unwrap();
        let candidates: Vec<&str> = selector.candidates().map(NodeId::as_str).collect();
        assert_eq!(candidates, vec!["root", "a", "c", "d"]);
    }
}
