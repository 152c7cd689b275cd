//! Mapping batch outcomes back onto ring nodes.
//!
//! The two batches need different strategies:
//! - inbound outcomes each come from a distinct host, so they are keyed by
//!   the host they ran on;
//! - outbound outcomes all come from the root, so keying by host would
//!   collapse them into one entry. They are instead zipped positionally
//!   with the selection order the batch was built from.

use ring_types::{Direction, NodeId, Outcome};
use std::collections::HashMap;
use thiserror::Error;

/// Internal invariant violations found while correlating results.
///
/// None of these should happen with an executor that honours its ordering
/// contract; they abort the run instead of producing a partial report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrelationError {
    /// Outcome count differs from the number of selected nodes.
    #[error("outbound correlation length mismatch: {expected} nodes, {actual} outcomes")]
    LengthMismatch {
        /// Number of nodes in selection order.
        expected: usize,
        /// Number of outcomes returned.
        actual: usize,
    },

    /// An inbound outcome came from a host outside the ring domain.
    #[error("inbound outcome from unexpected host {host} (domain {domain})")]
    UnexpectedHost {
        /// Host reported by the outcome.
        host: String,
        /// Ring domain.
        domain: String,
    },

    /// Two inbound outcomes came from the same host.
    #[error("duplicate inbound outcome for host {0}")]
    DuplicateHost(String),

    /// A selected node has no outcome for one direction.
    #[error("missing {direction} outcome for node {node}")]
    MissingOutcome {
        /// Node without an outcome.
        node: NodeId,
        /// Direction missing.
        direction: Direction,
    },
}

/// Key inbound outcomes by the node they ran on.
pub fn correlate_inbound(
    domain: &str,
    outcomes: Vec<Outcome>,
) -> Result<HashMap<NodeId, Outcome>, CorrelationError> {
    let mut by_node = HashMap::with_capacity(outcomes.len());
    for outcome in outcomes {
        let node = NodeId::from_fqdn(&outcome.host, domain).ok_or_else(|| {
            CorrelationError::UnexpectedHost {
                host: outcome.host.clone(),
                domain: domain.to_string(),
            }
        })?;
        if by_node.contains_key(&node) {
            return Err(CorrelationError::DuplicateHost(outcome.host));
        }
        by_node.insert(node, outcome);
    }
    Ok(by_node)
}

/// Pair the i-th outbound outcome with the i-th node of `order`.
pub fn correlate_outbound(
    order: &[NodeId],
    outcomes: Vec<Outcome>,
) -> Result<HashMap<NodeId, Outcome>, CorrelationError> {
    if order.len() != outcomes.len() {
        return Err(CorrelationError::LengthMismatch {
            expected: order.len(),
            actual: outcomes.len(),
        });
    }
    Ok(order.iter().cloned().zip(outcomes).collect())
}
