//! Unification of per-direction outcomes into one report per node.

use crate::correlate::CorrelationError;
use crate::selector::Selection;
use ring_types::{Direction, NodeId, NodeReport, Outcome};
use std::collections::HashMap;

/// Build one [`NodeReport`] per selected node, in selection order.
///
/// Every selected node must have both an inbound and an outbound outcome.
pub fn unify(
    selection: &Selection,
    mut inbound: HashMap<NodeId, Outcome>,
    mut outbound: HashMap<NodeId, Outcome>,
) -> Result<Vec<NodeReport>, CorrelationError> {
    let mut reports = Vec::with_capacity(selection.len());
    for node in selection.iter() {
        let missing = |direction| CorrelationError::MissingOutcome {
            node: node.clone(),
            direction,
        };
        let inbound_outcome = inbound
            .remove(node)
            .ok_or_else(|| missing(Direction::Inbound))?;
        let outbound_outcome = outbound
            .remove(node)
            .ok_or_else(|| missing(Direction::Outbound))?;
        reports.push(NodeReport {
            node: node.clone(),
            inbound: inbound_outcome,
            outbound: outbound_outcome,
        });
    }

    if !inbound.is_empty() || !outbound.is_empty() {
        tracing::warn!(
            "Discarding {} inbound and {} outbound outcomes for unselected nodes",
            inbound.len(),
            outbound.len()
        );
    }

    Ok(reports)
}
