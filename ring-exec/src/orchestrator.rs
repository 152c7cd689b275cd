//! Bidirectional MTR run orchestration.
//!
//! A run is single-threaded control flow around one concurrent section:
//! 1. select nodes (fails fast on configuration errors, before any connection)
//! 2. build the inbound and outbound batches
//! 3. dispatch both batches and wait for both to finish
//! 4. correlate each batch back to nodes and unify into reports

use crate::executor::Executor;
use rand::Rng;
use ring_core::{
    build_batches, correlate_inbound, correlate_outbound, select_nodes, unify, BatchOptions,
    Catalog, CorrelationError, Selection, SelectionError,
};
use ring_types::{NodeId, NodeReport};
use thiserror::Error;

/// Errors that abort a run.
///
/// Per-node transport failures never show up here; they are carried in the
/// affected node's [`NodeReport`].
#[derive(Debug, Error)]
pub enum RunError {
    /// Root or forced nodes are not ring members.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Results could not be mapped back onto the selection.
    #[error("internal error: {0}")]
    Correlation(#[from] CorrelationError),
}

/// What to measure and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    /// Node all measurements are taken from and to.
    pub root: NodeId,
    /// Number of nodes to sample.
    pub count: usize,
    /// Nodes to include whether sampled or not.
    pub forced: Vec<NodeId>,
    /// Batch shaping options.
    pub options: BatchOptions,
}

impl RunPlan {
    /// Select the nodes for this plan from `catalog`.
    pub fn select<R: Rng + ?Sized>(
        &self,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Result<Selection, SelectionError> {
        select_nodes(catalog, &self.root, self.count, &self.forced, rng)
    }
}

/// Runs bidirectional measurements through an [`Executor`].
#[derive(Debug)]
pub struct Orchestrator<E> {
    executor: E,
}

impl<E: Executor> Orchestrator<E> {
    /// Create an orchestrator over `executor`.
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// The underlying executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Measure against an already made selection.
    ///
    /// Returns one report per selected node, in selection order.
    pub async fn run(
        &self,
        plan: &RunPlan,
        selection: &Selection,
    ) -> Result<Vec<NodeReport>, RunError> {
        let options = &plan.options;
        tracing::info!(
            "Performing bidirectional MTRs {} with {} cycles between '{}' and the following nodes: {} \
             using user '{}', {}s of connect timeout and {} connect retries.",
            options.ip_version.flag().unwrap_or(""),
            options.cycles,
            plan.root,
            selection
                .iter()
                .map(NodeId::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            options.user,
            options.connect_timeout.as_secs(),
            options.retries,
        );

        let batches = build_batches(selection, &plan.root, options);

        let (inbound, outbound) = tokio::join!(
            self.executor.execute(&batches.inbound),
            self.executor.execute(&batches.outbound),
        );
        tracing::debug!(
            "Batches complete: {} inbound, {} outbound outcomes",
            inbound.len(),
            outbound.len()
        );

        let inbound = correlate_inbound(&options.domain, inbound)?;
        let outbound = correlate_outbound(selection.nodes(), outbound)?;
        Ok(unify(selection, inbound, outbound)?)
    }

    /// Select nodes from `catalog`, then measure against them.
    pub async fn select_and_run<R: Rng + ?Sized>(
        &self,
        plan: &RunPlan,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Result<Vec<NodeReport>, RunError> {
        let selection = plan.select(catalog, rng)?;
        self.run(plan, &selection).await
    }
}
