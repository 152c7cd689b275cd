//! # ring-core
//!
//! Pure logic for ring-mtr (no I/O, instant tests).
//!
//! This crate turns a ring catalog into the two command batches of a
//! bidirectional MTR run, and turns the batch outcomes back into one report
//! per node:
//!
//! ```text
//! Catalog ─► NodeSelector ─► build_batches ─┬─► inbound  BatchSpec ─► correlate_inbound  ─┐
//!                                           └─► outbound BatchSpec ─► correlate_outbound ─┴─► unify
//! ```
//!
//! Executing the batches is left to `ring-exec`; everything here is
//! deterministic given its inputs (selection takes an explicit RNG).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod catalog;
pub mod correlate;
pub mod report;
pub mod selector;

pub use batch::{
    build_batches, BatchOptions, BatchSpec, Batches, Invocation, MtrCommand,
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_CYCLES, DEFAULT_OUTBOUND_CONCURRENCY, DEFAULT_RETRIES,
};
pub use catalog::{Catalog, CatalogError};
pub use correlate::{correlate_inbound, correlate_outbound, CorrelationError};
pub use report::unify;
pub use selector::{select_nodes, NodeSelector, Selection, SelectionError};
