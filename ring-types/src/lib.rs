//! # ring-types
//!
//! Shared types for ring-mtr, the bidirectional MTR runner for NLNOG RING nodes.
//!
//! This crate provides the foundational types used across all ring-mtr crates:
//! - [`NodeId`] - Identity of a ring node
//! - [`Outcome`], [`NodeReport`] - Per-invocation results and the unified per-node record
//! - [`Direction`], [`IpVersion`] - Batch direction and the mtr address family flag
//! - [`ConfigError`] - Configuration errors detected before any execution

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod ids;
mod outcome;
mod options;

pub use error::ConfigError;
pub use ids::NodeId;
pub use options::{Direction, IpVersion};
pub use outcome::{NodeReport, Outcome};
