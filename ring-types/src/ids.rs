//! Identity type for ring nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Short name of a ring node, e.g. `example01`.
///
/// Opaque and stable for a whole run. Resolves to a host via [`NodeId::fqdn`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a NodeId from its short name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The short name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fully-qualified host name under `domain` (`<id>.<domain>`).
    pub fn fqdn(&self, domain: &str) -> String {
        format!("{}.{}", self.0, domain)
    }

    /// Recover a NodeId from a host name built by [`NodeId::fqdn`].
    ///
    /// Returns `None` if `host` is not directly under `domain`.
    pub fn from_fqdn(host: &str, domain: &str) -> Option<Self> {
        let short = host.strip_suffix(domain)?.strip_suffix('.')?;
        if short.is_empty() {
            return None;
        }
        Some(Self(short.to_string()))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
