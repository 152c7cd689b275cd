//! Batch direction and mtr address family.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way a batch measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Run on each selected node, towards the root.
    Inbound,
    /// Run on the root, towards each selected node.
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inbound => write!(f, "inbound"),
            Direction::Outbound => write!(f, "outbound"),
        }
    }
}

/// Address family forced on mtr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    /// Let mtr pick.
    #[default]
    Any,
    /// `mtr -4`
    V4,
    /// `mtr -6`
    V6,
}

impl IpVersion {
    /// Resolve the two force flags into a single setting.
    ///
    /// Forcing both is a configuration error.
    pub fn from_flags(ipv4: bool, ipv6: bool) -> Result<Self, ConfigError> {
        match (ipv4, ipv6) {
            (true, true) => Err(ConfigError::ConflictingIpVersions),
            (true, false) => Ok(IpVersion::V4),
            (false, true) => Ok(IpVersion::V6),
            (false, false) => Ok(IpVersion::Any),
        }
    }

    /// The mtr command-line flag, if any.
    pub fn flag(self) -> Option<&'static str> {
        match self {
            IpVersion::Any => None,
            IpVersion::V4 => Some("-4"),
            IpVersion::V6 => Some("-6"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_flags_resolves_each_combination() {
        assert_eq!(IpVersion::from_flags(false, false), Ok(IpVersion::Any));
        assert_eq!(IpVersion::from_flags(true, false), Ok(IpVersion::V4));
        assert_eq!(IpVersion::from_flags(false, true), Ok(IpVersion::V6));
        assert_eq!(
            IpVersion::from_flags(true, true),
            Err(ConfigError::ConflictingIpVersions)
        );
    }

    #[test]
    fn flag_values() {
        assert_eq!(IpVersion::Any.flag(), None);
        assert_eq!(IpVersion::V4.flag(), Some("-4"));
        assert_eq!(IpVersion::V6.flag(), Some("-6"));
    }

    #[test]
    fn direction_display() {
        assert_eq!(Direction::Inbound.to_string(), "inbound");
        assert_eq!(Direction::Outbound.to_string(), "outbound");
    }
}
