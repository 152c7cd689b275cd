//! Error types shared across ring-mtr crates.

use thiserror::Error;

/// Configuration errors, surfaced before any remote execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// IPv4 and IPv6 were both forced.
    #[error("cannot force both IPv4 and IPv6 simultaneously")]
    ConflictingIpVersions,

    /// A mandatory setting was not provided.
    #[error("argument --{flag} (or env var {env}) is mandatory")]
    Missing {
        /// Long flag name.
        flag: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },

    /// A setting was given a value outside its accepted range.
    #[error("invalid value for {setting}: {reason}")]
    Invalid {
        /// Setting name.
        setting: &'static str,
        /// What is wrong with the value.
        reason: &'static str,
    },
}
