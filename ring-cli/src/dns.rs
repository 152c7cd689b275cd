//! Ring membership lookup.
//!
//! The ring publishes its node list as TXT records on the ring domain.
//! [`DigSource`] fetches them by shelling out to `dig`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use ring_core::Catalog;
use std::process::Stdio;
use thiserror::Error;

/// TXT lookup errors.
#[derive(Debug, Error)]
pub enum DnsError {
    /// The resolver process could not be started.
    #[error("failed to run resolver: {0}")]
    Spawn(#[from] std::io::Error),

    /// The resolver ran but the query failed.
    #[error("TXT lookup for {name} failed (exit code {code:?}): {stderr}")]
    Lookup {
        /// Queried name.
        name: String,
        /// Resolver exit code.
        code: Option<i32>,
        /// Resolver diagnostics.
        stderr: String,
    },
}

/// Source of TXT record strings.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// All TXT character-strings published on `name`.
    async fn fetch(&self, name: &str) -> Result<Vec<String>, DnsError>;
}

/// [`RecordSource`] backed by `dig +short TXT`.
#[derive(Debug, Clone)]
pub struct DigSource {
    program: String,
}

impl Default for DigSource {
    fn default() -> Self {
        Self {
            program: "dig".to_string(),
        }
    }
}

impl DigSource {
    /// Use `dig` from `PATH`.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordSource for DigSource {
    async fn fetch(&self, name: &str) -> Result<Vec<String>, DnsError> {
        let output = tokio::process::Command::new(&self.program)
            .args(["+short", "TXT", name])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(DnsError::Lookup {
                name: name.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(parse_dig_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Extract TXT character-strings from `dig +short` output.
///
/// Each record is printed on its own line as one or more quoted strings.
/// Comment lines (`;;`) are skipped; unquoted lines are taken whole.
pub fn parse_dig_output(output: &str) -> Vec<String> {
    let mut strings = Vec::new();
    for line in output.lines().map(str::trim) {
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if !line.contains('"') {
            strings.push(line.to_string());
            continue;
        }
        // Quoted segments sit at odd positions when splitting on quotes.
        strings.extend(
            line.split('"')
                .skip(1)
                .step_by(2)
                .filter(|segment| !segment.trim().is_empty())
                .map(str::to_string),
        );
    }
    strings
}

/// Fetch and parse the ring catalog published on `domain`.
pub async fn fetch_catalog<S: RecordSource + ?Sized>(source: &S, domain: &str) -> Result<Catalog> {
    let records = source
        .fetch(domain)
        .await
        .with_context(|| format!("Failed to fetch ring nodes from {}", domain))?;
    tracing::debug!("Fetched {} TXT strings from {}", records.len(), domain);

    let catalog = Catalog::parse(&records)
        .with_context(|| format!("No ring nodes published on {}", domain))?;
    tracing::info!("Found {} ring nodes", catalog.len());
    Ok(catalog)
}
