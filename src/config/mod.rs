//! Configuration module for authsock-mux
//!
//! This module handles loading and parsing of configuration files,
//! including environment variable expansion and validation of the socket
//! definitions.

mod file;

use crate::agent::UpstreamSpec;
use crate::error::{Error, Result};
use crate::filter::FingerprintSet;
use crate::utils::path::expand_path;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

pub use file::{
    ConfigFile, ConfigPath, config_search_paths, find_config_file, load_config,
    resolve_config_path,
};

/// Example configuration printed by `config --example`
pub const EXAMPLE_CONFIG: &str = r#"# authsock-mux configuration

# Optional JSONL event log
log_path = "$HOME/.local/state/authsock-mux/events.jsonl"

# Expose only the work key of the default agent
[sockets.work]
path = "$HOME/.ssh/work-agent.sock"
upstreams = [
    { path = "$SSH_AUTH_SOCK", fingerprints = ["SHA256:abcd"] },
]

# Offer the keys of two agents on one socket
[sockets.all]
path = "$HOME/.ssh/all-agent.sock"
upstreams = [
    "$SSH_AUTH_SOCK",
    "~/.1password/agent.sock",
]
"#;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path to the JSONL event log
    /// Supports environment variable and tilde expansion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<String>,

    /// Socket definitions, keyed by name
    #[serde(default)]
    pub sockets: BTreeMap<String, SocketConfig>,
}

/// Configuration for a single served socket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SocketConfig {
    /// Path to the socket file
    /// Supports environment variable and tilde expansion
    pub path: String,

    /// Upstream agents combined on this socket, in order
    #[serde(default)]
    pub upstreams: Vec<UpstreamConfig>,
}

/// An upstream agent: a bare socket path or a table with fingerprints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UpstreamConfig {
    /// Unfiltered upstream
    Path(String),
    /// Upstream with optional fingerprint restriction
    Detailed(DetailedUpstream),
}

/// Table form of an upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailedUpstream {
    /// Path to the upstream agent socket
    pub path: String,

    /// Only expose identities whose fingerprint contains one of these
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprints: Option<Vec<String>>,
}

impl UpstreamConfig {
    /// The configured socket path, before expansion
    pub fn path(&self) -> &str {
        match self {
            UpstreamConfig::Path(path) => path,
            UpstreamConfig::Detailed(detailed) => &detailed.path,
        }
    }

    fn expand(&self) -> Result<UpstreamSpec> {
        let spec = UpstreamSpec::new(expand_path(self.path())?);
        match self {
            UpstreamConfig::Detailed(DetailedUpstream {
                fingerprints: Some(patterns),
                ..
            }) => Ok(spec.with_fingerprints(FingerprintSet::new(patterns.iter().cloned())?)),
            _ => Ok(spec),
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Expand every path and validate the socket definitions
    ///
    /// Fails when no socket is defined, when a socket has no upstream, when
    /// a fingerprint list or pattern is empty, or when two sockets share a
    /// listen path.
    pub fn expand(&self) -> Result<ExpandedConfig> {
        if self.sockets.is_empty() {
            return Err(Error::Config("No sockets configured".to_string()));
        }

        let log_path = self.log_path.as_deref().map(expand_path).transpose()?;

        let mut seen = HashSet::new();
        let mut sockets = Vec::with_capacity(self.sockets.len());
        for (name, socket) in &self.sockets {
            let path = expand_path(&socket.path)?;
            if !seen.insert(path.clone()) {
                return Err(Error::Config(format!(
                    "Socket '{}': listen path {} is used by another socket",
                    name,
                    path.display()
                )));
            }
            if socket.upstreams.is_empty() {
                return Err(Error::Config(format!(
                    "Socket '{}': at least one upstream is required",
                    name
                )));
            }

            let upstreams = socket
                .upstreams
                .iter()
                .map(UpstreamConfig::expand)
                .collect::<Result<Vec<_>>>()
                .map_err(|e| Error::Config(format!("Socket '{}': {}", name, e)))?;

            sockets.push(ExpandedSocketConfig {
                name: name.clone(),
                path,
                upstreams,
            });
        }

        Ok(ExpandedConfig { log_path, sockets })
    }
}

/// Configuration with all paths expanded and validated
#[derive(Debug, Clone)]
pub struct ExpandedConfig {
    /// Resolved path to the JSONL event log
    pub log_path: Option<PathBuf>,

    /// Socket definitions, ordered by name
    pub sockets: Vec<ExpandedSocketConfig>,
}

/// Socket configuration with expanded paths
#[derive(Debug, Clone)]
pub struct ExpandedSocketConfig {
    /// Name of the socket in the configuration
    pub name: String,

    /// Resolved listen path
    pub path: PathBuf,

    /// Upstreams ready to be dialed
    pub upstreams: Vec<UpstreamSpec>,
}
