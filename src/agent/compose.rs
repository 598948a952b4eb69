//! Building the agent served on a socket from its upstream definitions

use crate::agent::{Agent, FingerprintFilter, Multiplexer, Upstream};
use crate::error::{Error, Result};
use crate::filter::FingerprintSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// One upstream agent of a served socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamSpec {
    /// Path to the upstream agent socket
    pub path: PathBuf,
    /// Restrict this upstream to matching identities
    pub fingerprints: Option<FingerprintSet>,
}

impl UpstreamSpec {
    /// An unfiltered upstream
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fingerprints: None,
        }
    }

    /// Restrict the upstream to identities matching `fingerprints`
    pub fn with_fingerprints(mut self, fingerprints: FingerprintSet) -> Self {
        self.fingerprints = Some(fingerprints);
        self
    }

    async fn dial(&self) -> Result<Box<dyn Agent>> {
        let conn = Upstream::new(&self.path).connect().await?;
        Ok(match &self.fingerprints {
            Some(fingerprints) => {
                debug!(
                    upstream = %self.path.display(),
                    patterns = ?fingerprints.patterns(),
                    "Filtering upstream by fingerprint"
                );
                Box::new(FingerprintFilter::new(conn, fingerprints.clone()))
            }
            None => Box::new(conn),
        })
    }
}

/// Dial the upstreams and compose the agent to serve
///
/// A single upstream is served directly (through a filter when it has
/// fingerprints). Several upstreams are combined by a [`Multiplexer`] in the
/// given order. Connections already opened are closed if a later dial fails.
pub async fn build_agent(specs: &[UpstreamSpec]) -> Result<Arc<dyn Agent>> {
    match specs {
        [] => Err(Error::Config(
            "At least one upstream agent is required".to_string(),
        )),
        [single] => Ok(Arc::from(single.dial().await?)),
        many => {
            let mut members = Vec::with_capacity(many.len());
            for spec in many {
                members.push((spec.path.display().to_string(), spec.dial().await?));
            }
            Ok(Arc::new(Multiplexer::new(members)?))
        }
    }
}
