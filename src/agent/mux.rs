//! Several agents presented as one

use crate::agent::{Agent, Signer, Upstream};
use crate::error::{Error, Result};
use crate::protocol::{AddedKey, Identity, Signature};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info};

/// One upstream of a multiplexer, labelled for logging
struct Member {
    label: String,
    agent: Box<dyn Agent>,
}

/// Agent combining an ordered, non-empty list of agents
///
/// Reads (`list`, `signers`) are concatenated in upstream order and fail as
/// soon as one upstream fails. `sign` returns the first upstream success.
/// Key management goes to the first upstream only, and locking is not
/// supported at all.
pub struct Multiplexer {
    members: Vec<Member>,
}

impl Multiplexer {
    /// Combine already connected agents, in precedence order
    pub fn new(upstreams: Vec<(String, Box<dyn Agent>)>) -> Result<Self> {
        if upstreams.is_empty() {
            return Err(Error::Config(
                "Multiplexer requires at least one upstream agent".to_string(),
            ));
        }
        let members = upstreams
            .into_iter()
            .map(|(label, agent)| Member { label, agent })
            .collect();
        Ok(Self { members })
    }

    /// Dial every socket in order and combine the connections
    ///
    /// If any dial fails, connections opened so far are closed and the
    /// whole construction fails.
    pub async fn connect(sockets: &[PathBuf]) -> Result<Self> {
        let mut upstreams: Vec<(String, Box<dyn Agent>)> = Vec::with_capacity(sockets.len());
        for socket in sockets {
            match Upstream::new(socket).connect().await {
                Ok(conn) => upstreams.push((socket.display().to_string(), Box::new(conn))),
                Err(e) => {
                    debug!(
                        opened = upstreams.len(),
                        "Closing upstream connections after dial failure"
                    );
                    drop(upstreams);
                    return Err(e);
                }
            }
        }

        let mux = Self::new(upstreams)?;
        info!(upstreams = ?mux.labels(), "Multiplexer ready");
        Ok(mux)
    }

    /// Labels of the upstreams, in precedence order
    pub fn labels(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.label.as_str()).collect()
    }

    /// Number of upstreams
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether there are no upstreams; never true once constructed
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn primary(&self) -> &Member {
        &self.members[0]
    }
}

#[async_trait]
impl Agent for Multiplexer {
    async fn list(&self) -> Result<Vec<Identity>> {
        let mut identities = Vec::new();
        for member in &self.members {
            let listed = member.agent.list().await.inspect_err(|e| {
                debug!(upstream = %member.label, error = %e, "List failed");
            })?;
            identities.extend(listed);
        }
        debug!(count = identities.len(), "Listed identities");
        Ok(identities)
    }

    async fn sign(&self, identity: &Identity, data: &[u8], flags: u32) -> Result<Signature> {
        let fingerprint = identity.sha256_fingerprint();
        for member in &self.members {
            match member.agent.sign(identity, data, flags).await {
                Ok(signature) => {
                    debug!(
                        upstream = %member.label,
                        fingerprint = %fingerprint,
                        md5 = %identity.md5_fingerprint(),
                        "Signed"
                    );
                    return Ok(signature);
                }
                Err(e) => {
                    debug!(
                        upstream = %member.label,
                        fingerprint = %fingerprint,
                        error = %e,
                        "Upstream could not sign, trying next"
                    );
                }
            }
        }
        debug!(fingerprint = %fingerprint, "No upstream could sign");
        Err(Error::NoMatchingKey)
    }

    async fn add(&self, key: AddedKey) -> Result<()> {
        let primary = self.primary();
        debug!(
            upstream = %primary.label,
            key_type = ?key.key_type(),
            constrained = key.constrained,
            "Adding key"
        );
        primary.agent.add(key).await
    }

    async fn remove(&self, identity: &Identity) -> Result<()> {
        let primary = self.primary();
        debug!(
            upstream = %primary.label,
            fingerprint = %identity.sha256_fingerprint(),
            "Removing key"
        );
        primary.agent.remove(identity).await
    }

    async fn remove_all(&self) -> Result<()> {
        let primary = self.primary();
        debug!(upstream = %primary.label, "Removing all keys");
        primary.agent.remove_all().await
    }

    async fn lock(&self, _passphrase: &[u8]) -> Result<()> {
        Err(Error::Unsupported("lock"))
    }

    async fn unlock(&self, _passphrase: &[u8]) -> Result<()> {
        Err(Error::Unsupported("unlock"))
    }

    async fn signers(&self) -> Result<Vec<Signer>> {
        let mut signers = Vec::new();
        for member in &self.members {
            let found = member.agent.signers().await.inspect_err(|e| {
                debug!(upstream = %member.label, error = %e, "Signers failed");
            })?;
            signers.extend(found);
        }
        Ok(signers)
    }
}
