//! SSH Agent proxy module
//!
//! This module provides the agent capability contract and its implementations:
//! - `Agent`: the operation set every agent-like component implements
//! - `UpstreamConnection`: a live connection to an upstream SSH agent
//! - `FingerprintFilter`: narrows an agent to identities matching fingerprints
//! - `Multiplexer`: combines several agents into one
//! - `Server` / `Proxy`: serve a composed agent to downstream clients

mod compose;
mod filter;
mod mux;
mod proxy;
mod server;
mod upstream;

pub use compose::{UpstreamSpec, build_agent};
pub use filter::FingerprintFilter;
pub use mux::Multiplexer;
pub use proxy::Proxy;
pub use server::Server;
pub use upstream::{Upstream, UpstreamConnection};

use crate::error::Result;
use crate::protocol::{AddedKey, Identity, Signature};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Operations offered by an SSH agent
///
/// Implementations must be safe to call concurrently: one composed agent is
/// shared by every downstream connection of a socket.
#[async_trait]
pub trait Agent: Send + Sync {
    /// List the identities the agent is willing to expose
    async fn list(&self) -> Result<Vec<Identity>>;

    /// Sign `data` with the key of `identity`
    async fn sign(&self, identity: &Identity, data: &[u8], flags: u32) -> Result<Signature>;

    /// Add a private key
    async fn add(&self, key: AddedKey) -> Result<()>;

    /// Remove the key of `identity`
    async fn remove(&self, identity: &Identity) -> Result<()>;

    /// Remove all keys
    async fn remove_all(&self) -> Result<()>;

    /// Lock the agent with a passphrase
    async fn lock(&self, passphrase: &[u8]) -> Result<()>;

    /// Undo a previous lock
    async fn unlock(&self, passphrase: &[u8]) -> Result<()>;

    /// Signing handles for the exposed identities
    async fn signers(&self) -> Result<Vec<Signer>>;
}

#[async_trait]
impl<A: Agent + ?Sized> Agent for Box<A> {
    async fn list(&self) -> Result<Vec<Identity>> {
        (**self).list().await
    }

    async fn sign(&self, identity: &Identity, data: &[u8], flags: u32) -> Result<Signature> {
        (**self).sign(identity, data, flags).await
    }

    async fn add(&self, key: AddedKey) -> Result<()> {
        (**self).add(key).await
    }

    async fn remove(&self, identity: &Identity) -> Result<()> {
        (**self).remove(identity).await
    }

    async fn remove_all(&self) -> Result<()> {
        (**self).remove_all().await
    }

    async fn lock(&self, passphrase: &[u8]) -> Result<()> {
        (**self).lock(passphrase).await
    }

    async fn unlock(&self, passphrase: &[u8]) -> Result<()> {
        (**self).unlock(passphrase).await
    }

    async fn signers(&self) -> Result<Vec<Signer>> {
        (**self).signers().await
    }
}

/// Handle that signs on behalf of a single identity
///
/// Signers are handed out by [`Agent::signers`] and sign through the agent
/// that produced them.
#[derive(Clone)]
pub struct Signer {
    identity: Identity,
    agent: Arc<dyn Agent>,
}

impl Signer {
    /// Create a signer for `identity` backed by `agent`
    pub fn new(identity: Identity, agent: Arc<dyn Agent>) -> Self {
        Self { identity, agent }
    }

    /// The identity this signer signs for
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Sign `data` with this signer's key
    pub async fn sign(&self, data: &[u8], flags: u32) -> Result<Signature> {
        self.agent.sign(&self.identity, data, flags).await
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("comment", &self.identity.comment)
            .field("fingerprint", &self.identity.sha256_fingerprint())
            .finish()
    }
}
