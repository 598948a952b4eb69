//! Fingerprint-restricted view of a single agent

use crate::agent::{Agent, Signer};
use crate::error::{Error, Result};
use crate::filter::FingerprintSet;
use crate::protocol::{AddedKey, Identity, Signature};
use async_trait::async_trait;
use tracing::debug;

/// Agent that only exposes identities matching a fingerprint set
///
/// `list` and `signers` expose at most one identity: the first one, in
/// upstream order, matching any pattern. `sign` is refused for
/// non-matching keys without contacting the upstream. Key management
/// operations pass through unfiltered.
pub struct FingerprintFilter<A> {
    upstream: A,
    fingerprints: FingerprintSet,
}

impl<A: Agent> FingerprintFilter<A> {
    /// Create a filter over `upstream`
    pub fn new(upstream: A, fingerprints: FingerprintSet) -> Self {
        Self {
            upstream,
            fingerprints,
        }
    }
}

#[async_trait]
impl<A: Agent> Agent for FingerprintFilter<A> {
    async fn list(&self) -> Result<Vec<Identity>> {
        let identities = self.upstream.list().await?;
        let total = identities.len();

        let selected: Vec<Identity> = identities
            .into_iter()
            .find(|id| self.fingerprints.matches(id))
            .into_iter()
            .collect();

        debug!(
            upstream = total,
            exposed = selected.len(),
            "Filtered identities"
        );
        Ok(selected)
    }

    async fn sign(&self, identity: &Identity, data: &[u8], flags: u32) -> Result<Signature> {
        match self.fingerprints.matching_pattern(identity) {
            Some(pattern) => {
                debug!(
                    fingerprint = %identity.sha256_fingerprint(),
                    pattern = pattern,
                    "Sign request allowed"
                );
                self.upstream.sign(identity, data, flags).await
            }
            None => {
                debug!(
                    fingerprint = %identity.sha256_fingerprint(),
                    "Sign request denied: no matching fingerprint"
                );
                Err(Error::NoMatchingKey)
            }
        }
    }

    async fn add(&self, key: AddedKey) -> Result<()> {
        self.upstream.add(key).await
    }

    async fn remove(&self, identity: &Identity) -> Result<()> {
        self.upstream.remove(identity).await
    }

    async fn remove_all(&self) -> Result<()> {
        self.upstream.remove_all().await
    }

    async fn lock(&self, passphrase: &[u8]) -> Result<()> {
        self.upstream.lock(passphrase).await
    }

    async fn unlock(&self, passphrase: &[u8]) -> Result<()> {
        self.upstream.unlock(passphrase).await
    }

    async fn signers(&self) -> Result<Vec<Signer>> {
        self.upstream
            .signers()
            .await?
            .into_iter()
            .find(|signer| self.fingerprints.matches(signer.identity()))
            .map(|signer| vec![signer])
            .ok_or(Error::NoMatchingKey)
    }
}
