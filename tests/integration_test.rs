//! Integration tests for fingerprint filtering and agent composition

use async_trait::async_trait;
use authsock_mux::agent::{Agent, FingerprintFilter, Multiplexer, Signer};
use authsock_mux::filter::FingerprintSet;
use authsock_mux::protocol::{AddedKey, Identity, Signature};
use authsock_mux::{Error, Result};
use bytes::Bytes;
use ssh_key::{HashAlg, PublicKey};
use std::sync::{Arc, Mutex};

// Pre-generated test keys
const ED25519_KEY_1: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIOMqqnkVzrm0SdG6UOoqKLsabgH5C9okWi0dh2l9GKJl user@work.example.com";
const ED25519_KEY_2: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIHUu2eEV0kRvK3dMRlSFwHxVoNxCfwjKmAZBlhkNjC4i user@personal.example.com";
const ED25519_KEY_3: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIKwfZn/9xXqbDtEzpAEZEoEBllBkLR+NpVHhMxCmyC9L dev@work.example.com";

fn make_identity_from_str(key_str: &str) -> Identity {
    let public_key: PublicKey = key_str.parse().unwrap();
    let key_blob = Bytes::from(public_key.to_bytes().unwrap());
    let comment = key_str.split_whitespace().nth(2).unwrap_or("").to_string();
    Identity::new(key_blob, comment)
}

/// A short pattern that only the given key's SHA256 fingerprint contains
fn sha256_pattern(identity: &Identity) -> String {
    identity.sha256_fingerprint()[7..15].to_string()
}

/// Agent holding fixed identities that signs with any of them
#[derive(Clone)]
struct StaticAgent {
    identities: Vec<Identity>,
    signed: Arc<Mutex<Vec<String>>>,
}

impl StaticAgent {
    fn new(keys: &[&str]) -> Self {
        Self {
            identities: keys.iter().map(|k| make_identity_from_str(k)).collect(),
            signed: Arc::default(),
        }
    }

    fn signed(&self) -> Vec<String> {
        self.signed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Agent for StaticAgent {
    async fn list(&self) -> Result<Vec<Identity>> {
        Ok(self.identities.clone())
    }

    async fn sign(&self, identity: &Identity, _data: &[u8], _flags: u32) -> Result<Signature> {
        let known = self
            .identities
            .iter()
            .find(|i| i.key_blob == identity.key_blob)
            .ok_or(Error::AgentFailure("sign"))?;
        self.signed.lock().unwrap().push(known.comment.clone());
        Ok(Signature::from_blob(known.comment.clone().into_bytes()))
    }

    async fn add(&self, _key: AddedKey) -> Result<()> {
        Ok(())
    }

    async fn remove(&self, _identity: &Identity) -> Result<()> {
        Ok(())
    }

    async fn remove_all(&self) -> Result<()> {
        Ok(())
    }

    async fn lock(&self, _passphrase: &[u8]) -> Result<()> {
        Ok(())
    }

    async fn unlock(&self, _passphrase: &[u8]) -> Result<()> {
        Ok(())
    }

    async fn signers(&self) -> Result<Vec<Signer>> {
        let backend: Arc<dyn Agent> = Arc::new(self.clone());
        Ok(self
            .identities
            .iter()
            .map(|id| Signer::new(id.clone(), Arc::clone(&backend)))
            .collect())
    }
}

#[test]
fn test_sha256_fingerprint_matches_ssh_key() {
    for key in [ED25519_KEY_1, ED25519_KEY_2, ED25519_KEY_3] {
        let public_key: PublicKey = key.parse().unwrap();
        let identity = make_identity_from_str(key);
        assert_eq!(
            identity.sha256_fingerprint(),
            public_key.fingerprint(HashAlg::Sha256).to_string()
        );
    }
}

#[test]
fn test_md5_fingerprint_format() {
    let identity = make_identity_from_str(ED25519_KEY_1);
    let md5 = identity.md5_fingerprint();
    assert_eq!(md5.len(), 47);
    assert_eq!(md5.split(':').count(), 16);
    assert!(md5.split(':').all(|pair| {
        pair.len() == 2
            && pair
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
    }));
}

#[test]
fn test_fingerprint_set_matches_either_form() {
    let key1 = make_identity_from_str(ED25519_KEY_1);
    let key2 = make_identity_from_str(ED25519_KEY_2);

    let by_sha256 = FingerprintSet::new([key1.sha256_fingerprint()]).unwrap();
    assert!(by_sha256.matches(&key1));
    assert!(!by_sha256.matches(&key2));

    let by_md5 = FingerprintSet::new([key2.md5_fingerprint()[..11].to_string()]).unwrap();
    assert!(by_md5.matches(&key2));
    assert!(!by_md5.matches(&key1));

    // the SHA256 prefix alone matches every key
    let prefix = FingerprintSet::parse("SHA256:").unwrap();
    assert!(prefix.matches(&key1) && prefix.matches(&key2));
}

#[test]
fn test_key_type_from_blob() {
    let identity = make_identity_from_str(ED25519_KEY_3);
    assert_eq!(identity.key_type().as_deref(), Some("ssh-ed25519"));
    assert!(identity.to_openssh().unwrap().starts_with("ssh-ed25519 AAAA"));
}

#[tokio::test]
async fn test_filter_two_key_scenario() {
    let upstream = StaticAgent::new(&[ED25519_KEY_1, ED25519_KEY_2]);
    let key1 = make_identity_from_str(ED25519_KEY_1);
    let key2 = make_identity_from_str(ED25519_KEY_2);

    let filter = FingerprintFilter::new(
        upstream.clone(),
        FingerprintSet::new([sha256_pattern(&key1)]).unwrap(),
    );

    assert_eq!(filter.list().await.unwrap(), vec![key1.clone()]);
    assert!(filter.sign(&key1, b"challenge", 0).await.is_ok());
    assert!(matches!(
        filter.sign(&key2, b"challenge", 0).await,
        Err(Error::NoMatchingKey)
    ));
    assert_eq!(upstream.signed(), vec!["user@work.example.com"]);
}

#[tokio::test]
async fn test_filter_signers_first_match() {
    let upstream = StaticAgent::new(&[ED25519_KEY_1, ED25519_KEY_2, ED25519_KEY_3]);
    let key2 = make_identity_from_str(ED25519_KEY_2);
    let key3 = make_identity_from_str(ED25519_KEY_3);

    let filter = FingerprintFilter::new(
        upstream,
        FingerprintSet::new([sha256_pattern(&key3), sha256_pattern(&key2)]).unwrap(),
    );
    let signers = filter.signers().await.unwrap();
    assert_eq!(signers.len(), 1);
    assert_eq!(signers[0].identity(), &key2);
}

#[tokio::test]
async fn test_mux_over_filters() {
    let work = StaticAgent::new(&[ED25519_KEY_1, ED25519_KEY_2]);
    let dev = StaticAgent::new(&[ED25519_KEY_3]);
    let key1 = make_identity_from_str(ED25519_KEY_1);
    let key3 = make_identity_from_str(ED25519_KEY_3);

    let mux = Multiplexer::new(vec![
        (
            "work".to_string(),
            Box::new(FingerprintFilter::new(
                work.clone(),
                FingerprintSet::new([sha256_pattern(&key1)]).unwrap(),
            )) as Box<dyn Agent>,
        ),
        ("dev".to_string(), Box::new(dev.clone()) as Box<dyn Agent>),
    ])
    .unwrap();

    assert_eq!(mux.list().await.unwrap(), vec![key1.clone(), key3.clone()]);

    // only the second upstream can sign for key3
    mux.sign(&key3, b"challenge", 0).await.unwrap();
    assert!(work.signed().is_empty());
    assert_eq!(dev.signed(), vec!["dev@work.example.com"]);

    let signers = mux.signers().await.unwrap();
    assert_eq!(signers.len(), 2);
    assert!(matches!(mux.lock(b"pw").await, Err(Error::Unsupported(_))));
}
