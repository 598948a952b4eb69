//! Upstream SSH agent connection
//!
//! This module handles connections to upstream SSH agents, typically the
//! one named by the SSH_AUTH_SOCK environment variable. An
//! [`UpstreamConnection`] is a live connection that implements [`Agent`]
//! by speaking the agent protocol over its socket.

use crate::agent::{Agent, Signer};
use crate::error::{Error, Result};
use crate::protocol::{
    AddedKey, AgentCodec, AgentMessage, Identity, MessageType, SignRequest, Signature,
};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UnixStream;
use tokio::sync::Mutex;
use tracing::{debug, trace};

/// Default connection timeout for upstream agent
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Location of an upstream SSH agent
#[derive(Debug, Clone)]
pub struct Upstream {
    /// Path to the upstream agent socket
    socket_path: PathBuf,
}

impl Upstream {
    /// Create a new upstream location
    ///
    /// # Arguments
    /// * `socket_path` - Path to the upstream agent socket
    pub fn new<P: AsRef<Path>>(socket_path: P) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
        }
    }

    /// Connect to the upstream agent with timeout
    pub async fn connect(&self) -> Result<UpstreamConnection> {
        let stream = tokio::time::timeout(
            DEFAULT_CONNECT_TIMEOUT,
            UnixStream::connect(&self.socket_path),
        )
        .await
        .map_err(|_| {
            Error::UpstreamNotAvailable(format!(
                "Connection to upstream agent at {} timed out after {:?}",
                self.socket_path.display(),
                DEFAULT_CONNECT_TIMEOUT
            ))
        })?
        .map_err(|e| {
            Error::UpstreamNotAvailable(format!(
                "Failed to connect to upstream agent at {}: {}",
                self.socket_path.display(),
                e
            ))
        })?;

        debug!(socket_path = %self.socket_path.display(), "Connected to upstream agent");
        Ok(UpstreamConnection::new(self.socket_path.clone(), stream))
    }
}

struct ConnectionInner {
    socket_path: PathBuf,
    /// Requests and replies on one stream must not interleave
    stream: Mutex<UnixStream>,
}

/// An active connection to an upstream agent
///
/// Clones share the same underlying socket; the connection is closed when the
/// last clone is dropped.
#[derive(Clone)]
pub struct UpstreamConnection {
    inner: Arc<ConnectionInner>,
}

impl UpstreamConnection {
    fn new(socket_path: PathBuf, stream: UnixStream) -> Self {
        Self {
            inner: Arc::new(ConnectionInner {
                socket_path,
                stream: Mutex::new(stream),
            }),
        }
    }

    /// Send a message to the upstream agent and receive the response
    pub async fn send_receive(&self, msg: &AgentMessage) -> Result<AgentMessage> {
        trace!(msg_type = ?msg.msg_type, "Sending message to upstream");

        let response = {
            let mut stream = self.inner.stream.lock().await;
            AgentCodec::exchange(&mut *stream, msg).await
        }
        .map_err(|e| {
            Error::Upstream(format!("{}: {}", self.inner.socket_path.display(), e))
        })?;

        trace!(response_type = ?response.msg_type, "Received response from upstream");
        Ok(response)
    }

    /// Send a request whose only expected reply is SSH_AGENT_SUCCESS
    async fn request_success(&self, msg: AgentMessage, op: &'static str) -> Result<()> {
        let response = self.send_receive(&msg).await?;
        match response.msg_type {
            MessageType::Success => Ok(()),
            other => Err(unexpected_reply(other, op)),
        }
    }
}

fn unexpected_reply(msg_type: MessageType, op: &'static str) -> Error {
    match msg_type {
        MessageType::Failure => Error::AgentFailure(op),
        other => Error::Protocol(format!(
            "Unexpected {} reply to {} request",
            other.as_str(),
            op
        )),
    }
}

impl std::fmt::Debug for UpstreamConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConnection")
            .field("socket_path", &self.inner.socket_path)
            .finish()
    }
}

#[async_trait]
impl Agent for UpstreamConnection {
    async fn list(&self) -> Result<Vec<Identity>> {
        let response = self.send_receive(&AgentMessage::request_identities()).await?;
        match response.msg_type {
            MessageType::IdentitiesAnswer => response.parse_identities(),
            other => Err(unexpected_reply(other, "list")),
        }
    }

    async fn sign(&self, identity: &Identity, data: &[u8], flags: u32) -> Result<Signature> {
        let request = SignRequest {
            key_blob: identity.key_blob.clone(),
            data: Bytes::copy_from_slice(data),
            flags,
        };
        let response = self.send_receive(&AgentMessage::sign_request(&request)).await?;
        match response.msg_type {
            MessageType::SignResponse => response.parse_sign_response(),
            other => Err(unexpected_reply(other, "sign")),
        }
    }

    async fn add(&self, key: AddedKey) -> Result<()> {
        self.request_success(AgentMessage::add_identity(&key), "add")
            .await
    }

    async fn remove(&self, identity: &Identity) -> Result<()> {
        self.request_success(AgentMessage::remove_identity(&identity.key_blob), "remove")
            .await
    }

    async fn remove_all(&self) -> Result<()> {
        self.request_success(AgentMessage::remove_all_identities(), "remove_all")
            .await
    }

    async fn lock(&self, passphrase: &[u8]) -> Result<()> {
        self.request_success(AgentMessage::lock(passphrase), "lock")
            .await
    }

    async fn unlock(&self, passphrase: &[u8]) -> Result<()> {
        self.request_success(AgentMessage::unlock(passphrase), "unlock")
            .await
    }

    async fn signers(&self) -> Result<Vec<Signer>> {
        let backend: Arc<dyn Agent> = Arc::new(self.clone());
        Ok(self
            .list()
            .await?
            .into_iter()
            .map(|identity| Signer::new(identity, Arc::clone(&backend)))
            .collect())
    }
}
