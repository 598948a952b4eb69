//! SSH agent proxy session
//!
//! This module speaks the agent protocol to downstream clients and carries
//! every request out against the composed agent of the socket.

use crate::agent::Agent;
use crate::error::{Error, Result};
use crate::logging::{Decision, JsonlWriter, LogEvent};
use crate::protocol::{AgentCodec, AgentMessage, Identity, MessageType};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::UnixStream;
use tracing::{debug, trace};

/// Serves one composed agent to any number of clients
pub struct Proxy {
    /// Agent every request is carried out against
    agent: Arc<dyn Agent>,
    /// Socket path for identification
    socket_path: String,
    /// Connection counter for client IDs
    connection_counter: AtomicU64,
    /// Optional structured event log
    event_log: Option<Arc<JsonlWriter>>,
}

impl Proxy {
    /// Create a new proxy serving `agent`
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self {
            agent,
            socket_path: String::new(),
            connection_counter: AtomicU64::new(0),
            event_log: None,
        }
    }

    /// Set the socket path for identification
    pub fn with_socket_path(mut self, path: impl Into<String>) -> Self {
        self.socket_path = path.into();
        self
    }

    /// Record lifecycle and request events to a JSONL log
    pub fn with_event_log(mut self, writer: Arc<JsonlWriter>) -> Self {
        self.event_log = Some(writer);
        self
    }

    /// The socket path this proxy serves
    pub fn socket_path(&self) -> &str {
        &self.socket_path
    }

    /// Write an event to the JSONL log, if one is configured
    pub fn log_event(&self, event: &LogEvent) {
        if let Some(writer) = &self.event_log {
            writer.log(event);
        }
    }

    /// Handle a client connection
    ///
    /// Requests are answered in order until the client closes the
    /// connection. Errors from the agent become SSH_AGENT_FAILURE replies;
    /// only a broken frame or a failed write ends the session early.
    pub async fn handle_client(&self, mut client_stream: UnixStream) -> Result<()> {
        let client_id = self.connection_counter.fetch_add(1, Ordering::Relaxed);
        debug!(
            socket = %self.socket_path,
            client_id = client_id,
            "Client connected"
        );
        self.log_event(&LogEvent::client_connect(&self.socket_path, client_id));

        let result = self.handle_client_inner(client_id, &mut client_stream).await;

        debug!(
            socket = %self.socket_path,
            client_id = client_id,
            "Client disconnected"
        );
        self.log_event(&LogEvent::client_disconnect(&self.socket_path, client_id));

        result
    }

    async fn handle_client_inner(
        &self,
        client_id: u64,
        client_stream: &mut UnixStream,
    ) -> Result<()> {
        let (mut client_reader, mut client_writer) = client_stream.split();

        loop {
            let request = match AgentCodec::read(&mut client_reader).await? {
                Some(msg) => msg,
                None => {
                    trace!(client_id = client_id, "Client closed connection");
                    break;
                }
            };

            trace!(msg_type = ?request.msg_type, "Received request from client");

            let response = self.process_request(client_id, &request).await;

            AgentCodec::write(&mut client_writer, &response).await?;
        }

        Ok(())
    }

    /// Answer a single request
    async fn process_request(&self, client_id: u64, request: &AgentMessage) -> AgentMessage {
        let event = LogEvent::request(
            &self.socket_path,
            client_id,
            operation_name(request.msg_type),
        );

        let (event, result) = self.dispatch(request, event).await;
        match result {
            Ok(response) => {
                self.log_event(&event.with_decision(Decision::Allowed));
                response
            }
            Err(e) => {
                debug!(
                    socket = %self.socket_path,
                    client_id = client_id,
                    msg_type = request.msg_type.as_str(),
                    error = %e,
                    "Request refused"
                );
                self.log_event(
                    &event
                        .with_decision(Decision::Denied)
                        .with_error(e.to_string()),
                );
                AgentMessage::failure()
            }
        }
    }

    /// Carry out `request`, returning `event` enriched with what was learned
    async fn dispatch(
        &self,
        request: &AgentMessage,
        event: LogEvent,
    ) -> (LogEvent, Result<AgentMessage>) {
        match request.msg_type {
            MessageType::RequestIdentities => match self.agent.list().await {
                Ok(identities) => (
                    event.with_key_count(identities.len()),
                    Ok(AgentMessage::build_identities_answer(&identities)),
                ),
                Err(e) => (event, Err(e)),
            },
            MessageType::SignRequest => {
                let sign = match request.parse_sign_request() {
                    Ok(sign) => sign,
                    Err(e) => return (event, Err(e)),
                };
                let identity = Identity::from_key_blob(sign.key_blob);
                let event = event.with_fingerprint(identity.sha256_fingerprint());
                let result = self
                    .agent
                    .sign(&identity, &sign.data, sign.flags)
                    .await
                    .map(|signature| AgentMessage::sign_response(&signature));
                (event, result)
            }
            MessageType::RemoveIdentity => {
                let key_blob = match request.parse_remove_identity() {
                    Ok(key_blob) => key_blob,
                    Err(e) => return (event, Err(e)),
                };
                let identity = Identity::from_key_blob(key_blob);
                let event = event.with_fingerprint(identity.sha256_fingerprint());
                let result = self
                    .agent
                    .remove(&identity)
                    .await
                    .map(|()| AgentMessage::success());
                (event, result)
            }
            _ => (event, self.key_management(request).await),
        }
    }

    /// Requests answered with SSH_AGENT_SUCCESS and nothing to log
    async fn key_management(&self, request: &AgentMessage) -> Result<AgentMessage> {
        match request.msg_type {
            MessageType::AddIdentity | MessageType::AddIdConstrained => {
                self.agent.add(request.parse_added_key()?).await?;
            }
            MessageType::RemoveAllIdentities => self.agent.remove_all().await?,
            MessageType::Lock => self.agent.lock(&request.parse_passphrase()?).await?,
            MessageType::Unlock => self.agent.unlock(&request.parse_passphrase()?).await?,
            other => return Err(Error::Unsupported(other.as_str())),
        }
        Ok(AgentMessage::success())
    }
}

/// Short operation name used in the event log
fn operation_name(msg_type: MessageType) -> &'static str {
    match msg_type {
        MessageType::RequestIdentities => "list",
        MessageType::SignRequest => "sign",
        MessageType::AddIdentity | MessageType::AddIdConstrained => "add",
        MessageType::RemoveIdentity => "remove",
        MessageType::RemoveAllIdentities => "remove_all",
        MessageType::Lock => "lock",
        MessageType::Unlock => "unlock",
        other => other.as_str(),
    }
}
