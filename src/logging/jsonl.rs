//! JSONL (JSON Lines) event log
//!
//! One JSON object per line for every served socket lifecycle event and
//! every agent request handled by the proxy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

/// Log event kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogEventKind {
    /// Socket started accepting clients
    ServerStart,
    /// Socket stopped
    ServerStop,
    /// Client connected
    ClientConnect,
    /// Client disconnected
    ClientDisconnect,
    /// Agent request handled
    Request,
}

impl std::fmt::Display for LogEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogEventKind::ServerStart => write!(f, "server_start"),
            LogEventKind::ServerStop => write!(f, "server_stop"),
            LogEventKind::ClientConnect => write!(f, "client_connect"),
            LogEventKind::ClientDisconnect => write!(f, "client_disconnect"),
            LogEventKind::Request => write!(f, "request"),
        }
    }
}

/// Outcome of an agent request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The composed agent carried out the request
    Allowed,
    /// The request was answered with SSH_AGENT_FAILURE
    Denied,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Allowed => write!(f, "allowed"),
            Decision::Denied => write!(f, "denied"),
        }
    }
}

/// A structured log event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    /// Timestamp of the event
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Kind of event
    pub kind: LogEventKind,

    /// Socket the event happened on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket_name: Option<String>,

    /// Per-socket client sequence number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<u64>,

    /// Agent operation (list, sign, add, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,

    /// SHA256 fingerprint of the key involved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    /// Outcome of the request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,

    /// Number of identities returned by a list request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_count: Option<u32>,

    /// Error message for denied requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LogEvent {
    /// Create a new log event with the current timestamp
    pub fn new(kind: LogEventKind) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            socket_name: None,
            client_id: None,
            operation: None,
            fingerprint: None,
            decision: None,
            key_count: None,
            error: None,
        }
    }

    /// Set the socket name
    pub fn with_socket_name(mut self, name: impl Into<String>) -> Self {
        self.socket_name = Some(name.into());
        self
    }

    /// Set the client ID
    pub fn with_client_id(mut self, id: u64) -> Self {
        self.client_id = Some(id);
        self
    }

    /// Set the fingerprint
    pub fn with_fingerprint(mut self, fp: impl Into<String>) -> Self {
        self.fingerprint = Some(fp.into());
        self
    }

    /// Set the decision
    pub fn with_decision(mut self, decision: Decision) -> Self {
        self.decision = Some(decision);
        self
    }

    /// Set the key count
    pub fn with_key_count(mut self, count: usize) -> Self {
        self.key_count = Some(u32::try_from(count).unwrap_or(u32::MAX));
        self
    }

    /// Set the error message
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Create a server start event
    pub fn server_start(socket_path: impl Into<String>) -> Self {
        Self::new(LogEventKind::ServerStart).with_socket_name(socket_path)
    }

    /// Create a server stop event
    pub fn server_stop(socket_path: impl Into<String>) -> Self {
        Self::new(LogEventKind::ServerStop).with_socket_name(socket_path)
    }

    /// Create a client connect event
    pub fn client_connect(socket_path: impl Into<String>, client_id: u64) -> Self {
        Self::new(LogEventKind::ClientConnect)
            .with_socket_name(socket_path)
            .with_client_id(client_id)
    }

    /// Create a client disconnect event
    pub fn client_disconnect(socket_path: impl Into<String>, client_id: u64) -> Self {
        Self::new(LogEventKind::ClientDisconnect)
            .with_socket_name(socket_path)
            .with_client_id(client_id)
    }

    /// Create a request event
    pub fn request(
        socket_path: impl Into<String>,
        client_id: u64,
        operation: impl Into<String>,
    ) -> Self {
        let mut event = Self::new(LogEventKind::Request)
            .with_socket_name(socket_path)
            .with_client_id(client_id);
        event.operation = Some(operation.into());
        event
    }

    /// Serialize the event to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// JSONL file writer with thread-safe buffered output
pub struct JsonlWriter {
    writer: Mutex<BufWriter<File>>,
}

impl JsonlWriter {
    /// Create a new JSONL writer
    ///
    /// Opens the file for appending. Creates the file and its parent
    /// directory if they don't exist.
    pub fn new<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Write a log event to the file
    pub fn write(&self, event: &LogEvent) -> std::io::Result<()> {
        let json = event.to_json().map_err(std::io::Error::other)?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| std::io::Error::other("Lock poisoned"))?;

        writeln!(writer, "{}", json)?;
        writer.flush()
    }

    /// Write an event, reporting failures through tracing only
    pub fn log(&self, event: &LogEvent) {
        if let Err(e) = self.write(event) {
            tracing::warn!(error = %e, kind = %event.kind, "Failed to write JSONL log event");
        }
    }

    /// Flush any buffered data to the file
    pub fn flush(&self) -> std::io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| std::io::Error::other("Lock poisoned"))?;

        writer.flush()
    }
}

impl Drop for JsonlWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader};
    use tempfile::tempdir;

    #[test]
    fn test_log_event_builder() {
        let event = LogEvent::request("/tmp/test.sock", 3, "sign")
            .with_fingerprint("SHA256:abc123")
            .with_decision(Decision::Denied)
            .with_error("No matching key");

        assert_eq!(event.kind, LogEventKind::Request);
        assert_eq!(event.socket_name.as_deref(), Some("/tmp/test.sock"));
        assert_eq!(event.client_id, Some(3));
        assert_eq!(event.operation.as_deref(), Some("sign"));
        assert_eq!(event.decision, Some(Decision::Denied));
    }

    #[test]
    fn test_log_event_serialize_skips_empty_fields() {
        let json = LogEvent::server_start("/tmp/test.sock").to_json().unwrap();

        assert!(json.contains("\"kind\":\"server_start\""));
        assert!(json.contains("\"socket_name\":\"/tmp/test.sock\""));
        assert!(json.contains("\"timestamp\":"));
        assert!(!json.contains("fingerprint"));
    }

    #[test]
    fn test_log_event_deserialize() {
        let event = LogEvent::request("/tmp/test.sock", 1, "list")
            .with_decision(Decision::Allowed)
            .with_key_count(2);

        let parsed: LogEvent = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(parsed.kind, LogEventKind::Request);
        assert_eq!(parsed.key_count, Some(2));
        assert_eq!(parsed.decision, Some(Decision::Allowed));
    }

    #[test]
    fn test_jsonl_writer_creates_parent_and_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state").join("events.jsonl");

        {
            let writer = JsonlWriter::new(&path).unwrap();
            writer.log(&LogEvent::server_start("/tmp/test.sock"));
            writer.log(&LogEvent::client_connect("/tmp/test.sock", 0));
        }
        {
            let writer = JsonlWriter::new(&path).unwrap();
            writer.log(&LogEvent::server_stop("/tmp/test.sock"));
        }

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = BufReader::new(file).lines().map(|l| l.unwrap()).collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("\"kind\":\"server_start\""));
        assert!(lines[1].contains("\"kind\":\"client_connect\""));
        assert!(lines[2].contains("\"kind\":\"server_stop\""));
    }

    #[test]
    fn test_display() {
        assert_eq!(LogEventKind::ClientDisconnect.to_string(), "client_disconnect");
        assert_eq!(Decision::Denied.to_string(), "denied");
    }
}
