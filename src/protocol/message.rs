//! SSH Agent Protocol message types and parsing

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use md5::Md5;
use sha2::{Digest, Sha256};
use ssh_key::PublicKey;

/// Maximum number of identities allowed in a single message.
/// This prevents malicious agents from causing excessive memory allocation.
const MAX_IDENTITIES: u32 = 10000;

/// Maximum size for a single length-prefixed string (16 MB).
/// Prevents memory exhaustion from malicious length fields.
const MAX_BLOB_SIZE: u32 = 16 * 1024 * 1024;

/// SSH Agent message types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    // Requests from client
    RequestIdentities = 11,
    SignRequest = 13,
    AddIdentity = 17,
    RemoveIdentity = 18,
    RemoveAllIdentities = 19,
    AddIdConstrained = 25,
    AddSmartcardKey = 20,
    RemoveSmartcardKey = 21,
    Lock = 22,
    Unlock = 23,
    AddSmartcardKeyConstrained = 26,
    Extension = 27,

    // Responses from agent
    Failure = 5,
    Success = 6,
    IdentitiesAnswer = 12,
    SignResponse = 14,
    ExtensionFailure = 28,

    // Unknown message type
    Unknown = 0,
}

impl From<u8> for MessageType {
    fn from(value: u8) -> Self {
        match value {
            11 => MessageType::RequestIdentities,
            13 => MessageType::SignRequest,
            17 => MessageType::AddIdentity,
            18 => MessageType::RemoveIdentity,
            19 => MessageType::RemoveAllIdentities,
            25 => MessageType::AddIdConstrained,
            20 => MessageType::AddSmartcardKey,
            21 => MessageType::RemoveSmartcardKey,
            22 => MessageType::Lock,
            23 => MessageType::Unlock,
            26 => MessageType::AddSmartcardKeyConstrained,
            27 => MessageType::Extension,
            5 => MessageType::Failure,
            6 => MessageType::Success,
            12 => MessageType::IdentitiesAnswer,
            14 => MessageType::SignResponse,
            28 => MessageType::ExtensionFailure,
            _ => MessageType::Unknown,
        }
    }
}

impl From<MessageType> for u8 {
    fn from(value: MessageType) -> Self {
        value as u8
    }
}

impl MessageType {
    /// Get the message type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            // Client requests (SSH_AGENTC_*)
            MessageType::RequestIdentities => "SSH_AGENTC_REQUEST_IDENTITIES",
            MessageType::SignRequest => "SSH_AGENTC_SIGN_REQUEST",
            MessageType::AddIdentity => "SSH_AGENTC_ADD_IDENTITY",
            MessageType::RemoveIdentity => "SSH_AGENTC_REMOVE_IDENTITY",
            MessageType::RemoveAllIdentities => "SSH_AGENTC_REMOVE_ALL_IDENTITIES",
            MessageType::AddIdConstrained => "SSH_AGENTC_ADD_ID_CONSTRAINED",
            MessageType::AddSmartcardKey => "SSH_AGENTC_ADD_SMARTCARD_KEY",
            MessageType::RemoveSmartcardKey => "SSH_AGENTC_REMOVE_SMARTCARD_KEY",
            MessageType::Lock => "SSH_AGENTC_LOCK",
            MessageType::Unlock => "SSH_AGENTC_UNLOCK",
            MessageType::AddSmartcardKeyConstrained => "SSH_AGENTC_ADD_SMARTCARD_KEY_CONSTRAINED",
            MessageType::Extension => "SSH_AGENTC_EXTENSION",
            // Agent responses (SSH_AGENT_*)
            MessageType::Failure => "SSH_AGENT_FAILURE",
            MessageType::Success => "SSH_AGENT_SUCCESS",
            MessageType::IdentitiesAnswer => "SSH_AGENT_IDENTITIES_ANSWER",
            MessageType::SignResponse => "SSH_AGENT_SIGN_RESPONSE",
            MessageType::ExtensionFailure => "SSH_AGENT_EXTENSION_FAILURE",
            MessageType::Unknown => "UNKNOWN",
        }
    }
}

/// An SSH key identity from the agent
#[derive(Debug, Clone)]
pub struct Identity {
    /// Raw public key blob
    pub key_blob: Bytes,
    /// Comment associated with the key
    pub comment: String,
    /// Parsed public key (if parsing succeeded)
    pub public_key: Option<PublicKey>,
}

impl Identity {
    /// Parse an identity from key blob and comment
    pub fn new(key_blob: Bytes, comment: String) -> Self {
        let public_key = PublicKey::from_bytes(&key_blob).ok();
        Self {
            key_blob,
            comment,
            public_key,
        }
    }

    /// Identity for a bare key blob, as carried by sign and remove requests
    pub fn from_key_blob(key_blob: Bytes) -> Self {
        Self::new(key_blob, String::new())
    }

    /// Modern fingerprint: `SHA256:` followed by unpadded base64 of the digest
    pub fn sha256_fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.key_blob);
        format!("SHA256:{}", STANDARD_NO_PAD.encode(digest))
    }

    /// Legacy fingerprint: colon separated lowercase hex of the MD5 digest
    pub fn md5_fingerprint(&self) -> String {
        let digest = Md5::digest(&self.key_blob);
        digest
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(":")
    }

    /// Get the key type as a string
    pub fn key_type(&self) -> Option<String> {
        self.public_key
            .as_ref()
            .map(|k| k.algorithm().as_str().to_string())
    }

    /// Get the key in OpenSSH format
    pub fn to_openssh(&self) -> Option<String> {
        self.public_key
            .as_ref()
            .map(|k| k.to_openssh().unwrap_or_default())
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.key_blob == other.key_blob && self.comment == other.comment
    }
}

impl Eq for Identity {}

/// An encoded SSH signature as returned in SSH_AGENT_SIGN_RESPONSE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    blob: Bytes,
}

impl Signature {
    /// Wrap an encoded signature blob (string format, string signature)
    pub fn from_blob(blob: impl Into<Bytes>) -> Self {
        Self { blob: blob.into() }
    }

    /// Raw signature blob
    pub fn blob(&self) -> &Bytes {
        &self.blob
    }

    /// Signature algorithm name (e.g. `ssh-ed25519`, `rsa-sha2-512`)
    pub fn algorithm(&self) -> Option<String> {
        let mut reader = PayloadReader::new(&self.blob);
        reader
            .read_string("signature format")
            .ok()
            .map(|s| String::from_utf8_lossy(&s).to_string())
    }
}

/// Parsed SSH_AGENTC_SIGN_REQUEST payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignRequest {
    /// Key blob of the identity to sign with
    pub key_blob: Bytes,
    /// Data to be signed
    pub data: Bytes,
    /// Signature flags (SSH_AGENT_RSA_SHA2_256 etc.)
    pub flags: u32,
}

/// Private key material being added to an agent
///
/// The payload is kept in its wire encoding; keys are only ever forwarded
/// to an upstream agent, never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedKey {
    /// Payload of the add-identity message (key type, key fields, comment,
    /// and constraints when `constrained` is set)
    pub payload: Bytes,
    /// Whether the key was sent as SSH_AGENTC_ADD_ID_CONSTRAINED
    pub constrained: bool,
}

impl AddedKey {
    /// Create from an add-identity payload
    pub fn new(payload: impl Into<Bytes>, constrained: bool) -> Self {
        Self {
            payload: payload.into(),
            constrained,
        }
    }

    /// Key type named at the start of the payload
    pub fn key_type(&self) -> Option<String> {
        let mut reader = PayloadReader::new(&self.payload);
        reader
            .read_string("key type")
            .ok()
            .map(|s| String::from_utf8_lossy(&s).to_string())
    }

    fn message_type(&self) -> MessageType {
        if self.constrained {
            MessageType::AddIdConstrained
        } else {
            MessageType::AddIdentity
        }
    }
}

/// Cursor over a message payload with bounds-checked reads
struct PayloadReader<'a> {
    buf: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn read_u32(&mut self, what: &str) -> Result<u32> {
        if self.buf.remaining() < 4 {
            return Err(Error::InvalidMessage(format!(
                "Message too short while reading {}",
                what
            )));
        }
        Ok(self.buf.get_u32())
    }

    fn read_string(&mut self, what: &str) -> Result<Bytes> {
        let len_u32 = self.read_u32(what)?;
        if len_u32 > MAX_BLOB_SIZE {
            return Err(Error::InvalidMessage(format!(
                "{} size {} exceeds maximum allowed {}",
                what, len_u32, MAX_BLOB_SIZE
            )));
        }
        let len = usize::try_from(len_u32).map_err(|_| {
            Error::InvalidMessage(format!(
                "{} length {} cannot be converted to usize",
                what, len_u32
            ))
        })?;
        if self.buf.remaining() < len {
            return Err(Error::InvalidMessage(format!("{} truncated", what)));
        }
        let value = Bytes::copy_from_slice(&self.buf[..len]);
        self.buf.advance(len);
        Ok(value)
    }
}

fn put_string(payload: &mut BytesMut, data: &[u8]) {
    payload.put_u32(data.len() as u32);
    payload.put_slice(data);
}

/// SSH Agent protocol message
#[derive(Debug, Clone)]
pub struct AgentMessage {
    /// Message type
    pub msg_type: MessageType,
    /// Raw message payload (excluding type byte)
    pub payload: Bytes,
}

impl AgentMessage {
    /// Create a new message
    pub fn new(msg_type: MessageType, payload: Bytes) -> Self {
        Self { msg_type, payload }
    }

    /// Create a failure response
    pub fn failure() -> Self {
        Self::new(MessageType::Failure, Bytes::new())
    }

    /// Create a success response
    pub fn success() -> Self {
        Self::new(MessageType::Success, Bytes::new())
    }

    /// SSH_AGENTC_REQUEST_IDENTITIES
    pub fn request_identities() -> Self {
        Self::new(MessageType::RequestIdentities, Bytes::new())
    }

    /// SSH_AGENTC_REMOVE_ALL_IDENTITIES
    pub fn remove_all_identities() -> Self {
        Self::new(MessageType::RemoveAllIdentities, Bytes::new())
    }

    /// SSH_AGENTC_SIGN_REQUEST
    pub fn sign_request(request: &SignRequest) -> Self {
        let mut payload = BytesMut::new();
        put_string(&mut payload, &request.key_blob);
        put_string(&mut payload, &request.data);
        payload.put_u32(request.flags);
        Self::new(MessageType::SignRequest, payload.freeze())
    }

    /// SSH_AGENTC_ADD_IDENTITY or SSH_AGENTC_ADD_ID_CONSTRAINED
    pub fn add_identity(key: &AddedKey) -> Self {
        Self::new(key.message_type(), key.payload.clone())
    }

    /// SSH_AGENTC_REMOVE_IDENTITY
    pub fn remove_identity(key_blob: &[u8]) -> Self {
        let mut payload = BytesMut::new();
        put_string(&mut payload, key_blob);
        Self::new(MessageType::RemoveIdentity, payload.freeze())
    }

    /// SSH_AGENTC_LOCK
    pub fn lock(passphrase: &[u8]) -> Self {
        let mut payload = BytesMut::new();
        put_string(&mut payload, passphrase);
        Self::new(MessageType::Lock, payload.freeze())
    }

    /// SSH_AGENTC_UNLOCK
    pub fn unlock(passphrase: &[u8]) -> Self {
        let mut payload = BytesMut::new();
        put_string(&mut payload, passphrase);
        Self::new(MessageType::Unlock, payload.freeze())
    }

    /// SSH_AGENT_SIGN_RESPONSE
    pub fn sign_response(signature: &Signature) -> Self {
        let mut payload = BytesMut::new();
        put_string(&mut payload, signature.blob());
        Self::new(MessageType::SignResponse, payload.freeze())
    }

    fn expect_type(&self, expected: MessageType) -> Result<()> {
        if self.msg_type != expected {
            return Err(Error::InvalidMessage(format!(
                "Expected {:?}, got {:?}",
                expected, self.msg_type
            )));
        }
        Ok(())
    }

    /// Parse identities from an IdentitiesAnswer message
    pub fn parse_identities(&self) -> Result<Vec<Identity>> {
        self.expect_type(MessageType::IdentitiesAnswer)?;

        let mut reader = PayloadReader::new(&self.payload);
        let count = reader.read_u32("identity count")?;

        // Validate count to prevent excessive memory allocation
        if count > MAX_IDENTITIES {
            return Err(Error::InvalidMessage(format!(
                "Identity count {} exceeds maximum allowed {}",
                count, MAX_IDENTITIES
            )));
        }

        let capacity = usize::try_from(count).map_err(|_| {
            Error::InvalidMessage(format!(
                "Identity count {} cannot be converted to usize",
                count
            ))
        })?;
        let mut identities = Vec::with_capacity(capacity);

        for _ in 0..count {
            let key_blob = reader.read_string("Key blob")?;
            let comment = reader.read_string("Comment")?;
            let comment = String::from_utf8_lossy(&comment).to_string();
            identities.push(Identity::new(key_blob, comment));
        }

        Ok(identities)
    }

    /// Build an IdentitiesAnswer message from a list of identities
    ///
    /// # Panics
    /// Panics if the number of identities exceeds u32::MAX (practically impossible).
    pub fn build_identities_answer(identities: &[Identity]) -> Self {
        let mut payload = BytesMut::new();
        let count = u32::try_from(identities.len()).expect("identity count exceeds u32::MAX");
        payload.put_u32(count);

        for identity in identities {
            put_string(&mut payload, &identity.key_blob);
            put_string(&mut payload, identity.comment.as_bytes());
        }

        Self::new(MessageType::IdentitiesAnswer, payload.freeze())
    }

    /// Parse a SignRequest message
    pub fn parse_sign_request(&self) -> Result<SignRequest> {
        self.expect_type(MessageType::SignRequest)?;

        let mut reader = PayloadReader::new(&self.payload);
        let key_blob = reader.read_string("Key blob")?;
        let data = reader.read_string("Sign data")?;
        // Some clients omit the trailing flags word
        let flags = reader.read_u32("flags").unwrap_or(0);

        Ok(SignRequest {
            key_blob,
            data,
            flags,
        })
    }

    /// Parse the signature from a SignResponse message
    pub fn parse_sign_response(&self) -> Result<Signature> {
        self.expect_type(MessageType::SignResponse)?;

        let mut reader = PayloadReader::new(&self.payload);
        let blob = reader.read_string("Signature")?;
        Ok(Signature::from_blob(blob))
    }

    /// Parse the key being added from an AddIdentity/AddIdConstrained message
    pub fn parse_added_key(&self) -> Result<AddedKey> {
        match self.msg_type {
            MessageType::AddIdentity => Ok(AddedKey::new(self.payload.clone(), false)),
            MessageType::AddIdConstrained => Ok(AddedKey::new(self.payload.clone(), true)),
            other => Err(Error::InvalidMessage(format!(
                "Expected AddIdentity, got {:?}",
                other
            ))),
        }
    }

    /// Parse the key blob from a RemoveIdentity message
    pub fn parse_remove_identity(&self) -> Result<Bytes> {
        self.expect_type(MessageType::RemoveIdentity)?;
        PayloadReader::new(&self.payload).read_string("Key blob")
    }

    /// Parse the passphrase from a Lock or Unlock message
    pub fn parse_passphrase(&self) -> Result<Bytes> {
        if self.msg_type != MessageType::Lock && self.msg_type != MessageType::Unlock {
            return Err(Error::InvalidMessage(format!(
                "Expected Lock or Unlock, got {:?}",
                self.msg_type
            )));
        }
        PayloadReader::new(&self.payload).read_string("Passphrase")
    }

    /// Encode the message to bytes (including length prefix)
    pub fn encode(&self) -> Bytes {
        let total_len = 1 + self.payload.len();
        let mut buf = BytesMut::with_capacity(4 + total_len);
        buf.put_u32(total_len as u32);
        buf.put_u8(self.msg_type.into());
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// Decode a message from bytes (excluding length prefix)
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::InvalidMessage("Empty message".to_string()));
        }

        let msg_type = MessageType::from(data[0]);
        let payload = Bytes::copy_from_slice(&data[1..]);

        Ok(Self { msg_type, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ED25519_KEY: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIOMqqnkVzrm0SdG6UOoqKLsabgH5C9okWi0dh2l9GKJl user@work.example.com";

    fn make_identity() -> Identity {
        let public_key: PublicKey = ED25519_KEY.parse().unwrap();
        Identity::new(
            Bytes::from(public_key.to_bytes().unwrap()),
            "user@work.example.com".to_string(),
        )
    }

    #[test]
    fn test_message_type_roundtrip() {
        let types = [
            MessageType::RequestIdentities,
            MessageType::SignRequest,
            MessageType::IdentitiesAnswer,
            MessageType::Failure,
            MessageType::Success,
        ];

        for mt in types {
            let byte: u8 = mt.into();
            let back: MessageType = byte.into();
            assert_eq!(mt, back);
        }
    }

    #[test]
    fn test_sha256_fingerprint_matches_ssh_key() {
        let identity = make_identity();
        let expected = identity
            .public_key
            .as_ref()
            .unwrap()
            .fingerprint(ssh_key::HashAlg::Sha256)
            .to_string();
        assert_eq!(identity.sha256_fingerprint(), expected);
    }

    #[test]
    fn test_md5_fingerprint_format() {
        let fp = make_identity().md5_fingerprint();
        let parts: Vec<&str> = fp.split(':').collect();
        assert_eq!(parts.len(), 16);
        assert!(parts.iter().all(|p| p.len() == 2));
        assert_eq!(fp, fp.to_lowercase());
    }

    #[test]
    fn test_fingerprints_without_parsed_key() {
        let identity = Identity::from_key_blob(Bytes::from_static(b"not a key"));
        assert!(identity.public_key.is_none());
        assert!(identity.sha256_fingerprint().starts_with("SHA256:"));
        assert!(!identity.md5_fingerprint().is_empty());
    }

    #[test]
    fn test_identity_equality_ignores_parse_state() {
        let a = make_identity();
        let b = Identity::new(a.key_blob.clone(), a.comment.clone());
        assert_eq!(a, b);
        let c = Identity::new(a.key_blob.clone(), "other".to_string());
        assert_ne!(a, c);
    }

    #[test]
    fn test_empty_identities_answer() {
        let msg = AgentMessage::build_identities_answer(&[]);
        assert_eq!(msg.msg_type, MessageType::IdentitiesAnswer);

        let identities = msg.parse_identities().unwrap();
        assert!(identities.is_empty());
    }

    #[test]
    fn test_identities_answer_preserves_order_and_comments() {
        let first = make_identity();
        let second = Identity::new(Bytes::from_static(b"blob"), "second".to_string());
        let msg = AgentMessage::build_identities_answer(&[first.clone(), second.clone()]);
        let parsed = msg.parse_identities().unwrap();
        assert_eq!(parsed, vec![first, second]);
    }

    #[test]
    fn test_failure_message() {
        let msg = AgentMessage::failure();
        assert_eq!(msg.msg_type, MessageType::Failure);
        assert!(msg.payload.is_empty());
    }

    #[test]
    fn test_sign_request_parse() {
        let request = SignRequest {
            key_blob: Bytes::from_static(b"key"),
            data: Bytes::from_static(b"challenge"),
            flags: 4,
        };
        let msg = AgentMessage::sign_request(&request);
        assert_eq!(msg.parse_sign_request().unwrap(), request);
    }

    #[test]
    fn test_sign_request_without_flags() {
        let mut payload = BytesMut::new();
        put_string(&mut payload, b"key");
        put_string(&mut payload, b"data");
        let msg = AgentMessage::new(MessageType::SignRequest, payload.freeze());
        assert_eq!(msg.parse_sign_request().unwrap().flags, 0);
    }

    #[test]
    fn test_parse_sign_request_empty_payload() {
        let msg = AgentMessage::new(MessageType::SignRequest, Bytes::new());
        let result = msg.parse_sign_request();
        assert!(result.unwrap_err().to_string().contains("too short"));
    }

    #[test]
    fn test_parse_sign_request_truncated_key() {
        let mut payload = BytesMut::new();
        payload.put_u32(100); // key_len = 100
        payload.put_slice(&[0u8; 50]); // But only 50 bytes of data
        let msg = AgentMessage::new(MessageType::SignRequest, payload.freeze());
        let result = msg.parse_sign_request();
        assert!(result.unwrap_err().to_string().contains("truncated"));
    }

    #[test]
    fn test_parse_sign_request_oversized_key() {
        let mut payload = BytesMut::new();
        payload.put_u32(MAX_BLOB_SIZE + 1);
        let msg = AgentMessage::new(MessageType::SignRequest, payload.freeze());
        let result = msg.parse_sign_request();
        assert!(result.unwrap_err().to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_parse_sign_request_wrong_message_type() {
        let msg = AgentMessage::request_identities();
        let result = msg.parse_sign_request();
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Expected SignRequest")
        );
    }

    #[test]
    fn test_sign_response_algorithm() {
        let mut blob = BytesMut::new();
        put_string(&mut blob, b"ssh-ed25519");
        put_string(&mut blob, &[7u8; 64]);
        let signature = Signature::from_blob(blob.freeze());

        let msg = AgentMessage::sign_response(&signature);
        let parsed = msg.parse_sign_response().unwrap();
        assert_eq!(parsed, signature);
        assert_eq!(parsed.algorithm().as_deref(), Some("ssh-ed25519"));
    }

    #[test]
    fn test_added_key_variants() {
        let mut payload = BytesMut::new();
        put_string(&mut payload, b"ssh-ed25519");
        put_string(&mut payload, &[1u8; 32]);
        let key = AddedKey::new(payload.freeze(), true);

        let msg = AgentMessage::add_identity(&key);
        assert_eq!(msg.msg_type, MessageType::AddIdConstrained);
        let parsed = msg.parse_added_key().unwrap();
        assert!(parsed.constrained);
        assert_eq!(parsed.key_type().as_deref(), Some("ssh-ed25519"));

        let plain = AddedKey::new(key.payload.clone(), false);
        assert_eq!(
            AgentMessage::add_identity(&plain).msg_type,
            MessageType::AddIdentity
        );
    }

    #[test]
    fn test_remove_identity_and_passphrase() {
        let msg = AgentMessage::remove_identity(b"key");
        assert_eq!(msg.parse_remove_identity().unwrap(), Bytes::from_static(b"key"));

        let lock = AgentMessage::lock(b"secret");
        assert_eq!(lock.parse_passphrase().unwrap(), Bytes::from_static(b"secret"));
        let unlock = AgentMessage::unlock(b"secret");
        assert_eq!(unlock.msg_type, MessageType::Unlock);
        assert_eq!(unlock.parse_passphrase().unwrap(), Bytes::from_static(b"secret"));

        assert!(AgentMessage::success().parse_passphrase().is_err());
    }

    #[test]
    fn test_parse_identities_exceeds_max_count() {
        let mut payload = BytesMut::new();
        payload.put_u32(MAX_IDENTITIES + 1);
        let msg = AgentMessage::new(MessageType::IdentitiesAnswer, payload.freeze());
        let result = msg.parse_identities();
        assert!(result.unwrap_err().to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_parse_identities_missing_entries() {
        let mut payload = BytesMut::new();
        payload.put_u32(2);
        let msg = AgentMessage::new(MessageType::IdentitiesAnswer, payload.freeze());
        assert!(msg.parse_identities().is_err());
    }

    #[test]
    fn test_decode_empty() {
        assert!(AgentMessage::decode(&[]).is_err());
        let msg = AgentMessage::decode(&[12, 0, 0, 0, 0]).unwrap();
        assert_eq!(msg.msg_type, MessageType::IdentitiesAnswer);
        assert_eq!(msg.payload.len(), 4);
    }
}
