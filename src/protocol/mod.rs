//! SSH Agent Protocol implementation
//!
//! This module implements the subset of the SSH agent protocol defined in
//! https://datatracker.ietf.org/doc/html/draft-miller-ssh-agent that the
//! proxy speaks on both its downstream and upstream sides.

pub mod codec;
pub mod message;

pub use codec::AgentCodec;
pub use message::{AddedKey, AgentMessage, Identity, MessageType, Signature, SignRequest};
