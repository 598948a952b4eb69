//! authsock-mux - SSH agent proxy that filters and multiplexes agents
//!
//! This library serves SSH agent sockets backed by one or more upstream
//! agents. Each upstream can be narrowed to the identities whose
//! fingerprints match configured patterns, and several upstreams can be
//! combined into a single agent.

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod protocol;
pub mod utils;

pub use error::{Error, Result};

/// Package version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name
pub const NAME: &str = env!("CARGO_PKG_NAME");
