//! Command implementations for authsock-mux CLI

pub mod completion;
pub mod config;
pub mod filter;
pub mod mux;
pub mod run;
pub mod serve;
pub mod version;
