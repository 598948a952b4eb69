//! Filesystem helpers shared by the configuration and the server

pub mod path;
pub mod socket;
