//! Key selection by fingerprint
//!
//! Patterns are matched against both fingerprint forms an SSH agent user is
//! likely to copy from `ssh-add -l`: legacy MD5 and SHA256.

mod fingerprint;

pub use fingerprint::FingerprintSet;
