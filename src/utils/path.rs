//! Path expansion utilities

use crate::error::{Error, Result};
use std::path::PathBuf;

/// Expand `~` and `$VARS` in a configured path
///
/// Unset variables are an error rather than expanding to nothing, so a
/// typo never turns into a relative path.
pub fn expand_path(path: &str) -> Result<PathBuf> {
    if path.trim().is_empty() {
        return Err(Error::Config("Empty path".to_string()));
    }
    shellexpand::full(path)
        .map(|s| PathBuf::from(s.into_owned()))
        .map_err(|e| Error::Config(format!("Failed to expand path '{}': {}", path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_tilde() {
        let result = expand_path("~/agent.sock").unwrap();
        assert!(result.is_absolute());
        assert!(result.ends_with("agent.sock"));
    }

    #[test]
    fn test_expand_path_env_var() {
        let home = std::env::var("HOME").unwrap();
        let result = expand_path("$HOME/agent.sock").unwrap();
        assert_eq!(result, PathBuf::from(home).join("agent.sock"));
    }

    #[test]
    fn test_expand_path_unset_var() {
        let result = expand_path("$AUTHSOCK_MUX_SURELY_UNSET_VAR/agent.sock");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_expand_path_empty() {
        assert!(expand_path("  ").is_err());
    }

    #[test]
    fn test_expand_path_absolute() {
        let result = expand_path("/run/user/1000/agent.sock").unwrap();
        assert_eq!(result, PathBuf::from("/run/user/1000/agent.sock"));
    }
}
