//! Fingerprint pattern matching

use crate::error::{Error, Result};
use crate::protocol::Identity;

/// A set of fingerprint patterns
///
/// An identity matches when any pattern occurs as a substring of either its
/// legacy MD5 fingerprint (`aa:bb:...`) or its modern SHA256 fingerprint
/// (`SHA256:...`). Patterns are compared verbatim, without case folding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintSet {
    patterns: Vec<String>,
}

impl FingerprintSet {
    /// Create a set from individual patterns
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        if patterns.is_empty() {
            return Err(Error::Config(
                "At least one fingerprint pattern is required".to_string(),
            ));
        }
        // An empty substring would match every key
        if patterns.iter().any(|p| p.is_empty()) {
            return Err(Error::Config(
                "Fingerprint patterns must not be empty".to_string(),
            ));
        }
        Ok(Self { patterns })
    }

    /// Parse a comma separated pattern list such as `SHA256:abc,8b:2c`
    ///
    /// Each pattern is kept exactly as written between the commas.
    pub fn parse(list: &str) -> Result<Self> {
        Self::new(list.split(','))
    }

    /// The configured patterns, in configuration order
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// The first pattern matching the identity, if any
    pub fn matching_pattern(&self, identity: &Identity) -> Option<&str> {
        let md5 = identity.md5_fingerprint();
        let sha256 = identity.sha256_fingerprint();
        self.patterns
            .iter()
            .find(|p| md5.contains(p.as_str()) || sha256.contains(p.as_str()))
            .map(String::as_str)
    }

    /// Check if any pattern matches the identity
    pub fn matches(&self, identity: &Identity) -> bool {
        self.matching_pattern(identity).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn identity(blob: &'static [u8]) -> Identity {
        Identity::from_key_blob(Bytes::from_static(blob))
    }

    #[test]
    fn test_parse_comma_list() {
        let set = FingerprintSet::parse("SHA256:abc,MD5:ab:cd").unwrap();
        assert_eq!(set.patterns(), ["SHA256:abc", "MD5:ab:cd"]);
    }

    #[test]
    fn test_parse_keeps_whitespace() {
        let set = FingerprintSet::parse("SHA256:ab, cd").unwrap();
        assert_eq!(set.patterns(), ["SHA256:ab", " cd"]);

        // " SHA256:" is not a substring of any fingerprint
        let id = identity(b"key-one");
        assert!(FingerprintSet::parse("SHA256:").unwrap().matches(&id));
        assert!(!FingerprintSet::parse(" SHA256:").unwrap().matches(&id));
    }

    #[test]
    fn test_empty_patterns_rejected() {
        assert!(FingerprintSet::parse("").is_err());
        assert!(FingerprintSet::parse("abc,").is_err());
        assert!(FingerprintSet::new(Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_matches_sha256_substring() {
        let id = identity(b"key-one");
        let sha = id.sha256_fingerprint();
        let set = FingerprintSet::new([&sha[10..20]]).unwrap();
        assert!(set.matches(&id));
        assert!(!set.matches(&identity(b"key-two")));
    }

    #[test]
    fn test_matches_md5_substring() {
        let id = identity(b"key-one");
        let md5 = id.md5_fingerprint();
        let set = FingerprintSet::new([&md5[3..14]]).unwrap();
        assert!(set.matches(&id));
    }

    #[test]
    fn test_no_case_folding() {
        let id = identity(b"key-one");
        let upper = id.md5_fingerprint().to_uppercase();
        // hex digits only appear lowercase in the legacy form
        if upper != id.md5_fingerprint() {
            let set = FingerprintSet::new([upper]).unwrap();
            assert!(!set.matches(&id));
        }
    }

    #[test]
    fn test_matching_pattern_returns_first_hit() {
        let id = identity(b"key-one");
        let set = FingerprintSet::new(["nope", "SHA256:", "also"]).unwrap();
        assert_eq!(set.matching_pattern(&id), Some("SHA256:"));
    }

    #[test]
    fn test_matching_is_repeatable() {
        let id = identity(b"key-one");
        let set = FingerprintSet::new(["SHA256:"]).unwrap();
        assert_eq!(set.matches(&id), set.matches(&id));
    }
}
