//! Player identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Who a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Identity {
    /// Local single-player mode; one shared save guarded by a lock file.
    Anonymous,
    /// Authenticated by public key.
    Key {
        /// Stable fingerprint, e.g. `SHA256:...`.
        fingerprint: String,
        /// Name the user connected with.
        display_name: String,
    },
}

impl Identity {
    /// Identity for a public-key fingerprint.
    #[must_use]
    pub fn key(fingerprint: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::Key {
            fingerprint: fingerprint.into(),
            display_name: display_name.into(),
        }
    }

    /// True for the local anonymous identity.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// Key under which progress is stored.
    ///
    /// Two connections with the same key resolve to the same save.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Key { fingerprint, .. } => fingerprint,
        }
    }

    /// Name shown in the interface.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Anonymous => "local",
            Self::Key { display_name, .. } => display_name,
        }
    }

    /// Shortened form for logs: algorithm prefix plus first and last 8
    /// characters of the fingerprint body.
    #[must_use]
    pub fn redacted(&self) -> String {
        match self {
            Self::Anonymous => "anonymous".to_string(),
            Self::Key { fingerprint, .. } => {
                let (prefix, body) = match fingerprint.split_once(':') {
                    Some((algo, body)) => (format!("{algo}:"), body),
                    None => (String::new(), fingerprint.as_str()),
                };
                let chars: Vec<char> = body.chars().collect();
                if chars.len() <= 16 {
                    return format!("{prefix}{body}");
                }
                let head: String = chars[..8].iter().collect();
                let tail: String = chars[chars.len() - 8..].iter().collect();
                format!("{prefix}{head}...{tail}")
            }
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_keeps_ends() {
        let id = Identity::key("SHA256:abcdefghIJKLMNOPqrstuvwx12345678", "alice");
        assert_eq!(id.redacted(), "SHA256:abcdefgh...12345678");
        assert_eq!(id.to_string(), id.redacted());
    }

    #[test]
    fn test_short_fingerprint_unchanged() {
        let id = Identity::key("short", "bob");
        assert_eq!(id.redacted(), "short");
    }

    #[test]
    fn test_storage_key() {
        assert_eq!(Identity::Anonymous.storage_key(), "anonymous");
        assert_eq!(Identity::key("SHA256:x", "n").storage_key(), "SHA256:x");
    }
}
