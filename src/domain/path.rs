//! Site-relative URL paths.

use std::fmt;

use serde::Serialize;

use super::error::DomainError;

/// A site-relative URL that always begins with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SitePath(String);

impl SitePath {
    /// Normalize `raw` into a site path, prepending `/` when missing.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, DomainError> {
        let raw = raw.as_ref();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_path(raw, "path must not be empty"));
        }
        if trimmed.chars().any(|ch| ch.is_whitespace() || ch.is_control()) {
            return Err(DomainError::invalid_path(
                raw,
                "path must not contain whitespace",
            ));
        }

        if trimmed.starts_with('/') {
            Ok(Self(trimmed.to_string()))
        } else {
            Ok(Self(format!("/{trimmed}")))
        }
    }

    /// Build `prefix` + `segment`, rejecting an empty segment.
    pub fn with_prefix(prefix: &str, segment: &str) -> Result<Self, DomainError> {
        let segment = segment.trim().trim_start_matches('/');
        if segment.is_empty() {
            return Err(DomainError::invalid_path(
                format!("{prefix}{segment}"),
                "identifier must not be empty",
            ));
        }
        Self::new(format!("{prefix}{segment}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SitePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SitePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepends_missing_slash() {
        let path = SitePath::new("women/tops").expect("valid path");
        assert_eq!(path.as_str(), "/women/tops");
    }

    #[test]
    fn keeps_leading_slash() {
        let path = SitePath::new("  /p/hoodie ").expect("valid path");
        assert_eq!(path.as_str(), "/p/hoodie");
    }

    #[test]
    fn root_is_a_valid_path() {
        assert_eq!(SitePath::new("/").expect("root").as_str(), "/");
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert!(SitePath::new("").is_err());
        assert!(SitePath::new("   ").is_err());
        assert!(SitePath::new("/p/two words").is_err());
    }

    #[test]
    fn prefix_requires_identifier() {
        assert_eq!(
            SitePath::with_prefix("/p/", "ABC123")
                .expect("product path")
                .as_str(),
            "/p/ABC123"
        );
        assert!(SitePath::with_prefix("/p/", "").is_err());
        assert!(SitePath::with_prefix("/", "/").is_err());
    }
}
