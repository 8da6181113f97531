use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid site path `{value}`: {reason}")]
    InvalidPath { value: String, reason: &'static str },
}

impl DomainError {
    pub fn invalid_path(value: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidPath {
            value: value.into(),
            reason,
        }
    }
}
