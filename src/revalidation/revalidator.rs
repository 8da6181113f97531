use async_trait::async_trait;
use thiserror::Error;

use crate::domain::SitePath;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RevalidateError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("revalidation endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("timed out after {0}ms")]
    Timeout(u128),
}

impl RevalidateError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

/// The hosting framework's "regenerate this page" primitive.
#[async_trait]
pub trait Revalidator: Send + Sync {
    async fn revalidate_path(&self, path: &SitePath) -> Result<(), RevalidateError>;
}
