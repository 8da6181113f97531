//! Domain layer types and invariants.

pub mod error;
pub mod path;
pub mod tag;
pub mod webhook;

pub use error::DomainError;
pub use path::SitePath;
pub use tag::{CacheTag, TagKind};
pub use webhook::WebhookEntity;
