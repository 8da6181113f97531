//! Storefront cache revalidation service.
//!
//! Receives cache tags, explicit paths and commerce webhooks, and regenerates
//! the affected statically rendered pages through the storefront's
//! revalidation hook.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod revalidation;
