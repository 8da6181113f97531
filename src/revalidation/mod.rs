//! Storefront page revalidation.
//!
//! Turns cache tags, explicit paths and commerce webhooks into calls against
//! the storefront's "revalidate one path" hook:
//!
//! - **Translator**: maps tags and webhook fields to [`SitePath`]s
//! - **Dispatcher**: one call per path, failures recorded and never retried
//! - **Batch orchestrator**: deduplicates a large path set and dispatches it in
//!   waves of [`REVALIDATE_BATCH_SIZE`] concurrent calls
//!
//! [`SitePath`]: crate::domain::SitePath

mod batch;
mod dispatch;
mod revalidator;
mod translate;

pub use batch::{BatchOrchestrator, BatchReport, REVALIDATE_BATCH_SIZE};
pub use dispatch::{DispatchReport, Dispatcher, RevalidationFailure};
pub use revalidator::{RevalidateError, Revalidator};
pub use translate::{
    Translation, normalize_paths, translate_tag, translate_tags, translate_webhook,
};

pub(crate) const METRIC_REVALIDATE_SUCCESS: &str = "storefront_revalidate_success_total";
pub(crate) const METRIC_REVALIDATE_FAILURE: &str = "storefront_revalidate_failure_total";
pub(crate) const METRIC_REVALIDATE_BATCH_MS: &str = "storefront_revalidate_batch_ms";
