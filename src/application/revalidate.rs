//! Revalidation use cases behind the HTTP endpoints.
//!
//! Each operation is request-scoped: inputs are translated to site paths,
//! dispatched against the revalidation hook, and summarized. Nothing is kept
//! between calls.

use std::sync::Arc;

use storefront_api_types::WebhookPayload;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::LocaleSettings;
use crate::domain::SitePath;
use crate::revalidation::{
    BatchOrchestrator, BatchReport, DispatchReport, Dispatcher, Translation, normalize_paths,
    translate_tags, translate_webhook,
};

use super::catalog::{CatalogError, RouteKind, StaticPathSource, StaticRoute};

/// Number of failure messages surfaced by a bulk run.
pub const ERROR_SAMPLE_LIMIT: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RevalidateRequestError {
    #[error("missing tag or path parameter")]
    MissingTarget,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("unknown entity type or missing path data")]
    NoPaths { notes: Vec<String> },
}

/// Result of revalidating every known static route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevalidateAllOutcome {
    pub batch: BatchReport,
    /// Failures of the route enumerators, one per locale and kind.
    pub source_errors: Vec<String>,
}

impl RevalidateAllOutcome {
    /// True when some page was refreshed, or when there was nothing to do and
    /// every enumerator answered. Partial failures only show up in `errors`.
    pub fn is_success(&self) -> bool {
        self.batch.succeeded > 0 || (self.batch.failed == 0 && self.source_errors.is_empty())
    }

    /// Enumerator failures first, then dispatch failures, capped at `limit`.
    pub fn sample_errors(&self, limit: usize) -> Vec<String> {
        self.source_errors
            .iter()
            .chain(self.batch.errors.iter())
            .take(limit)
            .cloned()
            .collect()
    }
}

#[derive(Clone)]
pub struct RevalidationService {
    dispatcher: Dispatcher,
    batch: BatchOrchestrator,
    catalog: Arc<dyn StaticPathSource>,
    locales: Vec<LocaleSettings>,
}

impl RevalidationService {
    pub fn new(
        dispatcher: Dispatcher,
        catalog: Arc<dyn StaticPathSource>,
        locales: Vec<LocaleSettings>,
    ) -> Self {
        Self {
            batch: BatchOrchestrator::new(dispatcher.clone()),
            dispatcher,
            catalog,
            locales,
        }
    }

    /// Revalidate the pages addressed by `tags` and explicit `paths`.
    pub async fn revalidate(
        &self,
        tags: &[String],
        paths: &[String],
    ) -> Result<DispatchReport, RevalidateRequestError> {
        let has_target = tags
            .iter()
            .chain(paths.iter())
            .any(|value| !value.trim().is_empty());
        if !has_target {
            return Err(RevalidateRequestError::MissingTarget);
        }

        let mut translation = translate_tags(tags);
        translation.merge(normalize_paths(paths));
        log_notes("request", &translation);

        let report = self.dispatcher.dispatch(&translation.paths).await;
        info!(
            target = "storefront::revalidate",
            tags = tags.len(),
            paths = translation.paths.len(),
            succeeded = report.succeeded.len(),
            failed = report.failures.len(),
            "on-demand revalidation finished"
        );
        Ok(report)
    }

    /// Revalidate the pages touched by a commerce webhook.
    pub async fn handle_webhook(
        &self,
        payload: &WebhookPayload,
    ) -> Result<DispatchReport, WebhookError> {
        let translation = translate_webhook(payload);
        log_notes("webhook", &translation);

        if translation.is_empty() {
            return Err(WebhookError::NoPaths {
                notes: translation.notes,
            });
        }

        let report = self.dispatcher.dispatch(&translation.paths).await;
        info!(
            target = "storefront::revalidate",
            entity = %payload.entity,
            action = %payload.action,
            succeeded = report.succeeded.len(),
            failed = report.failures.len(),
            "webhook revalidation finished"
        );
        Ok(report)
    }

    /// Revalidate every product and category route across all locales.
    pub async fn revalidate_all(&self) -> RevalidateAllOutcome {
        let mut source_errors = Vec::new();
        let mut paths: Vec<SitePath> = Vec::new();

        for locale in &self.locales {
            for kind in [RouteKind::Product, RouteKind::Category] {
                match self.routes(kind, locale).await {
                    Ok(routes) => paths.extend(routes.iter().filter_map(route_path)),
                    Err(err) => {
                        warn!(
                            target = "storefront::revalidate",
                            locale = %locale.code,
                            kind = kind.as_str(),
                            error = %err,
                            "static route enumeration failed"
                        );
                        source_errors.push(format!("{} {}: {err}", locale.code, kind.as_str()));
                    }
                }
            }
        }

        info!(
            target = "storefront::revalidate",
            locales = self.locales.len(),
            candidates = paths.len(),
            "bulk revalidation starting"
        );

        let batch = self.batch.run(paths).await;

        info!(
            target = "storefront::revalidate",
            total = batch.total,
            succeeded = batch.succeeded,
            failed = batch.failed,
            source_errors = source_errors.len(),
            "bulk revalidation finished"
        );

        RevalidateAllOutcome {
            batch,
            source_errors,
        }
    }

    async fn routes(
        &self,
        kind: RouteKind,
        locale: &LocaleSettings,
    ) -> Result<Vec<StaticRoute>, CatalogError> {
        match kind {
            RouteKind::Product => self.catalog.product_routes(locale).await,
            RouteKind::Category => self.catalog.category_routes(locale).await,
        }
    }
}

fn route_path(route: &StaticRoute) -> Option<SitePath> {
    match route.to_path() {
        Ok(path) => Some(path),
        Err(err) => {
            debug!(
                target = "storefront::revalidate",
                kind = route.kind.as_str(),
                slug = %route.slug,
                error = %err,
                "skipping unaddressable route"
            );
            None
        }
    }
}

fn log_notes(source: &'static str, translation: &Translation) {
    for note in &translation.notes {
        info!(target = "storefront::revalidate", source, note = %note, "translation note");
    }
}
