//! Wave-based revalidation of large path sets.

use std::collections::HashSet;
use std::time::Instant;

use futures::future::join_all;
use metrics::histogram;
use tracing::{info, instrument};

use crate::domain::SitePath;

use super::METRIC_REVALIDATE_BATCH_MS;
use super::dispatch::Dispatcher;

/// Upper bound on concurrent calls to the revalidation hook.
pub const REVALIDATE_BATCH_SIZE: usize = 10;

/// Aggregate counts of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// Deduplicates paths and dispatches them chunk by chunk.
///
/// Calls inside a chunk run concurrently; the next chunk starts only after
/// every call of the current one has settled.
#[derive(Clone)]
pub struct BatchOrchestrator {
    dispatcher: Dispatcher,
}

impl BatchOrchestrator {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    #[instrument(skip_all)]
    pub async fn run<I>(&self, paths: I) -> BatchReport
    where
        I: IntoIterator<Item = SitePath>,
    {
        let started_at = Instant::now();
        let unique: Vec<SitePath> = paths
            .into_iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let mut report = BatchReport {
            total: unique.len(),
            ..Default::default()
        };

        for (wave, chunk) in unique.chunks(REVALIDATE_BATCH_SIZE).enumerate() {
            let outcomes = join_all(
                chunk
                    .iter()
                    .cloned()
                    .map(|path| self.dispatcher.revalidate_one(path)),
            )
            .await;

            for outcome in outcomes {
                match outcome {
                    Ok(_) => report.succeeded += 1,
                    Err(failure) => {
                        report.failed += 1;
                        report.errors.push(failure.message());
                    }
                }
            }

            info!(
                target = "storefront::revalidate::batch",
                wave,
                size = chunk.len(),
                succeeded = report.succeeded,
                failed = report.failed,
                "revalidation wave settled"
            );
        }

        histogram!(METRIC_REVALIDATE_BATCH_MS)
            .record(started_at.elapsed().as_secs_f64() * 1000.0);

        report
    }
}
