//! Best-effort, single-attempt revalidation of individual paths.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tracing::{debug, warn};

use crate::domain::SitePath;

use super::revalidator::{RevalidateError, Revalidator};
use super::{METRIC_REVALIDATE_FAILURE, METRIC_REVALIDATE_SUCCESS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevalidationFailure {
    pub path: SitePath,
    pub error: RevalidateError,
}

impl RevalidationFailure {
    pub fn message(&self) -> String {
        format!("{}: {}", self.path, self.error)
    }
}

/// Outcome of dispatching an ordered list of paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub succeeded: Vec<SitePath>,
    pub failures: Vec<RevalidationFailure>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failures.len()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(RevalidationFailure::message)
            .collect()
    }

    /// True when something was attempted and nothing succeeded.
    pub fn all_failed(&self) -> bool {
        self.succeeded.is_empty() && !self.failures.is_empty()
    }
}

/// Invokes the [`Revalidator`] once per path with a per-call timeout.
#[derive(Clone)]
pub struct Dispatcher {
    revalidator: Arc<dyn Revalidator>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(revalidator: Arc<dyn Revalidator>, timeout: Duration) -> Self {
        Self {
            revalidator,
            timeout,
        }
    }

    /// Revalidate a single path; errors are returned, never retried.
    pub async fn revalidate_one(&self, path: SitePath) -> Result<SitePath, RevalidationFailure> {
        let outcome =
            match tokio::time::timeout(self.timeout, self.revalidator.revalidate_path(&path)).await
            {
                Ok(result) => result,
                Err(_) => Err(RevalidateError::Timeout(self.timeout.as_millis())),
            };

        match outcome {
            Ok(()) => {
                counter!(METRIC_REVALIDATE_SUCCESS).increment(1);
                debug!(
                    target = "storefront::revalidate::dispatch",
                    path = %path,
                    "path revalidated"
                );
                Ok(path)
            }
            Err(error) => {
                counter!(METRIC_REVALIDATE_FAILURE).increment(1);
                warn!(
                    target = "storefront::revalidate::dispatch",
                    path = %path,
                    error = %error,
                    "path revalidation failed"
                );
                Err(RevalidationFailure { path, error })
            }
        }
    }

    /// Revalidate `paths` in order. A failing path does not stop the rest.
    pub async fn dispatch(&self, paths: &[SitePath]) -> DispatchReport {
        let mut report = DispatchReport::default();
        for path in paths {
            match self.revalidate_one(path.clone()).await {
                Ok(path) => report.succeeded.push(path),
                Err(failure) => report.failures.push(failure),
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct ScriptedRevalidator {
        failing: HashSet<String>,
        hanging: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Revalidator for ScriptedRevalidator {
        async fn revalidate_path(&self, path: &SitePath) -> Result<(), RevalidateError> {
            self.calls
                .lock()
                .expect("calls lock")
                .push(path.to_string());
            if self.hanging.contains(path.as_str()) {
                std::future::pending::<()>().await;
            }
            if self.failing.contains(path.as_str()) {
                return Err(RevalidateError::Status {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(())
        }
    }

    fn site_paths(raw: &[&str]) -> Vec<SitePath> {
        raw.iter()
            .map(|value| SitePath::new(value).expect("valid path"))
            .collect()
    }

    #[tokio::test]
    async fn failures_do_not_abort_siblings() {
        let revalidator = Arc::new(ScriptedRevalidator {
            failing: HashSet::from(["/b".to_string()]),
            ..Default::default()
        });
        let dispatcher = Dispatcher::new(revalidator.clone(), Duration::from_secs(5));

        let report = dispatcher.dispatch(&site_paths(&["/a", "/b", "/c"])).await;

        assert_eq!(report.succeeded, site_paths(&["/a", "/c"]));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.error_messages(),
            vec!["/b: revalidation endpoint returned 500: boom".to_string()]
        );
        assert!(!report.all_failed());
        assert_eq!(
            *revalidator.calls.lock().expect("calls lock"),
            vec!["/a", "/b", "/c"]
        );
    }

    #[tokio::test]
    async fn each_path_is_attempted_once() {
        let revalidator = Arc::new(ScriptedRevalidator {
            failing: HashSet::from(["/a".to_string()]),
            ..Default::default()
        });
        let dispatcher = Dispatcher::new(revalidator.clone(), Duration::from_secs(5));

        let report = dispatcher.dispatch(&site_paths(&["/a"])).await;

        assert!(report.all_failed());
        assert_eq!(revalidator.calls.lock().expect("calls lock").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_call_times_out() {
        let revalidator = Arc::new(ScriptedRevalidator {
            hanging: HashSet::from(["/slow".to_string()]),
            ..Default::default()
        });
        let dispatcher = Dispatcher::new(revalidator, Duration::from_millis(250));

        let report = dispatcher.dispatch(&site_paths(&["/slow", "/fast"])).await;

        assert_eq!(report.succeeded, site_paths(&["/fast"]));
        assert_eq!(
            report.failures[0].error,
            RevalidateError::Timeout(250),
            "hung call should surface as a timeout"
        );
    }

    #[tokio::test]
    async fn empty_input_attempts_nothing() {
        let dispatcher = Dispatcher::new(
            Arc::new(ScriptedRevalidator::default()),
            Duration::from_secs(1),
        );
        let report = dispatcher.dispatch(&[]).await;
        assert_eq!(report.attempted(), 0);
        assert!(!report.all_failed());
    }
}
