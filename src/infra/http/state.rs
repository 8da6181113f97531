use std::sync::Arc;

use crate::application::revalidate::RevalidationService;
use crate::config::RevalidateSecret;

/// Shared state handed to every revalidation handler.
#[derive(Clone)]
pub struct HttpState {
    pub revalidation: Arc<RevalidationService>,
    /// `None` leaves the revalidation endpoints open.
    pub secret: Option<RevalidateSecret>,
}

impl HttpState {
    pub fn new(revalidation: RevalidationService, secret: Option<RevalidateSecret>) -> Self {
        Self {
            revalidation: Arc::new(revalidation),
            secret,
        }
    }
}
