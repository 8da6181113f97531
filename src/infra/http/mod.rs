mod handlers;
mod middleware;
mod state;

pub use middleware::RequestContext;
pub use state::HttpState;

use axum::{
    Router,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post},
};

use crate::application::error::HttpError;
use crate::config::FeatureFlags;

use handlers::{health, magento_webhook, method_not_allowed, revalidate, revalidate_all};
use middleware::{catch_panics, log_responses, require_secret, set_request_context};

/// Build the revalidation router. Optional surfaces follow the feature flags.
pub fn build_router(state: HttpState, features: FeatureFlags) -> Router {
    let guard = axum_middleware::from_fn_with_state(state.clone(), require_secret);

    // The guard wraps the handlers only, so unknown methods get 405 before auth.
    let mut router = Router::new().route(
        "/api/revalidate",
        get(revalidate)
            .post(revalidate)
            .route_layer(guard.clone())
            .fallback(method_not_allowed),
    );
    if features.revalidate_all {
        router = router.route(
            "/api/revalidate-all",
            get(revalidate_all)
                .post(revalidate_all)
                .route_layer(guard)
                .fallback(method_not_allowed),
        );
    }

    router = router.route("/health", get(health));
    if features.webhook {
        router = router.route(
            "/api/webhook/magento",
            post(magento_webhook).fallback(method_not_allowed),
        );
    }

    router
        .fallback(not_found)
        .with_state(state)
        .layer(axum_middleware::from_fn(catch_panics))
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn not_found() -> HttpError {
    HttpError::new(
        "infra::http::not_found",
        StatusCode::NOT_FOUND,
        "Not found",
        "no route matched",
    )
}
