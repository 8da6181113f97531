use axum::{
    Json,
    extract::{RawQuery, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storefront_api_types::{
    RevalidateAllResponse, RevalidateResponse, WebhookPayload, WebhookResponse,
};
use time::OffsetDateTime;

use crate::application::error::HttpError;
use crate::application::revalidate::ERROR_SAMPLE_LIMIT;

use super::state::HttpState;

pub async fn revalidate(
    State(state): State<HttpState>,
    RawQuery(query): RawQuery,
) -> Result<Json<RevalidateResponse>, HttpError> {
    let (tags, paths) = targets_from_query(query.as_deref());
    let report = state.revalidation.revalidate(&tags, &paths).await?;

    Ok(Json(RevalidateResponse {
        revalidated: !report.all_failed(),
        now: now_millis(),
        message: revalidated_message(report.succeeded.len()),
        errors: report.error_messages(),
    }))
}

pub async fn revalidate_all(State(state): State<HttpState>) -> Json<RevalidateAllResponse> {
    let outcome = state.revalidation.revalidate_all().await;

    Json(RevalidateAllResponse {
        success: outcome.is_success(),
        total: outcome.batch.total,
        revalidated: outcome.batch.succeeded,
        failed: outcome.batch.failed,
        errors: outcome.sample_errors(ERROR_SAMPLE_LIMIT),
        now: now_millis(),
    })
}

pub async fn magento_webhook(
    State(state): State<HttpState>,
    payload: Result<Json<WebhookPayload>, JsonRejection>,
) -> Result<Json<WebhookResponse>, HttpError> {
    let Json(payload) = payload.map_err(|rejection| {
        HttpError::from_error(
            "infra::http::webhook",
            StatusCode::BAD_REQUEST,
            "Invalid JSON body",
            &rejection,
        )
    })?;

    let report = state.revalidation.handle_webhook(&payload).await?;

    Ok(Json(WebhookResponse {
        success: !report.succeeded.is_empty(),
        message: revalidated_message(report.succeeded.len()),
        errors: report.error_messages(),
    }))
}

pub async fn method_not_allowed() -> HttpError {
    HttpError::new(
        "infra::http::method_not_allowed",
        StatusCode::METHOD_NOT_ALLOWED,
        "Method not allowed",
        "method not allowed on this route",
    )
}

pub async fn health() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Split repeated `tag` and `path` query parameters, keeping their order.
fn targets_from_query(query: Option<&str>) -> (Vec<String>, Vec<String>) {
    let mut tags = Vec::new();
    let mut paths = Vec::new();
    for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
        match key.as_ref() {
            "tag" => tags.push(value.into_owned()),
            "path" => paths.push(value.into_owned()),
            _ => {}
        }
    }
    (tags, paths)
}

fn revalidated_message(count: usize) -> String {
    format!("Revalidated {count} paths")
}

fn now_millis() -> i64 {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    i64::try_from(millis).unwrap_or(i64::MAX)
}
