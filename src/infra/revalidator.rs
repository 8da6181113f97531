//! HTTP adapter for the storefront's "revalidate one path" hook.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use storefront_api_types::SECRET_HEADER;

use crate::config::{RevalidateSecret, RevalidationSettings};
use crate::domain::SitePath;
use crate::revalidation::{RevalidateError, Revalidator};

use super::error::InfraError;

const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Serialize)]
struct HookRequest<'a> {
    path: &'a str,
}

/// Posts `{"path": ..}` to `{site_url}{hook_path}` for every revalidation.
#[derive(Clone, Debug)]
pub struct HttpRevalidator {
    client: Client,
    endpoint: Url,
    secret: Option<RevalidateSecret>,
}

impl HttpRevalidator {
    pub fn new(settings: &RevalidationSettings) -> Result<Self, InfraError> {
        let endpoint = settings.site_url.join(&settings.hook_path).map_err(|err| {
            InfraError::configuration(format!(
                "invalid revalidation hook `{}`: {err}",
                settings.hook_path
            ))
        })?;

        let client = Client::builder()
            .user_agent(user_agent())
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            secret: settings.secret.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Revalidator for HttpRevalidator {
    async fn revalidate_path(&self, path: &SitePath) -> Result<(), RevalidateError> {
        let mut request = self.client.post(self.endpoint.clone()).json(&HookRequest {
            path: path.as_str(),
        });
        if let Some(secret) = &self.secret {
            request = request.header(SECRET_HEADER, secret.expose());
        }

        let response = request
            .send()
            .await
            .map_err(|err| RevalidateError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(RevalidateError::Status {
            status: status.as_u16(),
            body: truncate(&body),
        })
    }
}

pub(crate) fn user_agent() -> &'static str {
    concat!("storefront-revalidate/", env!("CARGO_PKG_VERSION"))
}

pub(crate) fn truncate(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}…", &body[..cut]),
        None => body.to_string(),
    }
}
