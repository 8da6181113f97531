//! Client for the storefront revalidation API.

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use storefront_api_types::{RevalidateAllResponse, RevalidateResponse, SECRET_HEADER};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Decode(String),
}

/// Calls `/api/revalidate` and `/api/revalidate-all` on a storefront.
#[derive(Clone, Debug)]
pub struct RevalidateClient {
    client: Client,
    base: Url,
    secret: Option<String>,
}

impl RevalidateClient {
    pub fn new(site_url: &str, secret: Option<String>) -> Result<Self, ClientError> {
        let base = Url::parse(site_url)?.join("/")?;
        let client = Client::builder().user_agent(Self::user_agent()).build()?;
        let secret = secret
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Ok(Self {
            client,
            base,
            secret,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("storefront-client/", env!("CARGO_PKG_VERSION"))
    }

    /// Revalidate the pages behind each cache tag, e.g. `product:SKU`.
    pub async fn revalidate_by_tag(
        &self,
        tags: &[String],
    ) -> Result<RevalidateResponse, ClientError> {
        self.post("/api/revalidate", "tag", tags).await
    }

    /// Revalidate explicit site paths.
    pub async fn revalidate_by_path(
        &self,
        paths: &[String],
    ) -> Result<RevalidateResponse, ClientError> {
        self.post("/api/revalidate", "path", paths).await
    }

    pub async fn revalidate_all(&self) -> Result<RevalidateAllResponse, ClientError> {
        self.post("/api/revalidate-all", "", &[]).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        values: &[String],
    ) -> Result<T, ClientError> {
        let mut url = self.base.join(path)?;
        if !values.is_empty() {
            let mut query = url.query_pairs_mut();
            for value in values {
                query.append_pair(key, value);
            }
        }

        let mut request = self.client.post(url);
        if let Some(secret) = &self.secret {
            request = request.header(SECRET_HEADER, secret);
        }

        let response = request.send().await?;
        Self::handle(response).await
    }

    async fn handle<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}
