//! Static route enumeration against the commerce GraphQL API.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::debug;

use crate::application::catalog::{CatalogError, StaticPathSource, StaticRoute};
use crate::config::{CatalogSettings, LocaleSettings};

use super::error::InfraError;
use super::revalidator::{truncate, user_agent};

const STORE_HEADER: &str = "Store";
const MAX_PRODUCT_PAGES: u32 = 10_000;

const PRODUCTS_QUERY: &str = r#"query StaticProducts($pageSize: Int!, $currentPage: Int!) {
  products(search: "", pageSize: $pageSize, currentPage: $currentPage) {
    items { url_key }
    page_info { total_pages }
  }
}"#;

const CATEGORIES_QUERY: &str = r#"query StaticCategories {
  categoryList {
    url_path
    children {
      url_path
      children { url_path }
    }
  }
}"#;

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ProductsData {
    products: ProductPage,
}

#[derive(Debug, Deserialize)]
struct ProductPage {
    #[serde(default)]
    items: Vec<ProductItem>,
    page_info: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
struct ProductItem {
    url_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    total_pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CategoriesData {
    #[serde(rename = "categoryList", default)]
    category_list: Vec<CategoryNode>,
}

#[derive(Debug, Deserialize)]
struct CategoryNode {
    url_path: Option<String>,
    #[serde(default)]
    children: Vec<CategoryNode>,
}

/// Enumerates products and categories for one store view per request.
#[derive(Clone, Debug)]
pub struct GraphqlCatalog {
    client: Client,
    endpoint: Url,
    page_size: u32,
}

impl GraphqlCatalog {
    pub fn new(endpoint: Url, settings: &CatalogSettings) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(user_agent())
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            page_size: settings.page_size.get(),
        })
    }

    async fn query<T: DeserializeOwned>(
        &self,
        store_code: &str,
        query: &str,
        variables: Value,
    ) -> Result<T, CatalogError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(STORE_HEADER, store_code)
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(|err| CatalogError::Transport(err.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| CatalogError::Transport(err.to_string()))?;
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: truncate(&String::from_utf8_lossy(&bytes)),
            });
        }

        let envelope: GraphqlResponse<T> =
            serde_json::from_slice(&bytes).map_err(|err| CatalogError::Decode(err.to_string()))?;
        if !envelope.errors.is_empty() {
            let messages = envelope
                .errors
                .into_iter()
                .map(|error| error.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(CatalogError::Query(messages));
        }

        envelope
            .data
            .ok_or_else(|| CatalogError::Decode("response has no data".to_string()))
    }
}

#[async_trait]
impl StaticPathSource for GraphqlCatalog {
    async fn product_routes(
        &self,
        locale: &LocaleSettings,
    ) -> Result<Vec<StaticRoute>, CatalogError> {
        let mut routes = Vec::new();
        let mut current_page = 1;

        loop {
            let data: ProductsData = self
                .query(
                    &locale.store_code,
                    PRODUCTS_QUERY,
                    json!({ "pageSize": self.page_size, "currentPage": current_page }),
                )
                .await?;

            routes.extend(
                data.products
                    .items
                    .into_iter()
                    .filter_map(|item| item.url_key)
                    .filter(|key| !key.trim().is_empty())
                    .map(|key| StaticRoute::product(key, locale.code.clone())),
            );

            let total_pages = data
                .products
                .page_info
                .and_then(|info| info.total_pages)
                .unwrap_or(1)
                .min(MAX_PRODUCT_PAGES);
            if current_page >= total_pages {
                break;
            }
            current_page += 1;
        }

        debug!(
            target = "storefront::catalog",
            locale = %locale.code,
            pages = current_page,
            routes = routes.len(),
            "product routes enumerated"
        );
        Ok(routes)
    }

    async fn category_routes(
        &self,
        locale: &LocaleSettings,
    ) -> Result<Vec<StaticRoute>, CatalogError> {
        let data: CategoriesData = self
            .query(&locale.store_code, CATEGORIES_QUERY, json!({}))
            .await?;

        let mut routes = Vec::new();
        flatten_categories(&data.category_list, &locale.code, &mut routes);

        debug!(
            target = "storefront::catalog",
            locale = %locale.code,
            routes = routes.len(),
            "category routes enumerated"
        );
        Ok(routes)
    }
}

fn flatten_categories(nodes: &[CategoryNode], locale: &str, out: &mut Vec<StaticRoute>) {
    for node in nodes {
        if let Some(path) = node.url_path.as_deref()
            && !path.trim().is_empty()
        {
            out.push(StaticRoute::category(path, locale));
        }
        flatten_categories(&node.children, locale, out);
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;
    use std::time::Duration;

    use httpmock::MockServer;

    use super::*;

    fn catalog(server: &MockServer, page_size: u32) -> GraphqlCatalog {
        let settings = CatalogSettings {
            graphql_url: None,
            page_size: NonZeroU32::new(page_size).expect("page size"),
            request_timeout: Duration::from_secs(5),
        };
        let endpoint = Url::parse(&server.url("/graphql")).expect("mock url");
        GraphqlCatalog::new(endpoint, &settings).expect("catalog")
    }

    fn locale(code: &str, store_code: &str) -> LocaleSettings {
        LocaleSettings {
            code: code.to_string(),
            store_code: store_code.to_string(),
        }
    }

    #[tokio::test]
    async fn products_are_paged_until_total_pages() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method("POST")
                .path("/graphql")
                .header(STORE_HEADER, "en_us")
                .json_body_includes(r#"{"variables":{"currentPage":1}}"#);
            then.status(200).header("content-type", "application/json").body(
                r#"{"data":{"products":{"items":[{"url_key":"hoodie"},{"url_key":null}],"page_info":{"total_pages":2}}}}"#,
            );
        });
        let second = server.mock(|when, then| {
            when.method("POST")
                .path("/graphql")
                .json_body_includes(r#"{"variables":{"currentPage":2}}"#);
            then.status(200).header("content-type", "application/json").body(
                r#"{"data":{"products":{"items":[{"url_key":"tee"}],"page_info":{"total_pages":2}}}}"#,
            );
        });

        let routes = catalog(&server, 2)
            .product_routes(&locale("en", "en_us"))
            .await
            .expect("routes");

        assert_eq!(
            routes,
            vec![
                StaticRoute::product("hoodie", "en"),
                StaticRoute::product("tee", "en"),
            ]
        );
        first.assert();
        second.assert();
    }

    #[tokio::test]
    async fn categories_are_flattened() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("POST").path("/graphql").header(STORE_HEADER, "de");
            then.status(200).header("content-type", "application/json").body(
                r#"{"data":{"categoryList":[{"url_path":null,"children":[{"url_path":"women","children":[{"url_path":"women/tops"}]},{"url_path":"sale","children":[]}]}]}}"#,
            );
        });

        let routes = catalog(&server, 100)
            .category_routes(&locale("de", "de"))
            .await
            .expect("routes");

        let slugs: Vec<_> = routes.iter().map(|route| route.slug.as_str()).collect();
        assert_eq!(slugs, vec!["women", "women/tops", "sale"]);
    }

    #[tokio::test]
    async fn graphql_errors_fail_the_enumeration() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("POST").path("/graphql");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"errors":[{"message":"Internal server error"}]}"#);
        });

        let err = catalog(&server, 100)
            .category_routes(&locale("en", "default"))
            .await
            .expect_err("graphql error");
        assert!(matches!(err, CatalogError::Query(message) if message == "Internal server error"));
    }

    #[tokio::test]
    async fn http_errors_carry_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("POST").path("/graphql");
            then.status(503).body("maintenance");
        });

        let err = catalog(&server, 100)
            .product_routes(&locale("en", "default"))
            .await
            .expect_err("unavailable");
        assert!(matches!(err, CatalogError::Status { status: 503, .. }));
    }
}
