//! Static route enumeration consumed by bulk revalidation.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::LocaleSettings;
use crate::domain::{DomainError, SitePath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    Product,
    Category,
}

impl RouteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Category => "category",
        }
    }
}

/// A route that can be rendered ahead of time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StaticRoute {
    pub kind: RouteKind,
    /// `url_key` for products, `url_path` for categories.
    pub slug: String,
    pub locale: String,
}

impl StaticRoute {
    pub fn product(slug: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            kind: RouteKind::Product,
            slug: slug.into(),
            locale: locale.into(),
        }
    }

    pub fn category(slug: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            kind: RouteKind::Category,
            slug: slug.into(),
            locale: locale.into(),
        }
    }

    /// Canonical site path of this route. Locales share one path space.
    pub fn to_path(&self) -> Result<SitePath, DomainError> {
        match self.kind {
            RouteKind::Product => SitePath::with_prefix("/p/", &self.slug),
            RouteKind::Category => SitePath::with_prefix("/", &self.slug),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Transport(String),
    #[error("catalog returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("catalog query failed: {0}")]
    Query(String),
    #[error("catalog response could not be decoded: {0}")]
    Decode(String),
    #[error("catalog is not configured")]
    NotConfigured,
}

/// Lists the product and category routes known to the commerce backend.
#[async_trait]
pub trait StaticPathSource: Send + Sync {
    async fn product_routes(
        &self,
        locale: &LocaleSettings,
    ) -> Result<Vec<StaticRoute>, CatalogError>;

    async fn category_routes(
        &self,
        locale: &LocaleSettings,
    ) -> Result<Vec<StaticRoute>, CatalogError>;
}

/// Used when no catalog endpoint is configured. Every enumeration fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredCatalog;

#[async_trait]
impl StaticPathSource for UnconfiguredCatalog {
    async fn product_routes(
        &self,
        _locale: &LocaleSettings,
    ) -> Result<Vec<StaticRoute>, CatalogError> {
        Err(CatalogError::NotConfigured)
    }

    async fn category_routes(
        &self,
        _locale: &LocaleSettings,
    ) -> Result<Vec<StaticRoute>, CatalogError> {
        Err(CatalogError::NotConfigured)
    }
}
