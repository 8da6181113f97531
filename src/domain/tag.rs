//! Cache tags used to group storefront pages.

use std::fmt;

/// Page families a bare tag can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Product,
    Category,
    Page,
    Layout,
    Menu,
}

impl TagKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "product" => Some(Self::Product),
            "category" => Some(Self::Category),
            "page" => Some(Self::Page),
            "layout" => Some(Self::Layout),
            "menu" => Some(Self::Menu),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Category => "category",
            Self::Page => "page",
            Self::Layout => "layout",
            Self::Menu => "menu",
        }
    }
}

/// A parsed cache tag.
///
/// Only `product:<id>` and `category:<id>` address concrete pages; everything
/// else is kept so callers can log what was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheTag {
    Product(String),
    Category(String),
    Bare(TagKind),
    Other(String),
}

impl CacheTag {
    /// Parse a raw tag; blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Some((prefix, identifier)) = raw.split_once(':') {
            let identifier = identifier.trim();
            let tag = match prefix {
                "product" if !identifier.is_empty() => Self::Product(identifier.to_string()),
                "category" if !identifier.is_empty() => Self::Category(identifier.to_string()),
                _ => Self::Other(raw.to_string()),
            };
            return Some(tag);
        }

        Some(match TagKind::parse(raw) {
            Some(kind) => Self::Bare(kind),
            None => Self::Other(raw.to_string()),
        })
    }
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Product(id) => write!(f, "product:{id}"),
            Self::Category(id) => write!(f, "category:{id}"),
            Self::Bare(kind) => f.write_str(kind.as_str()),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}
