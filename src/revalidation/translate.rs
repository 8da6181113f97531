//! Pure mapping from tags, raw paths and webhooks to site paths.

use std::collections::HashSet;

use storefront_api_types::WebhookPayload;
use tracing::{debug, info};

use crate::domain::{CacheTag, DomainError, SitePath, WebhookEntity};

const PRODUCT_PREFIX: &str = "/p/";

/// Paths produced by a translation plus diagnostics about what was skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translation {
    pub paths: Vec<SitePath>,
    pub notes: Vec<String>,
}

impl Translation {
    fn path(path: SitePath) -> Self {
        Self {
            paths: vec![path],
            notes: Vec::new(),
        }
    }

    fn note(note: impl Into<String>) -> Self {
        Self {
            paths: Vec::new(),
            notes: vec![note.into()],
        }
    }

    /// Append `other`, keeping the first occurrence of every path.
    pub fn merge(&mut self, other: Translation) {
        let mut seen: HashSet<SitePath> = self.paths.iter().cloned().collect();
        self.paths
            .extend(other.paths.into_iter().filter(|path| seen.insert(path.clone())));
        self.notes.extend(other.notes);
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Translate one cache tag.
pub fn translate_tag(tag: &CacheTag) -> Translation {
    let result = match tag {
        CacheTag::Product(sku) => SitePath::with_prefix(PRODUCT_PREFIX, sku),
        CacheTag::Category(url_path) => SitePath::with_prefix("/", url_path),
        CacheTag::Bare(kind) => {
            info!(
                target = "storefront::revalidate::translate",
                tag = kind.as_str(),
                "bare tag requires full revalidation; skipped"
            );
            return Translation::note(format!(
                "tag `{}` requires full revalidation and was skipped",
                kind.as_str()
            ));
        }
        CacheTag::Other(raw) => {
            debug!(
                target = "storefront::revalidate::translate",
                tag = %raw,
                "tag does not address a page"
            );
            return Translation::note(format!("tag `{raw}` does not address a page"));
        }
    };

    match result {
        Ok(path) => Translation::path(path),
        Err(err) => Translation::note(format!("tag `{tag}`: {err}")),
    }
}

/// Translate a list of raw tags, ignoring blanks and repeats.
pub fn translate_tags<I, S>(tags: I) -> Translation
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut translation = Translation::default();
    for tag in tags
        .into_iter()
        .filter_map(|raw| CacheTag::parse(raw.as_ref()))
    {
        if seen.insert(tag.clone()) {
            translation.merge(translate_tag(&tag));
        }
    }
    translation
}

/// Normalize explicit path parameters, dropping blanks and repeats.
pub fn normalize_paths<I, S>(paths: I) -> Translation
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut translation = Translation::default();
    for raw in paths {
        let raw = raw.as_ref();
        if raw.trim().is_empty() {
            continue;
        }
        let next = match SitePath::new(raw) {
            Ok(path) => Translation::path(path),
            Err(err) => Translation::note(err.to_string()),
        };
        translation.merge(next);
    }
    translation
}

/// Translate a commerce webhook into the pages it affects.
pub fn translate_webhook(payload: &WebhookPayload) -> Translation {
    let entity = WebhookEntity::parse(&payload.entity);
    let translation = match &entity {
        WebhookEntity::Product => match payload.field("url_key") {
            Some(url_key) => from_result(SitePath::with_prefix(PRODUCT_PREFIX, &url_key)),
            None => match payload.field("sku") {
                Some(sku) => Translation::note(format!(
                    "product `{sku}` has no url_key; a catalog lookup would be needed"
                )),
                None => Translation::note("product webhook carries neither url_key nor sku"),
            },
        },
        WebhookEntity::Category => match payload.field("url_path") {
            Some(url_path) => from_result(SitePath::new(url_path)),
            None => match payload.field("uid") {
                Some(uid) => Translation::note(format!(
                    "category `{uid}` has no url_path; a catalog lookup would be needed"
                )),
                None => Translation::note("category webhook carries neither url_path nor uid"),
            },
        },
        WebhookEntity::Page => match payload.field("identifier") {
            Some(identifier) => from_result(SitePath::with_prefix("/", &identifier)),
            None => Translation::note("page webhook carries no identifier"),
        },
        WebhookEntity::Menu | WebhookEntity::Layout => Translation::note(format!(
            "`{}` changes require full-site revalidation",
            payload.entity
        )),
        WebhookEntity::Unknown(name) => {
            Translation::note(format!("unknown webhook entity `{name}`"))
        }
    };

    debug!(
        target = "storefront::revalidate::translate",
        entity = ?entity,
        action = %payload.action,
        paths = translation.paths.len(),
        "translated webhook"
    );

    translation
}

fn from_result(result: Result<SitePath, DomainError>) -> Translation {
    match result {
        Ok(path) => Translation::path(path),
        Err(err) => Translation::note(err.to_string()),
    }
}
