//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{collections::HashSet, fmt, net::SocketAddr, num::NonZeroU32, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

mod cli;

pub use cli::*;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "storefront";
const ENV_PREFIX: &str = "STOREFRONT";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3100;
const DEFAULT_SITE_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_HOOK_PATH: &str = "/api/internal/revalidate-path";
const DEFAULT_REVALIDATE_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_CATALOG_PAGE_SIZE: u32 = 100;
const DEFAULT_CATALOG_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_LOCALE: &str = "default";

const LEGACY_SECRET_VAR: &str = "REVALIDATE_SECRET";
const LEGACY_SITE_URL_VAR: &str = "NEXT_PUBLIC_SITE_URL";
const PLATFORM_HOST_VAR: &str = "VERCEL_URL";

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub revalidation: RevalidationSettings,
    pub catalog: CatalogSettings,
    pub storefront: StorefrontSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct RevalidationSettings {
    /// When unset, the revalidation endpoints are open.
    pub secret: Option<RevalidateSecret>,
    pub site_url: Url,
    pub hook_path: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub graphql_url: Option<Url>,
    pub page_size: NonZeroU32,
    pub request_timeout: Duration,
}

/// Static description of the storefront's locales and feature flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontSettings {
    pub default_locale: String,
    pub locales: Vec<LocaleSettings>,
    pub features: FeatureFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSettings {
    pub code: String,
    /// Store view code sent to the commerce backend.
    pub store_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    pub webhook: bool,
    pub revalidate_all: bool,
}

/// Shared secret guarding the revalidation endpoints.
#[derive(Clone)]
pub struct RevalidateSecret(String);

impl RevalidateSecret {
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    /// Constant-time comparison against a caller-supplied value.
    pub fn matches(&self, candidate: &str) -> bool {
        self.0.as_bytes().ct_eq(candidate.as_bytes()).into()
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RevalidateSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RevalidateSecret(***)")
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_legacy_env(|key| std::env::var(key).ok());

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::CheckConfig(args)) => raw.apply_serve_overrides(&args.overrides),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    revalidation: RawRevalidationSettings,
    catalog: RawCatalogSettings,
    storefront: RawStorefrontSettings,
}

impl RawSettings {
    /// Fill gaps from the variables the storefront deployment already exports.
    fn apply_legacy_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.revalidation.secret.is_none() {
            self.revalidation.secret = lookup(LEGACY_SECRET_VAR);
        }
        if self.revalidation.site_url.is_none() {
            self.revalidation.site_url = lookup(LEGACY_SITE_URL_VAR)
                .filter(|value| !value.trim().is_empty())
                .or_else(|| {
                    lookup(PLATFORM_HOST_VAR)
                        .filter(|host| !host.trim().is_empty())
                        .map(|host| format!("https://{}", host.trim()))
                });
        }
    }

    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.site_url.as_ref() {
            self.revalidation.site_url = Some(url.clone());
        }
        if let Some(timeout) = overrides.revalidate_timeout_ms {
            self.revalidation.request_timeout_ms = Some(timeout);
        }
        if let Some(url) = overrides.catalog_graphql_url.as_ref() {
            self.catalog.graphql_url = Some(url.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            revalidation,
            catalog,
            storefront,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let revalidation = build_revalidation_settings(revalidation)?;
        let catalog = build_catalog_settings(catalog)?;
        let storefront = build_storefront_settings(storefront)?;

        if storefront.features.revalidate_all && catalog.graphql_url.is_none() {
            return Err(LoadError::invalid(
                "storefront.features.revalidate_all",
                "requires catalog.graphql_url to be configured",
            ));
        }

        Ok(Self {
            server,
            logging,
            revalidation,
            catalog,
            storefront,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    Ok(ServerSettings { addr })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_revalidation_settings(
    revalidation: RawRevalidationSettings,
) -> Result<RevalidationSettings, LoadError> {
    let secret = revalidation.secret.and_then(RevalidateSecret::new);

    let site_url = revalidation
        .site_url
        .unwrap_or_else(|| DEFAULT_SITE_URL.to_string());
    let site_url = parse_http_url(&site_url, "revalidation.site_url")?;

    let hook_path = revalidation
        .hook_path
        .map(|path| path.trim().to_string())
        .unwrap_or_else(|| DEFAULT_HOOK_PATH.to_string());
    if !hook_path.starts_with('/') || hook_path.len() < 2 {
        return Err(LoadError::invalid(
            "revalidation.hook_path",
            "must be an absolute path such as `/api/internal/revalidate-path`",
        ));
    }

    let request_timeout = non_zero_millis(
        revalidation
            .request_timeout_ms
            .unwrap_or(DEFAULT_REVALIDATE_TIMEOUT_MS),
        "revalidation.request_timeout_ms",
    )?;

    Ok(RevalidationSettings {
        secret,
        site_url,
        hook_path,
        request_timeout,
    })
}

fn build_catalog_settings(catalog: RawCatalogSettings) -> Result<CatalogSettings, LoadError> {
    let graphql_url = catalog
        .graphql_url
        .filter(|value| !value.trim().is_empty())
        .map(|value| parse_http_url(&value, "catalog.graphql_url"))
        .transpose()?;

    let page_size = catalog.page_size.unwrap_or(DEFAULT_CATALOG_PAGE_SIZE);
    let page_size = NonZeroU32::new(page_size)
        .ok_or_else(|| LoadError::invalid("catalog.page_size", "must be greater than zero"))?;

    let request_timeout = non_zero_millis(
        catalog
            .request_timeout_ms
            .unwrap_or(DEFAULT_CATALOG_TIMEOUT_MS),
        "catalog.request_timeout_ms",
    )?;

    Ok(CatalogSettings {
        graphql_url,
        page_size,
        request_timeout,
    })
}

fn build_storefront_settings(
    storefront: RawStorefrontSettings,
) -> Result<StorefrontSettings, LoadError> {
    let mut locales = Vec::with_capacity(storefront.locales.len());
    let mut seen = HashSet::new();
    for raw in storefront.locales {
        let code = raw.code.trim().to_string();
        if code.is_empty() {
            return Err(LoadError::invalid(
                "storefront.locales",
                "locale code must not be empty",
            ));
        }
        if !seen.insert(code.clone()) {
            return Err(LoadError::invalid(
                "storefront.locales",
                format!("duplicate locale `{code}`"),
            ));
        }
        let store_code = raw
            .store_code
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| code.clone());
        locales.push(LocaleSettings { code, store_code });
    }

    let default_locale = storefront
        .default_locale
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| locales.first().map(|locale| locale.code.clone()))
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string());

    if locales.is_empty() {
        locales.push(LocaleSettings {
            code: default_locale.clone(),
            store_code: default_locale.clone(),
        });
    }

    if !locales.iter().any(|locale| locale.code == default_locale) {
        return Err(LoadError::invalid(
            "storefront.default_locale",
            format!("`{default_locale}` is not one of the configured locales"),
        ));
    }

    let features = FeatureFlags {
        webhook: storefront.features.webhook.unwrap_or(true),
        revalidate_all: storefront.features.revalidate_all.unwrap_or(false),
    };

    Ok(StorefrontSettings {
        default_locale,
        locales,
        features,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRevalidationSettings {
    secret: Option<String>,
    site_url: Option<String>,
    hook_path: Option<String>,
    request_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCatalogSettings {
    graphql_url: Option<String>,
    page_size: Option<u32>,
    request_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStorefrontSettings {
    default_locale: Option<String>,
    locales: Vec<RawLocaleSettings>,
    features: RawFeatureFlags,
}

#[derive(Debug, Clone, Deserialize)]
struct RawLocaleSettings {
    code: String,
    #[serde(default)]
    store_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawFeatureFlags {
    webhook: Option<bool>,
    revalidate_all: Option<bool>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn parse_http_url(value: &str, key: &'static str) -> Result<Url, LoadError> {
    let url = Url::parse(value.trim())
        .map_err(|err| LoadError::invalid(key, format!("invalid URL `{value}`: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(LoadError::invalid(
            key,
            format!("unsupported scheme `{other}`"),
        )),
    }
}

fn non_zero_millis(value: u64, key: &'static str) -> Result<Duration, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    Ok(Duration::from_millis(value))
}

#[cfg(test)]
mod tests;
