use std::collections::HashMap;
use std::io::Write;

use super::*;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_are_valid() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
    assert!(settings.revalidation.secret.is_none());
    assert_eq!(settings.revalidation.site_url.as_str(), "http://127.0.0.1:3000/");
    assert_eq!(settings.revalidation.hook_path, DEFAULT_HOOK_PATH);
    assert_eq!(
        settings.revalidation.request_timeout,
        Duration::from_millis(DEFAULT_REVALIDATE_TIMEOUT_MS)
    );
    assert_eq!(settings.storefront.default_locale, "default");
    assert_eq!(settings.storefront.locales.len(), 1);
    assert!(settings.storefront.features.webhook);
    assert!(!settings.storefront.features.revalidate_all);
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());
    raw.revalidation.site_url = Some("https://file.example".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        site_url: Some("https://cli.example".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.revalidation.site_url.host_str(), Some("cli.example"));
}

#[test]
fn legacy_env_fills_missing_values() {
    let mut raw = RawSettings::default();
    raw.apply_legacy_env(lookup(&[
        ("REVALIDATE_SECRET", "s3cret"),
        ("NEXT_PUBLIC_SITE_URL", "https://shop.example"),
    ]));
    let settings = Settings::from_raw(raw).expect("valid settings");

    let secret = settings.revalidation.secret.expect("secret configured");
    assert!(secret.matches("s3cret"));
    assert_eq!(settings.revalidation.site_url.host_str(), Some("shop.example"));
}

#[test]
fn legacy_env_does_not_override_layered_values() {
    let mut raw = RawSettings::default();
    raw.revalidation.secret = Some("from-file".to_string());
    raw.revalidation.site_url = Some("https://file.example".to_string());
    raw.apply_legacy_env(lookup(&[
        ("REVALIDATE_SECRET", "from-env"),
        ("NEXT_PUBLIC_SITE_URL", "https://env.example"),
    ]));
    let settings = Settings::from_raw(raw).expect("valid settings");

    let secret = settings.revalidation.secret.expect("secret configured");
    assert!(secret.matches("from-file"));
    assert!(!secret.matches("from-env"));
    assert_eq!(settings.revalidation.site_url.host_str(), Some("file.example"));
}

#[test]
fn platform_host_is_used_without_site_url() {
    let mut raw = RawSettings::default();
    raw.apply_legacy_env(lookup(&[("VERCEL_URL", "shop-abc.vercel.app")]));
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(
        settings.revalidation.site_url.as_str(),
        "https://shop-abc.vercel.app/"
    );
}

#[test]
fn blank_secret_leaves_endpoints_open() {
    let mut raw = RawSettings::default();
    raw.revalidation.secret = Some("   ".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.revalidation.secret.is_none());
}

#[test]
fn secret_debug_output_is_redacted() {
    let secret = RevalidateSecret::new("hunter2").expect("secret");
    assert_eq!(format!("{secret:?}"), "RevalidateSecret(***)");
    assert!(!secret.matches("hunter"));
    assert!(!secret.matches(""));
}

#[test]
fn revalidate_all_requires_graphql_url() {
    let mut raw = RawSettings::default();
    raw.storefront.features.revalidate_all = Some(true);
    let err = Settings::from_raw(raw).expect_err("missing graphql url");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "storefront.features.revalidate_all",
            ..
        }
    ));
}

#[test]
fn rejects_zero_timeout_and_bad_urls() {
    let mut raw = RawSettings::default();
    raw.revalidation.request_timeout_ms = Some(0);
    assert!(Settings::from_raw(raw).is_err());

    let mut raw = RawSettings::default();
    raw.revalidation.site_url = Some("ftp://shop.example".to_string());
    assert!(Settings::from_raw(raw).is_err());

    let mut raw = RawSettings::default();
    raw.revalidation.hook_path = Some("revalidate".to_string());
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn default_locale_must_be_configured() {
    let mut raw = RawSettings::default();
    raw.storefront.default_locale = Some("fr".to_string());
    raw.storefront.locales = vec![RawLocaleSettings {
        code: "en".to_string(),
        store_code: None,
    }];
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn duplicate_locales_are_rejected() {
    let mut raw = RawSettings::default();
    raw.storefront.locales = vec![
        RawLocaleSettings {
            code: "en".to_string(),
            store_code: None,
        },
        RawLocaleSettings {
            code: "en".to_string(),
            store_code: Some("en_us".to_string()),
        },
    ];
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn loads_storefront_from_config_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    write!(
        file,
        r#"
[revalidation]
site_url = "https://shop.example"
secret = "file-secret"

[catalog]
graphql_url = "https://magento.example/graphql"
page_size = 50

[storefront]
default_locale = "en"

[[storefront.locales]]
code = "en"
store_code = "default"

[[storefront.locales]]
code = "de"

[storefront.features]
revalidate_all = true
"#
    )
    .expect("write config");

    let cli = CliArgs::parse_from([
        "storefront-revalidate",
        "--config-file",
        file.path().to_str().expect("utf-8 path"),
        "check-config",
    ]);
    let settings = load(&cli).expect("settings load");

    assert_eq!(settings.storefront.default_locale, "en");
    assert_eq!(
        settings.storefront.locales,
        vec![
            LocaleSettings {
                code: "en".to_string(),
                store_code: "default".to_string(),
            },
            LocaleSettings {
                code: "de".to_string(),
                store_code: "de".to_string(),
            },
        ]
    );
    assert!(settings.storefront.features.revalidate_all);
    assert_eq!(settings.catalog.page_size.get(), 50);
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["storefront-revalidate"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "storefront-revalidate",
        "serve",
        "--server-port",
        "8080",
        "--log-json",
        "true",
        "--revalidate-timeout-ms",
        "2500",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_port, Some(8080));
            assert_eq!(serve.overrides.log_json, Some(true));
            assert_eq!(serve.overrides.revalidate_timeout_ms, Some(2500));
        }
        _ => panic!("wrong command parsed"),
    }
}
