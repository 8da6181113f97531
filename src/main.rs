use std::{process, sync::Arc};

use storefront_revalidate::{
    application::{
        catalog::{StaticPathSource, UnconfiguredCatalog},
        error::AppError,
        revalidate::RevalidationService,
    },
    config,
    infra::{
        catalog::GraphqlCatalog,
        error::InfraError,
        http::{self, HttpState},
        revalidator::HttpRevalidator,
        telemetry,
    },
    revalidation::Dispatcher,
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    match command {
        config::Command::Serve(_) => {
            telemetry::init(&settings.logging)?;
            run_serve(settings).await
        }
        config::Command::CheckConfig(_) => {
            print_config_summary(&settings);
            Ok(())
        }
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let revalidator = HttpRevalidator::new(&settings.revalidation)?;
    let dispatcher = Dispatcher::new(
        Arc::new(revalidator.clone()),
        settings.revalidation.request_timeout,
    );

    let catalog: Arc<dyn StaticPathSource> = match settings.catalog.graphql_url.clone() {
        Some(endpoint) => Arc::new(GraphqlCatalog::new(endpoint, &settings.catalog)?),
        None => Arc::new(UnconfiguredCatalog),
    };

    let service = RevalidationService::new(
        dispatcher,
        catalog,
        settings.storefront.locales.clone(),
    );
    let state = HttpState::new(service, settings.revalidation.secret.clone());
    let router = http::build_router(state, settings.storefront.features);

    if settings.revalidation.secret.is_none() {
        warn!(
            target = "storefront::serve",
            "no revalidation secret configured; endpoints are open"
        );
    }

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "storefront::serve",
        addr = %settings.server.addr,
        hook = %revalidator.endpoint(),
        webhook = settings.storefront.features.webhook,
        revalidate_all = settings.storefront.features.revalidate_all,
        locales = settings.storefront.locales.len(),
        "revalidation service listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    info!(target = "storefront::serve", "revalidation service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(
            target = "storefront::serve",
            error = %err,
            "failed to listen for shutdown signal"
        );
        std::future::pending::<()>().await;
    }
}

fn print_config_summary(settings: &config::Settings) {
    println!("server.addr = {}", settings.server.addr);
    println!("logging.level = {}", settings.logging.level);
    println!(
        "revalidation.secret = {}",
        if settings.revalidation.secret.is_some() {
            "<set>"
        } else {
            "<unset>"
        }
    );
    println!("revalidation.site_url = {}", settings.revalidation.site_url);
    println!("revalidation.hook_path = {}", settings.revalidation.hook_path);
    println!(
        "revalidation.request_timeout_ms = {}",
        settings.revalidation.request_timeout.as_millis()
    );
    println!(
        "catalog.graphql_url = {}",
        settings
            .catalog
            .graphql_url
            .as_ref()
            .map_or("<unset>", |url| url.as_str())
    );
    println!(
        "storefront.default_locale = {}",
        settings.storefront.default_locale
    );
    for locale in &settings.storefront.locales {
        println!(
            "storefront.locale = {} (store {})",
            locale.code, locale.store_code
        );
    }
    println!(
        "storefront.features.webhook = {}",
        settings.storefront.features.webhook
    );
    println!(
        "storefront.features.revalidate_all = {}",
        settings.storefront.features.revalidate_all
    );
}
