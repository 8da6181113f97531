//! storefront-revalidate-cli: trigger revalidation from scripts and CI.
#![deny(clippy::all, clippy::pedantic)]

mod args;

use std::process;

use clap::Parser;
use serde::Serialize;
use storefront_client::{ClientError, RevalidateClient};
use thiserror::Error;

use args::{Cli, Commands};

#[derive(Debug, Error)]
enum CliError {
    #[error("site URL is required (use --site or STOREFRONT_SITE_URL)")]
    MissingSite,
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() {
    if let Err(err) = run(Cli::parse()).await {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let site = cli.site.ok_or(CliError::MissingSite)?;
    let client = RevalidateClient::new(&site, cli.secret_env)?;

    match cli.command {
        Commands::Tag { tags } => print_json(&client.revalidate_by_tag(&tags).await?),
        Commands::Path { paths } => print_json(&client.revalidate_by_path(&paths).await?),
        Commands::All => print_json(&client.revalidate_all().await?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}
