//! Command-line surface for `storefront-revalidate-cli`.

#![deny(clippy::all, clippy::pedantic)]

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "storefront-revalidate-cli",
    version,
    about = "Trigger storefront page revalidation",
    long_about = None
)]
pub struct Cli {
    /// Storefront base URL, e.g. <https://shop.example>
    #[arg(long, env = "STOREFRONT_SITE_URL")]
    pub site: Option<String>,

    /// Shared secret; set it through the environment to keep it out of shell history
    #[arg(long = "secret", hide = true, env = "REVALIDATE_SECRET")]
    pub secret_env: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Revalidate the pages behind cache tags such as `product:SKU`
    Tag {
        #[arg(required = true, num_args = 1..)]
        tags: Vec<String>,
    },
    /// Revalidate explicit site paths
    Path {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<String>,
    },
    /// Revalidate every product and category page
    All,
}
