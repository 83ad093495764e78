//! Restaurants CLI - browse and review restaurants with an offline cache
//!
//! Listings fall back to the local store when the backend is unreachable, and
//! reviews can be queued for a later `sync`.

mod cli;
mod commands;
mod error;

use clap::Parser;

use crate::cli::{AssetsCommands, Cli, Commands};
use crate::commands::assets::{run_assets_buckets, run_assets_fetch, run_assets_install};
use crate::commands::common::Session;
use crate::commands::completions::run_completions;
use crate::commands::restaurants::{
    run_cuisines, run_favorite, run_list, run_neighborhoods, run_show,
};
use crate::commands::reviews::{run_pending, run_review, run_sync};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let directive = "restaurant=info"
        .parse()
        .map_err(|error| CliError::Config(format!("invalid log directive: {error}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Completions { shell, output } = &cli.command {
        return run_completions(*shell, output.as_deref());
    }

    let session = Session::open(cli.db_path, cli.api_url).await?;

    match cli.command {
        Commands::List {
            cuisine,
            neighborhood,
            json,
        } => run_list(&session, &cuisine, &neighborhood, json).await?,
        Commands::Show { id, json } => run_show(&session, id, json).await?,
        Commands::Neighborhoods => run_neighborhoods(&session).await?,
        Commands::Cuisines => run_cuisines(&session).await?,
        Commands::Favorite { id, unset } => run_favorite(&session, id, !unset).await?,
        Commands::Review {
            id,
            name,
            rating,
            comments,
            defer,
        } => run_review(&session, id, &name, rating, &comments, defer).await?,
        Commands::Pending { json } => run_pending(&session, json).await?,
        Commands::Sync => run_sync(&session).await?,
        Commands::Assets { command } => match command {
            AssetsCommands::Install { manifest } => {
                run_assets_install(&session, manifest.as_deref()).await?;
            }
            AssetsCommands::Fetch { url, output } => {
                run_assets_fetch(&session, &url, output.as_deref()).await?;
            }
            AssetsCommands::Buckets => run_assets_buckets(&session).await?,
        },
        Commands::Completions { .. } => {}
    }

    Ok(())
}
