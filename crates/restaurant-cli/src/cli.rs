use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use restaurant_core::RestaurantId;

#[derive(Parser)]
#[command(name = "restaurants")]
#[command(about = "Browse and review restaurants, online or off")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local store file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Backend base URL (overrides RESTAURANTS_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List restaurants
    #[command(alias = "ls")]
    List {
        /// Only show this cuisine ("all" for any)
        #[arg(long, default_value = "all")]
        cuisine: String,
        /// Only show this neighborhood ("all" for any)
        #[arg(long, default_value = "all")]
        neighborhood: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one restaurant with its reviews
    Show {
        /// Restaurant ID
        id: RestaurantId,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List distinct neighborhoods
    Neighborhoods,
    /// List distinct cuisines
    Cuisines,
    /// Mark a restaurant as favorite
    Favorite {
        /// Restaurant ID
        id: RestaurantId,
        /// Clear the favorite flag instead
        #[arg(long)]
        unset: bool,
    },
    /// Write a review
    Review {
        /// Restaurant ID
        id: RestaurantId,
        /// Author name
        #[arg(long)]
        name: String,
        /// Rating from 1 to 5
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,
        /// Review text
        #[arg(long)]
        comments: String,
        /// Queue the review for the next `sync` instead of posting it now
        #[arg(long)]
        defer: bool,
    },
    /// List reviews waiting for delivery
    Pending {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Deliver queued reviews
    Sync,
    /// Manage the static asset cache
    Assets {
        #[command(subcommand)]
        command: AssetsCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum AssetsCommands {
    /// Download the asset manifest and retire older cache generations
    Install {
        /// JSON manifest to use instead of the built-in one
        #[arg(long, value_name = "PATH")]
        manifest: Option<PathBuf>,
    },
    /// Fetch an asset, cache first
    Fetch {
        /// Asset URL or path relative to the app origin
        url: String,
        /// Write the body here (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// List cache buckets and their entry counts
    Buckets,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
