use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use listing_desk::api::{HttpListingApi, ListingQuery};
use listing_desk::config::AppConfig;
use listing_desk::form::{derive_slug, render, visible_fields, FormStore};
use listing_desk::models::{ClosedSet, Purpose};
use listing_desk::server::ListingServer;
use listing_desk::store::ListingCollection;
use listing_desk::submit::{LogNotifier, SubmissionWorkflow, SubmitOutcome};
use listing_desk::summary::{CacheNavigator, FavoritesStore, FileFavorites, ListingCache, ListingSummary};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "listing-desk", version, about = "Add and browse property listings")]
struct Cli {
    /// Configuration file (defaults to ./listing-desk.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the listing endpoint
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Check a listing document without sending it
    Validate { file: PathBuf },
    /// Validate a listing document and send it to the endpoint
    Submit { file: PathBuf },
    /// Show listing summaries
    List {
        #[arg(long, value_parser = parse_purpose)]
        purpose: Option<Purpose>,
    },
    /// Toggle a listing in the local favorites
    Favorite { id: String },
    /// Print the slug derived from a title
    Slug { title: String },
}

fn parse_purpose(value: &str) -> Result<Purpose, String> {
    Purpose::parse(value).ok_or_else(|| format!("expected one of {}", Purpose::expected()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            ListingServer::new(config.server, ListingCollection::new())
                .start()
                .await
        }
        Command::Validate { file } => validate(&file),
        Command::Submit { file } => submit(&config, &file).await,
        Command::List { purpose } => list(&config, purpose).await,
        Command::Favorite { id } => {
            let favorites = FileFavorites::new(&config.favorites.path);
            let favorite = favorites.toggle(&id).context("Failed to update favorites")?;
            println!("{} {}", if favorite { "♥" } else { "♡" }, id);
            Ok(())
        }
        Command::Slug { title } => {
            println!("{}", derive_slug(&title));
            Ok(())
        }
    }
}

fn load_form(path: &Path) -> Result<FormStore> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let values: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(FormStore::from_values(values))
}

fn print_form(form: &FormStore) {
    for path in visible_fields(form) {
        if let Some(view) = render(form, &path) {
            println!("{view}");
        }
    }
}

fn validate(path: &Path) -> Result<()> {
    let mut form = load_form(path)?;
    match form.validate() {
        Ok(payload) => {
            info!("✅ '{}' is valid", payload.listing.title);
            Ok(())
        }
        Err(errors) => {
            print_form(&form);
            bail!("{} field(s) failed validation", errors.len())
        }
    }
}

async fn submit(config: &AppConfig, path: &Path) -> Result<()> {
    let mut form = load_form(path)?;
    let api = HttpListingApi::new(&config.api)?;
    let navigator = CacheNavigator::new(Arc::new(ListingCache::new()));
    let workflow = SubmissionWorkflow::new(api, LogNotifier, navigator);

    match workflow.submit(&mut form).await {
        SubmitOutcome::Created(listing) => {
            println!("{} -> {}", listing.slug, workflow.navigator().current_route());
            Ok(())
        }
        SubmitOutcome::Invalid(errors) => {
            print_form(&form);
            bail!("{} field(s) failed validation", errors.len())
        }
        SubmitOutcome::Failed(message) => bail!(message),
        SubmitOutcome::Ignored => Ok(()),
    }
}

async fn list(config: &AppConfig, purpose: Option<Purpose>) -> Result<()> {
    let api = HttpListingApi::new(&config.api)?;
    let favorites = FileFavorites::new(&config.favorites.path);
    let query = ListingQuery {
        purpose,
        ..ListingQuery::default()
    };

    let listings = ListingCache::new()
        .listings(&api, &query)
        .await
        .with_context(|| format!("Failed to fetch listings from {}", config.api.base_url))?;
    info!("Found {} listings", listings.len());

    for (i, listing) in listings.iter().enumerate() {
        let summary = ListingSummary::from_listing(listing, &favorites)?;
        println!("{}. {}", i + 1, summary);
        println!();
    }
    Ok(())
}
