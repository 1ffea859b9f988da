//! CLI administration tool for insighthub.
//!
//! Provides commands for verifying provider credentials, probing data
//! sources, and inspecting the usage ledger without going through the
//! HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Verify a provider credential with a live one-result search
//! cargo run --bin admin -- key check foursquare
//!
//! # List registered sources
//! cargo run --bin admin -- sources list
//!
//! # Probe every source (spends budget on real providers)
//! cargo run --bin admin -- sources test
//!
//! # Show the usage ledger
//! cargo run --bin admin -- budget show
//!
//! # Reset the usage ledger
//! cargo run --bin admin -- budget reset
//! ```
//!
//! # Environment Variables
//!
//! Reads the same `.env` contract as the server (`SECRET_KEY` required,
//! provider keys optional).

use insighthub::application::budget::BudgetTracker;
use insighthub::application::services::CollectorService;
use insighthub::config::{self, Config};
use insighthub::domain::entities::SourceId;
use insighthub::domain::sources::PlaceSource;
use insighthub::infrastructure::cache::NullCache;
use insighthub::infrastructure::http::build_client;
use insighthub::infrastructure::sources::{
    FoursquareSource, GooglePlacesSource, MockSource, YelpSource,
};
use insighthub::utils::secrets::{fingerprint_api_key, mask_string};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;
use std::time::Duration;

/// CLI tool for managing insighthub.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Provider credential operations
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Data source operations
    Sources {
        #[command(subcommand)]
        action: SourcesAction,
    },

    /// Usage ledger operations
    Budget {
        #[command(subcommand)]
        action: BudgetAction,
    },
}

/// Credential subcommands.
#[derive(Subcommand)]
enum KeyAction {
    /// Verify a provider key with a live one-result search
    Check {
        /// Provider name: foursquare, yelp, or google_places
        provider: String,
    },
}

/// Source subcommands.
#[derive(Subcommand)]
enum SourcesAction {
    /// List sources that would register with the current environment
    List,

    /// Probe every source with a minimal search
    Test {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Ledger subcommands.
#[derive(Subcommand)]
enum BudgetAction {
    /// Print the current usage summary
    Show,

    /// Clear all usage data
    Reset {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Key { action } => handle_key_action(action, &config).await?,
        Commands::Sources { action } => handle_sources_action(action, &config).await?,
        Commands::Budget { action } => handle_budget_action(action, &config)?,
    }

    Ok(())
}

/// Builds a tracker over the configured ledger.
///
/// `force_mock` is always off here so that explicit CLI probes reach the
/// real providers even when the server runs in mock mode.
fn tracker(config: &Config) -> Arc<BudgetTracker> {
    Arc::new(BudgetTracker::load(
        &config.budget_file,
        config.max_requests_per_day,
        config.max_total_cost,
        false,
    ))
}

/// Builds one provider client from the environment.
fn build_source(
    provider: SourceId,
    config: &Config,
    budget: Arc<BudgetTracker>,
) -> Result<Arc<dyn PlaceSource>> {
    let client = build_client(Duration::from_secs(15))?;

    let missing = |name: &str| format!("{} is not set (check your .env file)", name);

    let source: Arc<dyn PlaceSource> = match provider {
        SourceId::Foursquare => {
            let key = config
                .foursquare_api_key
                .clone()
                .context(missing("FOURSQUARE_API_KEY"))?;
            Arc::new(FoursquareSource::new(client, key, budget, config.upstream_rpm)?)
        }
        SourceId::Yelp => {
            let key = config
                .yelp_api_key
                .clone()
                .context(missing("YELP_API_KEY"))?;
            Arc::new(YelpSource::new(client, key, budget, config.upstream_rpm)?)
        }
        SourceId::GooglePlaces => {
            let key = config
                .google_places_api_key
                .clone()
                .context(missing("GOOGLE_PLACES_API_KEY"))?;
            Arc::new(GooglePlacesSource::new(client, key, budget, config.upstream_rpm)?)
        }
        SourceId::Mock => Arc::new(MockSource::new()),
    };

    Ok(source)
}

/// Builds a collector over every source the environment can register.
fn build_collector(config: &Config) -> Result<CollectorService> {
    let budget = tracker(config);
    let mut sources: Vec<Arc<dyn PlaceSource>> = vec![Arc::new(MockSource::new())];

    for (id, key) in [
        (SourceId::Foursquare, &config.foursquare_api_key),
        (SourceId::Yelp, &config.yelp_api_key),
        (SourceId::GooglePlaces, &config.google_places_api_key),
    ] {
        if key.is_some() {
            match build_source(id, config, budget.clone()) {
                Ok(source) => sources.push(source),
                Err(e) => println!("{} {}: {}", "✗".red(), id, e),
            }
        }
    }

    Ok(CollectorService::new(sources, Arc::new(NullCache::new())))
}

/// Dispatches credential commands.
async fn handle_key_action(action: KeyAction, config: &Config) -> Result<()> {
    match action {
        KeyAction::Check { provider } => check_key(&provider, config).await?,
    }

    Ok(())
}

/// Verifies one provider credential with a live probe search.
async fn check_key(provider: &str, config: &Config) -> Result<()> {
    let id: SourceId = provider
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    if !id.is_real() {
        bail!("'{}' has no credential to check", id);
    }

    let key = match id {
        SourceId::Foursquare => config.foursquare_api_key.as_deref(),
        SourceId::Yelp => config.yelp_api_key.as_deref(),
        SourceId::GooglePlaces => config.google_places_api_key.as_deref(),
        SourceId::Mock => None,
    }
    .context("API key is not configured")?;

    println!(
        "Checking {} key {}...",
        id.to_string().bold(),
        mask_string(key, 4).dimmed()
    );

    let source = build_source(id, config, tracker(config))?;

    match source.probe().await {
        Ok(count) => {
            println!("{} Key is valid ({} test results)", "✓".green().bold(), count);
            println!(
                "  fingerprint: {}",
                fingerprint_api_key(key, &config.secret_key).dimmed()
            );
        }
        Err(e) => {
            println!("{} Key check failed: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Dispatches source commands.
async fn handle_sources_action(action: SourcesAction, config: &Config) -> Result<()> {
    match action {
        SourcesAction::List => {
            let collector = build_collector(config)?;

            println!("{}", "Registered sources:".bold());
            for info in collector.source_info() {
                let marker = if info.name == collector.primary() {
                    "(primary)".cyan().to_string()
                } else {
                    String::new()
                };
                println!(
                    "  {} {} - {} {}",
                    "•".green(),
                    info.name.to_string().bold(),
                    info.description,
                    marker
                );
            }
        }
        SourcesAction::Test { yes } => {
            if !yes {
                let proceed = Confirm::new()
                    .with_prompt("Probing real sources spends API budget. Continue?")
                    .default(false)
                    .interact()?;
                if !proceed {
                    println!("Aborted.");
                    return Ok(());
                }
            }

            let collector = build_collector(config)?;

            for outcome in collector.probe_all().await {
                match outcome.status {
                    "connected" => println!(
                        "{} {} - connected ({} results)",
                        "✓".green(),
                        outcome.source.to_string().bold(),
                        outcome.count.unwrap_or(0)
                    ),
                    _ => println!(
                        "{} {} - {}",
                        "✗".red(),
                        outcome.source.to_string().bold(),
                        outcome
                            .error
                            .map(|e| e.message)
                            .unwrap_or_else(|| "unknown error".to_string())
                    ),
                }
            }
        }
    }

    Ok(())
}

/// Dispatches ledger commands.
fn handle_budget_action(action: BudgetAction, config: &Config) -> Result<()> {
    let budget = tracker(config);

    match action {
        BudgetAction::Show => {
            let summary = budget.summary();

            println!("{}", "Usage summary".bold());
            println!(
                "  total cost: {} / ${:.2}",
                format!("${:.3}", summary.total_cost).yellow(),
                summary.max_total_cost
            );

            if summary.today_usage.is_empty() {
                println!("  today: {}", "no requests".dimmed());
            } else {
                println!("  today:");
                for (provider, count) in &summary.today_usage {
                    let limit = summary.daily_limits.get(provider).copied().unwrap_or(0);
                    println!("    {} {}/{}", provider.bold(), count, limit);
                }
            }
        }
        BudgetAction::Reset { yes } => {
            if !yes {
                let proceed = Confirm::new()
                    .with_prompt("This clears all usage history. Continue?")
                    .default(false)
                    .interact()?;
                if !proceed {
                    println!("Aborted.");
                    return Ok(());
                }
            }

            budget.reset();
            println!("{} Usage ledger reset", "✓".green().bold());
        }
    }

    Ok(())
}
