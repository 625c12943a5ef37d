//! LegiScan CLI
//!
//! Thin front end over `legiscan-client`: every subcommand maps to one
//! client operation and prints the result as JSON on stdout. Logging goes
//! to stderr so output stays pipeable.
//!
//! ## Usage
//!
//! ```bash
//! export LEGISCAN_API_KEY=...
//!
//! # Bulk load a session, then keep it current
//! legiscan load-dataset --state TX --year 2023
//! legiscan sync-bills 2049
//!
//! # Individual lookups
//! legiscan bill 1748750
//! legiscan masterlist 2049
//! ```

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use legiscan_client::{ClientConfig, LegiscanCache, LegiscanClient, Result};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "legiscan",
    version,
    about = "Caching client for the LegiScan legislative data API"
)]
struct Cli {
    /// LegiScan API key
    #[arg(long, env = "LEGISCAN_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Cache directory (defaults to a per-user data directory)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Time-to-live in seconds for refreshable operations
    #[arg(long)]
    ttl_secs: Option<u64>,

    /// Disable response caching entirely
    #[arg(long)]
    no_cache: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch bill detail by bill id
    Bill { id: i32 },
    /// Fetch a bill text document by doc id
    BillText { doc_id: i32 },
    /// Fetch a legislator record by people id
    Person { id: i32 },
    /// Fetch roll-call vote detail by roll call id
    RollCall { id: i32 },
    /// Fetch amendment text by amendment id
    Amendment { id: i32 },
    /// Fetch a supplemental document by supplement id
    Supplement { id: i32 },
    /// Fetch the bill masterlist for a session
    Masterlist { session_id: i32 },
    /// List available sessions, optionally for one state
    Sessions {
        #[arg(long)]
        state: Option<String>,
    },
    /// List downloadable session datasets
    Datasets {
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Full-text search against the national database
    Search {
        query: String,
        #[arg(long, default_value = "ALL")]
        state: String,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        page: Option<i32>,
    },
    /// Bulk load a session dataset archive into the cache
    LoadDataset {
        #[arg(long)]
        state: String,
        #[arg(long)]
        year: i32,
        /// Load the special session instead of the regular one
        #[arg(long)]
        special: bool,
    },
    /// Re-fetch every bill whose masterlist change hash differs from the
    /// cached copy
    SyncBills { session_id: i32 },
}

fn main() {
    // Log to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "legiscan_client=info,legiscan=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::new(cli.api_key);
    if let Some(dir) = cli.cache_dir {
        config = config.with_cache_dir(dir);
    }
    if let Some(ttl_secs) = cli.ttl_secs {
        config = config.with_cache_ttl_secs(ttl_secs);
    }
    if cli.no_cache {
        config = config.with_cache_disabled();
    }

    let client = LegiscanClient::new(config)?;
    tracing::debug!(cache = client.cache().name(), "client ready");

    match cli.command {
        Command::Bill { id } => print_json(&client.fetch_bill(id)?),
        Command::BillText { doc_id } => print_json(&client.fetch_bill_text(doc_id)?),
        Command::Person { id } => print_json(&client.fetch_person(id)?),
        Command::RollCall { id } => print_json(&client.fetch_roll_call(id)?),
        Command::Amendment { id } => print_json(&client.fetch_amendment(id)?),
        Command::Supplement { id } => print_json(&client.fetch_supplement(id)?),
        Command::Masterlist { session_id } => print_json(&client.fetch_masterlist(session_id)?),
        Command::Sessions { state } => print_json(&client.fetch_session_list(state.as_deref())?),
        Command::Datasets { state, year } => {
            print_json(&client.fetch_dataset_list(state.as_deref(), year)?)
        }
        Command::Search {
            query,
            state,
            year,
            page,
        } => print_json(&client.search(&state, &query, year, page)?),
        Command::LoadDataset {
            state,
            year,
            special,
        } => {
            let contents = client.load_dataset_for(&state, year, special)?;
            print_json(&LoadSummary {
                people: contents.people.len(),
                bills: contents.bills.len(),
                votes: contents.votes.len(),
            })
        }
        Command::SyncBills { session_id } => print_json(&client.sync_bills(session_id)?),
    }
}

/// Counts reported after a bulk load
#[derive(Serialize)]
struct LoadSummary {
    people: usize,
    bills: usize,
    votes: usize,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
