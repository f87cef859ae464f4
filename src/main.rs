use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use airgrid::airtable::{api_types, AirtableClient, Connector, FetchOutcome};
use airgrid::cache::{CacheLayer, SqliteStorage};
use airgrid::config::Config;
use airgrid::render;

#[derive(Parser, Debug)]
#[command(name = "airgrid")]
#[command(about = "Fetch, cache, and render Airtable records as embeddable HTML")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/airgrid/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Connection id to use when the config defines more than one
  #[arg(short = 'n', long)]
  connection: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Fetch records (cache-first) and print the HTML fragment
  Render {
    /// Skip the cache read and fetch fresh data
    #[arg(long)]
    bypass_cache: bool,
  },
  /// Test the connection and report the outcome
  Test,
  /// Invalidate the cache entry for this connection's request shape
  Refresh,
  /// Remove every cached entry, printing the count removed
  ClearCache,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  // Logs go to stderr; stdout carries the rendered fragment.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let config = Config::load(args.config.as_deref())?;

  let client = AirtableClient::new()?;
  let storage = SqliteStorage::open()?;
  let connector = Connector::new(client, CacheLayer::new(storage));

  match args.command {
    Command::Render { bypass_cache } => {
      let connection = config.connection(args.connection.as_deref())?;
      let outcome = connector.get_records(connection, bypass_cache).await;
      println!("{}", render::render_fragment(connection, &outcome));
    }
    Command::Test => {
      let connection = config.connection(args.connection.as_deref())?;
      let outcome = connector.test_connection(connection).await;
      print_test_report(&outcome);
    }
    Command::Refresh => {
      let connection = config.connection(args.connection.as_deref())?;
      if connector.invalidate(connection)? {
        println!("Cache entry invalidated; the next render fetches fresh data.");
      } else {
        println!("No cache entry to invalidate.");
      }
    }
    Command::ClearCache => {
      let count = connector.clear_cache()?;
      println!("{} cache entries cleared.", count);
    }
  }

  Ok(())
}

/// Report a connection test, including the attempted URL and the fields
/// discovered across returned records.
fn print_test_report(outcome: &FetchOutcome) {
  if outcome.success {
    println!("Connection OK: {}", outcome.message);
    println!("URL: {}", outcome.url);
    println!("Records: {}", outcome.record_count);

    if let Some(filter) = &outcome.filter {
      println!("Filter: {}", filter.formula);
    }

    let fields = api_types::available_fields(&outcome.records());
    if !fields.is_empty() {
      println!("Fields: {}", fields.join(", "));
    }
  } else {
    println!("Connection failed: {}", outcome.message);
    if !outcome.url.is_empty() {
      println!("URL: {}", outcome.url);
    }
  }
}
