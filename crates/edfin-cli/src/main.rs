//! `edfin`: query the school district finance panel from the terminal.
//!
//! # Usage
//!
//! ```
//! edfin data --yr 2020:2022 --geo KY,TN --cpi-adj 2022 --format ndjson
//! edfin vars --dataset-type full --category expenditure
//! edfin cache
//! edfin serve --config ~/.config/edfin/edfin.toml
//! ```

mod output;
mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, Result};
use chrono::{DateTime, TimeDelta, Utc};
use clap::{Parser, Subcommand};
use edfin_cache::CacheDir;
use edfin_core::{
  DatasetType, FetchOptions, FinanceQuery, get_finance_data, get_valid_state_codes,
  list_variables,
};
use output::{Format, write_table};
use settings::Settings;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "edfin", version, about = "School district finance panel")]
struct Args {
  /// Path to a TOML config file; missing files are ignored.
  #[arg(short, long, value_name = "FILE", default_value = "edfin.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Fetch finance rows, filtered and optionally CPI-adjusted.
  Data {
    /// `all`, a year such as `2019`, or a range such as `2015:2020`.
    #[arg(long, default_value = "all")]
    yr:           String,
    /// `all` or comma-separated state codes, e.g. `KY,TN`.
    #[arg(long, default_value = "all")]
    geo:          String,
    /// `skinny` or `full`.
    #[arg(long, default_value = "skinny")]
    dataset_type: String,
    /// `none` or a baseline school year whose dollars to express values in.
    #[arg(long, default_value = "none")]
    cpi_adj:      String,
    /// Download the artifact even if the cached copy is current.
    #[arg(long)]
    refresh:      bool,
    /// Suppress progress notices.
    #[arg(short, long)]
    quiet:        bool,
    /// Write to FILE instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output:       Option<PathBuf>,
    #[arg(long, value_enum, default_value_t)]
    format:       Format,
  },

  /// List the variables available in a dataset variant.
  Vars {
    #[arg(long, default_value = "skinny")]
    dataset_type: String,
    /// A category such as `revenue`, or `all`.
    #[arg(long, default_value = "all")]
    category:     String,
    #[arg(long, value_enum, default_value_t)]
    format:       Format,
  },

  /// Print the 51 valid state codes.
  States,

  /// Show the cache directory and the age of each cached artifact.
  Cache,

  /// Serve the JSON API over HTTP.
  Serve,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();
  let settings = Settings::load(&args.config)?;

  match args.command {
    Command::Data {
      yr,
      geo,
      dataset_type,
      cpi_adj,
      refresh,
      quiet,
      output,
      format,
    } => {
      // Validate before building anything that touches disk or network.
      let query = FinanceQuery::parse(&yr, &geo, &dataset_type, &cpi_adj)?;
      let store = settings.store()?;
      let table = get_finance_data(&store, &query, FetchOptions { refresh, quiet })
        .await
        .context("query failed")?;
      write_table(&table, format, output.as_deref())?;
    }

    Command::Vars {
      dataset_type,
      category,
      format,
    } => {
      let table = list_variables(&dataset_type, &category)?;
      write_table(&table, format, None)?;
    }

    Command::States => {
      for code in get_valid_state_codes() {
        println!("{code}");
      }
    }

    Command::Cache => show_cache(&settings).await?,

    Command::Serve => serve(&settings).await?,
  }

  Ok(())
}

// ─── Subcommands ──────────────────────────────────────────────────────────────

async fn show_cache(settings: &Settings) -> Result<()> {
  let dir = settings.cache_dir()?;
  println!("cache directory: {}", dir.root().display());
  for line in cache_report(&dir, settings.max_age()?, Utc::now()).await? {
    println!("{line}");
  }
  Ok(())
}

/// One line per dataset variant. Freshness is decided by the cache directory
/// itself, so this agrees with what a query would do.
async fn cache_report(
  dir: &CacheDir,
  max_age: TimeDelta,
  now: DateTime<Utc>,
) -> Result<Vec<String>> {
  let entries = dir
    .entries()
    .await
    .context("failed to read cache directory")?;

  let mut lines = Vec::new();
  for dataset in DatasetType::ALL {
    let name = dataset.cache_name();
    let Some(entry) = entries.iter().find(|e| e.name == name) else {
      lines.push(format!("{name:<14} missing"));
      continue;
    };
    let current = dir
      .is_current_at(name, max_age, now)
      .await
      .context("failed to read cache directory")?;
    let state = if current { "current" } else { "stale" };
    lines.push(format!(
      "{name:<14} {state:<8} {:>4} days old  {}",
      (now - entry.modified).num_days(),
      entry.path.display()
    ));
  }
  Ok(lines)
}

async fn serve(settings: &Settings) -> Result<()> {
  let store = Arc::new(settings.store()?);
  let app = edfin_api::api_router(store).layer(TraceLayer::new_for_http());

  let address = settings.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}
