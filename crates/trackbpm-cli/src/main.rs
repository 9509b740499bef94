// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};
use trackbpm_application::AppState;
use trackbpm_config::load as load_config;
use trackbpm_spotify::TrackQuery;

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Look up a song's tempo, key and duration
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "TRACKBPM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up BPM, key and duration for one track
    Lookup {
        /// Artist name
        artist: String,
        /// Track title
        title: String,
    },
    /// Look up a track given as "artist - title"
    Search { query: String },
    /// Full analysis (metadata, album art, optional description) for "artist - title"
    Analyze {
        query: String,
        /// Include a generated description
        #[arg(long)]
        describe: bool,
    },
    /// Analyse the configured trending songs
    Trending,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = init_tracing();

    let config = load_config(cli.config.as_deref())?;
    if let Some(filter) = filter {
        filter
            .reload(EnvFilter::new(&config.telemetry.log_level))
            .context("failed to apply configured log level")?;
    }

    let state = AppState::new(config)?;
    state.on_start();

    match cli.command {
        Command::Lookup { artist, title } => {
            let metadata = state.spotify.lookup(&artist, &title).await?;
            print_json(&metadata)?;
        }
        Command::Search { query } => {
            let query = TrackQuery::parse(&query)?;
            let metadata = state.spotify.lookup_query(&query).await?;
            print_json(&metadata)?;
        }
        Command::Analyze { query, describe } => {
            let query = TrackQuery::parse(&query)?;
            let analysis = state.analysis().analyze(&query, describe).await?;
            print_json(&analysis)?;
        }
        Command::Trending => {
            let analyses = state
                .analysis()
                .trending(&state.config.trending.songs)
                .await;
            info!(target: "cli", count = analyses.len(), "trending songs analysed");
            print_json(&analyses)?;
        }
    }

    Ok(())
}

/// Install the subscriber before configuration is read so config events are kept.
///
/// `RUST_LOG` wins when set. Otherwise logging starts at `info` and the returned
/// handle swaps in the configured level once it is known.
fn init_tracing() -> Option<FilterHandle> {
    match EnvFilter::try_from_default_env() {
        Ok(env_filter) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .init();
            None
        }
        Err(_) => {
            let (env_filter, handle) = startup_filter();
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .init();
            Some(handle)
        }
    }
}

fn startup_filter() -> (reload::Layer<EnvFilter, Registry>, FilterHandle) {
    reload::Layer::new(EnvFilter::new("info"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{}", rendered);
    Ok(())
}
