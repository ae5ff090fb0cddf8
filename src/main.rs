use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use nw_compass::api::{build_report, run_http_server};
use nw_compass::config::{ConfigResult, load_config_file, validate};
use nw_compass::core::LifeConfig;
use nw_compass::store::SnapshotStore;

#[derive(Parser, Debug)]
#[command(author, version, about = "Household net worth projection with milestones and alerts")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API.
    Serve {
        #[arg(short, long, default_value_t = 8080)]
        port: u16,

        /// JSON file the snapshot list is persisted to; in-memory when omitted.
        #[arg(long)]
        snapshots: Option<PathBuf>,
    },
    /// Project a configuration file (or the defaults) and print the summary.
    Project {
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Include every projection row and alert in the output.
        #[arg(long)]
        rows: bool,
    },
}

#[tokio::main]
async fn main() {
    // stdout carries the `project` output
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "nw_compass=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match Args::parse().command {
        Command::Serve { port, snapshots } => {
            let store = match snapshots {
                Some(path) => SnapshotStore::open(path),
                None => SnapshotStore::in_memory(),
            };
            if let Err(e) = run_http_server(port, store).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Project { config, rows } => {
            let config = match read_config(config) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            };

            let report = build_report(&config, None);
            let output = if rows {
                serde_json::to_string_pretty(&report)
            } else {
                serde_json::to_string_pretty(&json!({ "summary": report.summary }))
            };
            match output {
                Ok(text) => println!("{text}"),
                Err(e) => {
                    eprintln!("Failed to encode report: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

fn read_config(path: Option<PathBuf>) -> ConfigResult<LifeConfig> {
    match path {
        Some(path) => load_config_file(&path),
        None => {
            let config = LifeConfig::default();
            validate(&config)?;
            Ok(config)
        }
    }
}
