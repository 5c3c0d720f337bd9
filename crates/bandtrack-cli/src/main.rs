mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "bandtrack")]
#[command(about = "Reconstruct banding and encounter trajectories for map rendering")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List species present in the records file with their row counts
    Species {
        /// Records CSV (defaults to `BANDTRACK_DATA_PATH`)
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Build per-tag trajectories for one species
    Trajectories {
        /// Scientific name, e.g. "Selasphorus rufus" (defaults to `BANDTRACK_DEFAULT_SPECIES`)
        #[arg(long)]
        species: Option<String>,
        /// Records CSV (defaults to `BANDTRACK_DATA_PATH`)
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Only report this band number
        #[arg(long)]
        tag: Option<String>,
        /// Skip tags with a single encounter
        #[arg(long)]
        multi_only: bool,
        /// Emit a JSON document for a map renderer instead of text lines
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = bandtrack_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Species { csv }) => {
            let path = csv.unwrap_or_else(|| config.data_path.clone());
            report::run_species(&path)?;
        }
        Some(Commands::Trajectories {
            species,
            csv,
            tag,
            multi_only,
            json,
        }) => {
            let species = species
                .or_else(|| config.default_species.clone())
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "no species given; pass --species or set BANDTRACK_DEFAULT_SPECIES"
                    )
                })?;
            let options = report::TrajectoryOptions {
                csv_path: csv.unwrap_or_else(|| config.data_path.clone()),
                species,
                tag,
                include_single: config.include_single && !multi_only,
                json,
            };
            report::run_trajectories(&config, &options)?;
        }
        None => println!("bandtrack: pass a subcommand (see --help)"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
