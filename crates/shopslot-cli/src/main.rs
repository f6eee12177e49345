mod slots;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shopslot-cli")]
#[command(about = "Allocate shops to display slots from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Allocate candidates read from a JSON file (no network)
    Allocate {
        /// JSON file: `{"sources": [[...]]}`, a list of source lists, or one flat list
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        location: LocationArgs,
        #[command(flatten)]
        capacities: CapacityArgs,
    },
    /// Fetch candidates from the catalog service and allocate them
    Fetch {
        #[command(flatten)]
        location: LocationArgs,
        /// City name for the by-city query
        #[arg(long)]
        city: Option<String>,
        #[command(flatten)]
        capacities: CapacityArgs,
    },
    /// Read `lat,lng[,city]` lines from stdin and re-allocate on each one,
    /// printing only results that are still current when they land
    Follow {
        #[command(flatten)]
        capacities: CapacityArgs,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Args)]
struct LocationArgs {
    /// Reference latitude in decimal degrees
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Reference longitude in decimal degrees
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Args)]
struct CapacityArgs {
    /// Left rail capacity
    #[arg(long)]
    left: Option<usize>,
    /// Right rail capacity
    #[arg(long)]
    right: Option<usize>,
    /// Bottom strip capacity
    #[arg(long)]
    bottom: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Allocate {
            input,
            location,
            capacities,
        }) => slots::run_allocate(&input, location, capacities)?,
        Some(Commands::Fetch {
            location,
            city,
            capacities,
        }) => {
            let config = shopslot_core::load_app_config()?;
            slots::run_fetch(&config, location, city, capacities).await?;
        }
        Some(Commands::Follow { capacities }) => {
            let config = shopslot_core::load_app_config()?;
            slots::run_follow(&config, capacities).await?;
        }
        None => println!("shopslot-cli: pass --help to list commands"),
    }

    Ok(())
}
