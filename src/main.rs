use anyhow::Result;
use clap::{Parser, Subcommand};

use srmap::config::SpaceMode;
use srmap::mapper::{args::MapArgs, run};

#[derive(Parser)]
#[command(name = "srmap")]
#[command(version)]
#[command(about = "Spaced-seed short-read genome mapper", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map letter-space (nucleotide) reads
    Letter(MapArgs),

    /// Map colour-space (SOLiD) reads
    Colour(MapArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Letter(args) => run(SpaceMode::Letter, args),
        Commands::Colour(args) => run(SpaceMode::Colour, args),
    }
}
