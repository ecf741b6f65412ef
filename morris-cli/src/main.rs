//! Morris CLI - Command-line interface
//!
//! Commands:
//! - evolve: Evolve evaluator weights through self-play
//! - play: Play against the AI, or run AI matches

mod evolve;
mod play;
mod render;

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "morris")]
#[command(about = "Nine Men's Morris engine with evolved evaluation")]
struct Cli {
    /// Random seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve evaluator weights through self-play
    Evolve(evolve::EvolveArgs),
    /// Play against the AI, or watch AI matches
    Play(play::PlayArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evolve(args) => evolve::run(args, cli.seed),
        Commands::Play(args) => play::run(args, cli.seed),
    }
}

/// Seeded RNG when a seed is given, entropy otherwise
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}
