//! Coinquiz terminal binary
//!
//! Runs one moderated game session on stdin/stdout.

use clap::{Parser, Subcommand};
use coinquiz::{
    config::{ConfigLoader, QuizConfig},
    errors::QuizResult,
    games::{AlertPort, GameEngine, SilentAlerts, TerminalBell, TokioTimers},
    session::run_session,
};
use std::path::PathBuf;
use tokio::io::BufReader;

/// Classroom quiz with coin betting
#[derive(Parser)]
#[command(name = "coinquiz")]
#[command(about = "Classroom quiz game where players bet coins on their answers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Deck shuffle seed (overrides the configuration)
    #[arg(short, long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game on this terminal
    Play {
        /// Do not ring the terminal bell
        #[arg(long)]
        no_bell: bool,

        /// Write the game journal as JSON when the session ends
        #[arg(short, long)]
        journal: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    ShowConfig,

    /// Validate the configuration and exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> QuizResult<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout belongs to the game
    let default_filter = if cli.verbose { "coinquiz=debug" } else { "coinquiz=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_path(path);
    }
    let mut config = loader.load()?;

    // Override with CLI options
    if let Some(seed) = cli.seed {
        config.deck.seed = Some(seed);
    }

    match cli.command {
        Commands::Play { no_bell, journal } => play(config, no_bell, journal).await,
        Commands::ShowConfig => {
            print!("{}", ConfigLoader::to_toml(&config)?);
            Ok(())
        }
        Commands::CheckConfig => {
            println!(
                "Configuration OK: {} players, {} questions, deck of {}",
                config.game.players.len(),
                config.game.question_quota,
                config.deck.deck_size()
            );
            Ok(())
        }
    }
}

async fn play(config: QuizConfig, no_bell: bool, journal: Option<PathBuf>) -> QuizResult<()> {
    let alerts: Box<dyn AlertPort> = if config.alerts.bell && !no_bell {
        Box::new(TerminalBell::stderr())
    } else {
        Box::new(SilentAlerts)
    };
    let (timers, pulses) = TokioTimers::channel();
    let mut engine = GameEngine::new(config, Box::new(timers), alerts)?;

    let summary = run_session(
        &mut engine,
        pulses,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    println!("\nFinal standings after {}/{} questions:", summary.asked, summary.quota);
    for entry in &summary.ranking {
        println!("  {}. {} - {} coins", entry.position, entry.player, entry.balance);
    }

    if let Some(path) = journal {
        let json = serde_json::to_string_pretty(engine.journal().entries())?;
        tokio::fs::write(&path, json).await?;
        tracing::info!(path = %path.display(), entries = engine.journal().len(), "Journal exported");
    }

    Ok(())
}
