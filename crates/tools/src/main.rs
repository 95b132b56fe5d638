use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use explorer_core::{
    GameConfig, GameSession, InMemoryScoreStore, JsonFileScoreStore, ScoreStore,
    load_journal_from_file, replay_journal_inputs,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML file overriding the default game rules
    #[arg(long, global = true)]
    game_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSONL journal and print the final session state
    Replay {
        #[arg(short, long)]
        journal: PathBuf,
        /// Print the final view as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show item placement, par and an optimal route for a seed
    Par {
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        /// Number of consecutive games to lay out from the same seed
        #[arg(short, long, default_value_t = 1)]
        games: u32,
    },
    /// Print the leaderboard stored in a score file
    Leaderboard {
        #[arg(short, long)]
        scores: PathBuf,
        #[arg(short, long)]
        player: Option<String>,
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let cli = Cli::parse();
    let config = match &cli.game_config {
        Some(path) => load_game_config(path)?,
        None => GameConfig::default(),
    };

    match cli.command {
        Commands::Replay { journal, json } => replay(&config, &journal, json),
        Commands::Par { seed, games } => par(&config, seed, games),
        Commands::Leaderboard { scores, player, limit } => leaderboard(&scores, player, limit),
    }
}

fn load_game_config(path: &Path) -> Result<GameConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read game config: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse game config TOML: {}", path.display()))
}

fn replay(config: &GameConfig, path: &Path, json: bool) -> Result<()> {
    let loaded = load_journal_from_file(path)
        .with_context(|| format!("Failed to load journal file: {}", path.display()))?;
    let session = replay_journal_inputs(config, &loaded.journal)
        .with_context(|| format!("Failed to replay journal: {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session.view())?);
        return Ok(());
    }

    let run = session.run();
    println!("Replay complete.");
    println!("Seed: {}", loaded.journal.seed);
    println!("Inputs: {}", loaded.journal.len());
    println!("Games started: {}", session.games_started());
    println!("Phase: {:?}", session.phase());
    println!("Moves: {} (par {})", run.moves, run.par);
    println!("Score: {}", run.score);
    println!("Snapshot Hash: 0x{:016x}", session.snapshot_hash());
    Ok(())
}

fn par(config: &GameConfig, seed: u64, games: u32) -> Result<()> {
    let store = Arc::new(InMemoryScoreStore::new());
    let mut session =
        GameSession::new(config.clone(), seed, store).context("Invalid game configuration")?;

    for game in 1..=games {
        session.start_new_game();
        println!("Game {game} (seed {seed}):");
        for (room, item) in &session.placement().assignments {
            println!("  {item:<8} in {}", session.graph().name(*room));
        }
        println!("  par: {}", session.run().par);

        let order: Vec<&str> = session
            .par_solution()
            .visit_order
            .iter()
            .map(|room| session.graph().name(*room))
            .collect();
        println!("  visit order: {}", order.join(" -> "));
        match session.optimal_route() {
            Some(route) => {
                let steps: Vec<&str> = route.iter().map(|direction| direction.as_str()).collect();
                println!("  route: {}", steps.join(" "));
            }
            None => println!("  route: none"),
        }
    }
    Ok(())
}

fn leaderboard(path: &Path, player: Option<String>, limit: usize) -> Result<()> {
    let store = JsonFileScoreStore::new(path);
    let records = match &player {
        Some(name) => store.scores_for_player(name, limit),
        None => store.top_scores(limit),
    }
    .with_context(|| format!("Failed to read scores: {}", path.display()))?;

    if records.is_empty() {
        println!("No scores recorded.");
        return Ok(());
    }
    for (rank, record) in records.iter().enumerate() {
        println!(
            "{:>3}. {:<16} {:>5} pts  {:>3} moves (par {:>2})  {}  {} items",
            rank + 1,
            record.player_name,
            record.points,
            record.moves,
            record.par,
            if record.won { "won " } else { "lost" },
            record.items_collected
        );
    }
    Ok(())
}
