//! Terminal front end: reads commands from stdin and plays one session.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use explorer_app::app_loop::{AppMode, AppState};
use explorer_app::seed::{generate_runtime_seed, resolve_seed};
use explorer_app::settings_file::SettingsFile;
use explorer_app::{format_seed, format_snapshot_hash, ui_text};
use explorer_core::{
    Command, GameSession, JournalWriter, JsonFileScoreStore, RoomGraph, ScoreStore,
    load_journal_from_file, replay_journal_inputs,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for item placement (default: settings file, else random)
    #[arg(long)]
    seed: Option<u64>,

    /// Player name
    #[arg(long)]
    name: Option<String>,

    /// Settings file (default: platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Score file (default: platform data directory)
    #[arg(long)]
    scores: Option<PathBuf>,

    /// Record accepted commands to this JSONL journal
    #[arg(long, conflicts_with = "resume")]
    journal: Option<PathBuf>,

    /// Replay this journal and keep playing, appending to it
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Write the effective settings to the settings file and exit
    #[arg(long)]
    init_config: bool,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let settings_path = args.config.clone().or_else(SettingsFile::get_default_path);
    let mut settings = match &settings_path {
        Some(path) => SettingsFile::load_for_launch(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?,
        None => SettingsFile::default(),
    };
    if let Some(name) = &args.name {
        settings.player_name = Some(name.clone());
    }
    if let Some(scores) = &args.scores {
        settings.scores_path = Some(scores.clone());
    }
    if args.seed.is_some() {
        settings.seed = args.seed;
    }

    if args.init_config {
        let Some(path) = settings_path else {
            bail!("No settings location available; pass --config");
        };
        settings
            .write_atomic(&path)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let scores_path = settings.resolved_scores_path();
    let store: Arc<dyn ScoreStore> = Arc::new(JsonFileScoreStore::new(&scores_path));
    tracing::info!("scores at {}", scores_path.display());

    let content_hash = settings.game.content_hash(&RoomGraph::castle());
    let (mut session, mut journal) = match &args.resume {
        Some(path) => {
            let loaded = load_journal_from_file(path)
                .with_context(|| format!("Failed to load journal: {}", path.display()))?;
            let mut session = replay_journal_inputs(&settings.game, &loaded.journal)
                .with_context(|| format!("Failed to replay journal: {}", path.display()))?;
            session.replace_store(store.clone());
            let writer = JournalWriter::resume(path, &loaded)
                .with_context(|| format!("Failed to reopen journal: {}", path.display()))?;
            println!("Resumed session from {} ({} commands).", path.display(), loaded.next_seq);
            (session, Some(writer))
        }
        None => {
            let seed = resolve_seed(args.seed, settings.seed, generate_runtime_seed());
            tracing::info!("seed {} ({})", format_seed(seed.value()), seed.source());
            let session = GameSession::new(settings.game.clone(), seed.value(), store.clone())
                .context("Invalid game configuration")?;
            let writer = match &args.journal {
                Some(path) => {
                    let build_id = env!("CARGO_PKG_VERSION");
                    let writer = JournalWriter::create(path, seed.value(), build_id, content_hash)
                        .with_context(|| format!("Failed to create journal: {}", path.display()))?;
                    Some(writer)
                }
                None => None,
            };
            (session, writer)
        }
    };

    let mut app = AppState::new(store, settings.leaderboard_limit);
    if let Some(name) = &settings.player_name {
        let command = Command::SetPlayerName { name: name.clone() };
        session.apply(&command).context("Failed to set player name")?;
        if let Some(writer) = journal.as_mut() {
            writer.append(&command).context("Failed to write journal")?;
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in ui_text::status_lines(session.status()) {
        writeln!(out, "{line}")?;
    }
    writeln!(out, "Type 'help' for a list of commands.")?;

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read input")?;
        for text in app.handle_line(&mut session, &line) {
            writeln!(out, "{text}")?;
        }
        if let Some(writer) = journal.as_mut() {
            for command in app.accepted_inputs.drain(..) {
                writer.append(&command).context("Failed to write journal")?;
            }
        }
        out.flush()?;
        if app.mode == AppMode::Finished {
            break;
        }
    }

    tracing::info!(
        "session ended after {} games, snapshot {}",
        session.games_started(),
        format_snapshot_hash(session.snapshot_hash())
    );
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}
