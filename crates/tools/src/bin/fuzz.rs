use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Parser;
use explorer_core::{
    Command, CommandOutcome, GameConfig, GameSession, InMemoryScoreStore, ScoreStore,
    SessionError, SessionPhase,
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 10_000)]
    steps: u32,
}

const DIRECTIONS: [&str; 6] = ["north", "south", "east", "west", "NORTH", "up"];

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn random_command(rng: &mut ChaCha8Rng) -> Command {
    match rng.next_u64() % 20 {
        0 => Command::StartNewGame,
        1 => Command::ReturnToMenu,
        2 => {
            let name = choose(rng, &["", "Bilbo", "  Frodo  "]);
            Command::SetPlayerName { name: name.to_string() }
        }
        3..=7 => Command::PickupItem,
        _ => Command::Move { direction: choose(rng, &DIRECTIONS).to_string() },
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    tracing::info!("fuzzing seed {} for {} steps", args.seed, args.steps);

    let store = Arc::new(InMemoryScoreStore::new());
    let mut session = GameSession::new(GameConfig::default(), args.seed, store.clone())?;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut finished_runs = 0usize;

    for step in 0..args.steps {
        let command = random_command(&mut rng);
        let before = session.snapshot_hash();
        let phase_before = session.phase();
        let result = session.apply(&command);

        // Assert invariants
        match &result {
            Err(SessionError::NotInProgress) if phase_before == SessionPhase::Playing => {
                bail!("step {step}: {command:?} refused while playing");
            }
            Err(_) if session.snapshot_hash() != before => {
                bail!("step {step}: rejected {command:?} changed the session");
            }
            Ok(CommandOutcome::Finale(summary)) => {
                finished_runs += 1;
                let items = session.run().inventory.len() as i32;
                let expected = items * session.config().item_bonus - summary.penalty;
                if summary.score != expected {
                    bail!("step {step}: score {} but expected {expected}", summary.score);
                }
                if !session.is_game_over() {
                    bail!("step {step}: finale left the session running");
                }
            }
            _ => {}
        }

        let run = session.run();
        let mut distinct = run.inventory.clone();
        distinct.sort();
        distinct.dedup();
        if distinct.len() != run.inventory.len() {
            bail!("step {step}: duplicate item in inventory {:?}", run.inventory);
        }
        if session.phase() == SessionPhase::Playing {
            let placed = session.placement().len();
            let accounted = session.graph().item_rooms().len() + run.inventory.len();
            if accounted != placed {
                bail!("step {step}: {accounted} items accounted for, {placed} placed");
            }
            if session.placement().rooms().contains(&session.finale_room()) {
                bail!("step {step}: item placed in the finale room");
            }
        }
    }

    if store.len() != finished_runs {
        bail!("{} scores saved for {finished_runs} finished runs", store.len());
    }
    let best = store.top_scores(1)?;
    tracing::info!(
        "fuzzing completed: {} games, {finished_runs} finished, best score {:?}",
        session.games_started(),
        best.first().map(|record| record.points)
    );
    Ok(())
}
