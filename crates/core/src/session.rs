//! Session state machine driving one playthrough at a time.
//!
//! A session moves between [`SessionPhase::Menu`], [`SessionPhase::Playing`] and
//! [`SessionPhase::GameOver`]. Every command runs to completion synchronously and reports
//! its result both as a return value and as the human-readable status line.

use std::hash::Hasher;
use std::sync::Arc;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use serde::Serialize;
use xxhash_rust::xxh3::Xxh3;

use crate::battle::{BattleReport, resolve_battle};
use crate::config::GameConfig;
use crate::graph::{GraphError, RoomGraph};
use crate::par::{ParCalculator, ParSolution};
use crate::placement::{ItemPlacement, place_items};
use crate::scores::{ScoreRecord, ScoreStore};
use crate::types::*;

/// Player state for the current (or most recent) run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run {
    pub room: RoomId,
    /// Collected items in pickup order.
    pub inventory: Vec<String>,
    pub moves: u32,
    pub score: i32,
    pub par: u32,
    pub battle: Option<BattleReport>,
}

impl Run {
    fn fresh(room: RoomId, par: u32) -> Self {
        Self { room, inventory: Vec::new(), moves: 0, score: 0, par, battle: None }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinaleSummary {
    pub won: bool,
    pub penalty: i32,
    pub score: i32,
    pub saved: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    Started { par: u32 },
    ReturnedToMenu,
    Moved { room: String },
    Finale(FinaleSummary),
    PickedUp { item: String },
    Renamed { name: String },
}

/// Everything a frontend needs to draw the session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub player_name: String,
    pub room: String,
    pub room_item: Option<String>,
    pub exits: Vec<(Direction, String)>,
    pub inventory: Vec<String>,
    pub required_items: Vec<String>,
    pub moves: u32,
    pub par: u32,
    pub score: i32,
    pub game_over: bool,
    pub won: Option<bool>,
    pub status: String,
}

pub struct GameSession {
    config: GameConfig,
    required: Vec<String>,
    graph: RoomGraph,
    start: RoomId,
    finale: RoomId,
    seed: u64,
    rng: ChaCha8Rng,
    store: Arc<dyn ScoreStore>,
    player_name: String,
    phase: SessionPhase,
    run: Run,
    placement: ItemPlacement,
    solution: ParSolution,
    games_started: u64,
    status: String,
}

impl GameSession {
    /// A session on the castle layout.
    pub fn new(
        config: GameConfig,
        seed: u64,
        store: Arc<dyn ScoreStore>,
    ) -> Result<Self, GraphError> {
        Self::with_graph(RoomGraph::castle(), config, seed, store)
    }

    pub fn with_graph(
        graph: RoomGraph,
        config: GameConfig,
        seed: u64,
        store: Arc<dyn ScoreStore>,
    ) -> Result<Self, GraphError> {
        let start = graph.room_id(&config.start_room)?;
        let finale = graph.room_id(&config.finale_room)?;
        let player_name = config.default_player_name.clone();
        let status = format!("Welcome, {player_name}. Start a new game when you are ready.");

        Ok(Self {
            required: config.distinct_items(),
            config,
            graph,
            start,
            finale,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            store,
            player_name,
            phase: SessionPhase::Menu,
            run: Run::fresh(start, 0),
            placement: ItemPlacement::default(),
            solution: ParSolution::default(),
            games_started: 0,
            status,
        })
    }

    pub fn apply(&mut self, command: &Command) -> Result<CommandOutcome, SessionError> {
        match command {
            Command::StartNewGame => Ok(self.start_new_game()),
            Command::ReturnToMenu => Ok(self.return_to_menu()),
            Command::Move { direction } => self.move_player(direction),
            Command::PickupItem => self.pickup_item(),
            Command::SetPlayerName { name } => Ok(self.set_player_name(name)),
        }
    }

    /// Re-randomizes the items, computes par and puts the player back in the start room.
    /// A run still in progress is abandoned without recording a score.
    pub fn start_new_game(&mut self) -> CommandOutcome {
        if self.phase == SessionPhase::Playing {
            tracing::info!("abandoning run after {} moves", self.run.moves);
        }

        self.placement = place_items(&mut self.graph, self.finale, &self.required, &mut self.rng);
        self.solution = ParCalculator::new(&self.graph, self.finale).solve(self.start);
        self.run = Run::fresh(self.start, self.solution.par);
        self.phase = SessionPhase::Playing;
        self.games_started += 1;

        let par = self.run.par;
        self.status = format!(
            "A new adventure begins in the {}. Collect all {} items, then face Azog in the {}. \
             Par is {par} moves.",
            self.graph.name(self.start),
            self.placement.len(),
            self.graph.name(self.finale),
        );
        tracing::info!("game {} started for {}, par {par}", self.games_started, self.player_name);
        CommandOutcome::Started { par }
    }

    /// Leaves the run data as it is until the next [`GameSession::start_new_game`].
    pub fn return_to_menu(&mut self) -> CommandOutcome {
        self.phase = SessionPhase::Menu;
        self.status = "You return to the main menu.".to_string();
        CommandOutcome::ReturnedToMenu
    }

    pub fn set_player_name(&mut self, name: &str) -> CommandOutcome {
        let name = name.trim();
        self.player_name = if name.is_empty() {
            self.config.default_player_name.clone()
        } else {
            name.to_string()
        };
        self.status = format!("Player name set to {}.", self.player_name);
        CommandOutcome::Renamed { name: self.player_name.clone() }
    }

    /// Moves one room in `direction` (case-insensitive). Entering the finale room ends the run.
    pub fn move_player(&mut self, direction: &str) -> Result<CommandOutcome, SessionError> {
        self.ensure_playing()?;
        let direction = match direction.parse::<Direction>() {
            Ok(direction) => direction,
            Err(e) => return self.reject(e),
        };
        let Some(room) = self.graph.room(self.run.room) else {
            let room = format!("{:?}", self.run.room);
            return self.reject(SessionError::UnknownRoom { room });
        };
        let Some(&next) = room.exits().get(&direction) else {
            return self.reject(SessionError::InvalidDirection { direction: direction.to_string() });
        };

        self.run.room = next;
        self.run.moves += 1;
        let name = self.graph.name(next).to_string();

        if next == self.finale {
            return Ok(CommandOutcome::Finale(self.finish_run(direction)));
        }

        self.status = format!("You move {direction} to the {name}.");
        Ok(CommandOutcome::Moved { room: name })
    }

    pub fn pickup_item(&mut self) -> Result<CommandOutcome, SessionError> {
        self.ensure_playing()?;
        let here = self.run.room;
        if self.graph.room(here).is_none() {
            return self.reject(SessionError::UnknownRoom { room: format!("{here:?}") });
        }
        let Some(item) = self.graph.item_at(here).map(str::to_string) else {
            return self.reject(SessionError::NothingToPickUp);
        };
        if self.run.inventory.contains(&item) {
            return self.reject(SessionError::AlreadyCollected { item });
        }

        self.graph.take_item(here);
        self.run.inventory.push(item.clone());
        self.run.score += self.config.item_bonus;
        self.status = format!("You pick up the {item} and add it to your inventory.");
        Ok(CommandOutcome::PickedUp { item })
    }

    fn finish_run(&mut self, direction: Direction) -> FinaleSummary {
        let finale_name = self.graph.name(self.finale).to_string();
        let battle = resolve_battle(&self.run.inventory, &self.required, &finale_name);

        let over_par = self.run.moves.saturating_sub(self.run.par);
        let penalty = i32::try_from(over_par)
            .unwrap_or(i32::MAX)
            .saturating_mul(self.config.over_par_penalty);
        self.run.score = self.run.score.saturating_sub(penalty);
        self.phase = SessionPhase::GameOver { won: battle.won };

        let mut status = format!("You move {direction} to the {finale_name}.\n{}", battle.message);
        if penalty > 0 {
            status.push_str(&format!(
                "\nYou took {} moves against a par of {}: -{penalty} points.",
                self.run.moves, self.run.par
            ));
        }
        status.push_str(&format!("\nFinal score: {}.", self.run.score));

        let record = ScoreRecord::new(
            &self.player_name,
            self.run.score,
            self.run.moves,
            self.run.par,
            battle.won,
            u32::try_from(self.run.inventory.len()).unwrap_or(u32::MAX),
        );
        let saved = match self.store.save_score(&record) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to save score for {}: {e}", self.player_name);
                status.push_str(&format!("\n(Your score could not be saved: {e})"));
                false
            }
        };

        tracing::info!(
            "game {} over: won={}, moves={}, par={}, score={}",
            self.games_started,
            battle.won,
            self.run.moves,
            self.run.par,
            self.run.score
        );

        let summary = FinaleSummary { won: battle.won, penalty, score: self.run.score, saved };
        self.run.battle = Some(battle);
        self.status = status;
        summary
    }

    fn ensure_playing(&mut self) -> Result<(), SessionError> {
        if self.phase == SessionPhase::Playing {
            Ok(())
        } else {
            self.reject(SessionError::NotInProgress)
        }
    }

    fn reject<T>(&mut self, error: SessionError) -> Result<T, SessionError> {
        tracing::debug!("command rejected: {error:?}");
        self.status = error.to_string();
        Err(error)
    }

    /// Where scores of later runs are saved.
    pub fn replace_store(&mut self, store: Arc<dyn ScoreStore>) {
        self.store = store;
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase.is_game_over()
    }

    pub fn run(&self) -> &Run {
        &self.run
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn games_started(&self) -> u64 {
        self.games_started
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn graph(&self) -> &RoomGraph {
        &self.graph
    }

    pub fn start_room(&self) -> RoomId {
        self.start
    }

    pub fn finale_room(&self) -> RoomId {
        self.finale
    }

    pub fn placement(&self) -> &ItemPlacement {
        &self.placement
    }

    pub fn current_room_name(&self) -> &str {
        self.graph.name(self.run.room)
    }

    pub fn current_room_item(&self) -> Option<&str> {
        self.graph.item_at(self.run.room)
    }

    /// The par-achieving visiting order computed when the current run started.
    pub fn par_solution(&self) -> &ParSolution {
        &self.solution
    }

    /// Moves that collect every item of the current run in par, ending in the finale room.
    pub fn optimal_route(&self) -> Option<Vec<Direction>> {
        self.solution.route(&self.graph, self.start, self.finale)
    }

    pub fn view(&self) -> SessionView {
        let exits = self
            .graph
            .neighbors(self.run.room)
            .map(|(direction, to)| (direction, self.graph.name(to).to_string()))
            .collect();

        SessionView {
            phase: self.phase,
            player_name: self.player_name.clone(),
            room: self.current_room_name().to_string(),
            room_item: self.current_room_item().map(str::to_string),
            exits,
            inventory: self.run.inventory.clone(),
            required_items: self.required.clone(),
            moves: self.run.moves,
            par: self.run.par,
            score: self.run.score,
            game_over: self.phase.is_game_over(),
            won: self.run.battle.as_ref().map(|battle| battle.won),
            status: self.status.clone(),
        }
    }

    /// Digest of the deterministic session state.
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u64(self.games_started);
        hasher.write_u8(match self.phase {
            SessionPhase::Menu => 0,
            SessionPhase::Playing => 1,
            SessionPhase::GameOver { won: false } => 2,
            SessionPhase::GameOver { won: true } => 3,
        });
        hasher.write(self.player_name.as_bytes());
        hasher.write_u8(0);
        hasher.write(self.current_room_name().as_bytes());
        hasher.write_u8(0);
        for item in &self.run.inventory {
            hasher.write(item.as_bytes());
            hasher.write_u8(0);
        }
        for (room, item) in &self.placement.assignments {
            hasher.write(self.graph.name(*room).as_bytes());
            hasher.write(item.as_bytes());
            hasher.write_u8(u8::from(self.graph.item_at(*room).is_some()));
        }
        hasher.write_u32(self.run.moves);
        hasher.write_i32(self.run.score);
        hasher.write_u32(self.run.par);
        hasher.finish()
    }
}
