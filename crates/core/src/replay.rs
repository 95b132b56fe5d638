//! Deterministic re-execution of a recorded session.

use std::sync::Arc;

use thiserror::Error;

use crate::config::GameConfig;
use crate::graph::{GraphError, RoomGraph};
use crate::journal::InputJournal;
use crate::scores::InMemoryScoreStore;
use crate::session::GameSession;
use crate::types::{SessionError, SessionPhase};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    #[error("journal was recorded with content hash {recorded:#018x}, current is {current:#018x}")]
    ContentMismatch { recorded: u64, current: u64 },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("recorded input {seq} was rejected: {error}")]
    Rejected { seq: u64, error: SessionError },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayResult {
    pub final_phase: SessionPhase,
    pub final_score: i32,
    pub final_moves: u32,
    pub final_par: u32,
    pub final_snapshot_hash: u64,
    pub games_started: u64,
    pub inputs_applied: usize,
}

/// Rebuilds a session from the journal's seed and feeds it every recorded command.
///
/// Scores of games finished along the way go to a throwaway in-memory store, so replays never
/// touch a leaderboard. Attach a real store with [`GameSession::replace_store`] to keep playing.
pub fn replay_journal_inputs(
    config: &GameConfig,
    journal: &InputJournal,
) -> Result<GameSession, ReplayError> {
    let graph = RoomGraph::castle();
    let current = config.content_hash(&graph);
    if journal.content_hash != current {
        return Err(ReplayError::ContentMismatch { recorded: journal.content_hash, current });
    }

    let store = Arc::new(InMemoryScoreStore::new());
    let mut session = GameSession::with_graph(graph, config.clone(), journal.seed, store)?;
    for record in &journal.inputs {
        session
            .apply(&record.payload)
            .map_err(|error| ReplayError::Rejected { seq: record.seq, error })?;
    }
    Ok(session)
}

pub fn replay_to_end(
    config: &GameConfig,
    journal: &InputJournal,
) -> Result<ReplayResult, ReplayError> {
    let session = replay_journal_inputs(config, journal)?;
    let run = session.run();
    Ok(ReplayResult {
        final_phase: session.phase(),
        final_score: run.score,
        final_moves: run.moves,
        final_par: run.par,
        final_snapshot_hash: session.snapshot_hash(),
        games_started: session.games_started(),
        inputs_applied: journal.inputs.len(),
    })
}
