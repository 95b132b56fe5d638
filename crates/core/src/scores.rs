//! Score persistence contract and an in-memory store.
//!
//! A session treats its store as a best-effort side channel: a failed save is reported in
//! the status line but never blocks the run from finishing.

use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub player_name: String,
    pub points: i32,
    pub moves: u32,
    pub par: u32,
    pub won: bool,
    pub items_collected: u32,
    pub created_at_unix_ms: u64,
}

impl ScoreRecord {
    pub fn new(
        player_name: &str,
        points: i32,
        moves: u32,
        par: u32,
        won: bool,
        items_collected: u32,
    ) -> Self {
        Self {
            player_name: player_name.to_string(),
            points,
            moves,
            par,
            won,
            items_collected,
            created_at_unix_ms: unix_now_ms(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScoreStoreError {
    #[error("score store lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported score file version {0}")]
    UnsupportedVersion(u32),

    #[error("score store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, ScoreStoreError>;

/// Where finished runs are recorded and the leaderboard is read from.
pub trait ScoreStore: Send + Sync {
    fn save_score(&self, record: &ScoreRecord) -> Result<()>;

    /// Best scores first: most points, then fewest moves.
    fn top_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>>;

    /// Same ordering as [`ScoreStore::top_scores`], restricted to one player. A blank name
    /// means every player.
    fn scores_for_player(&self, player_name: &str, limit: usize) -> Result<Vec<ScoreRecord>>;
}

/// Sorts by points descending, then moves ascending, keeping insertion order for full ties.
pub fn rank_scores(mut records: Vec<ScoreRecord>, limit: usize) -> Vec<ScoreRecord> {
    records.sort_by(|a, b| b.points.cmp(&a.points).then(a.moves.cmp(&b.moves)));
    records.truncate(limit);
    records
}

/// Leaderboard query shared by the stores.
pub(crate) fn select_scores(
    records: &[ScoreRecord],
    player_name: Option<&str>,
    limit: usize,
) -> Vec<ScoreRecord> {
    let filtered = records
        .iter()
        .filter(|record| match player_name {
            Some(name) if !name.trim().is_empty() => record.player_name == name,
            _ => true,
        })
        .cloned()
        .collect();
    rank_scores(filtered, limit)
}

#[derive(Default)]
pub struct InMemoryScoreStore {
    records: RwLock<Vec<ScoreRecord>>,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map_or(0, |records| records.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ScoreStore for InMemoryScoreStore {
    fn save_score(&self, record: &ScoreRecord) -> Result<()> {
        let mut records = self.records.write().map_err(|_| ScoreStoreError::LockPoisoned)?;
        records.push(record.clone());
        Ok(())
    }

    fn top_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>> {
        let records = self.records.read().map_err(|_| ScoreStoreError::LockPoisoned)?;
        Ok(select_scores(&records, None, limit))
    }

    fn scores_for_player(&self, player_name: &str, limit: usize) -> Result<Vec<ScoreRecord>> {
        let records = self.records.read().map_err(|_| ScoreStoreError::LockPoisoned)?;
        Ok(select_scores(&records, Some(player_name), limit))
    }
}

pub(crate) fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}
