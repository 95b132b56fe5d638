pub mod battle;
pub mod config;
pub mod graph;
pub mod journal;
pub mod journal_file;
pub mod par;
pub mod placement;
pub mod replay;
pub mod score_file;
pub mod scores;
pub mod session;
pub mod types;

#[cfg(test)]
mod test_support;

pub use battle::{BattleReport, resolve_battle};
pub use config::GameConfig;
pub use graph::{GraphError, Room, RoomGraph, RoomGraphBuilder};
pub use journal::{InputJournal, InputRecord};
pub use journal_file::{JournalLoadError, JournalWriter, LoadedJournal, load_journal_from_file};
pub use par::{ParCalculator, ParSolution};
pub use placement::{ItemPlacement, place_items};
pub use replay::*;
pub use score_file::JsonFileScoreStore;
pub use scores::{InMemoryScoreStore, ScoreRecord, ScoreStore, ScoreStoreError};
pub use session::{CommandOutcome, FinaleSummary, GameSession, Run, SessionView};
pub use types::*;
