//! JSON file score store.
//!
//! The whole leaderboard lives in one pretty-printed JSON document that is rewritten on every
//! save through a temp file and a rename.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::scores::{Result, ScoreRecord, ScoreStore, ScoreStoreError, select_scores};

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
struct ScoreFile {
    format_version: u32,
    scores: Vec<ScoreRecord>,
}

pub struct JsonFileScoreStore {
    path: PathBuf,
    // Serializes read-modify-write cycles from this process.
    write_lock: Mutex<()>,
}

impl JsonFileScoreStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored record in insertion order. A missing file holds no scores.
    pub fn load_all(&self) -> Result<Vec<ScoreRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let file: ScoreFile = serde_json::from_str(&content)?;
        if file.format_version != FORMAT_VERSION {
            return Err(ScoreStoreError::UnsupportedVersion(file.format_version));
        }
        Ok(file.scores)
    }

    fn write_atomic(&self, scores: Vec<ScoreRecord>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let json =
            serde_json::to_string_pretty(&ScoreFile { format_version: FORMAT_VERSION, scores })?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl ScoreStore for JsonFileScoreStore {
    fn save_score(&self, record: &ScoreRecord) -> Result<()> {
        let _guard = self.write_lock.lock().map_err(|_| ScoreStoreError::LockPoisoned)?;
        let mut scores = self.load_all()?;
        scores.push(record.clone());
        self.write_atomic(scores)?;
        tracing::debug!("saved score for {} to {}", record.player_name, self.path.display());
        Ok(())
    }

    fn top_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>> {
        Ok(select_scores(&self.load_all()?, None, limit))
    }

    fn scores_for_player(&self, player_name: &str, limit: usize) -> Result<Vec<ScoreRecord>> {
        Ok(select_scores(&self.load_all()?, Some(player_name), limit))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileScoreStore::new(dir.path().join("scores.json"));
        assert!(store.top_scores(10).unwrap().is_empty());
    }

    #[test]
    fn saves_survive_a_new_store_instance() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("scores.json");

        let store = JsonFileScoreStore::new(&path);
        store.save_score(&ScoreRecord::new("hero", 600, 9, 9, true, 6)).unwrap();
        store.save_score(&ScoreRecord::new("rival", 585, 12, 9, true, 6)).unwrap();

        let reopened = JsonFileScoreStore::new(&path);
        let top = reopened.top_scores(10).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].player_name, "hero");
        assert_eq!(reopened.scores_for_player("rival", 10).unwrap()[0].points, 585);

        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileScoreStore::new(&path);
        assert!(matches!(store.top_scores(10), Err(ScoreStoreError::Json(_))));
        assert!(store.save_score(&ScoreRecord::new("hero", 0, 1, 1, false, 0)).is_err());
    }

    #[test]
    fn unknown_version_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, r#"{"format_version": 9, "scores": []}"#).unwrap();

        let store = JsonFileScoreStore::new(&path);
        assert!(matches!(store.load_all(), Err(ScoreStoreError::UnsupportedVersion(9))));
    }
}
