//! Persistent player settings, stored as TOML.

use directories::ProjectDirs;
use explorer_core::GameConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::APP_NAME;

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SettingsFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores_path: Option<PathBuf>,
    pub leaderboard_limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub game: GameConfig,
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            player_name: None,
            scores_path: None,
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
            seed: None,
            game: GameConfig::default(),
        }
    }
}

impl SettingsFile {
    pub fn get_default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|proj_dirs| {
            let mut path = proj_dirs.config_dir().to_path_buf();
            path.push("settings.toml");
            path
        })
    }

    pub fn get_default_scores_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|proj_dirs| {
            let mut path = proj_dirs.data_dir().to_path_buf();
            path.push("scores.json");
            path
        })
    }

    /// Where scores go: the configured path, else the platform data directory, else the
    /// working directory.
    pub fn resolved_scores_path(&self) -> PathBuf {
        self.scores_path
            .clone()
            .or_else(Self::get_default_scores_path)
            .unwrap_or_else(|| PathBuf::from("scores.json"))
    }

    pub fn write_atomic(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        let text = toml::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(&tmp_path, text)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Settings for one launch. A file that does not exist yet reads as the defaults, so
    /// `--init-config` can create it afterwards.
    pub fn load_for_launch(path: &Path) -> io::Result<Self> {
        match Self::load(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("no settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }
}
