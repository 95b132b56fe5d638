//! Game rules that stay fixed for the life of a process.

use std::hash::Hasher;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

use crate::graph::RoomGraph;

pub const DEFAULT_START_ROOM: &str = "Great Hall";
pub const DEFAULT_FINALE_ROOM: &str = "Dungeon";
pub const DEFAULT_PLAYER_NAME: &str = "Hero";
pub const REQUIRED_ITEMS: [&str; 6] = ["Shield", "Armor", "Sword", "Bow", "Torch", "Arrows"];
pub const ITEM_BONUS: i32 = 100;
pub const OVER_PAR_PENALTY: i32 = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub start_room: String,
    pub finale_room: String,
    pub required_items: Vec<String>,
    pub item_bonus: i32,
    pub over_par_penalty: i32,
    pub default_player_name: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_room: DEFAULT_START_ROOM.to_string(),
            finale_room: DEFAULT_FINALE_ROOM.to_string(),
            required_items: REQUIRED_ITEMS.iter().map(|item| item.to_string()).collect(),
            item_bonus: ITEM_BONUS,
            over_par_penalty: OVER_PAR_PENALTY,
            default_player_name: DEFAULT_PLAYER_NAME.to_string(),
        }
    }
}

impl GameConfig {
    /// Required items with duplicates removed, first occurrence wins.
    pub fn distinct_items(&self) -> Vec<String> {
        let mut items: Vec<String> = Vec::with_capacity(self.required_items.len());
        for item in &self.required_items {
            if !items.contains(item) {
                items.push(item.clone());
            }
        }
        items
    }

    /// Stable digest of these rules together with the layout they are played on.
    pub fn content_hash(&self, graph: &RoomGraph) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write(self.start_room.as_bytes());
        hasher.write_u8(0);
        hasher.write(self.finale_room.as_bytes());
        hasher.write_u8(0);
        for item in &self.required_items {
            hasher.write(item.as_bytes());
            hasher.write_u8(0);
        }
        hasher.write_i32(self.item_bonus);
        hasher.write_i32(self.over_par_penalty);

        for id in graph.room_ids() {
            hasher.write(graph.name(id).as_bytes());
            hasher.write_u8(0);
            for (direction, to) in graph.neighbors(id) {
                hasher.write(direction.as_str().as_bytes());
                hasher.write(graph.name(to).as_bytes());
                hasher.write_u8(0);
            }
        }
        hasher.finish()
    }
}
