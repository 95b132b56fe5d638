//! Final confrontation, resolved the moment the player enters the finale room.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    pub won: bool,
    pub missing: Vec<String>,
    pub message: String,
}

/// Wins exactly when the inventory holds every required item.
pub fn resolve_battle(
    inventory: &[String],
    required: &[String],
    finale_room: &str,
) -> BattleReport {
    let missing: Vec<String> =
        required.iter().filter(|item| !inventory.contains(item)).cloned().collect();

    if !missing.is_empty() {
        let message = format!(
            "You step into the {finale_room}... Azog descends upon you!\n\
             Without all {} legendary items, you are overwhelmed and defeated.",
            count_word(required.len())
        );
        return BattleReport { won: false, missing, message };
    }

    let message = format!(
        "You step into the {finale_room}... Azog charges!\n\
         You blind him with the Torch and block with your Shield.\n\
         Your Armor holds as you strike with your Sword.\n\
         You slow his retreat with your Bow and finish him with a volley of Arrows.\n\
         Azog is defeated. The castle is safe!"
    );
    BattleReport { won: true, missing, message }
}

fn count_word(count: usize) -> String {
    const WORDS: [&str; 11] =
        ["zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten"];
    WORDS.get(count).map_or_else(|| count.to_string(), |word| word.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::REQUIRED_ITEMS;

    fn required() -> Vec<String> {
        REQUIRED_ITEMS.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn full_inventory_wins() {
        let report = resolve_battle(&required(), &required(), "Dungeon");
        assert!(report.won);
        assert!(report.missing.is_empty());
        assert!(report.message.contains("Azog is defeated"));
    }

    #[test]
    fn superset_inventory_still_wins() {
        let mut inventory = required();
        inventory.push("Lantern".to_string());
        inventory.reverse();
        assert!(resolve_battle(&inventory, &required(), "Dungeon").won);
    }

    #[test]
    fn missing_item_loses_and_is_reported() {
        let inventory: Vec<String> = required().into_iter().filter(|i| i != "Bow").collect();
        let report = resolve_battle(&inventory, &required(), "Dungeon");
        assert!(!report.won);
        assert_eq!(report.missing, vec!["Bow".to_string()]);
        assert!(report.message.contains("Without all six legendary items"));
    }

    #[test]
    fn empty_inventory_loses() {
        assert!(!resolve_battle(&[], &required(), "Dungeon").won);
    }
}
