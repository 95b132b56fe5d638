//! Randomized assignment of required items to rooms.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::graph::RoomGraph;
use crate::types::RoomId;

/// Which room received which item for the current session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemPlacement {
    pub assignments: Vec<(RoomId, String)>,
}

impl ItemPlacement {
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn rooms(&self) -> Vec<RoomId> {
        self.assignments.iter().map(|(room, _)| *room).collect()
    }

    pub fn room_for(&self, item: &str) -> Option<RoomId> {
        self.assignments.iter().find(|(_, placed)| placed == item).map(|(room, _)| *room)
    }
}

/// Clears every item slot, then puts each item in a distinct room other than `excluded`.
///
/// Candidates keep graph construction order before the shuffle so a fixed seed always
/// yields the same placement. With fewer candidates than items, the surplus items are
/// left unplaced.
pub fn place_items<R: Rng + ?Sized>(
    graph: &mut RoomGraph,
    excluded: RoomId,
    items: &[String],
    rng: &mut R,
) -> ItemPlacement {
    graph.clear_items();

    let mut candidates: Vec<RoomId> = graph.room_ids().filter(|&id| id != excluded).collect();
    candidates.shuffle(rng);

    let assignments: Vec<(RoomId, String)> =
        candidates.into_iter().zip(items.iter().cloned()).collect();
    for (room, item) in &assignments {
        graph.set_item(*room, Some(item.clone()));
    }

    if assignments.len() < items.len() {
        tracing::warn!(
            "only {} of {} items could be placed; not enough candidate rooms",
            assignments.len(),
            items.len()
        );
    }
    tracing::debug!(
        "placed items: {:?}",
        assignments.iter().map(|(room, item)| (graph.name(*room), item)).collect::<Vec<_>>()
    );

    ItemPlacement { assignments }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    use super::*;
    use crate::config::GameConfig;

    fn castle_items() -> Vec<String> {
        GameConfig::default().required_items
    }

    #[test]
    fn every_item_lands_in_a_distinct_non_finale_room() {
        let mut graph = RoomGraph::castle();
        let dungeon = graph.room_id("Dungeon").expect("dungeon exists");
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let placement = place_items(&mut graph, dungeon, &castle_items(), &mut rng);

        assert_eq!(placement.len(), 6);
        let rooms: BTreeSet<RoomId> = placement.rooms().into_iter().collect();
        assert_eq!(rooms.len(), 6);
        assert!(!rooms.contains(&dungeon));
        assert_eq!(graph.item_rooms().len(), 6);
        for (room, item) in &placement.assignments {
            assert_eq!(graph.item_at(*room), Some(item.as_str()));
        }
    }

    #[test]
    fn same_seed_same_placement() {
        let mut left = RoomGraph::castle();
        let mut right = RoomGraph::castle();
        let dungeon = left.room_id("Dungeon").expect("dungeon exists");

        let a = place_items(&mut left, dungeon, &castle_items(), &mut ChaCha8Rng::seed_from_u64(3));
        let b =
            place_items(&mut right, dungeon, &castle_items(), &mut ChaCha8Rng::seed_from_u64(3));

        let names = |graph: &RoomGraph, p: &ItemPlacement| {
            p.assignments.iter().map(|(r, i)| (graph.name(*r).to_string(), i.clone())).collect()
        };
        let a_names: Vec<(String, String)> = names(&left, &a);
        let b_names: Vec<(String, String)> = names(&right, &b);
        assert_eq!(a_names, b_names);
    }

    #[test]
    fn replacing_clears_previous_items() {
        let mut graph = RoomGraph::castle();
        let dungeon = graph.room_id("Dungeon").expect("dungeon exists");
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        place_items(&mut graph, dungeon, &castle_items(), &mut rng);
        let second = place_items(&mut graph, dungeon, &["Lantern".to_string()], &mut rng);

        assert_eq!(graph.item_rooms(), second.rooms());
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn different_seeds_spread_items_over_every_candidate() {
        let mut graph = RoomGraph::castle();
        let dungeon = graph.room_id("Dungeon").expect("dungeon exists");
        let shield = ["Shield".to_string()];

        let mut rooms = BTreeSet::new();
        for seed in 0..200 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rooms.extend(place_items(&mut graph, dungeon, &shield, &mut rng).rooms());
        }
        assert_eq!(rooms.len(), 8);
        assert!(!rooms.contains(&dungeon));
    }

    #[test]
    fn surplus_items_are_dropped_without_error() {
        let mut graph = RoomGraph::builder()
            .room("Start", &[(crate::Direction::East, "End")])
            .room("End", &[(crate::Direction::West, "Start")])
            .build()
            .expect("two-room graph is valid");
        let end = graph.room_id("End").expect("end exists");
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let placement = place_items(&mut graph, end, &castle_items(), &mut rng);

        assert_eq!(placement.len(), 1);
        assert_eq!(placement.assignments[0].1, "Shield");
    }
}
