//! Shared fixtures for unit tests across the crate.

use crate::graph::RoomGraph;
use crate::par::{UNREACHABLE, shortest_distances};
use crate::types::{Direction, RoomId};

/// Rooms joined east-west in the given order.
pub(crate) fn chain(names: &[&str]) -> RoomGraph {
    let mut builder = RoomGraph::builder();
    for (index, name) in names.iter().enumerate() {
        let mut exits = Vec::new();
        if let Some(next) = names.get(index + 1) {
            exits.push((Direction::East, *next));
        }
        if index > 0 {
            exits.push((Direction::West, names[index - 1]));
        }
        builder = builder.room(name, &exits);
    }
    builder.build().expect("chain fixture only references its own rooms")
}

pub(crate) fn ids(graph: &RoomGraph, names: &[&str]) -> Vec<RoomId> {
    names.iter().map(|name| graph.room_id(name).expect("fixture room exists")).collect()
}

pub(crate) fn walk(graph: &RoomGraph, start: RoomId, path: &[Direction]) -> Option<RoomId> {
    path.iter().try_fold(start, |at, &direction| graph.neighbor(at, direction))
}

/// Par by trying every visiting order.
pub(crate) fn brute_force_par(
    graph: &RoomGraph,
    start: RoomId,
    finale: RoomId,
    item_rooms: &[RoomId],
) -> u32 {
    fn search(
        graph: &RoomGraph,
        at: RoomId,
        finale: RoomId,
        remaining: &mut Vec<RoomId>,
        travelled: u64,
        best: &mut Option<u64>,
    ) {
        if remaining.is_empty() {
            let last_leg = shortest_distances(graph, at)[finale];
            if last_leg < UNREACHABLE {
                let total = travelled + u64::from(last_leg);
                *best = Some(best.map_or(total, |current| current.min(total)));
            }
            return;
        }
        let distances = shortest_distances(graph, at);
        for index in 0..remaining.len() {
            let next = remaining.remove(index);
            if distances[next] < UNREACHABLE {
                let leg = u64::from(distances[next]);
                search(graph, next, finale, remaining, travelled + leg, best);
            }
            remaining.insert(index, next);
        }
    }

    if item_rooms.is_empty() {
        return 0;
    }
    let mut best = None;
    search(graph, start, finale, &mut item_rooms.to_vec(), 0, &mut best);
    best.map_or(0, |par| par as u32)
}
