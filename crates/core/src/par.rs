//! Exact par computation: fewest moves from the start room through every item room into the
//! finale room.
//!
//! Distances come from one breadth-first search per source (the start room and each item
//! room). The visiting order is solved with a Held-Karp bitmask program over
//! `(visited item subset, last item visited)`, which is exponential in the item count and
//! intended for item counts in the single digits up to the low twenties.

use std::collections::VecDeque;

use slotmap::SecondaryMap;

use crate::graph::RoomGraph;
use crate::types::{Direction, RoomId};

/// Distance assigned to rooms a search cannot reach. Small enough that adding two of them
/// never overflows a `u32`.
pub const UNREACHABLE: u32 = u32::MAX / 4;

/// Largest item count the bitmask table is sized for.
pub const MAX_PAR_ITEMS: usize = 24;

const NO_PARENT: u8 = u8::MAX;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParSolution {
    pub par: u32,
    /// Item rooms in an optimal visiting order. Empty when no items are placed or when some
    /// item cannot be routed through.
    pub visit_order: Vec<RoomId>,
}

impl ParSolution {
    /// Move-by-move route realizing this solution, ending in `finale`.
    ///
    /// Legs avoid passing through `finale` whenever an equally short detour exists, since
    /// entering it ends the run.
    pub fn route(
        &self,
        graph: &RoomGraph,
        start: RoomId,
        finale: RoomId,
    ) -> Option<Vec<Direction>> {
        let mut route = Vec::with_capacity(self.par as usize);
        let mut at = start;
        for &stop in &self.visit_order {
            let direct = shortest_path(graph, at, stop)?;
            let leg = match shortest_path_avoiding(graph, at, stop, finale) {
                Some(detour) if detour.len() == direct.len() => detour,
                _ => direct,
            };
            route.extend(leg);
            at = stop;
        }
        route.extend(shortest_path(graph, at, finale)?);
        Some(route)
    }
}

pub struct ParCalculator<'a> {
    graph: &'a RoomGraph,
    finale: RoomId,
}

impl<'a> ParCalculator<'a> {
    pub fn new(graph: &'a RoomGraph, finale: RoomId) -> Self {
        Self { graph, finale }
    }

    /// Par from `start` for the items currently lying in the graph.
    pub fn compute(&self, start: RoomId) -> u32 {
        self.solve(start).par
    }

    pub fn solve(&self, start: RoomId) -> ParSolution {
        solve_par(self.graph, start, self.finale, &self.graph.item_rooms())
    }
}

/// Breadth-first distances from `source` to every room; unreachable rooms hold [`UNREACHABLE`].
pub fn shortest_distances(graph: &RoomGraph, source: RoomId) -> SecondaryMap<RoomId, u32> {
    let mut distances = SecondaryMap::with_capacity(graph.len());
    for id in graph.room_ids() {
        distances.insert(id, UNREACHABLE);
    }
    if graph.room(source).is_none() {
        return distances;
    }

    let mut queue = VecDeque::new();
    distances.insert(source, 0);
    queue.push_back(source);

    while let Some(current) = queue.pop_front() {
        let next_distance = distances[current] + 1;
        for (_, neighbor) in graph.neighbors(current) {
            if distances.get(neighbor) == Some(&UNREACHABLE) {
                distances.insert(neighbor, next_distance);
                queue.push_back(neighbor);
            }
        }
    }

    distances
}

/// Fewest-moves direction sequence from `from` to `to`. Ties resolve toward the first
/// direction in [`Direction`] order.
pub fn shortest_path(graph: &RoomGraph, from: RoomId, to: RoomId) -> Option<Vec<Direction>> {
    path_internal(graph, from, to, None)
}

/// Like [`shortest_path`], but never steps through `blocked` unless it is the destination.
pub fn shortest_path_avoiding(
    graph: &RoomGraph,
    from: RoomId,
    to: RoomId,
    blocked: RoomId,
) -> Option<Vec<Direction>> {
    path_internal(graph, from, to, Some(blocked))
}

fn path_internal(
    graph: &RoomGraph,
    from: RoomId,
    to: RoomId,
    blocked: Option<RoomId>,
) -> Option<Vec<Direction>> {
    graph.room(from)?;
    graph.room(to)?;
    if from == to {
        return Some(vec![]);
    }

    let mut came_from: SecondaryMap<RoomId, (RoomId, Direction)> = SecondaryMap::new();
    let mut queue = VecDeque::new();
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        for (direction, neighbor) in graph.neighbors(current) {
            if neighbor == from || came_from.contains_key(neighbor) {
                continue;
            }
            if blocked == Some(neighbor) && neighbor != to {
                continue;
            }
            came_from.insert(neighbor, (current, direction));
            if neighbor == to {
                return Some(reconstruct_path(&came_from, from, to));
            }
            queue.push_back(neighbor);
        }
    }

    None
}

fn reconstruct_path(
    came_from: &SecondaryMap<RoomId, (RoomId, Direction)>,
    from: RoomId,
    to: RoomId,
) -> Vec<Direction> {
    let mut path = Vec::new();
    let mut at = to;
    while at != from {
        let Some(&(previous, direction)) = came_from.get(at) else {
            break;
        };
        path.push(direction);
        at = previous;
    }
    path.reverse();
    path
}

/// Solves par for an explicit set of item rooms.
///
/// With no item rooms the par is 0. When every complete route crosses an unreachable leg
/// the par also falls back to 0 instead of reporting an infinite distance.
pub fn solve_par(
    graph: &RoomGraph,
    start: RoomId,
    finale: RoomId,
    item_rooms: &[RoomId],
) -> ParSolution {
    let m = item_rooms.len();
    if m == 0 {
        return ParSolution::default();
    }
    if m > MAX_PAR_ITEMS {
        tracing::warn!(
            "{m} item rooms exceed the par limit of {MAX_PAR_ITEMS}; par falls back to 0"
        );
        return ParSolution::default();
    }

    let from_start = shortest_distances(graph, start);
    let from_items: Vec<SecondaryMap<RoomId, u32>> =
        item_rooms.iter().map(|&room| shortest_distances(graph, room)).collect();

    let lookup = |table: &SecondaryMap<RoomId, u32>, room: RoomId| {
        table.get(room).copied().unwrap_or(UNREACHABLE)
    };
    let dist_start: Vec<u32> = item_rooms.iter().map(|&room| lookup(&from_start, room)).collect();
    let pairwise: Vec<Vec<u32>> = from_items
        .iter()
        .map(|table| item_rooms.iter().map(|&room| lookup(table, room)).collect())
        .collect();
    let to_finale: Vec<u32> = from_items.iter().map(|table| lookup(table, finale)).collect();

    let full = (1usize << m) - 1;
    let slot = |mask: usize, last: usize| mask * m + last;
    let mut cost = vec![UNREACHABLE; (full + 1) * m];
    let mut parent = vec![NO_PARENT; (full + 1) * m];

    for (first, &distance) in dist_start.iter().enumerate() {
        cost[slot(1 << first, first)] = distance;
    }

    for mask in 1..=full {
        for last in (0..m).filter(|&bit| mask & (1 << bit) != 0) {
            let previous_mask = mask & !(1 << last);
            if previous_mask == 0 {
                continue;
            }
            for before in (0..m).filter(|&bit| previous_mask & (1 << bit) != 0) {
                let so_far = cost[slot(previous_mask, before)];
                let step = pairwise[before][last];
                if so_far >= UNREACHABLE || step >= UNREACHABLE {
                    continue;
                }
                let candidate = so_far + step;
                if candidate < cost[slot(mask, last)] {
                    cost[slot(mask, last)] = candidate;
                    parent[slot(mask, last)] = before as u8;
                }
            }
        }
    }

    let best = (0..m)
        .filter(|&last| cost[slot(full, last)] < UNREACHABLE && to_finale[last] < UNREACHABLE)
        .map(|last| (cost[slot(full, last)] + to_finale[last], last))
        .min();

    let Some((par, mut last)) = best else {
        tracing::warn!("no complete route through {m} item rooms; par falls back to 0");
        return ParSolution::default();
    };

    let mut visit_order = Vec::with_capacity(m);
    let mut mask = full;
    loop {
        visit_order.push(item_rooms[last]);
        let before = parent[slot(mask, last)];
        mask &= !(1 << last);
        if mask == 0 || before == NO_PARENT {
            break;
        }
        last = usize::from(before);
    }
    visit_order.reverse();

    tracing::debug!(
        "par {par} via {:?}",
        visit_order.iter().map(|&room| graph.name(room)).collect::<Vec<_>>()
    );

    ParSolution { par, visit_order }
}
