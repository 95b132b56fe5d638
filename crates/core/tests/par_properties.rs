use explorer_core::par::{UNREACHABLE, shortest_distances, solve_par};
use explorer_core::{Direction, RoomGraph, RoomId, place_items};
use proptest::prelude::*;
use rand::seq::SliceRandom;
use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};

fn room_name(x: usize, y: usize) -> String {
    format!("r{x}_{y}")
}

/// A `width` x `height` grid where each directed neighbor link survives when its mask bit is set.
fn grid(width: usize, height: usize, mask: &[bool]) -> RoomGraph {
    let mut builder = RoomGraph::builder();
    let mut bit = 0;
    for y in 0..height {
        for x in 0..width {
            let mut exits: Vec<(Direction, String)> = Vec::new();
            let candidates = [
                (Direction::North, y > 0, x, y.wrapping_sub(1)),
                (Direction::South, y + 1 < height, x, y + 1),
                (Direction::East, x + 1 < width, x + 1, y),
                (Direction::West, x > 0, x.wrapping_sub(1), y),
            ];
            for (direction, inside, nx, ny) in candidates {
                if inside && mask[bit % mask.len()] {
                    exits.push((direction, room_name(nx, ny)));
                }
                bit += 1;
            }
            let borrowed: Vec<(Direction, &str)> =
                exits.iter().map(|(direction, to)| (*direction, to.as_str())).collect();
            builder = builder.room(&room_name(x, y), &borrowed);
        }
    }
    builder.build().unwrap()
}

/// All-pairs hop counts by Bellman-Ford relaxation over every exit, independent of the BFS.
struct RelaxedDistances {
    rooms: Vec<RoomId>,
    table: Vec<Vec<u32>>,
}

impl RelaxedDistances {
    fn new(graph: &RoomGraph) -> Self {
        let rooms: Vec<RoomId> = graph.room_ids().collect();
        let index = |id: RoomId| rooms.iter().position(|&room| room == id).unwrap();
        let mut edges = Vec::new();
        for (from, &room) in rooms.iter().enumerate() {
            for (_, to) in graph.neighbors(room) {
                edges.push((from, index(to)));
            }
        }

        let n = rooms.len();
        let mut table = vec![vec![UNREACHABLE; n]; n];
        for (source, row) in table.iter_mut().enumerate() {
            row[source] = 0;
            for _ in 1..n {
                for &(from, to) in &edges {
                    if row[from] < UNREACHABLE && row[from] + 1 < row[to] {
                        row[to] = row[from] + 1;
                    }
                }
            }
        }
        Self { rooms, table }
    }

    fn get(&self, from: RoomId, to: RoomId) -> u32 {
        let position = |id: RoomId| self.rooms.iter().position(|&room| room == id).unwrap();
        self.table[position(from)][position(to)]
    }
}

fn brute_force(
    distances: &RelaxedDistances,
    at: RoomId,
    finale: RoomId,
    remaining: &mut Vec<RoomId>,
) -> u32 {
    if remaining.is_empty() {
        return distances.get(at, finale);
    }
    let mut best = UNREACHABLE;
    for index in 0..remaining.len() {
        let next = remaining.remove(index);
        let step = distances.get(at, next);
        if step < UNREACHABLE {
            let rest = brute_force(distances, next, finale, remaining);
            best = best.min(step.saturating_add(rest));
        }
        remaining.insert(index, next);
    }
    best.min(UNREACHABLE)
}

struct Case {
    graph: RoomGraph,
    start: RoomId,
    finale: RoomId,
    items: Vec<RoomId>,
}

fn case(width: usize, height: usize, mask: &[bool], seed: u64, item_count: usize) -> Case {
    let graph = grid(width, height, mask);
    let rooms: Vec<RoomId> = graph.room_ids().collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut order = rooms.clone();
    order.shuffle(&mut rng);
    let start = order[0];
    let finale = order[1];

    let mut candidates: Vec<RoomId> = rooms.into_iter().filter(|&room| room != finale).collect();
    candidates.shuffle(&mut rng);
    candidates.truncate(item_count);
    Case { graph, start, finale, items: candidates }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn par_matches_exhaustive_search(
        width in 3usize..=4,
        height in 3usize..=3,
        mask in prop::collection::vec(prop::bool::weighted(0.8), 48),
        seed in any::<u64>(),
        item_count in 0usize..=8,
    ) {
        let Case { graph, start, finale, items } = case(width, height, &mask, seed, item_count);
        let solution = solve_par(&graph, start, finale, &items);

        let expected = if items.is_empty() {
            0
        } else {
            let distances = RelaxedDistances::new(&graph);
            let exhaustive = brute_force(&distances, start, finale, &mut items.clone());
            if exhaustive >= UNREACHABLE { 0 } else { exhaustive }
        };
        prop_assert_eq!(solution.par, expected);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn bfs_distances_match_relaxation(
        width in 1usize..=4,
        height in 1usize..=3,
        mask in prop::collection::vec(any::<bool>(), 48),
    ) {
        let graph = grid(width, height, &mask);
        let relaxed = RelaxedDistances::new(&graph);
        for source in graph.room_ids() {
            let distances = shortest_distances(&graph, source);
            for room in graph.room_ids() {
                prop_assert_eq!(distances[room], relaxed.get(source, room));
            }
        }
    }

    #[test]
    fn par_route_is_walkable_and_collects_everything(
        width in 2usize..=4,
        height in 2usize..=3,
        mask in prop::collection::vec(prop::bool::weighted(0.9), 48),
        seed in any::<u64>(),
        item_count in 1usize..=6,
    ) {
        let Case { graph, start, finale, items } = case(width, height, &mask, seed, item_count);
        let solution = solve_par(&graph, start, finale, &items);
        prop_assume!(!solution.visit_order.is_empty());

        let route = solution.route(&graph, start, finale).unwrap();
        prop_assert_eq!(route.len() as u32, solution.par);

        let mut at = start;
        let mut visited = vec![start];
        for direction in route {
            at = graph.neighbor(at, direction).unwrap();
            visited.push(at);
        }
        prop_assert_eq!(at, finale);
        for item in &items {
            prop_assert!(visited.contains(item));
        }
    }

    #[test]
    fn bfs_distances_respect_single_steps(
        width in 2usize..=4,
        height in 2usize..=3,
        mask in prop::collection::vec(any::<bool>(), 48),
        seed in any::<u64>(),
    ) {
        let Case { graph, start, .. } = case(width, height, &mask, seed, 0);
        let distances = shortest_distances(&graph, start);

        prop_assert_eq!(distances[start], 0);
        for room in graph.room_ids() {
            if distances[room] >= UNREACHABLE {
                continue;
            }
            for (_, next) in graph.neighbors(room) {
                prop_assert!(distances[next] <= distances[room] + 1);
            }
        }
    }
}

proptest! {
    #[test]
    fn placement_uses_distinct_rooms_outside_the_excluded_one(
        width in 1usize..=4,
        height in 1usize..=3,
        seed in any::<u64>(),
        item_count in 0usize..=14,
    ) {
        let mut graph = grid(width, height, &[true]);
        let rooms: Vec<RoomId> = graph.room_ids().collect();
        let excluded = rooms[seed as usize % rooms.len()];
        let items: Vec<String> = (0..item_count).map(|index| format!("item{index}")).collect();

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let placement = place_items(&mut graph, excluded, &items, &mut rng);

        prop_assert_eq!(placement.len(), item_count.min(rooms.len() - 1));
        let mut placed = placement.rooms();
        prop_assert!(!placed.contains(&excluded));
        placed.sort();
        placed.dedup();
        prop_assert_eq!(placed.len(), placement.len());
        for (room, item) in &placement.assignments {
            prop_assert_eq!(graph.item_at(*room), Some(item.as_str()));
        }
        prop_assert_eq!(graph.item_rooms().len(), placement.len());
    }
}
