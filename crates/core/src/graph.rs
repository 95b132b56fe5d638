//! Fixed-topology room graph with per-room item slots.
//! Exits never change after construction; only the item slots are mutated by a session.

use std::collections::BTreeMap;

use slotmap::SlotMap;
use thiserror::Error;

use crate::types::{Direction, RoomId};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("unknown room: {0}")]
    UnknownRoom(String),

    #[error("room {0} is declared more than once")]
    DuplicateRoom(String),

    #[error("exit {direction} from {room} leads to unknown room {target}")]
    UnknownExitTarget { room: String, direction: Direction, target: String },
}

#[derive(Clone, Debug)]
pub struct Room {
    pub name: String,
    exits: BTreeMap<Direction, RoomId>,
    item: Option<String>,
}

impl Room {
    pub fn exits(&self) -> &BTreeMap<Direction, RoomId> {
        &self.exits
    }

    pub fn item(&self) -> Option<&str> {
        self.item.as_deref()
    }
}

#[derive(Clone, Debug)]
pub struct RoomGraph {
    rooms: SlotMap<RoomId, Room>,
    by_name: BTreeMap<String, RoomId>,
    order: Vec<RoomId>,
}

impl RoomGraph {
    pub fn builder() -> RoomGraphBuilder {
        RoomGraphBuilder::default()
    }

    /// The nine-room castle every session is played on.
    pub fn castle() -> Self {
        use Direction::*;

        Self::builder()
            .room("Great Hall", &[(West, "West Tower"), (East, "East Tower"), (South, "Dungeon")])
            .room("East Tower", &[(West, "Great Hall"), (South, "Barracks")])
            .room("Barracks", &[(West, "Dungeon"), (North, "East Tower"), (South, "Library")])
            .room("Library", &[(West, "Bedroom"), (North, "Barracks")])
            .room("Bedroom", &[(West, "Stables"), (East, "Library"), (North, "Dungeon")])
            .room("Stables", &[(North, "Kitchen"), (East, "Bedroom")])
            .room("Kitchen", &[(North, "West Tower"), (South, "Stables"), (East, "Dungeon")])
            .room("West Tower", &[(South, "Kitchen"), (East, "Great Hall")])
            .room(
                "Dungeon",
                &[(North, "Great Hall"), (East, "Barracks"), (South, "Bedroom"), (West, "Kitchen")],
            )
            .build()
            .expect("castle layout must only reference declared rooms")
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn has_room(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn room_id(&self, name: &str) -> Result<RoomId, GraphError> {
        self.by_name.get(name).copied().ok_or_else(|| GraphError::UnknownRoom(name.to_string()))
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    /// Room name for an id handed out by this graph.
    pub fn name(&self, id: RoomId) -> &str {
        self.rooms.get(id).map_or("", |room| room.name.as_str())
    }

    /// Room ids in construction order.
    pub fn room_ids(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.order.iter().copied()
    }

    pub fn exits_from(&self, name: &str) -> Result<BTreeMap<Direction, &str>, GraphError> {
        let id = self.room_id(name)?;
        let exits = &self.rooms[id].exits;
        Ok(exits.iter().map(|(&direction, &to)| (direction, self.name(to))).collect())
    }

    pub fn neighbor(&self, id: RoomId, direction: Direction) -> Option<RoomId> {
        self.rooms.get(id)?.exits.get(&direction).copied()
    }

    pub fn neighbors(&self, id: RoomId) -> impl Iterator<Item = (Direction, RoomId)> + '_ {
        self.rooms.get(id).into_iter().flat_map(|room| room.exits.iter().map(|(&d, &to)| (d, to)))
    }

    pub fn item_at(&self, id: RoomId) -> Option<&str> {
        self.rooms.get(id).and_then(Room::item)
    }

    pub(crate) fn set_item(&mut self, id: RoomId, item: Option<String>) {
        if let Some(room) = self.rooms.get_mut(id) {
            room.item = item;
        }
    }

    pub(crate) fn take_item(&mut self, id: RoomId) -> Option<String> {
        self.rooms.get_mut(id).and_then(|room| room.item.take())
    }

    pub(crate) fn clear_items(&mut self) {
        for room in self.rooms.values_mut() {
            room.item = None;
        }
    }

    /// Rooms currently holding an item, in construction order.
    pub fn item_rooms(&self) -> Vec<RoomId> {
        self.room_ids().filter(|&id| self.item_at(id).is_some()).collect()
    }
}

#[derive(Default)]
pub struct RoomGraphBuilder {
    rooms: Vec<(String, Vec<(Direction, String)>)>,
}

impl RoomGraphBuilder {
    pub fn room(mut self, name: &str, exits: &[(Direction, &str)]) -> Self {
        let exits = exits.iter().map(|&(direction, to)| (direction, to.to_string())).collect();
        self.rooms.push((name.to_string(), exits));
        self
    }

    pub fn build(self) -> Result<RoomGraph, GraphError> {
        let mut rooms = SlotMap::with_key();
        let mut by_name = BTreeMap::new();
        let mut order = Vec::with_capacity(self.rooms.len());

        for (name, _) in &self.rooms {
            if by_name.contains_key(name) {
                return Err(GraphError::DuplicateRoom(name.clone()));
            }
            let id = rooms.insert(Room { name: name.clone(), exits: BTreeMap::new(), item: None });
            by_name.insert(name.clone(), id);
            order.push(id);
        }

        for ((name, exits), &id) in self.rooms.iter().zip(&order) {
            for (direction, target) in exits {
                let Some(&to) = by_name.get(target) else {
                    return Err(GraphError::UnknownExitTarget {
                        room: name.clone(),
                        direction: *direction,
                        target: target.clone(),
                    });
                };
                rooms[id].exits.insert(*direction, to);
            }
        }

        Ok(RoomGraph { rooms, by_name, order })
    }
}
