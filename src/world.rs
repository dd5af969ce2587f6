use crate::military::bodies::Capabilities;
use crate::pathing::*;
use screeps::{Direction, Position, RoomName, RoomXY, StructureType, Terrain};
use serde::{Deserialize, Serialize};
use shrinkwraprs::*;
use std::collections::HashMap;

/// Identifier shared by the four units of a squad.
#[derive(Shrinkwrap, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SquadId(pub String);

/// Identifier of a unit. Own units use their name, foreign units their object id.
#[derive(Shrinkwrap, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub String);

#[derive(Shrinkwrap, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructureId(pub String);

impl From<&str> for SquadId {
    fn from(value: &str) -> Self {
        SquadId(value.to_string())
    }
}

impl From<&str> for UnitId {
    fn from(value: &str) -> Self {
        UnitId(value.to_string())
    }
}

impl From<&str> for StructureId {
    fn from(value: &str) -> Self {
        StructureId(value.to_string())
    }
}

impl std::fmt::Display for SquadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for StructureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Squad membership stamped on a unit by the spawn collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadTag {
    pub squad: SquadId,
    pub slot: usize,
    pub spawn_room: RoomName,
    pub target_room: RoomName,
}

#[derive(Clone, Debug)]
pub struct UnitInfo {
    pub id: UnitId,
    pub pos: Position,
    pub owner: String,
    pub my: bool,
    pub hits: u32,
    pub hits_max: u32,
    pub fatigue: u32,
    pub spawning: bool,
    pub capabilities: Capabilities,
    /// Active HEAL parts.
    pub heal_parts: u32,
    pub squad: Option<SquadTag>,
}

impl UnitInfo {
    pub fn new(id: &str, pos: Position, owner: &str, my: bool) -> UnitInfo {
        UnitInfo {
            id: UnitId::from(id),
            pos,
            owner: owner.to_string(),
            my,
            hits: 100,
            hits_max: 100,
            fatigue: 0,
            spawning: false,
            capabilities: Capabilities::empty(),
            heal_parts: 0,
            squad: None,
        }
    }

    pub fn with_hits(mut self, hits: u32, hits_max: u32) -> UnitInfo {
        self.hits = hits;
        self.hits_max = hits_max;
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities, heal_parts: u32) -> UnitInfo {
        self.capabilities = capabilities;
        self.heal_parts = heal_parts;
        self
    }

    pub fn with_squad(mut self, tag: SquadTag) -> UnitInfo {
        self.squad = Some(tag);
        self
    }

    pub fn with_fatigue(mut self, fatigue: u32) -> UnitInfo {
        self.fatigue = fatigue;
        self
    }

    pub fn with_spawning(mut self, spawning: bool) -> UnitInfo {
        self.spawning = spawning;
        self
    }

    pub fn xy(&self) -> RoomXY {
        pos_xy(self.pos)
    }

    pub fn room_name(&self) -> RoomName {
        self.pos.room_name()
    }

    pub fn is_damaged(&self) -> bool {
        self.hits < self.hits_max
    }
}

#[derive(Clone, Debug)]
pub struct StructureInfo {
    pub id: StructureId,
    pub structure_type: StructureType,
    pub pos: Position,
    pub owner: Option<String>,
    pub my: bool,
    /// Only meaningful for ramparts.
    pub public: bool,
    pub hits: u32,
}

impl StructureInfo {
    pub fn new(id: &str, structure_type: StructureType, pos: Position) -> StructureInfo {
        StructureInfo {
            id: StructureId::from(id),
            structure_type,
            pos,
            owner: None,
            my: false,
            public: false,
            hits: 1,
        }
    }

    pub fn with_owner(mut self, owner: &str, my: bool) -> StructureInfo {
        self.owner = Some(owner.to_string());
        self.my = my;
        self
    }

    pub fn with_public(mut self, public: bool) -> StructureInfo {
        self.public = public;
        self
    }

    pub fn with_hits(mut self, hits: u32) -> StructureInfo {
        self.hits = hits;
        self
    }

    pub fn xy(&self) -> RoomXY {
        pos_xy(self.pos)
    }

    /// Whether a unit may stand on the structure's tile.
    pub fn is_walkable(&self) -> bool {
        match self.structure_type {
            StructureType::Road | StructureType::Container => true,
            StructureType::Rampart => self.my || self.public,
            _ => false,
        }
    }

    /// Constructed walls and ramparts that are neither ours, public, nor allied.
    pub fn is_destructible_barrier(&self, classifier: &dyn HostileClassifier) -> bool {
        match self.structure_type {
            StructureType::Wall => true,
            StructureType::Rampart => {
                !self.my && !self.public && self.owner.as_deref().map(|o| classifier.is_hostile(o)).unwrap_or(true)
            }
            _ => false,
        }
    }

    /// Whether the structure is a worthwhile combat target when owned by a hostile.
    pub fn is_combat_structure(&self) -> bool {
        !matches!(
            self.structure_type,
            StructureType::Controller
                | StructureType::Road
                | StructureType::Container
                | StructureType::Wall
                | StructureType::Rampart
                | StructureType::KeeperLair
                | StructureType::Portal
                | StructureType::PowerBank
                | StructureType::Extractor
        )
    }
}

/// Labels owners of foreign units and structures as hostile or allied.
pub trait HostileClassifier {
    fn is_hostile(&self, owner: &str) -> bool;
}

/// Every owner not on the ally list is hostile.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AllyList {
    pub allies: Vec<String>,
}

impl HostileClassifier for AllyList {
    fn is_hostile(&self, owner: &str) -> bool {
        !self.allies.iter().any(|a| a == owner)
    }
}

/// Read access to the world state for one tick.
pub trait WorldView {
    fn time(&self) -> u32;

    /// Rooms with visibility this tick.
    fn room_names(&self) -> Vec<RoomName>;

    /// Unknown rooms and tiles read as walls.
    fn terrain(&self, room_name: RoomName, xy: RoomXY) -> Terrain;

    fn structures(&self, room_name: RoomName) -> &[StructureInfo];

    /// Every unit in the room, ours and foreign.
    fn units(&self, room_name: RoomName) -> &[UnitInfo];

    fn unit(&self, id: &UnitId) -> Option<&UnitInfo>;

    fn structure(&self, id: &StructureId) -> Option<&StructureInfo>;

    /// Own units carrying a squad tag.
    fn squad_units(&self) -> Vec<&UnitInfo>;

    /// Which edge of `from` leads toward `to`.
    fn exit_toward(&self, from: RoomName, to: RoomName) -> Option<Direction>;

    /// Terrain and structures permit standing on the tile. Roads make wall tiles walkable.
    fn is_walkable(&self, room_name: RoomName, xy: RoomXY) -> bool {
        let structures: Vec<_> = self.structures(room_name).iter().filter(|s| s.xy() == xy).collect();

        if structures.iter().any(|s| !s.is_walkable()) {
            return false;
        }

        self.terrain(room_name, xy) != Terrain::Wall || structures.iter().any(|s| s.structure_type == StructureType::Road)
    }

    fn unit_at(&self, room_name: RoomName, xy: RoomXY) -> Option<&UnitInfo> {
        self.units(room_name).iter().find(|u| u.xy() == xy)
    }
}

#[derive(Clone, Debug)]
struct RoomSnapshot {
    terrain: Vec<Terrain>,
    structures: Vec<StructureInfo>,
    units: Vec<UnitInfo>,
}

impl RoomSnapshot {
    fn new() -> RoomSnapshot {
        RoomSnapshot {
            terrain: vec![Terrain::Plain; crate::constants::ROOM_SIZE as usize * crate::constants::ROOM_SIZE as usize],
            structures: Vec::new(),
            units: Vec::new(),
        }
    }
}

fn terrain_index(xy: RoomXY) -> usize {
    xy.y.u8() as usize * crate::constants::ROOM_SIZE as usize + xy.x.u8() as usize
}

/// In-memory world state captured once per tick.
#[derive(Clone, Debug, Default)]
pub struct WorldSnapshot {
    time: u32,
    rooms: HashMap<RoomName, RoomSnapshot>,
    unit_index: HashMap<UnitId, (RoomName, usize)>,
    structure_index: HashMap<StructureId, (RoomName, usize)>,
    exits: HashMap<(RoomName, RoomName), Direction>,
}

impl WorldSnapshot {
    pub fn new(time: u32) -> WorldSnapshot {
        WorldSnapshot {
            time,
            ..Default::default()
        }
    }

    pub fn set_time(&mut self, time: u32) {
        self.time = time;
    }

    /// Add a room with all-plain terrain. Adding an existing room is a no-op.
    pub fn add_room(&mut self, room_name: RoomName) {
        self.rooms.entry(room_name).or_insert_with(RoomSnapshot::new);
    }

    pub fn set_terrain(&mut self, room_name: RoomName, xy: RoomXY, terrain: Terrain) {
        self.add_room(room_name);

        if let Some(room) = self.rooms.get_mut(&room_name) {
            room.terrain[terrain_index(xy)] = terrain;
        }
    }

    pub fn set_exit(&mut self, from: RoomName, to: RoomName, direction: Direction) {
        self.exits.insert((from, to), direction);
    }

    pub fn add_structure(&mut self, structure: StructureInfo) {
        let room_name = structure.pos.room_name();
        self.add_room(room_name);

        if let Some(room) = self.rooms.get_mut(&room_name) {
            self.structure_index.insert(structure.id.clone(), (room_name, room.structures.len()));
            room.structures.push(structure);
        }
    }

    pub fn remove_structure(&mut self, id: &StructureId) -> Option<StructureInfo> {
        let (room_name, index) = self.structure_index.remove(id)?;
        let room = self.rooms.get_mut(&room_name)?;
        let removed = room.structures.remove(index);

        for (i, structure) in room.structures.iter().enumerate().skip(index) {
            self.structure_index.insert(structure.id.clone(), (room_name, i));
        }

        Some(removed)
    }

    pub fn add_unit(&mut self, unit: UnitInfo) {
        let room_name = unit.room_name();
        self.add_room(room_name);

        if let Some(room) = self.rooms.get_mut(&room_name) {
            self.unit_index.insert(unit.id.clone(), (room_name, room.units.len()));
            room.units.push(unit);
        }
    }

    pub fn remove_unit(&mut self, id: &UnitId) -> Option<UnitInfo> {
        let (room_name, index) = self.unit_index.remove(id)?;
        let room = self.rooms.get_mut(&room_name)?;
        let removed = room.units.remove(index);

        for (i, unit) in room.units.iter().enumerate().skip(index) {
            self.unit_index.insert(unit.id.clone(), (room_name, i));
        }

        Some(removed)
    }

    /// Relocate a unit, possibly into another room.
    pub fn move_unit(&mut self, id: &UnitId, pos: Position) {
        if let Some(mut unit) = self.remove_unit(id) {
            unit.pos = pos;
            self.add_unit(unit);
        }
    }

    pub fn unit_mut(&mut self, id: &UnitId) -> Option<&mut UnitInfo> {
        let (room_name, index) = *self.unit_index.get(id)?;

        self.rooms.get_mut(&room_name)?.units.get_mut(index)
    }
}

impl WorldView for WorldSnapshot {
    fn time(&self) -> u32 {
        self.time
    }

    fn room_names(&self) -> Vec<RoomName> {
        let mut names: Vec<RoomName> = self.rooms.keys().copied().collect();
        names.sort_by_key(|name| name.to_string());
        names
    }

    fn terrain(&self, room_name: RoomName, xy: RoomXY) -> Terrain {
        self.rooms
            .get(&room_name)
            .map(|room| room.terrain[terrain_index(xy)])
            .unwrap_or(Terrain::Wall)
    }

    fn structures(&self, room_name: RoomName) -> &[StructureInfo] {
        self.rooms.get(&room_name).map(|room| room.structures.as_slice()).unwrap_or(&[])
    }

    fn units(&self, room_name: RoomName) -> &[UnitInfo] {
        self.rooms.get(&room_name).map(|room| room.units.as_slice()).unwrap_or(&[])
    }

    fn unit(&self, id: &UnitId) -> Option<&UnitInfo> {
        let (room_name, index) = self.unit_index.get(id)?;

        self.rooms.get(room_name)?.units.get(*index)
    }

    fn structure(&self, id: &StructureId) -> Option<&StructureInfo> {
        let (room_name, index) = self.structure_index.get(id)?;

        self.rooms.get(room_name)?.structures.get(*index)
    }

    fn squad_units(&self) -> Vec<&UnitInfo> {
        self.rooms
            .values()
            .flat_map(|room| room.units.iter())
            .filter(|u| u.my && u.squad.is_some())
            .collect()
    }

    fn exit_toward(&self, from: RoomName, to: RoomName) -> Option<Direction> {
        self.exits.get(&(from, to)).copied()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;

    #[test]
    fn test_unknown_room_reads_as_wall() {
        let world = WorldSnapshot::new(1);

        assert_eq!(world.terrain(room("W1N1"), xy(10, 10)), Terrain::Wall);
        assert!(world.units(room("W1N1")).is_empty());
    }

    #[test]
    fn test_walkable_tiles() {
        let mut world = WorldSnapshot::new(1);
        let r = room("W1N1");
        world.add_room(r);
        world.set_terrain(r, xy(5, 5), Terrain::Wall);
        world.set_terrain(r, xy(6, 6), Terrain::Wall);
        world.add_structure(structure("tunnel", StructureType::Road, pos(r, 6, 6), None));
        world.add_structure(structure("tower", StructureType::Tower, pos(r, 7, 7), Some("enemy")));

        assert!(!world.is_walkable(r, xy(5, 5)));
        assert!(world.is_walkable(r, xy(6, 6)));
        assert!(!world.is_walkable(r, xy(7, 7)));
        assert!(world.is_walkable(r, xy(8, 8)));
    }

    #[test]
    fn test_move_and_remove_keep_index() {
        let mut world = WorldSnapshot::new(1);
        let a = room("W1N1");
        let b = room("W2N1");

        world.add_unit(own_unit("one", pos(a, 1, 1)));
        world.add_unit(own_unit("two", pos(a, 2, 2)));
        world.add_unit(own_unit("three", pos(a, 3, 3)));

        world.move_unit(&UnitId::from("one"), pos(b, 48, 1));

        assert_eq!(world.unit(&UnitId::from("one")).map(|u| u.room_name()), Some(b));
        assert_eq!(world.unit(&UnitId::from("three")).map(|u| u.xy()), Some(xy(3, 3)));

        world.remove_unit(&UnitId::from("two"));

        assert!(world.unit(&UnitId::from("two")).is_none());
        assert_eq!(world.unit(&UnitId::from("three")).map(|u| u.xy()), Some(xy(3, 3)));
        assert_eq!(world.units(a).len(), 1);
    }

    #[test]
    fn test_barrier_classification() {
        let r = room("W1N1");
        let allies = AllyList {
            allies: vec!["friend".to_string()],
        };

        let wall = structure("wall", StructureType::Wall, pos(r, 1, 1), None);
        let enemy_rampart = structure("r1", StructureType::Rampart, pos(r, 2, 2), Some("enemy"));
        let ally_rampart = structure("r2", StructureType::Rampart, pos(r, 3, 3), Some("friend"));
        let open_rampart = public_rampart("r3", pos(r, 4, 4), "enemy");
        let spawn = structure("spawn", StructureType::Spawn, pos(r, 5, 5), Some("enemy"));

        assert!(wall.is_destructible_barrier(&allies));
        assert!(enemy_rampart.is_destructible_barrier(&allies));
        assert!(!ally_rampart.is_destructible_barrier(&allies));
        assert!(!open_rampart.is_destructible_barrier(&allies));
        assert!(!spawn.is_destructible_barrier(&allies));
        assert!(spawn.is_combat_structure());
        assert!(!wall.is_combat_structure());
    }
}
