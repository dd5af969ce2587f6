use super::*;
use crate::world::*;
use screeps::{LocalCostMatrix, RoomName, RoomXY, StructureType, Terrain};

/// Per-tile traversal costs for a single room. `COST_BLOCKED` tiles are
/// impassable.
pub struct CostField {
    matrix: LocalCostMatrix,
}

impl Default for CostField {
    fn default() -> Self {
        CostField::new()
    }
}

impl CostField {
    /// A field with every tile at the plain cost.
    pub fn new() -> CostField {
        CostField::from_fn(|_| COST_PLAIN)
    }

    pub fn from_fn<F>(mut cost: F) -> CostField
    where
        F: FnMut(RoomXY) -> u8,
    {
        let mut matrix = LocalCostMatrix::new();

        for xy in room_tiles() {
            matrix.set(xy, cost(xy));
        }

        CostField { matrix }
    }

    pub fn get(&self, xy: RoomXY) -> u8 {
        self.matrix.get(xy)
    }

    pub fn set(&mut self, xy: RoomXY, cost: u8) {
        self.matrix.set(xy, cost);
    }

    pub fn is_blocked(&self, xy: RoomXY) -> bool {
        self.get(xy) == COST_BLOCKED
    }

    /// Block every edge tile so searches cannot route out of the room.
    pub fn forbid_border(&mut self) {
        for xy in room_tiles().filter(|xy| is_room_edge(*xy)) {
            self.set(xy, COST_BLOCKED);
        }
    }
}

/// Build the base cost field for a room: terrain, then roads and containers,
/// then blocking structures and every unit that is not one of `members`.
pub fn build_cost_field<W>(world: &W, room_name: RoomName, members: &[UnitId]) -> CostField
where
    W: WorldView + ?Sized,
{
    let mut field = CostField::from_fn(|xy| match world.terrain(room_name, xy) {
        Terrain::Plain => COST_PLAIN,
        Terrain::Swamp => COST_SWAMP,
        Terrain::Wall => COST_BLOCKED,
    });

    let structures = world.structures(room_name);

    for structure in structures.iter().filter(|s| s.structure_type == StructureType::Road) {
        field.set(pos_xy(structure.pos), COST_ROAD);
    }

    for structure in structures.iter().filter(|s| s.structure_type == StructureType::Container) {
        let xy = pos_xy(structure.pos);
        field.set(xy, field.get(xy).max(COST_CONTAINER));
    }

    for structure in structures.iter().filter(|s| !s.is_walkable()) {
        field.set(pos_xy(structure.pos), COST_BLOCKED);
    }

    for unit in world.units(room_name).iter().filter(|u| !members.contains(&u.id)) {
        field.set(pos_xy(unit.pos), COST_BLOCKED);
    }

    field
}
