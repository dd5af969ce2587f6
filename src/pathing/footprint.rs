use super::costmatrix::CostField;
use super::*;
use screeps::RoomXY;

/// Tiles a 2x2 formation occupies relative to its top-left anchor.
pub const QUAD_FOOTPRINT: [(i32, i32); 4] = [(0, 0), (1, 0), (0, 1), (1, 1)];

/// Dilate a cost field by a footprint so every tile holds the cost of placing
/// the footprint's anchor there: the maximum over the covered tiles, or
/// `COST_BLOCKED` when any covered tile is blocked or outside the room. With
/// `forbid_border` set, covered edge tiles count as blocked.
pub fn dilate(base: &CostField, footprint: &[(i32, i32)], forbid_border: bool) -> CostField {
    CostField::from_fn(|anchor| footprint_cost(base, anchor, footprint, forbid_border))
}

fn footprint_cost(base: &CostField, anchor: RoomXY, footprint: &[(i32, i32)], forbid_border: bool) -> u8 {
    let mut cost = 0;

    for (dx, dy) in footprint {
        let xy = match offset_xy(anchor, *dx, *dy) {
            Some(xy) => xy,
            None => return COST_BLOCKED,
        };

        if forbid_border && is_room_edge(xy) {
            return COST_BLOCKED;
        }

        let tile = base.get(xy);

        if tile == COST_BLOCKED {
            return COST_BLOCKED;
        }

        cost = cost.max(tile);
    }

    cost
}

/// Whether a footprint anchored at `anchor` covers only walkable tiles inside
/// the walkable bounds.
pub fn footprint_clear(base: &CostField, anchor: RoomXY, footprint: &[(i32, i32)]) -> bool {
    footprint_cost(base, anchor, footprint, true) != COST_BLOCKED
}
