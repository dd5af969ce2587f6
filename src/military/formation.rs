use super::squad::Roster;
use crate::jobs::orders::MoveOrder;
use crate::pathing::costmatrix::CostField;
use crate::pathing::footprint::*;
use crate::pathing::*;
use crate::world::*;
use screeps::RoomXY;

/// Offset of each slot relative to the anchor at slot 0's tile. The anchor is
/// top-left; the others fill right, below, and diagonal.
pub const QUAD_OFFSETS: [(i32, i32); 4] = QUAD_FOOTPRINT;

/// Tile a slot occupies when the block is anchored at `anchor`.
pub fn templated_tile(anchor: RoomXY, slot: usize) -> Option<RoomXY> {
    let (dx, dy) = QUAD_OFFSETS.get(slot)?;

    offset_xy(anchor, *dx, *dy)
}

/// Every member present, in one room, and at its template offset from the
/// leader.
pub fn is_intact(roster: &Roster) -> bool {
    let (leader_slot, leader) = match roster.leader() {
        Some(leader) => leader,
        None => return false,
    };

    if !roster.is_complete() || roster.same_room().is_none() {
        return false;
    }

    let (lx, ly) = QUAD_OFFSETS[leader_slot];

    roster.present().all(|(slot, unit)| {
        let (sx, sy) = QUAD_OFFSETS[slot];

        offset_xy(leader.xy(), sx - lx, sy - ly) == Some(unit.xy())
    })
}

/// Anchor to re-form on: the remembered anchor while it stays clear and next
/// to the leader, else the leader's tile, else the first clear tile around the
/// leader. `field` must be the base field built with the squad's members
/// treated as passable.
pub fn find_reform_anchor(field: &CostField, leader: RoomXY, remembered: Option<RoomXY>) -> Option<RoomXY> {
    let clear = |xy: &RoomXY| footprint_clear(field, *xy, &QUAD_FOOTPRINT);

    if let Some(anchor) = remembered.filter(|a| xy_range(*a, leader) <= 1).filter(clear) {
        return Some(anchor);
    }

    std::iter::once(leader)
        .chain(DIRECTIONS.iter().filter_map(|d| step_xy(leader, *d)))
        .find(clear)
}

/// Orders sending every misplaced member to its templated tile. An intact
/// block gets none.
pub fn reform_orders(roster: &Roster, anchor: RoomXY) -> Vec<(UnitId, MoveOrder)> {
    if is_intact(roster) {
        return Vec::new();
    }

    roster
        .present()
        .filter_map(|(slot, unit)| {
            let tile = templated_tile(anchor, slot)?;

            if tile == unit.xy() {
                None
            } else {
                Some((
                    unit.id.clone(),
                    MoveOrder::MoveTo {
                        pos: xy_pos(tile, unit.room_name()),
                        range: 0,
                    },
                ))
            }
        })
        .collect()
}
