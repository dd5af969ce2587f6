use crate::pathing::*;
use crate::world::*;
use screeps::{Direction, RoomXY};

/// Whether every member can take one step in `direction`: the destination is
/// inside the walkable bounds, terrain and structures allow standing there,
/// and any unit already on it belongs to the squad.
pub fn step_feasible<W>(world: &W, members: &[&UnitInfo], direction: Direction) -> bool
where
    W: WorldView + ?Sized,
{
    members.iter().all(|member| {
        let room_name = member.room_name();

        let dest = match step_xy(member.xy(), direction) {
            Some(dest) => dest,
            None => return false,
        };

        if !in_walkable_bounds(dest) || !world.is_walkable(room_name, dest) {
            return false;
        }

        match world.unit_at(room_name, dest) {
            Some(occupant) => members.iter().any(|m| m.id == occupant.id),
            None => true,
        }
    })
}

/// Pick the shared step for a rigid block. The searched direction wins when
/// feasible; otherwise the feasible direction that leaves the leader closest
/// to the goal. `None` means the block cannot move this tick.
pub fn choose_step<W>(world: &W, members: &[&UnitInfo], leader: &UnitInfo, candidate: Direction, goal: RoomXY) -> Option<Direction>
where
    W: WorldView + ?Sized,
{
    if step_feasible(world, members, candidate) {
        return Some(candidate);
    }

    DIRECTIONS
        .iter()
        .copied()
        .filter(|d| *d != candidate)
        .filter(|d| step_feasible(world, members, *d))
        .filter_map(|d| step_xy(leader.xy(), d).map(|dest| (d, xy_range(dest, goal))))
        .min_by_key(|(_, range)| *range)
        .map(|(d, _)| d)
}
