use crate::pathing::*;
use crate::world::*;
use screeps::{RoomName, RoomXY};

/// Radius around the end of the partial path searched for an obstruction.
const BREACH_SEARCH_RADIUS: u32 = 1;

/// Destructible obstruction to attack when no single-width route exists.
/// Searches around `stall` (where the partial path ends) and prefers the
/// barrier closest to the goal, then the weakest.
pub fn find_breach_target<W>(world: &W, room_name: RoomName, stall: RoomXY, goal: RoomXY, classifier: &dyn HostileClassifier) -> Option<StructureId>
where
    W: WorldView + ?Sized,
{
    world
        .structures(room_name)
        .iter()
        .filter(|s| xy_range(s.xy(), stall) <= BREACH_SEARCH_RADIUS)
        .filter(|s| s.is_destructible_barrier(classifier))
        .min_by_key(|s| (xy_range(s.xy(), goal), s.hits, s.id.clone()))
        .map(|s| s.id.clone())
}
