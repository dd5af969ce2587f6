use super::costmatrix::CostField;
use super::*;
use pathfinding::prelude::{astar, dijkstra_all};
use screeps::RoomXY;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// Tiles to visit in order, excluding the start.
    pub path: Vec<RoomXY>,
    pub cost: u32,
    /// The goal range could not be reached. `path` leads to the reachable tile
    /// closest to the goal instead.
    pub incomplete: bool,
}

impl SearchResult {
    pub fn first_step(&self) -> Option<RoomXY> {
        self.path.first().copied()
    }

    pub fn last_tile(&self) -> Option<RoomXY> {
        self.path.last().copied()
    }
}

fn successors(field: &CostField, xy: RoomXY) -> Vec<(RoomXY, u32)> {
    DIRECTIONS
        .iter()
        .filter_map(|d| step_xy(xy, *d))
        .filter(|next| !field.is_blocked(*next))
        .map(|next| (next, field.get(next) as u32))
        .collect()
}

fn distance_squared(a: RoomXY, b: RoomXY) -> u32 {
    let dx = a.x.u8() as i32 - b.x.u8() as i32;
    let dy = a.y.u8() as i32 - b.y.u8() as i32;

    (dx * dx + dy * dy) as u32
}

/// Cheapest 8-connected path from `start` to any tile within `range` of
/// `goal`. Entering a tile costs its field value and blocked tiles are never
/// entered, though the start itself may be blocked. When the goal cannot be
/// reached the result is a partial path to the reachable tile nearest the
/// goal, preferring the straighter line to the goal, then lower cost, then
/// lower `(y, x)`.
pub fn find_path(field: &CostField, start: RoomXY, goal: RoomXY, range: u32) -> SearchResult {
    let found = astar(
        &start,
        |xy| successors(field, *xy),
        |xy| xy_range(*xy, goal).saturating_sub(range),
        |xy| xy_range(*xy, goal) <= range,
    );

    if let Some((mut path, cost)) = found {
        path.remove(0);

        return SearchResult {
            path,
            cost,
            incomplete: false,
        };
    }

    let reachable = dijkstra_all(&start, |xy| successors(field, *xy));

    let closest = reachable
        .iter()
        .map(|(xy, (_, cost))| (*xy, *cost))
        .chain(std::iter::once((start, 0)))
        .min_by_key(|(xy, cost)| (xy_range(*xy, goal), distance_squared(*xy, goal), *cost, xy.y.u8(), xy.x.u8()));

    let (end, cost) = match closest {
        Some(closest) => closest,
        None => (start, 0),
    };

    let mut path = Vec::new();
    let mut current = end;

    while current != start {
        path.push(current);

        current = match reachable.get(&current) {
            Some((parent, _)) => *parent,
            None => break,
        };
    }

    path.reverse();

    SearchResult {
        path,
        cost,
        incomplete: true,
    }
}
