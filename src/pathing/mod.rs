pub mod costmatrix;
pub mod footprint;
pub mod search;

use crate::constants::*;
use screeps::{Direction, Position, RoomCoordinate, RoomName, RoomXY};

/// All eight compass directions in clockwise order starting at the top.
pub const DIRECTIONS: [Direction; 8] = [
    Direction::Top,
    Direction::TopRight,
    Direction::Right,
    Direction::BottomRight,
    Direction::Bottom,
    Direction::BottomLeft,
    Direction::Left,
    Direction::TopLeft,
];

pub fn direction_offset(direction: Direction) -> (i32, i32) {
    match direction {
        Direction::Top => (0, -1),
        Direction::TopRight => (1, -1),
        Direction::Right => (1, 0),
        Direction::BottomRight => (1, 1),
        Direction::Bottom => (0, 1),
        Direction::BottomLeft => (-1, 1),
        Direction::Left => (-1, 0),
        Direction::TopLeft => (-1, -1),
    }
}

/// Direction of the single step that moves `from` closest to `to`. `None` when
/// the tiles are the same.
pub fn direction_between(from: RoomXY, to: RoomXY) -> Option<Direction> {
    let dx = (to.x.u8() as i32 - from.x.u8() as i32).signum();
    let dy = (to.y.u8() as i32 - from.y.u8() as i32).signum();

    DIRECTIONS.iter().copied().find(|d| direction_offset(*d) == (dx, dy))
}

pub fn offset_xy(xy: RoomXY, dx: i32, dy: i32) -> Option<RoomXY> {
    let x = xy.x.u8() as i32 + dx;
    let y = xy.y.u8() as i32 + dy;

    if !(0..ROOM_SIZE as i32).contains(&x) || !(0..ROOM_SIZE as i32).contains(&y) {
        return None;
    }

    RoomXY::checked_new(x as u8, y as u8).ok()
}

pub fn step_xy(xy: RoomXY, direction: Direction) -> Option<RoomXY> {
    let (dx, dy) = direction_offset(direction);

    offset_xy(xy, dx, dy)
}

/// Chebyshev distance between two tiles of the same room.
pub fn xy_range(a: RoomXY, b: RoomXY) -> u32 {
    let dx = (a.x.u8() as i32 - b.x.u8() as i32).unsigned_abs();
    let dy = (a.y.u8() as i32 - b.y.u8() as i32).unsigned_abs();

    dx.max(dy)
}

pub fn pos_xy(pos: Position) -> RoomXY {
    RoomXY { x: pos.x(), y: pos.y() }
}

pub fn xy_pos(xy: RoomXY, room_name: RoomName) -> Position {
    Position::new(xy.x, xy.y, room_name)
}

pub fn is_room_edge(xy: RoomXY) -> bool {
    let x = xy.x.u8();
    let y = xy.y.u8();

    x == 0 || y == 0 || x == ROOM_MAX || y == ROOM_MAX
}

/// Tiles a unit can stand on without being carried into a neighbouring room.
pub fn in_walkable_bounds(xy: RoomXY) -> bool {
    !is_room_edge(xy)
}

/// Whether the tile lies inside the band `margin` tiles away from every edge.
pub fn in_interior(xy: RoomXY, margin: u8) -> bool {
    let low = margin;
    let high = ROOM_MAX.saturating_sub(margin);

    (low..=high).contains(&xy.x.u8()) && (low..=high).contains(&xy.y.u8())
}

pub fn room_center(room_name: RoomName) -> Position {
    let center = RoomCoordinate::new(ROOM_CENTER).unwrap_or_else(|_| unreachable!());

    Position::new(center, center, room_name)
}

/// Iterate every tile of a room in row-major order.
pub fn room_tiles() -> impl Iterator<Item = RoomXY> {
    (0..ROOM_SIZE).flat_map(|y| (0..ROOM_SIZE).filter_map(move |x| RoomXY::checked_new(x, y).ok()))
}
