/// Width and height of a room in tiles.
pub const ROOM_SIZE: u8 = 50;

/// Highest coordinate on either axis.
pub const ROOM_MAX: u8 = ROOM_SIZE - 1;

/// Center tile coordinate used as the convergence point when crossing and entering rooms.
pub const ROOM_CENTER: u8 = 25;

/// Number of formation slots in a squad.
pub const SQUAD_SIZE: usize = 4;

//
// Cost field values.
//

pub const COST_BLOCKED: u8 = 255;
pub const COST_ROAD: u8 = 1;
pub const COST_PLAIN: u8 = 2;
pub const COST_CONTAINER: u8 = 5;
pub const COST_SWAMP: u8 = 10;

//
// Action ranges.
//

pub const MELEE_RANGE: u32 = 1;
pub const RANGED_RANGE: u32 = 3;
pub const HEAL_RANGE: u32 = 1;

/// Heal per active HEAL part when adjacent.
pub const HEAL_POWER: u32 = 12;

//
// Tower falloff model.
//

pub const TOWER_OPTIMAL_RANGE: u32 = 5;
pub const TOWER_FALLOFF_RANGE: u32 = 20;
pub const TOWER_POWER_ATTACK: f32 = 600.0;
pub const TOWER_POWER_ATTACK_MIN: f32 = 150.0;
