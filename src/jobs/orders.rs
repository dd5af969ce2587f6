use super::actions::SimultaneousActionFlags;
use crate::status::SquadStatus;
use crate::world::*;
use screeps::{Direction, Position};

/// How a unit should move this tick.
#[derive(Clone, Debug, PartialEq)]
pub enum MoveOrder {
    /// One step in a fixed direction, shared by every member in rigid modes.
    Direction(Direction),
    /// Path toward a tile until within `range`.
    MoveTo { pos: Position, range: u32 },
    Hold,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttackTarget {
    Unit(UnitId),
    Structure(StructureId),
}

/// Melee and ranged fire on a single target; either or both may be set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackOrder {
    pub target: AttackTarget,
    pub melee: bool,
    pub ranged: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HealOrder {
    pub target: UnitId,
    /// Heal from range instead of touching the target.
    pub ranged: bool,
}

/// Everything a squad member should do this tick.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitCommands {
    pub movement: MoveOrder,
    pub attack: Option<AttackOrder>,
    pub heal: Option<HealOrder>,
    pub status: SquadStatus,
}

impl UnitCommands {
    /// Drop any command that would collide with another in the same action
    /// pipeline. Move, melee, ranged and heal each have their own.
    pub fn resolve_pipelines(mut self) -> UnitCommands {
        let mut used = SimultaneousActionFlags::UNSET;

        if !matches!(self.movement, MoveOrder::Hold) {
            used.consume(SimultaneousActionFlags::MOVE);
        }

        if let Some(attack) = self.attack.as_mut() {
            if attack.melee && !used.consume(SimultaneousActionFlags::ATTACK) {
                attack.melee = false;
            }

            if attack.ranged && !used.consume(SimultaneousActionFlags::RANGED_ATTACK) {
                attack.ranged = false;
            }
        }

        if self.attack.as_ref().map(|a| !a.melee && !a.ranged).unwrap_or(false) {
            self.attack = None;
        }

        if let Some(heal) = self.heal.as_ref() {
            let flags = if heal.ranged {
                SimultaneousActionFlags::RANGED_HEAL
            } else {
                SimultaneousActionFlags::HEAL
            };

            if !used.consume(flags) {
                self.heal = None;
            }
        }

        self
    }
}
