use super::mode::Mode;
use crate::world::*;
use screeps::Position;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// State kept per squad identifier across ticks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SquadMemory {
    /// Clear tile last used to re-form the block.
    pub packing_anchor: Option<Position>,
}

/// State kept per acting leader across ticks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaderMemory {
    pub mode: Mode,
}

/// Cross-tick squad state. The planner writes only the acting leader's entry
/// and its own squad's entry.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SquadMemoryStore {
    squads: HashMap<SquadId, SquadMemory>,
    leaders: HashMap<UnitId, LeaderMemory>,
}

impl SquadMemoryStore {
    pub fn squad(&self, squad: &SquadId) -> Option<&SquadMemory> {
        self.squads.get(squad)
    }

    pub fn squad_mut(&mut self, squad: &SquadId) -> &mut SquadMemory {
        self.squads.entry(squad.clone()).or_default()
    }

    /// The mode this leader last acted under. A unit that has never led
    /// starts from `Assembly`, which carries no stickiness.
    pub fn leader_mode(&self, leader: &UnitId) -> Mode {
        self.leaders.get(leader).map(|m| m.mode.clone()).unwrap_or_default()
    }

    pub fn set_leader_mode(&mut self, leader: &UnitId, mode: Mode) {
        self.leaders.entry(leader.clone()).or_default().mode = mode;
    }

    /// Drop squad entries whose identifier fails `keep`.
    pub fn retain_squads<F>(&mut self, mut keep: F)
    where
        F: FnMut(&SquadId) -> bool,
    {
        self.squads.retain(|id, _| keep(id));
    }

    /// Drop leader entries whose unit fails `keep`.
    pub fn retain_leaders<F>(&mut self, mut keep: F)
    where
        F: FnMut(&UnitId) -> bool,
    {
        self.leaders.retain(|id, _| keep(id));
    }
}
