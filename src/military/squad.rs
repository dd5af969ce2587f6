use crate::constants::*;
use crate::world::*;
use log::*;
use screeps::RoomName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─── Registry ───────────────────────────────────────────────────────────────

/// Registered members of one squad. A slot that has ever held a unit stays
/// bound to it; when that unit dies the slot is permanently empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SquadEntry {
    pub members: [Option<UnitId>; SQUAD_SIZE],
    pub spawn_room: RoomName,
    pub target_room: RoomName,
}

impl SquadEntry {
    fn new(spawn_room: RoomName, target_room: RoomName) -> SquadEntry {
        SquadEntry {
            members: Default::default(),
            spawn_room,
            target_room,
        }
    }

    pub fn ever_had_members(&self) -> bool {
        self.members.iter().any(|m| m.is_some())
    }
}

/// Why a unit's squad tag could not be registered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegisterError {
    Untagged,
    InvalidSlot(usize),
    SlotTaken { slot: usize, holder: UnitId },
}

/// Squad membership keyed by squad identifier. Only ever shrinks once a slot
/// is filled: a departed member is never replaced under the same identifier.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SquadRegistry {
    squads: HashMap<SquadId, SquadEntry>,
}

impl SquadRegistry {
    pub fn get(&self, squad: &SquadId) -> Option<&SquadEntry> {
        self.squads.get(squad)
    }

    pub fn len(&self) -> usize {
        self.squads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squads.is_empty()
    }

    /// Bind a tagged unit to its slot. Re-registering the current holder is a
    /// no-op.
    pub fn register(&mut self, unit: &UnitInfo) -> Result<(), RegisterError> {
        let tag = unit.squad.as_ref().ok_or(RegisterError::Untagged)?;

        if tag.slot >= SQUAD_SIZE {
            return Err(RegisterError::InvalidSlot(tag.slot));
        }

        let entry = self
            .squads
            .entry(tag.squad.clone())
            .or_insert_with(|| SquadEntry::new(tag.spawn_room, tag.target_room));

        match &entry.members[tag.slot] {
            Some(holder) if *holder == unit.id => Ok(()),
            Some(holder) => Err(RegisterError::SlotTaken {
                slot: tag.slot,
                holder: holder.clone(),
            }),
            None => {
                info!("Registered {} into squad {} slot {}", unit.id, tag.squad, tag.slot);

                entry.members[tag.slot] = Some(unit.id.clone());

                Ok(())
            }
        }
    }

    /// Register every tagged unit visible this tick.
    pub fn sync<W>(&mut self, world: &W)
    where
        W: WorldView + ?Sized,
    {
        for unit in world.squad_units() {
            if let Err(err) = self.register(unit) {
                warn!("Rejected squad registration for {}: {:?}", unit.id, err);
            }
        }
    }

    /// Drop squads with no live member. Returns the ids of the members that
    /// were registered to them.
    pub fn cleanup<W>(&mut self, world: &W) -> Vec<UnitId>
    where
        W: WorldView + ?Sized,
    {
        let dead: Vec<SquadId> = self
            .squads
            .iter()
            .filter(|(_, entry)| entry.members.iter().flatten().all(|id| world.unit(id).is_none()))
            .map(|(id, _)| id.clone())
            .collect();

        let mut departed = Vec::new();

        for squad in dead {
            if let Some(entry) = self.squads.remove(&squad) {
                info!("Squad {} has no remaining members, removing", squad);

                departed.extend(entry.members.into_iter().flatten());
            }
        }

        departed
    }

    pub fn roster<'a, W>(&self, world: &'a W, squad: &SquadId) -> Option<Roster<'a>>
    where
        W: WorldView + ?Sized,
    {
        let entry = self.squads.get(squad)?;

        let mut members = [None; SQUAD_SIZE];
        let mut seen = [false; SQUAD_SIZE];

        for (slot, id) in entry.members.iter().enumerate() {
            if let Some(id) = id {
                seen[slot] = true;
                members[slot] = world.unit(id);
            }
        }

        Some(Roster {
            squad: squad.clone(),
            members,
            seen,
            spawn_room: entry.spawn_room,
            target_room: entry.target_room,
        })
    }
}

// ─── Roster ─────────────────────────────────────────────────────────────────

/// Members of one squad resolved against this tick's world, indexed by slot.
#[derive(Clone, Debug)]
pub struct Roster<'a> {
    pub squad: SquadId,
    pub members: [Option<&'a UnitInfo>; SQUAD_SIZE],
    seen: [bool; SQUAD_SIZE],
    pub spawn_room: RoomName,
    pub target_room: RoomName,
}

impl<'a> Roster<'a> {
    pub fn is_complete(&self) -> bool {
        self.members.iter().all(|m| m.is_some())
    }

    pub fn any_spawning(&self) -> bool {
        self.present().any(|(_, u)| u.spawning)
    }

    /// Some slot has never had a unit.
    pub fn awaiting_spawn(&self) -> bool {
        self.seen.iter().any(|s| !s)
    }

    /// Some slot lost its unit.
    pub fn degraded(&self) -> bool {
        self.seen.iter().zip(self.members.iter()).any(|(seen, m)| *seen && m.is_none())
    }

    /// The room every present member is in, if they share one.
    pub fn same_room(&self) -> Option<RoomName> {
        let mut rooms = self.present().map(|(_, u)| u.room_name());
        let first = rooms.next()?;

        rooms.all(|r| r == first).then_some(first)
    }

    /// Lowest occupied slot.
    pub fn leader(&self) -> Option<(usize, &'a UnitInfo)> {
        self.present().next()
    }

    pub fn present(&self) -> impl Iterator<Item = (usize, &'a UnitInfo)> + '_ {
        self.members.iter().enumerate().filter_map(|(slot, m)| m.map(|u| (slot, u)))
    }

    pub fn member_ids(&self) -> Vec<UnitId> {
        self.present().map(|(_, u)| u.id.clone()).collect()
    }

    pub fn slot_of(&self, id: &UnitId) -> Option<usize> {
        self.present().find(|(_, u)| u.id == *id).map(|(slot, _)| slot)
    }

    pub fn contains(&self, id: &UnitId) -> bool {
        self.slot_of(id).is_some()
    }
}
