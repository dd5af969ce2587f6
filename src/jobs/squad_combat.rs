use super::orders::*;
use crate::cache::TickCache;
use crate::features::SquadSettings;
use crate::military::combat::*;
use crate::military::memory::SquadMemoryStore;
use crate::military::plan::*;
use crate::military::squad::*;
use crate::military::tower::*;
use crate::serialize::*;
use crate::world::*;
use itertools::*;
use log::*;
use serde::{Deserialize, Serialize};

/// Cross-tick state written to memory.
#[derive(Default, Serialize, Deserialize)]
struct PersistedSquadState {
    registry: SquadRegistry,
    memory: SquadMemoryStore,
}

/// Owns every squad's persisted state and turns each member's tick into
/// commands. The leader's plan is computed once per squad per tick, by
/// whichever member runs first.
pub struct SquadCoordinator {
    registry: SquadRegistry,
    memory: SquadMemoryStore,
    plans: TickCache<SquadId, SquadPlan>,
    settings: SquadSettings,
    classifier: AllyList,
}

impl SquadCoordinator {
    pub fn new(settings: SquadSettings, classifier: AllyList) -> SquadCoordinator {
        SquadCoordinator {
            registry: SquadRegistry::default(),
            memory: SquadMemoryStore::default(),
            plans: TickCache::default(),
            settings,
            classifier,
        }
    }

    pub fn settings(&self) -> &SquadSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: SquadSettings) {
        self.settings = settings;
    }

    pub fn registry(&self) -> &SquadRegistry {
        &self.registry
    }

    pub fn memory(&self) -> &SquadMemoryStore {
        &self.memory
    }

    /// Register newly visible members, drop squads with nobody left and
    /// forget the modes of leaders that died.
    pub fn pre_tick<W>(&mut self, world: &W)
    where
        W: WorldView + ?Sized,
    {
        self.registry.sync(world);

        let departed = self.registry.cleanup(world);

        if !departed.is_empty() {
            let registry = &self.registry;

            self.memory.retain_squads(|squad| registry.get(squad).is_some());
        }

        self.memory.retain_leaders(|leader| world.unit(leader).is_some());
    }

    /// Commands for one squad member this tick. `None` for units that are
    /// not registered members of a squad.
    pub fn run_unit<W>(&mut self, world: &W, unit_id: &UnitId) -> Option<UnitCommands>
    where
        W: WorldView + ?Sized,
    {
        let unit = world.unit(unit_id)?;
        let squad = unit.squad.as_ref()?.squad.clone();
        let roster = self.registry.roster(world, &squad)?;

        if !roster.contains(unit_id) {
            return None;
        }

        let (memory, settings, classifier) = (&mut self.memory, &self.settings, &self.classifier);

        let plan = self
            .plans
            .maybe_get_or_insert_with(world.time(), squad, || plan_squad(world, &roster, memory, settings, classifier))?;

        let members: Vec<&UnitInfo> = roster.present().map(|(_, u)| u).collect();
        let slot = roster.slot_of(unit_id)?;

        let towers = hostile_tower_positions(world, unit.room_name(), classifier);

        let context = AttackContext {
            slot,
            members: members.len(),
            breach_target: plan.breach_target(),
            classifier,
        };

        let commands = UnitCommands {
            movement: plan.order_for(unit_id),
            attack: select_attack(world, unit, &context),
            heal: select_heal_target(unit, &members, &towers),
            status: plan.status(),
        };

        Some(commands.resolve_pipelines())
    }

    /// Commands for every squad member visible this tick, ordered by unit id.
    pub fn run_squads<W>(&mut self, world: &W) -> Vec<(UnitId, UnitCommands)>
    where
        W: WorldView + ?Sized,
    {
        let ids: Vec<UnitId> = world.squad_units().iter().map(|u| u.id.clone()).sorted().collect();

        ids.into_iter()
            .filter_map(|id| self.run_unit(world, &id).map(|commands| (id, commands)))
            .collect()
    }

    pub fn run_towers<W>(&self, world: &W) -> Vec<TowerOrder>
    where
        W: WorldView + ?Sized,
    {
        world
            .room_names()
            .into_iter()
            .flat_map(|room_name| plan_tower_fire(world, room_name, &self.classifier))
            .collect()
    }

    pub fn save(&self) -> Result<String, String> {
        let state = PersistedSquadState {
            registry: self.registry.clone(),
            memory: self.memory.clone(),
        };

        encode_to_string(&state)
    }

    /// Restore persisted state. On failure the current state is kept.
    pub fn load(&mut self, data: &str) -> Result<(), String> {
        let state: PersistedSquadState = decode_from_string(data)?;

        info!("Loaded {} squads from memory", state.registry.len());

        self.registry = state.registry;
        self.memory = state.memory;
        self.plans.expire();

        Ok(())
    }
}
