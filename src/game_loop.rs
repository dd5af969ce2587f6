use crate::features;
use crate::jobs::orders::*;
use crate::jobs::squad_combat::SquadCoordinator;
use crate::military::bodies::Capabilities;
use crate::memory_helper;
use crate::pathing::*;
use crate::world::*;
use log::*;
use screeps::prelude::*;
use screeps::{find, game, Creep, Direction, Part, RoomName, StructureObject};
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::HashMap;
use wasm_bindgen::JsValue;

const STATE_MEMORY_PATH: &str = "_squads";

struct GameEnvironment {
    coordinator: SquadCoordinator,
    tick: Option<u32>,
}

thread_local! {
    static ENVIRONMENT: RefCell<Option<GameEnvironment>> = const { RefCell::new(None) };
}

/// Squad tag as the spawn collaborator writes it into creep memory.
#[derive(Deserialize)]
struct SquadTagMemory {
    squad: String,
    slot: usize,
    spawn_room: String,
    target_room: String,
}

impl SquadTagMemory {
    fn into_tag(self) -> Result<SquadTag, String> {
        let spawn_room: RoomName = self.spawn_room.parse().map_err(|_| format!("invalid spawn room {}", self.spawn_room))?;
        let target_room: RoomName = self.target_room.parse().map_err(|_| format!("invalid target room {}", self.target_room))?;

        Ok(SquadTag {
            squad: SquadId(self.squad),
            slot: self.slot,
            spawn_room,
            target_room,
        })
    }
}

fn read_squad_tag(creep: &Creep) -> Option<SquadTag> {
    let memory = creep.memory();
    let value = js_sys::Reflect::get(&memory, &JsValue::from_str("squad")).ok()?;

    if value.is_undefined() || value.is_null() {
        return None;
    }

    serde_wasm_bindgen::from_value::<SquadTagMemory>(value)
        .map_err(|e| e.to_string())
        .and_then(SquadTagMemory::into_tag)
        .map_err(|err| warn!("Invalid squad tag on {}: {}", creep.name(), err))
        .ok()
}

// ─── Snapshot ───────────────────────────────────────────────────────────────

/// Live game objects behind the ids in a snapshot, used to apply commands.
#[derive(Default)]
struct GameObjects {
    creeps: HashMap<UnitId, Creep>,
    structures: HashMap<StructureId, StructureObject>,
}

fn unit_from_creep(creep: &Creep) -> Option<UnitInfo> {
    let id = if creep.my() {
        creep.name()
    } else {
        creep.try_raw_id()?.to_string()
    };

    let body = creep.body();
    let capabilities = Capabilities::from_parts(body.iter().filter(|p| p.hits() > 0).map(|p| p.part()));
    let heal_parts = body.iter().filter(|p| p.hits() > 0 && p.part() == Part::Heal).count() as u32;

    let mut unit = UnitInfo::new(&id, creep.pos(), &creep.owner().username(), creep.my())
        .with_hits(creep.hits(), creep.hits_max())
        .with_fatigue(creep.fatigue())
        .with_spawning(creep.spawning())
        .with_capabilities(capabilities, heal_parts);

    if creep.my() {
        if let Some(tag) = read_squad_tag(creep) {
            unit = unit.with_squad(tag);
        }
    }

    Some(unit)
}

fn structure_info(structure: &StructureObject) -> StructureInfo {
    let base = structure.as_structure();
    let id = base.raw_id().to_string();

    let mut info = StructureInfo::new(&id, base.structure_type(), base.pos()).with_hits(base.hits());

    if let Some(owned) = structure.as_owned() {
        if let Some(owner) = owned.owner() {
            info = info.with_owner(&owner.username(), owned.my());
        }
    }

    if let StructureObject::StructureRampart(rampart) = structure {
        info = info.with_public(rampart.is_public());
    }

    info
}

/// Edge of `from` facing `to`, by the larger axis of separation.
fn exit_direction(from: RoomName, to: RoomName) -> Option<Direction> {
    let (dx, dy) = (to.x_coord() - from.x_coord(), to.y_coord() - from.y_coord());

    match (dx, dy) {
        (0, 0) => None,
        (dx, dy) if dx.abs() >= dy.abs() => Some(if dx > 0 { Direction::Right } else { Direction::Left }),
        (_, dy) => Some(if dy > 0 { Direction::Bottom } else { Direction::Top }),
    }
}

fn capture_world() -> (WorldSnapshot, GameObjects) {
    let mut world = WorldSnapshot::new(game::time());
    let mut objects = GameObjects::default();

    for room in game::rooms().values() {
        let room_name = room.name();
        world.add_room(room_name);

        if let Some(mut terrain) = game::map::get_room_terrain(room_name) {
            for xy in room_tiles() {
                world.set_terrain(room_name, xy, terrain.get_xy(xy));
            }
        }

        for structure in room.find(find::STRUCTURES, None) {
            let info = structure_info(&structure);
            objects.structures.insert(info.id.clone(), structure);
            world.add_structure(info);
        }

        for creep in room.find(find::CREEPS, None) {
            if let Some(unit) = unit_from_creep(&creep) {
                objects.creeps.insert(unit.id.clone(), creep);
                world.add_unit(unit);
            }
        }
    }

    let routes: Vec<(RoomName, RoomName)> = world
        .squad_units()
        .iter()
        .filter_map(|u| u.squad.as_ref().map(|tag| (u.room_name(), tag.target_room)))
        .collect();

    for (from, to) in routes {
        if let Some(direction) = exit_direction(from, to) {
            world.set_exit(from, to, direction);
        }
    }

    (world, objects)
}

// ─── Command application ────────────────────────────────────────────────────

fn log_failure<E: std::fmt::Debug>(creep: &Creep, action: &str, result: Result<(), E>) {
    if let Err(err) = result {
        debug!("{} failed for {}: {:?}", action, creep.name(), err);
    }
}

fn apply_commands(creep: &Creep, commands: &UnitCommands, objects: &GameObjects, say_status: bool) {
    match &commands.movement {
        MoveOrder::Direction(direction) => log_failure(creep, "Move", creep.move_direction(*direction)),
        MoveOrder::MoveTo { pos, range } if creep.pos().get_range_to(*pos) > *range => log_failure(creep, "Move", creep.move_to(*pos)),
        _ => {}
    }

    if let Some(attack) = &commands.attack {
        match &attack.target {
            AttackTarget::Unit(id) => {
                if let Some(target) = objects.creeps.get(id) {
                    if attack.melee {
                        log_failure(creep, "Attack", creep.attack(target));
                    }
                    if attack.ranged {
                        log_failure(creep, "Ranged attack", creep.ranged_attack(target));
                    }
                }
            }
            AttackTarget::Structure(id) => {
                if let Some(target) = objects.structures.get(id).and_then(|s| s.as_attackable()) {
                    if attack.melee {
                        log_failure(creep, "Attack", creep.attack(target));
                    }
                    if attack.ranged {
                        log_failure(creep, "Ranged attack", creep.ranged_attack(target));
                    }
                }
            }
        }
    }

    if let Some(heal) = &commands.heal {
        if let Some(target) = objects.creeps.get(&heal.target) {
            if heal.ranged {
                log_failure(creep, "Ranged heal", creep.ranged_heal(target));
            } else {
                log_failure(creep, "Heal", creep.heal(target));
            }
        }
    }

    if say_status {
        log_failure(creep, "Say", creep.say(&commands.status.summary(), false));
    }
}

// ─── Tick ───────────────────────────────────────────────────────────────────

fn create_environment() -> GameEnvironment {
    info!("Initializing squad environment");

    let mut coordinator = SquadCoordinator::new(features::memory::load(), features::memory::allies());

    if let Some(data) = memory_helper::path_string(STATE_MEMORY_PATH) {
        if let Err(err) = coordinator.load(&data) {
            warn!("Discarding unreadable squad state: {}", err);
        }
    }

    GameEnvironment { coordinator, tick: None }
}

pub fn tick() {
    let current_time = game::time();

    ENVIRONMENT.with(|cell| {
        let mut environment = cell.borrow_mut();

        let stale = environment
            .as_ref()
            .and_then(|e| e.tick)
            .map(|t| t + 1 != current_time)
            .unwrap_or(false);

        if stale {
            info!("Tick gap detected, reloading squad state");
            *environment = None;
        }

        let GameEnvironment { coordinator, tick } = environment.get_or_insert_with(create_environment);

        coordinator.set_settings(features::memory::load());
        *tick = Some(current_time);

        let (world, objects) = capture_world();

        coordinator.pre_tick(&world);

        let say_status = coordinator.settings().say_status;

        for (id, commands) in coordinator.run_squads(&world) {
            if let Some(creep) = objects.creeps.get(&id) {
                apply_commands(creep, &commands, &objects, say_status);
            }
        }

        for order in coordinator.run_towers(&world) {
            let tower = match objects.structures.get(&order.tower) {
                Some(StructureObject::StructureTower(tower)) => tower,
                _ => continue,
            };

            if let Some(target) = objects.creeps.get(&order.target) {
                if let Err(err) = tower.attack(target) {
                    debug!("Tower {} failed to fire: {:?}", order.tower, err);
                }
            }
        }

        if coordinator.settings().persist {
            let saved = coordinator.save().and_then(|data| memory_helper::path_set(STATE_MEMORY_PATH, data));

            if let Err(err) = saved {
                warn!("Failed to persist squad state: {}", err);
            }
        }
    });
}
