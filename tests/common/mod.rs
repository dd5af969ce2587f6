#![allow(dead_code)]

use screeps::{Direction, Position, RoomCoordinate, RoomName, RoomXY, StructureType, Terrain};
use screeps_quad::features::SquadSettings;
use screeps_quad::jobs::orders::*;
use screeps_quad::jobs::squad_combat::SquadCoordinator;
use screeps_quad::military::bodies::Capabilities;
use screeps_quad::military::plan::exit_tile;
use screeps_quad::pathing::costmatrix::build_cost_field;
use screeps_quad::pathing::search::find_path;
use screeps_quad::pathing::*;
use screeps_quad::world::*;
use std::collections::{BTreeMap, HashMap, HashSet};

pub const RANGED_DAMAGE: u32 = 10;
pub const MELEE_DAMAGE: u32 = 30;

pub fn room(name: &str) -> RoomName {
    name.parse().unwrap()
}

pub fn xy(x: u8, y: u8) -> RoomXY {
    RoomXY::checked_new(x, y).unwrap()
}

pub fn pos(room_name: RoomName, x: u8, y: u8) -> Position {
    Position::new(RoomCoordinate::new(x).unwrap(), RoomCoordinate::new(y).unwrap(), room_name)
}

pub fn member(id: &str, at: Position, slot: usize, spawn_room: RoomName, target_room: RoomName, capabilities: Capabilities) -> UnitInfo {
    let heal_parts = if capabilities.contains(Capabilities::HEAL) { 1 } else { 0 };

    UnitInfo::new(id, at, "me", true)
        .with_capabilities(capabilities, heal_parts)
        .with_squad(SquadTag {
            squad: SquadId::from("alpha"),
            slot,
            spawn_room,
            target_room,
        })
}

/// Four members of squad `alpha` in slot order at the given tiles.
pub fn add_squad(world: &mut WorldSnapshot, room_name: RoomName, tiles: [(u8, u8); 4], spawn_room: RoomName, target_room: RoomName, capabilities: Capabilities) {
    for (slot, (x, y)) in tiles.iter().enumerate() {
        world.add_unit(member(&format!("q{}", slot), pos(room_name, *x, *y), slot, spawn_room, target_room, capabilities));
    }
}

pub fn hostile(id: &str, at: Position, capabilities: Capabilities, heal_parts: u32) -> UnitInfo {
    UnitInfo::new(id, at, "enemy", false).with_capabilities(capabilities, heal_parts)
}

pub fn enemy_structure(id: &str, structure_type: StructureType, at: Position) -> StructureInfo {
    StructureInfo::new(id, structure_type, at).with_owner("enemy", false)
}

/// Terrain walls down column `x`, leaving the rows in `gaps` open.
pub fn wall_column(world: &mut WorldSnapshot, room_name: RoomName, x: u8, gaps: &[u8]) {
    for y in 0..50 {
        if !gaps.contains(&y) {
            world.set_terrain(room_name, xy(x, y), Terrain::Wall);
        }
    }
}

pub fn unit_id(id: &str) -> UnitId {
    UnitId::from(id)
}

pub fn commands_for<'a>(commands: &'a [(UnitId, UnitCommands)], id: &str) -> &'a UnitCommands {
    &commands.iter().find(|(unit, _)| unit.0 == id).unwrap().1
}

fn opposite(direction: Direction) -> Direction {
    match direction {
        Direction::Top => Direction::Bottom,
        Direction::Bottom => Direction::Top,
        Direction::Left => Direction::Right,
        Direction::Right => Direction::Left,
        other => other,
    }
}

/// A few rooms plus enough game rules to play squad commands forward: moves
/// resolve simultaneously, stepping onto a linked room edge carries a unit
/// into the neighbouring room, and attacks wear structures down.
pub struct Simulator {
    pub world: WorldSnapshot,
    pub coordinator: SquadCoordinator,
    links: HashMap<(RoomName, Direction), RoomName>,
    /// Edge tile each unit stepped on when leaving a room.
    pub crossings: Vec<(UnitId, Position)>,
}

impl Simulator {
    pub fn new(world: WorldSnapshot) -> Simulator {
        Simulator {
            world,
            coordinator: SquadCoordinator::new(SquadSettings::default(), AllyList::default()),
            links: HashMap::new(),
            crossings: Vec::new(),
        }
    }

    /// Join two rooms along the `direction` edge of `from`.
    pub fn link(&mut self, from: RoomName, direction: Direction, to: RoomName) {
        self.world.add_room(from);
        self.world.add_room(to);
        self.world.set_exit(from, to, direction);
        self.world.set_exit(to, from, opposite(direction));
        self.links.insert((from, direction), to);
        self.links.insert((to, opposite(direction)), from);
    }

    pub fn unit(&self, id: &str) -> &UnitInfo {
        self.world.unit(&unit_id(id)).unwrap()
    }

    /// Run one tick: plan, apply the commands, advance time.
    pub fn tick(&mut self) -> Vec<(UnitId, UnitCommands)> {
        self.coordinator.pre_tick(&self.world);

        let commands = self.coordinator.run_squads(&self.world);

        self.apply_attacks(&commands);
        self.apply_moves(&commands);

        let next = self.world.time() + 1;
        self.world.set_time(next);

        commands
    }

    fn apply_attacks(&mut self, commands: &[(UnitId, UnitCommands)]) {
        for (_, unit_commands) in commands {
            let attack = match &unit_commands.attack {
                Some(attack) => attack,
                None => continue,
            };

            if let AttackTarget::Structure(id) = &attack.target {
                let damage = if attack.ranged { RANGED_DAMAGE } else { 0 } + if attack.melee { MELEE_DAMAGE } else { 0 };

                if let Some(mut structure) = self.world.remove_structure(id) {
                    structure.hits = structure.hits.saturating_sub(damage);

                    if structure.hits > 0 {
                        self.world.add_structure(structure);
                    }
                }
            }
        }
    }

    fn destination(&self, unit: &UnitInfo, order: &MoveOrder) -> Option<RoomXY> {
        match order {
            MoveOrder::Hold => None,
            MoveOrder::Direction(direction) => step_xy(unit.xy(), *direction),
            MoveOrder::MoveTo { pos, range } => {
                let room_name = unit.room_name();
                let field = build_cost_field(&self.world, room_name, &[unit.id.clone()]);

                if pos.room_name() == room_name {
                    if unit.pos.get_range_to(*pos) <= *range {
                        return None;
                    }

                    find_path(&field, unit.xy(), pos_xy(*pos), *range).first_step()
                } else {
                    let direction = self.world.exit_toward(room_name, pos.room_name())?;
                    let tile = exit_tile(&self.world, room_name, direction, unit.xy())?;

                    find_path(&field, unit.xy(), tile, 0).first_step()
                }
            }
        }
    }

    /// Where a unit stepping onto `tile` ends up, following room links on edges.
    fn arrival(&self, room_name: RoomName, tile: RoomXY) -> (RoomName, RoomXY) {
        let (x, y) = (tile.x.u8(), tile.y.u8());

        let crossing = match (x, y) {
            (0, _) => Some((Direction::Left, (49, y))),
            (49, _) => Some((Direction::Right, (0, y))),
            (_, 0) => Some((Direction::Top, (x, 49))),
            (_, 49) => Some((Direction::Bottom, (x, 0))),
            _ => None,
        };

        crossing
            .and_then(|(direction, (nx, ny))| self.links.get(&(room_name, direction)).map(|next| (*next, xy(nx, ny))))
            .unwrap_or((room_name, tile))
    }

    fn apply_moves(&mut self, commands: &[(UnitId, UnitCommands)]) {
        let mut intents: BTreeMap<UnitId, (RoomName, RoomXY, (RoomName, RoomXY))> = BTreeMap::new();

        for (id, unit_commands) in commands {
            let unit = match self.world.unit(id) {
                Some(unit) if unit.fatigue == 0 => unit,
                _ => continue,
            };

            if let Some(dest) = self.destination(unit, &unit_commands.movement) {
                let room_name = unit.room_name();
                intents.insert(id.clone(), (room_name, dest, self.arrival(room_name, dest)));
            }
        }

        loop {
            let mut claimed = HashSet::new();
            let mut blocked = Vec::new();

            for (id, (room_name, dest, (arrival_room, arrival_xy))) in &intents {
                let occupant_stays = self
                    .world
                    .unit_at(*arrival_room, *arrival_xy)
                    .filter(|u| u.id != *id)
                    .map(|u| !intents.contains_key(&u.id))
                    .unwrap_or(false);

                let walkable = self.world.is_walkable(*room_name, *dest);

                if !walkable || occupant_stays || !claimed.insert((*arrival_room, *arrival_xy)) {
                    blocked.push(id.clone());
                }
            }

            if blocked.is_empty() {
                break;
            }

            for id in blocked {
                intents.remove(&id);
            }
        }

        for (id, (room_name, dest, (arrival_room, arrival_xy))) in intents {
            if arrival_room != room_name {
                self.crossings.push((id.clone(), xy_pos(dest, room_name)));
            }

            self.world.move_unit(&id, xy_pos(arrival_xy, arrival_room));
        }
    }
}
