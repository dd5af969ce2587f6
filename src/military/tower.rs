use super::bodies::Capabilities;
use super::combat::*;
use super::damage::*;
use crate::constants::*;
use crate::world::*;
use itertools::*;
use log::*;
use screeps::{Position, RoomName, StructureType};
use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TowerOrder {
    pub tower: StructureId,
    pub target: UnitId,
}

fn is_dangerous(unit: &UnitInfo) -> bool {
    unit.capabilities.intersects(Capabilities::MELEE | Capabilities::RANGED | Capabilities::WORK)
}

/// Healing the target can receive next tick from itself and adjacent hostiles.
fn incoming_heal(target: &UnitInfo, hostiles: &[&UnitInfo]) -> f32 {
    hostiles
        .iter()
        .filter(|h| h.pos.get_range_to(target.pos) <= HEAL_RANGE)
        .map(|h| heal_per_tick(h.heal_parts))
        .sum()
}

/// Plan fire for our towers in a room. With the pairing split in effect,
/// even-indexed towers (ordered by id) shoot the healer and odd-indexed the
/// attacker. Otherwise every tower focuses the best target it can out-damage,
/// dangerous bodies first then the lowest hits, falling back to the weakest
/// hostile.
pub fn plan_tower_fire<W>(world: &W, room_name: RoomName, classifier: &dyn HostileClassifier) -> Vec<TowerOrder>
where
    W: WorldView + ?Sized,
{
    let towers: Vec<&StructureInfo> = world
        .structures(room_name)
        .iter()
        .filter(|s| s.my && s.structure_type == StructureType::Tower)
        .sorted_by(|a, b| a.id.cmp(&b.id))
        .collect();

    let hostiles = hostile_units(world, room_name, classifier);

    if towers.is_empty() || hostiles.is_empty() {
        return Vec::new();
    }

    if let Some((healer, attacker)) = pairing_split(&hostiles, towers.len()) {
        debug!("Towers in {} splitting fire between {} and {}", room_name, healer.id, attacker.id);

        return towers
            .iter()
            .enumerate()
            .map(|(index, tower)| TowerOrder {
                tower: tower.id.clone(),
                target: pairing_target(index, healer, attacker).id.clone(),
            })
            .collect();
    }

    let tower_positions: Vec<Position> = towers.iter().map(|t| t.pos).collect();

    let best = hostiles
        .iter()
        .filter(|h| net_tower_damage(&tower_positions, h.pos, incoming_heal(h, &hostiles)) > 0.0)
        .min_by(|a, b| match (is_dangerous(a), is_dangerous(b)) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => a.hits.cmp(&b.hits),
        })
        .or_else(|| hostiles.iter().min_by_key(|h| h.hits));

    match best {
        Some(target) => towers
            .iter()
            .map(|tower| TowerOrder {
                tower: tower.id.clone(),
                target: target.id.clone(),
            })
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::test_support::*;

    fn towers(world: &mut WorldSnapshot, r: RoomName, count: usize) {
        for i in 0..count {
            world.add_structure(own_structure(&format!("tower{}", i), StructureType::Tower, pos(r, 20 + i as u8, 20)));
        }
    }

    #[test]
    fn test_pairing_split_across_towers() {
        let r = room("W1N1");
        let mut world = WorldSnapshot::new(1);
        towers(&mut world, r, 3);
        world.add_unit(hostile_unit("medic", pos(r, 10, 10), "enemy").with_capabilities(Capabilities::HEAL, 20));
        world.add_unit(hostile_unit("brute", pos(r, 11, 10), "enemy").with_capabilities(Capabilities::MELEE, 0));

        let orders = plan_tower_fire(&world, r, &everyone_hostile());
        let targets: Vec<_> = orders.iter().map(|o| o.target.0.as_str()).collect();

        assert_eq!(targets, vec!["medic", "brute", "medic"]);
    }

    #[test]
    fn test_focus_dangerous_first() {
        let r = room("W1N1");
        let mut world = WorldSnapshot::new(1);
        towers(&mut world, r, 2);
        world.add_unit(hostile_unit("scout", pos(r, 25, 25), "enemy").with_hits(50, 50));
        world.add_unit(hostile_unit("raider", pos(r, 26, 25), "enemy").with_capabilities(Capabilities::RANGED, 0));
        world.add_unit(hostile_unit("dismantler", pos(r, 27, 25), "enemy").with_capabilities(Capabilities::WORK, 0).with_hits(80, 100));

        let orders = plan_tower_fire(&world, r, &everyone_hostile());

        assert_eq!(orders.len(), 2);
        assert!(orders.iter().all(|o| o.target == UnitId::from("dismantler")));
    }

    #[test]
    fn test_skips_targets_healed_through_fire() {
        let r = room("W1N1");
        let mut world = WorldSnapshot::new(1);
        towers(&mut world, r, 1);
        world.add_unit(hostile_unit("tank", pos(r, 45, 45), "enemy").with_capabilities(Capabilities::MELEE | Capabilities::HEAL, 20));
        world.add_unit(hostile_unit("scout", pos(r, 21, 25), "enemy"));

        let orders = plan_tower_fire(&world, r, &everyone_hostile());

        assert_eq!(orders, vec![TowerOrder {
            tower: StructureId::from("tower0"),
            target: UnitId::from("scout"),
        }]);
    }

    #[test]
    fn test_allies_never_targeted() {
        let r = room("W1N1");
        let mut world = WorldSnapshot::new(1);
        towers(&mut world, r, 1);
        world.add_unit(hostile_unit("buddy", pos(r, 25, 25), "friend"));

        let allies = AllyList {
            allies: vec!["friend".to_string()],
        };

        assert!(plan_tower_fire(&world, r, &allies).is_empty());
    }
}
