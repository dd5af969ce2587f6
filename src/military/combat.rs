use super::bodies::Capabilities;
use super::damage::*;
use crate::constants::*;
use crate::jobs::orders::*;
use crate::world::*;
use screeps::{Position, RoomName, StructureType};
use std::cmp::Ordering;

/// Hostile units in a room according to the classifier.
pub fn hostile_units<'a, W>(world: &'a W, room_name: RoomName, classifier: &dyn HostileClassifier) -> Vec<&'a UnitInfo>
where
    W: WorldView + ?Sized,
{
    world
        .units(room_name)
        .iter()
        .filter(|u| !u.my && classifier.is_hostile(&u.owner))
        .collect()
}

fn is_hostile_structure(structure: &StructureInfo, classifier: &dyn HostileClassifier) -> bool {
    !structure.my && structure.owner.as_deref().map(|o| classifier.is_hostile(o)).unwrap_or(false)
}

/// Positions of hostile towers in a room.
pub fn hostile_tower_positions<W>(world: &W, room_name: RoomName, classifier: &dyn HostileClassifier) -> Vec<Position>
where
    W: WorldView + ?Sized,
{
    world
        .structures(room_name)
        .iter()
        .filter(|s| s.structure_type == StructureType::Tower && is_hostile_structure(s, classifier))
        .map(|s| s.pos)
        .collect()
}

// ─── Healing ────────────────────────────────────────────────────────────────

/// Choose who `healer` should heal among `members` (which may include the
/// healer). Members in touch range are scored by hits minus the damage the
/// towers are expected to deal them; the lowest score wins. The healer only
/// considers itself when no other adjacent member is hurt, and only when it is
/// hurt or under fire itself. With nobody adjacent worth healing, falls back to
/// a ranged heal on the weakest member within ranged range.
pub fn select_heal_target(healer: &UnitInfo, members: &[&UnitInfo], tower_positions: &[Position]) -> Option<HealOrder> {
    if !healer.capabilities.contains(Capabilities::HEAL) {
        return None;
    }

    let expected = |unit: &UnitInfo| total_tower_damage(tower_positions, unit.pos);
    let score = |unit: &UnitInfo| unit.hits as f32 - expected(unit);
    let by_score = |a: &&UnitInfo, b: &&UnitInfo| score(*a).partial_cmp(&score(*b)).unwrap_or(Ordering::Equal);

    let others_hurt = within(healer, members, HEAL_RANGE).any(|u| u.id != healer.id && u.is_damaged());

    let adjacent = within(healer, members, HEAL_RANGE)
        .filter(|u| !(others_hurt && u.id == healer.id))
        .filter(|u| u.is_damaged() || expected(*u) > 0.0)
        .min_by(by_score);

    if let Some(target) = adjacent {
        return Some(HealOrder {
            target: target.id.clone(),
            ranged: false,
        });
    }

    within(healer, members, RANGED_RANGE)
        .filter(|u| u.id != healer.id && u.is_damaged())
        .min_by(by_score)
        .map(|u| HealOrder {
            target: u.id.clone(),
            ranged: true,
        })
}

fn within<'a>(healer: &'a UnitInfo, members: &'a [&'a UnitInfo], range: u32) -> impl Iterator<Item = &'a UnitInfo> + 'a {
    members
        .iter()
        .copied()
        .filter(move |u| u.room_name() == healer.room_name() && healer.pos.get_range_to(u.pos) <= range)
}

// ─── Targeting ──────────────────────────────────────────────────────────────

/// The healer/attacker pair to split fire across, when exactly two hostiles
/// are present, there is more than one source of fire, and one hostile only heals
/// while the other only fights.
pub fn pairing_split<'a>(hostiles: &[&'a UnitInfo], shooters: usize) -> Option<(&'a UnitInfo, &'a UnitInfo)> {
    if hostiles.len() != 2 || shooters < 2 {
        return None;
    }

    let (a, b) = (hostiles[0], hostiles[1]);

    if a.capabilities.is_pure_healer() && b.capabilities.is_pure_attacker() {
        Some((a, b))
    } else if b.capabilities.is_pure_healer() && a.capabilities.is_pure_attacker() {
        Some((b, a))
    } else {
        None
    }
}

/// Even indices take the healer, odd indices the attacker.
pub fn pairing_target<'a>(index: usize, healer: &'a UnitInfo, attacker: &'a UnitInfo) -> &'a UnitInfo {
    if index % 2 == 0 {
        healer
    } else {
        attacker
    }
}

fn fire(attacker: &UnitInfo, target: AttackTarget, target_pos: Position) -> Option<AttackOrder> {
    if target_pos.room_name() != attacker.room_name() {
        return None;
    }

    let range = attacker.pos.get_range_to(target_pos);
    let melee = attacker.capabilities.contains(Capabilities::MELEE) && range <= MELEE_RANGE;
    let ranged = attacker.capabilities.contains(Capabilities::RANGED) && range <= RANGED_RANGE;

    if melee || ranged {
        Some(AttackOrder { target, melee, ranged })
    } else {
        None
    }
}

fn nearest<'a, T, F>(from: Position, items: impl Iterator<Item = &'a T>, pos: F) -> Option<&'a T>
where
    T: 'a,
    F: Fn(&T) -> Position,
{
    items.min_by_key(|item| from.get_range_to(pos(*item)))
}

/// Inputs to target selection for one squad member.
pub struct AttackContext<'a> {
    /// Formation slot of the attacker; even slots take the healer of a pair.
    pub slot: usize,
    /// Squad members present this tick.
    pub members: usize,
    pub breach_target: Option<&'a StructureId>,
    pub classifier: &'a dyn HostileClassifier,
}

/// Choose what `attacker` fires on this tick. In order: the breach target,
/// the pairing split, the nearest hostile unit, the nearest hostile combat
/// structure. The first candidate within reach wins.
pub fn select_attack<W>(world: &W, attacker: &UnitInfo, context: &AttackContext) -> Option<AttackOrder>
where
    W: WorldView + ?Sized,
{
    if !attacker.capabilities.has_offense() {
        return None;
    }

    let room_name = attacker.room_name();

    let breach = context
        .breach_target
        .and_then(|id| world.structure(id))
        .and_then(|s| fire(attacker, AttackTarget::Structure(s.id.clone()), s.pos));

    if breach.is_some() {
        return breach;
    }

    let hostiles = hostile_units(world, room_name, context.classifier);

    let paired = pairing_split(&hostiles, context.members)
        .map(|(healer, fighter)| pairing_target(context.slot, healer, fighter))
        .and_then(|u| fire(attacker, AttackTarget::Unit(u.id.clone()), u.pos));

    if paired.is_some() {
        return paired;
    }

    let unit = nearest(attacker.pos, hostiles.iter().copied(), |u| u.pos).and_then(|u| fire(attacker, AttackTarget::Unit(u.id.clone()), u.pos));

    if unit.is_some() {
        return unit;
    }

    let structures = world
        .structures(room_name)
        .iter()
        .filter(|s| s.is_combat_structure() && is_hostile_structure(s, context.classifier));

    nearest(attacker.pos, structures, |s| s.pos).and_then(|s| fire(attacker, AttackTarget::Structure(s.id.clone()), s.pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::test_support::*;

    fn member(id: &str, x: u8, y: u8, hits: u32) -> UnitInfo {
        own_unit(id, pos(room("W1N1"), x, y))
            .with_hits(hits, 1000)
            .with_capabilities(Capabilities::RANGED | Capabilities::HEAL, 5)
    }

    #[test]
    fn test_heals_most_threatened_member() {
        let r = room("W1N1");
        let healer = member("a", 10, 10, 1000);
        let b = member("b", 11, 10, 900);
        let c = member("c", 10, 11, 920);
        let members = [&healer, &b, &c];

        assert_eq!(select_heal_target(&healer, &members, &[]).map(|h| h.target), Some(UnitId::from("b")));

        // A tower close to c outweighs b's lower hits.
        let towers = [pos(r, 10, 20)];
        assert_eq!(select_heal_target(&healer, &members, &towers).map(|h| h.target), Some(UnitId::from("c")));
    }

    #[test]
    fn test_self_heal_only_when_others_healthy() {
        let hurt_self = member("a", 10, 10, 500);
        let hurt_other = member("b", 11, 10, 990);
        let healthy = member("c", 10, 11, 1000);

        assert_eq!(
            select_heal_target(&hurt_self, &[&hurt_self, &hurt_other, &healthy], &[]).map(|h| h.target),
            Some(UnitId::from("b"))
        );
        assert_eq!(
            select_heal_target(&hurt_self, &[&hurt_self, &healthy], &[]).map(|h| h.target),
            Some(UnitId::from("a"))
        );
    }

    #[test]
    fn test_no_heal_when_nobody_needs_it() {
        let a = member("a", 10, 10, 1000);
        let b = member("b", 11, 10, 1000);

        assert_eq!(select_heal_target(&a, &[&a, &b], &[]), None);
    }

    #[test]
    fn test_ranged_heal_fallback() {
        let a = member("a", 10, 10, 1000);
        let b = member("b", 13, 10, 400);

        assert_eq!(
            select_heal_target(&a, &[&a, &b], &[]),
            Some(HealOrder {
                target: UnitId::from("b"),
                ranged: true
            })
        );
    }

    #[test]
    fn test_breach_target_first() {
        let r = room("W1N1");
        let mut world = WorldSnapshot::new(1);
        world.add_structure(structure("wall", StructureType::Wall, pos(r, 13, 10), None));
        world.add_unit(hostile_unit("raider", pos(r, 11, 11), "enemy").with_capabilities(Capabilities::MELEE, 0));

        let attacker = member("a", 10, 10, 1000);
        let breach = StructureId::from("wall");
        let classifier = everyone_hostile();
        let context = AttackContext {
            slot: 0,
            members: 4,
            breach_target: Some(&breach),
            classifier: &classifier,
        };

        assert_eq!(
            select_attack(&world, &attacker, &context),
            Some(AttackOrder {
                target: AttackTarget::Structure(breach.clone()),
                melee: false,
                ranged: true
            })
        );
    }

    #[test]
    fn test_pairing_splits_fire() {
        let r = room("W1N1");
        let mut world = WorldSnapshot::new(1);
        world.add_unit(hostile_unit("medic", pos(r, 12, 10), "enemy").with_capabilities(Capabilities::HEAL, 10));
        world.add_unit(hostile_unit("brute", pos(r, 13, 10), "enemy").with_capabilities(Capabilities::MELEE, 0));

        let classifier = everyone_hostile();
        let attacker = member("a", 10, 10, 1000);

        let target_for = |slot: usize| {
            let context = AttackContext {
                slot,
                members: 4,
                breach_target: None,
                classifier: &classifier,
            };

            select_attack(&world, &attacker, &context).map(|o| o.target)
        };

        assert_eq!(target_for(0), Some(AttackTarget::Unit(UnitId::from("medic"))));
        assert_eq!(target_for(1), Some(AttackTarget::Unit(UnitId::from("brute"))));
        assert_eq!(target_for(2), Some(AttackTarget::Unit(UnitId::from("medic"))));
    }

    #[test]
    fn test_allies_and_neutral_structures_ignored() {
        let r = room("W1N1");
        let mut world = WorldSnapshot::new(1);
        world.add_unit(hostile_unit("buddy", pos(r, 11, 10), "friend").with_capabilities(Capabilities::MELEE, 0));
        world.add_structure(structure("road", StructureType::Road, pos(r, 11, 11), Some("enemy")));
        world.add_structure(structure("ctrl", StructureType::Controller, pos(r, 10, 11), Some("enemy")));
        world.add_structure(structure("ext", StructureType::Extension, pos(r, 12, 12), Some("enemy")));

        let allies = AllyList {
            allies: vec!["friend".to_string()],
        };
        let attacker = member("a", 10, 10, 1000).with_capabilities(Capabilities::MELEE | Capabilities::RANGED, 0);
        let context = AttackContext {
            slot: 0,
            members: 4,
            breach_target: None,
            classifier: &allies,
        };

        assert_eq!(
            select_attack(&world, &attacker, &context),
            Some(AttackOrder {
                target: AttackTarget::Structure(StructureId::from("ext")),
                melee: false,
                ranged: true
            })
        );
    }

    #[test]
    fn test_melee_and_ranged_on_same_target() {
        let r = room("W1N1");
        let mut world = WorldSnapshot::new(1);
        world.add_unit(hostile_unit("raider", pos(r, 11, 10), "enemy").with_capabilities(Capabilities::MELEE, 0));

        let classifier = everyone_hostile();
        let attacker = member("a", 10, 10, 1000).with_capabilities(Capabilities::MELEE | Capabilities::RANGED, 0);
        let context = AttackContext {
            slot: 0,
            members: 1,
            breach_target: None,
            classifier: &classifier,
        };

        let order = select_attack(&world, &attacker, &context).unwrap();

        assert!(order.melee && order.ranged);
    }
}
