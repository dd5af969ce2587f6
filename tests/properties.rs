//! Property tests for the cost field dilation and heal selection.

mod common;

use common::*;
use proptest::prelude::*;
use screeps::Position;
use screeps_quad::constants::*;
use screeps_quad::military::bodies::Capabilities;
use screeps_quad::military::combat::select_heal_target;
use screeps_quad::military::damage::total_tower_damage;
use screeps_quad::military::formation::{is_intact, reform_orders};
use screeps_quad::military::squad::SquadRegistry;
use screeps_quad::pathing::costmatrix::CostField;
use screeps_quad::pathing::footprint::{dilate, QUAD_FOOTPRINT};
use screeps_quad::pathing::*;
use screeps_quad::world::*;

fn cost_value() -> impl Strategy<Value = u8> {
    prop_oneof![
        4 => Just(COST_PLAIN),
        2 => Just(COST_ROAD),
        1 => Just(COST_CONTAINER),
        2 => Just(COST_SWAMP),
        2 => Just(COST_BLOCKED),
    ]
}

fn cost_grid() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(cost_value(), ROOM_SIZE as usize * ROOM_SIZE as usize)
}

fn field_from(grid: &[u8]) -> CostField {
    CostField::from_fn(|xy| grid[xy.y.u8() as usize * ROOM_SIZE as usize + xy.x.u8() as usize])
}

mod dilation_properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn dilated_cost_is_max_over_footprint(grid in cost_grid()) {
            let base = field_from(&grid);
            let dilated = dilate(&base, &QUAD_FOOTPRINT, false);

            for anchor in room_tiles() {
                let covered: Option<Vec<u8>> = QUAD_FOOTPRINT
                    .iter()
                    .map(|(dx, dy)| offset_xy(anchor, *dx, *dy).map(|xy| base.get(xy)))
                    .collect();

                let expected = match covered {
                    Some(costs) if costs.iter().all(|c| *c != COST_BLOCKED) => costs.into_iter().max().unwrap(),
                    _ => COST_BLOCKED,
                };

                prop_assert_eq!(dilated.get(anchor), expected, "anchor {:?}", anchor);
            }
        }

        #[test]
        fn border_forbidding_blocks_every_edge_footprint(grid in cost_grid()) {
            let base = field_from(&grid);
            let dilated = dilate(&base, &QUAD_FOOTPRINT, true);

            for anchor in room_tiles() {
                let touches_edge = QUAD_FOOTPRINT
                    .iter()
                    .any(|(dx, dy)| offset_xy(anchor, *dx, *dy).map(is_room_edge).unwrap_or(true));

                if touches_edge {
                    prop_assert_eq!(dilated.get(anchor), COST_BLOCKED);
                }
            }
        }
    }
}

mod heal_properties {
    use super::*;

    fn block(hits: [u32; 4]) -> WorldSnapshot {
        let r = room("W1N1");
        let mut world = WorldSnapshot::new(1);
        let tiles = [(20, 20), (21, 20), (20, 21), (21, 21)];

        for (slot, (x, y)) in tiles.iter().enumerate() {
            let unit = member(&format!("q{}", slot), pos(r, *x, *y), slot, r, r, Capabilities::HEAL).with_hits(hits[slot], 100);
            world.add_unit(unit);
        }

        world
    }

    proptest! {
        #[test]
        fn heals_most_hurt_other_before_self(hits in prop::array::uniform4(1u32..=100)) {
            let world = block(hits);
            let members: Vec<&UnitInfo> = (0..4).map(|i| world.unit(&unit_id(&format!("q{}", i))).unwrap()).collect();

            let order = select_heal_target(members[0], &members, &[]);

            let others_hurt: Vec<u32> = hits[1..].iter().copied().filter(|h| *h < 100).collect();

            if let Some(lowest) = others_hurt.iter().min() {
                let order = order.unwrap();
                let target = world.unit(&order.target).unwrap();

                prop_assert!(!order.ranged);
                prop_assert!(target.id != members[0].id);
                prop_assert_eq!(target.hits, *lowest);
            } else if hits[0] < 100 {
                prop_assert_eq!(order.map(|o| o.target), Some(unit_id("q0")));
            } else {
                prop_assert!(order.is_none());
            }
        }

        #[test]
        fn heals_lowest_predicted_hits_under_tower_fire(
            hits in prop::array::uniform4(1u32..=100),
            tower_tiles in prop::collection::vec((0u8..50, 0u8..50), 0..4),
        ) {
            let r = room("W1N1");
            let world = block(hits);
            let members: Vec<&UnitInfo> = (0..4).map(|i| world.unit(&unit_id(&format!("q{}", i))).unwrap()).collect();
            let towers: Vec<Position> = tower_tiles.iter().map(|(x, y)| pos(r, *x, *y)).collect();
            let healer = members[0];

            let incoming = |unit: &UnitInfo| total_tower_damage(&towers, unit.pos);
            let score = |unit: &UnitInfo| unit.hits as f32 - incoming(unit);
            let others_hurt = members[1..].iter().any(|u| u.is_damaged());

            let candidates: Vec<f32> = members
                .iter()
                .copied()
                .filter(|u| !(others_hurt && u.id == healer.id))
                .filter(|u| u.is_damaged() || incoming(u) > 0.0)
                .map(|u| score(u))
                .collect();

            let order = select_heal_target(healer, &members, &towers);

            if candidates.is_empty() {
                prop_assert!(order.is_none());
            } else {
                let order = order.unwrap();
                let target = world.unit(&order.target).unwrap();
                let best = candidates.iter().copied().fold(f32::INFINITY, f32::min);

                prop_assert!(!order.ranged);
                prop_assert!((score(target) - best).abs() < 1e-3, "picked {} scoring {} over {}", target.id.0, score(target), best);

                if target.id == healer.id {
                    prop_assert!(!others_hurt);
                }
            }
        }
    }
}

mod reform_properties {
    use super::*;

    proptest! {
        #[test]
        fn intact_block_gets_no_reform_orders(x in 2u8..46, y in 2u8..46) {
            let r = room("W1N1");
            let mut world = WorldSnapshot::new(1);
            add_squad(&mut world, r, [(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)], r, r, Capabilities::RANGED);

            let mut registry = SquadRegistry::default();
            registry.sync(&world);
            let roster = registry.roster(&world, &SquadId::from("alpha")).unwrap();

            prop_assert!(is_intact(&roster));
            prop_assert!(reform_orders(&roster, xy(x, y)).is_empty());
            prop_assert!(reform_orders(&roster, xy(x - 1, y - 1)).is_empty());
        }
    }
}
