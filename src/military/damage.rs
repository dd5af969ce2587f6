use crate::constants::*;
use lerp::Lerp;
use screeps::Position;

/// Tower attack damage at a given range.
///
/// - Range 0..=5: full damage
/// - Range 6..=19: linear falloff
/// - Range 20+: minimum damage
pub fn tower_attack_damage_at_range(range: u32) -> f32 {
    if range <= TOWER_OPTIMAL_RANGE {
        TOWER_POWER_ATTACK
    } else if range >= TOWER_FALLOFF_RANGE {
        TOWER_POWER_ATTACK_MIN
    } else {
        let t = (range - TOWER_OPTIMAL_RANGE) as f32 / (TOWER_FALLOFF_RANGE - TOWER_OPTIMAL_RANGE) as f32;

        TOWER_POWER_ATTACK.lerp(TOWER_POWER_ATTACK_MIN, t)
    }
}

/// Combined damage of every tower against a target position.
pub fn total_tower_damage(tower_positions: &[Position], target_pos: Position) -> f32 {
    tower_positions
        .iter()
        .map(|tp| tower_attack_damage_at_range(tp.get_range_to(target_pos)))
        .sum()
}

/// Tower damage minus what the target's side can heal back in one tick.
pub fn net_tower_damage(tower_positions: &[Position], target_pos: Position, heal_per_tick: f32) -> f32 {
    total_tower_damage(tower_positions, target_pos) - heal_per_tick
}

pub fn heal_per_tick(heal_parts: u32) -> f32 {
    (heal_parts * HEAL_POWER) as f32
}
