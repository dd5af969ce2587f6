use bitflags::bitflags;

// Action pipelines a unit can use in the same tick:
//
// Pipeline A (melee): attack
// Pipeline B (ranged): rangedAttack, rangedHeal
// Pipeline C (heal):   heal
//
// Actions within the same pipeline are mutually exclusive (share the same bit).
// Actions in different pipelines can coexist, so a squad member may move,
// hit, shoot and heal in one tick, but cannot both shoot and ranged-heal.

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct SimultaneousActionFlags: u8 {
        const UNSET = 0;

        const MOVE = 1;

        // Pipeline A
        const ATTACK = 1 << 1;

        // Pipeline B
        const RANGED_ATTACK = 1 << 2;
        const RANGED_HEAL   = 1 << 2;

        // Pipeline C
        const HEAL = 1 << 3;
    }
}

impl SimultaneousActionFlags {
    /// Claim a pipeline. Returns false if it was already used this tick.
    pub fn consume(&mut self, flags: SimultaneousActionFlags) -> bool {
        if !self.intersects(flags) {
            self.insert(flags);

            true
        } else {
            false
        }
    }
}
