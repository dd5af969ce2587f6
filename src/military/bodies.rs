use bitflags::bitflags;
use screeps::Part;
use serde::{Deserialize, Serialize};

bitflags! {
    /// What a unit's active body parts let it do.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Capabilities: u8 {
        const MELEE  = 1;
        const RANGED = 1 << 1;
        const HEAL   = 1 << 2;
        const WORK   = 1 << 3;
    }
}

impl Capabilities {
    /// Capabilities granted by a list of active parts.
    pub fn from_parts<I>(parts: I) -> Capabilities
    where
        I: IntoIterator<Item = Part>,
    {
        parts.into_iter().fold(Capabilities::empty(), |caps, part| {
            caps | match part {
                Part::Attack => Capabilities::MELEE,
                Part::RangedAttack => Capabilities::RANGED,
                Part::Heal => Capabilities::HEAL,
                Part::Work => Capabilities::WORK,
                _ => Capabilities::empty(),
            }
        })
    }

    pub fn has_offense(&self) -> bool {
        self.intersects(Capabilities::MELEE | Capabilities::RANGED)
    }

    /// Heals and cannot deal damage.
    pub fn is_pure_healer(&self) -> bool {
        self.contains(Capabilities::HEAL) && !self.has_offense()
    }

    /// Deals damage and cannot heal.
    pub fn is_pure_attacker(&self) -> bool {
        self.has_offense() && !self.contains(Capabilities::HEAL)
    }
}
