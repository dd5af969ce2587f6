use crate::status::StuckReason;
use crate::world::StructureId;
use log::*;
use serde::{Deserialize, Serialize};

/// Movement regime of a squad. Persisted on the leader so `Snake` and
/// `Breach` survive across ticks.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Waiting in the spawn room for the roster to fill.
    #[default]
    Assembly,
    /// Single file toward an exit, or toward the goal when the roster is degraded.
    Train,
    /// Members are split across rooms and converge on the leader's room.
    Cross,
    /// Just arrived; everyone moves off the edges toward the room center.
    Enter,
    /// Rigid 2x2 block moving one shared step per tick.
    FormationMove,
    /// Single file because the block does not fit.
    Snake,
    /// No route at all; attacking an obstruction to open one.
    Breach { target: StructureId },
}

impl Mode {
    pub fn code(&self) -> &'static str {
        match self {
            Mode::Assembly => "ASM",
            Mode::Train => "TRN",
            Mode::Cross => "CRS",
            Mode::Enter => "ENT",
            Mode::FormationMove => "FRM",
            Mode::Snake => "SNK",
            Mode::Breach { .. } => "BRC",
        }
    }
}

/// World facts the transition function consults. Implementations are
/// expected to compute lazily, since later questions involve path searches
/// that earlier answers usually make unnecessary.
pub trait ModeSenses {
    /// Leader is in the spawn room and the roster is still filling or spawning.
    fn assembling(&mut self) -> bool;

    /// Every member present and alive.
    fn roster_complete(&mut self) -> bool;

    /// All present members share a room, and either the leader is in the spawn
    /// room, the leader is at the exit approach, or a member has died.
    fn train_ready(&mut self) -> bool;

    /// Present members are in more than one room.
    fn split(&mut self) -> bool;

    /// Leader is outside the interior band of its room.
    fn outside_interior(&mut self) -> bool;

    fn breach_target_resolves(&mut self, target: &StructureId) -> bool;

    /// The 2x2 footprint anchored at the leader covers only walkable tiles.
    fn leader_footprint_clear(&mut self) -> bool;

    /// The formation is intact or a clear anchor exists to re-form on.
    fn reform_anchor_available(&mut self) -> bool;

    /// The dilated search reaches the goal.
    fn footprint_route(&mut self) -> bool;

    /// The single-width search reaches the goal.
    fn narrow_route(&mut self) -> bool;

    /// An obstruction near the end of the partial single-width path.
    fn breach_candidate(&mut self) -> Option<StructureId>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub mode: Mode,
    pub reason: Option<StuckReason>,
}

impl Transition {
    fn to(mode: Mode, reason: Option<StuckReason>) -> Transition {
        Transition { mode, reason }
    }
}

/// Pick this tick's mode. Rules are checked in priority order; the first
/// that applies wins.
pub fn next_mode<S>(previous: &Mode, senses: &mut S) -> Transition
where
    S: ModeSenses + ?Sized,
{
    if senses.assembling() {
        return Transition::to(Mode::Assembly, Some(StuckReason::RosterIncomplete));
    }

    if senses.train_ready() {
        let reason = if senses.roster_complete() { None } else { Some(StuckReason::RosterIncomplete) };

        return Transition::to(Mode::Train, reason);
    }

    if senses.split() {
        let reason = if senses.roster_complete() { None } else { Some(StuckReason::RosterIncomplete) };

        return Transition::to(Mode::Cross, reason);
    }

    if senses.outside_interior() {
        return Transition::to(Mode::Enter, None);
    }

    if let Mode::Breach { target } = previous {
        if senses.breach_target_resolves(target) {
            return Transition::to(previous.clone(), Some(StuckReason::SingleWidthPathUnavailable));
        }

        info!("Breach target {} is gone, re-evaluating route", target);

        let mut transition = route_mode(previous, senses);

        let superseded = matches!(transition.mode, Mode::Breach { .. }) || transition.reason.map(|r| r.is_blocking()).unwrap_or(false);

        if !superseded {
            transition.reason = Some(StuckReason::ReferenceGone);
        }

        return transition;
    }

    route_mode(previous, senses)
}

/// Formation, snake or breach, depending on which searches reach the goal.
fn route_mode<S>(previous: &Mode, senses: &mut S) -> Transition
where
    S: ModeSenses + ?Sized,
{
    let snake_sticky = *previous == Mode::Snake && !senses.leader_footprint_clear();

    if !snake_sticky {
        if !senses.reform_anchor_available() {
            return Transition::to(Mode::Snake, Some(StuckReason::FootprintPathUnavailable));
        }

        if senses.footprint_route() {
            return Transition::to(Mode::FormationMove, None);
        }
    }

    if senses.narrow_route() {
        return Transition::to(Mode::Snake, Some(StuckReason::FootprintPathUnavailable));
    }

    if let Some(target) = senses.breach_candidate() {
        return Transition::to(Mode::Breach { target }, Some(StuckReason::SingleWidthPathUnavailable));
    }

    Transition::to(Mode::Snake, Some(StuckReason::NoRoute))
}
