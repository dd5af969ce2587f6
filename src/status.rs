use crate::military::mode::Mode;
use crate::world::StructureId;
use serde::{Deserialize, Serialize};

/// Why a squad could not make the progress its mode wanted this tick. These
/// are reported, never raised; the next tick re-evaluates from scratch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StuckReason {
    RosterIncomplete,
    FootprintPathUnavailable,
    SingleWidthPathUnavailable,
    StepInfeasible,
    ReferenceGone,
    Fatigue,
    NoRoute,
}

impl StuckReason {
    pub fn code(&self) -> &'static str {
        match self {
            StuckReason::RosterIncomplete => "roster",
            StuckReason::FootprintPathUnavailable => "wide",
            StuckReason::SingleWidthPathUnavailable => "narrow",
            StuckReason::StepInfeasible => "step",
            StuckReason::ReferenceGone => "gone",
            StuckReason::Fatigue => "tired",
            StuckReason::NoRoute => "route",
        }
    }

    /// Reasons that leave the squad unable to move at all, as opposed to
    /// having degraded to a narrower mode.
    pub fn is_blocking(&self) -> bool {
        matches!(self, StuckReason::StepInfeasible | StuckReason::Fatigue | StuckReason::NoRoute)
    }
}

/// Per-tick status record for a squad member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SquadStatus {
    pub mode: Mode,
    pub breach_target: Option<StructureId>,
    pub stuck: Option<StuckReason>,
}

impl SquadStatus {
    pub fn new(mode: Mode, stuck: Option<StuckReason>) -> SquadStatus {
        let breach_target = match &mode {
            Mode::Breach { target } => Some(target.clone()),
            _ => None,
        };

        SquadStatus { mode, breach_target, stuck }
    }

    /// Short text for in-game display, e.g. `SNK` or `FRM!step`.
    pub fn summary(&self) -> String {
        let mode = self.mode.code();

        match self.stuck {
            Some(reason) if reason.is_blocking() => format!("{}!{}", mode, reason.code()),
            Some(reason) => format!("{}:{}", mode, reason.code()),
            None => mode.to_string(),
        }
    }
}
