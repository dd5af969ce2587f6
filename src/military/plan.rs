use super::breach::*;
use super::formation::*;
use super::memory::SquadMemoryStore;
use super::mode::*;
use super::squad::Roster;
use super::step::*;
use crate::features::SquadSettings;
use crate::jobs::orders::MoveOrder;
use crate::pathing::costmatrix::*;
use crate::pathing::footprint::*;
use crate::pathing::search::*;
use crate::pathing::*;
use crate::status::*;
use crate::world::*;
use log::*;
use screeps::{Direction, Position, RoomName, RoomXY};
use std::collections::HashMap;

/// Where the leader is heading this tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Goal {
    pub pos: Position,
    /// Range the rigid and single-width searches stop at.
    pub range: u32,
    /// Set when the goal is the exit tile toward the target room.
    pub exit: Option<Direction>,
}

/// Movement decided by the leader for the whole squad this tick.
#[derive(Clone, Debug)]
pub struct SquadPlan {
    pub squad: SquadId,
    pub leader: UnitId,
    pub mode: Mode,
    pub stuck: Option<StuckReason>,
    pub goal: Option<Goal>,
    pub orders: HashMap<UnitId, MoveOrder>,
}

impl SquadPlan {
    pub fn order_for(&self, unit: &UnitId) -> MoveOrder {
        self.orders.get(unit).cloned().unwrap_or(MoveOrder::Hold)
    }

    pub fn breach_target(&self) -> Option<&StructureId> {
        match &self.mode {
            Mode::Breach { target } => Some(target),
            _ => None,
        }
    }

    pub fn status(&self) -> SquadStatus {
        SquadStatus::new(self.mode.clone(), self.stuck)
    }
}

// ─── Goal selection ─────────────────────────────────────────────────────────

/// Nearest walkable edge tile on the side of `room_name` facing `direction`.
pub fn exit_tile<W>(world: &W, room_name: RoomName, direction: Direction, from: RoomXY) -> Option<RoomXY>
where
    W: WorldView + ?Sized,
{
    room_tiles()
        .filter(|xy| is_room_edge(*xy))
        .filter(|xy| on_side(*xy, direction))
        .filter(|xy| world.is_walkable(room_name, *xy))
        .min_by_key(|xy| (xy_range(*xy, from), xy.y.u8(), xy.x.u8()))
}

fn on_side(xy: RoomXY, direction: Direction) -> bool {
    let (x, y) = (xy.x.u8(), xy.y.u8());
    let max = crate::constants::ROOM_MAX;

    match direction {
        Direction::Top => y == 0,
        Direction::Bottom => y == max,
        Direction::Left => x == 0,
        Direction::Right => x == max,
        _ => false,
    }
}

/// The leader's goal: the exit toward the target room when elsewhere, else
/// the nearest hostile unit, else the nearest hostile combat structure, else
/// the room center.
pub fn select_goal<W>(world: &W, roster: &Roster, leader: &UnitInfo, settings: &SquadSettings, classifier: &dyn HostileClassifier) -> Option<Goal>
where
    W: WorldView + ?Sized,
{
    let room_name = leader.room_name();

    if room_name != roster.target_room {
        let direction = world.exit_toward(room_name, roster.target_room)?;
        let tile = exit_tile(world, room_name, direction, leader.xy())?;

        return Some(Goal {
            pos: xy_pos(tile, room_name),
            range: settings.exit_approach_range,
            exit: Some(direction),
        });
    }

    let combat_goal = |pos: Position| Goal {
        pos,
        range: settings.combat_goal_range,
        exit: None,
    };

    let hostile = world
        .units(room_name)
        .iter()
        .filter(|u| !u.my && classifier.is_hostile(&u.owner))
        .min_by_key(|u| leader.pos.get_range_to(u.pos))
        .map(|u| combat_goal(u.pos));

    let structure = || {
        world
            .structures(room_name)
            .iter()
            .filter(|s| s.is_combat_structure() && !s.my)
            .filter(|s| s.owner.as_deref().map(|o| classifier.is_hostile(o)).unwrap_or(false))
            .min_by_key(|s| leader.pos.get_range_to(s.pos))
            .map(|s| combat_goal(s.pos))
    };

    hostile.or_else(structure).or_else(|| {
        Some(Goal {
            pos: room_center(room_name),
            range: settings.center_range,
            exit: None,
        })
    })
}

// ─── Senses ─────────────────────────────────────────────────────────────────

/// Lazily evaluated facts about a squad for the mode transition. Cost fields
/// and searches are computed at most once and reused for the orders.
struct Survey<'a, W: ?Sized> {
    world: &'a W,
    roster: &'a Roster<'a>,
    leader: &'a UnitInfo,
    settings: &'a SquadSettings,
    classifier: &'a dyn HostileClassifier,
    goal: Option<Goal>,
    remembered_anchor: Option<RoomXY>,
    base: Option<CostField>,
    anchor: Option<Option<RoomXY>>,
    footprint_search: Option<Option<SearchResult>>,
    narrow_search: Option<Option<SearchResult>>,
}

impl<'a, W> Survey<'a, W>
where
    W: WorldView + ?Sized,
{
    fn room_name(&self) -> RoomName {
        self.leader.room_name()
    }

    fn base(&mut self) -> &CostField {
        let (world, room_name, members) = (self.world, self.room_name(), self.roster.member_ids());

        self.base.get_or_insert_with(|| build_cost_field(world, room_name, &members))
    }

    fn goal_xy(&self) -> Option<(RoomXY, u32)> {
        self.goal
            .as_ref()
            .filter(|g| g.pos.room_name() == self.room_name())
            .map(|g| (pos_xy(g.pos), g.range))
    }

    fn at_exit_approach(&self) -> bool {
        match &self.goal {
            Some(Goal { exit: Some(_), pos, .. }) => self.leader.pos.get_range_to(*pos) <= self.settings.exit_approach_range,
            _ => false,
        }
    }

    fn anchor(&mut self) -> Option<RoomXY> {
        if let Some(anchor) = self.anchor {
            return anchor;
        }

        let (leader, remembered) = (self.leader.xy(), self.remembered_anchor);
        let anchor = find_reform_anchor(self.base(), leader, remembered);
        self.anchor = Some(anchor);

        anchor
    }

    fn footprint_search(&mut self) -> Option<&SearchResult> {
        if self.footprint_search.is_none() {
            let (start, goal) = (self.leader.xy(), self.goal_xy());
            let result = goal.map(|(goal, range)| {
                let dilated = dilate(self.base(), &QUAD_FOOTPRINT, true);

                find_path(&dilated, start, goal, range)
            });

            self.footprint_search = Some(result);
        }

        self.footprint_search.as_ref().and_then(|r| r.as_ref())
    }

    fn narrow_search(&mut self) -> Option<&SearchResult> {
        if self.narrow_search.is_none() {
            let (start, goal) = (self.leader.xy(), self.goal_xy());
            let result = goal.map(|(goal, range)| {
                let base = self.base();
                let narrow = CostField::from_fn(|xy| if is_room_edge(xy) { crate::constants::COST_BLOCKED } else { base.get(xy) });

                find_path(&narrow, start, goal, range)
            });

            self.narrow_search = Some(result);
        }

        self.narrow_search.as_ref().and_then(|r| r.as_ref())
    }
}

impl<'a, W> ModeSenses for Survey<'a, W>
where
    W: WorldView + ?Sized,
{
    fn assembling(&mut self) -> bool {
        self.room_name() == self.roster.spawn_room && (self.roster.awaiting_spawn() || self.roster.any_spawning())
    }

    fn roster_complete(&mut self) -> bool {
        self.roster.is_complete()
    }

    fn train_ready(&mut self) -> bool {
        let in_spawn_room = self.room_name() == self.roster.spawn_room && self.roster.spawn_room != self.roster.target_room;

        self.roster.same_room().is_some() && (in_spawn_room || self.at_exit_approach() || self.roster.degraded())
    }

    fn split(&mut self) -> bool {
        self.roster.same_room().is_none()
    }

    fn outside_interior(&mut self) -> bool {
        !in_interior(self.leader.xy(), self.settings.interior_margin) && !self.at_exit_approach()
    }

    fn breach_target_resolves(&mut self, target: &StructureId) -> bool {
        self.world.structure(target).is_some()
    }

    fn leader_footprint_clear(&mut self) -> bool {
        let leader = self.leader.xy();

        footprint_clear(self.base(), leader, &QUAD_FOOTPRINT)
    }

    fn reform_anchor_available(&mut self) -> bool {
        is_intact(self.roster) || self.anchor().is_some()
    }

    fn footprint_route(&mut self) -> bool {
        self.footprint_search().map(|r| !r.incomplete).unwrap_or(false)
    }

    fn narrow_route(&mut self) -> bool {
        self.narrow_search().map(|r| !r.incomplete).unwrap_or(false)
    }

    fn breach_candidate(&mut self) -> Option<StructureId> {
        let (goal, _) = self.goal_xy()?;
        let leader = self.leader.xy();
        let stall = self.narrow_search().and_then(|r| r.last_tile()).unwrap_or(leader);

        find_breach_target(self.world, self.room_name(), stall, goal, self.classifier)
    }
}

// ─── Planning ───────────────────────────────────────────────────────────────

/// Run the leader's plan for a squad: pick the mode, then derive every
/// member's movement order. Writes the leader's mode and the squad's packing
/// anchor back to `memory`.
pub fn plan_squad<W>(world: &W, roster: &Roster, memory: &mut SquadMemoryStore, settings: &SquadSettings, classifier: &dyn HostileClassifier) -> Option<SquadPlan>
where
    W: WorldView + ?Sized,
{
    let (_, leader) = roster.leader()?;
    let previous = memory.leader_mode(&leader.id);
    let goal = select_goal(world, roster, leader, settings, classifier);

    let remembered_anchor = memory
        .squad(&roster.squad)
        .and_then(|m| m.packing_anchor)
        .filter(|p| p.room_name() == leader.room_name())
        .map(pos_xy);

    let mut survey = Survey {
        world,
        roster,
        leader,
        settings,
        classifier,
        goal,
        remembered_anchor,
        base: None,
        anchor: None,
        footprint_search: None,
        narrow_search: None,
    };

    let transition = next_mode(&previous, &mut survey);

    if transition.mode != previous {
        info!("Squad {} mode {:?} -> {:?}", roster.squad, previous, transition.mode);
    }

    let mut plan = SquadPlan {
        squad: roster.squad.clone(),
        leader: leader.id.clone(),
        mode: transition.mode.clone(),
        stuck: transition.reason,
        goal: survey.goal.clone(),
        orders: HashMap::new(),
    };

    if plan.goal.is_none() && !matches!(plan.mode, Mode::Assembly) {
        plan.stuck = Some(StuckReason::NoRoute);
    }

    match &transition.mode {
        Mode::Assembly => {}
        Mode::Train => train_orders(&mut survey, &mut plan),
        Mode::Cross | Mode::Enter => converge_orders(&survey, &mut plan),
        Mode::FormationMove => formation_orders(&mut survey, memory, &mut plan),
        Mode::Snake => snake_orders(&mut survey, &mut plan),
        Mode::Breach { target } => breach_orders(&survey, target, &mut plan),
    }

    if transition.mode != Mode::FormationMove && memory.squad(&roster.squad).and_then(|m| m.packing_anchor).is_some() {
        memory.squad_mut(&roster.squad).packing_anchor = None;
    }

    memory.set_leader_mode(&leader.id, transition.mode);

    debug!("Squad {} plan: {:?} stuck {:?}", roster.squad, plan.mode, plan.stuck);

    Some(plan)
}

fn chase_leader<W>(survey: &Survey<W>, plan: &mut SquadPlan)
where
    W: WorldView + ?Sized,
{
    for (_, unit) in survey.roster.present().filter(|(_, u)| u.id != survey.leader.id) {
        plan.orders.insert(
            unit.id.clone(),
            MoveOrder::MoveTo {
                pos: survey.leader.pos,
                range: survey.settings.chase_range,
            },
        );
    }
}

fn leader_step(from: RoomXY, path: Option<&SearchResult>) -> MoveOrder {
    path.and_then(|r| r.first_step())
        .and_then(|step| direction_between(from, step))
        .map(MoveOrder::Direction)
        .unwrap_or(MoveOrder::Hold)
}

/// Single file toward the exit, or toward the goal when no exit is needed.
/// The member nearest the destination swaps with the leader first.
fn train_orders<W>(survey: &mut Survey<W>, plan: &mut SquadPlan)
where
    W: WorldView + ?Sized,
{
    let goal = match &survey.goal {
        Some(goal) => goal.clone(),
        None => return,
    };

    let leader = survey.leader;
    let (target, range) = if goal.exit.is_some() {
        (pos_xy(goal.pos), 0)
    } else {
        (pos_xy(goal.pos), goal.range)
    };

    let nearest = survey
        .roster
        .present()
        .min_by_key(|(slot, u)| (xy_range(u.xy(), target), u.id != leader.id, *slot))
        .map(|(_, u)| u);

    if let Some(front) = nearest.filter(|u| u.id != leader.id) {
        if leader.pos.get_range_to(front.pos) == 1 {
            if let (Some(there), Some(back)) = (direction_between(leader.xy(), front.xy()), direction_between(front.xy(), leader.xy())) {
                debug!("Squad {} swapping {} to the front", plan.squad, front.id);

                plan.orders.insert(leader.id.clone(), MoveOrder::Direction(there));
                plan.orders.insert(front.id.clone(), MoveOrder::Direction(back));
            }
        } else {
            plan.orders.insert(leader.id.clone(), MoveOrder::MoveTo { pos: front.pos, range: 1 });
            plan.orders.insert(front.id.clone(), MoveOrder::Hold);
        }

        for (_, unit) in survey.roster.present().filter(|(_, u)| u.id != leader.id && u.id != front.id) {
            plan.orders.insert(
                unit.id.clone(),
                MoveOrder::MoveTo {
                    pos: leader.pos,
                    range: survey.settings.chase_range,
                },
            );
        }

        return;
    }

    chase_leader(survey, plan);

    if goal.pos.room_name() != leader.room_name() {
        return;
    }

    let field = survey.base();
    let path = find_path(field, leader.xy(), target, range);

    plan.orders.insert(leader.id.clone(), leader_step(leader.xy(), Some(&path)));
}

fn converge_orders<W>(survey: &Survey<W>, plan: &mut SquadPlan)
where
    W: WorldView + ?Sized,
{
    let center = room_center(survey.leader.room_name());

    for (_, unit) in survey.roster.present() {
        plan.orders.insert(
            unit.id.clone(),
            MoveOrder::MoveTo {
                pos: center,
                range: survey.settings.center_range,
            },
        );
    }
}

/// Rigid movement: re-form if needed, otherwise one shared step.
fn formation_orders<W>(survey: &mut Survey<W>, memory: &mut SquadMemoryStore, plan: &mut SquadPlan)
where
    W: WorldView + ?Sized,
{
    let roster = survey.roster;
    let leader = survey.leader;

    if !is_intact(roster) {
        match survey.anchor() {
            Some(anchor) => {
                memory.squad_mut(&roster.squad).packing_anchor = Some(xy_pos(anchor, leader.room_name()));

                plan.orders.extend(reform_orders(roster, anchor));
            }
            None => plan.stuck = Some(StuckReason::FootprintPathUnavailable),
        }

        return;
    }

    memory.squad_mut(&roster.squad).packing_anchor = None;

    if roster.present().any(|(_, u)| u.fatigue > 0) {
        plan.stuck = Some(StuckReason::Fatigue);
        return;
    }

    let goal = survey.goal_xy().map(|(goal, _)| goal);
    let step = survey.footprint_search().and_then(|r| r.first_step());

    let (goal, step) = match (goal, step) {
        (Some(goal), Some(step)) => (goal, step),
        _ => return,
    };

    let members: Vec<&UnitInfo> = roster.present().map(|(_, u)| u).collect();

    let direction = direction_between(leader.xy(), step).and_then(|candidate| choose_step(survey.world, &members, leader, candidate, goal));

    match direction {
        Some(direction) => {
            for member in members {
                plan.orders.insert(member.id.clone(), MoveOrder::Direction(direction));
            }
        }
        None => plan.stuck = Some(StuckReason::StepInfeasible),
    }
}

/// Single file inside the room: the leader follows the single-width path,
/// partial if need be, and everyone else chases the leader's tile.
fn snake_orders<W>(survey: &mut Survey<W>, plan: &mut SquadPlan)
where
    W: WorldView + ?Sized,
{
    chase_leader(survey, plan);

    let leader = survey.leader;
    let order = leader_step(leader.xy(), survey.narrow_search());

    plan.orders.insert(leader.id.clone(), order);
}

fn breach_orders<W>(survey: &Survey<W>, target: &StructureId, plan: &mut SquadPlan)
where
    W: WorldView + ?Sized,
{
    chase_leader(survey, plan);

    if let Some(structure) = survey.world.structure(target) {
        plan.orders.insert(survey.leader.id.clone(), MoveOrder::MoveTo { pos: structure.pos, range: 1 });
    }
}
