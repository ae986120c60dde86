//! Scene: units, teams, the status arena and the observer registry.
//!
//! The scene owns all mutable combat state. It keeps the status bookkeeping
//! consistent: a linked status appears in exactly one bearer's `statuses`
//! and exactly one source's `inflictors`, and its observers are registered
//! under their event names for as long as it stays linked.
//!
//! Statuses are never dropped from the arena. Detached statuses keep their
//! id, carry [`StatusFlags::REMOVED`] and can be linked again later.

mod observer;
mod target;

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::state::{
    Shape, Status, StatusFlags, StatusId, Team, TeamKind, Unit, UnitFlags, UnitId,
};

pub use observer::{EventBinding, Guard, Handler, Observer, Reaction, Watcher};
pub use target::Target;

/// Event name → observers, in registration order.
pub type Registry = BTreeMap<String, Vec<Observer>>;

#[derive(Debug)]
pub struct Scene {
    units: Vec<Unit>,
    teams: [Team; EngineConfig::TEAM_SLOTS],
    events: Registry,
    statuses: BTreeMap<StatusId, Status>,
    /// Global turns started so far.
    pub turn: u32,
    next_unit: u32,
    next_status: u32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            units: Vec::new(),
            teams: [Team::ALLY, Team::ENEMY],
            events: Registry::new(),
            statuses: BTreeMap::new(),
            turn: 0,
            next_unit: 0,
            next_status: 0,
        }
    }

    // ===== units =====

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.units.iter().any(|unit| unit.id == id)
    }

    fn index_of(&self, id: UnitId) -> Result<usize> {
        self.units
            .iter()
            .position(|unit| unit.id == id)
            .ok_or(EngineError::UnknownUnit(id))
    }

    pub fn unit(&self, id: UnitId) -> Result<&Unit> {
        let index = self.index_of(id)?;
        Ok(&self.units[index])
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Result<&mut Unit> {
        let index = self.index_of(id)?;
        Ok(&mut self.units[index])
    }

    /// Looks a unit up by name.
    pub fn unit_by_name(&self, name: &str) -> Result<UnitId> {
        self.units
            .iter()
            .find(|unit| unit.name == name)
            .map(Unit::id)
            .ok_or_else(|| EngineError::UnitNotFound(name.to_owned()))
    }

    pub fn team(&self, kind: TeamKind) -> &Team {
        match kind {
            TeamKind::Ally => &self.teams[0],
            TeamKind::Enemy => &self.teams[1],
        }
    }

    /// Adds a unit to the end of the turn order.
    ///
    /// A unit seen for the first time gets a fresh id; a previously unlinked
    /// unit keeps its id and has the statuses it still bears relinked as
    /// self-inflicted. Statuses that were linked elsewhere in the meantime
    /// are dropped from its list. Innate statuses are moved into the arena
    /// and linked the same way.
    pub fn link_unit(&mut self, mut unit: Unit) -> UnitId {
        if !unit.id.is_linked() {
            unit.id = UnitId(self.next_unit);
            self.next_unit += 1;
        }
        let id = unit.id;
        unit.flags.remove(UnitFlags::REMOVED);
        unit.statuses
            .retain(|status| self.statuses.get(status).is_some_and(|s| s.owner.is_none()));

        let innate = std::mem::take(&mut unit.innate);
        let borne = unit.statuses.clone();
        debug!(target: "combat::scene", unit = %id, name = %unit.name, "linking unit");
        self.units.push(unit);

        for status in borne {
            self.attach(status, id, id);
        }
        for status in innate {
            let status = self.add_status(status);
            self.attach(status, id, id);
            if let Some(unit) = self.units.last_mut() {
                unit.statuses.push(status);
            }
        }
        id
    }

    /// Removes a unit from the scene and hands it back.
    ///
    /// Statuses the unit bears are detached (their ids stay in its list so a
    /// later [`link_unit`](Self::link_unit) can restore them). Statuses it
    /// inflicted on others pass to the previous unit in turn order, or the
    /// last one when it was first, so no inflictor entry is orphaned.
    pub fn unlink_unit(&mut self, id: UnitId) -> Result<Unit> {
        let index = self.index_of(id)?;

        for status in self.units[index].statuses.clone() {
            if let Some(owner) = self.statuses.get(&status).and_then(Status::owner) {
                self.detach(status, owner);
            }
        }

        let inflicted = std::mem::take(&mut self.units[index].inflictors);
        if self.units.len() > 1 {
            let heir = index.checked_sub(1).unwrap_or(self.units.len() - 1);
            let heir_id = self.units[heir].id;
            for status in inflicted.keys() {
                if let Some(status) = self.statuses.get_mut(status) {
                    status.owner = Some(heir_id);
                }
            }
            debug!(
                target: "combat::scene",
                unit = %id,
                heir = %heir_id,
                transferred = inflicted.len(),
                "transferring inflicted statuses"
            );
            self.units[heir].inflictors.extend(inflicted);
        }

        let mut unit = self.units.remove(index);
        unit.flags.insert(UnitFlags::REMOVED);
        debug!(target: "combat::scene", unit = %id, name = %unit.name, "unlinked unit");
        Ok(unit)
    }

    // ===== statuses =====

    /// Moves a status into the arena without linking it.
    ///
    /// Statuses wrapped by a composite get it as their parent.
    pub fn add_status(&mut self, status: Status) -> StatusId {
        let id = StatusId(self.next_status);
        self.next_status += 1;

        for child in status.shape.children() {
            if let Some(child) = self.statuses.get_mut(&child) {
                child.parent = Some(id);
            }
        }
        self.statuses.insert(id, status);
        id
    }

    pub fn status(&self, id: StatusId) -> Result<&Status> {
        self.statuses.get(&id).ok_or(EngineError::UnknownStatus(id))
    }

    pub fn status_mut(&mut self, id: StatusId) -> Result<&mut Status> {
        self.statuses
            .get_mut(&id)
            .ok_or(EngineError::UnknownStatus(id))
    }

    /// True if the status is flagged removed or does not exist.
    pub fn is_status_removed(&self, id: StatusId) -> bool {
        self.statuses.get(&id).is_none_or(Status::is_removed)
    }

    /// Places `id` on `bearer` on behalf of `source`.
    ///
    /// A status that is still linked elsewhere is unlinked first.
    pub fn link_status(&mut self, id: StatusId, source: UnitId, bearer: UnitId) -> Result<()> {
        let linked = self.status(id)?.owner.is_some();
        self.index_of(source)?;
        self.index_of(bearer)?;

        if linked {
            self.unlink_status(id)?;
        }
        self.attach(id, source, bearer);
        self.unit_mut(bearer)?.statuses.push(id);
        Ok(())
    }

    /// Detaches a linked status from its bearer and source.
    pub fn unlink_status(&mut self, id: StatusId) -> Result<()> {
        let owner = self.status(id)?.owner.ok_or(EngineError::StatusNotLinked(id))?;
        let bearer = self.bearer(id)?;

        self.detach(id, owner);
        self.unit_mut(bearer)?.statuses.retain(|status| *status != id);
        Ok(())
    }

    /// Consumes one use of `id`, parents first.
    ///
    /// Returns the root status once some level runs out of uses; the root is
    /// flagged removed at that point. Infinite uses never run out.
    pub fn use_status(&mut self, id: StatusId) -> Result<Option<StatusId>> {
        let parent = self.status(id)?.parent;
        if let Some(parent) = parent
            && let Some(root) = self.use_status(parent)?
        {
            return Ok(Some(root));
        }

        if !self.status_mut(id)?.consume() {
            return Ok(None);
        }
        let root = self.top_parent(id)?;
        self.status_mut(root)?.flags.insert(StatusFlags::REMOVED);
        Ok(Some(root))
    }

    /// Advances the turn counter of `id`. Returns true once it expired.
    pub fn tick_status(&mut self, id: StatusId) -> Result<bool> {
        Ok(self.status_mut(id)?.tick())
    }

    /// Root of the composition tree containing `id`.
    pub fn top_parent(&self, id: StatusId) -> Result<StatusId> {
        let mut current = id;
        while let Some(parent) = self.status(current)?.parent {
            current = parent;
        }
        Ok(current)
    }

    /// Unit currently bearing a linked status.
    pub fn bearer(&self, id: StatusId) -> Result<UnitId> {
        let owner = self.status(id)?.owner.ok_or(EngineError::StatusNotLinked(id))?;
        self.unit(owner)?
            .inflictors
            .get(&id)
            .copied()
            .ok_or(EngineError::StatusNotLinked(id))
    }

    fn attach(&mut self, id: StatusId, source: UnitId, bearer: UnitId) {
        self.register_observers(id, &Watcher::Unit(bearer), None);
        if let Some(unit) = self.units.iter_mut().find(|unit| unit.id == source) {
            unit.inflictors.insert(id, bearer);
        }
        if let Some(status) = self.statuses.get_mut(&id) {
            status.owner = Some(source);
        }
        self.mark_removed(id, false);
    }

    fn detach(&mut self, id: StatusId, owner: UnitId) {
        self.deregister_observers(id);
        if let Some(unit) = self.units.iter_mut().find(|unit| unit.id == owner) {
            unit.inflictors.remove(&id);
        }
        if let Some(status) = self.statuses.get_mut(&id) {
            status.owner = None;
        }
        self.mark_removed(id, true);
    }

    fn mark_removed(&mut self, id: StatusId, removed: bool) {
        let Some(status) = self.statuses.get_mut(&id) else {
            return;
        };
        status.flags.set(StatusFlags::REMOVED, removed);
        for child in status.shape.children() {
            self.mark_removed(child, removed);
        }
    }

    // ===== observers =====

    fn register_observers(&mut self, id: StatusId, watcher: &Watcher, guard: Option<Guard>) {
        let Some(status) = self.statuses.get(&id) else {
            return;
        };
        let (ty, shape) = (status.ty, status.shape.clone());

        for binding in ty.bindings() {
            self.events
                .entry(binding.event.to_owned())
                .or_default()
                .push(Observer {
                    status: id,
                    priority: binding.priority,
                    watcher: watcher.clone(),
                    handler: binding.handler,
                    guard: guard.clone(),
                });
        }

        match shape {
            Shape::Plain => {}
            Shape::Mounted { mount } => self.register_observers(mount, watcher, guard),
            Shape::Aura { mount, area } => {
                self.register_observers(mount, &Watcher::Area(area), guard)
            }
            Shape::Link { members } => {
                for member in members {
                    self.register_observers(member, watcher, guard.clone());
                }
            }
            Shape::Vs { inner, guard } => self.register_observers(inner, watcher, Some(guard)),
        }
    }

    fn deregister_observers(&mut self, id: StatusId) {
        let Some(status) = self.statuses.get(&id) else {
            return;
        };
        let (ty, children) = (status.ty, status.shape.children());

        for binding in ty.bindings() {
            let Some(observers) = self.events.get_mut(binding.event) else {
                continue;
            };
            if let Some(position) = observers.iter().position(|o| o.status == id) {
                observers.remove(position);
            }
            if observers.is_empty() {
                self.events.remove(binding.event);
            }
        }

        for child in children {
            self.deregister_observers(child);
        }
    }

    /// Snapshot of the observers registered for `event`.
    pub fn observers(&self, event: &str) -> Vec<Observer> {
        self.events.get(event).cloned().unwrap_or_default()
    }

    pub fn events(&self) -> &Registry {
        &self.events
    }

    // ===== queries =====

    /// Units matched by `target` that are still in the scene.
    pub fn query(&self, target: &Target) -> Vec<UnitId> {
        target
            .query(self)
            .into_iter()
            .filter(|id| {
                self.unit(*id)
                    .is_ok_and(|unit| !unit.flags.contains(UnitFlags::REMOVED))
            })
            .collect()
    }

    /// Target selecting a whole team by name (`"ally"`, `"enemies"`, ...).
    pub fn team_target(&self, name: &str) -> Result<Target> {
        name.parse::<TeamKind>()
            .ok()
            .or_else(|| {
                self.teams
                    .iter()
                    .find(|team| team.plural.eq_ignore_ascii_case(name))
                    .map(|team| team.kind)
            })
            .map(Target::Team)
            .ok_or_else(|| EngineError::UnknownTeam(name.to_owned()))
    }

    /// Target selecting the unit at `index` in turn order.
    pub fn unit_target(&self, index: usize) -> Result<Target> {
        self.units
            .get(index)
            .map(|unit| Target::Unit(unit.id))
            .ok_or(EngineError::UnitIndexOutOfRange {
                index,
                len: self.units.len(),
            })
    }

    /// Highest-priority unit that can still act; ties go to the earliest.
    pub fn next_actor(&self) -> Option<UnitId> {
        let mut best: Option<&Unit> = None;
        for unit in &self.units {
            if unit.can_act() && best.is_none_or(|best| best.priority < unit.priority) {
                best = Some(unit);
            }
        }
        best.map(Unit::id)
    }

    /// Living members of a team.
    pub fn living(&self, team: TeamKind) -> Vec<UnitId> {
        self.units
            .iter()
            .filter(|unit| unit.team == team && unit.is_alive())
            .map(Unit::id)
            .collect()
    }

    /// The only team with living members, if exactly one has any.
    pub fn victor(&self) -> Option<TeamKind> {
        let allies = !self.living(TeamKind::Ally).is_empty();
        let enemies = !self.living(TeamKind::Enemy).is_empty();
        match (allies, enemies) {
            (true, false) => Some(TeamKind::Ally),
            (false, true) => Some(TeamKind::Enemy),
            _ => None,
        }
    }

    /// Starts a global turn: refills acts and ticks every cooldown.
    pub(crate) fn begin_round(&mut self, acts: u32) {
        self.turn += 1;
        for unit in &mut self.units {
            unit.num_acts = Some(acts);
            for action in &mut unit.actions {
                action.tick();
            }
        }
    }

    /// Ends a global turn: no unit is left mid-turn, including those that
    /// never got to act.
    pub(crate) fn end_round(&mut self) {
        for unit in &mut self.units {
            unit.num_acts = None;
        }
    }
}
