//! Combatants.

use std::collections::BTreeMap;
use std::fmt;

use bitflags::bitflags;

use super::{Action, Status, StatusId, TeamKind, UnitId};
use crate::dice::Dice;

bitflags! {
    /// Lifecycle flags of a unit.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct UnitFlags: u8 {
        /// Stays on the field between waves.
        const STAY = 1 << 0;
        const DEAD = 1 << 1;
        /// Unlinked from its scene.
        const REMOVED = 1 << 2;
    }
}

/// A combatant.
///
/// Units are built standalone and handed to
/// [`Scene::link_unit`](crate::Scene::link_unit), which assigns the id and
/// links any innate statuses.
#[derive(Clone, Debug)]
pub struct Unit {
    pub(crate) id: UnitId,
    pub name: String,
    pub team: TeamKind,
    pub roles: Vec<String>,
    pub hp: i64,
    pub max_hp: i64,
    pub guard: i64,
    pub charge: i64,
    pub priority: i32,
    /// Acts left in the current turn; `None` outside of a global turn.
    pub num_acts: Option<u32>,
    /// Attack potential.
    pub ap: Option<Dice>,
    /// Guard potential.
    pub gp: Option<Dice>,
    /// Charge potential.
    pub cp: Option<Dice>,
    pub actions: Vec<Action>,
    pub(crate) statuses: Vec<StatusId>,
    pub(crate) inflictors: BTreeMap<StatusId, UnitId>,
    pub(crate) innate: Vec<Status>,
    pub flags: UnitFlags,
}

impl Unit {
    pub fn new(name: impl Into<String>, team: TeamKind) -> Self {
        Self {
            id: UnitId::UNLINKED,
            name: name.into(),
            team,
            roles: Vec::new(),
            hp: 1,
            max_hp: 1,
            guard: 0,
            charge: 0,
            priority: 0,
            num_acts: None,
            ap: None,
            gp: None,
            cp: None,
            actions: Vec::new(),
            statuses: Vec::new(),
            inflictors: BTreeMap::new(),
            innate: Vec::new(),
            flags: UnitFlags::empty(),
        }
    }

    /// Sets both current and maximum hit points.
    pub fn with_hp(mut self, hp: i64) -> Self {
        self.hp = hp;
        self.max_hp = hp;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_charge(mut self, charge: i64) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Sets attack, guard and charge potentials.
    pub fn with_potentials(
        mut self,
        ap: Option<Dice>,
        gp: Option<Dice>,
        cp: Option<Dice>,
    ) -> Self {
        self.ap = ap;
        self.gp = gp;
        self.cp = cp;
        self
    }

    /// Adds a self-inflicted status linked when the unit joins a scene.
    pub fn with_status(mut self, status: Status) -> Self {
        self.innate.push(status);
        self
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    /// Statuses this unit currently bears.
    pub fn statuses(&self) -> &[StatusId] {
        &self.statuses
    }

    /// Statuses this unit placed, keyed to their current bearer.
    pub fn inflictors(&self) -> &BTreeMap<StatusId, UnitId> {
        &self.inflictors
    }

    pub fn is_alive(&self) -> bool {
        !self.flags.intersects(UnitFlags::DEAD | UnitFlags::REMOVED)
    }

    /// True while the unit is alive, linked and has acts left this turn.
    pub fn can_act(&self) -> bool {
        self.is_alive() && self.num_acts.is_some_and(|acts| acts > 0)
    }

    /// Spends one act. Returns false when none were left.
    pub fn spend_act(&mut self) -> bool {
        match self.num_acts.as_mut() {
            Some(acts) if *acts > 0 => {
                *acts -= 1;
                true
            }
            _ => false,
        }
    }

    /// Applies damage, draining guard before hit points.
    ///
    /// Returns true if this blow killed the unit.
    pub fn take_damage(&mut self, amount: i64) -> bool {
        let absorbed = amount.clamp(0, self.guard.max(0));
        self.guard -= absorbed;
        self.hp -= amount - absorbed;

        if self.hp <= 0 && !self.flags.contains(UnitFlags::DEAD) {
            self.flags.insert(UnitFlags::DEAD);
            return true;
        }
        false
    }

    /// Restores hit points up to the maximum.
    pub fn restore(&mut self, amount: i64) {
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.roles.is_empty() {
            write!(f, " [{}]", self.roles.join(","))?;
        }
        write!(f, " HP {}/{}", self.hp, self.max_hp)?;
        if self.charge != 0 {
            write!(f, " C{:+}", self.charge)?;
        }
        if self.guard != 0 {
            write!(f, " G{:+}", self.guard)?;
        }
        Ok(())
    }
}
