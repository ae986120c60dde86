//! Resolution context.
//!
//! The engine keeps exactly one current [`Context`]. Entering a scope builds
//! a child from the keys the scope exports plus its local bindings, swaps it
//! in, and restores the parent on exit. Handlers communicate with the code
//! that opened the scope by mutating the current context, most notably the
//! [`DamageFrame`] while an attack resolves.

use bitflags::bitflags;

use super::Frame;
use crate::dice::{Charge, Dice};
use crate::state::{StatusId, UnitId};

bitflags! {
    /// Context keys a child scope copies from its parent.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Keys: u16 {
        const ACTOR = 1 << 0;
        const TARGET = 1 << 1;
        const SOURCE = 1 << 2;
        const STATUS = 1 << 3;
        const ACTION = 1 << 4;
        const COOLDOWN = 1 << 5;
        const ROLL = 1 << 6;
        const DAMAGE = 1 << 7;
        const REMOVAL = 1 << 8;
        const TAG = 1 << 9;
    }
}

/// Locates an action instance: `unit.actions[index]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionRef {
    pub unit: UnitId,
    pub index: usize,
}

/// Roll being resolved; `pre_roll` observers may rewrite dice and charge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RollFrame {
    pub dice: Dice,
    pub charge: Charge,
    /// Set before `post_roll` fires.
    pub result: Option<i64>,
}

impl RollFrame {
    pub fn new(dice: Dice, charge: Charge) -> Self {
        Self {
            dice,
            charge,
            result: None,
        }
    }
}

/// Damage or healing in flight.
///
/// Outgoing modifiers apply first and are settled into `outgoing` before
/// the incoming side runs:
///
/// ```text
/// outgoing = max(0, base + flat_out) * prop_out
/// amount   = trunc(max(0, outgoing + flat_in) * prop_in)
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageFrame {
    pub base: i64,
    pub flat_out: i64,
    pub prop_out: f64,
    pub flat_in: i64,
    pub prop_in: f64,
    pub outgoing: f64,
    pub amount: i64,
}

impl DamageFrame {
    pub fn new(base: i64) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    /// Applies the outgoing modifiers.
    pub fn settle_out(&mut self) -> f64 {
        self.outgoing = (self.base + self.flat_out).max(0) as f64 * self.prop_out;
        self.outgoing
    }

    /// Applies the incoming modifiers on top of the settled outgoing value.
    pub fn settle_in(&mut self) -> i64 {
        self.amount = ((self.outgoing + self.flat_in as f64).max(0.0) * self.prop_in) as i64;
        self.amount
    }
}

impl Default for DamageFrame {
    fn default() -> Self {
        Self {
            base: 0,
            flat_out: 0,
            prop_out: 1.0,
            flat_in: 0,
            prop_in: 1.0,
            outgoing: 0.0,
            amount: 0,
        }
    }
}

/// Why a status is being removed. Informational only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RemovalCause {
    pub dispel: bool,
    pub broken: bool,
    pub expire: bool,
}

impl RemovalCause {
    /// Ran out of turns or uses.
    pub const fn expired() -> Self {
        Self {
            dispel: false,
            broken: false,
            expire: true,
        }
    }

    pub const fn dispelled() -> Self {
        Self {
            dispel: true,
            broken: false,
            expire: false,
        }
    }

    pub const fn broken() -> Self {
        Self {
            dispel: false,
            broken: true,
            expire: false,
        }
    }
}

/// One resolution frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Context {
    pub frame: Frame,
    /// Event of the last atom notified in this frame.
    pub atom_event: Option<&'static str>,
    /// Name of the last notification sent.
    pub notify_type: Option<String>,
    pub actor: Option<UnitId>,
    pub target: Option<UnitId>,
    /// Unit an observer is currently being run for.
    pub source: Option<UnitId>,
    /// Status an observer belongs to.
    pub status: Option<StatusId>,
    pub action: Option<ActionRef>,
    pub cooldown: Option<u32>,
    pub roll: Option<RollFrame>,
    pub damage: DamageFrame,
    pub removal: Option<RemovalCause>,
    pub tag: Option<String>,
}

impl Context {
    /// Builds a child frame carrying only the keys in `keys`.
    pub fn export(&self, frame: Frame, keys: Keys) -> Self {
        let mut child = Self {
            frame,
            ..Self::default()
        };
        if keys.contains(Keys::ACTOR) {
            child.actor = self.actor;
        }
        if keys.contains(Keys::TARGET) {
            child.target = self.target;
        }
        if keys.contains(Keys::SOURCE) {
            child.source = self.source;
        }
        if keys.contains(Keys::STATUS) {
            child.status = self.status;
        }
        if keys.contains(Keys::ACTION) {
            child.action = self.action;
        }
        if keys.contains(Keys::COOLDOWN) {
            child.cooldown = self.cooldown;
        }
        if keys.contains(Keys::ROLL) {
            child.roll = self.roll;
        }
        if keys.contains(Keys::DAMAGE) {
            child.damage = self.damage;
        }
        if keys.contains(Keys::REMOVAL) {
            child.removal = self.removal;
        }
        if keys.contains(Keys::TAG) {
            child.tag = self.tag.clone();
        }
        child
    }
}
