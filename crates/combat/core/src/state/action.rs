//! Abilities.

use std::fmt;

use crate::engine::Engine;
use crate::error::Flow;

/// Procedure run inside an `action` scope.
///
/// The acting unit, the action and its committed cooldown are available
/// through [`Engine::ctx`].
pub type ActionBody = fn(&mut Engine) -> Flow<()>;

/// Shared template of an ability.
pub struct ActionType {
    pub name: &'static str,
    pub doc: &'static str,
    /// Cooldown applied each time the action is performed.
    pub cooldown: u32,
    pub body: ActionBody,
}

impl ActionType {
    pub const fn new(name: &'static str, doc: &'static str, cooldown: u32, body: ActionBody) -> Self {
        Self {
            name,
            doc,
            cooldown,
            body,
        }
    }

    /// Creates a ready-to-use instance for a unit.
    pub fn instance(&'static self) -> Action {
        Action::new(self)
    }
}

impl fmt::Debug for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionType")
            .field("name", &self.name)
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

/// Per-unit instance of an [`ActionType`].
#[derive(Clone, Debug)]
pub struct Action {
    pub ty: &'static ActionType,
    /// Turns left before the action can be used again.
    pub cd: u32,
    disabled: u32,
}

impl Action {
    pub fn new(ty: &'static ActionType) -> Self {
        Self {
            ty,
            cd: 0,
            disabled: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.ty.name
    }

    pub fn usable(&self) -> bool {
        self.enabled() && self.cd == 0
    }

    /// Counts the cooldown down by one turn. Returns true when ready.
    pub fn tick(&mut self) -> bool {
        self.cd = self.cd.saturating_sub(1);
        self.cd == 0
    }

    pub fn enabled(&self) -> bool {
        self.disabled == 0
    }

    pub fn disable(&mut self) {
        self.disabled += 1;
    }

    pub fn enable(&mut self) {
        self.disabled = self.disabled.saturating_sub(1);
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ty.name)?;
        match (self.cd, self.ty.cooldown) {
            (0, 0) => Ok(()),
            (0, max) => write!(f, " R/{max}"),
            (cd, max) => write!(f, " {cd}/{max}"),
        }
    }
}
