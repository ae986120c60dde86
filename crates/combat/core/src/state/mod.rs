//! Plain data owned by a scene: units, statuses, actions and teams.

mod action;
mod common;
mod status;
mod team;
mod unit;

pub use action::{Action, ActionBody, ActionType};
pub use common::{StatusId, UnitId};
pub use status::{AURA, LINK, Potency, Shape, Status, StatusFlags, StatusType, VS};
pub use team::{Team, TeamKind};
pub use unit::{Unit, UnitFlags};
