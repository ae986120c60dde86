//! Turn-based combat engine with status hooks.
//!
//! `combat-core` models units, teams, actions and statuses and resolves
//! their interactions through scoped notifications. All resolution flows
//! through [`Engine`]: it opens a scope per phase (fight, wave, global turn,
//! unit turn, action, effect, and fine-grained atoms such as rolls and
//! attacks), notifies the [`Scene`]'s observers, and reads back whatever the
//! statuses wrote into the [`Context`].
//!
//! Stock statuses, actions and data loaders live in `combat-content`.
pub mod config;
pub mod dice;
pub mod engine;
pub mod error;
pub mod scene;
pub mod state;

pub use config::EngineConfig;
pub use dice::{Charge, Dice, PcgRng, RngOracle, Roll, RollParseError};
pub use engine::{
    ActionPolicy, ActionRef, Context, DamageFrame, Engine, FightOutcome, FirstChoice, Frame, Keys,
    Listener, RemovalCause, RollFrame, Scope, Timeframe,
};
pub use error::{EngineError, Flow, Halt, Result};
pub use scene::{EventBinding, Guard, Handler, Observer, Reaction, Registry, Scene, Target, Watcher};
pub use state::{
    AURA, Action, ActionBody, ActionType, LINK, Potency, Shape, Status, StatusFlags, StatusId,
    StatusType, Team, TeamKind, Unit, UnitFlags, UnitId, VS,
};
