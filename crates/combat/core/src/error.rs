//! Error and control-flow types shared by the engine and scene.
//!
//! Two kinds of "failure" travel through the engine:
//!
//! - [`EngineError`]: a scripting or setup mistake (unknown unit, bad team
//!   name, ...). These are fatal and are propagated with `?` to the caller.
//! - [`Halt::Interrupt`]: a deliberate request from a handler or action body
//!   to abandon the rest of one scope. The scope runner recovers it at the
//!   nearest matching frame and execution carries on from there.
//!
//! Both are carried by [`Flow`] so a single `?` unwinds either one.

use crate::engine::Frame;
use crate::state::{StatusId, UnitId};

/// Fatal faults surfaced while running an encounter.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("unit {0} is not part of the scene")]
    UnknownUnit(UnitId),

    #[error("status {0} does not exist")]
    UnknownStatus(StatusId),

    #[error("no unit named '{0}' in the scene")]
    UnitNotFound(String),

    #[error("unknown team '{0}'")]
    UnknownTeam(String),

    #[error("unit index {index} out of range (scene has {len} units)")]
    UnitIndexOutOfRange { index: usize, len: usize },

    #[error("unit {unit} has no action at index {index}")]
    UnknownAction { unit: UnitId, index: usize },

    #[error("status {0} is not linked to any unit")]
    StatusNotLinked(StatusId),

    #[error("no status is being notified")]
    NoActiveStatus,

    #[error("status {0} carries no potency")]
    MissingPotency(StatusId),

    #[error("scope nesting exceeded {depth} levels while entering {frame}")]
    ScopeTooDeep { frame: Frame, depth: usize },

    #[error("interrupt for {0} escaped every scope")]
    UncaughtInterrupt(Frame),
}

/// Signal that stops the current code path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Halt {
    /// Skip the rest of the nearest scope matching this frame.
    Interrupt(Frame),
    /// Unrecoverable fault; never caught by scopes.
    Fault(EngineError),
}

impl Halt {
    /// Converts a halt that reached a public entry point into an error.
    pub fn into_error(self) -> EngineError {
        match self {
            Self::Interrupt(frame) => EngineError::UncaughtInterrupt(frame),
            Self::Fault(error) => error,
        }
    }
}

impl From<EngineError> for Halt {
    fn from(error: EngineError) -> Self {
        Self::Fault(error)
    }
}

/// Result of engine code that may be interrupted.
pub type Flow<T = ()> = std::result::Result<T, Halt>;

/// Result of fallible scene and engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
