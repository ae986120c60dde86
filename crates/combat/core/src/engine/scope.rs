//! Scopes and interrupts.
//!
//! Every phase of resolution runs inside a scope. A scope exports selected
//! keys of the current context into a fresh child, runs its body, and
//! restores the parent afterwards whether the body finished, was
//! interrupted or failed.
//!
//! Timeframe scopes notify `pre_<name>` on entry and `post_<name>` on a
//! clean exit, and swallow interrupts aimed at their own timeframe. Atom
//! scopes notify nothing on their own (bodies call [`Engine::atom`]) and
//! swallow any atom interrupt. Everything else keeps unwinding.

use std::fmt;

use tracing::trace;

use super::{Context, Engine, Keys};
use crate::error::{EngineError, Flow, Halt};

/// Coarse phases of an encounter.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Timeframe {
    Fight,
    Wave,
    GlobalTurn,
    UnitTurn,
    Action,
    Effect,
}

impl Timeframe {
    /// Event sent when the timeframe is entered.
    pub fn pre_event(self) -> String {
        format!("pre_{self}")
    }

    /// Event sent when the timeframe finishes without interruption.
    pub fn post_event(self) -> String {
        format!("post_{self}")
    }
}

/// Kind of the current context frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Frame {
    /// Outside of any scope.
    #[default]
    Root,
    Timeframe(Timeframe),
    /// Fine-grained step such as `roll`, `inflict` or `attack`.
    Atom(&'static str),
}

impl Frame {
    /// Whether a scope of this kind recovers `interrupt`.
    pub fn catches(self, interrupt: Frame) -> bool {
        match (self, interrupt) {
            (Self::Timeframe(own), Self::Timeframe(thrown)) => own == thrown,
            (Self::Atom(_), Self::Atom(_)) => true,
            _ => false,
        }
    }
}

impl From<Timeframe> for Frame {
    fn from(timeframe: Timeframe) -> Self {
        Self::Timeframe(timeframe)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("root"),
            Self::Timeframe(timeframe) => write!(f, "{timeframe}"),
            Self::Atom(name) => f.write_str(name),
        }
    }
}

fn no_bindings(_: &mut Context) {}

/// Pending scope; see [`Engine::scope`].
#[must_use = "a scope does nothing until run"]
pub struct Scope<'e, B = fn(&mut Context)> {
    engine: &'e mut Engine,
    frame: Frame,
    keys: Keys,
    bind: B,
}

impl<'e> Scope<'e> {
    pub(super) fn new(engine: &'e mut Engine, frame: Frame, keys: Keys) -> Self {
        Self {
            engine,
            frame,
            keys,
            bind: no_bindings,
        }
    }

    /// Sets local bindings on the child context before the body runs.
    pub fn bind<F>(self, bind: F) -> Scope<'e, F>
    where
        F: FnOnce(&mut Context),
    {
        Scope {
            engine: self.engine,
            frame: self.frame,
            keys: self.keys,
            bind,
        }
    }
}

impl<B> Scope<'_, B>
where
    B: FnOnce(&mut Context),
{
    /// Runs `body` inside the scope.
    ///
    /// Returns `Ok(None)` when an interrupt for this scope cut the body
    /// short.
    pub fn run<T>(self, body: impl FnOnce(&mut Engine) -> Flow<T>) -> Flow<Option<T>> {
        let Self {
            engine,
            frame,
            keys,
            bind,
        } = self;

        if engine.depth >= engine.config.max_depth {
            return Err(EngineError::ScopeTooDeep {
                frame,
                depth: engine.depth,
            }
            .into());
        }

        let mut child = engine.ctx.export(frame, keys);
        bind(&mut child);
        let parent = std::mem::replace(&mut engine.ctx, child);
        engine.depth += 1;
        trace!(target: "combat::scope", %frame, depth = engine.depth, "enter");

        let outcome = enter(engine, frame, body);

        engine.depth -= 1;
        engine.ctx = parent;
        trace!(target: "combat::scope", %frame, depth = engine.depth, "exit");

        match outcome {
            Ok(value) => Ok(Some(value)),
            Err(Halt::Interrupt(thrown)) if frame.catches(thrown) => {
                trace!(target: "combat::scope", %frame, %thrown, "interrupted");
                Ok(None)
            }
            Err(halt) => Err(halt),
        }
    }
}

fn enter<T>(engine: &mut Engine, frame: Frame, body: impl FnOnce(&mut Engine) -> Flow<T>) -> Flow<T> {
    let Frame::Timeframe(timeframe) = frame else {
        return body(engine);
    };
    engine.notify(&timeframe.pre_event())?;
    let value = body(engine)?;
    engine.notify(&timeframe.post_event())?;
    Ok(value)
}

impl Engine {
    /// Opens a scope of kind `frame` that inherits `keys` from the current
    /// context.
    ///
    /// ```ignore
    /// eng.scope(Timeframe::Effect.into(), Keys::ACTOR)
    ///     .bind(|ctx| ctx.target = Some(target))
    ///     .run(|eng| eng.attack(target, 5))?;
    /// ```
    pub fn scope(&mut self, frame: Frame, keys: Keys) -> Scope<'_> {
        Scope::new(self, frame, keys)
    }

    /// Interrupt for `frame`, or for the current frame when `None`.
    ///
    /// Meant to be returned with `?` from a handler or action body.
    pub fn throw<T>(&self, frame: Option<Frame>) -> Flow<T> {
        Err(Halt::Interrupt(frame.unwrap_or(self.ctx.frame)))
    }

    /// Notifies `<prefix>_atom` and then `<prefix>_<event>`.
    pub fn atom(&mut self, prefix: &str, event: &'static str) -> Flow<()> {
        self.ctx.atom_event = Some(event);
        self.notify(&format!("{prefix}_atom"))?;
        self.notify(&format!("{prefix}_{event}"))
    }
}
