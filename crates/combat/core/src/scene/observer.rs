//! Observer registrations.
//!
//! When a status is linked, each [`EventBinding`] of its type becomes an
//! [`Observer`] in the scene registry under the binding's event name. The
//! engine dispatches a notification by running every observer registered
//! for that name, in registration order.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use tracing::{trace, warn};

use super::Target;
use crate::engine::{Engine, RemovalCause};
use crate::error::Flow;
use crate::state::{StatusId, UnitId};

/// Outcome of an event handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reaction {
    /// The handler did not apply; nothing is consumed.
    Pass,
    /// The handler took effect and consumes one use of its status.
    Spent,
}

/// Event handler of a status type.
///
/// The status being notified is `ctx().status`, the unit it is notified for
/// is `ctx().source`.
pub type Handler = fn(&mut Engine) -> Flow<Reaction>;

/// One row of a status type's event table.
#[derive(Clone, Copy)]
pub struct EventBinding {
    pub event: &'static str,
    pub priority: i32,
    pub handler: Handler,
}

impl EventBinding {
    pub const fn new(event: &'static str, handler: Handler) -> Self {
        Self {
            event,
            priority: 0,
            handler,
        }
    }

    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl fmt::Debug for EventBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBinding")
            .field("event", &self.event)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Condition gating an observer.
#[derive(Clone)]
pub struct Guard(Arc<dyn Fn(&Engine) -> bool + Send + Sync>);

impl Guard {
    pub fn new(check: impl Fn(&Engine) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(check))
    }

    pub fn check(&self, engine: &Engine) -> bool {
        (self.0)(engine)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}

/// Whom an observer reacts for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Watcher {
    /// The bearer of the status.
    Unit(UnitId),
    /// Every unit matching the target at dispatch time.
    Area(Target),
}

#[derive(Clone, Debug)]
pub struct Observer {
    pub status: StatusId,
    pub priority: i32,
    pub watcher: Watcher,
    pub handler: Handler,
    pub guard: Option<Guard>,
}

impl Observer {
    /// Orders by priority, lower first.
    ///
    /// Dispatch keeps registration order; this exists for callers that want
    /// to inspect a registry by priority.
    pub fn cmp_priority(&self, other: &Self) -> Ordering {
        self.priority.cmp(&other.priority)
    }

    /// Runs the handler on behalf of `unit`.
    pub(crate) fn callback(&self, engine: &mut Engine, unit: UnitId) -> Flow<()> {
        let ctx = engine.ctx_mut();
        ctx.source = Some(unit);
        ctx.status = Some(self.status);

        if let Some(guard) = &self.guard
            && !guard.check(engine)
        {
            trace!(target: "combat::observer", status = %self.status, "guard rejected");
            return Ok(());
        }

        if (self.handler)(engine)? == Reaction::Pass {
            return Ok(());
        }

        let Some(root) = engine.scene_mut().use_status(self.status)? else {
            return Ok(());
        };

        if engine.scene().status(root)?.owner().is_none() {
            warn!(target: "combat::observer", status = %root, "exhausted status is not linked");
            return Ok(());
        }
        engine.remove_status(root, None, RemovalCause::expired())
    }
}

/// Observers are identified by the status they belong to.
impl PartialEq for Observer {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status
    }
}

impl Eq for Observer {}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass(_: &mut Engine) -> Flow<Reaction> {
        Ok(Reaction::Pass)
    }

    fn observer(status: u32, priority: i32) -> Observer {
        Observer {
            status: StatusId(status),
            priority,
            watcher: Watcher::Unit(UnitId(0)),
            handler: pass,
            guard: None,
        }
    }

    #[test]
    fn lower_priority_sorts_first() {
        let mut observers = vec![observer(0, 4), observer(1, -2), observer(2, 0)];
        observers.sort_by(Observer::cmp_priority);
        let order: Vec<_> = observers.iter().map(|o| o.status).collect();
        assert_eq!(order, [StatusId(1), StatusId(2), StatusId(0)]);
    }
}
