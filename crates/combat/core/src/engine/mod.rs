//! The combat engine.
//!
//! [`Engine`] owns the scene and the current [`Context`] and drives time
//! forward: global turns, unit turns, actions and effects. Each phase runs in
//! a scope (see [`scope`](self::Scope)) and announces itself through
//! [`Engine::notify`], which is where statuses get to inspect and rewrite the
//! context.
//!
//! ## Modules
//!
//! - `context`: the context frame and its typed sub-frames
//! - `scope`: scope runner, frames and interrupts
//! - `turns`: global turn, unit turn, action execution, fight loop
//! - `roll`: dice resolution with charge
//! - `status`: infliction and removal
//! - `combat`: damage, healing, guard, charge and target selection
//! - `policy`: action and target choice

mod combat;
mod context;
mod policy;
mod roll;
mod scope;
mod status;
mod turns;

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::config::EngineConfig;
use crate::dice::{PcgRng, RngOracle, compute_seed};
use crate::error::{EngineError, Flow};
use crate::scene::{Scene, Watcher};
use crate::state::{Potency, UnitId};

pub use context::{ActionRef, Context, DamageFrame, Keys, RemovalCause, RollFrame};
pub use policy::{ActionPolicy, FirstChoice};
pub use scope::{Frame, Scope, Timeframe};
pub use turns::FightOutcome;

/// Callback receiving every notification before observers run.
pub type Listener = Arc<dyn Fn(&Context, &str) + Send + Sync>;

pub struct Engine {
    scene: Scene,
    ctx: Context,
    config: EngineConfig,
    rng: Arc<dyn RngOracle>,
    policy: Arc<dyn ActionPolicy>,
    listener: Option<Listener>,
    /// Rolls made so far; mixed into every roll seed.
    rolls: u64,
    depth: usize,
}

impl Engine {
    /// Engine with an empty scene, a root context and default settings.
    pub fn make() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            scene: Scene::new(),
            ctx: Context::default(),
            config,
            rng: Arc::new(PcgRng),
            policy: Arc::new(FirstChoice),
            listener: None,
            rolls: 0,
            depth: 0,
        }
    }

    pub fn with_scene(mut self, scene: Scene) -> Self {
        self.scene = scene;
        self
    }

    pub fn with_rng(mut self, rng: Arc<dyn RngOracle>) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn ActionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Taps every notification, e.g. for narration.
    pub fn with_listener(mut self, listener: impl Fn(&Context, &str) + Send + Sync + 'static) -> Self {
        self.listener = Some(Arc::new(listener));
        self
    }

    pub fn ctx(&self) -> &Context {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Potency of the status whose observer is running.
    pub fn status_potency(&self) -> Flow<Potency> {
        let status = self.ctx.status.ok_or(EngineError::NoActiveStatus)?;
        self.scene
            .status(status)?
            .potency
            .ok_or_else(|| EngineError::MissingPotency(status).into())
    }

    /// Sends `event` to every live observer registered for it.
    ///
    /// Observers run in registration order against a snapshot of the
    /// registry, so handlers may link or unlink statuses freely. A status
    /// removed while the snapshot is being walked is skipped from then on,
    /// and disabled statuses are skipped altogether.
    ///
    /// `ctx.source` and `ctx.status` belong to the running observer only;
    /// the caller's values are back in place after each one returns.
    pub fn notify(&mut self, event: &str) -> Flow<()> {
        self.ctx.notify_type = Some(event.to_owned());
        if let Some(listener) = self.listener.clone() {
            listener(&self.ctx, event);
        }

        let observers = self.scene.observers(event);
        if !observers.is_empty() {
            trace!(target: "combat::notify", event, observers = observers.len(), "dispatch");
        }

        let (source, status) = (self.ctx.source, self.ctx.status);
        for observer in observers {
            if self.scene.is_status_removed(observer.status)
                || !self.scene.status(observer.status)?.enabled()
            {
                continue;
            }
            self.ctx.status = Some(observer.status);

            match &observer.watcher {
                Watcher::Unit(unit) => observer.callback(self, *unit)?,
                Watcher::Area(area) => {
                    for unit in self.scene.query(area) {
                        if self.scene.is_status_removed(observer.status) {
                            break;
                        }
                        observer.callback(self, unit)?;
                    }
                }
            }
            self.ctx.source = source;
            self.ctx.status = status;
        }
        Ok(())
    }

    /// Seed for the next roll made by `actor`.
    fn next_seed(&mut self, actor: Option<UnitId>) -> u64 {
        let nonce = self.rolls;
        self.rolls += 1;
        compute_seed(
            self.config.seed,
            nonce,
            actor.map_or(UnitId::UNLINKED.0, |id| id.0),
            0,
        )
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::make()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("scene", &self.scene)
            .field("ctx", &self.ctx)
            .field("config", &self.config)
            .field("rolls", &self.rolls)
            .finish_non_exhaustive()
    }
}
