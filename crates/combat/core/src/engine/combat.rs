//! Damage, healing, resource gains and target selection.
//!
//! Damage and healing resolve in three atoms. `out_<kind>` lets the
//! actor's statuses adjust the outgoing side of the [`DamageFrame`],
//! `in_<kind>` lets the target's statuses adjust the incoming side, and
//! `hit_<kind>` fires once the amount has been applied.

use tracing::{debug, info};

use super::{DamageFrame, Engine, Frame, Keys};
use crate::error::Flow;
use crate::scene::Target;
use crate::state::{Unit, UnitId};

impl Engine {
    /// Deals `base` damage to `target`. Guard absorbs damage before hit
    /// points do.
    ///
    /// Returns the final amount, or `None` if an observer interrupted the
    /// attack.
    pub fn attack(&mut self, target: UnitId, base: i64) -> Flow<Option<i64>> {
        self.strike("attack", target, base, |unit, amount| {
            if unit.take_damage(amount) {
                info!(target: "combat::combat", unit = %unit.id(), name = %unit.name, "unit died");
            }
        })
    }

    /// Heals `target` by `base`, up to its maximum hit points.
    pub fn heal(&mut self, target: UnitId, base: i64) -> Flow<Option<i64>> {
        self.strike("heal", target, base, Unit::restore)
    }

    fn strike(
        &mut self,
        kind: &'static str,
        target: UnitId,
        base: i64,
        apply: impl FnOnce(&mut Unit, i64),
    ) -> Flow<Option<i64>> {
        self.scene.unit(target)?;

        self.scope(Frame::Atom(kind), Keys::ACTOR | Keys::ACTION)
            .bind(|ctx| {
                ctx.target = Some(target);
                ctx.damage = DamageFrame::new(base);
            })
            .run(|eng| {
                eng.atom("out", kind)?;
                eng.ctx.damage.settle_out();
                eng.atom("in", kind)?;
                let amount = eng.ctx.damage.settle_in();

                let target = eng.ctx.target.unwrap_or(target);
                apply(eng.scene.unit_mut(target)?, amount);
                debug!(target: "combat::combat", kind, unit = %target, base, amount, "resolved");

                eng.atom("hit", kind)?;
                Ok(amount)
            })
    }

    /// Adds `amount` guard to `target`.
    pub fn guard(&mut self, target: UnitId, amount: i64) -> Flow<()> {
        self.gain("guard", target, amount, |unit, amount| unit.guard += amount)
    }

    /// Adds `amount` charge to `target`.
    pub fn concentrate(&mut self, target: UnitId, amount: i64) -> Flow<()> {
        self.gain("concentrate", target, amount, |unit, amount| {
            unit.charge += amount
        })
    }

    fn gain(
        &mut self,
        kind: &'static str,
        target: UnitId,
        amount: i64,
        apply: impl FnOnce(&mut Unit, i64),
    ) -> Flow<()> {
        self.scene.unit(target)?;

        self.scope(Frame::Atom(kind), Keys::ACTOR | Keys::ACTION)
            .bind(|ctx| ctx.target = Some(target))
            .run(|eng| {
                apply(eng.scene.unit_mut(target)?, amount);
                debug!(target: "combat::combat", kind, unit = %target, amount, "gained");
                eng.atom("hit", kind)
            })?;
        Ok(())
    }

    /// Asks the policy to pick one living unit matching `area`.
    ///
    /// `post_target` observers see the choice in `ctx.target` and may
    /// redirect it. Returns `None` when nothing qualifies or the selection
    /// was interrupted.
    pub fn lock_target(&mut self, area: &Target, tag: Option<&str>) -> Flow<Option<UnitId>> {
        let tag = tag.map(str::to_owned);

        let chosen = self
            .scope(Frame::Atom("target"), Keys::ACTOR | Keys::ACTION)
            .bind(|ctx| ctx.tag = tag)
            .run(|eng| {
                eng.atom("pre", "target")?;

                let candidates: Vec<_> = eng
                    .scene
                    .query(area)
                    .into_iter()
                    .filter(|id| eng.scene.unit(*id).is_ok_and(Unit::is_alive))
                    .collect();
                eng.ctx.target = match eng.ctx.actor {
                    Some(actor) => eng.policy.choose_target(
                        &eng.scene,
                        actor,
                        &candidates,
                        eng.ctx.tag.as_deref(),
                    ),
                    None => candidates.first().copied(),
                };

                eng.atom("post", "target")?;
                Ok(eng.ctx.target)
            })?;
        Ok(chosen.flatten())
    }
}
