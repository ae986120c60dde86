//! Turn progression: global turns, unit turns, actions and the fight loop.

use tracing::{debug, info};

use super::{ActionRef, Engine, Keys, RemovalCause, Timeframe};
use crate::error::{EngineError, Flow, Halt, Result};
use crate::state::{TeamKind, UnitId};

/// How [`Engine::fight`] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FightOutcome {
    /// Only this team has living units left.
    Victory(TeamKind),
    /// The round limit was reached with both teams standing.
    Stalemate,
    /// A handler interrupted the fight or wave.
    Interrupted,
}

impl Engine {
    /// Advances the encounter by one full round.
    pub fn global_turn(&mut self) -> Result<()> {
        self.advance_turn().map_err(Halt::into_error)
    }

    /// Runs global turns until one team is wiped out or `max_rounds` pass.
    pub fn fight(&mut self, max_rounds: u32) -> Result<FightOutcome> {
        let outcome = self
            .scope(Timeframe::Fight.into(), Keys::empty())
            .run(|eng| {
                eng.scope(Timeframe::Wave.into(), Keys::empty())
                    .run(|eng| eng.run_rounds(max_rounds))
            })
            .map_err(Halt::into_error)?;

        let outcome = outcome.flatten().unwrap_or(FightOutcome::Interrupted);
        info!(target: "combat::turns", ?outcome, turn = self.scene.turn, "fight over");
        Ok(outcome)
    }

    fn run_rounds(&mut self, max_rounds: u32) -> Flow<FightOutcome> {
        for _ in 0..max_rounds {
            if let Some(team) = self.scene.victor() {
                return Ok(FightOutcome::Victory(team));
            }
            self.advance_turn()?;
        }
        Ok(self
            .scene
            .victor()
            .map_or(FightOutcome::Stalemate, FightOutcome::Victory))
    }

    fn advance_turn(&mut self) -> Flow<()> {
        self.scene.begin_round(self.config.acts_per_turn);
        debug!(target: "combat::turns", turn = self.scene.turn, "global turn");

        let outcome = self
            .scope(Timeframe::GlobalTurn.into(), Keys::empty())
            .run(|eng| {
                while let Some(actor) = eng.scene.next_actor() {
                    eng.unit_turn(actor)?;
                }
                Ok(())
            });
        self.scene.end_round();
        outcome.map(drop)
    }

    /// Runs one unit's turn.
    ///
    /// Statuses the unit inflicted tick first, so durations count the
    /// inflicting unit's turns. The unit then spends its acts on whatever
    /// the policy chooses.
    pub fn unit_turn(&mut self, actor: UnitId) -> Flow<()> {
        self.ctx.actor = Some(actor);

        let inflicted: Vec<_> = self.scene.unit(actor)?.inflictors.keys().copied().collect();
        for status in inflicted {
            if self.scene.is_status_removed(status) {
                continue;
            }
            if self.scene.tick_status(status)? {
                debug!(target: "combat::turns", %status, "status expired");
                self.remove_status(status, None, RemovalCause::expired())?;
            }
        }

        debug!(target: "combat::turns", unit = %actor, "unit turn");
        let outcome = self
            .scope(Timeframe::UnitTurn.into(), Keys::ACTOR)
            .run(|eng| {
                while eng.scene.unit_mut(actor).is_ok_and(|unit| unit.spend_act()) {
                    let Some(index) = eng.policy.choose_action(&eng.scene, actor) else {
                        break;
                    };
                    eng.perform(actor, index)?;
                }
                Ok(())
            });

        if let Ok(unit) = self.scene.unit_mut(actor) {
            unit.num_acts = None;
        }
        outcome.map(drop)
    }

    /// Performs `actor`'s action at `index`.
    ///
    /// An action that is disabled or cooling down is skipped silently.
    /// Otherwise its cooldown is staged in the context, `pre_cd` observers
    /// may adjust it, it is committed, and the body runs in an `action`
    /// scope.
    pub fn perform(&mut self, actor: UnitId, index: usize) -> Flow<()> {
        let action = self
            .scene
            .unit(actor)?
            .actions
            .get(index)
            .cloned()
            .ok_or(EngineError::UnknownAction { unit: actor, index })?;

        if !action.usable() {
            debug!(target: "combat::turns", unit = %actor, action = action.name(), "action unusable");
            return Ok(());
        }

        let ty = action.ty;
        self.ctx.action = Some(ActionRef { unit: actor, index });
        self.ctx.actor = Some(actor);
        self.ctx.cooldown = Some(ty.cooldown);
        self.notify("pre_cd")?;

        let cooldown = self.ctx.cooldown.unwrap_or(ty.cooldown);
        if let Some(action) = self.scene.unit_mut(actor)?.actions.get_mut(index) {
            action.cd = cooldown;
        }

        debug!(target: "combat::turns", unit = %actor, action = ty.name, cooldown, "perform");
        self.scope(
            Timeframe::Action.into(),
            Keys::ACTOR | Keys::ACTION | Keys::COOLDOWN,
        )
        .run(ty.body)?;
        Ok(())
    }

    /// Runs one effect of an action in its own `effect` timeframe.
    ///
    /// A handler can cancel just this effect by throwing
    /// [`Timeframe::Effect`]; the action carries on with the next one.
    pub fn effect<T>(&mut self, body: impl FnOnce(&mut Engine) -> Flow<T>) -> Flow<Option<T>> {
        self.scope(
            Timeframe::Effect.into(),
            Keys::ACTOR | Keys::ACTION | Keys::TARGET,
        )
        .run(body)
    }
}
