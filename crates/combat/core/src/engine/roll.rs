use tracing::trace;

use super::{Engine, Frame, Keys, RollFrame};
use crate::dice::{Charge, Dice, Roll};
use crate::error::Flow;

impl Engine {
    /// Resolves `dice`, optionally spending the actor's charge.
    ///
    /// Fixed values are returned as-is without opening a roll.
    pub fn roll(&mut self, dice: impl Into<Dice>, charge: Charge) -> Flow<i64> {
        match dice.into() {
            Dice::Fixed(value) => Ok(value),
            Dice::Roll(roll) => self.roll_generic(roll, charge),
        }
    }

    /// Percentage check: one die of [`EngineConfig::chance_sides`](crate::EngineConfig)
    /// faces, no charge.
    pub fn roll_chance(&mut self) -> Flow<i64> {
        self.roll_generic(Roll::d(self.config.chance_sides), Charge::None)
    }

    /// Rolls inside a `roll` atom.
    ///
    /// `pre_roll` observers may rewrite the dice and the charge mode. Charge
    /// is only added (and deducted from the actor) when the context has an
    /// actor. The total is stored in the roll frame before `post_roll`.
    /// An interrupted roll yields 0.
    pub fn roll_generic(&mut self, roll: Roll, charge: Charge) -> Flow<i64> {
        let total = self
            .scope(Frame::Atom("roll"), Keys::ACTOR)
            .bind(|ctx| ctx.roll = Some(RollFrame::new(roll.into(), charge)))
            .run(|eng| {
                eng.notify("pre_roll")?;

                let frame = eng.ctx.roll.unwrap_or(RollFrame::new(roll.into(), charge));
                let actor = eng.ctx.actor;
                let seed = eng.next_seed(actor);
                let mut total = frame.dice.roll(eng.rng.as_ref(), seed);

                if let Some(actor) = actor {
                    let unit = eng.scene.unit_mut(actor)?;
                    let spent = frame.charge.contribution(unit.charge);
                    unit.charge -= spent;
                    total += spent;
                }

                if let Some(frame) = eng.ctx.roll.as_mut() {
                    frame.result = Some(total);
                }
                trace!(target: "combat::roll", dice = %frame.dice, total, "rolled");
                eng.notify("post_roll")?;
                Ok(total)
            })?;
        Ok(total.unwrap_or(0))
    }
}
