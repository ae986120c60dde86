//! Basic actions every unit can be given.
//!
//! Each action draws on one of the actor's potentials. A unit without the
//! relevant potential performs the action to no effect.

use combat_core::{ActionType, Charge, Dice, Engine, Flow, Target, Unit, UnitId};

/// Deals the actor's attack potential to one living opponent.
pub static ATTACK: ActionType = ActionType::new("Attack", "Deal [AP] damage to a target.", 0, attack);
/// Adds the actor's guard potential to its own guard.
pub static DEFEND: ActionType = ActionType::new("Defend", "Grant Guard [GP] to the user.", 0, defend);
/// Adds the actor's charge potential to its own charge.
pub static CONCENTRATE: ActionType =
    ActionType::new("Concentrate", "Gain +[CP] Charge to the user.", 0, concentrate);

/// Every stock action, in menu order.
pub static CATALOG: [&ActionType; 3] = [&ATTACK, &DEFEND, &CONCENTRATE];

/// Looks up a stock action by name, ignoring case.
pub fn action_type(name: &str) -> Option<&'static ActionType> {
    CATALOG
        .iter()
        .copied()
        .find(|ty| ty.name.eq_ignore_ascii_case(name))
}

/// The acting unit and one of its potentials.
fn potential(eng: &Engine, pick: fn(&Unit) -> Option<Dice>) -> Flow<Option<(UnitId, Dice)>> {
    let Some(actor) = eng.ctx().actor else {
        return Ok(None);
    };
    Ok(pick(eng.scene().unit(actor)?).map(|dice| (actor, dice)))
}

fn attack(eng: &mut Engine) -> Flow<()> {
    let Some((actor, ap)) = potential(eng, |unit| unit.ap)? else {
        return Ok(());
    };
    let foes = Target::Team(eng.scene().unit(actor)?.team.opponent());
    let Some(target) = eng.lock_target(&foes, Some(ATTACK.name))? else {
        return Ok(());
    };

    eng.effect(|eng| {
        eng.ctx_mut().target = Some(target);
        let amount = eng.roll(ap, Charge::All)?;
        eng.attack(target, amount)?;
        Ok(())
    })?;
    Ok(())
}

fn defend(eng: &mut Engine) -> Flow<()> {
    let Some((actor, gp)) = potential(eng, |unit| unit.gp)? else {
        return Ok(());
    };
    eng.effect(|eng| {
        eng.ctx_mut().target = Some(actor);
        let amount = eng.roll(gp, Charge::All)?;
        eng.guard(actor, amount)
    })?;
    Ok(())
}

fn concentrate(eng: &mut Engine) -> Flow<()> {
    let Some((actor, cp)) = potential(eng, |unit| unit.cp)? else {
        return Ok(());
    };
    eng.effect(|eng| {
        eng.ctx_mut().target = Some(actor);
        let amount = eng.roll(cp, Charge::None)?;
        eng.concentrate(actor, amount)
    })?;
    Ok(())
}
