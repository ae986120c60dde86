//! Potency statuses.
//!
//! Each status watches one side of a damage or healing exchange and shifts
//! the [`DamageFrame`](combat_core::DamageFrame) by its potency: flat
//! potencies move the additive part, scaling potencies the proportional
//! part. Outgoing modifiers only react when their bearer is the actor,
//! incoming ones only when the bearer is the target.

use combat_core::{Engine, EventBinding, Flow, Potency, Reaction, StatusType};

/// Which side of the exchange a modifier applies to.
#[derive(Clone, Copy)]
enum Side {
    Out,
    In,
}

fn modify(eng: &mut Engine, side: Side, apply: fn(Potency, &mut i64, &mut f64)) -> Flow<Reaction> {
    let ctx = eng.ctx();
    let party = match side {
        Side::Out => ctx.actor,
        Side::In => ctx.target,
    };
    if ctx.source.is_none() || ctx.source != party {
        return Ok(Reaction::Pass);
    }

    let potency = eng.status_potency()?;
    let damage = &mut eng.ctx_mut().damage;
    match side {
        Side::Out => apply(potency, &mut damage.flat_out, &mut damage.prop_out),
        Side::In => apply(potency, &mut damage.flat_in, &mut damage.prop_in),
    }
    Ok(Reaction::Spent)
}

fn raise_out(eng: &mut Engine) -> Flow<Reaction> {
    modify(eng, Side::Out, Potency::raise)
}

fn lower_out(eng: &mut Engine) -> Flow<Reaction> {
    modify(eng, Side::Out, Potency::lower)
}

fn raise_in(eng: &mut Engine) -> Flow<Reaction> {
    modify(eng, Side::In, Potency::raise)
}

fn lower_in(eng: &mut Engine) -> Flow<Reaction> {
    modify(eng, Side::In, Potency::lower)
}

/// Raises outgoing damage.
pub static ATK_UP: StatusType = StatusType::new("AtkUp", &[EventBinding::new("out_attack", raise_out)]);
/// Lowers outgoing damage.
pub static ATK_DOWN: StatusType =
    StatusType::new("AtkDown", &[EventBinding::new("out_attack", lower_out)]);
/// Lowers incoming damage.
pub static DEF_UP: StatusType = StatusType::new("DefUp", &[EventBinding::new("in_attack", lower_in)]);
/// Raises incoming damage.
pub static DEF_DOWN: StatusType =
    StatusType::new("DefDown", &[EventBinding::new("in_attack", raise_in)]);
/// Raises outgoing healing.
pub static HEAL_UP: StatusType = StatusType::new("HealUp", &[EventBinding::new("out_heal", raise_out)]);
/// Lowers outgoing healing.
pub static HEAL_DOWN: StatusType =
    StatusType::new("HealDown", &[EventBinding::new("out_heal", lower_out)]);
/// Raises incoming healing.
pub static REC_UP: StatusType = StatusType::new("RecUp", &[EventBinding::new("in_heal", raise_in)]);
/// Lowers incoming healing.
pub static REC_DOWN: StatusType =
    StatusType::new("RecDown", &[EventBinding::new("in_heal", lower_in)]);
