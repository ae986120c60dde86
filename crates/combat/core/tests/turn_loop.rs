use std::sync::{Arc, Mutex};

use combat_core::{
    ActionPolicy, ActionType, Engine, EngineError, EventBinding, FightOutcome, Flow, Frame,
    Reaction, Scene, Status, StatusType, TeamKind, Timeframe, Unit, UnitId,
};

/// Counts performances in the actor's charge.
fn tally(eng: &mut Engine) -> Flow<()> {
    if let Some(actor) = eng.ctx().actor {
        eng.scene_mut().unit_mut(actor)?.charge += 1;
    }
    Ok(())
}

fn strike(eng: &mut Engine) -> Flow<()> {
    let Some(actor) = eng.ctx().actor else {
        return Ok(());
    };
    let foes = combat_core::Target::Team(eng.scene().unit(actor)?.team.opponent());
    if let Some(target) = eng.lock_target(&foes, None)? {
        eng.attack(target, 5)?;
    }
    Ok(())
}

static WAIT: ActionType = ActionType::new("Wait", "Do nothing.", 0, tally);
static NOVA: ActionType = ActionType::new("Nova", "Big blast.", 3, tally);
static STRIKE: ActionType = ActionType::new("Strike", "Hit a foe for 5.", 0, strike);

struct Idle;

impl ActionPolicy for Idle {
    fn choose_action(&self, _scene: &Scene, _actor: UnitId) -> Option<usize> {
        None
    }
}

fn record_turns(eng: Engine) -> (Engine, Arc<Mutex<Vec<UnitId>>>) {
    let order = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&order);
    let eng = eng.with_listener(move |ctx, event| {
        if event == "pre_unit_turn"
            && let Some(actor) = ctx.actor
        {
            sink.lock().unwrap().push(actor);
        }
    });
    (eng, order)
}

#[test]
fn units_act_in_priority_order() {
    let (mut eng, order) = record_turns(Engine::make());
    let mid = eng
        .scene_mut()
        .link_unit(Unit::new("mid", TeamKind::Ally).with_priority(10).with_action(WAIT.instance()));
    let low = eng
        .scene_mut()
        .link_unit(Unit::new("low", TeamKind::Enemy).with_priority(5).with_action(WAIT.instance()));
    let high = eng
        .scene_mut()
        .link_unit(Unit::new("high", TeamKind::Ally).with_priority(20).with_action(WAIT.instance()));

    eng.global_turn().unwrap();

    assert_eq!(*order.lock().unwrap(), vec![high, mid, low]);
    assert_eq!(eng.scene().turn, 1);
    for unit in eng.scene().units() {
        assert_eq!(unit.num_acts, None, "{} still mid-turn", unit.name);
        assert!(!unit.can_act());
        assert_eq!(unit.charge, 1, "{} acted once", unit.name);
    }
}

#[test]
fn extra_acts_per_turn_are_spent() {
    let config = combat_core::EngineConfig::new().with_acts_per_turn(3);
    let mut eng = Engine::with_config(config);
    let id = eng
        .scene_mut()
        .link_unit(Unit::new("hasted", TeamKind::Ally).with_action(WAIT.instance()));

    eng.global_turn().unwrap();
    assert_eq!(eng.scene().unit(id).unwrap().charge, 3);
}

#[test]
fn cooldown_expires_after_three_turns() {
    let mut eng = Engine::make().with_policy(Arc::new(Idle));
    let id = eng
        .scene_mut()
        .link_unit(Unit::new("caster", TeamKind::Ally).with_action(NOVA.instance()));

    eng.perform(id, 0).unwrap();
    let action = &eng.scene().unit(id).unwrap().actions[0];
    assert_eq!(action.cd, 3);
    assert!(!action.usable());
    assert_eq!(eng.scene().unit(id).unwrap().charge, 1);

    // on cooldown: silently skipped
    eng.perform(id, 0).unwrap();
    assert_eq!(eng.scene().unit(id).unwrap().charge, 1);

    for _ in 0..2 {
        eng.global_turn().unwrap();
        assert!(!eng.scene().unit(id).unwrap().actions[0].usable());
    }
    eng.global_turn().unwrap();
    assert!(eng.scene().unit(id).unwrap().actions[0].usable());
}

#[test]
fn cooldown_ticks_while_acting_every_turn() {
    let mut eng = Engine::make();
    let id = eng
        .scene_mut()
        .link_unit(Unit::new("caster", TeamKind::Ally).with_action(NOVA.instance()));

    let mut fired = Vec::new();
    for _ in 0..5 {
        eng.global_turn().unwrap();
        fired.push(eng.scene().unit(id).unwrap().charge);
    }
    // fires on turns 1 and 4
    assert_eq!(fired, vec![1, 1, 1, 2, 2]);
}

#[test]
fn unknown_action_index_is_an_error() {
    let mut eng = Engine::make();
    let id = eng.scene_mut().link_unit(Unit::new("empty", TeamKind::Ally));
    assert_eq!(
        eng.perform(id, 2).map_err(combat_core::Halt::into_error),
        Err(EngineError::UnknownAction { unit: id, index: 2 })
    );
}

fn quicken(eng: &mut Engine) -> Flow<Reaction> {
    if eng.ctx().source != eng.ctx().actor {
        return Ok(Reaction::Pass);
    }
    eng.ctx_mut().cooldown = Some(1);
    Ok(Reaction::Spent)
}

static QUICKEN: StatusType = StatusType::new("Quicken", &[EventBinding::new("pre_cd", quicken)]);

#[test]
fn pre_cd_observers_adjust_the_committed_cooldown() {
    let mut eng = Engine::make();
    let id = eng
        .scene_mut()
        .link_unit(Unit::new("caster", TeamKind::Ally).with_action(NOVA.instance()));
    eng.inflict(Status::new(&QUICKEN).with_uses(1), id, None).unwrap();

    eng.perform(id, 0).unwrap();
    assert_eq!(eng.scene().unit(id).unwrap().actions[0].cd, 1);
    assert!(eng.scene().unit(id).unwrap().statuses().is_empty());
}

fn stun(eng: &mut Engine) -> Flow<Reaction> {
    if eng.ctx().source != eng.ctx().actor {
        return Ok(Reaction::Pass);
    }
    eng.throw(Some(Timeframe::UnitTurn.into()))
}

fn fizzle(eng: &mut Engine) -> Flow<Reaction> {
    if eng.ctx().source != eng.ctx().actor {
        return Ok(Reaction::Pass);
    }
    eng.throw(None)
}

static STUN: StatusType = StatusType::new("Stun", &[EventBinding::new("pre_unit_turn", stun)]);
static FIZZLE: StatusType = StatusType::new("Fizzle", &[EventBinding::new("pre_action", fizzle)]);

#[test]
fn interrupted_unit_turn_skips_only_that_unit() {
    let mut eng = Engine::make();
    let stunned = eng
        .scene_mut()
        .link_unit(Unit::new("stunned", TeamKind::Ally).with_priority(2).with_action(WAIT.instance()));
    let free = eng
        .scene_mut()
        .link_unit(Unit::new("free", TeamKind::Enemy).with_priority(1).with_action(WAIT.instance()));
    eng.inflict(Status::new(&STUN), stunned, None).unwrap();

    eng.global_turn().unwrap();
    assert_eq!(eng.scene().unit(stunned).unwrap().charge, 0);
    assert_eq!(eng.scene().unit(stunned).unwrap().num_acts, None);
    assert_eq!(eng.scene().unit(free).unwrap().charge, 1);
}

#[test]
fn interrupted_action_still_commits_cooldown() {
    let mut eng = Engine::make();
    let id = eng
        .scene_mut()
        .link_unit(Unit::new("caster", TeamKind::Ally).with_action(NOVA.instance()));
    eng.inflict(Status::new(&FIZZLE), id, None).unwrap();

    eng.global_turn().unwrap();
    let unit = eng.scene().unit(id).unwrap();
    assert_eq!(unit.charge, 0);
    assert_eq!(unit.actions[0].cd, 3);
}

fn rout(_: &mut Engine) -> Flow<Reaction> {
    Err(combat_core::Halt::Interrupt(Frame::Timeframe(Timeframe::Fight)))
}

static ROUT: StatusType = StatusType::new("Rout", &[EventBinding::new("pre_unit_turn", rout)]);

#[test]
fn interrupt_without_matching_scope_surfaces_as_error() {
    let mut eng = Engine::make();
    let id = eng
        .scene_mut()
        .link_unit(Unit::new("coward", TeamKind::Ally).with_action(WAIT.instance()));
    eng.inflict(Status::new(&ROUT), id, None).unwrap();

    assert_eq!(
        eng.global_turn(),
        Err(EngineError::UncaughtInterrupt(Frame::Timeframe(Timeframe::Fight)))
    );
    assert_eq!(eng.ctx().frame, Frame::Root);

    assert_eq!(eng.fight(5), Ok(FightOutcome::Interrupted));
}

#[test]
fn expired_statuses_are_removed_on_the_inflictors_turn() {
    let removed = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&removed);
    let mut eng = Engine::make().with_listener(move |_, event| {
        if event == "post_dispel" {
            *sink.lock().unwrap() += 1;
        }
    });
    let caster = eng
        .scene_mut()
        .link_unit(Unit::new("caster", TeamKind::Ally).with_action(WAIT.instance()));
    let victim = eng
        .scene_mut()
        .link_unit(Unit::new("victim", TeamKind::Enemy).with_action(WAIT.instance()));
    eng.inflict(Status::new(&STUN).with_turns(2), victim, Some(caster))
        .unwrap();

    eng.global_turn().unwrap();
    assert_eq!(eng.scene().unit(victim).unwrap().statuses().len(), 1);
    assert_eq!(eng.scene().unit(victim).unwrap().charge, 0);

    eng.global_turn().unwrap();
    assert!(eng.scene().unit(victim).unwrap().statuses().is_empty());
    assert!(eng.scene().unit(caster).unwrap().inflictors().is_empty());
    assert_eq!(*removed.lock().unwrap(), 1);
    assert_eq!(eng.scene().unit(victim).unwrap().charge, 1);
}

#[test]
fn fight_runs_until_a_team_falls() {
    let mut eng = Engine::make();
    eng.scene_mut().link_unit(
        Unit::new("hero", TeamKind::Ally)
            .with_hp(20)
            .with_priority(1)
            .with_action(STRIKE.instance()),
    );
    let slime = eng
        .scene_mut()
        .link_unit(Unit::new("slime", TeamKind::Enemy).with_hp(10));

    assert_eq!(eng.fight(10), Ok(FightOutcome::Victory(TeamKind::Ally)));
    assert_eq!(eng.scene().turn, 2);
    assert!(!eng.scene().unit(slime).unwrap().is_alive());
}

#[test]
fn fight_without_damage_is_a_stalemate() {
    let mut eng = Engine::make();
    eng.scene_mut()
        .link_unit(Unit::new("a", TeamKind::Ally).with_action(WAIT.instance()));
    eng.scene_mut()
        .link_unit(Unit::new("b", TeamKind::Enemy).with_action(WAIT.instance()));

    assert_eq!(eng.fight(3), Ok(FightOutcome::Stalemate));
    assert_eq!(eng.scene().turn, 3);
}
