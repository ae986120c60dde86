use std::sync::{Arc, Mutex};

use combat_core::{
    Engine, EventBinding, Flow, Guard, RemovalCause, Scene, Status, StatusFlags, StatusType,
    Target, TeamKind, Unit, UnitId,
};
use combat_core::Reaction::{self, Pass, Spent};

/// Appends `digit` to the source unit's charge, so the charge reads as a
/// log of which handlers ran and in what order.
fn mark(eng: &mut Engine, digit: i64) -> Flow<Reaction> {
    let Some(source) = eng.ctx().source else {
        return Ok(Pass);
    };
    let unit = eng.scene_mut().unit_mut(source)?;
    unit.charge = unit.charge * 10 + digit;
    Ok(Pass)
}

fn first(eng: &mut Engine) -> Flow<Reaction> {
    mark(eng, 1)
}

fn second(eng: &mut Engine) -> Flow<Reaction> {
    mark(eng, 2)
}

fn spend(eng: &mut Engine) -> Flow<Reaction> {
    mark(eng, 3)?;
    Ok(Spent)
}

static LOW: StatusType = StatusType::new("Low", &[EventBinding::new("ping", first).with_priority(-5)]);
static HIGH: StatusType = StatusType::new("High", &[EventBinding::new("ping", second).with_priority(9)]);
static SPEND: StatusType = StatusType::new("Spend", &[EventBinding::new("ping", spend)]);
static INERT: StatusType = StatusType::new("Inert", &[]);

fn two_sides() -> (Engine, UnitId, UnitId) {
    let mut eng = Engine::make();
    let ally = eng.scene_mut().link_unit(Unit::new("Knight", TeamKind::Ally).with_hp(10));
    let enemy = eng.scene_mut().link_unit(Unit::new("Ogre", TeamKind::Enemy).with_hp(10));
    (eng, ally, enemy)
}

fn charge(eng: &Engine, id: UnitId) -> i64 {
    eng.scene().unit(id).unwrap().charge
}

#[test]
fn dispatch_follows_registration_order() {
    let (mut eng, ally, _) = two_sides();
    eng.inflict(Status::new(&HIGH), ally, None).unwrap();
    eng.inflict(Status::new(&LOW), ally, None).unwrap();

    eng.notify("ping").unwrap();
    assert_eq!(charge(&eng, ally), 21);
}

#[test]
fn linking_round_trip_restores_the_registry() {
    let (mut eng, ally, enemy) = two_sides();
    let id = eng.inflict(Status::new(&LOW), enemy, Some(ally)).unwrap();
    assert_eq!(eng.scene().events().get("ping").map(Vec::len), Some(1));
    assert_eq!(eng.scene().unit(enemy).unwrap().statuses(), &[id]);
    assert_eq!(eng.scene().unit(ally).unwrap().inflictors().get(&id), Some(&enemy));

    eng.remove_status(id, Some(ally), RemovalCause::dispelled()).unwrap();
    assert!(eng.scene().events().is_empty());
    assert!(eng.scene().unit(enemy).unwrap().statuses().is_empty());
    assert!(eng.scene().unit(ally).unwrap().inflictors().is_empty());
    assert!(eng.scene().is_status_removed(id));
}

#[test]
fn protection_flags_do_not_block_removal() {
    let (mut eng, ally, _) = two_sides();
    let id = eng
        .inflict(
            Status::new(&INERT).with_flags(StatusFlags::UNBREAKABLE | StatusFlags::UNDISPELLABLE),
            ally,
            None,
        )
        .unwrap();

    eng.remove_status(id, None, RemovalCause::broken()).unwrap();
    assert!(eng.scene().unit(ally).unwrap().statuses().is_empty());
}

#[test]
fn removing_an_unlinked_status_is_harmless() {
    let (mut eng, ally, _) = two_sides();
    let id = eng.scene_mut().add_status(Status::new(&LOW));
    eng.remove_status(id, None, RemovalCause::dispelled()).unwrap();
    assert!(eng.scene().unit(ally).unwrap().statuses().is_empty());
}

#[test]
fn spent_uses_remove_the_status() {
    let (mut eng, ally, _) = two_sides();
    let id = eng.inflict(Status::new(&SPEND).with_uses(2), ally, None).unwrap();

    eng.notify("ping").unwrap();
    assert_eq!(eng.scene().status(id).unwrap().uses, Some(1));
    eng.notify("ping").unwrap();
    eng.notify("ping").unwrap();

    assert_eq!(charge(&eng, ally), 33);
    assert!(eng.scene().unit(ally).unwrap().statuses().is_empty());
}

fn purge(eng: &mut Engine) -> Flow<Reaction> {
    let Some(source) = eng.ctx().source else {
        return Ok(Pass);
    };
    let doomed: Vec<_> = eng
        .scene()
        .unit(source)?
        .statuses()
        .iter()
        .copied()
        .filter(|id| Some(*id) != eng.ctx().status)
        .collect();
    for id in doomed {
        eng.remove_status(id, Some(source), RemovalCause::dispelled())?;
    }
    Ok(Pass)
}

static PURGE: StatusType = StatusType::new("Purge", &[EventBinding::new("ping", purge)]);

#[test]
fn statuses_removed_mid_dispatch_are_skipped() {
    let (mut eng, ally, _) = two_sides();
    eng.inflict(Status::new(&PURGE), ally, None).unwrap();
    eng.inflict(Status::new(&LOW), ally, None).unwrap();

    eng.notify("ping").unwrap();
    assert_eq!(charge(&eng, ally), 0);
    assert_eq!(eng.scene().unit(ally).unwrap().statuses().len(), 1);
}

#[test]
fn link_members_share_the_use_budget() {
    let (mut eng, ally, _) = two_sides();
    let scene = eng.scene_mut();
    let spend = scene.add_status(Status::new(&SPEND));
    let low = scene.add_status(Status::new(&LOW));
    let link = scene.add_status(Status::link([spend, low]).with_uses(1));

    eng.inflict_status(link, ally, None).unwrap();
    assert_eq!(eng.scene().events().len(), 1);
    assert_eq!(eng.scene().events()["ping"].len(), 2);

    eng.notify("ping").unwrap();
    // `spend` used the link up, so `low` no longer hears the event
    assert_eq!(charge(&eng, ally), 3);
    assert!(eng.scene().events().is_empty());
    assert!(eng.scene().is_status_removed(low));
}

#[test]
fn aura_watches_every_unit_in_its_area() {
    let (mut eng, ally, enemy) = two_sides();
    let other = eng.scene_mut().link_unit(Unit::new("Goblin", TeamKind::Enemy));
    let mount = eng.scene_mut().add_status(Status::new(&LOW));
    eng.inflict(Status::aura(mount, Target::Team(TeamKind::Enemy)), ally, None)
        .unwrap();

    eng.notify("ping").unwrap();
    assert_eq!(charge(&eng, ally), 0);
    assert_eq!(charge(&eng, enemy), 1);
    assert_eq!(charge(&eng, other), 1);

    // a unit joining later is covered too
    let late = eng.scene_mut().link_unit(Unit::new("Imp", TeamKind::Enemy));
    eng.notify("ping").unwrap();
    assert_eq!(charge(&eng, late), 1);
    assert_eq!(charge(&eng, enemy), 11);
}

#[test]
fn vs_guard_gates_the_inner_handler() {
    let (mut eng, ally, enemy) = two_sides();
    let inner = eng.scene_mut().add_status(Status::new(&SPEND).with_uses(1));
    let guard = Guard::new(move |eng: &Engine| eng.ctx().actor == Some(enemy));
    eng.inflict(Status::vs(inner, guard), ally, None).unwrap();

    eng.notify("ping").unwrap();
    assert_eq!(charge(&eng, ally), 0);
    assert_eq!(eng.scene().status(inner).unwrap().uses, Some(1));

    eng.ctx_mut().actor = Some(enemy);
    eng.notify("ping").unwrap();
    assert_eq!(charge(&eng, ally), 3);
    assert!(eng.scene().unit(ally).unwrap().statuses().is_empty());
}

#[test]
fn infliction_events_depend_on_the_actor() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let mut eng = Engine::make().with_listener(move |_, event| {
        if event.ends_with("_inflict") {
            sink.lock().unwrap().push(event.to_owned());
        }
    });
    let a = eng.scene_mut().link_unit(Unit::new("A", TeamKind::Ally));
    let b = eng.scene_mut().link_unit(Unit::new("B", TeamKind::Enemy));

    eng.inflict(Status::new(&INERT), b, None).unwrap();
    assert_eq!(*events.lock().unwrap(), ["out_inflict", "in_inflict", "hit_inflict"]);

    events.lock().unwrap().clear();
    let id = eng.inflict(Status::new(&INERT), b, Some(a)).unwrap();
    assert_eq!(*events.lock().unwrap(), ["in_inflict", "hit_inflict"]);
    assert_eq!(eng.scene().status(id).unwrap().owner(), Some(a));
}

fn cancel(eng: &mut Engine) -> Flow<Reaction> {
    eng.throw(None)
}

static WARD: StatusType = StatusType::new("Ward", &[EventBinding::new("in_inflict", cancel)]);

#[test]
fn cancelled_infliction_leaves_the_status_unlinked() {
    let (mut eng, ally, enemy) = two_sides();
    eng.inflict(Status::new(&WARD), enemy, None).unwrap();

    let id = eng.inflict(Status::new(&LOW), enemy, Some(ally)).unwrap();
    assert_eq!(eng.scene().status(id).unwrap().owner(), None);
    assert_eq!(eng.scene().unit(enemy).unwrap().statuses().len(), 1);
}

fn look(_: &mut Engine) -> Flow<Reaction> {
    Ok(Pass)
}

static ONLOOKER: StatusType =
    StatusType::new("Onlooker", &[EventBinding::new("in_inflict", look)]);

#[test]
fn onlookers_do_not_hijack_an_infliction() {
    let (mut eng, ally, enemy) = two_sides();
    let onlooker = eng.inflict(Status::new(&ONLOOKER), ally, None).unwrap();

    let id = eng.inflict(Status::new(&LOW), enemy, Some(ally)).unwrap();
    assert_eq!(eng.scene().status(id).unwrap().owner(), Some(ally));
    assert_eq!(eng.scene().bearer(id).unwrap(), enemy);
    assert_eq!(eng.scene().unit(enemy).unwrap().statuses(), &[id]);

    assert_eq!(eng.scene().bearer(onlooker).unwrap(), ally);
    assert_eq!(eng.scene().unit(ally).unwrap().statuses(), &[onlooker]);
}

#[test]
fn notify_hands_back_the_callers_source_and_status() {
    let (mut eng, ally, enemy) = two_sides();
    let low = eng.inflict(Status::new(&LOW), ally, None).unwrap();
    let other = eng.scene_mut().add_status(Status::new(&INERT));
    assert_ne!(low, other);

    eng.ctx_mut().source = Some(enemy);
    eng.ctx_mut().status = Some(other);
    eng.notify("ping").unwrap();

    assert_eq!(charge(&eng, ally), 1);
    assert_eq!((eng.ctx().source, eng.ctx().status), (Some(enemy), Some(other)));
}

#[test]
fn unlinking_a_unit_hands_its_statuses_over() {
    let (mut eng, ally, enemy) = two_sides();
    let id = eng.inflict(Status::new(&LOW), enemy, Some(ally)).unwrap();

    let gone = eng.scene_mut().unlink_unit(ally).unwrap();
    assert!(gone.inflictors().is_empty());
    assert_eq!(eng.scene().status(id).unwrap().owner(), Some(enemy));
    assert_eq!(eng.scene().unit(enemy).unwrap().inflictors().get(&id), Some(&enemy));

    eng.notify("ping").unwrap();
    assert_eq!(charge(&eng, enemy), 1);
}

#[test]
fn innate_statuses_link_with_the_unit() {
    let mut scene = Scene::new();
    let id = scene.link_unit(Unit::new("Golem", TeamKind::Enemy).with_status(Status::new(&LOW)));
    let statuses = scene.unit(id).unwrap().statuses().to_vec();
    assert_eq!(statuses.len(), 1);
    assert_eq!(scene.status(statuses[0]).unwrap().owner(), Some(id));

    let mut eng = Engine::make().with_scene(scene);
    eng.notify("ping").unwrap();
    assert_eq!(charge(&eng, id), 1);
}

#[test]
fn disabled_statuses_stay_silent() {
    let (mut eng, ally, _) = two_sides();
    let id = eng.inflict(Status::new(&LOW), ally, None).unwrap();

    eng.scene_mut().status_mut(id).unwrap().disable();
    eng.scene_mut().status_mut(id).unwrap().disable();
    eng.notify("ping").unwrap();
    eng.scene_mut().status_mut(id).unwrap().enable();
    eng.notify("ping").unwrap();
    assert_eq!(charge(&eng, ally), 0);

    eng.scene_mut().status_mut(id).unwrap().enable();
    eng.notify("ping").unwrap();
    assert_eq!(charge(&eng, ally), 1);
}
