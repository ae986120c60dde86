use std::io::Write;

use combat_content::{ATK_UP, ConfigLoader, RosterLoader};
use combat_core::{Engine, FightOutcome, Status, TeamKind, UnitFlags};
use tempfile::NamedTempFile;

const SKIRMISH: &str = r#"[
    (name: "Sandra", team: ally, hp: 30, priority: 2, ap: Some("10"), actions: ["Attack"]),
    (name: "Oru", team: ally, hp: 30, priority: 1, ap: Some("10"), actions: ["Attack"]),
    (name: "Goblin", team: enemy, hp: 20, ap: Some("3"), actions: ["Attack"]),
    (name: "Kobold", team: enemy, hp: 20, ap: Some("3"), actions: ["Attack"]),
]"#;

const MELEE: &str = r#"[
    (name: "Sandra", team: ally, hp: 80, priority: 1, ap: Some("[11~14]"), gp: Some("[8~12]"), cp: Some("5"),
     actions: ["Attack", "Defend", "Concentrate"]),
    (name: "Renee", team: ally, hp: 80, ap: Some("[11~14]"), actions: ["Attack"]),
    (name: "Troll", team: enemy, hp: 150, ap: Some("2d8"), actions: ["Attack"]),
]"#;

fn file(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

fn encounter(config: &str, roster: &str) -> Engine {
    let config = ConfigLoader::load(file(config).path()).unwrap();
    let mut eng = Engine::with_config(config);
    for unit in RosterLoader::load(file(roster).path()).unwrap() {
        eng.scene_mut().link_unit(unit);
    }
    eng
}

#[test]
fn skirmish_plays_out_deterministically() {
    let mut eng = encounter("", SKIRMISH);

    assert_eq!(eng.fight(10), Ok(FightOutcome::Victory(TeamKind::Ally)));
    assert_eq!(eng.scene().turn, 2);

    let scene = eng.scene();
    let hp = |name: &str| scene.unit(scene.unit_by_name(name).unwrap()).unwrap().hp;
    // the kobold swings once at the first ally before falling
    assert_eq!((hp("Sandra"), hp("Oru")), (27, 30));
    assert!(scene.living(TeamKind::Enemy).is_empty());
    for unit in scene.units() {
        assert_eq!(unit.num_acts, None);
    }
}

#[test]
fn attack_up_speeds_up_the_skirmish() {
    let mut eng = encounter("", SKIRMISH);
    let sandra = eng.scene().unit_by_name("Sandra").unwrap();
    eng.inflict(Status::new(&ATK_UP).with_potency(10i64), sandra, None)
        .unwrap();

    eng.global_turn().unwrap();
    let scene = eng.scene();
    let goblin = scene.unit(scene.unit_by_name("Goblin").unwrap()).unwrap();
    let kobold = scene.unit(scene.unit_by_name("Kobold").unwrap()).unwrap();
    assert!(goblin.flags.contains(UnitFlags::DEAD));
    assert_eq!(kobold.hp, 10);
}

#[test]
fn same_seed_replays_the_same_fight() {
    let play = |seed: u64| {
        let mut eng = encounter(&format!("seed = {seed}"), MELEE);
        let outcome = eng.fight(30).unwrap();
        let hps: Vec<_> = eng.scene().units().iter().map(|unit| unit.hp).collect();
        (outcome, eng.scene().turn, hps)
    };

    let first = play(7);
    assert_eq!(first, play(7));
    assert_ne!(first.0, FightOutcome::Interrupted);
}
