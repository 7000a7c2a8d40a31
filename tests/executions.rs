//! Scenario tests for the execution task catalog, driven through the
//! public engine API against a hand-built two-island world.

use std::path::PathBuf;

use hegemon::engine::{EngineBuilder, EngineSettings, Intent};
use hegemon::execution::{
    BomberExecution, CargoPlaneExecution, ConstructionExecution, SamMissileExecution,
    StructureExecution, TransportShipExecution,
};
use hegemon::game::player::PlayerId;
use hegemon::game::unit::{UnitId, UnitSpec, UnitType};
use hegemon::game::updates::GameUpdate;
use hegemon::game::Game;
use hegemon::scenario::Scenario;
use hegemon::Engine;

const TWO_ISLANDS: &str = r#"
name: two_islands
seed: 5
spawn_phase_ticks: 0
map:
  - "~~~~~~~~~~~~~~~~~~~~~~~~"
  - "~........~~~~..........~"
  - "~........~~~~..........~"
  - "~........~~~~..........~"
  - "~........~~~~..........~"
  - "~........~~~~..........~"
  - "~........~~~~..........~"
  - "~........~~~~..........~"
  - "~........~~~~..........~"
  - "~........~~~~..........~"
  - "~........~~~~..........~"
  - "~~~~~~~~~~~~~~~~~~~~~~~~"
nations:
  - name: West
    kind: human
    spawn: [4, 5]
  - name: East
    kind: human
    spawn: [18, 5]
"#;

const WEST: PlayerId = PlayerId(0);
const EAST: PlayerId = PlayerId(1);

fn setup() -> (Game, Engine) {
    let scenario = Scenario::from_str(TWO_ISLANDS).expect("scenario parses");
    let mut game = scenario.build_game();
    let west_home = game.map().tile(4, 5);
    let east_home = game.map().tile(18, 5);
    assert!(game.spawn_player(WEST, west_home));
    assert!(game.spawn_player(EAST, east_home));
    let engine = EngineBuilder::new(EngineSettings {
        scenario_name: scenario.name.clone(),
        snapshot_interval_ticks: 0,
        snapshot_dir: PathBuf::from("snapshots_execution_tests"),
    })
    .build();
    (game, engine)
}

fn run(engine: &mut Engine, game: &mut Game, ticks: u64) -> Vec<GameUpdate> {
    let mut updates = Vec::new();
    for _ in 0..ticks {
        updates.extend(engine.advance(game).expect("advance succeeds").updates);
    }
    updates
}

fn units_of_kind(game: &Game, owner: PlayerId, kind: UnitType) -> Vec<UnitId> {
    game.units_of_type(owner, kind)
}

#[test]
fn construction_succeeds_with_gold_and_valid_tile() {
    let (mut game, mut engine) = setup();
    game.add_gold(WEST, 1_000_000);
    let tile = game.map().tile(4, 4);
    game.add_execution(Box::new(StructureExecution::new(WEST, UnitType::City, tile)));

    run(&mut engine, &mut game, 1);
    let cities = units_of_kind(&game, WEST, UnitType::City);
    assert_eq!(cities.len(), 1, "city should appear within one tick");
    assert_eq!(game.unit(cities[0]).tile, tile);
    assert_eq!(engine.active_task_count(), 1, "structure task stays active");
}

#[test]
fn construction_fails_without_gold() {
    let (mut game, mut engine) = setup();
    let tile = game.map().tile(4, 4);
    game.add_execution(Box::new(StructureExecution::new(WEST, UnitType::City, tile)));

    run(&mut engine, &mut game, 2);
    assert!(units_of_kind(&game, WEST, UnitType::City).is_empty());
    assert_eq!(engine.active_task_count(), 0, "task terminates on first tick");
}

#[test]
fn construction_site_produces_structure_after_duration() {
    let (mut game, mut engine) = setup();
    game.add_gold(WEST, 1_000_000);
    let tile = game.map().tile(3, 5);
    game.add_execution(Box::new(ConstructionExecution::new(
        WEST,
        UnitType::Academy,
        tile,
    )));

    run(&mut engine, &mut game, 2);
    assert_eq!(units_of_kind(&game, WEST, UnitType::Construction).len(), 1);
    assert!(units_of_kind(&game, WEST, UnitType::Academy).is_empty());

    let duration = game.config().construction_duration;
    run(&mut engine, &mut game, duration + 3);
    assert!(units_of_kind(&game, WEST, UnitType::Construction).is_empty());
    assert_eq!(units_of_kind(&game, WEST, UnitType::Academy).len(), 1);
}

#[test]
fn structure_survives_recapture_with_new_owner() {
    let (mut game, mut engine) = setup();
    game.add_gold(WEST, 1_000_000);
    let tile = game.map().tile(4, 4);
    game.add_execution(Box::new(StructureExecution::new(WEST, UnitType::City, tile)));
    run(&mut engine, &mut game, 1);
    let city = units_of_kind(&game, WEST, UnitType::City)[0];

    game.conquer(EAST, tile);
    run(&mut engine, &mut game, 2);
    assert!(game.unit(city).active, "owner swap is absorbed");
    assert_eq!(game.unit(city).owner, EAST);
    assert_eq!(engine.active_task_count(), 1);
}

#[test]
fn bomber_round_trip_destroys_target_and_returns() {
    let (mut game, mut engine) = setup();
    game.add_gold(WEST, 1_000_000);
    game.add_gold(EAST, 1_000_000);

    let airfield_tile = game.map().tile(4, 4);
    let airfield = game.build_unit(WEST, UnitType::Airfield, airfield_tile, UnitSpec::default());
    let city_tile = game.map().tile(18, 5);
    let city = game.build_unit(EAST, UnitType::City, city_tile, UnitSpec::default());

    game.add_execution(Box::new(BomberExecution::new(WEST, airfield, city_tile)));

    let updates = run(&mut engine, &mut game, 120);
    assert!(!game.unit(city).active, "payload should level the city");
    let credited = updates.iter().any(|u| {
        matches!(
            u,
            GameUpdate::UnitDestroyed {
                unit,
                destroyer: Some(d),
                ..
            } if *unit == city && *d == WEST
        )
    });
    assert!(credited, "city kill credited to the bomber's owner");
    assert!(
        units_of_kind(&game, WEST, UnitType::Bomber).is_empty(),
        "bomber deleted after returning home"
    );
    assert_eq!(engine.active_task_count(), 0);
}

#[test]
fn sam_missile_intercepts_whitelisted_target() {
    let (mut game, mut engine) = setup();
    game.add_gold(WEST, 1_000_000);
    game.add_gold(EAST, 1_000_000);

    let launcher_tile = game.map().tile(4, 4);
    let launcher = game.build_unit(WEST, UnitType::SamLauncher, launcher_tile, UnitSpec::default());
    let bomber_tile = game.map().tile(18, 3);
    let bomber = game.build_unit(EAST, UnitType::Bomber, bomber_tile, UnitSpec::default());

    game.add_execution(Box::new(SamMissileExecution::new(
        launcher_tile,
        WEST,
        launcher,
        bomber,
    )));

    let mut kill_tick = None;
    for _ in 0..20 {
        let summary = engine.advance(&mut game).unwrap();
        let bomber_down = summary.updates.iter().any(
            |u| matches!(u, GameUpdate::UnitDestroyed { unit, .. } if *unit == bomber),
        );
        if bomber_down {
            let missile_down = summary.updates.iter().any(|u| {
                matches!(
                    u,
                    GameUpdate::UnitDestroyed { unit_type: UnitType::SamMissile, .. }
                )
            });
            assert!(missile_down, "missile and target deactivate on the same tick");
            kill_tick = Some(summary.tick);
            break;
        }
    }
    assert!(kill_tick.is_some(), "interception should converge");
    assert!(!game.unit(bomber).active);
}

#[test]
fn sam_launcher_scans_and_fires_on_its_own() {
    let (mut game, mut engine) = setup();
    game.add_gold(WEST, 1_000_000);
    game.add_gold(EAST, 1_000_000);

    let launcher_tile = game.map().tile(4, 4);
    game.add_execution(Box::new(hegemon::execution::SamLauncherExecution::new(
        WEST,
        launcher_tile,
    )));
    let bomber = game.build_unit(
        EAST,
        UnitType::Bomber,
        game.map().tile(18, 3),
        UnitSpec::default(),
    );

    run(&mut engine, &mut game, 10);
    assert!(
        !game.unit(bomber).active,
        "launcher should acquire and destroy the intruder"
    );
}

#[test]
fn sam_missile_expires_against_non_interceptable_target() {
    let (mut game, mut engine) = setup();
    game.add_gold(WEST, 1_000_000);
    game.add_gold(EAST, 1_000_000);

    let launcher_tile = game.map().tile(4, 4);
    let launcher = game.build_unit(WEST, UnitType::SamLauncher, launcher_tile, UnitSpec::default());
    let mirv_tile = game.map().tile(18, 3);
    let mirv = game.build_unit(EAST, UnitType::Mirv, mirv_tile, UnitSpec::default());

    game.add_execution(Box::new(SamMissileExecution::new(
        launcher_tile,
        WEST,
        launcher,
        mirv,
    )));

    run(&mut engine, &mut game, 5);
    assert!(game.unit(mirv).active, "MIRV warheads cannot be intercepted");
    assert_eq!(engine.active_task_count(), 0, "missile expires harmlessly");
}

#[test]
fn cargo_plane_pays_both_endpoints() {
    let (mut game, mut engine) = setup();
    game.add_gold(WEST, 1_000);
    game.add_gold(EAST, 1_000);

    let west_field = game.build_unit(
        WEST,
        UnitType::Airfield,
        game.map().tile(4, 4),
        UnitSpec::default(),
    );
    let east_field = game.build_unit(
        EAST,
        UnitType::Airfield,
        game.map().tile(18, 4),
        UnitSpec::default(),
    );
    let west_gold = game.player(WEST).gold;
    let east_gold = game.player(EAST).gold;

    game.add_execution(Box::new(CargoPlaneExecution::new(WEST, west_field, east_field)));

    let updates = run(&mut engine, &mut game, 60);
    let payouts = updates
        .iter()
        .filter(|u| matches!(u, GameUpdate::GoldReceived { .. }))
        .count();
    assert_eq!(payouts, 2, "both endpoints receive the trade bonus");
    assert!(game.player(WEST).gold > west_gold);
    assert!(game.player(EAST).gold > east_gold);
    assert!(
        units_of_kind(&game, WEST, UnitType::CargoPlane).is_empty(),
        "plane retires after delivery"
    );
}

#[test]
fn transport_lands_a_beachhead_on_open_shore() {
    let (mut game, mut engine) = setup();
    let destination = game.map().tile(13, 2);
    assert!(game.owner_of(destination).is_none());
    let troops_before = game.player(WEST).troops;

    game.add_execution(Box::new(TransportShipExecution::new(
        WEST,
        None,
        destination,
        50.0,
    )));

    run(&mut engine, &mut game, 60);
    assert_eq!(game.owner_of(destination), Some(WEST));
    assert!(
        game.player(WEST).troops < troops_before,
        "carried troops left the pool"
    );
}

#[test]
fn investment_rate_intent_validates_range() {
    let (mut game, mut engine) = setup();
    engine.apply(
        &mut game,
        Intent::SetInvestmentRate {
            player: WEST,
            rate: 0.3,
        },
    );
    run(&mut engine, &mut game, 1);
    assert_eq!(game.player(WEST).investment_rate, 0.3);

    engine.apply(
        &mut game,
        Intent::SetInvestmentRate {
            player: WEST,
            rate: 1.5,
        },
    );
    run(&mut engine, &mut game, 1);
    assert_eq!(
        game.player(WEST).investment_rate,
        0.3,
        "out-of-range rate is ignored"
    );
}

#[test]
fn intents_for_unknown_players_are_dropped() {
    let (mut game, mut engine) = setup();
    engine.apply(
        &mut game,
        Intent::Attack {
            player: PlayerId(42),
            target: None,
            troops: 10.0,
        },
    );
    run(&mut engine, &mut game, 2);
    assert_eq!(engine.active_task_count(), 0);
}

#[test]
fn spawn_intent_after_spawn_phase_is_rejected() {
    let scenario = Scenario::from_str(TWO_ISLANDS).unwrap();
    let mut game = scenario.build_game();
    let mut engine = EngineBuilder::new(EngineSettings {
        scenario_name: "late_spawn".into(),
        snapshot_interval_ticks: 0,
        snapshot_dir: PathBuf::from("snapshots_execution_tests"),
    })
    .build();

    let tile = game.map().tile(4, 5);
    engine.apply(&mut game, Intent::Spawn { player: WEST, tile });
    run(&mut engine, &mut game, 2);
    assert!(!game.player(WEST).spawned);
    assert_eq!(game.player(WEST).tiles_owned(), 0);
}
