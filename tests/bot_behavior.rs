//! Autonomous-player decision tests: alliance policy, attack sizing with
//! the reserve floor, target selection, and embargo bookkeeping.

use std::path::PathBuf;

use hegemon::engine::{EngineBuilder, EngineSettings};
use hegemon::execution::{should_accept_alliance_request, BotBehavior};
use hegemon::game::player::{AllianceRequest, PlayerId};
use hegemon::game::updates::GameUpdate;
use hegemon::game::Game;
use hegemon::rng::GameRng;
use hegemon::scenario::Scenario;
use hegemon::Engine;

const OPEN_FIELD: &str = r#"
name: open_field
seed: 21
spawn_phase_ticks: 0
map:
  - "~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~"
  - "~............................~"
  - "~............................~"
  - "~............................~"
  - "~............................~"
  - "~............................~"
  - "~............................~"
  - "~............................~"
  - "~............................~"
  - "~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~"
nations:
  - name: Alpha
    kind: human
    spawn: [4, 4]
  - name: Beta
    kind: bot
    spawn: [12, 4]
  - name: Gamma
    kind: human
    spawn: [24, 4]
"#;

const ALPHA: PlayerId = PlayerId(0);
const BETA: PlayerId = PlayerId(1);
const GAMMA: PlayerId = PlayerId(2);

fn setup() -> (Game, Engine) {
    let scenario = Scenario::from_str(OPEN_FIELD).expect("scenario parses");
    let mut game = scenario.build_game();
    for (player, x) in [(ALPHA, 4u32), (BETA, 12), (GAMMA, 24)] {
        let home = game.map().tile(x, 4);
        assert!(game.spawn_player(player, home));
    }
    let engine = EngineBuilder::new(EngineSettings {
        scenario_name: scenario.name.clone(),
        snapshot_interval_ticks: 0,
        snapshot_dir: PathBuf::from("snapshots_bot_tests"),
    })
    .build();
    (game, engine)
}

fn request(from: PlayerId, to: PlayerId) -> AllianceRequest {
    AllianceRequest {
        from,
        to,
        created_tick: 0,
    }
}

/// Grows `player` until it owns at least `factor` times Gamma's territory.
fn inflate_territory(game: &mut Game, player: PlayerId, factor: usize) {
    let target = game.player(GAMMA).tiles_owned() * factor;
    let mut tile = 0;
    while game.player(player).tiles_owned() < target {
        if game.map().is_land(tile) && game.owner_of(tile).is_none() {
            game.conquer(player, tile);
        }
        tile += 1;
    }
}

#[test]
fn alliance_policy_rejects_hostility_first() {
    let (mut game, _) = setup();
    inflate_territory(&mut game, ALPHA, 4);
    // Even an overwhelming requestor is refused while relations are sour.
    game.update_relation(GAMMA, ALPHA, -60);
    assert!(!should_accept_alliance_request(
        &game,
        GAMMA,
        &request(ALPHA, GAMMA)
    ));
}

#[test]
fn alliance_policy_rejects_traitors() {
    let (mut game, _) = setup();
    inflate_territory(&mut game, ALPHA, 4);
    game.create_alliance_request(ALPHA, BETA);
    game.resolve_alliance_request(ALPHA, BETA, true);
    game.break_alliance(ALPHA, BETA);
    assert!(game.player(ALPHA).is_traitor());
    assert!(!should_accept_alliance_request(
        &game,
        GAMMA,
        &request(ALPHA, GAMMA)
    ));
}

#[test]
fn alliance_policy_accepts_much_larger_requestors() {
    let (mut game, _) = setup();
    inflate_territory(&mut game, ALPHA, 3);
    // Even with three standing alliances: size takes precedence over the
    // overcommitment rule.
    game.create_alliance_request(ALPHA, BETA);
    game.resolve_alliance_request(ALPHA, BETA, true);
    for other in [1u16, 2] {
        let extra = game.add_player(
            format!("Pact{other}"),
            hegemon::game::player::PlayerType::Bot,
            40,
        );
        game.player_mut(ALPHA).alliances.insert(extra);
    }
    assert!(should_accept_alliance_request(
        &game,
        GAMMA,
        &request(ALPHA, GAMMA)
    ));
}

#[test]
fn alliance_policy_rejects_overcommitted_requestors() {
    let (mut game, _) = setup();
    // Three standing alliances, but no size advantage.
    for other in [1u16, 2, 3] {
        let extra = game.add_player(format!("Pact{other}"), hegemon::game::player::PlayerType::Bot, 40);
        game.player_mut(ALPHA).alliances.insert(extra);
    }
    assert!(!should_accept_alliance_request(
        &game,
        GAMMA,
        &request(ALPHA, GAMMA)
    ));
}

#[test]
fn alliance_policy_accepts_by_default() {
    let (game, _) = setup();
    assert!(should_accept_alliance_request(
        &game,
        GAMMA,
        &request(ALPHA, GAMMA)
    ));
}

#[test]
fn first_attack_sends_a_fifth_later_attacks_keep_the_reserve() {
    let (mut game, mut engine) = setup();
    let trigger = 0.5;
    let reserve_ratio = 0.4;
    let mut behavior = BotBehavior::new(&game, ALPHA, trigger, reserve_ratio);

    let troops_before = game.player(ALPHA).troops;
    behavior.send_attack(&mut game, None);
    engine.advance(&mut game).unwrap();
    let after_first = game.player(ALPHA).troops;
    assert!(
        (troops_before - troops_before / 5.0 - after_first).abs() < 1e-6,
        "first attack sends a flat fifth ({troops_before} -> {after_first})"
    );

    // Refill and attack again: this time the reserve floor binds.
    game.add_troops(ALPHA, 10_000.0);
    let max_troops = game.max_population(ALPHA) * game.player(ALPHA).target_troop_ratio;
    let reserve = max_troops * reserve_ratio;
    behavior.send_attack(&mut game, None);
    engine.advance(&mut game).unwrap();
    let after_second = game.player(ALPHA).troops;
    assert!(
        after_second >= reserve - 1e-6,
        "troops {after_second} must not dip below the reserve {reserve}"
    );
}

#[test]
fn weak_attacks_are_not_sent() {
    let (mut game, mut engine) = setup();
    let mut behavior = BotBehavior::new(&game, ALPHA, 0.5, 0.99);
    // Reserve above current troops: nothing to send beyond the floor.
    behavior.send_attack(&mut game, None);
    // Force past the first-attack shortcut.
    behavior.send_attack(&mut game, None);
    engine.advance(&mut game).unwrap();
    let troops = game.player(ALPHA).troops;
    behavior.send_attack(&mut game, None);
    engine.advance(&mut game).unwrap();
    assert_eq!(game.player(ALPHA).troops, troops, "no attack leaves the pool");
}

#[test]
fn select_enemy_prefers_low_density_neighbor_bots() {
    let (mut game, _) = setup();
    let mut rng = GameRng::from_seed(1);
    // Make Alpha and Beta direct neighbors with a corridor of conquests.
    for x in 5..=10 {
        let tile = game.map().tile(x, 4);
        if game.owner_of(tile).is_none() {
            game.conquer(ALPHA, tile);
        }
    }
    // Plenty of troops so the trigger ratio is met.
    game.add_troops(ALPHA, 100_000.0);

    let mut behavior = BotBehavior::new(&game, ALPHA, 0.1, 0.3);
    let enemy = behavior.select_enemy(&mut game, &mut rng);
    assert_eq!(enemy, Some(BETA), "bordering bot is the preferred target");
}

#[test]
fn select_enemy_retaliates_against_largest_attacker() {
    let (mut game, _) = setup();
    let mut rng = GameRng::from_seed(2);
    game.add_troops(ALPHA, 100_000.0);
    game.register_attack(GAMMA, Some(ALPHA), 400.0);
    game.register_attack(BETA, Some(ALPHA), 90.0);

    // No neighboring bots: Alpha is isolated in its starting disk.
    let mut behavior = BotBehavior::new(&game, ALPHA, 0.1, 0.3);
    let enemy = behavior.select_enemy(&mut game, &mut rng);
    assert_eq!(
        enemy,
        Some(GAMMA),
        "largest incoming attack decides retaliation"
    );
}

#[test]
fn search_radius_expands_until_a_target_is_found() {
    let (mut game, _) = setup();
    let mut rng = GameRng::from_seed(3);
    game.add_troops(ALPHA, 100_000.0);
    // Ally with everyone so nothing qualifies as an enemy.
    for other in [BETA, GAMMA] {
        game.create_alliance_request(ALPHA, other);
        game.resolve_alliance_request(ALPHA, other, true);
    }

    let base = game.config().enemy_search_radius;
    let increment = game.config().enemy_search_radius_increment;
    let mut behavior = BotBehavior::new(&game, ALPHA, 0.1, 0.3);
    assert_eq!(behavior.select_enemy(&mut game, &mut rng), None);
    assert_eq!(behavior.enemy_search_radius, base + increment);
    assert_eq!(behavior.select_enemy(&mut game, &mut rng), None);
    assert_eq!(behavior.enemy_search_radius, base + 2 * increment);
}

#[test]
fn embargo_malus_applies_exactly_once_per_episode() {
    let scenario_text = OPEN_FIELD.replace("kind: human\n    spawn: [4, 4]", "kind: fake_human\n    spawn: [4, 4]");
    let scenario = Scenario::from_str(&scenario_text).unwrap();
    let mut game = scenario.build_game();
    // Alpha runs the full fake-human brain; Gamma is inert.
    assert!(game.spawn_player(ALPHA, game.map().tile(4, 4)));
    let mut engine = EngineBuilder::new(EngineSettings {
        scenario_name: scenario.name.clone(),
        snapshot_interval_ticks: 0,
        snapshot_dir: PathBuf::from("snapshots_bot_tests"),
    })
    .with_standard_executions(&game)
    .build();

    game.add_embargo(GAMMA, ALPHA);
    let malus = game.config().embargo_relation_malus;

    let mut relation_events: Vec<i32> = Vec::new();
    for _ in 0..300 {
        let summary = engine.advance(&mut game).unwrap();
        for update in summary.updates {
            if let GameUpdate::RelationChanged { player, toward, score, .. } = update {
                if player == ALPHA && toward == GAMMA {
                    relation_events.push(score);
                }
            }
        }
    }
    assert_eq!(
        relation_events,
        vec![-malus],
        "one penalty for the whole embargo episode"
    );

    // Lifting the embargo restores the score, again exactly once.
    game.stop_embargo(GAMMA, ALPHA);
    for _ in 0..300 {
        let summary = engine.advance(&mut game).unwrap();
        for update in summary.updates {
            if let GameUpdate::RelationChanged { player, toward, score, .. } = update {
                if player == ALPHA && toward == GAMMA {
                    relation_events.push(score);
                }
            }
        }
    }
    assert_eq!(relation_events, vec![-malus, 0]);
}
