//! Match-flow and combat scenarios run against the public API.

use aura_clash::combat::{resolve_melee_hit, FrameFx, HitBox};
use aura_clash::fighter::MAX_HP;
use aura_clash::{
    Action, Camera, CharacterId, Control, Difficulty, Fighter, Game, MatchPhase, SheetCache, Team,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn test_game(seed: u64) -> Game {
    Game::with_seed("missing-assets", seed)
}

#[test]
fn timeout_is_decided_by_summed_team_health() {
    let mut game = test_game(1);
    game.start_match();
    assert_eq!(game.fighters.len(), 4);

    // Left sums 140, right sums 90.
    game.fighters[0].hp = 70.0;
    game.fighters[1].hp = 70.0;
    game.fighters[2].hp = 45.0;
    game.fighters[3].hp = 45.0;
    game.round_time = 0.001;
    game.frame(1.0 / 60.0);

    assert_eq!(game.phase, MatchPhase::Over);
    assert!(!game.round_active);
    assert_eq!(game.announcer, "Left Team Wins!");
    for f in &game.fighters {
        let expected = if f.team == Team::Left {
            Action::Victory
        } else {
            Action::Death
        };
        assert_eq!(f.current_action, expected);
    }
}

#[test]
fn timeout_tie_goes_to_the_left_team() {
    let mut game = test_game(2);
    game.start_match();
    for f in &mut game.fighters {
        f.hp = 60.0;
    }
    game.round_time = 0.001;
    game.frame(1.0 / 60.0);

    assert_eq!(game.phase, MatchPhase::Over);
    assert_eq!(game.announcer, "Left Team Wins!");
}

#[test]
fn wiping_a_team_ends_the_round_immediately() {
    let mut game = test_game(3);
    game.start_match();
    // Right team still has plenty of summed health, but no living members.
    game.fighters[2].hp = 0.0;
    game.fighters[3].hp = 0.0;
    game.frame(1.0 / 60.0);

    assert_eq!(game.phase, MatchPhase::Over);
    assert_eq!(game.announcer, "Left Team Wins!");
    assert!(game.round_time > 0.0);
}

#[test]
fn round_timer_only_runs_while_playing() {
    let mut game = test_game(4);
    let before = game.round_time;
    game.frame(1.0 / 60.0);
    assert_eq!(game.round_time, before);

    game.start_match();
    game.frame(1.0 / 60.0);
    assert!(game.round_time < before);
}

/// Identical seed and call order, only the difficulty multiplier changes:
/// easy must land exactly 0.6x and hard exactly 1.2x of a normal hit.
#[test]
fn difficulty_scales_identical_hits() {
    fn landed_damage(difficulty: Difficulty) -> f32 {
        let mut sheets = SheetCache::new("missing", std::path::Path::new("missing.json"));
        let mut fighters = vec![
            Fighter::new(
                CharacterId::Kiba.def(),
                400.0,
                Team::Left,
                Control::Cpu,
                &mut sheets,
            ),
            Fighter::new(
                CharacterId::Rai.def(),
                470.0,
                Team::Right,
                Control::Cpu,
                &mut sheets,
            ),
        ];
        let mut rng = StdRng::seed_from_u64(99);
        let mut camera = Camera::new();
        let mut effects = Vec::new();
        let mut announcer = String::new();
        let mut fx = FrameFx {
            camera: &mut camera,
            effects: &mut effects,
            announcer: &mut announcer,
            sheets: &mut sheets,
        };
        let hitbox = HitBox {
            x: 470.0,
            y: 540.0,
            w: 90.0,
            h: 80.0,
        };
        resolve_melee_hit(
            &mut fighters,
            0,
            hitbox,
            difficulty.damage_multiplier(),
            &mut fx,
            &mut rng,
        );
        MAX_HP - fighters[1].hp
    }

    let easy = landed_damage(Difficulty::Easy);
    let normal = landed_damage(Difficulty::Normal);
    let hard = landed_damage(Difficulty::Hard);
    assert!(normal > 0.0);
    assert!((easy / normal - 0.6).abs() < 1e-5);
    assert!((hard / normal - 1.2).abs() < 1e-5);
}

/// Health stays in range for every fighter on every frame, and any fighter
/// at zero health mid-round is in the death pose while the body falls.
#[test]
fn health_invariants_hold_over_a_full_match() {
    let mut game = test_game(5);
    game.config.set_difficulty("hard");
    game.start_match();

    for _ in 0..2000 {
        game.frame(1.0 / 60.0);
        for f in &game.fighters {
            assert!(f.hp >= 0.0 && f.hp <= f.max_hp);
            if game.phase == MatchPhase::Playing && !f.alive() {
                assert_eq!(f.current_action, Action::Death);
            }
        }
        if game.phase != MatchPhase::Playing {
            break;
        }
    }
}

#[test]
fn dummy_enemy_holds_still() {
    let mut game = test_game(6);
    game.config.set_mode("1v1");
    game.config.dummy_enemy = true;
    game.start_match();

    let x = game.fighters[1].x;
    for _ in 0..120 {
        game.frame(1.0 / 60.0);
    }
    assert_eq!(game.fighters[1].x, x);
    assert!(!game.fighters[1].blocking);
}

#[test]
fn human_input_drives_the_player() {
    let mut game = test_game(7);
    game.config.set_mode("1v1");
    game.config.dummy_enemy = true;
    game.start_match();

    let x = game.fighters[0].x;
    game.input.press("d");
    for _ in 0..10 {
        game.frame(1.0 / 60.0);
    }
    assert!(game.fighters[0].x > x);

    game.input.release("d");
    game.input.press("g");
    game.frame(1.0 / 60.0);
    assert!(game.fighters[0].blocking);
}

#[test]
fn held_attack_lands_hits_through_cooldowns() {
    let mut game = test_game(8);
    game.config.set_mode("1v1");
    game.config.dummy_enemy = true;
    game.start_match();

    // Walk the dummy into range of the player, then hold attack.
    game.fighters[1].x = game.fighters[0].x + 80.0;
    game.input.press("f");
    let mut frames = 0;
    while game.fighters[1].hp == MAX_HP && frames < 10 {
        game.input.press("f");
        game.frame(1.0 / 60.0);
        frames += 1;
    }
    assert!(game.fighters[1].hp < MAX_HP);
}

#[test]
fn special_cast_spawns_projectiles_and_arms_cooldown() {
    let mut game = test_game(9);
    game.config.set_mode("1v1");
    game.config.dummy_enemy = true;
    game.start_match();

    // Default P1 is the triple-fan character.
    game.input.press("t");
    game.frame(1.0 / 60.0);
    assert_eq!(game.projectiles.len(), 3);
    assert!(game.fighters[0].sp_cooldown > 0.0);

    // Cooldown gates a second cast.
    game.input.press("t");
    game.frame(1.0 / 60.0);
    assert_eq!(game.projectiles.len(), 3);
}
