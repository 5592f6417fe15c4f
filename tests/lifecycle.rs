//! Engine lifecycle and gameplay scenarios driven through the loop controller

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use glam::{IVec2, Vec2};

use arcade_engine::consts::SIM_DT_MS;
use arcade_engine::engine::{Engine, ManualScheduler, Outcome, pump};
use arcade_engine::games::snake::Direction;
use arcade_engine::games::{
    AlienInvaders, AlienInvadersConfig, BrickBreaker, FlappyBird, Game, Pong, Snake,
};
use arcade_engine::input::Key;
use arcade_engine::renderer::{Framebuffer, Scene};
use arcade_engine::{Cabinet, Catalog, GameKind, HostBridge, InitError, RunState, Scoreboard, Settings};

fn settings() -> Settings {
    Settings {
        seed: Some(42),
        ..Settings::default()
    }
}

fn running<G: Game + Scene>(config: G::Config, bridge: HostBridge) -> (Engine<G>, ManualScheduler) {
    let sched = ManualScheduler::new();
    let (w, h) = G::KIND.surface_size();
    let mut engine = Engine::<G>::new(config, &settings(), Box::new(sched.clone()));
    engine.init(Some(Framebuffer::new(w, h)), bridge).expect("init");
    engine.start();
    (engine, sched)
}

#[test]
fn test_brick_hit_scores_ten_and_flips_ball() {
    let scores = Rc::new(RefCell::new(Vec::new()));
    let seen = scores.clone();
    let bridge = HostBridge::new().on_score(move |board: &Scoreboard| seen.borrow_mut().push(board.score));
    let (mut engine, sched) = running::<BrickBreaker>(Default::default(), bridge);

    let game = engine.game_mut().expect("game");
    assert_eq!(game.bricks.len(), 40);
    let target = game.bricks[0].body.bounds();
    game.ball.pos = Vec2::new(target.center().x, target.bottom() + 11.0);
    game.ball.vel = Vec2::new(0.0, -5.0);

    pump(&mut engine, &sched, 1, 0.0, SIM_DT_MS);

    let game = engine.game().expect("game");
    assert!(!game.bricks[0].body.alive);
    assert_eq!((game.bricks[0].row, game.bricks[0].col), (0, 0));
    assert!(game.ball.vel.y > 0.0);
    assert_eq!(engine.scoreboard().score, 10);
    assert_eq!(scores.borrow().last(), Some(&10));
}

#[test]
fn test_flappy_free_fall_through_engine() {
    let (mut engine, sched) = running::<FlappyBird>(Default::default(), HostBridge::new());
    assert_eq!(engine.game().expect("game").bird.pos.y, 300.0);

    pump(&mut engine, &sched, 10, 0.0, SIM_DT_MS);

    let bird = engine.game().expect("game").bird;
    assert!((bird.pos.y - 327.5).abs() < 1e-3, "bird at {}", bird.pos.y);
    assert_eq!(engine.run_state(), RunState::Running);
    assert_eq!(engine.scoreboard().score, 0);
}

#[test]
fn test_pong_left_exit_scores_for_player_two() {
    let (mut engine, sched) = running::<Pong>(Default::default(), HostBridge::new());
    let game = engine.game_mut().expect("game");
    let paddles = (game.left.pos, game.right.pos);
    game.ball.pos = Vec2::new(3.0, 40.0);
    game.ball.vel = Vec2::new(-5.0, 5.0);

    pump(&mut engine, &sched, 1, 0.0, SIM_DT_MS);

    let board = engine.scoreboard();
    assert_eq!((board.score, board.rival_score), (0, 1));
    let game = engine.game().expect("game");
    assert_eq!(game.ball.pos, Vec2::new(400.0, 200.0));
    assert_eq!(game.ball.vel.abs(), Vec2::splat(5.0));
    assert_eq!((game.left.pos, game.right.pos), paddles);
    assert!(engine.run_state().is_running());
}

#[test]
fn test_cleared_wave_advances_level() {
    let levels = Rc::new(RefCell::new(Vec::new()));
    let seen = levels.clone();
    let config = AlienInvadersConfig {
        enemy_fire_chance: 0.0,
        ..Default::default()
    };
    let (mut engine, sched) =
        running::<AlienInvaders>(config, HostBridge::new().on_level(move |l| seen.borrow_mut().push(l)));
    let before = engine.game().expect("game").speed();
    for alien in &mut engine.game_mut().expect("game").aliens {
        alien.alive = false;
    }

    pump(&mut engine, &sched, 1, 0.0, SIM_DT_MS);

    let game = engine.game().expect("game");
    assert_eq!(game.aliens_alive(), 50);
    assert!((game.speed() - before - 0.5).abs() < 1e-6);
    assert_eq!(engine.scoreboard().level, 2);
    assert_eq!(*levels.borrow(), vec![2]);
}

#[test]
fn test_snake_self_collision_ends_run() {
    let (mut engine, sched) = running::<Snake>(Default::default(), HostBridge::new());
    let game = engine.game_mut().expect("game");
    game.segments = VecDeque::from(vec![
        IVec2::new(5, 5),
        IVec2::new(4, 5),
        IVec2::new(4, 6),
        IVec2::new(5, 6),
        IVec2::new(6, 6),
        IVec2::new(6, 5),
    ]);
    game.direction = Direction::Right;
    game.food = Some(IVec2::new(0, 0));

    // One move every 9 ticks at 150 ms
    pump(&mut engine, &sched, 20, 0.0, SIM_DT_MS);

    assert_eq!(engine.run_state(), RunState::Ended(Outcome::GameOver));
    assert_eq!(engine.scoreboard().score, 0);
    assert_eq!(engine.game().expect("game").head(), IVec2::new(5, 5));
    assert_eq!(sched.pending(), 0);
}

#[test]
fn test_init_failure_leaves_engine_uninitialized() {
    for kind in GameKind::ALL {
        let sched = ManualScheduler::new();
        let mut cabinet = kind.launch(&settings(), Box::new(sched.clone()));
        assert!(matches!(
            cabinet.init(None, HostBridge::new()),
            Err(InitError::MissingSurface)
        ));
        cabinet.start();
        assert_eq!(cabinet.run_state(), RunState::Idle);
        assert_eq!(sched.requested(), 0, "{:?} scheduled without a surface", kind);
    }
}

#[test]
fn test_every_game_runs_from_the_catalog() {
    let catalog = Catalog::standard();
    assert_eq!(catalog.len(), GameKind::ALL.len());
    for entry in catalog.iter() {
        let sched = ManualScheduler::new();
        let mut cabinet = entry.kind.launch(&settings(), Box::new(sched.clone()));
        let (w, h) = entry.kind.surface_size();
        cabinet.init(Some(Framebuffer::new(w, h)), HostBridge::new()).expect("init");
        assert_eq!(cabinet.kind(), entry.kind);

        cabinet.start();
        pump(cabinet.as_mut(), &sched, 120, 0.0, SIM_DT_MS);
        let state = cabinet.run_state();
        assert!(state.is_running() || state.is_ended(), "{}: {:?}", entry.name, state);
        assert!(cabinet.surface().is_some());

        cabinet.stop();
        assert_eq!(cabinet.run_state(), RunState::Idle);
        assert_eq!(sched.pending(), 0);
    }
}

#[test]
fn test_double_start_and_double_stop() {
    let running_log = Rc::new(RefCell::new(Vec::new()));
    let seen = running_log.clone();
    let (mut engine, sched) =
        running::<Pong>(Default::default(), HostBridge::new().on_running(move |r| seen.borrow_mut().push(r)));

    engine.start();
    assert_eq!(sched.pending(), 1);
    pump(&mut engine, &sched, 10, 0.0, SIM_DT_MS);
    assert_eq!(sched.pending(), 1);

    engine.stop();
    let board = *engine.scoreboard();
    engine.stop();
    assert_eq!(engine.run_state(), RunState::Idle);
    assert_eq!(*engine.scoreboard(), board);
    assert_eq!(sched.pending(), 0);
    assert_eq!(*running_log.borrow(), vec![true, false]);
}

#[test]
fn test_space_starts_idle_game_and_enter_restarts_after_game_over() {
    let sched = ManualScheduler::new();
    let mut engine = Engine::<BrickBreaker>::new(Default::default(), &settings(), Box::new(sched.clone()));
    engine.init(Some(Framebuffer::new(800, 600)), HostBridge::new()).expect("init");
    assert_eq!(sched.pending(), 0);

    // Parked: the key asks for one frame
    engine.handle_key_down(Key::Space);
    engine.handle_key_up(Key::Space);
    assert_eq!(sched.pending(), 1);
    pump(&mut engine, &sched, 1, 0.0, SIM_DT_MS);
    assert!(engine.run_state().is_running());

    let mut now = 100.0;
    while !engine.run_state().is_ended() {
        let game = engine.game_mut().expect("game");
        game.paddle.pos.x = 0.0;
        game.ball.pos = Vec2::new(700.0, 590.0);
        game.ball.vel = Vec2::new(0.0, 8.0);
        now = pump(&mut engine, &sched, 1, now, 100.0);
        assert!(now < 10_000.0, "never ran out of lives");
    }
    assert_eq!(engine.scoreboard().lives, Some(0));

    engine.handle_key_down(Key::Enter);
    pump(&mut engine, &sched, 1, now, SIM_DT_MS);
    assert!(engine.run_state().is_running());
    assert_eq!(engine.scoreboard().lives, Some(3));
}

#[test]
fn test_same_seed_replays_identically() {
    let play = || {
        let (mut engine, sched) = running::<Pong>(Default::default(), HostBridge::new());
        pump(&mut engine, &sched, 300, 0.0, SIM_DT_MS);
        let game = engine.game().expect("game");
        (game.ball.pos, *engine.scoreboard())
    };
    assert_eq!(play(), play());
}

#[test]
fn test_reset_game_restores_scoreboard() {
    let (mut engine, sched) = running::<BrickBreaker>(Default::default(), HostBridge::new());
    let game = engine.game_mut().expect("game");
    let target = game.bricks[3].body.bounds();
    game.ball.pos = Vec2::new(target.center().x, target.bottom() + 11.0);
    game.ball.vel = Vec2::new(0.0, -5.0);
    pump(&mut engine, &sched, 1, 0.0, SIM_DT_MS);
    assert_eq!(engine.scoreboard().score, 10);

    engine.reset_game();
    assert_eq!(engine.scoreboard().score, 0);
    assert_eq!(engine.game().expect("game").bricks_left(), 40);
}
