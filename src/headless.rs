//! Headless runner
//!
//! Plays one game on a `ManualScheduler` with a simple autopilot feeding the
//! same key and pointer events a browser host would, then prints the final
//! scoreboard. Useful for smoke-testing tuning files without a canvas.

use std::collections::{HashMap, VecDeque};
use std::error::Error;

use glam::{IVec2, Vec2};
use log::info;

use arcade_engine::consts::SIM_DT_MS;
use arcade_engine::engine::{Engine, ManualScheduler};
use arcade_engine::games::maze::Cell;
use arcade_engine::games::{
    AlienInvaders, BrickBreaker, CandyCrush, FlappyBird, Game, Maze, MemoryMatch, Pong, SlotMachine, Snake,
};
use arcade_engine::input::Key;
use arcade_engine::renderer::{Framebuffer, Scene};
use arcade_engine::{Cabinet, GameKind, HostBridge, RunState, Settings};

const DEFAULT_FRAMES: u32 = 3_600;

/// One synthetic input event
#[derive(Debug, Clone, Copy)]
enum Control {
    Pointer(Vec2),
    /// Key down followed by key up in the same frame
    Press(Key),
    Hold(Key),
    Release(Key),
    Tap(Vec2),
}

/// Scripted player for one game
trait Autopilot: Game + Scene {
    fn pilot(&self, frame: u32) -> Vec<Control>;
}

impl Autopilot for BrickBreaker {
    fn pilot(&self, _frame: u32) -> Vec<Control> {
        vec![Control::Pointer(Vec2::new(self.ball.pos.x, 0.0))]
    }
}

impl Autopilot for AlienInvaders {
    fn pilot(&self, frame: u32) -> Vec<Control> {
        let player = self.player.center().x;
        let target = self
            .aliens
            .iter()
            .filter(|a| a.alive)
            .map(|a| a.center().x)
            .min_by(|a, b| (a - player).abs().total_cmp(&(b - player).abs()));
        let mut controls = Vec::new();
        if let Some(x) = target {
            controls.push(Control::Pointer(Vec2::new(x, 0.0)));
        }
        if frame % 20 == 0 {
            controls.push(Control::Press(Key::Space));
        }
        controls
    }
}

impl Autopilot for FlappyBird {
    fn pilot(&self, _frame: u32) -> Vec<Control> {
        let bird = self.bird.center();
        let target = self
            .pipes
            .iter()
            .find(|p| p.right() > bird.x)
            .map(|p| {
                let (top, bottom) = p.gap();
                (top + bottom) / 2.0
            })
            .unwrap_or_else(|| self.field().center().y);
        if bird.y > target + 10.0 && self.bird.vel.y >= 0.0 {
            vec![Control::Press(Key::Space)]
        } else {
            Vec::new()
        }
    }
}

impl Autopilot for Pong {
    fn pilot(&self, _frame: u32) -> Vec<Control> {
        let ball = self.ball.pos.y;
        let track = |paddle: Vec2, up: Key, down: Key| {
            if ball < paddle.y - 10.0 {
                [Control::Release(down), Control::Hold(up)]
            } else if ball > paddle.y + 10.0 {
                [Control::Release(up), Control::Hold(down)]
            } else {
                [Control::Release(up), Control::Release(down)]
            }
        };
        let mut controls = Vec::new();
        controls.extend(track(self.left.center(), Key::W, Key::S));
        controls.extend(track(self.right.center(), Key::Up, Key::Down));
        controls
    }
}

impl Autopilot for Snake {
    fn pilot(&self, _frame: u32) -> Vec<Control> {
        let Some(food) = self.food else {
            return Vec::new();
        };
        let head = self.head();
        let n = self.grid_size();
        let free = |c: IVec2| (0..n).contains(&c.x) && (0..n).contains(&c.y) && !self.segments.contains(&c);
        let toward = food - head;
        let mut options = vec![
            (IVec2::new(toward.x.signum(), 0), toward.x != 0),
            (IVec2::new(0, toward.y.signum()), toward.y != 0),
            (IVec2::X, true),
            (IVec2::Y, true),
            (IVec2::NEG_X, true),
            (IVec2::NEG_Y, true),
        ];
        options.retain(|&(d, wanted)| wanted && d != -self.direction.delta() && free(head + d));
        match options.first() {
            Some(&(d, _)) => vec![Control::Press(arrow(d))],
            None => Vec::new(),
        }
    }
}

impl Autopilot for Maze {
    fn pilot(&self, frame: u32) -> Vec<Control> {
        if frame % 6 != 0 {
            return Vec::new();
        }
        // Breadth-first search from the player to the exit
        let mut came_from: HashMap<IVec2, IVec2> = HashMap::new();
        let mut queue = VecDeque::from([self.player]);
        let mut exit = None;
        while let Some(at) = queue.pop_front() {
            if self.cell(at) == Cell::Exit {
                exit = Some(at);
                break;
            }
            for d in [IVec2::X, IVec2::Y, IVec2::NEG_X, IVec2::NEG_Y] {
                let next = at + d;
                if next != self.player && self.cell(next) != Cell::Wall && !came_from.contains_key(&next) {
                    came_from.insert(next, at);
                    queue.push_back(next);
                }
            }
        }
        let Some(mut step) = exit else {
            return Vec::new();
        };
        while let Some(&prev) = came_from.get(&step) {
            if prev == self.player {
                break;
            }
            step = prev;
        }
        vec![Control::Press(arrow(step - self.player))]
    }
}

impl Autopilot for MemoryMatch {
    fn pilot(&self, frame: u32) -> Vec<Control> {
        if frame % 10 != 0 {
            return Vec::new();
        }
        let open: Vec<usize> = (0..self.cards.len())
            .filter(|&i| self.cards[i].face_up && !self.cards[i].matched)
            .collect();
        let target = match open.as_slice() {
            [] => (0..self.cards.len()).find(|&i| !self.cards[i].matched),
            [first] => (0..self.cards.len())
                .find(|&i| i != *first && !self.cards[i].matched && self.cards[i].tint == self.cards[*first].tint),
            _ => None,
        };
        let Some(index) = target else {
            return Vec::new();
        };
        let n = self.grid_size();
        let cell = IVec2::new((index % n) as i32, (index / n) as i32);
        vec![Control::Tap((cell.as_vec2() + 0.5) * self.cell_size())]
    }
}

impl Autopilot for CandyCrush {
    fn pilot(&self, frame: u32) -> Vec<Control> {
        if frame % 25 != 0 {
            return Vec::new();
        }
        let n = self.grid_size() as u32;
        let turn = frame / 25;
        let at = IVec2::new((turn % (n - 1)) as i32, ((turn / (n - 1)) % n) as i32);
        let cell = self.cell_size();
        vec![
            Control::Tap((at.as_vec2() + 0.5) * cell),
            Control::Tap((at.as_vec2() + Vec2::new(1.5, 0.5)) * cell),
        ]
    }
}

impl Autopilot for SlotMachine {
    fn pilot(&self, frame: u32) -> Vec<Control> {
        if !self.is_spinning() && frame % 30 == 0 {
            vec![Control::Press(Key::Space)]
        } else {
            Vec::new()
        }
    }
}

fn arrow(delta: IVec2) -> Key {
    match (delta.x, delta.y) {
        (1, _) => Key::Right,
        (-1, _) => Key::Left,
        (_, -1) => Key::Up,
        _ => Key::Down,
    }
}

fn apply(cabinet: &mut dyn Cabinet, controls: Vec<Control>) {
    for control in controls {
        match control {
            Control::Pointer(pos) => cabinet.move_pointer(pos),
            Control::Press(key) => {
                cabinet.handle_key_down(key);
                cabinet.handle_key_up(key);
            }
            Control::Hold(key) => cabinet.handle_key_down(key),
            Control::Release(key) => cabinet.handle_key_up(key),
            Control::Tap(pos) => cabinet.tap(pos),
        }
    }
}

/// Command line: `[game] [frames] [--config path]`
struct Options {
    kind: GameKind,
    frames: u32,
    config: Option<String>,
}

impl Options {
    fn parse(args: Vec<String>) -> Result<Self, Box<dyn Error>> {
        let mut options = Options {
            kind: GameKind::BrickBreaker,
            frames: DEFAULT_FRAMES,
            config: None,
        };
        let mut positional = 0;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if arg == "--config" {
                options.config = Some(args.next().ok_or("--config needs a path")?);
                continue;
            }
            match positional {
                0 => options.kind = GameKind::from_slug(&arg).ok_or_else(|| format!("unknown game '{arg}'"))?,
                1 => options.frames = arg.parse().map_err(|_| format!("bad frame count '{arg}'"))?,
                _ => return Err(format!("unexpected argument '{arg}'").into()),
            }
            positional += 1;
        }
        Ok(options)
    }
}

pub fn run(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let options = Options::parse(args)?;
    let settings = match &options.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::default(),
    };
    info!("{} at {} quality", options.kind.name(), settings.quality.as_str());
    let games = &settings.games;
    match options.kind {
        GameKind::BrickBreaker => play::<BrickBreaker>(games.brick_breaker.clone(), &settings, options.frames),
        GameKind::AlienInvaders => play::<AlienInvaders>(games.alien_invaders.clone(), &settings, options.frames),
        GameKind::FlappyBird => play::<FlappyBird>(games.flappy_bird.clone(), &settings, options.frames),
        GameKind::Pong => play::<Pong>(games.pong.clone(), &settings, options.frames),
        GameKind::Snake => play::<Snake>(games.snake.clone(), &settings, options.frames),
        GameKind::Maze => play::<Maze>(games.maze.clone(), &settings, options.frames),
        GameKind::MemoryMatch => play::<MemoryMatch>(games.memory_match.clone(), &settings, options.frames),
        GameKind::CandyCrush => play::<CandyCrush>(games.candy_crush.clone(), &settings, options.frames),
        GameKind::SlotMachine => play::<SlotMachine>(games.slot_machine.clone(), &settings, options.frames),
    }
}

fn play<G: Autopilot>(config: G::Config, settings: &Settings, frames: u32) -> Result<(), Box<dyn Error>> {
    let scheduler = ManualScheduler::new();
    let mut engine = Engine::<G>::new(config, settings, Box::new(scheduler.clone()));
    let (width, height) = G::KIND.surface_size();
    let bridge = HostBridge::new()
        .on_lives(|lives| info!("lives: {lives}"))
        .on_level(|level| info!("level: {level}"))
        .on_running(|running| log::debug!("running: {running}"));
    engine.init(Some(Framebuffer::new(width, height)), bridge)?;
    engine.start();

    let mut now = 0.0;
    let mut played = 0;
    for frame in 0..frames {
        let controls = engine.game().map(|g| g.pilot(frame)).unwrap_or_default();
        apply(&mut engine, controls);
        let Some(handle) = scheduler.next_frame() else {
            break;
        };
        now += SIM_DT_MS;
        engine.on_frame(handle, now);
        played += 1;
        if engine.run_state().is_ended() {
            break;
        }
    }

    let board = engine.scoreboard();
    let state = match engine.run_state() {
        RunState::Ended(outcome) => format!("{outcome:?}"),
        other => format!("{other:?}"),
    };
    println!("{} after {} frames: {}", G::KIND.name(), played, state);
    println!("  score: {}", board.score);
    if G::KIND == GameKind::Pong {
        println!("  rival: {}", board.rival_score);
    }
    if let Some(lives) = board.lives {
        println!("  lives: {lives}");
    }
    println!("  level: {}", board.level);
    engine.stop();
    Ok(())
}
