//! Input adapter: raw key and pointer events to intents
//!
//! - **Level-triggered (held):** an intent is held for every tick its key is
//!   physically down. Used for paddle and ship movement.
//!
//! - **Edge-triggered (pressed):** presses are queued in arrival order and
//!   handed out once by `take()`. The loop controller only calls `take()` on a
//!   frame that runs at least one simulation tick, so a press is never lost on
//!   a zero-tick frame.
//!
//! Handlers only record events here. Nothing in this module touches game
//! state.

use std::collections::{HashMap, HashSet};

use glam::Vec2;

/// Physical keys the arcade understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    Enter,
    Escape,
    W,
    A,
    S,
    D,
    P,
    R,
}

impl Key {
    /// Decode a DOM `KeyboardEvent.key` string
    pub fn from_dom(key: &str) -> Option<Key> {
        let key = match key {
            "ArrowLeft" | "Left" => Key::Left,
            "ArrowRight" | "Right" => Key::Right,
            "ArrowUp" | "Up" => Key::Up,
            "ArrowDown" | "Down" => Key::Down,
            " " | "Spacebar" => Key::Space,
            "Enter" => Key::Enter,
            "Escape" | "Esc" => Key::Escape,
            "w" | "W" => Key::W,
            "a" | "A" => Key::A,
            "s" | "S" => Key::S,
            "d" | "D" => Key::D,
            "p" | "P" => Key::P,
            "r" | "R" => Key::R,
            _ => return None,
        };
        Some(key)
    }
}

/// Normalized input signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    /// Second player's up (Pong left paddle)
    AltUp,
    /// Second player's down
    AltDown,
    Jump,
    Shoot,
    Pause,
    Exit,
    Restart,
}

/// Key bindings shared by most games
pub fn default_key_map(key: Key) -> Option<Intent> {
    let intent = match key {
        Key::Left | Key::A => Intent::MoveLeft,
        Key::Right | Key::D => Intent::MoveRight,
        Key::Up | Key::W => Intent::MoveUp,
        Key::Down | Key::S => Intent::MoveDown,
        Key::Space => Intent::Shoot,
        Key::Enter | Key::R => Intent::Restart,
        Key::P => Intent::Pause,
        Key::Escape => Intent::Exit,
    };
    Some(intent)
}

/// Immutable input snapshot consumed by one simulation tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Intents {
    held: HashSet<Intent>,
    pressed: Vec<Intent>,
    pointer: Option<Vec2>,
    taps: Vec<Vec2>,
}

impl Intents {
    pub fn is_held(&self, intent: Intent) -> bool {
        self.held.contains(&intent)
    }

    pub fn was_pressed(&self, intent: Intent) -> bool {
        self.pressed.contains(&intent)
    }

    /// Presses in arrival order
    pub fn pressed(&self) -> &[Intent] {
        &self.pressed
    }

    /// Latest pointer position in surface pixels, if it moved
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    pub fn taps(&self) -> &[Vec2] {
        &self.taps
    }

    /// Horizontal axis from held intents: -1, 0 or 1
    pub fn axis_x(&self) -> f32 {
        self.is_held(Intent::MoveRight) as i32 as f32 - self.is_held(Intent::MoveLeft) as i32 as f32
    }

    /// Vertical axis from held intents: -1 (up), 0 or 1 (down)
    pub fn axis_y(&self) -> f32 {
        self.is_held(Intent::MoveDown) as i32 as f32 - self.is_held(Intent::MoveUp) as i32 as f32
    }

    /// Same snapshot with the one-shot parts removed
    ///
    /// Used for the second and later substeps of a frame so an edge is
    /// applied exactly once.
    pub fn held_only(&self) -> Intents {
        Intents {
            held: self.held.clone(),
            pressed: Vec::new(),
            pointer: None,
            taps: Vec::new(),
        }
    }

    pub fn hold(mut self, intent: Intent) -> Self {
        self.held.insert(intent);
        self
    }

    pub fn press(mut self, intent: Intent) -> Self {
        self.pressed.push(intent);
        self
    }

    pub fn with_pointer(mut self, pos: Vec2) -> Self {
        self.pointer = Some(pos);
        self
    }

    pub fn with_tap(mut self, pos: Vec2) -> Self {
        self.taps.push(pos);
        self
    }
}

/// Collects host events between frames
#[derive(Debug, Default)]
pub struct InputAdapter {
    attached: bool,
    held: HashMap<Key, Intent>,
    pressed: Vec<Intent>,
    pointer: Option<Vec2>,
    taps: Vec<Vec2>,
}

impl InputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Stop listening and forget everything recorded so far
    pub fn detach(&mut self) {
        self.attached = false;
        self.clear();
    }

    pub fn clear(&mut self) {
        self.held.clear();
        self.pressed.clear();
        self.pointer = None;
        self.taps.clear();
    }

    /// Record a key going down; auto-repeat does not queue a second press
    pub fn press(&mut self, key: Key, intent: Intent) {
        if !self.attached {
            return;
        }
        if self.held.insert(key, intent).is_none() {
            self.pressed.push(intent);
        }
    }

    pub fn release(&mut self, key: Key) {
        if !self.attached {
            return;
        }
        self.held.remove(&key);
    }

    pub fn move_pointer(&mut self, pos: Vec2) {
        if self.attached {
            self.pointer = Some(pos);
        }
    }

    pub fn tap(&mut self, pos: Vec2) {
        if self.attached {
            self.taps.push(pos);
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pressed.is_empty() || !self.taps.is_empty() || self.pointer.is_some()
    }

    /// Snapshot for the next tick; drains the one-shot queues
    pub fn take(&mut self) -> Intents {
        Intents {
            held: self.held.values().copied().collect(),
            pressed: std::mem::take(&mut self.pressed),
            pointer: self.pointer.take(),
            taps: std::mem::take(&mut self.taps),
        }
    }
}

/// Minimum re-trigger interval in ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cooldown {
    period: u32,
    remaining: u32,
}

impl Cooldown {
    pub fn new(period: u32) -> Self {
        Self { period, remaining: 0 }
    }

    pub fn ready(&self) -> bool {
        self.remaining == 0
    }

    /// Fire if ready, restarting the interval
    pub fn trigger(&mut self) -> bool {
        if self.ready() {
            self.remaining = self.period;
            true
        } else {
            false
        }
    }

    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.remaining = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attached() -> InputAdapter {
        let mut input = InputAdapter::new();
        input.attach();
        input
    }

    #[test]
    fn test_from_dom() {
        assert_eq!(Key::from_dom("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::from_dom(" "), Some(Key::Space));
        assert_eq!(Key::from_dom("W"), Some(Key::W));
        assert_eq!(Key::from_dom("Shift"), None);
    }

    #[test]
    fn test_press_sets_held_and_pressed() {
        let mut input = attached();
        input.press(Key::Left, Intent::MoveLeft);
        let snap = input.take();
        assert!(snap.is_held(Intent::MoveLeft));
        assert!(snap.was_pressed(Intent::MoveLeft));

        // Held survives the drain, the edge does not
        let snap = input.take();
        assert!(snap.is_held(Intent::MoveLeft));
        assert!(!snap.was_pressed(Intent::MoveLeft));
    }

    #[test]
    fn test_auto_repeat_does_not_double_press() {
        let mut input = attached();
        input.press(Key::Space, Intent::Shoot);
        input.press(Key::Space, Intent::Shoot);
        assert_eq!(input.take().pressed(), &[Intent::Shoot]);
    }

    #[test]
    fn test_presses_keep_arrival_order() {
        let mut input = attached();
        input.press(Key::Up, Intent::MoveUp);
        input.press(Key::Left, Intent::MoveLeft);
        input.press(Key::Space, Intent::Shoot);
        assert_eq!(
            input.take().pressed(),
            &[Intent::MoveUp, Intent::MoveLeft, Intent::Shoot]
        );
    }

    #[test]
    fn test_detached_adapter_ignores_events() {
        let mut input = InputAdapter::new();
        input.press(Key::Left, Intent::MoveLeft);
        input.tap(Vec2::ZERO);
        input.move_pointer(Vec2::ONE);
        assert!(!input.has_pending());
        assert_eq!(input.take(), Intents::default());
    }

    #[test]
    fn test_release_clears_held() {
        let mut input = attached();
        input.press(Key::A, Intent::MoveLeft);
        input.release(Key::A);
        assert!(!input.take().is_held(Intent::MoveLeft));
    }

    #[test]
    fn test_held_only_drops_edges() {
        let snap = Intents::default()
            .hold(Intent::MoveRight)
            .press(Intent::Jump)
            .with_pointer(Vec2::new(4.0, 2.0));
        let rest = snap.held_only();
        assert!(rest.is_held(Intent::MoveRight));
        assert!(rest.pressed().is_empty());
        assert!(rest.pointer().is_none());
        assert_eq!(snap.axis_x(), 1.0);
    }

    #[test]
    fn test_cooldown() {
        let mut cd = Cooldown::new(3);
        assert!(cd.trigger());
        assert!(!cd.trigger());
        cd.tick();
        cd.tick();
        assert!(!cd.ready());
        cd.tick();
        assert!(cd.trigger());
    }
}
