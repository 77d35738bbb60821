//! Input mapping
//!
//! Host event listeners (keyboard, pointer, click) write into a single
//! owned record between frames; the simulation step is its only reader.
//! Held keys become a movement vector, clicks become a rate-limited fire
//! command, and P/Escape latch one-shot session commands.

use glam::{Vec2, Vec3};

use crate::consts::FIRE_COOLDOWN;

/// Bindings the simulation understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Pause,
    Menu,
}

impl Key {
    /// Map a raw key name (browser `KeyboardEvent.key` style) to a binding
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "w" | "W" | "ArrowUp" => Some(Key::Up),
            "s" | "S" | "ArrowDown" => Some(Key::Down),
            "a" | "A" | "ArrowLeft" => Some(Key::Left),
            "d" | "D" | "ArrowRight" => Some(Key::Right),
            "p" | "P" => Some(Key::Pause),
            "Escape" => Some(Key::Menu),
            _ => None,
        }
    }
}

/// Shared input record. Listeners append/overwrite, the step reads.
#[derive(Debug)]
pub struct InputState {
    held: [bool; 4],
    pointer: Vec2,
    last_fire: f64,
    fire_queued: bool,
    pause_queued: bool,
    menu_queued: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: [false; 4],
            pointer: Vec2::ZERO,
            last_fire: f64::NEG_INFINITY,
            fire_queued: false,
            pause_queued: false,
            menu_queued: false,
        }
    }

    fn direction_index(key: Key) -> Option<usize> {
        match key {
            Key::Up => Some(0),
            Key::Down => Some(1),
            Key::Left => Some(2),
            Key::Right => Some(3),
            _ => None,
        }
    }

    /// Key-down listener entry point
    pub fn key_down(&mut self, name: &str) {
        let Some(key) = Key::from_name(name) else {
            return;
        };
        match key {
            Key::Pause => self.pause_queued = true,
            Key::Menu => self.menu_queued = true,
            _ => {
                if let Some(i) = Self::direction_index(key) {
                    self.held[i] = true;
                }
            }
        }
    }

    /// Key-up listener entry point
    pub fn key_up(&mut self, name: &str) {
        if let Some(i) = Key::from_name(name).and_then(Self::direction_index) {
            self.held[i] = false;
        }
    }

    /// Pointer-move listener entry point. Converts a viewport position to
    /// an offset from center, normalized to [-1, 1] with +y up.
    pub fn pointer_moved(&mut self, x: f32, y: f32, viewport_w: f32, viewport_h: f32) {
        if viewport_w <= 0.0 || viewport_h <= 0.0 {
            return;
        }
        let nx = (x / viewport_w) * 2.0 - 1.0;
        let ny = -((y / viewport_h) * 2.0 - 1.0);
        self.pointer = Vec2::new(nx.clamp(-1.0, 1.0), ny.clamp(-1.0, 1.0));
    }

    /// Normalized pointer offset from viewport center
    pub fn pointer_offset(&self) -> Vec2 {
        self.pointer
    }

    /// Click listener entry point: queue a fire request
    pub fn click(&mut self) {
        self.fire_queued = true;
    }

    /// Movement direction from currently-held keys. Each axis contributes
    /// independently, so diagonals are faster; that is the arcade feel.
    pub fn movement(&self) -> Vec3 {
        let mut dir = Vec3::ZERO;
        if self.held[0] {
            dir.y += 1.0;
        }
        if self.held[1] {
            dir.y -= 1.0;
        }
        if self.held[2] {
            dir.x -= 1.0;
        }
        if self.held[3] {
            dir.x += 1.0;
        }
        dir
    }

    /// Consume the queued fire request. Succeeds only when the cooldown
    /// has elapsed since the last successful fire; success arms the
    /// cooldown again. A rate-limited click is dropped, not deferred.
    pub fn take_fire(&mut self, now: f64) -> bool {
        if !self.fire_queued {
            return false;
        }
        self.fire_queued = false;
        if now - self.last_fire >= FIRE_COOLDOWN {
            self.last_fire = now;
            true
        } else {
            false
        }
    }

    /// Consume the pause-toggle latch
    pub fn take_pause(&mut self) -> bool {
        std::mem::take(&mut self.pause_queued)
    }

    /// Consume the return-to-menu latch
    pub fn take_menu(&mut self) -> bool {
        std::mem::take(&mut self.menu_queued)
    }

    /// Drop queued one-shot requests. Called when the session leaves the
    /// playing state so stale clicks do not fire on resume.
    pub fn clear_one_shots(&mut self) {
        self.fire_queued = false;
    }
}
