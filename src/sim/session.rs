//! Session state and the run-status machine
//!
//! One authoritative record of the run: status, score, health, wave and
//! the active buffs. Both writers (the frame step and the UI command
//! handlers) go through `apply`, which records what actually changed so
//! the HUD gets a minimal partial update after the frame.

use serde::{Deserialize, Serialize};

use crate::consts::{PLAYER_MAX_HEALTH, WAVE_BASE_ENEMIES};

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Title screen, nothing simulating
    Menu,
    /// Frame loop live
    Playing,
    /// Frame loop suspended, run preserved
    Paused,
    /// Run ended
    GameOver,
}

/// Buff kinds a power-up can grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    Shield,
}

/// A timed buff on the player.
///
/// Expiry compares wall-clock time against the activation stamp rather
/// than counting frames, so buffs keep draining across pauses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUpEffect {
    pub id: u32,
    pub kind: EffectKind,
    /// Lifetime in seconds
    pub duration: f64,
    pub active: bool,
    /// Host clock (seconds) at pickup
    pub activated_at: f64,
}

impl PowerUpEffect {
    pub fn expired(&self, now: f64) -> bool {
        now - self.activated_at >= self.duration
    }
}

/// Partial session update: fields present are exactly those that changed.
///
/// The same shape serves both directions: writers submit one to `apply`,
/// and the session hands an accumulated one to the HUD after the frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RunStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wave: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effects: Option<Vec<PowerUpEffect>>,
}

impl SessionDelta {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The authoritative run-level record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub status: RunStatus,
    pub score: u64,
    /// Monotonically non-decreasing within a run
    pub level: u32,
    pub health: i32,
    pub max_health: i32,
    pub wave: u32,
    /// May legitimately go below zero, meaning the wave is cleared
    pub enemies_remaining: i32,
    pub effects: Vec<PowerUpEffect>,
    /// Changes since the last publish
    #[serde(skip)]
    pending: SessionDelta,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            status: RunStatus::Menu,
            score: 0,
            level: 1,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            wave: 1,
            enemies_remaining: WAVE_BASE_ENEMIES + 1,
            effects: Vec::new(),
            pending: SessionDelta::default(),
        }
    }

    /// The single mutation entry point. Applies each present field,
    /// clamping where the invariants demand it, and records real changes
    /// for the next publish.
    pub fn apply(&mut self, update: SessionDelta) {
        if let Some(status) = update.status {
            if status != self.status {
                self.status = status;
                self.pending.status = Some(status);
            }
        }
        if let Some(score) = update.score {
            if score != self.score {
                self.score = score;
                self.pending.score = Some(score);
            }
        }
        if let Some(level) = update.level {
            // Levels never go backwards within a run
            let level = level.max(self.level);
            if level != self.level {
                self.level = level;
                self.pending.level = Some(level);
            }
        }
        if let Some(wave) = update.wave {
            if wave != self.wave {
                self.wave = wave;
                self.pending.wave = Some(wave);
            }
        }
        if let Some(health) = update.health {
            let health = health.clamp(0, self.max_health);
            if health != self.health {
                self.health = health;
                self.pending.health = Some(health);
            }
        }
        if let Some(effects) = update.effects {
            if effects != self.effects {
                self.effects = effects.clone();
                self.pending.effects = Some(effects);
            }
        }
    }

    /// Direct counter update; not part of the HUD contract
    pub fn set_enemies_remaining(&mut self, remaining: i32) {
        self.enemies_remaining = remaining;
    }

    /// Reset the bookkeeping for a fresh run and stage the full snapshot
    /// for the HUD. Status is untouched; the caller transitions it.
    /// The only place the within-run level monotonicity does not hold.
    pub fn reset_run(&mut self) {
        self.score = 0;
        self.level = 1;
        self.health = self.max_health;
        self.wave = 1;
        self.enemies_remaining = WAVE_BASE_ENEMIES + 1;
        self.effects.clear();
        self.pending = SessionDelta {
            status: self.pending.status,
            score: Some(0),
            health: Some(self.health),
            wave: Some(1),
            level: Some(1),
            effects: Some(Vec::new()),
        };
    }

    /// Take the accumulated changes, if any, leaving the slate clean
    pub fn take_delta(&mut self) -> Option<SessionDelta> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }

    /// Drop expired buffs. Returns true if anything was pruned.
    pub fn prune_effects(&mut self, now: f64) -> bool {
        if self.effects.iter().any(|e| e.expired(now)) {
            let kept: Vec<PowerUpEffect> = self
                .effects
                .iter()
                .filter(|e| !e.expired(now))
                .cloned()
                .collect();
            self.apply(SessionDelta {
                effects: Some(kept),
                ..Default::default()
            });
            true
        } else {
            false
        }
    }
}
