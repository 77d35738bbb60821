//! Nova Strike - simulation core for an arcade-style 3D space shooter
//!
//! Core modules:
//! - `sim`: the per-frame simulation (entities, collisions, spawning, session state)
//! - `scene`: command surface toward the host renderer
//! - `audio`: tone cues toward the host audio backend
//! - `ui`: partial session-state updates toward the host HUD
//! - `settings`: player preferences
//! - `highscores`: end-of-run leaderboard

pub mod audio;
pub mod highscores;
pub mod scene;
pub mod settings;
pub mod sim;
pub mod ui;

pub use highscores::HighScores;
pub use settings::Settings;

/// Game tuning constants
pub mod consts {
    /// Player movement speed per held direction key (units/second)
    pub const PLAYER_SPEED: f32 = 15.0;
    /// Horizontal playfield half-extent for the player
    pub const PLAYER_BOUNDS_X: f32 = 12.0;
    /// Vertical playfield half-extent for the player
    pub const PLAYER_BOUNDS_Y: f32 = 8.0;
    pub const PLAYER_RADIUS: f32 = 0.6;
    pub const PLAYER_MAX_HEALTH: i32 = 5;

    /// Minimum spacing between successful fire commands (seconds)
    pub const FIRE_COOLDOWN: f64 = 0.150;
    /// Bullet muzzle speed, toward -z (units/second)
    pub const BULLET_SPEED: f32 = 20.0;
    /// Bullets spawn this far in front of the ship
    pub const BULLET_SPAWN_OFFSET: f32 = 1.0;
    pub const BULLET_RADIUS: f32 = 0.2;
    /// Bullets are culled once |z| exceeds this
    pub const BULLET_CULL_Z: f32 = 50.0;

    /// Base enemy spawn interval at level 1 scaling down per level
    pub const ENEMY_SPAWN_BASE_INTERVAL: f32 = 2.0;
    pub const ENEMY_SPAWN_LEVEL_STEP: f32 = 0.1;
    /// Floor on the spawn interval so high levels never spawn every frame
    pub const ENEMY_SPAWN_MIN_INTERVAL: f32 = 0.25;
    pub const ENEMY_SPAWN_HALF_X: f32 = 10.0;
    pub const ENEMY_SPAWN_HALF_Y: f32 = 7.5;
    /// Enemies enter the field at this depth
    pub const ENEMY_SPAWN_Z: f32 = -30.0;
    pub const ENEMY_BASE_SPEED: f32 = 5.0;
    pub const ENEMY_SPEED_VARIANCE: f32 = 3.0;
    pub const ENEMY_HEALTH: i32 = 3;
    pub const ENEMY_RADIUS: f32 = 0.5;
    /// Enemies and power-ups are culled once they pass the camera plane
    pub const FORWARD_CULL_Z: f32 = 20.0;
    /// Per-frame chance an enemy corrects course toward the player
    pub const ENEMY_HOMING_CHANCE: f64 = 0.01;
    pub const ENEMY_HOMING_ACCEL: f32 = 2.0;
    pub const ENEMY_MAX_SPEED: f32 = 8.0;

    /// Chance that an enemy spawn arms a delayed power-up drop
    pub const POWERUP_SCHEDULE_CHANCE: f64 = 0.3;
    /// Chance the armed drop actually happens once the delay elapses
    pub const POWERUP_SPAWN_CHANCE: f64 = 0.1;
    pub const POWERUP_SPAWN_DELAY: f32 = 1.0;
    pub const POWERUP_SPAWN_HALF_X: f32 = 7.5;
    pub const POWERUP_SPAWN_HALF_Y: f32 = 5.0;
    pub const POWERUP_SPAWN_Z: f32 = -20.0;
    pub const POWERUP_SPEED: f32 = 3.0;
    pub const POWERUP_RADIUS: f32 = 0.3;
    /// Shield buff lifetime (wall-clock seconds)
    pub const SHIELD_DURATION: f64 = 10.0;

    /// Score awarded per destroyed enemy
    pub const KILL_SCORE: u64 = 100;
    /// Idle time after a cleared wave before the next one starts
    pub const WAVE_CLEAR_DELAY: f32 = 3.0;
    /// Wave n carries this many enemies plus n
    pub const WAVE_BASE_ENEMIES: i32 = 5;
}
