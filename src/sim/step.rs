//! The per-frame simulation step
//!
//! The host render loop calls [`Simulation::step`] once per frame with the
//! elapsed time and its wall clock. While the session is playing, one call
//! moves the player, advances and culls every entity, resolves collisions,
//! runs the spawner, and evaluates wave progression. Outside of playing
//! the step only services session commands and flushes HUD updates.
//!
//! Two clocks are deliberately kept apart: spawn and wave timers accumulate
//! frame deltas (frozen while paused), while fire rate limiting and buff
//! expiry compare wall-clock stamps (they keep draining across a pause).

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::audio::{AudioDirector, Cue};
use crate::consts::*;
use crate::highscores::HighScores;
use crate::scene::SceneSink;
use crate::ui::StatusSink;

use super::collision::{intersects, spheres_intersect};
use super::entity::{Entity, EntityCategory, EntityStore};
use super::input::InputState;
use super::pool::VisualPools;
use super::session::{EffectKind, PowerUpEffect, RunStatus, SessionDelta, SessionState};
use super::spawner::Spawner;

/// Collaborator handles the step needs for one frame
pub struct FrameIo<'a> {
    pub scene: &'a mut dyn SceneSink,
    pub audio: &'a mut AudioDirector,
    pub ui: &'a mut dyn StatusSink,
}

/// The whole simulation: entity stores, pools, spawner, session state and
/// the per-run timers.
#[derive(Debug)]
pub struct Simulation {
    pub entities: EntityStore,
    pub session: SessionState,
    pub high_scores: HighScores,
    pools: Option<VisualPools>,
    spawner: Spawner,
    /// Accumulates only while the field is clear and the quota is spent
    wave_timer: f32,
    next_effect_id: u32,
    rng: Pcg32,
}

impl Simulation {
    pub fn new(seed: u64) -> Self {
        Self {
            entities: EntityStore::new(),
            session: SessionState::new(),
            high_scores: HighScores::new(),
            pools: None,
            spawner: Spawner::new(seed),
            wave_timer: 0.0,
            next_effect_id: 0,
            // Decorrelate the course-correction rolls from the spawner
            rng: Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
        }
    }

    /// Hand the simulation its visual pools. Until this happens the frame
    /// step is a no-op.
    pub fn install_pools(&mut self, pools: VisualPools) {
        self.pools = Some(pools);
    }

    pub fn pools(&self) -> Option<&VisualPools> {
        self.pools.as_ref()
    }

    /// Create the player ship at the origin with a fresh visual
    pub fn spawn_player(&mut self, scene: &mut dyn SceneSink) {
        let handle = scene.create_visual(EntityCategory::Player);
        let id = self.entities.next_entity_id();
        let player = Entity::new(id, EntityCategory::Player, Vec3::ZERO, PLAYER_RADIUS)
            .with_health(PLAYER_MAX_HEALTH)
            .with_visual(handle);
        scene.attach_visual(handle, Vec3::ZERO);
        self.entities.insert(player);
    }

    /// Begin a run from the menu or from the game-over screen
    pub fn start(&mut self, scene: &mut dyn SceneSink) {
        if !matches!(self.session.status, RunStatus::Menu | RunStatus::GameOver) {
            return;
        }
        self.begin_run(scene);
    }

    /// Restart after a game over
    pub fn restart(&mut self, scene: &mut dyn SceneSink) {
        if self.session.status != RunStatus::GameOver {
            return;
        }
        self.begin_run(scene);
    }

    /// Flip between playing and paused; no-op in any other status
    pub fn toggle_pause(&mut self) {
        let next = match self.session.status {
            RunStatus::Playing => RunStatus::Paused,
            RunStatus::Paused => RunStatus::Playing,
            _ => return,
        };
        self.session.apply(SessionDelta {
            status: Some(next),
            ..Default::default()
        });
        log::info!("session {:?}", next);
    }

    /// Abandon the current run and return to the title screen
    pub fn return_to_menu(&mut self, scene: &mut dyn SceneSink) {
        if self.session.status == RunStatus::Menu {
            return;
        }
        self.despawn_all(scene);
        self.session.apply(SessionDelta {
            status: Some(RunStatus::Menu),
            ..Default::default()
        });
        log::info!("returned to menu");
    }

    fn begin_run(&mut self, scene: &mut dyn SceneSink) {
        self.despawn_all(scene);
        self.session.reset_run();
        self.session.apply(SessionDelta {
            status: Some(RunStatus::Playing),
            ..Default::default()
        });
        self.spawner.reset();
        self.wave_timer = 0.0;
        self.spawn_player(scene);
        log::info!("run started");
    }

    /// Tear down every entity, detaching visuals and refilling the pools
    fn despawn_all(&mut self, scene: &mut dyn SceneSink) {
        let pools = &mut self.pools;
        self.entities.clear(|entity| {
            if let Some(handle) = entity.visual {
                scene.detach_visual(handle);
                if let Some(pools) = pools.as_mut() {
                    match entity.category {
                        EntityCategory::Bullet => pools.bullets.release(handle),
                        EntityCategory::Enemy => pools.enemies.release(handle),
                        _ => {}
                    }
                }
            }
        });
    }

    /// Advance the simulation by one frame.
    ///
    /// `dt` is the elapsed frame time in seconds, `now` the host wall
    /// clock in seconds. Session commands latched by the input listeners
    /// are serviced in any status; the gameplay frame runs only while
    /// playing.
    pub fn step(&mut self, input: &mut InputState, io: &mut FrameIo<'_>, dt: f32, now: f64) {
        if input.take_pause() {
            self.toggle_pause();
        }
        if input.take_menu() {
            self.return_to_menu(io.scene);
        }

        if self.session.status == RunStatus::Playing {
            self.run_frame(input, io, dt, now);
        } else {
            input.clear_one_shots();
        }

        // Buffs drain on the wall clock regardless of status
        self.session.prune_effects(now);

        if let Some(delta) = self.session.take_delta() {
            io.ui.session_update(&delta);
        }
    }

    fn run_frame(&mut self, input: &mut InputState, io: &mut FrameIo<'_>, dt: f32, now: f64) {
        // The host wires pools and the player up asynchronously; until
        // both exist the frame is a no-op rather than an error.
        let Some(pools) = self.pools.as_mut() else {
            return;
        };
        let Some(player) = self.entities.player.as_mut() else {
            return;
        };

        // 1. Player movement, clamped to the playfield. z stays pinned.
        player.pos += input.movement() * PLAYER_SPEED * dt;
        player.pos.x = player.pos.x.clamp(-PLAYER_BOUNDS_X, PLAYER_BOUNDS_X);
        player.pos.y = player.pos.y.clamp(-PLAYER_BOUNDS_Y, PLAYER_BOUNDS_Y);
        player.pos.z = 0.0;
        let player_pos = player.pos;
        let player_radius = player.radius;

        // Fire command, rate limited inside the input record
        if input.take_fire(now) {
            let handle = pools
                .bullets
                .acquire_with(|| io.scene.create_visual(EntityCategory::Bullet));
            let pos = player_pos + Vec3::new(0.0, 0.0, -BULLET_SPAWN_OFFSET);
            let id = self.entities.next_entity_id();
            let bullet = Entity::new(id, EntityCategory::Bullet, pos, BULLET_RADIUS)
                .with_velocity(Vec3::new(0.0, 0.0, -BULLET_SPEED))
                .with_visual(handle);
            io.scene.attach_visual(handle, pos);
            self.entities.insert(bullet);
            io.audio.play(Cue::Fire);
        }

        // 2. Advance everything and cull what left the field
        for bullet in &mut self.entities.bullets {
            bullet.pos += bullet.vel * dt;
            if bullet.pos.z.abs() > BULLET_CULL_Z {
                bullet.active = false;
            }
        }
        for enemy in &mut self.entities.enemies {
            enemy.pos += enemy.vel * dt;
            if enemy.pos.z > FORWARD_CULL_Z {
                enemy.active = false;
            }
        }
        for power_up in &mut self.entities.power_ups {
            power_up.pos += power_up.vel * dt;
            if power_up.pos.z > FORWARD_CULL_Z {
                power_up.active = false;
            }
        }
        self.entities.drain_inactive(EntityCategory::Bullet, |e| {
            if let Some(h) = e.visual {
                io.scene.detach_visual(h);
                pools.bullets.release(h);
            }
        });
        self.entities.drain_inactive(EntityCategory::Enemy, |e| {
            if let Some(h) = e.visual {
                io.scene.detach_visual(h);
                pools.enemies.release(h);
            }
        });
        self.entities.drain_inactive(EntityCategory::PowerUp, |e| {
            if let Some(h) = e.visual {
                io.scene.detach_visual(h);
            }
        });

        // 3. Enemy micro-AI: occasional course correction toward the player
        for enemy in &mut self.entities.enemies {
            if self.rng.random_bool(ENEMY_HOMING_CHANCE) {
                let toward = (player_pos - enemy.pos).normalize_or_zero();
                enemy.vel =
                    (enemy.vel + toward * ENEMY_HOMING_ACCEL).clamp_length_max(ENEMY_MAX_SPEED);
            }
        }

        // 4. Bullet vs enemy
        let mut score_gain = 0u64;
        let mut kills = 0i32;
        for bi in 0..self.entities.bullets.len() {
            if !self.entities.bullets[bi].active {
                continue;
            }
            for ei in 0..self.entities.enemies.len() {
                if !self.entities.enemies[ei].active {
                    continue;
                }
                if !intersects(&self.entities.bullets[bi], &self.entities.enemies[ei]) {
                    continue;
                }

                let enemy_pos = self.entities.enemies[ei].pos;
                self.entities.bullets[bi].active = false;
                io.scene.spawn_explosion(enemy_pos);
                io.audio.play(Cue::Impact);

                let enemy = &mut self.entities.enemies[ei];
                enemy.damage(1);
                if !enemy.is_alive() {
                    enemy.active = false;
                    score_gain += KILL_SCORE;
                    kills += 1;
                    io.audio.play(Cue::EnemyDown);
                }
                break; // bullet is spent
            }
        }
        if kills > 0 {
            self.session.apply(SessionDelta {
                score: Some(self.session.score + score_gain),
                ..Default::default()
            });
            self.session
                .set_enemies_remaining(self.session.enemies_remaining - kills);
        }

        // 5. Enemy vs player
        for ei in 0..self.entities.enemies.len() {
            let enemy = &self.entities.enemies[ei];
            if !enemy.active
                || !spheres_intersect(player_pos, player_radius, enemy.pos, enemy.radius)
            {
                continue;
            }
            let enemy_pos = enemy.pos;
            self.entities.enemies[ei].active = false;
            io.scene.spawn_explosion(enemy_pos);
            io.audio.play(Cue::PlayerHit);

            // The fatal-hit check reads the health from before this hit
            // lands; a run ends on the collision that takes it to zero.
            let pre_hit_health = self.session.health;
            self.session.apply(SessionDelta {
                health: Some(pre_hit_health - 1),
                ..Default::default()
            });
            if pre_hit_health <= 1 {
                self.session.apply(SessionDelta {
                    status: Some(RunStatus::GameOver),
                    ..Default::default()
                });
                io.audio.play(Cue::GameOver);
                let rank =
                    self.high_scores
                        .add_score(self.session.score, self.session.wave, now);
                log::info!(
                    "game over: score {} on wave {} (rank {:?})",
                    self.session.score,
                    self.session.wave,
                    rank
                );
                break;
            }
        }

        // 6. Power-up vs player
        for pi in 0..self.entities.power_ups.len() {
            let power_up = &self.entities.power_ups[pi];
            if !power_up.active
                || !spheres_intersect(player_pos, player_radius, power_up.pos, power_up.radius)
            {
                continue;
            }
            self.entities.power_ups[pi].active = false;

            self.next_effect_id += 1;
            let mut effects = self.session.effects.clone();
            effects.push(PowerUpEffect {
                id: self.next_effect_id,
                kind: EffectKind::Shield,
                duration: SHIELD_DURATION,
                active: true,
                activated_at: now,
            });
            self.session.apply(SessionDelta {
                effects: Some(effects),
                health: Some(self.session.health + 1),
                ..Default::default()
            });
            io.audio.play(Cue::Pickup);
        }

        // Collision casualties leave the store this frame
        self.entities.drain_inactive(EntityCategory::Bullet, |e| {
            if let Some(h) = e.visual {
                io.scene.detach_visual(h);
                pools.bullets.release(h);
            }
        });
        self.entities.drain_inactive(EntityCategory::Enemy, |e| {
            if let Some(h) = e.visual {
                io.scene.detach_visual(h);
                pools.enemies.release(h);
            }
        });
        self.entities.drain_inactive(EntityCategory::PowerUp, |e| {
            if let Some(h) = e.visual {
                io.scene.detach_visual(h);
            }
        });

        // 7. Spawner cadence
        let quota_open = self.session.enemies_remaining > 0;
        let (enemy_spawn, powerup_spawn) = self.spawner.update(dt, self.session.level, quota_open);
        if let Some(spawn) = enemy_spawn {
            let handle = pools
                .enemies
                .acquire_with(|| io.scene.create_visual(EntityCategory::Enemy));
            let id = self.entities.next_entity_id();
            let enemy = Entity::new(id, EntityCategory::Enemy, spawn.pos, ENEMY_RADIUS)
                .with_health(ENEMY_HEALTH)
                .with_velocity(spawn.vel)
                .with_visual(handle);
            io.scene.attach_visual(handle, spawn.pos);
            self.entities.insert(enemy);
            log::debug!("enemy spawned at {:?}", spawn.pos);
        }
        if let Some(spawn) = powerup_spawn {
            // Power-ups skip the pools; their visuals are built fresh
            let handle = io.scene.create_visual(EntityCategory::PowerUp);
            let id = self.entities.next_entity_id();
            let power_up = Entity::new(id, EntityCategory::PowerUp, spawn.pos, POWERUP_RADIUS)
                .with_velocity(spawn.vel)
                .with_visual(handle);
            io.scene.attach_visual(handle, spawn.pos);
            self.entities.insert(power_up);
            log::debug!("power-up spawned at {:?}", spawn.pos);
        }

        // 8. Wave progression: the field must stay clear for the delay
        if self.entities.active_enemy_count() == 0 && self.session.enemies_remaining <= 0 {
            self.wave_timer += dt;
            if self.wave_timer > WAVE_CLEAR_DELAY {
                let cleared_wave = self.session.wave;
                self.session.apply(SessionDelta {
                    wave: Some(cleared_wave + 1),
                    level: Some(self.session.level + 1),
                    ..Default::default()
                });
                self.session
                    .set_enemies_remaining(WAVE_BASE_ENEMIES + cleared_wave as i32);
                self.wave_timer = 0.0;
                log::info!(
                    "wave {} cleared, wave {} brings {} enemies",
                    cleared_wave,
                    self.session.wave,
                    self.session.enemies_remaining
                );
            }
        } else {
            self.wave_timer = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioUnavailable, NullTone, ToneSink, Waveform};
    use crate::scene::NullScene;
    use crate::settings::Settings;
    use crate::ui::NullStatus;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingStatus {
        deltas: Vec<SessionDelta>,
    }

    impl RecordingStatus {
        fn new() -> Self {
            Self { deltas: Vec::new() }
        }
    }

    impl StatusSink for RecordingStatus {
        fn session_update(&mut self, delta: &SessionDelta) {
            self.deltas.push(delta.clone());
        }
    }

    struct RecordingTone(Rc<RefCell<Vec<(f32, f32, Waveform)>>>);

    impl ToneSink for RecordingTone {
        fn play_tone(
            &mut self,
            frequency_hz: f32,
            duration_secs: f32,
            waveform: Waveform,
        ) -> Result<(), AudioUnavailable> {
            self.0.borrow_mut().push((frequency_hz, duration_secs, waveform));
            Ok(())
        }
    }

    fn null_audio() -> AudioDirector {
        AudioDirector::new(Box::new(NullTone), Settings::default())
    }

    /// A simulation mid-run, with pools installed and the player spawned
    fn ready_sim(seed: u64) -> Simulation {
        let mut sim = Simulation::new(seed);
        sim.install_pools(VisualPools::new());
        let mut scene = NullScene::default();
        sim.start(&mut scene);
        sim
    }

    fn step_once(sim: &mut Simulation, input: &mut InputState, dt: f32, now: f64) {
        let mut scene = NullScene::default();
        let mut audio = null_audio();
        let mut ui = NullStatus;
        let mut io = FrameIo {
            scene: &mut scene,
            audio: &mut audio,
            ui: &mut ui,
        };
        sim.step(input, &mut io, dt, now);
    }

    fn place_enemy(sim: &mut Simulation, pos: Vec3, health: i32) -> u32 {
        let id = sim.entities.next_entity_id();
        sim.entities.insert(
            Entity::new(id, EntityCategory::Enemy, pos, ENEMY_RADIUS).with_health(health),
        );
        id
    }

    #[test]
    fn test_step_noop_without_pools() {
        let mut sim = Simulation::new(1);
        let mut scene = NullScene::default();
        sim.start(&mut scene); // spawns a player, but no pools installed
        let mut input = InputState::new();
        input.key_down("d");

        step_once(&mut sim, &mut input, 1.0, 0.0);
        assert_eq!(sim.entities.player.as_ref().unwrap().pos, Vec3::ZERO);
    }

    #[test]
    fn test_step_noop_without_player() {
        let mut sim = Simulation::new(1);
        sim.install_pools(VisualPools::new());
        sim.session.apply(SessionDelta {
            status: Some(RunStatus::Playing),
            ..Default::default()
        });
        let mut input = InputState::new();
        input.click();

        step_once(&mut sim, &mut input, 1.0 / 60.0, 0.0);
        assert!(sim.entities.bullets.is_empty());
    }

    #[test]
    fn test_player_movement_is_clamped() {
        let mut sim = ready_sim(2);
        let mut input = InputState::new();
        input.key_down("d");
        input.key_down("w");

        // Ten seconds of max input at 60 fps
        for frame in 0..600 {
            step_once(&mut sim, &mut input, 1.0 / 60.0, frame as f64 / 60.0);
        }
        let player = sim.entities.player.as_ref().unwrap();
        assert_eq!(player.pos.x, PLAYER_BOUNDS_X);
        assert_eq!(player.pos.y, PLAYER_BOUNDS_Y);
        assert_eq!(player.pos.z, 0.0);
    }

    #[test]
    fn test_fire_spawns_bullet_with_cue() {
        let mut sim = ready_sim(3);
        let mut input = InputState::new();
        let tones = Rc::new(RefCell::new(Vec::new()));
        let mut scene = NullScene::default();
        let mut audio = AudioDirector::new(
            Box::new(RecordingTone(tones.clone())),
            Settings::default(),
        );
        let mut ui = NullStatus;
        let mut io = FrameIo {
            scene: &mut scene,
            audio: &mut audio,
            ui: &mut ui,
        };

        input.click();
        sim.step(&mut input, &mut io, 0.0, 0.0);

        assert_eq!(sim.entities.bullets.len(), 1);
        let bullet = &sim.entities.bullets[0];
        assert_eq!(bullet.pos, Vec3::new(0.0, 0.0, -BULLET_SPAWN_OFFSET));
        assert_eq!(bullet.vel, Vec3::new(0.0, 0.0, -BULLET_SPEED));
        assert!(bullet.visual.is_some());
        assert!(
            tones
                .borrow()
                .contains(&(800.0, 0.1, Waveform::Square))
        );
    }

    #[test]
    fn test_fire_rate_limit_across_frames() {
        let mut sim = ready_sim(4);
        let mut input = InputState::new();

        input.click();
        step_once(&mut sim, &mut input, 0.0, 0.0);
        input.click();
        step_once(&mut sim, &mut input, 0.0, 0.100);
        assert_eq!(sim.entities.bullets.len(), 1);

        input.click();
        step_once(&mut sim, &mut input, 0.0, 0.151);
        assert_eq!(sim.entities.bullets.len(), 2);
    }

    #[test]
    fn test_bullet_cull_releases_to_pool() {
        let mut sim = ready_sim(5);
        let mut input = InputState::new();

        input.click();
        step_once(&mut sim, &mut input, 0.0, 0.0);
        assert_eq!(sim.pools().unwrap().bullets.constructed(), 1);

        // 20 u/s toward -z from z=-1; past 50 after ~2.5 s
        for frame in 0..30 {
            step_once(&mut sim, &mut input, 0.1, 1.0 + frame as f64 * 0.1);
        }
        assert!(sim.entities.bullets.is_empty());
        assert_eq!(sim.pools().unwrap().bullets.available(), 1);
    }

    #[test]
    fn test_enemy_cull_past_camera_plane() {
        let mut sim = ready_sim(6);
        let id = place_enemy(&mut sim, Vec3::new(6.0, 6.0, 19.5), 3);
        sim.entities.enemies[0].vel = Vec3::new(0.0, 0.0, 6.0);

        let mut input = InputState::new();
        step_once(&mut sim, &mut input, 0.2, 0.0);
        assert!(!sim.entities.enemies.iter().any(|e| e.id == id));
    }

    #[test]
    fn test_three_hits_destroy_enemy_and_score_once() {
        let mut sim = ready_sim(7);
        let enemy_pos = Vec3::new(5.0, 5.0, -10.0);
        place_enemy(&mut sim, enemy_pos, ENEMY_HEALTH);

        let mut input = InputState::new();
        // Flush the run-start snapshot so only hit outcomes are recorded
        step_once(&mut sim, &mut input, 0.0, 0.0);

        let mut scene = NullScene::default();
        let mut audio = null_audio();
        let mut ui = RecordingStatus::new();

        for hit in 1..=3 {
            // Plant a bullet on the enemy; dt 0 keeps positions put
            let id = sim.entities.next_entity_id();
            sim.entities.insert(
                Entity::new(id, EntityCategory::Bullet, enemy_pos, BULLET_RADIUS)
                    .with_velocity(Vec3::ZERO),
            );
            let mut io = FrameIo {
                scene: &mut scene,
                audio: &mut audio,
                ui: &mut ui,
            };
            sim.step(&mut input, &mut io, 0.0, hit as f64);

            if hit < 3 {
                assert_eq!(sim.entities.enemies[0].health, ENEMY_HEALTH - hit);
                assert_eq!(sim.session.score, 0);
            }
            // The spent bullet left the store either way
            assert!(sim.entities.bullets.is_empty());
        }

        assert!(sim.entities.enemies.is_empty());
        assert_eq!(sim.session.score, KILL_SCORE);
        assert_eq!(sim.session.enemies_remaining, WAVE_BASE_ENEMIES);

        let score_updates: Vec<u64> = ui
            .deltas
            .iter()
            .filter_map(|d| d.score)
            .collect();
        assert_eq!(score_updates, vec![KILL_SCORE]);
    }

    #[test]
    fn test_player_hit_decrements_health() {
        let mut sim = ready_sim(8);
        place_enemy(&mut sim, Vec3::ZERO, ENEMY_HEALTH);

        let mut input = InputState::new();
        step_once(&mut sim, &mut input, 0.0, 0.0);

        assert_eq!(sim.session.health, PLAYER_MAX_HEALTH - 1);
        assert_eq!(sim.session.status, RunStatus::Playing);
        assert!(sim.entities.enemies.is_empty());
    }

    #[test]
    fn test_fatal_hit_uses_pre_decrement_health() {
        let mut sim = ready_sim(9);
        sim.session.apply(SessionDelta {
            health: Some(2),
            score: Some(500),
            ..Default::default()
        });

        // At health 2 a ram is survivable
        place_enemy(&mut sim, Vec3::ZERO, ENEMY_HEALTH);
        let mut input = InputState::new();
        step_once(&mut sim, &mut input, 0.0, 0.0);
        assert_eq!(sim.session.health, 1);
        assert_eq!(sim.session.status, RunStatus::Playing);

        // At health 1 the next ram ends the run
        place_enemy(&mut sim, Vec3::ZERO, ENEMY_HEALTH);
        step_once(&mut sim, &mut input, 0.0, 1.0);
        assert_eq!(sim.session.health, 0);
        assert_eq!(sim.session.status, RunStatus::GameOver);
        assert_eq!(sim.high_scores.entries.len(), 1);
        assert_eq!(sim.high_scores.top_score(), Some(500));
    }

    #[test]
    fn test_game_over_fires_exactly_once() {
        let mut sim = ready_sim(10);
        sim.session.apply(SessionDelta {
            health: Some(1),
            score: Some(100),
            ..Default::default()
        });
        // Two enemies on top of the player in the same frame
        place_enemy(&mut sim, Vec3::ZERO, ENEMY_HEALTH);
        place_enemy(&mut sim, Vec3::ZERO, ENEMY_HEALTH);

        let mut input = InputState::new();
        let mut scene = NullScene::default();
        let mut audio = null_audio();
        let mut ui = RecordingStatus::new();
        let mut io = FrameIo {
            scene: &mut scene,
            audio: &mut audio,
            ui: &mut ui,
        };
        sim.step(&mut input, &mut io, 0.0, 0.0);
        // A later frame with the leftover enemy still in the field
        let mut io = FrameIo {
            scene: &mut scene,
            audio: &mut audio,
            ui: &mut ui,
        };
        sim.step(&mut input, &mut io, 0.0, 0.1);

        let game_overs = ui
            .deltas
            .iter()
            .filter(|d| d.status == Some(RunStatus::GameOver))
            .count();
        assert_eq!(game_overs, 1);
        assert_eq!(sim.high_scores.entries.len(), 1);
    }

    #[test]
    fn test_power_up_pickup_grants_shield_and_heals() {
        let mut sim = ready_sim(11);
        sim.session.apply(SessionDelta {
            health: Some(3),
            ..Default::default()
        });

        let id = sim.entities.next_entity_id();
        sim.entities.insert(
            Entity::new(id, EntityCategory::PowerUp, Vec3::ZERO, POWERUP_RADIUS)
                .with_velocity(Vec3::ZERO),
        );

        let mut input = InputState::new();
        step_once(&mut sim, &mut input, 0.0, 50.0);

        assert!(sim.entities.power_ups.is_empty());
        assert_eq!(sim.session.health, 4);
        assert_eq!(sim.session.effects.len(), 1);
        let effect = &sim.session.effects[0];
        assert_eq!(effect.kind, EffectKind::Shield);
        assert_eq!(effect.duration, SHIELD_DURATION);
        assert_eq!(effect.activated_at, 50.0);
    }

    #[test]
    fn test_shield_expires_on_wall_clock() {
        let mut sim = ready_sim(12);
        let id = sim.entities.next_entity_id();
        sim.entities.insert(
            Entity::new(id, EntityCategory::PowerUp, Vec3::ZERO, POWERUP_RADIUS)
                .with_velocity(Vec3::ZERO),
        );

        let mut input = InputState::new();
        step_once(&mut sim, &mut input, 0.0, 100.0);
        assert_eq!(sim.session.effects.len(), 1);

        step_once(&mut sim, &mut input, 0.0, 109.9);
        assert_eq!(sim.session.effects.len(), 1);

        step_once(&mut sim, &mut input, 0.0, 110.1);
        assert!(sim.session.effects.is_empty());
    }

    #[test]
    fn test_wave_advance_after_clear_delay() {
        let mut sim = ready_sim(13);
        sim.session.set_enemies_remaining(0);
        assert_eq!(sim.entities.active_enemy_count(), 0);

        let mut input = InputState::new();
        step_once(&mut sim, &mut input, 3.1, 0.0);

        assert_eq!(sim.session.wave, 2);
        assert_eq!(sim.session.level, 2);
        assert_eq!(sim.session.enemies_remaining, WAVE_BASE_ENEMIES + 1);
    }

    #[test]
    fn test_wave_timer_requires_clear_field() {
        let mut sim = ready_sim(14);
        sim.session.set_enemies_remaining(0);
        place_enemy(&mut sim, Vec3::new(8.0, -6.0, -10.0), ENEMY_HEALTH);

        let mut input = InputState::new();
        step_once(&mut sim, &mut input, 3.1, 0.0);

        // An enemy still in the field holds the wave open
        assert_eq!(sim.session.wave, 1);
    }

    #[test]
    fn test_spawner_feeds_pooled_enemies() {
        let mut sim = ready_sim(15);
        let mut input = InputState::new();

        // One interval at level 1 is 1.9 s
        step_once(&mut sim, &mut input, 2.0, 0.0);
        assert_eq!(sim.entities.enemies.len(), 1);
        assert_eq!(sim.pools().unwrap().enemies.constructed(), 1);
        assert_eq!(sim.session.enemies_remaining, WAVE_BASE_ENEMIES + 1);

        // Retire it and confirm the next spawn reuses the handle
        sim.entities.enemies[0].active = false;
        step_once(&mut sim, &mut input, 0.0, 0.1);
        assert!(sim.entities.enemies.is_empty());

        step_once(&mut sim, &mut input, 2.0, 0.2);
        assert_eq!(sim.entities.enemies.len(), 1);
        assert_eq!(sim.pools().unwrap().enemies.constructed(), 1);
    }

    #[test]
    fn test_enemy_speed_stays_clamped() {
        let mut sim = ready_sim(16);
        place_enemy(&mut sim, Vec3::new(5.0, 0.0, -5.0), ENEMY_HEALTH);
        sim.entities.enemies[0].vel = Vec3::new(0.0, 0.0, 7.9);

        let mut input = InputState::new();
        for frame in 0..500 {
            step_once(&mut sim, &mut input, 0.001, frame as f64 * 0.001);
            for enemy in &sim.entities.enemies {
                assert!(enemy.vel.length() <= ENEMY_MAX_SPEED + 1e-4);
            }
        }
    }

    #[test]
    fn test_pause_freezes_the_field() {
        let mut sim = ready_sim(17);
        place_enemy(&mut sim, Vec3::new(0.0, 5.0, -10.0), ENEMY_HEALTH);
        sim.entities.enemies[0].vel = Vec3::new(0.0, 0.0, 5.0);

        sim.toggle_pause();
        assert_eq!(sim.session.status, RunStatus::Paused);

        let mut input = InputState::new();
        step_once(&mut sim, &mut input, 1.0, 0.0);
        assert_eq!(sim.entities.enemies[0].pos.z, -10.0);

        sim.toggle_pause();
        step_once(&mut sim, &mut input, 1.0, 1.0);
        assert_eq!(sim.entities.enemies[0].pos.z, -5.0);
    }

    #[test]
    fn test_command_validation() {
        let mut scene = NullScene::default();
        let mut sim = Simulation::new(18);
        sim.install_pools(VisualPools::new());

        // Pause from the menu is a no-op
        sim.toggle_pause();
        assert_eq!(sim.session.status, RunStatus::Menu);

        sim.start(&mut scene);
        assert_eq!(sim.session.status, RunStatus::Playing);
        assert!(sim.entities.player.is_some());

        // Start while playing is a no-op
        let player_id = sim.entities.player.as_ref().unwrap().id;
        sim.start(&mut scene);
        assert_eq!(sim.entities.player.as_ref().unwrap().id, player_id);

        // Restart is only valid from game over
        sim.restart(&mut scene);
        assert_eq!(sim.session.status, RunStatus::Playing);

        sim.session.apply(SessionDelta {
            status: Some(RunStatus::GameOver),
            ..Default::default()
        });
        sim.restart(&mut scene);
        assert_eq!(sim.session.status, RunStatus::Playing);
        assert_eq!(sim.session.score, 0);
        assert_eq!(sim.session.health, PLAYER_MAX_HEALTH);
    }

    #[test]
    fn test_escape_latch_returns_to_menu() {
        let mut sim = ready_sim(19);
        place_enemy(&mut sim, Vec3::new(3.0, 3.0, -10.0), ENEMY_HEALTH);

        let mut input = InputState::new();
        input.key_down("Escape");
        step_once(&mut sim, &mut input, 1.0 / 60.0, 0.0);

        assert_eq!(sim.session.status, RunStatus::Menu);
        assert!(sim.entities.player.is_none());
        assert!(sim.entities.enemies.is_empty());
    }

    #[test]
    fn test_quiet_frame_publishes_nothing() {
        let mut sim = ready_sim(20);
        let mut input = InputState::new();
        // Flush the run-start snapshot
        step_once(&mut sim, &mut input, 0.0, 0.0);

        let mut scene = NullScene::default();
        let mut audio = null_audio();
        let mut ui = RecordingStatus::new();
        let mut io = FrameIo {
            scene: &mut scene,
            audio: &mut audio,
            ui: &mut ui,
        };
        // Small quiet frame: nothing scores, spawns or expires
        sim.step(&mut input, &mut io, 0.001, 0.001);
        assert!(ui.deltas.is_empty());
    }

    #[test]
    fn test_restart_resets_entities_and_pools_reuse() {
        let mut scene = NullScene::default();
        let mut sim = ready_sim(21);
        let mut input = InputState::new();

        input.click();
        step_once(&mut sim, &mut input, 0.0, 0.0);
        assert_eq!(sim.entities.bullets.len(), 1);

        sim.session.apply(SessionDelta {
            status: Some(RunStatus::GameOver),
            ..Default::default()
        });
        sim.restart(&mut scene);

        assert!(sim.entities.bullets.is_empty());
        // The old bullet's visual is waiting on the free list
        assert_eq!(sim.pools().unwrap().bullets.available(), 1);
    }
}
