//! Nova Strike headless driver
//!
//! Runs a scripted session against the null collaborators at a fixed
//! timestep and prints the outcome. Handy for profiling the simulation
//! and for eyeballing the session-state stream without a renderer.

use nova_strike::audio::{AudioDirector, NullTone};
use nova_strike::scene::NullScene;
use nova_strike::sim::{FrameIo, InputState, SessionDelta, Simulation, VisualPools};
use nova_strike::ui::StatusSink;
use nova_strike::Settings;

/// Logs every partial update the HUD would receive
struct LogStatus;

impl StatusSink for LogStatus {
    fn session_update(&mut self, delta: &SessionDelta) {
        if let Ok(json) = serde_json::to_string(delta) {
            log::info!("session update: {json}");
        }
    }
}

fn main() {
    env_logger::init();

    let seed: u64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x5EED);

    log::info!("Nova Strike headless run, seed {seed}");

    let mut sim = Simulation::new(seed);
    sim.install_pools(VisualPools::new());

    let mut input = InputState::new();
    let mut scene = NullScene::default();
    let mut audio = AudioDirector::new(Box::new(NullTone), Settings::default());
    let mut ui = LogStatus;

    sim.start(&mut scene);

    // 60 fps for 30 simulated seconds, weaving across the field and
    // firing as fast as the cooldown allows
    let dt = 1.0 / 60.0;
    for frame in 0u32..1800 {
        let now = f64::from(frame) * f64::from(dt);

        match frame % 240 {
            0 => {
                input.key_up("a");
                input.key_down("d");
            }
            120 => {
                input.key_up("d");
                input.key_down("a");
            }
            _ => {}
        }
        input.click();

        let mut io = FrameIo {
            scene: &mut scene,
            audio: &mut audio,
            ui: &mut ui,
        };
        sim.step(&mut input, &mut io, dt, now);
    }

    let session = &sim.session;
    println!(
        "status {:?} | score {} | wave {} | level {} | health {}/{}",
        session.status,
        session.score,
        session.wave,
        session.level,
        session.health,
        session.max_health
    );
    if let Some(top) = sim.high_scores.top_score() {
        println!("best run so far: {top}");
    }
}
