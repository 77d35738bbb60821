//! The simulation core
//!
//! Everything that decides gameplay lives here and runs once per frame,
//! single threaded, driven by the host's render callback:
//! - `entity`: entities and the per-category stores
//! - `pool`: reusable visual-handle free lists
//! - `collision`: the sphere-overlap test
//! - `input`: the shared input record listeners write into
//! - `spawner`: timer-gated enemy and power-up creation
//! - `session`: run status, score/health/wave bookkeeping
//! - `step`: the per-frame orchestrator and session commands

pub mod collision;
pub mod entity;
pub mod input;
pub mod pool;
pub mod session;
pub mod spawner;
pub mod step;

pub use collision::intersects;
pub use entity::{Entity, EntityCategory, EntityStore};
pub use input::{InputState, Key};
pub use pool::{HandlePool, VisualPools};
pub use session::{EffectKind, PowerUpEffect, RunStatus, SessionDelta, SessionState};
pub use spawner::Spawner;
pub use step::{FrameIo, Simulation};
