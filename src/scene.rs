//! Command surface toward the host renderer
//!
//! The simulation never queries the scene graph. It mints opaque visual
//! handles, attaches/detaches them as entities come and go, and requests
//! explosion effects at a position. Everything else about rendering
//! (meshes, camera, lighting, particles) belongs to the host.

use glam::Vec3;

use crate::sim::entity::EntityCategory;

/// Opaque reference to a renderer-owned visual object.
///
/// The simulation only stores and passes these around; it never looks
/// inside. Handles stay valid until the host tears the scene down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualHandle(pub u64);

/// Render commands the simulation is allowed to issue.
pub trait SceneSink {
    /// Build a fresh visual for the given entity category.
    ///
    /// Used directly for un-pooled categories and as the construction
    /// callback for pooled ones.
    fn create_visual(&mut self, category: EntityCategory) -> VisualHandle;

    /// Place a visual in the scene at `pos`.
    fn attach_visual(&mut self, handle: VisualHandle, pos: Vec3);

    /// Remove a visual from the scene. The handle may be reattached later.
    fn detach_visual(&mut self, handle: VisualHandle);

    /// Fire an explosion effect at `pos`. The effect decays on the host's
    /// own clock and is not tracked by the simulation.
    fn spawn_explosion(&mut self, pos: Vec3);
}

/// Scene sink that mints handles but renders nothing. Used for headless
/// runs and tests.
#[derive(Debug, Default)]
pub struct NullScene {
    next_handle: u64,
}

impl SceneSink for NullScene {
    fn create_visual(&mut self, _category: EntityCategory) -> VisualHandle {
        self.next_handle += 1;
        VisualHandle(self.next_handle)
    }

    fn attach_visual(&mut self, _handle: VisualHandle, _pos: Vec3) {}

    fn detach_visual(&mut self, _handle: VisualHandle) {}

    fn spawn_explosion(&mut self, _pos: Vec3) {}
}
