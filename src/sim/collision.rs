//! Collision detection
//!
//! Every entity collides as a sphere. The step applies the test pairwise:
//! bullets against enemies, and the player against enemies and power-ups.
//! At tens of entities the brute-force pass costs next to nothing, so
//! there is no broad phase.

use glam::Vec3;

use super::entity::Entity;

/// True iff two spheres overlap
#[inline]
pub fn spheres_intersect(pos_a: Vec3, radius_a: f32, pos_b: Vec3, radius_b: f32) -> bool {
    pos_a.distance(pos_b) < radius_a + radius_b
}

/// True iff the collision spheres of two entities overlap.
///
/// Pure and symmetric; callers decide what a hit means.
#[inline]
pub fn intersects(a: &Entity, b: &Entity) -> bool {
    spheres_intersect(a.pos, a.radius, b.pos, b.radius)
}
