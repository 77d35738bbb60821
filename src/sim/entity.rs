//! Entities and the per-category stores that own them

use glam::Vec3;

use crate::scene::VisualHandle;

/// What kind of simulated object an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityCategory {
    Player,
    Bullet,
    Enemy,
    PowerUp,
}

/// Any simulated object: the player ship, a bullet, an enemy, a pickup.
///
/// Entities reference their visual through an opaque handle; the renderer
/// owns the actual scene object.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Unique for the entity's lifetime
    pub id: u32,
    pub category: EntityCategory,
    pub pos: Vec3,
    pub vel: Vec3,
    pub health: i32,
    pub max_health: i32,
    /// Collision sphere radius, always > 0
    pub radius: f32,
    /// Cleared when the entity is consumed; the store removes it the same frame
    pub active: bool,
    pub visual: Option<VisualHandle>,
}

impl Entity {
    pub fn new(id: u32, category: EntityCategory, pos: Vec3, radius: f32) -> Self {
        debug_assert!(radius > 0.0);
        Self {
            id,
            category,
            pos,
            vel: Vec3::ZERO,
            health: 1,
            max_health: 1,
            radius,
            active: true,
            visual: None,
        }
    }

    pub fn with_velocity(mut self, vel: Vec3) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_health(mut self, health: i32) -> Self {
        self.health = health;
        self.max_health = health;
        self
    }

    pub fn with_visual(mut self, visual: VisualHandle) -> Self {
        self.visual = Some(visual);
        self
    }

    /// Reduce health, floored at zero
    pub fn damage(&mut self, amount: i32) {
        self.health = (self.health - amount).max(0);
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Owns every live entity, grouped by category in spawn order.
///
/// The player is singular; bullets, enemies and power-ups are ordered
/// collections. All mutation happens from the simulation step.
#[derive(Debug, Default)]
pub struct EntityStore {
    pub player: Option<Entity>,
    pub bullets: Vec<Entity>,
    pub enemies: Vec<Entity>,
    pub power_ups: Vec<Entity>,
    next_id: u32,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Insert an entity into its category's collection. Replaces the
    /// player slot for `Player`.
    pub fn insert(&mut self, entity: Entity) -> u32 {
        let id = entity.id;
        match entity.category {
            EntityCategory::Player => self.player = Some(entity),
            EntityCategory::Bullet => self.bullets.push(entity),
            EntityCategory::Enemy => self.enemies.push(entity),
            EntityCategory::PowerUp => self.power_ups.push(entity),
        }
        id
    }

    /// Number of enemies still in play
    pub fn active_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.active).count()
    }

    /// Remove deactivated entities from one collection, handing each to
    /// `on_removed` for visual/pool cleanup. Preserves spawn order.
    pub fn drain_inactive(
        &mut self,
        category: EntityCategory,
        mut on_removed: impl FnMut(Entity),
    ) {
        let list = match category {
            EntityCategory::Bullet => &mut self.bullets,
            EntityCategory::Enemy => &mut self.enemies,
            EntityCategory::PowerUp => &mut self.power_ups,
            EntityCategory::Player => return,
        };
        let mut i = 0;
        while i < list.len() {
            if list[i].active {
                i += 1;
            } else {
                on_removed(list.remove(i));
            }
        }
    }

    /// Remove everything, including the player, handing each entity to
    /// `on_removed`. Used when leaving a run.
    pub fn clear(&mut self, mut on_removed: impl FnMut(Entity)) {
        if let Some(player) = self.player.take() {
            on_removed(player);
        }
        for entity in self
            .bullets
            .drain(..)
            .chain(self.enemies.drain(..))
            .chain(self.power_ups.drain(..))
        {
            on_removed(entity);
        }
    }
}
