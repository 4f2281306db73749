//! Transient entities: projectiles, particles, agents, enemies and XP orbs.

use serde::{Deserialize, Serialize};

/// Unique entity identifier
pub type EntityId = u64;

/// 2D vector in world units
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn scale(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s)
    }

    #[inline]
    pub fn distance_squared(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[inline]
    pub fn distance(self, other: Vec2) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Unit vector at `angle` radians
    #[inline]
    pub fn from_angle(angle: f32) -> Self {
        Self::new(angle.cos(), angle.sin())
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

/// Axis-aligned simulation rectangle
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rectangle from the origin to (width, height)
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(Vec2::ZERO, Vec2::new(width, height))
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Inclusive containment
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Role of an entity in the interaction layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Kills grid cells and damages enemies
    Projectile,
    /// Cosmetic debris, no collisions
    Particle,
    /// Player-side autonomous unit
    Agent,
    /// Hostile unit that damages agents on contact
    Enemy,
    /// Reward dropped by a dead enemy, collected by agents
    XpOrb,
}

impl EntityKind {
    /// Whether this kind tests against grid cells
    pub fn hits_cells(self) -> bool {
        matches!(self, EntityKind::Projectile)
    }
}

/// Lifecycle state. Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityState {
    Active,
    /// Marked for removal in the current pass
    Expiring,
    /// Dropped from the layer when the pass compacts; never seen by callers
    Removed,
}

/// Parameters for spawning an entity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    pub kind: EntityKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    /// Seconds until expiry, `None` for unlimited
    pub lifetime: Option<f32>,
    pub health: f32,
    pub damage: f32,
    pub piercing: bool,
    /// Visual tag, carried for renderers
    pub hue: f32,
}

impl EntitySpec {
    fn base(kind: EntityKind, position: Vec2, radius: f32) -> Self {
        Self {
            kind,
            position,
            velocity: Vec2::ZERO,
            radius,
            lifetime: None,
            health: 1.0,
            damage: 0.0,
            piercing: false,
            hue: 0.0,
        }
    }

    pub fn projectile(position: Vec2, velocity: Vec2) -> Self {
        Self {
            velocity,
            damage: 1.0,
            ..Self::base(EntityKind::Projectile, position, 2.0)
        }
    }

    pub fn particle(position: Vec2, velocity: Vec2, lifetime: f32) -> Self {
        Self {
            velocity,
            lifetime: Some(lifetime),
            ..Self::base(EntityKind::Particle, position, 1.0)
        }
    }

    pub fn agent(position: Vec2, health: f32) -> Self {
        Self {
            health,
            ..Self::base(EntityKind::Agent, position, 8.0)
        }
    }

    pub fn enemy(position: Vec2, velocity: Vec2, health: f32) -> Self {
        Self {
            velocity,
            health,
            ..Self::base(EntityKind::Enemy, position, 8.0)
        }
    }

    pub fn xp_orb(position: Vec2, radius: f32) -> Self {
        Self::base(EntityKind::XpOrb, position, radius)
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_lifetime(mut self, lifetime: f32) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    pub fn with_health(mut self, health: f32) -> Self {
        self.health = health;
        self
    }

    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_piercing(mut self, piercing: bool) -> Self {
        self.piercing = piercing;
        self
    }

    pub fn with_hue(mut self, hue: f32) -> Self {
        self.hue = hue;
        self
    }
}

/// A live entity owned by the interaction layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub lifetime: Option<f32>,
    /// Seconds since spawn
    pub age: f32,
    pub health: f32,
    pub damage: f32,
    pub piercing: bool,
    pub hue: f32,
    pub state: EntityState,
}

impl Entity {
    pub fn from_spec(id: EntityId, spec: EntitySpec) -> Self {
        Self {
            id,
            kind: spec.kind,
            position: spec.position,
            velocity: spec.velocity,
            radius: spec.radius,
            lifetime: spec.lifetime,
            age: 0.0,
            health: spec.health,
            damage: spec.damage,
            piercing: spec.piercing,
            hue: spec.hue,
            state: EntityState::Active,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == EntityState::Active
    }

    /// Move forward by `dt` seconds
    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.position += self.velocity.scale(dt);
        self.age += dt;
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.lifetime.map_or(false, |l| self.age >= l)
    }

    /// Circle overlap test
    #[inline]
    pub fn overlaps(&self, other: &Entity) -> bool {
        let r = self.radius + other.radius;
        self.position.distance_squared(other.position) < r * r
    }

    /// Circle vs axis-aligned rectangle overlap test
    pub fn overlaps_rect(&self, min: Vec2, max: Vec2) -> bool {
        let cx = self.position.x.clamp(min.x, max.x);
        let cy = self.position.y.clamp(min.y, max.y);
        let closest = Vec2::new(cx, cy);
        // A zero-radius point still counts when it sits inside the rectangle
        let inside = self.position == closest;
        inside || self.position.distance_squared(closest) < self.radius * self.radius
    }

    /// Move an expiring entity to `Removed`. Active entities are untouched.
    pub fn finish(&mut self) {
        if self.state == EntityState::Expiring {
            self.state = EntityState::Removed;
        }
    }

    /// Reduce health, returning true if this hit was fatal
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        let was_alive = self.health > 0.0;
        self.health -= amount;
        was_alive && self.health <= 0.0
    }
}
