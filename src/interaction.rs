//! Interaction layer - entity movement, collisions and scoring.
//!
//! Each step the owner calls [`InteractionLayer::tick`] (movement and expiry)
//! and then [`InteractionLayer::resolve_collisions`] against the automaton
//! grid. Collisions are tested at post-move positions only; there is no swept
//! test, so a fast projectile can skip over a thin target in one tick.

use crate::config::Config;
use crate::entity::{Bounds, Entity, EntityId, EntityKind, EntitySpec, EntityState, Vec2};
use crate::grid::AutomatonGrid;
use crate::spatial::SpatialHash;
use serde::{Deserialize, Serialize};

/// Why an entity left the simulation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalReason {
    /// Lifetime ran out
    Expired,
    /// Moved outside the simulation bounds
    OutOfBounds,
    /// Consumed by a non-piercing hit
    Collision,
    /// Health reached zero
    Killed,
    /// Picked up by an agent
    Collected,
}

/// An entity removed during a tick or collision pass, with its final position
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemovedEntity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec2,
    pub reason: RemovalReason,
}

/// Result of [`InteractionLayer::tick`]
#[derive(Clone, Debug, Default)]
pub struct TickReport {
    pub removed: Vec<RemovedEntity>,
}

/// A single interaction produced by a collision pass
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum CollisionEvent {
    /// An entity killed a live grid cell
    CellKilled {
        entity: EntityId,
        x: usize,
        y: usize,
        /// World-space centre of the cell
        center: Vec2,
        hue: f32,
    },
    /// One entity damaged another
    EntityHit {
        attacker: EntityId,
        target: EntityId,
        damage: f32,
        killed: bool,
    },
    /// An agent picked up an XP orb
    OrbCollected { agent: EntityId, orb: EntityId, xp: u64 },
}

/// Result of [`InteractionLayer::resolve_collisions`]
#[derive(Clone, Debug, Default)]
pub struct CollisionReport {
    pub events: Vec<CollisionEvent>,
    pub removed: Vec<RemovedEntity>,
    /// Reward entities spawned by this pass
    pub spawned: Vec<EntityId>,
    pub cells_killed: u32,
}

/// Running score counters
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub score: u64,
    pub cells_killed: u64,
    pub enemies_killed: u64,
    pub agents_lost: u64,
    pub xp_collected: u64,
}

/// Reward dropped where an enemy dies
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrbReward {
    pub radius: f32,
    pub lifetime: Option<f32>,
}

/// Scoring and damage parameters for collision resolution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractionRules {
    pub points_per_cell: u64,
    pub points_per_enemy: u64,
    pub xp_per_orb: u64,
    pub contact_damage: f32,
    pub reward_orb: Option<OrbReward>,
}

impl Default for InteractionRules {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl InteractionRules {
    pub fn from_config(config: &Config) -> Self {
        let reward_orb = config.entities.reward_orb.then(|| OrbReward {
            radius: config.entities.orb_radius,
            lifetime: config.entities.orb_lifetime,
        });

        Self {
            points_per_cell: config.scoring.points_per_cell,
            points_per_enemy: config.scoring.points_per_enemy,
            xp_per_orb: config.scoring.xp_per_orb,
            contact_damage: config.entities.contact_damage,
            reward_orb,
        }
    }
}

/// Mark an entity for removal and record why
#[inline]
fn expire(entity: &mut Entity, reason: RemovalReason, removed: &mut Vec<RemovedEntity>) {
    entity.state = EntityState::Expiring;
    removed.push(RemovedEntity {
        id: entity.id,
        kind: entity.kind,
        position: entity.position,
        reason,
    });
    log::trace!("entity {} ({:?}) removed: {:?}", entity.id, entity.kind, reason);
}

/// Owner of all transient entities
#[derive(Clone, Debug)]
pub struct InteractionLayer {
    entities: Vec<Entity>,
    bounds: Bounds,
    cell_size: f32,
    rules: InteractionRules,
    scores: ScoreBoard,
    spatial: SpatialHash,
    next_id: EntityId,
}

impl InteractionLayer {
    /// Create a layer over `bounds`, where grid cell (x, y) covers
    /// `bounds.min + [x, x + 1) * cell_size` (and likewise for y)
    pub fn new(bounds: Bounds, cell_size: f32, rules: InteractionRules) -> Self {
        Self {
            entities: Vec::new(),
            bounds,
            cell_size,
            rules,
            scores: ScoreBoard::default(),
            spatial: SpatialHash::new(bounds, cell_size * 4.0),
            next_id: 0,
        }
    }

    /// Layer covering the configured grid
    pub fn from_config(config: &Config) -> Self {
        let (w, h) = config.world.extent();
        Self::new(
            Bounds::from_size(w, h),
            config.world.cell_size,
            InteractionRules::from_config(config),
        )
    }

    /// Add an entity. No validation is performed.
    pub fn spawn(&mut self, spec: EntitySpec) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        self.entities.push(Entity::from_spec(id, spec));
        id
    }

    /// Move every entity, then drop the ones that expired or left the bounds
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let mut removed = Vec::new();

        for entity in &mut self.entities {
            if !entity.is_active() {
                continue;
            }
            entity.integrate(dt);

            if entity.is_expired() {
                expire(entity, RemovalReason::Expired, &mut removed);
            } else if !self.bounds.contains(entity.position) {
                expire(entity, RemovalReason::OutOfBounds, &mut removed);
            }
        }

        self.compact();
        TickReport { removed }
    }

    /// Test entities against the grid and against each other.
    ///
    /// Killed cells are applied to `grid` immediately, so they are visible to
    /// the next generation computed after this call.
    pub fn resolve_collisions(&mut self, grid: &mut AutomatonGrid) -> CollisionReport {
        let mut report = CollisionReport::default();

        self.resolve_cell_hits(grid, &mut report);

        let mut fallen = Vec::new();
        self.rebuild_spatial();
        self.resolve_projectile_hits(&mut report, &mut fallen);
        self.resolve_contact_damage(&mut report, &mut fallen);
        self.resolve_orb_pickups(&mut report);

        self.compact();

        if let Some(orb) = self.rules.reward_orb {
            for position in fallen {
                let mut spec = EntitySpec::xp_orb(position, orb.radius);
                spec.lifetime = orb.lifetime;
                report.spawned.push(self.spawn(spec));
            }
        }

        if !report.events.is_empty() {
            log::debug!(
                "collisions: {} events, {} cells killed, {} removed",
                report.events.len(),
                report.cells_killed,
                report.removed.len()
            );
        }

        report
    }

    /// Projectiles against live cells in the buckets their bounding box spans
    fn resolve_cell_hits(&mut self, grid: &mut AutomatonGrid, report: &mut CollisionReport) {
        let cs = self.cell_size;
        let origin = self.bounds.min;
        let max_x = grid.width() as i32 - 1;
        let max_y = grid.height() as i32 - 1;

        for entity in &mut self.entities {
            if !entity.is_active() || !entity.kind.hits_cells() {
                continue;
            }

            let local_x = entity.position.x - origin.x;
            let local_y = entity.position.y - origin.y;
            // Both ends clamp so an entity on the far border still reaches the last row/column
            let x0 = (((local_x - entity.radius) / cs).floor() as i32).clamp(0, max_x);
            let x1 = (((local_x + entity.radius) / cs).floor() as i32).clamp(0, max_x);
            let y0 = (((local_y - entity.radius) / cs).floor() as i32).clamp(0, max_y);
            let y1 = (((local_y + entity.radius) / cs).floor() as i32).clamp(0, max_y);

            'scan: for y in y0..=y1 {
                for x in x0..=x1 {
                    if !grid.is_alive(x, y) {
                        continue;
                    }
                    let min = Vec2::new(origin.x + x as f32 * cs, origin.y + y as f32 * cs);
                    let max = Vec2::new(min.x + cs, min.y + cs);
                    if !entity.overlaps_rect(min, max) {
                        continue;
                    }

                    let hue = grid.cell(x, y).map_or(0.0, |c| c.lineage_hue);
                    grid.kill(x, y);

                    self.scores.cells_killed += 1;
                    self.scores.score += self.rules.points_per_cell;
                    report.cells_killed += 1;
                    report.events.push(CollisionEvent::CellKilled {
                        entity: entity.id,
                        x: x as usize,
                        y: y as usize,
                        center: Vec2::new(min.x + cs * 0.5, min.y + cs * 0.5),
                        hue,
                    });

                    if !entity.piercing {
                        expire(entity, RemovalReason::Collision, &mut report.removed);
                        break 'scan;
                    }
                }
            }
        }
    }

    fn rebuild_spatial(&mut self) {
        self.spatial.clear();
        for (idx, entity) in self.entities.iter().enumerate() {
            if entity.is_active() {
                self.spatial.insert(entity.position, idx);
            }
        }
    }

    fn max_radius(&self) -> f32 {
        self.entities
            .iter()
            .filter(|e| e.is_active())
            .map(|e| e.radius)
            .fold(0.0, f32::max)
    }

    /// Active entities of `kind` overlapping entity `idx`
    fn overlapping(&self, idx: usize, kind: EntityKind, reach: f32) -> Vec<usize> {
        let this = &self.entities[idx];
        let mut hits: Vec<usize> = self
            .spatial
            .query_radius(this.position, this.radius + reach)
            .into_iter()
            .filter(|&j| {
                let other = &self.entities[j];
                j != idx && other.kind == kind && other.is_active() && this.overlaps(other)
            })
            .collect();
        // Bucket order is stable, but keep spawn order explicit
        hits.sort_unstable();
        hits
    }

    fn kill_enemy(&mut self, idx: usize, report: &mut CollisionReport, fallen: &mut Vec<Vec2>) {
        let enemy = &mut self.entities[idx];
        fallen.push(enemy.position);
        expire(enemy, RemovalReason::Killed, &mut report.removed);
        self.scores.enemies_killed += 1;
        self.scores.score += self.rules.points_per_enemy;
    }

    fn resolve_projectile_hits(&mut self, report: &mut CollisionReport, fallen: &mut Vec<Vec2>) {
        let reach = self.max_radius();

        for i in 0..self.entities.len() {
            if !self.entities[i].is_active() || self.entities[i].kind != EntityKind::Projectile {
                continue;
            }

            for j in self.overlapping(i, EntityKind::Enemy, reach) {
                if !self.entities[j].is_active() {
                    continue;
                }
                let (attacker, damage, piercing) = {
                    let p = &self.entities[i];
                    (p.id, p.damage, p.piercing)
                };

                let killed = self.entities[j].apply_damage(damage);
                report.events.push(CollisionEvent::EntityHit {
                    attacker,
                    target: self.entities[j].id,
                    damage,
                    killed,
                });
                if killed {
                    self.kill_enemy(j, report, fallen);
                }

                if !piercing {
                    expire(&mut self.entities[i], RemovalReason::Collision, &mut report.removed);
                    break;
                }
            }
        }
    }

    fn resolve_contact_damage(&mut self, report: &mut CollisionReport, fallen: &mut Vec<Vec2>) {
        let reach = self.max_radius();
        let damage = self.rules.contact_damage;

        for i in 0..self.entities.len() {
            if !self.entities[i].is_active() || self.entities[i].kind != EntityKind::Enemy {
                continue;
            }

            for j in self.overlapping(i, EntityKind::Agent, reach) {
                if !self.entities[i].is_active() {
                    break;
                }
                if !self.entities[j].is_active() {
                    continue;
                }
                let enemy_id = self.entities[i].id;
                let agent_id = self.entities[j].id;

                let agent_killed = self.entities[j].apply_damage(damage);
                let enemy_killed = self.entities[i].apply_damage(damage);

                report.events.push(CollisionEvent::EntityHit {
                    attacker: enemy_id,
                    target: agent_id,
                    damage,
                    killed: agent_killed,
                });
                report.events.push(CollisionEvent::EntityHit {
                    attacker: agent_id,
                    target: enemy_id,
                    damage,
                    killed: enemy_killed,
                });

                if agent_killed {
                    expire(&mut self.entities[j], RemovalReason::Killed, &mut report.removed);
                    self.scores.agents_lost += 1;
                }
                if enemy_killed {
                    self.kill_enemy(i, report, fallen);
                }
            }
        }
    }

    fn resolve_orb_pickups(&mut self, report: &mut CollisionReport) {
        let reach = self.max_radius();
        let xp = self.rules.xp_per_orb;

        for i in 0..self.entities.len() {
            if !self.entities[i].is_active() || self.entities[i].kind != EntityKind::Agent {
                continue;
            }

            for j in self.overlapping(i, EntityKind::XpOrb, reach) {
                if !self.entities[j].is_active() {
                    continue;
                }
                expire(&mut self.entities[j], RemovalReason::Collected, &mut report.removed);
                self.scores.xp_collected += xp;
                report.events.push(CollisionEvent::OrbCollected {
                    agent: self.entities[i].id,
                    orb: self.entities[j].id,
                    xp,
                });
            }
        }
    }

    /// Finish every expiring entity and drop it, preserving order
    fn compact(&mut self) {
        for entity in &mut self.entities {
            entity.finish();
        }
        self.entities.retain(|e| e.state != EntityState::Removed);
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn count_kind(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind == kind).count()
    }

    pub fn score(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn rules(&self) -> &InteractionRules {
        &self.rules
    }

    pub fn set_rules(&mut self, rules: InteractionRules) {
        self.rules = rules;
    }

    /// Remove all entities and reset scores
    pub fn clear(&mut self) {
        self.entities.clear();
        self.scores = ScoreBoard::default();
    }
}
