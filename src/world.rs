//! Simulation engine - the per-step loop tying grid, entities and cadence together.

use crate::cadence::{CadenceClock, GenerationCadence};
use crate::config::Config;
use crate::entity::{EntityId, EntityKind, EntitySpec, Vec2};
use crate::error::{ConfigError, Result};
use crate::grid::{AutomatonGrid, GenerationReport};
use crate::interaction::{CollisionEvent, CollisionReport, InteractionLayer, ScoreBoard, TickReport};
use crate::patterns::Pattern;
use crate::stats::{Stats, StatsHistory};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Coarse simulation state reported to the caller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationStatus {
    /// At least one live cell remains
    Running,
    /// Every cell is dead
    Cleared,
}

/// What happened during one [`Simulation::step`]
#[derive(Clone, Debug)]
pub struct StepReport {
    pub tick: TickReport,
    pub collisions: CollisionReport,
    pub particles_spawned: usize,
    pub generation: Option<GenerationReport>,
    pub status: SimulationStatus,
}

/// Read-only view of one live cell for renderers
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub x: usize,
    pub y: usize,
    pub age: u32,
    pub hue: f32,
}

/// Read-only view of one entity for renderers
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec2,
    pub radius: f32,
    pub hue: f32,
}

/// Everything a renderer needs to draw one frame
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub steps: u64,
    pub time: f64,
    pub generation: u64,
    pub width: usize,
    pub height: usize,
    pub cell_size: f32,
    pub cells: Vec<CellView>,
    pub entities: Vec<EntityView>,
    pub score: ScoreBoard,
    pub status: SimulationStatus,
}

impl Snapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// The simulation: automaton grid, interaction layer and scheduling
pub struct Simulation {
    grid: AutomatonGrid,
    layer: InteractionLayer,

    // State
    pub steps: u64,
    pub time: f64,
    status: SimulationStatus,

    // Configuration
    pub config: Config,

    // Statistics
    pub stats: Stats,
    pub stats_history: StatsHistory,

    // Scheduling
    cadence: CadenceClock,
    advance_requested: bool,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,
}

impl Simulation {
    /// Create a new simulation with a random seed
    pub fn new(config: Config) -> Self {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a new simulation with a specific seed for reproducibility
    pub fn new_with_seed(config: Config, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut grid = AutomatonGrid::new(config.world.width, config.world.height, &mut rng);
        grid.randomize(config.automaton.initial_density, &mut rng);

        let layer = InteractionLayer::from_config(&config);
        let cadence = CadenceClock::new(config.automaton.cadence);

        log::info!(
            "simulation created: {}x{} grid, {} live cells, cadence {:?}, seed {}",
            config.world.width,
            config.world.height,
            grid.live_cell_count(),
            config.automaton.cadence,
            seed
        );

        let mut sim = Self {
            grid,
            layer,
            steps: 0,
            time: 0.0,
            status: SimulationStatus::Running,
            stats_history: StatsHistory::new(config.logging.stats_interval),
            config,
            stats: Stats::new(),
            cadence,
            advance_requested: false,
            rng,
            seed,
        };

        sim.refresh_status();
        sim.stats.update(&sim.grid, &sim.layer);
        sim
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Order within a step: entity movement, collision resolution (kills land
    /// on the grid), then at most one generation if the cadence or an explicit
    /// request says so.
    pub fn step(&mut self, dt: f32) -> StepReport {
        let tick = self.layer.tick(dt);
        let collisions = self.layer.resolve_collisions(&mut self.grid);
        let particles_spawned = self.spawn_kill_particles(&collisions);

        let requested = std::mem::take(&mut self.advance_requested);
        let due = self.cadence.due(dt, collisions.cells_killed);
        let generation = if due || requested {
            Some(self.advance_generation())
        } else {
            None
        };

        self.steps += 1;
        self.time += f64::from(dt.max(0.0));
        self.refresh_status();
        self.update_stats();

        StepReport {
            tick,
            collisions,
            particles_spawned,
            generation,
            status: self.status,
        }
    }

    /// Compute one generation immediately
    pub fn advance_generation(&mut self) -> GenerationReport {
        let report = self.grid.advance_generation(&mut self.rng);
        self.stats.record_generation(&report);
        log::debug!(
            "generation {}: +{} -{} ={}",
            report.generation,
            report.born,
            report.died,
            report.survived
        );
        report
    }

    /// Ask for one generation at the end of the next step, whatever the cadence
    pub fn request_advance(&mut self) {
        self.advance_requested = true;
    }

    /// Debris for each shot cell, dropped once the entity cap is reached
    fn spawn_kill_particles(&mut self, collisions: &CollisionReport) -> usize {
        let per_kill = self.config.entities.particles_per_kill;
        let cap = self.config.entities.max_entities;
        let lifetime = self.config.entities.particle_lifetime;
        let speed = self.config.entities.particle_speed;
        let mut spawned = 0;

        for event in &collisions.events {
            let CollisionEvent::CellKilled { center, hue, .. } = *event else {
                continue;
            };
            for _ in 0..per_kill {
                if self.layer.len() >= cap {
                    return spawned;
                }
                let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
                let velocity = Vec2::from_angle(angle).scale(speed * self.rng.gen_range(0.5..1.0));
                self.layer
                    .spawn(EntitySpec::particle(center, velocity, lifetime).with_hue(hue));
                spawned += 1;
            }
        }

        spawned
    }

    fn refresh_status(&mut self) {
        let status = if self.grid.is_empty() {
            SimulationStatus::Cleared
        } else {
            SimulationStatus::Running
        };
        if status != self.status {
            log::info!("grid status {:?} -> {:?} at step {}", self.status, status, self.steps);
        }
        self.status = status;
    }

    fn update_stats(&mut self) {
        self.stats.time = self.time;
        self.stats.steps = self.steps;
        self.stats.update(&self.grid, &self.layer);

        if self.stats_history.is_due(self.steps) {
            self.stats_history.record(self.stats.clone());
        }
    }

    /// Run `steps` steps of `dt` seconds each
    pub fn run(&mut self, steps: u64, dt: f32) {
        for _ in 0..steps {
            self.step(dt);
        }
    }

    /// Run with a callback after every step
    pub fn run_with_callback<F>(&mut self, steps: u64, dt: f32, mut callback: F)
    where
        F: FnMut(&Simulation, &StepReport),
    {
        for _ in 0..steps {
            let report = self.step(dt);
            callback(self, &report);
        }
    }

    // Commands from the input adapter

    pub fn spawn(&mut self, spec: EntitySpec) -> EntityId {
        self.layer.spawn(spec)
    }

    pub fn toggle_cell(&mut self, x: i32, y: i32) {
        self.grid.toggle(x, y);
    }

    pub fn kill_cell(&mut self, x: i32, y: i32) -> bool {
        self.grid.kill(x, y)
    }

    pub fn set_cell_alive(&mut self, x: i32, y: i32, hue: Option<f32>) {
        self.grid.set_alive(x, y, hue);
    }

    /// Stamp a pattern with its origin at cell (x, y)
    pub fn stamp_pattern(&mut self, pattern: &Pattern, x: i32, y: i32) {
        self.grid.apply_pattern(pattern, x, y, None);
    }

    /// Replace the cadence policy. An invalid policy is rejected and the current one kept.
    pub fn set_cadence(&mut self, cadence: GenerationCadence) -> Result<()> {
        if let Err(reason) = cadence.validate() {
            log::warn!("Rejected cadence {:?}: {}", cadence, reason);
            return Err(ConfigError::Invalid(reason));
        }
        self.cadence.set_policy(cadence);
        self.config.automaton.cadence = cadence;
        Ok(())
    }

    /// Re-seed the grid, drop every entity and zero the counters
    pub fn reset(&mut self) {
        self.grid.clear();
        self.grid
            .randomize(self.config.automaton.initial_density, &mut self.rng);
        self.layer.clear();
        self.cadence.reset();
        self.advance_requested = false;
        self.steps = 0;
        self.time = 0.0;
        self.stats = Stats::new();
        self.stats_history.clear();
        self.refresh_status();
        self.stats.update(&self.grid, &self.layer);
        log::info!("simulation reset: {} live cells", self.grid.live_cell_count());
    }

    /// Kill every cell without touching entities
    pub fn clear_grid(&mut self) {
        self.grid.clear();
        self.refresh_status();
    }

    // Queries for the rendering adapter

    pub fn grid(&self) -> &AutomatonGrid {
        &self.grid
    }

    pub fn layer(&self) -> &InteractionLayer {
        &self.layer
    }

    pub fn is_alive(&self, x: i32, y: i32) -> bool {
        self.grid.is_alive(x, y)
    }

    pub fn score(&self) -> &ScoreBoard {
        self.layer.score()
    }

    pub fn status(&self) -> SimulationStatus {
        self.status
    }

    pub fn cadence(&self) -> GenerationCadence {
        self.cadence.policy()
    }

    /// Get seed for reproducibility
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn snapshot(&self) -> Snapshot {
        let width = self.grid.width();
        let cells = self
            .grid
            .cells()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.alive)
            .map(|(i, c)| CellView {
                x: i % width,
                y: i / width,
                age: c.age,
                hue: c.lineage_hue,
            })
            .collect();

        let entities = self
            .layer
            .entities()
            .iter()
            .map(|e| EntityView {
                id: e.id,
                kind: e.kind,
                position: e.position,
                radius: e.radius,
                hue: e.hue,
            })
            .collect();

        Snapshot {
            steps: self.steps,
            time: self.time,
            generation: self.grid.generation(),
            width,
            height: self.grid.height(),
            cell_size: self.layer.cell_size(),
            cells,
            entities,
            score: self.layer.score().clone(),
            status: self.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.world.width = 20;
        config.world.height = 20;
        config.automaton.initial_density = 0.0;
        config.automaton.cadence = GenerationCadence::Manual;
        config
    }

    #[test]
    fn test_simulation_creation() {
        let mut config = test_config();
        config.automaton.initial_density = 0.3;
        let sim = Simulation::new(config);

        assert!(sim.grid().live_cell_count() > 0);
        assert_eq!(sim.status(), SimulationStatus::Running);
        assert_eq!(sim.steps, 0);
    }

    #[test]
    fn test_empty_grid_is_cleared() {
        let sim = Simulation::new_with_seed(test_config(), 1);
        assert_eq!(sim.status(), SimulationStatus::Cleared);
    }

    #[test]
    fn test_manual_cadence_waits_for_request() {
        let mut sim = Simulation::new_with_seed(test_config(), 1);
        sim.stamp_pattern(&crate::patterns::BLINKER, 4, 5);

        let report = sim.step(1.0);
        assert!(report.generation.is_none());
        assert_eq!(report.status, SimulationStatus::Running);

        sim.request_advance();
        let report = sim.step(0.016);
        assert_eq!(report.generation.unwrap().generation, 1);
        assert!(sim.is_alive(5, 4));

        // The request is consumed
        assert!(sim.step(0.016).generation.is_none());
    }

    #[test]
    fn test_timer_cadence() {
        let mut config = test_config();
        config.automaton.cadence = GenerationCadence::Timer { interval_secs: 0.2 };
        let mut sim = Simulation::new_with_seed(config, 2);
        sim.stamp_pattern(&crate::patterns::BLOCK, 3, 3);

        sim.run(10, 0.1);
        assert_eq!(sim.grid().generation(), 5);
    }

    #[test]
    fn test_kill_applied_before_generation() {
        let mut config = test_config();
        config.automaton.cadence = GenerationCadence::KillCount { every: 1 };
        config.entities.particles_per_kill = 0;
        let mut sim = Simulation::new_with_seed(config, 3);

        // Blinker at (4..=6, 5); shoot the centre cell
        sim.stamp_pattern(&crate::patterns::BLINKER, 4, 5);
        sim.spawn(EntitySpec::projectile(Vec2::new(55.0, 55.0), Vec2::ZERO));

        let report = sim.step(0.016);
        assert_eq!(report.collisions.cells_killed, 1);
        // Two isolated cells die in the generation that follows the kill
        let generation = report.generation.unwrap();
        assert_eq!(generation.died, 2);
        assert_eq!(generation.born, 0);
        assert_eq!(report.status, SimulationStatus::Cleared);
    }

    #[test]
    fn test_kill_particles_spawned() {
        let mut config = test_config();
        config.entities.particles_per_kill = 3;
        let mut sim = Simulation::new_with_seed(config, 4);
        sim.set_cell_alive(2, 2, Some(120.0));
        sim.spawn(EntitySpec::projectile(Vec2::new(25.0, 25.0), Vec2::ZERO));

        let report = sim.step(0.0);
        assert_eq!(report.particles_spawned, 3);
        assert_eq!(sim.layer().count_kind(EntityKind::Particle), 3);
        for e in sim.layer().entities() {
            assert_eq!(e.hue, 120.0);
        }
    }

    #[test]
    fn test_particle_cap() {
        let mut config = test_config();
        config.entities.particles_per_kill = 10;
        config.entities.max_entities = 4;
        let mut sim = Simulation::new_with_seed(config, 5);
        sim.set_cell_alive(2, 2, None);
        sim.spawn(EntitySpec::projectile(Vec2::new(25.0, 25.0), Vec2::ZERO));

        let report = sim.step(0.0);
        assert_eq!(report.particles_spawned, 4);
        assert_eq!(sim.layer().len(), 4);
    }

    #[test]
    fn test_reproducibility() {
        let mut config = test_config();
        config.automaton.initial_density = 0.35;
        config.automaton.cadence = GenerationCadence::Timer { interval_secs: 0.1 };

        let mut a = Simulation::new_with_seed(config.clone(), 42);
        let mut b = Simulation::new_with_seed(config, 42);
        a.run(50, 0.1);
        b.run(50, 0.1);

        assert_eq!(a.grid().cells(), b.grid().cells());
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_reset() {
        let mut config = test_config();
        config.automaton.initial_density = 0.3;
        let mut sim = Simulation::new_with_seed(config, 6);
        sim.spawn(EntitySpec::agent(Vec2::new(10.0, 10.0), 5.0));
        sim.request_advance();
        sim.run(3, 0.1);

        sim.reset();
        assert_eq!(sim.steps, 0);
        assert_eq!(sim.grid().generation(), 0);
        assert!(sim.layer().is_empty());
        assert!(sim.grid().live_cell_count() > 0);
    }

    #[test]
    fn test_snapshot_json() {
        let mut sim = Simulation::new_with_seed(test_config(), 7);
        sim.set_cell_alive(1, 2, Some(90.0));
        sim.spawn(EntitySpec::agent(Vec2::new(10.0, 10.0), 5.0));

        let snapshot = sim.snapshot();
        assert_eq!(snapshot.cells, vec![CellView { x: 1, y: 2, age: 1, hue: 90.0 }]);
        assert_eq!(snapshot.entities.len(), 1);

        let json = snapshot.to_json().unwrap();
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_set_cadence() {
        let mut sim = Simulation::new_with_seed(test_config(), 8);
        sim.stamp_pattern(&crate::patterns::BLOCK, 2, 2);
        sim.set_cadence(GenerationCadence::KillCount { every: 2 }).unwrap();
        assert_eq!(sim.cadence(), GenerationCadence::KillCount { every: 2 });
        assert_eq!(sim.config.automaton.cadence, sim.cadence());
        sim.run(5, 1.0);
        assert_eq!(sim.grid().generation(), 0);
    }

    #[test]
    fn test_set_cadence_rejects_zero_interval() {
        let mut config = test_config();
        config.automaton.cadence = GenerationCadence::Timer { interval_secs: 0.5 };
        let mut sim = Simulation::new_with_seed(config, 8);

        let result = sim.set_cadence(GenerationCadence::Timer { interval_secs: 0.0 });
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        assert!(sim.set_cadence(GenerationCadence::KillCount { every: 0 }).is_err());

        // The previous timer keeps firing on schedule
        assert_eq!(sim.cadence(), GenerationCadence::Timer { interval_secs: 0.5 });
        sim.run(4, 0.5);
        assert_eq!(sim.grid().generation(), 4);
    }
}
