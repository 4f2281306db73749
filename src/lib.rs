//! # life_invaders
//!
//! Game of Life automaton with ancestry tracking, driven alongside a real-time
//! layer of projectiles, particles, agents and enemies that shoot cells and
//! each other.
//!
//! ## Features
//!
//! - **Double-buffered**: generations never read partially-updated state
//! - **Ancestry**: every cell carries an age and an inherited lineage hue
//! - **Dead exterior**: no wraparound at the lattice edges
//! - **Pluggable cadence**: timer, every-N-kills, hybrid or manual advancement
//! - **Reproducible**: seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust
//! use life_invaders::{Config, Simulation, EntitySpec, Vec2};
//!
//! let mut config = Config::default();
//! config.automaton.initial_density = 0.3;
//!
//! let mut sim = Simulation::new_with_seed(config, 42);
//! sim.spawn(EntitySpec::projectile(Vec2::new(5.0, 5.0), Vec2::new(0.0, 200.0)));
//!
//! for _ in 0..60 {
//!     sim.step(1.0 / 60.0);
//! }
//!
//! println!("{}", sim.stats.summary());
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use life_invaders::{Config, GenerationCadence};
//!
//! let mut config = Config::default();
//! config.world.width = 120;
//! config.automaton.cadence = GenerationCadence::KillCount { every: 10 };
//! assert!(config.validate().is_ok());
//! ```

pub mod cadence;
pub mod config;
pub mod entity;
pub mod error;
pub mod grid;
pub mod interaction;
pub mod patterns;
pub mod spatial;
pub mod stats;
pub mod world;

// Re-export main types
pub use cadence::GenerationCadence;
pub use config::Config;
pub use entity::{Bounds, Entity, EntityKind, EntitySpec, Vec2};
pub use error::ConfigError;
pub use grid::{AutomatonGrid, Cell};
pub use interaction::InteractionLayer;
pub use world::{Simulation, SimulationStatus};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick benchmark of pure automaton stepping
pub fn benchmark(generations: u64, width: usize, height: usize) -> BenchmarkResult {
    use std::time::Instant;

    let mut config = Config::default();
    config.world.width = width;
    config.world.height = height;
    config.automaton.initial_density = 0.3;
    config.automaton.cadence = GenerationCadence::Manual;

    let mut sim = Simulation::new_with_seed(config, 0);
    let initial_live = sim.grid().live_cell_count();

    let start = Instant::now();
    for _ in 0..generations {
        sim.advance_generation();
    }
    let elapsed = start.elapsed();

    BenchmarkResult {
        generations,
        cells: width * height,
        initial_live,
        final_live: sim.grid().live_cell_count(),
        elapsed_secs: elapsed.as_secs_f64(),
        generations_per_second: generations as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
    }
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub generations: u64,
    pub cells: usize,
    pub initial_live: usize,
    pub final_live: usize,
    pub elapsed_secs: f64,
    pub generations_per_second: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Generations: {}", self.generations)?;
        writeln!(f, "Cells: {}", self.cells)?;
        writeln!(f, "Live: {} -> {}", self.initial_live, self.final_live)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} generations/s", self.generations_per_second)?;
        Ok(())
    }
}
