//! Statistics tracking for the simulation.

use crate::entity::EntityKind;
use crate::grid::{AutomatonGrid, GenerationReport};
use crate::interaction::InteractionLayer;
use serde::{Deserialize, Serialize};

/// Statistics snapshot for a simulation step
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Simulated seconds
    pub time: f64,
    /// Steps executed
    pub steps: u64,
    /// Automaton generation
    pub generation: u64,
    /// Live cells on the grid
    pub live_cells: usize,
    /// Cells born in the last generation
    pub born: usize,
    /// Cells that died in the last generation
    pub died: usize,
    /// Mean age of live cells
    pub mean_cell_age: f32,
    /// Oldest live cell
    pub max_cell_age: u32,
    /// Active entities of every kind
    pub entities: usize,
    pub projectiles: usize,
    pub enemies: usize,
    pub agents: usize,
    pub score: u64,
    pub cells_killed: u64,
    pub enemies_killed: u64,
    pub xp: u64,
}

impl Stats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Update stats from current simulation state
    pub fn update(&mut self, grid: &AutomatonGrid, layer: &InteractionLayer) {
        self.generation = grid.generation();

        let mut live = 0usize;
        let mut age_sum = 0u64;
        let mut age_max = 0u32;
        for cell in grid.cells().iter().filter(|c| c.alive) {
            live += 1;
            age_sum += u64::from(cell.age);
            age_max = age_max.max(cell.age);
        }
        self.live_cells = live;
        self.max_cell_age = age_max;
        self.mean_cell_age = if live > 0 {
            age_sum as f32 / live as f32
        } else {
            0.0
        };

        self.entities = layer.len();
        self.projectiles = layer.count_kind(EntityKind::Projectile);
        self.enemies = layer.count_kind(EntityKind::Enemy);
        self.agents = layer.count_kind(EntityKind::Agent);

        let score = layer.score();
        self.score = score.score;
        self.cells_killed = score.cells_killed;
        self.enemies_killed = score.enemies_killed;
        self.xp = score.xp_collected;
    }

    /// Record births and deaths from the latest generation
    pub fn record_generation(&mut self, report: &GenerationReport) {
        self.born = report.born;
        self.died = report.died;
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            concat!(
                "T:{:8.2} | Gen:{:5} | Live:{:5} (+{} -{}) | Age:{:.1}/{} | ",
                "Ent:{:4} | Score:{} | Kills:{}/{}",
            ),
            self.time,
            self.generation,
            self.live_cells,
            self.born,
            self.died,
            self.mean_cell_age,
            self.max_cell_age,
            self.entities,
            self.score,
            self.cells_killed,
            self.enemies_killed,
        )
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// All recorded stats snapshots
    pub snapshots: Vec<Stats>,
    /// Recording interval in steps
    pub interval: u64,
}

impl StatsHistory {
    /// Create new history with recording interval
    pub fn new(interval: u64) -> Self {
        Self {
            snapshots: Vec::new(),
            interval,
        }
    }

    /// Record a stats snapshot
    pub fn record(&mut self, stats: Stats) {
        self.snapshots.push(stats);
    }

    /// Whether a snapshot is due at `step`
    pub fn is_due(&self, step: u64) -> bool {
        self.interval > 0 && step % self.interval == 0
    }

    /// Live cell count over generations
    pub fn live_cell_series(&self) -> Vec<(u64, usize)> {
        self.snapshots
            .iter()
            .map(|s| (s.generation, s.live_cells))
            .collect()
    }

    /// Score over steps
    pub fn score_series(&self) -> Vec<(u64, u64)> {
        self.snapshots.iter().map(|s| (s.steps, s.score)).collect()
    }

    /// Serialize the history for an external plotting or rendering tool
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Bounds, EntitySpec, Vec2};
    use crate::interaction::InteractionRules;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_stats_update() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut grid = AutomatonGrid::new(10, 10, &mut rng);
        grid.set_alive(1, 1, None);
        grid.set_alive(2, 1, None);
        grid.set_alive(1, 2, None);
        grid.set_alive(2, 2, None);
        grid.advance_generation(&mut rng);

        let bounds = Bounds::from_size(100.0, 100.0);
        let mut layer = InteractionLayer::new(bounds, 10.0, InteractionRules::default());
        layer.spawn(EntitySpec::enemy(Vec2::new(80.0, 80.0), Vec2::ZERO, 5.0));
        layer.spawn(EntitySpec::projectile(Vec2::new(50.0, 50.0), Vec2::ZERO));

        let mut stats = Stats::new();
        stats.update(&grid, &layer);

        assert_eq!(stats.generation, 1);
        assert_eq!(stats.live_cells, 4);
        assert_eq!(stats.max_cell_age, 2);
        assert!((stats.mean_cell_age - 2.0).abs() < 1e-6);
        assert_eq!(stats.entities, 2);
        assert_eq!(stats.enemies, 1);
        assert_eq!(stats.projectiles, 1);
    }

    #[test]
    fn test_empty_grid_stats() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let grid = AutomatonGrid::new(4, 4, &mut rng);
        let layer =
            InteractionLayer::new(Bounds::from_size(40.0, 40.0), 10.0, InteractionRules::default());

        let mut stats = Stats::new();
        stats.update(&grid, &layer);
        assert_eq!(stats.live_cells, 0);
        assert_eq!(stats.mean_cell_age, 0.0);
        assert!(stats.summary().contains("Live:    0"));
    }

    #[test]
    fn test_stats_history() {
        let mut history = StatsHistory::new(10);
        assert!(history.is_due(20));
        assert!(!history.is_due(25));

        for i in 0..5u64 {
            let mut stats = Stats::new();
            stats.generation = i * 10;
            stats.steps = i * 10;
            stats.live_cells = (i + 1) as usize * 100;
            stats.score = i * 5;
            history.record(stats);
        }

        let series = history.live_cell_series();
        assert_eq!(series.len(), 5);
        assert_eq!(series[0], (0, 100));
        assert_eq!(series[4], (40, 500));
        assert_eq!(history.score_series()[2], (20, 10));

        let json = history.to_json().unwrap();
        let loaded: StatsHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.snapshots.len(), 5);
    }
}
