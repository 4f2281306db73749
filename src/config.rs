//! Configuration system for the simulation.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::cadence::GenerationCadence;
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub world: WorldConfig,
    pub automaton: AutomatonConfig,
    #[serde(default)]
    pub entities: EntityConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Lattice dimensions and the mapping between cells and world space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
    /// Side length of one cell in world units
    pub cell_size: f32,
}

/// Automaton seeding and advancement policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomatonConfig {
    /// Fraction of cells alive after seeding (0.0 - 1.0)
    pub initial_density: f32,
    /// When the grid advances a generation
    pub cadence: GenerationCadence,
}

/// Entity effects and interaction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Upper bound on live entities; effect particles are dropped beyond it
    pub max_entities: usize,
    /// Particles spawned where a cell is shot
    pub particles_per_kill: usize,
    /// Particle lifetime in seconds
    pub particle_lifetime: f32,
    /// Particle launch speed in world units per second
    pub particle_speed: f32,
    /// Drop an XP orb where an enemy dies
    pub reward_orb: bool,
    /// Collision radius of XP orbs
    pub orb_radius: f32,
    /// Seconds before an uncollected orb disappears
    pub orb_lifetime: Option<f32>,
    /// Health removed from each side when an enemy touches an agent
    pub contact_damage: f32,
}

/// Points awarded for interaction events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub points_per_cell: u64,
    pub points_per_enemy: u64,
    pub xp_per_orb: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Steps between stats history samples
    pub stats_interval: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            automaton: AutomatonConfig::default(),
            entities: EntityConfig::default(),
            scoring: ScoringConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 60,
            cell_size: 10.0,
        }
    }
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self {
            initial_density: 0.25,
            cadence: GenerationCadence::Timer { interval_secs: 0.2 },
        }
    }
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            max_entities: 2000,
            particles_per_kill: 4,
            particle_lifetime: 0.4,
            particle_speed: 60.0,
            reward_orb: true,
            orb_radius: 4.0,
            orb_lifetime: Some(10.0),
            contact_damage: 10.0,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            points_per_cell: 10,
            points_per_enemy: 50,
            xp_per_orb: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 60,
            log_level: "info".to_string(),
        }
    }
}

impl WorldConfig {
    /// World-space extent of the lattice
    pub fn extent(&self) -> (f32, f32) {
        (
            self.width as f32 * self.cell_size,
            self.height as f32 * self.cell_size,
        )
    }
}

impl LoggingConfig {
    /// Parsed `log_level`, usable as an `env_logger` default filter
    pub fn level_filter(&self) -> Option<log::LevelFilter> {
        self.log_level.parse().ok()
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.world.width == 0 || self.world.height == 0 {
            return Err(ConfigError::Invalid(
                "grid width and height must be > 0".to_string(),
            ));
        }
        if !(self.world.cell_size > 0.0) {
            return Err(ConfigError::Invalid("cell_size must be > 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.automaton.initial_density) {
            return Err(ConfigError::Invalid(
                "initial_density must be between 0.0 and 1.0".to_string(),
            ));
        }
        self.automaton
            .cadence
            .validate()
            .map_err(ConfigError::Invalid)?;
        if self.logging.stats_interval == 0 {
            return Err(ConfigError::Invalid("stats_interval must be > 0".to_string()));
        }
        if self.logging.level_filter().is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown log_level '{}'",
                self.logging.log_level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded = Config::from_yaml_str(&yaml).unwrap();
        assert_eq!(config.world.width, loaded.world.width);
        assert_eq!(config.automaton.cadence, loaded.automaton.cadence);
    }

    #[test]
    fn test_optional_sections_default() {
        let yaml = r#"
world:
  width: 20
  height: 10
  cell_size: 8.0
automaton:
  initial_density: 0.0
  cadence: !kill_count
    every: 5
"#;
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(config.world.extent(), (160.0, 80.0));
        assert_eq!(config.automaton.cadence, GenerationCadence::KillCount { every: 5 });
        assert_eq!(config.scoring.points_per_cell, 10);
    }

    #[test]
    fn test_rejects_zero_width() {
        let mut config = Config::default();
        config.world.width = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_bad_density() {
        let mut config = Config::default();
        config.automaton.initial_density = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut config = Config::default();
        assert_eq!(config.logging.level_filter(), Some(log::LevelFilter::Info));

        config.logging.log_level = "TRACE".to_string();
        assert_eq!(config.logging.level_filter(), Some(log::LevelFilter::Trace));

        config.logging.log_level = "loud".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_parse_error() {
        let err = Config::from_yaml_str("world: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
