//! Generation cadence - when the automaton advances.
//!
//! Pure viewers advance on a timer, the shooter variant advances every N kills.
//! Both are expressed as a policy the simulation consults once per step.

use serde::{Deserialize, Serialize};

/// Policy deciding when the grid advances one generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationCadence {
    /// Only on explicit request
    Manual,
    /// Every `interval_secs` of simulated time
    Timer { interval_secs: f32 },
    /// Every `every` cells killed by entities
    KillCount { every: u32 },
    /// Whichever of the timer or kill threshold fires first
    Hybrid { interval_secs: f32, every: u32 },
}

impl Default for GenerationCadence {
    fn default() -> Self {
        Self::Timer { interval_secs: 0.2 }
    }
}

impl GenerationCadence {
    /// Check that intervals and thresholds are positive
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Self::Manual => Ok(()),
            Self::Timer { interval_secs } => check_interval(interval_secs),
            Self::KillCount { every } => check_every(every),
            Self::Hybrid {
                interval_secs,
                every,
            } => check_interval(interval_secs).and_then(|_| check_every(every)),
        }
    }

    fn interval(&self) -> Option<f32> {
        match *self {
            Self::Timer { interval_secs } | Self::Hybrid { interval_secs, .. } => {
                Some(interval_secs)
            }
            _ => None,
        }
    }

    fn kill_threshold(&self) -> Option<u32> {
        match *self {
            Self::KillCount { every } | Self::Hybrid { every, .. } => Some(every),
            _ => None,
        }
    }
}

fn check_interval(interval_secs: f32) -> Result<(), String> {
    if interval_secs > 0.0 {
        Ok(())
    } else {
        Err("cadence interval_secs must be > 0".to_string())
    }
}

fn check_every(every: u32) -> Result<(), String> {
    if every > 0 {
        Ok(())
    } else {
        Err("cadence kill threshold must be > 0".to_string())
    }
}

/// Running counters for a cadence policy
#[derive(Debug, Clone, Default)]
pub struct CadenceClock {
    policy: GenerationCadence,
    elapsed: f32,
    kills: u32,
}

impl CadenceClock {
    pub fn new(policy: GenerationCadence) -> Self {
        Self {
            policy,
            elapsed: 0.0,
            kills: 0,
        }
    }

    pub fn policy(&self) -> GenerationCadence {
        self.policy
    }

    /// Swap the policy, keeping accumulated counters
    pub fn set_policy(&mut self, policy: GenerationCadence) {
        self.policy = policy;
    }

    /// Accumulate `dt` seconds and `kills`, returning true when a generation is due.
    ///
    /// At most one generation is reported per call; leftover time carries over.
    pub fn due(&mut self, dt: f32, kills: u32) -> bool {
        self.elapsed += dt.max(0.0);
        self.kills = self.kills.saturating_add(kills);

        let mut fire = false;

        if let Some(interval) = self.policy.interval() {
            if self.elapsed >= interval {
                self.elapsed -= interval;
                // Don't let a long stall queue up a burst of generations
                if self.elapsed >= interval {
                    self.elapsed %= interval;
                }
                fire = true;
            }
        }

        if let Some(every) = self.policy.kill_threshold() {
            if self.kills >= every {
                self.kills -= every;
                fire = true;
            }
        }

        fire
    }

    /// Reset counters
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.kills = 0;
    }

    pub fn pending_kills(&self) -> u32 {
        self.kills
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_never_fires() {
        let mut clock = CadenceClock::new(GenerationCadence::Manual);
        for _ in 0..100 {
            assert!(!clock.due(1.0, 10));
        }
    }

    #[test]
    fn test_timer_fires_on_interval() {
        let mut clock = CadenceClock::new(GenerationCadence::Timer { interval_secs: 0.2 });
        assert!(!clock.due(0.1, 0));
        assert!(clock.due(0.1, 0));
        assert!(!clock.due(0.05, 0));
        assert!(clock.due(0.2, 0));
    }

    #[test]
    fn test_timer_does_not_burst_after_stall() {
        let mut clock = CadenceClock::new(GenerationCadence::Timer { interval_secs: 0.2 });
        assert!(clock.due(5.0, 0));
        assert!(!clock.due(0.0, 0));
    }

    #[test]
    fn test_kill_count() {
        let mut clock = CadenceClock::new(GenerationCadence::KillCount { every: 3 });
        assert!(!clock.due(10.0, 2));
        assert!(clock.due(0.0, 1));
        assert_eq!(clock.pending_kills(), 0);
        assert!(!clock.due(0.0, 2));
        assert!(clock.due(0.0, 2));
        assert_eq!(clock.pending_kills(), 1);
    }

    #[test]
    fn test_hybrid_either_trigger() {
        let mut clock = CadenceClock::new(GenerationCadence::Hybrid {
            interval_secs: 1.0,
            every: 5,
        });
        assert!(clock.due(0.0, 5));
        assert!(clock.due(1.0, 0));
        assert!(!clock.due(0.5, 4));
    }

    #[test]
    fn test_validate() {
        assert!(GenerationCadence::Timer { interval_secs: 0.0 }.validate().is_err());
        assert!(GenerationCadence::KillCount { every: 0 }.validate().is_err());
        assert!(GenerationCadence::Manual.validate().is_ok());
    }
}
