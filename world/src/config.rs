//! Arena configuration loaded by adapters.

use serde::Deserialize;
use shape_arena_core::ArenaBounds;
use thiserror::Error;

const DEFAULT_HALF_EXTENT: f32 = 11_150.0;
const DEFAULT_SEED: u64 = 0x5eed_a7e4_a000_0001;

/// Tunables describing the arena the world simulates.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaConfig {
    /// Distance from the arena centre to each edge, in arena units.
    pub half_extent: f32,
    /// Multiplier applied to every shape's score reward at spawn time.
    pub shape_score_reward_multiplier: f32,
    /// Seed for the world's own random stream (barrel scatter, AI rotation sign).
    pub seed: u64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            half_extent: DEFAULT_HALF_EXTENT,
            shape_score_reward_multiplier: 1.0,
            seed: DEFAULT_SEED,
        }
    }
}

impl ArenaConfig {
    /// Checks that the configuration describes a usable arena.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.half_extent.is_finite() || self.half_extent <= 0.0 {
            return Err(ConfigError::InvalidExtent(self.half_extent));
        }

        if !self.shape_score_reward_multiplier.is_finite()
            || self.shape_score_reward_multiplier < 0.0
        {
            return Err(ConfigError::InvalidRewardMultiplier(
                self.shape_score_reward_multiplier,
            ));
        }

        Ok(())
    }

    /// Bounds of the arena described by the configuration.
    #[must_use]
    pub fn bounds(&self) -> ArenaBounds {
        ArenaBounds::centered(self.half_extent)
    }
}

/// Reasons an [`ArenaConfig`] may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The half extent was not a positive finite number.
    #[error("arena half extent must be positive and finite, got {0}")]
    InvalidExtent(f32),
    /// The reward multiplier was negative or not finite.
    #[error("shape score reward multiplier must be non-negative and finite, got {0}")]
    InvalidRewardMultiplier(f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        assert_eq!(ArenaConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_degenerate_extent() {
        let config = ArenaConfig {
            half_extent: 0.0,
            ..ArenaConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidExtent(0.0)));
    }

    #[test]
    fn rejects_negative_multiplier() {
        let config = ArenaConfig {
            shape_score_reward_multiplier: -1.0,
            ..ArenaConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidRewardMultiplier(-1.0))
        );
    }
}
