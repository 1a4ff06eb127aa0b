//! Runner configuration loaded from TOML.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use glam::Vec2;
use serde::Deserialize;
use shape_arena_core::DEFAULT_WANTED_SHAPES;
use shape_arena_world::ArenaConfig;

const DEFAULT_POPULATION_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// Everything the headless runner needs to build a simulation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RunnerConfig {
    pub(crate) arena: ArenaConfig,
    pub(crate) population: PopulationSettings,
    pub(crate) scenario: ScenarioSettings,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PopulationSettings {
    pub(crate) wanted_shapes: usize,
    pub(crate) seed: u64,
}

impl Default for PopulationSettings {
    fn default() -> Self {
        Self {
            wanted_shapes: DEFAULT_WANTED_SHAPES,
            seed: DEFAULT_POPULATION_SEED,
        }
    }
}

/// Non-ambient entities placed before the first tick.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ScenarioSettings {
    pub(crate) bosses: Vec<Vec2>,
    pub(crate) tanks: Vec<Vec2>,
    /// Ticks between population wipes; zero disables them.
    pub(crate) kill_all_interval: u64,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            bosses: vec![Vec2::ZERO],
            tanks: vec![Vec2::new(1_200.0, 0.0)],
            kill_all_interval: 0,
        }
    }
}

impl RunnerConfig {
    /// Reads and validates a configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("invalid config at {}", path.display()))?;
        Ok(config)
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse TOML")?;
        config.arena.validate()?;
        Ok(config)
    }
}
