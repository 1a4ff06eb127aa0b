//! Tick loop wiring the world to its systems.

use shape_arena_core::{Command, EntityKind, Event};
use shape_arena_system_ai_targeting::AiTargeting;
use shape_arena_system_population::{Config as PopulationConfig, PopulationManager};
use shape_arena_world::{self as world, query, ArenaConfig, ConfigError, World};

use crate::config::{PopulationSettings, ScenarioSettings};

/// Counts reported after a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) tick: u64,
    pub(crate) entities: usize,
    pub(crate) shapes: usize,
    pub(crate) alpha_pentagons: usize,
    pub(crate) minions: usize,
    pub(crate) drones: usize,
}

/// World plus the systems that react to its events.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    population: PopulationManager,
    targeting: AiTargeting,
    kill_all_interval: u64,
}

impl Simulation {
    pub(crate) fn new(
        arena: ArenaConfig,
        population: PopulationSettings,
        scenario: &ScenarioSettings,
    ) -> Result<Self, ConfigError> {
        let mut simulation = Self {
            world: World::with_config(arena)?,
            population: PopulationManager::new(PopulationConfig::new(
                population.wanted_shapes,
                population.seed,
            )),
            targeting: AiTargeting::new(),
            kill_all_interval: scenario.kill_all_interval,
        };

        let mut commands: Vec<Command> = scenario
            .bosses
            .iter()
            .map(|position| Command::SpawnBoss {
                position: *position,
            })
            .collect();
        commands.extend(scenario.tanks.iter().map(|position| Command::SpawnTank {
            position: *position,
        }));
        let events = simulation.apply_all(commands);
        simulation.pump(events);

        Ok(simulation)
    }

    /// Runs one full tick: world update, AI targeting, then population upkeep.
    pub(crate) fn step(&mut self) {
        let events = self.apply_all(vec![Command::Tick]);

        let view = query::entity_view(&self.world);
        let mut assignments = Vec::new();
        self.targeting.handle(&view, &mut assignments);
        let mut events = [events, self.apply_all(assignments)].concat();

        let tick = query::tick_index(&self.world);
        if self.kill_all_interval > 0 && tick % self.kill_all_interval == 0 {
            let mut wipes = Vec::new();
            self.population.kill_all(&mut wipes);
            tracing::info!(
                target: "shape_arena::cli",
                tick,
                shapes = wipes.len(),
                "killing all ambient shapes"
            );
            events.extend(self.apply_all(wipes));
        }

        self.pump(events);
    }

    pub(crate) fn summary(&self) -> Summary {
        let shapes = query::shape_view(&self.world);
        let view = query::entity_view(&self.world);
        let count = |kind: EntityKind| view.iter().filter(|snapshot| snapshot.kind == kind).count();

        Summary {
            tick: query::tick_index(&self.world),
            entities: query::entity_count(&self.world),
            shapes: shapes.len(),
            alpha_pentagons: shapes.alpha_pentagon_count(),
            minions: count(EntityKind::Minion),
            drones: count(EntityKind::Drone),
        }
    }

    fn apply_all(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        events
    }

    fn pump(&mut self, pending_events: Vec<Event>) {
        let mut events = pending_events;
        loop {
            if events.is_empty() {
                break;
            }

            let arena = query::arena_view(&self.world);
            let shapes = query::shape_view(&self.world);
            let mut commands = Vec::new();
            self.population
                .handle(&events, &arena, &shapes, &mut commands);

            if commands.is_empty() {
                break;
            }

            events = self.apply_all(commands);
        }
    }
}
