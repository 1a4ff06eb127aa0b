#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative arena state for the shape arena simulation.
//!
//! The world owns every entity in a generational slot map and is mutated
//! exclusively through [`apply`]. Systems observe it through [`query`] and the
//! events `apply` emits.

mod barrel;
mod boss;
mod config;
mod drone;
mod entity;
mod minion;
mod physics;
mod shape;
mod tank;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use slotmap::SlotMap;
use shape_arena_core::{
    AiState, ArenaBounds, BulletKind, Command, EntityId, EntityKind, Event, InputFlags, Inputs,
    Relation,
};

pub use barrel::Barrel;
pub use config::{ArenaConfig, ConfigError};
pub use entity::{AiUnit, Behavior, Entity};
pub use minion::{arbitrate, band_heading, ControlSource, MinionState, FOCUS_RADIUS};

use barrel::Launch;
use entity::{ControllerSnapshot, PASSIVE_ROTATION};

/// Full width of the cone a barrel scatters its children across at a
/// scatter rate of one, in radians.
const SCATTER_SPREAD: f32 = 0.3;

/// Represents the authoritative arena state.
#[derive(Debug)]
pub struct World {
    config: ArenaConfig,
    bounds: ArenaBounds,
    entities: SlotMap<EntityId, Entity>,
    rng: ChaCha8Rng,
    tick_index: u64,
}

impl World {
    /// Creates an arena with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_validated(ArenaConfig::default())
    }

    /// Creates an arena described by `config`.
    pub fn with_config(config: ArenaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: ArenaConfig) -> Self {
        Self {
            bounds: config.bounds(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            entities: SlotMap::with_key(),
            tick_index: 0,
            config,
        }
    }

    fn passive_rotation(&mut self) -> f32 {
        if self.rng.gen_bool(0.5) {
            PASSIVE_ROTATION
        } else {
            -PASSIVE_ROTATION
        }
    }

    fn controller_of(&self, id: EntityId) -> Option<ControllerSnapshot> {
        let entity = self.entities.get(id)?;
        let controller = match entity.behavior {
            Behavior::Minion(state) => state.controller,
            _ => match entity.relations.owner {
                Relation::Entity(owner) => owner,
                Relation::Arena => return None,
            },
        };
        self.entities.get(controller).map(ControllerSnapshot::of)
    }

    fn advance(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });

        let mut launches = Vec::new();
        let ids: Vec<EntityId> = self.entities.keys().collect();
        for id in ids {
            let controller = self.controller_of(id);
            let Some(entity) = self.entities.get_mut(id) else {
                continue;
            };

            let behavior = entity.behavior;
            match behavior {
                Behavior::Shape(_) => shape::tick(entity, &self.bounds, &mut launches),
                Behavior::Boss => boss::tick(entity, self.tick_index, &self.bounds, &mut launches),
                Behavior::Minion(_) => {
                    minion::tick(entity, controller, &self.bounds, &mut launches)
                }
                Behavior::Drone | Behavior::Bullet => {
                    drone::tick(entity, controller, &self.bounds, &mut launches)
                }
                Behavior::Tank => tank::tick(entity, &self.bounds, &mut launches),
            }
        }

        self.launch_children(launches, out_events);

        let expired: Vec<EntityId> = self
            .entities
            .values()
            .filter(|entity| entity.lifetime == Some(0))
            .map(|entity| entity.id)
            .collect();
        for id in expired {
            self.destroy(id, out_events);
        }
    }

    fn launch_children(&mut self, launches: Vec<Launch>, out_events: &mut Vec<Event>) {
        for launch in launches {
            if !self.entities.contains_key(launch.parent) {
                continue;
            }

            let bullet = launch.definition.bullet;
            let scatter = (self.rng.gen::<f32>() - 0.5) * SCATTER_SPREAD * bullet.scatter_rate;
            let shoot_angle = launch.angle + scatter;
            let child = self.entities.insert_with_key(|id| match bullet.kind {
                BulletKind::Minion => minion::create(id, &launch, shoot_angle),
                BulletKind::Drone => barrel::projectile(id, &launch, shoot_angle, Behavior::Drone),
                BulletKind::Bullet => {
                    barrel::projectile(id, &launch, shoot_angle, Behavior::Bullet)
                }
            });

            if let Some(mount) = self
                .entities
                .get_mut(launch.parent)
                .and_then(|parent| parent.barrels.get_mut(launch.barrel_index))
            {
                mount.adopt(child);
            }

            if let Some(kind) = self.entities.get(child).map(|entity| entity.behavior.kind()) {
                out_events.push(Event::EntitySpawned {
                    entity: child,
                    kind,
                });
            }
        }
    }

    /// Removes the entity and, transitively, everything its barrels spawned.
    fn destroy(&mut self, root: EntityId, out_events: &mut Vec<Event>) {
        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            let Some(entity) = self.entities.remove(id) else {
                continue;
            };

            if let Some((parent, index)) = entity.spawned_by {
                if let Some(mount) = self
                    .entities
                    .get_mut(parent)
                    .and_then(|parent| parent.barrels.get_mut(index))
                {
                    mount.release(id);
                }
            }

            for mount in &entity.barrels {
                pending.extend(mount.children().iter().copied());
            }

            let kind = entity.behavior.kind();
            tracing::debug!(
                target: "shape_arena::world",
                entity = ?id,
                ?kind,
                tick = self.tick_index,
                "entity destroyed"
            );
            out_events.push(Event::EntityDestroyed { entity: id, kind });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => world.advance(out_events),
        Command::SpawnShape {
            slot,
            variant,
            position,
            score_reward,
        } => {
            let rotation = world.passive_rotation();
            let entity = world
                .entities
                .insert_with_key(|id| shape::create(id, variant, position, score_reward, rotation));
            out_events.push(Event::ShapeSpawned {
                slot,
                entity,
                variant,
            });
        }
        Command::SpawnBoss { position } => {
            let rotation = world.passive_rotation();
            let entity = world
                .entities
                .insert_with_key(|id| boss::create(id, position, rotation));
            tracing::info!(
                target: "shape_arena::world",
                entity = ?entity,
                x = position.x,
                y = position.y,
                "omega summoner spawned"
            );
            out_events.push(Event::EntitySpawned {
                entity,
                kind: EntityKind::Boss,
            });
        }
        Command::SpawnTank { position } => {
            let entity = world.entities.insert_with_key(|id| tank::create(id, position));
            out_events.push(Event::EntitySpawned {
                entity,
                kind: EntityKind::Tank,
            });
        }
        Command::SetInputs { entity, inputs } => {
            if let Some(entity) = world.entities.get_mut(entity) {
                entity.ai.inputs = inputs;
            }
        }
        Command::Possess { entity } => {
            if let Some(entity) = world.entities.get_mut(entity) {
                entity.ai.state = AiState::Possessed;
            }
        }
        Command::Release { entity } => {
            if let Some(entity) = world.entities.get_mut(entity) {
                entity.ai.state = AiState::Idle;
                entity.ai.inputs = Inputs::default();
            }
        }
        Command::AssignAiTarget { entity, target } => {
            let Some(entity) = world.entities.get_mut(entity) else {
                return;
            };
            if entity.ai.state == AiState::Possessed {
                return;
            }

            match target {
                Some(position) => {
                    entity.ai.state = AiState::Active;
                    entity.ai.inputs.mouse = position;
                    entity.ai.inputs.flags = InputFlags::SHOOT;
                }
                None => {
                    entity.ai.state = AiState::Idle;
                    entity.ai.inputs.flags = InputFlags::empty();
                }
            }
        }
        Command::DamageEntity { entity, amount } => {
            let Some(target) = world.entities.get_mut(entity) else {
                return;
            };
            target.health -= amount;
            if target.health <= 0.0 {
                world.destroy(entity, out_events);
            }
        }
        Command::DestroyEntity { entity } => world.destroy(entity, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use shape_arena_core::{
        ArenaView, EntityId, EntitySnapshot, EntityView, ShapeSnapshot, ShapeView,
    };

    use super::{Behavior, Entity, World};

    /// Number of ticks simulated so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Arena context consumed by the population manager.
    #[must_use]
    pub fn arena_view(world: &World) -> ArenaView {
        ArenaView {
            bounds: world.bounds,
            shape_score_reward_multiplier: world.config.shape_score_reward_multiplier,
        }
    }

    /// Captures every live ambient shape.
    #[must_use]
    pub fn shape_view(world: &World) -> ShapeView {
        let snapshots = world
            .entities
            .values()
            .filter_map(|entity| match entity.behavior {
                Behavior::Shape(variant) => Some(ShapeSnapshot {
                    id: entity.id,
                    variant,
                    position: entity.position,
                }),
                _ => None,
            })
            .collect();
        ShapeView::from_snapshots(snapshots)
    }

    /// Captures every live entity.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        let snapshots = world
            .entities
            .values()
            .map(|entity| EntitySnapshot {
                id: entity.id,
                kind: entity.behavior.kind(),
                position: entity.position,
                angle: entity.angle,
                relations: entity.relations,
                ai_state: entity.ai.state,
                view_range: entity.ai.view_range,
            })
            .collect();
        EntityView::from_snapshots(snapshots)
    }

    /// Retrieves a live entity; stale identifiers yield `None`.
    #[must_use]
    pub fn entity(world: &World, id: EntityId) -> Option<&Entity> {
        world.entities.get(id)
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(world: &World) -> usize {
        world.entities.len()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::hash_map::DefaultHasher,
        hash::{Hash, Hasher},
    };

    use super::*;
    use glam::Vec2;
    use shape_arena_core::{RosterIndex, ShapeKind, ShapeVariant};

    fn spawn_boss(world: &mut World) -> EntityId {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnBoss {
                position: Vec2::ZERO,
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::EntitySpawned { entity, .. }] => *entity,
            other => panic!("unexpected events: {other:?}"),
        }
    }

    fn tick(world: &mut World) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::Tick, &mut events);
        events
    }

    fn count_kind(world: &World, kind: EntityKind) -> usize {
        query::entity_view(world)
            .iter()
            .filter(|snapshot| snapshot.kind == kind)
            .count()
    }

    #[test]
    fn spawn_shape_reports_slot_and_variant() {
        let mut world = World::new();
        let mut events = Vec::new();
        let variant = ShapeVariant::plain(ShapeKind::Octagon);

        apply(
            &mut world,
            Command::SpawnShape {
                slot: RosterIndex::new(7),
                variant,
                position: Vec2::new(10.0, -10.0),
                score_reward: 1_000.0,
            },
            &mut events,
        );

        let [Event::ShapeSpawned {
            slot,
            entity,
            variant: spawned,
        }] = events.as_slice()
        else {
            panic!("unexpected events: {events:?}");
        };
        assert_eq!(*slot, RosterIndex::new(7));
        assert_eq!(*spawned, variant);
        assert!(query::shape_view(&world).contains(*entity));
        let shape = query::entity(&world, *entity).expect("shape is live");
        assert_eq!(shape.score_reward(), 1_000.0);
        assert_eq!(shape.ai().passive_rotation.abs(), PASSIVE_ROTATION);
    }

    #[test]
    fn boss_keeps_one_minion_per_spawner() {
        let mut world = World::new();
        let boss = spawn_boss(&mut world);

        let first = tick(&mut world);
        let minions: Vec<EntityId> = first
            .iter()
            .filter_map(|event| match event {
                Event::EntitySpawned {
                    entity,
                    kind: EntityKind::Minion,
                } => Some(*entity),
                _ => None,
            })
            .collect();
        assert_eq!(minions.len(), 4);

        for _ in 0..100 {
            let _ = tick(&mut world);
        }

        assert_eq!(count_kind(&world, EntityKind::Minion), 4);
        for minion in minions {
            let minion = query::entity(&world, minion).expect("minion still alive");
            assert_eq!(minion.relations().owner, Relation::Entity(boss));
            assert!(matches!(
                minion.behavior(),
                Behavior::Minion(MinionState { controller, .. }) if *controller == boss
            ));
        }
        let boss = query::entity(&world, boss).expect("boss alive");
        assert!(boss
            .barrels()
            .iter()
            .all(|mount| mount.children().len() == 1));
    }

    #[test]
    fn minions_spawn_their_own_drones() {
        let mut world = World::new();
        let _ = spawn_boss(&mut world);

        for _ in 0..3 {
            let _ = tick(&mut world);
        }

        assert_eq!(count_kind(&world, EntityKind::Drone), 4 * 4);
    }

    #[test]
    fn expired_minion_is_replaced() {
        let mut world = World::new();
        let _ = spawn_boss(&mut world);

        let mut minions_spawned = 0;
        let mut minions_expired = 0;
        for _ in 0..300 {
            for event in tick(&mut world) {
                match event {
                    Event::EntitySpawned {
                        kind: EntityKind::Minion,
                        ..
                    } => minions_spawned += 1,
                    Event::EntityDestroyed {
                        kind: EntityKind::Minion,
                        ..
                    } => minions_expired += 1,
                    _ => {}
                }
            }
        }

        assert_eq!(minions_expired, 4);
        assert_eq!(minions_spawned, 8);
        assert_eq!(count_kind(&world, EntityKind::Minion), 4);
    }

    #[test]
    fn destroying_boss_cascades_to_everything_it_spawned() {
        let mut world = World::new();
        let boss = spawn_boss(&mut world);
        for _ in 0..3 {
            let _ = tick(&mut world);
        }
        let population = query::entity_count(&world);
        assert_eq!(population, 1 + 4 + 16);

        let mut events = Vec::new();
        apply(&mut world, Command::DestroyEntity { entity: boss }, &mut events);

        assert_eq!(events.len(), population);
        assert_eq!(query::entity_count(&world), 0);
    }

    #[test]
    fn stale_identifiers_are_ignored() {
        let mut world = World::new();
        let boss = spawn_boss(&mut world);
        let mut events = Vec::new();
        apply(&mut world, Command::DestroyEntity { entity: boss }, &mut events);
        events.clear();

        apply(&mut world, Command::DestroyEntity { entity: boss }, &mut events);
        apply(
            &mut world,
            Command::DamageEntity {
                entity: boss,
                amount: 1.0,
            },
            &mut events,
        );

        assert!(events.is_empty());
    }

    #[test]
    fn freed_slots_do_not_revive_stale_identifiers() {
        let mut world = World::new();
        let boss = spawn_boss(&mut world);
        let mut events = Vec::new();
        apply(&mut world, Command::DestroyEntity { entity: boss }, &mut events);
        apply(
            &mut world,
            Command::SpawnTank {
                position: Vec2::ZERO,
            },
            &mut events,
        );

        let [_, Event::EntitySpawned { entity: tank, .. }] = events.as_slice() else {
            panic!("unexpected events: {events:?}");
        };
        assert_ne!(*tank, boss);
        assert!(query::entity(&world, boss).is_none());
        assert_eq!(query::entity_count(&world), 1);
    }

    #[test]
    fn minions_drift_when_their_controller_vanishes() {
        let mut world = World::new();
        let boss = spawn_boss(&mut world);
        let _ = tick(&mut world);
        let minions: Vec<EntityId> = query::entity_view(&world)
            .iter()
            .filter(|snapshot| snapshot.kind == EntityKind::Minion)
            .map(|snapshot| snapshot.id)
            .collect();
        assert_eq!(minions.len(), 4);

        // Skip the cascade so the minions outlive their controller.
        let _ = world.entities.remove(boss);
        let mut events = Vec::new();
        for minion in &minions {
            let target = query::entity(&world, *minion).map(Entity::position);
            apply(
                &mut world,
                Command::AssignAiTarget {
                    entity: *minion,
                    target,
                },
                &mut events,
            );
        }
        let _ = tick(&mut world);

        for minion in minions {
            let minion = query::entity(&world, minion).expect("orphaned minion survives");
            assert!(matches!(
                minion.behavior(),
                Behavior::Minion(MinionState {
                    control: ControlSource::AiIdle,
                    ..
                })
            ));
            let heading = minion.movement_heading().expect("idle drift keeps a heading");
            assert!((minion.angle() - 0.5 * 0.05 - heading).abs() < 1e-5);
        }
    }

    #[test]
    fn damage_destroys_entity_when_health_runs_out() {
        let mut world = World::new();
        let boss = spawn_boss(&mut world);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::DamageEntity {
                entity: boss,
                amount: 3_999.0,
            },
            &mut events,
        );
        assert!(events.is_empty());

        apply(
            &mut world,
            Command::DamageEntity {
                entity: boss,
                amount: 1.0,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::EntityDestroyed {
                entity: boss,
                kind: EntityKind::Boss,
            }]
        );
    }

    #[test]
    fn possessed_entity_ignores_ai_targets() {
        let mut world = World::new();
        let boss = spawn_boss(&mut world);
        let mut events = Vec::new();

        apply(&mut world, Command::Possess { entity: boss }, &mut events);
        apply(
            &mut world,
            Command::AssignAiTarget {
                entity: boss,
                target: Some(Vec2::new(50.0, 50.0)),
            },
            &mut events,
        );
        assert_eq!(
            query::entity(&world, boss).map(|boss| boss.ai().state),
            Some(AiState::Possessed)
        );

        apply(&mut world, Command::Release { entity: boss }, &mut events);
        apply(
            &mut world,
            Command::AssignAiTarget {
                entity: boss,
                target: Some(Vec2::new(50.0, 50.0)),
            },
            &mut events,
        );
        let ai = query::entity(&world, boss).map(|boss| *boss.ai());
        assert_eq!(ai.map(|ai| ai.state), Some(AiState::Active));
        assert_eq!(ai.map(|ai| ai.inputs.mouse), Some(Vec2::new(50.0, 50.0)));
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let config = ArenaConfig {
            half_extent: -1.0,
            ..ArenaConfig::default()
        };
        assert!(matches!(
            World::with_config(config),
            Err(ConfigError::InvalidExtent(_))
        ));
    }

    #[test]
    fn replay_is_deterministic_for_same_seed() {
        fn run() -> u64 {
            let mut world = World::new();
            let _ = spawn_boss(&mut world);
            let mut hasher = DefaultHasher::new();
            for _ in 0..60 {
                tick(&mut world).hash(&mut hasher);
            }
            for snapshot in query::entity_view(&world).iter() {
                snapshot.id.hash(&mut hasher);
                snapshot.position.x.to_bits().hash(&mut hasher);
                snapshot.position.y.to_bits().hash(&mut hasher);
                snapshot.angle.to_bits().hash(&mut hasher);
            }
            hasher.finish()
        }

        assert_eq!(run(), run());
    }
}
