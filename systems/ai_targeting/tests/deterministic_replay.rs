use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use glam::Vec2;
use shape_arena_core::{AiState, Command, EntityId, EntityKind, Event};
use shape_arena_system_ai_targeting::AiTargeting;
use shape_arena_world::{self as world, query, World};

#[test]
fn boss_and_minions_acquire_nearby_tank() {
    let mut world = World::new();
    let mut targeting = AiTargeting::new();
    let boss = spawn(&mut world, Command::SpawnBoss { position: Vec2::ZERO });
    let tank = spawn(
        &mut world,
        Command::SpawnTank {
            position: Vec2::new(600.0, 0.0),
        },
    );

    for _ in 0..3 {
        step(&mut world, &mut targeting);
    }

    let boss = query::entity(&world, boss).expect("boss alive");
    assert_eq!(boss.ai().state, AiState::Active);
    let tank_position = query::entity(&world, tank).expect("tank alive").position();
    assert_eq!(boss.ai().inputs.mouse, tank_position);

    let view = query::entity_view(&world);
    let minions: Vec<_> = view
        .iter()
        .filter(|snapshot| snapshot.kind == EntityKind::Minion)
        .collect();
    assert_eq!(minions.len(), 4);
    assert!(minions
        .iter()
        .all(|snapshot| snapshot.ai_state == AiState::Active));
}

#[test]
fn possessed_boss_keeps_external_control() {
    let mut world = World::new();
    let mut targeting = AiTargeting::new();
    let boss = spawn(&mut world, Command::SpawnBoss { position: Vec2::ZERO });
    let _ = spawn(
        &mut world,
        Command::SpawnTank {
            position: Vec2::new(100.0, 0.0),
        },
    );
    let mut events = Vec::new();
    world::apply(&mut world, Command::Possess { entity: boss }, &mut events);

    step(&mut world, &mut targeting);

    let boss = query::entity(&world, boss).expect("boss alive");
    assert_eq!(boss.ai().state, AiState::Possessed);
}

#[test]
fn deterministic_replay_produces_identical_assignments() {
    let first = replay();
    let second = replay();

    assert_eq!(first, second, "replay diverged between runs");
}

fn replay() -> u64 {
    let mut world = World::new();
    let mut targeting = AiTargeting::new();
    let _ = spawn(&mut world, Command::SpawnBoss { position: Vec2::ZERO });
    let _ = spawn(
        &mut world,
        Command::SpawnTank {
            position: Vec2::new(-700.0, 250.0),
        },
    );

    let mut hasher = DefaultHasher::new();
    for _ in 0..40 {
        let commands = step(&mut world, &mut targeting);
        for command in commands {
            if let Command::AssignAiTarget { entity, target } = command {
                entity.hash(&mut hasher);
                target
                    .map(|target| (target.x.to_bits(), target.y.to_bits()))
                    .hash(&mut hasher);
            }
        }
    }
    for snapshot in query::entity_view(&world).iter() {
        snapshot.id.hash(&mut hasher);
        snapshot.position.x.to_bits().hash(&mut hasher);
        snapshot.position.y.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

fn spawn(world: &mut World, command: Command) -> EntityId {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
        .iter()
        .find_map(|event| match event {
            Event::EntitySpawned { entity, .. } => Some(*entity),
            _ => None,
        })
        .expect("spawn confirmed")
}

fn step(world: &mut World, targeting: &mut AiTargeting) -> Vec<Command> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick, &mut events);

    let view = query::entity_view(world);
    let mut commands = Vec::new();
    targeting.handle(&view, &mut commands);
    for command in commands.iter().cloned() {
        world::apply(world, command, &mut events);
    }
    commands
}
