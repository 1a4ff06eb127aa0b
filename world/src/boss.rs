//! Omega summoner: a large boss that keeps four minion spawners busy.

use std::f32::consts::{FRAC_1_SQRT_2, PI};

use glam::Vec2;
use shape_arena_core::{
    AiState, ArenaBounds, BarrelDefinition, BulletDefinition, BulletKind, Color, EntityId,
    Relations,
};

use crate::{
    barrel::{self, Launch},
    entity::{AiUnit, Behavior, Entity},
    physics,
};

/// Display name of the boss.
pub(crate) const OMEGA_SUMMONER_NAME: &str = "Omega Summoner";
/// Nominal size the boss's size factor is measured against.
const OMEGA_SUMMONER_SIZE: f32 = 200.0;
const OMEGA_SUMMONER_HEALTH: f32 = 4_000.0;
const SPAWNER_COUNT: usize = 4;
/// Fraction of the AI's passive rotation applied each tick; slower than the
/// regular summoner to convey scale.
const ROTATION_SCALE: f32 = 0.5;
const MOVEMENT_SPEED: f32 = 0.5;
const VIEW_RANGE: f32 = 1_600.0;

/// Template shared by the boss's four spawners; only the angle differs.
pub(crate) const OMEGA_SUMMONER_BARREL: BarrelDefinition = BarrelDefinition {
    angle: PI,
    offset: 0.0,
    size: 175.0,
    width: 84.0,
    delay: 0.0,
    reload: 4.0,
    recoil: 1.0,
    is_trapezoid: true,
    trapezoid_direction: 0.0,
    drone_count: 1,
    can_control_drones: true,
    bullet: BulletDefinition {
        kind: BulletKind::Minion,
        size_ratio: 1.0,
        health: 20.0,
        damage: 4.0,
        speed: 0.7,
        scatter_rate: 1.0,
        life_length: Some(10.0),
        absorption_factor: 1.0,
        color: Color::EnemySquare,
        sides: 4,
    },
};

/// Builds a fresh boss at `position`.
pub(crate) fn create(id: EntityId, position: Vec2, passive_rotation: f32) -> Entity {
    let mut ai = AiUnit::new(passive_rotation);
    ai.view_range = VIEW_RANGE;
    ai.movement_speed = MOVEMENT_SPEED;

    let mut entity = Entity::new(id, Behavior::Boss, Relations::ARENA, ai);
    entity.name = Some(OMEGA_SUMMONER_NAME);
    entity.color = Color::EnemySquare;
    entity.position = position;
    entity.size = OMEGA_SUMMONER_SIZE * FRAC_1_SQRT_2;
    entity.sides = 4;
    entity.health = OMEGA_SUMMONER_HEALTH;
    entity.max_health = OMEGA_SUMMONER_HEALTH;
    entity.barrels = barrel::symmetric(OMEGA_SUMMONER_BARREL, SPAWNER_COUNT, entity.reload_time);
    entity
}

/// Runs the base update, then spins the boss unless it is possessed.
pub(crate) fn tick(entity: &mut Entity, tick: u64, bounds: &ArenaBounds, launches: &mut Vec<Launch>) {
    entity.aim = None;
    entity.movement_heading = match entity.ai.state {
        AiState::Idle => None,
        AiState::Active | AiState::Possessed => {
            physics::heading_toward(entity.position, entity.ai.inputs.mouse)
        }
    };

    physics::update(entity, bounds, launches);

    if entity.ai.state != AiState::Possessed {
        entity.angle += entity.ai.passive_rotation * ROTATION_SCALE;
    }

    tracing::trace!(
        target: "shape_arena::world",
        tick,
        boss = ?entity.id,
        angle = entity.angle,
        "boss ticked"
    );
}

/// Size relative to the nominal boss size, undoing the diagonal correction.
pub(crate) fn size_factor(size: f32) -> f32 {
    (size / FRAC_1_SQRT_2) / OMEGA_SUMMONER_SIZE
}
