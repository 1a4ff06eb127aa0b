//! Externally steered tanks.

use glam::Vec2;
use shape_arena_core::{ArenaBounds, Color, EntityId, Relation, Relations};

use crate::{
    barrel::Launch,
    entity::{AiUnit, Behavior, Entity},
    physics,
};

const TANK_SIZE: f32 = 50.0;
const TANK_HEALTH: f32 = 50.0;
const AIM_SPEED: f32 = 0.3;

/// Builds a tank on its own team.
pub(crate) fn create(id: EntityId, position: Vec2) -> Entity {
    let mut ai = AiUnit::new(0.0);
    ai.aim_speed = AIM_SPEED;
    let relations = Relations {
        team: Relation::Entity(id),
        owner: Relation::Arena,
    };

    let mut entity = Entity::new(id, Behavior::Tank, relations, ai);
    entity.position = position;
    entity.size = TANK_SIZE;
    entity.health = TANK_HEALTH;
    entity.max_health = TANK_HEALTH;
    entity.color = Color::TankBlue;
    entity
}

/// Turns toward the pointer; tanks only move when something pushes them.
pub(crate) fn tick(entity: &mut Entity, bounds: &ArenaBounds, launches: &mut Vec<Launch>) {
    entity.movement_heading = None;
    entity.aim = Some(entity.ai.inputs.mouse);
    physics::update(entity, bounds, launches);
}
