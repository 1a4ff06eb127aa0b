//! Ambient polygons owned by the arena.

use glam::Vec2;
use shape_arena_core::{AiState, ArenaBounds, EntityId, Relations, ShapeKind, ShapeVariant};

use crate::{
    barrel::Launch,
    entity::{AiUnit, Behavior, Entity},
    physics,
};

const DRIFT_SPEED: f32 = 0.05;
const CRASHER_VIEW_RANGE: f32 = 2_000.0;
const CRASHER_SPEED: f32 = 1.2;
const BIG_CRASHER_SPEED: f32 = 0.8;

/// Builds a roster shape with its profile stats and the scaled reward.
pub(crate) fn create(
    id: EntityId,
    variant: ShapeVariant,
    position: Vec2,
    score_reward: f32,
    passive_rotation: f32,
) -> Entity {
    let profile = variant.profile();
    let mut ai = AiUnit::new(passive_rotation);
    ai.movement_speed = DRIFT_SPEED;
    if variant.kind == ShapeKind::Crasher {
        ai.view_range = CRASHER_VIEW_RANGE;
        ai.movement_speed = if variant.big {
            BIG_CRASHER_SPEED
        } else {
            CRASHER_SPEED
        };
    }

    let mut entity = Entity::new(id, Behavior::Shape(variant), Relations::ARENA, ai);
    entity.position = position;
    entity.size = profile.size;
    entity.sides = variant.kind.sides();
    entity.color = variant.kind.color();
    entity.health = profile.health;
    entity.max_health = profile.health;
    entity.score_reward = score_reward;
    entity
}

/// Spins the shape; crashers chase their target, everything else drifts
/// along its facing.
pub(crate) fn tick(entity: &mut Entity, bounds: &ArenaBounds, launches: &mut Vec<Launch>) {
    entity.angle += entity.ai.passive_rotation;
    entity.movement_heading = match entity.ai.state {
        AiState::Active | AiState::Possessed if entity.ai.view_range > 0.0 => {
            physics::heading_toward(entity.position, entity.ai.inputs.mouse)
        }
        _ => Some(entity.angle),
    };

    physics::update(entity, bounds, launches);
}
