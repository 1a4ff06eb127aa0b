//! Base per-tick update shared by every behaviour.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use shape_arena_core::{ArenaBounds, PhysicsFlags};

use crate::{
    barrel::{self, Launch},
    entity::Entity,
};

const FRICTION: f32 = 0.9;

/// Integrates motion, aligns facing with the aim point, ticks the mounts and
/// counts down the lifetime.
pub(crate) fn update(entity: &mut Entity, bounds: &ArenaBounds, launches: &mut Vec<Launch>) {
    integrate(entity, bounds);
    align_facing(entity);
    barrel::fire_barrels(entity, launches);

    if let Some(remaining) = entity.lifetime.as_mut() {
        *remaining = remaining.saturating_sub(1);
    }
}

fn integrate(entity: &mut Entity, bounds: &ArenaBounds) {
    if let Some(heading) = entity.movement_heading {
        entity.velocity += Vec2::from_angle(heading) * entity.ai.movement_speed;
    }

    entity.velocity *= FRICTION;
    entity.position += entity.velocity;

    if !entity.flags.contains(PhysicsFlags::CAN_ESCAPE_ARENA) {
        entity.position = bounds.clamp(entity.position);
    }
}

fn align_facing(entity: &mut Entity) {
    let Some(aim) = entity.aim else {
        return;
    };

    let delta = aim - entity.position;
    if delta.length_squared() <= f32::EPSILON {
        return;
    }

    let desired = delta.y.atan2(delta.x);
    let turn = wrap_angle(desired - entity.angle);
    let limit = entity.ai.aim_speed.max(0.0);
    entity.angle += turn.clamp(-limit, limit);
}

/// Angle from `from` toward `to`, or `None` when the points coincide.
pub(crate) fn heading_toward(from: Vec2, to: Vec2) -> Option<f32> {
    let delta = to - from;
    if delta.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(delta.y.atan2(delta.x))
}

fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}
