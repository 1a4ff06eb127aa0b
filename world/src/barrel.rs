//! Timed weapon mounts owned by composite entities.

use glam::Vec2;
use shape_arena_core::{
    BarrelDefinition, EntityId, PhysicsFlags, Relation, Relations, TICKS_PER_SECOND,
};

use crate::entity::{AiUnit, Behavior, Entity};

/// Ticks between shots for a barrel with a reload multiplier of one.
pub(crate) const BASE_RELOAD_TICKS: f32 = 15.0;
/// Launch speed of a child with a bullet speed multiplier of one.
const LAUNCH_SPEED: f32 = 20.0;
/// Acceleration of a drone-like child with a bullet speed multiplier of one.
const BASE_ACCELERATION: f32 = 2.0;
/// Knockback pushed onto the owner per unit of recoil.
const RECOIL_ACCELERATION: f32 = 2.0;

/// Weapon mount: an immutable definition plus its reload state.
#[derive(Clone, Debug, PartialEq)]
pub struct Barrel {
    definition: BarrelDefinition,
    cooldown: f32,
    children: Vec<EntityId>,
}

impl Barrel {
    pub(crate) fn new(definition: BarrelDefinition, reload_time: f32) -> Self {
        Self {
            cooldown: definition.delay * reload_period(&definition, reload_time),
            definition,
            children: Vec::new(),
        }
    }

    /// Immutable definition of the mount.
    #[must_use]
    pub fn definition(&self) -> &BarrelDefinition {
        &self.definition
    }

    /// Live children spawned by this mount.
    #[must_use]
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    /// Advances the reload timer and reports whether the mount fires this tick.
    ///
    /// Drone-like templates fire whenever reloaded and below their live-child
    /// cap; bullet templates fire only while the owner shoots.
    pub(crate) fn tick(&mut self, reload_time: f32, firing: bool) -> bool {
        if self.cooldown > 0.0 {
            self.cooldown -= 1.0;
            if self.cooldown > 0.0 {
                return false;
            }
        }

        let ready = if self.definition.bullet.kind.is_drone_like() {
            self.children.len() < self.definition.drone_count as usize
        } else {
            firing
        };

        if !ready {
            return false;
        }

        self.cooldown = reload_period(&self.definition, reload_time);
        true
    }

    pub(crate) fn adopt(&mut self, child: EntityId) {
        self.children.push(child);
    }

    pub(crate) fn release(&mut self, child: EntityId) {
        self.children.retain(|id| *id != child);
    }
}

fn reload_period(definition: &BarrelDefinition, reload_time: f32) -> f32 {
    (BASE_RELOAD_TICKS * definition.reload * reload_time).max(1.0)
}

/// Builds `count` mounts evenly spread over a full turn.
pub(crate) fn symmetric(template: BarrelDefinition, count: usize, reload_time: f32) -> Vec<Barrel> {
    (0..count)
        .map(|index| {
            let angle = std::f32::consts::TAU * index as f32 / count as f32;
            Barrel::new(template.with_angle(angle), reload_time)
        })
        .collect()
}

/// Child spawn requested by a mount during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Launch {
    pub(crate) parent: EntityId,
    pub(crate) barrel_index: usize,
    pub(crate) definition: BarrelDefinition,
    pub(crate) team: Relation,
    pub(crate) origin: Vec2,
    pub(crate) angle: f32,
}

/// Ticks every mount of the entity, queueing launches for those that fire.
///
/// Each shot pushes the owner away from the muzzle by the mount's recoil.
pub(crate) fn fire_barrels(entity: &mut Entity, launches: &mut Vec<Launch>) {
    let firing = entity.ai.inputs.attempting_shot();
    for (index, barrel) in entity.barrels.iter_mut().enumerate() {
        if !barrel.tick(entity.reload_time, firing) {
            continue;
        }

        let angle = entity.angle + barrel.definition.angle;
        let direction = Vec2::from_angle(angle);
        launches.push(Launch {
            parent: entity.id,
            barrel_index: index,
            definition: barrel.definition,
            team: entity.relations.team,
            origin: entity.position + direction * (entity.size + barrel.definition.offset),
            angle,
        });
        entity.velocity -= direction * barrel.definition.recoil * RECOIL_ACCELERATION;
    }
}

/// Builds the plain projectile body shared by bullets, drones and minions.
pub(crate) fn projectile(
    id: EntityId,
    launch: &Launch,
    shoot_angle: f32,
    behavior: Behavior,
) -> Entity {
    let bullet = launch.definition.bullet;
    let mut ai = AiUnit::new(0.0);
    ai.movement_speed = BASE_ACCELERATION * bullet.speed;
    ai.aim_speed = ai.movement_speed;

    let relations = Relations {
        team: launch.team,
        owner: Relation::Entity(launch.parent),
    };
    let mut entity = Entity::new(id, behavior, relations, ai);
    entity.position = launch.origin;
    entity.angle = shoot_angle;
    entity.velocity = Vec2::from_angle(shoot_angle) * bullet.speed * LAUNCH_SPEED;
    entity.size = launch.definition.width * 0.5 * bullet.size_ratio;
    entity.sides = bullet.sides;
    entity.health = bullet.health;
    entity.max_health = bullet.health;
    entity.color = bullet.color;
    entity.spawned_by = Some((launch.parent, launch.barrel_index));
    entity.lifetime = bullet
        .life_length
        .map(|seconds| (seconds * TICKS_PER_SECOND as f32).round().max(1.0) as u32);
    if bullet.kind.is_drone_like() {
        entity.flags = PhysicsFlags::NO_OWN_TEAM_COLLISION | PhysicsFlags::CAN_ESCAPE_ARENA;
    }
    entity
}
