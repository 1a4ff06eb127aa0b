//! Component bundles shared by every simulated entity.

use glam::Vec2;
use shape_arena_core::{
    AiState, Color, EntityId, EntityKind, Inputs, PhysicsFlags, Relations, ShapeVariant,
};

use crate::{barrel::Barrel, minion::MinionState};

/// Ambient rotation rate handed to AI units, in radians per tick.
pub(crate) const PASSIVE_ROTATION: f32 = 0.01;

/// Decision unit attached to every entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AiUnit {
    /// High-level state of the unit.
    pub state: AiState,
    /// Live inputs written by the AI or by a possessing controller.
    pub inputs: Inputs,
    /// Ambient rotation rate in radians per tick; its sign is rolled at spawn.
    pub passive_rotation: f32,
    /// Radius within which targets are acquired; zero disables acquisition.
    pub view_range: f32,
    /// Acceleration applied along the movement heading each tick.
    pub movement_speed: f32,
    /// Maximum facing change per tick while aligning with the aim point.
    pub aim_speed: f32,
}

impl AiUnit {
    pub(crate) fn new(passive_rotation: f32) -> Self {
        Self {
            state: AiState::Idle,
            inputs: Inputs::default(),
            passive_rotation,
            view_range: 0.0,
            movement_speed: 0.0,
            aim_speed: 0.0,
        }
    }
}

/// Tagged variant selecting which per-tick behaviour runs for an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Behavior {
    /// Ambient shape maintained by the population manager.
    Shape(ShapeVariant),
    /// Omega summoner boss.
    Boss,
    /// Summoner minion with its control arbitration state.
    Minion(MinionState),
    /// Plain drone spawned by a minion barrel.
    Drone,
    /// Plain bullet.
    Bullet,
    /// Externally steered tank.
    Tank,
}

impl Behavior {
    /// Coarse classification reported in events and views.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Shape(variant) => EntityKind::Shape(*variant),
            Self::Boss => EntityKind::Boss,
            Self::Minion(_) => EntityKind::Minion,
            Self::Drone => EntityKind::Drone,
            Self::Bullet => EntityKind::Bullet,
            Self::Tank => EntityKind::Tank,
        }
    }
}

/// Single simulated object stored in the world.
#[derive(Clone, Debug)]
pub struct Entity {
    pub(crate) id: EntityId,
    pub(crate) name: Option<&'static str>,
    pub(crate) position: Vec2,
    pub(crate) angle: f32,
    pub(crate) velocity: Vec2,
    pub(crate) movement_heading: Option<f32>,
    pub(crate) aim: Option<Vec2>,
    pub(crate) size: f32,
    pub(crate) sides: u32,
    pub(crate) flags: PhysicsFlags,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) color: Color,
    pub(crate) relations: Relations,
    pub(crate) ai: AiUnit,
    pub(crate) barrels: Vec<Barrel>,
    pub(crate) spawned_by: Option<(EntityId, usize)>,
    pub(crate) lifetime: Option<u32>,
    pub(crate) reload_time: f32,
    pub(crate) score_reward: f32,
    pub(crate) behavior: Behavior,
}

impl Entity {
    pub(crate) fn new(id: EntityId, behavior: Behavior, relations: Relations, ai: AiUnit) -> Self {
        Self {
            id,
            name: None,
            position: Vec2::ZERO,
            angle: 0.0,
            velocity: Vec2::ZERO,
            movement_heading: None,
            aim: None,
            size: 0.0,
            sides: 0,
            flags: PhysicsFlags::empty(),
            health: 1.0,
            max_health: 1.0,
            color: Color::EnemySquare,
            relations,
            ai,
            barrels: Vec::new(),
            spawned_by: None,
            lifetime: None,
            reload_time: 1.0,
            score_reward: 0.0,
            behavior,
        }
    }

    /// Identifier of the entity.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Display name, if the entity carries one.
    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        self.name
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Current facing angle in radians.
    #[must_use]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Heading chosen by the last behaviour step, if the entity is moving.
    #[must_use]
    pub fn movement_heading(&self) -> Option<f32> {
        self.movement_heading
    }

    /// Radius of the entity.
    #[must_use]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Polygon sides of the entity.
    #[must_use]
    pub fn sides(&self) -> u32 {
        self.sides
    }

    /// Physics switches of the entity.
    #[must_use]
    pub fn flags(&self) -> PhysicsFlags {
        self.flags
    }

    /// Maximum health.
    #[must_use]
    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Colour of the entity.
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Team and owner relations.
    #[must_use]
    pub fn relations(&self) -> Relations {
        self.relations
    }

    /// AI unit driving the entity.
    #[must_use]
    pub fn ai(&self) -> &AiUnit {
        &self.ai
    }

    /// Weapon mounts owned by the entity.
    #[must_use]
    pub fn barrels(&self) -> &[Barrel] {
        &self.barrels
    }

    /// Remaining lifetime in ticks, if the entity expires.
    #[must_use]
    pub fn lifetime(&self) -> Option<u32> {
        self.lifetime
    }

    /// Score awarded for destroying the entity.
    #[must_use]
    pub fn score_reward(&self) -> f32 {
        self.score_reward
    }

    /// Behaviour variant of the entity.
    #[must_use]
    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    /// Presentation scale of the entity relative to its nominal size.
    #[must_use]
    pub fn size_factor(&self) -> f32 {
        match self.behavior {
            Behavior::Boss => crate::boss::size_factor(self.size),
            Behavior::Minion(_) => crate::minion::size_factor(self.size),
            _ => 1.0,
        }
    }
}

/// Read-only data about an owning entity captured before its child ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ControllerSnapshot {
    pub(crate) position: Vec2,
    pub(crate) inputs: Inputs,
    pub(crate) reload_time: f32,
}

impl ControllerSnapshot {
    pub(crate) fn of(entity: &Entity) -> Self {
        Self {
            position: entity.position,
            inputs: entity.ai.inputs,
            reload_time: entity.reload_time,
        }
    }
}

/// Identifier for occupied slot `index` in tests that build entities by hand.
#[cfg(test)]
pub(crate) fn test_id(index: u32) -> EntityId {
    EntityId::from(slotmap::KeyData::from_ffi(u64::from(index)))
}
