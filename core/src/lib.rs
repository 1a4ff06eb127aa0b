#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Shape Arena simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative arena world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable views such as [`ShapeView`] and [`EntityView`], and respond
//! exclusively with new command batches.

use bitflags::bitflags;
use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

/// Number of simulation ticks that make up one second of simulated time.
pub const TICKS_PER_SECOND: u32 = 25;

/// Number of ambient shapes the arena keeps alive unless configured otherwise.
pub const DEFAULT_WANTED_SHAPES: usize = 1000;

/// Maximum number of alpha pentagons allowed to coexist anywhere in the arena.
pub const MAX_ALPHA_PENTAGONS: usize = 2;

new_key_type! {
    /// Generational handle assigned to every live entity by the world's slot map.
    ///
    /// A slot may be reused after its entity is destroyed; the slot's version
    /// changes on every reuse so that stale handles never resolve to the
    /// newcomer.
    pub struct EntityId;
}

/// Position of a slot within the population manager's roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RosterIndex(u32);

impl RosterIndex {
    /// Creates a new roster index with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the roster index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Target of a team or owner relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// The arena itself, used for ambient shapes and bosses.
    Arena,
    /// Another entity, referenced weakly through its identifier.
    Entity(EntityId),
}

/// Team and owner back-references carried by every entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relations {
    /// Team the entity fights for.
    pub team: Relation,
    /// Entity (or arena) that created and controls this entity.
    pub owner: Relation,
}

impl Relations {
    /// Relations shared by every arena-owned entity.
    pub const ARENA: Self = Self {
        team: Relation::Arena,
        owner: Relation::Arena,
    };
}

/// Palette entries understood by presentation adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// Yellow square colour, also used by summoner bosses and minions.
    EnemySquare,
    /// Red triangle colour.
    EnemyTriangle,
    /// Blue pentagon colour.
    EnemyPentagon,
    /// Pink crasher colour.
    EnemyCrasher,
    /// Octagon colour.
    EnemyOctagon,
    /// Necromancer drone colour.
    NecromancerSquare,
    /// Colour assigned to player tanks.
    TankBlue,
}

/// Kinds of ambient shapes maintained by the population manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Five-sided shape; spawns in the nest and rarely in the fields.
    Pentagon,
    /// Aggressive triangle that chases tanks inside the crasher zone.
    Crasher,
    /// Three-sided field shape.
    Triangle,
    /// Four-sided field shape.
    Square,
    /// Rare eight-sided field shape.
    Octagon,
}

impl ShapeKind {
    /// Number of polygon sides used to render the shape.
    #[must_use]
    pub const fn sides(self) -> u32 {
        match self {
            Self::Pentagon => 5,
            Self::Crasher | Self::Triangle => 3,
            Self::Square => 4,
            Self::Octagon => 8,
        }
    }

    /// Colour applied to the shape.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Pentagon => Color::EnemyPentagon,
            Self::Crasher => Color::EnemyCrasher,
            Self::Triangle => Color::EnemyTriangle,
            Self::Square => Color::EnemySquare,
            Self::Octagon => Color::EnemyOctagon,
        }
    }
}

/// Concrete variant of an ambient shape rolled at spawn time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeVariant {
    /// Kind of shape.
    pub kind: ShapeKind,
    /// Whether the rarer, stronger alpha sub-kind was rolled.
    pub alpha: bool,
    /// Whether the big sub-kind was rolled. Only crashers use it.
    pub big: bool,
}

impl ShapeVariant {
    /// Creates a variant that is neither alpha nor big.
    #[must_use]
    pub const fn plain(kind: ShapeKind) -> Self {
        Self {
            kind,
            alpha: false,
            big: false,
        }
    }

    /// Reports whether the variant counts toward the alpha pentagon cap.
    #[must_use]
    pub const fn is_alpha_pentagon(&self) -> bool {
        self.alpha && matches!(self.kind, ShapeKind::Pentagon)
    }

    /// Base size, health and score reward of the variant before arena scaling.
    #[must_use]
    pub fn profile(&self) -> ShapeProfile {
        let (size, health, score_reward) = match (self.kind, self.alpha, self.big) {
            (ShapeKind::Pentagon, true, _) => (200.0, 3_000.0, 3_000.0),
            (ShapeKind::Pentagon, false, _) => (75.0, 100.0, 130.0),
            (ShapeKind::Crasher, _, true) => (55.0, 20.0, 25.0),
            (ShapeKind::Crasher, _, false) => (35.0, 10.0, 15.0),
            (ShapeKind::Triangle, _, _) => (55.0, 30.0, 25.0),
            (ShapeKind::Square, _, _) => (55.0, 10.0, 10.0),
            (ShapeKind::Octagon, _, _) => (90.0, 400.0, 500.0),
        };

        if self.alpha && !matches!(self.kind, ShapeKind::Pentagon) {
            return ShapeProfile {
                size: size * ALPHA_SIZE_SCALE,
                health: health * ALPHA_STAT_SCALE,
                score_reward: score_reward * ALPHA_STAT_SCALE,
            };
        }

        ShapeProfile {
            size,
            health,
            score_reward,
        }
    }
}

const ALPHA_SIZE_SCALE: f32 = 2.0;
const ALPHA_STAT_SCALE: f32 = 10.0;

/// Base stats attached to a shape variant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeProfile {
    /// Radius of the shape in arena units.
    pub size: f32,
    /// Maximum health of the shape.
    pub health: f32,
    /// Score awarded for destroying the shape before arena scaling.
    pub score_reward: f32,
}

bitflags! {
    /// Physics behaviour switches carried by every entity.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct PhysicsFlags: u32 {
        /// The entity ignores collisions with members of its own team.
        const NO_OWN_TEAM_COLLISION = 1 << 0;
        /// The entity may leave the arena bounds.
        const CAN_ESCAPE_ARENA = 1 << 1;
        /// The entity only collides with entities that share its owner.
        const ONLY_SAME_OWNER_COLLISION = 1 << 2;
    }
}

bitflags! {
    /// Buttons held by whoever drives an entity.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct InputFlags: u8 {
        /// Primary fire.
        const SHOOT = 1 << 0;
        /// Secondary fire, used to push drones away.
        const REPEL = 1 << 1;
    }
}

/// Live input state of an entity: held buttons and the aim point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Inputs {
    /// Buttons currently held.
    pub flags: InputFlags,
    /// Aim point in arena coordinates.
    pub mouse: Vec2,
}

impl Inputs {
    /// Reports whether the shoot button is held.
    #[must_use]
    pub fn attempting_shot(&self) -> bool {
        self.flags.contains(InputFlags::SHOOT)
    }

    /// Reports whether the repel button is held.
    #[must_use]
    pub fn attempting_repel(&self) -> bool {
        self.flags.contains(InputFlags::REPEL)
    }
}

/// High-level state of an AI unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiState {
    /// No target acquired.
    #[default]
    Idle,
    /// A target is acquired and the aim point tracks it.
    Active,
    /// An external controller steers the entity.
    Possessed,
}

/// Kind of entity a barrel emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BulletKind {
    /// Plain bullet, fired only while the owner shoots.
    Bullet,
    /// Drone that follows its owner's aim.
    Drone,
    /// Summoner minion that owns its own barrels.
    Minion,
}

impl BulletKind {
    /// Drone-like templates respawn automatically up to the barrel's count.
    #[must_use]
    pub const fn is_drone_like(self) -> bool {
        matches!(self, Self::Drone | Self::Minion)
    }
}

/// Template describing the entities a barrel emits.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BulletDefinition {
    /// Kind of entity spawned.
    pub kind: BulletKind,
    /// Child size relative to half the barrel width.
    pub size_ratio: f32,
    /// Health of the spawned entity.
    pub health: f32,
    /// Contact damage of the spawned entity.
    pub damage: f32,
    /// Speed multiplier applied to the spawned entity.
    pub speed: f32,
    /// Spread multiplier applied to the launch direction.
    pub scatter_rate: f32,
    /// Lifetime in seconds, or `None` when the entity never expires.
    pub life_length: Option<f32>,
    /// Knockback absorption factor.
    pub absorption_factor: f32,
    /// Colour of the spawned entity.
    pub color: Color,
    /// Polygon sides of the spawned entity.
    pub sides: u32,
}

/// Immutable definition of a weapon mount.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarrelDefinition {
    /// Angle offset from the owner's facing, in radians.
    pub angle: f32,
    /// Sideways mount offset.
    pub offset: f32,
    /// Barrel length.
    pub size: f32,
    /// Barrel width.
    pub width: f32,
    /// Fraction of the reload period to wait before the first shot.
    pub delay: f32,
    /// Reload period multiplier.
    pub reload: f32,
    /// Recoil scalar applied to the owner when firing.
    pub recoil: f32,
    /// Whether the barrel is drawn as a trapezoid.
    pub is_trapezoid: bool,
    /// Direction of the trapezoid taper, in radians.
    pub trapezoid_direction: f32,
    /// Maximum number of live drone-like children.
    pub drone_count: u32,
    /// Whether the owner's controller may steer spawned children directly.
    pub can_control_drones: bool,
    /// Template for spawned entities.
    pub bullet: BulletDefinition,
}

impl BarrelDefinition {
    /// Returns a copy of the definition mounted at a different angle.
    #[must_use]
    pub const fn with_angle(self, angle: f32) -> Self {
        Self { angle, ..self }
    }
}

/// Coarse classification of an entity, reported in events and views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Ambient shape owned by the arena.
    Shape(ShapeVariant),
    /// Omega summoner boss.
    Boss,
    /// Summoner minion spawned by a boss barrel.
    Minion,
    /// Drone spawned by a minion barrel.
    Drone,
    /// Plain bullet.
    Bullet,
    /// Externally steered tank.
    Tank,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by one tick.
    Tick,
    /// Spawns an ambient shape on behalf of a roster slot.
    SpawnShape {
        /// Roster slot the shape will fill.
        slot: RosterIndex,
        /// Variant rolled for the shape.
        variant: ShapeVariant,
        /// Spawn position in arena coordinates.
        position: Vec2,
        /// Score reward already scaled by the arena multiplier.
        score_reward: f32,
    },
    /// Spawns an omega summoner boss.
    SpawnBoss {
        /// Spawn position in arena coordinates.
        position: Vec2,
    },
    /// Spawns an externally steered tank on its own team.
    SpawnTank {
        /// Spawn position in arena coordinates.
        position: Vec2,
    },
    /// Replaces the live inputs of an entity.
    SetInputs {
        /// Entity receiving the inputs.
        entity: EntityId,
        /// New input state.
        inputs: Inputs,
    },
    /// Hands control of an entity to an external controller.
    Possess {
        /// Entity to possess.
        entity: EntityId,
    },
    /// Returns a possessed entity to its autonomous AI.
    Release {
        /// Entity to release.
        entity: EntityId,
    },
    /// Updates the target tracked by an entity's AI unit.
    AssignAiTarget {
        /// Entity whose AI unit is updated.
        entity: EntityId,
        /// Position of the acquired target, or `None` to go idle.
        target: Option<Vec2>,
    },
    /// Applies damage to an entity, destroying it when health runs out.
    DamageEntity {
        /// Entity receiving damage.
        entity: EntityId,
        /// Amount of health removed.
        amount: f32,
    },
    /// Destroys an entity and everything it spawned.
    DestroyEntity {
        /// Entity to destroy.
        entity: EntityId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the simulation advanced by one tick.
    TimeAdvanced {
        /// Index of the tick that just completed.
        tick: u64,
    },
    /// Confirms that a roster shape was created.
    ShapeSpawned {
        /// Roster slot the shape fills.
        slot: RosterIndex,
        /// Identifier assigned to the shape.
        entity: EntityId,
        /// Variant of the shape.
        variant: ShapeVariant,
    },
    /// Confirms that a non-roster entity was created.
    EntitySpawned {
        /// Identifier assigned to the entity.
        entity: EntityId,
        /// Kind of the entity.
        kind: EntityKind,
    },
    /// Confirms that an entity was removed from the world.
    EntityDestroyed {
        /// Identifier the entity carried.
        entity: EntityId,
        /// Kind of the entity.
        kind: EntityKind,
    },
}

/// Axis-aligned arena bounds measured in arena units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    /// Smallest x coordinate inside the arena.
    pub left_x: f32,
    /// Largest x coordinate inside the arena.
    pub right_x: f32,
    /// Smallest y coordinate inside the arena.
    pub top_y: f32,
    /// Largest y coordinate inside the arena.
    pub bottom_y: f32,
}

impl ArenaBounds {
    /// Creates square bounds centred on the origin.
    #[must_use]
    pub const fn centered(half_extent: f32) -> Self {
        Self {
            left_x: -half_extent,
            right_x: half_extent,
            top_y: -half_extent,
            bottom_y: half_extent,
        }
    }

    /// Clamps a point so that it stays inside the bounds.
    #[must_use]
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.left_x, self.right_x.max(self.left_x)),
            point.y.clamp(self.top_y, self.bottom_y.max(self.top_y)),
        )
    }
}

/// Read-only view of the arena context consumed by systems.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArenaView {
    /// Current arena bounds.
    pub bounds: ArenaBounds,
    /// Multiplier applied to every shape's score reward at spawn time.
    pub shape_score_reward_multiplier: f32,
}

impl ArenaView {
    /// Samples a uniformly distributed spawn location inside the bounds.
    pub fn find_spawn_location<R: Rng>(&self, rng: &mut R) -> Vec2 {
        let u: f32 = rng.gen();
        let v: f32 = rng.gen();
        let bounds = self.bounds;
        Vec2::new(
            bounds.left_x + (bounds.right_x - bounds.left_x) * u,
            bounds.top_y + (bounds.bottom_y - bounds.top_y) * v,
        )
    }
}

/// Immutable representation of a live shape used for liveness queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeSnapshot {
    /// Identifier of the shape.
    pub id: EntityId,
    /// Variant of the shape.
    pub variant: ShapeVariant,
    /// Current position of the shape.
    pub position: Vec2,
}

/// Read-only snapshot describing every live shape in the arena.
#[derive(Clone, Debug, Default)]
pub struct ShapeView {
    snapshots: Vec<ShapeSnapshot>,
}

impl ShapeView {
    /// Creates a new shape view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ShapeSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Reports whether the identifier refers to a live shape.
    ///
    /// Identifiers whose generation no longer matches are reported dead.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .is_ok()
    }

    /// Counts the live alpha pentagons.
    #[must_use]
    pub fn alpha_pentagon_count(&self) -> usize {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.variant.is_alpha_pentagon())
            .count()
    }

    /// Number of live shapes captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no shapes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Iterator over the captured shapes in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ShapeSnapshot> {
        self.snapshots.iter()
    }
}

/// Immutable representation of a single entity's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Identifier of the entity.
    pub id: EntityId,
    /// Kind of the entity.
    pub kind: EntityKind,
    /// Current position.
    pub position: Vec2,
    /// Current facing angle in radians.
    pub angle: f32,
    /// Team and owner relations.
    pub relations: Relations,
    /// State of the entity's AI unit.
    pub ai_state: AiState,
    /// Radius within which the AI unit acquires targets; zero disables it.
    pub view_range: f32,
}

/// Read-only snapshot describing every live entity.
#[derive(Clone, Debug, Default)]
pub struct EntityView {
    snapshots: Vec<EntitySnapshot>,
}

impl EntityView {
    /// Creates a new entity view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EntitySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured entities in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots.iter()
    }
}
