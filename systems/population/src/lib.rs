#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Population manager that keeps a fixed roster of ambient shapes alive.
//!
//! Every tick the manager walks its roster, and for each slot whose shape
//! died it samples a spawn location, classifies the zone the location falls
//! in and rolls a variant from that zone's table.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shape_arena_core::{
    ArenaBounds, ArenaView, Command, EntityId, Event, RosterIndex, ShapeKind, ShapeVariant,
    ShapeView, DEFAULT_WANTED_SHAPES, MAX_ALPHA_PENTAGONS,
};

const DEFAULT_RNG_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

const NEST_ALPHA_CHANCE: f32 = 0.2;
const CRASHER_BIG_CHANCE: f32 = 0.2;
const CRASHER_ALPHA_CHANCE: f32 = 0.1;
const FIELDS_ALPHA_CHANCE: f32 = 0.2;

const OCTAGON_THRESHOLD: f32 = 0.04;
const PENTAGON_THRESHOLD: f32 = 0.10;
const TRIANGLE_THRESHOLD: f32 = 0.30;

/// Configuration parameters required to construct the population manager.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    wanted_shapes: usize,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration with the roster length and random seed.
    #[must_use]
    pub const fn new(wanted_shapes: usize, rng_seed: u64) -> Self {
        Self {
            wanted_shapes,
            rng_seed,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_WANTED_SHAPES, DEFAULT_RNG_SEED)
    }
}

/// State of one roster position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RosterSlot {
    /// No shape was ever requested for the slot.
    #[default]
    Empty,
    /// A spawn was requested and awaits confirmation from the world.
    Pending {
        /// Variant that was requested.
        variant: ShapeVariant,
        /// Set by [`PopulationManager::kill_all`]; the shape is destroyed as
        /// soon as it is confirmed.
        doomed: bool,
    },
    /// The slot tracks a shape; it may have died since.
    Occupied(EntityId),
}

/// Arena region a spawn location falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Zone {
    /// Central tenth of the arena, home of the pentagon nest.
    Nest,
    /// Ring around the nest where crashers roam.
    CrasherZone,
    /// Everything else.
    Fields,
}

/// Pure system that keeps the ambient shape population at its wanted size.
#[derive(Debug)]
pub struct PopulationManager {
    roster: Vec<RosterSlot>,
    rng: ChaCha8Rng,
}

impl PopulationManager {
    /// Creates a manager whose roster starts out empty.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            roster: vec![RosterSlot::Empty; config.wanted_shapes],
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Read-only access to the roster.
    #[must_use]
    pub fn roster(&self) -> &[RosterSlot] {
        &self.roster
    }

    /// Counts roster slots whose shape is alive in `shapes`.
    #[must_use]
    pub fn live_count(&self, shapes: &ShapeView) -> usize {
        self.roster
            .iter()
            .filter(|slot| matches!(slot, RosterSlot::Occupied(id) if shapes.contains(*id)))
            .count()
    }

    /// Consumes world events and emits spawn commands for dead roster slots.
    ///
    /// `ShapeSpawned` confirmations mark their slots occupied, destroying
    /// shapes whose slot was wiped while pending; a `TimeAdvanced` event
    /// triggers one replenishment pass against `shapes`.
    pub fn handle(
        &mut self,
        events: &[Event],
        arena: &ArenaView,
        shapes: &ShapeView,
        out: &mut Vec<Command>,
    ) {
        let mut replenish = false;
        for event in events {
            match event {
                Event::ShapeSpawned { slot, entity, .. } => {
                    if let Some(entry) = self.roster.get_mut(slot.get() as usize) {
                        if matches!(entry, RosterSlot::Pending { doomed: true, .. }) {
                            out.push(Command::DestroyEntity { entity: *entity });
                        }
                        *entry = RosterSlot::Occupied(*entity);
                    }
                }
                Event::TimeAdvanced { .. } => replenish = true,
                _ => {}
            }
        }

        if replenish {
            self.replenish(arena, shapes, out);
        }
    }

    /// Marks every roster entry dead.
    ///
    /// Tracked shapes get a destroy command now; pending spawns are destroyed
    /// once the world confirms them. Shapes that already died are harmless to
    /// destroy again, so calling this repeatedly is safe.
    pub fn kill_all(&mut self, out: &mut Vec<Command>) {
        for slot in &mut self.roster {
            match slot {
                RosterSlot::Occupied(entity) => {
                    out.push(Command::DestroyEntity { entity: *entity });
                }
                RosterSlot::Pending { doomed, .. } => *doomed = true,
                RosterSlot::Empty => {}
            }
        }
    }

    fn replenish(&mut self, arena: &ArenaView, shapes: &ShapeView, out: &mut Vec<Command>) {
        let mut alpha_pentagons = shapes.alpha_pentagon_count()
            + self
                .roster
                .iter()
                .filter(|slot| {
                    matches!(slot, RosterSlot::Pending { variant, .. } if variant.is_alpha_pentagon())
                })
                .count();

        let mut spawned = 0usize;
        for index in (0..self.roster.len()).rev() {
            let dead = match self.roster[index] {
                RosterSlot::Empty => true,
                RosterSlot::Pending { .. } => false,
                RosterSlot::Occupied(id) => !shapes.contains(id),
            };
            if !dead {
                continue;
            }

            let (variant, position) = spawn_shape(arena, alpha_pentagons, &mut self.rng);
            if variant.is_alpha_pentagon() {
                alpha_pentagons += 1;
            }

            self.roster[index] = RosterSlot::Pending {
                variant,
                doomed: false,
            };
            out.push(Command::SpawnShape {
                slot: RosterIndex::new(u32::try_from(index).unwrap_or(u32::MAX)),
                variant,
                position,
                score_reward: variant.profile().score_reward * arena.shape_score_reward_multiplier,
            });
            spawned += 1;
        }

        if spawned > 0 {
            tracing::debug!(
                target: "shape_arena::population",
                spawned,
                alpha_pentagons,
                "replenished roster"
            );
        }
    }
}

/// Samples a spawn location and rolls the variant for it.
pub fn spawn_shape<R: Rng>(
    arena: &ArenaView,
    alpha_pentagons: usize,
    rng: &mut R,
) -> (ShapeVariant, Vec2) {
    let position = arena.find_spawn_location(rng);
    let variant = roll_variant(classify_zone(position, &arena.bounds), alpha_pentagons, rng);
    (variant, position)
}

/// Classifies a location by its coordinate magnitudes.
#[must_use]
pub fn classify_zone(position: Vec2, bounds: &ArenaBounds) -> Zone {
    let high = position.x.max(position.y);
    let low = position.x.min(position.y);
    if high < bounds.right_x / 10.0 && low > bounds.left_x / 10.0 {
        Zone::Nest
    } else if high < bounds.right_x / 5.0 && low > bounds.left_x / 5.0 {
        Zone::CrasherZone
    } else {
        Zone::Fields
    }
}

/// Rolls a variant from the zone's table.
///
/// Nest pentagons are never alpha while `alpha_pentagons` has reached the cap.
pub fn roll_variant<R: Rng>(zone: Zone, alpha_pentagons: usize, rng: &mut R) -> ShapeVariant {
    match zone {
        Zone::Nest => {
            let alpha =
                alpha_pentagons < MAX_ALPHA_PENTAGONS && rng.gen::<f32>() <= NEST_ALPHA_CHANCE;
            ShapeVariant {
                alpha,
                ..ShapeVariant::plain(ShapeKind::Pentagon)
            }
        }
        Zone::CrasherZone => {
            let big = rng.gen::<f32>() < CRASHER_BIG_CHANCE;
            let alpha = rng.gen::<f32>() <= CRASHER_ALPHA_CHANCE;
            ShapeVariant {
                kind: ShapeKind::Crasher,
                alpha,
                big,
            }
        }
        Zone::Fields => {
            let kind = fields_kind(rng.gen());
            let alpha = kind != ShapeKind::Pentagon && rng.gen::<f32>() <= FIELDS_ALPHA_CHANCE;
            ShapeVariant {
                alpha,
                ..ShapeVariant::plain(kind)
            }
        }
    }
}

/// Maps a uniform roll in `[0, 1)` to a field shape kind.
#[must_use]
pub fn fields_kind(roll: f32) -> ShapeKind {
    if roll < OCTAGON_THRESHOLD {
        ShapeKind::Octagon
    } else if roll < PENTAGON_THRESHOLD {
        ShapeKind::Pentagon
    } else if roll < TRIANGLE_THRESHOLD {
        ShapeKind::Triangle
    } else {
        ShapeKind::Square
    }
}
