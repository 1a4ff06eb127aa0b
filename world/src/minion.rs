//! Summoner minions: drones that own spawners of their own and orbit their
//! aim point at distance-dependent headings.
//!
//! Every tick a minion first settles who drives it ([`ControlSource`]), then
//! picks a movement heading from the squared distance to the driver's aim
//! point, spins a little, and finally hands over to the base update.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;
use shape_arena_core::{
    AiState, ArenaBounds, BarrelDefinition, BulletDefinition, BulletKind, Color, EntityId,
    InputFlags, Inputs, PhysicsFlags,
};

use crate::{
    barrel::{self, Launch},
    entity::{Behavior, ControllerSnapshot, Entity},
    physics,
};

/// Squared radius of the focus a minion orbits.
pub const FOCUS_RADIUS: f32 = 850.0 * 850.0;

const VIEW_RANGE: f32 = 900.0;
const SIZE_SCALE: f32 = 1.5;
const NOMINAL_SIZE: f32 = 50.0;
const SPAWNER_COUNT: usize = 4;
const ROTATION_RATE: f32 = 0.5;
const SPIN_SCALE: f32 = 0.05;

/// Template of the minion's own spawners. Its drones cannot be steered by a
/// controller and never spawn anything themselves.
pub(crate) const MINION_BARREL: BarrelDefinition = BarrelDefinition {
    angle: 0.0,
    offset: 0.0,
    size: 75.0,
    width: 42.0,
    delay: 0.0,
    reload: 0.5,
    recoil: 1.0,
    is_trapezoid: true,
    trapezoid_direction: 0.0,
    drone_count: 4,
    can_control_drones: false,
    bullet: BulletDefinition {
        kind: BulletKind::Drone,
        size_ratio: 0.8,
        health: 2.5,
        damage: 0.7,
        speed: 1.7,
        scatter_rate: 1.0,
        life_length: None,
        absorption_factor: 1.0,
        color: Color::NecromancerSquare,
        sides: 4,
    },
};

/// Who drives a minion during a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ControlSource {
    /// The owning controller's live inputs steer the minion.
    PlayerControlled,
    /// The minion's AI has no target; it drifts along its facing.
    #[default]
    AiIdle,
    /// The minion's AI tracks a target.
    AiActive,
}

/// Per-minion state carried by [`Behavior::Minion`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinionState {
    /// Entity whose inputs may steer the minion.
    pub controller: EntityId,
    /// Whether the spawning barrel lets the controller steer its children.
    pub can_control_drones: bool,
    /// Control source settled during the last tick.
    pub control: ControlSource,
}

/// Settles the control source for this tick.
///
/// The controller drives iff the minion is controllable and the controller is
/// shooting or repelling. A vanished controller degrades to idle drift.
#[must_use]
pub fn arbitrate(
    can_control_drones: bool,
    controller: Option<&Inputs>,
    ai_state: AiState,
) -> ControlSource {
    let Some(inputs) = controller else {
        return ControlSource::AiIdle;
    };

    if can_control_drones && (inputs.attempting_shot() || inputs.attempting_repel()) {
        return ControlSource::PlayerControlled;
    }

    match ai_state {
        AiState::Idle => ControlSource::AiIdle,
        AiState::Active | AiState::Possessed => ControlSource::AiActive,
    }
}

/// Movement heading for a minion facing `facing` whose aim point lies
/// `distance_sq` away.
///
/// Inside a quarter of the focus radius it retreats, inside the focus radius
/// it strafes, and beyond it keeps heading along its facing.
#[must_use]
pub fn band_heading(facing: f32, distance_sq: f32) -> f32 {
    if distance_sq < FOCUS_RADIUS / 4.0 {
        facing + PI
    } else if distance_sq < FOCUS_RADIUS {
        facing + FRAC_PI_2
    } else {
        facing
    }
}

/// Builds a minion launched by `launch`.
pub(crate) fn create(id: EntityId, launch: &Launch, shoot_angle: f32) -> Entity {
    let state = MinionState {
        controller: launch.parent,
        can_control_drones: launch.definition.can_control_drones,
        control: ControlSource::AiIdle,
    };
    let mut entity = barrel::projectile(id, launch, shoot_angle, Behavior::Minion(state));

    entity.ai.view_range = VIEW_RANGE;
    entity.sides = 4;
    entity.size *= SIZE_SCALE;

    entity.flags.remove(PhysicsFlags::NO_OWN_TEAM_COLLISION);
    entity.flags.remove(PhysicsFlags::CAN_ESCAPE_ARENA);
    entity.flags.insert(PhysicsFlags::ONLY_SAME_OWNER_COLLISION);

    entity.barrels = barrel::symmetric(MINION_BARREL, SPAWNER_COUNT, entity.reload_time);
    entity.ai.aim_speed = entity.ai.movement_speed;
    entity.color = Color::EnemySquare;
    entity
}

/// Runs the targeting state machine, then the base update.
pub(crate) fn tick(
    entity: &mut Entity,
    controller: Option<ControllerSnapshot>,
    bounds: &ArenaBounds,
    launches: &mut Vec<Launch>,
) {
    let Behavior::Minion(state) = &mut entity.behavior else {
        return;
    };

    if let Some(controller) = controller {
        entity.reload_time = controller.reload_time;
    }

    let control = arbitrate(
        state.can_control_drones,
        controller.as_ref().map(|controller| &controller.inputs),
        entity.ai.state,
    );
    state.control = control;

    let heading = match (control, controller) {
        (ControlSource::PlayerControlled, Some(controller)) => {
            Some(steer(entity, controller.inputs.mouse))
        }
        (ControlSource::AiActive, _) => {
            let mouse = entity.ai.inputs.mouse;
            Some(steer(entity, mouse))
        }
        _ => {
            entity.aim = None;
            None
        }
    };
    entity.movement_heading = Some(heading.unwrap_or(entity.angle));

    entity.angle += ROTATION_RATE * SPIN_SCALE;

    physics::update(entity, bounds, launches);
}

fn steer(entity: &mut Entity, aim: Vec2) -> f32 {
    entity.ai.inputs.flags.insert(InputFlags::SHOOT);
    entity.aim = Some(aim);
    band_heading(entity.angle, aim.distance_squared(entity.position))
}

/// Size relative to the nominal drone size.
pub(crate) fn size_factor(size: f32) -> f32 {
    size / NOMINAL_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{boss::OMEGA_SUMMONER_BARREL, entity::test_id};
    use shape_arena_core::{Relation, Relations};

    const EPSILON: f32 = 1e-5;

    fn launch() -> Launch {
        Launch {
            parent: test_id(1),
            barrel_index: 0,
            definition: OMEGA_SUMMONER_BARREL,
            team: Relation::Arena,
            origin: Vec2::ZERO,
            angle: 0.0,
        }
    }

    fn minion() -> Entity {
        create(test_id(2), &launch(), 0.0)
    }

    fn controller(flags: InputFlags, mouse: Vec2) -> ControllerSnapshot {
        ControllerSnapshot {
            position: Vec2::ZERO,
            inputs: Inputs { flags, mouse },
            reload_time: 1.0,
        }
    }

    fn still_minion() -> Entity {
        let mut minion = minion();
        minion.velocity = Vec2::ZERO;
        minion
    }

    #[test]
    fn construction_rewrites_collision_flags() {
        let minion = minion();
        assert_eq!(minion.flags(), PhysicsFlags::ONLY_SAME_OWNER_COLLISION);
        assert_eq!(
            minion.relations(),
            Relations {
                team: Relation::Arena,
                owner: Relation::Entity(test_id(1)),
            }
        );
        assert_eq!(minion.sides(), 4);
        assert_eq!(minion.color(), Color::EnemySquare);
        assert!((minion.size() - 42.0 * SIZE_SCALE).abs() < EPSILON);
        assert!((minion.size_factor() - 42.0 * SIZE_SCALE / NOMINAL_SIZE).abs() < EPSILON);
        assert_eq!(minion.lifetime(), Some(250));
    }

    #[test]
    fn flag_edits_hold_for_bodies_without_drone_flags() {
        let mut plain = launch();
        plain.definition.bullet.kind = BulletKind::Bullet;
        let body = barrel::projectile(test_id(3), &plain, 0.0, Behavior::Bullet);
        assert!(!body.flags().contains(PhysicsFlags::NO_OWN_TEAM_COLLISION));
        assert!(!body.flags().contains(PhysicsFlags::CAN_ESCAPE_ARENA));

        let minion = create(test_id(2), &plain, 0.0);
        assert_eq!(minion.flags(), PhysicsFlags::ONLY_SAME_OWNER_COLLISION);
    }

    #[test]
    fn construction_mounts_uncontrollable_drone_spawners() {
        let minion = minion();
        assert_eq!(minion.barrels().len(), SPAWNER_COUNT);
        for (index, barrel) in minion.barrels().iter().enumerate() {
            let definition = barrel.definition();
            assert!((definition.angle - FRAC_PI_2 * index as f32).abs() < EPSILON);
            assert!(!definition.can_control_drones);
            assert_eq!(definition.bullet.kind, BulletKind::Drone);
        }
    }

    #[test]
    fn controller_drives_only_controllable_minions_while_shooting() {
        let shooting = Inputs {
            flags: InputFlags::SHOOT,
            mouse: Vec2::ZERO,
        };
        let repelling = Inputs {
            flags: InputFlags::REPEL,
            mouse: Vec2::ZERO,
        };
        let idle = Inputs::default();

        assert_eq!(
            arbitrate(true, Some(&shooting), AiState::Idle),
            ControlSource::PlayerControlled
        );
        assert_eq!(
            arbitrate(true, Some(&repelling), AiState::Active),
            ControlSource::PlayerControlled
        );
        assert_eq!(
            arbitrate(false, Some(&shooting), AiState::Active),
            ControlSource::AiActive
        );
        assert_eq!(
            arbitrate(true, Some(&idle), AiState::Idle),
            ControlSource::AiIdle
        );
        assert_eq!(
            arbitrate(true, None, AiState::Active),
            ControlSource::AiIdle,
            "vanished controller degrades to idle drift"
        );
    }

    #[test]
    fn band_heading_switches_at_focus_thresholds() {
        let facing = 0.3;
        assert!((band_heading(facing, 0.0) - (facing + PI)).abs() < EPSILON);
        assert!((band_heading(facing, FOCUS_RADIUS - 1.0) - (facing + FRAC_PI_2)).abs() < EPSILON);
        assert!((band_heading(facing, FOCUS_RADIUS / 4.0) - (facing + FRAC_PI_2)).abs() < EPSILON);
        assert!((band_heading(facing, FOCUS_RADIUS) - facing).abs() < EPSILON);
        assert!((band_heading(facing, 2.0 * FOCUS_RADIUS) - facing).abs() < EPSILON);
    }

    #[test]
    fn idle_minion_drifts_along_facing_and_spins() {
        let mut minion = still_minion();
        minion.angle = 1.0;
        let mut launches = Vec::new();

        tick(
            &mut minion,
            Some(controller(InputFlags::empty(), Vec2::ZERO)),
            &ArenaBounds::centered(5_000.0),
            &mut launches,
        );

        assert_eq!(minion.movement_heading(), Some(1.0));
        assert!((minion.angle() - (1.0 + ROTATION_RATE * SPIN_SCALE)).abs() < EPSILON);
        assert!(!minion.ai().inputs.attempting_shot());
        assert!(matches!(
            minion.behavior(),
            Behavior::Minion(MinionState {
                control: ControlSource::AiIdle,
                ..
            })
        ));
    }

    #[test]
    fn active_minion_retreats_from_close_target_and_fires() {
        let mut minion = still_minion();
        minion.ai.state = AiState::Active;
        minion.ai.inputs.mouse = minion.position();
        let facing = minion.angle();
        let mut launches = Vec::new();

        tick(
            &mut minion,
            Some(controller(InputFlags::empty(), Vec2::ZERO)),
            &ArenaBounds::centered(5_000.0),
            &mut launches,
        );

        let heading = minion.movement_heading().expect("heading selected");
        assert!((heading - (facing + PI)).abs() < EPSILON);
        assert!(minion.ai().inputs.attempting_shot());
    }

    #[test]
    fn controlled_minion_follows_controller_aim() {
        let mut minion = still_minion();
        let facing = minion.angle();
        let far = minion.position() + Vec2::new(2.0 * 850.0, 0.0);
        let mut launches = Vec::new();

        tick(
            &mut minion,
            Some(controller(InputFlags::SHOOT, far)),
            &ArenaBounds::centered(5_000.0),
            &mut launches,
        );

        assert_eq!(minion.movement_heading(), Some(facing));
        assert!(matches!(
            minion.behavior(),
            Behavior::Minion(MinionState {
                control: ControlSource::PlayerControlled,
                ..
            })
        ));
    }

    #[test]
    fn orphaned_minion_drifts() {
        let mut minion = still_minion();
        minion.ai.state = AiState::Active;
        minion.ai.inputs.mouse = minion.position();
        let facing = minion.angle();
        let mut launches = Vec::new();

        tick(&mut minion, None, &ArenaBounds::centered(5_000.0), &mut launches);

        assert_eq!(minion.movement_heading(), Some(facing));
    }
}
