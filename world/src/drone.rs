//! Plain drones and bullets.

use shape_arena_core::ArenaBounds;

use crate::{
    barrel::Launch,
    entity::{Behavior, ControllerSnapshot, Entity},
    physics,
};

/// Steers a drone toward its owner's aim while the owner shoots and back
/// toward the owner otherwise. Bullets and orphans keep flying along their
/// facing.
pub(crate) fn tick(
    entity: &mut Entity,
    owner: Option<ControllerSnapshot>,
    bounds: &ArenaBounds,
    launches: &mut Vec<Launch>,
) {
    let target = match owner {
        Some(owner) if matches!(entity.behavior, Behavior::Drone) => {
            if owner.inputs.attempting_shot() {
                Some(owner.inputs.mouse)
            } else {
                Some(owner.position)
            }
        }
        _ => None,
    };

    entity.aim = target;
    entity.movement_heading = target
        .and_then(|target| physics::heading_toward(entity.position, target))
        .or(Some(entity.angle));

    physics::update(entity, bounds, launches);
}
