#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks deterministic AI targets from entity snapshots.

use glam::Vec2;
use shape_arena_core::{AiState, Command, EntityId, EntityKind, EntityView, Relation};

/// AI targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct AiTargeting {
    hunter_workspace: Vec<Hunter>,
    prey_workspace: Vec<Prey>,
}

impl AiTargeting {
    /// Creates a new AI targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits one target assignment for every autonomous entity in the view.
    ///
    /// Entities with a zero view range and possessed entities are skipped.
    /// Each remaining entity is assigned the nearest hostile tank within its
    /// view range, or no target when none qualifies.
    pub fn handle(&mut self, entities: &EntityView, out: &mut Vec<Command>) {
        self.prepare_workspaces(entities);

        for hunter in &self.hunter_workspace {
            let max_distance = hunter.view_range * hunter.view_range;
            let mut best: Option<BestCandidate> = None;

            for prey in &self.prey_workspace {
                if prey.team == hunter.team {
                    continue;
                }

                let distance_sq = prey.position.distance_squared(hunter.position);
                if distance_sq > max_distance {
                    continue;
                }

                let current = BestCandidate {
                    distance_sq,
                    prey: prey.id,
                    position: prey.position,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            out.push(Command::AssignAiTarget {
                entity: hunter.id,
                target: best.map(|candidate| candidate.position),
            });
        }
    }

    fn prepare_workspaces(&mut self, entities: &EntityView) {
        self.hunter_workspace.clear();
        self.prey_workspace.clear();

        for snapshot in entities.iter() {
            if snapshot.kind == EntityKind::Tank {
                self.prey_workspace.push(Prey {
                    id: snapshot.id,
                    team: snapshot.relations.team,
                    position: snapshot.position,
                });
            }

            if snapshot.view_range > 0.0 && snapshot.ai_state != AiState::Possessed {
                self.hunter_workspace.push(Hunter {
                    id: snapshot.id,
                    team: snapshot.relations.team,
                    position: snapshot.position,
                    view_range: snapshot.view_range,
                });
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Hunter {
    id: EntityId,
    team: Relation,
    position: Vec2,
    view_range: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Prey {
    id: EntityId,
    team: Relation,
    position: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance_sq: f32,
    prey: EntityId,
    position: Vec2,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }

        self.prey < other.prey
    }
}
