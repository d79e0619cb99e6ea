use compute::WorkerPool;

use crate::body_set::BodySet;
use crate::contact::ContactConstraint;

/// Position pass over every constraint. Pairs are locked individually, so
/// constraints sharing a body may run on different workers.
pub(crate) fn solve_positions(pool: &WorkerPool, bodies: &BodySet, constraints: &[ContactConstraint], h: f32) {
    pool.for_each(constraints, |c| c.solve_position(bodies, h));
}

/// Velocity pass over every constraint.
pub(crate) fn solve_velocities(pool: &WorkerPool, bodies: &BodySet, constraints: &[ContactConstraint], h: f32) {
    pool.for_each(constraints, |c| c.solve_velocity(bodies, h));
}
