//! Per-substep phases of [`crate::World::step`].
//!
//! Each function runs one phase over the whole body or constraint set and
//! returns only once every item is done, so consecutive calls form the
//! barriers between phases.

mod contact;
mod integration;

pub(crate) use contact::{solve_positions, solve_velocities};
pub(crate) use integration::{commit_velocities, integrate_bodies, update_sleep};
