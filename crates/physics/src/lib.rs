#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Physics
//!
//! A substepped XPBD rigid-body engine with parallel contact solving.
//!
//! ## Key Components
//!
//! -   **Bodies:** [`RigidBody`] holds the transform, velocities and mass
//!     properties of a sphere, cuboid or static plane. Bodies live in a
//!     [`BodySet`], each behind its own lock and addressed by a stable
//!     [`BodyId`].
//! -   **Contacts:** a [`ContactConstraint`] is the manifold between two
//!     bodies. Its position pass removes penetration with a single
//!     compliance-weighted correction; its velocity pass applies restitution
//!     and Coulomb friction.
//! -   **World:** [`World::step`] splits a frame into substeps and runs
//!     integration, collision detection, both contact passes and the sleep
//!     check on a [`compute::WorkerPool`].
//! -   **Collaborators:** collision detection ([`CollisionDetector`]),
//!     material combination ([`MaterialCombiner`]) and sleeping
//!     ([`SleepPolicy`]) are traits with built-in implementations.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use physics::{Material, Vec3, World, WorldConfig};
//!
//! let mut world = World::new(WorldConfig::default())?;
//! world.add_ground(0.0, Material::default());
//! let ball = world.add_sphere(Vec3::new(0.0, 2.0, 0.0), 0.5, Material::bouncy());
//! world.run(1.0 / 60.0, 120);
//! println!("{:?}", world.body(ball).map(|b| b.position));
//! ```

pub mod body;
pub mod body_set;
pub mod builder;
pub mod collision;
pub mod contact;
pub mod error;
pub mod material;
pub mod sleep;
mod steps;
pub mod types;
pub mod world;

pub use body::{RigidBody, VELOCITY_EPSILON};
pub use body_set::{BodyCell, BodySet};
pub use collision::{CollisionDetector, CollisionError, NoCollisions, ShapeCollider};
pub use contact::{ContactConstraint, ContactPoint, DEFAULT_COMPLIANCE, PENETRATION_EPSILON};
pub use error::PhysicsError;
pub use glam::{Mat3, Quat, Vec3};
pub use material::{CombineRule, CombinedMaterial, Material, MaterialCombiner};
pub use sleep::{SleepConfig, SleepPolicy, ThresholdSleep};
pub use types::{BodyId, BodyType, Shape};
pub use world::{World, WorldConfig};
