//! # World Builder Helpers
//!
//! Shorthand constructors for the common body kinds.

use glam::Vec3;

use crate::body::RigidBody;
use crate::material::Material;
use crate::types::{BodyId, BodyType, Shape};
use crate::world::World;

impl RigidBody {
    /// Dynamic sphere with density-derived mass.
    #[must_use]
    pub fn sphere(position: Vec3, radius: f32, material: Material) -> Self {
        Self::new(BodyType::Dynamic, Shape::Sphere { radius }, material).with_position(position)
    }

    /// Dynamic axis-aligned cuboid with density-derived mass.
    #[must_use]
    pub fn cuboid(position: Vec3, half_extents: Vec3, material: Material) -> Self {
        Self::new(BodyType::Dynamic, Shape::Cuboid { half_extents }, material).with_position(position)
    }

    /// Static infinite plane through `origin`.
    #[must_use]
    pub fn static_plane(origin: Vec3, normal: Vec3, material: Material) -> Self {
        Self::new(
            BodyType::Static,
            Shape::Plane {
                normal: normal.normalize_or_zero(),
            },
            material,
        )
        .with_position(origin)
    }
}

impl World {
    pub fn add_sphere(&mut self, position: Vec3, radius: f32, material: Material) -> BodyId {
        self.add_body(RigidBody::sphere(position, radius, material))
    }

    pub fn add_cuboid(&mut self, position: Vec3, half_extents: Vec3, material: Material) -> BodyId {
        self.add_body(RigidBody::cuboid(position, half_extents, material))
    }

    /// Static ground plane `y = height` facing up.
    pub fn add_ground(&mut self, height: f32, material: Material) -> BodyId {
        self.add_body(RigidBody::static_plane(Vec3::new(0.0, height, 0.0), Vec3::Y, material))
    }
}
