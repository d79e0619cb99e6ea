//! Identifiers and shape descriptions shared by bodies and colliders.

use glam::Vec3;
use serde::Deserialize;
use std::f32::consts::PI;
use std::fmt;

/// Stable identity of a body inside a [`crate::World`].
///
/// Ids are handed out in increasing order and never reused, so comparing two
/// ids gives a total order that survives insertions and removals. The contact
/// solver relies on that order to lock body pairs consistently.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub(crate) u64);

impl BodyId {
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    /// Moved by gravity, forces and contacts.
    #[default]
    Dynamic,
    /// Infinite mass and inertia. Never displaced or accelerated.
    Static,
}

/// Collision and mass geometry of a body, in body-local coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3 },
    /// Infinite plane through the body origin. Only meaningful on static bodies.
    Plane { normal: Vec3 },
}

impl Shape {
    #[must_use]
    pub fn volume(&self) -> f32 {
        match *self {
            Shape::Sphere { radius } => 4.0 / 3.0 * PI * radius.powi(3),
            Shape::Cuboid { half_extents } => 8.0 * half_extents.x * half_extents.y * half_extents.z,
            Shape::Plane { .. } => 0.0,
        }
    }

    /// Diagonal of the body-local inertia tensor for the given mass.
    #[must_use]
    pub fn principal_inertia(&self, mass: f32) -> Vec3 {
        match *self {
            Shape::Sphere { radius } => Vec3::splat(0.4 * mass * radius * radius),
            Shape::Cuboid { half_extents: h } => {
                let sq = h * h;
                Vec3::new(sq.y + sq.z, sq.x + sq.z, sq.x + sq.y) * (mass / 3.0)
            }
            Shape::Plane { .. } => Vec3::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_sphere_volume() {
        let s = Shape::Sphere { radius: 1.0 };
        assert!((s.volume() - 4.18879).abs() < 1e-4);
    }

    #[test]
    fn cube_inertia_matches_closed_form() {
        // Solid cube of side 2: I = m * (2² + 2²) / 12 = 2m/3.
        let c = Shape::Cuboid { half_extents: Vec3::ONE };
        let i = c.principal_inertia(3.0);
        assert!((i - Vec3::splat(2.0)).abs().max_element() < 1e-6);
    }

    #[test]
    fn plane_has_no_mass_geometry() {
        let p = Shape::Plane { normal: Vec3::Y };
        assert_eq!(p.volume(), 0.0);
        assert_eq!(p.principal_inertia(10.0), Vec3::ZERO);
    }

    #[test]
    fn ids_order_by_insertion() {
        assert!(BodyId(3) < BodyId(7));
        assert_eq!(BodyId(7).to_string(), "body#7");
    }
}
