//! # Collision Detection
//!
//! The world asks a [`CollisionDetector`] for a fresh set of
//! [`ContactConstraint`]s once per substep, right after integration. The
//! detector sees the whole body set read-only and owns whatever spatial
//! index it needs between calls.
//!
//! [`ShapeCollider`] is the built-in detector: an AABB sweep over every body
//! followed by closed-form narrow-phase tests for sphere-sphere,
//! sphere-plane, sphere-cuboid and cuboid-plane pairs. Cuboid-cuboid contact
//! is not generated.

mod box_plane;
mod broad_phase;
mod sphere_box;
mod sphere_plane;
mod sphere_sphere;

pub use box_plane::box_plane;
pub use broad_phase::{overlapping_pairs, Aabb};
pub use sphere_box::sphere_box;
pub use sphere_plane::sphere_plane;
pub use sphere_sphere::sphere_sphere;

use glam::{Quat, Vec3};
use thiserror::Error;

use crate::body_set::BodySet;
use crate::contact::{ContactConstraint, ContactPoint, DEFAULT_COMPLIANCE};
use crate::material::{CombineRule, Material, MaterialCombiner};
use crate::types::Shape;

#[derive(Error, Debug)]
pub enum CollisionError {
    #[error("collision detection failed: {0}")]
    Failed(String),
}

/// Produces the contact constraints for one substep.
pub trait CollisionDetector: Send {
    fn detect(&mut self, bodies: &BodySet) -> Result<Vec<ContactConstraint>, CollisionError>;
}

impl<F> CollisionDetector for F
where
    F: FnMut(&BodySet) -> Result<Vec<ContactConstraint>, CollisionError> + Send,
{
    fn detect(&mut self, bodies: &BodySet) -> Result<Vec<ContactConstraint>, CollisionError> {
        self(bodies)
    }
}

/// Detector that never reports contact.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoCollisions;

impl CollisionDetector for NoCollisions {
    fn detect(&mut self, _bodies: &BodySet) -> Result<Vec<ContactConstraint>, CollisionError> {
        Ok(Vec::new())
    }
}

/// Contact normal and points between two shapes, normal pointing from the
/// first shape to the second.
#[derive(Clone, Debug, PartialEq)]
pub struct Manifold {
    pub normal: Vec3,
    pub points: Vec<ContactPoint>,
}

impl Manifold {
    fn single(normal: Vec3, point: ContactPoint) -> Self {
        Self {
            normal,
            points: vec![point],
        }
    }
}

/// Per-body data the narrow phase needs, copied out under the body's lock.
#[derive(Copy, Clone, Debug)]
struct Proxy {
    position: Vec3,
    orientation: Quat,
    shape: Shape,
    material: Material,
    inert: bool,
}

/// Built-in detector for the primitive [`Shape`]s.
#[derive(Debug)]
pub struct ShapeCollider {
    rule: CombineRule,
    compliance: f32,
    proxies: Vec<Proxy>,
    bounds: Vec<Aabb>,
    order: Vec<usize>,
    pairs: Vec<(usize, usize)>,
}

impl Default for ShapeCollider {
    fn default() -> Self {
        Self::new(CombineRule::default())
    }
}

impl ShapeCollider {
    #[must_use]
    pub fn new(rule: CombineRule) -> Self {
        Self {
            rule,
            compliance: DEFAULT_COMPLIANCE,
            proxies: Vec::new(),
            bounds: Vec::new(),
            order: Vec::new(),
            pairs: Vec::new(),
        }
    }

    /// Compliance assigned to every emitted constraint.
    #[must_use]
    pub const fn with_compliance(mut self, compliance: f32) -> Self {
        self.compliance = compliance;
        self
    }

    fn gather(&mut self, bodies: &BodySet) {
        self.proxies.clear();
        self.bounds.clear();
        for cell in bodies.iter() {
            let inert = cell.is_inert();
            let body = cell.lock();
            let proxy = Proxy {
                position: body.position,
                orientation: body.orientation(),
                shape: *body.shape(),
                material: *body.material(),
                inert,
            };
            drop(body);
            self.bounds
                .push(Aabb::of_shape(&proxy.shape, proxy.position, proxy.orientation));
            self.proxies.push(proxy);
        }
    }

    /// Narrow phase for slots `i` and `j`. Returns the slots in the order the
    /// manifold normal refers to.
    fn narrow(&self, i: usize, j: usize) -> Option<(usize, usize, Manifold)> {
        let (a, b) = (&self.proxies[i], &self.proxies[j]);
        match (a.shape, b.shape) {
            (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) => {
                sphere_sphere(a.position, ra, b.position, rb).map(|m| (i, j, m))
            }
            (Shape::Sphere { radius }, Shape::Plane { normal }) => {
                sphere_plane(a.position, radius, b.position, b.orientation * normal).map(|m| (i, j, m))
            }
            (Shape::Plane { normal }, Shape::Sphere { radius }) => {
                sphere_plane(b.position, radius, a.position, a.orientation * normal).map(|m| (j, i, m))
            }
            (Shape::Sphere { radius }, Shape::Cuboid { half_extents }) => {
                sphere_box(a.position, radius, b.position, b.orientation, half_extents).map(|m| (i, j, m))
            }
            (Shape::Cuboid { half_extents }, Shape::Sphere { radius }) => {
                sphere_box(b.position, radius, a.position, a.orientation, half_extents).map(|m| (j, i, m))
            }
            (Shape::Cuboid { half_extents }, Shape::Plane { normal }) => {
                box_plane(a.position, a.orientation, half_extents, b.position, b.orientation * normal)
                    .map(|m| (i, j, m))
            }
            (Shape::Plane { normal }, Shape::Cuboid { half_extents }) => {
                box_plane(b.position, b.orientation, half_extents, a.position, a.orientation * normal)
                    .map(|m| (j, i, m))
            }
            (Shape::Cuboid { .. }, Shape::Cuboid { .. }) => {
                tracing::trace!(i, j, "No narrow phase for cuboid pair.");
                None
            }
            (Shape::Plane { .. }, Shape::Plane { .. }) => None,
        }
    }
}

impl CollisionDetector for ShapeCollider {
    fn detect(&mut self, bodies: &BodySet) -> Result<Vec<ContactConstraint>, CollisionError> {
        self.gather(bodies);

        let proxies = &self.proxies;
        overlapping_pairs(&self.bounds, &mut self.order, &mut self.pairs, |i, j| {
            proxies[i].inert && proxies[j].inert
        });

        let mut constraints = Vec::with_capacity(self.pairs.len());
        for &(i, j) in &self.pairs {
            let Some((a, b, manifold)) = self.narrow(i, j) else {
                continue;
            };
            let material = self
                .rule
                .combine(&self.proxies[a].material, &self.proxies[b].material);
            constraints.push(
                ContactConstraint::new(a, b, manifold.normal)
                    .with_points(manifold.points)
                    .with_compliance(self.compliance)
                    .with_material(material),
            );
        }
        Ok(constraints)
    }
}
