//! Sphere-plane narrow phase.

use glam::Vec3;

use super::Manifold;
use crate::contact::ContactPoint;

/// Overlap of a sphere (A) with the half-space below a plane (B).
///
/// `plane_normal` is the world-space unit normal of the plane's solid side
/// boundary; the manifold normal points from the sphere into the plane.
pub fn sphere_plane(center: Vec3, radius: f32, plane_origin: Vec3, plane_normal: Vec3) -> Option<Manifold> {
    let distance = (center - plane_origin).dot(plane_normal);
    if distance >= radius {
        return None;
    }
    // Projection of the center onto the plane.
    let point = center - plane_normal * distance;
    Some(Manifold::single(-plane_normal, ContactPoint::new(point, radius - distance)))
}
