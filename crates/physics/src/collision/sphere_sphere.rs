//! Sphere-sphere narrow phase.

use glam::Vec3;

use super::Manifold;
use crate::contact::ContactPoint;

/// Centers closer than this share a fallback normal.
const COINCIDENT_EPSILON: f32 = 1e-4;

/// Overlap of sphere A and sphere B, normal pointing from A to B.
pub fn sphere_sphere(center_a: Vec3, radius_a: f32, center_b: Vec3, radius_b: f32) -> Option<Manifold> {
    let delta = center_b - center_a;
    let distance_squared = delta.length_squared();
    let reach = radius_a + radius_b;
    if distance_squared >= reach * reach {
        return None;
    }
    let distance = distance_squared.sqrt();
    let normal = if distance > COINCIDENT_EPSILON { delta / distance } else { Vec3::Y };
    let depth = reach - distance;
    // Midway through the overlap.
    let point = center_a + normal * (radius_a - 0.5 * depth);
    Some(Manifold::single(normal, ContactPoint::new(point, depth)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_spheres() {
        let m = sphere_sphere(Vec3::ZERO, 1.0, Vec3::new(1.5, 0.0, 0.0), 1.0).unwrap();
        assert_eq!(m.normal, Vec3::X);
        assert!((m.points[0].penetration - 0.5).abs() < 1e-6);
        assert!((m.points[0].position.x - 0.75).abs() < 1e-6);
    }

    #[test]
    fn separated_and_touching_spheres() {
        assert!(sphere_sphere(Vec3::ZERO, 1.0, Vec3::new(3.0, 0.0, 0.0), 1.0).is_none());
        assert!(sphere_sphere(Vec3::ZERO, 1.0, Vec3::new(2.0, 0.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn coincident_centers_use_fallback_normal() {
        let m = sphere_sphere(Vec3::ONE, 0.5, Vec3::ONE, 0.5).unwrap();
        assert_eq!(m.normal, Vec3::Y);
        assert!((m.points[0].penetration - 1.0).abs() < 1e-6);
    }
}
