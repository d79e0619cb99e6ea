//! Cuboid-plane narrow phase.

use glam::{Quat, Vec3};

use super::Manifold;
use crate::contact::ContactPoint;

/// Corners of an oriented cuboid below a plane (B), one contact point each.
///
/// A box lying flat produces four points, a box on an edge two and a box on
/// a corner one. The manifold normal points from the box into the plane.
pub fn box_plane(
    box_position: Vec3,
    box_orientation: Quat,
    half_extents: Vec3,
    plane_origin: Vec3,
    plane_normal: Vec3,
) -> Option<Manifold> {
    let points: Vec<ContactPoint> = corners(box_position, box_orientation, half_extents)
        .into_iter()
        .filter_map(|corner| {
            let distance = (corner - plane_origin).dot(plane_normal);
            (distance < 0.0).then(|| ContactPoint::new(corner, -distance))
        })
        .collect();
    if points.is_empty() {
        return None;
    }
    Some(Manifold {
        normal: -plane_normal,
        points,
    })
}

fn corners(position: Vec3, orientation: Quat, half_extents: Vec3) -> [Vec3; 8] {
    let mut out = [Vec3::ZERO; 8];
    for (i, corner) in out.iter_mut().enumerate() {
        let sign = Vec3::new(
            if i & 1 == 0 { -1.0 } else { 1.0 },
            if i & 2 == 0 { -1.0 } else { 1.0 },
            if i & 4 == 0 { -1.0 } else { 1.0 },
        );
        *corner = position + orientation * (sign * half_extents);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_box_touches_with_four_corners() {
        let m = box_plane(Vec3::new(0.0, 0.45, 0.0), Quat::IDENTITY, Vec3::splat(0.5), Vec3::ZERO, Vec3::Y).unwrap();
        assert_eq!(m.points.len(), 4);
        assert_eq!(m.normal, Vec3::NEG_Y);
        for p in &m.points {
            assert!((p.penetration - 0.05).abs() < 1e-5);
        }
    }

    #[test]
    fn tilted_box_touches_with_one_edge() {
        let q = Quat::from_rotation_z(std::f32::consts::FRAC_PI_4);
        let lowest = 0.5 * 2.0_f32.sqrt();
        let m = box_plane(Vec3::new(0.0, lowest - 0.01, 0.0), q, Vec3::splat(0.5), Vec3::ZERO, Vec3::Y).unwrap();
        assert_eq!(m.points.len(), 2);
    }

    #[test]
    fn box_above_plane() {
        assert!(box_plane(Vec3::new(0.0, 2.0, 0.0), Quat::IDENTITY, Vec3::ONE, Vec3::ZERO, Vec3::Y).is_none());
    }
}
