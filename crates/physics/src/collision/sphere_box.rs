//! Sphere-cuboid narrow phase.

use glam::{Quat, Vec3};

use super::Manifold;
use crate::contact::ContactPoint;

/// Sphere centers closer than this to the box surface are treated as inside.
const SURFACE_EPSILON: f32 = 1e-4;

/// Overlap of a sphere (A) with an oriented cuboid (B).
///
/// The test runs in the box frame: the sphere center is clamped onto the box
/// to find the closest surface point. A center inside the box is pushed out
/// through the nearest face.
pub fn sphere_box(
    center: Vec3,
    radius: f32,
    box_position: Vec3,
    box_orientation: Quat,
    half_extents: Vec3,
) -> Option<Manifold> {
    let local = box_orientation.conjugate() * (center - box_position);
    let closest = local.clamp(-half_extents, half_extents);
    let delta = closest - local;
    let distance_squared = delta.length_squared();
    if distance_squared >= radius * radius {
        return None;
    }

    let distance = distance_squared.sqrt();
    let (local_normal, local_point, depth) = if distance > SURFACE_EPSILON {
        (delta / distance, closest, radius - distance)
    } else {
        let (face_normal, face_distance) = nearest_face(local, half_extents);
        let on_face = local + face_normal * face_distance;
        (-face_normal, on_face, radius + face_distance)
    };

    let normal = box_orientation * local_normal;
    let point = box_position + box_orientation * local_point;
    Some(Manifold::single(normal, ContactPoint::new(point, depth)))
}

/// Outward normal of the face nearest to an interior point, and the distance
/// to it.
fn nearest_face(local: Vec3, half_extents: Vec3) -> (Vec3, f32) {
    let gaps = half_extents - local.abs();
    let sign = |v: f32| if v < 0.0 { -1.0 } else { 1.0 };
    if gaps.x <= gaps.y && gaps.x <= gaps.z {
        (Vec3::new(sign(local.x), 0.0, 0.0), gaps.x)
    } else if gaps.y <= gaps.z {
        (Vec3::new(0.0, sign(local.y), 0.0), gaps.y)
    } else {
        (Vec3::new(0.0, 0.0, sign(local.z)), gaps.z)
    }
}
