//! Sort-and-sweep broad phase over axis-aligned bounding boxes.

use glam::{Mat3, Quat, Vec3};

use crate::types::Shape;

/// Axis-aligned bounding box. Planes get an infinite one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EVERYTHING: Aabb = Aabb {
        min: Vec3::NEG_INFINITY,
        max: Vec3::INFINITY,
    };

    #[must_use]
    pub fn of_shape(shape: &Shape, position: Vec3, orientation: Quat) -> Self {
        let extent = match *shape {
            Shape::Sphere { radius } => Vec3::splat(radius),
            Shape::Cuboid { half_extents: h } => {
                let r = Mat3::from_quat(orientation);
                r.x_axis.abs() * h.x + r.y_axis.abs() * h.y + r.z_axis.abs() * h.z
            }
            Shape::Plane { .. } => return Self::EVERYTHING,
        };
        Self {
            min: position - extent,
            max: position + extent,
        }
    }

    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

/// Index pairs `(i, j)` with `i < j` whose boxes overlap.
///
/// Entries are swept along x. `skip` filters pairs before the full overlap
/// test; the collider uses it to drop pairs where neither body can move.
/// `order` is scratch space reused across calls.
pub fn overlapping_pairs(
    boxes: &[Aabb],
    order: &mut Vec<usize>,
    pairs: &mut Vec<(usize, usize)>,
    skip: impl Fn(usize, usize) -> bool,
) {
    pairs.clear();
    order.clear();
    order.extend(0..boxes.len());
    order.sort_unstable_by(|&a, &b| boxes[a].min.x.total_cmp(&boxes[b].min.x));

    for (k, &i) in order.iter().enumerate() {
        for &j in &order[k + 1..] {
            if boxes[j].min.x > boxes[i].max.x {
                break;
            }
            if skip(i, j) || !boxes[i].overlaps(&boxes[j]) {
                continue;
            }
            pairs.push((i.min(j), i.max(j)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(x: f32) -> Aabb {
        Aabb::of_shape(&Shape::Sphere { radius: 0.5 }, Vec3::new(x, 0.0, 0.0), Quat::IDENTITY)
    }

    #[test]
    fn finds_only_touching_pairs() {
        let boxes = [ball(0.0), ball(5.0), ball(0.8), ball(10.0)];
        let mut pairs = Vec::new();
        overlapping_pairs(&boxes, &mut Vec::new(), &mut pairs, |_, _| false);
        assert_eq!(pairs, vec![(0, 2)]);
    }

    #[test]
    fn plane_overlaps_everything() {
        let plane = Aabb::of_shape(&Shape::Plane { normal: Vec3::Y }, Vec3::ZERO, Quat::IDENTITY);
        let boxes = [ball(-100.0), plane, ball(100.0)];
        let mut pairs = Vec::new();
        overlapping_pairs(&boxes, &mut Vec::new(), &mut pairs, |_, _| false);
        pairs.sort_unstable();
        assert_eq!(pairs, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn skip_filter_drops_pairs() {
        let boxes = [ball(0.0), ball(0.5)];
        let mut pairs = Vec::new();
        overlapping_pairs(&boxes, &mut Vec::new(), &mut pairs, |_, _| true);
        assert!(pairs.is_empty());
    }

    #[test]
    fn rotated_cuboid_grows() {
        let q = Quat::from_rotation_z(std::f32::consts::FRAC_PI_4);
        let aabb = Aabb::of_shape(&Shape::Cuboid { half_extents: Vec3::ONE }, Vec3::ZERO, q);
        assert!((aabb.max.x - 2.0_f32.sqrt()).abs() < 1e-5);
        assert!((aabb.max.z - 1.0).abs() < 1e-5);
    }
}
