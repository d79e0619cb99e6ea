//! # Contact Constraints
//!
//! XPBD position and velocity passes for one body pair and its contact
//! manifold.
//!
//! Both passes treat the whole manifold as a single constraint. The position
//! pass sums the effective inverse mass and the penetration of every
//! penetrating point and applies one correction (one linear shift and one
//! rotation per body). The velocity pass computes a restitution and Coulomb
//! friction impulse per point from the velocities at the start of the pass
//! and applies their sum once per body, so no point sees another point's
//! correction within a pass.
//!
//! Constraints are built fresh for every substep by a
//! [`crate::collision::CollisionDetector`], solved once by each pass and then
//! dropped. Nothing is carried over between substeps.

use glam::{Mat3, Vec3};

use crate::body::RigidBody;
use crate::body_set::BodySet;
use crate::material::{CombineRule, CombinedMaterial, MaterialCombiner};

/// Default constraint compliance (inverse stiffness). Zero is perfectly rigid.
pub const DEFAULT_COMPLIANCE: f32 = 1e-7;

/// Penetration at or below this depth does not count as contact.
pub const PENETRATION_EPSILON: f32 = 1e-6;

/// Effective inverse masses below this are treated as immovable.
const WEIGHT_EPSILON: f32 = 1e-9;

/// Tangential speeds at or below this skip friction.
const FRICTION_SPEED_EPSILON: f32 = 1e-6;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactPoint {
    /// World-space location.
    pub position: Vec3,
    /// Signed overlap along the constraint normal. Positive means penetrating.
    pub penetration: f32,
}

impl ContactPoint {
    #[must_use]
    pub const fn new(position: Vec3, penetration: f32) -> Self {
        Self {
            position,
            penetration,
        }
    }

    #[must_use]
    pub fn is_penetrating(&self) -> bool {
        self.penetration > PENETRATION_EPSILON
    }
}

/// Contact manifold between two bodies of a [`BodySet`].
#[derive(Clone, Debug)]
pub struct ContactConstraint {
    /// Slot of the first body.
    pub body_a: usize,
    /// Slot of the second body.
    pub body_b: usize,
    /// Unit normal pointing from A towards B.
    pub normal: Vec3,
    pub points: Vec<ContactPoint>,
    pub compliance: f32,
    /// Pre-resolved coefficients. When absent the solver combines the two
    /// bodies' materials with the default [`CombineRule`].
    pub material: Option<CombinedMaterial>,
}

impl ContactConstraint {
    #[must_use]
    pub fn new(body_a: usize, body_b: usize, normal: Vec3) -> Self {
        Self {
            body_a,
            body_b,
            normal,
            points: Vec::new(),
            compliance: DEFAULT_COMPLIANCE,
            material: None,
        }
    }

    #[must_use]
    pub fn with_point(mut self, point: ContactPoint) -> Self {
        self.points.push(point);
        self
    }

    #[must_use]
    pub fn with_points(mut self, points: impl IntoIterator<Item = ContactPoint>) -> Self {
        self.points.extend(points);
        self
    }

    #[must_use]
    pub const fn with_compliance(mut self, compliance: f32) -> Self {
        self.compliance = compliance;
        self
    }

    #[must_use]
    pub const fn with_material(mut self, material: CombinedMaterial) -> Self {
        self.material = Some(material);
        self
    }

    /// Both bodies asleep or static: neither pass has anything to do.
    fn is_inert(&self, bodies: &BodySet) -> bool {
        match (bodies.get(self.body_a), bodies.get(self.body_b)) {
            (Some(a), Some(b)) => a.is_inert() && b.is_inert(),
            _ => true,
        }
    }

    /// Push the two bodies apart along the normal.
    ///
    /// All penetrating points are folded into one XPBD multiplier update:
    ///
    /// ```text
    /// Δλ = −Σ penetration / (Σ w + compliance / h²)
    /// ```
    ///
    /// where `w` is the generalized inverse mass of each point along the
    /// normal. The resulting impulse shifts each body once and the summed
    /// `r × impulse` torques rotate each body once.
    pub fn solve_position(&self, bodies: &BodySet, h: f32) {
        if self.points.is_empty() || self.is_inert(bodies) {
            return;
        }
        let Some((mut a, mut b)) = bodies.lock_pair(self.body_a, self.body_b) else {
            tracing::trace!(a = self.body_a, b = self.body_b, "Skipping contact with invalid body pair.");
            return;
        };
        let n = self.normal;
        let pair = PairMass::new(&a, &b);

        let mut total_weight = 0.0;
        let mut total_penetration = 0.0;
        for p in self.points.iter().filter(|p| p.is_penetrating()) {
            total_weight += pair.along(n, p.position - a.position, p.position - b.position);
            total_penetration += p.penetration;
        }
        if total_weight <= WEIGHT_EPSILON {
            return;
        }

        let alpha_tilde = self.compliance / (h * h);
        let delta_lambda = -total_penetration / (total_weight + alpha_tilde);
        let impulse = n * delta_lambda;

        let mut torque_a = Vec3::ZERO;
        let mut torque_b = Vec3::ZERO;
        for p in self.points.iter().filter(|p| p.is_penetrating()) {
            torque_a += (p.position - a.position).cross(impulse);
            torque_b += (p.position - b.position).cross(-impulse);
        }

        a.apply_position_correction(impulse * pair.inv_mass_a, pair.inv_inertia_a * torque_a);
        b.apply_position_correction(-impulse * pair.inv_mass_b, pair.inv_inertia_b * torque_b);
    }

    /// Apply restitution and Coulomb friction on top of the committed
    /// velocities.
    pub fn solve_velocity(&self, bodies: &BodySet, _h: f32) {
        if self.points.is_empty() || self.is_inert(bodies) {
            return;
        }
        let Some((mut a, mut b)) = bodies.lock_pair(self.body_a, self.body_b) else {
            tracing::trace!(a = self.body_a, b = self.body_b, "Skipping contact with invalid body pair.");
            return;
        };
        let n = self.normal;
        let pair = PairMass::new(&a, &b);
        let material = self
            .material
            .unwrap_or_else(|| CombineRule::default().combine(a.material(), b.material()));

        let mut linear_a = Vec3::ZERO;
        let mut angular_a = Vec3::ZERO;
        let mut linear_b = Vec3::ZERO;
        let mut angular_b = Vec3::ZERO;

        for p in &self.points {
            let ra = p.position - a.position;
            let rb = p.position - b.position;

            let relative = b.velocity_at(p.position) - a.velocity_at(p.position);
            let normal_speed = relative.dot(n);
            let normal_speed_prev = (b.presolve_velocity_at(p.position) - a.presolve_velocity_at(p.position)).dot(n);

            let w_normal = pair.along(n, ra, rb);
            if w_normal <= WEIGHT_EPSILON {
                continue;
            }
            let target = -material.restitution * normal_speed_prev;
            let jn = normal_impulse(target, normal_speed, w_normal);
            if jn <= 0.0 {
                continue;
            }

            // Impulse on B; A receives the opposite.
            let mut impulse = n * jn;

            let tangential = relative - n * normal_speed;
            let sliding_speed = tangential.length();
            if sliding_speed > FRICTION_SPEED_EPSILON {
                let t = tangential / sliding_speed;
                let w_tangent = pair.along(t, ra, rb);
                if w_tangent > WEIGHT_EPSILON {
                    let jt = coulomb_friction(
                        sliding_speed / w_tangent,
                        jn,
                        material.static_friction,
                        material.dynamic_friction,
                    );
                    impulse -= t * jt;
                }
            }

            linear_b += impulse * pair.inv_mass_b;
            angular_b += pair.inv_inertia_b * rb.cross(impulse);
            linear_a -= impulse * pair.inv_mass_a;
            angular_a += pair.inv_inertia_a * ra.cross(-impulse);
        }

        a.apply_velocity_change(linear_a, angular_a);
        b.apply_velocity_change(linear_b, angular_b);
        a.clamp_small_velocities();
        b.clamp_small_velocities();
    }
}

/// Mass properties of a locked pair, sampled once per pass.
struct PairMass {
    inv_mass_a: f32,
    inv_mass_b: f32,
    inv_inertia_a: Mat3,
    inv_inertia_b: Mat3,
}

impl PairMass {
    fn new(a: &RigidBody, b: &RigidBody) -> Self {
        Self {
            inv_mass_a: a.inverse_mass(),
            inv_mass_b: b.inverse_mass(),
            inv_inertia_a: a.inverse_inertia_world(),
            inv_inertia_b: b.inverse_inertia_world(),
        }
    }

    /// Generalized inverse mass of the pair along `dir` at offsets `ra`, `rb`.
    fn along(&self, dir: Vec3, ra: Vec3, rb: Vec3) -> f32 {
        let rna = ra.cross(dir);
        let rnb = rb.cross(dir);
        self.inv_mass_a
            + self.inv_mass_b
            + (self.inv_inertia_a * rna).dot(rna)
            + (self.inv_inertia_b * rnb).dot(rnb)
    }
}

/// Impulse that drives the normal speed to `target`. Never attractive.
fn normal_impulse(target: f32, normal_speed: f32, w_normal: f32) -> f32 {
    ((target - normal_speed) / w_normal).max(0.0)
}

/// Clamp the sticking impulse to the Coulomb cone.
///
/// Inside the static band the impulse that stops sliding is applied as is.
/// Outside it the magnitude is limited to `dynamic × |jn|`.
fn coulomb_friction(sticking: f32, jn: f32, static_friction: f32, dynamic_friction: f32) -> f32 {
    let jn = jn.abs();
    if sticking <= static_friction * jn {
        sticking
    } else {
        (dynamic_friction * jn).min(sticking)
    }
}
