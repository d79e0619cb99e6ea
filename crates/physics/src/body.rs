//! Rigid body state.

use glam::{Mat3, Quat, Vec3};

use crate::material::Material;
use crate::types::{BodyType, Shape};

/// Below this rotation magnitude a correction is treated as zero.
pub(crate) const ANGULAR_EPSILON: f32 = 1e-10;

/// Velocity components smaller than this are snapped to zero after solving.
pub const VELOCITY_EPSILON: f32 = 1e-7;

/// Oriented rigid body.
///
/// The transform, velocities and the presolve snapshot are what the solver
/// reads and writes. Mass properties are fixed at construction and the
/// body type never changes, which keeps the "static bodies have zero inverse
/// mass" invariant local to this type.
#[derive(Clone, Debug)]
pub struct RigidBody {
    pub position: Vec3,
    orientation: Quat,
    inverse_orientation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    presolve_linear_velocity: Vec3,
    presolve_angular_velocity: Vec3,
    previous_position: Vec3,
    previous_orientation: Quat,
    /// Constant force applied during every integration step.
    pub external_force: Vec3,
    /// Time spent below the sleep thresholds. Owned by the sleep policy.
    pub sleep_timer: f32,
    body_type: BodyType,
    shape: Shape,
    material: Material,
    mass: f32,
    inverse_mass: f32,
    // Diagonal of the local inverse inertia tensor.
    inverse_inertia: Vec3,
}

impl RigidBody {
    /// Create a body at the origin whose mass is `density × volume`.
    #[must_use]
    pub fn new(body_type: BodyType, shape: Shape, material: Material) -> Self {
        let mut body = Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            inverse_orientation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            presolve_linear_velocity: Vec3::ZERO,
            presolve_angular_velocity: Vec3::ZERO,
            previous_position: Vec3::ZERO,
            previous_orientation: Quat::IDENTITY,
            external_force: Vec3::ZERO,
            sleep_timer: 0.0,
            body_type,
            shape,
            material,
            mass: 0.0,
            inverse_mass: 0.0,
            inverse_inertia: Vec3::ZERO,
        };
        body.set_mass(material.density * shape.volume());
        body
    }

    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self.previous_position = position;
        self
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.set_orientation(orientation);
        self.previous_orientation = self.orientation;
        self
    }

    /// Set the linear velocity and use it as the presolve baseline too.
    /// Ignored for static bodies.
    #[must_use]
    pub fn with_linear_velocity(mut self, velocity: Vec3) -> Self {
        if self.is_dynamic() {
            self.linear_velocity = velocity;
            self.presolve_linear_velocity = velocity;
        }
        self
    }

    /// Set the angular velocity and use it as the presolve baseline too.
    /// Ignored for static bodies.
    #[must_use]
    pub fn with_angular_velocity(mut self, velocity: Vec3) -> Self {
        if self.is_dynamic() {
            self.angular_velocity = velocity;
            self.presolve_angular_velocity = velocity;
        }
        self
    }

    /// Override the density-derived mass; inertia is rescaled to match.
    #[must_use]
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.set_mass(mass);
        self
    }

    fn set_mass(&mut self, mass: f32) {
        if self.body_type == BodyType::Static {
            self.mass = f32::INFINITY;
            self.inverse_mass = 0.0;
            self.inverse_inertia = Vec3::ZERO;
            return;
        }
        self.mass = mass;
        self.inverse_mass = if mass.is_finite() && mass > 0.0 { mass.recip() } else { 0.0 };
        let inertia = self.shape.principal_inertia(mass);
        let invert = |i: f32| if i.is_finite() && i > 0.0 { i.recip() } else { 0.0 };
        self.inverse_inertia = Vec3::new(invert(inertia.x), invert(inertia.y), invert(inertia.z));
    }

    #[must_use]
    pub const fn body_type(&self) -> BodyType {
        self.body_type
    }

    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub const fn material(&self) -> &Material {
        &self.material
    }

    #[must_use]
    pub const fn mass(&self) -> f32 {
        self.mass
    }

    #[must_use]
    pub const fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    #[must_use]
    pub const fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Conjugate of the orientation, kept in sync with every rotation update.
    #[must_use]
    pub const fn inverse_orientation(&self) -> Quat {
        self.inverse_orientation
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation.normalize();
        self.inverse_orientation = self.orientation.conjugate();
    }

    #[must_use]
    pub const fn presolve_linear_velocity(&self) -> Vec3 {
        self.presolve_linear_velocity
    }

    #[must_use]
    pub const fn presolve_angular_velocity(&self) -> Vec3 {
        self.presolve_angular_velocity
    }

    /// Record the current velocities as the restitution baseline.
    pub fn snapshot_presolve_velocity(&mut self) {
        self.presolve_linear_velocity = self.linear_velocity;
        self.presolve_angular_velocity = self.angular_velocity;
    }

    /// World-space inverse inertia tensor, `R · diag(I⁻¹) · Rᵀ`.
    #[must_use]
    pub fn inverse_inertia_world(&self) -> Mat3 {
        if self.inverse_inertia == Vec3::ZERO {
            return Mat3::ZERO;
        }
        let r = Mat3::from_quat(self.orientation);
        r * Mat3::from_diagonal(self.inverse_inertia) * r.transpose()
    }

    /// Velocity of the material point currently at `point`.
    #[must_use]
    pub fn velocity_at(&self, point: Vec3) -> Vec3 {
        self.linear_velocity + self.angular_velocity.cross(point - self.position)
    }

    /// Same as [`RigidBody::velocity_at`], using the presolve snapshot.
    #[must_use]
    pub fn presolve_velocity_at(&self, point: Vec3) -> Vec3 {
        self.presolve_linear_velocity + self.presolve_angular_velocity.cross(point - self.position)
    }

    /// Express a world-space point in body-local coordinates.
    #[must_use]
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        self.inverse_orientation * (point - self.position)
    }

    #[must_use]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.position + self.orientation * local
    }

    #[must_use]
    pub fn linear_momentum(&self) -> Vec3 {
        if self.is_static() {
            Vec3::ZERO
        } else {
            self.linear_velocity * self.mass
        }
    }

    /// Zero every velocity, including the presolve baseline.
    pub fn halt(&mut self) {
        self.linear_velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
        self.presolve_linear_velocity = Vec3::ZERO;
        self.presolve_angular_velocity = Vec3::ZERO;
    }

    /// Advance velocity and transform by `h` under `gravity`.
    ///
    /// Stores the pre-integration transform for [`RigidBody::commit_velocity`]
    /// and snapshots the integrated velocity as the presolve baseline.
    pub(crate) fn integrate(&mut self, gravity: Vec3, h: f32) {
        if !self.is_dynamic() {
            return;
        }
        self.previous_position = self.position;
        self.previous_orientation = self.orientation;

        self.linear_velocity += (gravity + self.external_force * self.inverse_mass) * h;
        self.position += self.linear_velocity * h;

        let w = self.angular_velocity;
        let spin = Quat::from_xyzw(w.x, w.y, w.z, 0.0) * self.orientation;
        self.set_orientation(self.orientation + spin * (0.5 * h));

        self.snapshot_presolve_velocity();
    }

    /// Keep a sleeping body where it is for one substep.
    ///
    /// The previous transform and presolve baseline are refreshed so a
    /// collision that nudges the body still commits a sensible velocity.
    pub(crate) fn hold(&mut self) {
        if !self.is_dynamic() {
            return;
        }
        self.previous_position = self.position;
        self.previous_orientation = self.orientation;
        self.snapshot_presolve_velocity();
    }

    /// Replace the tentative velocities with the ones implied by the
    /// position change over the substep.
    pub(crate) fn commit_velocity(&mut self, h: f32) {
        if !self.is_dynamic() {
            return;
        }
        self.linear_velocity = (self.position - self.previous_position) / h;

        let dq = self.orientation * self.previous_orientation.conjugate();
        let w = Vec3::new(dq.x, dq.y, dq.z) * (2.0 / h);
        // Shortest arc.
        self.angular_velocity = if dq.w >= 0.0 { w } else { -w };
    }

    /// Shift and rotate the body by a solver correction.
    pub(crate) fn apply_position_correction(&mut self, translation: Vec3, rotation: Vec3) {
        if !self.is_dynamic() {
            return;
        }
        self.position += translation;
        if rotation.length() >= ANGULAR_EPSILON {
            let half = rotation * 0.5;
            let dq = Quat::from_xyzw(half.x, half.y, half.z, 1.0).normalize();
            self.set_orientation(dq * self.orientation);
        }
    }

    pub(crate) fn apply_velocity_change(&mut self, linear: Vec3, angular: Vec3) {
        if !self.is_dynamic() {
            return;
        }
        self.linear_velocity += linear;
        self.angular_velocity += angular;
    }

    /// Snap velocity components below [`VELOCITY_EPSILON`] to exactly zero.
    pub(crate) fn clamp_small_velocities(&mut self) {
        self.linear_velocity = snap_to_zero(self.linear_velocity);
        self.angular_velocity = snap_to_zero(self.angular_velocity);
    }
}

fn snap_to_zero(v: Vec3) -> Vec3 {
    Vec3::select(v.abs().cmplt(Vec3::splat(VELOCITY_EPSILON)), Vec3::ZERO, v)
}
