//! # World
//!
//! [`World`] owns the bodies and advances them in fixed substeps. One call
//! to [`World::step`] runs, for every substep and in this order:
//!
//! 1. integration of every awake dynamic body (parallel),
//! 2. a single query of the collision detector,
//! 3. the contact position pass (parallel over constraints),
//! 4. velocity commit from the position change (parallel),
//! 5. the contact velocity pass (parallel over constraints),
//! 6. the sleep check (sequential).
//!
//! Every phase finishes before the next one starts.

use compute::WorkerPool;
use glam::Vec3;
use parking_lot::MutexGuard;
use serde::Deserialize;

use crate::body::RigidBody;
use crate::body_set::{BodyCell, BodySet};
use crate::collision::{CollisionDetector, ShapeCollider};
use crate::error::PhysicsError;
use crate::material::CombineRule;
use crate::sleep::{SleepConfig, SleepPolicy, ThresholdSleep};
use crate::steps;
use crate::types::BodyId;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub gravity: Vec3,
    /// Substeps per [`World::step`].
    pub substeps: u32,
    /// Worker threads for the parallel phases. One runs everything inline.
    pub workers: usize,
    pub sleep: SleepConfig,
    /// Material rule used by the built-in collider.
    pub combine_rule: CombineRule,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            substeps: 8,
            workers: 1,
            sleep: SleepConfig::default(),
            combine_rule: CombineRule::default(),
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if self.substeps == 0 {
            return Err(PhysicsError::InvalidConfiguration("substeps must be at least 1"));
        }
        if self.workers == 0 {
            return Err(PhysicsError::InvalidConfiguration("workers must be at least 1"));
        }
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidConfiguration("gravity must be finite"));
        }
        let sleep = &self.sleep;
        if !(sleep.linear_threshold >= 0.0 && sleep.angular_threshold >= 0.0 && sleep.time_to_sleep >= 0.0) {
            return Err(PhysicsError::InvalidConfiguration("sleep thresholds must be non-negative"));
        }
        Ok(())
    }
}

pub struct World {
    bodies: BodySet,
    config: WorldConfig,
    pool: WorkerPool,
    detector: Box<dyn CollisionDetector>,
    sleep_policy: Box<dyn SleepPolicy>,
    last_contact_count: usize,
}

impl World {
    /// Create an empty world, using [`ShapeCollider`] for collisions and
    /// [`ThresholdSleep`] for deactivation.
    pub fn new(config: WorldConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        let pool = WorkerPool::new(config.workers)?;
        tracing::info!(
            workers = pool.workers(),
            substeps = config.substeps,
            "Created physics world."
        );
        Ok(Self {
            bodies: BodySet::new(),
            detector: Box::new(ShapeCollider::new(config.combine_rule)),
            sleep_policy: Box::new(ThresholdSleep),
            config,
            pool,
            last_contact_count: 0,
        })
    }

    pub fn add_body(&mut self, body: RigidBody) -> BodyId {
        self.bodies.insert(body)
    }

    /// Remove a body. The remaining bodies keep their relative order.
    pub fn remove_body(&mut self, id: BodyId) -> Option<RigidBody> {
        self.bodies.remove(id)
    }

    /// Lock and return a body.
    #[must_use]
    pub fn body(&self, id: BodyId) -> Option<MutexGuard<'_, RigidBody>> {
        self.bodies.cell(id).map(BodyCell::lock)
    }

    #[must_use]
    pub fn is_asleep(&self, id: BodyId) -> Option<bool> {
        self.bodies.cell(id).map(BodyCell::is_asleep)
    }

    /// Wake a body and restart its sleep timer.
    pub fn wake(&self, id: BodyId) -> Result<(), PhysicsError> {
        let cell = self.bodies.cell(id).ok_or(PhysicsError::UnknownBody(id))?;
        cell.lock().sleep_timer = 0.0;
        cell.set_asleep(false);
        Ok(())
    }

    /// Set the constant force on a body. Wakes it.
    pub fn set_external_force(&self, id: BodyId, force: Vec3) -> Result<(), PhysicsError> {
        let cell = self.bodies.cell(id).ok_or(PhysicsError::UnknownBody(id))?;
        {
            let mut body = cell.lock();
            body.external_force = force;
            body.sleep_timer = 0.0;
        }
        cell.set_asleep(false);
        Ok(())
    }

    #[must_use]
    pub const fn gravity(&self) -> Vec3 {
        self.config.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.config.gravity = gravity;
    }

    pub fn set_collision_detector(&mut self, detector: impl CollisionDetector + 'static) {
        self.detector = Box::new(detector);
    }

    pub fn set_sleep_policy(&mut self, policy: impl SleepPolicy + 'static) {
        self.sleep_policy = Box::new(policy);
    }

    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    #[must_use]
    pub const fn bodies(&self) -> &BodySet {
        &self.bodies
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Constraints produced in the last substep of the last step.
    #[must_use]
    pub const fn last_contact_count(&self) -> usize {
        self.last_contact_count
    }

    /// Sum of linear momentum over dynamic bodies.
    #[must_use]
    pub fn total_momentum(&self) -> Vec3 {
        self.bodies.iter().map(|cell| cell.lock().linear_momentum()).sum()
    }

    /// Advance the world by `dt` seconds.
    ///
    /// A non-positive or non-finite `dt` is ignored.
    pub fn step(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            tracing::warn!(dt, "Ignoring step with invalid time step.");
            return;
        }
        let substeps = self.config.substeps;
        #[allow(clippy::cast_precision_loss)]
        let h = dt / substeps as f32;
        for _ in 0..substeps {
            self.last_contact_count = self.substep(h);
        }
        tracing::debug!(
            dt,
            substeps,
            bodies = self.bodies.len(),
            contacts = self.last_contact_count,
            "Stepped world."
        );
    }

    /// Run `steps` consecutive steps of `dt`.
    pub fn run(&mut self, dt: f32, steps: usize) {
        for _ in 0..steps {
            self.step(dt);
        }
    }

    fn substep(&mut self, h: f32) -> usize {
        steps::integrate_bodies(&self.pool, &mut self.bodies, self.config.gravity, h);

        let constraints = match self.detector.detect(&self.bodies) {
            Ok(constraints) => constraints,
            Err(err) => {
                tracing::warn!(%err, "Collision detection failed; continuing without contacts.");
                Vec::new()
            }
        };

        steps::solve_positions(&self.pool, &self.bodies, &constraints, h);
        steps::commit_velocities(&self.pool, &mut self.bodies, h);
        steps::solve_velocities(&self.pool, &self.bodies, &constraints, h);
        steps::update_sleep(&mut self.bodies, self.sleep_policy.as_ref(), &self.config.sleep, h);

        constraints.len()
    }
}

impl Default for World {
    fn default() -> Self {
        let config = WorldConfig::default();
        Self {
            bodies: BodySet::new(),
            detector: Box::new(ShapeCollider::new(config.combine_rule)),
            sleep_policy: Box::new(ThresholdSleep),
            config,
            pool: WorkerPool::sequential(),
            last_contact_count: 0,
        }
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("bodies", &self.bodies.len())
            .field("config", &self.config)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionError, NoCollisions};
    use crate::contact::ContactConstraint;
    use crate::material::Material;
    use crate::types::{BodyType, Shape};

    fn ball(position: Vec3) -> RigidBody {
        RigidBody::new(BodyType::Dynamic, Shape::Sphere { radius: 0.5 }, Material::default())
            .with_position(position)
    }

    #[test]
    fn config_validation() {
        assert!(WorldConfig::default().validate().is_ok());
        let zero_substeps = WorldConfig {
            substeps: 0,
            ..WorldConfig::default()
        };
        assert!(matches!(World::new(zero_substeps), Err(PhysicsError::InvalidConfiguration(_))));
        let nan_gravity = WorldConfig {
            gravity: Vec3::NAN,
            ..WorldConfig::default()
        };
        assert!(nan_gravity.validate().is_err());
        let zero_workers = WorldConfig {
            workers: 0,
            ..WorldConfig::default()
        };
        assert!(zero_workers.validate().is_err());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: WorldConfig =
            serde_json::from_str(r#"{ "gravity": [0.0, -1.0, 0.0], "combine_rule": "max" }"#).unwrap();
        assert_eq!(config.gravity, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(config.combine_rule, CombineRule::Max);
        assert_eq!(config.substeps, 8);
    }

    #[test]
    fn invalid_dt_is_ignored() {
        let mut world = World::default();
        let id = world.add_body(ball(Vec3::new(0.0, 5.0, 0.0)));
        world.step(0.0);
        world.step(-1.0);
        world.step(f32::NAN);
        assert_eq!(world.body(id).unwrap().position.y, 5.0);
    }

    #[test]
    fn free_fall_matches_gravity() {
        let mut world = World::default();
        world.set_sleep_policy(NoSleep);
        let id = world.add_body(ball(Vec3::new(0.0, 100.0, 0.0)));
        world.run(1.0 / 60.0, 60);
        let v = world.body(id).unwrap().linear_velocity.y;
        assert!((v + 9.81).abs() < 1e-2, "v={v}");
    }

    #[test]
    fn failing_detector_is_tolerated() {
        let mut world = World::default();
        world.set_collision_detector(|_: &BodySet| -> Result<Vec<ContactConstraint>, CollisionError> {
            Err(CollisionError::Failed("stale".into()))
        });
        let id = world.add_body(ball(Vec3::ZERO));
        world.step(0.1);
        assert!(world.body(id).unwrap().position.y < 0.0);
        assert_eq!(world.last_contact_count(), 0);
    }

    #[test]
    fn external_force_wakes_and_pushes() {
        let mut world = World::default();
        world.set_gravity(Vec3::ZERO);
        world.set_collision_detector(NoCollisions);
        let id = world.add_body(ball(Vec3::ZERO));
        world.bodies().cell(id).unwrap().set_asleep(true);
        world.set_external_force(id, Vec3::new(10.0, 0.0, 0.0)).unwrap();
        assert_eq!(world.is_asleep(id), Some(false));
        world.step(0.1);
        assert!(world.body(id).unwrap().position.x > 0.0);
    }

    #[test]
    fn unknown_body_is_reported() {
        let mut world = World::default();
        let id = world.add_body(ball(Vec3::ZERO));
        world.remove_body(id);
        assert!(matches!(world.wake(id), Err(PhysicsError::UnknownBody(_))));
        assert!(world.body(id).is_none());
        assert!(world.is_empty());
    }

    struct NoSleep;

    impl SleepPolicy for NoSleep {
        fn update(&self, _body: &mut RigidBody, asleep: &mut bool, _h: f32, _config: &SleepConfig) {
            *asleep = false;
        }
    }
}
