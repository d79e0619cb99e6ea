use compute::WorkerPool;
use glam::Vec3;

use crate::body_set::BodySet;
use crate::sleep::{SleepConfig, SleepPolicy};

/// Advance every awake dynamic body by `h`. Sleeping bodies are held.
pub(crate) fn integrate_bodies(pool: &WorkerPool, bodies: &mut BodySet, gravity: Vec3, h: f32) {
    pool.for_each_mut(bodies.cells_mut(), |cell| {
        let (body, asleep) = cell.parts_mut();
        if *asleep {
            body.hold();
        } else {
            body.integrate(gravity, h);
        }
    });
}

/// Derive velocities from the solved positions.
pub(crate) fn commit_velocities(pool: &WorkerPool, bodies: &mut BodySet, h: f32) {
    pool.for_each_mut(bodies.cells_mut(), |cell| {
        let (body, _) = cell.parts_mut();
        body.commit_velocity(h);
    });
}

/// Run the sleep policy over every dynamic body, one at a time.
pub(crate) fn update_sleep(bodies: &mut BodySet, policy: &dyn SleepPolicy, config: &SleepConfig, h: f32) {
    for cell in bodies.cells_mut() {
        let (body, asleep) = cell.parts_mut();
        if body.is_dynamic() {
            policy.update(body, asleep, h, config);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::RigidBody;
    use crate::material::Material;
    use crate::sleep::ThresholdSleep;
    use crate::types::{BodyType, Shape};

    fn ball(y: f32) -> RigidBody {
        RigidBody::new(BodyType::Dynamic, Shape::Sphere { radius: 0.5 }, Material::default())
            .with_position(Vec3::new(0.0, y, 0.0))
    }

    #[test]
    fn sleeping_bodies_are_not_integrated() {
        let mut bodies = BodySet::new();
        let awake = bodies.insert(ball(1.0));
        let sleeping = bodies.insert(ball(1.0));
        bodies.cell(sleeping).unwrap().set_asleep(true);

        let pool = WorkerPool::new(2).unwrap();
        integrate_bodies(&pool, &mut bodies, Vec3::new(0.0, -10.0, 0.0), 0.1);
        commit_velocities(&pool, &mut bodies, 0.1);

        assert!(bodies.cell(awake).unwrap().lock().position.y < 1.0);
        let held = bodies.cell(sleeping).unwrap().lock();
        assert_eq!(held.position.y, 1.0);
        assert_eq!(held.linear_velocity, Vec3::ZERO);
    }

    #[test]
    fn static_bodies_never_move() {
        let mut bodies = BodySet::new();
        let ground = bodies.insert(RigidBody::new(
            BodyType::Static,
            Shape::Plane { normal: Vec3::Y },
            Material::default(),
        ));
        let pool = WorkerPool::sequential();
        integrate_bodies(&pool, &mut bodies, Vec3::new(0.0, -10.0, 0.0), 0.1);
        commit_velocities(&pool, &mut bodies, 0.1);
        assert_eq!(bodies.cell(ground).unwrap().lock().position, Vec3::ZERO);
    }

    #[test]
    fn sleep_phase_flags_idle_bodies() {
        let mut bodies = BodySet::new();
        let id = bodies.insert(ball(0.0));
        let config = SleepConfig {
            time_to_sleep: 0.0,
            ..SleepConfig::default()
        };
        update_sleep(&mut bodies, &ThresholdSleep, &config, 0.1);
        assert!(bodies.cell(id).unwrap().is_asleep());
    }
}
