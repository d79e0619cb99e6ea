//! Body deactivation.
//!
//! Bodies whose velocities stay below a threshold for long enough are put to
//! sleep. Sleeping bodies are held in place by the integrator and skipped by
//! the solver when their partner is inert too, so a settled pile costs almost
//! nothing per substep.

use serde::Deserialize;

use crate::body::RigidBody;

#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SleepConfig {
    pub enabled: bool,
    /// Linear speed below which a body counts as idle.
    pub linear_threshold: f32,
    /// Angular speed below which a body counts as idle.
    pub angular_threshold: f32,
    /// Seconds a body must stay idle before it falls asleep.
    pub time_to_sleep: f32,
}

impl Default for SleepConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            linear_threshold: 0.05,
            angular_threshold: 0.05,
            time_to_sleep: 0.5,
        }
    }
}

/// Decides, once per substep, whether a dynamic body sleeps.
///
/// `asleep` is the body's current flag; implementations update it in place
/// and may adjust the body's sleep timer and velocities.
pub trait SleepPolicy: Send + Sync {
    fn update(&self, body: &mut RigidBody, asleep: &mut bool, h: f32, config: &SleepConfig);
}

/// Timer-based sleeping.
///
/// A body accumulates idle time while both speeds stay below their
/// thresholds and is put to sleep, with its velocities zeroed, once the timer
/// reaches `time_to_sleep`. Any speed above a threshold resets the timer and
/// wakes the body, which is how a sleeping body hit by an awake one comes
/// back to life.
#[derive(Copy, Clone, Debug, Default)]
pub struct ThresholdSleep;

impl SleepPolicy for ThresholdSleep {
    fn update(&self, body: &mut RigidBody, asleep: &mut bool, h: f32, config: &SleepConfig) {
        if !config.enabled || !body.is_dynamic() {
            body.sleep_timer = 0.0;
            *asleep = false;
            return;
        }
        let idle = body.linear_velocity.length() < config.linear_threshold
            && body.angular_velocity.length() < config.angular_threshold;
        if !idle {
            body.sleep_timer = 0.0;
            *asleep = false;
            return;
        }
        body.sleep_timer += h;
        if !*asleep && body.sleep_timer >= config.time_to_sleep {
            *asleep = true;
            body.halt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::types::{BodyType, Shape};
    use glam::Vec3;

    fn ball(velocity: Vec3) -> RigidBody {
        RigidBody::new(BodyType::Dynamic, Shape::Sphere { radius: 0.5 }, Material::default())
            .with_linear_velocity(velocity)
    }

    #[test]
    fn idle_body_falls_asleep_after_delay() {
        let config = SleepConfig::default();
        let mut body = ball(Vec3::new(0.01, 0.0, 0.0));
        let mut asleep = false;
        for _ in 0..4 {
            ThresholdSleep.update(&mut body, &mut asleep, 0.1, &config);
        }
        assert!(!asleep);
        ThresholdSleep.update(&mut body, &mut asleep, 0.1, &config);
        ThresholdSleep.update(&mut body, &mut asleep, 0.1, &config);
        assert!(asleep);
        assert_eq!(body.linear_velocity, Vec3::ZERO);
    }

    #[test]
    fn fast_body_wakes_and_resets_timer() {
        let config = SleepConfig::default();
        let mut body = ball(Vec3::new(2.0, 0.0, 0.0));
        body.sleep_timer = 10.0;
        let mut asleep = true;
        ThresholdSleep.update(&mut body, &mut asleep, 0.1, &config);
        assert!(!asleep);
        assert_eq!(body.sleep_timer, 0.0);
    }

    #[test]
    fn spinning_body_stays_awake() {
        let config = SleepConfig::default();
        let mut body = ball(Vec3::ZERO).with_angular_velocity(Vec3::new(0.0, 1.0, 0.0));
        let mut asleep = false;
        for _ in 0..20 {
            ThresholdSleep.update(&mut body, &mut asleep, 0.1, &config);
        }
        assert!(!asleep);
    }

    #[test]
    fn disabled_sleep_keeps_everyone_awake() {
        let config = SleepConfig {
            enabled: false,
            ..SleepConfig::default()
        };
        let mut body = ball(Vec3::ZERO);
        let mut asleep = true;
        ThresholdSleep.update(&mut body, &mut asleep, 1.0, &config);
        assert!(!asleep);
    }
}
