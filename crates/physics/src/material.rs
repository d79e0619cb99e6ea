//! Surface materials and the rules for combining two of them at a contact.

use serde::Deserialize;

/// Bulk and surface properties of a body.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Mass per unit volume.
    pub density: f32,
    /// Fraction of approach speed returned as separation speed.
    pub restitution: f32,
    /// Coulomb coefficient below which a contact sticks.
    pub static_friction: f32,
    /// Coulomb coefficient applied once a contact slides.
    pub dynamic_friction: f32,
}

impl Material {
    #[must_use]
    pub const fn new(restitution: f32, static_friction: f32, dynamic_friction: f32) -> Self {
        Self {
            density: 1.0,
            restitution,
            static_friction,
            dynamic_friction,
        }
    }

    #[must_use]
    pub const fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    /// High restitution, moderate friction.
    #[must_use]
    pub const fn bouncy() -> Self {
        Self::new(0.9, 0.4, 0.3)
    }

    /// Nearly frictionless.
    #[must_use]
    pub const fn slippery() -> Self {
        Self::new(0.2, 0.05, 0.02)
    }

    /// Grippy and dead.
    #[must_use]
    pub const fn rough() -> Self {
        Self::new(0.05, 0.9, 0.7)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(0.3, 0.6, 0.4)
    }
}

/// Coefficients resolved for one body pair.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CombinedMaterial {
    pub restitution: f32,
    pub static_friction: f32,
    pub dynamic_friction: f32,
}

/// Produces the contact coefficients for a pair of materials.
pub trait MaterialCombiner: Send + Sync {
    fn combine(&self, a: &Material, b: &Material) -> CombinedMaterial;
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineRule {
    Average,
    Min,
    Max,
    Multiply,
    #[default]
    GeometricMean,
}

impl CombineRule {
    #[must_use]
    pub fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            CombineRule::Average => 0.5 * (a + b),
            CombineRule::Min => a.min(b),
            CombineRule::Max => a.max(b),
            CombineRule::Multiply => a * b,
            CombineRule::GeometricMean => (a * b).max(0.0).sqrt(),
        }
    }
}

impl MaterialCombiner for CombineRule {
    fn combine(&self, a: &Material, b: &Material) -> CombinedMaterial {
        CombinedMaterial {
            restitution: self.apply(a.restitution, b.restitution),
            static_friction: self.apply(a.static_friction, b.static_friction),
            dynamic_friction: self.apply(a.dynamic_friction, b.dynamic_friction),
        }
    }
}
