//! JSON scene description.
//!
//! ```json
//! {
//!   "world": { "substeps": 8, "gravity": [0.0, -9.81, 0.0] },
//!   "bodies": [
//!     { "shape": "plane", "id": "ground", "normal": [0, 1, 0] },
//!     { "shape": "sphere", "id": "ball", "radius": 0.5, "pos": [0, 2, 0],
//!       "material": { "restitution": 0.8 } }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use physics::{BodyId, BodyType, Material, Quat, RigidBody, Shape, Vec3, World, WorldConfig};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub world: WorldConfig,
    pub bodies: Vec<BodyDef>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum BodyDef {
    Sphere {
        id: String,
        radius: f32,
        #[serde(flatten)]
        common: Common,
    },
    #[serde(alias = "cuboid")]
    Box {
        id: String,
        half_extents: [f32; 3],
        #[serde(flatten)]
        common: Common,
    },
    /// Always static.
    Plane {
        id: String,
        normal: [f32; 3],
        #[serde(default = "zero_vec")]
        pos: [f32; 3],
        #[serde(default)]
        material: Material,
    },
}

/// Fields shared by the movable shapes.
#[derive(Debug, Deserialize)]
pub struct Common {
    pub pos: [f32; 3],
    #[serde(default = "zero_vec")]
    pub vel: [f32; 3],
    #[serde(default = "zero_vec")]
    pub angular_vel: [f32; 3],
    /// Quaternion as `[x, y, z, w]`.
    #[serde(default = "identity_quat")]
    pub orientation: [f32; 4],
    #[serde(default)]
    pub body_type: BodyType,
    #[serde(default)]
    pub material: Material,
    /// Overrides the density-derived mass.
    pub mass: Option<f32>,
}

fn zero_vec() -> [f32; 3] {
    [0.0, 0.0, 0.0]
}

fn identity_quat() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

/// A world built from a [`Scene`] plus the ids of its named bodies.
pub struct LoadedScene {
    pub world: World,
    pub ids: HashMap<String, BodyId>,
}

impl Scene {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).with_context(|| format!("reading scene {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("parsing scene {}", path.display()))
    }

    /// A ground plane, a few bouncing spheres and a crate.
    #[must_use]
    pub fn builtin() -> Self {
        let mut bodies = vec![BodyDef::Plane {
            id: "ground".into(),
            normal: [0.0, 1.0, 0.0],
            pos: zero_vec(),
            material: Material::default(),
        }];
        for (i, material) in [Material::bouncy(), Material::default(), Material::rough()]
            .into_iter()
            .enumerate()
        {
            #[allow(clippy::cast_precision_loss)]
            let k = i as f32;
            bodies.push(BodyDef::Sphere {
                id: format!("ball{i}"),
                radius: 0.5,
                common: Common::at([k * 1.5 - 1.5, 2.0 + k, 0.0], material),
            });
        }
        bodies.push(BodyDef::Box {
            id: "crate".into(),
            half_extents: [0.5, 0.5, 0.5],
            common: Common::at([0.0, 1.0, 2.0], Material::rough()),
        });
        Self {
            world: WorldConfig::default(),
            bodies,
        }
    }

    pub fn into_world(self) -> Result<LoadedScene> {
        let mut world = World::new(self.world)?;
        let mut ids = HashMap::new();
        for def in self.bodies {
            let (id, body) = def.into_body()?;
            ensure!(!ids.contains_key(&id), "duplicate body id {id}");
            ids.insert(id, world.add_body(body));
        }
        Ok(LoadedScene { world, ids })
    }
}

impl Common {
    fn at(pos: [f32; 3], material: Material) -> Self {
        Self {
            pos,
            vel: zero_vec(),
            angular_vel: zero_vec(),
            orientation: identity_quat(),
            body_type: BodyType::Dynamic,
            material,
            mass: None,
        }
    }

    fn build(self, shape: Shape) -> Result<RigidBody> {
        let orientation = Quat::from_array(self.orientation);
        ensure!(orientation.length() > 0.0, "orientation must be a non-zero quaternion");
        let mut body = RigidBody::new(self.body_type, shape, self.material)
            .with_position(Vec3::from(self.pos))
            .with_orientation(orientation)
            .with_linear_velocity(Vec3::from(self.vel))
            .with_angular_velocity(Vec3::from(self.angular_vel));
        if let Some(mass) = self.mass {
            ensure!(mass > 0.0, "mass must be positive");
            body = body.with_mass(mass);
        }
        Ok(body)
    }
}

impl BodyDef {
    fn into_body(self) -> Result<(String, RigidBody)> {
        match self {
            BodyDef::Sphere { id, radius, common } => {
                ensure!(radius > 0.0, "sphere {id}: radius must be positive");
                let body = common.build(Shape::Sphere { radius }).with_context(|| format!("sphere {id}"))?;
                Ok((id, body))
            }
            BodyDef::Box { id, half_extents, common } => {
                let half_extents = Vec3::from(half_extents);
                ensure!(half_extents.min_element() > 0.0, "box {id}: half extents must be positive");
                let body = common
                    .build(Shape::Cuboid { half_extents })
                    .with_context(|| format!("box {id}"))?;
                Ok((id, body))
            }
            BodyDef::Plane { id, normal, pos, material } => {
                let normal = Vec3::from(normal);
                ensure!(normal.length_squared() > 0.0, "plane {id}: normal must be non-zero");
                Ok((id, RigidBody::static_plane(Vec3::from(pos), normal, material)))
            }
        }
    }
}
