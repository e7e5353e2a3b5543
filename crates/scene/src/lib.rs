#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

//! JSON scene descriptions.
//!
//! A scene lists the world settings and the bodies to create:
//!
//! ```json
//! {
//!   "gravity": [0.0, -9.81, 0.0],
//!   "config": { "iterations": 8, "broad_phase": { "kind": "grid", "cell_size": 2.0 } },
//!   "bodies": [
//!     { "id": "ground", "static": true, "shape": "box", "half_extents": [8.0, 1.0, 8.0] },
//!     { "id": "ball", "shape": "sphere", "radius": 0.4, "pos": [0.0, 12.0, 0.0], "mass": 10.0 }
//!   ]
//! }
//! ```
//!
//! Every field except the body ids and shape dimensions has a default.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use physics::{
    BroadPhase, ConvexMesh, InertiaSpec, Material, Quat, ResolverConfig, RigidBodyDesc, Shape, Vec3, World,
    WorldConfig, TYPEIDS_ALL,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Scene {
    #[serde(default = "default_gravity")]
    pub gravity: [f32; 3],
    #[serde(default)]
    pub config: SceneConfig,
    pub bodies: Vec<BodyDef>,
}

/// World tuning; missing fields keep the engine defaults.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub iterations: usize,
    pub correction_percent: f32,
    pub slop: f32,
    pub broad_phase: BroadPhaseDef,
    pub sleep_velocity_tolerance: f32,
    pub sleep_frames: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let world = WorldConfig::default();
        Self {
            iterations: world.resolver.iterations,
            correction_percent: world.resolver.correction_percent,
            slop: world.resolver.slop,
            broad_phase: BroadPhaseDef::AllPairs,
            sleep_velocity_tolerance: world.sleep_velocity_tolerance,
            sleep_frames: world.sleep_frames,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BroadPhaseDef {
    #[default]
    AllPairs,
    Grid { cell_size: f32 },
}

#[derive(Debug, Deserialize)]
pub struct BodyDef {
    pub id: String,
    #[serde(flatten)]
    pub shape: ShapeDef,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default = "zero_vec")]
    pub pos: [f32; 3],
    /// Quaternion `[x, y, z, w]`
    #[serde(default = "identity_quat")]
    pub orientation: [f32; 4],
    #[serde(default = "zero_vec")]
    pub vel: [f32; 3],
    #[serde(default = "zero_vec")]
    pub angular_vel: [f32; 3],
    #[serde(default = "default_mass")]
    pub mass: f32,
    /// Per-axis factors applied to the shape's inertia tensor
    #[serde(default = "one_vec")]
    pub inertia_scale: [f32; 3],
    #[serde(default)]
    pub lock_rotation: bool,
    #[serde(default = "default_friction")]
    pub friction: f32,
    #[serde(default)]
    pub restitution: f32,
    #[serde(default = "default_type_id")]
    pub type_id: u32,
    #[serde(default = "all_type_ids")]
    pub collision_type_ids: u32,
    #[serde(default = "enabled")]
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeDef {
    Sphere {
        radius: f32,
        #[serde(default = "zero_vec")]
        center: [f32; 3],
    },
    Capsule {
        a: [f32; 3],
        b: [f32; 3],
        radius: f32,
    },
    Box {
        half_extents: [f32; 3],
    },
    ConvexMesh {
        vertices: Vec<[f32; 3]>,
        triangles: Vec<[usize; 3]>,
    },
}

fn default_gravity() -> [f32; 3] {
    WorldConfig::default().gravity.to_array()
}

fn zero_vec() -> [f32; 3] {
    [0.0, 0.0, 0.0]
}

fn one_vec() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn identity_quat() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn default_mass() -> f32 {
    1.0
}

fn default_friction() -> f32 {
    Material::default().friction
}

fn default_type_id() -> u32 {
    1
}

fn all_type_ids() -> u32 {
    TYPEIDS_ALL
}

fn enabled() -> bool {
    true
}

impl ShapeDef {
    pub fn build(&self) -> Result<Shape> {
        let shape = match self {
            ShapeDef::Sphere { radius, center } => {
                Shape::Sphere(physics::Sphere::new(Vec3::from_array(*center), *radius)?)
            }
            ShapeDef::Capsule { a, b, radius } => Shape::capsule(Vec3::from_array(*a), Vec3::from_array(*b), *radius)?,
            ShapeDef::Box { half_extents } => Shape::cuboid(Vec3::from_array(*half_extents))?,
            ShapeDef::ConvexMesh { vertices, triangles } => {
                let mut corners = Vec::with_capacity(triangles.len());
                for triangle in triangles {
                    let mut corner = [Vec3::ZERO; 3];
                    for (slot, &index) in corner.iter_mut().zip(triangle) {
                        let Some(v) = vertices.get(index) else {
                            bail!("triangle index {index} out of range ({} vertices)", vertices.len());
                        };
                        *slot = Vec3::from_array(*v);
                    }
                    corners.push(corner);
                }
                Shape::ConvexMesh(ConvexMesh::from_triangles(&corners)?)
            }
        };
        Ok(shape)
    }
}

impl BodyDef {
    /// Descriptor for the world builder.
    pub fn desc(&self) -> Result<RigidBodyDesc> {
        let shape = self.shape.build().with_context(|| format!("invalid shape for body {}", self.id))?;
        let inertia = if self.lock_rotation {
            InertiaSpec::Locked
        } else {
            InertiaSpec::FromShape {
                scale: Vec3::from_array(self.inertia_scale),
            }
        };
        Ok(RigidBodyDesc::new(self.id.clone(), shape)
            .position(Vec3::from_array(self.pos))
            .orientation(Quat::from_array(self.orientation))
            .linear_velocity(Vec3::from_array(self.vel))
            .angular_velocity(Vec3::from_array(self.angular_vel))
            .mass(self.mass)
            .inertia(inertia)
            .material(Material::new(self.friction, self.restitution))
            .type_id(self.type_id)
            .collision_type_ids(self.collision_type_ids)
            .enabled(self.enabled))
    }
}

impl SceneConfig {
    fn world_config(&self, gravity: [f32; 3]) -> WorldConfig {
        WorldConfig {
            gravity: Vec3::from_array(gravity),
            resolver: ResolverConfig {
                iterations: self.iterations,
                correction_percent: self.correction_percent,
                slop: self.slop,
            },
            broad_phase: match self.broad_phase {
                BroadPhaseDef::AllPairs => BroadPhase::AllPairs,
                BroadPhaseDef::Grid { cell_size } => BroadPhase::Grid { cell_size },
            },
            sleep_velocity_tolerance: self.sleep_velocity_tolerance,
            sleep_frames: self.sleep_frames,
        }
    }
}

impl Scene {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).with_context(|| format!("reading scene {}", path.display()))?;
        Self::from_str(&json).with_context(|| format!("parsing scene {}", path.display()))
    }

    /// Builds a world holding every body of the scene.
    pub fn into_world(self) -> Result<World> {
        if let BroadPhaseDef::Grid { cell_size } = self.config.broad_phase {
            if !(cell_size.is_finite() && cell_size > 0.0) {
                bail!("grid cell size must be positive, got {cell_size}");
            }
        }
        let mut world = World::new(self.config.world_config(self.gravity));
        for body in &self.bodies {
            let desc = body.desc()?;
            let added = if body.is_static {
                world.add_static_rigid_body(desc)
            } else {
                world.add_rigid_body(desc)
            };
            added.with_context(|| format!("adding body {}", body.id))?;
        }
        tracing::debug!(bodies = world.len(), "scene loaded");
        Ok(world)
    }
}
