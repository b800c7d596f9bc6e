//! Camera blockers described by simple bound volumes.
//!
//! Sweeps are answered by inflating each volume by the sphere radius and casting the
//! sweep's center line against the inflated shape.

use camera_math::frame::{euler_quat, Euler};
use rapier3d::math::{Point, Vector};
use rapier3d::parry::query::RayCast;
use rapier3d::parry::shape::{Ball, Cuboid};
use rapier3d::prelude::{Ray, Real};
use serde::{Deserialize, Serialize};

use crate::{CollisionQuery, SweptSphere};

fn default_true() -> bool {
    true
}

fn default_scale() -> f32 {
    1.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundVolume {
    Sphere {
        center: [f32; 3],
        radius: f32,
    },
    Box {
        min: [f32; 3],
        max: [f32; 3],
    },
    /// Oriented box: `rotation` is `[yaw, pitch, roll]`, `scale` uniformly scales the
    /// local frame.
    Obb {
        center: [f32; 3],
        half_extents: [f32; 3],
        #[serde(default)]
        rotation: [f32; 3],
        #[serde(default = "default_scale")]
        scale: f32,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraCollider {
    pub volume: BoundVolume,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub blocks_camera: bool,
    /// Invisible walls keep blocking the camera while hidden.
    #[serde(default)]
    pub invisible_wall: bool,
}

impl CameraCollider {
    pub fn new(volume: BoundVolume) -> Self {
        Self {
            volume,
            visible: true,
            blocks_camera: true,
            invisible_wall: false,
        }
    }

    pub fn participates(&self) -> bool {
        self.blocks_camera && (self.visible || self.invisible_wall)
    }
}

fn vec3(value: [f32; 3]) -> Vector<Real> {
    Vector::new(value[0], value[1], value[2])
}

impl BoundVolume {
    pub fn sweep(&self, sweep: &SweptSphere) -> Option<Real> {
        let max_toi = sweep.length();
        let dir = sweep.direction();
        match *self {
            BoundVolume::Sphere { center, radius } => {
                let ball = Ball::new(radius + sweep.radius);
                let ray = Ray::new(Point::from(sweep.start - vec3(center)), dir);
                ball.cast_local_ray(&ray, max_toi, true)
            }
            BoundVolume::Box { min, max } => {
                let min = vec3(min);
                let max = vec3(max);
                let half = (max - min) * 0.5;
                let cuboid = Cuboid::new(half.add_scalar(sweep.radius));
                let ray = Ray::new(Point::from(sweep.start - (min + half)), dir);
                cuboid.cast_local_ray(&ray, max_toi, true)
            }
            BoundVolume::Obb {
                center,
                half_extents,
                rotation,
                scale,
            } => {
                if scale.is_nan() || scale <= 0.0 {
                    return None;
                }
                let orientation = euler_quat(Euler::new(rotation[0], rotation[1], rotation[2]));
                let local_origin =
                    orientation.inverse_transform_vector(&(sweep.start - vec3(center))) / scale;
                let local_dir = orientation.inverse_transform_vector(&dir);
                let cuboid = Cuboid::new(vec3(half_extents).add_scalar(sweep.radius / scale));
                let ray = Ray::new(Point::from(local_origin), local_dir);
                cuboid
                    .cast_local_ray(&ray, max_toi / scale, true)
                    .map(|toi| toi * scale)
            }
        }
    }

    fn is_valid(&self) -> bool {
        let finite = |v: &[f32; 3]| v.iter().all(|c| c.is_finite());
        match self {
            BoundVolume::Sphere { center, radius } => finite(center) && *radius >= 0.0,
            BoundVolume::Box { min, max } => {
                finite(min) && finite(max) && (0..3).all(|axis| min[axis] <= max[axis])
            }
            BoundVolume::Obb {
                center,
                half_extents,
                rotation,
                scale,
            } => {
                finite(center)
                    && finite(rotation)
                    && half_extents.iter().all(|h| h.is_finite() && *h >= 0.0)
                    && scale.is_finite()
                    && *scale > 0.0
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundVolumeScene {
    #[serde(default)]
    pub colliders: Vec<CameraCollider>,
}

impl BoundVolumeScene {
    pub fn parse_toml(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|err| err.to_string())
    }

    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string(self).map_err(|err| err.to_string())
    }

    pub fn push(&mut self, collider: CameraCollider) {
        self.colliders.push(collider);
    }

    pub fn validate(&self) -> Vec<String> {
        self.colliders
            .iter()
            .enumerate()
            .filter(|(_, collider)| !collider.volume.is_valid())
            .map(|(index, _)| format!("collider {} has invalid bounds", index))
            .collect()
    }
}

impl CollisionQuery for BoundVolumeScene {
    fn sweep_sphere(&self, sweep: &SweptSphere) -> Option<Real> {
        self.colliders
            .iter()
            .filter(|collider| collider.participates())
            .filter_map(|collider| collider.volume.sweep(sweep))
            .fold(None, |nearest: Option<Real>, hit| {
                Some(nearest.map_or(hit, |current| current.min(hit)))
            })
    }
}
