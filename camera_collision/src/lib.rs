//! Swept-sphere obstruction queries used to keep the camera out of scene geometry.
//!
//! The camera only ever reads the scene: anything that can answer "how far can a sphere
//! travel along this segment" implements [`CollisionQuery`].
#![forbid(unsafe_code)]

pub mod bounds;
pub mod world;

use rapier3d::math::{Point, Vector};
use rapier3d::prelude::{Ray, Real};

pub use bounds::{BoundVolume, BoundVolumeScene, CameraCollider};
pub use world::CameraCollisionWorld;

const MIN_SWEEP_LENGTH: Real = 1.0e-5;

/// A sphere moving in a straight line from `start` to `end`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweptSphere {
    pub start: Vector<Real>,
    pub end: Vector<Real>,
    pub radius: Real,
}

impl SweptSphere {
    pub fn new(start: Vector<Real>, end: Vector<Real>, radius: Real) -> Self {
        Self { start, end, radius }
    }

    pub fn length(&self) -> Real {
        (self.end - self.start).norm()
    }

    /// Unit travel direction; a zero-length sweep reports `+Z`.
    pub fn direction(&self) -> Vector<Real> {
        let delta = self.end - self.start;
        let length = delta.norm();
        if length > MIN_SWEEP_LENGTH {
            delta / length
        } else {
            Vector::z()
        }
    }

    pub fn ray(&self) -> Ray {
        Ray::new(Point::from(self.start), self.direction())
    }

    pub fn point_at(&self, distance: Real) -> Vector<Real> {
        self.start + self.direction() * distance
    }
}

pub trait CollisionQuery {
    /// Distance travelled along the sweep before first contact, if any contact happens
    /// within the sweep length.
    fn sweep_sphere(&self, sweep: &SweptSphere) -> Option<Real>;
}

/// Scene with nothing to hit.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCollision;

impl CollisionQuery for NoCollision {
    fn sweep_sphere(&self, _sweep: &SweptSphere) -> Option<Real> {
        None
    }
}

impl<T: CollisionQuery + ?Sized> CollisionQuery for &T {
    fn sweep_sphere(&self, sweep: &SweptSphere) -> Option<Real> {
        (**self).sweep_sphere(sweep)
    }
}

/// Where the camera should stop given a contact `hit` distance along `sweep`.
///
/// Returns `None` when the contact lies at or beyond the end of the sweep. The stop
/// distance never exceeds the sweep length and never drops below `floor` unless the
/// sweep itself is shorter than `floor`.
pub fn resolve_obstruction(sweep: &SweptSphere, hit: Real, floor: Real) -> Option<Vector<Real>> {
    let travel = sweep.length();
    if !hit.is_finite() || hit >= travel {
        return None;
    }
    let stop = hit.max(floor).min(travel);
    Some(sweep.point_at(stop))
}
