//! Rapier-backed collision scene for camera sweeps.

use std::collections::HashSet;

use rapier3d::math::{Isometry, Vector};
use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::prelude::*;
use sim_core::logging;

use crate::{CollisionQuery, SweptSphere};

/// Static level geometry plus the query pipeline the camera sweeps against.
///
/// The scene writes colliders and calls [`CameraCollisionWorld::refresh`] once per frame
/// before the camera updates; the camera only reads.
pub struct CameraCollisionWorld {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    query_pipeline: QueryPipeline,
    see_through: HashSet<ColliderHandle>,
    dirty: bool,
}

impl Default for CameraCollisionWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraCollisionWorld {
    pub fn new() -> Self {
        Self {
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            query_pipeline: QueryPipeline::new(),
            see_through: HashSet::new(),
            dirty: false,
        }
    }

    pub fn colliders(&self) -> &ColliderSet {
        &self.colliders
    }

    pub fn insert_static_collider(&mut self, collider: Collider) -> ColliderHandle {
        self.dirty = true;
        self.colliders.insert(collider)
    }

    /// Non-blocking colliders stay in the set for other systems but the camera ignores them.
    pub fn set_camera_blocking(&mut self, handle: ColliderHandle, blocking: bool) {
        if blocking {
            self.see_through.remove(&handle);
        } else {
            self.see_through.insert(handle);
        }
    }

    pub fn blocks_camera(&self, handle: ColliderHandle) -> bool {
        self.colliders.contains(handle) && !self.see_through.contains(&handle)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuilds the acceleration structure after collider edits.
    pub fn refresh(&mut self) {
        self.query_pipeline.update(&self.colliders);
        self.dirty = false;
        logging::debug(
            "collision",
            format!(
                "camera scene refreshed: {} colliders, {} see-through",
                self.colliders.len(),
                self.see_through.len()
            ),
        );
    }
}

impl CollisionQuery for CameraCollisionWorld {
    fn sweep_sphere(&self, sweep: &SweptSphere) -> Option<Real> {
        let length = sweep.length();
        let ball = Ball::new(sweep.radius);
        let start = Isometry::translation(sweep.start.x, sweep.start.y, sweep.start.z);
        let velocity: Vector<Real> = sweep.direction();
        let options = ShapeCastOptions::with_max_time_of_impact(length);
        let blocking = |handle: ColliderHandle, _: &Collider| !self.see_through.contains(&handle);
        let filter = QueryFilter::default().predicate(&blocking);
        self.query_pipeline
            .cast_shape(
                &self.bodies,
                &self.colliders,
                &start,
                &velocity,
                &ball,
                options,
                filter,
            )
            .map(|(_, hit)| hit.time_of_impact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_wall(world: &mut CameraCollisionWorld) -> ColliderHandle {
        let wall = ColliderBuilder::cuboid(2.0, 2.0, 0.1)
            .translation(vector![0.0, 1.0, 4.0])
            .build();
        world.insert_static_collider(wall)
    }

    #[test]
    fn sweep_stops_at_wall() {
        let mut world = CameraCollisionWorld::new();
        build_wall(&mut world);
        world.refresh();

        let sweep = SweptSphere::new(vector![0.0, 1.0, 0.0], vector![0.0, 1.0, 8.0], 0.07);
        let hit = world.sweep_sphere(&sweep).expect("wall hit");
        assert!((hit - (3.9 - 0.07)).abs() < 1.0e-2, "{}", hit);
    }

    #[test]
    fn sweep_short_of_wall_misses() {
        let mut world = CameraCollisionWorld::new();
        build_wall(&mut world);
        world.refresh();

        let sweep = SweptSphere::new(vector![0.0, 1.0, 0.0], vector![0.0, 1.0, 3.0], 0.07);
        assert!(world.sweep_sphere(&sweep).is_none());
    }

    #[test]
    fn disabled_collider_stops_blocking() {
        let mut world = CameraCollisionWorld::new();
        let handle = build_wall(&mut world);
        world.refresh();
        assert!(world.blocks_camera(handle));
        world.set_camera_blocking(handle, false);
        assert!(!world.blocks_camera(handle));

        let sweep = SweptSphere::new(vector![0.0, 1.0, 0.0], vector![0.0, 1.0, 8.0], 0.07);
        assert!(world.sweep_sphere(&sweep).is_none());
    }
}
