use camera_math::HorizontalBasis;
use rapier3d::math::{Isometry, Vector};
use rapier3d::prelude::Real;

use crate::channel::{GoalChannel, SeekEnvelope};
use crate::request::{LookFlags, MoveFlags, OrientationMode};
use crate::target::TargetHandle;
use crate::tuning::DEFAULT_FOV;

pub const INITIAL_STEP: Real = 1.0 / 60.0;

/// Distance, height and azimuth around the subject, driven by one envelope.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionalChannels {
    pub distance: GoalChannel,
    pub height: GoalChannel,
    pub azimuth: GoalChannel,
    pub envelope: SeekEnvelope,
}

impl Default for PositionalChannels {
    fn default() -> Self {
        Self {
            distance: GoalChannel::linear(0.0),
            height: GoalChannel::linear(0.0),
            azimuth: GoalChannel::angular(0.0),
            envelope: SeekEnvelope::idle(),
        }
    }
}

impl PositionalChannels {
    pub fn is_seeking(&self) -> bool {
        self.envelope.is_active()
    }

    pub fn stop(&mut self) {
        self.envelope.cancel();
        for channel in [&mut self.distance, &mut self.height, &mut self.azimuth] {
            channel.velocity = 0.0;
            channel.epv = 0.0;
        }
    }
}

/// Yaw, pitch and roll, driven by a second envelope.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngularChannels {
    pub yaw: GoalChannel,
    pub pitch: GoalChannel,
    pub roll: GoalChannel,
    pub envelope: SeekEnvelope,
}

impl Default for AngularChannels {
    fn default() -> Self {
        Self {
            yaw: GoalChannel::angular(0.0),
            pitch: GoalChannel::angular(0.0),
            roll: GoalChannel::angular(0.0),
            envelope: SeekEnvelope::idle(),
        }
    }
}

impl AngularChannels {
    pub fn is_seeking(&self) -> bool {
        self.envelope.is_active()
    }

    pub fn clear_epv(&mut self) {
        self.yaw.epv = 0.0;
        self.pitch.epv = 0.0;
        self.roll.epv = 0.0;
    }
}

/// Everything the follow camera mutates. Plain data so frames can be compared and
/// snapshotted.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraState {
    pub pose: Isometry<Real>,
    /// Pose at the start of the previous sub-step; velocities are measured against it.
    pub prev_pose: Isometry<Real>,
    pub target: Option<TargetHandle>,
    /// Subject whose rotation defines facing; the target itself when unset.
    pub target_orientation: Option<TargetHandle>,
    /// Degrees.
    pub fov: Real,
    /// Look-at point in the subject's local frame.
    pub focus: Vector<Real>,
    pub positional: PositionalChannels,
    pub angular: AngularChannels,
    pub move_flags: MoveFlags,
    pub look_flags: LookFlags,
    pub orientation_mode: OrientationMode,
    pub basis: HorizontalBasis,
    pub translation_accum: Vector<Real>,
    pub last_step: Real,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            pose: Isometry::identity(),
            prev_pose: Isometry::identity(),
            target: None,
            target_orientation: None,
            fov: DEFAULT_FOV,
            focus: Vector::new(0.0, 0.0, 10.0),
            positional: PositionalChannels::default(),
            angular: AngularChannels::default(),
            move_flags: MoveFlags::default(),
            look_flags: LookFlags::default(),
            orientation_mode: OrientationMode::default(),
            basis: HorizontalBasis::default(),
            translation_accum: Vector::zeros(),
            last_step: INITIAL_STEP,
        }
    }
}

impl CameraState {
    pub fn position(&self) -> Vector<Real> {
        self.pose.translation.vector
    }

    pub fn set_position(&mut self, position: Vector<Real>) {
        self.pose.translation.vector = position;
    }

    pub fn is_tracking(&self) -> bool {
        self.target.is_some()
    }
}
