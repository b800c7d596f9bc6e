//! The follow camera: lifecycle, requests and the per-frame update.

use camera_collision::{resolve_obstruction, CollisionQuery, SweptSphere};
use camera_math::frame::{self, euler_quat, rotation_euler, world_up, Euler};
use camera_math::{angle::facing_for_azimuth, step_toward, wrap_angle, CylinderCoords, CylinderFrame, HorizontalBasis};
use rapier3d::math::{Isometry, Vector};
use rapier3d::na::{Matrix4, Perspective3, UnitQuaternion};
use rapier3d::prelude::Real;
use sim_core::logging;
use std::f32::consts::PI;

use crate::channel::{advance_group, safe_div, GoalChannel, SeekEnvelope};
use crate::context::CameraSystemContext;
use crate::correction::{free_target, free_target_angular, free_velocity};
use crate::flythrough::FlythroughPlayer;
use crate::orient::{resolve_look_at, LookAtLimits};
use crate::request::{LookFlags, LookRequest, MotionRequest, MoveFlags, OrientationMode, SeekTiming};
use crate::state::CameraState;
use crate::target::{TargetHandle, TargetSource};
use crate::tuning::CameraTuning;

const LOG: &str = "camera";
const NEAR_PLANE: Real = 0.05;
const FAR_PLANE: Real = 2000.0;
const MAX_SUBSTEPS: usize = 1024;

/// Read-only view of the world the camera updates against.
#[derive(Clone, Copy)]
pub struct CameraScene<'a> {
    pub targets: &'a dyn TargetSource,
    pub collision: &'a dyn CollisionQuery,
}

impl<'a> CameraScene<'a> {
    pub fn new(targets: &'a dyn TargetSource, collision: &'a dyn CollisionQuery) -> Self {
        Self { targets, collision }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn aspect(&self) -> Real {
        if self.height == 0 {
            1.0
        } else {
            self.width as Real / self.height as Real
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PositionalMode {
    Seek,
    Free,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AngularMode {
    Seek,
    Free,
    LookAt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraPhase {
    Idle,
    /// A recorded flythrough owns the pose.
    Flythrough,
    Tracking {
        positional: PositionalMode,
        angular: AngularMode,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelId {
    Distance,
    Height,
    Azimuth,
    Yaw,
    Pitch,
    Roll,
}

/// Subject data fixed for the whole frame.
#[derive(Clone, Copy)]
struct Subject {
    position: Vector<Real>,
    /// Rotation defining facing: the orientation target when bound, else the subject's own.
    facing: UnitQuaternion<Real>,
    heading: Real,
}

impl Subject {
    fn new(transform: &Isometry<Real>, facing: UnitQuaternion<Real>) -> Self {
        Self {
            position: transform.translation.vector,
            facing,
            heading: frame::heading(&facing),
        }
    }

    fn look_transform(&self) -> Isometry<Real> {
        frame::isometry(self.position, self.facing)
    }
}

fn cylinder_frame(flags: MoveFlags) -> CylinderFrame {
    CylinderFrame {
        world_height: flags.world_height,
        world_azimuth: flags.world_azimuth,
    }
}

fn goal_coords(state: &CameraState) -> CylinderCoords {
    CylinderCoords {
        distance: state.positional.distance.goal,
        height: state.positional.height.goal,
        azimuth: state.positional.azimuth.goal,
    }
}

/// Third-person camera that keeps a subject framed.
pub struct FollowCamera {
    state: CameraState,
    tuning: CameraTuning,
    viewport: Option<Viewport>,
    flythrough: Option<ActiveFlythrough>,
}

struct ActiveFlythrough {
    player: FlythroughPlayer,
    /// Camera state to restore when playback ends.
    backup: CameraState,
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self::new(CameraTuning::default())
    }
}

impl FollowCamera {
    pub fn new(tuning: CameraTuning) -> Self {
        let state = CameraState {
            fov: tuning.fov,
            focus: Vector::from(tuning.focus),
            ..CameraState::default()
        };
        Self {
            state,
            tuning,
            viewport: None,
            flythrough: None,
        }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn tuning(&self) -> &CameraTuning {
        &self.tuning
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn is_initialized(&self) -> bool {
        self.viewport.is_some()
    }

    pub fn phase(&self) -> CameraPhase {
        if self.viewport.is_some() && self.flythrough.is_some() {
            return CameraPhase::Flythrough;
        }
        if self.viewport.is_none() || self.state.target.is_none() {
            return CameraPhase::Idle;
        }
        let positional = if self.state.positional.is_seeking() {
            PositionalMode::Seek
        } else {
            PositionalMode::Free
        };
        let angular = match self.state.orientation_mode {
            OrientationMode::LookAt => AngularMode::LookAt,
            OrientationMode::Euler if self.state.angular.is_seeking() => AngularMode::Seek,
            OrientationMode::Euler => AngularMode::Free,
        };
        CameraPhase::Tracking {
            positional,
            angular,
        }
    }

    pub fn init(&mut self, width: u32, height: u32) {
        self.state = CameraState {
            fov: self.tuning.fov,
            focus: Vector::from(self.tuning.focus),
            ..CameraState::default()
        };
        self.viewport = Some(Viewport { width, height });
        self.flythrough = None;
        logging::info(LOG, format!("init {}x{}", width, height));
    }

    /// Releases the view and unbinds; updates are ignored until the next `init`.
    pub fn exit(&mut self) {
        self.stop_flythrough();
        if self.viewport.take().is_some() {
            logging::info(LOG, "exit");
        }
        self.state.target = None;
        self.state.target_orientation = None;
    }

    pub fn bind_target(&mut self, handle: TargetHandle) {
        self.state.target = Some(handle);
        logging::info(LOG, format!("bound target {}", handle.index()));
    }

    pub fn unbind_target(&mut self) {
        if self.state.target.take().is_some() {
            logging::info(LOG, "unbound target");
        }
    }

    pub fn set_target_orientation(&mut self, handle: Option<TargetHandle>) {
        self.state.target_orientation = handle;
    }

    pub fn set_orientation_mode(&mut self, mode: OrientationMode) {
        self.state.orientation_mode = mode;
    }

    pub fn set_focus(&mut self, focus: Vector<Real>) {
        self.state.focus = focus;
    }

    pub fn set_range(&mut self, channel: ChannelId, range: Option<(Real, Real)>) {
        self.channel_mut(channel).set_range(range);
    }

    fn channel_mut(&mut self, channel: ChannelId) -> &mut GoalChannel {
        match channel {
            ChannelId::Distance => &mut self.state.positional.distance,
            ChannelId::Height => &mut self.state.positional.height,
            ChannelId::Azimuth => &mut self.state.positional.azimuth,
            ChannelId::Yaw => &mut self.state.angular.yaw,
            ChannelId::Pitch => &mut self.state.angular.pitch,
            ChannelId::Roll => &mut self.state.angular.roll,
        }
    }

    fn subject(&self, targets: &dyn TargetSource) -> Option<Subject> {
        let transform = targets.target_transform(self.state.target?)?;
        let facing = self
            .state
            .target_orientation
            .and_then(|handle| targets.target_transform(handle))
            .map_or(transform.rotation, |orientation| orientation.rotation);
        Some(Subject::new(&transform, facing))
    }

    /// Re-derives the positional channels from the camera's world position.
    fn sync_positional(&mut self, subject: &Subject) {
        let coords = cylinder_frame(self.state.move_flags).from_world(
            &self.state.position(),
            &subject.position,
            subject.heading,
        );
        self.state.positional.distance.current = coords.distance;
        self.state.positional.height.current = coords.height;
        self.state.positional.azimuth.current = coords.azimuth;
    }

    /// Places the camera behind the subject at `distance`/`height`, looking along the
    /// subject's facing tilted by `pitch`. Positional channels hold their goals afterwards.
    pub fn reset(&mut self, targets: &dyn TargetSource, distance: Real, height: Real, pitch: Real) {
        let target = self.state.target;
        let target_orientation = self.state.target_orientation;
        self.state = CameraState {
            target,
            target_orientation,
            fov: self.state.fov,
            focus: Vector::from(self.tuning.focus),
            last_step: self.state.last_step,
            ..CameraState::default()
        };

        let heading = self.subject(targets).map_or(0.0, |subject| subject.heading);
        let flags = MoveFlags {
            world_azimuth: true,
            ..MoveFlags::HOLD_ALL
        };
        let request = MotionRequest::new(distance, height, PI + heading, SeekTiming::IMMEDIATE)
            .with_flags(flags);
        self.request_move(targets, request);

        let angular = &mut self.state.angular;
        angular.pitch.goal = pitch;
        angular.pitch.current = pitch;
        angular.roll.goal = 0.0;
        angular.roll.current = 0.0;
        let euler = Euler::new(angular.yaw.current, pitch, 0.0);
        self.state.pose.rotation = euler_quat(euler);
        self.state.prev_pose = self.state.pose;
        self.state.orientation_mode = OrientationMode::Euler;

        logging::info(
            LOG,
            format!("reset d={:.2} h={:.2} pitch={:.3}", distance, height, pitch),
        );
    }

    pub fn request_move(&mut self, targets: &dyn TargetSource, request: MotionRequest) {
        self.state.move_flags = request.flags;
        let subject = self.subject(targets);
        if let Some(subject) = &subject {
            self.sync_positional(subject);
        }
        let positional = &mut self.state.positional;
        positional.distance.goal = request.distance;
        positional.height.goal = request.height;
        positional.azimuth.goal = request.azimuth;

        if request.timing.is_immediate() {
            positional.stop();
            let Some(subject) = subject else {
                logging::debug(LOG, "immediate move with no subject; goals stored");
                return;
            };
            positional.distance.snap();
            positional.height.snap();
            positional.azimuth.snap();
            let camera_frame = cylinder_frame(request.flags);
            let position = camera_frame.to_world(goal_coords(&self.state), &subject.position, subject.heading);
            self.state.set_position(position);
            self.state.prev_pose.translation = self.state.pose.translation;
            let facing = facing_for_azimuth(camera_frame.world_azimuth(request.azimuth, subject.heading));
            self.state.angular.yaw.goal = facing;
            self.state.angular.yaw.current = facing;
            return;
        }

        let timing = request.timing;
        positional.envelope = SeekEnvelope::arm(timing.duration, timing.ramp_up, timing.ramp_down);
        let envelope = positional.envelope;
        positional.distance.epv = envelope.exit_profile_velocity(positional.distance.to_goal());
        positional.height.epv = envelope.exit_profile_velocity(positional.height.to_goal());
        let arc = positional.azimuth.to_goal()
            * 0.5
            * (positional.distance.goal + positional.distance.current);
        positional.azimuth.epv = envelope.exit_profile_velocity(arc);
        logging::debug(
            LOG,
            format!(
                "move armed d={:.2} h={:.2} az={:.3} over {:.2}s",
                request.distance, request.height, request.azimuth, timing.duration
            ),
        );
    }

    pub fn request_look(&mut self, request: LookRequest) {
        self.state.look_flags = request.flags;
        self.state.orientation_mode = OrientationMode::Euler;
        let angular = &mut self.state.angular;
        angular.yaw.goal = request.yaw;
        angular.pitch.goal = request.pitch;
        angular.roll.goal = request.roll;

        if request.timing.is_immediate() {
            self.snap_angular();
            return;
        }
        let timing = request.timing;
        angular.envelope = SeekEnvelope::arm(timing.duration, timing.ramp_up, timing.ramp_down);
        let envelope = angular.envelope;
        for channel in [&mut angular.yaw, &mut angular.pitch, &mut angular.roll] {
            channel.epv = envelope.exit_profile_velocity(channel.to_goal());
        }
        logging::debug(
            LOG,
            format!(
                "look armed ypr=({:.3}, {:.3}, {:.3}) over {:.2}s",
                request.yaw, request.pitch, request.roll, timing.duration
            ),
        );
    }

    fn snap_angular(&mut self) {
        let angular = &mut self.state.angular;
        angular.envelope.cancel();
        angular.clear_epv();
        angular.yaw.snap();
        angular.pitch.snap();
        angular.roll.snap();
        let euler = Euler::new(angular.yaw.current, angular.pitch.current, angular.roll.current);
        self.state.pose.rotation = euler_quat(euler);
        self.state.prev_pose.rotation = self.state.pose.rotation;
    }

    fn rotate_to(&mut self, euler: Euler, timing: SeekTiming) {
        self.state.orientation_mode = OrientationMode::Euler;
        self.state.look_flags = LookFlags {
            hold_yaw: true,
            hold_pitch: true,
            hold_roll: true,
        };
        let angular = &mut self.state.angular;
        angular.yaw.goal = euler.yaw;
        angular.pitch.goal = euler.pitch;
        angular.roll.goal = euler.roll;
        if timing.is_immediate() {
            self.snap_angular();
            return;
        }
        angular.envelope = SeekEnvelope::arm(timing.duration, timing.ramp_up, timing.ramp_down);
        angular.clear_epv();
    }

    /// Turns to look along `direction`. Yaw comes from the horizontal heading and pitch
    /// from the vertical component, positive looking down.
    pub fn rotate_to_direction(&mut self, direction: Vector<Real>, roll: Real, timing: SeekTiming) {
        let yaw = if direction.x == 0.0 && direction.z == 0.0 {
            self.state.angular.yaw.current
        } else {
            wrap_angle(direction.x.atan2(direction.z))
        };
        let pitch = -direction.y.clamp(-1.0, 1.0).asin();
        self.rotate_to(Euler::new(yaw, pitch, roll), timing);
    }

    pub fn rotate_to_basis(&mut self, rotation: UnitQuaternion<Real>, timing: SeekTiming) {
        self.rotate_to(rotation_euler(&rotation), timing);
    }

    /// Teleports the camera and drops positional holds and any active move.
    pub fn move_to(&mut self, position: Vector<Real>) {
        self.state.set_position(position);
        self.release_position();
    }

    /// Moves at most `max_step` toward `position`.
    pub fn move_toward(&mut self, position: Vector<Real>, max_step: Real) {
        let current = self.state.position();
        let delta = position - current;
        let length = delta.norm();
        let next = if max_step > 0.0 && length > max_step {
            current + delta * (max_step / length)
        } else {
            position
        };
        self.state.set_position(next);
        self.release_position();
    }

    fn release_position(&mut self) {
        self.state.prev_pose.translation = self.state.pose.translation;
        self.state.move_flags = self.state.move_flags.without_holds();
        self.state.positional.stop();
    }

    /// Instant offset that leaves the measured velocity untouched.
    pub fn translate(&mut self, dx: Real, dy: Real, dz: Real) {
        let delta = Vector::new(dx, dy, dz);
        self.state.pose.translation.vector += delta;
        self.state.prev_pose.translation.vector += delta;
        self.state.translation_accum += delta;
    }

    /// Approaches `target` degrees by at most `max_speed * dt`; a zero speed snaps.
    pub fn set_field_of_view(&mut self, target: Real, max_speed: Real, dt: Real) {
        if !target.is_finite() {
            return;
        }
        self.state.fov = step_toward(self.state.fov, target, max_speed * dt);
    }

    pub fn view_isometry(&self) -> Isometry<Real> {
        self.state.pose
    }

    /// World-to-view transform of the current pose.
    pub fn view_matrix(&self) -> Matrix4<Real> {
        self.state.pose.inverse().to_homogeneous()
    }

    pub fn projection(&self) -> Matrix4<Real> {
        let aspect = self.viewport.map_or(1.0, |viewport| viewport.aspect());
        let fov = self.state.fov.clamp(1.0, 179.0).to_radians();
        Perspective3::new(aspect, fov, NEAR_PLANE, FAR_PLANE).to_homogeneous()
    }

    /// Advances the camera by `dt` seconds of frame time in fixed sub-steps. Collision is
    /// resolved once, on the last sub-step.
    pub fn update(&mut self, ctx: &CameraSystemContext, scene: &CameraScene<'_>, dt: Real) {
        if self.viewport.is_none() || !(dt.is_finite() && dt > 0.0) {
            return;
        }
        if self.flythrough.is_some() {
            self.step_flythrough(dt);
            return;
        }
        let Some(handle) = self.state.target else {
            return;
        };
        let Some(subject) = self.subject(scene.targets) else {
            logging::debug(LOG, format!("target {} is gone; idling", handle.index()));
            self.state.target = None;
            return;
        };

        let substeps = ((self.tuning.update_rate * dt).ceil() as usize).clamp(1, MAX_SUBSTEPS);
        let step = dt / substeps as Real;
        for index in 0..substeps {
            self.substep(ctx, &subject, step);
            if ctx.collisions_enabled() && index + 1 == substeps {
                self.resolve_collision(&subject, scene.collision);
            }
            self.state.last_step = step;
        }
    }

    /// Hands the pose to `player` until it finishes or is skipped, then restores the
    /// camera exactly as it was.
    pub fn start_flythrough(&mut self, player: FlythroughPlayer) {
        let backup = match self.flythrough.take() {
            Some(active) => active.backup,
            None => self.state.clone(),
        };
        self.flythrough = Some(ActiveFlythrough { player, backup });
        logging::info(LOG, "flythrough started");
    }

    pub fn is_flying(&self) -> bool {
        self.flythrough.is_some()
    }

    /// Skips the running flythrough once it is past its skip threshold.
    pub fn skip_flythrough(&mut self) -> bool {
        let skipped = self
            .flythrough
            .as_mut()
            .is_some_and(|active| active.player.skip());
        if skipped {
            self.stop_flythrough();
        }
        skipped
    }

    pub fn stop_flythrough(&mut self) {
        if let Some(active) = self.flythrough.take() {
            self.state = active.backup;
            logging::info(LOG, "flythrough ended; camera restored");
        }
    }

    fn step_flythrough(&mut self, dt: Real) {
        let Some(active) = self.flythrough.as_mut() else {
            return;
        };
        match active.player.update(dt) {
            Some(pose) => {
                self.state.pose = pose;
                self.state.prev_pose = pose;
            }
            None => self.stop_flythrough(),
        }
    }

    fn substep(&mut self, ctx: &CameraSystemContext, subject: &Subject, dt: Real) {
        let measured = (self.state.pose.translation.vector - self.state.prev_pose.translation.vector)
            * safe_div(1.0, self.state.last_step);
        self.state.prev_pose.translation = self.state.pose.translation;
        self.sync_positional(subject);
        let world_azimuth = cylinder_frame(self.state.move_flags)
            .world_azimuth(self.state.positional.azimuth.current, subject.heading);
        self.state.basis = HorizontalBasis::build(
            &(self.state.position() - subject.position),
            &frame::forward(&self.state.pose.rotation),
            world_azimuth,
        );

        if !ctx.tracking_disabled() {
            self.step_positional(subject, measured, dt);
        }

        match self.state.orientation_mode {
            OrientationMode::Euler => self.step_angular(dt),
            OrientationMode::LookAt => self.step_look_at(subject, dt),
        }
    }

    fn step_positional(&mut self, subject: &Subject, measured: Vector<Real>, dt: Real) {
        let basis = self.state.basis;
        let tuning = &self.tuning.positional;
        let positional = &mut self.state.positional;

        // Measured velocity split along the basis, each part scaled by its carry.
        let dcv = measured.dot(&basis.at) * tuning.distance.carry;
        let hcv = measured.y * tuning.height.carry;
        let pcv = measured.dot(&basis.right) * tuning.azimuth.carry;
        let mut position =
            self.state.pose.translation.vector + (basis.at * dcv + basis.up * hcv + basis.right * pcv) * dt;

        let (dsv, hsv, psv) = if positional.is_seeking() {
            let envelope = positional.envelope;
            let Some(phase) = envelope.phase(dt) else {
                positional.envelope.cancel();
                for channel in [&mut positional.distance, &mut positional.height, &mut positional.azimuth] {
                    channel.snap();
                    channel.epv = 0.0;
                }
                let position = cylinder_frame(self.state.move_flags).to_world(
                    goal_coords(&self.state),
                    &subject.position,
                    subject.heading,
                );
                self.state.set_position(position);
                self.state.prev_pose.translation = self.state.pose.translation;
                return;
            };
            let distance = &positional.distance;
            let dtg = distance.to_goal();
            let htg = positional.height.to_goal();
            let ptg = 0.5 * (distance.goal + distance.current) * positional.azimuth.to_goal();
            let solved = (
                envelope.solve_velocity(phase, dtg, dcv, positional.distance.epv, dt),
                envelope.solve_velocity(phase, htg, hcv, positional.height.epv, dt),
                envelope.solve_velocity(phase, ptg, pcv, positional.azimuth.epv, dt),
            );
            positional.envelope.tick(dt);
            solved
        } else {
            let flags = self.state.move_flags;
            (
                free_velocity(
                    &tuning.distance,
                    free_target(&positional.distance, flags.hold_distance),
                    1.0,
                    dcv,
                    dt,
                ),
                free_velocity(
                    &tuning.height,
                    free_target(&positional.height, flags.hold_height),
                    1.0,
                    hcv,
                    dt,
                ),
                free_velocity(
                    &tuning.azimuth,
                    free_target_angular(&positional.azimuth, flags.hold_azimuth),
                    positional.distance.current,
                    pcv,
                    dt,
                ),
            )
        };

        position += (basis.at * (dsv - dcv) + basis.up * (hsv - hcv) + basis.right * (psv - pcv)) * dt;
        positional.distance.velocity = dsv;
        positional.height.velocity = hsv;
        positional.azimuth.velocity = psv;
        self.state.set_position(position);
    }

    fn step_angular(&mut self, dt: Real) {
        let now = rotation_euler(&self.state.pose.rotation);
        let before = rotation_euler(&self.state.prev_pose.rotation);
        let rate = safe_div(1.0, self.state.last_step);
        let tuning = &self.tuning.angular;
        let flags = self.state.look_flags;
        let angular = &mut self.state.angular;
        angular.yaw.velocity = wrap_angle(now.yaw - before.yaw) * rate * tuning.yaw.carry;
        angular.pitch.velocity = wrap_angle(now.pitch - before.pitch) * rate * tuning.pitch.carry;
        angular.roll.velocity = wrap_angle(now.roll - before.roll) * rate * tuning.roll.carry;
        self.state.prev_pose.rotation = self.state.pose.rotation;

        if angular.is_seeking() {
            advance_group(
                &mut [&mut angular.yaw, &mut angular.pitch, &mut angular.roll],
                &mut angular.envelope,
                dt,
            );
        } else {
            let channels = [
                (&mut angular.yaw, &tuning.yaw, flags.hold_yaw),
                (&mut angular.pitch, &tuning.pitch, flags.hold_pitch),
                (&mut angular.roll, &tuning.roll, flags.hold_roll),
            ];
            for (channel, correction, hold) in channels {
                let target = free_target_angular(channel, hold);
                channel.velocity = free_velocity(correction, target, 1.0, channel.velocity, dt);
                channel.current += channel.velocity * dt;
            }
        }

        let euler = Euler::new(angular.yaw.current, angular.pitch.current, angular.roll.current);
        self.state.pose.rotation = euler_quat(euler);
    }

    fn step_look_at(&mut self, subject: &Subject, dt: Real) {
        self.state.prev_pose.rotation = self.state.pose.rotation;
        let limits = LookAtLimits::from_tuning(&self.tuning);
        let rotation = resolve_look_at(
            &self.state.pose.rotation,
            &self.state.position(),
            &subject.look_transform(),
            &self.state.focus,
            &limits,
            dt,
        );
        self.state.pose.rotation = rotation;

        // Keep the angular channels on the solved orientation so a later switch to Euler
        // mode starts from here.
        let euler = rotation_euler(&rotation);
        let angular = &mut self.state.angular;
        for (channel, value) in [
            (&mut angular.yaw, euler.yaw),
            (&mut angular.pitch, euler.pitch),
            (&mut angular.roll, euler.roll),
        ] {
            channel.current = value;
            channel.velocity = 0.0;
        }
    }

    fn resolve_collision(&mut self, subject: &Subject, collision: &dyn CollisionQuery) {
        let origin = subject.position + world_up() * self.tuning.collision_lift;
        let sweep = SweptSphere::new(origin, self.state.position(), self.tuning.collision_radius);
        let Some(hit) = collision.sweep_sphere(&sweep) else {
            return;
        };
        if let Some(stop) = resolve_obstruction(&sweep, hit, self.tuning.collision_floor) {
            // Shift the previous pose too so the push is not measured as velocity.
            let push = stop - self.state.position();
            self.state.set_position(stop);
            self.state.prev_pose.translation.vector += push;
        }
    }
}
