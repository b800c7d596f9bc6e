//! Headless camera scenarios: a scripted subject path plus move/look requests, stepped
//! frame by frame.

use camera_collision::{BoundVolumeScene, CameraCollider, CollisionQuery, NoCollision};
use camera_math::frame::{euler_quat, isometry, Euler};
use follow_camera::{
    CameraOwner, CameraPhase, CameraScene, CameraSystemContext, CameraTuning, FollowCamera,
    LookRequest, MotionRequest, MoveFlags, OrientationMode, SeekTiming, TargetTable,
};
use rapier3d::math::{Isometry, Vector};
use rapier3d::prelude::Real;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_frame_dt")]
    pub frame_dt: Real,
    pub frames: u32,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_true")]
    pub collisions: bool,
    #[serde(default)]
    pub look_at: bool,
    #[serde(default)]
    pub tuning: CameraTuning,
    pub reset: ResetStep,
    #[serde(default)]
    pub target: Vec<PathKey>,
    #[serde(default)]
    pub moves: Vec<MoveStep>,
    #[serde(default)]
    pub looks: Vec<LookStep>,
    #[serde(default)]
    pub colliders: Vec<CameraCollider>,
}

fn default_frame_dt() -> Real {
    1.0 / 60.0
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    480
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ResetStep {
    pub distance: Real,
    pub height: Real,
    #[serde(default)]
    pub pitch: Real,
}

/// Subject pose at `frame`; poses between keys are interpolated.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct PathKey {
    pub frame: u32,
    pub position: [Real; 3],
    #[serde(default)]
    pub yaw: Real,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct Timing {
    #[serde(default)]
    pub duration: Real,
    #[serde(default)]
    pub ramp_up: Real,
    #[serde(default)]
    pub ramp_down: Real,
}

impl From<Timing> for SeekTiming {
    fn from(timing: Timing) -> Self {
        SeekTiming::new(timing.duration, timing.ramp_up, timing.ramp_down)
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct MoveStep {
    pub frame: u32,
    pub distance: Real,
    pub height: Real,
    pub azimuth: Real,
    #[serde(flatten)]
    pub timing: Timing,
    #[serde(default)]
    pub hold: bool,
    #[serde(default)]
    pub world_azimuth: bool,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct LookStep {
    pub frame: u32,
    pub yaw: Real,
    pub pitch: Real,
    #[serde(default)]
    pub roll: Real,
    #[serde(flatten)]
    pub timing: Timing,
}

/// One traced frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceRow {
    pub frame: u32,
    pub position: Vector<Real>,
    pub distance: Real,
    pub height: Real,
    pub azimuth: Real,
    pub yaw: Real,
    pub pitch: Real,
    pub phase: CameraPhase,
}

impl TraceRow {
    pub fn format(&self) -> String {
        let phase = match self.phase {
            CameraPhase::Idle => "idle".to_string(),
            CameraPhase::Flythrough => "flythrough".to_string(),
            CameraPhase::Tracking {
                positional,
                angular,
            } => format!("{:?}/{:?}", positional, angular).to_ascii_lowercase(),
        };
        format!(
            "{:>5} pos=({:>8.3}, {:>8.3}, {:>8.3}) d={:>7.3} h={:>7.3} az={:>7.3} yaw={:>7.3} pitch={:>7.3} {}",
            self.frame,
            self.position.x,
            self.position.y,
            self.position.z,
            self.distance,
            self.height,
            self.azimuth,
            self.yaw,
            self.pitch,
            phase
        )
    }
}

fn lerp(from: Real, to: Real, t: Real) -> Real {
    from + (to - from) * t
}

impl Scenario {
    pub fn parse_toml(text: &str) -> Result<Self, String> {
        let scenario: Scenario = toml::from_str(text).map_err(|err| err.to_string())?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), String> {
        if !self.frame_dt.is_finite() || self.frame_dt < 0.0 {
            return Err(format!("frame_dt {} must be finite and >= 0", self.frame_dt));
        }
        let tuning = self.tuning.validate();
        if !tuning.is_ok() {
            return Err(tuning.errors.join("; "));
        }
        let bounds = BoundVolumeScene {
            colliders: self.colliders.clone(),
        };
        let problems = bounds.validate();
        if !problems.is_empty() {
            return Err(problems.join("; "));
        }
        if self.target.windows(2).any(|pair| pair[0].frame >= pair[1].frame) {
            return Err("target keys must have increasing frames".to_string());
        }
        Ok(())
    }

    /// Subject transform at `frame`, holding the first and last keys outside the path.
    pub fn subject_at(&self, frame: u32) -> Isometry<Real> {
        let pose = |key: &PathKey| (Vector::from(key.position), key.yaw);
        let (position, yaw) = match self.target.iter().position(|key| key.frame > frame) {
            None => self.target.last().map(pose).unwrap_or((Vector::zeros(), 0.0)),
            Some(0) => pose(&self.target[0]),
            Some(next) => {
                let a = &self.target[next - 1];
                let b = &self.target[next];
                let t = (frame - a.frame) as Real / (b.frame - a.frame) as Real;
                let position = Vector::from(a.position).lerp(&Vector::from(b.position), t);
                (position, lerp(a.yaw, b.yaw, t))
            }
        };
        isometry(position, euler_quat(Euler::new(yaw, 0.0, 0.0)))
    }

    /// Steps the scenario and returns one row per frame.
    pub fn run(&self) -> Vec<TraceRow> {
        let bounds = BoundVolumeScene {
            colliders: self.colliders.clone(),
        };
        let collision: &dyn CollisionQuery = if self.colliders.is_empty() {
            &NoCollision
        } else {
            &bounds
        };

        let mut targets = TargetTable::new();
        let subject = targets.insert(self.subject_at(0));
        let mut ctx = CameraSystemContext::new();
        if !self.collisions {
            ctx.set_collisions(false, CameraOwner(0));
        }

        let mut camera = FollowCamera::new(self.tuning.clone());
        camera.init(self.width, self.height);
        camera.bind_target(subject);
        camera.reset(&targets, self.reset.distance, self.reset.height, self.reset.pitch);
        if self.look_at {
            camera.set_orientation_mode(OrientationMode::LookAt);
        }

        let mut rows = Vec::with_capacity(self.frames as usize);
        for frame in 0..self.frames {
            targets.set_transform(subject, self.subject_at(frame));
            for step in self.moves.iter().filter(|step| step.frame == frame) {
                let flags = MoveFlags {
                    world_azimuth: step.world_azimuth,
                    ..if step.hold {
                        MoveFlags::HOLD_ALL
                    } else {
                        MoveFlags::default()
                    }
                };
                let request = MotionRequest::new(step.distance, step.height, step.azimuth, step.timing.into())
                    .with_flags(flags);
                camera.request_move(&targets, request);
            }
            for step in self.looks.iter().filter(|step| step.frame == frame) {
                camera.request_look(LookRequest::new(step.yaw, step.pitch, step.roll, step.timing.into()));
            }

            camera.update(&ctx, &CameraScene::new(&targets, collision), self.frame_dt);

            let state = camera.state();
            rows.push(TraceRow {
                frame,
                position: state.position(),
                distance: state.positional.distance.current,
                height: state.positional.height.current,
                azimuth: state.positional.azimuth.current,
                yaw: state.angular.yaw.current,
                pitch: state.angular.pitch.current,
                phase: camera.phase(),
            });
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEEK: &str = r#"
frames = 60

[reset]
distance = 10.0
height = 5.0

[[target]]
frame = 0
position = [0.0, 0.0, 0.0]

[[moves]]
frame = 0
distance = 5.0
height = 2.0
azimuth = 0.0
duration = 1.0
ramp_up = 0.33
ramp_down = 0.33
"#;

    #[test]
    fn seek_scenario_lands_on_goal() {
        let scenario = Scenario::parse_toml(SEEK).expect("scenario");
        let rows = scenario.run();
        assert_eq!(rows.len(), 60);
        let last = rows.last().expect("row");
        assert_eq!(last.distance, 5.0);
        assert_eq!(last.height, 2.0);
        assert!((last.position - Vector::new(0.0, 2.0, 5.0)).norm() < 1.0e-4);
        assert!(last.format().contains("free/free"), "{}", last.format());
    }

    #[test]
    fn subject_path_interpolates_between_keys() {
        let text = r#"
frames = 1
[reset]
distance = 4.0
height = 1.0
[[target]]
frame = 0
position = [0.0, 0.0, 0.0]
[[target]]
frame = 10
position = [10.0, 0.0, 0.0]
yaw = 1.0
"#;
        let scenario = Scenario::parse_toml(text).expect("scenario");
        let mid = scenario.subject_at(5);
        assert!((mid.translation.vector.x - 5.0).abs() < 1.0e-5);
        let after = scenario.subject_at(50);
        assert!((after.translation.vector.x - 10.0).abs() < 1.0e-5);
    }

    #[test]
    fn rejects_bad_scenarios() {
        let unordered = r#"
frames = 1
[reset]
distance = 4.0
height = 1.0
[[target]]
frame = 5
position = [0.0, 0.0, 0.0]
[[target]]
frame = 5
position = [1.0, 0.0, 0.0]
"#;
        assert!(Scenario::parse_toml(unordered).is_err());

        let bad_collider = r#"
frames = 1
[reset]
distance = 4.0
height = 1.0
[[colliders]]
volume = { kind = "sphere", center = [0.0, 0.0, 0.0], radius = -1.0 }
"#;
        assert!(Scenario::parse_toml(bad_collider).is_err());
        assert!(Scenario::parse_toml("frames = \"x\"").is_err());
    }

    #[test]
    fn wall_collider_keeps_camera_in_front() {
        let text = r#"
frames = 2
[reset]
distance = 10.0
height = 5.0
[[colliders]]
volume = { kind = "box", min = [-5.0, -1.0, -4.2], max = [5.0, 10.0, -4.0] }
"#;
        let scenario = Scenario::parse_toml(text).expect("scenario");
        let rows = scenario.run();
        assert!(rows[0].position.z > -4.0, "{:?}", rows[0].position);
    }
}
