//! Camera tuning stored as TOML.

use std::fmt;

use rapier3d::prelude::Real;
use serde::{Deserialize, Serialize};

use crate::correction::CorrectionTuning;

pub const DEFAULT_UPDATE_RATE: Real = 144.0;
pub const DEFAULT_FOV: Real = 75.0;
const MAX_UPDATE_RATE: Real = 2000.0;

#[derive(Debug)]
pub enum TuningError {
    Parse(String),
    Encode(String),
    Invalid(Vec<String>),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Parse(msg) => write!(f, "camera tuning parse error: {}", msg),
            TuningError::Encode(msg) => write!(f, "camera tuning encode error: {}", msg),
            TuningError::Invalid(errors) => {
                write!(f, "camera tuning invalid: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for TuningError {}

#[derive(Clone, Debug, Default)]
pub struct TuningValidation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl TuningValidation {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionalCorrection {
    pub distance: CorrectionTuning,
    pub height: CorrectionTuning,
    pub azimuth: CorrectionTuning,
}

impl Default for PositionalCorrection {
    fn default() -> Self {
        Self {
            distance: CorrectionTuning::default(),
            height: CorrectionTuning::default(),
            azimuth: CorrectionTuning::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AngularCorrection {
    pub yaw: CorrectionTuning,
    pub pitch: CorrectionTuning,
    pub roll: CorrectionTuning,
}

impl Default for AngularCorrection {
    fn default() -> Self {
        Self {
            yaw: CorrectionTuning::with_carry(0.65),
            pitch: CorrectionTuning::with_carry(0.7),
            roll: CorrectionTuning::with_carry(0.7),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Sub-steps per second of simulated time.
    pub update_rate: Real,
    /// Degrees.
    pub fov: Real,
    pub focus: [Real; 3],
    pub collision_radius: Real,
    /// Sweeps start this far above the subject's origin.
    pub collision_lift: Real,
    /// The camera is never pushed closer to the sweep origin than this.
    pub collision_floor: Real,
    /// Degrees the look-at solve may turn away from the subject.
    pub max_look_deviation: Real,
    /// Degrees below which a look-at correction is skipped.
    pub jitter_threshold: Real,
    pub orientation_rate: Real,
    pub positional: PositionalCorrection,
    pub angular: AngularCorrection,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            update_rate: DEFAULT_UPDATE_RATE,
            fov: DEFAULT_FOV,
            focus: [0.0, 0.0, 10.0],
            collision_radius: 0.07,
            collision_lift: 0.7,
            collision_floor: 0.6,
            max_look_deviation: 30.0,
            jitter_threshold: 5.0,
            orientation_rate: 25.5,
            positional: PositionalCorrection::default(),
            angular: AngularCorrection::default(),
        }
    }
}

fn check_correction(name: &str, tuning: &CorrectionTuning, validation: &mut TuningValidation) {
    let fields = [
        ("time", tuning.time),
        ("damping", tuning.damping),
        ("carry", tuning.carry),
        ("min_speed", tuning.min_speed),
    ];
    for (field, value) in fields {
        if !value.is_finite() || value < 0.0 {
            validation
                .errors
                .push(format!("{}.{} must be finite and >= 0", name, field));
        }
    }
    if tuning.carry > 1.0 {
        validation
            .warnings
            .push(format!("{}.carry {} amplifies measured velocity", name, tuning.carry));
    }
}

impl CameraTuning {
    pub fn parse_toml(text: &str) -> Result<Self, TuningError> {
        toml::from_str(text).map_err(|err| TuningError::Parse(err.to_string()))
    }

    pub fn to_toml(&self) -> Result<String, TuningError> {
        toml::to_string(self).map_err(|err| TuningError::Encode(err.to_string()))
    }

    /// Parses and rejects tuning with validation errors.
    pub fn load_toml(text: &str) -> Result<Self, TuningError> {
        let tuning = Self::parse_toml(text)?;
        let validation = tuning.validate();
        if validation.is_ok() {
            Ok(tuning)
        } else {
            Err(TuningError::Invalid(validation.errors))
        }
    }

    pub fn validate(&self) -> TuningValidation {
        let mut validation = TuningValidation::default();

        if !self.update_rate.is_finite() || self.update_rate <= 0.0 {
            validation
                .errors
                .push("update_rate must be finite and > 0".to_string());
        } else if self.update_rate > MAX_UPDATE_RATE {
            validation.warnings.push(format!(
                "update_rate {} exceeds {}",
                self.update_rate, MAX_UPDATE_RATE
            ));
        }

        if !self.fov.is_finite() || self.fov <= 0.0 || self.fov >= 180.0 {
            validation
                .errors
                .push("fov must be within (0, 180) degrees".to_string());
        }

        if !self.focus.iter().all(|c| c.is_finite()) {
            validation.errors.push("focus must be finite".to_string());
        }

        let non_negative = [
            ("collision_radius", self.collision_radius),
            ("collision_floor", self.collision_floor),
            ("max_look_deviation", self.max_look_deviation),
            ("jitter_threshold", self.jitter_threshold),
            ("orientation_rate", self.orientation_rate),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                validation
                    .errors
                    .push(format!("{} must be finite and >= 0", name));
            }
        }

        if !self.collision_lift.is_finite() {
            validation
                .errors
                .push("collision_lift must be finite".to_string());
        }

        if self.jitter_threshold >= self.max_look_deviation {
            validation.warnings.push(format!(
                "jitter_threshold {} is not below max_look_deviation {}",
                self.jitter_threshold, self.max_look_deviation
            ));
        }

        check_correction("positional.distance", &self.positional.distance, &mut validation);
        check_correction("positional.height", &self.positional.height, &mut validation);
        check_correction("positional.azimuth", &self.positional.azimuth, &mut validation);
        check_correction("angular.yaw", &self.angular.yaw, &mut validation);
        check_correction("angular.pitch", &self.angular.pitch, &mut validation);
        check_correction("angular.roll", &self.angular.roll, &mut validation);

        validation
    }

    pub fn max_look_deviation_rad(&self) -> Real {
        self.max_look_deviation.to_radians()
    }

    pub fn jitter_threshold_rad(&self) -> Real {
        self.jitter_threshold.to_radians()
    }
}

/// Distance, height and pitch of one free-look pose.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LookPose {
    pub distance: Real,
    pub height: Real,
    /// Radians; positive looks down.
    pub pitch: Real,
}

impl LookPose {
    pub const fn new(distance: Real, height: Real, pitch: Real) -> Self {
        Self {
            distance,
            height,
            pitch,
        }
    }

    fn is_finite(&self) -> bool {
        self.distance.is_finite() && self.height.is_finite() && self.pitch.is_finite()
    }
}

/// Free-look pose table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeLookTweak {
    /// Pose with the stick centered.
    pub rest: LookPose,
    /// Stick fully down: camera dips toward the ground.
    pub below: LookPose,
    /// Stick fully up: camera rises over the subject.
    pub above: LookPose,
    pub high_bounce: LookPose,
    /// Distance and height while the wall-jump view is active.
    pub wall_distance: Real,
    pub wall_height: Real,
    /// Close-in pose blended by the lasso factor and used by the near toggle.
    pub near: LookPose,
    /// Pitch while bubble bouncing.
    pub bounce_pitch: Real,
    pub distance_multiplier: Real,
    pub distance_offset: Real,
    pub height_multiplier: Real,
    pub height_offset: Real,
    /// Floor of the look timer.
    pub min_look_time: Real,
}

impl Default for FreeLookTweak {
    fn default() -> Self {
        Self {
            rest: LookPose::new(5.0, 2.5, 15.0_f32.to_radians()),
            below: LookPose::new(3.0, 0.4, -20.0_f32.to_radians()),
            above: LookPose::new(6.5, 5.0, 45.0_f32.to_radians()),
            high_bounce: LookPose::new(6.0, 4.0, 40.0_f32.to_radians()),
            wall_distance: 4.0,
            wall_height: 1.5,
            near: LookPose::new(3.5, 2.4, 40.0_f32.to_radians()),
            bounce_pitch: 30.0_f32.to_radians(),
            distance_multiplier: 1.0,
            distance_offset: 0.0,
            height_multiplier: 1.0,
            height_offset: 0.0,
            min_look_time: 0.1,
        }
    }
}

impl FreeLookTweak {
    pub fn parse_toml(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|err| err.to_string())
    }

    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string(self).map_err(|err| err.to_string())
    }

    pub fn validate(&self) -> TuningValidation {
        let mut validation = TuningValidation::default();
        let poses = [
            ("rest", &self.rest),
            ("below", &self.below),
            ("above", &self.above),
            ("high_bounce", &self.high_bounce),
            ("near", &self.near),
        ];
        for (name, pose) in poses {
            if !pose.is_finite() {
                validation.errors.push(format!("{} pose must be finite", name));
            } else if pose.distance <= 0.0 {
                validation
                    .warnings
                    .push(format!("{} pose distance {} is not positive", name, pose.distance));
            }
        }
        if !self.min_look_time.is_finite() || self.min_look_time < 0.0 {
            validation
                .errors
                .push("min_look_time must be finite and >= 0".to_string());
        }
        validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_and_round_trip() {
        let tuning = CameraTuning::default();
        assert!(tuning.validate().is_ok());
        let text = tuning.to_toml().expect("encode");
        let back = CameraTuning::parse_toml(&text).expect("parse");
        assert_eq!(back, tuning);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let tuning = CameraTuning::parse_toml(
            r#"
            update_rate = 60.0

            [angular.yaw]
            time = 0.5
            damping = 0.25
            carry = 0.5
            "#,
        )
        .expect("parse");
        assert_eq!(tuning.update_rate, 60.0);
        assert_eq!(tuning.fov, DEFAULT_FOV);
        assert_eq!(tuning.angular.yaw.carry, 0.5);
        assert_eq!(tuning.angular.yaw.min_speed, 0.0);
        assert_eq!(tuning.angular.pitch.carry, 0.7);
    }

    #[test]
    fn load_rejects_invalid_values() {
        let err = CameraTuning::load_toml("update_rate = 0.0\nfov = 200.0\n").unwrap_err();
        match err {
            TuningError::Invalid(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected {}", other),
        }
        assert!(matches!(
            CameraTuning::load_toml("update_rate = \"fast\""),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn carry_above_one_warns() {
        let mut tuning = CameraTuning::default();
        tuning.angular.roll.carry = 1.5;
        let validation = tuning.validate();
        assert!(validation.is_ok());
        assert_eq!(validation.warnings.len(), 1);
    }

    #[test]
    fn free_look_tweak_round_trips() {
        let tweak = FreeLookTweak::default();
        assert!(tweak.validate().is_ok());
        let text = tweak.to_toml().expect("encode");
        assert_eq!(FreeLookTweak::parse_toml(&text).expect("parse"), tweak);
    }
}
