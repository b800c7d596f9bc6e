use rapier3d::prelude::Real;

/// Positional channel modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveFlags {
    /// Keep pulling distance toward its goal once no seek is active.
    pub hold_distance: bool,
    pub hold_height: bool,
    pub hold_azimuth: bool,
    /// Height is an absolute world height instead of height above the subject.
    pub world_height: bool,
    /// Azimuth is a world heading instead of relative to the subject's facing.
    pub world_azimuth: bool,
}

impl MoveFlags {
    pub const HOLD_ALL: Self = Self {
        hold_distance: true,
        hold_height: true,
        hold_azimuth: true,
        world_height: false,
        world_azimuth: false,
    };

    pub fn without_holds(self) -> Self {
        Self {
            hold_distance: false,
            hold_height: false,
            hold_azimuth: false,
            ..self
        }
    }
}

/// Angular channel modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LookFlags {
    pub hold_yaw: bool,
    pub hold_pitch: bool,
    pub hold_roll: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrientationMode {
    /// Orientation follows the subject through the look-at solve.
    #[default]
    LookAt,
    /// Orientation is driven by the yaw/pitch/roll channels.
    Euler,
}

/// Timing shared by move and look requests. A non-positive duration applies the goal
/// immediately.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SeekTiming {
    pub duration: Real,
    pub ramp_up: Real,
    pub ramp_down: Real,
}

impl SeekTiming {
    pub const IMMEDIATE: Self = Self {
        duration: 0.0,
        ramp_up: 0.0,
        ramp_down: 0.0,
    };

    pub fn new(duration: Real, ramp_up: Real, ramp_down: Real) -> Self {
        Self {
            duration,
            ramp_up,
            ramp_down,
        }
    }

    pub fn is_immediate(&self) -> bool {
        !(self.duration.is_finite() && self.duration > 0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionRequest {
    pub distance: Real,
    pub height: Real,
    pub azimuth: Real,
    pub timing: SeekTiming,
    pub flags: MoveFlags,
}

impl MotionRequest {
    pub fn new(distance: Real, height: Real, azimuth: Real, timing: SeekTiming) -> Self {
        Self {
            distance,
            height,
            azimuth,
            timing,
            flags: MoveFlags::default(),
        }
    }

    pub fn with_flags(mut self, flags: MoveFlags) -> Self {
        self.flags = flags;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LookRequest {
    pub yaw: Real,
    pub pitch: Real,
    pub roll: Real,
    pub timing: SeekTiming,
    pub flags: LookFlags,
}

impl LookRequest {
    pub fn new(yaw: Real, pitch: Real, roll: Real, timing: SeekTiming) -> Self {
        Self {
            yaw,
            pitch,
            roll,
            timing,
            flags: LookFlags::default(),
        }
    }

    pub fn with_flags(mut self, flags: LookFlags) -> Self {
        self.flags = flags;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_or_nan_duration_is_immediate() {
        assert!(SeekTiming::IMMEDIATE.is_immediate());
        assert!(SeekTiming::new(-1.0, 0.0, 0.0).is_immediate());
        assert!(SeekTiming::new(Real::NAN, 0.0, 0.0).is_immediate());
        assert!(!SeekTiming::new(0.5, 0.1, 0.1).is_immediate());
    }

    #[test]
    fn without_holds_keeps_world_flags() {
        let flags = MoveFlags {
            world_azimuth: true,
            ..MoveFlags::HOLD_ALL
        };
        let cleared = flags.without_holds();
        assert!(!cleared.hold_distance && !cleared.hold_height && !cleared.hold_azimuth);
        assert!(cleared.world_azimuth);
    }
}
