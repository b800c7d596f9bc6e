//! Correction applied to channels that are not under an active seek.
//!
//! Each free channel either holds its goal, is pulled back inside its range, or only has
//! its velocity damped. Corrections return the channel's new velocity; the caller moves
//! the value by it.

use camera_math::wrap_angle;
use rapier3d::prelude::Real;
use serde::{Deserialize, Serialize};

use crate::channel::{safe_div, GoalChannel};

/// Bounds are approached from inside by this much so a corrected value reads as in range.
pub const RANGE_INSET: Real = 1.0e-5;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrectionTuning {
    /// Seconds to close the current gap at the desired correction speed.
    pub time: Real,
    /// Seconds over which velocity blends to the desired speed, or decays when damping.
    pub damping: Real,
    /// Fraction of the measured velocity carried into the next sub-step.
    pub carry: Real,
    /// Corrections never crawl slower than this.
    #[serde(default)]
    pub min_speed: Real,
}

impl Default for CorrectionTuning {
    fn default() -> Self {
        Self {
            time: 1.0,
            damping: 1.0,
            carry: 1.0,
            min_speed: 0.0,
        }
    }
}

impl CorrectionTuning {
    pub fn with_carry(carry: Real) -> Self {
        Self {
            carry,
            ..Self::default()
        }
    }

    fn blend(&self, dt: Real) -> Real {
        if self.damping <= dt {
            1.0
        } else {
            safe_div(dt, self.damping).clamp(0.0, 1.0)
        }
    }

    /// Velocity after one step of pulling a value `to_target` away toward the target.
    /// The resulting step never carries the value past the target.
    pub fn correct(&self, to_target: Real, velocity: Real, dt: Real) -> Real {
        if dt <= 0.0 {
            return velocity;
        }
        let desired = safe_div(to_target, self.time.max(dt));
        let mut next = velocity + (desired - velocity) * self.blend(dt);
        if to_target != 0.0 && next.abs() < self.min_speed && next * to_target >= 0.0 {
            next = self.min_speed.copysign(to_target);
        }
        if next * to_target > 0.0 && (next * dt).abs() > to_target.abs() {
            next = to_target / dt;
        }
        next
    }

    /// Velocity decayed toward rest, with no pull in any direction.
    pub fn damp(&self, velocity: Real, dt: Real) -> Real {
        if dt <= 0.0 {
            return velocity;
        }
        velocity * (1.0 - self.blend(dt))
    }
}

/// What a free channel should do this step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FreeTarget {
    /// Pull by this offset (in the channel's step units).
    Toward(Real),
    Damp,
}

/// Applies the hold / range / damp policy to a linear channel.
pub fn free_target(channel: &GoalChannel, hold: bool) -> FreeTarget {
    if hold {
        return FreeTarget::Toward(channel.goal - channel.current);
    }
    match channel.range() {
        Some((min, _)) if channel.current < min => {
            FreeTarget::Toward(min + RANGE_INSET - channel.current)
        }
        Some((_, max)) if channel.current > max => {
            FreeTarget::Toward(max - RANGE_INSET - channel.current)
        }
        Some(_) => FreeTarget::Damp,
        None => FreeTarget::Damp,
    }
}

/// Angular form of [`free_target`]. Offsets are wrapped, and an out-of-range value heads
/// for whichever bound is reached by the shorter turn.
pub fn free_target_angular(channel: &GoalChannel, hold: bool) -> FreeTarget {
    if hold {
        return FreeTarget::Toward(wrap_angle(channel.goal - channel.current));
    }
    let Some((min, max)) = channel.range() else {
        return FreeTarget::Damp;
    };
    let to_high = wrap_angle(max - channel.current);
    let to_low = wrap_angle(min - channel.current);
    if to_low > 0.0 && (to_high > 0.0 || to_low.abs() <= to_high.abs()) {
        FreeTarget::Toward(to_low + RANGE_INSET)
    } else if to_high < 0.0 {
        FreeTarget::Toward(to_high - RANGE_INSET)
    } else {
        FreeTarget::Damp
    }
}

/// New velocity of a free channel given its target and measured `velocity`. `scale`
/// converts the target offset into step units (the orbit radius for azimuth, 1 otherwise).
pub fn free_velocity(
    tuning: &CorrectionTuning,
    target: FreeTarget,
    scale: Real,
    velocity: Real,
    dt: Real,
) -> Real {
    match target {
        FreeTarget::Toward(offset) => tuning.correct(offset * scale, velocity, dt),
        FreeTarget::Damp => tuning.damp(velocity, dt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranged(current: Real, min: Real, max: Real) -> GoalChannel {
        let mut channel = GoalChannel::linear(current);
        channel.set_range(Some((min, max)));
        channel
    }

    #[test]
    fn range_pull_converges_without_overshoot() {
        let tuning = CorrectionTuning {
            time: 0.25,
            damping: 0.1,
            carry: 1.0,
            min_speed: 0.5,
        };
        let mut channel = ranged(10.0, 4.0, 6.0);
        let dt = 1.0 / 144.0;
        for _ in 0..(144 * 5) {
            let target = free_target(&channel, false);
            channel.velocity = free_velocity(&tuning, target, 1.0, channel.velocity, dt);
            channel.current += channel.velocity * dt;
            assert!(channel.current >= 4.0, "{}", channel.current);
        }
        assert!(channel.current <= 6.0, "{}", channel.current);
        assert!(channel.velocity.abs() < 1.0e-3);
    }

    #[test]
    fn value_inside_range_is_only_damped() {
        let channel = ranged(5.0, 4.0, 6.0);
        assert_eq!(free_target(&channel, false), FreeTarget::Damp);
        let tuning = CorrectionTuning::default();
        let v = free_velocity(&tuning, FreeTarget::Damp, 1.0, 2.0, 0.25);
        assert!((v - 1.5).abs() < 1.0e-6);
        assert_eq!(tuning.damp(2.0, 2.0), 0.0);
    }

    #[test]
    fn hold_overrides_range() {
        let mut channel = ranged(5.0, 4.0, 6.0);
        channel.goal = 7.0;
        assert_eq!(free_target(&channel, true), FreeTarget::Toward(2.0));
    }

    #[test]
    fn correction_never_steps_past_target() {
        let tuning = CorrectionTuning {
            time: 0.0,
            damping: 0.0,
            carry: 1.0,
            min_speed: 100.0,
        };
        let v = tuning.correct(0.3, 0.0, 0.1);
        assert!((v * 0.1 - 0.3).abs() < 1.0e-6);
        let v = tuning.correct(-0.3, 0.0, 0.1);
        assert!((v * 0.1 + 0.3).abs() < 1.0e-6);
    }

    #[test]
    fn angular_range_picks_shorter_turn() {
        let mut channel = GoalChannel::angular(3.0);
        channel.set_range(Some((-0.5, 0.5)));
        match free_target_angular(&channel, false) {
            FreeTarget::Toward(offset) => assert!(offset < 0.0, "{}", offset),
            other => panic!("unexpected {:?}", other),
        }
        channel.current = -2.9;
        match free_target_angular(&channel, false) {
            FreeTarget::Toward(offset) => assert!(offset > 0.0, "{}", offset),
            other => panic!("unexpected {:?}", other),
        }
        channel.current = 0.2;
        assert_eq!(free_target_angular(&channel, false), FreeTarget::Damp);
    }

    #[test]
    fn angular_hold_wraps() {
        let mut channel = GoalChannel::angular(3.0);
        channel.goal = -3.0;
        match free_target_angular(&channel, true) {
            FreeTarget::Toward(offset) => {
                assert!((offset - (2.0 * std::f32::consts::PI - 6.0)).abs() < 1.0e-4)
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
