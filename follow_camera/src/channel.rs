//! Goal-seek channels with a trapezoidal velocity profile.
//!
//! A group of channels shares one [`SeekEnvelope`]: a countdown plus acceleration and
//! deceleration thresholds, both measured back from the end of the motion. Each sub-step
//! solves the velocity that keeps the channel on a trapezoid ending at rest on the goal.
//! The value then moves by the carried-over velocity plus the correction toward the
//! solved velocity.

use camera_math::wrap_angle;
use rapier3d::prelude::Real;

/// Remaining time at or below which a seek counts as finished.
pub const SEEK_EPSILON: Real = 1.0e-5;

const DENOMINATOR_EPS: Real = 1.0e-6;

/// Division that yields zero instead of blowing up on a vanishing denominator.
pub fn safe_div(numerator: Real, denominator: Real) -> Real {
    if denominator.abs() <= DENOMINATOR_EPS || !denominator.is_finite() {
        0.0
    } else {
        numerator / denominator
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekPhase {
    Accelerating,
    Cruising,
    Decelerating,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SeekEnvelope {
    /// Time left in the motion; zero when idle.
    pub remaining: Real,
    /// Remaining time at which acceleration ends (`duration - ramp_up`).
    pub accel_threshold: Real,
    /// Remaining time at which deceleration starts (`ramp_down`).
    pub decel_threshold: Real,
}

impl SeekEnvelope {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Ramps are clamped so they fit inside `duration`.
    pub fn arm(duration: Real, ramp_up: Real, ramp_down: Real) -> Self {
        if !(duration.is_finite() && duration > 0.0) {
            return Self::idle();
        }
        let ramp_up = ramp_up.clamp(0.0, duration);
        let ramp_down = ramp_down.clamp(0.0, duration - ramp_up);
        Self {
            remaining: duration,
            accel_threshold: duration - ramp_up,
            decel_threshold: ramp_down,
        }
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// Peak velocity of a trapezoid covering `distance` from rest, committed when the
    /// motion is armed.
    pub fn exit_profile_velocity(&self, distance: Real) -> Real {
        let ramp_up = self.remaining - self.accel_threshold;
        let cruise_equivalent = self.remaining - 0.5 * (ramp_up + self.decel_threshold);
        safe_div(distance, cruise_equivalent)
    }

    /// Phase of the step of length `dt`, or `None` when this step completes the seek.
    pub fn phase(&self, dt: Real) -> Option<SeekPhase> {
        let t_next = self.remaining - dt;
        if !self.is_active() || t_next <= SEEK_EPSILON {
            None
        } else if t_next <= self.decel_threshold {
            Some(SeekPhase::Decelerating)
        } else if t_next <= self.accel_threshold {
            Some(SeekPhase::Cruising)
        } else {
            Some(SeekPhase::Accelerating)
        }
    }

    /// Velocity that keeps a channel `to_goal` away, currently moving at `velocity`, on
    /// the profile for the next `dt`.
    pub fn solve_velocity(
        &self,
        phase: SeekPhase,
        to_goal: Real,
        velocity: Real,
        epv: Real,
        dt: Real,
    ) -> Real {
        let remaining = self.remaining;
        match phase {
            SeekPhase::Decelerating => safe_div(2.0 * to_goal - velocity * dt, remaining),
            SeekPhase::Cruising => safe_div(
                2.0 * to_goal - velocity * dt,
                2.0 * remaining - dt - self.decel_threshold,
            ),
            SeekPhase::Accelerating => {
                let it = self.accel_threshold + (remaining - dt) - self.decel_threshold;
                let ot = safe_div(
                    2.0,
                    remaining + self.accel_threshold - self.decel_threshold,
                );
                safe_div(
                    2.0 * to_goal - (to_goal * ot + epv) * 0.5 * it - velocity * dt,
                    remaining - self.accel_threshold,
                )
            }
        }
    }

    /// Counts down by `dt`; returns `true` once the seek has finished.
    pub fn tick(&mut self, dt: Real) -> bool {
        if self.phase(dt).is_none() {
            self.remaining = 0.0;
            true
        } else {
            self.remaining -= dt;
            false
        }
    }

    pub fn cancel(&mut self) {
        *self = Self::idle();
    }
}

/// One smoothed degree of freedom.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GoalChannel {
    pub current: Real,
    pub goal: Real,
    pub velocity: Real,
    /// Exit profile velocity committed when the seek was armed.
    pub epv: Real,
    pub min: Real,
    pub max: Real,
    /// Differences wrap into `(-pi, pi]`.
    pub angular: bool,
}

impl GoalChannel {
    pub fn linear(value: Real) -> Self {
        Self {
            current: value,
            goal: value,
            ..Self::default()
        }
    }

    pub fn angular(value: Real) -> Self {
        Self {
            angular: true,
            ..Self::linear(value)
        }
    }

    pub fn to_goal(&self) -> Real {
        self.offset_to(self.goal)
    }

    pub fn offset_to(&self, value: Real) -> Real {
        if self.angular {
            wrap_angle(value - self.current)
        } else {
            value - self.current
        }
    }

    /// `[min, max]` when a range is configured (`min < max`).
    pub fn range(&self) -> Option<(Real, Real)> {
        (self.min < self.max).then_some((self.min, self.max))
    }

    pub fn set_range(&mut self, range: Option<(Real, Real)>) {
        let (min, max) = range.unwrap_or((0.0, 0.0));
        self.min = min;
        self.max = max;
    }

    /// Jumps straight to the goal and stops.
    pub fn snap(&mut self) {
        self.current = self.goal;
        self.velocity = 0.0;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Advance {
    pub value: Real,
    pub velocity: Real,
    pub done: bool,
}

/// Next value and velocity of `channel` after `dt` under `envelope`. The envelope is
/// not consumed; call [`SeekEnvelope::tick`] once per group after advancing its channels.
pub fn advance(channel: &GoalChannel, envelope: &SeekEnvelope, dt: Real) -> Advance {
    if !envelope.is_active() {
        return Advance {
            value: channel.current,
            velocity: channel.velocity,
            done: true,
        };
    }
    let Some(phase) = envelope.phase(dt) else {
        return Advance {
            value: channel.goal,
            velocity: 0.0,
            done: true,
        };
    };
    let solved = envelope.solve_velocity(
        phase,
        channel.to_goal(),
        channel.velocity,
        channel.epv,
        dt,
    );
    let carry = channel.velocity * dt;
    let correction = (solved - channel.velocity) * dt;
    Advance {
        value: channel.current + carry + correction,
        velocity: solved,
        done: false,
    }
}

/// Advances every channel of a group sharing `envelope`, then counts the envelope down.
/// Returns `true` when the group's seek finished on this step.
pub fn advance_group(channels: &mut [&mut GoalChannel], envelope: &mut SeekEnvelope, dt: Real) -> bool {
    if !envelope.is_active() {
        return true;
    }
    for channel in channels.iter_mut() {
        let step = advance(channel, envelope, dt);
        channel.current = step.value;
        channel.velocity = step.velocity;
    }
    envelope.tick(dt)
}
