//! Stick-driven free-look goals for the player camera.

use camera_math::frame::world_up;
use rapier3d::math::Vector;
use rapier3d::prelude::Real;

use crate::tuning::{FreeLookTweak, LookPose};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BounceMode {
    #[default]
    None,
    /// Bubble bounce; the near toggle and long bounce refine the pose.
    Bubble { long: bool },
    High,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FreeLookContext {
    pub bounce: BounceMode,
    /// Normal of the wall the player is jumping off, while the wall-jump view is on.
    pub wall_normal: Option<Vector<Real>>,
    /// Floor for the height goal.
    pub min_target_height: Option<Real>,
    /// Lasso factor in `[0, 1]` while the lasso camera is active.
    pub lasso: Option<Real>,
    pub near: bool,
    pub tracking_disabled: bool,
    pub player_velocity: Option<Vector<Real>>,
    /// Camera view direction, used with the player velocity during long bounces.
    pub camera_at: Vector<Real>,
}

/// Goals for one frame of free look.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FreeLookGoals {
    pub distance: Real,
    pub height: Real,
    pub pitch: Real,
    /// Horizontal direction to view along during a wall jump.
    pub view: Option<Vector<Real>>,
}

/// View direction along a wall: `normal x up`, flipped to agree with the camera's `at`.
pub fn wall_jump_view(normal: &Vector<Real>, camera_at: &Vector<Real>) -> Option<Vector<Real>> {
    let view = normal.cross(&world_up()).try_normalize(Real::EPSILON)?;
    Some(if view.dot(camera_at) < 0.0 { -view } else { view })
}

fn lerp(from: Real, to: Real, t: Real) -> Real {
    from + (to - from) * t
}

/// Pose the camera settles into with the stick centered, before any stick input.
fn base_pose(tweak: &FreeLookTweak, ctx: &FreeLookContext) -> LookPose {
    let high = ctx.bounce == BounceMode::High;
    let (distance, height) = if high {
        (tweak.high_bounce.distance, tweak.high_bounce.height)
    } else if ctx.wall_normal.is_some() {
        (tweak.wall_distance, tweak.wall_height)
    } else {
        (tweak.rest.distance, tweak.rest.height)
    };
    LookPose {
        distance: tweak.distance_multiplier * distance + tweak.distance_offset,
        height: tweak.height_multiplier * height + tweak.height_offset,
        pitch: if high {
            tweak.high_bounce.pitch
        } else {
            tweak.rest.pitch
        },
    }
}

/// Pitch for a long bubble bounce: tilts further down the more the player is moving
/// toward the camera.
fn long_bounce_pitch(tweak: &FreeLookTweak, ctx: &FreeLookContext) -> Real {
    if !ctx.near {
        return tweak.bounce_pitch;
    }
    let approach = ctx
        .player_velocity
        .and_then(|velocity| velocity.try_normalize(Real::EPSILON))
        .map(|direction| (-ctx.camera_at.dot(&direction)).max(0.0))
        .unwrap_or(0.0);
    (approach * 20.0 + 20.0).to_radians()
}

/// Goals for a stick pitch input `pitch_input` in `[-1, 1]`. Positive input drops the
/// camera below the subject, negative raises it above. `look_timer` decays toward the
/// tweak's minimum look time while the stick steers the camera.
pub fn free_look_goals(
    tweak: &FreeLookTweak,
    ctx: &FreeLookContext,
    pitch_input: Real,
    look_timer: &mut Real,
    dt: Real,
) -> FreeLookGoals {
    let pose = pose_goals(tweak, ctx, pitch_input, look_timer, dt);
    let view = match (ctx.bounce, ctx.wall_normal) {
        (BounceMode::High, _) | (_, None) => None,
        (_, Some(normal)) => wall_jump_view(&normal, &ctx.camera_at),
    };
    FreeLookGoals {
        distance: pose.distance,
        height: ctx
            .min_target_height
            .map_or(pose.height, |min| pose.height.max(min)),
        pitch: pose.pitch,
        view,
    }
}

fn pose_goals(
    tweak: &FreeLookTweak,
    ctx: &FreeLookContext,
    pitch_input: Real,
    look_timer: &mut Real,
    dt: Real,
) -> LookPose {
    let base = base_pose(tweak, ctx);
    match ctx.bounce {
        BounceMode::None => {}
        BounceMode::High => return base,
        BounceMode::Bubble { long } => {
            if ctx.near {
                return LookPose {
                    distance: tweak.near.distance,
                    height: tweak.near.height,
                    pitch: if long {
                        long_bounce_pitch(tweak, ctx)
                    } else {
                        tweak.near.pitch
                    },
                };
            }
            return LookPose {
                pitch: if long {
                    long_bounce_pitch(tweak, ctx)
                } else {
                    tweak.bounce_pitch
                },
                ..base
            };
        }
    }

    if let (Some(factor), false) = (ctx.lasso, ctx.tracking_disabled) {
        let factor = factor.clamp(0.0, 1.0);
        return LookPose {
            distance: lerp(tweak.near.distance, base.distance, factor),
            height: lerp(tweak.near.height, base.height, factor),
            pitch: lerp(tweak.near.pitch, base.pitch, factor),
        };
    }

    let input = if pitch_input.is_finite() {
        pitch_input.clamp(-1.0, 1.0)
    } else {
        0.0
    };
    let pose = if input > 0.0 {
        LookPose {
            distance: lerp(base.distance, tweak.below.distance, input),
            height: lerp(base.height, tweak.below.height, input),
            // Cubic so small stick motion barely tilts the view upward.
            pitch: lerp(base.pitch, tweak.below.pitch, input * input * input),
        }
    } else {
        let t = -input;
        LookPose {
            distance: lerp(base.distance, tweak.above.distance, t),
            height: lerp(base.height, tweak.above.height, t),
            pitch: lerp(base.pitch, tweak.above.pitch, t),
        }
    };

    *look_timer = if *look_timer > tweak.min_look_time {
        (*look_timer - dt).max(tweak.min_look_time)
    } else {
        tweak.min_look_time
    };

    pose
}

#[cfg(test)]
mod tests {
    use super::*;

    fn near(a: Real, b: Real) -> bool {
        (a - b).abs() < 1.0e-5
    }

    #[test]
    fn centered_stick_returns_rest_pose() {
        let tweak = FreeLookTweak::default();
        let mut timer = 0.5;
        let goals = free_look_goals(&tweak, &FreeLookContext::default(), 0.0, &mut timer, 0.1);
        assert!(near(goals.distance, tweak.rest.distance));
        assert!(near(goals.height, tweak.rest.height));
        assert!(near(goals.pitch, tweak.rest.pitch));
        assert!(near(timer, 0.4));
    }

    #[test]
    fn full_stick_reaches_extremes() {
        let tweak = FreeLookTweak::default();
        let ctx = FreeLookContext::default();
        let mut timer = 0.0;
        let below = free_look_goals(&tweak, &ctx, 1.0, &mut timer, 0.1);
        assert!(near(below.distance, tweak.below.distance));
        assert!(near(below.pitch, tweak.below.pitch));
        let above = free_look_goals(&tweak, &ctx, -1.0, &mut timer, 0.1);
        assert!(near(above.height, tweak.above.height));
        assert!(near(timer, tweak.min_look_time));

        let half = free_look_goals(&tweak, &ctx, 0.5, &mut timer, 0.1);
        let expected = tweak.rest.pitch + (tweak.below.pitch - tweak.rest.pitch) * 0.125;
        assert!(near(half.pitch, expected));
    }

    #[test]
    fn look_timer_never_drops_below_minimum() {
        let tweak = FreeLookTweak::default();
        let mut timer = 0.15;
        free_look_goals(&tweak, &FreeLookContext::default(), 0.2, &mut timer, 1.0);
        assert!(near(timer, tweak.min_look_time));
    }

    #[test]
    fn lasso_blends_from_near_pose_unless_tracking_disabled() {
        let tweak = FreeLookTweak::default();
        let mut timer = 1.0;
        let ctx = FreeLookContext {
            lasso: Some(0.0),
            ..FreeLookContext::default()
        };
        let goals = free_look_goals(&tweak, &ctx, 1.0, &mut timer, 0.1);
        assert!(near(goals.distance, tweak.near.distance));
        assert!(near(timer, 1.0));

        let ctx = FreeLookContext {
            tracking_disabled: true,
            ..ctx
        };
        let goals = free_look_goals(&tweak, &ctx, 0.0, &mut timer, 0.1);
        assert!(near(goals.distance, tweak.rest.distance));
    }

    #[test]
    fn bounce_modes_pick_their_poses() {
        let tweak = FreeLookTweak::default();
        let mut timer = 0.0;
        let high = FreeLookContext {
            bounce: BounceMode::High,
            ..FreeLookContext::default()
        };
        let goals = free_look_goals(&tweak, &high, -1.0, &mut timer, 0.1);
        assert!(near(goals.pitch, tweak.high_bounce.pitch));
        assert!(near(goals.distance, tweak.high_bounce.distance));

        let bubble_near = FreeLookContext {
            bounce: BounceMode::Bubble { long: true },
            near: true,
            player_velocity: Some(Vector::new(0.0, 0.0, -3.0)),
            camera_at: Vector::z(),
            ..FreeLookContext::default()
        };
        let goals = free_look_goals(&tweak, &bubble_near, 0.0, &mut timer, 0.1);
        assert!(near(goals.distance, tweak.near.distance));
        assert!(near(goals.pitch, 40.0_f32.to_radians()));

        let wall = FreeLookContext {
            bounce: BounceMode::Bubble { long: false },
            wall_normal: Some(Vector::x()),
            camera_at: -Vector::z(),
            ..FreeLookContext::default()
        };
        let goals = free_look_goals(&tweak, &wall, 0.0, &mut timer, 0.1);
        assert!(near(goals.distance, tweak.wall_distance));
        assert!(near(goals.pitch, tweak.bounce_pitch));
        assert_eq!(goals.view, Some(-Vector::z()));
    }

    #[test]
    fn wall_jump_view_runs_along_wall_toward_camera_facing() {
        let view = wall_jump_view(&Vector::x(), &Vector::z()).expect("view");
        assert!((view - Vector::z()).norm() < 1.0e-6);
        let flipped = wall_jump_view(&Vector::x(), &-Vector::z()).expect("view");
        assert!((flipped + Vector::z()).norm() < 1.0e-6);
        assert_eq!(wall_jump_view(&Vector::y(), &Vector::z()), None);

        let tweak = FreeLookTweak::default();
        let mut timer = 0.0;
        let ctx = FreeLookContext {
            wall_normal: Some(Vector::new(0.0, 0.0, 1.0)),
            camera_at: Vector::x(),
            ..FreeLookContext::default()
        };
        let goals = free_look_goals(&tweak, &ctx, 0.0, &mut timer, 0.1);
        assert!(near(goals.distance, tweak.wall_distance));
        assert!(near(goals.height, tweak.wall_height));
        let view = goals.view.expect("wall view");
        assert!(view.dot(&Vector::x()) > 0.99);
    }

    #[test]
    fn min_target_height_floors_height_goal() {
        let tweak = FreeLookTweak::default();
        let mut timer = 0.0;
        let ctx = FreeLookContext {
            min_target_height: Some(1.0),
            ..FreeLookContext::default()
        };
        let below = free_look_goals(&tweak, &ctx, 1.0, &mut timer, 0.1);
        assert!(near(below.height, 1.0));
        let rest = free_look_goals(&tweak, &ctx, 0.0, &mut timer, 0.1);
        assert!(near(rest.height, tweak.rest.height));
        assert_eq!(rest.view, None);
    }
}
