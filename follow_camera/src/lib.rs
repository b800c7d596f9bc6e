//! Third-person follow camera.
//!
//! The camera keeps a subject framed by steering six smoothed channels: distance, height
//! and azimuth around the subject, plus yaw, pitch and roll. Channels either seek a goal
//! along a trapezoidal velocity profile or are corrected toward a held goal or range.
//! Each frame is split into fixed sub-steps, and the final position is swept against the
//! scene so geometry never sits between the camera and the subject.
#![forbid(unsafe_code)]

pub mod camera;
pub mod channel;
pub mod context;
pub mod correction;
pub mod flythrough;
pub mod free_look;
pub mod orient;
pub mod request;
pub mod state;
pub mod target;
pub mod tuning;

pub use camera::{AngularMode, CameraPhase, CameraScene, ChannelId, FollowCamera, PositionalMode, Viewport};
pub use channel::{GoalChannel, SeekEnvelope, SeekPhase};
pub use context::{CameraOwner, CameraSystemContext};
pub use correction::CorrectionTuning;
pub use flythrough::{FlyKey, FlythroughError, FlythroughPlayer};
pub use free_look::{free_look_goals, wall_jump_view, BounceMode, FreeLookContext, FreeLookGoals};
pub use request::{LookFlags, LookRequest, MotionRequest, MoveFlags, OrientationMode, SeekTiming};
pub use state::CameraState;
pub use target::{TargetHandle, TargetSource, TargetTable};
pub use tuning::{CameraTuning, FreeLookTweak, TuningError};
