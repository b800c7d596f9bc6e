//! Angle, frame and cylindrical-coordinate helpers for the follow camera.
#![forbid(unsafe_code)]

pub mod angle;
pub mod cylinder;
pub mod frame;

pub use angle::{angle_delta, step_toward, wrap_angle};
pub use cylinder::{CylinderCoords, CylinderFrame};
pub use frame::{Euler, HorizontalBasis};
