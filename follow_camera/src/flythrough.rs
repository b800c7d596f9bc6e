//! Scripted flythrough playback from recorded camera keys.
//!
//! A recording is a flat run of 64-byte big-endian keys:
//!
//! | offset | field |
//! |---|---|
//! | 0 | frame number (`u32`) |
//! | 4 | rotation rows `right`, `up`, `at` (9 x `f32`, `right` and `at` stored negated) |
//! | 40 | position (3 x `f32`) |
//! | 52 | unused (12 bytes) |

use std::fmt;

use camera_math::frame::{angle_between, isometry, rotation_from_rows, slerp};
use rapier3d::math::{Isometry, Vector};
use rapier3d::na::UnitQuaternion;
use rapier3d::prelude::Real;
use sim_core::logging;

pub const KEY_SIZE: usize = 64;
pub const KEYS_PER_SECOND: Real = 30.0;
const KEY_PERIOD: Real = 1.0 / KEYS_PER_SECOND;
const SPIKE_TRANSLATION: Real = 10.0;
const SPIKE_ROTATION_DEG: Real = 45.0;
const SPIKE_RATIO: Real = 5.0;

#[derive(Debug, PartialEq)]
pub enum FlythroughError {
    /// Byte length is not a whole number of keys.
    Truncated { len: usize },
    /// Playback needs at least two keys.
    TooShort { keys: usize },
    NonFinite { key: usize },
}

impl fmt::Display for FlythroughError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlythroughError::Truncated { len } => {
                write!(f, "flythrough length {} is not a multiple of {}", len, KEY_SIZE)
            }
            FlythroughError::TooShort { keys } => {
                write!(f, "flythrough has {} keys, need at least 2", keys)
            }
            FlythroughError::NonFinite { key } => {
                write!(f, "flythrough key {} has non-finite values", key)
            }
        }
    }
}

impl std::error::Error for FlythroughError {}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlyKey {
    pub frame: u32,
    pub rotation: UnitQuaternion<Real>,
    pub position: Vector<Real>,
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_be_bytes(word)
}

fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    f32::from_bits(read_u32(bytes, offset))
}

fn read_vec(bytes: &[u8], offset: usize) -> Vector<Real> {
    Vector::new(
        read_f32(bytes, offset),
        read_f32(bytes, offset + 4),
        read_f32(bytes, offset + 8),
    )
}

impl FlyKey {
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < KEY_SIZE {
            return None;
        }
        let right = -read_vec(bytes, 4);
        let up = read_vec(bytes, 16);
        let at = -read_vec(bytes, 28);
        let position = read_vec(bytes, 40);
        let finite = |v: &Vector<Real>| v.iter().all(|c| c.is_finite());
        if !(finite(&right) && finite(&up) && finite(&at) && finite(&position)) {
            return None;
        }
        Some(Self {
            frame: read_u32(bytes, 0),
            rotation: rotation_from_rows(right, up, at),
            position,
        })
    }

    pub fn encode(&self) -> [u8; KEY_SIZE] {
        let mut out = [0u8; KEY_SIZE];
        out[0..4].copy_from_slice(&self.frame.to_be_bytes());
        let right = -(self.rotation * Vector::x());
        let up = self.rotation * Vector::y();
        let at = -(self.rotation * Vector::z());
        for (slot, value) in [right, up, at, self.position].iter().enumerate() {
            for axis in 0..3 {
                let offset = 4 + slot * 12 + axis * 4;
                out[offset..offset + 4].copy_from_slice(&value[axis].to_be_bytes());
            }
        }
        out
    }
}

pub fn decode_keys(bytes: &[u8]) -> Result<Vec<FlyKey>, FlythroughError> {
    if bytes.len() % KEY_SIZE != 0 {
        return Err(FlythroughError::Truncated { len: bytes.len() });
    }
    let keys = bytes
        .chunks_exact(KEY_SIZE)
        .enumerate()
        .map(|(key, chunk)| FlyKey::decode(chunk).ok_or(FlythroughError::NonFinite { key }))
        .collect::<Result<Vec<_>, _>>()?;
    if keys.len() < 2 {
        return Err(FlythroughError::TooShort { keys: keys.len() });
    }
    Ok(keys)
}

pub struct FlythroughPlayer {
    keys: Vec<FlyKey>,
    time: Real,
    rate: Real,
    skip_after: Real,
    finished: bool,
}

impl FlythroughPlayer {
    pub fn new(keys: Vec<FlyKey>) -> Result<Self, FlythroughError> {
        if keys.len() < 2 {
            return Err(FlythroughError::TooShort { keys: keys.len() });
        }
        logging::debug("flythrough", &format!("loaded {} keys", keys.len()));
        Ok(Self {
            keys,
            time: KEY_PERIOD,
            rate: 1.0,
            skip_after: 1.0,
            finished: false,
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FlythroughError> {
        Self::new(decode_keys(bytes)?)
    }

    /// Skips are ignored until playback has run this many seconds.
    pub fn with_skip_threshold(mut self, seconds: Real) -> Self {
        self.skip_after = seconds;
        self
    }

    pub fn with_rate(mut self, rate: Real) -> Self {
        self.rate = rate;
        self
    }

    pub fn time(&self) -> Real {
        self.time
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Jumps to the end once past the skip threshold. Returns whether the skip applied.
    pub fn skip(&mut self) -> bool {
        if self.time > self.skip_after {
            self.time = KEY_PERIOD * self.keys.len() as Real;
            logging::info("flythrough", "skipped");
            true
        } else {
            false
        }
    }

    fn translation_speed(&self, index: usize) -> Real {
        match (self.keys.get(index), self.keys.get(index + 1)) {
            (Some(a), Some(b)) => (b.position - a.position).norm(),
            _ => 0.0,
        }
    }

    fn rotation_speed(&self, index: usize) -> Real {
        match (self.keys.get(index), self.keys.get(index + 1)) {
            (Some(a), Some(b)) => {
                angle_between(&(a.rotation * Vector::z()), &(b.rotation * Vector::z())).to_degrees()
            }
            _ => 0.0,
        }
    }

    /// Key `index` starts a cut when its step dwarfs both neighbouring steps.
    fn is_cut(&self, index: usize) -> bool {
        let spike = |speed: &dyn Fn(usize) -> Real, threshold: Real| {
            let here = speed(index);
            here > threshold
                && here > SPIKE_RATIO * speed(index - 1)
                && here > SPIKE_RATIO * speed(index + 1)
        };
        spike(&|i| self.translation_speed(i), SPIKE_TRANSLATION)
            || spike(&|i| self.rotation_speed(i), SPIKE_ROTATION_DEG)
    }

    /// Camera pose for the current time, then advances by `dt`. `None` once the last key
    /// has been reached.
    pub fn update(&mut self, dt: Real) -> Option<Isometry<Real>> {
        let frame = KEYS_PER_SECOND * self.time;
        let index = frame.floor().max(0.0) as usize;
        if index + 1 >= self.keys.len() {
            if !self.finished {
                self.finished = true;
                logging::debug("flythrough", "finished");
            }
            return None;
        }
        let mut blend = frame - frame.floor();
        if index > 0 && self.is_cut(index) {
            blend = 0.0;
        }

        let from = &self.keys[index];
        let to = &self.keys[index + 1];
        let rotation = slerp(&from.rotation, &to.rotation, blend);
        let position = from.position.lerp(&to.position, blend);

        self.time += dt * self.rate;
        Some(isometry(position, rotation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera_math::frame::{euler_quat, Euler};

    fn key(frame: u32, position: Vector<Real>, yaw: Real) -> FlyKey {
        FlyKey {
            frame,
            rotation: euler_quat(Euler::new(yaw, 0.0, 0.0)),
            position,
        }
    }

    fn bytes(keys: &[FlyKey]) -> Vec<u8> {
        keys.iter().flat_map(|key| key.encode()).collect()
    }

    #[test]
    fn key_layout_is_big_endian_with_negated_axes() {
        let encoded = key(7, Vector::new(1.0, 2.0, 3.0), 0.0).encode();
        assert_eq!(&encoded[0..4], &[0, 0, 0, 7]);
        // right row is stored negated: identity right (1, 0, 0) becomes -1.0.
        assert_eq!(&encoded[4..8], &(-1.0f32).to_be_bytes());
        assert_eq!(&encoded[40..44], &1.0f32.to_be_bytes());
        let decoded = FlyKey::decode(&encoded).expect("decode");
        assert_eq!(decoded.frame, 7);
        assert!(decoded.rotation.angle_to(&UnitQuaternion::identity()) < 1.0e-5);
    }

    #[test]
    fn decode_rejects_bad_lengths_and_values() {
        assert_eq!(
            decode_keys(&[0u8; 65]).unwrap_err(),
            FlythroughError::Truncated { len: 65 }
        );
        assert_eq!(
            decode_keys(&[0u8; 64]).unwrap_err(),
            FlythroughError::TooShort { keys: 1 }
        );
        let mut data = bytes(&[key(0, Vector::zeros(), 0.0), key(1, Vector::zeros(), 0.0)]);
        data[64 + 40..64 + 44].copy_from_slice(&f32::NAN.to_be_bytes());
        assert_eq!(
            decode_keys(&data).unwrap_err(),
            FlythroughError::NonFinite { key: 1 }
        );
    }

    #[test]
    fn playback_interpolates_and_finishes() {
        let keys: Vec<_> = (0..4)
            .map(|i| key(i, Vector::new(i as Real, 0.0, 0.0), 0.0))
            .collect();
        let mut player = FlythroughPlayer::from_bytes(&bytes(&keys)).expect("player");
        let first = player.update(0.5 / KEYS_PER_SECOND).expect("pose");
        assert!((first.translation.vector.x - 1.0).abs() < 1.0e-4);
        let second = player.update(0.0).expect("pose");
        assert!((second.translation.vector.x - 1.5).abs() < 1.0e-3);

        let mut frames = 0;
        while player.update(1.0 / 60.0).is_some() {
            frames += 1;
            assert!(frames < 100);
        }
        assert!(player.is_finished());
        assert!(player.update(0.1).is_none());
    }

    #[test]
    fn cut_holds_key_instead_of_sweeping() {
        let keys = vec![
            key(0, Vector::new(0.0, 0.0, 0.0), 0.0),
            key(1, Vector::new(0.5, 0.0, 0.0), 0.0),
            key(2, Vector::new(100.0, 0.0, 0.0), 0.0),
            key(3, Vector::new(100.5, 0.0, 0.0), 0.0),
            key(4, Vector::new(101.0, 0.0, 0.0), 0.0),
        ];
        let mut player = FlythroughPlayer::new(keys).expect("player");
        player.update(0.5 / KEYS_PER_SECOND);
        let held = player.update(0.0).expect("pose");
        assert!((held.translation.vector.x - 0.5).abs() < 1.0e-4);
    }

    #[test]
    fn skip_respects_threshold() {
        let keys: Vec<_> = (0..120).map(|i| key(i, Vector::zeros(), 0.0)).collect();
        let mut player = FlythroughPlayer::new(keys)
            .expect("player")
            .with_skip_threshold(0.5);
        assert!(!player.skip());
        player.update(1.0);
        assert!(player.skip());
        assert!(player.update(0.0).is_none());
    }
}
