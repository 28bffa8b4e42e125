//! Geometry types and the conversions between operator input and robot frames.
//!
//! Operator input arrives as normalized screen coordinates and degrees; the platform wants
//! radians, 3-D offsets and frame transforms. Everything here is pure.
use core::f32::consts::PI;
use micromath::F32Ext;

use crate::config::MotionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub translation: Vector3,
    pub rotation: Quaternion,
}

/// Named frames the platform can compute transforms between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Robot,
    Gaze,
}

/// A normalized 2-D direction, each axis kept in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TargetPoint {
    pub x: f32,
    pub y: f32,
}

impl TargetPoint {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn clamped(x: f32, y: f32) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }

    /// Gaze target offset relative to the gaze frame: far ahead, shifted sideways and up.
    pub fn look_at_offset(&self, config: &MotionConfig) -> Vector3 {
        let (depth, lateral, vertical) = config.look_at_span;
        Vector3::new(depth, -self.x * lateral, self.y * vertical)
    }
}

pub fn clamp_unit(value: f32) -> f32 {
    value.clamp(-1.0, 1.0)
}

/// Clamp to one full turn in either direction and convert to radians.
pub fn degrees_to_radians(degrees: f32, max_degrees: f32) -> f32 {
    degrees.clamp(-max_degrees, max_degrees) / 180.0 * PI
}

/// Rotation around the vertical axis.
pub fn yaw_from_quaternion(q: &Quaternion) -> f32 {
    let sin_yaw = 2.0 * (q.w * q.z + q.x * q.y);
    let cos_yaw = 1.0 - 2.0 * (q.y * q.y + q.z * q.z);
    sin_yaw.atan2(cos_yaw)
}

/// Index of the nearest of `segments` equal slices of a full turn.
pub fn angle_segment(theta: f32, segments: i32) -> i32 {
    let segment_angle = 2.0 * PI / segments as f32;
    (theta / segment_angle).round() as i32
}

pub fn segment_angle(segment: i32, segments: i32) -> f32 {
    segment as f32 * (2.0 * PI / segments as f32)
}
