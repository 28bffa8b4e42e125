//! Locomotion primitives and their cache.
//!
//! Building a trajectory on the platform is slow, and operators tend to repeat the same few
//! strafe vectors and turn angles. Turns are snapped to [`TURN_SEGMENTS`] slices of a full
//! revolution so the cache stays bounded; strafe vectors are used as-is.
//!
//! [`TURN_SEGMENTS`]: crate::config::TURN_SEGMENTS
use alloc::collections::BTreeMap;
use core::f32::consts::PI;
use core::fmt::Write;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use heapless::FnvIndexMap;
use log::{debug, warn};
use micromath::F32Ext;

use crate::config::MotionConfig;
use crate::kinematics::conversion::{angle_segment, segment_angle, TargetPoint};
use crate::robot::platform::{ActuatorError, Platform, TrajectoryHandle};

/// 145 turn buckets exist for angles within one revolution either way.
pub const TURN_CACHE_SIZE: usize = 256;

/// Animation text of one holonomic primitive.
pub type AnimationText = heapless::String<96>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trajectory {
    /// Rotation in place by `theta` radians over `duration` seconds.
    Turn { theta: f32, duration: f32 },
    /// Straight holonomic line of (`dx`, `dy`) played between `start` and `end` seconds.
    Strafe {
        dx: f32,
        dy: f32,
        start: f32,
        end: f32,
    },
    /// GoTo towards a frame attached `distance` metres ahead of the robot, straight lines only.
    Forward { distance: f32 },
}

impl Trajectory {
    pub fn turn(theta: f32, config: &MotionConfig) -> Self {
        let duration = theta.abs() / PI * config.half_turn_duration_s;
        Trajectory::Turn { theta, duration }
    }

    pub fn strafe(target: TargetPoint, config: &MotionConfig) -> Self {
        let (start, end) = config.strafe_time_range_s;
        Trajectory::Strafe {
            dx: config.strafe_distance_scale * target.y,
            dy: -config.strafe_distance_scale * target.x,
            start,
            end,
        }
    }

    pub fn forward(config: &MotionConfig) -> Self {
        Trajectory::Forward {
            distance: config.goto_distance_m,
        }
    }

    /// Holonomic animation text understood by the platform animator. GoTo has none.
    pub fn animation_text(&self) -> Option<AnimationText> {
        let mut text = AnimationText::new();
        let written = match *self {
            Trajectory::Turn { theta, duration } => write!(
                text,
                "[\"Holonomic\", [\"Line\", [0, 0]], {theta}, {duration}]"
            ),
            Trajectory::Strafe { dx, dy, start, end } => write!(
                text,
                "[\"Holonomic\", [\"Line\", [{dx}, {dy}]], {start:.1}, {end:.1}]"
            ),
            Trajectory::Forward { .. } => return None,
        };
        written.ok().map(|_| text)
    }
}

#[derive(Default)]
struct TrajectoryStore {
    turns: FnvIndexMap<i32, TrajectoryHandle, TURN_CACHE_SIZE>,
    strafes: BTreeMap<(u32, u32), TrajectoryHandle>,
    forward: Option<TrajectoryHandle>,
}

/// Append-only cache of built trajectories.
pub struct TrajectoryCache {
    config: MotionConfig,
    store: Mutex<CriticalSectionRawMutex, TrajectoryStore>,
}

impl TrajectoryCache {
    pub fn new(config: &MotionConfig) -> Self {
        Self {
            config: config.clone(),
            store: Mutex::new(TrajectoryStore::default()),
        }
    }

    /// Handle for a turn of roughly `theta` radians, snapped to the nearest segment.
    pub async fn turn<P: Platform>(
        &self,
        platform: &P,
        theta: f32,
    ) -> Result<TrajectoryHandle, ActuatorError> {
        let segment = angle_segment(theta, self.config.turn_segments);
        let mut store = self.store.lock().await;
        if let Some(handle) = store.turns.get(&segment) {
            return Ok(*handle);
        }

        let rounded = segment_angle(segment, self.config.turn_segments);
        let handle = platform
            .build_trajectory(Trajectory::turn(rounded, &self.config))
            .await?;
        debug!("[TRAJECTORY] built turn segment {segment} ({rounded} rad)");
        if store.turns.insert(segment, handle).is_err() {
            warn!("[TRAJECTORY] turn cache full, segment {segment} left uncached");
        }
        Ok(handle)
    }

    pub async fn strafe<P: Platform>(
        &self,
        platform: &P,
        target: TargetPoint,
    ) -> Result<TrajectoryHandle, ActuatorError> {
        let key = (target.x.to_bits(), target.y.to_bits());
        let mut store = self.store.lock().await;
        if let Some(handle) = store.strafes.get(&key) {
            return Ok(*handle);
        }

        let handle = platform
            .build_trajectory(Trajectory::strafe(target, &self.config))
            .await?;
        debug!("[TRAJECTORY] built strafe ({}, {})", target.x, target.y);
        store.strafes.insert(key, handle);
        Ok(handle)
    }

    pub async fn forward<P: Platform>(
        &self,
        platform: &P,
    ) -> Result<TrajectoryHandle, ActuatorError> {
        let mut store = self.store.lock().await;
        if let Some(handle) = store.forward {
            return Ok(handle);
        }

        let handle = platform
            .build_trajectory(Trajectory::forward(&self.config))
            .await?;
        store.forward = Some(handle);
        Ok(handle)
    }
}
