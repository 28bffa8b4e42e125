//! Tuning constants and runtime configuration for the motion core.
//!
//! The constants are empirically tuned for one robot body. [`MotionConfig`] copies them so a
//! different platform can be recalibrated without touching the control logic.
use core::f32::consts::PI;
use embassy_time::Duration;

// POSES
pub const ALLOW_UNNATURAL_POSES: bool = false;
/// How long an awkward pose may be held before reverting to the middle pose.
pub const AWKWARD_POSE_TIMEOUT: Duration = Duration::from_secs(60);

// LOCOMOTION
/// Drive commands must keep arriving faster than this or locomotion is halted.
pub const MOVE_IDLE_TIMEOUT: Duration = Duration::from_millis(600);
pub const MAX_TURN_DEG: f32 = 360.0;
pub const TURN_SEGMENTS: i32 = 72;
/// Seconds needed for a half turn, smaller turns scale linearly.
pub const HALF_TURN_DURATION_S: f32 = 5.0;
pub const STRAFE_DISTANCE_SCALE: f32 = 10.0;
pub const STRAFE_TIME_START_S: f32 = 0.0;
pub const STRAFE_TIME_END_S: f32 = 80.0;
pub const GOTO_DISTANCE_M: f32 = 1.0;
/// Body/gaze misalignment tolerated before a GoTo, in radians.
pub const YAW_TOLERANCE_RAD: f32 = 0.05;

// GAZE
pub const CAM_HALF_WIDTH_RAD: f32 = (PI / 4.0) * 0.66;
pub const LOOK_AT_DEPTH: f32 = 10.0;
pub const LOOK_AT_LATERAL_SPAN: f32 = 5.0;
pub const LOOK_AT_VERTICAL_SPAN: f32 = 3.0;
pub const MOSTLY_VERTICAL_THRESHOLD: f32 = 0.3;
pub const DIAGONAL_THRESHOLD: f32 = 0.6;

/// Runtime copy of the tuning constants, owned by the controller.
#[derive(Debug, Clone)]
pub struct MotionConfig {
    pub allow_unnatural_poses: bool,
    pub awkward_pose_timeout: Duration,
    pub move_idle_timeout: Duration,
    pub max_turn_deg: f32,
    pub turn_segments: i32,
    pub half_turn_duration_s: f32,
    pub strafe_distance_scale: f32,
    pub strafe_time_range_s: (f32, f32),
    pub goto_distance_m: f32,
    pub yaw_tolerance_rad: f32,
    pub cam_half_width_rad: f32,
    /// (depth, lateral, vertical) scale of the head look-at target.
    pub look_at_span: (f32, f32, f32),
    pub mostly_vertical_threshold: f32,
    pub diagonal_threshold: f32,
}

impl MotionConfig {
    pub fn new() -> Self {
        Self {
            allow_unnatural_poses: ALLOW_UNNATURAL_POSES,
            awkward_pose_timeout: AWKWARD_POSE_TIMEOUT,
            move_idle_timeout: MOVE_IDLE_TIMEOUT,
            max_turn_deg: MAX_TURN_DEG,
            turn_segments: TURN_SEGMENTS,
            half_turn_duration_s: HALF_TURN_DURATION_S,
            strafe_distance_scale: STRAFE_DISTANCE_SCALE,
            strafe_time_range_s: (STRAFE_TIME_START_S, STRAFE_TIME_END_S),
            goto_distance_m: GOTO_DISTANCE_M,
            yaw_tolerance_rad: YAW_TOLERANCE_RAD,
            cam_half_width_rad: CAM_HALF_WIDTH_RAD,
            look_at_span: (LOOK_AT_DEPTH, LOOK_AT_LATERAL_SPAN, LOOK_AT_VERTICAL_SPAN),
            mostly_vertical_threshold: MOSTLY_VERTICAL_THRESHOLD,
            diagonal_threshold: DIAGONAL_THRESHOLD,
        }
    }

    pub fn with_unnatural_poses(mut self, allow: bool) -> Self {
        self.allow_unnatural_poses = allow;
        self
    }

    pub fn with_awkward_pose_timeout(mut self, timeout: Duration) -> Self {
        self.awkward_pose_timeout = timeout;
        self
    }

    pub fn with_move_idle_timeout(mut self, timeout: Duration) -> Self {
        self.move_idle_timeout = timeout;
        self
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self::new()
    }
}
