//! Mutable controller state, shared by the lanes through a critical-section mutex.
use alloc::collections::VecDeque;

use crate::kinematics::conversion::TargetPoint;
use crate::robot::commands::PoseRequest;
use crate::robot::gaze::GazeMode;
use crate::robot::pose::Pose;

#[derive(Debug)]
pub struct ControllerState {
    /// Pose the last finished animation took the robot to.
    pub pose: Pose,
    /// Pose at the end of the queued chain, the one new steps start from.
    pub requested_pose: Pose,
    pub awkward: bool,
    pub gaze: GazeMode,
    pub requested_gaze: GazeMode,
    pub gaze_seq: u64,
    pub gaze_settled_seq: u64,
    /// Last strafe vector sent to the locomotion lane.
    pub strafe_target: TargetPoint,
    /// Pose changes not yet taken by the pose lane, oldest first. Unbounded so none is lost.
    pub pose_queue: VecDeque<PoseRequest>,
}

impl ControllerState {
    pub const fn new() -> Self {
        Self {
            pose: Pose::Middle,
            requested_pose: Pose::Middle,
            awkward: false,
            gaze: GazeMode::Unconstrained,
            requested_gaze: GazeMode::Unconstrained,
            gaze_seq: 0,
            gaze_settled_seq: 0,
            strafe_target: TargetPoint::ZERO,
            pose_queue: VecDeque::new(),
        }
    }

    pub fn snapshot(&self) -> MotionSnapshot {
        MotionSnapshot {
            pose: self.pose,
            requested_pose: self.requested_pose,
            awkward: self.awkward,
            gaze: self.gaze,
            strafe_target: self.strafe_target,
        }
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only copy of the controller state for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSnapshot {
    pub pose: Pose,
    pub requested_pose: Pose,
    pub awkward: bool,
    pub gaze: GazeMode,
    pub strafe_target: TargetPoint,
}
