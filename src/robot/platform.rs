//! The capabilities the motion core needs from the robot platform.
//!
//! The platform owns the physical actions; the core only decides which ones run and when.
//! Every action future returned by [`Platform::run_action`] must stop the underlying action
//! when dropped: dropping is how the core cancels superseded motions.
use alloc::string::String;
use core::fmt::{self, Display, Formatter};

use crate::kinematics::conversion::{Frame, Transform, Vector3};
use crate::kinematics::trajectory::Trajectory;
use crate::robot::pose::Pose;

/// Opaque platform handle of a built trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrajectoryHandle(pub u32);

/// Opaque platform handle of a built pose animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationHandle(pub u32);

/// Autonomous platform behaviours the core suspends while driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ability {
    BasicAwareness,
    BackgroundMovement,
}

impl Display for Ability {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Ability::BasicAwareness => f.write_str("basic awareness"),
            Ability::BackgroundMovement => f.write_str("background movement"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionSpec {
    HoldAbility(Ability),
    ReleaseAbility(Ability),
    /// Head-only look at the locomotion target frame in front of the robot.
    LookDown,
    /// Track the mutable look-at target frame.
    TrackGaze,
    /// Move the look-at target frame to this offset from the gaze frame.
    UpdateLookAtTarget(Vector3),
    RunTrajectory(TrajectoryHandle),
    Animate { pose: Pose, animation: AnimationHandle },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActuatorError {
    /// The platform pre-empted the action itself.
    Cancelled,
    Failed(String),
    Unavailable,
}

impl Display for ActuatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ActuatorError::Cancelled => f.write_str("action cancelled"),
            ActuatorError::Failed(message) => write!(f, "action failed: {message}"),
            ActuatorError::Unavailable => f.write_str("actuator unavailable"),
        }
    }
}

impl core::error::Error for ActuatorError {}

pub type ActionResult = Result<(), ActuatorError>;

/// Asynchronous action runner of the robot.
///
/// The controller drives every lane from a single task, so implementations do not need to
/// return `Send` futures.
#[allow(async_fn_in_trait)]
pub trait Platform {
    /// Run `action` to completion. Dropping the future cancels the action.
    async fn run_action(&self, action: ActionSpec) -> ActionResult;

    async fn build_trajectory(
        &self,
        trajectory: Trajectory,
    ) -> Result<TrajectoryHandle, ActuatorError>;

    async fn build_animation(&self, pose: Pose) -> Result<AnimationHandle, ActuatorError>;

    /// Transform of `to` expressed in `from`.
    async fn compute_transform(&self, from: Frame, to: Frame) -> Result<Transform, ActuatorError>;

    /// Diagnostic only, reported next to locomotion failures.
    fn charging_flap_open(&self) -> bool;
}
