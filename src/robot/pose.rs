//! Tilt poses and the ladder used to step between them.
//!
//! Poses are totally ordered from looking fully down to looking too far up. The ladder steps
//! one rank at a time and saturates at both ends; the top rank is only reachable when the
//! configuration allows unnatural poses.
use core::cell::RefCell;
use core::fmt::Display;
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use log::debug;

use crate::robot::platform::{ActuatorError, AnimationHandle, Platform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pose {
    DownMax = 0,
    DownHalf = 1,
    Middle = 2,
    UpHalf = 3,
    UpEnd = 4,
    UpTooMuch = 5,
}

impl Pose {
    pub const COUNT: usize = 6;

    pub const ALL: [Pose; Pose::COUNT] = [
        Pose::DownMax,
        Pose::DownHalf,
        Pose::Middle,
        Pose::UpHalf,
        Pose::UpEnd,
        Pose::UpTooMuch,
    ];
}

impl Display for Pose {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Pose::DownMax => f.write_str("down max"),
            Pose::DownHalf => f.write_str("down half"),
            Pose::Middle => f.write_str("middle"),
            Pose::UpHalf => f.write_str("up half"),
            Pose::UpEnd => f.write_str("up end"),
            Pose::UpTooMuch => f.write_str("up too much"),
        }
    }
}

impl From<usize> for Pose {
    fn from(value: usize) -> Self {
        match value {
            0 => Pose::DownMax,
            1 => Pose::DownHalf,
            2 => Pose::Middle,
            3 => Pose::UpHalf,
            4 => Pose::UpEnd,
            _ => Pose::UpTooMuch,
        }
    }
}

/// Which way a ladder step goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseStep {
    Up,
    Down,
}

pub struct PoseLadder {
    allow_unnatural_poses: bool,
    // resolved once per pose, the platform animation is expensive to build
    animations: Mutex<CriticalSectionRawMutex, RefCell<[Option<AnimationHandle>; Pose::COUNT]>>,
}

impl PoseLadder {
    pub fn new(allow_unnatural_poses: bool) -> Self {
        Self {
            allow_unnatural_poses,
            animations: Mutex::new(RefCell::new([None; Pose::COUNT])),
        }
    }

    pub fn next_up(&self, pose: Pose) -> Pose {
        match pose {
            Pose::UpEnd if self.allow_unnatural_poses => Pose::UpTooMuch,
            Pose::UpEnd | Pose::UpTooMuch => pose,
            _ => Pose::from(pose as usize + 1),
        }
    }

    pub fn next_down(&self, pose: Pose) -> Pose {
        match pose {
            Pose::DownMax => pose,
            _ => Pose::from(pose as usize - 1),
        }
    }

    pub fn step(&self, pose: Pose, step: PoseStep) -> Pose {
        match step {
            PoseStep::Up => self.next_up(pose),
            PoseStep::Down => self.next_down(pose),
        }
    }

    pub fn is_awkward(&self, pose: Pose) -> bool {
        matches!(pose, Pose::UpHalf | Pose::UpEnd | Pose::UpTooMuch)
    }

    /// Animation taking the robot to `pose`, built on first use.
    pub async fn action_for<P: Platform>(
        &self,
        platform: &P,
        pose: Pose,
    ) -> Result<AnimationHandle, ActuatorError> {
        let cached = self.animations.lock(|a| a.borrow()[pose as usize]);
        if let Some(animation) = cached {
            return Ok(animation);
        }

        let animation = platform.build_animation(pose).await?;
        debug!("[POSE_LADDER] built animation for {pose}");
        self.animations
            .lock(|a| a.borrow_mut()[pose as usize] = Some(animation));
        Ok(animation)
    }
}
