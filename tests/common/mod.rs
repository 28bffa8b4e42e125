//! Recording fake of the robot platform.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::future::{pending, Future};

// the host executor provides the pender the embassy crates link against
use embassy_executor as _;
use embassy_futures::block_on;
use embassy_futures::select::select;
use embassy_time::{Duration, Timer};
use telepresence_motion::config::MotionConfig;
use telepresence_motion::kinematics::conversion::{Frame, Quaternion, Transform, Vector3};
use telepresence_motion::kinematics::trajectory::Trajectory;
use telepresence_motion::robot::platform::{
    ActionResult, ActionSpec, ActuatorError, AnimationHandle, Platform, TrajectoryHandle,
};
use telepresence_motion::robot::pose::Pose;
use telepresence_motion::MotionController;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Started(ActionSpec),
    Completed(ActionSpec),
    Cancelled(ActionSpec),
    Failed(ActionSpec),
}

pub struct FakePlatform {
    events: RefCell<Vec<Event>>,
    trajectories: RefCell<Vec<Trajectory>>,
    animations: RefCell<Vec<Pose>>,
    yaw: Cell<f32>,
    trajectory_time: Duration,
    animation_time: Duration,
    failing_trajectories: bool,
}

/// Records the cancellation of an action future dropped before it finished.
struct Running<'a> {
    platform: &'a FakePlatform,
    action: ActionSpec,
    finished: bool,
}

impl Drop for Running<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.platform.record(Event::Cancelled(self.action));
        }
    }
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            events: RefCell::new(Vec::new()),
            trajectories: RefCell::new(Vec::new()),
            animations: RefCell::new(Vec::new()),
            yaw: Cell::new(0.0),
            trajectory_time: Duration::from_millis(50),
            animation_time: Duration::from_millis(30),
            failing_trajectories: false,
        }
    }

    pub fn with_trajectory_time(mut self, time: Duration) -> Self {
        self.trajectory_time = time;
        self
    }

    /// Every trajectory run fails once its time is up.
    pub fn with_failing_trajectories(mut self) -> Self {
        self.failing_trajectories = true;
        self
    }

    /// Yaw of the robot frame seen from the gaze frame.
    pub fn with_yaw(self, yaw: f32) -> Self {
        self.yaw.set(yaw);
        self
    }

    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn position(&self, event: Event) -> Option<usize> {
        self.events.borrow().iter().position(|e| *e == event)
    }

    pub fn trajectory(&self, handle: TrajectoryHandle) -> Trajectory {
        self.trajectories.borrow()[handle.0 as usize]
    }

    pub fn built_trajectories(&self) -> Vec<Trajectory> {
        self.trajectories.borrow().clone()
    }

    /// Trajectories in the order they were started.
    pub fn started_runs(&self) -> Vec<(TrajectoryHandle, Trajectory)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Started(ActionSpec::RunTrajectory(handle)) => {
                    Some((*handle, self.trajectory(*handle)))
                }
                _ => None,
            })
            .collect()
    }

    /// Poses whose animation was started, in order.
    pub fn animated_poses(&self) -> Vec<Pose> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Started(ActionSpec::Animate { pose, .. }) => Some(*pose),
                _ => None,
            })
            .collect()
    }

    /// Actions started and neither completed nor cancelled yet.
    pub fn dangling(&self) -> Vec<ActionSpec> {
        let mut open = Vec::new();
        for event in self.events.borrow().iter() {
            match event {
                Event::Started(action) => open.push(*action),
                Event::Completed(action) | Event::Cancelled(action) | Event::Failed(action) => {
                    if let Some(i) = open.iter().position(|a| a == action) {
                        open.remove(i);
                    }
                }
            }
        }
        open
    }
}

impl Platform for FakePlatform {
    async fn run_action(&self, action: ActionSpec) -> ActionResult {
        self.record(Event::Started(action));
        let mut running = Running {
            platform: self,
            action,
            finished: false,
        };

        match action {
            ActionSpec::LookDown | ActionSpec::TrackGaze => pending::<()>().await,
            ActionSpec::RunTrajectory(_) => Timer::after(self.trajectory_time).await,
            ActionSpec::Animate { .. } => Timer::after(self.animation_time).await,
            _ => {}
        }

        running.finished = true;
        if self.failing_trajectories && matches!(action, ActionSpec::RunTrajectory(_)) {
            self.record(Event::Failed(action));
            return Err(ActuatorError::Failed("wheels stalled".into()));
        }
        self.record(Event::Completed(action));
        Ok(())
    }

    async fn build_trajectory(
        &self,
        trajectory: Trajectory,
    ) -> Result<TrajectoryHandle, ActuatorError> {
        let mut built = self.trajectories.borrow_mut();
        built.push(trajectory);
        Ok(TrajectoryHandle(built.len() as u32 - 1))
    }

    async fn build_animation(&self, pose: Pose) -> Result<AnimationHandle, ActuatorError> {
        let mut built = self.animations.borrow_mut();
        built.push(pose);
        Ok(AnimationHandle(built.len() as u32 - 1))
    }

    async fn compute_transform(&self, from: Frame, to: Frame) -> Result<Transform, ActuatorError> {
        assert_eq!((from, to), (Frame::Gaze, Frame::Robot));
        let half = self.yaw.get() / 2.0;
        Ok(Transform {
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion {
                x: 0.0,
                y: 0.0,
                z: half.sin(),
                w: half.cos(),
            },
        })
    }

    fn charging_flap_open(&self) -> bool {
        false
    }
}

pub fn controller(platform: FakePlatform, config: MotionConfig) -> MotionController<FakePlatform> {
    MotionController::new(platform, config)
}

/// Run the controller lanes until `script` finishes.
pub fn drive<P: Platform>(controller: &MotionController<P>, script: impl Future<Output = ()>) {
    block_on(select(controller.run(), script));
}

pub async fn settle(ms: u64) {
    Timer::after_millis(ms).await;
}
