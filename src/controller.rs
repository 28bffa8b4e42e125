//! The motion controller: command intake and the lanes that execute it.
//!
//! [`MotionController::handle_command`] never waits on the robot. It validates a command,
//! updates the shared state, posts requests to the lanes and hands back a [`CommandOutcome`]
//! the caller may await; [`MotionController::run`] drives the lanes and must be polled for as
//! long as the controller lives.
use core::cell::RefCell;
use embassy_futures::join::join5;
use embassy_sync::{
    blocking_mutex::{raw::CriticalSectionRawMutex, Mutex},
    channel::{Channel, TrySendError},
    signal::Signal,
};
use log::{debug, info, warn};
use micromath::F32Ext;

use crate::config::MotionConfig;
use crate::kinematics::conversion::{degrees_to_radians, TargetPoint};
use crate::kinematics::trajectory::TrajectoryCache;
use crate::robot::commands::{
    Command, CommandError, LocomotionRequest, MotionCommand, PoseFollowUp, PoseRequest,
};
use crate::robot::gaze::{GazeMode, GazeRequest, GazeTicket, GazeWaiter};
use crate::robot::outcome::{CommandOutcome, Completion};
use crate::robot::platform::{Ability, ActionResult, ActionSpec, ActuatorError, Platform};
use crate::robot::pose::{Pose, PoseLadder, PoseStep};
use crate::robot::state::{ControllerState, MotionSnapshot};
use crate::tasks::{
    gaze_task::gaze_task, locomotion_task::locomotion_task, pose_task::pose_task,
    watchdog::Watchdog,
};
use crate::{GAZECMD_CHANNEL_SIZE, LOCOMOTIONCMD_CHANNEL_SIZE};

pub struct MotionController<P: Platform> {
    pub(crate) platform: P,
    pub(crate) config: MotionConfig,
    pub(crate) ladder: PoseLadder,
    pub(crate) trajectories: TrajectoryCache,
    state: Mutex<CriticalSectionRawMutex, RefCell<ControllerState>>,

    /// Wakes the pose lane after a change was pushed onto the pose queue.
    pub(crate) pose_queued: Signal<CriticalSectionRawMutex, ()>,
    pub(crate) gaze_requests: Channel<CriticalSectionRawMutex, GazeRequest, GAZECMD_CHANNEL_SIZE>,
    pub(crate) locomotion_requests:
        Channel<CriticalSectionRawMutex, LocomotionRequest, LOCOMOTIONCMD_CHANNEL_SIZE>,
    /// Latest look-at target, applied by the gaze lane.
    pub(crate) look_target: Signal<CriticalSectionRawMutex, TargetPoint>,
    turn_gaze_settled: Signal<CriticalSectionRawMutex, ()>,
    drive_gaze_settled: Signal<CriticalSectionRawMutex, ()>,

    move_watchdog: Watchdog,
    awkward_watchdog: Watchdog,
}

impl<P: Platform> MotionController<P> {
    pub fn new(platform: P, config: MotionConfig) -> Self {
        Self {
            platform,
            ladder: PoseLadder::new(config.allow_unnatural_poses),
            trajectories: TrajectoryCache::new(&config),
            state: Mutex::new(RefCell::new(ControllerState::new())),
            pose_queued: Signal::new(),
            gaze_requests: Channel::new(),
            locomotion_requests: Channel::new(),
            look_target: Signal::new(),
            turn_gaze_settled: Signal::new(),
            drive_gaze_settled: Signal::new(),
            move_watchdog: Watchdog::new("move idle", config.move_idle_timeout),
            awkward_watchdog: Watchdog::new("awkward pose", config.awkward_pose_timeout),
            config,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Drive every lane. Never returns.
    pub async fn run(&self) {
        info!("[CONTROLLER] lanes running");
        join5(
            pose_task(self),
            gaze_task(self),
            locomotion_task(self),
            self.move_watchdog.run(|| self.on_move_idle()),
            self.awkward_watchdog.run(|| self.on_awkward_timeout()),
        )
        .await;
    }

    pub fn snapshot(&self) -> MotionSnapshot {
        self.with_state(|s| s.snapshot())
    }

    /// Hold basic awareness and centre the look-at target. Calling it twice holds twice.
    pub async fn start(&self) {
        info!("[CONTROLLER] starting");
        let _ = self
            .run_logged(
                "hold basic awareness",
                ActionSpec::HoldAbility(Ability::BasicAwareness),
            )
            .await;
        self.look_target.signal(TargetPoint::ZERO);
    }

    /// Release basic awareness, cancel all locomotion and gaze control, and go back to the
    /// middle pose.
    pub async fn stop(&self) {
        info!("[CONTROLLER] stopping");
        let _ = self
            .run_logged(
                "release basic awareness",
                ActionSpec::ReleaseAbility(Ability::BasicAwareness),
            )
            .await;
        self.move_watchdog.disarm();
        self.with_state(|s| s.strafe_target = TargetPoint::ZERO);
        self.request_locomotion(LocomotionRequest::Stop);
        self.queue_gaze(GazeMode::Unconstrained, true, None);
        self.take_pose(Pose::Middle, None);
    }

    /// Validate and dispatch one operator command.
    ///
    /// The returned outcome resolves with the result of the main action the command started:
    /// the turn for `turn` and `tablet_look_at`, the drive for `move_forward` and `strafe`,
    /// the gaze transition for `head_look_at`. A superseded action resolves as cancelled.
    pub fn handle_command(
        &self,
        name: &str,
        args: &[f32],
    ) -> Result<CommandOutcome, CommandError> {
        let command = MotionCommand::try_from(Command::new(name, args)).inspect_err(|e| {
            debug!("[CONTROLLER] rejected command: {e}");
        })?;
        debug!("[CONTROLLER] received {command:?}");

        let outcome = match command {
            MotionCommand::HeadLookAt(target) => self.head_look_at(target),
            MotionCommand::TabletLookAt(target) => self.tablet_look_at(target),
            MotionCommand::Turn { degrees } => self.turn_degrees(degrees),
            MotionCommand::MoveForward => {
                let (outcome, done) = CommandOutcome::pending();
                self.move_forward(done);
                outcome
            }
            MotionCommand::Strafe(target) => self.strafe(target),
        };
        Ok(outcome)
    }

    /// Middle pose, then give up gaze control. Locomotion is left alone.
    pub fn return_to_default_pose(&self) {
        self.take_pose(Pose::Middle, Some(PoseFollowUp::ReleaseGaze));
    }

    fn head_look_at(&self, target: TargetPoint) -> CommandOutcome {
        let (outcome, done) = CommandOutcome::pending();
        self.look_target.signal(target);
        self.queue_gaze(GazeMode::FreeLookAt, false, Some(done));
        outcome
    }

    fn tablet_look_at(&self, target: TargetPoint) -> CommandOutcome {
        let (outcome, done) = CommandOutcome::pending();
        let ticket = self.request_gaze(GazeMode::Unconstrained);
        self.request_locomotion(LocomotionRequest::Turn {
            radians: -target.x * self.config.cam_half_width_rad,
            after: ticket,
            done,
        });

        let threshold = if target.y.abs() > target.x.abs() {
            self.config.mostly_vertical_threshold
        } else {
            self.config.diagonal_threshold
        };
        if target.y < -threshold {
            self.step_pose(PoseStep::Up);
        } else if target.y > threshold {
            self.step_pose(PoseStep::Down);
        }
        outcome
    }

    fn turn_degrees(&self, degrees: f32) -> CommandOutcome {
        let (outcome, done) = CommandOutcome::pending();
        let radians = degrees_to_radians(degrees, self.config.max_turn_deg);
        let ticket = self.request_gaze(GazeMode::Unconstrained);
        self.request_locomotion(LocomotionRequest::Turn {
            radians,
            after: ticket,
            done,
        });
        outcome
    }

    fn move_forward(&self, done: Completion) {
        let (pose, requested) = self.with_state(|s| (s.pose, s.requested_pose));
        if pose != Pose::Middle || requested != Pose::Middle {
            debug!("[CONTROLLER] pose is {pose}, moving to middle before going forward");
            self.take_pose(Pose::Middle, Some(PoseFollowUp::MoveForward(done)));
            return;
        }

        self.request_locomotion(LocomotionRequest::MoveForward { done });
        self.move_watchdog.arm();
    }

    fn strafe(&self, target: TargetPoint) -> CommandOutcome {
        let changed = self.with_state(|s| {
            let changed = s.strafe_target != target;
            s.strafe_target = target;
            changed
        });
        let outcome = if changed {
            let (outcome, done) = CommandOutcome::pending();
            let ticket = self.request_gaze(GazeMode::LookingDown);
            self.request_locomotion(LocomotionRequest::Strafe {
                target,
                after: ticket,
                done,
            });
            outcome
        } else {
            // same vector, the running primitive keeps going
            CommandOutcome::ready(Ok(()))
        };
        self.move_watchdog.arm();
        outcome
    }

    fn on_move_idle(&self) {
        info!(
            "[CONTROLLER] no move command for {}ms, halting",
            self.config.move_idle_timeout.as_millis()
        );
        self.with_state(|s| s.strafe_target = TargetPoint::ZERO);
        self.request_locomotion(LocomotionRequest::Halt);
    }

    fn on_awkward_timeout(&self) {
        info!("[CONTROLLER] awkward pose held too long, returning to middle");
        self.take_pose(Pose::Middle, None);
    }

    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut ControllerState) -> R) -> R {
        self.state.lock(|state| f(&mut state.borrow_mut()))
    }

    fn step_pose(&self, step: PoseStep) {
        let from = self.with_state(|s| s.requested_pose);
        self.take_pose(self.ladder.step(from, step), None);
    }

    /// Chain a pose change behind the queued ones. Asking for the pose already at the end of
    /// the chain only queues the follow-up.
    fn take_pose(&self, pose: Pose, then: Option<PoseFollowUp>) {
        let queued = self.with_state(|s| {
            let previous = core::mem::replace(&mut s.requested_pose, pose);
            let target = (previous != pose).then_some(pose);
            if target.is_none() && then.is_none() {
                return None;
            }
            s.pose_queue.push_back(PoseRequest { target, then });
            Some((previous, target))
        });

        let Some((previous, target)) = queued else {
            return;
        };
        if target.is_some() {
            info!("[CONTROLLER] pose change {previous} -> {pose}");
        }
        self.pose_queued.signal(());
    }

    pub(crate) fn pose_landed(&self, pose: Pose) {
        let awkward = self.ladder.is_awkward(pose);
        let flipped = self.with_state(|s| {
            s.pose = pose;
            core::mem::replace(&mut s.awkward, awkward) != awkward
        });

        match (flipped, awkward) {
            (true, true) => {
                info!("[CONTROLLER] awkward pose {pose}, starting timeout");
                self.awkward_watchdog.arm();
            }
            (true, false) => self.awkward_watchdog.disarm(),
            (false, _) => {}
        }
    }

    pub(crate) fn follow_up(&self, follow_up: PoseFollowUp) {
        match follow_up {
            PoseFollowUp::MoveForward(done) => self.move_forward(done),
            PoseFollowUp::ReleaseGaze => {
                self.request_gaze(GazeMode::Unconstrained);
            }
        }
    }

    /// Queue a gaze transition. `None` when the queue overflowed and the request was dropped.
    pub(crate) fn request_gaze(&self, mode: GazeMode) -> Option<GazeTicket> {
        self.queue_gaze(mode, false, None)
    }

    /// `done` is finished by the gaze lane once the transition settled, or right away when
    /// `mode` is already the last queued one.
    fn queue_gaze(
        &self,
        mode: GazeMode,
        force: bool,
        done: Option<Completion>,
    ) -> Option<GazeTicket> {
        let queued = self.with_state(|s| {
            if s.requested_gaze == mode && !force {
                return Err(GazeTicket(s.gaze_seq));
            }
            s.gaze_seq += 1;
            let previous = core::mem::replace(&mut s.requested_gaze, mode);
            Ok((s.gaze_seq, previous))
        });

        let (seq, previous) = match queued {
            Ok(queued) => queued,
            // already the last queued mode, wait for that one
            Err(ticket) => {
                if let Some(done) = done {
                    done.finish(Ok(()));
                }
                return Some(ticket);
            }
        };

        let request = GazeRequest {
            mode,
            seq,
            force,
            done,
        };
        if let Err(TrySendError::Full(dropped)) = self.gaze_requests.try_send(request) {
            warn!("[CONTROLLER] gaze queue full, dropped {dropped:?}");
            self.with_state(|s| {
                s.requested_gaze = previous;
                s.gaze_seq -= 1;
            });
            return None;
        }
        Some(GazeTicket(seq))
    }

    pub(crate) fn gaze_settled(&self, mode: GazeMode, seq: u64) {
        self.with_state(|s| {
            s.gaze = mode;
            s.gaze_settled_seq = s.gaze_settled_seq.max(seq);
        });
        self.turn_gaze_settled.signal(());
        self.drive_gaze_settled.signal(());
    }

    /// Resolve once the gaze lane settled every transition up to `ticket`.
    pub(crate) async fn wait_gaze(&self, ticket: GazeTicket, waiter: GazeWaiter) {
        let settled = match waiter {
            GazeWaiter::Turn => &self.turn_gaze_settled,
            GazeWaiter::Drive => &self.drive_gaze_settled,
        };
        while self.with_state(|s| s.gaze_settled_seq) < ticket.0 {
            settled.wait().await;
        }
    }

    /// A GoTo interrupted while the gaze was held in transition lets go of the hold.
    pub(crate) fn settle_interrupted_transition(&self) {
        if self.with_state(|s| s.requested_gaze) == GazeMode::Transitioning {
            debug!("[CONTROLLER] GoTo interrupted mid-transition, looking down");
            self.request_gaze(GazeMode::LookingDown);
        }
    }

    fn request_locomotion(&self, request: LocomotionRequest) {
        if let Err(TrySendError::Full(dropped)) = self.locomotion_requests.try_send(request) {
            warn!("[CONTROLLER] locomotion queue full, dropped {dropped:?}");
        }
    }

    pub(crate) async fn turn_in_place(&self, radians: f32) -> ActionResult {
        let handle = self.trajectories.turn(&self.platform, radians).await?;
        self.platform
            .run_action(ActionSpec::RunTrajectory(handle))
            .await
    }

    pub(crate) async fn run_logged(&self, label: &str, action: ActionSpec) -> ActionResult {
        let outcome = self.platform.run_action(action).await;
        self.report(label, &outcome);
        outcome
    }

    pub(crate) fn report(&self, label: &str, outcome: &ActionResult) {
        match outcome {
            Ok(()) => debug!("[CONTROLLER] {label} done"),
            Err(ActuatorError::Cancelled) => debug!("[CONTROLLER] {label} cancelled"),
            Err(e) => warn!("[CONTROLLER] {label} error: {e}"),
        }
    }

    /// Like [`report`](Self::report), with the charging flap state on failure.
    pub(crate) fn report_locomotion(&self, label: &str, outcome: &ActionResult) {
        let failed = matches!(outcome, Err(e) if *e != ActuatorError::Cancelled);
        self.report(label, outcome);
        if failed && self.platform.charging_flap_open() {
            warn!("[CONTROLLER] charging flap is open");
        }
    }
}
