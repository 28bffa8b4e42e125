//! Locomotion lane.
//!
//! Runs at most one turn and one drive plan (GoTo or strafe) at a time. A plan is a boxed
//! future holding its whole sequence of steps; replacing or cancelling a plan drops it, which
//! cancels whatever platform action it was awaiting. Each plan carries the completions of
//! the commands waiting on it; a dropped plan reports them cancelled.
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::future::{pending, Future};
use core::pin::Pin;
use embassy_futures::select::{select3, Either3};
use log::{debug, info};
use micromath::F32Ext;

use crate::controller::MotionController;
use crate::kinematics::conversion::{yaw_from_quaternion, Frame, TargetPoint};
use crate::robot::commands::LocomotionRequest;
use crate::robot::gaze::{GazeMode, GazeTicket, GazeWaiter};
use crate::robot::outcome::{finish_all, Completion};
use crate::robot::platform::{ActionResult, ActionSpec, Platform};

type Plan<'a> = Pin<Box<dyn Future<Output = ActionResult> + 'a>>;

struct Running<'a> {
    plan: Plan<'a>,
    waiting: Vec<Completion>,
}

impl<'a> Running<'a> {
    fn new(plan: impl Future<Output = ActionResult> + 'a, done: Completion) -> Self {
        Self {
            plan: Box::pin(plan),
            waiting: alloc::vec![done],
        }
    }

    fn settle(self, outcome: ActionResult) {
        finish_all(self.waiting, &outcome);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriveKind {
    GoTo,
    Strafe,
}

struct DrivePlan<'a> {
    kind: DriveKind,
    run: Running<'a>,
}

async fn finish(running: Option<&mut Running<'_>>) -> ActionResult {
    match running {
        Some(running) => running.plan.as_mut().await,
        None => pending().await,
    }
}

fn cancel_drive<P: Platform>(ctl: &MotionController<P>, drive: &mut Option<DrivePlan<'_>>) {
    if let Some(cancelled) = drive.take() {
        debug!("[LOCOMOTION_TASK] cancelled {:?}", cancelled.kind);
        if cancelled.kind == DriveKind::GoTo {
            ctl.settle_interrupted_transition();
        }
    }
}

pub async fn locomotion_task<'a, P: Platform>(ctl: &'a MotionController<P>) {
    let mut turn: Option<Running<'a>> = None;
    let mut drive: Option<DrivePlan<'a>> = None;

    loop {
        let event = select3(
            finish(turn.as_mut()),
            finish(drive.as_mut().map(|d| &mut d.run)),
            ctl.locomotion_requests.receive(),
        )
        .await;

        let stamp = "[LOCOMOTION_TASK] received";
        match event {
            Either3::First(outcome) => {
                if let Some(finished) = turn.take() {
                    finished.settle(outcome);
                }
            }
            Either3::Second(outcome) => {
                if let Some(finished) = drive.take() {
                    finished.run.settle(outcome);
                }
            }
            Either3::Third(LocomotionRequest::Turn {
                radians,
                after,
                done,
            }) => {
                info!("{stamp} turn {radians} rad");
                turn = Some(Running::new(turn_plan(ctl, radians, after), done));
            }
            Either3::Third(LocomotionRequest::Strafe {
                target,
                after,
                done,
            }) => {
                info!("{stamp} strafe ({}, {})", target.x, target.y);
                cancel_drive(ctl, &mut drive);
                drive = Some(DrivePlan {
                    kind: DriveKind::Strafe,
                    run: Running::new(strafe_plan(ctl, target, after), done),
                });
            }
            Either3::Third(LocomotionRequest::MoveForward { done }) => {
                if let Some(going) = drive.as_mut().filter(|d| d.kind == DriveKind::GoTo) {
                    debug!("{stamp} move forward, GoTo already in flight");
                    going.run.waiting.push(done);
                    continue;
                }
                info!("{stamp} move forward");
                cancel_drive(ctl, &mut drive);
                drive = Some(DrivePlan {
                    kind: DriveKind::GoTo,
                    run: Running::new(goto_plan(ctl), done),
                });
            }
            Either3::Third(LocomotionRequest::Halt) => {
                debug!("{stamp} halt");
                cancel_drive(ctl, &mut drive);
            }
            Either3::Third(LocomotionRequest::Stop) => {
                info!("{stamp} stop");
                turn = None;
                cancel_drive(ctl, &mut drive);
            }
        }
    }
}

async fn turn_plan<P: Platform>(
    ctl: &MotionController<P>,
    radians: f32,
    after: Option<GazeTicket>,
) -> ActionResult {
    if let Some(ticket) = after {
        ctl.wait_gaze(ticket, GazeWaiter::Turn).await;
    }
    let outcome = ctl.turn_in_place(radians).await;
    ctl.report_locomotion("Turn", &outcome);
    outcome
}

async fn strafe_plan<P: Platform>(
    ctl: &MotionController<P>,
    target: TargetPoint,
    after: Option<GazeTicket>,
) -> ActionResult {
    if let Some(ticket) = after {
        ctl.wait_gaze(ticket, GazeWaiter::Drive).await;
    }
    let outcome = match ctl.trajectories.strafe(&ctl.platform, target).await {
        Ok(handle) => ctl.platform.run_action(ActionSpec::RunTrajectory(handle)).await,
        Err(e) => Err(e),
    };
    ctl.report_locomotion("Strafing", &outcome);
    outcome
}

/// Hold the gaze, square the robot up with the head, lock the gaze down and drive ahead.
async fn goto_plan<P: Platform>(ctl: &MotionController<P>) -> ActionResult {
    if let Some(ticket) = ctl.request_gaze(GazeMode::Transitioning) {
        ctl.wait_gaze(ticket, GazeWaiter::Drive).await;
    }

    let yaw = match ctl.platform.compute_transform(Frame::Gaze, Frame::Robot).await {
        Ok(transform) => yaw_from_quaternion(&transform.rotation),
        Err(e) => {
            let outcome = Err(e);
            ctl.report_locomotion("GoTo alignment", &outcome);
            ctl.settle_interrupted_transition();
            return outcome;
        }
    };

    if yaw.abs() >= ctl.config.yaw_tolerance_rad {
        debug!("[LOCOMOTION_TASK] aligning robot with gaze, yaw {yaw} rad");
        let aligned = ctl.turn_in_place(yaw).await;
        if aligned.is_err() {
            ctl.report_locomotion("GoTo alignment", &aligned);
            ctl.settle_interrupted_transition();
            return aligned;
        }
    }

    if let Some(ticket) = ctl.request_gaze(GazeMode::LookingDown) {
        ctl.wait_gaze(ticket, GazeWaiter::Drive).await;
    }

    let outcome = match ctl.trajectories.forward(&ctl.platform).await {
        Ok(handle) => ctl.platform.run_action(ActionSpec::RunTrajectory(handle)).await,
        Err(e) => Err(e),
    };
    ctl.report_locomotion("GoTo", &outcome);
    outcome
}
