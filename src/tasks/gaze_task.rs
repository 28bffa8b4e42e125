//! Gaze lane: the arbiter between the gaze-control modes.
//!
//! Owns the two long-lived gaze actions (look down and free look-at) and polls whichever is
//! running while waiting for the next request. Mode transitions are taken from a FIFO queue
//! and each one settles completely before the next is evaluated, so a transition never
//! observes a half-finished predecessor. Background movement is held and released only here.
use alloc::boxed::Box;
use core::future::{pending, Future};
use core::pin::Pin;
use embassy_futures::select::{select4, Either4};
use log::{debug, info};

use crate::controller::MotionController;
use crate::robot::gaze::{GazeMode, GazeRequest};
use crate::robot::platform::{Ability, ActionResult, ActionSpec, Platform};

/// A running gaze action. Dropping it cancels the action on the platform.
struct LookAction<'a> {
    mode: GazeMode,
    run: Pin<Box<dyn Future<Output = ActionResult> + 'a>>,
}

impl<'a> LookAction<'a> {
    fn start<P: Platform>(ctl: &'a MotionController<P>, mode: GazeMode, spec: ActionSpec) -> Self {
        debug!("[GAZE_TASK] starting {mode} action");
        Self {
            mode,
            run: Box::pin(ctl.platform.run_action(spec)),
        }
    }
}

#[derive(Default)]
struct GazeSlots<'a> {
    look_down: Option<LookAction<'a>>,
    free_look: Option<LookAction<'a>>,
}

impl GazeSlots<'_> {
    fn cancel(slot: &mut Option<LookAction<'_>>) {
        if let Some(action) = slot.take() {
            debug!("[GAZE_TASK] cancelled {} action", action.mode);
        }
    }
}

async fn settle(slot: &mut Option<LookAction<'_>>) -> ActionResult {
    match slot {
        Some(action) => action.run.as_mut().await,
        None => pending().await,
    }
}

pub async fn gaze_task<'a, P: Platform>(ctl: &'a MotionController<P>) {
    let mut slots = GazeSlots::<'a>::default();

    loop {
        let event = select4(
            settle(&mut slots.look_down),
            settle(&mut slots.free_look),
            ctl.look_target.wait(),
            ctl.gaze_requests.receive(),
        )
        .await;

        match event {
            Either4::First(outcome) => {
                slots.look_down = None;
                ctl.report("Look down", &outcome);
            }
            Either4::Second(outcome) => {
                slots.free_look = None;
                ctl.report("Free look-at", &outcome);
            }
            Either4::Third(target) => {
                let offset = target.look_at_offset(&ctl.config);
                debug!("[GAZE_TASK] look-at target moved to {offset:?}");
                let _ = ctl
                    .run_logged("update look-at target", ActionSpec::UpdateLookAtTarget(offset))
                    .await;
            }
            Either4::Fourth(request) => transition(ctl, request, &mut slots).await,
        }
    }
}

async fn transition<'a, P: Platform>(
    ctl: &'a MotionController<P>,
    request: GazeRequest,
    slots: &mut GazeSlots<'a>,
) {
    let GazeRequest {
        mode: new,
        seq,
        force,
        done,
    } = request;
    let current = ctl.with_state(|s| s.gaze);

    if new == current && !force {
        debug!("[GAZE_TASK] already {new}");
        ctl.gaze_settled(new, seq);
        if let Some(done) = done {
            done.finish(Ok(()));
        }
        return;
    }

    info!("[GAZE_TASK] transition from {current} to {new}");
    let held = ctl
        .run_logged(
            "hold background movement",
            ActionSpec::HoldAbility(Ability::BackgroundMovement),
        )
        .await;

    if force {
        GazeSlots::cancel(&mut slots.look_down);
        GazeSlots::cancel(&mut slots.free_look);
    } else {
        match current {
            GazeMode::LookingDown => GazeSlots::cancel(&mut slots.look_down),
            GazeMode::FreeLookAt => GazeSlots::cancel(&mut slots.free_look),
            GazeMode::Unconstrained | GazeMode::Transitioning => {}
        }
    }

    match new {
        GazeMode::LookingDown => {
            GazeSlots::cancel(&mut slots.look_down);
            slots.look_down = Some(LookAction::start(ctl, new, ActionSpec::LookDown));
        }
        // a tracking action that is still running keeps tracking
        GazeMode::FreeLookAt if slots.free_look.is_none() => {
            slots.free_look = Some(LookAction::start(ctl, new, ActionSpec::TrackGaze));
        }
        _ => {}
    }

    let released = if new != GazeMode::Transitioning {
        ctl.run_logged(
            "release background movement",
            ActionSpec::ReleaseAbility(Ability::BackgroundMovement),
        )
        .await
    } else {
        Ok(())
    };

    ctl.gaze_settled(new, seq);
    debug!("[GAZE_TASK] finished setting {new}");
    if let Some(done) = done {
        done.finish(held.and(released));
    }
}
