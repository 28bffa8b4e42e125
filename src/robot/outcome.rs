//! Completion handles linking an operator command to the actions it started.
//!
//! [`MotionController::handle_command`](crate::MotionController::handle_command) hands a
//! [`CommandOutcome`] back to the caller and passes the matching [`Completion`] along with the
//! lane request. The lane finishes the completion with the plan's result; a completion dropped
//! unfinished, because its plan was superseded or its request was lost, resolves as
//! [`ActuatorError::Cancelled`].
use alloc::sync::Arc;
use core::fmt;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};

use crate::robot::platform::{ActionResult, ActuatorError};

type OutcomeSignal = Signal<CriticalSectionRawMutex, ActionResult>;

/// Caller side: resolves once the actions started by a command settle.
pub struct CommandOutcome(Arc<OutcomeSignal>);

impl CommandOutcome {
    pub(crate) fn pending() -> (Self, Completion) {
        let signal = Arc::new(OutcomeSignal::new());
        (
            Self(signal.clone()),
            Completion {
                signal: Some(signal),
            },
        )
    }

    /// An outcome with nothing left to wait for.
    pub(crate) fn ready(result: ActionResult) -> Self {
        let (outcome, done) = Self::pending();
        done.finish(result);
        outcome
    }

    pub async fn result(self) -> ActionResult {
        self.0.wait().await
    }
}

impl fmt::Debug for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandOutcome")
            .field("settled", &self.0.signaled())
            .finish()
    }
}

/// Lane side of a [`CommandOutcome`].
pub struct Completion {
    signal: Option<Arc<OutcomeSignal>>,
}

impl Completion {
    pub fn finish(mut self, result: ActionResult) {
        if let Some(signal) = self.signal.take() {
            signal.signal(result);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(signal) = self.signal.take() {
            signal.signal(Err(ActuatorError::Cancelled));
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Completion")
    }
}

/// Finish every completion waiting on one plan.
pub fn finish_all(waiting: impl IntoIterator<Item = Completion>, result: &ActionResult) {
    for done in waiting {
        done.finish(result.clone());
    }
}
