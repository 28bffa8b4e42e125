//! Gaze control modes and the requests exchanged with the gaze lane.
use core::fmt::Display;

use crate::robot::outcome::Completion;

/// Which mechanism currently controls the head orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GazeMode {
    #[default]
    Unconstrained,
    /// Head locked on the locomotion target frame.
    LookingDown,
    /// Head tracks the operator-set look-at target.
    FreeLookAt,
    /// Mode swap spanning several steps; background movement stays held.
    Transitioning,
}

impl Display for GazeMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GazeMode::Unconstrained => f.write_str("unconstrained"),
            GazeMode::LookingDown => f.write_str("looking down"),
            GazeMode::FreeLookAt => f.write_str("free look-at"),
            GazeMode::Transitioning => f.write_str("transitioning"),
        }
    }
}

/// One queued mode transition.
#[derive(Debug)]
pub struct GazeRequest {
    pub mode: GazeMode,
    pub seq: u64,
    /// Cancel both gaze actions even if `mode` is already current.
    pub force: bool,
    /// Finished with the outcome of the hold and release steps.
    pub done: Option<Completion>,
}

/// Proof that a transition was queued; resolves once the gaze lane settled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GazeTicket(pub u64);

/// Locomotion slots that may wait on a gaze transition. Each gets its own wake-up signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GazeWaiter {
    Turn,
    Drive,
}
