//! The lanes driven by [`MotionController::run`](crate::MotionController::run).
//!
//! - [`pose_task`]: plays pose animations in request order.
//! - [`gaze_task`]: arbitrates gaze-control modes and owns the gaze actions.
//! - [`locomotion_task`]: runs turn and drive plans, cancelling superseded ones.
//! - [`watchdog`]: re-armable timers for move idling and awkward poses.
//!
//! Lanes communicate with the controller through Embassy channels and signals.
pub mod gaze_task;
pub mod locomotion_task;
pub mod pose_task;
pub mod watchdog;
