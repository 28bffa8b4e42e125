//! Core robot types for the motion core.
//!
//! - [`commands`]: operator commands and the requests posted to the lanes.
//! - [`gaze`]: gaze modes and transition tickets.
//! - [`outcome`]: completion handles returned for accepted commands.
//! - [`platform`]: the [`Platform`](platform::Platform) capability trait and action specs.
//! - [`pose`]: tilt poses and the pose ladder.
//! - [`state`]: controller state shared by the lanes.
pub mod commands;
pub mod gaze;
pub mod outcome;
pub mod platform;
pub mod pose;
pub mod state;
