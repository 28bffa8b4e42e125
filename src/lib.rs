//! Motion coordination core of a telepresence robot.
//!
//! Turns operator commands (look at, turn, move forward, strafe) into coordinated actions
//! on a [`robot::platform::Platform`]: tilt poses, gaze control and locomotion trajectories.
//! Re-exports the main modules: [`config`], [`kinematics`], [`robot`], and [`tasks`].
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod config;
pub mod controller;
pub mod kinematics;
pub mod robot;
pub mod tasks;

pub use controller::MotionController;
pub use robot::outcome::CommandOutcome;

pub const GAZECMD_CHANNEL_SIZE: usize = 8;
pub const LOCOMOTIONCMD_CHANNEL_SIZE: usize = 8;
