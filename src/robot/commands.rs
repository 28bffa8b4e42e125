//! Command types for remote-operator control and inter-lane communication.
//!
//! Defines the operator [`Command`] as handed over by the transport layer, its validated form
//! [`MotionCommand`], and the requests the controller posts to the pose and locomotion lanes.
use core::fmt::{self, Display, Formatter};

use crate::kinematics::conversion::TargetPoint;
use crate::robot::gaze::GazeTicket;
use crate::robot::outcome::Completion;
use crate::robot::pose::Pose;

/// A command as decoded by the transport: a name and its numeric arguments.
#[derive(Debug, Clone, Copy)]
pub struct Command<'a> {
    pub name: &'a str,
    pub args: &'a [f32],
}

impl<'a> Command<'a> {
    pub fn new(name: &'a str, args: &'a [f32]) -> Self {
        Self { name, args }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionCommand {
    HeadLookAt(TargetPoint),
    TabletLookAt(TargetPoint),
    Turn { degrees: f32 },
    MoveForward,
    Strafe(TargetPoint),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentError {
    Missing { expected: usize, found: usize },
    NotFinite { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    UnknownCommand(alloc::string::String),
    InvalidArguments {
        command: &'static str,
        reason: ArgumentError,
    },
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownCommand(name) => write!(f, "unknown command: {name}"),
            CommandError::InvalidArguments {
                command,
                reason: ArgumentError::Missing { expected, found },
            } => write!(f, "{command} expects {expected} arguments, got {found}"),
            CommandError::InvalidArguments {
                command,
                reason: ArgumentError::NotFinite { index },
            } => write!(f, "{command} argument {index} is not a finite number"),
        }
    }
}

impl core::error::Error for CommandError {}

/// Take the first `N` arguments, extra ones are ignored.
fn arguments<const N: usize>(
    command: &'static str,
    args: &[f32],
) -> Result<[f32; N], CommandError> {
    if args.len() < N {
        return Err(CommandError::InvalidArguments {
            command,
            reason: ArgumentError::Missing {
                expected: N,
                found: args.len(),
            },
        });
    }

    let mut values = [0.0; N];
    for (index, (slot, value)) in values.iter_mut().zip(args).enumerate() {
        if !value.is_finite() {
            return Err(CommandError::InvalidArguments {
                command,
                reason: ArgumentError::NotFinite { index },
            });
        }
        *slot = *value;
    }
    Ok(values)
}

impl TryFrom<Command<'_>> for MotionCommand {
    type Error = CommandError;

    fn try_from(command: Command<'_>) -> Result<Self, Self::Error> {
        match command.name {
            "head_look_at" => {
                let [x, y] = arguments::<2>("head_look_at", command.args)?;
                Ok(MotionCommand::HeadLookAt(TargetPoint::clamped(x, y)))
            }
            "tablet_look_at" => {
                let [x, y] = arguments::<2>("tablet_look_at", command.args)?;
                Ok(MotionCommand::TabletLookAt(TargetPoint::clamped(x, y)))
            }
            "turn" => {
                let [degrees] = arguments::<1>("turn", command.args)?;
                Ok(MotionCommand::Turn { degrees })
            }
            "move_forward" => Ok(MotionCommand::MoveForward),
            "strafe" => {
                let [x, y] = arguments::<2>("strafe", command.args)?;
                Ok(MotionCommand::Strafe(TargetPoint::clamped(x, y)))
            }
            other => Err(CommandError::UnknownCommand(other.into())),
        }
    }
}

/// What the pose lane does once a queued pose has landed.
#[derive(Debug)]
pub enum PoseFollowUp {
    /// Retry the move-forward that was waiting for the middle pose.
    MoveForward(Completion),
    /// Drop any gaze control, used when returning to the default pose.
    ReleaseGaze,
}

/// A chained pose change. `target: None` only runs the follow-up, after the queued poses.
#[derive(Debug)]
pub struct PoseRequest {
    pub target: Option<Pose>,
    pub then: Option<PoseFollowUp>,
}

#[derive(Debug)]
pub enum LocomotionRequest {
    Turn {
        radians: f32,
        after: Option<GazeTicket>,
        done: Completion,
    },
    Strafe {
        target: TargetPoint,
        after: Option<GazeTicket>,
        done: Completion,
    },
    /// Joins a GoTo already in flight instead of restarting it.
    MoveForward { done: Completion },
    /// Idle watchdog expiry: cancel GoTo and strafe, turns keep going.
    Halt,
    /// Controller stop: cancel everything.
    Stop,
}
