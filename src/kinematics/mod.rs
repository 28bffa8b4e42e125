//! Geometry and locomotion primitives for the motion core.
//!
//! - [`conversion`] maps operator input (normalized coordinates, degrees) to robot-frame
//!   quantities and extracts yaw from platform transforms.
//! - [`trajectory`] describes turn/strafe/GoTo primitives and caches their platform handles.
//!
//! Used by the controller and the locomotion lane.
pub mod conversion;
pub mod trajectory;
