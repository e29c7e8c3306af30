//! Asynchronous tasks for the walker firmware.
//!
//! This module contains Embassy async tasks for the robot's runtime, including:
//! - [`motion_task`]: The control loop owning the motion controller.
//! - [`net_task`]: Manages WiFi, the TCP command server and replies.
//! - [`servos`]: LEDC configuration for the leg servos.
//!
//! Tasks are spawned from `main.rs` and communicate via Embassy channels.
pub mod motion_task;
pub mod net_task;
pub mod servos;
