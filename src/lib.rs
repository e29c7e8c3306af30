//! Library root for the hexapod walker firmware.
//!
//! Re-exports all main modules: [`kinematics`], [`robot`], [`protocol`] and,
//! with the `firmware` feature, [`tasks`]. The motion core is hardware
//! independent and is what the host tests exercise.
#![no_std]

pub mod config;
pub mod kinematics;
pub mod protocol;
pub mod robot;
#[cfg(feature = "firmware")]
pub mod tasks;

use protocol::{CommandChannel, ReplyChannel};

/// Parsed commands from the network task to the motion task.
pub static COMMANDS: CommandChannel = CommandChannel::new();
/// Replies and notifications from the motion task to the network task.
pub static REPLIES: ReplyChannel = ReplyChannel::new();
