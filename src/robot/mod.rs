//! Core robot types and the motion state machine.
//!
//! This module defines the main types of the walker, including:
//! - [`commands`]: Inbound command types and their parsing.
//! - [`controller`]: The run/pause state machine owning oscillators and servos.
//! - [`leg`]: Leg enumeration and indexing helpers.
//! - [`obstacle`]: Advisory distance tracking for an optional sensor.
//! - [`servo`]: The actuator seam and the PWM servo implementation.
//! - [`state`]: Gait state, direction and run state.
//!
//! These types are used throughout the firmware for movement and control.
pub mod commands;
pub mod controller;
pub mod leg;
pub mod obstacle;
pub mod servo;
pub mod state;
