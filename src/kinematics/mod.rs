//! Oscillator math and gait generation for the walker.
//!
//! This module provides the periodic signal generators that drive each leg and
//! the mapping from an abstract gait to their concrete parameters.
//!
//! - [`oscillator`] produces one leg's angle over time and eases parameter changes.
//! - [`gait`] turns direction, speed, stroke and steering into per-leg settings
//!   and owns the three oscillators.
//!
//! Used by the motion controller on every command and every tick.
pub mod gait;
pub mod oscillator;
