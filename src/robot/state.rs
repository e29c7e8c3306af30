//! Gait state held by the motion controller.
use core::fmt::{self, Display, Formatter};

use crate::config::{DEFAULT_SPEED_PCT, DEFAULT_STROKE_PCT, DEFAULT_TRIMS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Paused,
    Running,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Paused => "pause",
            RunState::Running => "run",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "run" => Some(RunState::Running),
            "pause" => Some(RunState::Paused),
            _ => None,
        }
    }
}

impl Display for RunState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
    RotateLeft,
    RotateRight,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "fwd",
            Direction::Reverse => "rev",
            Direction::RotateLeft => "rotl",
            Direction::RotateRight => "rotr",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "fwd" => Some(Direction::Forward),
            "rev" => Some(Direction::Reverse),
            "rotl" => Some(Direction::RotateLeft),
            "rotr" => Some(Direction::RotateRight),
            _ => None,
        }
    }

    /// Rotation on the spot has no steering angle.
    pub fn is_rotation(&self) -> bool {
        matches!(self, Direction::RotateLeft | Direction::RotateRight)
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaitState {
    pub run_state: RunState,
    pub direction: Direction,
    pub speed_pct: u8,
    pub stroke_pct: u8,
    pub steer_angle_deg: i8,
    /// `[left, mid, right]`
    pub trims: [i8; 3],
}

impl GaitState {
    pub fn new(trims: [i8; 3]) -> Self {
        Self {
            run_state: RunState::Paused,
            direction: Direction::Forward,
            speed_pct: DEFAULT_SPEED_PCT,
            stroke_pct: DEFAULT_STROKE_PCT,
            steer_angle_deg: 0,
            trims,
        }
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }
}

impl Default for GaitState {
    fn default() -> Self {
        Self::new(DEFAULT_TRIMS)
    }
}
