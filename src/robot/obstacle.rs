//! Advisory obstacle distance tracking.
//!
//! A distance sensor, when one is fitted, feeds samples in through
//! [`ObstacleMonitor::record`]. The monitor keeps a moving average and produces
//! periodic reports while enabled. It never changes the gait.
use core::fmt::Write;

use heapless::{Deque, String};

use crate::config::{OBSTACLE_REPORT_MS, OBSTACLE_WINDOW, REPLY_LEN};

#[derive(Debug)]
pub struct ObstacleMonitor {
    enabled: bool,
    window: Deque<f32, OBSTACLE_WINDOW>,
    last_report_ms: Option<u64>,
    reported_obstacle: bool,
}

impl ObstacleMonitor {
    pub const fn new() -> Self {
        Self {
            enabled: false,
            window: Deque::new(),
            last_report_ms: None,
            reported_obstacle: false,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.last_report_ms = None;
        self.reported_obstacle = false;
        self.enabled
    }

    /// Adds a distance sample in mm. `None` (no echo) drains the window by one.
    pub fn record(&mut self, distance_mm: Option<f32>) {
        match distance_mm.filter(|d| d.is_finite() && *d >= 0.0) {
            Some(distance) => {
                if self.window.is_full() {
                    self.window.pop_front();
                }
                // cannot fail, a slot was freed above
                let _ = self.window.push_back(distance);
            }
            None => {
                self.window.pop_front();
            }
        }
    }

    /// Moving average over the window, `None` when nothing is in range.
    pub fn last_distance_mm(&self) -> Option<f32> {
        if self.window.is_empty() {
            return None;
        }
        let sum: f32 = self.window.iter().sum();
        Some(sum / self.window.len() as f32)
    }

    /// `obst:<mm>` at most once per report interval while an obstacle is seen,
    /// and a single `obst:clear` once it is gone.
    pub fn report(&mut self, now_ms: u64) -> Option<String<REPLY_LEN>> {
        if !self.enabled {
            return None;
        }
        if let Some(last) = self.last_report_ms {
            if now_ms.saturating_sub(last) < OBSTACLE_REPORT_MS {
                return None;
            }
        }

        let mut reply = String::new();
        match self.last_distance_mm() {
            Some(distance) => {
                write!(reply, "obst:{distance:.2}").ok()?;
                self.reported_obstacle = true;
            }
            None if self.reported_obstacle => {
                reply.push_str("obst:clear").ok()?;
                self.reported_obstacle = false;
            }
            None => return None,
        }
        self.last_report_ms = Some(now_ms);
        Some(reply)
    }
}

impl Default for ObstacleMonitor {
    fn default() -> Self {
        Self::new()
    }
}
