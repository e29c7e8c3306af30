use core::f32::consts::PI;
use log::debug;

use super::oscillator::{Oscillator, OscillatorParams};
use crate::config::MotionConfig;
use crate::robot::{leg::Leg, state::Direction};

// Phase shifts in degrees for [left, mid, right]
const FWD: [i32; 3] = [0, 90, 0];
const REV: [i32; 3] = [90, 0, 90];
const ROTR: [i32; 3] = [0, 90, 180];
const ROTL: [i32; 3] = [180, 90, 0];

/// The abstract gait the three oscillators are derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaitParams {
    pub direction: Direction,
    pub speed_pct: u8,
    pub stroke_pct: u8,
    pub steer_angle_deg: i8,
}

/// Concrete oscillator settings for one leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegTarget {
    pub period_ms: u32,
    pub amplitude: f32,
    pub phase_shift_deg: i32,
    pub reversed: bool,
}

pub fn phases(direction: Direction) -> [i32; 3] {
    match direction {
        Direction::Forward => FWD,
        Direction::Reverse => REV,
        Direction::RotateRight => ROTR,
        Direction::RotateLeft => ROTL,
    }
}

/// Speed is inversely proportional to the period: 100% is the shortest period
/// and 0% the longest.
pub fn period_for_speed(config: &MotionConfig, speed_pct: u8) -> u32 {
    let slowness = 100 - speed_pct.min(100) as u32;
    let span = config.period_max_ms.saturating_sub(config.period_min_ms);
    (slowness * span / 100 + config.period_min_ms).max(1)
}

pub fn stroke_for_pct(config: &MotionConfig, stroke_pct: u8) -> i32 {
    stroke_pct.min(100) as i32 * config.stroke_max / 100
}

/// Splits the stroke into `[left, right]` for a steering angle.
///
/// A positive angle lengthens the left stroke and shortens the right one by
/// half of the angle's share of the max stroke, a negative angle the other
/// way around. The pair is then moved back inside `[0, stroke_max]`.
pub fn steered_strokes(config: &MotionConfig, stroke: i32, steer_angle_deg: i8) -> [i32; 2] {
    if steer_angle_deg == 0 {
        return [stroke, stroke];
    }
    let adj = (steer_angle_deg.unsigned_abs() as i32 * config.stroke_max / 90) / 2;
    let mut strokes = if steer_angle_deg > 0 {
        [stroke + adj, stroke - adj]
    } else {
        [stroke - adj, stroke + adj]
    };

    let over = strokes[0].max(strokes[1]) - config.stroke_max;
    if over > 0 {
        strokes = strokes.map(|s| s - over);
    }
    let under = strokes[0].min(strokes[1]);
    if under < 0 {
        strokes = strokes.map(|s| s - under);
    }
    strokes
}

/// Computes the per-leg oscillator settings for a gait.
pub fn gait_targets(config: &MotionConfig, params: &GaitParams) -> [LegTarget; 3] {
    let period_ms = period_for_speed(config, params.speed_pct);
    let stroke = stroke_for_pct(config, params.stroke_pct);
    let [left, right] = if params.direction.is_rotation() {
        [stroke, stroke]
    } else {
        steered_strokes(config, stroke, params.steer_angle_deg)
    };
    let amplitudes = [left as f32, config.mid_amplitude.max(0.0), right as f32];
    let phase = phases(params.direction);

    Leg::ALL.map(|leg| LegTarget {
        period_ms,
        amplitude: amplitudes[leg],
        phase_shift_deg: phase[leg as usize],
        reversed: config.reversed[leg as usize],
    })
}

/// Owns one oscillator per leg and keeps them in step with the gait.
#[derive(Debug, Clone)]
pub struct LegDriver {
    oscillators: [Oscillator; 3],
    targets: [LegTarget; 3],
    config: MotionConfig,
}

impl LegDriver {
    pub fn new(config: MotionConfig, now_ms: u64, params: &GaitParams) -> Self {
        let targets = gait_targets(&config, params);
        let oscillators = Leg::ALL.map(|leg| {
            let target = &targets[leg as usize];
            Oscillator::new(now_ms, target.period_ms, config.ease_window_ms).with_params(
                now_ms,
                to_params(target).vertical_shift(config.vertical_shift[leg]),
            )
        });

        Self {
            oscillators,
            targets,
            config,
        }
    }

    /// Recomputes and applies the oscillator settings for all legs at once.
    pub fn apply_gait(&mut self, now_ms: u64, params: &GaitParams) -> [LegTarget; 3] {
        self.targets = gait_targets(&self.config, params);
        for leg in Leg::ALL {
            let target = &self.targets[leg as usize];
            debug!("[GAIT] {} leg -> {:?}", leg, target);
            self.oscillators[leg].set_params(now_ms, to_params(target));
        }
        self.targets
    }

    pub fn sample(&self, now_ms: u64) -> [f32; 3] {
        Leg::ALL.map(|leg| self.oscillators[leg].sample(now_ms))
    }

    pub fn reset_epoch(&mut self, now_ms: u64) {
        for osc in self.oscillators.iter_mut() {
            osc.reset_epoch(now_ms);
        }
    }

    pub fn ease_in(&mut self, now_ms: u64) {
        for osc in self.oscillators.iter_mut() {
            osc.ease_in(now_ms);
        }
    }

    pub fn oscillator(&self, leg: Leg) -> &Oscillator {
        &self.oscillators[leg]
    }

    pub fn targets(&self) -> &[LegTarget; 3] {
        &self.targets
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }
}

fn to_params(target: &LegTarget) -> OscillatorParams {
    OscillatorParams::default()
        .period_ms(target.period_ms)
        .amplitude(target.amplitude)
        .phase_shift_rad(target.phase_shift_deg as f32 * PI / 180.0)
        .reversed(target.reversed)
}
