//! Phase-shifted sine oscillator for a single leg servo.
//!
//! The output is a pure function of the monotonic time in milliseconds and the
//! parameter history, so skipping samples (pausing) never changes the
//! trajectory. Parameter changes are made continuous:
//! - a new period re-anchors the cycle position at the moment of the change,
//! - amplitude, bias, phase shift and reversal are eased linearly towards their
//!   new value over the ease window.
use core::f32::consts::{PI, TAU};
use micromath::F32Ext;

/// Any subset of oscillator parameters. `None` leaves the parameter alone.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct OscillatorParams {
    pub period_ms: Option<u32>,
    pub amplitude: Option<f32>,
    pub phase_shift_rad: Option<f32>,
    pub vertical_shift: Option<f32>,
    pub reversed: Option<bool>,
}

impl OscillatorParams {
    pub fn period_ms(mut self, period_ms: u32) -> Self {
        self.period_ms = Some(period_ms);
        self
    }

    pub fn amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = Some(amplitude);
        self
    }

    pub fn phase_shift_rad(mut self, phase_shift_rad: f32) -> Self {
        self.phase_shift_rad = Some(phase_shift_rad);
        self
    }

    pub fn vertical_shift(mut self, vertical_shift: f32) -> Self {
        self.vertical_shift = Some(vertical_shift);
        self
    }

    pub fn reversed(mut self, reversed: bool) -> Self {
        self.reversed = Some(reversed);
        self
    }
}

/// A value moving linearly from `from` to `to`, starting at `start_ms`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Eased {
    from: f32,
    to: f32,
    start_ms: u64,
}

impl Eased {
    const fn settled(value: f32) -> Self {
        Self {
            from: value,
            to: value,
            start_ms: 0,
        }
    }

    fn value_at(&self, now_ms: u64, window_ms: u32) -> f32 {
        let elapsed = now_ms.saturating_sub(self.start_ms);
        if window_ms == 0 || elapsed >= window_ms as u64 {
            return self.to;
        }
        let progress = elapsed as f32 / window_ms as f32;
        self.from + (self.to - self.from) * progress
    }

    fn retarget(&mut self, now_ms: u64, target: f32, window_ms: u32) {
        if target == self.to {
            return;
        }
        self.from = self.value_at(now_ms, window_ms);
        self.to = target;
        self.start_ms = now_ms;
    }

    fn snap(&mut self) {
        *self = Self::settled(self.to);
    }
}

/// Wraps an angle difference into `(-PI, PI]`.
fn shortest_turn(delta: f32) -> f32 {
    let delta = delta.rem_euclid(TAU);
    if delta > PI {
        delta - TAU
    } else {
        delta
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Oscillator {
    epoch_ms: u64,
    period_ms: u32,
    // cycle position (in [0, 1)) at `anchor_ms`; moved on every period change
    anchor_ms: u64,
    anchor_cycles: f32,
    amplitude: Eased,
    phase_shift: Eased,
    vertical_shift: Eased,
    sign: Eased,
    ease_window_ms: u32,
}

impl Oscillator {
    /// Creates an idle oscillator (zero amplitude) whose time base starts at
    /// `now_ms`.
    pub fn new(now_ms: u64, period_ms: u32, ease_window_ms: u32) -> Self {
        Self {
            epoch_ms: now_ms,
            period_ms: period_ms.max(1),
            anchor_ms: now_ms,
            anchor_cycles: 0.0,
            amplitude: Eased::settled(0.0),
            phase_shift: Eased::settled(0.0),
            vertical_shift: Eased::settled(0.0),
            sign: Eased::settled(1.0),
            ease_window_ms,
        }
    }

    /// Applies `params` without easing. Used while building the oscillator.
    pub fn with_params(mut self, now_ms: u64, params: OscillatorParams) -> Self {
        self.set_params(now_ms, params);
        self.settle();
        self
    }

    /// Updates any subset of the parameters at time `now_ms`.
    ///
    /// Non-finite values are ignored, the period is kept at 1 ms or more and
    /// the amplitude is kept non-negative.
    pub fn set_params(&mut self, now_ms: u64, params: OscillatorParams) {
        let window = self.ease_window_ms;

        if let Some(period_ms) = params.period_ms {
            let period_ms = period_ms.max(1);
            if period_ms != self.period_ms {
                self.anchor_cycles = self.cycles_at(now_ms);
                self.anchor_ms = now_ms;
                self.period_ms = period_ms;
            }
        }
        if let Some(amplitude) = params.amplitude.filter(|a| a.is_finite()) {
            self.amplitude.retarget(now_ms, amplitude.max(0.0), window);
        }
        if let Some(phase) = params.phase_shift_rad.filter(|p| p.is_finite()) {
            let current = self.phase_shift.value_at(now_ms, window);
            if shortest_turn(phase - self.phase_shift.to) != 0.0 {
                let target = current + shortest_turn(phase - current);
                self.phase_shift.retarget(now_ms, target, window);
            }
        }
        if let Some(shift) = params.vertical_shift.filter(|v| v.is_finite()) {
            self.vertical_shift.retarget(now_ms, shift, window);
        }
        if let Some(reversed) = params.reversed {
            let sign = if reversed { -1.0 } else { 1.0 };
            self.sign.retarget(now_ms, sign, window);
        }
    }

    /// The output at `now_ms`, in degrees around the servo center.
    pub fn sample(&self, now_ms: u64) -> f32 {
        let window = self.ease_window_ms;
        let amplitude = self.amplitude.value_at(now_ms, window);
        let phase = self.phase_shift.value_at(now_ms, window);
        let bias = self.vertical_shift.value_at(now_ms, window);
        let sign = self.sign.value_at(now_ms, window);

        let angle = TAU * self.cycles_at(now_ms) + phase;
        bias + sign * amplitude * angle.sin()
    }

    /// Re-zeroes the time base at `now_ms` and drops any easing in flight.
    pub fn reset_epoch(&mut self, now_ms: u64) {
        self.epoch_ms = now_ms;
        self.anchor_ms = now_ms;
        self.anchor_cycles = 0.0;
        self.settle();
    }

    /// Restarts the amplitude from zero towards its target at `now_ms`.
    pub fn ease_in(&mut self, now_ms: u64) {
        self.amplitude = Eased {
            from: 0.0,
            to: self.amplitude.to,
            start_ms: now_ms,
        };
    }

    fn settle(&mut self) {
        self.amplitude.snap();
        self.phase_shift.snap();
        self.vertical_shift.snap();
        self.sign.snap();
    }

    fn cycles_at(&self, now_ms: u64) -> f32 {
        let period = self.period_ms as u64;
        let elapsed = now_ms.saturating_sub(self.anchor_ms) % period;
        (self.anchor_cycles + elapsed as f32 / period as f32).fract()
    }

    pub fn epoch_ms(&self) -> u64 {
        self.epoch_ms
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Target amplitude (the active value may still be easing towards it).
    pub fn amplitude(&self) -> f32 {
        self.amplitude.to
    }

    pub fn phase_shift_rad(&self) -> f32 {
        self.phase_shift.to.rem_euclid(TAU)
    }

    pub fn vertical_shift(&self) -> f32 {
        self.vertical_shift.to
    }

    pub fn reversed(&self) -> bool {
        self.sign.to < 0.0
    }

    pub fn ease_window_ms(&self) -> u32 {
        self.ease_window_ms
    }
}
