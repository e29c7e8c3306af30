//! Laws of the leg oscillator, checked over random parameters.

use core::f32::consts::TAU;
use hexapod_walker::kinematics::oscillator::{Oscillator, OscillatorParams};
use proptest::prelude::*;

/// Slack for the approximate `sin` used on the target.
fn slack(amplitude: f32) -> f32 {
    amplitude * 0.005 + 1e-3
}

fn settled(period_ms: u32, amplitude: f32, phase: f32, shift: f32, reversed: bool) -> Oscillator {
    Oscillator::new(0, period_ms, 600).with_params(
        0,
        OscillatorParams::default()
            .amplitude(amplitude)
            .phase_shift_rad(phase)
            .vertical_shift(shift)
            .reversed(reversed),
    )
}

proptest! {
    /// The output never leaves `|vertical_shift| + amplitude`.
    #[test]
    fn output_is_bounded(
        period_ms in 1u32..10_000,
        amplitude in 0.0f32..90.0,
        phase in -10.0f32..10.0,
        shift in -30.0f32..30.0,
        reversed in any::<bool>(),
        t in 0u64..1_000_000_000,
    ) {
        let osc = settled(period_ms, amplitude, phase, shift, reversed);
        let out = osc.sample(t);
        prop_assert!(out.is_finite());
        prop_assert!((out - shift).abs() <= amplitude + slack(amplitude));
        prop_assert!(out.abs() <= shift.abs() + amplitude + slack(amplitude));
    }

    /// One millisecond never moves the output further than the sine's slope allows.
    #[test]
    fn output_is_continuous(
        period_ms in 100u32..10_000,
        amplitude in 0.0f32..90.0,
        phase in -10.0f32..10.0,
        t in 0u64..100_000_000,
    ) {
        let osc = settled(period_ms, amplitude, phase, 0.0, false);
        let step = (osc.sample(t + 1) - osc.sample(t)).abs();
        prop_assert!(step <= amplitude * TAU / period_ms as f32 + 2.0 * slack(amplitude));
    }

    /// Changing any parameter does not move the output at the moment of change.
    #[test]
    fn parameter_changes_do_not_jump(
        period_ms in 100u32..5_000,
        new_period_ms in 100u32..5_000,
        amplitude in 0.0f32..60.0,
        new_amplitude in 0.0f32..60.0,
        phase in 0.0f32..TAU,
        new_phase in 0.0f32..TAU,
        shift in -10.0f32..10.0,
        new_shift in -10.0f32..10.0,
        reversed in any::<bool>(),
        t in 0u64..10_000_000,
    ) {
        let mut osc = settled(period_ms, amplitude, phase, shift, false);
        let before = osc.sample(t);
        osc.set_params(
            t,
            OscillatorParams::default()
                .period_ms(new_period_ms)
                .amplitude(new_amplitude)
                .phase_shift_rad(new_phase)
                .vertical_shift(new_shift)
                .reversed(reversed),
        );
        let after = osc.sample(t);
        prop_assert!((after - before).abs() <= 2.0 * slack(amplitude.max(new_amplitude)) + 1e-2);
    }

    /// Sampling is a function of time only: skipped samples change nothing.
    #[test]
    fn skipped_samples_do_not_shift_the_trajectory(
        period_ms in 100u32..5_000,
        amplitude in 0.0f32..60.0,
        pause_from in 0u64..100_000,
        pause_for in 0u64..100_000,
    ) {
        let walking = settled(period_ms, amplitude, 0.0, 0.0, false);
        let paused = walking.clone();
        let resume = pause_from + pause_for;
        let _ = walking.sample(pause_from);
        prop_assert_eq!(walking.sample(resume), paused.sample(resume));
    }
}
