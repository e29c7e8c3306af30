//! Tunables for the gait, the servos and the firmware runtime.
//!
//! Compile-time constants live here; [`MotionConfig`] bundles the ones the
//! motion core needs at runtime so tests can run with different values.

// OSCILLATION PERIOD (ms). Longer is slower.
pub const PERIOD_MIN_MS: u32 = 500;
pub const PERIOD_MAX_MS: u32 = 3000;

// STROKE LIMITS (deg)
// How far the left/right legs may swing without touching the body. The range
// is split around the 90° rotation point, so only half of it is available as
// amplitude.
pub const STROKE_MIN_ANGLE: i32 = 35;
pub const STROKE_MAX_ANGLE: i32 = 145;
pub const STROKE_MAX: i32 = (STROKE_MAX_ANGLE - STROKE_MIN_ANGLE) / 2;

/// Amplitude of the mid leg, which sets how high the side legs are lifted.
pub const MID_AMPLITUDE: f32 = 10.0;

/// Time over which amplitude, bias, phase and reversal changes are eased in.
pub const EASE_WINDOW_MS: u32 = 600;

/// Trims beyond this many degrees either way are not accepted.
pub const TRIM_LIMIT: i8 = 10;

///DEFAULT GAIT
pub const DEFAULT_SPEED_PCT: u8 = 40;
pub const DEFAULT_STROKE_PCT: u8 = 54;
pub const DEFAULT_TRIMS: [i8; 3] = [0, 0, 0];

// SERVO
pub const SERVO_CENTER_DEG: f32 = 90.0;
pub const SERVO_MIN_PULSE_US: f32 = 544.0;
pub const SERVO_MAX_PULSE_US: f32 = 2400.0;
pub const SERVO_ANGLE_RANGE: f32 = 180.0;
pub const SERVO_FREQUENCY_HZ: u32 = 50;
/// Hard limits for the leg servos: the stroke range plus the largest trim.
pub const SERVO_SAFE_MIN_DEG: f32 = (STROKE_MIN_ANGLE - TRIM_LIMIT as i32) as f32;
pub const SERVO_SAFE_MAX_DEG: f32 = (STROKE_MAX_ANGLE + TRIM_LIMIT as i32) as f32;

// RUNTIME
pub const TICK_MS: u64 = 20;
pub const OBSTACLE_WINDOW: usize = 20;
pub const OBSTACLE_REPORT_MS: u64 = 1000;
pub const CMD_CHANNEL_SIZE: usize = 8;
pub const REPLY_CHANNEL_SIZE: usize = 8;
pub const REPLY_LEN: usize = 48;

// NETWORK
pub const PORT: u16 = 8080;
pub const RX_BUF_SIZE: usize = 1024;
pub const TX_BUF_SIZE: usize = 1024;
pub const LINE_LEN: usize = 64;
pub const PING_MS: u64 = 5000;
pub const READ_POLL_MS: u64 = 50;

/// Runtime view of the motion constants.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionConfig {
    pub period_min_ms: u32,
    pub period_max_ms: u32,
    pub stroke_max: i32,
    pub mid_amplitude: f32,
    pub ease_window_ms: u32,
    pub trim_limit: i8,
    /// Legs whose servo is mounted mirrored, `[left, mid, right]`.
    pub reversed: [bool; 3],
    /// Resting bias added to each leg's oscillation, `[left, mid, right]`.
    pub vertical_shift: [f32; 3],
}

impl MotionConfig {
    pub fn new() -> Self {
        Self {
            period_min_ms: PERIOD_MIN_MS,
            period_max_ms: PERIOD_MAX_MS,
            stroke_max: STROKE_MAX,
            mid_amplitude: MID_AMPLITUDE,
            ease_window_ms: EASE_WINDOW_MS,
            trim_limit: TRIM_LIMIT,
            reversed: [false; 3],
            vertical_shift: [0.0; 3],
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self::new()
    }
}
