//! Run/pause state machine and command handlers.
//!
//! The controller owns the gait state, the leg driver and the servos. Every
//! handler clamps its input, updates the gait state and recomputes all
//! oscillators before returning, so a tick never sees a half-applied command.
use log::{debug, error, info};

use super::leg::Leg;
use super::obstacle::ObstacleMonitor;
use super::servo::Actuator;
use super::state::{Direction, GaitState, RunState};
use crate::config::{MotionConfig, REPLY_LEN};
use crate::kinematics::gait::{GaitParams, LegDriver, LegTarget};
use heapless::String;

pub struct MotionController<A> {
    state: GaitState,
    driver: LegDriver,
    servos: [A; 3],
    obstacle: ObstacleMonitor,
    positions: [f32; 3],
    centered: bool,
}

impl<A> MotionController<A>
where
    A: Actuator,
{
    /// Builds the controller in the paused state with the given trims
    /// (clamped to the configured limit).
    pub fn new(config: MotionConfig, servos: [A; 3], trims: [i8; 3], now_ms: u64) -> Self {
        let limit = config.trim_limit;
        let state = GaitState::new(trims.map(|t| t.clamp(-limit, limit)));
        let driver = LegDriver::new(config, now_ms, &gait_params(&state));
        info!("[MOTION] controller ready: {:?}", state);

        Self {
            state,
            driver,
            servos,
            obstacle: ObstacleMonitor::new(),
            positions: [0.0; 3],
            centered: false,
        }
    }

    pub fn run(&mut self, now_ms: u64) -> RunState {
        if !self.state.is_running() {
            info!("[MOTION] run");
            if self.centered {
                self.driver.ease_in(now_ms);
                self.centered = false;
            }
            self.state.run_state = RunState::Running;
        }
        self.state.run_state
    }

    /// Stops servo updates. The servos hold their last position.
    pub fn pause(&mut self) -> RunState {
        if self.state.is_running() {
            info!("[MOTION] pause");
            self.state.run_state = RunState::Paused;
        }
        self.state.run_state
    }

    /// Puts every servo at its rest position and pauses.
    ///
    /// Without trim the servos go to the raw mechanical center, which is what
    /// a trim calibration is measured against.
    pub fn center(&mut self, now_ms: u64, with_trim: bool) {
        info!("[MOTION] centering servos (trim: {})", with_trim);
        self.state.run_state = RunState::Paused;
        self.driver.reset_epoch(now_ms);
        self.centered = true;
        for leg in Leg::ALL {
            self.positions[leg] = self.driver.oscillator(leg).vertical_shift();
        }
        let trims = if with_trim { self.state.trims } else { [0; 3] };
        self.write_positions(trims);
    }

    /// Sets the direction and resets the steering angle to 0.
    pub fn set_direction(&mut self, now_ms: u64, direction: Direction) -> Direction {
        self.state.direction = direction;
        self.state.steer_angle_deg = 0;
        self.apply(now_ms);
        direction
    }

    pub fn set_speed(&mut self, now_ms: u64, speed_pct: i32) -> u8 {
        self.state.speed_pct = speed_pct.clamp(0, 100) as u8;
        self.apply(now_ms);
        self.state.speed_pct
    }

    pub fn set_stroke(&mut self, now_ms: u64, stroke_pct: i32) -> u8 {
        self.state.stroke_pct = stroke_pct.clamp(0, 100) as u8;
        self.apply(now_ms);
        self.state.stroke_pct
    }

    /// Sets the steering angle. While rotating the angle stays at 0.
    pub fn set_angle(&mut self, now_ms: u64, angle_deg: i32) -> i8 {
        self.state.steer_angle_deg = if self.state.direction.is_rotation() {
            0
        } else {
            angle_deg.clamp(-90, 90) as i8
        };
        self.apply(now_ms);
        self.state.steer_angle_deg
    }

    pub fn set_trim(&mut self, trims: [i32; 3]) -> [i8; 3] {
        let limit = self.driver.config().trim_limit as i32;
        self.state.trims = trims.map(|t| t.clamp(-limit, limit) as i8);
        info!("[MOTION] trims set to {:?}", self.state.trims);
        self.state.trims
    }

    /// One control cycle. Samples every oscillator and writes the servos while
    /// running; does nothing while paused or at speed 0.
    ///
    /// A failed servo write is logged and the other legs are still written.
    pub fn tick(&mut self, now_ms: u64) -> Option<[f32; 3]> {
        if !self.state.is_running() || self.state.speed_pct == 0 {
            return None;
        }
        self.positions = self.driver.sample(now_ms);
        self.write_positions(self.state.trims);
        Some(self.positions)
    }

    fn write_positions(&mut self, trims: [i8; 3]) {
        for leg in Leg::ALL {
            let angle = self.positions[leg];
            let trim = trims[leg];
            if let Err(e) = self.servos[leg as usize].write(angle, trim) {
                error!("[MOTION] {} leg: {}", leg, e);
            }
        }
    }

    fn apply(&mut self, now_ms: u64) {
        debug!("[MOTION] applying {:?}", self.state);
        self.driver.apply_gait(now_ms, &gait_params(&self.state));
    }

    pub fn record_distance(&mut self, distance_mm: Option<f32>) {
        self.obstacle.record(distance_mm);
    }

    pub fn toggle_obstacle(&mut self) -> bool {
        self.obstacle.toggle()
    }

    pub fn obstacle_report(&mut self, now_ms: u64) -> Option<String<REPLY_LEN>> {
        self.obstacle.report(now_ms)
    }

    pub fn obstacle(&self) -> &ObstacleMonitor {
        &self.obstacle
    }

    pub fn state(&self) -> &GaitState {
        &self.state
    }

    pub fn targets(&self) -> &[LegTarget; 3] {
        self.driver.targets()
    }

    pub fn driver(&self) -> &LegDriver {
        &self.driver
    }

    /// Last angles written to the servos, before trim.
    pub fn positions(&self) -> [f32; 3] {
        self.positions
    }

    pub fn servos(&self) -> &[A; 3] {
        &self.servos
    }
}

fn gait_params(state: &GaitState) -> GaitParams {
    GaitParams {
        direction: state.direction,
        speed_pct: state.speed_pct,
        stroke_pct: state.stroke_pct,
        steer_angle_deg: state.steer_angle_deg,
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::robot::servo::ServoError;
    use approx::assert_abs_diff_eq;
    use embedded_hal::pwm::ErrorKind;
    use std::vec::Vec;

    #[derive(Default)]
    struct Recorder {
        writes: Vec<(f32, i8)>,
        fail: bool,
    }

    impl Actuator for Recorder {
        fn write(&mut self, angle: f32, trim: i8) -> Result<(), ServoError> {
            if self.fail {
                return Err(ServoError::Pwm(ErrorKind::Other));
            }
            self.writes.push((angle, trim));
            Ok(())
        }
    }

    fn controller() -> MotionController<Recorder> {
        MotionController::new(MotionConfig::new(), Default::default(), [0, 0, 0], 0)
    }

    fn write_count(ctl: &MotionController<Recorder>) -> usize {
        ctl.servos().iter().map(|s| s.writes.len()).sum()
    }

    #[test]
    fn paused_tick_is_a_no_op() {
        let mut ctl = controller();
        assert_eq!(ctl.tick(100), None);
        assert_eq!(write_count(&ctl), 0);
    }

    #[test]
    fn running_tick_writes_every_leg() {
        let mut ctl = controller();
        ctl.run(0);
        let positions = ctl.tick(500).unwrap();
        assert_eq!(write_count(&ctl), 3);
        assert_eq!(ctl.servos()[1].writes[0].0, positions[Leg::Mid]);
    }

    #[test]
    fn speed_zero_holds_position() {
        let mut ctl = controller();
        ctl.run(0);
        assert_eq!(ctl.set_speed(0, 0), 0);
        assert_eq!(ctl.tick(20), None);
        assert_eq!(ctl.state().run_state, RunState::Running);
    }

    #[test]
    fn numeric_input_is_clamped() {
        let mut ctl = controller();
        assert_eq!(ctl.set_speed(0, 150), 100);
        assert_eq!(ctl.set_speed(0, -5), 0);
        assert_eq!(ctl.set_stroke(0, 101), 100);
        assert_eq!(ctl.set_angle(0, -200), -90);
        assert_eq!(ctl.set_trim([20, -3, -11]), [10, -3, -10]);
    }

    #[test]
    fn direction_change_resets_the_angle() {
        let mut ctl = controller();
        ctl.set_angle(0, 45);
        assert_eq!(ctl.state().steer_angle_deg, 45);
        ctl.set_direction(0, Direction::Reverse);
        assert_eq!(ctl.state().steer_angle_deg, 0);
    }

    #[test]
    fn angle_is_held_at_zero_while_rotating() {
        let mut ctl = controller();
        ctl.set_direction(0, Direction::RotateLeft);
        assert_eq!(ctl.set_angle(0, 30), 0);
        assert_eq!(ctl.targets().map(|t| t.phase_shift_deg), [180, 90, 0]);
    }

    #[test]
    fn center_writes_trimmed_rest_position_and_pauses() {
        let mut ctl = controller();
        ctl.set_trim([2, -1, 3]);
        ctl.run(0);
        ctl.tick(300);
        ctl.center(400, true);
        assert_eq!(ctl.state().run_state, RunState::Paused);
        for (servo, trim) in ctl.servos().iter().zip([2, -1, 3]) {
            assert_eq!(servo.writes.last(), Some(&(0.0, trim)));
        }
        assert_eq!(ctl.positions(), [0.0; 3]);
    }

    #[test]
    fn center_without_trim_goes_to_the_mechanical_center() {
        let mut ctl = controller();
        ctl.set_trim([4, -6, 2]);
        ctl.center(0, false);
        for servo in ctl.servos() {
            assert_eq!(servo.writes.last(), Some(&(0.0, 0)));
        }
        // trims are kept for the next run
        assert_eq!(ctl.state().trims, [4, -6, 2]);
        ctl.run(0);
        ctl.tick(20);
        assert_eq!(ctl.servos()[0].writes.last().map(|w| w.1), Some(4));
    }

    #[test]
    fn run_after_center_eases_in_from_rest() {
        let mut ctl = controller();
        ctl.set_speed(0, 100);
        ctl.center(1000, true);
        ctl.run(1000);
        let first = ctl.tick(1020).unwrap();
        let period = ctl.targets()[0].period_ms as u64;
        assert!(first[Leg::Left].abs() < 2.0);
        let settled = ctl.tick(1000 + 4 * period + period / 4).unwrap();
        assert_abs_diff_eq!(settled[Leg::Left], 29.0, epsilon = 0.2);
    }

    #[test]
    fn failing_servo_does_not_stop_the_tick() {
        let mut servos: [Recorder; 3] = Default::default();
        servos[0].fail = true;
        let mut ctl = MotionController::new(MotionConfig::new(), servos, [0, 0, 0], 0);
        ctl.run(0);
        assert!(ctl.tick(20).is_some());
        assert!(ctl.tick(40).is_some());
        assert_eq!(ctl.servos()[1].writes.len(), 2);
        assert_eq!(ctl.servos()[2].writes.len(), 2);
    }

    #[test]
    fn initial_trims_are_clamped() {
        let ctl: MotionController<Recorder> =
            MotionController::new(MotionConfig::new(), Default::default(), [50, 0, -50], 0);
        assert_eq!(ctl.state().trims, [10, 0, -10]);
    }
}
