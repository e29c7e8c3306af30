use core::fmt::{self, Display, Formatter};

use crate::config::{
    SERVO_ANGLE_RANGE, SERVO_CENTER_DEG, SERVO_FREQUENCY_HZ, SERVO_MAX_PULSE_US,
    SERVO_MIN_PULSE_US, SERVO_SAFE_MAX_DEG, SERVO_SAFE_MIN_DEG,
};
use crate::robot::leg::Leg;
use embedded_hal::pwm::{Error as _, ErrorKind, SetDutyCycle};
use fugit::HertzU32;
use micromath::F32Ext;

/// A failed actuator write. Not logged here; the control loop logs it with
/// the leg and keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoError {
    Pwm(ErrorKind),
}

impl Display for ServoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ServoError::Pwm(kind) => write!(f, "pwm write failed: {kind:?}"),
        }
    }
}

/// Anything that can put a leg at an angle.
///
/// `angle` is the offset from the mechanical center in degrees as produced by
/// the oscillators, `trim` the leg's calibration offset.
pub trait Actuator {
    fn write(&mut self, angle: f32, trim: i8) -> Result<(), ServoError>;
}

/// Hobby servo on a PWM channel.
#[derive(Debug)]
pub struct Servo<PWM> {
    pwm: PWM,
    duty: Option<u16>,
    max_duty: u16,
    frequency: HertzU32,
    min_angle: f32,
    max_angle: f32,
    leg_id: Leg,
}

impl<PWM> Servo<PWM>
where
    PWM: SetDutyCycle,
{
    pub fn new(pwm: PWM, leg_id: Leg) -> Self {
        let max_duty = pwm.max_duty_cycle();
        Self {
            pwm,
            duty: None,
            max_duty,
            frequency: HertzU32::from_raw(SERVO_FREQUENCY_HZ),
            min_angle: SERVO_SAFE_MIN_DEG,
            max_angle: SERVO_SAFE_MAX_DEG,
            leg_id,
        }
    }

    /// Narrows or widens the hard angle limits (0–180 at most).
    pub fn with_limits(mut self, min_angle: f32, max_angle: f32) -> Self {
        self.min_angle = min_angle.clamp(0.0, SERVO_ANGLE_RANGE);
        self.max_angle = max_angle.clamp(self.min_angle, SERVO_ANGLE_RANGE);
        self
    }

    /// Physical angle for an oscillator output plus trim, clamped to the
    /// limits. Non-finite input is treated as center.
    pub fn physical_angle(&self, angle: f32, trim: i8) -> f32 {
        let target = SERVO_CENTER_DEG + angle + trim as f32;
        let target = if target.is_finite() {
            target
        } else {
            SERVO_CENTER_DEG
        };
        target.clamp(self.min_angle, self.max_angle)
    }

    /// Duty value for a physical angle.
    ///
    /// THE WIDTH OF THE PULSE DRIVES THE ANGLE, NOT FREQ
    pub fn duty_for(&self, angle: f32) -> u16 {
        let pulse_width_range = SERVO_MAX_PULSE_US - SERVO_MIN_PULSE_US;
        let pulse_us = SERVO_MIN_PULSE_US + (angle / SERVO_ANGLE_RANGE) * pulse_width_range;
        let period_us = 1_000_000.0 / self.frequency.raw() as f32;
        let duty = (pulse_us / period_us) * self.max_duty as f32;
        duty.round().clamp(0.0, self.max_duty as f32) as u16
    }

    pub fn leg(&self) -> Leg {
        self.leg_id
    }

    pub fn last_duty(&self) -> Option<u16> {
        self.duty
    }

    pub fn into_inner(self) -> PWM {
        self.pwm
    }
}

impl<PWM> Actuator for Servo<PWM>
where
    PWM: SetDutyCycle,
{
    fn write(&mut self, angle: f32, trim: i8) -> Result<(), ServoError> {
        let duty = self.duty_for(self.physical_angle(angle, trim));

        //Avoid setting the same duty again
        if self.duty == Some(duty) {
            return Ok(());
        }
        self.pwm
            .set_duty_cycle(duty)
            .map_err(|e| ServoError::Pwm(e.kind()))?;
        self.duty = Some(duty);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use embedded_hal::pwm::ErrorType;
    use std::vec::Vec;

    struct FakePwm {
        max: u16,
        fail: bool,
        writes: Vec<u16>,
    }

    impl FakePwm {
        fn new(max: u16) -> Self {
            Self {
                max,
                fail: false,
                writes: Vec::new(),
            }
        }
    }

    impl ErrorType for FakePwm {
        type Error = ErrorKind;
    }

    impl SetDutyCycle for FakePwm {
        fn max_duty_cycle(&self) -> u16 {
            self.max
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            self.writes.push(duty);
            Ok(())
        }
    }

    #[test]
    fn center_maps_to_mid_pulse() {
        let mut servo = Servo::new(FakePwm::new(20_000), Leg::Mid);
        servo.write(0.0, 0).unwrap();
        // 90° -> 1472 µs out of a 20000 µs frame
        assert_eq!(servo.last_duty(), Some(1472));
    }

    #[test]
    fn trim_is_added_to_the_angle() {
        let servo = Servo::new(FakePwm::new(4095), Leg::Left);
        assert_eq!(servo.physical_angle(10.0, -3), 97.0);
    }

    #[test]
    fn output_is_clamped_to_the_safe_range() {
        let servo = Servo::new(FakePwm::new(4095), Leg::Right);
        assert_eq!(servo.physical_angle(500.0, 10), SERVO_SAFE_MAX_DEG);
        assert_eq!(servo.physical_angle(-500.0, -10), SERVO_SAFE_MIN_DEG);
        assert_eq!(servo.physical_angle(f32::NAN, 0), SERVO_CENTER_DEG);
        assert_eq!(servo.physical_angle(f32::INFINITY, 0), SERVO_CENTER_DEG);

        let wide = Servo::new(FakePwm::new(4095), Leg::Right).with_limits(-20.0, 400.0);
        assert_eq!(wide.physical_angle(500.0, 0), 180.0);
        assert_eq!(wide.physical_angle(-500.0, 0), 0.0);
    }

    #[test]
    fn duty_never_exceeds_the_pwm_maximum() {
        let servo = Servo::new(FakePwm::new(100), Leg::Left);
        assert!(servo.duty_for(180.0) <= 100);
        assert_eq!(servo.duty_for(0.0), 3);
    }

    #[test]
    fn repeated_writes_are_skipped() {
        let mut servo = Servo::new(FakePwm::new(20_000), Leg::Left);
        servo.write(5.0, 0).unwrap();
        servo.write(5.0, 0).unwrap();
        servo.write(6.0, 0).unwrap();
        assert_eq!(servo.into_inner().writes.len(), 2);
    }

    #[test]
    fn pwm_failure_is_reported() {
        let mut pwm = FakePwm::new(20_000);
        pwm.fail = true;
        let mut servo = Servo::new(pwm, Leg::Mid);
        assert_eq!(servo.write(0.0, 0), Err(ServoError::Pwm(ErrorKind::Other)));
        assert_eq!(servo.last_duty(), None);
    }

    #[test]
    fn failed_write_is_retried_on_the_next_call() {
        let mut pwm = FakePwm::new(20_000);
        pwm.fail = true;
        let mut servo = Servo::new(pwm, Leg::Right);
        assert!(servo.write(0.0, 0).is_err());

        servo.pwm.fail = false;
        assert_eq!(servo.write(0.0, 0), Ok(()));
        assert_eq!(servo.last_duty(), Some(1472));
        assert_eq!(servo.leg(), Leg::Right);
        assert_eq!(servo.into_inner().writes, [1472]);
    }
}
