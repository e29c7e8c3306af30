//! LEDC setup for the three leg servos.
extern crate alloc;

use crate::config::SERVO_FREQUENCY_HZ;
use crate::robot::leg::Leg;
use crate::robot::servo::Servo;
use alloc::boxed::Box;
use esp_hal::gpio::AnyPin;
use esp_hal::ledc::channel::{self, Channel, ChannelIFace, Number};
use esp_hal::ledc::timer::{self, LSClockSource, TimerIFace};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
use esp_hal::peripherals::LEDC;
use esp_hal::time::Rate;
use log::info;

pub type LegServo = Servo<Channel<'static, LowSpeed>>;

/// Configures a 50 Hz low speed timer and one channel per leg.
///
/// Pins are given as `[left, mid, right]`.
pub fn configure_leg_servos(ledc: LEDC<'static>, pins: [AnyPin<'static>; 3]) -> [LegServo; 3] {
    info!("Configuring leg servos");
    let ledc = Box::leak(Box::new(Ledc::new(ledc)));
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);

    //Leak the timer to get static lifetime.
    let mut timer = ledc.timer::<LowSpeed>(timer::Number::Timer0);
    timer
        .configure(timer::config::Config {
            duty: timer::config::Duty::Duty14Bit,
            clock_source: LSClockSource::APBClk,
            frequency: Rate::from_hz(SERVO_FREQUENCY_HZ),
        })
        .expect("Fail creating ledc timer");
    let timer: &'static timer::Timer<'static, LowSpeed> = Box::leak(Box::new(timer));

    let [left, mid, right] = pins;
    let wiring = [
        (Leg::Left, Number::Channel0, left),
        (Leg::Mid, Number::Channel1, mid),
        (Leg::Right, Number::Channel2, right),
    ];

    wiring.map(|(leg, number, pin)| {
        let mut channel = ledc.channel::<LowSpeed>(number, pin);
        channel
            .configure(channel::config::Config {
                timer,
                duty_pct: 7,
                pin_config: channel::config::PinConfig::PushPull,
            })
            .expect("Fail configurating leg servo channel");
        Servo::new(channel, leg)
    })
}
