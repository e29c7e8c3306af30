//! Control loop task.
//!
//! Owns the motion controller. Every tick it drains the command queue, samples
//! the oscillators and writes the servos, then forwards any obstacle report.
//! Nothing in here awaits anything but the ticker.
use crate::config::{MotionConfig, DEFAULT_TRIMS, TICK_MS};
use crate::protocol::Dispatcher;
use crate::robot::controller::MotionController;
use crate::tasks::servos::LegServo;
use crate::{COMMANDS, REPLIES};
use embassy_time::{Duration, Instant, Ticker};
use log::{debug, info, warn};

fn now_ms() -> u64 {
    Instant::now().as_millis()
}

fn heap_usage() -> (usize, usize) {
    (esp_alloc::HEAP.used(), esp_alloc::HEAP.free())
}

#[embassy_executor::task]
pub async fn motion_task(servos: [LegServo; 3]) {
    let dispatcher = Dispatcher::new().with_memory_probe(heap_usage);
    let mut ctl = MotionController::new(MotionConfig::new(), servos, DEFAULT_TRIMS, now_ms());
    ctl.center(now_ms(), true);
    info!("[MOTION_TASK] started, tick every {TICK_MS} ms");

    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));
    loop {
        let now = now_ms();
        let handled = dispatcher.drain(&COMMANDS, &REPLIES, &mut ctl, now);
        if handled > 0 {
            debug!("[MOTION_TASK] applied {handled} command(s)");
        }

        ctl.tick(now);

        if let Some(report) = ctl.obstacle_report(now) {
            if REPLIES.try_send(report).is_err() {
                warn!("[MOTION_TASK] reply channel full, dropping obstacle report");
            }
        }
        ticker.next().await;
    }
}
