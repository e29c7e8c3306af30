//! Text protocol between clients and the motion controller.
//!
//! Turns parsed [`Command`]s into controller calls and encodes the resulting
//! state as `action:value` replies (or `err:<message>`). The channels defined
//! here connect the network task to the motion task; commands are drained
//! between ticks so every command is applied as a whole.
use core::fmt::{self, Write};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::{String, Vec};
use log::{info, warn};

use crate::config::{CMD_CHANNEL_SIZE, REPLY_CHANNEL_SIZE, REPLY_LEN};
use crate::robot::commands::{Command, ParseCommandError, TrimRequest};
use crate::robot::controller::MotionController;
use crate::robot::servo::Actuator;
use crate::robot::state::RunState;

pub type Reply = String<REPLY_LEN>;
/// A command answers with at most a reply and one follow-up notification.
pub type Replies = Vec<Reply, 2>;
/// One framed inbound line: the command, or why it was rejected. Rejections
/// travel the same queue so every line is answered in order.
pub type Inbound = Result<Command, ParseCommandError>;
pub type CommandChannel = Channel<CriticalSectionRawMutex, Inbound, CMD_CHANNEL_SIZE>;
pub type ReplyChannel = Channel<CriticalSectionRawMutex, Reply, REPLY_CHANNEL_SIZE>;
/// Returns `(used, free)` heap bytes.
pub type MemoryProbe = fn() -> (usize, usize);

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Formats a reply, truncating anything beyond [`REPLY_LEN`].
pub fn reply(args: fmt::Arguments<'_>) -> Reply {
    let mut out = Reply::new();
    let _ = out.write_fmt(args);
    out
}

pub fn error_reply(err: &ParseCommandError) -> Reply {
    reply(format_args!("err:{err}"))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Dispatcher {
    memory_probe: Option<MemoryProbe>,
}

impl Dispatcher {
    pub const fn new() -> Self {
        Self { memory_probe: None }
    }

    pub fn with_memory_probe(mut self, probe: MemoryProbe) -> Self {
        self.memory_probe = Some(probe);
        self
    }

    /// Parses and applies one raw message.
    pub fn handle_message<A: Actuator>(
        &self,
        message: &str,
        ctl: &mut MotionController<A>,
        now_ms: u64,
    ) -> Replies {
        self.handle(Command::try_from(message), ctl, now_ms)
    }

    /// Applies a parsed line, or answers `err:` for a rejected one.
    pub fn handle<A: Actuator>(
        &self,
        inbound: Inbound,
        ctl: &mut MotionController<A>,
        now_ms: u64,
    ) -> Replies {
        match inbound {
            Ok(cmd) => self.dispatch(cmd, ctl, now_ms),
            Err(e) => {
                warn!("[PROTOCOL] rejected line: {}", e);
                single(error_reply(&e))
            }
        }
    }

    /// Applies one command and returns the replies to send back.
    pub fn dispatch<A: Actuator>(
        &self,
        cmd: Command,
        ctl: &mut MotionController<A>,
        now_ms: u64,
    ) -> Replies {
        let mut replies = Replies::new();
        let mut push = |r: Reply| {
            let _ = replies.push(r);
        };

        match cmd {
            Command::Motion(RunState::Running) => {
                push(reply(format_args!("motion:{}", ctl.run(now_ms))));
            }
            Command::Motion(RunState::Paused) => {
                push(reply(format_args!("motion:{}", ctl.pause())));
            }
            Command::Direction(direction) => {
                push(reply(format_args!("dir:{}", ctl.set_direction(now_ms, direction))));
                push(reply(format_args!("angle:{}", ctl.state().steer_angle_deg)));
            }
            Command::Speed(speed) => {
                push(reply(format_args!("speed:{}", ctl.set_speed(now_ms, speed))));
            }
            Command::Angle(angle) => {
                push(reply(format_args!("angle:{}", ctl.set_angle(now_ms, angle))));
            }
            Command::Stroke(stroke) => {
                push(reply(format_args!("stroke:{}", ctl.set_stroke(now_ms, stroke))));
            }
            Command::Trim(request) => {
                if let Some(TrimRequest { trims, center }) = request {
                    ctl.set_trim(trims);
                    if center {
                        ctl.center(now_ms, true);
                    }
                }
                let [left, mid, right] = ctl.state().trims;
                push(reply(format_args!("trim:{left}:{mid}:{right}")));
                if matches!(request, Some(TrimRequest { center: true, .. })) {
                    push(reply(format_args!("motion:{}", ctl.state().run_state)));
                }
            }
            Command::Center(with_trim) => {
                ctl.center(now_ms, with_trim);
                push(reply(format_args!("center")));
                push(reply(format_args!("motion:{}", ctl.state().run_state)));
            }
            Command::ToggleObstacle => {
                let on = ctl.toggle_obstacle();
                push(reply(format_args!("obst:{}", if on { "on" } else { "off" })));
            }
            Command::Params => {
                let state = ctl.state();
                let [left, mid, right] = state.trims;
                push(reply(format_args!(
                    "params:{}:{}:{}:{}:{}:{left}:{mid}:{right}",
                    state.run_state,
                    state.direction,
                    state.speed_pct,
                    state.stroke_pct,
                    state.steer_angle_deg,
                )));
            }
            Command::Version => push(reply(format_args!("version:{VERSION}"))),
            Command::Memory => match self.memory_probe {
                Some(probe) => {
                    let (used, free) = probe();
                    push(reply(format_args!("memory:{used}:{free}")));
                }
                None => push(reply(format_args!("err:memory stats unavailable"))),
            },
            Command::Ping => push(reply(format_args!("pong"))),
            Command::Pong => info!("[PROTOCOL] received pong"),
        }
        replies
    }

    /// Applies every queued command and forwards the replies. A full reply
    /// channel drops the reply instead of blocking the control loop.
    pub fn drain<A: Actuator>(
        &self,
        commands: &CommandChannel,
        outbound: &ReplyChannel,
        ctl: &mut MotionController<A>,
        now_ms: u64,
    ) -> usize {
        let mut handled = 0;
        while let Ok(inbound) = commands.try_receive() {
            for r in self.handle(inbound, ctl, now_ms) {
                if outbound.try_send(r).is_err() {
                    warn!("[PROTOCOL] reply channel full, dropping reply");
                }
            }
            handled += 1;
        }
        handled
    }
}

/// Splits a byte stream into `\n` terminated lines and parses each one.
///
/// Bytes are decoded as UTF-8 only once the line is complete. A line longer
/// than `N` bytes is dropped whole and reported once, at its end.
#[derive(Debug, Default)]
pub struct LineFramer<const N: usize> {
    buf: Vec<u8, N>,
    overflow: bool,
}

impl<const N: usize> LineFramer<N> {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            overflow: false,
        }
    }

    /// Feeds one byte. Returns the parsed line once it is complete; blank
    /// lines yield nothing.
    pub fn push(&mut self, byte: u8) -> Option<Inbound> {
        if byte != b'\n' {
            if !self.overflow && self.buf.push(byte).is_err() {
                self.overflow = true;
            }
            return None;
        }

        let inbound = if self.overflow {
            Some(Err(ParseCommandError::LineTooLong))
        } else {
            match core::str::from_utf8(&self.buf) {
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => Some(Command::try_from(line)),
                Err(_) => Some(Err(ParseCommandError::InvalidUtf8)),
            }
        };
        self.buf.clear();
        self.overflow = false;
        inbound
    }
}

fn single(r: Reply) -> Replies {
    let mut replies = Replies::new();
    let _ = replies.push(r);
    replies
}
