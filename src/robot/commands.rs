//! Command types for robot control and inter-task communication.
//!
//! Inbound messages have the form `action[:args]`. They are parsed into a
//! [`Command`] by the network task and queued for the motion task, which owns
//! the controller. Parsing only rejects malformed input; out-of-range numbers
//! are kept and clamped by the controller.
use core::fmt::{self, Display, Formatter};

use super::state::{Direction, RunState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimRequest {
    /// `[left, mid, right]`, not yet clamped.
    pub trims: [i32; 3],
    pub center: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Motion(RunState),
    Direction(Direction),
    Speed(i32),
    Angle(i32),
    Stroke(i32),
    /// `None` asks for the current trims.
    Trim(Option<TrimRequest>),
    /// Whether the trims are applied to the rest position.
    Center(bool),
    ToggleObstacle,
    Params,
    Version,
    Memory,
    Ping,
    Pong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseCommandError {
    Empty,
    UnknownAction,
    MissingArgument(&'static str),
    InvalidNumber(&'static str),
    InvalidValue(&'static str),
    TrimFieldCount,
    LineTooLong,
    InvalidUtf8,
}

impl Display for ParseCommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParseCommandError::Empty => f.write_str("empty message"),
            ParseCommandError::UnknownAction => f.write_str("unknown action"),
            ParseCommandError::MissingArgument(action) => write!(f, "{action} needs an argument"),
            ParseCommandError::InvalidNumber(action) => {
                write!(f, "{action} value is not an integer")
            }
            ParseCommandError::InvalidValue(action) => write!(f, "invalid {action} value"),
            ParseCommandError::TrimFieldCount => {
                f.write_str("trim expects left:mid:right[:center]")
            }
            ParseCommandError::LineTooLong => f.write_str("line too long"),
            ParseCommandError::InvalidUtf8 => f.write_str("line is not valid utf-8"),
        }
    }
}

/// Parses a signed integer, saturating values that do not fit an `i32`.
fn parse_number(action: &'static str, arg: &str) -> Result<i32, ParseCommandError> {
    let value = arg
        .trim()
        .parse::<i64>()
        .map_err(|_| ParseCommandError::InvalidNumber(action))?;
    Ok(value.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
}

fn parse_trim(args: &str) -> Result<TrimRequest, ParseCommandError> {
    let mut fields = [""; 4];
    let mut count = 0;
    for field in args.split(':') {
        if count == fields.len() {
            return Err(ParseCommandError::TrimFieldCount);
        }
        fields[count] = field;
        count += 1;
    }
    let center = match count {
        3 => false,
        4 => match fields[3].trim() {
            "true" => true,
            "false" => false,
            _ => return Err(ParseCommandError::InvalidValue("trim center")),
        },
        _ => return Err(ParseCommandError::TrimFieldCount),
    };

    let mut trims = [0; 3];
    for (trim, field) in trims.iter_mut().zip(fields) {
        *trim = parse_number("trim", field)?;
    }
    Ok(TrimRequest { trims, center })
}

impl TryFrom<&str> for Command {
    type Error = ParseCommandError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ParseCommandError::Empty);
        }
        let (action, args) = match value.split_once(':') {
            Some((action, args)) => (action, Some(args)),
            None => (value, None),
        };
        let required = |name: &'static str| {
            args.filter(|a| !a.trim().is_empty())
                .ok_or(ParseCommandError::MissingArgument(name))
        };

        match action {
            "motion" => RunState::from_keyword(required("motion")?.trim())
                .map(Command::Motion)
                .ok_or(ParseCommandError::InvalidValue("motion")),
            "dir" => Direction::from_keyword(required("dir")?.trim())
                .map(Command::Direction)
                .ok_or(ParseCommandError::InvalidValue("dir")),
            "speed" => Ok(Command::Speed(parse_number("speed", required("speed")?)?)),
            "angle" => Ok(Command::Angle(parse_number("angle", required("angle")?)?)),
            "stroke" => Ok(Command::Stroke(parse_number("stroke", required("stroke")?)?)),
            "trim" => match args {
                None => Ok(Command::Trim(None)),
                Some(args) => Ok(Command::Trim(Some(parse_trim(args)?))),
            },
            "center" => match args.map(str::trim) {
                None | Some("") | Some("true") => Ok(Command::Center(true)),
                Some("false") => Ok(Command::Center(false)),
                Some(_) => Err(ParseCommandError::InvalidValue("center")),
            },
            "obst" => match required("obst")?.trim() {
                "toggle" => Ok(Command::ToggleObstacle),
                _ => Err(ParseCommandError::InvalidValue("obst")),
            },
            "params" => Ok(Command::Params),
            "version" => Ok(Command::Version),
            "memory" => Ok(Command::Memory),
            "ping" => Ok(Command::Ping),
            "pong" => Ok(Command::Pong),
            _ => Err(ParseCommandError::UnknownAction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_action() {
        assert_eq!(
            Command::try_from("motion:run"),
            Ok(Command::Motion(RunState::Running))
        );
        assert_eq!(
            Command::try_from("motion:pause"),
            Ok(Command::Motion(RunState::Paused))
        );
        assert_eq!(
            Command::try_from("dir:rotl"),
            Ok(Command::Direction(Direction::RotateLeft))
        );
        assert_eq!(Command::try_from("speed:50"), Ok(Command::Speed(50)));
        assert_eq!(Command::try_from("angle:-30"), Ok(Command::Angle(-30)));
        assert_eq!(Command::try_from("stroke: 70 "), Ok(Command::Stroke(70)));
        assert_eq!(Command::try_from("center"), Ok(Command::Center(true)));
        assert_eq!(Command::try_from("center:false"), Ok(Command::Center(false)));
        assert_eq!(Command::try_from("obst:toggle"), Ok(Command::ToggleObstacle));
        assert_eq!(Command::try_from("params"), Ok(Command::Params));
        assert_eq!(Command::try_from("version\r\n"), Ok(Command::Version));
        assert_eq!(Command::try_from("memory"), Ok(Command::Memory));
        assert_eq!(Command::try_from("ping"), Ok(Command::Ping));
        assert_eq!(Command::try_from("pong"), Ok(Command::Pong));
    }

    #[test]
    fn out_of_range_numbers_are_kept_for_clamping() {
        assert_eq!(Command::try_from("speed:150"), Ok(Command::Speed(150)));
        assert_eq!(
            Command::try_from("speed:99999999999"),
            Ok(Command::Speed(i32::MAX))
        );
    }

    #[test]
    fn parses_trims_with_optional_center() {
        assert_eq!(
            Command::try_from("trim:1:-2:3"),
            Ok(Command::Trim(Some(TrimRequest {
                trims: [1, -2, 3],
                center: false
            })))
        );
        assert_eq!(
            Command::try_from("trim:0:5:0:true"),
            Ok(Command::Trim(Some(TrimRequest {
                trims: [0, 5, 0],
                center: true
            })))
        );
        assert_eq!(Command::try_from("trim"), Ok(Command::Trim(None)));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(
            Command::try_from("trim:abc:0:0"),
            Err(ParseCommandError::InvalidNumber("trim"))
        );
        assert_eq!(
            Command::try_from("trim:1:2"),
            Err(ParseCommandError::TrimFieldCount)
        );
        assert_eq!(
            Command::try_from("trim:1:2:3:4:5"),
            Err(ParseCommandError::TrimFieldCount)
        );
        assert_eq!(
            Command::try_from("trim:1:2:3:yes"),
            Err(ParseCommandError::InvalidValue("trim center"))
        );
        assert_eq!(
            Command::try_from("speed:fast"),
            Err(ParseCommandError::InvalidNumber("speed"))
        );
        assert_eq!(
            Command::try_from("speed"),
            Err(ParseCommandError::MissingArgument("speed"))
        );
        assert_eq!(
            Command::try_from("dir:up"),
            Err(ParseCommandError::InvalidValue("dir"))
        );
        assert_eq!(
            Command::try_from("center:raw"),
            Err(ParseCommandError::InvalidValue("center"))
        );
        assert_eq!(
            Command::try_from("jump"),
            Err(ParseCommandError::UnknownAction)
        );
        assert_eq!(Command::try_from("  "), Err(ParseCommandError::Empty));
    }
}
