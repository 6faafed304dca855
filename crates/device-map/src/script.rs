//! Line-oriented command scripts that drive a [`DeviceMapSession`].
//!
//! Each non-blank line is one command. Lines starting with `#` are comments.
//!
//! ```text
//! zoom-in | zoom-out | reset | filters | legend | fit-all | show
//! dblclick <lat> <lng>
//! drag <id> <lat> <lng>
//! toggle-model <basic|advanced|special>
//! toggle-status <on|off>
//! native <lat> <lng> <zoom>
//! ```
//!
//! `native` accepts a fractional zoom and rounds it to the nearest step.

use std::io::{BufRead, Write};
use std::str::{FromStr, SplitWhitespace};

use thiserror::Error;
use tracing::debug;

use crate::app::{DeviceMapSession, DispatchOutcome, MapEvent};
use crate::device::{
    BlankDeviceIdError, DeviceId, DeviceModel, DeviceStatus, ParseDeviceModelError,
    ParseDeviceStatusError,
};
use crate::geometry::Coordinate;
use crate::view::{ViewportSink, ZoomLevel};

/// A parsed script line.
#[derive(Debug, Clone, PartialEq)]
pub enum MapCommand {
    /// Dispatch an event to the session.
    Dispatch(MapEvent),
    /// Write a snapshot of the session.
    Show,
}

/// Errors raised while parsing a single command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The command word is not recognised.
    #[error("unknown command '{name}'")]
    Unknown {
        /// The unrecognised word.
        name: String,
    },
    /// A required argument is absent.
    #[error("'{command}' is missing its {argument} argument")]
    MissingArgument {
        /// Command being parsed.
        command: &'static str,
        /// Name of the missing argument.
        argument: &'static str,
    },
    /// More arguments than the command accepts.
    #[error("'{command}' does not accept the extra argument '{extra}'")]
    UnexpectedArgument {
        /// Command being parsed.
        command: &'static str,
        /// First surplus token.
        extra: String,
    },
    /// An argument is not a number.
    #[error("{argument} must be a number, found '{value}'")]
    InvalidNumber {
        /// Name of the argument.
        argument: &'static str,
        /// The rejected token.
        value: String,
    },
    /// Unknown model name.
    #[error(transparent)]
    Model(#[from] ParseDeviceModelError),
    /// Unknown status name.
    #[error(transparent)]
    Status(#[from] ParseDeviceStatusError),
    /// Blank device identifier.
    #[error(transparent)]
    DeviceId(#[from] BlankDeviceIdError),
}

/// Errors raised while running a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// A line could not be parsed.
    #[error("line {line}: {source}")]
    Command {
        /// One-based line number.
        line: usize,
        /// Underlying parse failure.
        #[source]
        source: CommandError,
    },
    /// Reading the script or writing output failed.
    #[error("script I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// A snapshot could not be serialised.
    #[error("failed to write snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Counts of what a script run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptReport {
    /// Events that changed state.
    pub applied: usize,
    /// Events that had no effect.
    pub ignored: usize,
    /// Snapshots written.
    pub snapshots: usize,
}

/// Parses one script line.
///
/// Returns `Ok(None)` for blank lines and comments.
///
/// # Errors
///
/// Returns [`CommandError`] for malformed commands.
///
/// # Examples
///
/// ```
/// use device_map::{Coordinate, MapCommand, MapEvent, parse_command};
///
/// let command = parse_command("dblclick 40.0 -74.0").expect("valid command");
/// assert_eq!(
///     command,
///     Some(MapCommand::Dispatch(MapEvent::DoubleClick {
///         at: Coordinate::new(40.0, -74.0)
///     }))
/// );
/// assert_eq!(parse_command("  # comment"), Ok(None));
/// ```
pub fn parse_command(line: &str) -> Result<Option<MapCommand>, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let mut words = trimmed.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let command = match name {
        "zoom-in" => Args::new("zoom-in", words).event(MapEvent::ZoomIn)?,
        "zoom-out" => Args::new("zoom-out", words).event(MapEvent::ZoomOut)?,
        "reset" => Args::new("reset", words).event(MapEvent::Reset)?,
        "filters" => Args::new("filters", words).event(MapEvent::ToggleFilterPanel)?,
        "legend" => Args::new("legend", words).event(MapEvent::ToggleLegend)?,
        "fit-all" => Args::new("fit-all", words).event(MapEvent::FitAll)?,
        "show" => {
            Args::new("show", words).end()?;
            MapCommand::Show
        }
        "dblclick" => {
            let mut args = Args::new("dblclick", words);
            let at = args.coordinate()?;
            args.event(MapEvent::DoubleClick { at })?
        }
        "drag" => {
            let mut args = Args::new("drag", words);
            let device_id = DeviceId::new(args.word("id")?)?;
            let position = args.coordinate()?;
            args.event(MapEvent::DragEnd {
                device_id,
                position,
            })?
        }
        "toggle-model" => {
            let mut args = Args::new("toggle-model", words);
            let model = args.word("model")?.parse::<DeviceModel>()?;
            args.event(MapEvent::ToggleModel(model))?
        }
        "toggle-status" => {
            let mut args = Args::new("toggle-status", words);
            let status = args.word("status")?.parse::<DeviceStatus>()?;
            args.event(MapEvent::ToggleStatus(status))?
        }
        "native" => {
            let mut args = Args::new("native", words);
            let center = args.coordinate()?;
            let zoom = args.zoom()?;
            args.event(MapEvent::NativeViewport { center, zoom })?
        }
        other => {
            return Err(CommandError::Unknown {
                name: other.to_owned(),
            });
        }
    };
    Ok(Some(command))
}

/// Remaining words of one command line.
struct Args<'a> {
    command: &'static str,
    words: SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    const fn new(command: &'static str, words: SplitWhitespace<'a>) -> Self {
        Self { command, words }
    }

    fn word(&mut self, argument: &'static str) -> Result<&'a str, CommandError> {
        self.words.next().ok_or(CommandError::MissingArgument {
            command: self.command,
            argument,
        })
    }

    fn parsed<T: FromStr>(&mut self, argument: &'static str) -> Result<T, CommandError> {
        let raw = self.word(argument)?;
        raw.parse::<T>().map_err(|_| CommandError::InvalidNumber {
            argument,
            value: raw.to_owned(),
        })
    }

    fn coordinate(&mut self) -> Result<Coordinate, CommandError> {
        let lat = self.parsed("lat")?;
        let lng = self.parsed("lng")?;
        Ok(Coordinate::new(lat, lng))
    }

    fn zoom(&mut self) -> Result<ZoomLevel, CommandError> {
        let raw = self.word("zoom")?;
        raw.parse::<f64>()
            .ok()
            .and_then(ZoomLevel::from_fractional)
            .ok_or_else(|| CommandError::InvalidNumber {
                argument: "zoom",
                value: raw.to_owned(),
            })
    }

    fn end(mut self) -> Result<(), CommandError> {
        self.words.next().map_or(Ok(()), |extra| {
            Err(CommandError::UnexpectedArgument {
                command: self.command,
                extra: extra.to_owned(),
            })
        })
    }

    fn event(self, event: MapEvent) -> Result<MapCommand, CommandError> {
        self.end()?;
        Ok(MapCommand::Dispatch(event))
    }
}

/// Runs every command in `reader` against `session`.
///
/// Each `show` writes the session snapshot as one line of JSON to `writer`.
/// Execution stops at the first malformed line.
///
/// # Errors
///
/// Returns [`ScriptError`] for malformed lines and I/O failures.
pub fn run_script<S, R, W>(
    session: &mut DeviceMapSession<S>,
    reader: R,
    mut writer: W,
) -> Result<ScriptReport, ScriptError>
where
    S: ViewportSink,
    R: BufRead,
    W: Write,
{
    let mut report = ScriptReport::default();
    for (index, line) in reader.lines().enumerate() {
        let text = line?;
        let parsed = parse_command(&text).map_err(|source| ScriptError::Command {
            line: index.saturating_add(1),
            source,
        })?;
        match parsed {
            None => {}
            Some(MapCommand::Show) => {
                serde_json::to_writer(&mut writer, &session.snapshot())?;
                writeln!(writer)?;
                report.snapshots = report.snapshots.saturating_add(1);
            }
            Some(MapCommand::Dispatch(event)) => match session.dispatch(event) {
                DispatchOutcome::Applied => report.applied = report.applied.saturating_add(1),
                DispatchOutcome::Ignored => {
                    debug!(line = index.saturating_add(1), "command had no effect");
                    report.ignored = report.ignored.saturating_add(1);
                }
            },
        }
    }
    writer.flush()?;
    Ok(report)
}
