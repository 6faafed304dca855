//! Drive the device map from a command script.
//!
//! The binary stands in for the map widget: it loads device data, applies one
//! script command per line, and prints a JSON snapshot for every `show`.
//!
//! # Examples
//! ```sh
//! printf 'toggle-status off\nshow\n' | cargo run -p device-map -- --devices crates/device-map/fixtures/devices.json
//! ```

use std::ffi::OsString;
use std::io::{self, BufReader, Write};
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use device_map::{
    DeviceDataError, DeviceMapSession, JsonFileDeviceSource, LoadState, MapSettings,
    RecordingViewport, ScriptError, ScriptReport, SettingsError, run_script,
};
use ortho_config::OrthoConfig;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `device-map` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "device-map",
    about = "Replay map interactions against a device fleet and print snapshots",
    version
)]
struct CliArgs {
    /// Device data file. Overrides `DEVICE_MAP_DEVICES_PATH`.
    #[arg(long = "devices", value_name = "path")]
    devices: Option<Utf8PathBuf>,
    /// Command script. Reads standard input when omitted.
    #[arg(long = "script", value_name = "path")]
    script: Option<Utf8PathBuf>,
}

/// Failures surfaced to the user.
#[derive(Debug, Error)]
enum RunError {
    #[error("failed to load settings: {0}")]
    LoadSettings(String),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("{}", .0.user_message())]
    DeviceData(DeviceDataError),
    #[error("failed to open script '{path}': {source}")]
    OpenScript {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Script(#[from] ScriptError),
}

fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    match run(&args, io::stdout().lock()) {
        Ok(report) => {
            info!(
                applied = report.applied,
                ignored = report.ignored,
                snapshots = report.snapshots,
                "script finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            if let Err(write_err) = writeln!(io::stderr().lock(), "{err}") {
                drop(write_err);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs, out: impl Write) -> Result<ScriptReport, RunError> {
    let settings = MapSettings::load_from_iter([OsString::from("device-map")])
        .map_err(|e| RunError::LoadSettings(e.to_string()))?;
    let mut config = settings.resolve()?;
    if let Some(path) = &args.devices {
        config.devices_path.clone_from(path);
    }

    let source = JsonFileDeviceSource::new(config.devices_path.clone(), config.coordinate_policy);
    let store = LoadState::load(&source).map_err(RunError::DeviceData)?;

    let mut session = DeviceMapSession::new(store, &config, RecordingViewport::default());
    let report = match &args.script {
        Some(path) => run_script(&mut session, open_script(path)?, out)?,
        None => run_script(&mut session, io::stdin().lock(), out)?,
    };
    Ok(report)
}

fn open_script(path: &Utf8Path) -> Result<BufReader<cap_std::fs::File>, RunError> {
    let to_error = |source: io::Error| RunError::OpenScript {
        path: path.to_path_buf(),
        source,
    };
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        to_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "script path must name a file",
        ))
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(to_error)?;
    let file = dir.open(file_name).map_err(to_error)?;
    Ok(BufReader::new(file))
}
