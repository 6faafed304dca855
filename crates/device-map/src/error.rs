//! Error types for device data ingestion.
//!
//! Loading device data is the only fallible step in the core. Every variant
//! below means "device data unavailable": callers surface it as a terminal
//! state and never retry automatically.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::geometry::CoordinateError;

/// Message shown to the user when device data cannot be loaded.
pub const DEVICE_DATA_UNAVAILABLE: &str = "Failed to load device data. Please try again later.";

/// Errors raised while reading or validating device data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeviceDataError {
    /// The device file could not be read.
    #[error("failed to read device data at '{path}': {message}")]
    Io {
        /// Path to the device file.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The device JSON is malformed or missing required fields.
    #[error("invalid device JSON: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
    },

    /// A record carries a coordinate refused by the ingestion policy.
    #[error("device '{device_id}' has an invalid coordinate: {source}")]
    InvalidCoordinate {
        /// Identifier of the offending record.
        device_id: String,
        /// Underlying coordinate error.
        #[source]
        source: CoordinateError,
    },

    /// A record is structurally invalid, such as a blank id.
    #[error("invalid device record at {location}: {reason}")]
    InvalidRecord {
        /// Position of the record, for example `devices[2].children[0]`.
        location: String,
        /// Why the record was rejected.
        reason: String,
    },

    /// Two records in the tree share an identifier.
    #[error("duplicate device identifier '{device_id}'")]
    DuplicateId {
        /// The repeated identifier.
        device_id: String,
    },
}

impl DeviceDataError {
    /// Returns the terminal, user-facing message for every load failure.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        DEVICE_DATA_UNAVAILABLE
    }
}
