//! Geographic value objects shared by the store, view, and marker modules.
//!
//! Coordinates are plain WGS84 latitude/longitude pairs in degrees. The core
//! never performs projection maths; validation happens once, at ingestion,
//! according to the configured [`CoordinatePolicy`].

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Valid latitude range in degrees.
pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;

/// Valid longitude range in degrees.
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// Errors raised when a coordinate fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    /// The value is `NaN` or infinite.
    #[error("{field} must be a finite number, found {value}")]
    NotFinite {
        /// Name of the offending field (`lat` or `lng`).
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The value lies outside the valid range for its axis.
    #[error("{field} {value} is outside the range {min}..={max}")]
    OutOfRange {
        /// Name of the offending field (`lat` or `lng`).
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
}

/// A latitude/longitude pair in degrees.
///
/// # Examples
///
/// ```
/// use device_map::Coordinate;
///
/// let london = Coordinate::new(51.505, -0.09);
/// assert_eq!(london.lat(), 51.505);
/// assert_eq!(london.lng(), -0.09);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    /// Creates a coordinate without validation.
    ///
    /// Gesture callbacks and drag-end events use this constructor: the map
    /// widget is trusted to report whatever it rendered.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Creates a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] naming the first offending axis.
    ///
    /// # Examples
    ///
    /// ```
    /// use device_map::Coordinate;
    ///
    /// assert!(Coordinate::validated(40.0, -74.0).is_ok());
    /// assert!(Coordinate::validated(91.0, 0.0).is_err());
    /// ```
    pub fn validated(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        check_axis(lat, "lat", &LATITUDE_RANGE)?;
        check_axis(lng, "lng", &LONGITUDE_RANGE)?;
        Ok(Self { lat, lng })
    }

    /// Creates a coordinate, clamping finite values into range.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError::NotFinite`] when either axis is `NaN` or
    /// infinite.
    pub fn clamped(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        check_finite(lat, "lat")?;
        check_finite(lng, "lng")?;
        Ok(Self {
            lat: lat.clamp(*LATITUDE_RANGE.start(), *LATITUDE_RANGE.end()),
            lng: lng.clamp(*LONGITUDE_RANGE.start(), *LONGITUDE_RANGE.end()),
        })
    }

    /// Returns the latitude in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Returns the longitude in degrees.
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

fn check_finite(value: f64, field: &'static str) -> Result<(), CoordinateError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CoordinateError::NotFinite { field, value })
    }
}

fn check_axis(
    value: f64,
    field: &'static str,
    range: &RangeInclusive<f64>,
) -> Result<(), CoordinateError> {
    check_finite(value, field)?;
    if range.contains(&value) {
        Ok(())
    } else {
        Err(CoordinateError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

/// How device coordinates are treated when records are ingested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoordinatePolicy {
    /// Hand coordinates to the renderer unchanged.
    PassThrough,
    /// Fail the load when any coordinate is invalid.
    #[default]
    Reject,
    /// Clamp finite out-of-range values into range; reject non-finite ones.
    Clamp,
}

impl CoordinatePolicy {
    /// Returns the configuration string for the policy.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PassThrough => "pass-through",
            Self::Reject => "reject",
            Self::Clamp => "clamp",
        }
    }

    /// Builds a coordinate from raw record values under this policy.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] when the policy refuses the values.
    pub fn apply(self, lat: f64, lng: f64) -> Result<Coordinate, CoordinateError> {
        match self {
            Self::PassThrough => Ok(Coordinate::new(lat, lng)),
            Self::Reject => Coordinate::validated(lat, lng),
            Self::Clamp => Coordinate::clamped(lat, lng),
        }
    }
}

impl fmt::Display for CoordinatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`CoordinatePolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown coordinate policy: {input}")]
pub struct ParseCoordinatePolicyError {
    /// The unrecognised input value.
    pub input: String,
}

impl FromStr for CoordinatePolicy {
    type Err = ParseCoordinatePolicyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pass-through" => Ok(Self::PassThrough),
            "reject" => Ok(Self::Reject),
            "clamp" => Ok(Self::Clamp),
            _ => Err(ParseCoordinatePolicyError {
                input: value.to_owned(),
            }),
        }
    }
}

/// Axis-aligned geographic bounds used for fit-to-bounds view requests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    south_west: Coordinate,
    north_east: Coordinate,
}

impl Bounds {
    /// Returns the smallest bounds enclosing every supplied coordinate.
    ///
    /// Returns `None` for an empty input.
    ///
    /// # Examples
    ///
    /// ```
    /// use device_map::{Bounds, Coordinate};
    ///
    /// let bounds = Bounds::around([
    ///     Coordinate::new(51.50, -0.12),
    ///     Coordinate::new(51.52, -0.08),
    /// ])
    /// .expect("non-empty input");
    ///
    /// assert_eq!(bounds.south_west(), Coordinate::new(51.50, -0.12));
    /// assert_eq!(bounds.north_east(), Coordinate::new(51.52, -0.08));
    /// ```
    pub fn around<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        points.into_iter().fold(None, |acc, point| {
            Some(acc.map_or(
                Self {
                    south_west: point,
                    north_east: point,
                },
                |bounds| bounds.extended(point),
            ))
        })
    }

    fn extended(self, point: Coordinate) -> Self {
        Self {
            south_west: Coordinate::new(
                self.south_west.lat.min(point.lat),
                self.south_west.lng.min(point.lng),
            ),
            north_east: Coordinate::new(
                self.north_east.lat.max(point.lat),
                self.north_east.lng.max(point.lng),
            ),
        }
    }

    /// Returns the south-west corner.
    #[must_use]
    pub const fn south_west(&self) -> Coordinate {
        self.south_west
    }

    /// Returns the north-east corner.
    #[must_use]
    pub const fn north_east(&self) -> Coordinate {
        self.north_east
    }

    /// Returns `true` when the coordinate lies inside or on the bounds.
    #[must_use]
    pub fn contains(&self, point: Coordinate) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }
}
