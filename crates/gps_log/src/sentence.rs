//! Field extraction for the NMEA 0183 sentences the distance calculation uses.
//!
//! Parsing is shallow: sentences are split on `,` and single fields
//! are picked by index. Neither checksums nor fix quality are looked at.

use std::{error::Error, fmt};

use utility::geo::haversine_distance;

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticsSink};

/// Fix data sentence carrying latitude and longitude.
pub const POSITION_FIX_PREFIX: &str = "$GPGGA";

/// Track made good and ground speed sentence.
pub const SPEED_REPORT_PREFIX: &str = "$GNVTG";

/// Date and time sentence. Irrelevant for distances and filtered out early.
pub const TIME_AND_DATE_PREFIX: &str = "$GNZDA";

const LATITUDE_FIELD: usize = 2;
const LONGITUDE_FIELD: usize = 4;
const SPEED_KMH_FIELD: usize = 7;

/// A coordinate exactly as it appears in the sentence, e.g. `5419.3980` or
/// `-10.0001`. It is neither reformatted nor range checked and only parsed to a
/// number when a distance is computed.
pub type CoordinateToken = String;

/// Rounded ground speed in km/h.
pub type SpeedKmh = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentenceError {
    MissingField { index: usize, field_count: usize },
    EmptyField { index: usize },
    InvalidNumber { index: usize, value: String },
}

impl fmt::Display for SentenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { index, field_count } => write!(
                f,
                "field {} is missing, sentence has {} fields",
                index, field_count
            ),
            Self::EmptyField { index } => write!(f, "field {} is empty", index),
            Self::InvalidNumber { index, value } => {
                write!(f, "field {} is not a number: `{}`", index, value)
            }
        }
    }
}

impl Error for SentenceError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionFix {
    pub latitude: CoordinateToken,
    pub longitude: CoordinateToken,
}

impl PositionFix {
    pub fn new(
        latitude: impl Into<CoordinateToken>,
        longitude: impl Into<CoordinateToken>,
    ) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }

    /// Latitude and longitude parsed as degrees.
    pub fn degrees(&self) -> Result<(f64, f64), SentenceError> {
        let latitude = parse_number(&self.latitude, LATITUDE_FIELD)?;
        let longitude = parse_number(&self.longitude, LONGITUDE_FIELD)?;
        Ok((latitude, longitude))
    }

    /// Great-circle distance to `other` in kilometers.
    pub fn distance_to(&self, other: &PositionFix) -> Result<f64, SentenceError> {
        let (latitude_1, longitude_1) = self.degrees()?;
        let (latitude_2, longitude_2) = other.degrees()?;
        Ok(haversine_distance(
            latitude_1,
            longitude_1,
            latitude_2,
            longitude_2,
        ))
    }
}

/// Extracts the coordinate tokens of a `$GPGGA` sentence.
///
/// Returns `Ok(None)` for any line that is not a `$GPGGA` sentence.
pub fn try_parse_position_fix(line: &str) -> Result<Option<PositionFix>, SentenceError> {
    if !line.starts_with(POSITION_FIX_PREFIX) {
        return Ok(None);
    }

    let fields = line.split(',').collect::<Vec<_>>();
    let latitude = non_empty_field(&fields, LATITUDE_FIELD)?;
    let longitude = non_empty_field(&fields, LONGITUDE_FIELD)?;

    Ok(Some(PositionFix::new(latitude, longitude)))
}

/// Like [`try_parse_position_fix`], but malformed sentences are reported to
/// `sink` and yield `None`.
pub fn parse_position_fix(
    line: &str,
    sink: &mut impl DiagnosticsSink,
) -> Option<PositionFix> {
    try_parse_position_fix(line).unwrap_or_else(|why| {
        sink.record(Diagnostic::new(
            DiagnosticKind::MalformedPositionFix,
            line,
            why,
        ));
        None
    })
}

/// Reads the km/h ground speed (field 7) and rounds it to the nearest integer.
///
/// The sentence type is not checked, any line is accepted.
pub fn try_extract_speed(line: &str) -> Result<SpeedKmh, SentenceError> {
    let fields = line.split(',').collect::<Vec<_>>();
    let raw = field(&fields, SPEED_KMH_FIELD)?;
    let speed = parse_number(raw, SPEED_KMH_FIELD)?;
    Ok(speed.round() as SpeedKmh)
}

/// Like [`try_extract_speed`], but a missing or malformed speed is reported to
/// `sink` and read as `0`.
pub fn extract_speed(line: &str, sink: &mut impl DiagnosticsSink) -> SpeedKmh {
    try_extract_speed(line).unwrap_or_else(|why| {
        sink.record(Diagnostic::new(
            DiagnosticKind::MalformedSpeedReport,
            line,
            why,
        ));
        0
    })
}

fn field<'a>(fields: &[&'a str], index: usize) -> Result<&'a str, SentenceError> {
    fields
        .get(index)
        .copied()
        .ok_or(SentenceError::MissingField {
            index,
            field_count: fields.len(),
        })
}

fn non_empty_field<'a>(
    fields: &[&'a str],
    index: usize,
) -> Result<&'a str, SentenceError> {
    match field(fields, index)? {
        "" => Err(SentenceError::EmptyField { index }),
        value => Ok(value),
    }
}

// `NaN`, `inf` and overflowing literals like `1e400` are rejected as well
fn parse_number(value: &str, index: usize) -> Result<f64, SentenceError> {
    match value.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(SentenceError::InvalidNumber {
            index,
            value: value.to_owned(),
        }),
    }
}
