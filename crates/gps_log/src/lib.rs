use std::{
    error::Error,
    fmt, io,
    io::BufRead,
    ops::Deref,
};

use diagnostics::DiagnosticsSink;
use distance::DistanceAccumulator;
use line_filter::LineFilter;

pub mod diagnostics;
pub mod distance;
pub mod line_filter;
pub mod sentence;

pub use distance::calculate_total_distance;

/// One line of a GPS log, without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine(String);

impl RawLine {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for RawLine {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl From<String> for RawLine {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RawLine {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for RawLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
pub enum GpsLogError {
    /// The log could not be read to the end.
    StreamRead(io::Error),
}

impl fmt::Display for GpsLogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StreamRead(why) => write!(f, "could not read gps log: {}", why),
        }
    }
}

impl Error for GpsLogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StreamRead(why) => Some(why),
        }
    }
}

impl From<io::Error> for GpsLogError {
    fn from(value: io::Error) -> Self {
        Self::StreamRead(value)
    }
}

pub type Result<T> = std::result::Result<T, GpsLogError>;

/// Outcome of processing one log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripReport {
    pub total_kilometers: f64,
    /// Number of moving speed reports that contributed a distance.
    pub segments: usize,
}

impl TripReport {
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TripReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Total distance: {:.3} kilometers.", self.total_kilometers)
    }
}

/// Reads a whole NMEA log and computes the distance traveled while moving.
///
/// Malformed sentences are reported to `sink` and otherwise ignored. Only a
/// failure to read `reader` aborts, in which case no partial result is returned.
/// `reader` is consumed and dropped before returning.
///
/// # Example
///
/// ```
/// use gps_log::{diagnostics::IgnoreDiagnostics, process_gps_log};
///
/// let log = "$GPGGA,,54.0,,10.0\n$GNVTG,,,,,,,25.0,K\n$GPGGA,,54.0,,10.0\n";
/// let report = process_gps_log(log.as_bytes(), IgnoreDiagnostics).unwrap();
/// assert_eq!(report.summary(), "Total distance: 0.000 kilometers.");
/// assert_eq!(report.segments, 1);
/// ```
pub fn process_gps_log<R: BufRead>(
    reader: R,
    sink: impl DiagnosticsSink,
) -> Result<TripReport> {
    let mut accumulator = DistanceAccumulator::new(sink);
    for line in LineFilter::new(reader) {
        let line = line.map_err(|why| {
            log::error!("reading gps log failed: {}", why);
            GpsLogError::from(why)
        })?;
        accumulator.push(line);
    }
    let (total_kilometers, segments) = accumulator.finish();
    log::debug!(
        "processed gps log: {:.3} km over {} segments",
        total_kilometers,
        segments
    );

    Ok(TripReport {
        total_kilometers,
        segments,
    })
}
