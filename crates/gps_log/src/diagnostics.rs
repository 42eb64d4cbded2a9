use std::fmt;

/// What was wrong with a log line that could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A `$GPGGA` sentence without usable latitude / longitude fields.
    MalformedPositionFix,
    /// A speed report whose km/h field is missing or not a number.
    MalformedSpeedReport,
    /// A `$GPGGA` sentence whose coordinate tokens are present but not numeric.
    NonNumericCoordinate,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MalformedPositionFix => "invalid $GPGGA sentence",
            Self::MalformedSpeedReport => "invalid $GNVTG sentence",
            Self::NonNumericCoordinate => "non-numeric $GPGGA coordinate",
        };
        f.write_str(text)
    }
}

/// A recoverable problem with a single log line.
///
/// Diagnostics never abort processing, the offending line is treated as if it
/// carried no data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: String,
    pub reason: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        line: impl Into<String>,
        reason: impl fmt::Display,
    ) -> Self {
        Self {
            kind,
            line: line.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.kind, self.reason, self.line)
    }
}

/// Receives the diagnostics produced while processing a log.
pub trait DiagnosticsSink {
    fn record(&mut self, diagnostic: Diagnostic);
}

/// Forwards every diagnostic to the `log` facade at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl DiagnosticsSink for LogDiagnostics {
    fn record(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
    }
}

/// Drops all diagnostics.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreDiagnostics;

impl DiagnosticsSink for IgnoreDiagnostics {
    fn record(&mut self, _diagnostic: Diagnostic) {}
}

impl DiagnosticsSink for Vec<Diagnostic> {
    fn record(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<S: DiagnosticsSink + ?Sized> DiagnosticsSink for &mut S {
    fn record(&mut self, diagnostic: Diagnostic) {
        (**self).record(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_collects_in_order() {
        let mut sink: Vec<Diagnostic> = vec![];
        sink.record(Diagnostic::new(
            DiagnosticKind::MalformedSpeedReport,
            "$GNVTG",
            "missing field 7",
        ));
        sink.record(Diagnostic::new(
            DiagnosticKind::MalformedPositionFix,
            "$GPGGA",
            "missing field 2",
        ));

        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].kind, DiagnosticKind::MalformedSpeedReport);
        assert_eq!(sink[1].kind, DiagnosticKind::MalformedPositionFix);
    }

    #[test]
    fn display_names_the_line() {
        let diagnostic = Diagnostic::new(
            DiagnosticKind::MalformedPositionFix,
            "$GPGGA,,,,",
            "field 2 is empty",
        );
        assert_eq!(
            diagnostic.to_string(),
            "invalid $GPGGA sentence (field 2 is empty): $GPGGA,,,,"
        );
    }

    #[test]
    fn mutable_reference_forwards() {
        fn record_one(mut sink: impl DiagnosticsSink) {
            sink.record(Diagnostic::new(
                DiagnosticKind::NonNumericCoordinate,
                "$GPGGA,,x,,y",
                "invalid number `x`",
            ));
        }

        let mut collected: Vec<Diagnostic> = vec![];
        record_one(&mut collected);
        record_one(&mut collected);
        assert_eq!(collected.len(), 2);
    }
}
