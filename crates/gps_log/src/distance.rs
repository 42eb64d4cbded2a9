use crate::{
    diagnostics::{Diagnostic, DiagnosticKind, DiagnosticsSink},
    sentence::{extract_speed, parse_position_fix, SPEED_REPORT_PREFIX},
    RawLine,
};

/// Sums the distance covered while the vehicle is reported moving.
///
/// Lines are pushed one at a time in log order. A `$GNVTG` line with a positive
/// speed adds the distance between the `$GPGGA` fix directly before it and the
/// one directly after it. Only those two neighbours are looked at, so at most
/// three lines are held at once.
pub struct DistanceAccumulator<S> {
    sink: S,
    previous: Option<RawLine>,
    current: Option<RawLine>,
    total_kilometers: f64,
    segments: usize,
}

impl<S: DiagnosticsSink> DistanceAccumulator<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            previous: None,
            current: None,
            total_kilometers: 0.0,
            segments: 0,
        }
    }

    pub fn push(&mut self, next: RawLine) {
        let distance = match &self.current {
            Some(current) => evaluate(
                &mut self.sink,
                self.previous.as_ref(),
                current,
                Some(&next),
            ),
            None => None,
        };
        if let Some(distance) = distance {
            self.add(distance);
        }
        self.previous = self.current.take();
        self.current = Some(next);
    }

    /// Evaluates the last line, which has no successor, and returns the total
    /// in kilometers along with the number of contributing segments.
    pub fn finish(mut self) -> (f64, usize) {
        if let Some(current) = &self.current {
            if let Some(distance) =
                evaluate(&mut self.sink, self.previous.as_ref(), current, None)
            {
                self.add(distance);
            }
        }
        (self.total_kilometers, self.segments)
    }

    fn add(&mut self, distance: f64) {
        self.total_kilometers += distance;
        self.segments += 1;
    }
}

fn evaluate(
    sink: &mut impl DiagnosticsSink,
    previous: Option<&RawLine>,
    current: &RawLine,
    next: Option<&RawLine>,
) -> Option<f64> {
    if !current.starts_with(SPEED_REPORT_PREFIX) || extract_speed(current, sink) <= 0 {
        return None;
    }

    // speed reports at the very start or end of a log have no bracketing fixes
    let (previous, next) = (previous?, next?);

    let start = parse_position_fix(previous, sink);
    let end = parse_position_fix(next, sink);
    let (start, end) = (start?, end?);

    match start.distance_to(&end) {
        Ok(distance) => Some(distance),
        Err(why) => {
            log::debug!(
                "skipping segment {:?} -> {:?} around `{}`",
                start,
                end,
                current
            );
            let line = if start.degrees().is_err() { previous } else { next };
            sink.record(Diagnostic::new(
                DiagnosticKind::NonNumericCoordinate,
                line.as_str(),
                why,
            ));
            None
        }
    }
}

/// Total distance in kilometers covered by an already filtered sequence of lines.
pub fn calculate_total_distance<I, L>(lines: I, sink: impl DiagnosticsSink) -> f64
where
    I: IntoIterator<Item = L>,
    L: Into<RawLine>,
{
    let mut accumulator = DistanceAccumulator::new(sink);
    for line in lines {
        accumulator.push(line.into());
    }
    accumulator.finish().0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::IgnoreDiagnostics;
    use utility::geo::haversine_distance;

    fn gga(latitude: &str, longitude: &str) -> String {
        format!("$GPGGA,120000.00,{latitude},N,{longitude},E,1,08,0.9,545.4,M,46.9,M,,")
    }

    fn vtg(speed: &str) -> String {
        format!("$GNVTG,54.7,T,34.4,M,5.5,N,{speed},K,A")
    }

    fn total(lines: &[String]) -> f64 {
        calculate_total_distance(lines.iter().cloned(), IgnoreDiagnostics)
    }

    #[test]
    fn moving_report_between_two_fixes() {
        let lines = [gga("54.0", "10.0"), vtg("12.0"), gga("54.1", "10.1")];
        let expected = haversine_distance(54.0, 10.0, 54.1, 10.1);
        assert_eq!(total(&lines), expected);
    }

    #[test]
    fn stationary_report_adds_nothing() {
        let lines = [gga("54.0", "10.0"), vtg("0.4"), gga("54.1", "10.1")];
        assert_eq!(total(&lines), 0.0);
    }

    #[test]
    fn negative_speed_adds_nothing() {
        let lines = [gga("54.0", "10.0"), vtg("-3.0"), gga("54.1", "10.1")];
        assert_eq!(total(&lines), 0.0);
    }

    #[test]
    fn report_at_the_edges_adds_nothing() {
        let lines = [vtg("30.0"), gga("54.0", "10.0"), gga("54.1", "10.1"), vtg("30.0")];
        assert_eq!(total(&lines), 0.0);
    }

    #[test]
    fn neighbours_must_both_be_fixes() {
        let lines = [
            gga("54.0", "10.0"),
            vtg("30.0"),
            vtg("30.0"),
            gga("54.1", "10.1"),
        ];
        assert_eq!(total(&lines), 0.0);
    }

    #[test]
    fn segments_accumulate() {
        let lines = [
            gga("54.0", "10.0"),
            vtg("30.0"),
            gga("54.1", "10.1"),
            vtg("30.0"),
            gga("54.2", "10.2"),
        ];
        let mut accumulator = DistanceAccumulator::new(IgnoreDiagnostics);
        for line in lines {
            accumulator.push(line.into());
        }
        let (kilometers, segments) = accumulator.finish();

        let expected = haversine_distance(54.0, 10.0, 54.1, 10.1)
            + haversine_distance(54.1, 10.1, 54.2, 10.2);
        assert_eq!(segments, 2);
        assert!((kilometers - expected).abs() < 1e-12);
    }

    #[test]
    fn running_total_before_finish() {
        let mut accumulator = DistanceAccumulator::new(IgnoreDiagnostics);
        accumulator.push(gga("54.0", "10.0").into());
        accumulator.push(vtg("30.0").into());
        assert_eq!(accumulator.total_kilometers, 0.0);
        accumulator.push(gga("54.1", "10.1").into());
        assert!(accumulator.total_kilometers > 0.0);
    }

    #[test]
    fn non_numeric_coordinate_is_reported() {
        let lines = [gga("54.0", "10.0"), vtg("30.0"), gga("north", "10.1")];
        let mut diagnostics: Vec<Diagnostic> = vec![];
        let kilometers = calculate_total_distance(lines.clone(), &mut diagnostics);

        assert_eq!(kilometers, 0.0);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::NonNumericCoordinate);
        assert_eq!(diagnostics[0].line, lines[2]);
    }

    #[test]
    fn both_neighbours_are_parsed() {
        let lines = [
            "$GPGGA,,,,".to_owned(),
            vtg("30.0"),
            "$GPGGA,,54.0".to_owned(),
        ];
        let mut diagnostics: Vec<Diagnostic> = vec![];
        calculate_total_distance(lines, &mut diagnostics);

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics
            .iter()
            .all(|d| d.kind == DiagnosticKind::MalformedPositionFix));
    }

    #[test]
    fn malformed_speed_is_reported_even_at_the_edges() {
        let lines = ["$GNVTG,broken".to_owned()];
        let mut diagnostics: Vec<Diagnostic> = vec![];
        assert_eq!(calculate_total_distance(lines, &mut diagnostics), 0.0);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MalformedSpeedReport);
    }
}
