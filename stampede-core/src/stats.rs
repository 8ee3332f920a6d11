use std::fmt;
use std::time::Duration;

/// Final totals of a load test run.
///
/// Only produced after every virtual user has been joined, so the counters are complete.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStatistics {
    /// Virtual users that registered with the aggregator.
    pub users: u64,
    /// Sub-requests reported as completed.
    pub requests: u64,
    /// Units of work that ended in a transient failure.
    pub errors: u64,
    /// Units of work started, including those of cancelled stragglers.
    pub units: u64,
    pub elapsed: Duration,
    /// Users still in flight when the grace period ran out.
    pub stragglers: usize,
}

impl RunStatistics {
    pub fn error_rate(&self) -> f64 {
        if self.units == 0 {
            0.
        } else {
            self.errors as f64 / self.units as f64
        }
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Sub-millisecond precision is noise in a summary.
        let elapsed = Duration::from_millis(self.elapsed.as_millis() as u64);
        writeln!(f, "Total users: {}", self.users)?;
        writeln!(f, "Total requests: {}", self.requests)?;
        writeln!(f, "Failed units: {} of {}", self.errors, self.units)?;
        write!(f, "Elapsed: {}", humantime::format_duration(elapsed))?;
        if self.stragglers > 0 {
            write!(f, "\nStragglers: {}", self.stragglers)?;
        }
        Ok(())
    }
}
