//! Runs single trials and separates the cost of building the
//! native structure from the cost of computing on it.
use std::{convert::TryFrom, fmt, time::Duration, time::Instant};
use tracing::debug;

use crate::{backend::Backend, graph::TrialInput, Error};

/// Construction and computation time of one trial, both from
/// the same monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationPair {
    pub construction: Duration,
    pub computation: Duration,
}

impl DurationPair {
    /// `[construction, computation]` in nanoseconds.
    pub fn as_nanos(&self) -> [u64; 2] {
        [
            saturating_nanos(self.construction),
            saturating_nanos(self.computation),
        ]
    }

    pub fn sum(&self) -> Duration {
        self.construction + self.computation
    }
}

fn saturating_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone)]
pub struct TrialReport<O> {
    pub backend: &'static str,
    pub durations: DurationPair,
    /// Wall time of the whole trial.
    pub total: Duration,
    pub output: O,
}

impl<O> TrialReport<O> {
    /// Everything in `total` that was neither construction nor computation.
    pub fn other(&self) -> Duration {
        self.total
            .checked_sub(self.durations.sum())
            .unwrap_or_default()
    }

    pub fn map_output<P, F: FnOnce(O) -> P>(self, f: F) -> TrialReport<P> {
        TrialReport {
            backend: self.backend,
            durations: self.durations,
            total: self.total,
            output: f(self.output),
        }
    }
}

impl<O> fmt::Display for TrialReport<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [construction, computation] = self.durations.as_nanos();
        writeln!(f, "========== Runtime Report ==========")?;
        writeln!(f, "backend: {}", self.backend)?;
        writeln!(f, "construction: {}", format_nanos(construction))?;
        writeln!(f, "computation: {}", format_nanos(computation))?;
        writeln!(f, "other: {}", format_nanos(saturating_nanos(self.other())))?;
        writeln!(f, "total: {}", format_nanos(saturating_nanos(self.total)))?;
        write!(f, "====================================")
    }
}

/// Minutes, seconds, milliseconds and the remaining nanoseconds.
pub fn format_nanos(nanos: u64) -> String {
    let sub_millis = nanos % 1_000_000;
    let millis = nanos / 1_000_000;
    let seconds = millis / 1000;
    let minutes = seconds / 60;

    format!(
        "{}m {}s {}ms {}ns",
        minutes,
        seconds % 60,
        millis % 1000,
        sub_millis
    )
}

/// Build the native structure of `backend` and compute on it.
///
/// Faults in the input surface from `build`, before `compute` is
/// entered, and no durations are reported for them.
pub fn run_trial<B: Backend>(backend: &B, input: &TrialInput<'_>) -> Result<TrialReport<B::Output>, Error> {
    let start = Instant::now();
    let native = backend.build(input)?;
    let split = Instant::now();
    let output = backend.compute(native)?;
    let end = Instant::now();

    let durations = DurationPair {
        construction: split - start,
        computation: end - split,
    };
    debug!(
        backend = backend.name(),
        construction = ?durations.construction,
        computation = ?durations.computation,
        "trial finished"
    );

    Ok(TrialReport {
        backend: backend.name(),
        durations,
        total: start.elapsed(),
        output,
    })
}
