//! Render progress aggregation across worker threads.

use std::time::Instant;

/// Aggregates per-worker completion ticks into a single progress line.
///
/// Workers report row deltas under a mutex held by the caller; the
/// aggregate percent is total rows done over total rows, so the report is
/// insensitive to uneven band sizes.
pub struct Progress {
    start: Instant,
    total_rows: usize,
    done: Vec<usize>,
    last_logged_percent: u32,
}

impl Progress {
    pub fn new(total_rows: usize, workers: usize) -> Self {
        Self {
            start: Instant::now(),
            total_rows: total_rows.max(1),
            done: vec![0; workers],
            last_logged_percent: 0,
        }
    }

    /// Record `rows` more finished rows for `worker` and log when the
    /// aggregate percentage crosses a whole-percent boundary.
    pub fn tick(&mut self, worker: usize, rows: usize) {
        if let Some(done) = self.done.get_mut(worker) {
            *done += rows;
        }

        let done = self.rows_done();
        let percent = self.percent_complete();
        let whole = percent as u32;

        if whole > self.last_logged_percent || done == self.total_rows {
            self.last_logged_percent = whole;

            let elapsed = self.start.elapsed().as_secs_f32();
            let (eta, unit) = eta_display(elapsed, percent);
            log::info!("{percent:.0}% in {elapsed:.0}s, estimated {eta:.0} {unit} left");
        }
    }

    /// Total rows reported done across all workers.
    pub fn rows_done(&self) -> usize {
        self.done.iter().sum()
    }

    /// Aggregate completion in [0, 100].
    pub fn percent_complete(&self) -> f32 {
        100.0 * self.rows_done() as f32 / self.total_rows as f32
    }
}

/// Linear extrapolation of the remaining time, re-expressed in the
/// largest sensible unit.
fn eta_display(elapsed_secs: f32, percent: f32) -> (f32, &'static str) {
    if percent <= 0.0 {
        return (f32::INFINITY, "seconds");
    }

    let mut left = elapsed_secs * (100.0 - percent) / percent;
    let mut unit = "seconds";
    if left > 60.0 {
        left /= 60.0;
        unit = "minutes";
    }
    if left > 60.0 {
        left /= 60.0;
        unit = "hours";
    }
    (left, unit)
}
