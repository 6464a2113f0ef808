//! Per-operation timing instrumentation

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Timing summary for one operation kind. Times are in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeStat {
    pub count: u64,
    pub total: f64,
    pub last: f64,
    pub min: f64,
    pub max: f64,
}

impl TimeStat {
    fn record(&mut self, elapsed: Duration) {
        let secs = elapsed.as_secs_f64();
        if self.count == 0 {
            self.min = secs;
            self.max = secs;
        } else {
            self.min = self.min.min(secs);
            self.max = self.max.max(secs);
        }
        self.count += 1;
        self.total += secs;
        self.last = secs;
    }
}

/// Aggregate timing statistics of an index
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub insert: TimeStat,
    pub delete: TimeStat,
    pub search: TimeStat,
    pub search_n: TimeStat,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Op {
    Insert,
    Delete,
    Search,
    SearchN,
}

/// Thread-safe recorder shared by the built-in backends
#[derive(Debug, Default)]
pub struct StatsRecorder {
    stats: Mutex<IndexStats>,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` and record its wall time under `op`, whatever the outcome
    pub(crate) fn timed<T>(&self, op: Op, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        let elapsed = start.elapsed();

        let mut stats = self.stats.lock();
        let slot = match op {
            Op::Insert => &mut stats.insert,
            Op::Delete => &mut stats.delete,
            Op::Search => &mut stats.search,
            Op::SearchN => &mut stats.search_n,
        };
        slot.record(elapsed);
        out
    }

    pub fn snapshot(&self) -> IndexStats {
        *self.stats.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_tracks_min_max() {
        let mut stat = TimeStat::default();
        stat.record(Duration::from_millis(20));
        stat.record(Duration::from_millis(10));
        stat.record(Duration::from_millis(30));

        assert_eq!(stat.count, 3);
        assert!((stat.min - 0.010).abs() < 1e-9);
        assert!((stat.max - 0.030).abs() < 1e-9);
        assert!((stat.last - 0.030).abs() < 1e-9);
        assert!((stat.total - 0.060).abs() < 1e-9);
    }

    #[test]
    fn test_recorder_counts_per_op() {
        let recorder = StatsRecorder::new();
        recorder.timed(Op::Insert, || ());
        recorder.timed(Op::Insert, || ());
        let value = recorder.timed(Op::Search, || 7);

        assert_eq!(value, 7);
        let stats = recorder.snapshot();
        assert_eq!(stats.insert.count, 2);
        assert_eq!(stats.search.count, 1);
        assert_eq!(stats.delete.count, 0);
        assert_eq!(stats.search_n.count, 0);
    }
}
