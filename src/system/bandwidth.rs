use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;

use super::error::ProbeError;
use super::platform::IoStats;

/// Polls closer together than this are ignored.
pub const MIN_ELAPSED: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandwidthSample {
    pub pid: u32,
    pub process_name: String,
    pub upload_rate: f64,
    pub download_rate: f64,
    pub total_rate: f64,
}

/// One process as seen by a bandwidth pass.
#[derive(Debug)]
pub struct ProcessIo {
    pub pid: u32,
    pub name: String,
    pub io: Result<IoStats, ProbeError>,
}

/// Previous cumulative (written, read) counters per pid and the time they
/// were taken.
#[derive(Debug)]
pub struct BandwidthTracker {
    previous: HashMap<u32, (u64, u64)>,
    last_poll: Instant,
}

impl BandwidthTracker {
    pub fn new(started_at: Instant) -> Self {
        Self {
            previous: HashMap::new(),
            last_poll: started_at,
        }
    }

    pub fn last_poll(&self) -> Instant {
        self.last_poll
    }

    pub fn tracked(&self) -> usize {
        self.previous.len()
    }

    pub fn elapsed_since_last(&self, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(self.last_poll);
        (elapsed >= MIN_ELAPSED).then_some(elapsed)
    }

    /// Marks a pass as taken without recording any counters.
    pub fn advance(&mut self, now: Instant) {
        self.last_poll = now;
    }

    /// Folds one pass of readings into the tracker and returns rates for
    /// every pid that was also present in the previous pass.
    ///
    /// Returns an empty map without touching state if `now` is within
    /// [`MIN_ELAPSED`] of the previous pass.
    pub fn update(
        &mut self,
        now: Instant,
        readings: Vec<ProcessIo>,
    ) -> HashMap<u32, BandwidthSample> {
        let Some(elapsed) = self.elapsed_since_last(now) else {
            return HashMap::new();
        };
        let secs = elapsed.as_secs_f64();

        let mut samples = HashMap::new();
        let mut seen = HashMap::with_capacity(readings.len());

        for reading in readings {
            let io = match reading.io {
                Ok(io) => io,
                Err(err) => {
                    tracing::trace!(pid = reading.pid, %err, "skipping process without io counters");
                    continue;
                }
            };

            if let Some(&(last_written, last_read)) = self.previous.get(&reading.pid) {
                let sent = io.write_bytes.saturating_sub(last_written);
                let received = io.read_bytes.saturating_sub(last_read);
                samples.insert(
                    reading.pid,
                    BandwidthSample {
                        pid: reading.pid,
                        process_name: reading.name,
                        upload_rate: sent as f64 / secs,
                        download_rate: received as f64 / secs,
                        total_rate: sent.saturating_add(received) as f64 / secs,
                    },
                );
            }

            seen.insert(reading.pid, (io.write_bytes, io.read_bytes));
        }

        // Pids missing from this pass are dropped; a reused pid starts over.
        self.previous = seen;
        self.last_poll = now;
        samples
    }
}

/// Samples ordered by total rate, highest first.
pub fn ranked(samples: &HashMap<u32, BandwidthSample>, include_idle: bool) -> Vec<&BandwidthSample> {
    let mut rows: Vec<&BandwidthSample> = samples
        .values()
        .filter(|s| include_idle || s.total_rate > 0.0)
        .collect();
    rows.sort_by(|a, b| {
        b.total_rate
            .partial_cmp(&a.total_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.pid.cmp(&b.pid))
    });
    rows
}
