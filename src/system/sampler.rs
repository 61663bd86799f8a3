use std::collections::HashMap;
use std::time::Instant;

use super::bandwidth::{BandwidthSample, BandwidthTracker, MIN_ELAPSED};
use super::connection::{Connection, build_connection};
use super::error::ProbeError;
use super::probe::{Probe, SystemProbe};
use super::snapshot::NetworkSnapshot;
use super::stats::NetworkStats;

/// Connection lister, per-process bandwidth estimator and interface counter
/// reader.
///
/// Bandwidth is derived from each process's cumulative read/write byte
/// counters, which include disk and pipe I/O as well as sockets. The figures
/// are an approximation of network activity, not a measurement of it.
///
/// Every public read degrades to an empty result instead of failing.
/// `compute_bandwidth` takes `&mut self`; callers sharing a sampler across
/// threads must wrap it in a lock.
pub struct Sampler<P: Probe = SystemProbe> {
    probe: P,
    tracker: BandwidthTracker,
}

impl Default for Sampler<SystemProbe> {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler<SystemProbe> {
    pub fn new() -> Self {
        Self::with_probe(SystemProbe::new())
    }

    /// [`Sampler::with_probe_primed`] over the live system.
    pub fn primed() -> Self {
        Self::with_probe_primed(SystemProbe::new())
    }
}

impl<P: Probe> Sampler<P> {
    pub fn with_probe(probe: P) -> Self {
        Self::with_probe_at(probe, Instant::now())
    }

    /// Like [`Sampler::with_probe`], treating `started_at` as the previous
    /// poll time.
    pub fn with_probe_at(probe: P, started_at: Instant) -> Self {
        Sampler {
            probe,
            tracker: BandwidthTracker::new(started_at),
        }
    }

    /// Backdates the previous poll by [`MIN_ELAPSED`] so the first
    /// `compute_bandwidth` call seeds counters instead of hitting the guard.
    /// One-shot reports and the first UI tick rely on this.
    pub fn with_probe_primed(probe: P) -> Self {
        let now = Instant::now();
        Self::with_probe_at(probe, now.checked_sub(MIN_ELAPSED).unwrap_or(now))
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn probe_mut(&mut self) -> &mut P {
        &mut self.probe
    }

    pub fn list_connections(&self) -> Vec<Connection> {
        let _span = tracing::debug_span!("sampler.list_connections").entered();

        match self.try_list_connections() {
            Ok(connections) => connections,
            Err(err) => {
                tracing::debug!(%err, "connection listing unavailable");
                Vec::new()
            }
        }
    }

    fn try_list_connections(&self) -> Result<Vec<Connection>, ProbeError> {
        let sockets = self.probe.sockets()?;
        let names = self.probe.process_names().unwrap_or_else(|err| {
            tracing::debug!(%err, "process names unavailable");
            HashMap::new()
        });
        Ok(sockets
            .into_iter()
            .map(|raw| build_connection(raw, &names))
            .collect())
    }

    pub fn compute_bandwidth(&mut self) -> HashMap<u32, BandwidthSample> {
        self.compute_bandwidth_at(Instant::now())
    }

    /// Bandwidth pass taken at `now`. Rates cover the interval since the
    /// previous pass; a first-seen process only seeds state.
    pub fn compute_bandwidth_at(&mut self, now: Instant) -> HashMap<u32, BandwidthSample> {
        let _span = tracing::debug_span!("sampler.compute_bandwidth").entered();

        if self.tracker.elapsed_since_last(now).is_none() {
            tracing::trace!("bandwidth poll too soon after previous pass");
            return HashMap::new();
        }

        match self.probe.io_counters() {
            Ok(readings) => {
                let samples = self.tracker.update(now, readings);
                tracing::debug!(
                    samples = samples.len(),
                    tracked = self.tracker.tracked(),
                    "bandwidth pass complete"
                );
                samples
            }
            Err(err) => {
                tracing::debug!(%err, "process enumeration failed");
                self.tracker.advance(now);
                HashMap::new()
            }
        }
    }

    pub fn get_network_stats(&self) -> Option<NetworkStats> {
        match self.probe.interface_totals() {
            Ok(stats) => Some(stats),
            Err(err) => {
                tracing::debug!(%err, "network statistics unavailable");
                None
            }
        }
    }

    /// Runs the three reads in display order: connections, bandwidth, stats.
    pub fn snapshot(&mut self) -> NetworkSnapshot {
        let connections = self.list_connections();
        let bandwidth = self.compute_bandwidth();
        let stats = self.get_network_stats();
        NetworkSnapshot {
            connections,
            bandwidth,
            stats,
        }
    }
}
