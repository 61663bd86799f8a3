use std::collections::HashMap;

use sysinfo::{Networks, ProcessRefreshKind, ProcessesToUpdate, System};

use super::bandwidth::ProcessIo;
use super::connection::RawSocket;
use super::error::ProbeError;
use super::platform;
use super::stats::NetworkStats;

/// Source of raw OS readings for a [`Sampler`](super::sampler::Sampler).
pub trait Probe {
    fn sockets(&self) -> Result<Vec<RawSocket>, ProbeError>;

    /// Names of every process visible right now, by pid.
    fn process_names(&self) -> Result<HashMap<u32, String>, ProbeError>;

    /// Cumulative I/O counters for every running process. A process whose
    /// counters cannot be read is still listed, carrying its own error.
    fn io_counters(&mut self) -> Result<Vec<ProcessIo>, ProbeError>;

    fn interface_totals(&self) -> Result<NetworkStats, ProbeError>;
}

/// [`Probe`] backed by `sysinfo` and the per-OS platform shim.
pub struct SystemProbe {
    sys: System,
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProbe {
    pub fn new() -> Self {
        SystemProbe { sys: System::new() }
    }
}

fn process_table() -> System {
    let mut sys = System::new();
    sys.refresh_processes_specifics(ProcessesToUpdate::All, true, ProcessRefreshKind::nothing());
    sys
}

impl Probe for SystemProbe {
    fn sockets(&self) -> Result<Vec<RawSocket>, ProbeError> {
        platform::sockets()
    }

    fn process_names(&self) -> Result<HashMap<u32, String>, ProbeError> {
        let sys = process_table();
        Ok(sys
            .processes()
            .iter()
            .map(|(pid, process)| (pid.as_u32(), process.name().to_string_lossy().to_string()))
            .collect())
    }

    fn io_counters(&mut self) -> Result<Vec<ProcessIo>, ProbeError> {
        let _span = tracing::debug_span!("probe.io_counters").entered();

        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing(),
        );
        Ok(self
            .sys
            .processes()
            .iter()
            .map(|(pid, process)| {
                let pid = pid.as_u32();
                ProcessIo {
                    pid,
                    name: process.name().to_string_lossy().to_string(),
                    io: platform::process_io(pid),
                }
            })
            .collect())
    }

    fn interface_totals(&self) -> Result<NetworkStats, ProbeError> {
        let networks = Networks::new_with_refreshed_list();
        if networks.list().is_empty() {
            return Err(ProbeError::NotFound);
        }

        let mut stats = NetworkStats::default();
        for data in networks.list().values() {
            stats.bytes_sent += data.total_transmitted();
            stats.bytes_received += data.total_received();
            stats.packets_sent += data.total_packets_transmitted();
            stats.packets_received += data.total_packets_received();
            stats.errors_in += data.total_errors_on_received();
            stats.errors_out += data.total_errors_on_transmitted();
        }

        match platform::interface_drops() {
            Ok(drops) => {
                stats.drops_in = drops.drops_in;
                stats.drops_out = drops.drops_out;
            }
            Err(err) => tracing::debug!(%err, "interface drop counters unavailable"),
        }
        Ok(stats)
    }
}
