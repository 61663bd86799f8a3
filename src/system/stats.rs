use serde::Serialize;

use crate::format::{format_bytes, format_count};

/// Interface counters summed over every interface, as cumulative totals
/// since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NetworkStats {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub packets_sent: u64,
    pub packets_received: u64,
    pub errors_in: u64,
    pub errors_out: u64,
    pub drops_in: u64,
    pub drops_out: u64,
}

impl NetworkStats {
    pub fn errors(&self) -> u64 {
        self.errors_in + self.errors_out
    }

    pub fn drops(&self) -> u64 {
        self.drops_in + self.drops_out
    }

    /// One-line summary; errors and drops only appear when non-zero.
    pub fn summary(&self) -> String {
        let mut parts = vec![
            format!("Total Sent: {}", format_bytes(self.bytes_sent as f64)),
            format!("Total Received: {}", format_bytes(self.bytes_received as f64)),
            format!("Packets Sent: {}", format_count(self.packets_sent)),
            format!("Packets Received: {}", format_count(self.packets_received)),
        ];
        if self.errors() > 0 {
            parts.push(format!("Errors: {}", self.errors()));
        }
        if self.drops() > 0 {
            parts.push(format!("Drops: {}", self.drops()));
        }
        parts.join("  |  ")
    }
}

pub const STATS_UNAVAILABLE: &str = "Unable to retrieve network statistics";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_omits_zero_errors_and_drops() {
        let stats = NetworkStats {
            bytes_sent: 1536,
            bytes_received: 1024 * 1024,
            packets_sent: 12_345,
            packets_received: 7,
            ..Default::default()
        };
        assert_eq!(
            stats.summary(),
            "Total Sent: 1.50 KB  |  Total Received: 1.00 MB  |  Packets Sent: 12,345  |  Packets Received: 7"
        );
    }

    #[test]
    fn summary_reports_combined_errors_and_drops() {
        let stats = NetworkStats {
            errors_in: 2,
            errors_out: 1,
            drops_out: 4,
            ..Default::default()
        };
        let line = stats.summary();
        assert!(line.ends_with("Errors: 3  |  Drops: 4"), "{line}");
    }
}
