use std::collections::HashMap;

use serde::Serialize;

use super::bandwidth::BandwidthSample;
use super::connection::{Connection, Protocol};
use super::stats::NetworkStats;

#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkSnapshot {
    pub connections: Vec<Connection>,
    pub bandwidth: HashMap<u32, BandwidthSample>,
    pub stats: Option<NetworkStats>,
}

impl NetworkSnapshot {
    /// (TCP, UDP) connection counts.
    pub fn protocol_counts(&self) -> (usize, usize) {
        self.connections
            .iter()
            .fold((0, 0), |(tcp, udp), c| match c.protocol {
                Protocol::Tcp => (tcp + 1, udp),
                Protocol::Udp => (tcp, udp + 1),
            })
    }
}
