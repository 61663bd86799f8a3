use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;

use serde::Serialize;

pub const NOT_APPLICABLE: &str = "N/A";
pub const KERNEL_OWNER: &str = "System";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Protocol {
    #[serde(rename = "TCP")]
    Tcp,
    #[serde(rename = "UDP")]
    Udp,
}

impl Protocol {
    pub fn label(self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpState {
    Established,
    SynSent,
    SynRecv,
    FinWait1,
    FinWait2,
    TimeWait,
    Close,
    CloseWait,
    LastAck,
    Listen,
    Closing,
    DeleteTcb,
}

impl TcpState {
    pub fn label(self) -> &'static str {
        match self {
            TcpState::Established => "ESTABLISHED",
            TcpState::SynSent => "SYN_SENT",
            TcpState::SynRecv => "SYN_RECV",
            TcpState::FinWait1 => "FIN_WAIT1",
            TcpState::FinWait2 => "FIN_WAIT2",
            TcpState::TimeWait => "TIME_WAIT",
            TcpState::Close => "CLOSE",
            TcpState::CloseWait => "CLOSE_WAIT",
            TcpState::LastAck => "LAST_ACK",
            TcpState::Listen => "LISTEN",
            TcpState::Closing => "CLOSING",
            TcpState::DeleteTcb => "DELETE_TCB",
        }
    }
}

/// A socket as reported by the OS, before process names are attached.
///
/// `state` is `None` for sockets that carry no connection state. That
/// absence, not a protocol field, decides TCP vs UDP downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSocket {
    pub pid: Option<u32>,
    pub local: Option<SocketAddr>,
    pub remote: Option<SocketAddr>,
    pub state: Option<TcpState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub pid: Option<u32>,
    pub process_name: String,
    pub protocol: Protocol,
    pub local_address: String,
    pub remote_address: String,
    pub status: String,
}

pub fn classify(state: Option<TcpState>) -> Protocol {
    match state {
        Some(_) => Protocol::Tcp,
        None => Protocol::Udp,
    }
}

pub fn format_endpoint(addr: Option<SocketAddr>) -> String {
    match addr {
        Some(addr) => format!("{}:{}", addr.ip(), addr.port()),
        None => NOT_APPLICABLE.to_string(),
    }
}

/// Name shown for a socket owner; falls back to `PID <n>` when the process
/// table has no entry for it.
pub fn owner_name(pid: Option<u32>, names: &HashMap<u32, String>) -> String {
    match pid {
        Some(pid) => names
            .get(&pid)
            .cloned()
            .unwrap_or_else(|| format!("PID {pid}")),
        None => KERNEL_OWNER.to_string(),
    }
}

pub fn build_connection(raw: RawSocket, names: &HashMap<u32, String>) -> Connection {
    Connection {
        pid: raw.pid,
        process_name: owner_name(raw.pid, names),
        protocol: classify(raw.state),
        local_address: format_endpoint(raw.local),
        remote_address: format_endpoint(raw.remote),
        status: raw
            .state
            .map(|s| s.label().to_string())
            .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
    }
}

/// Either side of a socket as reported by the OS. Port 0 means the side is
/// not bound or not connected, whatever the address, and renders as `N/A`.
pub fn endpoint(addr: SocketAddr) -> Option<SocketAddr> {
    (addr.port() != 0).then_some(addr)
}
