use std::collections::HashMap;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use super::{DropCounters, IoStats, PlatformExtensions};
use crate::system::connection::{RawSocket, TcpState, endpoint};
use crate::system::error::ProbeError;

pub struct Platform;

const SOCKET_TABLES: [(&str, bool); 4] = [
    ("/proc/net/tcp", true),
    ("/proc/net/tcp6", true),
    ("/proc/net/udp", false),
    ("/proc/net/udp6", false),
];

impl PlatformExtensions for Platform {
    fn sockets() -> Result<Vec<RawSocket>, ProbeError> {
        let mut entries = Vec::new();
        for (path, stateful) in SOCKET_TABLES {
            let contents = match fs::read_to_string(path) {
                Ok(c) => c,
                // tcp6/udp6 are absent when IPv6 is disabled
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };
            entries.extend(parse_socket_table(&contents, stateful)?);
        }

        let owners = socket_owners();
        Ok(entries
            .into_iter()
            .map(|(mut socket, inode)| {
                socket.pid = owners.get(&inode).copied();
                socket
            })
            .collect())
    }

    fn process_io(pid: u32) -> Result<IoStats, ProbeError> {
        let contents = fs::read_to_string(format!("/proc/{pid}/io"))?;
        parse_proc_io(&contents)
    }

    fn interface_drops() -> Result<DropCounters, ProbeError> {
        let contents = fs::read_to_string("/proc/net/dev")?;
        Ok(parse_net_dev(&contents))
    }
}

/// Parses `/proc/net/{tcp,udp}{,6}`. Returns each socket (without owner)
/// paired with its inode.
pub(crate) fn parse_socket_table(
    contents: &str,
    stateful: bool,
) -> Result<Vec<(RawSocket, u64)>, ProbeError> {
    let mut out = Vec::new();
    // First line is the column header.
    for line in contents.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 {
            continue;
        }
        let local = parse_hex_endpoint(fields[1])?;
        let remote = parse_hex_endpoint(fields[2])?;
        let state = if stateful {
            let code = u8::from_str_radix(fields[3], 16)
                .map_err(|e| ProbeError::Parse(format!("state {:?}: {e}", fields[3])))?;
            Some(tcp_state(code))
        } else {
            None
        };
        let inode = fields[9]
            .parse::<u64>()
            .map_err(|e| ProbeError::Parse(format!("inode {:?}: {e}", fields[9])))?;

        out.push((
            RawSocket {
                pid: None,
                local: endpoint(local),
                remote: endpoint(remote),
                state,
            },
            inode,
        ));
    }
    Ok(out)
}

/// `0100007F:0277` → `127.0.0.1:631`. The address words are printed in host
/// byte order.
fn parse_hex_endpoint(s: &str) -> Result<SocketAddr, ProbeError> {
    let (addr, port) = s
        .split_once(':')
        .ok_or_else(|| ProbeError::Parse(format!("endpoint {s:?}")))?;
    let port = u16::from_str_radix(port, 16)
        .map_err(|e| ProbeError::Parse(format!("port {port:?}: {e}")))?;

    let ip = match addr.len() {
        8 => IpAddr::V4(Ipv4Addr::from(hex_word(addr)?.to_ne_bytes())),
        32 => {
            let mut octets = [0u8; 16];
            for (i, chunk) in octets.chunks_exact_mut(4).enumerate() {
                let word = hex_word(&addr[i * 8..i * 8 + 8])?;
                chunk.copy_from_slice(&word.to_ne_bytes());
            }
            IpAddr::V6(Ipv6Addr::from(octets))
        }
        _ => return Err(ProbeError::Parse(format!("address {addr:?}"))),
    };
    Ok(SocketAddr::new(ip, port))
}

fn hex_word(s: &str) -> Result<u32, ProbeError> {
    u32::from_str_radix(s, 16).map_err(|e| ProbeError::Parse(format!("{s:?}: {e}")))
}

fn tcp_state(code: u8) -> TcpState {
    match code {
        0x01 => TcpState::Established,
        0x02 => TcpState::SynSent,
        0x03 | 0x0C => TcpState::SynRecv,
        0x04 => TcpState::FinWait1,
        0x05 => TcpState::FinWait2,
        0x06 => TcpState::TimeWait,
        0x08 => TcpState::CloseWait,
        0x09 => TcpState::LastAck,
        0x0A => TcpState::Listen,
        0x0B => TcpState::Closing,
        _ => TcpState::Close,
    }
}

/// Maps socket inodes to the pid holding them. Processes whose fd table we
/// cannot read are left out, so their sockets stay unattributed.
fn socket_owners() -> HashMap<u64, u32> {
    let mut owners = HashMap::new();
    let Ok(proc_dir) = fs::read_dir("/proc") else {
        return owners;
    };
    for entry in proc_dir.flatten() {
        let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) else {
            continue;
        };
        let Ok(fds) = fs::read_dir(entry.path().join("fd")) else {
            continue;
        };
        for fd in fds.flatten() {
            let Ok(target) = fs::read_link(fd.path()) else {
                continue;
            };
            if let Some(inode) = socket_inode(&target.to_string_lossy()) {
                owners.entry(inode).or_insert(pid);
            }
        }
    }
    owners
}

fn socket_inode(link: &str) -> Option<u64> {
    link.strip_prefix("socket:[")?.strip_suffix(']')?.parse().ok()
}

fn parse_proc_io(contents: &str) -> Result<IoStats, ProbeError> {
    let mut read_bytes = None;
    let mut write_bytes = None;
    for line in contents.lines() {
        if let Some(val) = line.strip_prefix("read_bytes: ") {
            read_bytes = val.trim().parse().ok();
        } else if let Some(val) = line.strip_prefix("write_bytes: ") {
            write_bytes = val.trim().parse().ok();
        }
    }
    match (read_bytes, write_bytes) {
        (Some(read_bytes), Some(write_bytes)) => Ok(IoStats {
            read_bytes,
            write_bytes,
        }),
        _ => Err(ProbeError::Parse("read_bytes/write_bytes missing".into())),
    }
}

fn parse_net_dev(contents: &str) -> DropCounters {
    let mut drops = DropCounters::default();
    // Two header lines, then `iface: rx(8 columns) tx(8 columns)`.
    for line in contents.lines().skip(2) {
        let Some((_, counters)) = line.split_once(':') else {
            continue;
        };
        let fields: Vec<u64> = counters
            .split_whitespace()
            .filter_map(|f| f.parse().ok())
            .collect();
        if fields.len() < 12 {
            continue;
        }
        drops.drops_in += fields[3];
        drops.drops_out += fields[11];
    }
    drops
}
