use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use libproc::libproc::bsd_info::BSDInfo;
use libproc::libproc::file_info::{ListFDs, ProcFDType, pidfdinfo};
use libproc::libproc::net_info::{InSockInfo, SocketFDInfo, SocketInfoKind};
use libproc::libproc::pid_rusage::{RUsageInfoV2, pidrusage};
use libproc::libproc::proc_pid::{ProcType, listpidinfo, listpids, pidinfo};

use super::{DropCounters, IoStats, PlatformExtensions};
use crate::system::connection::{RawSocket, TcpState, endpoint};
use crate::system::error::ProbeError;

const INI_IPV4: u8 = 0x1;
const INI_IPV6: u8 = 0x2;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn sockets() -> Result<Vec<RawSocket>, ProbeError> {
        let pids = listpids(ProcType::ProcAllPIDS).map_err(ProbeError::Parse)?;
        let mut sockets = Vec::new();
        // Processes owned by other users fail here without root; skip them.
        for pid in pids {
            let Ok(owned) = process_sockets(pid as i32) else {
                continue;
            };
            sockets.extend(owned);
        }
        Ok(sockets)
    }

    fn process_io(pid: u32) -> Result<IoStats, ProbeError> {
        // Fails for other users' processes unless running as root.
        let usage = pidrusage::<RUsageInfoV2>(pid as i32).map_err(|err| {
            if err.contains("No such process") {
                ProbeError::NotFound
            } else {
                ProbeError::PermissionDenied
            }
        })?;
        Ok(IoStats {
            read_bytes: usage.ri_diskio_bytesread,
            write_bytes: usage.ri_diskio_byteswritten,
        })
    }

    fn interface_drops() -> Result<DropCounters, ProbeError> {
        // sysinfo already covers bytes/packets/errors; drops are not exposed.
        Ok(DropCounters::default())
    }
}

fn process_sockets(pid: i32) -> Result<Vec<RawSocket>, String> {
    let info = pidinfo::<BSDInfo>(pid, 0)?;
    let fds = listpidinfo::<ListFDs>(pid, info.pbi_nfiles as usize)?;
    let mut sockets = Vec::new();
    for fd in fds {
        if !matches!(ProcFDType::from(fd.proc_fdtype), ProcFDType::Socket) {
            continue;
        }
        let Ok(socket) = pidfdinfo::<SocketFDInfo>(pid, fd.proc_fd) else {
            continue;
        };
        let (ini, state) = match SocketInfoKind::from(socket.psi.soi_kind) {
            // SAFETY: soi_kind selects the active member of soi_proto.
            SocketInfoKind::Tcp => {
                let tcp = unsafe { socket.psi.soi_proto.pri_tcp };
                (tcp.tcpsi_ini, tcp_state(tcp.tcpsi_state))
            }
            SocketInfoKind::In => (unsafe { socket.psi.soi_proto.pri_in }, None),
            _ => continue,
        };
        let Some((local, remote)) = in_sock_addrs(&ini) else {
            continue;
        };
        sockets.push(RawSocket {
            pid: u32::try_from(pid).ok(),
            local: endpoint(local),
            remote: endpoint(remote),
            state,
        });
    }
    Ok(sockets)
}

fn in_sock_addrs(ini: &InSockInfo) -> Option<(SocketAddr, SocketAddr)> {
    let lport = port_from_net(ini.insi_lport);
    let fport = port_from_net(ini.insi_fport);
    // SAFETY: insi_vflag says which union member the kernel filled in.
    let (laddr, faddr) = unsafe {
        if ini.insi_vflag & INI_IPV6 != 0 {
            (
                IpAddr::V6(Ipv6Addr::from(ini.insi_laddr.ina_6.s6_addr)),
                IpAddr::V6(Ipv6Addr::from(ini.insi_faddr.ina_6.s6_addr)),
            )
        } else if ini.insi_vflag & INI_IPV4 != 0 {
            (
                IpAddr::V4(ipv4_from_net(ini.insi_laddr.ina_46.i46a_addr4.s_addr)),
                IpAddr::V4(ipv4_from_net(ini.insi_faddr.ina_46.i46a_addr4.s_addr)),
            )
        } else {
            return None;
        }
    };
    Some((SocketAddr::new(laddr, lport), SocketAddr::new(faddr, fport)))
}

/// Ports arrive as an int holding a network-order u16.
fn port_from_net(raw: i32) -> u16 {
    u16::from_be(raw as u16)
}

fn ipv4_from_net(s_addr: u32) -> Ipv4Addr {
    Ipv4Addr::from(s_addr.to_ne_bytes())
}

/// BSD `TCPS_*` numbering from netinet/tcp_fsm.h.
fn tcp_state(raw: i32) -> Option<TcpState> {
    Some(match raw {
        0 => TcpState::Close,
        1 => TcpState::Listen,
        2 => TcpState::SynSent,
        3 => TcpState::SynRecv,
        4 => TcpState::Established,
        5 => TcpState::CloseWait,
        6 => TcpState::FinWait1,
        7 => TcpState::Closing,
        8 => TcpState::LastAck,
        9 => TcpState::FinWait2,
        10 => TcpState::TimeWait,
        _ => return None,
    })
}
