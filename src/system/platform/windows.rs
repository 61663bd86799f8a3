use std::ffi::c_void;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use windows_sys::Win32::{
    Foundation::{CloseHandle, ERROR_ACCESS_DENIED, ERROR_INSUFFICIENT_BUFFER, NO_ERROR},
    NetworkManagement::IpHelper::{
        GetExtendedTcpTable, GetExtendedUdpTable, MIB_TCP6ROW_OWNER_PID,
        MIB_TCP6TABLE_OWNER_PID, MIB_TCPROW_OWNER_PID, MIB_TCPTABLE_OWNER_PID,
        MIB_UDP6ROW_OWNER_PID, MIB_UDP6TABLE_OWNER_PID, MIB_UDPROW_OWNER_PID,
        MIB_UDPTABLE_OWNER_PID, TCP_TABLE_OWNER_PID_ALL, UDP_TABLE_OWNER_PID,
    },
    System::Threading::{
        GetProcessIoCounters, IO_COUNTERS, OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION,
    },
};

use super::{DropCounters, IoStats, PlatformExtensions};
use crate::system::connection::{RawSocket, TcpState, endpoint};
use crate::system::error::ProbeError;

pub struct Platform;

const AF_INET: u32 = 2;
const AF_INET6: u32 = 23;

#[derive(Clone, Copy)]
enum Table {
    Tcp,
    Udp,
}

impl PlatformExtensions for Platform {
    fn sockets() -> Result<Vec<RawSocket>, ProbeError> {
        let mut sockets = Vec::new();

        let buf = fetch_table(Table::Tcp, AF_INET)?;
        // SAFETY: buffer was filled by GetExtendedTcpTable with this table class.
        let rows = unsafe { table_rows::<MIB_TCPTABLE_OWNER_PID, MIB_TCPROW_OWNER_PID>(&buf) };
        sockets.extend(rows.iter().map(|row| RawSocket {
            pid: owner(row.dwOwningPid),
            local: endpoint(v4(row.dwLocalAddr, row.dwLocalPort)),
            remote: endpoint(v4(row.dwRemoteAddr, row.dwRemotePort)),
            state: Some(tcp_state(row.dwState)),
        }));

        let buf = fetch_table(Table::Tcp, AF_INET6)?;
        // SAFETY: as above, IPv6 variant.
        let rows = unsafe { table_rows::<MIB_TCP6TABLE_OWNER_PID, MIB_TCP6ROW_OWNER_PID>(&buf) };
        sockets.extend(rows.iter().map(|row| RawSocket {
            pid: owner(row.dwOwningPid),
            local: endpoint(v6(row.ucLocalAddr, row.dwLocalPort)),
            remote: endpoint(v6(row.ucRemoteAddr, row.dwRemotePort)),
            state: Some(tcp_state(row.dwState)),
        }));

        let buf = fetch_table(Table::Udp, AF_INET)?;
        // SAFETY: buffer was filled by GetExtendedUdpTable with this table class.
        let rows = unsafe { table_rows::<MIB_UDPTABLE_OWNER_PID, MIB_UDPROW_OWNER_PID>(&buf) };
        sockets.extend(rows.iter().map(|row| RawSocket {
            pid: owner(row.dwOwningPid),
            local: endpoint(v4(row.dwLocalAddr, row.dwLocalPort)),
            remote: None,
            state: None,
        }));

        let buf = fetch_table(Table::Udp, AF_INET6)?;
        // SAFETY: as above, IPv6 variant.
        let rows = unsafe { table_rows::<MIB_UDP6TABLE_OWNER_PID, MIB_UDP6ROW_OWNER_PID>(&buf) };
        sockets.extend(rows.iter().map(|row| RawSocket {
            pid: owner(row.dwOwningPid),
            local: endpoint(v6(row.ucLocalAddr, row.dwLocalPort)),
            remote: None,
            state: None,
        }));

        Ok(sockets)
    }

    fn process_io(pid: u32) -> Result<IoStats, ProbeError> {
        unsafe {
            let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid);
            if handle.is_null() {
                return Err(ProbeError::PermissionDenied);
            }
            let mut counters = std::mem::zeroed::<IO_COUNTERS>();
            let ok = GetProcessIoCounters(handle, &mut counters);
            CloseHandle(handle);
            if ok == 0 {
                return Err(ProbeError::Unsupported);
            }
            Ok(IoStats {
                read_bytes: counters.ReadTransferCount,
                write_bytes: counters.WriteTransferCount,
            })
        }
    }

    fn interface_drops() -> Result<DropCounters, ProbeError> {
        Ok(DropCounters::default())
    }
}

/// Calls the sizing/filling pair for one table. `u32` storage keeps the rows
/// 4-byte aligned.
fn fetch_table(table: Table, family: u32) -> Result<Vec<u32>, ProbeError> {
    let mut size: u32 = 0;
    let mut buf: Vec<u32> = Vec::new();
    loop {
        let ptr = if buf.is_empty() {
            std::ptr::null_mut()
        } else {
            buf.as_mut_ptr() as *mut c_void
        };
        let status = unsafe {
            match table {
                Table::Tcp => {
                    GetExtendedTcpTable(ptr, &mut size, 0, family, TCP_TABLE_OWNER_PID_ALL, 0)
                }
                Table::Udp => {
                    GetExtendedUdpTable(ptr, &mut size, 0, family, UDP_TABLE_OWNER_PID, 0)
                }
            }
        };
        match status {
            NO_ERROR => return Ok(buf),
            // The table can grow between the sizing call and the fill.
            ERROR_INSUFFICIENT_BUFFER => buf = vec![0u32; (size as usize).div_ceil(4)],
            ERROR_ACCESS_DENIED => return Err(ProbeError::PermissionDenied),
            code => {
                return Err(ProbeError::Io(std::io::Error::from_raw_os_error(code as i32)));
            }
        }
    }
}

/// Reads the `dwNumEntries` + row array layout shared by every
/// `MIB_*TABLE_OWNER_PID` struct.
///
/// # Safety
/// `buf` must hold a table of type `T` whose rows are `R`.
unsafe fn table_rows<T, R>(buf: &[u32]) -> &[R] {
    if buf.is_empty() {
        return &[];
    }
    let count = buf[0] as usize;
    let header = std::mem::size_of::<T>() - std::mem::size_of::<R>();
    let first = unsafe { (buf.as_ptr() as *const u8).add(header) as *const R };
    unsafe { std::slice::from_raw_parts(first, count) }
}

fn owner(pid: u32) -> Option<u32> {
    // 0 is the System Idle Process, which stands in for "no owner".
    (pid != 0).then_some(pid)
}

fn port(raw: u32) -> u16 {
    u16::from_be(raw as u16)
}

fn v4(addr: u32, raw_port: u32) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::from(addr.to_ne_bytes())), port(raw_port))
}

fn v6(addr: [u8; 16], raw_port: u32) -> SocketAddr {
    SocketAddr::new(IpAddr::V6(Ipv6Addr::from(addr)), port(raw_port))
}

fn tcp_state(code: u32) -> TcpState {
    match code {
        2 => TcpState::Listen,
        3 => TcpState::SynSent,
        4 => TcpState::SynRecv,
        5 => TcpState::Established,
        6 => TcpState::FinWait1,
        7 => TcpState::FinWait2,
        8 => TcpState::CloseWait,
        9 => TcpState::Closing,
        10 => TcpState::LastAck,
        11 => TcpState::TimeWait,
        12 => TcpState::DeleteTcb,
        _ => TcpState::Close,
    }
}
