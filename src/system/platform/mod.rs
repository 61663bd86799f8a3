use super::connection::RawSocket;
use super::error::ProbeError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IoStats {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// Per-interface packet drops summed over all interfaces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DropCounters {
    pub drops_in: u64,
    pub drops_out: u64,
}

pub trait PlatformExtensions {
    fn sockets() -> Result<Vec<RawSocket>, ProbeError>;
    fn process_io(pid: u32) -> Result<IoStats, ProbeError>;
    fn interface_drops() -> Result<DropCounters, ProbeError>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub fn sockets() -> Result<Vec<RawSocket>, ProbeError> {
    platform_impl::Platform::sockets()
}

pub fn process_io(pid: u32) -> Result<IoStats, ProbeError> {
    platform_impl::Platform::process_io(pid)
}

pub fn interface_drops() -> Result<DropCounters, ProbeError> {
    platform_impl::Platform::interface_drops()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrappers_do_not_panic_for_current_pid() {
        let pid = std::process::id();
        let _ = sockets();
        let _ = process_io(pid);
        let _ = interface_drops();
    }
}
