use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use openwire::system::Sampler;
use openwire::system::bandwidth::ProcessIo;
use openwire::system::connection::{RawSocket, TcpState};
use openwire::system::error::ProbeError;
use openwire::system::platform::IoStats;
use openwire::system::probe::Probe;
use openwire::system::stats::NetworkStats;
use proptest::prelude::*;

/// Replays scripted readings. Each bandwidth pass pops one entry of
/// `pid -> (written, read)` counters.
#[derive(Default)]
struct ScriptedProbe {
    sockets: Vec<RawSocket>,
    names: HashMap<u32, String>,
    passes: VecDeque<HashMap<u32, (u64, u64)>>,
}

impl Probe for ScriptedProbe {
    fn sockets(&self) -> Result<Vec<RawSocket>, ProbeError> {
        Ok(self.sockets.clone())
    }

    fn process_names(&self) -> Result<HashMap<u32, String>, ProbeError> {
        Ok(self.names.clone())
    }

    fn io_counters(&mut self) -> Result<Vec<ProcessIo>, ProbeError> {
        let pass = self.passes.pop_front().unwrap_or_default();
        Ok(pass
            .into_iter()
            .map(|(pid, (write_bytes, read_bytes))| ProcessIo {
                pid,
                name: format!("proc{pid}"),
                io: Ok(IoStats {
                    read_bytes,
                    write_bytes,
                }),
            })
            .collect())
    }

    fn interface_totals(&self) -> Result<NetworkStats, ProbeError> {
        Err(ProbeError::Unsupported)
    }
}

fn sampler_with(passes: Vec<HashMap<u32, (u64, u64)>>) -> (Sampler<ScriptedProbe>, Instant) {
    let start = Instant::now();
    let probe = ScriptedProbe {
        passes: passes.into(),
        ..Default::default()
    };
    (Sampler::with_probe_at(probe, start), start)
}

fn counters() -> impl Strategy<Value = HashMap<u32, (u64, u64)>> {
    proptest::collection::hash_map(1u32..200, (0u64..(1 << 40), 0u64..(1 << 40)), 0..40)
}

proptest! {
    #[test]
    fn rates_are_finite_non_negative_and_sum_to_total(
        first in counters(),
        second in counters(),
        elapsed_ms in 100u64..60_000,
    ) {
        let (mut sampler, start) = sampler_with(vec![first.clone(), second.clone()]);
        let seeded = sampler.compute_bandwidth_at(start + Duration::from_millis(elapsed_ms));
        prop_assert!(seeded.is_empty());

        let later = start + Duration::from_millis(elapsed_ms * 2);
        let rates = sampler.compute_bandwidth_at(later);

        for (pid, sample) in &rates {
            prop_assert_eq!(*pid, sample.pid);
            prop_assert!(first.contains_key(pid) && second.contains_key(pid));
            prop_assert!(sample.upload_rate.is_finite() && sample.upload_rate >= 0.0);
            prop_assert!(sample.download_rate.is_finite() && sample.download_rate >= 0.0);
            let sum = sample.upload_rate + sample.download_rate;
            prop_assert!((sample.total_rate - sum).abs() <= sum.abs() * 1e-9 + 1e-9);
        }
        let expected = second.keys().filter(|pid| first.contains_key(pid)).count();
        prop_assert_eq!(rates.len(), expected);
    }

    #[test]
    fn calls_inside_the_guard_window_are_empty_and_free(
        pass in counters(),
        gap_ms in 0u64..100,
    ) {
        let (mut sampler, start) = sampler_with(vec![pass.clone(), pass]);
        let first = start + Duration::from_secs(1);
        sampler.compute_bandwidth_at(first);

        let rapid = sampler.compute_bandwidth_at(first + Duration::from_millis(gap_ms));
        prop_assert!(rapid.is_empty());
        // The scripted second pass must still be unread.
        prop_assert_eq!(sampler.probe().passes.len(), 1);
    }
}

#[test]
fn counter_reset_clamps_to_zero() {
    let (mut sampler, start) = sampler_with(vec![
        HashMap::from([(9, (5_000, 5_000))]),
        HashMap::from([(9, (1_000, 6_000))]),
    ]);
    sampler.compute_bandwidth_at(start + Duration::from_secs(1));
    let rates = sampler.compute_bandwidth_at(start + Duration::from_secs(2));

    let sample = &rates[&9];
    assert_eq!(sample.upload_rate, 0.0);
    assert_eq!(sample.download_rate, 1000.0);
    assert_eq!(sample.total_rate, 1000.0);
}

#[test]
fn pid_that_disappears_and_returns_starts_over() {
    let (mut sampler, start) = sampler_with(vec![
        HashMap::from([(5, (100, 100))]),
        HashMap::new(),
        HashMap::from([(5, (10_000, 10_000))]),
    ]);
    sampler.compute_bandwidth_at(start + Duration::from_secs(1));
    sampler.compute_bandwidth_at(start + Duration::from_secs(2));
    let rates = sampler.compute_bandwidth_at(start + Duration::from_secs(3));
    assert!(rates.is_empty(), "reused pid must be treated as new: {rates:?}");
}

#[test]
fn connections_classify_by_state_and_name_owners() {
    let probe = ScriptedProbe {
        sockets: vec![
            RawSocket {
                pid: Some(80),
                local: Some("10.0.0.2:443".parse().unwrap()),
                remote: Some("10.0.0.9:51000".parse().unwrap()),
                state: Some(TcpState::Established),
            },
            RawSocket {
                pid: Some(81),
                local: Some("[::1]:5353".parse().unwrap()),
                remote: None,
                state: None,
            },
            RawSocket {
                pid: None,
                local: Some("0.0.0.0:68".parse().unwrap()),
                remote: None,
                state: None,
            },
        ],
        names: HashMap::from([(80, "nginx".to_string())]),
        ..Default::default()
    };
    let sampler = Sampler::with_probe(probe);
    let conns = sampler.list_connections();

    assert_eq!(conns.len(), 3);
    assert_eq!(conns[0].process_name, "nginx");
    assert_eq!(conns[0].protocol.label(), "TCP");
    assert_eq!(conns[0].remote_address, "10.0.0.9:51000");
    assert_eq!(conns[0].status, "ESTABLISHED");

    assert_eq!(conns[1].process_name, "PID 81");
    assert_eq!(conns[1].protocol.label(), "UDP");
    assert_eq!(conns[1].local_address, "::1:5353");
    assert_eq!(conns[1].remote_address, "N/A");
    assert_eq!(conns[1].status, "N/A");

    assert_eq!(conns[2].pid, None);
    assert_eq!(conns[2].process_name, "System");
}

#[test]
fn unavailable_stats_are_none() {
    let (sampler, _) = sampler_with(Vec::new());
    assert!(sampler.get_network_stats().is_none());
}
