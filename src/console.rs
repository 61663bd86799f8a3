//! Plain-text renderer for `--once`: one pass over the sampler, printed to
//! stdout instead of drawn in the terminal UI.

use std::collections::HashMap;
use std::fmt::Write;
use std::time::Duration;

use color_eyre::Result;

use crate::config::ConsoleConfig;
use crate::format::{clip_width, format_bandwidth, format_bytes, format_count};
use crate::system::Sampler;
use crate::system::bandwidth::{BandwidthSample, ranked};
use crate::system::connection::{Connection, NOT_APPLICABLE};
use crate::system::probe::Probe;
use crate::system::snapshot::NetworkSnapshot;
use crate::system::stats::{NetworkStats, STATS_UNAVAILABLE};

const CELL: usize = 24;
const RULE: usize = 70;

fn section(out: &mut String, n: u8, title: &str) {
    let _ = writeln!(out, "\n[{n}] {title}:");
    let _ = writeln!(out, "{}", "-".repeat(RULE));
}

pub fn render_stats(stats: Option<&NetworkStats>) -> String {
    let mut out = String::new();
    section(&mut out, 1, "Network Statistics");
    let Some(stats) = stats else {
        let _ = writeln!(out, "  {STATS_UNAVAILABLE}");
        return out;
    };
    let _ = writeln!(out, "  Total Sent:     {}", format_bytes(stats.bytes_sent as f64));
    let _ = writeln!(
        out,
        "  Total Received: {}",
        format_bytes(stats.bytes_received as f64)
    );
    let _ = writeln!(out, "  Packets Sent:   {}", format_count(stats.packets_sent));
    let _ = writeln!(out, "  Packets Recv:   {}", format_count(stats.packets_received));
    if stats.errors() > 0 {
        let _ = writeln!(out, "  Errors:         {}", stats.errors());
    }
    if stats.drops() > 0 {
        let _ = writeln!(out, "  Drops:          {}", stats.drops());
    }
    out
}

pub fn render_connections(snapshot: &NetworkSnapshot, max_rows: usize) -> String {
    let mut out = String::new();
    section(&mut out, 2, "Active Connections");
    let (tcp, udp) = snapshot.protocol_counts();
    let _ = writeln!(out, "  Total connections: {}", snapshot.connections.len());
    let _ = writeln!(out, "  TCP: {tcp}, UDP: {udp}");

    let _ = writeln!(out, "\n  First {max_rows} connections:");
    let _ = writeln!(
        out,
        "  {:<8} {:<25} {:<5} {:<25} {:<25} {:<15}",
        "PID", "Process", "Type", "Local", "Remote", "Status"
    );
    let _ = writeln!(out, "  {}", "-".repeat(103));
    for conn in snapshot.connections.iter().take(max_rows) {
        let _ = writeln!(out, "{}", connection_line(conn));
    }
    out
}

fn connection_line(conn: &Connection) -> String {
    let pid = conn
        .pid
        .map(|p| p.to_string())
        .unwrap_or_else(|| NOT_APPLICABLE.to_string());
    format!(
        "  {:<8} {:<25} {:<5} {:<25} {:<25} {:<15}",
        pid,
        clip_width(&conn.process_name, CELL),
        conn.protocol.label(),
        clip_width(&conn.local_address, CELL),
        clip_width(&conn.remote_address, CELL),
        conn.status,
    )
    .trim_end()
    .to_string()
}

/// Ranked table of the processes that moved bytes during `window`.
pub fn render_bandwidth(
    samples: &HashMap<u32, BandwidthSample>,
    max_rows: usize,
    window: Duration,
) -> String {
    let mut out = String::new();
    let active = ranked(samples, false);
    if active.is_empty() {
        let secs = window.as_millis() as f64 / 1000.0;
        let _ = writeln!(
            out,
            "  No active bandwidth detected in this {secs}-second window"
        );
        let _ = writeln!(out, "  (Try running network-intensive tasks for better results)");
        return out;
    }

    let _ = writeln!(out, "\n  Processes with active bandwidth (top {max_rows}):");
    let _ = writeln!(
        out,
        "  {:<8} {:<30} {:<15} {:<15} {:<15}",
        "PID", "Process", "Upload", "Download", "Total"
    );
    let _ = writeln!(out, "  {}", "-".repeat(83));
    for s in active.into_iter().take(max_rows) {
        let line = format!(
            "  {:<8} {:<30} {:<15} {:<15} {:<15}",
            s.pid,
            clip_width(&s.process_name, 29),
            format_bandwidth(s.upload_rate),
            format_bandwidth(s.download_rate),
            format_bandwidth(s.total_rate),
        );
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

/// Two bandwidth passes `window` apart; returns the rates from the second.
///
/// The sampler should be primed (see [`Sampler::with_probe_primed`]) or the
/// first pass lands inside the minimum interval and seeds nothing.
pub async fn sample_window<P: Probe>(
    sampler: &mut Sampler<P>,
    window: Duration,
) -> HashMap<u32, BandwidthSample> {
    sampler.compute_bandwidth();
    tokio::time::sleep(window).await;
    sampler.compute_bandwidth()
}

/// Connections and stats now, bandwidth over `window`.
pub async fn windowed_snapshot<P: Probe>(
    sampler: &mut Sampler<P>,
    window: Duration,
) -> NetworkSnapshot {
    let bandwidth = sample_window(sampler, window).await;
    NetworkSnapshot {
        connections: sampler.list_connections(),
        bandwidth,
        stats: sampler.get_network_stats(),
    }
}

/// Prints stats and connections, then samples bandwidth twice `window`
/// apart and prints the ranked result.
pub async fn run<P: Probe>(sampler: &mut Sampler<P>, config: &ConsoleConfig) -> Result<()> {
    let window = Duration::from_millis(config.sample_window_ms);
    let rule = "=".repeat(RULE);

    println!("{rule}");
    println!("OpenWire - Network Monitor");
    println!("{rule}");

    let snapshot = NetworkSnapshot {
        connections: sampler.list_connections(),
        bandwidth: HashMap::new(),
        stats: sampler.get_network_stats(),
    };
    print!("{}", render_stats(snapshot.stats.as_ref()));
    print!("{}", render_connections(&snapshot, config.max_rows));

    let mut header = String::new();
    section(&mut header, 3, "Bandwidth Monitoring");
    print!("{header}");
    println!("  Collecting samples {} ms apart...", window.as_millis());
    let bandwidth = sample_window(sampler, window).await;
    print!("{}", render_bandwidth(&bandwidth, config.max_rows, window));

    println!("\n{rule}");
    Ok(())
}

/// Same passes as [`run`], emitted as one pretty-printed JSON document.
pub async fn run_json<P: Probe>(sampler: &mut Sampler<P>, config: &ConsoleConfig) -> Result<()> {
    let window = Duration::from_millis(config.sample_window_ms);
    let snapshot = windowed_snapshot(sampler, window).await;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
