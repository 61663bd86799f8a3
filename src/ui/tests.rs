use std::collections::HashMap;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::widgets::TableState;

use crate::app::{App, HelpSection, InputMode, Tab};
use crate::config::Config;
use crate::system::bandwidth::BandwidthSample;
use crate::system::connection::{Connection, Protocol};
use crate::system::snapshot::NetworkSnapshot;
use crate::system::stats::NetworkStats;
use crate::ui::theme::Theme;
use crate::ui::{bandwidth_table, connections_table, header, help, statusbar};

fn buffer_to_string(buf: &ratatui::buffer::Buffer) -> String {
    let area = buf.area;
    let mut out = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            let cell = buf.cell((x, y)).unwrap();
            out.push_str(cell.symbol());
        }
        if y + 1 < area.height {
            out.push('\n');
        }
    }
    out
}

fn render_to_string<F>(width: u16, height: u16, draw: F) -> String
where
    F: FnOnce(&mut ratatui::Frame),
{
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(draw).unwrap();
    let buf = terminal.backend().buffer();
    buffer_to_string(buf)
}

fn make_connection(pid: Option<u32>, name: &str, protocol: Protocol, status: &str) -> Connection {
    Connection {
        pid,
        process_name: name.to_string(),
        protocol,
        local_address: "127.0.0.1:8080".to_string(),
        remote_address: "N/A".to_string(),
        status: status.to_string(),
    }
}

fn make_sample(pid: u32, name: &str, up: f64, down: f64) -> BandwidthSample {
    BandwidthSample {
        pid,
        process_name: name.to_string(),
        upload_rate: up,
        download_rate: down,
        total_rate: up + down,
    }
}

// ── header ───────────────────────────────────────────────────────────

#[test]
fn header_shows_stats_summary() {
    let theme = Theme::dark();
    let stats = NetworkStats {
        bytes_sent: 2048,
        bytes_received: 1024 * 1024,
        packets_sent: 1500,
        packets_received: 12,
        ..Default::default()
    };
    let out = render_to_string(140, 3, |frame| {
        header::render(frame, frame.area(), Some(&stats), true, &theme);
    });
    assert!(out.contains("openwire"), "{out}");
    assert!(out.contains("Total Sent: 2.00 KB"), "{out}");
    assert!(out.contains("Total Received: 1.00 MB"), "{out}");
    assert!(out.contains("Packets Sent: 1,500"), "{out}");
    assert!(!out.contains("Errors"), "{out}");
}

#[test]
fn header_before_first_refresh_says_collecting() {
    let theme = Theme::dark();
    let out = render_to_string(60, 3, |frame| {
        header::render(frame, frame.area(), None, false, &theme);
    });
    assert!(out.contains("Collecting"), "{out}");
}

#[test]
fn header_without_stats_after_refresh_says_unavailable() {
    let theme = Theme::dark();
    let out = render_to_string(80, 3, |frame| {
        header::render(frame, frame.area(), None, true, &theme);
    });
    assert!(out.contains("Unable to retrieve network statistics"), "{out}");
}

// ── connections table ────────────────────────────────────────────────

#[test]
fn connections_table_lists_rows_and_marks_sort_column() {
    let theme = Theme::dark();
    let conns = [
        make_connection(Some(42), "nginx", Protocol::Tcp, "LISTEN"),
        make_connection(None, "System", Protocol::Udp, "N/A"),
    ];
    let rows: Vec<&Connection> = conns.iter().collect();
    let mut state = TableState::default();
    let out = render_to_string(110, 8, |frame| {
        connections_table::render(frame, frame.area(), &rows, "Process", &mut state, &theme);
    });
    assert!(out.contains("Active Connections (2)"), "{out}");
    assert!(out.contains("Process\u{25BE}"), "{out}");
    assert!(out.contains("nginx"), "{out}");
    assert!(out.contains("LISTEN"), "{out}");
    assert!(out.contains("UDP"), "{out}");
    assert!(out.contains("127.0.0.1:8080"), "{out}");
}

#[test]
fn connections_table_without_pid_shows_not_applicable() {
    let theme = Theme::dark();
    let conns = [make_connection(None, "System", Protocol::Tcp, "TIME_WAIT")];
    let rows: Vec<&Connection> = conns.iter().collect();
    let mut state = TableState::default();
    let out = render_to_string(110, 5, |frame| {
        connections_table::render(frame, frame.area(), &rows, "PID", &mut state, &theme);
    });
    let data_line = out
        .lines()
        .find(|l| l.contains("TIME_WAIT"))
        .expect("row rendered");
    assert!(data_line.contains("N/A"), "{data_line}");
    assert!(data_line.contains("System"), "{data_line}");
}

// ── bandwidth table ──────────────────────────────────────────────────

#[test]
fn bandwidth_table_first_poll_says_collecting() {
    let theme = Theme::dark();
    let mut state = TableState::default();
    let out = render_to_string(80, 5, |frame| {
        bandwidth_table::render(frame, frame.area(), &[], 1, &mut state, &theme);
    });
    assert!(out.contains("Collecting initial sample"), "{out}");
}

#[test]
fn bandwidth_table_later_polls_say_no_activity() {
    let theme = Theme::dark();
    let mut state = TableState::default();
    let out = render_to_string(80, 5, |frame| {
        bandwidth_table::render(frame, frame.area(), &[], 3, &mut state, &theme);
    });
    assert!(out.contains("No active bandwidth detected"), "{out}");
}

#[test]
fn bandwidth_table_formats_rates() {
    let theme = Theme::dark();
    let samples = [make_sample(42, "curl", 1024.0, 512.0)];
    let rows: Vec<&BandwidthSample> = samples.iter().collect();
    let mut state = TableState::default();
    let out = render_to_string(100, 6, |frame| {
        bandwidth_table::render(frame, frame.area(), &rows, 2, &mut state, &theme);
    });
    assert!(out.contains("curl"), "{out}");
    assert!(out.contains("1.00 KB/s"), "{out}");
    assert!(out.contains("512.00 B/s"), "{out}");
    assert!(out.contains("1.50 KB/s"), "{out}");
    assert!(out.contains("estimated from process I/O counters"), "{out}");
}

// ── status bar ───────────────────────────────────────────────────────

#[test]
fn statusbar_normal_mode_shows_sort_on_connections_tab() {
    let theme = Theme::dark();
    let out = render_to_string(140, 1, |frame| {
        statusbar::render(
            frame,
            frame.area(),
            InputMode::Normal,
            "",
            Tab::Connections,
            "PID",
            &theme,
        );
    });
    assert!(out.contains("Quit"), "{out}");
    assert!(out.contains("Sort"), "{out}");
    assert!(out.contains("by PID"), "{out}");
    assert!(!out.contains("Idle"), "{out}");
}

#[test]
fn statusbar_filter_mode_echoes_text() {
    let theme = Theme::dark();
    let out = render_to_string(100, 1, |frame| {
        statusbar::render(
            frame,
            frame.area(),
            InputMode::Filter,
            "fire",
            Tab::Bandwidth,
            "PID",
            &theme,
        );
    });
    assert!(out.contains("fire"), "{out}");
    assert!(out.contains("Apply"), "{out}");
}

// ── help overlay ─────────────────────────────────────────────────────

#[test]
fn help_overlay_groups_entries_under_headings() {
    let theme = Theme::dark();
    let sections = vec![
        HelpSection {
            title: "Global",
            entries: vec![("q".to_string(), "Quit"), ("r".to_string(), "Refresh now")],
        },
        HelpSection {
            title: "Bandwidth",
            entries: vec![("i".to_string(), "Show idle processes")],
        },
    ];
    let out = render_to_string(60, 14, |frame| {
        help::render(frame, frame.area(), &sections, &theme);
    });
    assert!(out.contains("Keybinds"), "{out}");
    let lines: Vec<&str> = out.lines().collect();
    let row = |needle: &str| {
        lines
            .iter()
            .position(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("{needle} missing:\n{out}"))
    };
    assert!(row("Global") < row("Refresh now"));
    assert!(row("Refresh now") < row("Bandwidth"));
    assert!(row("Bandwidth") < row("Show idle processes"));
}

// ── full frame ───────────────────────────────────────────────────────

#[test]
fn draw_renders_active_tab() {
    let mut app = App::new(Config::default());
    let mut bandwidth = HashMap::new();
    bandwidth.insert(7, make_sample(7, "rsync", 4096.0, 0.0));
    app.snapshot = NetworkSnapshot {
        connections: vec![make_connection(Some(7), "rsync", Protocol::Tcp, "ESTABLISHED")],
        bandwidth,
        stats: Some(NetworkStats::default()),
    };
    app.refreshes = 2;

    let backend = TestBackend::new(120, 16);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| crate::ui::draw(frame, &mut app)).unwrap();
    let out = buffer_to_string(terminal.backend().buffer());
    assert!(out.contains("ESTABLISHED"), "{out}");
    assert!(out.contains("Bandwidth Usage (1)"), "{out}");

    app.tab = Tab::Bandwidth;
    terminal.draw(|frame| crate::ui::draw(frame, &mut app)).unwrap();
    let out = buffer_to_string(terminal.backend().buffer());
    assert!(out.contains("4.00 KB/s"), "{out}");
    assert!(!out.contains("ESTABLISHED"), "{out}");
}

#[test]
fn draw_with_help_overlay() {
    let mut app = App::new(Config::default());
    app.input_mode = InputMode::Help;
    let backend = TestBackend::new(80, 26);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| crate::ui::draw(frame, &mut app)).unwrap();
    let out = buffer_to_string(terminal.backend().buffer());
    assert!(out.contains("Keybinds"), "{out}");
    assert!(out.contains("Connections"), "{out}");
    assert!(out.contains("Cycle sort column"), "{out}");
    assert!(out.contains("Keep filter"), "{out}");
}

#[test]
fn bandwidth_tab_shows_rows_on_second_refresh() {
    use crate::system::Sampler;
    use crate::system::probe::testing::GrowingProbe;

    let sampler = Sampler::with_probe_primed(GrowingProbe::new(&[42], 8192));
    let mut app = App::with_sampler(Config::default(), sampler);
    app.tab = Tab::Bandwidth;
    let backend = TestBackend::new(100, 14);
    let mut terminal = Terminal::new(backend).unwrap();

    app.refresh_data();
    terminal.draw(|frame| crate::ui::draw(frame, &mut app)).unwrap();
    let out = buffer_to_string(terminal.backend().buffer());
    assert!(out.contains("Collecting initial sample"), "{out}");

    std::thread::sleep(std::time::Duration::from_millis(150));
    app.refresh_data();
    terminal.draw(|frame| crate::ui::draw(frame, &mut app)).unwrap();
    let out = buffer_to_string(terminal.backend().buffer());
    assert!(!out.contains("No active bandwidth detected"), "{out}");
    assert!(out.contains("proc42"), "{out}");
}
