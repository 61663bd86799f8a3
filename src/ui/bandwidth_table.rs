use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::format::format_bandwidth;
use crate::system::bandwidth::BandwidthSample;
use crate::ui::theme::Theme;

const HEADERS: [&str; 5] = ["PID", "Process", "Upload", "Download", "Total"];

/// `polls` is the number of refreshes so far; rates need two.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    samples: &[&BandwidthSample],
    polls: u64,
    state: &mut TableState,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            format!(" Bandwidth Usage ({}) ", samples.len()),
            Style::default().fg(theme.text_secondary),
        ))
        .title_bottom(Span::styled(
            " estimated from process I/O counters ",
            Style::default().fg(theme.text_muted),
        ));

    if samples.is_empty() {
        let msg = if polls < 2 {
            "Collecting initial sample…"
        } else {
            "No active bandwidth detected"
        };
        let line = Line::from(Span::styled(
            format!(" {msg}"),
            Style::default().fg(theme.text_muted),
        ));
        frame.render_widget(Paragraph::new(line).block(block), area);
        return;
    }

    let header = Row::new(HEADERS.iter().map(|h| Cell::from(*h))).style(
        Style::default()
            .fg(theme.table_header_fg)
            .add_modifier(Modifier::BOLD),
    );

    let rows = samples.iter().map(|s| {
        Row::new(vec![
            Cell::from(s.pid.to_string()),
            Cell::from(s.process_name.clone()),
            Cell::from(format_bandwidth(s.upload_rate)).style(Style::default().fg(theme.upload_fg)),
            Cell::from(format_bandwidth(s.download_rate))
                .style(Style::default().fg(theme.download_fg)),
            Cell::from(format_bandwidth(s.total_rate)),
        ])
        .style(Style::default().fg(theme.text_primary))
    });

    let widths = [
        Constraint::Length(8),
        Constraint::Min(20),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1)
        .row_highlight_style(Style::default().bg(theme.row_highlight_bg))
        .highlight_symbol("\u{25B6} ");

    frame.render_stateful_widget(table, area, state);
}
