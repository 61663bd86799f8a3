use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};

use crate::system::connection::{Connection, NOT_APPLICABLE, Protocol};
use crate::ui::theme::Theme;

const HEADERS: [&str; 6] = [
    "PID",
    "Process",
    "Type",
    "Local Address",
    "Remote Address",
    "Status",
];

pub fn render(
    frame: &mut Frame,
    area: Rect,
    connections: &[&Connection],
    sort_label: &str,
    state: &mut TableState,
    theme: &Theme,
) {
    let header = Row::new(HEADERS.iter().map(|h| {
        let label = if *h == sort_label {
            format!("{h}\u{25BE}")
        } else {
            h.to_string()
        };
        Cell::from(label)
    }))
    .style(
        Style::default()
            .fg(theme.table_header_fg)
            .add_modifier(Modifier::BOLD),
    );

    let rows = connections.iter().map(|c| connection_row(c, theme));

    let widths = [
        Constraint::Length(8),
        Constraint::Min(14),
        Constraint::Length(5),
        Constraint::Min(22),
        Constraint::Min(22),
        Constraint::Length(12),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            format!(" Active Connections ({}) ", connections.len()),
            Style::default().fg(theme.text_secondary),
        ));

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1)
        .row_highlight_style(Style::default().bg(theme.row_highlight_bg))
        .highlight_symbol("\u{25B6} ");

    frame.render_stateful_widget(table, area, state);
}

fn connection_row<'a>(c: &Connection, theme: &Theme) -> Row<'a> {
    let pid = c
        .pid
        .map(|p| p.to_string())
        .unwrap_or_else(|| NOT_APPLICABLE.to_string());
    let proto_color = match c.protocol {
        Protocol::Tcp => theme.tcp_fg,
        Protocol::Udp => theme.udp_fg,
    };
    Row::new(vec![
        Cell::from(pid),
        Cell::from(c.process_name.clone()),
        Cell::from(c.protocol.label()).style(Style::default().fg(proto_color)),
        Cell::from(c.local_address.clone()),
        Cell::from(c.remote_address.clone()),
        Cell::from(c.status.clone()).style(Style::default().fg(theme.text_secondary)),
    ])
    .style(Style::default().fg(theme.text_primary))
}
