pub mod bandwidth_table;
pub mod connections_table;
pub mod header;
pub mod help;
pub mod statusbar;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Tabs;

use crate::app::{App, Tab};
use crate::system::probe::Probe;
use crate::ui::theme::Theme;

pub fn draw<P: Probe>(frame: &mut Frame, app: &mut App<P>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    header::render(
        frame,
        chunks[0],
        app.snapshot.stats.as_ref(),
        app.last_refresh.is_some(),
        &app.theme,
    );

    render_tabs(
        frame,
        chunks[1],
        app.tab,
        app.visible_connections().len(),
        app.visible_bandwidth().len(),
        &app.theme,
    );

    let sort_label = app.sort_mode.label();
    // Rows borrow the app, so the selection state is moved out while drawing.
    let mut table_state = std::mem::take(&mut app.table_state);
    match app.tab {
        Tab::Connections => {
            let rows = app.visible_connections();
            connections_table::render(
                frame,
                chunks[2],
                &rows,
                sort_label,
                &mut table_state,
                &app.theme,
            );
        }
        Tab::Bandwidth => {
            let rows = app.visible_bandwidth();
            bandwidth_table::render(
                frame,
                chunks[2],
                &rows,
                app.refreshes,
                &mut table_state,
                &app.theme,
            );
        }
    }
    app.table_state = table_state;

    statusbar::render(
        frame,
        chunks[3],
        app.input_mode,
        &app.filter_text,
        app.tab,
        sort_label,
        &app.theme,
    );

    // Help overlay goes last so it draws on top
    if app.show_help() {
        help::render(frame, frame.area(), &app.help_sections(), &app.theme);
    }
}

fn render_tabs(
    frame: &mut Frame,
    area: Rect,
    active: Tab,
    connections: usize,
    bandwidth: usize,
    theme: &Theme,
) {
    let titles = vec![
        Line::from(format!(" Active Connections ({connections}) ")),
        Line::from(format!(" Bandwidth Usage ({bandwidth}) ")),
    ];
    let tabs = Tabs::new(titles)
        .select(active.index())
        .style(Style::default().fg(theme.text_secondary))
        .highlight_style(
            Style::default()
                .fg(theme.tab_active)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .divider("|");
    frame.render_widget(tabs, area);
}

#[cfg(test)]
mod tests;
