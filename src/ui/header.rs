use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::system::stats::{NetworkStats, STATS_UNAVAILABLE};
use crate::ui::theme::Theme;

/// Title bar plus the "Network Statistics" line. `collected` is false until
/// the first refresh has run.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    stats: Option<&NetworkStats>,
    collected: bool,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " openwire ",
            Style::default()
                .fg(theme.header_accent_fg)
                .bg(theme.header_accent_bg)
                .add_modifier(Modifier::BOLD),
        ))
        .title(Span::styled(
            " Network Statistics ",
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let line = match stats {
        Some(stats) => stats_line(stats, theme),
        None if !collected => Line::from(Span::styled(
            " Collecting…",
            Style::default().fg(theme.text_muted),
        )),
        None => Line::from(Span::styled(
            format!(" {STATS_UNAVAILABLE}"),
            Style::default().fg(theme.warning_fg),
        )),
    };
    frame.render_widget(Paragraph::new(line), inner);
}

fn stats_line<'a>(stats: &NetworkStats, theme: &Theme) -> Line<'a> {
    let style = if stats.errors() + stats.drops() > 0 {
        Style::default().fg(theme.warning_fg)
    } else {
        Style::default().fg(theme.text_primary)
    };
    Line::from(vec![Span::raw(" "), Span::styled(stats.summary(), style)])
}
