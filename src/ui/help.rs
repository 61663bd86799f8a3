use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::HelpSection;
use crate::ui::theme::Theme;

const WIDTH: u16 = 44;

/// Keybind overlay, grouped by the tab or mode each key applies to.
pub fn render(frame: &mut Frame, area: Rect, sections: &[HelpSection], theme: &Theme) {
    let lines = section_lines(sections, theme);
    let width = WIDTH.min(area.width.saturating_sub(4));
    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));

    let overlay = centered_rect(width, height, area);
    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " Keybinds ",
            Style::default()
                .fg(theme.tab_active)
                .add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Span::styled(
            " Esc to close ",
            Style::default().fg(theme.pill_desc_fg),
        ));
    let inner = block.inner(overlay);

    frame.render_widget(block, overlay);
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(theme.surface_bg)),
        inner,
    );
}

fn section_lines<'a>(sections: &'a [HelpSection], theme: &Theme) -> Vec<Line<'a>> {
    let heading = Style::default()
        .fg(theme.tab_active)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let key = Style::default()
        .fg(theme.pill_key_fg)
        .bg(theme.pill_key_bg)
        .add_modifier(Modifier::BOLD);
    let desc = Style::default().fg(theme.pill_desc_fg);

    let mut lines = Vec::new();
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(format!(" {}", section.title), heading)));
        for (label, text) in &section.entries {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(format!(" {label:>6} "), key),
                Span::styled(format!("  {text}"), desc),
            ]));
        }
    }
    lines
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let [vert] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [horiz] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(vert);
    horiz
}
