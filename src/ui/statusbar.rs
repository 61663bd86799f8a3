use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{InputMode, Tab};
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    input_mode: InputMode,
    filter_text: &str,
    tab: Tab,
    sort_label: &str,
    theme: &Theme,
) {
    let bg_style = Style::default().bg(theme.statusbar_bg);

    let line = match input_mode {
        InputMode::Filter => {
            let mut spans = vec![
                Span::styled(
                    " / ",
                    Style::default()
                        .fg(theme.pill_key_fg)
                        .bg(theme.pill_key_bg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {filter_text}"),
                    Style::default().fg(theme.pill_desc_fg),
                ),
                Span::styled("\u{2588}", Style::default().fg(theme.pill_key_bg)),
            ];
            spans.extend(pill_spans("Esc", "Cancel", theme));
            spans.extend(pill_spans("Enter", "Apply", theme));
            Line::from(spans)
        }
        _ => {
            let mut spans = Vec::new();
            if !filter_text.is_empty() {
                spans.push(Span::styled(
                    " Filter: ",
                    Style::default()
                        .fg(theme.pill_key_bg)
                        .add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::styled(
                    filter_text.to_string(),
                    Style::default().fg(theme.pill_desc_fg),
                ));
                spans.extend(pill_spans("Esc", "Clear", theme));
            }
            spans.extend(pill_spans("q", "Quit", theme));
            spans.extend(pill_spans("r", "Refresh Now", theme));
            spans.extend(pill_spans("Tab", "Switch", theme));
            spans.extend(pill_spans("/", "Filter", theme));
            match tab {
                Tab::Connections => {
                    spans.extend(pill_spans("s", "Sort", theme));
                    spans.push(Span::styled(
                        format!(" by {sort_label}"),
                        Style::default().fg(theme.pill_desc_fg),
                    ));
                }
                Tab::Bandwidth => spans.extend(pill_spans("i", "Idle", theme)),
            }
            spans.extend(pill_spans("?", "Help", theme));
            Line::from(spans)
        }
    };

    frame.render_widget(Paragraph::new(line).style(bg_style), area);
}

fn pill_spans<'a>(key: &'a str, desc: &'a str, theme: &Theme) -> Vec<Span<'a>> {
    vec![
        Span::raw(" "),
        Span::styled(
            format!(" {key} "),
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {desc}"),
            Style::default().fg(theme.pill_desc_fg).bg(theme.surface_bg),
        ),
    ]
}
