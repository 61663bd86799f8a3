use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::TableState;

use crate::action::{Action, Direction};
use crate::config::{Config, KeybindsConfig, parse_key};
use crate::system::Sampler;
use crate::system::bandwidth::{BandwidthSample, ranked};
use crate::system::connection::Connection;
use crate::system::probe::{Probe, SystemProbe};
use crate::system::snapshot::NetworkSnapshot;
use crate::ui::theme::Theme;

const PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Filter,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Connections,
    Bandwidth,
}

impl Tab {
    pub fn next(self) -> Self {
        match self {
            Tab::Connections => Tab::Bandwidth,
            Tab::Bandwidth => Tab::Connections,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Connections => 0,
            Tab::Bandwidth => 1,
        }
    }

    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "bandwidth" | "usage" => Tab::Bandwidth,
            _ => Tab::Connections,
        }
    }
}

/// Ordering of the connections table. The bandwidth table is always ranked
/// by total rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Pid,
    Process,
    Protocol,
}

impl SortMode {
    pub fn next(self) -> Self {
        match self {
            SortMode::Pid => SortMode::Process,
            SortMode::Process => SortMode::Protocol,
            SortMode::Protocol => SortMode::Pid,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Pid => "PID",
            SortMode::Process => "Process",
            SortMode::Protocol => "Type",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub refresh: KeyCode,
    pub next_tab: KeyCode,
    pub filter: KeyCode,
    pub cycle_sort: KeyCode,
    pub help: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            refresh: parse_key(&kb.refresh).unwrap_or(KeyCode::Char('r')),
            next_tab: parse_key(&kb.next_tab).unwrap_or(KeyCode::Tab),
            filter: parse_key(&kb.filter).unwrap_or(KeyCode::Char('/')),
            cycle_sort: parse_key(&kb.cycle_sort).unwrap_or(KeyCode::Char('s')),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
        }
    }

    /// Help overlay content, one section per place the keys apply.
    pub fn help_sections(&self) -> Vec<HelpSection> {
        vec![
            HelpSection {
                title: "Global",
                entries: vec![
                    (key_label(self.quit), "Quit"),
                    ("Ctrl+C".to_string(), "Quit (always)"),
                    (key_label(self.refresh), "Refresh now"),
                    (key_label(self.next_tab), "Next tab"),
                    ("S-Tab".to_string(), "Previous tab"),
                    ("↑↓".to_string(), "Scroll"),
                    ("t".to_string(), "Cycle theme"),
                    (key_label(self.help), "Toggle help"),
                ],
            },
            HelpSection {
                title: "Connections",
                entries: vec![(key_label(self.cycle_sort), "Cycle sort column")],
            },
            HelpSection {
                title: "Bandwidth",
                entries: vec![("i".to_string(), "Show idle processes")],
            },
            HelpSection {
                title: "Filter",
                entries: vec![
                    (key_label(self.filter), "Filter by process"),
                    ("Enter".to_string(), "Keep filter"),
                    ("Esc".to_string(), "Clear filter"),
                ],
            },
        ]
    }
}

pub struct HelpSection {
    pub title: &'static str,
    pub entries: Vec<(String, &'static str)>,
}

pub fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        KeyCode::Delete => "Del".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => "?".to_string(),
    }
}

pub struct App<P: Probe = SystemProbe> {
    pub running: bool,
    pub sampler: Sampler<P>,
    pub snapshot: NetworkSnapshot,
    pub refreshes: u64,
    pub last_refresh: Option<Instant>,
    pub tab: Tab,
    pub input_mode: InputMode,
    pub filter_text: String,
    pub sort_mode: SortMode,
    pub show_idle: bool,
    pub table_state: TableState,
    pub theme: Theme,
    pub keybinds: ResolvedKeybinds,
}

impl App<SystemProbe> {
    pub fn new(config: Config) -> Self {
        Self::with_sampler(config, Sampler::primed())
    }
}

impl<P: Probe> App<P> {
    pub fn with_sampler(config: Config, sampler: Sampler<P>) -> Self {
        App {
            running: true,
            sampler,
            snapshot: NetworkSnapshot::default(),
            refreshes: 0,
            last_refresh: None,
            tab: Tab::from_str_config(&config.general.default_tab),
            input_mode: InputMode::Normal,
            filter_text: String::new(),
            sort_mode: SortMode::default(),
            show_idle: config.general.show_idle,
            table_state: TableState::default().with_selected(Some(0)),
            theme: Theme::from_config(&config.colors.theme),
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
        }
    }

    pub fn refresh_data(&mut self) {
        let _span = tracing::debug_span!("app.refresh_data").entered();

        self.snapshot = self.sampler.snapshot();
        self.refreshes += 1;
        self.last_refresh = Some(Instant::now());
        self.clamp_selection();
    }

    pub fn visible_connections(&self) -> Vec<&Connection> {
        let filter = self.filter_text.to_lowercase();
        let mut rows: Vec<&Connection> = self
            .snapshot
            .connections
            .iter()
            .filter(|c| filter.is_empty() || c.process_name.to_lowercase().contains(&filter))
            .collect();

        match self.sort_mode {
            SortMode::Pid => rows.sort_by_key(|c| c.pid),
            SortMode::Process => {
                rows.sort_by_cached_key(|c| c.process_name.to_lowercase());
            }
            SortMode::Protocol => rows.sort_by_key(|c| (c.protocol.label(), c.pid)),
        }
        rows
    }

    pub fn visible_bandwidth(&self) -> Vec<&BandwidthSample> {
        let filter = self.filter_text.to_lowercase();
        ranked(&self.snapshot.bandwidth, self.show_idle)
            .into_iter()
            .filter(|s| filter.is_empty() || s.process_name.to_lowercase().contains(&filter))
            .collect()
    }

    pub fn row_count(&self) -> usize {
        match self.tab {
            Tab::Connections => self.visible_connections().len(),
            Tab::Bandwidth => self.visible_bandwidth().len(),
        }
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.map_key_normal(key),
            InputMode::Filter => self.map_key_filter(key),
            InputMode::Help => self.map_key_help(key),
        }
    }

    fn map_key_normal(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        match code {
            KeyCode::Up => return Action::Navigate(Direction::Up),
            KeyCode::Down => return Action::Navigate(Direction::Down),
            KeyCode::PageUp => return Action::Navigate(Direction::PageUp),
            KeyCode::PageDown => return Action::Navigate(Direction::PageDown),
            KeyCode::Home => return Action::Navigate(Direction::Top),
            KeyCode::End => return Action::Navigate(Direction::Bottom),
            KeyCode::BackTab => return Action::PrevTab,
            _ => {}
        }

        if code == kb.quit {
            return Action::Quit;
        }
        if code == kb.refresh {
            return Action::Refresh;
        }
        if code == kb.next_tab {
            return Action::NextTab;
        }
        if code == kb.filter {
            return Action::EnterFilterMode;
        }
        if code == kb.cycle_sort {
            return Action::CycleSortMode;
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }
        if code == KeyCode::Esc && !self.filter_text.is_empty() {
            return Action::ClearFilter;
        }

        match code {
            KeyCode::Char('i') => Action::ToggleIdle,
            KeyCode::Char('t') => Action::CycleTheme,
            _ => Action::None,
        }
    }

    fn map_key_help(&self, key: KeyEvent) -> Action {
        if key.code == self.keybinds.help || key.code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    fn map_key_filter(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => Action::ClearFilter,
            KeyCode::Enter => Action::ExitFilterMode,
            KeyCode::Backspace => {
                let mut text = self.filter_text.clone();
                text.pop();
                Action::UpdateFilter(text)
            }
            KeyCode::Char(c) => {
                let mut text = self.filter_text.clone();
                text.push(c);
                Action::UpdateFilter(text)
            }
            _ => Action::None,
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Navigate(dir) => self.navigate(dir),
            Action::NextTab | Action::PrevTab => {
                self.tab = self.tab.next();
                self.table_state.select(Some(0));
            }
            Action::EnterFilterMode => self.input_mode = InputMode::Filter,
            Action::ExitFilterMode => self.input_mode = InputMode::Normal,
            Action::ClearFilter => {
                self.filter_text.clear();
                self.input_mode = InputMode::Normal;
                self.clamp_selection();
            }
            Action::UpdateFilter(text) => {
                self.filter_text = text;
                self.table_state.select(Some(0));
            }
            Action::CycleSortMode => self.sort_mode = self.sort_mode.next(),
            Action::CycleTheme => self.theme = self.theme.next(),
            Action::ToggleIdle => {
                self.show_idle = !self.show_idle;
                self.clamp_selection();
            }
            Action::ToggleHelp => {
                self.input_mode = if self.input_mode == InputMode::Help {
                    InputMode::Normal
                } else {
                    InputMode::Help
                };
            }
            Action::Refresh => self.refresh_data(),
            Action::None => {}
        }
    }

    fn navigate(&mut self, direction: Direction) {
        let len = self.row_count();
        if len == 0 {
            self.table_state.select(Some(0));
            return;
        }
        let last = len - 1;
        let current = self.table_state.selected().unwrap_or(0).min(last);
        let next = match direction {
            Direction::Up => current.saturating_sub(1),
            Direction::Down => (current + 1).min(last),
            Direction::PageUp => current.saturating_sub(PAGE),
            Direction::PageDown => (current + PAGE).min(last),
            Direction::Top => 0,
            Direction::Bottom => last,
        };
        self.table_state.select(Some(next));
    }

    fn clamp_selection(&mut self) {
        let len = self.row_count();
        let selected = self.table_state.selected().unwrap_or(0);
        self.table_state
            .select(Some(selected.min(len.saturating_sub(1))));
    }

    pub fn show_help(&self) -> bool {
        self.input_mode == InputMode::Help
    }

    pub fn help_sections(&self) -> Vec<HelpSection> {
        self.keybinds.help_sections()
    }
}
