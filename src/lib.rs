use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::{info, warn};

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, ListState, Paragraph, StatefulWidget, Wrap};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

pub mod aggregate;
pub mod cache;
pub mod chart;
pub mod coerce;
pub mod config;
pub mod dataset;
pub mod error;
pub mod help_strings;
pub mod logging;
pub mod preview;
pub mod views;
pub mod widgets;

pub use aggregate::PlayerFilter;
pub use cache::CacheManager;
pub use config::{AppConfig, ConfigManager, Theme};
pub use dataset::{Dataset, DatasetPaths, Datasets};
pub use error::{LoadError, ViewError};
pub use views::{build_view, Tab, TabView, ViewOptions, ViewState};

use config::BrandingConfig;
use dataset::player_names;
use widgets::controls::Controls;
use widgets::debug::DebugState;
use widgets::sidebar::Sidebar;
use widgets::tab_view::TabPanel;

pub const APP_NAME: &str = "npl-dash";

pub enum AppEvent {
    Key(KeyEvent),
    /// Rebuild the active tab's view from the current state.
    Recompute,
    Exit,
    Resize(u16, u16), // resized (width, height)
}

pub struct App {
    datasets: Datasets,
    options: ViewOptions,
    state: ViewState,
    players: Vec<String>,
    players_hint: Option<String>,
    player_list: ListState,
    view: Option<Result<TabView, ViewError>>,
    scroll: usize,
    show_help: bool,
    help_scroll: usize,
    debug: DebugState,
    theme: Theme,
    branding: BrandingConfig,
    sidebar_width: u16,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        let theme = Theme::from_config(&config.theme).unwrap_or_else(|e| {
            warn!("invalid theme, using defaults: {}", e);
            Theme::default()
        });
        let mut app = Self {
            datasets: Datasets::new(config.dataset_paths()),
            options: config.view_options(),
            state: ViewState {
                player: PlayerFilter::All,
                tab: config.start_tab(),
            },
            players: Vec::new(),
            players_hint: None,
            player_list: ListState::default().with_selected(Some(0)),
            view: None,
            scroll: 0,
            show_help: false,
            help_scroll: 0,
            debug: DebugState::default(),
            theme,
            branding: config.branding.clone(),
            sidebar_width: config.display.sidebar_width,
        };
        if config.debug.enabled {
            app.enable_debug();
        }
        app.load_players();
        app
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn view(&self) -> Option<&Result<TabView, ViewError>> {
        self.view.as_ref()
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn datasets(&self) -> &Datasets {
        &self.datasets
    }

    /// Sidebar entries come from the batting table. If it cannot be loaded the
    /// selector holds only "All" and the batting tab shows the error.
    fn load_players(&mut self) {
        let names = self
            .datasets
            .get(Dataset::Batting)
            .map_err(|e| e.to_string())
            .and_then(|df| player_names(&df).map_err(|e| e.to_string()));
        match names {
            Ok(names) => {
                info!("{} players in selector", names.len());
                self.players = names;
                self.players_hint = None;
            }
            Err(e) => {
                warn!("player selector limited to All: {}", e);
                self.players.clear();
                self.players_hint = Some("Batting data unavailable".to_string());
            }
        }
    }

    /// Select a player by filter. Unknown names are ignored and return false.
    pub fn select_player(&mut self, player: PlayerFilter) -> bool {
        let index = match &player {
            PlayerFilter::All => Some(0),
            PlayerFilter::Player(name) => self.players.iter().position(|p| p == name).map(|i| i + 1),
        };
        match index {
            Some(index) => {
                self.player_list.select(Some(index));
                self.state.player = player;
                true
            }
            None => {
                warn!("unknown player \"{}\", keeping {}", player, self.state.player);
                false
            }
        }
    }

    fn select_player_index(&mut self, index: usize) -> Option<AppEvent> {
        let player = match index {
            0 => PlayerFilter::All,
            i => PlayerFilter::Player(self.players.get(i - 1)?.clone()),
        };
        if player == self.state.player {
            return None;
        }
        self.player_list.select(Some(index));
        self.state.player = player;
        // only the batting view reads the player
        (self.state.tab == Tab::Batting).then_some(AppEvent::Recompute)
    }

    fn select_tab(&mut self, tab: Tab) -> Option<AppEvent> {
        if tab == self.state.tab && self.view.is_some() {
            return None;
        }
        self.state.tab = tab;
        self.scroll = 0;
        Some(AppEvent::Recompute)
    }

    fn recompute(&mut self) {
        let view = build_view(&mut self.datasets, &self.state, &self.options);
        if let Ok(view) = &view {
            self.scroll = self.scroll.min(view.rows.len().saturating_sub(1));
        }
        self.view = Some(view);
        self.debug.num_recomputes += 1;
        self.debug.cached_tables = self.datasets.cache().len();
        self.debug.disk_reads = self.datasets.cache().disk_reads();
    }

    fn max_scroll(&self) -> usize {
        match &self.view {
            Some(Ok(view)) => view.rows.len().saturating_sub(1),
            _ => 0,
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        if event.kind != KeyEventKind::Press {
            return None;
        }
        self.debug.on_key(event);

        if self.show_help {
            match event.code {
                KeyCode::Esc | KeyCode::Char('?') => {
                    self.show_help = false;
                    self.help_scroll = 0;
                    self.debug.last_action = "close_help".to_string();
                }
                KeyCode::Char('q') => return Some(AppEvent::Exit),
                KeyCode::Down | KeyCode::Char('j') => {
                    self.help_scroll = self.help_scroll.saturating_add(1);
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.help_scroll = self.help_scroll.saturating_sub(1);
                }
                _ => {}
            }
            return None;
        }

        let selected = self.player_list.selected().unwrap_or(0);
        let (action, next) = match event.code {
            KeyCode::Char('q') | KeyCode::Esc => ("quit", Some(AppEvent::Exit)),
            KeyCode::Char('?') => {
                self.show_help = true;
                ("open_help", None)
            }
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                let next = Tab::from_index(index).and_then(|tab| self.select_tab(tab));
                ("select_tab", next)
            }
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                ("next_tab", self.select_tab(self.state.tab.next()))
            }
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                ("prev_tab", self.select_tab(self.state.tab.prev()))
            }
            KeyCode::Down | KeyCode::Char('j') => {
                ("next_player", self.select_player_index(selected + 1))
            }
            KeyCode::Up | KeyCode::Char('k') => (
                "prev_player",
                selected
                    .checked_sub(1)
                    .and_then(|i| self.select_player_index(i)),
            ),
            KeyCode::Char('a') => ("all_players", self.select_player_index(0)),
            KeyCode::PageDown | KeyCode::Char('J') => {
                self.scroll = (self.scroll + 1).min(self.max_scroll());
                ("scroll_down", None)
            }
            KeyCode::PageUp | KeyCode::Char('K') => {
                self.scroll = self.scroll.saturating_sub(1);
                ("scroll_up", None)
            }
            _ => return None,
        };
        self.debug.last_action = action.to_string();
        next
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Recompute => {
                self.recompute();
                None
            }
            AppEvent::Resize(_, _) | AppEvent::Exit => None,
        }
    }

    fn render_help(&self, area: Rect, buf: &mut Buffer) {
        let popup_area = centered_rect(area, 60, 60);
        Clear.render(popup_area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.get("primary")))
            .title("Help");
        Paragraph::new(help_strings::main_view())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.help_scroll as u16, 0))
            .render(popup_area, buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        let mut constraints = vec![
            Constraint::Length(1), // Title
            Constraint::Fill(1),
            Constraint::Length(1), // Caption
            Constraint::Length(1), // Controls
        ];
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        Paragraph::new(self.branding.title.as_str())
            .style(
                Style::default()
                    .fg(self.theme.get("primary"))
                    .add_modifier(Modifier::BOLD),
            )
            .centered()
            .render(layout[0], buf);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(self.sidebar_width), Constraint::Fill(1)])
            .split(layout[1]);

        Sidebar::new(&self.branding, &self.players, &self.theme)
            .with_hint(self.players_hint.as_deref())
            .render(body[0], buf, &mut self.player_list);

        TabPanel::new(self.state.tab, self.view.as_ref(), self.scroll, &self.theme)
            .render(body[1], buf);

        Paragraph::new(self.branding.caption.as_str())
            .style(Style::default().fg(self.theme.get("text_secondary")))
            .centered()
            .render(layout[2], buf);

        let controls = Controls::new()
            .with_player(self.state.player.label())
            .with_dimmed(self.show_help)
            .with_bg(self.theme.get("controls_bg"));
        (&controls).render(layout[3], buf);

        if self.show_help {
            self.render_help(area, buf);
        }

        if self.debug.enabled {
            (&self.debug).render(layout[4], buf);
        }
    }
}

fn centered_rect(r: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
