//! Application state and event loop

use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
    DefaultTerminal, Frame,
};

use crate::services::DataLoaderService;
use crate::types::PerUserSeries;

use super::theme::Theme;
use super::widgets::{
    breakdown::{BreakdownData, BreakdownView},
    daily::DailyView,
    help::HelpPopup,
    spinner::Spinner,
    tabs::Tab,
    users::UsersView,
};

/// Result of one background load, error already rendered for display
pub type LoadResult = Result<Box<AppData>, String>;

/// Application state
pub enum AppState {
    /// Loading data with spinner animation
    Loading { spinner_frame: usize },
    /// Ready with loaded data
    Ready { data: Box<AppData> },
    /// Error state
    Error { message: String },
}

/// Loaded application data
pub struct AppData {
    /// Per-user series, busiest users first
    pub series: Vec<PerUserSeries>,
}

/// Main application
pub struct App {
    state: AppState,
    should_quit: bool,
    current_tab: Tab,
    show_help: bool,
    theme: Theme,
    source_label: String,
    selected_user: Option<String>,
    /// Loads spawned but not yet received
    pending_loads: usize,
    refresh_requested: bool,
}

impl App {
    /// Create a new app in loading state
    pub fn new(source_label: impl Into<String>, theme: Theme) -> Self {
        Self {
            state: AppState::Loading { spinner_frame: 0 },
            should_quit: false,
            current_tab: Tab::default(),
            show_help: false,
            theme,
            source_label: source_label.into(),
            selected_user: None,
            pending_loads: 0,
            refresh_requested: false,
        }
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                        self.should_quit = true;
                    }
                    KeyCode::Tab => {
                        self.current_tab = self.current_tab.next();
                    }
                    KeyCode::BackTab => {
                        self.current_tab = self.current_tab.prev();
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        self.move_selection(-1);
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        self.move_selection(1);
                    }
                    KeyCode::Char(c @ '1'..='3') => {
                        if let Some(tab) = Tab::from_number(c as u8 - b'0') {
                            self.current_tab = tab;
                        }
                    }
                    KeyCode::Char('?') => {
                        self.show_help = !self.show_help;
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        self.refresh_requested = true;
                    }
                    _ => {}
                }
            }
        }
    }

    /// Take a pending refresh request, if the user asked for one
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    /// Record that a background load was spawned
    pub fn load_started(&mut self) {
        self.pending_loads += 1;
        if let AppState::Error { .. } = self.state {
            self.state = AppState::Loading { spinner_frame: 0 };
        }
    }

    /// Whether a refresh is running on top of already displayed data
    pub fn is_refreshing(&self) -> bool {
        self.pending_loads > 0 && matches!(self.state, AppState::Ready { .. })
    }

    /// Apply data loading result to app state. Results are applied in
    /// arrival order, so the last one to arrive is what stays on screen.
    pub fn apply_data_result(&mut self, result: LoadResult) {
        self.pending_loads = self.pending_loads.saturating_sub(1);
        match result {
            Ok(data) => {
                let still_present = self
                    .selected_user
                    .as_deref()
                    .is_some_and(|login| data.series.iter().any(|s| s.user_login == login));
                if !still_present {
                    self.selected_user = data.series.first().map(|s| s.user_login.clone());
                }
                self.state = AppState::Ready { data };
            }
            Err(message) => self.state = AppState::Error { message },
        }
    }

    /// Index of the selected user in the loaded series
    pub fn selected_index(&self) -> Option<usize> {
        let AppState::Ready { data } = &self.state else {
            return None;
        };
        let login = self.selected_user.as_deref()?;
        data.series.iter().position(|s| s.user_login == login)
    }

    pub fn selected_user(&self) -> Option<&str> {
        self.selected_user.as_deref()
    }

    fn selected_series(&self) -> Option<&PerUserSeries> {
        let AppState::Ready { data } = &self.state else {
            return None;
        };
        self.selected_index().map(|i| &data.series[i])
    }

    /// Move the selection by `delta` rows, clamped to the user list
    fn move_selection(&mut self, delta: isize) {
        let AppState::Ready { data } = &self.state else {
            return;
        };
        if data.series.is_empty() {
            return;
        }
        let last = data.series.len() - 1;
        let next = match self.selected_index() {
            Some(i) => i.saturating_add_signed(delta).min(last),
            None => 0,
        };
        self.selected_user = Some(data.series[next].user_login.clone());
    }

    /// Update spinner animation
    pub fn tick(&mut self) {
        if let AppState::Loading { spinner_frame } = &self.state {
            self.state = AppState::Loading {
                spinner_frame: Spinner::next_frame(*spinner_frame),
            };
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Draw the application
    pub fn draw(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }

    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let mut text = self.source_label.clone();
        if self.is_refreshing() {
            text.push_str("  ·  refreshing…");
        }
        let x = area.x + area.width.saturating_sub(text.chars().count() as u16) / 2;
        buf.set_string(
            x,
            area.y,
            &text,
            Style::default().fg(self.theme.muted()),
        );
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match &self.state {
            AppState::Loading { spinner_frame } => {
                Spinner::new(*spinner_frame, &self.source_label).render(area, buf);
            }
            AppState::Ready { data } => {
                let selected = self.selected_index();
                match self.current_tab {
                    Tab::Users => {
                        UsersView::new(&data.series, selected, self.theme)
                            .with_tab(self.current_tab)
                            .render(area, buf);
                    }
                    Tab::Daily => {
                        DailyView::new(self.selected_series(), self.theme)
                            .with_tab(self.current_tab)
                            .render(area, buf);
                    }
                    Tab::Breakdown => {
                        let breakdown = self.selected_series().map(BreakdownData::from_series);
                        BreakdownView::new(breakdown.as_ref(), self.theme)
                            .with_tab(self.current_tab)
                            .render(area, buf);
                    }
                }

                // Views leave the first row free for the status line
                self.render_status(area, buf);

                if self.show_help {
                    let popup_area = HelpPopup::centered_area(area);
                    HelpPopup::new(self.theme).render(popup_area, buf);
                }
            }
            AppState::Error { message } => {
                let y = area.y + area.height / 2;
                let text = format!("Error: {}", message);
                let x = area.x + (area.width.saturating_sub(text.chars().count() as u16)) / 2;
                buf.set_string(
                    x,
                    y,
                    &text,
                    Style::default()
                        .fg(self.theme.error())
                        .add_modifier(Modifier::BOLD),
                );
                let hint = "r: Retry  q: Quit";
                let hx = area.x + (area.width.saturating_sub(hint.len() as u16)) / 2;
                buf.set_string(
                    hx,
                    y.saturating_add(2),
                    hint,
                    Style::default().fg(self.theme.muted()),
                );
            }
        }
    }
}

/// Run the TUI application
pub fn run(loader: DataLoaderService, theme: Theme) -> anyhow::Result<()> {
    let loader = Arc::new(loader);
    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, loader, theme);
    ratatui::restore();
    result
}

/// Load data synchronously (extracted for background thread)
fn load_data_sync(loader: &DataLoaderService) -> LoadResult {
    match loader.load() {
        Ok(usage) => Ok(Box::new(AppData {
            series: usage.series,
        })),
        Err(e) => {
            tracing::warn!(error = %e, "usage load failed");
            Err(e.to_string())
        }
    }
}

/// Spawn a background load that reports back on `tx`
fn spawn_load(loader: Arc<DataLoaderService>, tx: Sender<LoadResult>) {
    thread::spawn(move || {
        let result = load_data_sync(&loader);
        let _ = tx.send(result);
    });
}

fn run_app(
    terminal: &mut DefaultTerminal,
    loader: Arc<DataLoaderService>,
    theme: Theme,
) -> anyhow::Result<()> {
    let mut app = App::new(loader.describe(), theme);

    let (data_tx, data_rx) = mpsc::channel();
    spawn_load(Arc::clone(&loader), data_tx.clone());
    app.load_started();

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        if app.should_quit() {
            break;
        }

        // Check for data loading completion (non-blocking)
        while let Ok(result) = data_rx.try_recv() {
            app.apply_data_result(result);
        }

        if app.take_refresh_request() {
            tracing::debug!("refresh requested");
            spawn_load(Arc::clone(&loader), data_tx.clone());
            app.load_started();
        }

        // Poll for events with 100ms timeout for spinner animation
        if event::poll(Duration::from_millis(100))? {
            app.handle_event(event::read()?);
        } else {
            app.tick();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn series(login: &str, interactions: u64) -> PerUserSeries {
        PerUserSeries {
            user_login: login.to_string(),
            total_interactions: interactions,
            ..Default::default()
        }
    }

    fn data(logins: &[&str]) -> LoadResult {
        Ok(Box::new(AppData {
            series: logins
                .iter()
                .enumerate()
                .map(|(i, l)| series(l, 100 - i as u64))
                .collect(),
        }))
    }

    /// Helper to create a ready app with three users
    fn make_ready_app() -> App {
        let mut app = App::new("organization octo-org", Theme::Dark);
        app.load_started();
        app.apply_data_result(data(&["octocat", "monalisa", "hubot"]));
        app
    }

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.y..area.y + area.height)
            .map(|y| {
                (area.x..area.x + area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ========== lifecycle ==========

    #[test]
    fn test_app_initial_state() {
        let app = App::new("octo-org", Theme::Dark);
        assert!(matches!(app.state, AppState::Loading { spinner_frame: 0 }));
        assert!(!app.should_quit());
        assert_eq!(app.selected_user(), None);
    }

    #[test]
    fn test_app_tick_updates_spinner() {
        let mut app = App::new("octo-org", Theme::Dark);
        app.tick();
        assert!(matches!(app.state, AppState::Loading { spinner_frame: 1 }));
    }

    #[test]
    fn test_app_tick_ignored_when_ready() {
        let mut app = make_ready_app();
        app.tick();
        assert!(matches!(app.state, AppState::Ready { .. }));
    }

    #[test]
    fn test_app_quit_on_q() {
        let mut app = App::new("octo-org", Theme::Dark);
        app.handle_event(key(KeyCode::Char('q')));
        assert!(app.should_quit());
    }

    #[test]
    fn test_app_quit_on_esc() {
        let mut app = App::new("octo-org", Theme::Dark);
        app.handle_event(key(KeyCode::Esc));
        assert!(app.should_quit());
    }

    // ========== navigation ==========

    #[test]
    fn test_app_tab_navigation() {
        let mut app = make_ready_app();
        assert_eq!(app.current_tab, Tab::Users);
        app.handle_event(key(KeyCode::Tab));
        assert_eq!(app.current_tab, Tab::Daily);
        app.handle_event(key(KeyCode::Tab));
        assert_eq!(app.current_tab, Tab::Breakdown);
        app.handle_event(key(KeyCode::Tab));
        assert_eq!(app.current_tab, Tab::Users);
    }

    #[test]
    fn test_app_tab_navigation_backward() {
        let mut app = make_ready_app();
        app.handle_event(key(KeyCode::BackTab));
        assert_eq!(app.current_tab, Tab::Breakdown);
    }

    #[test]
    fn test_app_number_key_navigation() {
        let mut app = make_ready_app();
        app.handle_event(key(KeyCode::Char('3')));
        assert_eq!(app.current_tab, Tab::Breakdown);
        app.handle_event(key(KeyCode::Char('2')));
        assert_eq!(app.current_tab, Tab::Daily);
        app.handle_event(key(KeyCode::Char('4')));
        assert_eq!(app.current_tab, Tab::Daily);
    }

    #[test]
    fn test_app_help_toggle() {
        let mut app = make_ready_app();
        app.handle_event(key(KeyCode::Char('?')));
        assert!(app.show_help);
        app.handle_event(key(KeyCode::Char('?')));
        assert!(!app.show_help);
    }

    // ========== selection ==========

    #[test]
    fn test_first_user_selected_after_load() {
        let app = make_ready_app();
        assert_eq!(app.selected_user(), Some("octocat"));
        assert_eq!(app.selected_index(), Some(0));
    }

    #[test]
    fn test_selection_moves_and_clamps() {
        let mut app = make_ready_app();
        app.handle_event(key(KeyCode::Down));
        assert_eq!(app.selected_user(), Some("monalisa"));
        app.handle_event(key(KeyCode::Char('j')));
        app.handle_event(key(KeyCode::Char('j')));
        assert_eq!(app.selected_user(), Some("hubot"));
        app.handle_event(key(KeyCode::Up));
        app.handle_event(key(KeyCode::Char('k')));
        app.handle_event(key(KeyCode::Char('k')));
        assert_eq!(app.selected_user(), Some("octocat"));
    }

    #[test]
    fn test_selection_ignored_while_loading() {
        let mut app = App::new("octo-org", Theme::Dark);
        app.handle_event(key(KeyCode::Down));
        assert_eq!(app.selected_user(), None);
    }

    #[test]
    fn test_selection_kept_across_reload() {
        let mut app = make_ready_app();
        app.handle_event(key(KeyCode::Down));
        app.apply_data_result(data(&["hubot", "monalisa"]));
        assert_eq!(app.selected_user(), Some("monalisa"));
        assert_eq!(app.selected_index(), Some(1));
    }

    #[test]
    fn test_selection_reset_when_user_disappears() {
        let mut app = make_ready_app();
        app.handle_event(key(KeyCode::Down));
        app.apply_data_result(data(&["hubot", "octocat"]));
        assert_eq!(app.selected_user(), Some("hubot"));
    }

    #[test]
    fn test_empty_result_clears_selection() {
        let mut app = make_ready_app();
        app.apply_data_result(data(&[]));
        assert_eq!(app.selected_user(), None);
        app.handle_event(key(KeyCode::Down));
        assert_eq!(app.selected_user(), None);
    }

    // ========== refresh ==========

    #[test]
    fn test_refresh_request_taken_once() {
        let mut app = make_ready_app();
        assert!(!app.take_refresh_request());
        app.handle_event(key(KeyCode::Char('r')));
        assert!(app.take_refresh_request());
        assert!(!app.take_refresh_request());
    }

    #[test]
    fn test_refresh_keeps_data_visible() {
        let mut app = make_ready_app();
        app.load_started();
        assert!(app.is_refreshing());
        assert!(matches!(app.state, AppState::Ready { .. }));
        app.apply_data_result(data(&["octocat"]));
        assert!(!app.is_refreshing());
    }

    #[test]
    fn test_overlapping_refreshes_last_arrival_wins() {
        let mut app = make_ready_app();
        app.load_started();
        app.load_started();
        app.apply_data_result(data(&["monalisa"]));
        assert!(app.is_refreshing());
        app.apply_data_result(Err("HTTP 502".to_string()));
        assert!(matches!(app.state, AppState::Error { .. }));
        assert!(!app.is_refreshing());
    }

    #[test]
    fn test_retry_from_error_shows_spinner() {
        let mut app = App::new("octo-org", Theme::Dark);
        app.load_started();
        app.apply_data_result(Err("boom".to_string()));
        app.load_started();
        assert!(matches!(app.state, AppState::Loading { .. }));
    }

    // ========== rendering ==========

    #[test]
    fn test_error_message_rendered_verbatim() {
        let mut app = App::new("octo-org", Theme::Dark);
        let message = "error fetching usage for octo-org: HTTP 404 Not Found";
        app.apply_data_result(Err(message.to_string()));

        let area = Rect::new(0, 0, 100, 20);
        let mut buf = Buffer::empty(area);
        (&app).render(area, &mut buf);

        assert!(buffer_text(&buf).contains(message));
    }

    #[test]
    fn test_ready_render_shows_status_and_users() {
        let mut app = make_ready_app();
        app.load_started();

        let area = Rect::new(0, 0, 110, 20);
        let mut buf = Buffer::empty(area);
        (&app).render(area, &mut buf);
        let text = buffer_text(&buf);

        assert!(text.contains("organization octo-org"));
        assert!(text.contains("refreshing"));
        assert!(text.contains("octocat"));
    }

    #[test]
    fn test_breakdown_tab_renders_selected_user() {
        let mut app = make_ready_app();
        app.handle_event(key(KeyCode::Char('3')));

        let area = Rect::new(0, 0, 110, 20);
        let mut buf = Buffer::empty(area);
        (&app).render(area, &mut buf);

        assert!(buffer_text(&buf).contains("No breakdown reported"));
    }
}
