//! Tab bar widget for view navigation

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::tui::theme::Theme;

/// Available tabs in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Users,
    Daily,
    Breakdown,
}

impl Tab {
    /// Get the display label for this tab
    pub fn label(self) -> &'static str {
        match self {
            Self::Users => "Users",
            Self::Daily => "Daily",
            Self::Breakdown => "Breakdown",
        }
    }

    /// Get all tabs in order
    pub fn all() -> &'static [Tab] {
        &[Tab::Users, Tab::Daily, Tab::Breakdown]
    }

    /// Get the next tab (wrapping)
    pub fn next(self) -> Self {
        match self {
            Self::Users => Self::Daily,
            Self::Daily => Self::Breakdown,
            Self::Breakdown => Self::Users,
        }
    }

    /// Get the previous tab (wrapping)
    pub fn prev(self) -> Self {
        match self {
            Self::Users => Self::Breakdown,
            Self::Daily => Self::Users,
            Self::Breakdown => Self::Daily,
        }
    }

    /// Get tab from number key (1-3)
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Users),
            2 => Some(Self::Daily),
            3 => Some(Self::Breakdown),
            _ => None,
        }
    }
}

/// Tab bar widget showing available views
pub struct TabBar {
    selected: Tab,
    theme: Theme,
}

impl TabBar {
    pub fn new(selected: Tab, theme: Theme) -> Self {
        Self { selected, theme }
    }
}

impl Widget for TabBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let total_width: u16 = Tab::all()
            .iter()
            .map(|tab| {
                let label = tab.label();
                let display_len = if *tab == self.selected {
                    label.len() + 2 // "[label]"
                } else {
                    label.len()
                };
                display_len as u16 + 2
            })
            .sum::<u16>()
            .saturating_sub(2);

        let start_x = area.x + (area.width.saturating_sub(total_width)) / 2;
        let mut x = start_x;

        for tab in Tab::all() {
            let is_selected = *tab == self.selected;
            let label = tab.label();

            let display = if is_selected {
                format!("[{}]", label)
            } else {
                label.to_string()
            };

            let display_len = display.len() as u16;
            if x + display_len > area.x + area.width {
                break;
            }

            let style = if is_selected {
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.muted())
            };

            buf.set_string(x, area.y, &display, style);
            x += display_len + 2;
        }
    }
}

/// Footer with the common keybindings, shared by every view
pub struct KeyHints {
    theme: Theme,
}

impl KeyHints {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }
}

impl Widget for KeyHints {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key = Style::default().fg(self.theme.accent());
        let desc = Style::default().fg(self.theme.muted());
        Paragraph::new(Line::from(vec![
            Span::styled("q", key),
            Span::styled(": Quit", desc),
            Span::raw("  "),
            Span::styled("Tab", key),
            Span::styled(": Switch view", desc),
            Span::raw("  "),
            Span::styled("↑↓", key),
            Span::styled(": Select user", desc),
            Span::raw("  "),
            Span::styled("r", key),
            Span::styled(": Refresh", desc),
            Span::raw("  "),
            Span::styled("?", key),
            Span::styled(": Help", desc),
        ]))
        .alignment(Alignment::Center)
        .render(area, buf);
    }
}

/// Horizontal rule across the full width of `area`
pub fn render_separator(area: Rect, buf: &mut Buffer, theme: Theme) {
    let line = "─".repeat(area.width as usize);
    buf.set_string(area.x, area.y, &line, Style::default().fg(theme.muted()));
}
