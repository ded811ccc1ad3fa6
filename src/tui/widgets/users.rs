//! Users view widget - per-user totals table with selection

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::tabs::{render_separator, KeyHints, Tab, TabBar};
use crate::tui::theme::Theme;
use crate::types::PerUserSeries;

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let s = n.to_string();
    let len = s.len();
    let mut result = String::with_capacity(len + len / 3);

    // Digits are ASCII, so byte indexing is safe
    for (i, ch) in s.bytes().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch as char);
    }

    result
}

/// Truncate to `max` characters, marking the cut with an ellipsis (UTF-8 safe)
pub fn truncate_label(label: &str, max: usize) -> String {
    if label.chars().count() > max {
        format!("{}…", label.chars().take(max.saturating_sub(1)).collect::<String>())
    } else {
        label.to_string()
    }
}

/// First row index to draw so that `selected` stays within `visible` rows
pub fn scroll_offset(selected: Option<usize>, visible: usize) -> usize {
    match selected {
        Some(i) if visible > 0 => i.saturating_sub(visible - 1),
        _ => 0,
    }
}

/// Maximum content width for the Users view
const MAX_CONTENT_WIDTH: u16 = 170;

/// Table width: User(26) + Interactions(14) + Generations(13) + Acceptances(13) + Added(12) + Deleted(12) = 90
const TABLE_WIDTH: u16 = 90;

/// Users view widget
pub struct UsersView<'a> {
    series: &'a [PerUserSeries],
    selected: Option<usize>,
    theme: Theme,
    tab: Tab,
}

impl<'a> UsersView<'a> {
    pub fn new(series: &'a [PerUserSeries], selected: Option<usize>, theme: Theme) -> Self {
        Self {
            series,
            selected,
            theme,
            tab: Tab::Users,
        }
    }

    pub fn with_tab(mut self, tab: Tab) -> Self {
        self.tab = tab;
        self
    }
}

impl Widget for UsersView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let content_width = area.width.min(MAX_CONTENT_WIDTH);
        let x_offset = (area.width.saturating_sub(content_width)) / 2;
        let centered_area = Rect {
            x: area.x + x_offset,
            y: area.y,
            width: content_width,
            height: area.height,
        };

        let chunks = Layout::vertical([
            Constraint::Length(1), // Top padding
            Constraint::Length(1), // Tabs
            Constraint::Length(1), // Separator
            Constraint::Length(1), // Header
            Constraint::Min(1),    // User rows
            Constraint::Length(1), // Separator
            Constraint::Length(1), // Keybindings
        ])
        .split(centered_area);

        TabBar::new(self.tab, self.theme).render(chunks[1], buf);
        render_separator(chunks[2], buf, self.theme);
        self.render_header(chunks[3], buf);
        if self.series.is_empty() {
            Paragraph::new("No Copilot usage reported for this period")
                .style(Style::default().fg(self.theme.muted()))
                .alignment(Alignment::Center)
                .render(chunks[4], buf);
        } else {
            self.render_rows(chunks[4], buf);
        }
        render_separator(chunks[5], buf, self.theme);
        KeyHints::new(self.theme).render(chunks[6], buf);
    }
}

impl UsersView<'_> {
    fn table_area(&self, area: Rect, y: u16) -> Rect {
        let offset = area.width.saturating_sub(TABLE_WIDTH) / 2;
        Rect {
            x: area.x + offset,
            y,
            width: TABLE_WIDTH.min(area.width),
            height: 1,
        }
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let bold = Style::default()
            .fg(self.theme.text())
            .add_modifier(Modifier::BOLD);
        let header = Line::from(vec![
            Span::styled(format!("{:<26}", "User"), bold),
            Span::styled(format!("{:>14}", "Interactions"), bold),
            Span::styled(format!("{:>13}", "Generations"), bold),
            Span::styled(format!("{:>13}", "Acceptances"), bold),
            Span::styled(format!("{:>12}", "LOC added"), bold),
            Span::styled(format!("{:>12}", "LOC deleted"), bold),
        ]);
        Paragraph::new(header)
            .alignment(Alignment::Left)
            .render(self.table_area(area, area.y), buf);
    }

    fn render_rows(&self, area: Rect, buf: &mut Buffer) {
        let visible = area.height as usize;
        let offset = scroll_offset(self.selected, visible);

        for (row, (index, series)) in self
            .series
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .enumerate()
        {
            let y = area.y + row as u16;
            let is_selected = self.selected == Some(index);

            let mut base = Style::default();
            if is_selected {
                base = base
                    .bg(self.theme.selection_bg())
                    .add_modifier(Modifier::BOLD);
            }
            let marker = if is_selected { "▸ " } else { "  " };

            let line = Line::from(vec![
                Span::styled(
                    format!("{}{:<24}", marker, truncate_label(&series.user_login, 23)),
                    base.fg(self.theme.accent()),
                ),
                Span::styled(
                    format!("{:>14}", format_number(series.total_interactions)),
                    base.fg(self.theme.interactions()),
                ),
                Span::styled(
                    format!("{:>13}", format_number(series.total_generations)),
                    base.fg(self.theme.generations()),
                ),
                Span::styled(
                    format!("{:>13}", format_number(series.total_acceptances)),
                    base.fg(self.theme.bar()),
                ),
                Span::styled(
                    format!("{:>12}", format_number(series.total_loc_added)),
                    base.fg(self.theme.text()),
                ),
                Span::styled(
                    format!("{:>12}", format_number(series.total_loc_deleted)),
                    base.fg(self.theme.text()),
                ),
            ]);

            Paragraph::new(line)
                .alignment(Alignment::Left)
                .render(self.table_area(area, y), buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn series(login: &str, interactions: u64) -> PerUserSeries {
        PerUserSeries {
            user_login: login.to_string(),
            total_interactions: interactions,
            ..Default::default()
        }
    }

    // ========== format helpers ==========

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("octocat", 10), "octocat");
        assert_eq!(truncate_label("a-very-long-login-name", 8), "a-very-…");
        assert_eq!(truncate_label("한국어사용자이름", 4), "한국어…");
    }

    #[test]
    fn test_scroll_offset_keeps_selection_visible() {
        assert_eq!(scroll_offset(None, 10), 0);
        assert_eq!(scroll_offset(Some(3), 10), 0);
        assert_eq!(scroll_offset(Some(9), 10), 0);
        assert_eq!(scroll_offset(Some(10), 10), 1);
        assert_eq!(scroll_offset(Some(25), 10), 16);
        assert_eq!(scroll_offset(Some(5), 0), 0);
    }

    // ========== rendering ==========

    #[test]
    fn test_render_lists_users_in_order() {
        let data = vec![series("octocat", 1200), series("monalisa", 8)];
        let area = Rect::new(0, 0, 100, 12);
        let mut buf = Buffer::empty(area);

        UsersView::new(&data, Some(0), Theme::Dark).render(area, &mut buf);
        let text = buffer_text(&buf);

        let octo = text.find("octocat").unwrap();
        let mona = text.find("monalisa").unwrap();
        assert!(octo < mona);
        assert!(text.contains("1,200"));
        assert!(text.contains("▸ octocat"));
    }

    #[test]
    fn test_render_empty_series() {
        let area = Rect::new(0, 0, 100, 12);
        let mut buf = Buffer::empty(area);

        UsersView::new(&[], None, Theme::Dark).render(area, &mut buf);

        assert!(buffer_text(&buf).contains("No Copilot usage reported"));
    }
}
