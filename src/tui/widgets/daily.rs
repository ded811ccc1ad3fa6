//! Daily view widget - per-day activity of the selected user with sparklines

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::tabs::{render_separator, KeyHints, Tab, TabBar};
use super::users::format_number;
use crate::tui::theme::Theme;
use crate::types::{DailyUsage, PerUserSeries};

/// Format a sparkline bar based on a count ratio
/// Example: count=500, max=1000, width=8 → "▓▓▓▓░░░░"
pub fn format_sparkline(count: u64, max: u64, width: usize) -> String {
    if max == 0 || width == 0 {
        return "░".repeat(width);
    }
    let ratio = count as f64 / max as f64;
    let filled = (ratio * width as f64).round() as usize;
    let filled = filled.min(width); // Clamp to prevent overflow when ratio > 1.0
    let empty = width.saturating_sub(filled);
    format!("{}{}", "▓".repeat(filled), "░".repeat(empty))
}

/// Maximum content width for Daily view (consistent with Users/Breakdown)
const MAX_CONTENT_WIDTH: u16 = 170;

const COL_DATE: usize = 0;
const COL_INTERACTIONS: usize = 1;
const COL_GENERATIONS: usize = 2;
const COL_ACCEPTANCES: usize = 3;
const COL_USAGE: usize = 4;

/// Column definition: (label, width). Date and Interactions are never hidden.
const COLUMNS: [(&str, u16); 5] = [
    ("Date", 14),         // 0: COL_DATE (12 date + 2 padding)
    ("Interactions", 14), // 1: COL_INTERACTIONS
    ("Generations", 13),  // 2: COL_GENERATIONS
    ("Acceptances", 13),  // 3: COL_ACCEPTANCES
    ("Usage", 18),        // 4: COL_USAGE
];

/// Sparkline width inside the Usage column
const SPARKLINE_WIDTH: usize = 16;

/// Determine which column indices are visible for a given terminal width.
/// Acceptances are hidden first, then Generations, then the Usage bar.
fn visible_columns(width: u16) -> Vec<usize> {
    const HIDE_ORDER: [usize; 3] = [COL_ACCEPTANCES, COL_GENERATIONS, COL_USAGE];

    let mut visible: Vec<usize> = (0..COLUMNS.len()).collect();

    for &col_idx in &HIDE_ORDER {
        let total: u16 = visible.iter().map(|&i| COLUMNS[i].1).sum();
        if total <= width {
            return visible;
        }
        visible.retain(|&i| i != col_idx);
    }

    visible
}

fn table_width_for(visible: &[usize]) -> u16 {
    visible.iter().map(|&i| COLUMNS[i].1).sum()
}

/// Daily view widget
pub struct DailyView<'a> {
    series: Option<&'a PerUserSeries>,
    selected_tab: Tab,
    theme: Theme,
}

impl<'a> DailyView<'a> {
    pub fn new(series: Option<&'a PerUserSeries>, theme: Theme) -> Self {
        Self {
            series,
            selected_tab: Tab::Daily,
            theme,
        }
    }

    pub fn with_tab(mut self, tab: Tab) -> Self {
        self.selected_tab = tab;
        self
    }
}

impl Widget for DailyView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let content_width = area.width.min(MAX_CONTENT_WIDTH);
        let x_offset = (area.width.saturating_sub(content_width)) / 2;
        let centered_area = Rect {
            x: area.x + x_offset,
            y: area.y,
            width: content_width,
            height: area.height,
        };

        let visible = visible_columns(centered_area.width);

        let chunks = Layout::vertical([
            Constraint::Length(1), // Top padding
            Constraint::Length(1), // Tabs
            Constraint::Length(1), // Separator
            Constraint::Length(1), // User title
            Constraint::Length(1), // Header
            Constraint::Min(1),    // Daily rows
            Constraint::Length(1), // Separator
            Constraint::Length(1), // Keybindings
        ])
        .split(centered_area);

        TabBar::new(self.selected_tab, self.theme).render(chunks[1], buf);
        render_separator(chunks[2], buf, self.theme);

        match self.series {
            Some(series) => {
                self.render_title(chunks[3], buf, series);
                self.render_header(chunks[4], buf, &visible);
                self.render_daily_rows(chunks[5], buf, &series.daily, &visible);
            }
            None => {
                Paragraph::new("Select a user on the Users tab")
                    .style(Style::default().fg(self.theme.muted()))
                    .alignment(Alignment::Center)
                    .render(chunks[5], buf);
            }
        }

        render_separator(chunks[6], buf, self.theme);
        KeyHints::new(self.theme).render(chunks[7], buf);
    }
}

impl DailyView<'_> {
    fn table_rect(area: Rect, y: u16, tw: u16) -> Rect {
        Rect {
            x: area.x + area.width.saturating_sub(tw) / 2,
            y,
            width: tw.min(area.width),
            height: 1,
        }
    }

    fn render_title(&self, area: Rect, buf: &mut Buffer, series: &PerUserSeries) {
        let line = Line::from(vec![
            Span::styled(
                series.user_login.clone(),
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {} active days", series.daily.len()),
                Style::default().fg(self.theme.muted()),
            ),
        ]);
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer, visible: &[usize]) {
        let tw = table_width_for(visible);
        let header_style = Style::default()
            .fg(self.theme.text())
            .add_modifier(Modifier::BOLD);

        let spans: Vec<Span> = visible
            .iter()
            .map(|&col| {
                let (label, width) = COLUMNS[col];
                let formatted = if col == COL_DATE {
                    format!("  {:<width$}", label, width = (width as usize) - 2)
                } else if col == COL_USAGE {
                    format!("  {:<width$}", label, width = (width as usize) - 2)
                } else {
                    format!("{:>width$}", label, width = width as usize)
                };
                Span::styled(formatted, header_style)
            })
            .collect();

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Left)
            .render(Self::table_rect(area, area.y, tw), buf);
    }

    fn render_daily_rows(
        &self,
        area: Rect,
        buf: &mut Buffer,
        daily: &[DailyUsage],
        visible: &[usize],
    ) {
        if daily.is_empty() {
            Paragraph::new("No activity in this period")
                .style(Style::default().fg(self.theme.muted()))
                .alignment(Alignment::Center)
                .render(area, buf);
            return;
        }

        let tw = table_width_for(visible);
        let max = daily
            .iter()
            .map(|d| d.user_initiated_interaction_count)
            .max()
            .unwrap_or(0);

        // Most recent days win when the period does not fit
        let start = daily.len().saturating_sub(area.height as usize);

        for (i, day) in daily[start..].iter().enumerate() {
            let y = area.y + i as u16;
            if y >= area.y + area.height {
                break;
            }

            let mut spans = Vec::with_capacity(visible.len());
            for &col in visible {
                let (_, width) = COLUMNS[col];
                let width = width as usize;
                let span = match col {
                    COL_DATE => Span::styled(
                        format!("  {:<w$}", day.day, w = width - 2),
                        Style::default().fg(self.theme.date()),
                    ),
                    COL_INTERACTIONS => Span::styled(
                        format!(
                            "{:>w$}",
                            format_number(day.user_initiated_interaction_count),
                            w = width
                        ),
                        Style::default().fg(self.theme.interactions()),
                    ),
                    COL_GENERATIONS => Span::styled(
                        format!(
                            "{:>w$}",
                            format_number(day.code_generation_activity_count),
                            w = width
                        ),
                        Style::default().fg(self.theme.generations()),
                    ),
                    COL_ACCEPTANCES => Span::styled(
                        format!(
                            "{:>w$}",
                            format_number(day.code_acceptance_activity_count),
                            w = width
                        ),
                        Style::default().fg(self.theme.bar()),
                    ),
                    _ => Span::styled(
                        format!(
                            "  {}",
                            format_sparkline(
                                day.user_initiated_interaction_count,
                                max,
                                SPARKLINE_WIDTH
                            )
                        ),
                        Style::default().fg(self.theme.bar()),
                    ),
                };
                spans.push(span);
            }

            Paragraph::new(Line::from(spans))
                .alignment(Alignment::Left)
                .render(Self::table_rect(area, y, tw), buf);
        }
    }
}
