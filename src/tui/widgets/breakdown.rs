//! Breakdown view widget - selected user's activity by IDE, feature, language and model

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::tabs::{render_separator, KeyHints, Tab, TabBar};
use super::users::{format_number, truncate_label};
use crate::services::Aggregator;
use crate::tui::theme::Theme;
use crate::types::PerUserSeries;

/// Format a percentage bar
/// Example: percent=50.0, width=10 → "█████░░░░░"
pub fn format_percentage_bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// One labelled row of a breakdown section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakdownRow {
    pub label: String,
    pub interactions: u64,
    pub generations: u64,
    pub acceptances: u64,
}

/// A titled group of rows plus its generation total (for share bars)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakdownSection {
    pub title: &'static str,
    pub rows: Vec<BreakdownRow>,
    pub total_generations: u64,
}

impl BreakdownSection {
    fn new(title: &'static str, rows: Vec<BreakdownRow>) -> Self {
        let total_generations = rows
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.generations));
        Self {
            title,
            rows,
            total_generations,
        }
    }

    /// Share of the section's generations held by `row`, in percent
    pub fn share(&self, row: &BreakdownRow) -> f64 {
        if self.total_generations == 0 {
            0.0
        } else {
            row.generations as f64 / self.total_generations as f64 * 100.0
        }
    }
}

/// Data for the breakdown view of a single user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakdownData {
    pub user_login: String,
    pub sections: Vec<BreakdownSection>,
}

impl BreakdownData {
    pub fn from_series(series: &PerUserSeries) -> Self {
        let by_ide = series
            .by_ide
            .iter()
            .map(|s| BreakdownRow {
                label: s.ide.clone(),
                interactions: s.counts.interactions,
                generations: s.counts.generations,
                acceptances: s.counts.acceptances,
            })
            .collect();

        let by_feature = series
            .by_feature
            .iter()
            .map(|s| BreakdownRow {
                label: s.feature.clone(),
                interactions: s.counts.interactions,
                generations: s.counts.generations,
                acceptances: s.counts.acceptances,
            })
            .collect();

        let by_language = Aggregator::language_rollup(series)
            .into_iter()
            .map(|r| BreakdownRow {
                label: r.language,
                interactions: 0,
                generations: r.generations,
                acceptances: r.acceptances,
            })
            .collect();

        let by_model = series
            .by_model_feature
            .iter()
            .map(|s| BreakdownRow {
                label: format!("{} · {}", s.model, s.feature),
                interactions: s.counts.interactions,
                generations: s.counts.generations,
                acceptances: s.counts.acceptances,
            })
            .collect();

        Self {
            user_login: series.user_login.clone(),
            sections: vec![
                BreakdownSection::new("By IDE", by_ide),
                BreakdownSection::new("By feature", by_feature),
                BreakdownSection::new("By language", by_language),
                BreakdownSection::new("By model · feature", by_model),
            ],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.rows.is_empty())
    }
}

/// Maximum content width for the Breakdown view
const MAX_CONTENT_WIDTH: u16 = 170;

/// Table width: Label(30) + Interactions(14) + Generations(13) + Acceptances(13) + Share(14) = 84
const TABLE_WIDTH: u16 = 84;

const BAR_WIDTH: usize = 10;

/// Breakdown view widget
pub struct BreakdownView<'a> {
    data: Option<&'a BreakdownData>,
    selected_tab: Tab,
    theme: Theme,
}

impl<'a> BreakdownView<'a> {
    pub fn new(data: Option<&'a BreakdownData>, theme: Theme) -> Self {
        Self {
            data,
            selected_tab: Tab::Breakdown,
            theme,
        }
    }

    pub fn with_tab(mut self, tab: Tab) -> Self {
        self.selected_tab = tab;
        self
    }
}

impl Widget for BreakdownView<'_> {
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
            Constraint::Min(1),    // Sections
            Constraint::Length(1), // Separator
            Constraint::Length(1), // Keybindings
        ])
        .split(centered_area);

        TabBar::new(self.selected_tab, self.theme).render(chunks[1], buf);
        render_separator(chunks[2], buf, self.theme);

        match self.data {
            Some(data) if !data.is_empty() => {
                self.render_header(chunks[3], buf, &data.user_login);
                self.render_sections(chunks[4], buf, data);
            }
            Some(data) => {
                self.render_header(chunks[3], buf, &data.user_login);
                self.render_message(chunks[4], buf, "No breakdown reported for this user");
            }
            None => self.render_message(chunks[4], buf, "Select a user on the Users tab"),
        }

        render_separator(chunks[5], buf, self.theme);
        KeyHints::new(self.theme).render(chunks[6], buf);
    }
}

impl BreakdownView<'_> {
    fn row_rect(area: Rect, y: u16) -> Rect {
        Rect {
            x: area.x + area.width.saturating_sub(TABLE_WIDTH) / 2,
            y,
            width: TABLE_WIDTH.min(area.width),
            height: 1,
        }
    }

    fn render_message(&self, area: Rect, buf: &mut Buffer, message: &str) {
        Paragraph::new(message.to_string())
            .style(Style::default().fg(self.theme.muted()))
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer, user_login: &str) {
        let bold = Style::default()
            .fg(self.theme.text())
            .add_modifier(Modifier::BOLD);
        let header = Line::from(vec![
            Span::styled(
                format!("{:<30}", truncate_label(user_login, 29)),
                bold.fg(self.theme.accent()),
            ),
            Span::styled(format!("{:>14}", "Interactions"), bold),
            Span::styled(format!("{:>13}", "Generations"), bold),
            Span::styled(format!("{:>13}", "Acceptances"), bold),
            Span::styled(format!("  {:<12}", "Share"), bold),
        ]);
        Paragraph::new(header)
            .alignment(Alignment::Left)
            .render(Self::row_rect(area, area.y), buf);
    }

    fn render_sections(&self, area: Rect, buf: &mut Buffer, data: &BreakdownData) {
        let bottom = area.y + area.height;
        let mut y = area.y;

        for section in data.sections.iter().filter(|s| !s.rows.is_empty()) {
            if y >= bottom {
                break;
            }
            buf.set_string(
                Self::row_rect(area, y).x,
                y,
                section.title,
                Style::default()
                    .fg(self.theme.date())
                    .add_modifier(Modifier::BOLD),
            );
            y += 1;

            for row in &section.rows {
                if y >= bottom {
                    return;
                }
                let bar = format_percentage_bar(section.share(row), BAR_WIDTH);
                let line = Line::from(vec![
                    Span::styled(
                        format!("  {:<28}", truncate_label(&row.label, 27)),
                        Style::default().fg(self.theme.text()),
                    ),
                    Span::styled(
                        format!("{:>14}", format_number(row.interactions)),
                        Style::default().fg(self.theme.interactions()),
                    ),
                    Span::styled(
                        format!("{:>13}", format_number(row.generations)),
                        Style::default().fg(self.theme.generations()),
                    ),
                    Span::styled(
                        format!("{:>13}", format_number(row.acceptances)),
                        Style::default().fg(self.theme.bar()),
                    ),
                    Span::styled(format!("  {}", bar), Style::default().fg(self.theme.bar())),
                ]);
                Paragraph::new(line)
                    .alignment(Alignment::Left)
                    .render(Self::row_rect(area, y), buf);
                y += 1;
            }
        }
    }
}
