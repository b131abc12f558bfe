use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Tabs, Widget, Wrap},
};

use crate::config::Theme;
use crate::error::ViewError;
use crate::views::{Section, SectionBody, Tab, TabView};
use crate::widgets::chart::ChartView;
use crate::widgets::table_preview::PreviewTable;

const CHART_HEIGHT: u16 = 16;
const NO_DATA_HEIGHT: u16 = 3;
const TABLE_MAX_HEIGHT: u16 = 24;

/// Height of one row of sections: the tallest section in it.
pub fn row_height(row: &[Section]) -> u16 {
    row.iter()
        .map(|s| match &s.body {
            SectionBody::Chart(_) => CHART_HEIGHT,
            SectionBody::NoData(_) => NO_DATA_HEIGHT,
            SectionBody::Table(t) => (PreviewTable::height(t) + 2).min(TABLE_MAX_HEIGHT),
        })
        .max()
        .unwrap_or(0)
}

/// Tab bar, tab header and the scrolled section rows (or the tab's error).
pub struct TabPanel<'a> {
    active: Tab,
    view: Option<&'a Result<TabView, ViewError>>,
    scroll: usize,
    theme: &'a Theme,
}

impl<'a> TabPanel<'a> {
    pub fn new(
        active: Tab,
        view: Option<&'a Result<TabView, ViewError>>,
        scroll: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            active,
            view,
            scroll,
            theme,
        }
    }

    fn render_section(&self, section: &Section, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.get("table_border")))
            .title(section.heading.as_str());
        let inner = block.inner(area);
        block.render(area, buf);

        match &section.body {
            SectionBody::Chart(spec) => ChartView::new(spec, self.theme).render(inner, buf),
            SectionBody::NoData(message) => Paragraph::new(message.as_str())
                .style(Style::default().fg(self.theme.get("text_secondary")))
                .centered()
                .render(inner, buf),
            SectionBody::Table(preview) => PreviewTable::new(preview, self.theme).render(inner, buf),
        }
    }

    fn render_error(&self, error: &ViewError, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.get("error")))
            .title("Error");
        let inner = block.inner(area);
        block.render(area, buf);
        let lines = vec![
            Line::from(error.to_string()),
            Line::from(""),
            Line::from("Other tabs are unaffected. Check --data-dir or the [data] config section."),
        ];
        Paragraph::new(lines)
            .style(Style::default().fg(self.theme.get("error")))
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }

    fn render_rows(&self, view: &TabView, area: Rect, buf: &mut Buffer) {
        let mut y = area.y;
        let bottom = area.y + area.height;
        for row in view.rows.iter().skip(self.scroll) {
            if y >= bottom {
                break;
            }
            let height = row_height(row).min(bottom - y);
            let row_area = Rect::new(area.x, y, area.width, height);
            let constraints: Vec<Constraint> = row
                .iter()
                .map(|_| Constraint::Ratio(1, row.len() as u32))
                .collect();
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(constraints)
                .split(row_area);
            for (section, column) in row.iter().zip(columns.iter()) {
                self.render_section(section, *column, buf);
            }
            y += height;
        }
    }
}

impl Widget for TabPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Min(1),
            ])
            .split(area);

        let titles: Vec<Line> = Tab::ALL
            .iter()
            .enumerate()
            .map(|(i, t)| Line::from(format!("{} {}", i + 1, t.label())))
            .collect();
        Tabs::new(titles)
            .select(self.active.index())
            .style(Style::default().fg(self.theme.get("text_secondary")))
            .highlight_style(
                Style::default()
                    .fg(self.theme.get("tab_active"))
                    .add_modifier(Modifier::BOLD),
            )
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(Style::default().fg(self.theme.get("table_border"))),
            )
            .render(layout[0], buf);

        Paragraph::new(self.active.header())
            .style(
                Style::default()
                    .fg(self.theme.get("primary"))
                    .add_modifier(Modifier::BOLD),
            )
            .render(layout[1], buf);

        match self.view {
            None => Paragraph::new("Loading...")
                .style(Style::default().fg(self.theme.get("text_secondary")))
                .centered()
                .render(layout[2], buf),
            Some(Err(e)) => self.render_error(e, layout[2], buf),
            Some(Ok(view)) => self.render_rows(view, layout[2], buf),
        }
    }
}
