use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Paragraph, Row, Table, Widget},
};

use crate::config::Theme;
use crate::preview::TablePreview;

const MAX_COLUMN_WIDTH: usize = 28;

pub struct PreviewTable<'a> {
    preview: &'a TablePreview,
    theme: &'a Theme,
}

impl<'a> PreviewTable<'a> {
    pub fn new(preview: &'a TablePreview, theme: &'a Theme) -> Self {
        Self { preview, theme }
    }

    /// Lines needed to show every row plus header and footer.
    pub fn height(preview: &TablePreview) -> u16 {
        preview.rows.len() as u16 + 2
    }
}

impl Widget for PreviewTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);

        let header = Row::new(self.preview.headers.iter().map(String::as_str)).style(
            Style::default()
                .fg(self.theme.get("table_header"))
                .add_modifier(Modifier::BOLD),
        );
        let rows = self
            .preview
            .rows
            .iter()
            .map(|r| Row::new(r.iter().map(String::as_str)));
        let widths: Vec<Constraint> = self
            .preview
            .column_widths()
            .into_iter()
            .map(|w| Constraint::Length(w.min(MAX_COLUMN_WIDTH) as u16))
            .collect();

        Table::new(rows, widths)
            .header(header)
            .column_spacing(2)
            .style(Style::default().fg(self.theme.get("text_primary")))
            .render(layout[0], buf);

        Paragraph::new(format!(
            "Showing {} of {} rows",
            self.preview.rows.len(),
            self.preview.total_rows
        ))
        .style(Style::default().fg(self.theme.get("text_secondary")))
        .render(layout[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn renders_headers_and_footer() {
        let df = df!("player" => &["Aasif", "Kushal"], "runs" => &[300.0, 250.0]).unwrap();
        let preview = TablePreview::from_frame(&df, 1).unwrap();
        let theme = Theme::default();
        let area = Rect::new(0, 0, 40, PreviewTable::height(&preview));
        let mut buf = Buffer::empty(area);
        PreviewTable::new(&preview, &theme).render(area, &mut buf);
        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("player"));
        assert!(text.contains("Aasif"));
        assert!(!text.contains("Kushal"));
        assert!(text.contains("Showing 1 of 2 rows"));
    }
}
