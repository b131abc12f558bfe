use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget, Wrap},
};

use crate::aggregate::PlayerFilter;
use crate::config::{BrandingConfig, Theme};

/// Branding plus the player selector. Entry 0 is always "All".
pub struct Sidebar<'a> {
    branding: &'a BrandingConfig,
    players: &'a [String],
    theme: &'a Theme,
    hint: Option<&'a str>,
}

impl<'a> Sidebar<'a> {
    pub fn new(branding: &'a BrandingConfig, players: &'a [String], theme: &'a Theme) -> Self {
        Self {
            branding,
            players,
            theme,
            hint: None,
        }
    }

    /// Note shown under the list, e.g. why it only holds "All".
    pub fn with_hint(mut self, hint: Option<&'a str>) -> Self {
        self.hint = hint;
        self
    }
}

impl StatefulWidget for Sidebar<'_> {
    type State = ListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut ListState) {
        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(Style::default().fg(self.theme.get("sidebar_border")));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut branding = vec![
            Line::from(Span::styled(
                self.branding.sidebar_title.as_str(),
                Style::default()
                    .fg(self.theme.get("primary"))
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(self.branding.tagline.as_str()),
        ];
        // decorative only; nothing is fetched
        if let Some(url) = &self.branding.image_url {
            branding.push(Line::from(Span::styled(
                url.as_str(),
                Style::default()
                    .fg(self.theme.get("text_secondary"))
                    .add_modifier(Modifier::UNDERLINED),
            )));
        }
        let branding_height = if self.branding.image_url.is_some() { 6 } else { 3 };

        let hint_height = if self.hint.is_some() { 3 } else { 0 };
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(branding_height),
                Constraint::Min(3),
                Constraint::Length(hint_height),
            ])
            .split(inner);

        Paragraph::new(branding)
            .wrap(Wrap { trim: true })
            .render(layout[0], buf);

        let items: Vec<ListItem> = std::iter::once(PlayerFilter::ALL_LABEL)
            .chain(self.players.iter().map(String::as_str))
            .map(ListItem::new)
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(self.theme.get("sidebar_border")))
                    .title("Select Player"),
            )
            .style(Style::default().fg(self.theme.get("text_primary")))
            .highlight_style(
                Style::default()
                    .fg(self.theme.get("sidebar_selected"))
                    .add_modifier(Modifier::REVERSED),
            )
            .highlight_symbol("> ");
        StatefulWidget::render(list, layout[1], buf, state);

        if let Some(hint) = self.hint {
            Paragraph::new(hint)
                .style(Style::default().fg(self.theme.get("warning")))
                .wrap(Wrap { trim: true })
                .render(layout[2], buf);
        }
    }
}
