//! Title bar with the sources selector and clear hint

use crate::conversation::RetrievalWidth;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};
use strum::IntoEnumIterator;

pub struct Header<'a> {
    pub retrieval_width: RetrievalWidth,
    pub pending: bool,
    pub endpoint: &'a str,
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        block.render(area, buf);

        let title = Line::from(vec![
            Span::styled(
                "🛡️ SEBI Cybersecurity Assistant",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "  Your AI-powered guide to SEBI policies and regulations",
                Style::default().fg(Color::Gray),
            ),
        ]);
        buf.set_line(inner.x, inner.y, &title, inner.width);

        if inner.height < 2 {
            return;
        }

        // Disabled look while a request is in flight
        let active = if self.pending {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        };

        let mut spans = vec![Span::styled("Sources: ", Style::default().fg(Color::Gray))];
        for width in RetrievalWidth::iter() {
            let style = if width == self.retrieval_width {
                active
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(format!(" {} ", width), style));
        }
        spans.push(Span::styled(
            "   Tab change  ·  Ctrl+L clear chat  ·  /help",
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(Span::styled(
            format!("   {}", self.endpoint),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ));
        buf.set_line(inner.x, inner.y + 1, &Line::from(spans), inner.width);
    }
}
