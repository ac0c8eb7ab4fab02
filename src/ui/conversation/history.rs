//! Conversation history display component

use crate::conversation::Message;
use crate::events::ConversationRole;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget},
};
use std::cell::Cell;

/// Scroll position and display options for the message log.
///
/// `scroll_offset` counts lines up from the bottom, so zero follows new
/// messages as they arrive. It never exceeds the offset of the top line as of
/// the last render.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    scroll_offset: usize,
    max_offset: Cell<usize>,
    show_timestamps: bool,
}

impl ConversationHistory {
    pub fn new(show_timestamps: bool) -> Self {
        Self {
            scroll_offset: 0,
            max_offset: Cell::new(0),
            show_timestamps,
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self
            .scroll_offset
            .saturating_add(lines)
            .min(self.max_offset.get());
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self
            .scroll_offset
            .min(self.max_offset.get())
            .saturating_sub(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn widget<'a>(&'a self, messages: &'a [Message], pending: bool, tick: u64) -> HistoryWidget<'a> {
        HistoryWidget {
            history: self,
            messages,
            pending,
            tick,
        }
    }
}

pub struct HistoryWidget<'a> {
    history: &'a ConversationHistory,
    messages: &'a [Message],
    pending: bool,
    tick: u64,
}

impl Widget for HistoryWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("💬 Conversation");

        let inner_area = block.inner(area);
        block.render(area, buf);

        let width = inner_area.width.saturating_sub(3) as usize;
        let mut all_lines: Vec<Line> = Vec::new();
        for message in self.messages {
            all_lines.extend(self.render_message(message, width));
            all_lines.push(Line::from(""));
        }
        if self.pending {
            all_lines.push(typing_indicator(self.tick));
        }

        // Determine the range of lines to display, anchored at the bottom
        let height = inner_area.height as usize;
        let total = all_lines.len();
        let max_offset = total.saturating_sub(height);
        self.history.max_offset.set(max_offset);
        let offset = self.history.scroll_offset.min(max_offset);
        let end = total - offset;
        let start = end.saturating_sub(height);

        for (i, line) in all_lines[start..end].iter().enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }

        if total > height {
            let mut state = ScrollbarState::new(max_offset).position(max_offset - offset);
            Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .render(inner_area, buf, &mut state);
        }
    }
}

impl HistoryWidget<'_> {
    /// Render a single message into lines
    fn render_message(&self, message: &Message, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let mut header = vec![Span::styled(
            format!("{} {}", message.role.icon(), message.role.display_name()),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if self.history.show_timestamps {
            header.push(Span::styled(
                format!("  {}", message.formatted_time()),
                Style::default().fg(Color::DarkGray),
            ));
        }
        if message.is_error {
            header.push(Span::styled("  ⚠ error", Style::default().fg(Color::Red)));
        }
        lines.push(Line::from(header));

        let style = content_style(message);
        for content_line in wrap_text(&message.text, width) {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(content_line, style),
            ]));
        }

        lines
    }
}

fn content_style(message: &Message) -> Style {
    if message.is_error {
        return Style::default().fg(Color::Red);
    }
    match message.role {
        ConversationRole::User => Style::default().fg(Color::Cyan),
        ConversationRole::Assistant => Style::default().fg(Color::Green),
    }
}

fn typing_indicator(tick: u64) -> Line<'static> {
    let dots = match tick % 4 {
        0 => "   ",
        1 => ".  ",
        2 => ".. ",
        _ => "...",
    };
    Line::from(vec![
        Span::styled("🤖 Typing", Style::default().fg(Color::Green)),
        Span::styled(dots, Style::default().fg(Color::Yellow)),
    ])
}

/// Wrap text to fit within the given width.
///
/// Explicit line breaks and each paragraph's leading indentation are kept;
/// words longer than the line are split so nothing is cut off at the border.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return text.lines().map(str::to_string).collect();
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let body = paragraph.trim_start();
        let mut indent = paragraph[..paragraph.len() - body.len()].replace('\t', "    ");
        if indent.chars().count() >= width / 2 {
            indent.clear();
        }
        let indent_len = indent.chars().count();
        let avail = width - indent_len;

        let mut current_line = indent.clone();
        let mut current_len = 0;

        for word in body.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(avail) {
                if current_len > 0 && current_len + 1 + chunk.len() > avail {
                    lines.push(std::mem::replace(&mut current_line, indent.clone()));
                    current_len = 0;
                }
                if current_len > 0 {
                    current_line.push(' ');
                    current_len += 1;
                }
                current_line.extend(chunk);
                current_len += chunk.len();
            }
        }

        lines.push(current_line);
    }

    lines
}
