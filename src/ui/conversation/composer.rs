use crate::ui::conversation::commands::{parse_slash_command, ParsedCommand};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Result returned when the user interacts with the conversation composer
#[derive(Debug, PartialEq)]
pub enum ConversationResult {
    /// Draft text changed; the caller decides whether to accept it
    Edited(String),
    Submitted(String),
    Command(ParsedCommand),
    None,
}

/// Cursor over the controller-owned draft.
///
/// The composer never stores the text itself; each key is applied to the
/// draft passed in and the new text is handed back as [`ConversationResult::Edited`].
#[derive(Debug, Clone)]
pub struct ConversationComposer {
    /// Cursor position in chars
    cursor: usize,
    placeholder: String,
}

impl ConversationComposer {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            cursor: 0,
            placeholder: placeholder.into(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Handle key input against the current draft
    pub fn handle_key(&mut self, key: KeyEvent, draft: &str, pending: bool) -> ConversationResult {
        if key.kind != KeyEventKind::Press {
            return ConversationResult::None;
        }
        self.clamp(draft);

        match key.code {
            KeyCode::Enter
                if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
            {
                if pending {
                    return ConversationResult::None;
                }
                self.insert(draft, "\n")
            }
            KeyCode::Enter => {
                if let Some(command) = parse_slash_command(draft) {
                    return ConversationResult::Command(command);
                }
                if pending || draft.trim().is_empty() {
                    return ConversationResult::None;
                }
                ConversationResult::Submitted(draft.to_string())
            }
            KeyCode::Char(c) => {
                if pending {
                    return ConversationResult::None;
                }
                let mut buf = [0u8; 4];
                self.insert(draft, c.encode_utf8(&mut buf))
            }
            KeyCode::Backspace => {
                if pending || self.cursor == 0 {
                    return ConversationResult::None;
                }
                self.cursor -= 1;
                ConversationResult::Edited(remove_char(draft, self.cursor))
            }
            KeyCode::Delete => {
                if pending || self.cursor >= draft.chars().count() {
                    return ConversationResult::None;
                }
                ConversationResult::Edited(remove_char(draft, self.cursor))
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                ConversationResult::None
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(draft.chars().count());
                ConversationResult::None
            }
            KeyCode::Home => {
                self.cursor = 0;
                ConversationResult::None
            }
            KeyCode::End => {
                self.cursor = draft.chars().count();
                ConversationResult::None
            }
            _ => ConversationResult::None,
        }
    }

    /// Insert pasted text at the cursor
    pub fn handle_paste(&mut self, text: &str, draft: &str, pending: bool) -> ConversationResult {
        if pending || text.is_empty() {
            return ConversationResult::None;
        }
        self.clamp(draft);
        self.insert(draft, &text.replace('\r', ""))
    }

    /// Reset the cursor, e.g. after the draft was cleared by a submit
    pub fn clear(&mut self) {
        self.cursor = 0;
    }

    fn insert(&mut self, draft: &str, text: &str) -> ConversationResult {
        let mut content = draft.to_string();
        content.insert_str(byte_index(draft, self.cursor), text);
        self.cursor += text.chars().count();
        ConversationResult::Edited(content)
    }

    fn clamp(&mut self, draft: &str) {
        self.cursor = self.cursor.min(draft.chars().count());
    }

    pub fn widget<'a>(&'a self, draft: &'a str, pending: bool) -> ComposerWidget<'a> {
        ComposerWidget {
            composer: self,
            draft,
            pending,
        }
    }
}

fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Zero-based (line, column) of a char index, in chars
fn cursor_position(text: &str, char_index: usize) -> (usize, usize) {
    text.chars()
        .take(char_index)
        .fold((0, 0), |(row, col), c| if c == '\n' { (row + 1, 0) } else { (row, col + 1) })
}

fn remove_char(text: &str, char_index: usize) -> String {
    text.chars()
        .enumerate()
        .filter(|(i, _)| *i != char_index)
        .map(|(_, c)| c)
        .collect()
}

/// Borrowed view used for rendering
pub struct ComposerWidget<'a> {
    composer: &'a ConversationComposer,
    draft: &'a str,
    pending: bool,
}

impl Widget for ComposerWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (title, style) = if self.pending {
            ("⏳ Waiting for answer", Style::default().fg(Color::DarkGray))
        } else {
            ("📤 Ask a question", Style::default().fg(Color::Green))
        };

        let block = Block::default().borders(Borders::ALL).title(title).style(style);
        let inner_area = block.inner(area);
        block.render(area, buf);

        if inner_area.is_empty() {
            return;
        }

        if self.draft.is_empty() {
            let placeholder_line = Line::from(vec![Span::styled(
                self.composer.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            )]);
            buf.set_line(inner_area.x, inner_area.y, &placeholder_line, inner_area.width);
            return;
        }

        let cursor = self.composer.cursor.min(self.draft.chars().count());
        let mut content = self.draft.to_string();
        if !self.pending {
            content.insert(byte_index(&content, cursor), '▌');
        }

        // Scroll so the cursor (and the '▌' drawn after it) stays inside the box
        let (row, col) = cursor_position(self.draft, cursor);
        let height = inner_area.height as usize;
        let width = inner_area.width as usize;
        let top = (row + 1).saturating_sub(height);
        let left = col.saturating_sub(width - 1);

        for (i, line_text) in content.split('\n').skip(top).take(height).enumerate() {
            let visible: String = line_text.chars().skip(left).collect();
            let line = Line::from(vec![Span::raw(visible)]);
            buf.set_line(inner_area.x, inner_area.y + i as u16, &line, inner_area.width);
        }
    }
}
