//! Observable application state types.
//!
//! These structures are the "View Model" for the application: the subset of
//! session state a renderer needs, without the reconciliation internals.

/// Connection state of the room channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Channel not open.
    Disconnected,
    /// Connection in progress.
    Connecting,
    /// Channel open.
    Connected,
}

/// Single-line text input with a cursor.
///
/// The cursor is a char index in `0..=len`, so multi-byte characters are
/// edited as a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputLine {
    buffer: String,
    cursor: usize,
}

impl InputLine {
    /// Current text.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in chars.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.buffer.chars().count()
    }

    /// True if no text has been typed.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Insert `c` at the cursor.
    pub fn insert(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.buffer.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the char before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_offset(self.cursor);
        self.buffer.remove(at);
    }

    /// Delete the char at the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_offset(self.cursor);
            self.buffer.remove(at);
        }
    }

    /// Move the cursor one char left.
    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move the cursor one char right.
    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.len());
    }

    /// Move the cursor to the start.
    pub fn home(&mut self) {
        self.cursor = 0;
    }

    /// Move the cursor to the end.
    pub fn end(&mut self) {
        self.cursor = self.len();
    }

    /// Take the text, leaving the line empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.buffer.char_indices().nth(chars).map_or(self.buffer.len(), |(i, _)| i)
    }
}
