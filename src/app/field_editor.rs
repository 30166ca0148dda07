use std::cmp::min;

/// A single-line input for the edit dialog. Cursor positions are char
/// indices, so multibyte input behaves.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldEditor {
    pub text: String,
    pub cursor: usize,
}

impl FieldEditor {
    pub fn from_text(text: String) -> Self {
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        self.clamp_cursor();
        let byte_index = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_index, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        self.clamp_cursor();
        if self.cursor == 0 {
            return;
        }
        let byte_index = char_to_byte_index(&self.text, self.cursor - 1);
        self.text.remove(byte_index);
        self.cursor -= 1;
    }

    pub fn delete_forward(&mut self) {
        self.clamp_cursor();
        if self.cursor >= self.text.chars().count() {
            return;
        }
        let byte_index = char_to_byte_index(&self.text, self.cursor);
        self.text.remove(byte_index);
    }

    pub fn move_left(&mut self) {
        self.clamp_cursor();
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.clamp_cursor();
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    fn clamp_cursor(&mut self) {
        self.cursor = min(self.cursor, self.text.chars().count());
    }
}

fn char_to_byte_index(text: &str, char_index: usize) -> usize {
    match text.char_indices().nth(char_index) {
        Some((idx, _)) => idx,
        None => text.len(),
    }
}
