use std::cmp;

/// Text buffer behind a form field. Single-line fields simply never
/// receive a newline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Editor {
    pub lines: Vec<String>,
    pub cursor_line: usize,
    pub cursor_col: usize,  // In chars, not bytes
}

impl Editor {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_line: 0,
            cursor_col: 0,
        }
    }

    /// Cursor ends up after the last character
    pub fn from_string(content: &str) -> Self {
        let lines: Vec<String> = if content.is_empty() {
            vec![String::new()]
        } else {
            content.split('\n').map(|s| s.to_string()).collect()
        };
        let cursor_line = lines.len().saturating_sub(1);
        let cursor_col = lines.last().map(|l| l.chars().count()).unwrap_or(0);
        Self {
            lines,
            cursor_line,
            cursor_col,
        }
    }

    fn ensure_cursor_valid(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        if self.cursor_line >= self.lines.len() {
            self.cursor_line = self.lines.len() - 1;
        }
        let len = self.current_line_len();
        self.cursor_col = cmp::min(self.cursor_col, len);
    }

    fn current_line_len(&self) -> usize {
        self.lines
            .get(self.cursor_line)
            .map(|l| l.chars().count())
            .unwrap_or(0)
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            self.insert_newline();
            return;
        }
        self.ensure_cursor_valid();
        let col = self.cursor_col;
        if let Some(line) = self.lines.get_mut(self.cursor_line) {
            let mut chars: Vec<char> = line.chars().collect();
            chars.insert(col, ch);
            *line = chars.into_iter().collect();
            self.cursor_col += 1;
        }
    }

    /// Backspace: remove the character before the cursor, joining lines at column 0
    pub fn delete_char(&mut self) {
        self.ensure_cursor_valid();
        if self.cursor_col > 0 {
            let col = self.cursor_col;
            if let Some(line) = self.lines.get_mut(self.cursor_line) {
                let mut chars: Vec<char> = line.chars().collect();
                chars.remove(col - 1);
                *line = chars.into_iter().collect();
                self.cursor_col -= 1;
            }
        } else if self.cursor_line > 0 {
            let current = self.lines.remove(self.cursor_line);
            self.cursor_line -= 1;
            if let Some(prev) = self.lines.get_mut(self.cursor_line) {
                self.cursor_col = prev.chars().count();
                prev.push_str(&current);
            }
        }
    }

    /// Delete: remove the character under the cursor, joining lines at line end
    pub fn delete_forward(&mut self) {
        self.ensure_cursor_valid();
        let col = self.cursor_col;
        if col < self.current_line_len() {
            if let Some(line) = self.lines.get_mut(self.cursor_line) {
                let mut chars: Vec<char> = line.chars().collect();
                chars.remove(col);
                *line = chars.into_iter().collect();
            }
        } else if self.cursor_line + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_line + 1);
            if let Some(line) = self.lines.get_mut(self.cursor_line) {
                line.push_str(&next);
            }
        }
    }

    pub fn insert_newline(&mut self) {
        self.ensure_cursor_valid();
        let col = self.cursor_col;
        if let Some(line) = self.lines.get_mut(self.cursor_line) {
            let mut chars: Vec<char> = line.chars().collect();
            let remainder: String = chars.split_off(col).into_iter().collect();
            *line = chars.into_iter().collect();
            self.lines.insert(self.cursor_line + 1, remainder);
            self.cursor_line += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_cursor_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = cmp::min(self.cursor_col, self.current_line_len());
        }
    }

    pub fn move_cursor_down(&mut self) {
        if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = cmp::min(self.cursor_col, self.current_line_len());
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.current_line_len();
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_col < self.current_line_len() {
            self.cursor_col += 1;
        } else if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_col = self.current_line_len();
    }

    pub fn move_cursor_word_left(&mut self) {
        let chars: Vec<char> = match self.lines.get(self.cursor_line) {
            Some(line) => line.chars().collect(),
            None => return,
        };
        let mut pos = cmp::min(self.cursor_col, chars.len());
        while pos > 0 && !is_word_char(chars[pos - 1]) {
            pos -= 1;
        }
        while pos > 0 && is_word_char(chars[pos - 1]) {
            pos -= 1;
        }
        self.cursor_col = pos;
    }

    pub fn move_cursor_word_right(&mut self) {
        let chars: Vec<char> = match self.lines.get(self.cursor_line) {
            Some(line) => line.chars().collect(),
            None => return,
        };
        let mut pos = cmp::min(self.cursor_col, chars.len());
        while pos < chars.len() && is_word_char(chars[pos]) {
            pos += 1;
        }
        while pos < chars.len() && !is_word_char(chars[pos]) {
            pos += 1;
        }
        self.cursor_col = pos;
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.is_empty())
    }

    /// Visible slice of the first line and the cursor's offset in it, scrolled
    /// so the cursor stays inside `width` columns
    pub fn single_line_view(&self, width: usize) -> (String, usize) {
        let chars: Vec<char> = self.lines.first().map(|l| l.chars().collect()).unwrap_or_default();
        if width == 0 {
            return (String::new(), 0);
        }
        let col = cmp::min(self.cursor_col, chars.len());
        let start = col.saturating_sub(width - 1);
        let end = cmp::min(start + width, chars.len());
        (chars[start..end].iter().collect(), col - start)
    }
}

impl std::fmt::Display for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> Editor {
        let mut editor = Editor::new();
        for ch in text.chars() {
            editor.insert_char(ch);
        }
        editor
    }

    #[test]
    fn typing_and_backspace() {
        let mut editor = typed("héllo");
        assert_eq!(editor.to_string(), "héllo");
        assert_eq!(editor.cursor_col, 5);

        editor.delete_char();
        editor.delete_char();
        assert_eq!(editor.to_string(), "hél");
    }

    #[test]
    fn newline_splits_and_backspace_joins() {
        let mut editor = typed("abcd");
        editor.move_cursor_left();
        editor.move_cursor_left();
        editor.insert_newline();
        assert_eq!(editor.lines, vec!["ab", "cd"]);
        assert_eq!((editor.cursor_line, editor.cursor_col), (1, 0));

        editor.delete_char();
        assert_eq!(editor.to_string(), "abcd");
        assert_eq!(editor.cursor_col, 2);
    }

    #[test]
    fn delete_forward_joins_next_line() {
        let mut editor = Editor::from_string("ab\ncd");
        editor.cursor_line = 0;
        editor.move_cursor_end();
        editor.delete_forward();
        assert_eq!(editor.to_string(), "abcd");

        editor.move_cursor_home();
        editor.delete_forward();
        assert_eq!(editor.to_string(), "bcd");
    }

    #[test]
    fn from_string_places_cursor_at_end() {
        let editor = Editor::from_string("one\ntwo");
        assert_eq!(editor.cursor_line, 1);
        assert_eq!(editor.cursor_col, 3);
        assert_eq!(editor.to_string(), "one\ntwo");
        assert!(Editor::from_string("").is_empty());
    }

    #[test]
    fn word_movement() {
        let mut editor = typed("buy oat milk");
        editor.move_cursor_word_left();
        assert_eq!(editor.cursor_col, 8);
        editor.move_cursor_word_left();
        assert_eq!(editor.cursor_col, 4);
        editor.move_cursor_word_right();
        assert_eq!(editor.cursor_col, 8);
    }

    #[test]
    fn vertical_movement_clamps_column() {
        let mut editor = Editor::from_string("a\nlonger");
        editor.move_cursor_up();
        assert_eq!((editor.cursor_line, editor.cursor_col), (0, 1));
        editor.move_cursor_down();
        assert_eq!((editor.cursor_line, editor.cursor_col), (1, 1));
    }

    #[test]
    fn single_line_view_scrolls_to_cursor() {
        let editor = typed("0123456789");
        let (visible, cursor) = editor.single_line_view(4);
        assert_eq!(visible, "789");
        assert_eq!(cursor, 3);

        let mut editor = editor;
        editor.move_cursor_home();
        let (visible, cursor) = editor.single_line_view(4);
        assert_eq!(visible, "0123");
        assert_eq!(cursor, 0);
    }
}
