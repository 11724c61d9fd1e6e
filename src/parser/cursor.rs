/// Forward-only cursor over the lines of a text blob. Each extraction state
/// scans forward from wherever the previous state left it; consumed lines
/// are never revisited.
pub struct LineCursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            pos: 0,
        }
    }

    /// The line under the cursor, with its interior whitespace intact.
    pub fn current(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    pub fn advance(&mut self) {
        if self.pos < self.lines.len() {
            self.pos += 1;
        }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.lines.len()
    }

    /// Advance until the current line satisfies `pred`, parking the cursor
    /// at the matching line. `None` if the stream runs out first.
    pub fn seek(&mut self, mut pred: impl FnMut(&str) -> bool) -> Option<&'a str> {
        while let Some(line) = self.current() {
            if pred(line) {
                return Some(line);
            }
            self.advance();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_lines_in_order() {
        let mut cursor = LineCursor::new("one\ntwo\nthree");
        assert_eq!(cursor.current(), Some("one"));
        cursor.advance();
        assert_eq!(cursor.current(), Some("two"));
        cursor.advance();
        assert_eq!(cursor.current(), Some("three"));
        assert!(!cursor.at_end());
        cursor.advance();
        assert!(cursor.at_end());
        assert_eq!(cursor.current(), None);
    }

    #[test]
    fn preserves_interior_whitespace() {
        let cursor = LineCursor::new("  a  b  \nnext");
        assert_eq!(cursor.current(), Some("  a  b  "));
    }

    #[test]
    fn seek_parks_at_match() {
        let mut cursor = LineCursor::new("aa\nbb\ncc");
        assert_eq!(cursor.seek(|l| l.contains("bb")), Some("bb"));
        assert_eq!(cursor.current(), Some("bb"));
    }

    #[test]
    fn seek_exhaustion_leaves_cursor_at_end() {
        let mut cursor = LineCursor::new("aa\nbb");
        assert_eq!(cursor.seek(|l| l.contains("zz")), None);
        assert!(cursor.at_end());
    }

    #[test]
    fn advance_past_end_is_harmless() {
        let mut cursor = LineCursor::new("only");
        cursor.advance();
        cursor.advance();
        assert!(cursor.at_end());
    }

    #[test]
    fn empty_input_is_at_end() {
        assert!(LineCursor::new("").at_end());
    }
}
