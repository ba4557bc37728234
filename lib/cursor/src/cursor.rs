use std::{fmt::Formatter, str::Chars};

/// 1-based source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, derive_more::Display)]
pub struct Line(pub usize);

/// A position in a source string. Advancing it with [`Iterator::next`] keeps track of the
/// current line, and two cursors over the same source can be used to slice out a lexeme.
#[derive(Clone)]
pub struct Cursor<'a> {
    source: &'a str,
    chars: Chars<'a>,
    line: Line,
}

impl<'a> std::fmt::Debug for Cursor<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // The remaining source is usually too verbose, so only print it in alternate mode
        if f.alternate() {
            f.debug_struct("Cursor")
                .field("line", &self.line)
                .field("offset", &self.offset())
                .field("rest", &self.chars.as_str())
                .finish()
        } else {
            f.debug_struct("Cursor").field("line", &self.line).field("offset", &self.offset()).finish()
        }
    }
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, chars: source.chars(), line: Line(1) }
    }

    pub fn line(&self) -> Line {
        self.line
    }

    /// Byte offset into the source.
    pub fn offset(&self) -> usize {
        self.source.len() - self.chars.as_str().len()
    }

    pub fn is_at_end(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    pub fn peek_next(&self) -> Option<char> {
        self.chars.clone().nth(1)
    }

    /// Advances only if the next char is `expected`.
    pub fn next_if_eq(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.next();
            true
        } else {
            false
        }
    }

    /// Advances while `predicate` holds for the next char.
    pub fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&predicate) {
            self.next();
        }
    }

    /// Source text between `self` and `end`, which must be a cursor into the same string.
    pub fn slice_until<'c>(&self, end: &'c Cursor<'a>) -> &'a str {
        assert!(std::ptr::eq(self.source, end.source), "cursors point into different sources");
        &self.source[self.offset()..end.offset()]
    }
}

impl<'a> From<&'a str> for Cursor<'a> {
    fn from(source: &'a str) -> Self {
        Self::new(source)
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line.0 += 1;
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn slice_until() {
        let mut cursor: Cursor = "ab\ncd\n\n".into();

        cursor.next(); // 'a'

        let start = cursor.clone();

        cursor.next(); // 'b'
        cursor.next(); // '\n'
        cursor.next(); // 'c'

        assert_eq!(start.slice_until(&cursor), "b\nc");
        assert_eq!(cursor.slice_until(&cursor), "");
    }

    #[test]
    #[should_panic(expected = "cursors point into different sources")]
    fn slice_until_checks_source_identity_not_contents() {
        let (a, b) = (String::from("same text"), String::from("same text"));
        Cursor::new(&a).slice_until(&Cursor::new(&b));
    }

    #[test]
    fn lines_and_lookahead() {
        let mut cursor = Cursor::new("ab\ncd\n\n");

        assert_eq!(cursor.peek(), Some('a'));
        assert_eq!(cursor.peek_next(), Some('b'));
        assert_eq!(cursor.next(), Some('a'));
        assert_eq!((cursor.line(), cursor.offset()), (Line(1), 1));

        assert_eq!(cursor.next(), Some('b'));
        assert_eq!(cursor.next(), Some('\n'));
        assert_eq!((cursor.line(), cursor.offset()), (Line(2), 3));

        cursor.next(); // 'c'
        cursor.next(); // 'd'

        assert_eq!(cursor.next(), Some('\n'));
        assert_eq!(cursor.next(), Some('\n'));
        assert_eq!(cursor.line(), Line(4));

        assert!(cursor.is_at_end());
        assert_eq!(cursor.peek(), None);
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.line(), Line(4));

        cursor = "".into();
        assert!(cursor.is_at_end());
        assert_eq!(cursor.peek(), None);
        assert_eq!(cursor.peek_next(), None);
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.line(), Line(1));

        cursor = "\n".into();
        assert_eq!(cursor.peek(), Some('\n'));
        assert_eq!(cursor.peek_next(), None);
        assert_eq!(cursor.next(), Some('\n'));
        assert_eq!(cursor.line(), Line(2));
    }

    #[test]
    fn conditional_advance() {
        let mut cursor = Cursor::new("==1234.5");

        assert!(!cursor.next_if_eq('!'));
        assert!(cursor.next_if_eq('='));
        assert!(cursor.next_if_eq('='));

        let start = cursor.clone();
        cursor.advance_while(|c| c.is_ascii_digit());
        assert_eq!(start.slice_until(&cursor), "1234");
        assert_eq!(cursor.peek(), Some('.'));
        assert_eq!(cursor.peek_next(), Some('5'));
    }

    #[test]
    fn multibyte_offsets() {
        let mut cursor = Cursor::new("ä\nb");
        let start = cursor.clone();
        cursor.next();
        assert_eq!(cursor.offset(), 2);
        assert_eq!(start.slice_until(&cursor), "ä");
    }
}
