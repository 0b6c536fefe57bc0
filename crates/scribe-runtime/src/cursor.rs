use crate::token::Terminal;

/// Forward-only view over the token stream of a single parse.
#[derive(Clone)]
pub(crate) struct TokenCursor<'a> {
    iter: std::slice::Iter<'a, Terminal>,
    slice: &'a [Terminal],
}

impl<'a> TokenCursor<'a> {
    pub fn new(slice: &'a [Terminal]) -> Self {
        Self {
            iter: slice.iter(),
            slice,
        }
    }
    pub fn get_position(&self) -> usize {
        let total = self.slice.len();
        let less = self.iter.as_slice().len();
        total - less
    }
    pub fn next(&mut self) -> Option<&'a Terminal> {
        self.iter.next()
    }
    pub fn peek(&self) -> Option<&'a Terminal> {
        self.iter.clone().next()
    }
    /// The most recently consumed token.
    pub fn last(&self) -> Option<&'a Terminal> {
        let position = self.get_position();
        if position == 0 {
            return None;
        }
        self.slice.get(position - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::TerminalId;
    use cranelift_entity::EntityRef;

    fn token(text: &str) -> Terminal {
        Terminal::new(TerminalId::new(0), "word".into(), text, "test".into(), 1, 1)
    }

    #[test]
    fn test_cursor_tracks_last_consumed() {
        let tokens = [token("a"), token("b")];
        let mut cursor = TokenCursor::new(&tokens);

        assert!(cursor.last().is_none());
        assert_eq!(cursor.peek().map(|t| t.text.as_str()), Some("a"));

        cursor.next();
        assert_eq!(cursor.get_position(), 1);
        assert_eq!(cursor.last().map(|t| t.text.as_str()), Some("a"));
        assert_eq!(cursor.peek().map(|t| t.text.as_str()), Some("b"));

        cursor.next();
        assert!(cursor.peek().is_none());
        assert!(cursor.next().is_none());
        assert_eq!(cursor.last().map(|t| t.text.as_str()), Some("b"));
    }
}
