use std::{fmt::Display, sync::Arc};

use serde::Serialize;

use crate::grammar::TerminalId;

/// Byte range into the lexed source.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Span {
        debug_assert!(start <= end);
        Span {
            start: start as u32,
            end: end as u32,
        }
    }
    pub fn len(self) -> usize {
        (self.end - self.start) as usize
    }
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }
    pub fn as_str(self, src: &str) -> &str {
        &src[self.start as usize..self.end as usize]
    }
}

/// A lexed token.
///
/// `text` is the matched source text after any rewrite the lexer applied,
/// so it may not be equal to the bytes covered by `span`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Terminal {
    #[serde(skip)]
    pub id: TerminalId,
    pub resource: Arc<str>,
    pub line: u32,
    pub col: u32,
    #[serde(rename = "terminal")]
    pub kind: Arc<str>,
    #[serde(rename = "source_string")]
    pub text: String,
    #[serde(skip)]
    pub span: Span,
}

impl Terminal {
    pub fn new(
        id: TerminalId,
        kind: Arc<str>,
        text: impl Into<String>,
        resource: Arc<str>,
        line: u32,
        col: u32,
    ) -> Terminal {
        Terminal {
            id,
            resource,
            line,
            col,
            kind,
            text: text.into(),
            span: Span::default(),
        }
    }
    pub fn with_span(mut self, span: Span) -> Terminal {
        self.span = span;
        self
    }
    pub fn is(&self, id: TerminalId) -> bool {
        self.id == id
    }
}

impl Display for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<{}:{}:{} {} {:?}>",
            self.resource, self.line, self.col, self.kind, self.text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cranelift_entity::EntityRef;

    #[test]
    fn test_terminal_display() {
        let token = Terminal::new(
            TerminalId::new(3),
            "identifier".into(),
            "foo",
            "main.wdl".into(),
            2,
            7,
        );
        assert_eq!(token.to_string(), r#"<main.wdl:2:7 identifier "foo">"#);
    }

    #[test]
    fn test_span() {
        let span = Span::new(2, 5);
        assert_eq!(span.as_str("a bcd e"), "bcd");
        assert_eq!(span.len(), 3);
        assert!(!span.is_empty());
    }
}
