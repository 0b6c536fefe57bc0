use std::sync::Arc;

use thiserror::Error;

use crate::token::Terminal;

fn caret(col: &u32) -> String {
    let mut line = " ".repeat(col.saturating_sub(1) as usize);
    line.push('^');
    line
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("Unrecognized token on line {line}, column {col}:\n\n{source_line}\n{}", caret(.col))]
    UnrecognizedToken {
        resource: Arc<str>,
        line: u32,
        col: u32,
        source_line: String,
    },
    #[error("{resource}:{line}:{col}: lexer mode stack is empty")]
    EmptyModeStack {
        resource: Arc<str>,
        line: u32,
        col: u32,
    },
    #[error("{resource}:{line}:{col}: attempted to emit invalid terminal id {id}")]
    InvalidTerminal {
        resource: Arc<str>,
        line: u32,
        col: u32,
        id: u32,
    },
    #[error("{resource}:{line}:{col}: unknown lexer mode id {id}")]
    UnknownMode {
        resource: Arc<str>,
        line: u32,
        col: u32,
        id: u32,
    },
}

/// Defects in a grammar or lexer description, detected while building it.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("grammar declares no nonterminals")]
    Empty,
    #[error("nonterminal `{0}` is declared but never defined")]
    Undefined(Arc<str>),
    #[error("nonterminal `{0}` is defined more than once")]
    Redefined(Arc<str>),
    #[error("`{0}` is not an expression nonterminal")]
    NotExpression(Arc<str>),
    #[error("{position} rule of `{nonterminal}` must begin with a terminal")]
    MissingTrigger {
        nonterminal: Arc<str>,
        position: &'static str,
    },
    #[error("`{terminal}` already triggers a {position} rule of `{nonterminal}`")]
    DuplicateTrigger {
        nonterminal: Arc<str>,
        terminal: Arc<str>,
        position: &'static str,
    },
    #[error("conflict for `{nonterminal}` on `{terminal}` between `{first}` and `{second}`")]
    Conflict {
        nonterminal: Arc<str>,
        terminal: Arc<str>,
        first: String,
        second: String,
    },
    #[error("`{nonterminal}` derives the empty string through both `{first}` and `{second}`")]
    EpsilonConflict {
        nonterminal: Arc<str>,
        first: String,
        second: String,
    },
    #[error("unknown terminal id {0}")]
    UnknownTerminal(u32),
    #[error("unknown nonterminal id {0}")]
    UnknownNonterminal(u32),
    #[error("lexer declares no modes")]
    NoModes,
    #[error("unknown lexer mode id {0}")]
    UnknownMode(u32),
    #[error("invalid pattern `{pattern}` in lexer mode `{mode}`")]
    InvalidPattern {
        mode: Arc<str>,
        pattern: String,
        source: regex::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    UnexpectedEof {
        nonterminal: Arc<str>,
        expected: Vec<Arc<str>>,
        rules: Vec<String>,
    },
    ExcessTokens {
        nonterminal: Arc<str>,
        terminal: Terminal,
    },
    UnexpectedSymbol {
        nonterminal: Arc<str>,
        actual: Terminal,
        expected: Vec<Arc<str>>,
        rule: Option<String>,
    },
    NoMoreTokens {
        nonterminal: Arc<str>,
        expected: Arc<str>,
        last: Option<Terminal>,
    },
    InvalidTerminal {
        nonterminal: Arc<str>,
        invalid: Terminal,
    },
    MissingListItems {
        nonterminal: Arc<str>,
        required: u32,
        found: u32,
        last: Option<Terminal>,
    },
    MissingTerminator {
        nonterminal: Arc<str>,
        terminator: Arc<str>,
        last: Option<Terminal>,
    },
}

impl SyntaxErrorKind {
    fn format(&self, formatter: &dyn ErrorFormatter) -> String {
        match self {
            SyntaxErrorKind::UnexpectedEof {
                nonterminal,
                expected,
                rules,
            } => {
                let rules = rules.iter().map(String::as_str).collect::<Vec<_>>();
                formatter.unexpected_eof(nonterminal, expected, &rules)
            }
            SyntaxErrorKind::ExcessTokens {
                nonterminal,
                terminal,
            } => formatter.excess_tokens(nonterminal, terminal),
            SyntaxErrorKind::UnexpectedSymbol {
                nonterminal,
                actual,
                expected,
                rule,
            } => formatter.unexpected_symbol(nonterminal, actual, expected, rule.as_deref()),
            SyntaxErrorKind::NoMoreTokens {
                nonterminal,
                expected,
                last,
            } => formatter.no_more_tokens(nonterminal, expected, last.as_ref()),
            SyntaxErrorKind::InvalidTerminal {
                nonterminal,
                invalid,
            } => formatter.invalid_terminal(nonterminal, invalid),
            SyntaxErrorKind::MissingListItems {
                nonterminal,
                required,
                found,
                last,
            } => formatter.missing_list_items(nonterminal, *required, *found, last.as_ref()),
            SyntaxErrorKind::MissingTerminator {
                nonterminal,
                terminator,
                last,
            } => formatter.missing_terminator(nonterminal, terminator, last.as_ref()),
        }
    }
}

/// A parse failure, `message` is produced by the [`ErrorFormatter`] that was
/// passed to the parser.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub message: String,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, formatter: &dyn ErrorFormatter) -> SyntaxError {
        let message = kind.format(formatter);
        SyntaxError { kind, message }
    }

    /// The token the error points at, if there is one.
    pub fn terminal(&self) -> Option<&Terminal> {
        match &self.kind {
            SyntaxErrorKind::UnexpectedEof { .. } => None,
            SyntaxErrorKind::ExcessTokens { terminal, .. } => Some(terminal),
            SyntaxErrorKind::UnexpectedSymbol { actual, .. } => Some(actual),
            SyntaxErrorKind::InvalidTerminal { invalid, .. } => Some(invalid),
            SyntaxErrorKind::NoMoreTokens { last, .. }
            | SyntaxErrorKind::MissingListItems { last, .. }
            | SyntaxErrorKind::MissingTerminator { last, .. } => last.as_ref(),
        }
    }
}

/// Produces the human readable message for each kind of syntax error.
pub trait ErrorFormatter {
    fn unexpected_eof(&self, nonterminal: &str, expected: &[Arc<str>], rules: &[&str]) -> String;
    fn excess_tokens(&self, nonterminal: &str, terminal: &Terminal) -> String;
    fn unexpected_symbol(
        &self,
        nonterminal: &str,
        actual: &Terminal,
        expected: &[Arc<str>],
        rule: Option<&str>,
    ) -> String;
    fn no_more_tokens(&self, nonterminal: &str, expected: &str, last: Option<&Terminal>) -> String;
    fn invalid_terminal(&self, nonterminal: &str, invalid: &Terminal) -> String;
    fn missing_list_items(
        &self,
        nonterminal: &str,
        required: u32,
        found: u32,
        last: Option<&Terminal>,
    ) -> String;
    fn missing_terminator(
        &self,
        nonterminal: &str,
        terminator: &str,
        last: Option<&Terminal>,
    ) -> String;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultFormatter;

fn join(names: &[Arc<str>]) -> String {
    names.iter().map(|n| n.as_ref()).collect::<Vec<_>>().join(", ")
}

impl ErrorFormatter for DefaultFormatter {
    fn unexpected_eof(&self, nonterminal: &str, expected: &[Arc<str>], rules: &[&str]) -> String {
        let mut message = format!(
            "Error: unexpected end of file while parsing {nonterminal}, expected one of: {}",
            join(expected)
        );
        if !rules.is_empty() {
            message.push_str("\nPossible rules:");
            for rule in rules {
                message.push_str("\n  ");
                message.push_str(rule);
            }
        }
        message
    }

    fn excess_tokens(&self, nonterminal: &str, terminal: &Terminal) -> String {
        format!(
            "Finished parsing {nonterminal} without consuming all tokens, next is {} {:?} at line {}, column {}",
            terminal.kind, terminal.text, terminal.line, terminal.col
        )
    }

    fn unexpected_symbol(
        &self,
        nonterminal: &str,
        actual: &Terminal,
        expected: &[Arc<str>],
        rule: Option<&str>,
    ) -> String {
        let mut message = format!(
            "Unexpected symbol (line {}, col {}) when parsing {nonterminal}. Expected {}, got {} {:?}.",
            actual.line,
            actual.col,
            join(expected),
            actual.kind,
            actual.text
        );
        if let Some(rule) = rule {
            message.push_str("\nRule: ");
            message.push_str(rule);
        }
        message
    }

    fn no_more_tokens(&self, nonterminal: &str, expected: &str, last: Option<&Terminal>) -> String {
        match last {
            Some(last) => format!(
                "No more tokens while parsing {nonterminal}. Expecting {expected} after {} {:?} at line {}, column {}",
                last.kind, last.text, last.line, last.col
            ),
            None => format!("No more tokens while parsing {nonterminal}. Expecting {expected}"),
        }
    }

    fn invalid_terminal(&self, nonterminal: &str, invalid: &Terminal) -> String {
        format!(
            "Invalid symbol ID {} ({:?}) while parsing {nonterminal}",
            invalid.id.as_u32(),
            invalid.text
        )
    }

    fn missing_list_items(
        &self,
        nonterminal: &str,
        required: u32,
        found: u32,
        last: Option<&Terminal>,
    ) -> String {
        let mut message =
            format!("List {nonterminal} requires {required} items but only {found} were found");
        if let Some(last) = last {
            message.push_str(&format!(" (ending at line {}, column {})", last.line, last.col));
        }
        message
    }

    fn missing_terminator(
        &self,
        nonterminal: &str,
        terminator: &str,
        last: Option<&Terminal>,
    ) -> String {
        let mut message = format!("List {nonterminal} is missing a terminator, expected {terminator}");
        if let Some(last) = last {
            message.push_str(&format!(" after line {}, column {}", last.line, last.col));
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_token_message() {
        let error = LexError::UnrecognizedToken {
            resource: "x.wdl".into(),
            line: 3,
            col: 5,
            source_line: "abc @ def".into(),
        };
        assert_eq!(
            error.to_string(),
            "Unrecognized token on line 3, column 5:\n\nabc @ def\n    ^"
        );
    }
}
