//! Table driven LL(1) parser.
//!
//! Plain nonterminals consult the prediction table, optionals and lists are
//! decided from FIRST and FOLLOW, expression nonterminals hand over to the
//! Pratt loop in [`pratt`].

mod pratt;

use std::sync::Arc;

use crate::{
    cursor::TokenCursor,
    error::{ErrorFormatter, SyntaxError, SyntaxErrorKind},
    grammar::{Grammar, ListShape, NonterminalId, NonterminalShape, RuleId, Symbol, TerminalId},
    token::Terminal,
    tree::{Node, NodeKind, ParseTree},
};

struct Parser<'a> {
    grammar: &'a Grammar,
    tokens: TokenCursor<'a>,
    formatter: &'a dyn ErrorFormatter,
    /// Nonterminal and rule currently being expanded, reported in errors.
    nonterminal: NonterminalId,
    rule: Option<RuleId>,
}

/// Parses `tokens` as the start nonterminal of `grammar`.
pub fn parse(
    grammar: &Grammar,
    tokens: &[Terminal],
    formatter: &dyn ErrorFormatter,
) -> Result<ParseTree, SyntaxError> {
    parse_from(grammar, grammar.start(), tokens, formatter)
}

/// Parses `tokens` as `start`, all tokens must be consumed.
pub fn parse_from(
    grammar: &Grammar,
    start: NonterminalId,
    tokens: &[Terminal],
    formatter: &dyn ErrorFormatter,
) -> Result<ParseTree, SyntaxError> {
    let mut p = Parser {
        grammar,
        tokens: TokenCursor::new(tokens),
        formatter,
        nonterminal: start,
        rule: None,
    };

    if let Some(first) = p.tokens.peek() {
        if !grammar.is_valid_terminal(first.id) {
            return Err(p.invalid_terminal(first));
        }
    }

    let tree = p.parse_nonterminal(start)?;

    if let Some(extra) = p.tokens.peek() {
        return Err(p.error(SyntaxErrorKind::ExcessTokens {
            nonterminal: p.name(start),
            terminal: extra.clone(),
        }));
    }

    log::debug!(
        "parsed {} tokens as {}",
        tokens.len(),
        grammar.nonterminal(start).name
    );
    Ok(tree)
}

impl<'a> Parser<'a> {
    fn parse_nonterminal(&mut self, nonterminal: NonterminalId) -> Result<ParseTree, SyntaxError> {
        let grammar = self.grammar;
        let saved = (self.nonterminal, self.rule);
        self.nonterminal = nonterminal;
        self.rule = None;

        let tree = match &grammar.nonterminal(nonterminal).shape {
            NonterminalShape::Plain { epsilon, .. } => self.parse_plain(nonterminal, *epsilon),
            NonterminalShape::Optional(inner) => self.parse_optional(nonterminal, *inner),
            NonterminalShape::List { item, shape } => self.parse_list(nonterminal, *item, *shape),
            NonterminalShape::Expression(expr) => self.parse_expression(nonterminal, expr, 0),
        }?;

        (self.nonterminal, self.rule) = saved;
        Ok(tree)
    }

    fn parse_symbol(&mut self, symbol: Symbol) -> Result<ParseTree, SyntaxError> {
        match symbol {
            Symbol::Terminal(terminal) => Ok(ParseTree::Terminal(self.expect(terminal)?)),
            Symbol::Nonterminal(nonterminal) => self.parse_nonterminal(nonterminal),
        }
    }

    fn parse_plain(
        &mut self,
        nonterminal: NonterminalId,
        epsilon: Option<RuleId>,
    ) -> Result<ParseTree, SyntaxError> {
        let grammar = self.grammar;
        let rule = match self.tokens.peek() {
            None => match epsilon {
                Some(rule) => rule,
                None => return Err(self.unexpected_eof(nonterminal)),
            },
            Some(token) => match grammar.rule_for(nonterminal, token.id) {
                Some(rule) => rule,
                None => match epsilon {
                    Some(rule) if grammar.in_follow(nonterminal, token.id) => rule,
                    _ => {
                        let mut expected = grammar.first(nonterminal);
                        if epsilon.is_some() {
                            expected.extend(grammar.follow(nonterminal));
                        }
                        return Err(self.unexpected_symbol(token, expected));
                    }
                },
            },
        };

        self.rule = Some(rule);
        log::trace!("{}", grammar.rule(rule).text);
        let morphemes = &grammar.rule(rule).morphemes;
        let mut children = Vec::with_capacity(morphemes.len());
        for &symbol in morphemes {
            children.push(self.parse_symbol(symbol)?);
        }

        let transform = grammar.rule(rule).transform.clone();
        Ok(self.node(nonterminal, NodeKind::Plain { transform }, children))
    }

    fn parse_optional(
        &mut self,
        nonterminal: NonterminalId,
        inner: Symbol,
    ) -> Result<ParseTree, SyntaxError> {
        let grammar = self.grammar;
        let present = match self.tokens.peek() {
            None => false,
            Some(token) => {
                grammar.symbol_starts_with(inner, token.id)
                    || !grammar.in_follow(nonterminal, token.id)
            }
        };

        let mut children = Vec::new();
        if present {
            children.push(self.parse_symbol(inner)?);
        }
        Ok(self.node(nonterminal, NodeKind::Plain { transform: None }, children))
    }

    fn parse_list(
        &mut self,
        nonterminal: NonterminalId,
        item: Symbol,
        shape: ListShape,
    ) -> Result<ParseTree, SyntaxError> {
        let grammar = self.grammar;
        let mut children = Vec::new();
        let mut found = 0;

        loop {
            match self.tokens.peek() {
                Some(token) if grammar.symbol_starts_with(item, token.id) => {}
                _ => break,
            }

            let position = self.tokens.get_position();
            children.push(self.parse_symbol(item)?);
            found += 1;
            if self.tokens.get_position() == position {
                break;
            }

            let Some(separator) = shape.separator else {
                continue;
            };
            match self.tokens.peek() {
                Some(token) if token.id == separator => {
                    children.push(ParseTree::Terminal(self.expect(separator)?));
                }
                _ if shape.terminated => {
                    return Err(self.error(SyntaxErrorKind::MissingTerminator {
                        nonterminal: self.name(nonterminal),
                        terminator: self.terminal_name(separator),
                        last: self.tokens.last().cloned(),
                    }));
                }
                _ => break,
            }
        }

        if found < shape.minimum {
            return Err(self.error(SyntaxErrorKind::MissingListItems {
                nonterminal: self.name(nonterminal),
                required: shape.minimum,
                found,
                last: self.tokens.last().cloned(),
            }));
        }

        let kind = NodeKind::List {
            separator: shape.separator,
        };
        Ok(self.node(nonterminal, kind, children))
    }

    /// Consumes the next token, which must be `terminal`.
    fn expect(&mut self, terminal: TerminalId) -> Result<Terminal, SyntaxError> {
        let Some(current) = self.tokens.peek() else {
            return Err(self.error(SyntaxErrorKind::NoMoreTokens {
                nonterminal: self.name(self.nonterminal),
                expected: self.terminal_name(terminal),
                last: self.tokens.last().cloned(),
            }));
        };
        if current.id != terminal {
            return Err(self.unexpected_symbol(current, vec![terminal]));
        }

        self.tokens.next();
        if let Some(next) = self.tokens.peek() {
            if !self.grammar.is_valid_terminal(next.id) {
                return Err(self.invalid_terminal(next));
            }
        }
        Ok(current.clone())
    }

    fn node(&self, nonterminal: NonterminalId, kind: NodeKind, children: Vec<ParseTree>) -> ParseTree {
        ParseTree::Node(Node {
            nonterminal: self.grammar.nonterminal_ref(nonterminal),
            kind,
            children,
        })
    }

    fn name(&self, nonterminal: NonterminalId) -> Arc<str> {
        self.grammar.nonterminal(nonterminal).name.clone()
    }
    fn terminal_name(&self, terminal: TerminalId) -> Arc<str> {
        match self.grammar.terminal_name(terminal) {
            Some(name) => name.clone(),
            None => format!("#{}", terminal.as_u32()).into(),
        }
    }

    fn error(&self, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError::new(kind, self.formatter)
    }

    fn unexpected_eof(&self, nonterminal: NonterminalId) -> SyntaxError {
        let expected = self.grammar.terminal_names(&self.grammar.first(nonterminal));
        let rules = self
            .grammar
            .productions(nonterminal)
            .into_iter()
            .map(str::to_owned)
            .collect();
        self.error(SyntaxErrorKind::UnexpectedEof {
            nonterminal: self.name(nonterminal),
            expected,
            rules,
        })
    }

    fn unexpected_symbol(&self, actual: &Terminal, expected: Vec<TerminalId>) -> SyntaxError {
        self.error(SyntaxErrorKind::UnexpectedSymbol {
            nonterminal: self.name(self.nonterminal),
            actual: actual.clone(),
            expected: self.grammar.terminal_names(&expected),
            rule: self.rule.map(|rule| self.grammar.rule(rule).text.clone()),
        })
    }

    fn invalid_terminal(&self, invalid: &Terminal) -> SyntaxError {
        self.error(SyntaxErrorKind::InvalidTerminal {
            nonterminal: self.name(self.nonterminal),
            invalid: invalid.clone(),
        })
    }
}
