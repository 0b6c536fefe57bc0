//! Mode-stack regex lexer.
//!
//! Every mode holds an ordered list of patterns. At each position the first
//! pattern of the current mode that matches a non-empty prefix wins, its
//! actions run in order and the cursor moves past the match.

use std::sync::Arc;

use cranelift_entity::{entity_impl, EntityRef, PrimaryMap};
use regex::Regex;

use crate::{
    error::{GrammarError, LexError},
    grammar::{Grammar, TerminalId},
    token::{Span, Terminal},
};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ModeId(u32);
entity_impl! { ModeId }

pub type Rewrite = fn(&str) -> String;
pub type Hook<C> = fn(&mut LexCx<'_, C>, &PatternMatch<'_>) -> Result<(), LexError>;

pub enum Action<C> {
    /// Emit the whole match, or only capture group `group`. A group that did
    /// not participate in the match emits nothing.
    Emit {
        terminal: TerminalId,
        group: Option<usize>,
        rewrite: Option<Rewrite>,
    },
    Push(ModeId),
    Pop,
    Hook(Hook<C>),
}

enum Matcher<R> {
    Regex(R),
    /// Everything up to the first match of the stop pattern.
    Until(R),
}

enum Guard<R> {
    FollowedBy(R),
    NotFollowedBy(R),
}

/// An uncompiled lexer rule, see [`LexerBuilder::pattern`].
pub struct Pattern<C> {
    matcher: Matcher<String>,
    guard: Option<Guard<String>>,
    actions: Vec<Action<C>>,
}

impl<C> Pattern<C> {
    pub fn new(regex: &str) -> Pattern<C> {
        Pattern {
            matcher: Matcher::Regex(regex.to_owned()),
            guard: None,
            actions: Vec::new(),
        }
    }
    pub fn until(stop: &str) -> Pattern<C> {
        Pattern {
            matcher: Matcher::Until(stop.to_owned()),
            guard: None,
            actions: Vec::new(),
        }
    }
    pub fn followed_by(mut self, regex: &str) -> Self {
        self.guard = Some(Guard::FollowedBy(regex.to_owned()));
        self
    }
    pub fn not_followed_by(mut self, regex: &str) -> Self {
        self.guard = Some(Guard::NotFollowedBy(regex.to_owned()));
        self
    }
    fn action(mut self, action: Action<C>) -> Self {
        self.actions.push(action);
        self
    }
    pub fn emit(self, terminal: impl Into<TerminalId>) -> Self {
        self.action(Action::Emit {
            terminal: terminal.into(),
            group: None,
            rewrite: None,
        })
    }
    pub fn emit_group(self, terminal: impl Into<TerminalId>, group: usize) -> Self {
        self.action(Action::Emit {
            terminal: terminal.into(),
            group: Some(group),
            rewrite: None,
        })
    }
    pub fn emit_with(self, terminal: impl Into<TerminalId>, rewrite: Rewrite) -> Self {
        self.action(Action::Emit {
            terminal: terminal.into(),
            group: None,
            rewrite: Some(rewrite),
        })
    }
    pub fn push(self, mode: ModeId) -> Self {
        self.action(Action::Push(mode))
    }
    pub fn pop(self) -> Self {
        self.action(Action::Pop)
    }
    pub fn hook(self, hook: Hook<C>) -> Self {
        self.action(Action::Hook(hook))
    }

    fn compile(
        self,
        mode: &Arc<str>,
        mode_count: usize,
        terminal_count: usize,
    ) -> Result<CompiledPattern<C>, GrammarError> {
        for action in &self.actions {
            match action {
                Action::Emit { terminal, .. } if terminal.index() >= terminal_count => {
                    return Err(GrammarError::UnknownTerminal(terminal.as_u32()));
                }
                Action::Push(target) if target.index() >= mode_count => {
                    return Err(GrammarError::UnknownMode(target.as_u32()));
                }
                _ => {}
            }
        }

        let (source, matcher) = match self.matcher {
            Matcher::Regex(source) => {
                let regex = compile_regex(mode, &source, true)?;
                (source, Matcher::Regex(regex))
            }
            Matcher::Until(source) => {
                let regex = compile_regex(mode, &source, false)?;
                (source, Matcher::Until(regex))
            }
        };
        let guard = match self.guard {
            Some(Guard::FollowedBy(s)) => Some(Guard::FollowedBy(compile_regex(mode, &s, true)?)),
            Some(Guard::NotFollowedBy(s)) => {
                Some(Guard::NotFollowedBy(compile_regex(mode, &s, true)?))
            }
            None => None,
        };

        Ok(CompiledPattern {
            source,
            matcher,
            guard,
            actions: self.actions,
        })
    }
}

fn compile_regex(mode: &Arc<str>, pattern: &str, anchored: bool) -> Result<Regex, GrammarError> {
    let result = match anchored {
        true => Regex::new(&format!(r"\A(?:{pattern})")),
        false => Regex::new(pattern),
    };
    result.map_err(|source| GrammarError::InvalidPattern {
        mode: mode.clone(),
        pattern: pattern.to_owned(),
        source,
    })
}

struct CompiledPattern<C> {
    source: String,
    matcher: Matcher<Regex>,
    guard: Option<Guard<Regex>>,
    actions: Vec<Action<C>>,
}

impl<C> CompiledPattern<C> {
    fn match_at<'s>(&self, rest: &'s str, start: usize) -> Option<PatternMatch<'s>> {
        let (len, groups) = match &self.matcher {
            Matcher::Regex(regex) => {
                let captures = regex.captures(rest)?;
                let len = captures.get(0)?.end();
                let groups = captures
                    .iter()
                    .map(|group| group.map(|g| (g.start(), g.end())))
                    .collect();
                (len, groups)
            }
            Matcher::Until(stop) => {
                let len = stop.find(rest)?.start();
                (len, vec![Some((0, len))])
            }
        };

        if len == 0 {
            return None;
        }

        let after = &rest[len..];
        let accepted = match &self.guard {
            Some(Guard::FollowedBy(regex)) => regex.is_match(after),
            Some(Guard::NotFollowedBy(regex)) => !regex.is_match(after),
            None => true,
        };
        if !accepted {
            return None;
        }

        Some(PatternMatch {
            text: &rest[..len],
            start,
            groups,
        })
    }
}

/// The text matched by a pattern together with its capture groups.
pub struct PatternMatch<'s> {
    text: &'s str,
    start: usize,
    groups: Vec<Option<(usize, usize)>>,
}

impl<'s> PatternMatch<'s> {
    pub fn as_str(&self) -> &'s str {
        self.text
    }
    /// Byte offset of the match in the source.
    pub fn start(&self) -> usize {
        self.start
    }
    pub fn len(&self) -> usize {
        self.text.len()
    }
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
    pub fn group(&self, index: usize) -> Option<&'s str> {
        let (start, end) = self.group_range(index)?;
        Some(&self.text[start..end])
    }
    fn group_range(&self, index: usize) -> Option<(usize, usize)> {
        self.groups.get(index).copied().flatten()
    }
}

/// Lexer state visible to hooks.
pub struct LexCx<'a, C> {
    def: &'a LexerDef<C>,
    source: &'a str,
    resource: Arc<str>,
    offset: usize,
    line: u32,
    col: u32,
    modes: Vec<ModeId>,
    tokens: Vec<Terminal>,
    pub user: C,
}

fn advance_position(mut line: u32, mut col: u32, text: &str) -> (u32, u32) {
    for ch in text.chars() {
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

impl<'a, C> LexCx<'a, C> {
    pub fn mode(&self) -> Option<ModeId> {
        self.modes.last().copied()
    }
    pub fn push_mode(&mut self, mode: ModeId) {
        log::trace!(
            "{}:{}:{}: push mode {}",
            self.resource,
            self.line,
            self.col,
            self.def.mode_name(mode).map_or("?", |n| n.as_ref())
        );
        self.modes.push(mode);
    }
    pub fn pop_mode(&mut self) -> Result<ModeId, LexError> {
        let Some(mode) = self.modes.pop() else {
            return Err(self.empty_stack());
        };
        log::trace!("{}:{}:{}: pop mode", self.resource, self.line, self.col);
        Ok(mode)
    }

    pub fn line(&self) -> u32 {
        self.line
    }
    pub fn col(&self) -> u32 {
        self.col
    }
    pub fn resource(&self) -> &Arc<str> {
        &self.resource
    }
    /// Tokens emitted so far.
    pub fn tokens(&self) -> &[Terminal] {
        &self.tokens
    }

    pub fn emit(
        &mut self,
        terminal: impl Into<TerminalId>,
        matched: &PatternMatch<'_>,
        group: Option<usize>,
    ) -> Result<(), LexError> {
        self.emit_rewritten(terminal.into(), matched, group, None)
    }

    fn emit_rewritten(
        &mut self,
        terminal: TerminalId,
        matched: &PatternMatch<'_>,
        group: Option<usize>,
        rewrite: Option<Rewrite>,
    ) -> Result<(), LexError> {
        let Some(kind) = self.def.terminals.get(terminal).cloned() else {
            return Err(LexError::InvalidTerminal {
                resource: self.resource.clone(),
                line: self.line,
                col: self.col,
                id: terminal.as_u32(),
            });
        };
        let (start, end) = match group {
            None => (0, matched.len()),
            Some(index) => match matched.group_range(index) {
                Some(range) => range,
                None => return Ok(()),
            },
        };

        let raw = &matched.text[start..end];
        let text = match rewrite {
            Some(rewrite) => rewrite(raw),
            None => raw.to_owned(),
        };
        let (line, col) = advance_position(self.line, self.col, &matched.text[..start]);
        let span = Span::new(matched.start + start, matched.start + end);

        let token = Terminal::new(terminal, kind, text, self.resource.clone(), line, col)
            .with_span(span);
        log::trace!("emit {token}");
        self.tokens.push(token);
        Ok(())
    }

    fn advance(&mut self, len: usize) {
        let text = &self.source[self.offset..self.offset + len];
        (self.line, self.col) = advance_position(self.line, self.col, text);
        self.offset += len;
    }

    fn empty_stack(&self) -> LexError {
        LexError::EmptyModeStack {
            resource: self.resource.clone(),
            line: self.line,
            col: self.col,
        }
    }

    fn unrecognized(&self) -> LexError {
        let line_start = self.source[..self.offset].rfind('\n').map_or(0, |i| i + 1);
        let line_end = self.source[self.offset..]
            .find('\n')
            .map_or(self.source.len(), |i| self.offset + i);
        let source_line = self.source[line_start..line_end].trim_end_matches('\r');

        LexError::UnrecognizedToken {
            resource: self.resource.clone(),
            line: self.line,
            col: self.col,
            source_line: source_line.to_owned(),
        }
    }
}

struct Mode<C> {
    name: Arc<str>,
    patterns: Vec<CompiledPattern<C>>,
}

/// A compiled lexer, `C` is the user state threaded through hooks.
pub struct LexerDef<C> {
    terminals: PrimaryMap<TerminalId, Arc<str>>,
    modes: PrimaryMap<ModeId, Mode<C>>,
    default: ModeId,
}

impl<C> LexerDef<C> {
    pub fn default_mode(&self) -> ModeId {
        self.default
    }
    pub fn mode_name(&self, mode: ModeId) -> Option<&Arc<str>> {
        self.modes.get(mode).map(|m| &m.name)
    }

    pub fn lex(&self, source: &str, resource: &str, user: C) -> Result<Vec<Terminal>, LexError> {
        let mut cx = LexCx {
            def: self,
            source,
            resource: resource.into(),
            offset: 0,
            line: 1,
            col: 1,
            modes: vec![self.default],
            tokens: Vec::new(),
            user,
        };

        while cx.offset < source.len() {
            let Some(mode_id) = cx.mode() else {
                return Err(cx.empty_stack());
            };
            let Some(mode) = self.modes.get(mode_id) else {
                return Err(LexError::UnknownMode {
                    resource: cx.resource.clone(),
                    line: cx.line,
                    col: cx.col,
                    id: mode_id.as_u32(),
                });
            };

            let rest = &source[cx.offset..];
            let found = mode
                .patterns
                .iter()
                .find_map(|pattern| Some((pattern, pattern.match_at(rest, cx.offset)?)));
            let Some((pattern, matched)) = found else {
                return Err(cx.unrecognized());
            };

            log::trace!(
                "{}:{}:{}: {} matched {:?}",
                cx.resource,
                cx.line,
                cx.col,
                pattern.source,
                matched.text
            );

            for action in &pattern.actions {
                match action {
                    Action::Emit {
                        terminal,
                        group,
                        rewrite,
                    } => cx.emit_rewritten(*terminal, &matched, *group, *rewrite)?,
                    Action::Push(mode) => cx.push_mode(*mode),
                    Action::Pop => {
                        cx.pop_mode()?;
                    }
                    Action::Hook(hook) => hook(&mut cx, &matched)?,
                }
            }

            cx.advance(matched.len());
        }

        log::debug!("{}: lexed {} tokens", cx.resource, cx.tokens.len());
        Ok(cx.tokens)
    }
}

pub struct LexerBuilder<C> {
    terminals: PrimaryMap<TerminalId, Arc<str>>,
    modes: Vec<(Arc<str>, Vec<Pattern<C>>)>,
    errors: Vec<GrammarError>,
}

impl<C> LexerBuilder<C> {
    /// Lexer emitting the terminals of `grammar`.
    pub fn new(grammar: &Grammar) -> LexerBuilder<C> {
        LexerBuilder {
            terminals: grammar.terminals.clone(),
            modes: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Declares a mode, the first one declared is where lexing starts.
    pub fn mode(&mut self, name: &str) -> ModeId {
        self.modes.push((name.into(), Vec::new()));
        ModeId::new(self.modes.len() - 1)
    }

    pub fn pattern(&mut self, mode: ModeId, pattern: Pattern<C>) {
        match self.modes.get_mut(mode.index()) {
            Some((_, patterns)) => patterns.push(pattern),
            None => self.errors.push(GrammarError::UnknownMode(mode.as_u32())),
        }
    }

    pub fn patterns(&mut self, mode: ModeId, patterns: impl IntoIterator<Item = Pattern<C>>) {
        for pattern in patterns {
            self.pattern(mode, pattern);
        }
    }

    pub fn build(mut self) -> Result<LexerDef<C>, GrammarError> {
        if !self.errors.is_empty() {
            return Err(self.errors.swap_remove(0));
        }
        if self.modes.is_empty() {
            return Err(GrammarError::NoModes);
        }

        let mode_count = self.modes.len();
        let terminal_count = self.terminals.len();
        let mut modes = PrimaryMap::with_capacity(mode_count);
        for (name, patterns) in self.modes {
            let patterns = patterns
                .into_iter()
                .map(|pattern| pattern.compile(&name, mode_count, terminal_count))
                .collect::<Result<Vec<_>, _>>()?;
            modes.push(Mode { name, patterns });
        }

        Ok(LexerDef {
            terminals: self.terminals,
            modes,
            default: ModeId::new(0),
        })
    }
}
