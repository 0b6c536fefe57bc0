//! Compiled grammar description consumed by the lexer and parser.
//!
//! A [`Grammar`] is produced once by [`GrammarBuilder`] and is immutable
//! afterwards, so a single instance can be shared by any number of
//! concurrent parses.

mod build;
mod table;

use std::{fmt::Display, sync::Arc};

use cranelift_entity::{entity_impl, EntityRef, EntitySet, PrimaryMap, SecondaryMap};

pub use build::GrammarBuilder;
pub(crate) use table::{InsertError, PredictiveTable};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TerminalId(u32);
entity_impl! { TerminalId }

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NonterminalId(u32);
entity_impl! { NonterminalId }

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RuleId(u32);
entity_impl! { RuleId }

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Symbol {
    Terminal(TerminalId),
    Nonterminal(NonterminalId),
}

impl From<TerminalId> for Symbol {
    fn from(value: TerminalId) -> Self {
        Symbol::Terminal(value)
    }
}

impl From<NonterminalId> for Symbol {
    fn from(value: NonterminalId) -> Self {
        Symbol::Nonterminal(value)
    }
}

/// How a parse tree node turns into an AST value.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum AstTransform {
    /// Use the AST of the child at this index.
    Substitution(usize),
    /// Build a named record, each field taken from the child at its index.
    NodeCreator {
        name: Arc<str>,
        fields: Arc<[(Arc<str>, usize)]>,
    },
}

impl AstTransform {
    pub fn node(name: &str, fields: &[(&str, usize)]) -> AstTransform {
        AstTransform::NodeCreator {
            name: name.into(),
            fields: fields
                .iter()
                .map(|&(field, index)| (Arc::from(field), index))
                .collect(),
        }
    }
}

impl Display for AstTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AstTransform::Substitution(index) => write!(f, "${index}"),
            AstTransform::NodeCreator { name, fields } => {
                write!(f, "{name}(")?;
                for (i, (field, index)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}=${index}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Associativity {
    Left,
    Right,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RuleForm {
    Production,
    /// Null denotation, `operator` is set for prefix operators whose operand
    /// binds at the operator's prefix binding power. A `compound` nud is the
    /// head of a mixfix form, the led that follows it addresses the nud's
    /// morphemes as its own leading positions.
    Nud { operator: bool, compound: bool },
    /// Left denotation, the left operand is not part of `morphemes`.
    Led { binary: Option<Associativity> },
}

#[derive(Clone, Debug)]
pub struct Rule {
    pub lhs: NonterminalId,
    pub morphemes: Vec<Symbol>,
    pub transform: Option<AstTransform>,
    pub form: RuleForm,
    /// Human readable production, used in error messages.
    pub text: String,
}

/// Shape of a list nonterminal.
///
/// When `terminated` is set, `separator` must follow every item rather than
/// only sit between them.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ListShape {
    pub separator: Option<TerminalId>,
    pub minimum: u32,
    pub terminated: bool,
}

impl ListShape {
    pub fn new() -> ListShape {
        ListShape::default()
    }
    pub fn separated(separator: impl Into<TerminalId>) -> ListShape {
        ListShape {
            separator: Some(separator.into()),
            ..ListShape::default()
        }
    }
    pub fn terminated(terminator: impl Into<TerminalId>) -> ListShape {
        ListShape {
            separator: Some(terminator.into()),
            terminated: true,
            ..ListShape::default()
        }
    }
    pub fn minimum(mut self, minimum: u32) -> ListShape {
        self.minimum = minimum;
        self
    }
}

/// Operator tables of an expression nonterminal, all keyed by the
/// triggering terminal. A missing binding power is 0.
pub struct ExprGrammar {
    pub(crate) nud: SecondaryMap<TerminalId, Option<RuleId>>,
    pub(crate) led: SecondaryMap<TerminalId, Option<RuleId>>,
    pub(crate) infix_bp: SecondaryMap<TerminalId, u32>,
    pub(crate) prefix_bp: SecondaryMap<TerminalId, u32>,
}

impl ExprGrammar {
    pub fn new() -> ExprGrammar {
        ExprGrammar {
            nud: SecondaryMap::new(),
            led: SecondaryMap::new(),
            infix_bp: SecondaryMap::new(),
            prefix_bp: SecondaryMap::new(),
        }
    }
    pub fn nud(&self, terminal: TerminalId) -> Option<RuleId> {
        self.nud[terminal]
    }
    pub fn led(&self, terminal: TerminalId) -> Option<RuleId> {
        self.led[terminal]
    }
    pub fn infix_binding_power(&self, terminal: TerminalId) -> u32 {
        self.infix_bp[terminal]
    }
    pub fn prefix_binding_power(&self, terminal: TerminalId) -> u32 {
        self.prefix_bp[terminal]
    }
}

pub enum NonterminalShape {
    Plain {
        rules: Vec<RuleId>,
        /// The production chosen when the nonterminal derives nothing.
        epsilon: Option<RuleId>,
    },
    Optional(Symbol),
    List {
        item: Symbol,
        shape: ListShape,
    },
    Expression(ExprGrammar),
}

pub struct NonterminalInfo {
    pub name: Arc<str>,
    pub shape: NonterminalShape,
    pub nullable: bool,
    pub(crate) first: EntitySet<TerminalId>,
    pub(crate) follow: EntitySet<TerminalId>,
}

/// Nonterminal identity as recorded in parse tree nodes.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NonterminalRef {
    pub id: NonterminalId,
    pub name: Arc<str>,
}

pub struct Grammar {
    pub(crate) terminals: PrimaryMap<TerminalId, Arc<str>>,
    pub(crate) nonterminals: PrimaryMap<NonterminalId, NonterminalInfo>,
    pub(crate) rules: PrimaryMap<RuleId, Rule>,
    pub(crate) table: PredictiveTable,
    pub(crate) start: NonterminalId,
}

impl Grammar {
    pub fn start(&self) -> NonterminalId {
        self.start
    }

    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }
    pub fn terminals(&self) -> impl Iterator<Item = (TerminalId, &Arc<str>)> + '_ {
        self.terminals.iter()
    }
    pub fn terminal_name(&self, terminal: TerminalId) -> Option<&Arc<str>> {
        self.terminals.get(terminal)
    }
    pub fn is_valid_terminal(&self, terminal: TerminalId) -> bool {
        terminal.index() < self.terminals.len()
    }
    pub fn find_terminal(&self, name: &str) -> Option<TerminalId> {
        self.terminals
            .iter()
            .find(|(_, n)| n.as_ref() == name)
            .map(|(id, _)| id)
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = (NonterminalId, &NonterminalInfo)> + '_ {
        self.nonterminals.iter()
    }
    pub fn nonterminal(&self, nonterminal: NonterminalId) -> &NonterminalInfo {
        &self.nonterminals[nonterminal]
    }
    pub fn nonterminal_ref(&self, nonterminal: NonterminalId) -> NonterminalRef {
        NonterminalRef {
            id: nonterminal,
            name: self.nonterminals[nonterminal].name.clone(),
        }
    }
    pub fn find_nonterminal(&self, name: &str) -> Option<NonterminalId> {
        self.nonterminals
            .iter()
            .find(|(_, info)| info.name.as_ref() == name)
            .map(|(id, _)| id)
    }

    pub fn rule(&self, rule: RuleId) -> &Rule {
        &self.rules[rule]
    }
    pub fn rules(&self) -> impl Iterator<Item = (RuleId, &Rule)> + '_ {
        self.rules.iter()
    }
    /// The table entry for `nonterminal` on `terminal`, terminals the grammar
    /// does not know have no entry.
    pub fn rule_for(&self, nonterminal: NonterminalId, terminal: TerminalId) -> Option<RuleId> {
        self.table.get(nonterminal, terminal)
    }

    pub fn expression(&self, nonterminal: NonterminalId) -> Option<&ExprGrammar> {
        match &self.nonterminals[nonterminal].shape {
            NonterminalShape::Expression(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn in_first(&self, nonterminal: NonterminalId, terminal: TerminalId) -> bool {
        self.is_valid_terminal(terminal) && self.nonterminals[nonterminal].first.contains(terminal)
    }
    pub fn in_follow(&self, nonterminal: NonterminalId, terminal: TerminalId) -> bool {
        self.is_valid_terminal(terminal) && self.nonterminals[nonterminal].follow.contains(terminal)
    }
    pub fn symbol_starts_with(&self, symbol: Symbol, terminal: TerminalId) -> bool {
        match symbol {
            Symbol::Terminal(t) => t == terminal,
            Symbol::Nonterminal(n) => self.in_first(n, terminal),
        }
    }

    pub fn first(&self, nonterminal: NonterminalId) -> Vec<TerminalId> {
        self.collect_set(&self.nonterminals[nonterminal].first)
    }
    pub fn follow(&self, nonterminal: NonterminalId) -> Vec<TerminalId> {
        self.collect_set(&self.nonterminals[nonterminal].follow)
    }
    fn collect_set(&self, set: &EntitySet<TerminalId>) -> Vec<TerminalId> {
        self.terminals
            .keys()
            .filter(|&terminal| set.contains(terminal))
            .collect()
    }

    pub(crate) fn terminal_names(&self, terminals: &[TerminalId]) -> Vec<Arc<str>> {
        terminals
            .iter()
            .filter_map(|&t| self.terminals.get(t).cloned())
            .collect()
    }

    /// Text of every production of `nonterminal`.
    pub fn productions(&self, nonterminal: NonterminalId) -> Vec<&str> {
        self.rules
            .values()
            .filter(|rule| rule.lhs == nonterminal)
            .map(|rule| rule.text.as_str())
            .collect()
    }
}
