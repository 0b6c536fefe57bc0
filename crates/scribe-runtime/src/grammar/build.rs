use std::{fmt::Write, sync::Arc};

use cranelift_entity::{EntityRef, EntitySet, PrimaryMap};

use super::{
    Associativity, AstTransform, ExprGrammar, Grammar, InsertError, ListShape, NonterminalId,
    NonterminalInfo, NonterminalShape, PredictiveTable, Rule, RuleForm, RuleId, Symbol,
    TerminalId,
};
use crate::error::GrammarError;

struct Pending {
    name: Arc<str>,
    shape: Option<NonterminalShape>,
}

/// Declarative construction of a [`Grammar`].
///
/// Definitions are recorded as they come and checked all at once by
/// [`GrammarBuilder::build`], which also derives the nullable, FIRST and
/// FOLLOW sets and the prediction table.
pub struct GrammarBuilder {
    terminals: PrimaryMap<TerminalId, Arc<str>>,
    nonterminals: PrimaryMap<NonterminalId, Pending>,
    rules: PrimaryMap<RuleId, Rule>,
    start: Option<NonterminalId>,
    generated: u32,
    errors: Vec<GrammarError>,
}

impl GrammarBuilder {
    pub fn new() -> GrammarBuilder {
        GrammarBuilder {
            terminals: PrimaryMap::new(),
            nonterminals: PrimaryMap::new(),
            rules: PrimaryMap::new(),
            start: None,
            generated: 0,
            errors: Vec::new(),
        }
    }

    pub fn terminal(&mut self, name: &str) -> TerminalId {
        self.terminals.push(name.into())
    }

    /// Declares a nonterminal, the first one declared is the start symbol
    /// unless [`GrammarBuilder::start`] says otherwise.
    pub fn nonterminal(&mut self, name: &str) -> NonterminalId {
        self.nonterminals.push(Pending {
            name: name.into(),
            shape: None,
        })
    }

    pub fn start(&mut self, nonterminal: NonterminalId) {
        self.start = Some(nonterminal);
    }

    fn generated_nonterminal(&mut self) -> NonterminalId {
        let name = format!("_gen{}", self.generated);
        self.generated += 1;
        self.nonterminal(&name)
    }

    fn define(&mut self, nonterminal: NonterminalId, shape: NonterminalShape) {
        let Some(pending) = self.nonterminals.get_mut(nonterminal) else {
            self.errors
                .push(GrammarError::UnknownNonterminal(nonterminal.as_u32()));
            return;
        };
        if pending.shape.is_some() {
            self.errors
                .push(GrammarError::Redefined(pending.name.clone()));
            return;
        }
        pending.shape = Some(shape);
    }

    fn push_rule(
        &mut self,
        lhs: NonterminalId,
        morphemes: &[Symbol],
        transform: Option<AstTransform>,
        form: RuleForm,
    ) -> RuleId {
        self.rules.push(Rule {
            lhs,
            morphemes: morphemes.to_vec(),
            transform,
            form,
            text: String::new(),
        })
    }

    /// Adds a production to a plain nonterminal, without a transform the
    /// node substitutes its first child.
    pub fn rule(
        &mut self,
        nonterminal: NonterminalId,
        morphemes: &[Symbol],
        transform: Option<AstTransform>,
    ) -> RuleId {
        let rule = self.push_rule(nonterminal, morphemes, transform, RuleForm::Production);
        let Some(pending) = self.nonterminals.get_mut(nonterminal) else {
            self.errors
                .push(GrammarError::UnknownNonterminal(nonterminal.as_u32()));
            return rule;
        };
        if pending.shape.is_none() {
            pending.shape = Some(NonterminalShape::Plain {
                rules: vec![rule],
                epsilon: None,
            });
        } else if let Some(NonterminalShape::Plain { rules, .. }) = &mut pending.shape {
            rules.push(rule);
        } else {
            let name = pending.name.clone();
            self.errors.push(GrammarError::Redefined(name));
        }
        rule
    }

    pub fn optional(&mut self, nonterminal: NonterminalId, inner: Symbol) {
        self.define(nonterminal, NonterminalShape::Optional(inner));
    }

    pub fn list(&mut self, nonterminal: NonterminalId, item: Symbol, shape: ListShape) {
        self.define(nonterminal, NonterminalShape::List { item, shape });
    }

    /// Anonymous `optional(inner)` nonterminal.
    pub fn optional_of(&mut self, inner: Symbol) -> NonterminalId {
        let nonterminal = self.generated_nonterminal();
        self.optional(nonterminal, inner);
        nonterminal
    }

    /// Anonymous `list(item)` nonterminal.
    pub fn list_of(&mut self, item: Symbol, shape: ListShape) -> NonterminalId {
        let nonterminal = self.generated_nonterminal();
        self.list(nonterminal, item, shape);
        nonterminal
    }

    pub fn expression(&mut self, nonterminal: NonterminalId) {
        self.define(nonterminal, NonterminalShape::Expression(ExprGrammar::new()));
    }

    fn expr_mut(&mut self, nonterminal: NonterminalId) -> Option<&mut ExprGrammar> {
        match self.nonterminals.get_mut(nonterminal) {
            Some(Pending {
                shape: Some(NonterminalShape::Expression(expr)),
                ..
            }) => Some(expr),
            Some(Pending { name, .. }) => {
                let name = name.clone();
                self.errors.push(GrammarError::NotExpression(name));
                None
            }
            None => {
                self.errors
                    .push(GrammarError::UnknownNonterminal(nonterminal.as_u32()));
                None
            }
        }
    }

    fn register(
        &mut self,
        nonterminal: NonterminalId,
        morphemes: &[Symbol],
        transform: AstTransform,
        form: RuleForm,
        binding_power: u32,
    ) -> RuleId {
        let rule = self.push_rule(nonterminal, morphemes, Some(transform), form);
        let position = match form {
            RuleForm::Led { .. } => "led",
            _ => "nud",
        };

        let Some(name) = self.nonterminals.get(nonterminal).map(|p| p.name.clone()) else {
            self.errors
                .push(GrammarError::UnknownNonterminal(nonterminal.as_u32()));
            return rule;
        };
        let Some(&Symbol::Terminal(trigger)) = morphemes.first() else {
            self.errors.push(GrammarError::MissingTrigger {
                nonterminal: name,
                position,
            });
            return rule;
        };
        let terminal = match self.terminals.get(trigger) {
            Some(name) => name.clone(),
            None => {
                self.errors
                    .push(GrammarError::UnknownTerminal(trigger.as_u32()));
                return rule;
            }
        };
        let Some(expr) = self.expr_mut(nonterminal) else {
            return rule;
        };

        let (table, powers) = match form {
            RuleForm::Led { .. } => (&mut expr.led, &mut expr.infix_bp),
            _ => (&mut expr.nud, &mut expr.prefix_bp),
        };
        if table[trigger].is_some() {
            self.errors.push(GrammarError::DuplicateTrigger {
                nonterminal: name,
                terminal,
                position,
            });
            return rule;
        }
        table[trigger] = Some(rule);
        if binding_power > 0 {
            powers[trigger] = binding_power;
        }
        rule
    }

    /// Operand form of an expression, its `$e` morphemes bind at power 0.
    pub fn nud(
        &mut self,
        nonterminal: NonterminalId,
        morphemes: &[Symbol],
        transform: AstTransform,
    ) -> RuleId {
        let form = RuleForm::Nud {
            operator: false,
            compound: false,
        };
        self.register(nonterminal, morphemes, transform, form, 0)
    }

    /// Head of a mixfix form such as `identifier <=> ( args )`, a led
    /// continuing it counts the nud's morphemes before its own.
    pub fn compound_nud(
        &mut self,
        nonterminal: NonterminalId,
        morphemes: &[Symbol],
        transform: AstTransform,
    ) -> RuleId {
        let form = RuleForm::Nud {
            operator: false,
            compound: true,
        };
        self.register(nonterminal, morphemes, transform, form, 0)
    }

    /// Prefix operator `operator $e`, the operand binds at `binding_power`.
    pub fn unary(
        &mut self,
        nonterminal: NonterminalId,
        binding_power: u32,
        operator: impl Into<TerminalId>,
        transform: AstTransform,
    ) -> RuleId {
        let morphemes = [Symbol::Terminal(operator.into()), nonterminal.into()];
        let form = RuleForm::Nud {
            operator: true,
            compound: false,
        };
        self.register(nonterminal, &morphemes, transform, form, binding_power)
    }

    /// Infix operator `$e operator $e`.
    pub fn binary(
        &mut self,
        nonterminal: NonterminalId,
        binding_power: u32,
        operator: impl Into<TerminalId>,
        associativity: Associativity,
        transform: AstTransform,
    ) -> RuleId {
        let morphemes = [Symbol::Terminal(operator.into()), nonterminal.into()];
        let form = RuleForm::Led {
            binary: Some(associativity),
        };
        self.register(nonterminal, &morphemes, transform, form, binding_power)
    }

    /// Mixfix continuation `$e morphemes...`, the left operand is implicit.
    pub fn led(
        &mut self,
        nonterminal: NonterminalId,
        binding_power: u32,
        morphemes: &[Symbol],
        transform: AstTransform,
    ) -> RuleId {
        let form = RuleForm::Led { binary: None };
        self.register(nonterminal, morphemes, transform, form, binding_power)
    }

    pub fn build(mut self) -> Result<Grammar, GrammarError> {
        if !self.errors.is_empty() {
            return Err(self.errors.swap_remove(0));
        }
        if self.nonterminals.is_empty() {
            return Err(GrammarError::Empty);
        }
        let start = self.start.unwrap_or(NonterminalId::new(0));
        if self.nonterminals.get(start).is_none() {
            return Err(GrammarError::UnknownNonterminal(start.as_u32()));
        }

        let mut nonterminals = PrimaryMap::with_capacity(self.nonterminals.len());
        for pending in self.nonterminals.values_mut() {
            let Some(shape) = pending.shape.take() else {
                return Err(GrammarError::Undefined(pending.name.clone()));
            };
            nonterminals.push(NonterminalInfo {
                name: pending.name.clone(),
                shape,
                nullable: false,
                first: EntitySet::new(),
                follow: EntitySet::new(),
            });
        }

        let mut grammar = Grammar {
            table: PredictiveTable::new(nonterminals.len(), self.terminals.len()),
            terminals: self.terminals,
            nonterminals,
            rules: self.rules,
            start,
        };

        validate_symbols(&grammar)?;
        render_rules(&mut grammar);
        compute_nullable(&mut grammar);
        compute_first(&mut grammar);
        compute_follow(&mut grammar);
        fill_table(&mut grammar)?;

        log::debug!(
            "built grammar with {} terminals, {} nonterminals and {} rules",
            grammar.terminals.len(),
            grammar.nonterminals.len(),
            grammar.rules.len()
        );

        Ok(grammar)
    }
}

fn validate_symbols(grammar: &Grammar) -> Result<(), GrammarError> {
    let check = |symbol: Symbol| match symbol {
        Symbol::Terminal(t) if !grammar.is_valid_terminal(t) => {
            Err(GrammarError::UnknownTerminal(t.as_u32()))
        }
        Symbol::Nonterminal(n) if n.index() >= grammar.nonterminals.len() => {
            Err(GrammarError::UnknownNonterminal(n.as_u32()))
        }
        _ => Ok(()),
    };

    for rule in grammar.rules.values() {
        for &symbol in &rule.morphemes {
            check(symbol)?;
        }
    }
    for info in grammar.nonterminals.values() {
        match &info.shape {
            NonterminalShape::Optional(inner) => check(*inner)?,
            NonterminalShape::List { item, shape } => {
                check(*item)?;
                if let Some(separator) = shape.separator {
                    check(Symbol::Terminal(separator))?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn render_rules(grammar: &mut Grammar) {
    let mut texts = Vec::with_capacity(grammar.rules.len());
    for rule in grammar.rules.values() {
        let lhs = &grammar.nonterminals[rule.lhs].name;
        let mut text = format!("${lhs} =");
        if let RuleForm::Led { .. } = rule.form {
            let _ = write!(text, " ${lhs}");
        }
        for &symbol in &rule.morphemes {
            let _ = match symbol {
                Symbol::Terminal(t) => write!(text, " :{}", grammar.terminals[t]),
                Symbol::Nonterminal(n) => write!(text, " ${}", grammar.nonterminals[n].name),
            };
        }
        if rule.morphemes.is_empty() {
            text.push_str(" :_empty");
        }
        if let Some(transform) = &rule.transform {
            let _ = write!(text, " -> {transform}");
        }
        texts.push(text);
    }
    for (rule, text) in grammar.rules.values_mut().zip(texts) {
        rule.text = text;
    }
}

fn sequence_nullable(grammar: &Grammar, sequence: &[Symbol]) -> bool {
    sequence.iter().all(|symbol| match *symbol {
        Symbol::Terminal(_) => false,
        Symbol::Nonterminal(n) => grammar.nonterminals[n].nullable,
    })
}

fn shape_nullable(grammar: &Grammar, nonterminal: NonterminalId) -> bool {
    match &grammar.nonterminals[nonterminal].shape {
        NonterminalShape::Plain { rules, .. } => rules
            .iter()
            .any(|&r| sequence_nullable(grammar, &grammar.rules[r].morphemes)),
        NonterminalShape::Optional(_) => true,
        NonterminalShape::List { shape, .. } => shape.minimum == 0,
        NonterminalShape::Expression(_) => false,
    }
}

fn compute_nullable(grammar: &mut Grammar) {
    loop {
        let mut changed = false;
        for nonterminal in grammar.nonterminals.keys() {
            if grammar.nonterminals[nonterminal].nullable {
                continue;
            }
            if shape_nullable(grammar, nonterminal) {
                grammar.nonterminals[nonterminal].nullable = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}

/// FIRST of a symbol sequence, stops at the first non-nullable symbol.
fn sequence_first(grammar: &Grammar, sequence: &[Symbol], out: &mut Vec<TerminalId>) {
    for &symbol in sequence {
        match symbol {
            Symbol::Terminal(t) => {
                out.push(t);
                return;
            }
            Symbol::Nonterminal(n) => {
                let info = &grammar.nonterminals[n];
                out.extend(
                    grammar
                        .terminals
                        .keys()
                        .filter(|&t| info.first.contains(t)),
                );
                if !info.nullable {
                    return;
                }
            }
        }
    }
}

fn insert_all(set: &mut EntitySet<TerminalId>, terminals: &[TerminalId]) -> bool {
    let mut changed = false;
    for &terminal in terminals {
        if !set.contains(terminal) {
            set.insert(terminal);
            changed = true;
        }
    }
    changed
}

fn shape_first(grammar: &Grammar, nonterminal: NonterminalId, out: &mut Vec<TerminalId>) {
    match &grammar.nonterminals[nonterminal].shape {
        NonterminalShape::Plain { rules, .. } => {
            for &rule in rules {
                sequence_first(grammar, &grammar.rules[rule].morphemes, out);
            }
        }
        NonterminalShape::Optional(inner) => sequence_first(grammar, &[*inner], out),
        NonterminalShape::List { item, .. } => sequence_first(grammar, &[*item], out),
        NonterminalShape::Expression(expr) => {
            out.extend(grammar.terminals.keys().filter(|&t| expr.nud(t).is_some()));
        }
    }
}

fn compute_first(grammar: &mut Grammar) {
    let mut scratch = Vec::new();
    loop {
        let mut changed = false;
        for nonterminal in grammar.nonterminals.keys() {
            scratch.clear();
            shape_first(grammar, nonterminal, &mut scratch);
            changed |= insert_all(&mut grammar.nonterminals[nonterminal].first, &scratch);
        }
        if !changed {
            break;
        }
    }
}

/// A place where `target` is followed by `rest` inside a derivation of `owner`.
struct Occurrence {
    target: NonterminalId,
    owner: NonterminalId,
    rest: Vec<Symbol>,
}

fn occurrences(grammar: &Grammar) -> Vec<Occurrence> {
    let mut out = Vec::new();
    let mut add_sequence = |owner: NonterminalId, sequence: &[Symbol]| {
        for (i, symbol) in sequence.iter().enumerate() {
            if let Symbol::Nonterminal(target) = *symbol {
                out.push(Occurrence {
                    target,
                    owner,
                    rest: sequence[i + 1..].to_vec(),
                });
            }
        }
    };

    for rule in grammar.rules.values() {
        match rule.form {
            RuleForm::Production | RuleForm::Nud { .. } => add_sequence(rule.lhs, &rule.morphemes),
            RuleForm::Led { .. } => {
                let mut sequence = Vec::with_capacity(rule.morphemes.len() + 1);
                sequence.push(Symbol::Nonterminal(rule.lhs));
                sequence.extend_from_slice(&rule.morphemes);
                add_sequence(rule.lhs, &sequence);
            }
        }
    }
    for (owner, info) in grammar.nonterminals.iter() {
        match &info.shape {
            NonterminalShape::Optional(inner) => add_sequence(owner, &[*inner]),
            NonterminalShape::List { item, shape } => {
                // an item may be followed by another item or by the separator
                add_sequence(owner, &[*item]);
                add_sequence(owner, &[*item, *item]);
                if let Some(separator) = shape.separator {
                    add_sequence(owner, &[*item, Symbol::Terminal(separator)]);
                }
            }
            _ => {}
        }
    }
    out
}

fn compute_follow(grammar: &mut Grammar) {
    let occurrences = occurrences(grammar);
    let mut scratch = Vec::new();
    loop {
        let mut changed = false;
        for occurrence in &occurrences {
            scratch.clear();
            sequence_first(grammar, &occurrence.rest, &mut scratch);
            if sequence_nullable(grammar, &occurrence.rest) {
                let owner = &grammar.nonterminals[occurrence.owner];
                scratch.extend(
                    grammar
                        .terminals
                        .keys()
                        .filter(|&t| owner.follow.contains(t)),
                );
            }
            changed |= insert_all(&mut grammar.nonterminals[occurrence.target].follow, &scratch);
        }
        if !changed {
            break;
        }
    }
}

fn fill_table(grammar: &mut Grammar) -> Result<(), GrammarError> {
    let mut scratch = Vec::new();
    let mut epsilons = Vec::new();
    for (nonterminal, info) in grammar.nonterminals.iter() {
        let NonterminalShape::Plain { rules, .. } = &info.shape else {
            continue;
        };
        let mut epsilon: Option<RuleId> = None;
        for &rule in rules {
            let morphemes = &grammar.rules[rule].morphemes;
            scratch.clear();
            sequence_first(grammar, morphemes, &mut scratch);
            for &terminal in &scratch {
                match grammar.table.insert(nonterminal, terminal, rule) {
                    Ok(()) => {}
                    Err(InsertError::Conflict(existing)) => {
                        return Err(GrammarError::Conflict {
                            nonterminal: info.name.clone(),
                            terminal: grammar.terminals[terminal].clone(),
                            first: grammar.rules[existing].text.clone(),
                            second: grammar.rules[rule].text.clone(),
                        });
                    }
                    Err(InsertError::OutOfRange) => {
                        return Err(GrammarError::UnknownTerminal(terminal.as_u32()));
                    }
                }
            }
            if sequence_nullable(grammar, morphemes) {
                if let Some(existing) = epsilon {
                    return Err(GrammarError::EpsilonConflict {
                        nonterminal: info.name.clone(),
                        first: grammar.rules[existing].text.clone(),
                        second: grammar.rules[rule].text.clone(),
                    });
                }
                epsilon = Some(rule);
            }
        }
        if epsilon.is_some() {
            epsilons.push((nonterminal, epsilon));
        }
    }

    for (nonterminal, rule) in epsilons {
        if let NonterminalShape::Plain { epsilon, .. } = &mut grammar.nonterminals[nonterminal].shape
        {
            *epsilon = rule;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tiny {
        grammar: Grammar,
        a: TerminalId,
        b: TerminalId,
        c: TerminalId,
        s: NonterminalId,
        x: NonterminalId,
    }

    // s = x :c ; x = :a x | <empty>
    fn tiny() -> Tiny {
        let mut g = GrammarBuilder::new();
        let a = g.terminal("a");
        let b = g.terminal("b");
        let c = g.terminal("c");
        let s = g.nonterminal("s");
        let x = g.nonterminal("x");
        g.rule(s, &[x.into(), c.into()], None);
        g.rule(x, &[a.into(), x.into()], None);
        g.rule(x, &[], None);
        Tiny {
            grammar: g.build().unwrap(),
            a,
            b,
            c,
            s,
            x,
        }
    }

    #[test]
    fn test_first_follow() {
        let Tiny {
            grammar,
            a,
            b,
            c,
            s,
            x,
        } = tiny();

        assert!(grammar.nonterminal(x).nullable);
        assert!(!grammar.nonterminal(s).nullable);
        assert_eq!(grammar.first(s), vec![a, c]);
        assert_eq!(grammar.first(x), vec![a]);
        assert_eq!(grammar.follow(x), vec![c]);
        assert!(grammar.follow(s).is_empty());
        assert!(!grammar.in_first(s, b));
    }

    #[test]
    fn test_table_and_epsilon() {
        let Tiny {
            grammar, a, c, s, x, ..
        } = tiny();

        assert!(grammar.rule_for(s, a).is_some());
        assert!(grammar.rule_for(s, c).is_some());
        assert!(grammar.rule_for(x, c).is_none());

        let NonterminalShape::Plain { epsilon, .. } = &grammar.nonterminal(x).shape else {
            panic!("x is plain");
        };
        let epsilon = epsilon.unwrap();
        assert!(grammar.rule(epsilon).morphemes.is_empty());
        assert_eq!(grammar.rule(epsilon).text, "$x = :_empty");
    }

    #[test]
    fn test_conflict() {
        let mut g = GrammarBuilder::new();
        let a = g.terminal("a");
        let s = g.nonterminal("s");
        g.rule(s, &[a.into()], None);
        g.rule(s, &[a.into(), a.into()], Some(AstTransform::Substitution(1)));

        match g.build() {
            Err(GrammarError::Conflict {
                terminal, second, ..
            }) => {
                assert_eq!(terminal.as_ref(), "a");
                assert_eq!(second, "$s = :a :a -> $1");
            }
            _ => panic!("expected a conflict"),
        }
    }

    #[test]
    fn test_undefined_and_redefined() {
        let mut g = GrammarBuilder::new();
        let s = g.nonterminal("s");
        let t = g.nonterminal("t");
        g.rule(s, &[t.into()], None);
        assert!(matches!(g.build(), Err(GrammarError::Undefined(name)) if name.as_ref() == "t"));

        let mut g = GrammarBuilder::new();
        let a = g.terminal("a");
        let s = g.nonterminal("s");
        g.list(s, a.into(), ListShape::new());
        g.optional(s, a.into());
        assert!(matches!(g.build(), Err(GrammarError::Redefined(_))));
    }

    #[test]
    fn test_expression_tables() {
        let mut g = GrammarBuilder::new();
        let num = g.terminal("num");
        let plus = g.terminal("plus");
        let caret = g.terminal("caret");
        let e = g.nonterminal("e");
        g.expression(e);
        g.nud(e, &[num.into()], AstTransform::Substitution(0));
        let add = AstTransform::node("Add", &[("lhs", 0), ("rhs", 2)]);
        g.binary(e, 1, plus, Associativity::Left, add);
        let pow = AstTransform::node("Pow", &[("lhs", 0), ("rhs", 2)]);
        g.binary(e, 2, caret, Associativity::Right, pow);
        g.unary(e, 3, plus, AstTransform::node("Plus", &[("value", 1)]));
        let grammar = g.build().unwrap();

        let expr = grammar.expression(e).unwrap();
        assert_eq!(expr.infix_binding_power(plus), 1);
        assert_eq!(expr.infix_binding_power(caret), 2);
        assert_eq!(expr.infix_binding_power(num), 0);
        assert_eq!(expr.prefix_binding_power(plus), 3);
        assert!(expr.nud(caret).is_none());

        assert_eq!(grammar.first(e), vec![num, plus]);
        assert_eq!(grammar.follow(e), vec![plus, caret]);

        let led = expr.led(plus).unwrap();
        assert_eq!(grammar.rule(led).text, "$e = $e :plus $e -> Add(lhs=$0, rhs=$2)");
    }

    #[test]
    fn test_duplicate_trigger() {
        let mut g = GrammarBuilder::new();
        let num = g.terminal("num");
        let e = g.nonterminal("e");
        g.expression(e);
        g.nud(e, &[num.into()], AstTransform::Substitution(0));
        g.nud(e, &[num.into(), num.into()], AstTransform::Substitution(1));
        assert!(matches!(
            g.build(),
            Err(GrammarError::DuplicateTrigger { position: "nud", .. })
        ));

        let mut g = GrammarBuilder::new();
        let e = g.nonterminal("e");
        g.expression(e);
        g.nud(e, &[e.into()], AstTransform::Substitution(0));
        assert!(matches!(g.build(), Err(GrammarError::MissingTrigger { .. })));
    }

    #[test]
    fn test_list_follow_includes_separator() {
        let mut g = GrammarBuilder::new();
        let item = g.terminal("item");
        let comma = g.terminal("comma");
        let end = g.terminal("end");
        let inner = g.nonterminal("inner");
        let s = g.nonterminal("s");
        g.start(s);
        g.rule(inner, &[item.into()], None);
        let items = g.list_of(inner.into(), ListShape::separated(comma));
        g.rule(s, &[items.into(), end.into()], None);
        let grammar = g.build().unwrap();

        assert_eq!(grammar.start(), s);
        assert_eq!(grammar.follow(inner), vec![item, comma, end]);
        assert_eq!(grammar.nonterminal(items).name.as_ref(), "_gen0");
        assert!(grammar.nonterminal(items).nullable);
    }
}
