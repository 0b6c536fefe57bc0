use super::Parser;
use crate::{
    error::SyntaxError,
    grammar::{Associativity, AstTransform, ExprGrammar, NonterminalId, RuleForm, Symbol},
    tree::{NodeKind, ParseTree},
};

impl<'a> Parser<'a> {
    /// Parses an expression whose operators all bind tighter than `min_bp`.
    pub(super) fn parse_expression(
        &mut self,
        nonterminal: NonterminalId,
        expr: &'a ExprGrammar,
        min_bp: u32,
    ) -> Result<ParseTree, SyntaxError> {
        let mut left = self.parse_nud(nonterminal, expr)?;

        while let Some(token) = self.tokens.peek() {
            if expr.infix_binding_power(token.id) <= min_bp {
                break;
            }
            left = self.parse_led(nonterminal, expr, left)?;
        }

        Ok(left)
    }

    fn parse_nud(
        &mut self,
        nonterminal: NonterminalId,
        expr: &'a ExprGrammar,
    ) -> Result<ParseTree, SyntaxError> {
        let grammar = self.grammar;
        let Some(token) = self.tokens.peek() else {
            return Err(self.unexpected_eof(nonterminal));
        };
        let Some(rule_id) = expr.nud(token.id) else {
            return Err(self.unexpected_symbol(token, grammar.first(nonterminal)));
        };

        let rule = grammar.rule(rule_id);
        let (operator, compound) = match rule.form {
            RuleForm::Nud { operator, compound } => (operator, compound),
            _ => (false, false),
        };
        let operand_bp = match operator {
            true => expr.prefix_binding_power(token.id),
            false => 0,
        };

        self.rule = Some(rule_id);
        let children = self.parse_morphemes(nonterminal, expr, &rule.morphemes, operand_bp)?;

        let kind = NodeKind::Prefix {
            transform: rule.transform.clone().unwrap_or(AstTransform::Substitution(0)),
            morphemes: rule.morphemes.len(),
            operator,
            compound,
        };
        Ok(self.node(nonterminal, kind, children))
    }

    fn parse_led(
        &mut self,
        nonterminal: NonterminalId,
        expr: &'a ExprGrammar,
        left: ParseTree,
    ) -> Result<ParseTree, SyntaxError> {
        let grammar = self.grammar;
        let Some(token) = self.tokens.peek() else {
            return Ok(left);
        };
        let Some(rule_id) = expr.led(token.id) else {
            return Err(self.unexpected_symbol(token, grammar.follow(nonterminal)));
        };

        let rule = grammar.rule(rule_id);
        let binding_power = expr.infix_binding_power(token.id);
        let (binary, operand_bp) = match rule.form {
            RuleForm::Led {
                binary: Some(Associativity::Left),
            } => (true, binding_power),
            RuleForm::Led {
                binary: Some(Associativity::Right),
            } => (true, binding_power.saturating_sub(1)),
            _ => (false, 0),
        };

        self.rule = Some(rule_id);
        let mut children = Vec::with_capacity(rule.morphemes.len() + 1);
        children.push(left);
        children.extend(self.parse_morphemes(nonterminal, expr, &rule.morphemes, operand_bp)?);

        let kind = NodeKind::Infix {
            transform: rule.transform.clone().unwrap_or(AstTransform::Substitution(0)),
            binary,
        };
        Ok(self.node(nonterminal, kind, children))
    }

    /// Parses the symbols of an operator rule, operands of the same
    /// expression recurse at `operand_bp`.
    fn parse_morphemes(
        &mut self,
        nonterminal: NonterminalId,
        expr: &'a ExprGrammar,
        morphemes: &'a [Symbol],
        operand_bp: u32,
    ) -> Result<Vec<ParseTree>, SyntaxError> {
        let rule = self.rule;
        let mut children = Vec::with_capacity(morphemes.len());
        for &symbol in morphemes {
            let child = match symbol {
                Symbol::Nonterminal(inner) if inner == nonterminal => {
                    self.parse_expression(nonterminal, expr, operand_bp)?
                }
                other => self.parse_symbol(other)?,
            };
            self.rule = rule;
            children.push(child);
        }
        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::{DefaultFormatter, SyntaxErrorKind},
        grammar::{Associativity, AstTransform, Grammar, GrammarBuilder, ListShape},
        lexer::{LexerBuilder, LexerDef, Pattern},
        parser::parse,
        tree::ParseTree,
        Ast,
    };

    struct Calc {
        grammar: Grammar,
        lexer: LexerDef<()>,
    }

    fn calc() -> Calc {
        let mut g = GrammarBuilder::new();
        let num = g.terminal("num");
        let ident = g.terminal("ident");
        let plus = g.terminal("plus");
        let dash = g.terminal("dash");
        let star = g.terminal("star");
        let caret = g.terminal("caret");
        let bang = g.terminal("bang");
        let lparen = g.terminal("lparen");
        let rparen = g.terminal("rparen");
        let lsquare = g.terminal("lsquare");
        let rsquare = g.terminal("rsquare");
        let comma = g.terminal("comma");
        let dot = g.terminal("dot");

        let e = g.nonterminal("e");
        g.expression(e);
        let binary = |name: &str| AstTransform::node(name, &[("lhs", 0), ("rhs", 2)]);
        g.binary(e, 2, plus, Associativity::Left, binary("Add"));
        g.binary(e, 2, dash, Associativity::Left, binary("Sub"));
        g.binary(e, 3, star, Associativity::Left, binary("Mul"));
        g.binary(e, 5, caret, Associativity::Right, binary("Pow"));
        g.unary(e, 4, dash, AstTransform::node("Neg", &[("value", 1)]));
        g.unary(e, 4, bang, AstTransform::node("Not", &[("value", 1)]));

        let args = g.list_of(e.into(), ListShape::separated(comma));
        g.led(
            e,
            6,
            &[lparen.into(), args.into(), rparen.into()],
            AstTransform::node("Call", &[("name", 0), ("args", 2)]),
        );
        g.led(
            e,
            7,
            &[dot.into(), ident.into()],
            AstTransform::node("Member", &[("object", 0), ("field", 2)]),
        );

        g.nud(e, &[num.into()], AstTransform::Substitution(0));
        g.compound_nud(e, &[ident.into()], AstTransform::Substitution(0));
        g.nud(
            e,
            &[lparen.into(), e.into(), rparen.into()],
            AstTransform::Substitution(1),
        );
        let values = g.list_of(e.into(), ListShape::separated(comma));
        g.nud(
            e,
            &[lsquare.into(), values.into(), rsquare.into()],
            AstTransform::node("Array", &[("values", 1)]),
        );
        let grammar = g.build().unwrap();

        let mut b = LexerBuilder::new(&grammar);
        let default = b.mode("default");
        b.patterns(
            default,
            [
                Pattern::new(r"\s+"),
                Pattern::new("[0-9]+").emit(num),
                Pattern::new("[a-z]+").emit(ident),
                Pattern::new(r"\+").emit(plus),
                Pattern::new("-").emit(dash),
                Pattern::new(r"\*").emit(star),
                Pattern::new(r"\^").emit(caret),
                Pattern::new("!").emit(bang),
                Pattern::new(r"\(").emit(lparen),
                Pattern::new(r"\)").emit(rparen),
                Pattern::new(r"\[").emit(lsquare),
                Pattern::new(r"\]").emit(rsquare),
                Pattern::new(",").emit(comma),
                Pattern::new(r"\.").emit(dot),
            ],
        );
        Calc {
            grammar,
            lexer: b.build().unwrap(),
        }
    }

    fn tree(calc: &Calc, source: &str) -> ParseTree {
        let tokens = calc.lexer.lex(source, "calc", ()).unwrap();
        parse(&calc.grammar, &tokens, &DefaultFormatter).unwrap()
    }

    fn ast_of(source: &str) -> String {
        let calc = calc();
        match tree(&calc, source).to_ast() {
            Some(ast) => ast.compact().to_string(),
            None => String::new(),
        }
    }

    #[test]
    fn test_precedence() {
        assert_eq!(ast_of("1 + 2 * 3"), "Add(lhs=1, rhs=Mul(lhs=2, rhs=3))");
        assert_eq!(ast_of("1 * 2 + 3"), "Add(lhs=Mul(lhs=1, rhs=2), rhs=3)");
        assert_eq!(ast_of("(1 + 2) * 3"), "Mul(lhs=Add(lhs=1, rhs=2), rhs=3)");
    }

    #[test]
    fn test_associativity() {
        assert_eq!(ast_of("1 - 2 - 3"), "Sub(lhs=Sub(lhs=1, rhs=2), rhs=3)");
        assert_eq!(ast_of("1 ^ 2 ^ 3"), "Pow(lhs=1, rhs=Pow(lhs=2, rhs=3))");
    }

    #[test]
    fn test_prefix_operators() {
        assert_eq!(ast_of("-1 + 2"), "Add(lhs=Neg(value=1), rhs=2)");
        assert_eq!(ast_of("-1 * 2"), "Mul(lhs=Neg(value=1), rhs=2)");
        assert_eq!(ast_of("-2 ^ 2"), "Neg(value=Pow(lhs=2, rhs=2))");
        assert_eq!(ast_of("!-a"), "Not(value=Neg(value=a))");
    }

    #[test]
    fn test_mixfix() {
        assert_eq!(
            ast_of("f(1, x.y)(2)"),
            "Call(name=Call(name=f, args=[1, Member(object=x, field=y)]), args=[2])"
        );
        assert_eq!(ast_of("-f()"), "Neg(value=Call(name=f, args=[]))");
        assert_eq!(ast_of("[1, [2]]"), "Array(values=[1, Array(values=[2])])");
    }

    #[test]
    fn test_led_after_self_contained_nud() {
        assert_eq!(ast_of("[a](1)"), "Call(name=Array(values=[a]), args=[1])");
        assert_eq!(ast_of("(f)(x)"), "Call(name=f, args=[x])");
        assert_eq!(
            ast_of("(a + b).c"),
            "Member(object=Add(lhs=a, rhs=b), field=c)"
        );
    }

    #[test]
    fn test_compound_nud_continued_by_led() {
        let calc = calc();
        let tree = tree(&calc, "g(a)");
        let call = tree.as_node().unwrap();
        assert!(matches!(
            call.children[0].as_node().unwrap().kind,
            crate::NodeKind::Prefix { compound: true, .. }
        ));
        assert_eq!(
            tree.to_ast().unwrap().compact().to_string(),
            "Call(name=g, args=[a])"
        );
    }

    #[test]
    fn test_parse_tree_shape() {
        let calc = calc();
        let tree = tree(&calc, "a + b");
        let node = tree.as_node().unwrap();
        assert_eq!(node.nonterminal.name.as_ref(), "e");
        assert_eq!(node.children.len(), 3);
        assert!(matches!(node.kind, crate::NodeKind::Infix { binary: true, .. }));
        assert!(matches!(
            node.children[0].as_node().unwrap().kind,
            crate::NodeKind::Prefix {
                morphemes: 1,
                operator: false,
                compound: true,
                ..
            }
        ));
    }

    #[test]
    fn test_expression_errors() {
        let calc = calc();

        let tokens = calc.lexer.lex("1 +", "calc", ()).unwrap();
        let error = parse(&calc.grammar, &tokens, &DefaultFormatter).unwrap_err();
        assert!(matches!(error.kind, SyntaxErrorKind::UnexpectedEof { .. }));

        let tokens = calc.lexer.lex("1 + )", "calc", ()).unwrap();
        let error = parse(&calc.grammar, &tokens, &DefaultFormatter).unwrap_err();
        match &error.kind {
            SyntaxErrorKind::UnexpectedSymbol { actual, rule, .. } => {
                assert_eq!(actual.text, ")");
                assert_eq!(rule.as_deref(), Some("$e = $e :plus $e -> Add(lhs=$0, rhs=$2)"));
            }
            other => panic!("unexpected {other:?}"),
        }

        let tokens = calc.lexer.lex("1 2", "calc", ()).unwrap();
        let error = parse(&calc.grammar, &tokens, &DefaultFormatter).unwrap_err();
        assert!(matches!(error.kind, SyntaxErrorKind::ExcessTokens { .. }));

        let tokens = calc.lexer.lex("(1", "calc", ()).unwrap();
        let error = parse(&calc.grammar, &tokens, &DefaultFormatter).unwrap_err();
        assert!(matches!(error.kind, SyntaxErrorKind::NoMoreTokens { .. }));
    }
}
