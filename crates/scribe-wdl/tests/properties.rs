//! Property tests over the WDL grammar table, lexer and expression parser.

use proptest::prelude::*;
use scribe_runtime::{EntityRef, NonterminalId, TerminalId};
use scribe_wdl::{grammar, lex, parse_expression};

const OPERATORS: &[(&str, &str, u32)] = &[
    ("||", "LogicalOr", 2),
    ("&&", "LogicalAnd", 3),
    ("==", "Equals", 4),
    ("!=", "NotEquals", 4),
    ("<", "LessThan", 5),
    ("<=", "LessThanOrEqual", 5),
    (">", "GreaterThan", 5),
    (">=", "GreaterThanOrEqual", 5),
    ("+", "Add", 6),
    ("-", "Subtract", 6),
    ("*", "Multiply", 7),
    ("/", "Divide", 7),
    ("%", "Remainder", 7),
];

// no WDL keyword starts with `v`
fn identifier() -> impl Strategy<Value = String> {
    "v[a-z0-9_]{0,6}"
}

fn integer() -> impl Strategy<Value = String> {
    "[1-9][0-9]{0,5}"
}

fn atom() -> impl Strategy<Value = String> {
    prop_oneof![identifier(), integer()]
}

fn operator() -> impl Strategy<Value = usize> {
    0..OPERATORS.len()
}

/// `atom (op atom)*` joined by single spaces.
fn expression() -> impl Strategy<Value = String> {
    (atom(), prop::collection::vec((operator(), atom()), 0..6)).prop_map(|(first, rest)| {
        let mut text = first;
        for (op, atom) in rest {
            text.push(' ');
            text.push_str(OPERATORS[op].0);
            text.push(' ');
            text.push_str(&atom);
        }
        text
    })
}

fn compact(source: &str) -> String {
    let tokens = lex(source, "prop").unwrap();
    let tree = parse_expression(&tokens).unwrap();
    tree.to_ast().unwrap().compact().to_string()
}

proptest! {
    #[test]
    fn test_table_entries_are_predicted(
        nonterminal in 0..grammar().nonterminals().count(),
        terminal in 0..grammar().terminal_count(),
    ) {
        let grammar = grammar();
        let nonterminal = NonterminalId::new(nonterminal);
        let terminal = TerminalId::new(terminal);
        // epsilon alternatives are chosen off table, so every entry is in FIRST
        if grammar.rule_for(nonterminal, terminal).is_some() {
            prop_assert!(grammar.in_first(nonterminal, terminal));
        }
    }

    #[test]
    fn test_lexed_texts_match_source(atoms in prop::collection::vec((atom(), operator()), 1..8)) {
        let words: Vec<&str> = atoms
            .iter()
            .flat_map(|(atom, op)| [atom.as_str(), OPERATORS[*op].0])
            .collect();
        let source = words.join(" ");

        let tokens = lex(&source, "prop").unwrap();
        prop_assert_eq!(tokens.len(), words.len());
        for (token, word) in tokens.iter().zip(&words) {
            prop_assert_eq!(token.text.as_str(), *word);
            prop_assert_eq!(token.span.as_str(&source), *word);
            prop_assert_eq!(token.line, 1);
        }
    }

    #[test]
    fn test_expression_reparse(source in expression()) {
        let tokens = lex(&source, "prop").unwrap();
        let first = parse_expression(&tokens).unwrap();
        let second = parse_expression(&tokens).unwrap();
        prop_assert_eq!(&first, &second);

        let leaves: Vec<_> = first.terminals().into_iter().cloned().collect();
        prop_assert_eq!(leaves, tokens);
    }

    #[test]
    fn test_binary_precedence(
        x in identifier(),
        y in identifier(),
        z in identifier(),
        a in operator(),
        b in operator(),
    ) {
        let (op1, name1, bp1) = OPERATORS[a];
        let (op2, name2, bp2) = OPERATORS[b];
        let expected = if bp1 >= bp2 {
            format!("{name2}(lhs={name1}(lhs={x}, rhs={y}), rhs={z})")
        } else {
            format!("{name1}(lhs={x}, rhs={name2}(lhs={y}, rhs={z}))")
        };
        prop_assert_eq!(compact(&format!("{x} {op1} {y} {op2} {z}")), expected);
    }
}
