use scribe_runtime::SyntaxErrorKind;
use scribe_wdl::{lex, parse_expression, parse_type_expression};

fn expr(source: &str) -> String {
    let tokens = lex(source, "expr").unwrap();
    let tree = parse_expression(&tokens).unwrap();
    tree.to_ast().unwrap().compact().to_string()
}

fn type_expr(source: &str) -> String {
    let tokens = lex(source, "type").unwrap();
    let tree = parse_type_expression(&tokens).unwrap();
    tree.to_ast().unwrap().compact().to_string()
}

#[test]
fn test_member_call() {
    assert_eq!(
        expr("foo.bar(1, 2)"),
        "FunctionCall(name=MemberAccess(lhs=foo, rhs=bar), params=[1, 2])"
    );
}

#[test]
fn test_unary_negation() {
    assert_eq!(
        expr("-1 + 2"),
        "Add(lhs=UnaryNegation(expression=1), rhs=2)"
    );
}

#[test]
fn test_precedence_levels() {
    assert_eq!(
        expr("1 + 2 * 3 == 7 || !x && y"),
        "LogicalOr(lhs=Equals(lhs=Add(lhs=1, rhs=Multiply(lhs=2, rhs=3)), rhs=7), \
         rhs=LogicalAnd(lhs=LogicalNot(expression=x), rhs=y))"
    );
    assert_eq!(
        expr("(1 + 2) * 3"),
        "Multiply(lhs=Add(lhs=1, rhs=2), rhs=3)"
    );
}

#[test]
fn test_left_associative() {
    assert_eq!(
        expr("a - b - c"),
        "Subtract(lhs=Subtract(lhs=a, rhs=b), rhs=c)"
    );
    assert_eq!(
        expr("a / b % c"),
        "Remainder(lhs=Divide(lhs=a, rhs=b), rhs=c)"
    );
}

#[test]
fn test_postfix_chain() {
    assert_eq!(
        expr("f(x)[0].y"),
        "MemberAccess(lhs=ArrayOrMapLookup(lhs=FunctionCall(name=f, params=[x]), rhs=0), rhs=y)"
    );
    assert_eq!(expr("xs[i + 1]"), "ArrayOrMapLookup(lhs=xs, rhs=Add(lhs=i, rhs=1))");
    assert_eq!(expr("f()"), "FunctionCall(name=f, params=[])");
}

#[test]
fn test_postfix_after_delimited_operand() {
    assert_eq!(
        expr("(a + b).c"),
        "MemberAccess(lhs=Add(lhs=a, rhs=b), rhs=c)"
    );
    assert_eq!(
        expr("[1, 2][0]"),
        "ArrayOrMapLookup(lhs=ArrayLiteral(values=[1, 2]), rhs=0)"
    );
    assert_eq!(
        expr(r#"{"k": 1}["k"]"#),
        "ArrayOrMapLookup(lhs=MapLiteral(map=[MapLiteralKv(key=k, value=1)]), rhs=k)"
    );
    assert_eq!(expr("(f)(x)"), "FunctionCall(name=f, params=[x])");
    assert_eq!(
        expr("object {x: 1}.x"),
        "MemberAccess(lhs=ObjectLiteral(map=[ObjectKV(key=x, value=1)]), rhs=x)"
    );
}

#[test]
fn test_literals() {
    assert_eq!(
        expr(r#"[1, "two", 3.0, true]"#),
        "ArrayLiteral(values=[1, two, 3.0, true])"
    );
    assert_eq!(
        expr(r#"{"a": 1, "b": 2}"#),
        "MapLiteral(map=[MapLiteralKv(key=a, value=1), MapLiteralKv(key=b, value=2)])"
    );
    assert_eq!(
        expr("object {x: 1, y: [ ]}"),
        "ObjectLiteral(map=[ObjectKV(key=x, value=1), ObjectKV(key=y, value=ArrayLiteral(values=[]))])"
    );
    assert_eq!(expr("0x1F"), "0x1F");
}

#[test]
fn test_ternary() {
    assert_eq!(
        expr("if a then b else c + 1"),
        "TernaryIf(cond=a, iftrue=b, iffalse=Add(lhs=c, rhs=1))"
    );
}

#[test]
fn test_type_expressions() {
    assert_eq!(type_expr("String"), "String");
    assert_eq!(type_expr("Int?"), "OptionalType(innerType=Int)");
    assert_eq!(
        type_expr("Array[File]+"),
        "NonEmptyType(innerType=Type(name=Array, subtype=[File]))"
    );
    assert_eq!(
        type_expr("Map[String, Array[Int]]?"),
        "OptionalType(innerType=Type(name=Map, subtype=[String, Type(name=Array, subtype=[Int])]))"
    );
}

#[test]
fn test_expression_errors() {
    let tokens = lex("1 +", "expr").unwrap();
    let error = parse_expression(&tokens).unwrap_err();
    assert!(matches!(error.kind, SyntaxErrorKind::UnexpectedEof { .. }));

    let tokens = lex("1 2", "expr").unwrap();
    let error = parse_expression(&tokens).unwrap_err();
    assert!(matches!(error.kind, SyntaxErrorKind::ExcessTokens { .. }));
    let terminal = error.terminal().unwrap();
    assert_eq!((terminal.line, terminal.col), (1, 3));

    let tokens = lex("f(1", "expr").unwrap();
    let error = parse_expression(&tokens).unwrap_err();
    assert!(matches!(error.kind, SyntaxErrorKind::NoMoreTokens { .. }));

    let tokens = lex("Int x", "type").unwrap();
    let error = parse_type_expression(&tokens).unwrap_err();
    assert!(matches!(error.kind, SyntaxErrorKind::ExcessTokens { .. }));
}
