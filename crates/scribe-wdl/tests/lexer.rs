use scribe_runtime::{LexError, Terminal};
use scribe_wdl::{lex, TokenKind};

fn kinds(tokens: &[Terminal]) -> Vec<&str> {
    tokens.iter().map(|t| t.kind.as_ref()).collect()
}

fn texts(tokens: &[Terminal]) -> Vec<&str> {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

#[test]
fn test_call_fqn() {
    let tokens = lex("call lib.task as x", "test.wdl").unwrap();
    assert_eq!(kinds(&tokens), ["call", "fqn", "as", "identifier"]);
    assert_eq!(texts(&tokens), ["call", "lib.task", "as", "x"]);
    assert_eq!(TokenKind::from_id(tokens[1].id), Some(TokenKind::Fqn));
}

#[test]
fn test_keywords_need_boundaries() {
    let tokens = lex("metadata meta tasks Filename File", "test.wdl").unwrap();
    assert_eq!(
        kinds(&tokens),
        ["identifier", "meta", "identifier", "identifier", "type"]
    );
}

#[test]
fn test_positions() {
    let tokens = lex("task t {\n  Int x = 1\n}", "test.wdl").unwrap();
    let positions: Vec<_> = tokens.iter().map(|t| (t.line, t.col)).collect();
    assert_eq!(
        positions,
        [(1, 1), (1, 6), (1, 8), (2, 3), (2, 7), (2, 9), (2, 11), (3, 1)]
    );
    assert!(tokens.iter().all(|t| t.resource.as_ref() == "test.wdl"));
    assert_eq!(tokens[4].to_string(), r#"<test.wdl:2:7 identifier "x">"#);
}

#[test]
fn test_strings_are_unescaped() {
    let source = r#"x = "a\tb" + 'it\'s'"#;
    let tokens = lex(source, "test.wdl").unwrap();
    assert_eq!(kinds(&tokens), ["identifier", "equal", "string", "plus", "string"]);
    assert_eq!(tokens[2].text, "a\tb");
    assert_eq!(tokens[4].text, "it's");
    // the span still covers the quoted literal
    assert_eq!(tokens[2].span.as_str(source), r#""a\tb""#);
}

#[test]
fn test_comments() {
    let tokens = lex("# leading\nInt x /* inline\n block */ = 1 # trailing", "test.wdl").unwrap();
    assert_eq!(kinds(&tokens), ["type", "identifier", "equal", "integer"]);
    assert_eq!(tokens[2].line, 3);
}

#[test]
fn test_raw_command() {
    let tokens = lex("command {\n  echo ${sep=' ' names} > out\n}", "test.wdl").unwrap();
    assert_eq!(
        kinds(&tokens),
        [
            "raw_command",
            "raw_cmd_start",
            "cmd_part",
            "cmd_param_start",
            "cmd_attr_hint",
            "identifier",
            "equal",
            "string",
            "identifier",
            "cmd_param_end",
            "cmd_part",
            "raw_cmd_end",
        ]
    );
    assert_eq!(tokens[2].text, "\n  echo ");
    assert_eq!(tokens[4].text, "");
    assert_eq!(tokens[5].text, "sep");
    assert_eq!(tokens[7].text, " ");
    assert_eq!(tokens[10].text, " > out\n");
}

#[test]
fn test_heredoc_command() {
    let tokens = lex("command <<< awk '{print $1}' ~{file} >>>", "test.wdl").unwrap();
    assert_eq!(
        kinds(&tokens),
        [
            "raw_command",
            "raw_cmd_start",
            "cmd_part",
            "cmd_param_start",
            "identifier",
            "cmd_param_end",
            "cmd_part",
            "raw_cmd_end",
        ]
    );
    assert_eq!(tokens[2].text, " awk '{print $1}' ");
    assert_eq!(tokens[1].text, "<<<");
}

#[test]
fn test_comparison_is_not_an_attribute() {
    let tokens = lex("command { ${a == b} }", "test.wdl").unwrap();
    assert_eq!(
        kinds(&tokens)[4..8],
        ["identifier", "double_equal", "identifier", "cmd_param_end"]
    );
}

#[test]
fn test_scatter_mode() {
    let tokens = lex("scatter (item in items) {}", "test.wdl").unwrap();
    assert_eq!(
        kinds(&tokens),
        ["scatter", "lparen", "identifier", "in", "identifier", "rparen", "lbrace", "rbrace"]
    );
}

#[test]
fn test_workflow_outputs() {
    let source = "workflow w {\n  output {\n    Array[Int] xs = [1,\n      2]\n    t.out\n    t.*\n  }\n}";
    let tokens = lex(source, "test.wdl").unwrap();
    assert_eq!(
        kinds(&tokens),
        [
            "workflow",
            "identifier",
            "lbrace",
            "output",
            "lbrace",
            "type",
            "lsquare",
            "type",
            "rsquare",
            "identifier",
            "equal",
            "lsquare",
            "integer",
            "comma",
            "integer",
            "rsquare",
            "fqn",
            "fqn",
            "dot",
            "asterisk",
            "rbrace",
            "rbrace",
        ]
    );
}

#[test]
fn test_output_declaration_closed_by_brace() {
    let tokens = lex("workflow w { output { Map[String, Int] m = {\"a\": 1} } }", "test.wdl").unwrap();
    assert_eq!(
        kinds(&tokens)[5..],
        [
            "type",
            "lsquare",
            "type",
            "comma",
            "type",
            "rsquare",
            "identifier",
            "equal",
            "lbrace",
            "string",
            "colon",
            "integer",
            "rbrace",
            "rbrace",
            "rbrace",
        ]
    );
}

#[test]
fn test_task_outputs_stay_in_default_mode() {
    let tokens = lex("task t { output { File f = x.y } }", "test.wdl").unwrap();
    assert_eq!(
        kinds(&tokens),
        [
            "task",
            "identifier",
            "lbrace",
            "output",
            "lbrace",
            "type",
            "identifier",
            "equal",
            "identifier",
            "dot",
            "identifier",
            "rbrace",
            "rbrace",
        ]
    );
}

#[test]
fn test_unrecognized_token() {
    let error = lex("task t {\n  Int x = 1 ^ 2\n}", "test.wdl").unwrap_err();
    match &error {
        LexError::UnrecognizedToken {
            line,
            col,
            source_line,
            ..
        } => {
            assert_eq!((*line, *col), (2, 13));
            assert_eq!(source_line, "  Int x = 1 ^ 2");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(error.to_string().ends_with("  Int x = 1 ^ 2\n            ^"));
}

#[test]
fn test_braces_inside_command_parameter() {
    let tokens = lex(r#"command { ${ {"a": 1}["a"] } ~{object {x: 1}.x} }"#, "test.wdl").unwrap();
    assert_eq!(
        kinds(&tokens),
        [
            "raw_command",
            "raw_cmd_start",
            "cmd_part",
            "cmd_param_start",
            "lbrace",
            "string",
            "colon",
            "integer",
            "rbrace",
            "lsquare",
            "string",
            "rsquare",
            "cmd_param_end",
            "cmd_part",
            "cmd_param_start",
            "object",
            "lbrace",
            "identifier",
            "colon",
            "integer",
            "rbrace",
            "dot",
            "identifier",
            "cmd_param_end",
            "cmd_part",
            "raw_cmd_end",
        ]
    );
}
