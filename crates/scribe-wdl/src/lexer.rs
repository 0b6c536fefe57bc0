//! WDL lexical modes.
//!
//! Commands switch to modes where everything up to the closing delimiter or
//! the next `${` is a single `cmd_part`. Workflow output blocks have their
//! own modes because a typed output declaration ends at a newline.

use scribe_runtime::{
    GrammarError, LexCx, LexError, LexerBuilder, LexerDef, ModeId, Pattern, PatternMatch,
};

use crate::terminals::TokenKind as T;

const IDENT_CHAR: &str = "[a-zA-Z0-9_]";
const IDENTIFIER: &str = "[a-zA-Z][a-zA-Z0-9_]*";
const FQN: &str = r"[a-zA-Z][a-zA-Z0-9_]*(?:\.[a-zA-Z][a-zA-Z0-9_]*)*";
const TYPE: &str = "(?:Array|Map|Object|Pair|Boolean|Int|Float|Uri|File|String)";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct Modes {
    pub wf_output: ModeId,
    pub wf_output_declaration: ModeId,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Section {
    None,
    Task,
    Workflow,
}

/// Per-call lexer state.
#[derive(Debug)]
pub(crate) struct WdlContext {
    modes: Modes,
    section: Section,
    /// Open brackets in the current output declaration.
    depth: u32,
    /// Open braces in the current command parameter.
    param_depth: u32,
}

impl WdlContext {
    pub fn new(modes: Modes) -> WdlContext {
        WdlContext {
            modes,
            section: Section::None,
            depth: 0,
            param_depth: 0,
        }
    }
}

pub(crate) struct WdlLexer {
    pub def: LexerDef<WdlContext>,
    pub modes: Modes,
}

type Cx<'a> = LexCx<'a, WdlContext>;

fn enter_task(cx: &mut Cx<'_>, _: &PatternMatch<'_>) -> Result<(), LexError> {
    cx.user.section = Section::Task;
    Ok(())
}

fn enter_workflow(cx: &mut Cx<'_>, _: &PatternMatch<'_>) -> Result<(), LexError> {
    cx.user.section = Section::Workflow;
    Ok(())
}

/// Task outputs are ordinary declarations, workflow outputs are not.
fn enter_output(cx: &mut Cx<'_>, _: &PatternMatch<'_>) -> Result<(), LexError> {
    if cx.user.section == Section::Workflow {
        let mode = cx.user.modes.wf_output;
        cx.push_mode(mode);
    }
    Ok(())
}

fn enter_output_declaration(cx: &mut Cx<'_>, _: &PatternMatch<'_>) -> Result<(), LexError> {
    cx.user.depth = 0;
    let mode = cx.user.modes.wf_output_declaration;
    cx.push_mode(mode);
    Ok(())
}

fn open_bracket(cx: &mut Cx<'_>, _: &PatternMatch<'_>) -> Result<(), LexError> {
    cx.user.depth += 1;
    Ok(())
}

fn close_bracket(cx: &mut Cx<'_>, _: &PatternMatch<'_>) -> Result<(), LexError> {
    cx.user.depth = cx.user.depth.saturating_sub(1);
    Ok(())
}

/// A `}` at depth zero also closes the surrounding output block.
fn close_brace(cx: &mut Cx<'_>, m: &PatternMatch<'_>) -> Result<(), LexError> {
    cx.emit(T::Rbrace, m, None)?;
    if cx.user.depth > 0 {
        cx.user.depth -= 1;
        return Ok(());
    }
    cx.pop_mode()?;
    cx.pop_mode()?;
    Ok(())
}

fn enter_param(cx: &mut Cx<'_>, _: &PatternMatch<'_>) -> Result<(), LexError> {
    cx.user.param_depth = 0;
    Ok(())
}

fn open_param_brace(cx: &mut Cx<'_>, _: &PatternMatch<'_>) -> Result<(), LexError> {
    cx.user.param_depth += 1;
    Ok(())
}

/// Only the `}` matching the parameter's `${` ends it.
fn close_param_brace(cx: &mut Cx<'_>, m: &PatternMatch<'_>) -> Result<(), LexError> {
    if cx.user.param_depth > 0 {
        cx.user.param_depth -= 1;
        return cx.emit(T::Rbrace, m, None);
    }
    cx.emit(T::CmdParamEnd, m, None)?;
    cx.pop_mode()?;
    Ok(())
}

fn end_of_line(cx: &mut Cx<'_>, _: &PatternMatch<'_>) -> Result<(), LexError> {
    if cx.user.depth == 0 {
        cx.pop_mode()?;
    }
    Ok(())
}

fn keyword(word: &str, kind: T) -> Pattern<WdlContext> {
    Pattern::new(word).not_followed_by(IDENT_CHAR).emit(kind)
}

/// Strips the quotes of a string literal and decodes its escapes.
///
/// Malformed escapes are kept verbatim.
pub(crate) fn unescape(literal: &str) -> String {
    let inner = literal
        .get(1..literal.len().saturating_sub(1))
        .unwrap_or_default();

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(escape) = chars.next() else {
            out.push('\\');
            break;
        };
        let simple = match escape {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            'b' => Some('\u{8}'),
            'f' => Some('\u{c}'),
            'a' => Some('\u{7}'),
            'v' => Some('\u{b}'),
            '\\' | '"' | '\'' | '?' => Some(escape),
            _ => None,
        };
        if let Some(simple) = simple {
            out.push(simple);
            continue;
        }

        let (radix, max_digits) = match escape {
            '0'..='7' => (8, 3),
            'x' => (16, 2),
            'u' => (16, 4),
            'U' => (16, 8),
            _ => {
                out.push('\\');
                out.push(escape);
                continue;
            }
        };
        let mut digits = String::new();
        if radix == 8 {
            digits.push(escape);
        }
        while digits.len() < max_digits {
            match chars.peek() {
                Some(&next) if next.is_digit(radix) => {
                    digits.push(next);
                    chars.next();
                }
                _ => break,
            }
        }
        match u32::from_str_radix(&digits, radix)
            .ok()
            .and_then(char::from_u32)
        {
            Some(decoded) if !digits.is_empty() => out.push(decoded),
            _ => {
                out.push('\\');
                if radix != 8 {
                    out.push(escape);
                }
                out.push_str(&digits);
            }
        }
    }
    out
}

/// Literals, names and operators shared by every mode that lexes expressions.
fn expression_patterns() -> Vec<Pattern<WdlContext>> {
    vec![
        Pattern::new(TYPE).not_followed_by(IDENT_CHAR).emit(T::Type),
        Pattern::new("true|false")
            .not_followed_by(IDENT_CHAR)
            .emit(T::Boolean),
        keyword("if", T::If),
        keyword("then", T::Then),
        keyword("else", T::Else),
        Pattern::new(r"(object)\s*(\{)")
            .emit_group(T::Object, 1)
            .emit_group(T::Lbrace, 2),
        Pattern::new(IDENTIFIER).emit(T::Identifier),
        Pattern::new(r#""(?:[^\\"\n]|\\.)*""#).emit_with(T::String, unescape),
        Pattern::new(r"'(?:[^\\'\n]|\\.)*'").emit_with(T::String, unescape),
        Pattern::new(r"(?:[0-9]+\.[0-9]*|\.[0-9]+)(?:[eE][-+]?[0-9]+)?|[0-9]+[eE][-+]?[0-9]+")
            .emit(T::Float),
        Pattern::new("0[xX][0-9a-fA-F]+|[1-9][0-9]*|0[0-7]*").emit(T::Integer),
        Pattern::new("==").emit(T::DoubleEqual),
        Pattern::new("!=").emit(T::NotEqual),
        Pattern::new(r"\|\|").emit(T::DoublePipe),
        Pattern::new("&&").emit(T::DoubleAmpersand),
        Pattern::new("<=").emit(T::Lteq),
        Pattern::new("<").emit(T::Lt),
        Pattern::new(">=").emit(T::Gteq),
        Pattern::new(">").emit(T::Gt),
        Pattern::new("=").emit(T::Equal),
        Pattern::new("!").emit(T::Not),
        Pattern::new(":").emit(T::Colon),
        Pattern::new(",").emit(T::Comma),
        Pattern::new(r"\.").emit(T::Dot),
        Pattern::new(r"\+").emit(T::Plus),
        Pattern::new(r"\*").emit(T::Asterisk),
        Pattern::new("-").emit(T::Dash),
        Pattern::new("/").emit(T::Slash),
        Pattern::new("%").emit(T::Percent),
        Pattern::new(r"\?").emit(T::Qmark),
    ]
}

fn brackets() -> Vec<Pattern<WdlContext>> {
    vec![
        Pattern::new(r"\{").emit(T::Lbrace),
        Pattern::new(r"\}").emit(T::Rbrace),
        Pattern::new(r"\(").emit(T::Lparen),
        Pattern::new(r"\)").emit(T::Rparen),
        Pattern::new(r"\[").emit(T::Lsquare),
        Pattern::new(r"\]").emit(T::Rsquare),
    ]
}

pub(crate) fn build(grammar: &scribe_runtime::Grammar) -> Result<WdlLexer, GrammarError> {
    let mut b = LexerBuilder::new(grammar);
    let default = b.mode("default");
    let call_fqn = b.mode("call_fqn");
    let scatter = b.mode("scatter");
    let raw_command = b.mode("raw_command");
    let heredoc_command = b.mode("heredoc_command");
    let cmd_param = b.mode("cmd_param");
    let wf_output = b.mode("wf_output");
    let wf_output_declaration = b.mode("wf_output_declaration");

    let whitespace = || Pattern::new(r"\s+");
    let comment = || Pattern::new("#[^\n]*");

    b.patterns(
        default,
        [
            whitespace(),
            Pattern::new(r"(?s)/\*.*?\*/"),
            comment(),
            keyword("task", T::Task).hook(enter_task),
            keyword("workflow", T::Workflow).hook(enter_workflow),
            keyword("call", T::Call).push(call_fqn),
            keyword("import", T::Import),
            keyword("input", T::Input),
            Pattern::new(r"(output)\s*(\{)")
                .emit_group(T::Output, 1)
                .emit_group(T::Lbrace, 2)
                .hook(enter_output),
            keyword("as", T::As),
            keyword("while", T::While),
            keyword("runtime", T::Runtime),
            keyword("scatter", T::Scatter).push(scatter),
            Pattern::new(r"(command)\s*(\{)")
                .emit_group(T::RawCommand, 1)
                .emit_group(T::RawCmdStart, 2)
                .push(raw_command),
            Pattern::new(r"(command)\s*(<<<)")
                .emit_group(T::RawCommand, 1)
                .emit_group(T::RawCmdStart, 2)
                .push(heredoc_command),
            keyword("parameter_meta", T::ParameterMeta),
            keyword("meta", T::Meta),
        ],
    );
    b.patterns(default, expression_patterns());
    b.patterns(default, brackets());

    b.patterns(
        call_fqn,
        [whitespace(), Pattern::new(FQN).emit(T::Fqn).pop()],
    );

    b.patterns(
        scatter,
        [
            whitespace(),
            Pattern::new(r"\(").emit(T::Lparen),
            keyword("in", T::In).pop(),
            Pattern::new(IDENTIFIER).emit(T::Identifier),
        ],
    );

    let param_start = || {
        Pattern::new(r"[$~]\{")
            .emit(T::CmdParamStart)
            .push(cmd_param)
            .hook(enter_param)
    };
    b.patterns(
        raw_command,
        [
            Pattern::new(r"\}").emit(T::RawCmdEnd).pop(),
            param_start(),
            Pattern::until(r"\}|[$~]\{").emit(T::CmdPart),
        ],
    );
    b.patterns(
        heredoc_command,
        [
            Pattern::new(">>>").emit(T::RawCmdEnd).pop(),
            param_start(),
            Pattern::until(r">>>|[$~]\{").emit(T::CmdPart),
        ],
    );

    b.patterns(
        cmd_param,
        [
            whitespace(),
            Pattern::new(r"\}").hook(close_param_brace),
            Pattern::new(r"(object)\s*(\{)")
                .emit_group(T::Object, 1)
                .emit_group(T::Lbrace, 2)
                .hook(open_param_brace),
            Pattern::new(r"\{").emit(T::Lbrace).hook(open_param_brace),
            Pattern::new(format!("()({IDENTIFIER})").as_str())
                .followed_by(r"\s*=(?:[^=]|\z)")
                .emit_group(T::CmdAttrHint, 1)
                .emit_group(T::Identifier, 2),
        ],
    );
    b.patterns(cmd_param, expression_patterns());
    b.patterns(
        cmd_param,
        [
            Pattern::new(r"\(").emit(T::Lparen),
            Pattern::new(r"\)").emit(T::Rparen),
            Pattern::new(r"\[").emit(T::Lsquare),
            Pattern::new(r"\]").emit(T::Rsquare),
        ],
    );

    b.patterns(
        wf_output,
        [
            whitespace(),
            comment(),
            Pattern::new(TYPE)
                .not_followed_by(IDENT_CHAR)
                .emit(T::Type)
                .hook(enter_output_declaration),
            Pattern::new(r"\}").emit(T::Rbrace).pop(),
            Pattern::new(",").emit(T::Comma),
            Pattern::new(r"\.").emit(T::Dot),
            Pattern::new(r"\*").emit(T::Asterisk),
            Pattern::new(FQN).emit(T::Fqn),
        ],
    );

    b.patterns(
        wf_output_declaration,
        [
            Pattern::new(r"[ \t\r]+"),
            comment(),
            Pattern::new("\n").hook(end_of_line),
            Pattern::new(r"\}").hook(close_brace),
            Pattern::new(r"(object)\s*(\{)")
                .emit_group(T::Object, 1)
                .emit_group(T::Lbrace, 2)
                .hook(open_bracket),
            Pattern::new(r"\{").emit(T::Lbrace).hook(open_bracket),
            Pattern::new(r"\(").emit(T::Lparen).hook(open_bracket),
            Pattern::new(r"\[").emit(T::Lsquare).hook(open_bracket),
            Pattern::new(r"\)").emit(T::Rparen).hook(close_bracket),
            Pattern::new(r"\]").emit(T::Rsquare).hook(close_bracket),
        ],
    );
    b.patterns(wf_output_declaration, expression_patterns());

    Ok(WdlLexer {
        def: b.build()?,
        modes: Modes {
            wf_output,
            wf_output_declaration,
        },
    })
}
