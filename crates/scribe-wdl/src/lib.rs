//! WDL front end on top of `scribe-runtime`.
//!
//! The grammar and the lexer are built once, on first use, and shared by
//! every parse.

mod grammar;
mod lexer;
mod terminals;

use once_cell::sync::Lazy;
use scribe_runtime::{
    parse_from, Ast, DefaultFormatter, ErrorFormatter, Grammar, LexError, ParseTree, SyntaxError,
    Terminal,
};
use thiserror::Error;

pub use terminals::TokenKind;

use grammar::WdlGrammar;
use lexer::{WdlContext, WdlLexer};

static GRAMMAR: Lazy<WdlGrammar> = Lazy::new(|| {
    let wdl = grammar::build().expect("WDL grammar is well formed");
    log::debug!(
        "WDL grammar ready, {} rules",
        wdl.grammar.rules().count()
    );
    wdl
});

static LEXER: Lazy<WdlLexer> = Lazy::new(|| {
    let lexer = lexer::build(&GRAMMAR.grammar).expect("WDL lexer patterns are well formed");
    log::debug!("WDL lexer ready");
    lexer
});

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

/// The WDL grammar table.
pub fn grammar() -> &'static Grammar {
    &GRAMMAR.grammar
}

/// Tokenizes `source`, `resource` labels the tokens and errors.
pub fn lex(source: &str, resource: &str) -> Result<Vec<Terminal>, LexError> {
    let lexer = &*LEXER;
    lexer.def.lex(source, resource, WdlContext::new(lexer.modes))
}

/// Parses a whole document.
pub fn parse(tokens: &[Terminal]) -> Result<ParseTree, SyntaxError> {
    parse_with(tokens, &DefaultFormatter)
}

pub fn parse_with(
    tokens: &[Terminal],
    formatter: &dyn ErrorFormatter,
) -> Result<ParseTree, SyntaxError> {
    let grammar = grammar();
    parse_from(grammar, grammar.start(), tokens, formatter)
}

/// Parses a single expression such as `foo.bar(1, 2)`.
pub fn parse_expression(tokens: &[Terminal]) -> Result<ParseTree, SyntaxError> {
    parse_expression_with(tokens, &DefaultFormatter)
}

pub fn parse_expression_with(
    tokens: &[Terminal],
    formatter: &dyn ErrorFormatter,
) -> Result<ParseTree, SyntaxError> {
    parse_from(grammar(), GRAMMAR.expression, tokens, formatter)
}

/// Parses a type such as `Array[File]+`.
pub fn parse_type_expression(tokens: &[Terminal]) -> Result<ParseTree, SyntaxError> {
    parse_type_expression_with(tokens, &DefaultFormatter)
}

pub fn parse_type_expression_with(
    tokens: &[Terminal],
    formatter: &dyn ErrorFormatter,
) -> Result<ParseTree, SyntaxError> {
    parse_from(grammar(), GRAMMAR.type_expression, tokens, formatter)
}

/// Lexes and parses `source` into its abstract syntax tree.
pub fn parse_source(source: &str, resource: &str) -> Result<Option<Ast>, Error> {
    let tokens = lex(source, resource)?;
    let tree = parse(&tokens).inspect_err(|e| log::debug!("{resource}: {e}"))?;
    Ok(tree.to_ast())
}
