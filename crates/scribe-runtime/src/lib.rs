pub mod ast;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod tree;

mod cursor;
mod display;

pub use ast::{Ast, Record};
pub use display::Compact;
pub use error::{
    DefaultFormatter, ErrorFormatter, GrammarError, LexError, SyntaxError, SyntaxErrorKind,
};
pub use grammar::{
    Associativity, AstTransform, ExprGrammar, Grammar, GrammarBuilder, ListShape, NonterminalId,
    NonterminalRef, NonterminalShape, RuleForm, RuleId, Symbol, TerminalId,
};
pub use lexer::{
    Action, Hook, LexCx, LexerBuilder, LexerDef, ModeId, Pattern, PatternMatch, Rewrite,
};
pub use parser::{parse, parse_from};
pub use token::{Span, Terminal};
pub use tree::{Node, NodeKind, ParseTree};

// re-exported so language crates can construct ids without naming the entity crate
pub use cranelift_entity::EntityRef;
