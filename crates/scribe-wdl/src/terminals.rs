use scribe_runtime::{EntityRef, Symbol, TerminalId};

macro_rules! terminals {
    ($($variant:ident = $name:literal,)+) => {
        /// Terminal kinds of WDL, the discriminant is the [`TerminalId`] in [`crate::grammar()`].
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        #[repr(u32)]
        pub enum TokenKind {
            $($variant,)+
        }

        impl TokenKind {
            pub const ALL: &'static [TokenKind] = &[$(TokenKind::$variant,)+];

            pub fn name(self) -> &'static str {
                match self {
                    $(TokenKind::$variant => $name,)+
                }
            }
        }
    };
}

terminals! {
    Task = "task",
    Call = "call",
    Workflow = "workflow",
    Import = "import",
    Input = "input",
    Output = "output",
    As = "as",
    If = "if",
    Then = "then",
    Else = "else",
    While = "while",
    Runtime = "runtime",
    Scatter = "scatter",
    In = "in",
    RawCommand = "raw_command",
    ParameterMeta = "parameter_meta",
    Meta = "meta",
    Boolean = "boolean",
    Object = "object",
    Type = "type",
    Identifier = "identifier",
    Fqn = "fqn",
    Colon = "colon",
    Comma = "comma",
    DoubleEqual = "double_equal",
    DoublePipe = "double_pipe",
    DoubleAmpersand = "double_ampersand",
    NotEqual = "not_equal",
    Equal = "equal",
    Dot = "dot",
    Lbrace = "lbrace",
    Rbrace = "rbrace",
    Lparen = "lparen",
    Rparen = "rparen",
    Lsquare = "lsquare",
    Rsquare = "rsquare",
    Plus = "plus",
    Asterisk = "asterisk",
    Dash = "dash",
    Slash = "slash",
    Percent = "percent",
    Lteq = "lteq",
    Lt = "lt",
    Gteq = "gteq",
    Gt = "gt",
    Not = "not",
    Qmark = "qmark",
    String = "string",
    Float = "float",
    Integer = "integer",
    RawCmdStart = "raw_cmd_start",
    RawCmdEnd = "raw_cmd_end",
    CmdPart = "cmd_part",
    CmdParamStart = "cmd_param_start",
    CmdParamEnd = "cmd_param_end",
    CmdAttrHint = "cmd_attr_hint",
}

impl TokenKind {
    pub fn id(self) -> TerminalId {
        TerminalId::new(self as usize)
    }
    pub fn from_id(id: TerminalId) -> Option<TokenKind> {
        TokenKind::ALL.get(id.index()).copied()
    }
    pub fn from_name(name: &str) -> Option<TokenKind> {
        TokenKind::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

impl From<TokenKind> for TerminalId {
    fn from(kind: TokenKind) -> TerminalId {
        kind.id()
    }
}

impl From<TokenKind> for Symbol {
    fn from(kind: TokenKind) -> Symbol {
        Symbol::Terminal(kind.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_declaration_order() {
        for (index, &kind) in TokenKind::ALL.iter().enumerate() {
            assert_eq!(kind.id().index(), index);
            assert_eq!(TokenKind::from_id(kind.id()), Some(kind));
            assert_eq!(TokenKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(TokenKind::from_id(TerminalId::new(TokenKind::ALL.len())), None);
    }
}
