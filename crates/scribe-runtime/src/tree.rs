use crate::{
    ast::{Ast, Record},
    grammar::{AstTransform, NonterminalRef, TerminalId},
    token::Terminal,
};

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ParseTree {
    Terminal(Terminal),
    Node(Node),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Node {
    pub nonterminal: NonterminalRef,
    pub kind: NodeKind,
    pub children: Vec<ParseTree>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum NodeKind {
    /// Produced by a table driven production or an optional, without a
    /// transform the node stands for its first child.
    Plain { transform: Option<AstTransform> },
    List { separator: Option<TerminalId> },
    /// Produced by a nud rule with `morphemes` children, a `compound` nud
    /// lends its children to the led continuing it.
    Prefix {
        transform: AstTransform,
        morphemes: usize,
        operator: bool,
        compound: bool,
    },
    /// Produced by a led rule, the first child is the left operand.
    Infix {
        transform: AstTransform,
        binary: bool,
    },
}

impl ParseTree {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            ParseTree::Node(node) => Some(node),
            ParseTree::Terminal(_) => None,
        }
    }
    pub fn as_terminal(&self) -> Option<&Terminal> {
        match self {
            ParseTree::Terminal(terminal) => Some(terminal),
            ParseTree::Node(_) => None,
        }
    }

    pub fn to_ast(&self) -> Option<Ast> {
        match self {
            ParseTree::Terminal(terminal) => Some(Ast::Terminal(terminal.clone())),
            ParseTree::Node(node) => node.to_ast(),
        }
    }

    /// Leaf tokens in source order.
    pub fn terminals(&self) -> Vec<&Terminal> {
        let mut out = Vec::new();
        self.collect_terminals(&mut out);
        out
    }
    fn collect_terminals<'a>(&'a self, out: &mut Vec<&'a Terminal>) {
        match self {
            ParseTree::Terminal(terminal) => out.push(terminal),
            ParseTree::Node(node) => {
                for child in &node.children {
                    child.collect_terminals(out);
                }
            }
        }
    }
}

impl Node {
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn to_ast(&self) -> Option<Ast> {
        match &self.kind {
            // list items are not nullable, a child without an AST leaves no item
            NodeKind::List { separator } => {
                let items = self
                    .children
                    .iter()
                    .filter(|child| match child {
                        ParseTree::Terminal(t) => Some(t.id) != *separator,
                        ParseTree::Node(_) => true,
                    })
                    .filter_map(ParseTree::to_ast)
                    .collect();
                Some(Ast::List(items))
            }
            NodeKind::Plain { transform } => {
                match transform {
                    None => self.children.first()?.to_ast(),
                    Some(AstTransform::Substitution(index)) => self.children.get(*index)?.to_ast(),
                    Some(AstTransform::NodeCreator { name, fields }) => {
                        let fields = fields
                            .iter()
                            .map(|(field, index)| {
                                let value = self.children.get(*index).and_then(ParseTree::to_ast);
                                (field.clone(), value)
                            })
                            .collect();
                        Some(Ast::Record(Record {
                            name: name.clone(),
                            fields,
                        }))
                    }
                }
            }
            NodeKind::Prefix { transform, .. } | NodeKind::Infix { transform, .. } => {
                match transform {
                    AstTransform::Substitution(index) => self.expression_child(*index)?.to_ast(),
                    AstTransform::NodeCreator { name, fields } => {
                        let fields = fields
                            .iter()
                            .map(|(field, index)| {
                                let value =
                                    self.expression_child(*index).and_then(ParseTree::to_ast);
                                (field.clone(), value)
                            })
                            .collect();
                        Some(Ast::Record(Record {
                            name: name.clone(),
                            fields,
                        }))
                    }
                }
            }
        }
    }

    /// Resolves a transform index of an expression node.
    ///
    /// A mixfix led whose left operand came from a compound nud counts the
    /// nud's children as its own leading positions, any other left operand
    /// is the whole subtree at index 0. A node that holds a single token
    /// resolves every index to that token.
    fn expression_child(&self, index: usize) -> Option<&ParseTree> {
        if let NodeKind::Infix { binary: false, .. } = self.kind {
            if let Some(ParseTree::Node(first)) = self.children.first() {
                if let NodeKind::Prefix {
                    morphemes,
                    compound: true,
                    ..
                } = first.kind
                {
                    if index < morphemes {
                        return first.children.get(index);
                    }
                    return self.children.get(index - morphemes + 1);
                }
            }
        }

        if let [only @ ParseTree::Terminal(_)] = self.children.as_slice() {
            return Some(only);
        }

        self.children.get(index)
    }
}
