use std::fmt::{Display, Formatter, Result};

use crate::{
    ast::Ast,
    tree::{Node, NodeKind, ParseTree},
};

fn indent(f: &mut Formatter<'_>, depth: usize) -> Result {
    for _ in 0..depth {
        f.write_str("  ")?;
    }
    Ok(())
}

impl Display for ParseTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        display_tree(self, f, 0)
    }
}

fn display_tree(tree: &ParseTree, f: &mut Formatter<'_>, depth: usize) -> Result {
    match tree {
        ParseTree::Terminal(terminal) => write!(f, "{terminal}"),
        ParseTree::Node(node) => display_node(node, f, depth),
    }
}

fn display_node(node: &Node, f: &mut Formatter<'_>, depth: usize) -> Result {
    let (open, close) = match node.kind {
        NodeKind::List { .. } => ('[', ']'),
        _ => ('(', ')'),
    };
    write!(f, "{open}{}:", node.nonterminal.name)?;
    if node.children.is_empty() {
        return write!(f, " {close}");
    }
    for (i, child) in node.children.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        f.write_str("\n")?;
        indent(f, depth + 1)?;
        display_tree(child, f, depth + 1)?;
    }
    f.write_str("\n")?;
    indent(f, depth)?;
    write!(f, "{close}")
}

/// Multi-line rendering, terminals are written in their full positioned form.
impl Display for Ast {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        display_ast(Some(self), f, 0)
    }
}

fn display_ast(ast: Option<&Ast>, f: &mut Formatter<'_>, depth: usize) -> Result {
    match ast {
        None => f.write_str("None"),
        Some(Ast::Terminal(terminal)) => write!(f, "{terminal}"),
        Some(Ast::List(items)) => {
            if items.is_empty() {
                return f.write_str("[]");
            }
            f.write_str("[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                f.write_str("\n")?;
                indent(f, depth + 1)?;
                display_ast(Some(item), f, depth + 1)?;
            }
            f.write_str("\n")?;
            indent(f, depth)?;
            f.write_str("]")
        }
        Some(Ast::Record(record)) => {
            write!(f, "({}:", record.name)?;
            for (i, (name, value)) in record.fields.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                f.write_str("\n")?;
                indent(f, depth + 1)?;
                write!(f, "{name}=")?;
                display_ast(value.as_ref(), f, depth + 1)?;
            }
            f.write_str("\n")?;
            indent(f, depth)?;
            f.write_str(")")
        }
    }
}

/// Single line rendering returned by [`Ast::compact`].
pub struct Compact<'a>(&'a Ast);

impl Ast {
    /// `Name(field=value, ...)` with terminals reduced to their text.
    pub fn compact(&self) -> Compact<'_> {
        Compact(self)
    }
}

impl Display for Compact<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.0 {
            Ast::Terminal(terminal) => f.write_str(&terminal.text),
            Ast::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item.compact())?;
                }
                f.write_str("]")
            }
            Ast::Record(record) => {
                write!(f, "{}(", record.name)?;
                for (i, (name, value)) in record.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match value {
                        Some(value) => write!(f, "{name}={}", value.compact())?,
                        None => write!(f, "{name}=None")?,
                    }
                }
                f.write_str(")")
            }
        }
    }
}
