//! The reader's output: symbols and expressions with source lines.

use std::fmt::Write;

/// An AST node. Symbols carry their raw token text (string tokens keep
/// their surrounding quotes so the analyzer can tell them from
/// identifiers); expressions carry their children in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Ast {
    Symbol { text: String, line: u32 },
    Expr { children: Vec<Ast>, line: u32 },
}

impl Ast {
    pub fn symbol(text: impl Into<String>, line: u32) -> Self {
        Self::Symbol {
            text: text.into(),
            line,
        }
    }

    pub fn expr(children: Vec<Self>, line: u32) -> Self {
        Self::Expr { children, line }
    }

    /// 1-based source line this node started on.
    pub fn line(&self) -> u32 {
        match self {
            Self::Symbol { line, .. } | Self::Expr { line, .. } => *line,
        }
    }

    /// The token text, if this node is a symbol.
    pub fn symbol_text(&self) -> Option<&str> {
        match self {
            Self::Symbol { text, .. } => Some(text),
            Self::Expr { .. } => None,
        }
    }

    /// The children, if this node is an expression.
    pub fn children(&self) -> Option<&[Self]> {
        match self {
            Self::Symbol { .. } => None,
            Self::Expr { children, .. } => Some(children),
        }
    }

    /// Canonical source rendering: `symbol`, `()`, `(a b c)`.
    ///
    /// Re-parsing the rendered form yields a structurally equal tree, which
    /// is what makes backtrace output readable and testable.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        match self {
            Self::Symbol { text, .. } => {
                let _ = write!(out, "{text}");
            }
            Self::Expr { children, .. } => {
                out.push('(');
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    child.render_into(out);
                }
                out.push(')');
            }
        }
    }
}
