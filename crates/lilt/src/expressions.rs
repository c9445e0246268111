//! The closure tree: the analyzer's output and the evaluator's input.
//!
//! Each node carries exactly the state its execution needs, precomputed at
//! analyze time. Execution is a pure walk of this tree against an
//! environment; nothing re-parses or re-dispatches on source shape.

use crate::intern::{FunctionId, StringId};

/// Source location of a node: script name and 1-based line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CodeLoc {
    pub filename: StringId,
    pub line: u32,
}

/// A closure-tree node with its source location.
#[derive(Debug)]
pub(crate) struct NodeLoc {
    pub loc: CodeLoc,
    pub node: Node,
}

impl NodeLoc {
    pub fn new(loc: CodeLoc, node: Node) -> Self {
        Self { loc, node }
    }

    /// True if executing this node in tail position may keep the tail-call
    /// flag alive. Only conditionals and applications are "real" tail
    /// forms; everything else produces its value directly.
    pub fn keeps_tail_position(&self) -> bool {
        matches!(self.node, Node::If { .. } | Node::Apply { .. })
    }
}

/// A compiled expression.
#[derive(Debug)]
pub(crate) enum Node {
    /// Self-evaluating literal (integer, float, string).
    Literal(Literal),
    /// Variable reference, resolved against the environment at run time.
    VarRef(StringId),
    /// `(quote datum)` - the datum was pre-converted at analyze time and
    /// is rebuilt fresh on every execution. Nothing inside is evaluated.
    Quote(Datum),
    /// `(quasiquote datum)` - like `Quote`, but `(unquote x)` sub-forms
    /// were analyzed as ordinary expressions and are evaluated and spliced
    /// in at the corresponding position.
    Quasiquote(Datum),
    /// `(set! name expr)`.
    Assign { name: StringId, expr: Box<NodeLoc> },
    /// `(define name expr)`. The sugared procedure form was already
    /// rewritten to `define` + `lambda`.
    Define { name: StringId, expr: Box<NodeLoc> },
    /// `(lambda params body…)` - the spec lives in the shared function
    /// table; execution captures the current environment.
    Lambda(FunctionId),
    /// `(if test then [else])`.
    If {
        test: Box<NodeLoc>,
        then: Box<NodeLoc>,
        orelse: Option<Box<NodeLoc>>,
    },
    /// `(begin …)` and desugared bodies.
    Sequence(Vec<NodeLoc>),
    /// `(and …)`: value of the first false clause, else the last clause.
    And(Vec<NodeLoc>),
    /// `(or …)`: value of the first true clause, else `#f`.
    Or(Vec<NodeLoc>),
    /// Procedure application. `rendered` is the canonical source text,
    /// recorded in the diagnostic backtrace while the call is in flight.
    Apply {
        target: Box<NodeLoc>,
        args: Vec<NodeLoc>,
        rendered: Box<str>,
    },
}

/// A literal produced purely by the analyzer.
///
/// Literals are detached from the runtime heap; they become real values
/// (participating in reference counting) only when executed.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Literal {
    Int(i64),
    Float(f64),
    /// Interned, escape-decoded string content (quotes stripped).
    Str(StringId),
}

/// A pre-converted quoted datum.
///
/// Plain `quote` data never contains `Unquote`; the quasiquote analyzer
/// inserts it wherever an `(unquote x)` form appeared.
#[derive(Debug)]
pub(crate) enum Datum {
    Int(i64),
    Float(f64),
    Str(StringId),
    Symbol(StringId),
    /// A list-builder: produces a fresh proper list at execution time.
    List(Vec<Datum>),
    /// An analyzed expression to evaluate and splice in place.
    Unquote(Box<NodeLoc>),
}

/// A lambda's compiled spec, stored once in the shared function table.
///
/// All compound procedures created from one `lambda` expression share this
/// data; only the captured environment differs per instance.
#[derive(Debug)]
pub(crate) struct Lambda {
    /// Definition name when the lambda came from `(define (f …) …)`;
    /// used for procedure display.
    pub name: Option<StringId>,
    /// Parameter names in positional order, rest-parameter last.
    pub params: Vec<StringId>,
    /// True when the last parameter collects remaining arguments into a
    /// list (`(a b . rest)` or a bare-symbol parameter list).
    pub variadic: bool,
    /// The body, always a `Sequence`.
    pub body: NodeLoc,
}
