//! The evaluator: executes a closure tree against an environment.
//!
//! The `Vm` owns all per-run interpreter state - the tail-call flag
//! machine, the saved-call slot, and the diagnostic backtrace - so
//! independent interpreter instances never interfere (and tests can run
//! many of them).

use std::collections::VecDeque;

use crate::{
    args::ArgValues,
    env,
    env::Frame,
    exception_private::{RunResult, SchemeError},
    exception_public::StackFrame,
    expressions::{CodeLoc, Datum, Literal, Node, NodeLoc},
    heap::{Heap, HeapData, HeapId},
    intern::{FunctionId, Interns, StaticStrings, StringId},
    io::{InputPort, PrintWriter},
    value::{Closure, Value, allocate_list},
};

/// Recorded frames beyond this bound are dropped (outermost first) and
/// reported as a count, keeping diagnostics bounded for deep recursion.
const BACKTRACE_MAX_FRAMES: usize = 128;

/// One in-flight application, as recorded by the backtrace.
#[derive(Debug, Clone, Copy)]
struct BacktraceEntry<'a> {
    loc: CodeLoc,
    rendered: &'a str,
}

/// Bounded stack of in-flight applications.
///
/// A tail call substitutes the top entry instead of pushing - the whole
/// point of the trampoline is that the stack must not grow.
#[derive(Debug, Default)]
struct Backtrace<'a> {
    frames: VecDeque<BacktraceEntry<'a>>,
    dropped: usize,
}

impl<'a> Backtrace<'a> {
    fn push(&mut self, entry: BacktraceEntry<'a>) {
        if self.frames.len() == BACKTRACE_MAX_FRAMES {
            self.frames.pop_front();
            self.dropped += 1;
        }
        self.frames.push_back(entry);
    }

    fn pop(&mut self) {
        if self.frames.pop_back().is_none() {
            self.dropped = self.dropped.saturating_sub(1);
        }
    }

    fn substitute_top(&mut self, entry: BacktraceEntry<'a>) {
        if let Some(top) = self.frames.back_mut() {
            *top = entry;
        }
    }
}

/// State saved by a tail call for the evaluator loop to consume.
#[derive(Debug)]
struct SavedCall<'a> {
    env: HeapId,
    function: FunctionId,
    expr: Option<BacktraceEntry<'a>>,
}

/// The evaluator.
///
/// Borrows the heap, the frozen interns (strings + lambda table), and the
/// output/input ports for the duration of one run.
pub(crate) struct Vm<'a, P: PrintWriter, I: InputPort> {
    pub heap: &'a mut Heap,
    pub interns: &'a Interns,
    pub print: &'a mut P,
    pub input: &'a mut I,
    /// The process-global environment; `include` binds module procedures
    /// here regardless of the environment the call executed in.
    pub global_env: HeapId,
    tco_allow: bool,
    tco_saved: Option<SavedCall<'a>>,
    backtrace: Backtrace<'a>,
}

impl<'a, P: PrintWriter, I: InputPort> Vm<'a, P, I> {
    pub fn new(
        heap: &'a mut Heap,
        interns: &'a Interns,
        print: &'a mut P,
        input: &'a mut I,
        global_env: HeapId,
    ) -> Self {
        Self {
            heap,
            interns,
            print,
            input,
            global_env,
            tco_allow: false,
            tco_saved: None,
            backtrace: Backtrace::default(),
        }
    }

    /// Converts the live backtrace for error reporting, innermost first.
    pub fn backtrace_frames(&self) -> (Vec<StackFrame>, usize) {
        let frames = self
            .backtrace
            .frames
            .iter()
            .rev()
            .map(|entry| StackFrame {
                filename: self.interns.get_str(entry.loc.filename).to_owned(),
                line: entry.loc.line,
                rendered: entry.rendered.to_owned(),
            })
            .collect();
        (frames, self.backtrace.dropped)
    }

    /// Executes one node. `Ok(None)` means "no meaningful value produced"
    /// (a successful `define` or `set!`, or an `if` with no alternative).
    pub fn execute(&mut self, node: &'a NodeLoc, env: HeapId) -> RunResult<Option<Value>> {
        match &node.node {
            Node::Literal(literal) => Ok(Some(match *literal {
                Literal::Int(v) => Value::Int(v),
                Literal::Float(v) => Value::Float(v),
                Literal::Str(id) => Value::InternString(id),
            })),
            Node::VarRef(name) => {
                // the placeholder name evaluates to the sentinel itself
                if *name == StringId::from(StaticStrings::Unassigned) {
                    return Ok(Some(Value::Unassigned));
                }
                env::lookup(self.heap, env, *name, self.interns).map(Some)
            }
            Node::Quote(datum) | Node::Quasiquote(datum) => self.build_datum(datum, env).map(Some),
            Node::Assign { name, expr } => {
                let value = self.execute_operand(expr, env)?;
                env::set_existing(self.heap, env, *name, value, self.interns)?;
                Ok(None)
            }
            Node::Define { name, expr } => {
                let value = self.execute_operand(expr, env)?;
                env::define(self.heap, env, *name, value)?;
                Ok(None)
            }
            Node::Lambda(function) => {
                self.heap.inc_ref(env);
                let id = self.heap.allocate(HeapData::Closure(Closure {
                    function: *function,
                    env,
                }));
                Ok(Some(Value::Ref(id)))
            }
            Node::If { test, then, orelse } => {
                let test_value = self.execute_operand(test, env)?;
                let truthy = test_value.is_truthy();
                test_value.drop_with_heap(self.heap);
                if truthy {
                    self.execute_branch(then, env)
                } else if let Some(orelse) = orelse {
                    self.execute_branch(orelse, env)
                } else {
                    Ok(None)
                }
            }
            Node::Sequence(clauses) => {
                let (last, rest) = clauses.split_last().expect("sequence is non-empty");
                for clause in rest {
                    if let Some(value) = self.execute_no_tco(clause, env)? {
                        value.drop_with_heap(self.heap);
                    }
                }
                self.execute_branch(last, env)
            }
            Node::And(clauses) => {
                let (last, rest) = clauses.split_last().expect("and is non-empty");
                for clause in rest {
                    let value = self.execute_operand(clause, env)?;
                    if !value.is_truthy() {
                        return Ok(Some(value));
                    }
                    value.drop_with_heap(self.heap);
                }
                self.execute_operand(last, env).map(Some)
            }
            Node::Or(clauses) => {
                let (last, rest) = clauses.split_last().expect("or is non-empty");
                for clause in rest {
                    let value = self.execute_operand(clause, env)?;
                    if value.is_truthy() {
                        return Ok(Some(value));
                    }
                    value.drop_with_heap(self.heap);
                }
                self.execute_operand(last, env).map(Some)
            }
            Node::Apply { target, args, rendered } => {
                let entry = BacktraceEntry {
                    loc: node.loc,
                    rendered: &**rendered,
                };
                let proc = self.execute_operand(target, env)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    match self.execute_operand(arg, env) {
                        Ok(value) => values.push(value),
                        Err(err) => {
                            proc.drop_with_heap(self.heap);
                            for value in values {
                                value.drop_with_heap(self.heap);
                            }
                            return Err(err);
                        }
                    }
                }
                self.apply(proc, values, Some(entry))
            }
        }
    }

    /// Executes with the tail-call flag suspended; used for predicates,
    /// operands, and every other non-tail position.
    fn execute_no_tco(&mut self, node: &'a NodeLoc, env: HeapId) -> RunResult<Option<Value>> {
        let saved = std::mem::replace(&mut self.tco_allow, false);
        let result = self.execute(node, env);
        self.tco_allow = saved;
        result
    }

    /// Like `execute_no_tco`, but a missing value is an error.
    fn execute_operand(&mut self, node: &'a NodeLoc, env: HeapId) -> RunResult<Value> {
        match self.execute_no_tco(node, env)? {
            Some(value) => Ok(value),
            None => Err(SchemeError::type_mismatch("expression produced no value")),
        }
    }

    /// Executes a chosen branch or sequence tail. Only conditionals and
    /// applications keep the tail-call flag alive.
    fn execute_branch(&mut self, node: &'a NodeLoc, env: HeapId) -> RunResult<Option<Value>> {
        if node.keeps_tail_position() {
            self.execute(node, env)
        } else {
            self.execute_no_tco(node, env)
        }
    }

    /// Rebuilds a pre-converted quoted datum as a fresh value, evaluating
    /// unquoted sub-expressions in `env`.
    fn build_datum(&mut self, datum: &'a Datum, env: HeapId) -> RunResult<Value> {
        match datum {
            Datum::Int(v) => Ok(Value::Int(*v)),
            Datum::Float(v) => Ok(Value::Float(*v)),
            Datum::Str(id) => Ok(Value::InternString(*id)),
            Datum::Symbol(id) => Ok(Value::InternSymbol(*id)),
            Datum::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match self.build_datum(item, env) {
                        Ok(value) => values.push(value),
                        Err(err) => {
                            for value in values {
                                value.drop_with_heap(self.heap);
                            }
                            return Err(err);
                        }
                    }
                }
                Ok(allocate_list(self.heap, values))
            }
            Datum::Unquote(node) => self.execute_operand(node, env),
        }
    }

    /// Applies a procedure to evaluated arguments.
    ///
    /// Primitive calls run with the tail-call flag suspended. Compound
    /// calls follow the trampoline protocol (see `apply_compound`).
    fn apply(
        &mut self,
        proc: Value,
        args: Vec<Value>,
        entry: Option<BacktraceEntry<'a>>,
    ) -> RunResult<Option<Value>> {
        if let Some(entry) = entry {
            self.backtrace.push(entry);
        }
        let result = match &proc {
            Value::Builtin(builtin) => {
                let builtin = *builtin;
                let saved = std::mem::replace(&mut self.tco_allow, false);
                let result = builtin.call(self, ArgValues::new(args));
                self.tco_allow = saved;
                result
            }
            Value::ModuleFunction(function) => {
                let function = *function;
                let saved = std::mem::replace(&mut self.tco_allow, false);
                let result = function.call(self, ArgValues::new(args));
                self.tco_allow = saved;
                result
            }
            Value::Ref(id) if matches!(self.heap.get(*id), HeapData::Closure(_)) => {
                let closure_id = *id;
                return self.apply_compound(closure_id, proc, args, entry);
            }
            other => {
                let description = other.to_display_string(self.heap, self.interns);
                for value in args {
                    value.drop_with_heap(self.heap);
                }
                proc.drop_with_heap(self.heap);
                return Err(SchemeError::type_mismatch(format!("{description} is not a procedure")));
            }
        };
        if result.is_ok() && entry.is_some() {
            self.backtrace.pop();
        }
        result
    }

    /// Applies a procedure from inside a primitive, keeping a valueless
    /// result. Used by the `apply` builtin, where a valueless callee
    /// result propagates exactly like a direct call's.
    pub fn apply_values(&mut self, proc: Value, args: Vec<Value>) -> RunResult<Option<Value>> {
        self.apply(proc, args, None)
    }

    /// Calls a procedure from inside a primitive (`apply`, `map`, `sort`,
    /// …). The caller already suspended the tail-call flag, so the callee
    /// runs its own trampoline. A valueless result is an error here:
    /// primitives always need the value.
    pub fn call_procedure(&mut self, proc: Value, args: Vec<Value>) -> RunResult<Value> {
        match self.apply(proc, args, None)? {
            Some(value) => Ok(value),
            None => Err(SchemeError::type_mismatch("procedure produced no value")),
        }
    }

    /// The compound-procedure path of `apply`, implementing proper tail
    /// calls.
    ///
    /// Arity is reconciled, a fresh frame binds parameters to arguments
    /// (collecting a variadic tail into a list), and the captured
    /// environment is extended. Then the trampoline: if the tail-call flag
    /// is already set, store the saved call and return without evaluating -
    /// the outer evaluator loop below picks it up, releases the old
    /// environment, and re-enters the body. Self- and mutual recursion in
    /// tail position run in constant host-stack space.
    fn apply_compound(
        &mut self,
        closure_id: HeapId,
        proc: Value,
        args: Vec<Value>,
        entry: Option<BacktraceEntry<'a>>,
    ) -> RunResult<Option<Value>> {
        let (function, captured_env) = match self.heap.get(closure_id) {
            HeapData::Closure(closure) => (closure.function, closure.env),
            _ => unreachable!("apply_compound on non-closure"),
        };
        let interns = self.interns;
        let lambda = interns.get_function(function);

        // reconcile arity
        let param_count = lambda.params.len();
        let fixed = if lambda.variadic { param_count - 1 } else { param_count };
        let arity_ok = if lambda.variadic {
            args.len() >= fixed
        } else {
            args.len() == param_count
        };
        if !arity_ok {
            let got = args.len();
            let name = match lambda.name {
                Some(name) => interns.get_str(name).to_owned(),
                None => "lambda".to_owned(),
            };
            for value in args {
                value.drop_with_heap(self.heap);
            }
            proc.drop_with_heap(self.heap);
            let expected = if lambda.variadic {
                format!("at least {fixed}")
            } else {
                format!("{param_count}")
            };
            return Err(SchemeError::arity_mismatch(format!(
                "{name}: expected {expected} arguments, got {got}"
            )));
        }

        // bind parameters into a fresh frame and extend the captured env
        // the analyzer guarantees unique parameter names, so binding into
        // the fresh frame cannot fail or replace
        let mut frame = Frame::with_capacity(param_count);
        let mut values = args.into_iter();
        for &param in &lambda.params[..fixed] {
            let value = values.next().expect("arity checked");
            let _ = frame.add_or_update(param, value);
        }
        if lambda.variadic {
            let rest: Vec<Value> = values.collect();
            let rest_list = allocate_list(self.heap, rest);
            let _ = frame.add_or_update(lambda.params[fixed], rest_list);
        }
        let new_env = env::extend(self.heap, captured_env, frame);
        proc.drop_with_heap(self.heap);

        // tail-call protocol: if the flag is already set, save and return
        // without evaluating
        if self.tco_allow {
            self.tco_saved = Some(SavedCall {
                env: new_env,
                function,
                expr: entry,
            });
            if entry.is_some() {
                self.backtrace.pop();
            }
            return Ok(None);
        }

        // evaluator loop: run the body, consuming saved tail calls until
        // none occurs
        self.tco_allow = true;
        let mut current_env = new_env;
        let mut body = &lambda.body;
        let result = loop {
            let result = self.execute(body, current_env);
            match self.tco_saved.take() {
                Some(saved) => {
                    debug_assert!(
                        matches!(result, Ok(None)),
                        "a saved tail call returns without a value"
                    );
                    self.heap.dec_ref(current_env);
                    current_env = saved.env;
                    body = &interns.get_function(saved.function).body;
                    if let Some(expr) = saved.expr {
                        self.backtrace.substitute_top(expr);
                    }
                }
                None => break result,
            }
        };
        self.tco_allow = false;
        self.heap.dec_ref(current_env);
        if result.is_ok() && entry.is_some() {
            self.backtrace.pop();
        }
        result
    }
}
