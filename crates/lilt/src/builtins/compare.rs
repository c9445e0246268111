//! Comparison primitives: `=`, the ordering family, `eq?`, `equal?`.

use std::cmp::Ordering;

use crate::{
    args::ArgValues,
    builtins::{Builtins, num::Num},
    exception_private::{RunResult, SchemeError},
    io::{InputPort, PrintWriter},
    value::Value,
    vm::Vm,
};

fn as_num(value: &Value) -> Option<Num> {
    match value {
        Value::Int(v) => Some(Num::Int(*v)),
        Value::Float(v) => Some(Num::Float(*v)),
        _ => None,
    }
}

/// Compares two numbers, exact for integer pairs and promoted to doubles
/// otherwise. `None` means unordered (a NaN operand); every comparison is
/// then false.
fn num_cmp(a: Num, b: Num) -> Option<Ordering> {
    match (a, b) {
        (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
        _ => a.as_f64().partial_cmp(&b.as_f64()),
    }
}

/// `(= a b)`, `(> a b)`, `(>= a b)`, `(< a b)`, `(<= a b)`.
pub fn numeric(
    vm: &mut Vm<'_, impl PrintWriter, impl InputPort>,
    args: ArgValues,
    which: Builtins,
) -> RunResult<Value> {
    let name = which.to_string();
    let (a, b) = args.get_two(&name, vm.heap)?;
    let nums = match (as_num(&a), as_num(&b)) {
        (Some(x), Some(y)) => Ok((x, y)),
        (None, _) => Err(SchemeError::wrong_operand(&name, "a number", a.kind_name(vm.heap))),
        (_, None) => Err(SchemeError::wrong_operand(&name, "a number", b.kind_name(vm.heap))),
    };
    a.drop_with_heap(vm.heap);
    b.drop_with_heap(vm.heap);
    let (x, y) = nums?;
    let ordering = num_cmp(x, y);
    let holds = match which {
        Builtins::NumEqual => ordering == Some(Ordering::Equal),
        Builtins::GreaterThan => ordering == Some(Ordering::Greater),
        Builtins::GreaterEqual => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        Builtins::LessThan => ordering == Some(Ordering::Less),
        Builtins::LessEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        _ => unreachable!("numeric comparison dispatched for {which}"),
    };
    Ok(Value::Bool(holds))
}

/// `(eq? a b)` - equality of symbols and strings by text, booleans by
/// identity. Other operand kinds are a type error.
pub fn text_equal(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let (a, b) = args.get_two("eq?", vm.heap)?;
    let result = match (&a, &b) {
        (Value::Bool(x), Value::Bool(y)) => Ok(Value::Bool(x == y)),
        _ => text_of_pair(&a, &b, vm, "eq?"),
    };
    a.drop_with_heap(vm.heap);
    b.drop_with_heap(vm.heap);
    result
}

/// `(equal? a b)` - numbers across kinds, symbols and strings by text.
pub fn equal(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let (a, b) = args.get_two("equal?", vm.heap)?;
    let result = match (as_num(&a), as_num(&b)) {
        (Some(x), Some(y)) => Ok(Value::Bool(num_cmp(x, y) == Some(Ordering::Equal))),
        _ => text_of_pair(&a, &b, vm, "equal?"),
    };
    a.drop_with_heap(vm.heap);
    b.drop_with_heap(vm.heap);
    result
}

/// Text comparison shared by `eq?` and `equal?`: both operands must be
/// symbols or strings.
fn text_of_pair(
    a: &Value,
    b: &Value,
    vm: &Vm<'_, impl PrintWriter, impl InputPort>,
    name: &str,
) -> RunResult<Value> {
    let text_a = a
        .symbol_text(vm.heap, vm.interns)
        .or_else(|| a.string_text(vm.heap, vm.interns));
    let text_b = b
        .symbol_text(vm.heap, vm.interns)
        .or_else(|| b.string_text(vm.heap, vm.interns));
    match (text_a, text_b) {
        (Some(x), Some(y)) => Ok(Value::Bool(x == y)),
        (None, _) => Err(SchemeError::wrong_operand(
            name,
            "symbols, strings or booleans",
            a.kind_name(vm.heap),
        )),
        (_, None) => Err(SchemeError::wrong_operand(
            name,
            "symbols, strings or booleans",
            b.kind_name(vm.heap),
        )),
    }
}
