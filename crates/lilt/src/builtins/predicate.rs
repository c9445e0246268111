//! Type predicates and `not`.

use crate::{
    args::ArgValues,
    exception_private::RunResult,
    heap::HeapData,
    io::{InputPort, PrintWriter},
    value::Value,
    vm::Vm,
};

fn predicate<P: PrintWriter, I: InputPort>(
    vm: &mut Vm<'_, P, I>,
    args: ArgValues,
    name: &str,
    holds: impl FnOnce(&Value, &Vm<'_, P, I>) -> bool,
) -> RunResult<Value> {
    let value = args.get_one(name, vm.heap)?;
    let result = holds(&value, vm);
    value.drop_with_heap(vm.heap);
    Ok(Value::Bool(result))
}

/// `(string? object)`.
pub fn is_string(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    predicate(vm, args, "string?", |value, vm| {
        value.string_text(vm.heap, vm.interns).is_some()
    })
}

/// `(symbol? object)`.
pub fn is_symbol(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    predicate(vm, args, "symbol?", |value, vm| {
        value.symbol_text(vm.heap, vm.interns).is_some()
    })
}

/// `(number? object)`.
pub fn is_number(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    predicate(vm, args, "number?", |value, _| {
        matches!(value, Value::Int(_) | Value::Float(_))
    })
}

/// `(pair? object)`.
pub fn is_pair(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    predicate(vm, args, "pair?", |value, vm| {
        value
            .ref_id()
            .is_some_and(|id| matches!(vm.heap.get(id), HeapData::Pair(_)))
    })
}

/// `(null? object)`.
pub fn is_null(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    predicate(vm, args, "null?", |value, _| matches!(value, Value::Nil))
}

/// `(not object)` - `#t` only for `#f`.
pub fn not(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    predicate(vm, args, "not", |value, _| !value.is_truthy())
}
