//! The "symbol" module: symbol construction.

use crate::{
    args::ArgValues,
    env,
    exception_private::{RunResult, SchemeError},
    heap::HeapData,
    intern::StaticStrings,
    io::{InputPort, PrintWriter},
    modules::ModuleFunctions,
    value::{Value, write_float},
    vm::Vm,
};

/// Binds every "symbol" procedure into the global environment.
pub(crate) fn bind(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>) -> RunResult<()> {
    use StaticStrings as S;
    let bindings = [
        (S::Symbol, ModuleFunctions::Symbol),
        (S::SymbolAppend, ModuleFunctions::SymbolAppend),
    ];
    for (name, function) in bindings {
        env::define(vm.heap, vm.global_env, name.into(), Value::ModuleFunction(function))?;
    }
    Ok(())
}

/// `(symbol number/symbol/string)` - a fresh symbol carrying the
/// argument's text.
pub fn symbol(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let value = args.get_one("symbol", vm.heap)?;
    let text = match &value {
        Value::Int(v) => Some(v.to_string()),
        Value::Float(v) => {
            let mut text = String::new();
            write_float(&mut text, *v);
            Some(text)
        }
        other => other
            .symbol_text(vm.heap, vm.interns)
            .or_else(|| other.string_text(vm.heap, vm.interns))
            .map(ToOwned::to_owned),
    };
    let kind = value.kind_name(vm.heap);
    value.drop_with_heap(vm.heap);
    match text {
        Some(text) => Ok(Value::Ref(vm.heap.allocate(HeapData::Symbol(text)))),
        None => Err(SchemeError::wrong_operand(
            "symbol",
            "a number, symbol or string",
            kind,
        )),
    }
}

/// `(symbol-append symbol1 [symbol2] …)`.
pub fn symbol_append(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let values = args.at_least("symbol-append", 1, vm.heap)?;
    let mut text = String::new();
    let mut failure: Option<&'static str> = None;
    for value in &values {
        match value.symbol_text(vm.heap, vm.interns) {
            Some(part) => text.push_str(part),
            None => {
                failure = Some(value.kind_name(vm.heap));
                break;
            }
        }
    }
    for value in values {
        value.drop_with_heap(vm.heap);
    }
    match failure {
        None => Ok(Value::Ref(vm.heap.allocate(HeapData::Symbol(text)))),
        Some(kind) => Err(SchemeError::wrong_operand("symbol-append", "a symbol", kind)),
    }
}
