//! The `include` primitive: the standard-library module loader.

use crate::{
    args::ArgValues,
    exception_private::{RunResult, SchemeError},
    io::{InputPort, PrintWriter},
    modules,
    value::Value,
    vm::Vm,
};

/// `(include "module-name")` - runs the named module's bootstrap, which
/// binds its procedures into the global environment. Unknown names are an
/// error; including a module twice just rebinds.
pub fn include(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Option<Value>> {
    let value = args.get_one("include", vm.heap)?;
    let name = value.string_text(vm.heap, vm.interns).map(ToOwned::to_owned);
    let kind = value.kind_name(vm.heap);
    value.drop_with_heap(vm.heap);
    match name {
        Some(name) => {
            modules::include_module(vm, &name)?;
            Ok(None)
        }
        None => Err(SchemeError::wrong_operand("include", "a module-name string", kind)),
    }
}
