//! The printing primitives: `print`, `printn`, `display`, `newline`.

use crate::{
    args::ArgValues,
    exception_private::{RunResult, SchemeError},
    exception_public::Exception,
    io::{InputPort, PrintWriter},
    value::Value,
    vm::Vm,
};

fn io_error(exception: &Exception) -> crate::exception_private::RunError {
    SchemeError::io_failure(exception.message().to_owned())
}

/// Writes values space-separated, without a terminator.
fn emit(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, values: &[Value]) -> RunResult<()> {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            vm.print.stdout_push(' ').map_err(|e| io_error(&e))?;
        }
        let text = value.to_display_string(vm.heap, vm.interns);
        vm.print.stdout_write(text.into()).map_err(|e| io_error(&e))?;
    }
    Ok(())
}

/// `(print object1 [object2] …)` - at least one value, space-separated,
/// no trailing newline.
pub fn print(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Option<Value>> {
    let values = args.at_least("print", 1, vm.heap)?;
    let result = emit(vm, &values);
    for value in values {
        value.drop_with_heap(vm.heap);
    }
    result.map(|()| None)
}

/// `(printn [object1] …)` - like `print` but accepts zero values and
/// appends a newline.
pub fn printn(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Option<Value>> {
    let values = args.at_least("printn", 0, vm.heap)?;
    let result = emit(vm, &values);
    for value in values {
        value.drop_with_heap(vm.heap);
    }
    result?;
    vm.print.stdout_push('\n').map_err(|e| io_error(&e))?;
    Ok(None)
}

/// `(display object)` - exactly one value, no terminator.
pub fn display(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Option<Value>> {
    let value = args.get_one("display", vm.heap)?;
    let text = value.to_display_string(vm.heap, vm.interns);
    value.drop_with_heap(vm.heap);
    vm.print.stdout_write(text.into()).map_err(|e| io_error(&e))?;
    Ok(None)
}

/// `(newline)`.
pub fn newline(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Option<Value>> {
    args.check_none("newline", vm.heap)?;
    vm.print.stdout_push('\n').map_err(|e| io_error(&e))?;
    Ok(None)
}
