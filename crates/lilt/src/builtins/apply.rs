//! The `apply` primitive.

use crate::{
    args::ArgValues,
    exception_private::{RunResult, SchemeError},
    io::{InputPort, PrintWriter},
    value::Value,
    vm::Vm,
};

/// `(apply procedure argument-sequence)` - calls the procedure with the
/// sequence's elements as its arguments. The result may be valueless
/// (e.g. applying `print`), which propagates as "no value" exactly like a
/// direct call.
pub fn apply(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Option<Value>> {
    let (proc, arg_list) = args.get_two("apply", vm.heap)?;
    if !proc.is_procedure(vm.heap) {
        let got = proc.kind_name(vm.heap);
        let err = SchemeError::wrong_operand("apply", "a procedure", got);
        proc.drop_with_heap(vm.heap);
        arg_list.drop_with_heap(vm.heap);
        return Err(err);
    }
    let values = match crate::modules::seq::list_values(vm.heap, &arg_list, "apply") {
        Ok(values) => values,
        Err(err) => {
            proc.drop_with_heap(vm.heap);
            arg_list.drop_with_heap(vm.heap);
            return Err(err);
        }
    };
    arg_list.drop_with_heap(vm.heap);
    vm.apply_values(proc, values)
}
