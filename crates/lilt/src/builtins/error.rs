//! The `error` primitive.

use crate::{
    args::ArgValues,
    exception_private::{ErrorKind, RunResult, SchemeError},
    io::{InputPort, PrintWriter},
    value::Value,
    vm::Vm,
};

/// `(error object1 [object2] …)` - renders the values space-separated as
/// the message and raises. There is no recovery mechanism; the run ends
/// with the message and a backtrace.
pub fn error(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Option<Value>> {
    let values = args.at_least("error", 1, vm.heap)?;
    let mut message = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            message.push(' ');
        }
        value.write(&mut message, vm.heap, vm.interns);
    }
    for value in values {
        value.drop_with_heap(vm.heap);
    }
    Err(SchemeError::new(ErrorKind::UserRaised, message))
}
