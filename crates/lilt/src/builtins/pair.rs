//! Pair primitives: `cons`, the accessor family, the field mutators,
//! and `list`.

use crate::{
    args::ArgValues,
    builtins::Builtins,
    exception_private::{RunResult, SchemeError},
    heap::{HeapData, HeapId},
    io::{InputPort, PrintWriter},
    value::{Pair, Value, allocate_list},
    vm::Vm,
};

/// One step of a `c[ad]+r` accessor, in application order (innermost
/// letter first).
#[derive(Debug, Clone, Copy)]
pub(crate) enum Step {
    Car,
    Cdr,
}

/// `(cons new-car new-cdr)`.
pub fn cons(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let (car, cdr) = args.get_two("cons", vm.heap)?;
    let id = vm.heap.allocate(HeapData::Pair(Pair { car, cdr }));
    Ok(Value::Ref(id))
}

/// Shared implementation of `car`, `cdr`, and the two- and three-step
/// accessors: applies each step in turn, failing with the accessor's own
/// name when an intermediate value is not a pair.
pub fn accessor(
    vm: &mut Vm<'_, impl PrintWriter, impl InputPort>,
    args: ArgValues,
    name: Builtins,
    steps: &[Step],
) -> RunResult<Value> {
    let mut value = args.get_one(&name.to_string(), vm.heap)?;
    for step in steps {
        let pair_id = match as_pair_id(&value, vm.heap) {
            Some(id) => id,
            None => {
                let got = value.kind_name(vm.heap);
                let err = SchemeError::wrong_operand(&name.to_string(), "a pair", got);
                value.drop_with_heap(vm.heap);
                return Err(err);
            }
        };
        let next = match vm.heap.get(pair_id) {
            HeapData::Pair(pair) => match step {
                Step::Car => pair.car.clone_with_heap(vm.heap),
                Step::Cdr => pair.cdr.clone_with_heap(vm.heap),
            },
            _ => unreachable!("as_pair_id checked the variant"),
        };
        value.drop_with_heap(vm.heap);
        value = next;
    }
    Ok(value)
}

/// `(set-car! pair new-car)`.
pub fn set_car(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Option<Value>> {
    mutate_field(vm, args, "set-car!", Step::Car)
}

/// `(set-cdr! pair new-cdr)`.
pub fn set_cdr(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Option<Value>> {
    mutate_field(vm, args, "set-cdr!", Step::Cdr)
}

fn mutate_field(
    vm: &mut Vm<'_, impl PrintWriter, impl InputPort>,
    args: ArgValues,
    name: &str,
    field: Step,
) -> RunResult<Option<Value>> {
    let (target, new_value) = args.get_two(name, vm.heap)?;
    let Some(pair_id) = as_pair_id(&target, vm.heap) else {
        let got = target.kind_name(vm.heap);
        let err = SchemeError::wrong_operand(name, "a pair", got);
        target.drop_with_heap(vm.heap);
        new_value.drop_with_heap(vm.heap);
        return Err(err);
    };
    let old = match vm.heap.get_mut(pair_id) {
        HeapData::Pair(pair) => match field {
            Step::Car => std::mem::replace(&mut pair.car, new_value),
            Step::Cdr => std::mem::replace(&mut pair.cdr, new_value),
        },
        _ => unreachable!("as_pair_id checked the variant"),
    };
    old.drop_with_heap(vm.heap);
    target.drop_with_heap(vm.heap);
    Ok(None)
}

/// `(list [object1] …)` - a fresh proper list of the arguments.
pub fn list(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let values = args.at_least("list", 0, vm.heap)?;
    Ok(allocate_list(vm.heap, values))
}

fn as_pair_id(value: &Value, heap: &crate::heap::Heap) -> Option<HeapId> {
    let id = value.ref_id()?;
    matches!(heap.get(id), HeapData::Pair(_)).then_some(id)
}
