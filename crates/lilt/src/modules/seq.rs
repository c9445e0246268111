//! The "seq" module: sequence operations over proper lists.

use crate::{
    args::ArgValues,
    env,
    exception_private::{RunResult, SchemeError},
    heap::{Heap, HeapData},
    intern::StaticStrings,
    io::{InputPort, PrintWriter},
    modules::ModuleFunctions,
    value::{Value, allocate_list},
    vm::Vm,
};

/// Binds every "seq" procedure into the global environment.
pub(crate) fn bind(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>) -> RunResult<()> {
    use StaticStrings as S;
    let bindings = [
        (S::Sort, ModuleFunctions::Sort),
        (S::Length, ModuleFunctions::Length),
        (S::ListRef, ModuleFunctions::ListRef),
        (S::Range, ModuleFunctions::Range),
        (S::Append, ModuleFunctions::Append),
        (S::Reverse, ModuleFunctions::Reverse),
        (S::ListCopy, ModuleFunctions::ListCopy),
        (S::Map, ModuleFunctions::Map),
        (S::ForEach, ModuleFunctions::ForEach),
        (S::Filter, ModuleFunctions::Filter),
        (S::Accumulate, ModuleFunctions::Accumulate),
        (S::FoldLeft, ModuleFunctions::FoldLeft),
    ];
    for (name, function) in bindings {
        env::define(vm.heap, vm.global_env, name.into(), Value::ModuleFunction(function))?;
    }
    Ok(())
}

/// Collects a proper list's elements (cloned), accepting `nil` as empty.
/// An improper chain is a `NotASequence` error; any other value kind is
/// too. Already-cloned elements are released on the error path.
pub(crate) fn list_values(heap: &mut Heap, value: &Value, name: &str) -> RunResult<Vec<Value>> {
    fn improper(items: Vec<Value>, heap: &mut Heap, name: &str) -> RunResult<Vec<Value>> {
        for item in items {
            item.drop_with_heap(heap);
        }
        Err(SchemeError::not_a_sequence(format!(
            "{name}: pair chain does not terminate at nil"
        )))
    }

    let mut items: Vec<Value> = Vec::new();
    // walk the spine by slot id so cleanup can borrow the heap mutably
    let mut cursor: Option<crate::heap::HeapId> = match value {
        Value::Nil => None,
        Value::Ref(id) => Some(*id),
        _ => return improper(items, heap, name),
    };
    while let Some(id) = cursor {
        let step = match heap.get(id) {
            HeapData::Pair(pair) => {
                let item = pair.car.clone_with_heap(heap);
                let next = match &pair.cdr {
                    Value::Nil => Ok(None),
                    Value::Ref(next_id) => Ok(Some(*next_id)),
                    _ => Err(()),
                };
                Some((item, next))
            }
            _ => None,
        };
        match step {
            Some((item, Ok(next))) => {
                items.push(item);
                cursor = next;
            }
            Some((item, Err(()))) => {
                item.drop_with_heap(heap);
                return improper(items, heap, name);
            }
            None => return improper(items, heap, name),
        }
    }
    Ok(items)
}

fn release(values: Vec<Value>, heap: &mut Heap) {
    for value in values {
        value.drop_with_heap(heap);
    }
}

/// `(length sequence)`.
pub fn length(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let value = args.get_one("length", vm.heap)?;
    let mut count: i64 = 0;
    let mut current = &value;
    let result = loop {
        match current {
            Value::Nil => break Ok(Value::Int(count)),
            Value::Ref(id) => match vm.heap.get(*id) {
                HeapData::Pair(pair) => {
                    count += 1;
                    current = &pair.cdr;
                }
                _ => break Err(SchemeError::not_a_sequence("length: pair chain does not terminate at nil")),
            },
            _ => break Err(SchemeError::not_a_sequence("length: pair chain does not terminate at nil")),
        }
    };
    value.drop_with_heap(vm.heap);
    result
}

/// `(list-ref sequence index)` - zero-based; the sequence must be a pair.
pub fn list_ref(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let (seq, index) = args.get_two("list-ref", vm.heap)?;
    let index_number = match &index {
        Value::Int(v) if *v >= 0 => Ok(*v as usize),
        Value::Int(_) => Err(SchemeError::bad_index("list-ref: index is negative")),
        other => Err(SchemeError::wrong_operand(
            "list-ref",
            "an integer index",
            other.kind_name(vm.heap),
        )),
    };
    index.drop_with_heap(vm.heap);
    let index_number = match index_number {
        Ok(n) => n,
        Err(err) => {
            seq.drop_with_heap(vm.heap);
            return Err(err);
        }
    };
    let mut position = 0;
    let mut current = &seq;
    let result = loop {
        match current {
            Value::Ref(id) => match vm.heap.get(*id) {
                HeapData::Pair(pair) => {
                    if position == index_number {
                        break Ok(pair.car.clone_with_heap(vm.heap));
                    }
                    position += 1;
                    current = &pair.cdr;
                }
                _ => {
                    break Err(SchemeError::not_a_sequence(
                        "list-ref: pair chain does not terminate at nil",
                    ));
                }
            },
            Value::Nil => break Err(SchemeError::bad_index(format!("list-ref: index {index_number} out of range"))),
            other => {
                break Err(SchemeError::wrong_operand(
                    "list-ref",
                    "a sequence",
                    other.kind_name(vm.heap),
                ));
            }
        }
    };
    seq.drop_with_heap(vm.heap);
    result
}

/// `(range first last [step])` - integers, inclusive of `last`.
///
/// The step must be non-zero, point from `first` towards `last`, and
/// divide the distance exactly.
pub fn range(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let (first, last, step) = args.get_two_or_three("range", vm.heap)?;
    let bounds = (int_operand(&first, vm.heap, "range"), int_operand(&last, vm.heap, "range"));
    let step_number = match &step {
        Some(value) => int_operand(value, vm.heap, "range"),
        None => Ok(1),
    };
    first.drop_with_heap(vm.heap);
    last.drop_with_heap(vm.heap);
    if let Some(step) = step {
        step.drop_with_heap(vm.heap);
    }
    let (first, last) = (bounds.0?, bounds.1?);
    let step = step_number?;

    if step == 0
        || (step > 0 && first > last)
        || (step < 0 && first < last)
        || (last - first) % step != 0
    {
        return Err(SchemeError::bad_range(format!(
            "range: cannot step from {first} to {last} by {step}"
        )));
    }

    let mut values = Vec::new();
    let mut current = first;
    loop {
        values.push(Value::Int(current));
        if current == last {
            break;
        }
        current += step;
    }
    Ok(allocate_list(vm.heap, values))
}

/// `(append sequence1 sequence2)` - a fresh list of both spines; the
/// elements are shared.
pub fn append(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let (x, y) = args.get_two("append", vm.heap)?;
    let mut values = match list_values(vm.heap, &x, "append") {
        Ok(values) => values,
        Err(err) => {
            x.drop_with_heap(vm.heap);
            y.drop_with_heap(vm.heap);
            return Err(err);
        }
    };
    match list_values(vm.heap, &y, "append") {
        Ok(rest) => values.extend(rest),
        Err(err) => {
            release(values, vm.heap);
            x.drop_with_heap(vm.heap);
            y.drop_with_heap(vm.heap);
            return Err(err);
        }
    }
    x.drop_with_heap(vm.heap);
    y.drop_with_heap(vm.heap);
    Ok(allocate_list(vm.heap, values))
}

/// `(reverse sequence)`.
pub fn reverse(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let seq = args.get_one("reverse", vm.heap)?;
    let result = list_values(vm.heap, &seq, "reverse");
    seq.drop_with_heap(vm.heap);
    let mut values = result?;
    values.reverse();
    Ok(allocate_list(vm.heap, values))
}

/// `(list-copy sequence)` - a fresh spine sharing the elements.
pub fn list_copy(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let seq = args.get_one("list-copy", vm.heap)?;
    let result = list_values(vm.heap, &seq, "list-copy");
    seq.drop_with_heap(vm.heap);
    let values = result?;
    Ok(allocate_list(vm.heap, values))
}

/// Extracts `(proc seq)` arguments shared by `map`/`for-each`/`filter`.
fn proc_and_items(
    vm: &mut Vm<'_, impl PrintWriter, impl InputPort>,
    args: ArgValues,
    name: &str,
) -> RunResult<(Value, Vec<Value>)> {
    let (proc, seq) = args.get_two(name, vm.heap)?;
    if !proc.is_procedure(vm.heap) {
        let got = proc.kind_name(vm.heap);
        let err = SchemeError::wrong_operand(name, "a procedure", got);
        proc.drop_with_heap(vm.heap);
        seq.drop_with_heap(vm.heap);
        return Err(err);
    }
    let items = match list_values(vm.heap, &seq, name) {
        Ok(items) => items,
        Err(err) => {
            proc.drop_with_heap(vm.heap);
            seq.drop_with_heap(vm.heap);
            return Err(err);
        }
    };
    seq.drop_with_heap(vm.heap);
    Ok((proc, items))
}

/// `(map procedure sequence)`.
pub fn map(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let (proc, items) = proc_and_items(vm, args, "map")?;
    let mut results = Vec::with_capacity(items.len());
    let mut items = items.into_iter();
    while let Some(item) = items.next() {
        let callee = proc.clone_with_heap(vm.heap);
        match vm.call_procedure(callee, vec![item]) {
            Ok(value) => results.push(value),
            Err(err) => {
                release(items.collect(), vm.heap);
                release(results, vm.heap);
                proc.drop_with_heap(vm.heap);
                return Err(err);
            }
        }
    }
    proc.drop_with_heap(vm.heap);
    Ok(allocate_list(vm.heap, results))
}

/// `(for-each procedure sequence)` - like `map` but discards the results
/// and produces no value.
pub fn for_each(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Option<Value>> {
    let (proc, items) = proc_and_items(vm, args, "for-each")?;
    let mut items = items.into_iter();
    while let Some(item) = items.next() {
        let callee = proc.clone_with_heap(vm.heap);
        match vm.apply_values(callee, vec![item]) {
            Ok(Some(value)) => value.drop_with_heap(vm.heap),
            Ok(None) => {}
            Err(err) => {
                release(items.collect(), vm.heap);
                proc.drop_with_heap(vm.heap);
                return Err(err);
            }
        }
    }
    proc.drop_with_heap(vm.heap);
    Ok(None)
}

/// `(filter predicate-procedure sequence)`.
pub fn filter(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let (proc, items) = proc_and_items(vm, args, "filter")?;
    let mut kept = Vec::new();
    let mut items = items.into_iter();
    while let Some(item) = items.next() {
        let callee = proc.clone_with_heap(vm.heap);
        let probe = item.clone_with_heap(vm.heap);
        match vm.call_procedure(callee, vec![probe]) {
            Ok(verdict) => {
                let keep = verdict.is_truthy();
                verdict.drop_with_heap(vm.heap);
                if keep {
                    kept.push(item);
                } else {
                    item.drop_with_heap(vm.heap);
                }
            }
            Err(err) => {
                item.drop_with_heap(vm.heap);
                release(items.collect(), vm.heap);
                release(kept, vm.heap);
                proc.drop_with_heap(vm.heap);
                return Err(err);
            }
        }
    }
    proc.drop_with_heap(vm.heap);
    Ok(allocate_list(vm.heap, kept))
}

/// `(accumulate procedure initial sequence)` - a right fold; the
/// procedure receives `(current-item last-result)`.
pub fn accumulate(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let (proc, initial, seq) = args.get_three("accumulate", vm.heap)?;
    let items = match checked_fold_args(vm, &proc, &seq, "accumulate") {
        Ok(items) => items,
        Err(err) => {
            proc.drop_with_heap(vm.heap);
            initial.drop_with_heap(vm.heap);
            seq.drop_with_heap(vm.heap);
            return Err(err);
        }
    };
    seq.drop_with_heap(vm.heap);
    let mut acc = initial;
    let mut items = items;
    while let Some(item) = items.pop() {
        let callee = proc.clone_with_heap(vm.heap);
        match vm.call_procedure(callee, vec![item, acc]) {
            Ok(value) => acc = value,
            Err(err) => {
                release(items, vm.heap);
                proc.drop_with_heap(vm.heap);
                return Err(err);
            }
        }
    }
    proc.drop_with_heap(vm.heap);
    Ok(acc)
}

/// `(fold-left procedure initial sequence)` - the procedure receives
/// `(last-result current-item)`.
pub fn fold_left(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let (proc, initial, seq) = args.get_three("fold-left", vm.heap)?;
    let items = match checked_fold_args(vm, &proc, &seq, "fold-left") {
        Ok(items) => items,
        Err(err) => {
            proc.drop_with_heap(vm.heap);
            initial.drop_with_heap(vm.heap);
            seq.drop_with_heap(vm.heap);
            return Err(err);
        }
    };
    seq.drop_with_heap(vm.heap);
    let mut acc = initial;
    let mut items = items.into_iter();
    while let Some(item) = items.next() {
        let callee = proc.clone_with_heap(vm.heap);
        match vm.call_procedure(callee, vec![acc, item]) {
            Ok(value) => acc = value,
            Err(err) => {
                release(items.collect(), vm.heap);
                proc.drop_with_heap(vm.heap);
                return Err(err);
            }
        }
    }
    proc.drop_with_heap(vm.heap);
    Ok(acc)
}

fn checked_fold_args(
    vm: &mut Vm<'_, impl PrintWriter, impl InputPort>,
    proc: &Value,
    seq: &Value,
    name: &str,
) -> RunResult<Vec<Value>> {
    if !proc.is_procedure(vm.heap) {
        return Err(SchemeError::wrong_operand(name, "a procedure", proc.kind_name(vm.heap)));
    }
    list_values(vm.heap, seq, name)
}

/// `(sort cmp-procedure sequence)` - stable merge sort.
///
/// The comparator must return an integer; negative means the first
/// argument sorts before the second. It is threaded through the merge as
/// a value, so comparators that themselves sort are fine.
pub fn sort(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let (proc, items) = proc_and_items(vm, args, "sort")?;
    let result = merge_sort(vm, &proc, items);
    proc.drop_with_heap(vm.heap);
    let sorted = result?;
    Ok(allocate_list(vm.heap, sorted))
}

fn merge_sort(
    vm: &mut Vm<'_, impl PrintWriter, impl InputPort>,
    cmp: &Value,
    mut items: Vec<Value>,
) -> RunResult<Vec<Value>> {
    if items.len() <= 1 {
        return Ok(items);
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(vm, cmp, items)?;
    let right = match merge_sort(vm, cmp, right) {
        Ok(right) => right,
        Err(err) => {
            release(left, vm.heap);
            return Err(err);
        }
    };

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        match (left.peek(), right.peek()) {
            (Some(a), Some(b)) => {
                let ordering = compare_items(vm, cmp, a, b);
                match ordering {
                    Ok(ordering) => {
                        // take from the right only when it strictly sorts
                        // first, keeping the sort stable
                        if ordering > 0 {
                            merged.push(right.next().expect("peeked"));
                        } else {
                            merged.push(left.next().expect("peeked"));
                        }
                    }
                    Err(err) => {
                        release(merged, vm.heap);
                        release(left.collect(), vm.heap);
                        release(right.collect(), vm.heap);
                        return Err(err);
                    }
                }
            }
            (Some(_), None) => merged.push(left.next().expect("peeked")),
            (None, Some(_)) => merged.push(right.next().expect("peeked")),
            (None, None) => return Ok(merged),
        }
    }
}

/// Invokes the comparator on two items, expecting an integer result.
fn compare_items(
    vm: &mut Vm<'_, impl PrintWriter, impl InputPort>,
    cmp: &Value,
    a: &Value,
    b: &Value,
) -> RunResult<i64> {
    let callee = cmp.clone_with_heap(vm.heap);
    let args = vec![a.clone_with_heap(vm.heap), b.clone_with_heap(vm.heap)];
    let verdict = vm.call_procedure(callee, args)?;
    let result = match &verdict {
        Value::Int(v) => Ok(*v),
        other => Err(SchemeError::wrong_operand(
            "sort",
            "an integer from the comparator",
            other.kind_name(vm.heap),
        )),
    };
    verdict.drop_with_heap(vm.heap);
    result
}

fn int_operand(value: &Value, heap: &Heap, name: &str) -> RunResult<i64> {
    match value {
        Value::Int(v) => Ok(*v),
        other => Err(SchemeError::wrong_operand(name, "an integer", other.kind_name(heap))),
    }
}
