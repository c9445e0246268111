//! Arithmetic primitives with integer/float promotion.
//!
//! A result is an integer iff every operand is an integer and, for `/`,
//! every division along the way is exact; otherwise the computation is
//! carried out in doubles.

use crate::{
    args::ArgValues,
    exception_private::{RunResult, SchemeError},
    io::{InputPort, PrintWriter},
    value::Value,
    vm::Vm,
};

/// A numeric operand, unwrapped from an immediate value.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::Int(v) => Value::Int(v),
            Self::Float(v) => Value::Float(v),
        }
    }
}

/// Unwraps every operand as a number, or fails naming the procedure.
pub(crate) fn numeric_operands(
    values: &[Value],
    heap: &crate::heap::Heap,
    name: &str,
) -> RunResult<Vec<Num>> {
    values
        .iter()
        .map(|value| match value {
            Value::Int(v) => Ok(Num::Int(*v)),
            Value::Float(v) => Ok(Num::Float(*v)),
            other => Err(SchemeError::wrong_operand(name, "a number", other.kind_name(heap))),
        })
        .collect()
}

fn release(values: Vec<Value>, heap: &mut crate::heap::Heap) {
    for value in values {
        value.drop_with_heap(heap);
    }
}

/// `(+ number1 [number2] …)`.
pub fn add(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let values = args.at_least("+", 1, vm.heap)?;
    let nums = numeric_operands(&values, vm.heap, "+");
    release(values, vm.heap);
    let nums = nums?;
    if nums.iter().all(|n| matches!(n, Num::Int(_))) {
        let mut sum: i64 = 0;
        for num in &nums {
            if let Num::Int(v) = num {
                sum = sum.wrapping_add(*v);
            }
        }
        Ok(Value::Int(sum))
    } else {
        Ok(Value::Float(nums.iter().map(|n| n.as_f64()).sum()))
    }
}

/// `(- number1 [number2] …)`; a single operand negates.
pub fn subtract(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let values = args.at_least("-", 1, vm.heap)?;
    let nums = numeric_operands(&values, vm.heap, "-");
    release(values, vm.heap);
    let nums = nums?;
    if nums.len() == 1 {
        return Ok(match nums[0] {
            Num::Int(v) => Value::Int(v.wrapping_neg()),
            Num::Float(v) => Value::Float(-v),
        });
    }
    if nums.iter().all(|n| matches!(n, Num::Int(_))) {
        let mut acc = match nums[0] {
            Num::Int(v) => v,
            Num::Float(_) => unreachable!("all integers checked"),
        };
        for num in &nums[1..] {
            if let Num::Int(v) = num {
                acc = acc.wrapping_sub(*v);
            }
        }
        Ok(Value::Int(acc))
    } else {
        let mut acc = nums[0].as_f64();
        for num in &nums[1..] {
            acc -= num.as_f64();
        }
        Ok(Value::Float(acc))
    }
}

/// `(* number1 [number2] …)`.
pub fn multiply(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let values = args.at_least("*", 1, vm.heap)?;
    let nums = numeric_operands(&values, vm.heap, "*");
    release(values, vm.heap);
    let nums = nums?;
    if nums.iter().all(|n| matches!(n, Num::Int(_))) {
        let mut product: i64 = 1;
        for num in &nums {
            if let Num::Int(v) = num {
                product = product.wrapping_mul(*v);
            }
        }
        Ok(Value::Int(product))
    } else {
        Ok(Value::Float(nums.iter().map(|n| n.as_f64()).product()))
    }
}

/// `(/ number1 [number2] …)`.
///
/// A single operand is the reciprocal (always a float). Otherwise the
/// result stays an integer only while every division is exact; the first
/// inexact step switches the whole chain to float arithmetic.
pub fn divide(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let values = args.at_least("/", 1, vm.heap)?;
    let nums = numeric_operands(&values, vm.heap, "/");
    release(values, vm.heap);
    let nums = nums?;
    if nums.len() == 1 {
        return Ok(Value::Float(1.0 / nums[0].as_f64()));
    }

    if nums.iter().all(|n| matches!(n, Num::Int(_))) {
        let ints: Vec<i64> = nums
            .iter()
            .map(|n| match n {
                Num::Int(v) => *v,
                Num::Float(_) => unreachable!("all integers checked"),
            })
            .collect();
        if ints[1..].contains(&0) {
            return Err(SchemeError::type_mismatch("/: division by zero"));
        }
        let mut quotient = ints[0];
        let mut exact = true;
        for &divisor in &ints[1..] {
            if quotient % divisor != 0 {
                exact = false;
                break;
            }
            quotient /= divisor;
        }
        if exact {
            return Ok(Value::Int(quotient));
        }
    }

    let mut acc = nums[0].as_f64();
    for num in &nums[1..] {
        acc /= num.as_f64();
    }
    Ok(Value::Float(acc))
}

/// `(remainder dividend divisor)` - integers only.
pub fn remainder(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    let (dividend, divisor) = args.get_two("remainder", vm.heap)?;
    let result = match (&dividend, &divisor) {
        (Value::Int(_), Value::Int(0)) => Err(SchemeError::type_mismatch("remainder: division by zero")),
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_rem(*b))),
        (a, b) => {
            let got = if matches!(a, Value::Int(_)) {
                b.kind_name(vm.heap)
            } else {
                a.kind_name(vm.heap)
            };
            Err(SchemeError::wrong_operand("remainder", "an integer", got))
        }
    };
    dividend.drop_with_heap(vm.heap);
    divisor.drop_with_heap(vm.heap);
    result
}

/// `(max number1 [number2] …)` - keeps the winning operand's kind.
pub fn max(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    extremum(vm, args, "max", |candidate, best| candidate > best)
}

/// `(min number1 [number2] …)` - keeps the winning operand's kind.
pub fn min(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Value> {
    extremum(vm, args, "min", |candidate, best| candidate < best)
}

fn extremum(
    vm: &mut Vm<'_, impl PrintWriter, impl InputPort>,
    args: ArgValues,
    name: &str,
    wins: fn(f64, f64) -> bool,
) -> RunResult<Value> {
    let values = args.at_least(name, 1, vm.heap)?;
    let nums = numeric_operands(&values, vm.heap, name);
    release(values, vm.heap);
    let nums = nums?;
    let mut best = nums[0];
    for num in &nums[1..] {
        if wins(num.as_f64(), best.as_f64()) {
            best = *num;
        }
    }
    Ok(best.into_value())
}
