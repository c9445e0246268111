//! Argument buffer passed to primitive procedures.
//!
//! The buffer owns its values; every extractor either hands ownership to
//! the caller or releases the values on the error path, so reference
//! counts stay balanced no matter which arity check fails.

use crate::{
    exception_private::{RunResult, SchemeError},
    heap::Heap,
    value::Value,
};

/// Positional arguments for a primitive call, evaluated left-to-right.
#[derive(Debug)]
pub(crate) struct ArgValues(Vec<Value>);

impl ArgValues {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn count(&self) -> usize {
        self.0.len()
    }

    /// Releases every contained value.
    pub fn drop_with_heap(self, heap: &mut Heap) {
        for value in self.0 {
            value.drop_with_heap(heap);
        }
    }

    /// Checks that zero arguments were passed.
    pub fn check_none(self, name: &str, heap: &mut Heap) -> RunResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            let count = self.count();
            self.drop_with_heap(heap);
            Err(SchemeError::arity_mismatch(format!(
                "{name}: expected no arguments, got {count}"
            )))
        }
    }

    /// Checks that exactly one argument was passed, returning it.
    pub fn get_one(mut self, name: &str, heap: &mut Heap) -> RunResult<Value> {
        if self.0.len() == 1 {
            Ok(self.0.pop().expect("length checked"))
        } else {
            let count = self.count();
            self.drop_with_heap(heap);
            Err(SchemeError::arity_mismatch(format!(
                "{name}: expected 1 argument, got {count}"
            )))
        }
    }

    /// Checks that exactly two arguments were passed.
    pub fn get_two(mut self, name: &str, heap: &mut Heap) -> RunResult<(Value, Value)> {
        if self.0.len() == 2 {
            let second = self.0.pop().expect("length checked");
            let first = self.0.pop().expect("length checked");
            Ok((first, second))
        } else {
            let count = self.count();
            self.drop_with_heap(heap);
            Err(SchemeError::arity_mismatch(format!(
                "{name}: expected 2 arguments, got {count}"
            )))
        }
    }

    /// Checks that exactly three arguments were passed.
    pub fn get_three(mut self, name: &str, heap: &mut Heap) -> RunResult<(Value, Value, Value)> {
        if self.0.len() == 3 {
            let third = self.0.pop().expect("length checked");
            let second = self.0.pop().expect("length checked");
            let first = self.0.pop().expect("length checked");
            Ok((first, second, third))
        } else {
            let count = self.count();
            self.drop_with_heap(heap);
            Err(SchemeError::arity_mismatch(format!(
                "{name}: expected 3 arguments, got {count}"
            )))
        }
    }

    /// Checks that two or three arguments were passed.
    pub fn get_two_or_three(mut self, name: &str, heap: &mut Heap) -> RunResult<(Value, Value, Option<Value>)> {
        match self.0.len() {
            2 => {
                let second = self.0.pop().expect("length checked");
                let first = self.0.pop().expect("length checked");
                Ok((first, second, None))
            }
            3 => {
                let third = self.0.pop().expect("length checked");
                let second = self.0.pop().expect("length checked");
                let first = self.0.pop().expect("length checked");
                Ok((first, second, Some(third)))
            }
            count => {
                self.drop_with_heap(heap);
                Err(SchemeError::arity_mismatch(format!(
                    "{name}: expected 2 or 3 arguments, got {count}"
                )))
            }
        }
    }

    /// Checks that at least `min` arguments were passed, returning them all.
    pub fn at_least(self, name: &str, min: usize, heap: &mut Heap) -> RunResult<Vec<Value>> {
        if self.0.len() >= min {
            Ok(self.0)
        } else {
            let count = self.count();
            self.drop_with_heap(heap);
            let plural = if min == 1 { "argument" } else { "arguments" };
            Err(SchemeError::arity_mismatch(format!(
                "{name}: expected at least {min} {plural}, got {count}"
            )))
        }
    }
}
