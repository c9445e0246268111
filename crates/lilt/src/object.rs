//! The public value type returned by the embedding API.

use std::fmt;

use crate::{
    heap::{Heap, HeapData},
    intern::Interns,
    value::{Value, write_float},
};

/// A Scheme value that can be returned from the interpreter.
///
/// This is the public-facing type: it owns all its data and can be freely
/// cloned, compared, and stored. Unlike the internal `Value`, `Object`
/// does not require a heap for any operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// The empty list.
    Nil,
    /// `#t` / `#f`.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// IEEE-754 double.
    Float(f64),
    /// A symbol's text.
    Symbol(String),
    /// A string's text.
    String(String),
    /// A cons cell.
    Pair(Box<Object>, Box<Object>),
    /// A procedure of either kind, carried as its printed form.
    Procedure(String),
    /// The unassigned placeholder.
    Unassigned,
}

impl Object {
    /// Converts a runtime value into an owned `Object`, consuming (and
    /// releasing) the value.
    pub(crate) fn new(value: Value, heap: &mut Heap, interns: &Interns) -> Self {
        let object = Self::convert(&value, heap, interns);
        value.drop_with_heap(heap);
        object
    }

    fn convert(value: &Value, heap: &Heap, interns: &Interns) -> Self {
        match value {
            Value::Nil => Self::Nil,
            Value::Bool(b) => Self::Bool(*b),
            Value::Int(v) => Self::Int(*v),
            Value::Float(v) => Self::Float(*v),
            Value::Unassigned => Self::Unassigned,
            Value::Builtin(_) | Value::ModuleFunction(_) => {
                Self::Procedure(value.to_display_string(heap, interns))
            }
            Value::InternSymbol(id) => Self::Symbol(interns.get_str(*id).to_owned()),
            Value::InternString(id) => Self::String(interns.get_str(*id).to_owned()),
            Value::Ref(id) => match heap.get(*id) {
                HeapData::Symbol(text) => Self::Symbol(text.clone()),
                HeapData::Str(text) => Self::String(text.clone()),
                HeapData::Pair(_) => Self::convert_spine(*id, heap, interns),
                HeapData::Closure(_) | HeapData::Frame(_) | HeapData::Env(_) => {
                    Self::Procedure(value.to_display_string(heap, interns))
                }
            },
            #[cfg(feature = "ref-count-panic")]
            Value::Dereferenced => unreachable!("dereferenced value escaped to the public API"),
        }
    }

    /// Converts a pair chain without recursing on the spine, so long lists
    /// cannot exhaust the host stack.
    fn convert_spine(id: crate::heap::HeapId, heap: &Heap, interns: &Interns) -> Self {
        let mut cars = Vec::new();
        let mut cursor = id;
        let tail = loop {
            match heap.get(cursor) {
                HeapData::Pair(pair) => {
                    cars.push(Self::convert(&pair.car, heap, interns));
                    match &pair.cdr {
                        Value::Ref(next) if matches!(heap.get(*next), HeapData::Pair(_)) => cursor = *next,
                        other => break Self::convert(other, heap, interns),
                    }
                }
                _ => unreachable!("convert_spine starts at a pair"),
            }
        };
        cars.into_iter()
            .rev()
            .fold(tail, |cdr, car| Self::Pair(Box::new(car), Box::new(cdr)))
    }
}

impl fmt::Display for Object {
    /// Renders the value in its source syntax: `(1 2 3)`, `(10 . 20)`,
    /// `#t`, `3.5`, symbols and strings bare.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(true) => write!(f, "#t"),
            Self::Bool(false) => write!(f, "#f"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => {
                let mut text = String::new();
                write_float(&mut text, *v);
                write!(f, "{text}")
            }
            Self::Symbol(text) | Self::String(text) => write!(f, "{text}"),
            Self::Procedure(repr) => write!(f, "{repr}"),
            Self::Unassigned => write!(f, "**UNASSIGNED**"),
            Self::Pair(car, cdr) => {
                write!(f, "({car}")?;
                let mut tail = cdr;
                loop {
                    match tail.as_ref() {
                        Self::Nil => break,
                        Self::Pair(car, cdr) => {
                            write!(f, " {car}")?;
                            tail = cdr;
                        }
                        other => {
                            write!(f, " . {other}")?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
        }
    }
}
