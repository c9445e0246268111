//! Internal error representation used during execution.
//!
//! Runtime code propagates `RunError` with `?`; the `Vm` attaches the live
//! backtrace when converting to the public [`Exception`] at the run
//! boundary. All errors are fatal to the current run.

use std::borrow::Cow;

use strum::{Display, EnumString, IntoStaticStr};

/// Result type alias for operations that can produce a runtime error.
pub(crate) type RunResult<T> = Result<T, RunError>;

/// Error kinds reported by the interpreter.
///
/// Uses strum derives for automatic `Display`/`FromStr`; the string
/// representation matches the variant name exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum ErrorKind {
    /// Malformed expression found at parse or analyze time.
    Syntax,
    /// `set!` or lookup of a name with no binding.
    UnboundVariable,
    /// Lookup found a binding still holding the unassigned placeholder.
    UnassignedReference,
    /// A procedure received the wrong kind of value.
    TypeMismatch,
    /// Wrong argument count.
    ArityMismatch,
    /// List index out of range or not a valid index.
    BadIndex,
    /// Invalid range bounds or step.
    BadRange,
    /// A pair chain did not terminate at nil.
    NotASequence,
    /// Underlying stream error.
    IoFailure,
    /// Raised by the `error` primitive with a user-supplied message.
    UserRaised,
}

/// A raised Scheme error: kind plus a one-line message.
#[derive(Debug, Clone)]
pub(crate) struct SchemeError {
    pub kind: ErrorKind,
    pub message: String,
}

impl SchemeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> RunError {
        RunError::Raise(Box::new(Self {
            kind,
            message: message.into(),
        }))
    }

    pub fn type_mismatch(message: impl Into<String>) -> RunError {
        Self::new(ErrorKind::TypeMismatch, message)
    }

    pub fn arity_mismatch(message: impl Into<String>) -> RunError {
        Self::new(ErrorKind::ArityMismatch, message)
    }

    pub fn unbound_variable(name: &str) -> RunError {
        Self::new(ErrorKind::UnboundVariable, format!("\"{name}\": variable is not bound"))
    }

    pub fn unassigned(name: &str) -> RunError {
        Self::new(
            ErrorKind::UnassignedReference,
            format!("\"{name}\": variable is bound but unassigned"),
        )
    }

    pub fn bad_index(message: impl Into<String>) -> RunError {
        Self::new(ErrorKind::BadIndex, message)
    }

    pub fn bad_range(message: impl Into<String>) -> RunError {
        Self::new(ErrorKind::BadRange, message)
    }

    pub fn not_a_sequence(message: impl Into<String>) -> RunError {
        Self::new(ErrorKind::NotASequence, message)
    }

    pub fn io_failure(message: impl Into<String>) -> RunError {
        Self::new(ErrorKind::IoFailure, message)
    }

    /// Wrong-kind operand for a named procedure, e.g.
    /// `car: expected a pair, got integer`.
    pub fn wrong_operand(proc_name: &str, expected: &str, got: &str) -> RunError {
        Self::type_mismatch(format!("{proc_name}: expected {expected}, got {got}"))
    }
}

/// An error propagating through execution.
#[derive(Debug)]
pub(crate) enum RunError {
    /// Internal interpreter error - indicates a bug in lilt, not user code.
    Internal(Cow<'static, str>),
    /// An ordinary raised error, reported with kind, message, and backtrace.
    Raise(Box<SchemeError>),
}

impl RunError {
    pub fn internal(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Internal(msg.into())
    }
}
