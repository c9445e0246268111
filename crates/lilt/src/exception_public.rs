//! Public error type returned by the embedding API.

use std::fmt;

use crate::exception_private::{ErrorKind, RunError};

/// One in-flight expression recorded by the diagnostic backtrace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Script name the expression came from.
    pub filename: String,
    /// 1-based source line.
    pub line: u32,
    /// Canonical rendering of the expression.
    pub rendered: String,
}

/// A fatal interpreter error: kind, message, and the expressions that were
/// executing when it was raised (top of stack first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exception {
    kind: ErrorKind,
    message: String,
    backtrace: Vec<StackFrame>,
    /// Number of frames dropped beyond the recording bound.
    truncated: usize,
}

impl Exception {
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            backtrace: Vec::new(),
            truncated: 0,
        }
    }

    pub(crate) fn with_backtrace(
        kind: ErrorKind,
        message: impl Into<String>,
        backtrace: Vec<StackFrame>,
        truncated: usize,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            backtrace,
            truncated,
        }
    }

    /// A syntax error pinned to a source location, `file:line: message`.
    pub(crate) fn syntax(filename: &str, line: u32, message: &str) -> Self {
        Self::new(ErrorKind::Syntax, format!("{filename}:{line}: {message}"))
    }

    /// The error kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The one-line error message (without the kind prefix).
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The recorded backtrace, innermost expression first.
    #[must_use]
    pub fn backtrace(&self) -> &[StackFrame] {
        &self.backtrace
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if self.backtrace.is_empty() {
            return Ok(());
        }
        write!(f, "\n\n-------------------- BACKTRACE --------------------")?;
        for (i, frame) in self.backtrace.iter().enumerate() {
            write!(f, "\n[{i}] {}:{} {}", frame.filename, frame.line, frame.rendered)?;
        }
        if self.truncated > 0 {
            write!(f, "\n... ({} more frames)", self.truncated)?;
        }
        Ok(())
    }
}

impl std::error::Error for Exception {}

impl RunError {
    /// Converts this runtime error to an `Exception` for the public API.
    ///
    /// Internal errors carry an "internal error" prefix so interpreter
    /// bugs stay distinguishable from user errors.
    pub(crate) fn into_exception(self, backtrace: Vec<StackFrame>, truncated: usize) -> Exception {
        match self {
            Self::Raise(err) => Exception::with_backtrace(err.kind, err.message, backtrace, truncated),
            Self::Internal(msg) => Exception::with_backtrace(
                ErrorKind::TypeMismatch,
                format!("internal error in lilt: {msg}"),
                backtrace,
                truncated,
            ),
        }
    }
}
