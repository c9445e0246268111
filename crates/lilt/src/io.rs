//! Output and input ports used by the `print` family and `read`.

use std::{
    borrow::Cow,
    cell::RefCell,
    collections::VecDeque,
    io::{self, BufRead, Write as _},
};

use crate::{exception_private::ErrorKind, exception_public::Exception};

/// Trait for handling output from the printing primitives.
///
/// Implement this trait to capture or redirect output from interpreted
/// code. The default implementation `StdPrint` writes to stdout.
pub trait PrintWriter {
    /// Called once for each formatted value.
    ///
    /// This method writes only the given value's text; separators and
    /// newlines are emitted via [`PrintWriter::stdout_push`].
    fn stdout_write(&mut self, output: Cow<'_, str>) -> Result<(), Exception>;

    /// Add a single character to stdout.
    ///
    /// Generally called to add spaces and newlines within print output.
    fn stdout_push(&mut self, end: char) -> Result<(), Exception>;
}

thread_local! {
    /// Thread-local stdout buffer for `StdPrint`.
    ///
    /// Buffering keeps interleaved stderr diagnostics (error messages,
    /// backtraces) from splitting printed lines mid-way.
    static STDOUT_BUFFER: RefCell<String> = const { RefCell::new(String::new()) };
}

/// Default `PrintWriter` that writes to stdout.
#[derive(Debug)]
pub struct StdPrint;

impl PrintWriter for StdPrint {
    fn stdout_write(&mut self, output: Cow<'_, str>) -> Result<(), Exception> {
        STDOUT_BUFFER.with(|buffer| buffer.borrow_mut().push_str(&output));
        Ok(())
    }

    fn stdout_push(&mut self, end: char) -> Result<(), Exception> {
        STDOUT_BUFFER.with(|buffer| buffer.borrow_mut().push(end));
        Ok(())
    }
}

impl Drop for StdPrint {
    fn drop(&mut self) {
        STDOUT_BUFFER.with(|buffer| {
            let mut buffer = buffer.borrow_mut();
            if buffer.is_empty() {
                return;
            }
            let _ = io::stdout().write_all(buffer.as_bytes());
            let _ = io::stdout().flush();
            buffer.clear();
        });
    }
}

/// A `PrintWriter` that collects all output into a string.
///
/// Useful for testing or capturing print output programmatically.
#[derive(Debug, Default)]
pub struct CollectStringPrint(String);

impl CollectStringPrint {
    #[must_use]
    pub fn new() -> Self {
        Self(String::new())
    }

    /// Returns the collected output as a string slice.
    #[must_use]
    pub fn output(&self) -> &str {
        self.0.as_str()
    }

    /// Consumes the writer and returns the collected output.
    #[must_use]
    pub fn into_output(self) -> String {
        self.0
    }
}

impl PrintWriter for CollectStringPrint {
    fn stdout_write(&mut self, output: Cow<'_, str>) -> Result<(), Exception> {
        self.0.push_str(&output);
        Ok(())
    }

    fn stdout_push(&mut self, end: char) -> Result<(), Exception> {
        self.0.push(end);
        Ok(())
    }
}

/// `PrintWriter` that ignores all output.
#[derive(Debug, Default)]
pub struct NoPrint;

impl PrintWriter for NoPrint {
    fn stdout_write(&mut self, _output: Cow<'_, str>) -> Result<(), Exception> {
        Ok(())
    }

    fn stdout_push(&mut self, _end: char) -> Result<(), Exception> {
        Ok(())
    }
}

/// Trait feeding source text to the `read` primitive.
///
/// `read` pulls whole lines until the accumulated text contains one
/// complete datum. `None` signals end of input.
pub trait InputPort {
    fn read_line(&mut self) -> Result<Option<String>, Exception>;
}

/// Default `InputPort` reading lines from standard input.
#[derive(Debug, Default)]
pub struct StdInput;

impl InputPort for StdInput {
    fn read_line(&mut self) -> Result<Option<String>, Exception> {
        let mut line = String::new();
        let n = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| Exception::new(ErrorKind::IoFailure, format!("stdin: {e}")))?;
        if n == 0 { Ok(None) } else { Ok(Some(line)) }
    }
}

/// An `InputPort` serving pre-seeded lines, for tests and embedding.
#[derive(Debug, Default)]
pub struct QueueInput(VecDeque<String>);

impl QueueInput {
    #[must_use]
    pub fn new(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(lines.into_iter().map(Into::into).collect())
    }
}

impl InputPort for QueueInput {
    fn read_line(&mut self) -> Result<Option<String>, Exception> {
        Ok(self.0.pop_front())
    }
}

/// An `InputPort` that is always at end of input.
#[derive(Debug, Default)]
pub struct NoInput;

impl InputPort for NoInput {
    fn read_line(&mut self) -> Result<Option<String>, Exception> {
        Ok(None)
    }
}
