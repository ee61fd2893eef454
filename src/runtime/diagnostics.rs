//! Diagnostic sink for rendered log lines.
//!
//! The runtime never decides where its diagnostics go. Whoever embeds it injects a
//! [`DiagnosticSink`], which receives one fully rendered line per call and returns nothing.
//! [`Diagnostics`] wraps the sink: lines are emitted one at a time and a panicking sink is
//! contained, so a broken destination can never surface as a runtime error. A sink may emit
//! again through the same [`Diagnostics`] (for example by registering a symbol); such nested
//! lines go straight to the sink on the emitting thread.
//!
//! # Provided Sinks
//!
//! - [`LogSink`] - forwards to the `log` facade (the default)
//! - [`StderrSink`] - writes to standard error, ignoring write failures
//! - any `Fn(&str) + Send + Sync` closure
//!
//! # Examples
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use objscope::runtime::Diagnostics;
//!
//! let lines = Arc::new(Mutex::new(Vec::new()));
//! let captured = lines.clone();
//! let diagnostics = Diagnostics::new(Arc::new(move |line: &str| {
//!     captured.lock().unwrap().push(line.to_string());
//! }));
//!
//! diagnostics.emit("selector table rebuilt");
//! assert_eq!(lines.lock().unwrap().len(), 1);
//! ```

use std::{
    cell::RefCell,
    fmt,
    io::Write,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{Arc, Mutex, PoisonError},
};

thread_local! {
    /// Addresses of the [`Diagnostics`] currently inside their sink on this thread
    static EMITTING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Log target used by [`LogSink`]
pub const LOG_TARGET: &str = "objscope";

/// Receiver of rendered diagnostic lines
pub trait DiagnosticSink: Send + Sync {
    /// Accept one fully formatted message
    fn emit(&self, message: &str);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn emit(&self, message: &str) {
        self(message);
    }
}

/// Forwards every line to `log::warn!` under [`LOG_TARGET`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, message: &str) {
        log::warn!(target: LOG_TARGET, "{message}");
    }
}

/// Writes every line to standard error
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn emit(&self, message: &str) {
        // A closed or broken stderr is not our problem to report
        let _ = writeln!(std::io::stderr().lock(), "{message}");
    }
}

/// Serializing, failure-isolating front of a [`DiagnosticSink`]
pub struct Diagnostics {
    sink: Arc<dyn DiagnosticSink>,
    lock: Mutex<()>,
}

impl Diagnostics {
    /// Wrap `sink`
    #[must_use]
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Diagnostics {
            sink,
            lock: Mutex::new(()),
        }
    }

    /// The wrapped sink
    #[must_use]
    pub fn sink(&self) -> &Arc<dyn DiagnosticSink> {
        &self.sink
    }

    /// Forward one rendered line to the sink
    ///
    /// Lines from concurrent callers never interleave. A panic inside the sink is swallowed.
    /// A call made from within the sink itself bypasses the lock instead of waiting on it.
    pub fn emit(&self, message: &str) {
        let id = self as *const Self as usize;
        if EMITTING.with(|active| active.borrow().contains(&id)) {
            self.forward(message);
            return;
        }

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        EMITTING.with(|active| active.borrow_mut().push(id));
        self.forward(message);
        EMITTING.with(|active| active.borrow_mut().retain(|entry| *entry != id));
    }

    fn forward(&self, message: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.sink.emit(message)));
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Diagnostics::new(Arc::new(LogSink))
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn capture() -> (Arc<Mutex<Vec<String>>>, Diagnostics) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = lines.clone();
        let diagnostics = Diagnostics::new(Arc::new(move |line: &str| {
            captured.lock().unwrap().push(line.to_string());
        }));
        (lines, diagnostics)
    }

    #[test]
    fn test_emit_forwards_rendered_line() {
        let (lines, diagnostics) = capture();
        diagnostics.emit("first");
        diagnostics.emit("second");
        assert_eq!(*lines.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_panicking_sink_is_contained() {
        let diagnostics = Diagnostics::new(Arc::new(|_: &str| panic!("sink is broken")));
        diagnostics.emit("ignored");
        // The lock must still be usable afterwards
        diagnostics.emit("ignored again");
    }

    #[test]
    fn test_concurrent_emit_keeps_every_line() {
        let (lines, diagnostics) = capture();
        let diagnostics = Arc::new(diagnostics);

        let workers: Vec<_> = (0..8)
            .map(|worker| {
                let diagnostics = diagnostics.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        diagnostics.emit(&format!("worker {worker} line {i}"));
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(lines.lock().unwrap().len(), 400);
    }

    #[test]
    fn test_nested_emit_from_sink() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let slot: Arc<Mutex<Option<Arc<Diagnostics>>>> = Arc::new(Mutex::new(None));

        let captured = lines.clone();
        let inner = slot.clone();
        let diagnostics = Arc::new(Diagnostics::new(Arc::new(move |line: &str| {
            captured.lock().unwrap().push(line.to_string());
            if line == "outer" {
                let nested = inner.lock().unwrap().clone();
                if let Some(nested) = nested {
                    nested.emit("inner");
                }
            }
        })));
        *slot.lock().unwrap() = Some(diagnostics.clone());

        diagnostics.emit("outer");
        diagnostics.emit("after");
        assert_eq!(*lines.lock().unwrap(), vec!["outer", "inner", "after"]);
    }

    #[test]
    fn test_builtin_sinks_do_not_fail() {
        LogSink.emit("to the log facade");
        StderrSink.emit("to stderr");
        Diagnostics::default().emit("default sink");
    }
}
