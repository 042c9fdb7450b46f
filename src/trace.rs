//
// Copyright 2024 asterix Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # The process-wide diagnostic sink (`spec.md` §4.8).
//!
//! A [`Tracer`] is explicit configuration state: a log level and an
//! installable sink. The crate also keeps one lazily-initialized global
//! instance for legacy call sites that have no `Tracer` handle to thread
//! through (`spec.md` §9: "keep a global only as a fallback for legacy
//! callers"); every decode-path call in this crate goes through
//! [`global`]/[`emit_error`], but tests construct their own [`Tracer`] and
//! reset the global between cases, per `spec.md` §5.

use std::fmt::Display;
use std::sync::{Mutex, OnceLock};

use crate::error::Error;

/// Maximum length, in bytes, of a formatted diagnostic line. Mirrors the
/// fixed 1024-byte stack buffer the original C implementation formats error
/// messages into; longer messages are truncated rather than allocated
/// without bound.
pub const MAX_MESSAGE_LEN: usize = 1024;

/// One of the two legacy sink callback shapes (`spec.md` §6).
#[derive(Clone, Copy)]
enum Sink {
    /// No sink installed: write to standard output.
    Default,
    /// `(const char*) -> int` shape.
    Typed(fn(&str) -> i32),
    /// `(const char*) -> void` shape.
    Untyped(fn(&str)),
}

/// Process-wide tracer configuration: log level plus installed sink.
pub struct Tracer {
    level: u32,
    sink: Sink,
}

impl Default for Tracer {
    fn default() -> Self {
        Tracer { level: 0, sink: Sink::Default }
    }
}

impl Tracer {
    pub fn new() -> Self {
        Tracer::default()
    }

    /// Sets the trace level; `0` is silent, `>= 1` emits errors.
    pub fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Installs the `(const char*) -> int` sink shape, taking precedence
    /// over any untyped sink or the default stdout writer.
    pub fn install_typed_sink(&mut self, sink: fn(&str) -> i32) {
        self.sink = Sink::Typed(sink);
    }

    /// Installs the `(const char*) -> void` sink shape.
    pub fn install_untyped_sink(&mut self, sink: fn(&str)) {
        self.sink = Sink::Untyped(sink);
    }

    /// Reverts to the default stdout sink.
    pub fn reset_sink(&mut self) {
        self.sink = Sink::Default;
    }

    /// Formats and dispatches one diagnostic line for `error`, gated on the
    /// configured level and on `Error::is_silent` (*EnumMiss* never traces,
    /// per `spec.md` §7).
    pub fn trace_error(&self, error: &Error) {
        if self.level < 1 || error.is_silent() {
            return;
        }
        self.trace_line(&error.to_string());
    }

    /// Formats and dispatches an arbitrary diagnostic line, truncated to
    /// [`MAX_MESSAGE_LEN`] bytes at a UTF-8 boundary.
    pub fn trace_line(&self, message: &str) {
        if self.level < 1 {
            return;
        }
        let truncated = truncate_utf8(message, MAX_MESSAGE_LEN);
        match self.sink {
            Sink::Typed(f) => {
                let _ = f(truncated);
            }
            Sink::Untyped(f) => f(truncated),
            Sink::Default => {
                log::error!("{}", truncated);
                println!("{}", truncated);
            }
        }
    }
}

fn truncate_utf8(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn global_state() -> &'static Mutex<Tracer> {
    static STATE: OnceLock<Mutex<Tracer>> = OnceLock::new();
    STATE.get_or_init(|| Mutex::new(Tracer::default()))
}

/// Configures the global tracer's level. Callers mutating this concurrently
/// with decoding must serialize their own `configure` calls (`spec.md` §5).
pub fn configure(level: u32) {
    global_state().lock().unwrap().set_level(level);
}

pub fn install_typed_sink(sink: fn(&str) -> i32) {
    global_state().lock().unwrap().install_typed_sink(sink);
}

pub fn install_untyped_sink(sink: fn(&str)) {
    global_state().lock().unwrap().install_untyped_sink(sink);
}

/// Explicit teardown: reverts the global tracer to its default, silent
/// state. Tests should call this between cases (`spec.md` §5).
pub fn teardown() {
    let mut guard = global_state().lock().unwrap();
    *guard = Tracer::default();
}

/// Emits one diagnostic line through the global tracer.
pub fn emit_error(error: &Error) {
    global_state().lock().unwrap().trace_error(error);
}

/// Emits an arbitrary message through the global tracer (used for
/// conditions, like *UnknownCategory*, that are not `Error` variants on a
/// decoded value but still warrant a trace line per `spec.md` §7/§8).
pub fn emit(message: impl Display) {
    global_state().lock().unwrap().trace_line(&message.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static CALLS: AtomicUsize = AtomicUsize::new(0);

    fn counting_sink(_msg: &str) -> i32 {
        CALLS.fetch_add(1, Ordering::SeqCst);
        0
    }

    #[test]
    fn silent_level_suppresses_output() {
        let mut tracer = Tracer::new();
        tracer.set_level(0);
        tracer.install_typed_sink(counting_sink);
        let before = CALLS.load(Ordering::SeqCst);
        tracer.trace_error(&Error::UnknownCategory);
        assert_eq!(CALLS.load(Ordering::SeqCst), before);
    }

    #[test]
    fn enum_miss_never_traces_even_at_high_level() {
        let mut tracer = Tracer::new();
        tracer.set_level(5);
        tracer.install_typed_sink(counting_sink);
        let before = CALLS.load(Ordering::SeqCst);
        tracer.trace_error(&Error::EnumMiss);
        assert_eq!(CALLS.load(Ordering::SeqCst), before);
    }

    #[test]
    fn level_at_least_one_invokes_installed_sink() {
        let mut tracer = Tracer::new();
        tracer.set_level(1);
        tracer.install_typed_sink(counting_sink);
        let before = CALLS.load(Ordering::SeqCst);
        tracer.trace_error(&Error::Truncated);
        assert_eq!(CALLS.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn message_longer_than_buffer_is_truncated() {
        let long = "x".repeat(MAX_MESSAGE_LEN + 100);
        let truncated = truncate_utf8(&long, MAX_MESSAGE_LEN);
        assert_eq!(truncated.len(), MAX_MESSAGE_LEN);
    }

    #[test]
    fn global_teardown_resets_to_silent_default() {
        configure(3);
        teardown();
        assert_eq!(global_state().lock().unwrap().level(), 0);
    }
}
