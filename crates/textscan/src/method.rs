//! Composable scanning methods.
//!
//! A [`ScanMethod`] is a small state machine driven by [`Cursor::run`] or
//! [`Cursor::branch`]:
//!
//! ```text
//! fresh -> start -> { next -> collect -> terminate? -> scan? }* -> compile
//! ```
//!
//! The value passed to `run` is a template. Every invocation builds its own
//! instance with [`ScanMethod::fresh`] and its own [`MethodBuffer`], so one
//! template can be run repeatedly or recursively from inside its own hooks
//! without invocations seeing each other's text.

use tracing::trace;

use crate::{cursor::Cursor, error::ScanError};

/// Accumulated text of one method invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodBuffer {
    text: String,
}

impl MethodBuffer {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a character.
    pub fn collect(&mut self, ch: char) {
        self.text.push(ch);
    }

    /// Appends text.
    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Replaces the most recently collected character with `ch`.
    pub fn swap(&mut self, ch: char) {
        self.text.pop();
        self.text.push(ch);
    }

    /// Replaces the most recently collected character with `text`, which may
    /// be empty.
    pub fn swap_str(&mut self, text: &str) {
        self.text.pop();
        self.text.push_str(text);
    }

    /// Removes and returns the last character.
    pub fn pop(&mut self) -> Option<char> {
        self.text.pop()
    }

    fn split_point(&self, n: usize) -> usize {
        if n == 0 {
            return self.text.len();
        }
        self.text.char_indices().rev().nth(n - 1).map_or(0, |(at, _)| at)
    }

    /// Removes and returns the last `n` characters, or all of them if there
    /// are fewer.
    pub fn pop_n(&mut self, n: usize) -> String {
        let at = self.split_point(n);
        self.text.split_off(at)
    }

    /// The last `n` characters, or all of them if there are fewer.
    pub fn peek_n(&self, n: usize) -> &str {
        &self.text[self.split_point(n)..]
    }

    /// The last collected character.
    pub fn last(&self) -> Option<char> {
        self.text.chars().next_back()
    }

    /// Un-reads the character just read and drops it from the buffer.
    ///
    /// At the end of the source only the end is undone: the sentinel is never
    /// collected by the default [`ScanMethod::collect`].
    pub fn back_step(&mut self, cursor: &mut Cursor) {
        if !cursor.end_of_source() {
            self.text.pop();
        }
        cursor.back();
    }

    /// Walks the cursor back to `index`, dropping one collected character per
    /// character stepped over.
    ///
    /// # Panics
    ///
    /// As [`Cursor::walk_back`].
    pub fn back_step_to(&mut self, cursor: &mut Cursor, index: usize) {
        let steps = cursor.index().saturating_sub(index);
        cursor.walk_back(index);
        self.pop_n(steps);
    }

    /// The collected text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Takes the collected text.
    pub fn into_string(self) -> String {
        self.text
    }
}

/// A character-driven scanning unit.
///
/// Implementors hold only per-invocation state; everything needed to build
/// that state comes from `fresh` and `start`.
pub trait ScanMethod {
    /// Arguments handed to [`start`](ScanMethod::start).
    type Args;
    /// Result of [`compile`](ScanMethod::compile).
    type Output;

    /// A new instance for one invocation of this template.
    #[must_use]
    fn fresh(&self) -> Self
    where
        Self: Sized;

    /// One-time setup. May consume characters, for example leading space.
    ///
    /// # Errors
    ///
    /// Any input error; the invocation stops.
    fn start(&mut self, cursor: &mut Cursor, buf: &mut MethodBuffer, args: Self::Args) -> Result<(), ScanError> {
        let _ = (cursor, buf, args);
        Ok(())
    }

    /// Receives each character read. By default appends it, except for the
    /// end-of-source sentinel.
    ///
    /// # Errors
    ///
    /// Any input error; the invocation stops.
    fn collect(&mut self, cursor: &mut Cursor, buf: &mut MethodBuffer, ch: char) -> Result<(), ScanError> {
        if !(ch == '\0' && cursor.end_of_source()) {
            buf.collect(ch);
        }
        Ok(())
    }

    /// Whether `ch`, already collected, ends the loop. By default the loop
    /// ends on `'\0'`.
    ///
    /// # Errors
    ///
    /// Any input error; the invocation stops.
    fn terminate(&mut self, cursor: &mut Cursor, buf: &mut MethodBuffer, ch: char) -> Result<bool, ScanError> {
        let _ = (cursor, buf);
        Ok(ch == '\0')
    }

    /// Whether to keep reading after a character that did not terminate.
    ///
    /// # Errors
    ///
    /// Any input error; the invocation stops.
    fn scan(&mut self, cursor: &mut Cursor, buf: &mut MethodBuffer) -> Result<bool, ScanError> {
        let _ = (cursor, buf);
        Ok(true)
    }

    /// Turns the collected text into the method's result.
    ///
    /// # Errors
    ///
    /// Any input error.
    fn compile(self, cursor: &mut Cursor, buf: MethodBuffer) -> Result<Self::Output, ScanError>;
}

impl Cursor {
    /// Runs a fresh instance of `template`, reading from the next character.
    ///
    /// The loop also stops at the end of the source, whatever `terminate`
    /// says.
    ///
    /// # Errors
    ///
    /// The first error raised by the method's hooks or by the cursor.
    pub fn run<M: ScanMethod>(&mut self, template: &M, args: M::Args) -> Result<M::Output, ScanError> {
        let mut method = template.fresh();
        let mut buf = MethodBuffer::new();
        trace!(method = core::any::type_name::<M>(), index = self.index(), "run");
        method.start(self, &mut buf, args)?;
        self.drive(&mut method, &mut buf)?;
        method.compile(self, buf)
    }

    /// Runs a fresh instance of `template` starting with the character
    /// already under the cursor, for callers that have peeked the character
    /// that triggers the method. With nothing consumed yet it behaves like
    /// [`run`](Cursor::run).
    ///
    /// # Errors
    ///
    /// The first error raised by the method's hooks or by the cursor.
    pub fn branch<M: ScanMethod>(&mut self, template: &M, args: M::Args) -> Result<M::Output, ScanError> {
        let mut method = template.fresh();
        let mut buf = MethodBuffer::new();
        trace!(method = core::any::type_name::<M>(), index = self.index(), "branch");
        method.start(self, &mut buf, args)?;
        if !self.has_current() && !self.end_of_source() {
            // Nothing under the cursor yet.
            self.drive(&mut method, &mut buf)?;
            return method.compile(self, buf);
        }
        let c = self.current();
        method.collect(self, &mut buf, c)?;
        if !method.terminate(self, &mut buf, c)? && method.scan(self, &mut buf)? && !self.end_of_source() {
            self.drive(&mut method, &mut buf)?;
        }
        method.compile(self, buf)
    }

    fn drive<M: ScanMethod>(&mut self, method: &mut M, buf: &mut MethodBuffer) -> Result<(), ScanError> {
        loop {
            let c = self.next()?;
            method.collect(self, buf, c)?;
            if method.terminate(self, buf, c)? {
                return Ok(());
            }
            if !method.scan(self, buf)? || self.end_of_source() {
                return Ok(());
            }
        }
    }
}
