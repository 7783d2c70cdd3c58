//! The backtrackable character cursor.
//!
//! A [`Cursor`] pulls characters from a [`CharSource`] one at a time and keeps
//! every character it has pulled in a history buffer, so a grammar can step
//! back over text it has already read without asking the source to rewind.
//! Line, column and index are maintained in both directions, and every
//! position knows whether its character is the target of a live backslash.
//!
//! # Position model
//!
//! `index` counts the characters consumed so far and is therefore the offset
//! of the *next* character. `line` is 1-based; `column` counts the characters
//! consumed on the current line (a tab counts as `tab_size`). Before the first
//! read a cursor sits at line 1, column 0, index 0.
//!
//! # End of source
//!
//! [`Cursor::next`] at the end of the source returns `'\0'` without moving and
//! sets [`Cursor::end_of_source`]. The sentinel is undone by one
//! [`Cursor::back`], which clears the flag and leaves the index unchanged, so
//! `next` and `back` remain exact inverses even across the end.
//!
//! # History
//!
//! The history only shrinks when the grammar says so: [`Cursor::flush_history`]
//! and [`Cursor::trim_history`] discard retained text and are only allowed
//! when the cursor is at the tail of its history. Stepping back past the first
//! retained character is a contract violation and panics.

mod scan;
mod state;

use core::fmt;
use std::{
    fs::File,
    io::Read,
    path::Path,
    sync::{Arc, LazyLock},
};

use tracing::trace;

pub use scan::{Boundary, Chars};
use state::State;

use crate::{
    bookmark::Bookmark,
    chars::CharNames,
    error::{BoxedCause, ScanError, SyntaxError, Violation, fatal},
    options::ScannerOptions,
    source::{ByteSource, CharSource, ReaderSource, StrSource},
};

static DEFAULT_NAMES: LazyLock<Arc<CharNames>> = LazyLock::new(|| Arc::new(CharNames::default()));

/// A streaming, backtrackable reader over a labelled character source.
///
/// Configure a cursor with [`at`](Cursor::at), [`with_tab_size`](Cursor::with_tab_size),
/// [`with_names`](Cursor::with_names) or [`with_options`](Cursor::with_options)
/// before reading from it. Configuring a cursor that has already read is a
/// contract violation.
///
/// ```
/// use textscan::{Boundary, Cursor, DIGITS};
///
/// let mut cursor = Cursor::from_str("input", "42 apples");
/// let count = cursor.scan_while(&DIGITS, Boundary::Retain).unwrap();
/// assert_eq!(count, "42");
/// assert_eq!(cursor.index(), 2);
/// assert_eq!(cursor.next().unwrap(), ' ');
/// ```
pub struct Cursor {
    label: Arc<str>,
    source: Box<dyn CharSource>,
    names: Arc<CharNames>,
    state: State,
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("label", &self.label)
            .field("line", &self.state.line)
            .field("column", &self.state.column)
            .field("index", &self.state.index())
            .field("history", &self.state.len())
            .field("end_of_source", &self.state.at_end)
            .finish_non_exhaustive()
    }
}

impl Cursor {
    /// Wraps `source`, naming it `label` in diagnostics.
    pub fn open(label: impl Into<Arc<str>>, source: impl CharSource + 'static) -> Self {
        Self {
            label: label.into(),
            source: Box::new(source),
            names: Arc::clone(&DEFAULT_NAMES),
            state: State::new(ScannerOptions::default()),
        }
    }

    /// A cursor over an in-memory string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(label: impl Into<Arc<str>>, text: impl Into<String>) -> Self {
        Self::open(label, StrSource::new(text))
    }

    /// A cursor over UTF-8 bytes. Invalid sequences read as U+FFFD.
    pub fn from_bytes(label: impl Into<Arc<str>>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::open(label, ByteSource::new(bytes))
    }

    /// A cursor over a UTF-8 byte stream.
    pub fn from_reader(label: impl Into<Arc<str>>, reader: impl Read + 'static) -> Self {
        Self::open(label, ReaderSource::new(reader))
    }

    /// A cursor over a file, labelled with its path.
    ///
    /// # Errors
    ///
    /// [`ScanError::SourceRead`] if the file cannot be opened.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let label: Arc<str> = path.display().to_string().into();
        match File::open(path) {
            Ok(file) => Ok(Self::open(label, ReaderSource::new(file))),
            Err(source) => Err(ScanError::SourceRead { label, source }),
        }
    }

    /// A cursor over `text` whose positions continue from `bookmark`.
    ///
    /// Used to scan a section extracted from an enclosing document so that
    /// diagnostics point into the enclosing document.
    pub fn resume(bookmark: &Bookmark, text: impl Into<String>) -> Self {
        Self::from_str(Arc::clone(&bookmark.source), text)
            .with_tab_size(bookmark.tab_size)
            .at(bookmark.line, bookmark.column, bookmark.index)
    }

    fn ensure_unstarted(&self) {
        if self.state.started {
            fatal(Violation::AlreadyInitialized {
                label: Arc::clone(&self.label),
            });
        }
    }

    /// Sets the starting position.
    ///
    /// # Panics
    ///
    /// If the cursor has already read from its source.
    #[must_use]
    pub fn at(mut self, line: usize, column: usize, index: usize) -> Self {
        self.ensure_unstarted();
        self.state.place(line, column, index);
        self
    }

    /// Sets the number of columns a horizontal tab advances.
    ///
    /// # Panics
    ///
    /// If the cursor has already read from its source.
    #[must_use]
    pub fn with_tab_size(mut self, tab_size: usize) -> Self {
        self.ensure_unstarted();
        self.state.options.tab_size = tab_size;
        self
    }

    /// Replaces the character-name table used in diagnostics.
    ///
    /// # Panics
    ///
    /// If the cursor has already read from its source.
    #[must_use]
    pub fn with_names(mut self, names: Arc<CharNames>) -> Self {
        self.ensure_unstarted();
        self.names = names;
        self
    }

    /// Replaces all options at once.
    ///
    /// # Panics
    ///
    /// If the cursor has already read from its source.
    #[must_use]
    pub fn with_options(mut self, options: ScannerOptions) -> Self {
        self.ensure_unstarted();
        let (line, column, index) = (self.state.line, self.state.column, self.state.index());
        self.state = State::new(options);
        self.state.place(line, column, index);
        self
    }

    /// Label of the source, as used in diagnostics.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The character-name table.
    pub fn names(&self) -> &CharNames {
        &self.names
    }

    /// The options in effect.
    pub fn options(&self) -> ScannerOptions {
        self.state.options
    }

    /// Characters consumed so far; the offset of the next character.
    pub fn index(&self) -> usize {
        self.state.index()
    }

    /// 1-based line.
    pub fn line(&self) -> usize {
        self.state.line
    }

    /// Characters consumed on the current line.
    pub fn column(&self) -> usize {
        self.state.column
    }

    /// Whether the last [`next`](Cursor::next) hit the end of the source.
    pub fn end_of_source(&self) -> bool {
        self.state.at_end
    }

    /// Whether a character has been consumed, so [`current`](Cursor::current)
    /// is real input rather than the sentinel.
    pub(crate) fn has_current(&self) -> bool {
        !self.state.at_end && self.state.current().is_some()
    }

    /// Whether the current character is the target of a live backslash: it
    /// follows a `\` that is not itself escaped.
    pub fn escape_mode(&self) -> bool {
        !self.state.at_end && self.state.current().is_some_and(|u| u.escaped)
    }

    /// The character most recently returned by [`next`](Cursor::next):
    /// `'\0'` at the end of the source or before the first read.
    pub fn current(&self) -> char {
        if self.state.at_end {
            return '\0';
        }
        self.state.current().map_or('\0', |u| u.ch)
    }

    /// The character consumed before [`current`](Cursor::current), or `'\0'`.
    pub fn previous(&self) -> char {
        let unit = if self.state.at_end {
            self.state.current()
        } else {
            self.state.previous()
        };
        unit.map_or('\0', |u| u.ch)
    }

    /// Whether a call to [`next`](Cursor::next) would yield a character.
    ///
    /// At the tail of the history this reads one character ahead and holds it
    /// until the next call to `next`; the position does not change.
    ///
    /// # Errors
    ///
    /// [`ScanError::SourceRead`] if the source fails.
    pub fn have_next(&mut self) -> Result<bool, ScanError> {
        if self.state.at_end {
            return Ok(false);
        }
        if self.state.ahead() > 0 || self.state.lookahead.is_some() {
            return Ok(true);
        }
        let pulled = self.pull()?;
        self.state.lookahead = pulled;
        Ok(pulled.is_some())
    }

    /// Advances one character and returns it, or returns `'\0'` and sets
    /// [`end_of_source`](Cursor::end_of_source) when the source is exhausted.
    ///
    /// Inside the history this replays retained characters; at the tail it
    /// pulls exactly one character from the source.
    ///
    /// # Errors
    ///
    /// [`ScanError::SourceRead`] if the source fails.
    pub fn next(&mut self) -> Result<char, ScanError> {
        if self.state.at_end {
            return Ok('\0');
        }
        if let Some(ch) = self.state.replay() {
            return Ok(ch);
        }
        let pulled = match self.state.lookahead.take() {
            Some(ch) => Some(ch),
            None => self.pull()?,
        };
        if let Some(ch) = pulled {
            self.state.record(ch);
            Ok(ch)
        } else {
            self.state.at_end = true;
            Ok('\0')
        }
    }

    fn pull(&mut self) -> Result<Option<char>, ScanError> {
        self.state.started = true;
        if self.state.exhausted {
            return Ok(None);
        }
        match self.source.read_char() {
            Ok(Some(ch)) => Ok(Some(ch)),
            Ok(None) => {
                self.state.exhausted = true;
                Ok(None)
            }
            Err(source) => Err(ScanError::SourceRead {
                label: Arc::clone(&self.label),
                source,
            }),
        }
    }

    /// Steps back one character.
    ///
    /// At the end of the source this only clears the end flag, undoing the
    /// `next` that set it.
    ///
    /// # Panics
    ///
    /// If no retained character lies behind the cursor.
    #[track_caller]
    pub fn back(&mut self) {
        if self.state.at_end {
            self.state.at_end = false;
            return;
        }
        if !self.state.retreat() {
            fatal(Violation::OutOfHistory {
                index: self.state.index(),
            });
        }
    }

    /// Steps back `n` characters.
    ///
    /// # Panics
    ///
    /// If fewer than `n` retained characters lie behind the cursor.
    #[track_caller]
    pub fn back_n(&mut self, n: usize) {
        for _ in 0..n {
            self.back();
        }
    }

    /// Steps back over the character just read unless it was the end of the
    /// source. Used to hand a boundary character back to the caller.
    #[track_caller]
    pub fn unread(&mut self) {
        if !self.state.at_end {
            self.back();
        }
    }

    /// Steps back until `index() == to`, leaving the end of the source.
    ///
    /// # Panics
    ///
    /// If `to` is ahead of the cursor, or lies before the retained history.
    #[track_caller]
    pub fn walk_back(&mut self, to: usize) {
        let index = self.state.index();
        if to > index {
            fatal(Violation::WalkBackAhead { to, index });
        }
        self.state.at_end = false;
        while self.state.index() > to {
            self.back();
        }
    }

    /// Number of retained history characters.
    pub fn history_len(&self) -> usize {
        self.state.len()
    }

    /// Discards the whole history. The cursor cannot step back afterwards.
    ///
    /// # Panics
    ///
    /// If the cursor is browsing its history, that is, has stepped back and
    /// retained characters lie ahead of it.
    #[track_caller]
    pub fn flush_history(&mut self) {
        self.trim_history(0);
    }

    /// Discards all but the last `keep` retained characters.
    ///
    /// # Panics
    ///
    /// If retained characters lie ahead of the cursor.
    #[track_caller]
    pub fn trim_history(&mut self, keep: usize) {
        let ahead = self.state.ahead();
        if ahead > 0 {
            fatal(Violation::HistoryInUse { ahead });
        }
        let len = self.state.len();
        if keep >= len {
            return;
        }
        self.state.discard_front(len - keep);
        trace!(label = %self.label, index = self.state.index(), keep, "trimmed history");
    }

    /// Discards the history behind the cursor, keeping anything ahead of it.
    pub(crate) fn release_history(&mut self) {
        let behind = self.state.behind();
        if behind > 0 {
            self.state.discard_front(behind);
            trace!(label = %self.label, index = self.state.index(), released = behind, "released history");
        }
    }

    /// Snapshot of the current position.
    pub fn bookmark(&self) -> Bookmark {
        Bookmark {
            line: self.state.line,
            column: self.state.column,
            index: self.state.index(),
            source: Arc::clone(&self.label),
            tab_size: self.state.options.tab_size,
        }
    }

    /// Position of the next character: one past the cursor, or the cursor
    /// itself at the end of the source.
    ///
    /// # Errors
    ///
    /// [`ScanError::SourceRead`] if the source fails.
    pub fn next_bookmark(&mut self) -> Result<Bookmark, ScanError> {
        if self.state.at_end {
            return Ok(self.bookmark());
        }
        self.next()?;
        let bookmark = self.bookmark();
        self.back();
        Ok(bookmark)
    }

    /// A syntax error at the current position.
    pub fn syntax_error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(message, self.bookmark())
    }

    /// A syntax error at the current position, caused by `cause`.
    pub fn syntax_error_caused(
        &self,
        message: impl Into<String>,
        cause: impl Into<BoxedCause>,
    ) -> SyntaxError {
        self.syntax_error(message).with_cause(cause)
    }

    /// Iterates over the remaining characters, stopping at the end of the
    /// source without setting [`end_of_source`](Cursor::end_of_source).
    pub fn chars(&mut self) -> Chars<'_> {
        Chars::new(self)
    }
}
