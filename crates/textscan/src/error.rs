//! Error types.
//!
//! Two disjoint families live here:
//!
//! - [`ScanError`] covers failures caused by the input: malformed text,
//!   out-of-range escapes, and read failures from the underlying source. These
//!   are returned through `Result` and may be recovered from by a grammar (for
//!   example by cancelling an [`Attempt`](crate::Attempt) and trying another
//!   alternative).
//! - [`Violation`] covers misuse of the engine by the grammar built on top of
//!   it: stepping back past retained history, finishing an attempt twice,
//!   returning from an attempt without synchronizing the cursor. These are
//!   never returned. [`fatal`] logs them and panics.

use std::{error::Error as StdError, io, sync::Arc};

use thiserror::Error;

use crate::bookmark::Bookmark;

/// Boxed cause attached to a [`SyntaxError`].
pub type BoxedCause = Box<dyn StdError + Send + Sync + 'static>;

/// A malformed-input error at a known location.
///
/// The rendered message always ends with the [`Bookmark`] tag, so a top-level
/// caller can print the error as-is.
#[derive(Debug, Error)]
#[error("{message} {at}")]
pub struct SyntaxError {
    message: String,
    at: Bookmark,
    #[source]
    cause: Option<BoxedCause>,
}

impl SyntaxError {
    /// Creates an error with a message and location.
    pub fn new(message: impl Into<String>, at: Bookmark) -> Self {
        Self {
            message: message.into(),
            at,
            cause: None,
        }
    }

    /// Attaches the error that made this one happen.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<BoxedCause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// The message without the location tag.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where the error was detected.
    pub fn bookmark(&self) -> &Bookmark {
        &self.at
    }
}

/// Family of a numeric character escape, used in range errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeKind {
    /// `\0NNN`
    Octal,
    /// `\NNN`
    Decimal,
}

impl core::fmt::Display for EscapeKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EscapeKind::Octal => f.write_str("octal"),
            EscapeKind::Decimal => f.write_str("integer"),
        }
    }
}

/// Input-driven failure. Always carries enough information to point at the
/// offending text.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The text does not match what the grammar expected.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// A numeric escape evaluated to more than `max`.
    #[error("{kind} escape subscript out of range; expected at most {max}, have {value} {at}")]
    EscapeRange {
        /// Which numeric escape family overflowed.
        kind: EscapeKind,
        /// The decoded value.
        value: u32,
        /// The largest accepted value.
        max: u32,
        /// Where the escape starts.
        at: Bookmark,
    },
    /// A `\uXXXX` escape named a code unit that is not a Unicode scalar value.
    #[error("unicode escape \\u{value:04X} is not a scalar value {at}")]
    UnicodeEscape {
        /// The decoded code unit.
        value: u32,
        /// Where the escape starts.
        at: Bookmark,
    },
    /// The underlying character source failed.
    #[error("failed to read from `{label}`: {source}")]
    SourceRead {
        /// Label of the source that failed.
        label: Arc<str>,
        /// The I/O failure.
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    /// The location attached to this error, if it has one.
    pub fn bookmark(&self) -> Option<&Bookmark> {
        match self {
            ScanError::Syntax(e) => Some(e.bookmark()),
            ScanError::EscapeRange { at, .. } | ScanError::UnicodeEscape { at, .. } => Some(at),
            ScanError::SourceRead { .. } => None,
        }
    }
}

/// A broken engine contract. Seeing one of these means the grammar code is
/// wrong, not the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// `back()` was asked to move before the first retained character.
    #[error("cannot step back: no retained history before index {index}")]
    OutOfHistory {
        /// Index at which the step was attempted.
        index: usize,
    },
    /// `walk_back()` was given a destination ahead of the cursor.
    #[error("cannot walk back to index {to}: the cursor is at {index}")]
    WalkBackAhead {
        /// Requested destination.
        to: usize,
        /// Current index.
        index: usize,
    },
    /// History was flushed or trimmed while the cursor was browsing it.
    #[error("cannot discard history while browsing it ({ahead} characters ahead of the cursor)")]
    HistoryInUse {
        /// How many retained characters lie ahead of the cursor.
        ahead: usize,
    },
    /// A profile method was called after the first read.
    #[error("scanner `{label}` has already been initialized")]
    AlreadyInitialized {
        /// Source label.
        label: Arc<str>,
    },
    /// `finish()` was called on an attempt that already finished.
    #[error("{production}: parsing already finished")]
    DoubleFinish {
        /// Type name of the production.
        production: &'static str,
    },
    /// A successful attempt returned without calling `finish()`.
    #[error("{production}: parser must call finish before it exits")]
    UnfinishedAttempt {
        /// Type name of the production.
        production: &'static str,
    },
    /// A successful attempt left the cursor away from its recorded end.
    #[error(
        "{production}: parser did not synchronize its end result with the scanner state \
         (recorded end {end}, cursor at {index})"
    )]
    DesynchronizedAttempt {
        /// Type name of the production.
        production: &'static str,
        /// The recorded end offset.
        end: usize,
        /// The cursor index on return.
        index: usize,
    },
    /// A finished attempt was cancelled.
    #[error("{production}: cannot cancel a finished attempt")]
    FrozenAttempt {
        /// Type name of the production.
        production: &'static str,
    },
    /// A cancelled attempt still produced a value.
    #[error("{production}: cancelled attempt returned a value")]
    ValueFromCancelledAttempt {
        /// Type name of the production.
        production: &'static str,
    },
}

/// Logs a contract violation and aborts the current thread of parsing.
#[cold]
#[track_caller]
pub(crate) fn fatal(violation: Violation) -> ! {
    tracing::error!(%violation, "scanner contract violated");
    panic!("{violation}")
}
