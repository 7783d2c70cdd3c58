//! Structured parse attempts.
//!
//! A grammar production implements [`Production`] and is run through
//! [`parse`], which wraps it in an [`Attempt`] record and checks the record
//! on the way out:
//!
//! - a production that declines (returns `None`) leaves the cursor where the
//!   attempt started, so the caller can try the next alternative;
//! - a production that matches must have called [`Attempt::finish`], and the
//!   cursor must still be at the end it recorded.
//!
//! Breaking either rule is a bug in the grammar, reported as a
//! [`Violation`] panic rather than an error.

use tracing::debug;

use crate::{
    bookmark::Bookmark,
    cursor::Cursor,
    error::{ScanError, SyntaxError, Violation, fatal},
};

/// Outcome of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// Matching, or matched.
    Ok,
    /// Cancelled. The cursor is back at the start of the attempt.
    Failed,
}

/// The record of one production's attempt to match at a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    production: &'static str,
    status: Status,
    start: usize,
    end: usize,
    finished: bool,
    origin: Bookmark,
}

impl Attempt {
    fn new(production: &'static str, cursor: &Cursor) -> Self {
        let start = cursor.index();
        Self {
            production,
            status: if cursor.end_of_source() {
                Status::Failed
            } else {
                Status::Ok
            },
            start,
            end: start,
            finished: false,
            origin: cursor.bookmark(),
        }
    }

    /// Abandons the attempt: rewinds the cursor to the start and marks the
    /// attempt failed. Returns where the cursor was when the attempt gave up.
    ///
    /// Cancelling an already cancelled attempt only returns the position.
    ///
    /// # Panics
    ///
    /// If the attempt has finished.
    #[track_caller]
    pub fn cancel(&mut self, cursor: &mut Cursor) -> Bookmark {
        if self.finished {
            fatal(Violation::FrozenAttempt {
                production: self.production,
            });
        }
        let at = cursor.bookmark();
        if self.status == Status::Ok {
            cursor.walk_back(self.start);
            self.status = Status::Failed;
            self.end = self.start;
            debug!(production = self.production, start = self.start, gave_up_at = at.index, "attempt cancelled");
        }
        at
    }

    /// Records the current position as the end of a successful match.
    ///
    /// # Panics
    ///
    /// If called twice.
    #[track_caller]
    pub fn finish(&mut self, cursor: &Cursor) {
        if self.finished {
            fatal(Violation::DoubleFinish {
                production: self.production,
            });
        }
        self.end = cursor.index();
        self.finished = true;
    }

    /// Builds a syntax error at the current position and, unless the attempt
    /// has finished, cancels it.
    pub fn syntax_error(&mut self, cursor: &mut Cursor, message: impl Into<String>) -> ScanError {
        let at = if self.finished {
            cursor.bookmark()
        } else {
            self.cancel(cursor)
        };
        SyntaxError::new(message, at).into()
    }

    /// Current status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Whether the attempt has not been cancelled.
    pub fn is_successful(&self) -> bool {
        self.status == Status::Ok
    }

    /// Whether [`finish`](Attempt::finish) has been called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Index at which the attempt started.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Index recorded by [`finish`](Attempt::finish); the start until then,
    /// and after a cancel.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Where the attempt started.
    pub fn origin(&self) -> &Bookmark {
        &self.origin
    }

    /// Type name of the production, as used in violation reports.
    pub fn production(&self) -> &'static str {
        self.production
    }

    /// Characters matched so far: up to the cursor while running, up to the
    /// recorded end once finished, zero once cancelled.
    pub fn length(&self, cursor: &Cursor) -> usize {
        if self.finished || self.status == Status::Failed {
            self.end - self.start
        } else {
            cursor.index().saturating_sub(self.start)
        }
    }
}

/// A grammar production.
pub trait Production: Sized {
    /// Arguments passed by the caller of [`parse`].
    type Args;

    /// Release history behind the cursor after every successful match,
    /// bounding memory on long inputs once a production is confirmed.
    const AUTO_FLUSH: bool = false;

    /// Tries to match at the cursor.
    ///
    /// Return `Some` after calling [`Attempt::finish`] to accept, or `None`
    /// to decline. Declining does not require calling
    /// [`Attempt::cancel`]; the cursor is rewound either way.
    ///
    /// # Errors
    ///
    /// Input errors that should end the whole parse.
    fn produce(cursor: &mut Cursor, attempt: &mut Attempt, args: Self::Args) -> Result<Option<Self>, ScanError>;
}

/// Result of [`parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed<P> {
    /// The production matched.
    Matched {
        /// What the production built.
        value: P,
        /// The finished attempt.
        attempt: Attempt,
    },
    /// The production declined; the cursor has not moved.
    Failed {
        /// The cancelled attempt.
        attempt: Attempt,
    },
}

impl<P> Parsed<P> {
    /// The value, if the production matched.
    pub fn value(self) -> Option<P> {
        match self {
            Parsed::Matched { value, .. } => Some(value),
            Parsed::Failed { .. } => None,
        }
    }

    /// Whether the production matched.
    pub fn is_matched(&self) -> bool {
        matches!(self, Parsed::Matched { .. })
    }

    /// The attempt record.
    pub fn attempt(&self) -> &Attempt {
        match self {
            Parsed::Matched { attempt, .. } | Parsed::Failed { attempt } => attempt,
        }
    }
}

/// Runs production `P` at the cursor and checks that it kept its contract.
///
/// An attempt started at the end of the source fails without running `P`.
///
/// # Errors
///
/// Whatever `P` returns as an error. The cursor is left where the error was
/// raised.
///
/// # Panics
///
/// With a [`Violation`] if `P` matched without finishing, matched with the
/// cursor away from its recorded end, or returned a value after cancelling.
#[track_caller]
pub fn parse<P: Production>(cursor: &mut Cursor, args: P::Args) -> Result<Parsed<P>, ScanError> {
    let production = core::any::type_name::<P>();
    let mut attempt = Attempt::new(production, cursor);
    if !attempt.is_successful() {
        debug!(production, index = attempt.start, "attempt at end of source");
        return Ok(Parsed::Failed { attempt });
    }
    let Some(value) = P::produce(cursor, &mut attempt, args)? else {
        if attempt.is_successful() {
            attempt.cancel(cursor);
        }
        return Ok(Parsed::Failed { attempt });
    };
    if !attempt.is_successful() {
        fatal(Violation::ValueFromCancelledAttempt { production });
    }
    if !attempt.finished {
        fatal(Violation::UnfinishedAttempt { production });
    }
    if cursor.index() != attempt.end {
        fatal(Violation::DesynchronizedAttempt {
            production,
            end: attempt.end,
            index: cursor.index(),
        });
    }
    debug!(production, start = attempt.start, end = attempt.end, "attempt matched");
    if P::AUTO_FLUSH {
        cursor.release_history();
    }
    Ok(Parsed::Matched { value, attempt })
}

/// Runs `P` repeatedly, collecting every match until one declines or a
/// match consumes nothing.
///
/// # Errors
///
/// The first error raised by `P`.
///
/// # Panics
///
/// As [`parse`].
#[track_caller]
pub fn parse_many<P>(cursor: &mut Cursor, args: P::Args) -> Result<Vec<P>, ScanError>
where
    P: Production,
    P::Args: Clone,
{
    let mut out = Vec::new();
    while let Parsed::Matched { value, attempt } = parse::<P>(cursor, args.clone())? {
        out.push(value);
        if attempt.end == attempt.start {
            break;
        }
    }
    Ok(out)
}
