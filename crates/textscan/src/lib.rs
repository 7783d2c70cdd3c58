//! A streaming, backtrackable text scanner for hand-written recursive-descent
//! grammars.
//!
//! The crate provides the pieces every grammar needs and nothing
//! grammar-specific:
//!
//! - [`Cursor`]: pulls characters from a labelled source, keeps a history so
//!   it can step back, and tracks line, column, index and backslash escapes
//!   in both directions.
//! - [`CharClass`]: immutable character sets used as boundaries, with a few
//!   common ASCII classes as statics.
//! - [`Escapes`]: pluggable expansion of backslash escapes.
//! - [`ScanMethod`]: a small character-driven state machine run by
//!   [`Cursor::run`].
//! - [`Production`] and [`parse`]: structured attempts that either match and
//!   stay synchronized with the cursor or rewind it completely.
//!
//! Errors come in two kinds. Malformed input is reported through
//! [`ScanError`], whose message ends with a [`Bookmark`] of the failure.
//! Misuse of the engine by a grammar (stepping back past retained history,
//! returning from a production without finishing it) is a [`Violation`] and
//! panics.
//!
//! ```
//! use textscan::{Attempt, Cursor, Parsed, Production, ScanError, parse};
//!
//! struct Word(String);
//!
//! impl Production for Word {
//!     type Args = ();
//!
//!     fn produce(cursor: &mut Cursor, attempt: &mut Attempt, (): ()) -> Result<Option<Self>, ScanError> {
//!         let word = cursor.next_alpha(0, usize::MAX)?;
//!         if word.is_empty() {
//!             return Ok(None);
//!         }
//!         attempt.finish(cursor);
//!         Ok(Some(Word(word)))
//!     }
//! }
//!
//! let mut cursor = Cursor::from_str("greeting", "hello, world");
//! let Parsed::Matched { value, .. } = parse::<Word>(&mut cursor, ()).unwrap() else {
//!     unreachable!()
//! };
//! assert_eq!(value.0, "hello");
//! assert!(!parse::<Word>(&mut cursor, ()).unwrap().is_matched());
//! assert_eq!(cursor.index(), 5);
//! ```

mod attempt;
mod bookmark;
mod chars;
mod cursor;
mod error;
mod escape;
mod method;
mod options;
mod source;

pub use attempt::{Attempt, Parsed, Production, Status, parse, parse_many};
pub use bookmark::Bookmark;
pub use chars::{
    CONTROL, CharClass, CharNames, DIGITS, HEX_DIGITS, LETTERS, LINE_END, LINE_FEED, LINE_SPACE,
    OCTAL_DIGITS, Pattern, PatternList, PatternMatch, RANGE_MAX, SPACE_TAB, SYMBOLS, WHITE_SPACE,
    WORD_BREAK, WordList,
};
pub use cursor::{Boundary, Chars, Cursor};
pub use error::{BoxedCause, EscapeKind, ScanError, SyntaxError, Violation};
pub use escape::{BasicEscapes, Escapes, Expand};
pub use method::{MethodBuffer, ScanMethod};
pub use options::ScannerOptions;
pub use source::{ByteSource, CharSource, ReaderSource, StrSource};
