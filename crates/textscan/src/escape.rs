//! Backslash escape expansion.
//!
//! An expander is invoked with the cursor on the character that follows a
//! live backslash and returns the text the escape stands for. Expansion runs
//! through up to three tiers: a grammar's custom expander, the built-in table
//! ([`BasicEscapes`]), then a grammar's fallback. The first tier that returns
//! `Some` wins; if every tier declines, the escaped character stands for
//! itself.
//!
//! A tier that declines must leave the cursor where it found it.

use core::fmt;

use crate::{
    cursor::Cursor,
    error::{EscapeKind, ScanError},
};

/// One tier of escape expansion.
pub trait Expand {
    /// Expands the escape whose first character is `cursor.current()`, or
    /// returns `None` to let the next tier try.
    ///
    /// # Errors
    ///
    /// Any input error found while reading the escape.
    fn expand(&self, cursor: &mut Cursor) -> Result<Option<String>, ScanError>;
}

impl<F> Expand for F
where
    F: Fn(&mut Cursor) -> Result<Option<String>, ScanError>,
{
    fn expand(&self, cursor: &mut Cursor) -> Result<Option<String>, ScanError> {
        self(cursor)
    }
}

/// The built-in escape table.
///
/// | Escape | Meaning |
/// |---|---|
/// | `\d` `\e` | delete, escape |
/// | `\t` `\b` `\v` `\r` `\n` `\f` | the usual control characters |
/// | `\uXXXX` | exactly four hex digits |
/// | `\0xH`..`\0xHHHH` | one to four hex digits |
/// | `\0`, `\0N`..`\0NNN` | up to three octal digits, at most `0377` |
/// | `\N`..`\NNN` | up to three decimal digits, at most `255` |
///
/// Every other character is declined.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicEscapes;

const BYTE_MAX: u32 = 0xFF;

fn value_of(digits: &str, radix: u32) -> u32 {
    digits
        .chars()
        .filter_map(|d| d.to_digit(radix))
        .fold(0, |value, d| value * radix + d)
}

fn byte(cursor: &mut Cursor, start: usize, kind: EscapeKind, value: u32) -> Result<char, ScanError> {
    match u8::try_from(value) {
        Ok(b) => Ok(char::from(b)),
        Err(_) => {
            cursor.walk_back(start);
            Err(ScanError::EscapeRange {
                kind,
                value,
                max: BYTE_MAX,
                at: cursor.bookmark(),
            })
        }
    }
}

fn code_unit(cursor: &mut Cursor, start: usize, min: usize, max: usize) -> Result<char, ScanError> {
    let digits = match cursor.next_hex(min, max) {
        Ok(digits) => digits,
        Err(e) => {
            cursor.walk_back(start);
            return Err(e);
        }
    };
    let value = value_of(&digits, 16);
    if let Some(c) = char::from_u32(value) {
        return Ok(c);
    }
    cursor.walk_back(start);
    Err(ScanError::UnicodeEscape {
        value,
        at: cursor.bookmark(),
    })
}

impl Expand for BasicEscapes {
    fn expand(&self, cursor: &mut Cursor) -> Result<Option<String>, ScanError> {
        let start = cursor.index();
        let first = cursor.current();
        let c = match first {
            'd' => '\u{7F}',
            'e' => '\u{1B}',
            't' => '\t',
            'b' => '\u{08}',
            'v' => '\u{0B}',
            'r' => '\r',
            'n' => '\n',
            'f' => '\u{0C}',
            'u' => code_unit(cursor, start, 4, 4)?,
            '0' => {
                let x = cursor.next()?;
                if x == 'x' && !cursor.end_of_source() {
                    code_unit(cursor, start, 1, 4)?
                } else {
                    cursor.back();
                    let digits = cursor.next_octal(0, 3)?;
                    byte(cursor, start, EscapeKind::Octal, value_of(&digits, 8))?
                }
            }
            '1'..='9' => {
                let digits = format!("{first}{}", cursor.next_digits(0, 2)?);
                byte(cursor, start, EscapeKind::Decimal, value_of(&digits, 10))?
            }
            _ => return Ok(None),
        };
        Ok(Some(c.to_string()))
    }
}

/// The full expansion chain used by
/// [`Cursor::next_field_expanded`](crate::Cursor::next_field_expanded).
///
/// [`Escapes::default`] runs only the built-in table.
#[derive(Default)]
pub struct Escapes {
    custom: Option<Box<dyn Expand>>,
    fallback: Option<Box<dyn Expand>>,
}

impl fmt::Debug for Escapes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Escapes")
            .field("custom", &self.custom.is_some())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl Escapes {
    /// The built-in table alone.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consults `custom` before the built-in table.
    #[must_use]
    pub fn with_custom(mut self, custom: impl Expand + 'static) -> Self {
        self.custom = Some(Box::new(custom));
        self
    }

    /// Consults `fallback` when the built-in table declines.
    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Expand + 'static) -> Self {
        self.fallback = Some(Box::new(fallback));
        self
    }

    /// Expands the escape at the cursor.
    ///
    /// # Errors
    ///
    /// Whatever the tier that handles the escape reports.
    pub fn expand(&self, cursor: &mut Cursor) -> Result<String, ScanError> {
        if let Some(custom) = &self.custom {
            if let Some(text) = custom.expand(cursor)? {
                return Ok(text);
            }
        }
        if let Some(text) = BasicEscapes.expand(cursor)? {
            return Ok(text);
        }
        if let Some(fallback) = &self.fallback {
            if let Some(text) = fallback.expand(cursor)? {
                return Ok(text);
            }
        }
        Ok(cursor.current().to_string())
    }
}
