//! Character classes: immutable sets of characters used as boundary and
//! membership predicates by every "scan while/until" primitive.
//!
//! A class is assembled once, by range construction, merge and filter, and
//! is never mutated afterwards. The common ASCII classes are provided as
//! statics at the bottom of this module.
//!
//! Membership is split into a 128-bit ASCII bitmap (one shift and mask per
//! lookup) and a sorted vector for everything above U+007F.

mod names;
mod pattern;
mod words;

use std::borrow::Cow;
use core::ops::RangeInclusive;

pub use names::CharNames;
pub use pattern::{Pattern, PatternList, PatternMatch};
pub use words::WordList;

/// Largest code point a range may reach; bounds are clamped to
/// `[0, RANGE_MAX]`.
pub const RANGE_MAX: u32 = 0xFFFF;

/// An immutable set of characters with an optional human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CharClass {
    ascii: u128,
    /// Sorted, deduplicated, every element `> '\u{7F}'`.
    wide: Vec<char>,
    label: Option<Cow<'static, str>>,
}

const fn ascii_bits(lo: u8, hi: u8) -> u128 {
    let mut bits = 0u128;
    let mut c = lo;
    while c <= hi {
        bits |= 1u128 << c;
        c += 1;
    }
    bits
}

const fn ascii_bit(c: u8) -> u128 {
    1u128 << c
}

impl CharClass {
    /// The empty class.
    pub const fn empty() -> Self {
        Self {
            ascii: 0,
            wide: Vec::new(),
            label: None,
        }
    }

    const fn from_ascii_bits(ascii: u128, label: &'static str) -> Self {
        Self {
            ascii,
            wide: Vec::new(),
            label: Some(Cow::Borrowed(label)),
        }
    }

    /// All characters from `lo` to `hi` inclusive.
    ///
    /// Both bounds are clamped to `[0, 0xFFFF]`; surrogate code points in the
    /// range are skipped since they are not characters. A range whose low
    /// bound exceeds its high bound is empty.
    pub fn from_range(lo: u32, hi: u32) -> Self {
        let lo = lo.min(RANGE_MAX);
        let hi = hi.min(RANGE_MAX);
        let mut class = Self::empty();
        if lo > hi {
            return class;
        }
        for cp in lo..=hi {
            if let Some(c) = char::from_u32(cp) {
                class.insert(c);
            }
        }
        class
    }

    /// All characters of `chars`.
    pub fn of(chars: &str) -> Self {
        let mut class = Self::empty();
        for c in chars.chars() {
            class.insert(c);
        }
        class
    }

    /// Attaches a label used in diagnostics in place of the member list.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label, if one was attached.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Union with `other`. Never introduces duplicates.
    ///
    /// The result is unlabelled; the old label described a different set.
    #[must_use]
    pub fn merge(mut self, other: impl Into<CharClass>) -> Self {
        let other = other.into();
        self.label = None;
        self.ascii |= other.ascii;
        for c in other.wide {
            self.insert(c);
        }
        self
    }

    /// Set difference: removes every member of `other`. The result is
    /// unlabelled.
    #[must_use]
    pub fn filter(mut self, other: impl Into<CharClass>) -> Self {
        let other = other.into();
        self.label = None;
        self.ascii &= !other.ascii;
        if !other.wide.is_empty() {
            self.wide.retain(|c| other.wide.binary_search(c).is_err());
        }
        self
    }

    /// Whether `c` is a member.
    #[inline]
    pub fn contains(&self, c: char) -> bool {
        let cp = c as u32;
        if cp < 128 {
            self.ascii & (1u128 << cp) != 0
        } else {
            self.wide.binary_search(&c).is_ok()
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.ascii.count_ones() as usize + self.wide.len()
    }

    /// Whether the class has no members.
    pub fn is_empty(&self) -> bool {
        self.ascii == 0 && self.wide.is_empty()
    }

    /// Members in code point order.
    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        (0u8..128)
            .filter(|&b| self.ascii & (1u128 << b) != 0)
            .map(char::from)
            .chain(self.wide.iter().copied())
    }

    fn insert(&mut self, c: char) {
        let cp = c as u32;
        if cp < 128 {
            self.ascii |= 1u128 << cp;
        } else if let Err(at) = self.wide.binary_search(&c) {
            self.wide.insert(at, c);
        }
    }
}

impl From<&CharClass> for CharClass {
    fn from(class: &CharClass) -> Self {
        class.clone()
    }
}

impl From<&str> for CharClass {
    fn from(chars: &str) -> Self {
        CharClass::of(chars)
    }
}

impl From<char> for CharClass {
    fn from(c: char) -> Self {
        let mut class = CharClass::empty();
        class.insert(c);
        class
    }
}

impl From<RangeInclusive<char>> for CharClass {
    fn from(range: RangeInclusive<char>) -> Self {
        CharClass::from_range(*range.start() as u32, *range.end() as u32)
    }
}

impl FromIterator<char> for CharClass {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        let mut class = CharClass::empty();
        for c in iter {
            class.insert(c);
        }
        class
    }
}

const WHITE_SPACE_BITS: u128 = ascii_bits(9, 13) | ascii_bit(b' ');
const LINE_BREAK_BITS: u128 = ascii_bit(b'\n') | ascii_bit(b'\r');

/// `\t`, `\n`, vertical tab, form feed, `\r` and space.
pub static WHITE_SPACE: CharClass = CharClass::from_ascii_bits(WHITE_SPACE_BITS, "white space");

/// White space that does not break a line.
pub static LINE_SPACE: CharClass =
    CharClass::from_ascii_bits(WHITE_SPACE_BITS & !LINE_BREAK_BITS, "line space");

/// Space or horizontal tab.
pub static SPACE_TAB: CharClass =
    CharClass::from_ascii_bits(ascii_bit(b' ') | ascii_bit(b'\t'), "space or horizontal tab");

/// Line feed only.
pub static LINE_FEED: CharClass = CharClass::from_ascii_bits(ascii_bit(b'\n'), "line-feed");

/// Line feed or end of source; ends a line.
pub static LINE_END: CharClass =
    CharClass::from_ascii_bits(ascii_bit(b'\n') | ascii_bit(0), "line-feed or end of source");

/// White space or end of source; delimits words.
pub static WORD_BREAK: CharClass =
    CharClass::from_ascii_bits(WHITE_SPACE_BITS | ascii_bit(0), "word boundary");

/// `A-Z` and `a-z`.
pub static LETTERS: CharClass =
    CharClass::from_ascii_bits(ascii_bits(b'A', b'Z') | ascii_bits(b'a', b'z'), "letter");

/// `0-9`.
pub static DIGITS: CharClass = CharClass::from_ascii_bits(ascii_bits(b'0', b'9'), "digit");

/// `0-9`, `a-f` and `A-F`.
pub static HEX_DIGITS: CharClass = CharClass::from_ascii_bits(
    ascii_bits(b'0', b'9') | ascii_bits(b'a', b'f') | ascii_bits(b'A', b'F'),
    "hex digit",
);

/// `0-7`.
pub static OCTAL_DIGITS: CharClass =
    CharClass::from_ascii_bits(ascii_bits(b'0', b'7'), "octal digit");

/// ASCII control characters that are not white space.
pub static CONTROL: CharClass = CharClass::from_ascii_bits(
    (ascii_bits(0, 31) | ascii_bit(127)) & !WHITE_SPACE_BITS,
    "control character",
);

/// ASCII punctuation and symbols.
pub static SYMBOLS: CharClass = CharClass::from_ascii_bits(
    ascii_bits(33, 47) | ascii_bits(58, 64) | ascii_bits(91, 96) | ascii_bits(123, 126),
    "symbol",
);
