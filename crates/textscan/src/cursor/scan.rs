//! Scanning primitives built on `next`/`back`.
//!
//! Every primitive that reads past a boundary either consumes it or hands it
//! back according to a [`Boundary`] argument. A class that contains `'\0'`
//! accepts the end of the source as its boundary; any other class reports a
//! syntax error when the source ends first.
//!
//! Primitives that fail a length or shape check rewind to where they started
//! before returning the error, so a grammar can try something else.

use super::Cursor;
use crate::{
    chars::{
        CharClass, DIGITS, HEX_DIGITS, LETTERS, LINE_END, OCTAL_DIGITS, Pattern, PatternList, PatternMatch,
        SPACE_TAB, WHITE_SPACE, WORD_BREAK, WordList,
    },
    error::ScanError,
    escape::Escapes,
};

/// What to do with the character that ended a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Consume it. [`Cursor::current`] returns it afterwards.
    Eat,
    /// Step back so the next read returns it again.
    Retain,
}

/// A position to return to after a look ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Mark {
    index: usize,
    at_end: bool,
}

impl Cursor {
    pub(crate) fn mark(&self) -> Mark {
        Mark {
            index: self.state.index(),
            at_end: self.state.at_end,
        }
    }

    pub(crate) fn restore(&mut self, mark: Mark) {
        self.walk_back(mark.index);
        self.state.at_end = mark.at_end;
    }

    fn unmatched_end(&self, class: &CharClass) -> ScanError {
        self.syntax_error(format!(
            "expected {} and found end of source",
            self.names.describe_class(class)
        ))
        .into()
    }

    /// Renders what lies ahead for a diagnostic: the next word, the next
    /// character if no word starts here, or "end of source".
    fn found(&mut self) -> Result<String, ScanError> {
        if !self.have_next()? {
            return Ok("end of source".to_owned());
        }
        let word = self.preview_word()?;
        if !word.is_empty() {
            return Ok(format!("`{word}'"));
        }
        let c = self.next()?;
        self.back();
        Ok(self.names.describe(c).into_owned())
    }

    /// Consumes characters while they belong to `class`.
    ///
    /// Stops quietly at the end of the source.
    ///
    /// # Errors
    ///
    /// [`ScanError::SourceRead`] if the source fails.
    pub fn scan_while(&mut self, class: &CharClass, boundary: Boundary) -> Result<String, ScanError> {
        self.scan_while_bounded(class, usize::MAX, boundary)
    }

    /// [`scan_while`](Cursor::scan_while) consuming at most `max` characters.
    /// Reaching `max` does not read a boundary.
    ///
    /// # Errors
    ///
    /// [`ScanError::SourceRead`] if the source fails.
    pub fn scan_while_bounded(
        &mut self,
        class: &CharClass,
        max: usize,
        boundary: Boundary,
    ) -> Result<String, ScanError> {
        let mut out = String::new();
        let mut taken = 0;
        while taken < max {
            let c = self.next()?;
            if self.end_of_source() {
                break;
            }
            if !class.contains(c) {
                if boundary == Boundary::Retain {
                    self.back();
                }
                break;
            }
            out.push(c);
            taken += 1;
        }
        Ok(out)
    }

    /// Consumes characters until one belongs to `class`.
    ///
    /// # Errors
    ///
    /// A syntax error if the source ends first and `class` does not contain
    /// `'\0'`; [`ScanError::SourceRead`] if the source fails.
    pub fn scan_until(&mut self, class: &CharClass, boundary: Boundary) -> Result<String, ScanError> {
        self.scan_until_bounded(class, usize::MAX, boundary)
    }

    /// [`scan_until`](Cursor::scan_until) consuming at most `max` characters.
    ///
    /// # Errors
    ///
    /// As [`scan_until`](Cursor::scan_until).
    pub fn scan_until_bounded(
        &mut self,
        class: &CharClass,
        max: usize,
        boundary: Boundary,
    ) -> Result<String, ScanError> {
        let mut out = String::new();
        let mut taken = 0;
        while taken < max {
            let c = self.next()?;
            if self.end_of_source() {
                if class.contains('\0') {
                    break;
                }
                return Err(self.unmatched_end(class));
            }
            if class.contains(c) {
                if boundary == Boundary::Retain {
                    self.back();
                }
                break;
            }
            out.push(c);
            taken += 1;
        }
        Ok(out)
    }

    /// Consumes `expected` or fails without moving.
    ///
    /// # Errors
    ///
    /// A syntax error naming the character found instead.
    pub fn expect_char(&mut self, expected: char) -> Result<char, ScanError> {
        let c = self.next()?;
        if self.end_of_source() || c != expected {
            let found = if self.end_of_source() {
                "end of source".into()
            } else {
                self.names.describe(c)
            };
            let message = format!("expected {} and found {found}", self.names.describe(expected));
            self.back();
            return Err(self.syntax_error(message).into());
        }
        Ok(c)
    }

    /// Up to `n` characters; fewer if the source ends first.
    ///
    /// # Errors
    ///
    /// [`ScanError::SourceRead`] if the source fails.
    pub fn next_length(&mut self, n: usize) -> Result<String, ScanError> {
        let mut out = String::new();
        for _ in 0..n {
            let c = self.next()?;
            if self.end_of_source() {
                break;
            }
            out.push(c);
        }
        Ok(out)
    }

    /// Characters up to the next [`WORD_BREAK`], which is retained.
    ///
    /// # Errors
    ///
    /// [`ScanError::SourceRead`] if the source fails.
    pub fn next_word(&mut self) -> Result<String, ScanError> {
        self.next_word_bounded(usize::MAX)
    }

    /// [`next_word`](Cursor::next_word) of at most `max` characters.
    ///
    /// # Errors
    ///
    /// [`ScanError::SourceRead`] if the source fails.
    pub fn next_word_bounded(&mut self, max: usize) -> Result<String, ScanError> {
        self.scan_until_bounded(&WORD_BREAK, max, Boundary::Retain)
    }

    /// The next word, without consuming it.
    ///
    /// # Errors
    ///
    /// [`ScanError::SourceRead`] if the source fails.
    pub fn preview_word(&mut self) -> Result<String, ScanError> {
        let mark = self.mark();
        let word = self.next_word()?;
        self.restore(mark);
        Ok(word)
    }

    /// Consumes exactly `word`, or fails without moving.
    ///
    /// # Errors
    ///
    /// A syntax error naming what was found instead.
    pub fn expect_word(&mut self, word: &str) -> Result<(), ScanError> {
        let mark = self.mark();
        let got = self.next_length(word.chars().count())?;
        if got == word {
            return Ok(());
        }
        self.restore(mark);
        let found = self.found()?;
        Err(self.syntax_error(format!("expected `{word}' and found {found}")).into())
    }

    /// Whether the next word starts with `word`. Never moves the cursor.
    ///
    /// The comparison reads at most as many characters as `word` has and
    /// stops at a word break, so `"<"` matches ahead of `"<<"`.
    ///
    /// # Errors
    ///
    /// [`ScanError::SourceRead`] if the source fails.
    pub fn match_word(&mut self, case_sensitive: bool, word: &str) -> Result<bool, ScanError> {
        let mark = self.mark();
        let got = self.next_word_bounded(word.chars().count())?;
        self.restore(mark);
        Ok(if case_sensitive {
            got == word
        } else {
            got.to_lowercase() == word.to_lowercase()
        })
    }

    /// Consumes the first word of `words` that matches, longest first.
    ///
    /// The returned text is as it appears in the source, which differs from
    /// the list entry when matching case-insensitively.
    ///
    /// # Errors
    ///
    /// A syntax error naming the list's label if nothing matches.
    pub fn next_word_from(&mut self, words: &WordList, case_sensitive: bool) -> Result<String, ScanError> {
        for word in words.iter() {
            if self.match_word(case_sensitive, word)? {
                return self.next_length(word.chars().count());
            }
        }
        let found = self.found()?;
        Err(self
            .syntax_error(format!("expected {} and found {found}", words.label()))
            .into())
    }

    /// Characters up to the first member of `delimiters`, which is consumed
    /// and readable through [`current`](Cursor::current).
    ///
    /// # Errors
    ///
    /// As [`scan_until`](Cursor::scan_until).
    pub fn next_field(&mut self, delimiters: &CharClass) -> Result<String, ScanError> {
        self.scan_until(delimiters, Boundary::Eat)
    }

    /// At most `max` characters up to the first member of `delimiters`, which
    /// is retained.
    ///
    /// # Errors
    ///
    /// As [`scan_until`](Cursor::scan_until).
    pub fn next_field_bounded(&mut self, max: usize, delimiters: &CharClass) -> Result<String, ScanError> {
        self.scan_until_bounded(delimiters, max, Boundary::Retain)
    }

    /// [`next_field`](Cursor::next_field) with backslash escapes expanded by
    /// `escapes`. An escaped delimiter does not end the field.
    ///
    /// # Errors
    ///
    /// As [`scan_until`](Cursor::scan_until), a syntax error for a backslash
    /// at the end of the source, and any error raised by `escapes`.
    pub fn next_field_expanded(
        &mut self,
        delimiters: &CharClass,
        escapes: &Escapes,
    ) -> Result<String, ScanError> {
        let mut out = String::new();
        loop {
            let c = self.next()?;
            if self.end_of_source() {
                if delimiters.contains('\0') {
                    return Ok(out);
                }
                return Err(self.unmatched_end(delimiters));
            }
            if c == '\\' && !self.escape_mode() {
                self.next()?;
                if self.end_of_source() {
                    return Err(self
                        .syntax_error(format!(
                            "escape detected at end of source while scanning for {}",
                            self.names.describe_class(delimiters)
                        ))
                        .into());
                }
                out.push_str(&escapes.expand(self)?);
                continue;
            }
            if delimiters.contains(c) {
                return Ok(out);
            }
            out.push(c);
        }
    }

    /// The rest of the line. The line feed is consumed and not returned, nor
    /// is a carriage return before it. The last line may end at the end of
    /// the source.
    ///
    /// # Errors
    ///
    /// [`ScanError::SourceRead`] if the source fails.
    pub fn next_line(&mut self) -> Result<String, ScanError> {
        let mut line = self.scan_until(&LINE_END, Boundary::Eat)?;
        if line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }

    /// Spaces and tabs.
    ///
    /// # Errors
    ///
    /// [`ScanError::SourceRead`] if the source fails.
    pub fn next_line_space(&mut self) -> Result<String, ScanError> {
        self.scan_while(&SPACE_TAB, Boundary::Retain)
    }

    /// Any white space, line breaks included.
    ///
    /// # Errors
    ///
    /// [`ScanError::SourceRead`] if the source fails.
    pub fn next_white_space(&mut self) -> Result<String, ScanError> {
        self.scan_while(&WHITE_SPACE, Boundary::Retain)
    }

    /// Between `min` and `max` members of `class`.
    ///
    /// # Errors
    ///
    /// A syntax error, after rewinding, if fewer than `min` are found.
    pub fn next_run(&mut self, class: &CharClass, min: usize, max: usize) -> Result<String, ScanError> {
        let mark = self.mark();
        let run = self.scan_while_bounded(class, max, Boundary::Retain)?;
        let have = run.chars().count();
        if have < min {
            self.restore(mark);
            return Err(self
                .syntax_error(format!(
                    "expected a minimum of {min} characters while searching for {} and have only {have} characters",
                    self.names.describe_class(class)
                ))
                .into());
        }
        Ok(run)
    }

    /// Between `min` and `max` ASCII digits.
    ///
    /// # Errors
    ///
    /// As [`next_run`](Cursor::next_run).
    pub fn next_digits(&mut self, min: usize, max: usize) -> Result<String, ScanError> {
        self.next_run(&DIGITS, min, max)
    }

    /// Between `min` and `max` ASCII letters.
    ///
    /// # Errors
    ///
    /// As [`next_run`](Cursor::next_run).
    pub fn next_alpha(&mut self, min: usize, max: usize) -> Result<String, ScanError> {
        self.next_run(&LETTERS, min, max)
    }

    /// Between `min` and `max` hex digits.
    ///
    /// # Errors
    ///
    /// As [`next_run`](Cursor::next_run).
    pub fn next_hex(&mut self, min: usize, max: usize) -> Result<String, ScanError> {
        self.next_run(&HEX_DIGITS, min, max)
    }

    /// Between `min` and `max` octal digits.
    ///
    /// # Errors
    ///
    /// As [`next_run`](Cursor::next_run).
    pub fn next_octal(&mut self, min: usize, max: usize) -> Result<String, ScanError> {
        self.next_run(&OCTAL_DIGITS, min, max)
    }

    /// Grows a candidate from `min` up to `max` characters until `accept`
    /// takes it. `Ok(None)` leaves the cursor where it started.
    fn grow_match<T>(
        &mut self,
        min: usize,
        max: usize,
        label: &str,
        mut accept: impl FnMut(&str) -> Option<T>,
    ) -> Result<Option<T>, ScanError> {
        let mark = self.mark();
        let mut candidate = self.next_length(min)?;
        let mut taken = candidate.chars().count();
        if taken < min {
            self.restore(mark);
            return Err(self
                .syntax_error(format!(
                    "expected a minimum of {min} characters while searching for {label} and have only {taken} characters"
                ))
                .into());
        }
        if min > 0 {
            if let Some(found) = accept(&candidate) {
                return Ok(Some(found));
            }
        }
        while taken < max {
            let c = self.next()?;
            if self.end_of_source() {
                break;
            }
            candidate.push(c);
            taken += 1;
            if let Some(found) = accept(&candidate) {
                return Ok(Some(found));
            }
        }
        self.restore(mark);
        Ok(None)
    }

    fn no_match(&mut self, label: &str) -> ScanError {
        match self.found() {
            Ok(found) => self.syntax_error(format!("expected {label} and found {found}")).into(),
            Err(e) => e,
        }
    }

    /// The shortest text of `min` to `max` characters that `pattern` matches
    /// in full.
    ///
    /// # Errors
    ///
    /// A syntax error, after rewinding, if fewer than `min` characters remain
    /// or no prefix up to `max` characters matches.
    pub fn next_pattern(&mut self, min: usize, max: usize, pattern: &Pattern) -> Result<String, ScanError> {
        match self.grow_match(min, max, pattern.label(), |c| pattern.matches(c).then(|| c.to_owned()))? {
            Some(text) => Ok(text),
            None => Err(self.no_match(pattern.label())),
        }
    }

    /// [`next_pattern`](Cursor::next_pattern) against every pattern of
    /// `patterns`: the shortest text that any of them matches.
    ///
    /// # Errors
    ///
    /// As [`next_pattern`](Cursor::next_pattern), naming the list's label.
    pub fn next_pattern_from(&mut self, min: usize, max: usize, patterns: &PatternList) -> Result<String, ScanError> {
        match self.grow_match(min, max, patterns.label(), |c| patterns.matches(c).then(|| c.to_owned()))? {
            Some(text) => Ok(text),
            None => Err(self.no_match(patterns.label())),
        }
    }

    /// Like [`next_pattern_from`](Cursor::next_pattern_from), returning the
    /// capture groups of the first pattern that matched. With `optional`
    /// set, a failed match rewinds and returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// A syntax error if fewer than `min` characters remain, whether or not
    /// the match is optional, or if nothing matches and it is not.
    pub fn next_match(
        &mut self,
        optional: bool,
        min: usize,
        max: usize,
        patterns: &PatternList,
    ) -> Result<Option<PatternMatch>, ScanError> {
        let found = self.grow_match(min, max, patterns.label(), |c| patterns.captures(c))?;
        if found.is_none() && !optional {
            return Err(self.no_match(patterns.label()));
        }
        Ok(found)
    }

    /// Steps back over the text of `found`, the most recent match.
    ///
    /// # Panics
    ///
    /// As [`back`](Cursor::back), if the matched text is no longer retained.
    pub fn back_match(&mut self, found: &PatternMatch) {
        self.back_n(found.char_len());
    }

    /// Checks that `text`, just read, has at least `min` characters. On
    /// failure steps back over it and reports `what` as the expectation.
    ///
    /// # Errors
    ///
    /// A syntax error if `text` is too short.
    pub fn assert_length<'t>(&mut self, text: &'t str, min: usize, what: &str) -> Result<&'t str, ScanError> {
        self.check_length(text, min, what, 0)
    }

    /// [`assert_length`](Cursor::assert_length) for text read with
    /// [`next_field`](Cursor::next_field), whose delimiter is also stepped
    /// back over on failure.
    ///
    /// # Errors
    ///
    /// A syntax error if `text` is too short.
    pub fn assert_delimited_length<'t>(
        &mut self,
        text: &'t str,
        min: usize,
        what: &str,
    ) -> Result<&'t str, ScanError> {
        self.check_length(text, min, what, 1)
    }

    fn check_length<'t>(
        &mut self,
        text: &'t str,
        min: usize,
        what: &str,
        delimiter: usize,
    ) -> Result<&'t str, ScanError> {
        let have = text.chars().count();
        if have >= min {
            return Ok(text);
        }
        let mut steps = have;
        if self.end_of_source() {
            self.back();
        } else {
            steps += delimiter;
        }
        self.back_n(steps);
        Err(self
            .syntax_error(format!(
                "expected at least {min} characters of {what} and found `{text}'"
            ))
            .into())
    }

    /// The last `n` characters consumed, if all of them are still retained.
    pub fn look_behind(&self, n: usize) -> Option<String> {
        self.state.behind_text(n)
    }
}

/// Iterator over the remaining characters of a cursor.
///
/// Created by [`Cursor::chars`].
#[derive(Debug)]
pub struct Chars<'a> {
    cursor: &'a mut Cursor,
}

impl<'a> Chars<'a> {
    pub(super) fn new(cursor: &'a mut Cursor) -> Self {
        Self { cursor }
    }
}

impl Iterator for Chars<'_> {
    type Item = Result<char, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.cursor.have_next() {
            Ok(true) => Some(self.cursor.next()),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
