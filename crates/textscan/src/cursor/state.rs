//! Position bookkeeping for a [`Cursor`](super::Cursor).
//!
//! Invariants
//! - `units[..pos]` has been consumed; `units[pos..]` was read once and
//!   stepped back over. `index == base + pos`.
//! - `columns` holds one entry per CR or LF in `units[..pos]`: the column in
//!   effect just before that break was crossed.
//! - A unit's `escaped` flag is fixed when it is pulled from the source, so
//!   stepping forward and backward over the same text reads the same flags.
//! - `before` is the last unit discarded from the front of the history, kept
//!   so `current()` and escape detection survive a flush.

use crate::options::ScannerOptions;

const BACKSLASH: char = '\\';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Unit {
    pub(crate) ch: char,
    pub(crate) escaped: bool,
}

impl Unit {
    /// A backslash that starts an escape of the following character.
    fn is_live_slash(self) -> bool {
        self.ch == BACKSLASH && !self.escaped
    }

    fn is_break(self) -> bool {
        matches!(self.ch, '\n' | '\r')
    }
}

#[derive(Debug, Clone)]
pub(crate) struct State {
    units: Vec<Unit>,
    pos: usize,
    base: usize,
    before: Option<Unit>,
    columns: Vec<usize>,
    pub(crate) line: usize,
    pub(crate) column: usize,
    pub(crate) at_end: bool,
    pub(crate) exhausted: bool,
    pub(crate) lookahead: Option<char>,
    pub(crate) started: bool,
    pub(crate) options: ScannerOptions,
}

impl State {
    pub(crate) fn new(options: ScannerOptions) -> Self {
        Self {
            units: Vec::with_capacity(options.history_capacity),
            pos: 0,
            base: 0,
            before: None,
            columns: Vec::new(),
            line: 1,
            column: 0,
            at_end: false,
            exhausted: false,
            lookahead: None,
            started: false,
            options,
        }
    }

    /// Moves the origin. Only valid before the first read.
    pub(crate) fn place(&mut self, line: usize, column: usize, index: usize) {
        self.line = line;
        self.column = column;
        self.base = index;
    }

    pub(crate) fn index(&self) -> usize {
        self.base + self.pos
    }

    /// Retained characters.
    pub(crate) fn len(&self) -> usize {
        self.units.len()
    }

    /// Retained characters ahead of the position.
    pub(crate) fn ahead(&self) -> usize {
        self.units.len() - self.pos
    }

    /// Retained characters behind the position.
    pub(crate) fn behind(&self) -> usize {
        self.pos
    }

    fn unit_back(&self, n: usize) -> Option<Unit> {
        match self.pos.checked_sub(n) {
            Some(i) => self.units.get(i).copied(),
            None if n == self.pos + 1 => self.before,
            None => None,
        }
    }

    /// The most recently consumed unit.
    pub(crate) fn current(&self) -> Option<Unit> {
        self.unit_back(1)
    }

    /// The unit consumed before the current one.
    pub(crate) fn previous(&self) -> Option<Unit> {
        self.unit_back(2)
    }

    /// Retained characters `units[pos - n..pos]`, if all are retained.
    pub(crate) fn behind_text(&self, n: usize) -> Option<String> {
        let from = self.pos.checked_sub(n)?;
        Some(self.units[from..self.pos].iter().map(|u| u.ch).collect())
    }

    /// Steps over the next retained unit, if the position is inside history.
    pub(crate) fn replay(&mut self) -> Option<char> {
        let unit = *self.units.get(self.pos)?;
        self.pos += 1;
        self.advance(unit);
        Some(unit.ch)
    }

    /// Appends a freshly pulled character and steps over it.
    pub(crate) fn record(&mut self, ch: char) {
        debug_assert_eq!(self.pos, self.units.len());
        let escaped = self
            .units
            .last()
            .copied()
            .or(self.before)
            .is_some_and(Unit::is_live_slash);
        if self.units.len() == self.units.capacity() {
            self.units.reserve(self.options.history_capacity.max(1));
        }
        let unit = Unit { ch, escaped };
        self.units.push(unit);
        self.pos += 1;
        self.advance(unit);
    }

    /// Steps back over the current unit. Returns `false` when there is no
    /// retained unit behind the position.
    pub(crate) fn retreat(&mut self) -> bool {
        if self.pos == 0 {
            return false;
        }
        self.pos -= 1;
        let unit = self.units[self.pos];
        match unit.ch {
            '\t' => self.column -= self.options.tab_size,
            '\r' => self.column = self.columns.pop().unwrap_or(0),
            '\n' => {
                self.column = self.columns.pop().unwrap_or(0);
                self.line -= 1;
            }
            _ => self.column -= 1,
        }
        true
    }

    fn advance(&mut self, unit: Unit) {
        match unit.ch {
            '\t' => self.column += self.options.tab_size,
            '\r' => {
                self.columns.push(self.column);
                self.column = 0;
            }
            '\n' => {
                self.columns.push(self.column);
                self.column = 0;
                self.line += 1;
            }
            _ => self.column += 1,
        }
    }

    /// Drops the first `count` retained units. `count` must not exceed `pos`.
    pub(crate) fn discard_front(&mut self, count: usize) {
        debug_assert!(count <= self.pos);
        if count == 0 {
            return;
        }
        let breaks = self.units[..count].iter().filter(|u| u.is_break()).count();
        self.columns.drain(..breaks);
        self.before = Some(self.units[count - 1]);
        self.units.drain(..count);
        self.pos -= count;
        self.base += count;
    }
}
