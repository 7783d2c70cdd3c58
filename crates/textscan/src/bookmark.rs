use core::fmt;
use std::sync::Arc;

/// A frozen copy of a cursor position.
///
/// Bookmarks are created by value and hold no reference to the cursor that
/// produced them. They render as
/// `at location = {line: 1, column: 4, index: 4, source: "input"};`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bookmark {
    /// 1-based line.
    pub line: usize,
    /// Characters consumed on the current line.
    pub column: usize,
    /// Characters consumed from the start of the source.
    pub index: usize,
    /// Label of the source the position belongs to.
    pub source: Arc<str>,
    /// Tab width in effect, so a sub-scan resumed here counts columns alike.
    pub tab_size: usize,
}

impl Bookmark {
    /// Creates a bookmark from raw coordinates.
    pub fn new(source: impl Into<Arc<str>>, line: usize, column: usize, index: usize) -> Self {
        Self {
            line,
            column,
            index,
            source: source.into(),
            tab_size: crate::ScannerOptions::default().tab_size,
        }
    }
}

impl fmt::Display for Bookmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "at location = {{line: {}, column: {}, index: {}, source: \"",
            self.line, self.column, self.index
        )?;
        for ch in self.source.chars() {
            match ch {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                _ => fmt::Write::write_char(f, ch)?,
            }
        }
        f.write_str("\"};")
    }
}
