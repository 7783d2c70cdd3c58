/// Configuration for a [`Cursor`](crate::Cursor).
///
/// Options are fixed before the first character is read. Changing them on a
/// cursor that has already started is a contract violation.
///
/// # Default
///
/// `tab_size = 4`, `history_capacity = 256`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScannerOptions {
    /// Number of columns a horizontal tab advances.
    ///
    /// # Default
    ///
    /// `4`
    pub tab_size: usize,

    /// Initial capacity of the history buffer, and the growth step once it
    /// fills. The history is unbounded; this only tunes allocation.
    ///
    /// # Default
    ///
    /// `256`
    pub history_capacity: usize,
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self {
            tab_size: 4,
            history_capacity: 256,
        }
    }
}
